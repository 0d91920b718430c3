/*!
 * Markdown output
 *
 * Each file is emitted as a fenced block whose opening line carries a
 * `// <path>` header, the same shape the clipboard monitor accepts back.
 */

use std::path::{Component, Path};

use chrono::Local;

use super::tree::render_tree;
use crate::types::DirectoryNode;

/// Render the project as markdown
pub fn render_markdown(root: &DirectoryNode, project_types: &[String]) -> String {
    let mut out = format!("# Project: {}\n\n", root.name);
    out.push_str(&format!("Generated: {}\n", Local::now().to_rfc3339()));
    if !project_types.is_empty() {
        out.push_str(&format!("Project types: {}\n", project_types.join(", ")));
    }

    out.push_str("\n## Structure\n\n```text\n");
    out.push_str(&render_tree(root));
    out.push_str("```\n\n## Files\n");

    for file in root.files() {
        let content = file.content.as_deref().unwrap_or_default();
        let fence = fence_for(content);
        let path = project_relative(&file.path);

        out.push('\n');
        out.push_str(&fence);
        if let Some(lang) = language_tag(&file.name) {
            out.push_str(lang);
        }
        out.push_str(" // ");
        out.push_str(&path);
        out.push('\n');
        out.push_str(content);
        if !content.is_empty() && !content.ends_with('\n') {
            out.push('\n');
        }
        out.push_str(&fence);
        out.push('\n');
    }

    out
}

/// A backtick fence longer than any run inside `content`
pub fn fence_for(content: &str) -> String {
    let mut longest = 0;
    let mut run = 0;
    for c in content.chars() {
        if c == '`' {
            run += 1;
            longest = longest.max(run);
        } else {
            run = 0;
        }
    }
    "`".repeat((longest + 1).max(3))
}

/// Path below the project root, with forward slashes
fn project_relative(path: &Path) -> String {
    path.components()
        .skip(1)
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

fn language_tag(name: &str) -> Option<&'static str> {
    let ext = name.rsplit_once('.')?.1;
    let tag = match ext {
        "rs" => "rust",
        "ts" | "mts" | "cts" => "ts",
        "tsx" => "tsx",
        "js" | "mjs" | "cjs" => "js",
        "jsx" => "jsx",
        "py" => "python",
        "go" => "go",
        "java" => "java",
        "kt" | "kts" => "kotlin",
        "c" | "h" => "c",
        "cc" | "cpp" | "cxx" | "hpp" => "cpp",
        "cs" => "csharp",
        "php" => "php",
        "rb" => "ruby",
        "swift" => "swift",
        "dart" => "dart",
        "ex" | "exs" => "elixir",
        "vue" => "vue",
        "html" => "html",
        "css" => "css",
        "scss" => "scss",
        "json" => "json",
        "toml" => "toml",
        "yaml" | "yml" => "yaml",
        "md" => "markdown",
        "sh" | "bash" => "bash",
        "sql" => "sql",
        _ => return None,
    };
    Some(tag)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edit::{classify, EditOperation};
    use crate::types::{FileNode, Metadata, Node};
    use std::path::PathBuf;
    use std::time::SystemTime;

    fn root_with(name: &str, content: &str) -> DirectoryNode {
        let meta = Metadata {
            size: content.len() as u64,
            modified: SystemTime::UNIX_EPOCH,
            permissions: "644".to_string(),
        };
        DirectoryNode {
            name: "demo".to_string(),
            path: PathBuf::from("demo"),
            metadata: meta.clone(),
            contents: vec![Node::Directory(DirectoryNode {
                name: "src".to_string(),
                path: PathBuf::from("demo/src"),
                metadata: meta.clone(),
                contents: vec![Node::File(FileNode {
                    name: name.to_string(),
                    path: PathBuf::from("demo/src").join(name),
                    metadata: meta,
                    content: Some(content.to_string()),
                })],
            })],
        }
    }

    #[test]
    fn test_fence_for() {
        assert_eq!(fence_for("plain"), "```");
        assert_eq!(fence_for("a ``` b"), "````");
        assert_eq!(fence_for("`x`"), "```");
    }

    #[test]
    fn test_file_block_header() {
        let out = render_markdown(&root_with("main.rs", "fn main() {}\n"), &["Rust".to_string()]);
        assert!(out.contains("Project types: Rust"));
        assert!(out.contains("```rust // src/main.rs\nfn main() {}\n```\n"));
    }

    #[test]
    fn test_file_block_is_a_valid_edit() {
        let out = render_markdown(&root_with("app.ts", "export const a = 1;\n"), &[]);
        let block = &out[out.find("```ts").unwrap()..];

        assert_eq!(
            classify(block).unwrap(),
            Some(EditOperation::WholeFile {
                path: "src/app.ts".to_string(),
                content: "export const a = 1;\n".to_string(),
            })
        );
    }

    #[test]
    fn test_block_with_inner_fence_round_trips() {
        let content = "# Demo\n\n```sh\ncargo run\n```\n";
        let out = render_markdown(&root_with("README.md", content), &[]);
        let block = &out[out.find("````").unwrap()..];
        assert!(block.ends_with("```\n````\n"));

        assert_eq!(
            classify(block).unwrap(),
            Some(EditOperation::WholeFile {
                path: "src/README.md".to_string(),
                content: content.to_string(),
            })
        );
    }
}
