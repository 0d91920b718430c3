/*!
 * Plain-text directory tree
 */

use crate::types::{DirectoryNode, Node};

/// Render the tree with box-drawing connectors
///
/// ```text
/// demo/
/// ├── src/
/// │   └── main.rs
/// └── Cargo.toml
/// ```
pub fn render_tree(root: &DirectoryNode) -> String {
    let mut out = format!("{}/\n", root.name);
    render_children(root, "", &mut out);
    out
}

fn render_children(dir: &DirectoryNode, prefix: &str, out: &mut String) {
    let count = dir.contents.len();
    for (i, node) in dir.contents.iter().enumerate() {
        let last = i + 1 == count;
        let connector = if last { "└── " } else { "├── " };

        out.push_str(prefix);
        out.push_str(connector);
        match node {
            Node::Directory(child) => {
                out.push_str(&child.name);
                out.push_str("/\n");
                let child_prefix = format!("{}{}", prefix, if last { "    " } else { "│   " });
                render_children(child, &child_prefix, out);
            }
            Node::File(file) => {
                out.push_str(&file.name);
                out.push('\n');
            }
            Node::Binary(binary) => {
                out.push_str(&binary.name);
                out.push_str(" (binary)\n");
            }
            Node::Symlink(link) => {
                out.push_str(&format!("{} -> {}\n", link.name, link.target));
            }
        }
    }
}
