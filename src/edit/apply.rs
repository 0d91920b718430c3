/*!
 * Applying classified edits to disk
 *
 * Writes go through a temporary file in the target directory that is then
 * renamed over the target, so a failed edit leaves the old content intact.
 *
 * Search/replace reads the file and writes it back without any lock. An
 * editor saving the same file in between loses its change; the monitor is
 * the only writer this crate knows about.
 */

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use super::error::{EditError, EditResult};
use super::paths::SafePath;
use super::EditOperation;

/// Characters of search text shown when it cannot be found
const PREVIEW_CHARS: usize = 60;

/// What an applied edit did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// A new file was written
    Created { path: PathBuf, bytes: usize },
    /// An existing file was replaced
    Overwritten { path: PathBuf, bytes: usize },
    /// The first occurrence of the search text was replaced
    Replaced { path: PathBuf },
}

impl ApplyOutcome {
    /// The file that was written
    pub fn path(&self) -> &Path {
        match self {
            Self::Created { path, .. } | Self::Overwritten { path, .. } | Self::Replaced { path } => {
                path
            }
        }
    }
}

/// Apply an edit to an already-validated path
pub fn apply(op: &EditOperation, target: &SafePath) -> EditResult<ApplyOutcome> {
    match op {
        EditOperation::WholeFile { content, .. } => write_whole_file(target.as_path(), content),
        EditOperation::SearchReplace {
            search, replace, ..
        } => replace_first(target.as_path(), search, replace),
    }
}

fn write_whole_file(path: &Path, content: &str) -> EditResult<ApplyOutcome> {
    let existed = path.exists();
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| EditError::io(parent, e))?;
    }

    write_atomic(path, content.as_bytes()).map_err(|e| EditError::io(path, e))?;

    let path = path.to_path_buf();
    let bytes = content.len();
    Ok(if existed {
        ApplyOutcome::Overwritten { path, bytes }
    } else {
        ApplyOutcome::Created { path, bytes }
    })
}

fn replace_first(path: &Path, search: &str, replace: &str) -> EditResult<ApplyOutcome> {
    if search.is_empty() {
        return Err(EditError::EmptySearch);
    }

    let original = fs::read_to_string(path).map_err(|e| EditError::io(path, e))?;
    if !original.contains(search) {
        return Err(EditError::SearchNotFound {
            path: path.to_path_buf(),
            preview: preview(search),
        });
    }

    let updated = original.replacen(search, replace, 1);
    write_atomic(path, updated.as_bytes()).map_err(|e| EditError::io(path, e))?;

    Ok(ApplyOutcome::Replaced {
        path: path.to_path_buf(),
    })
}

/// Write `data` to `path` through a sibling temp file and a rename
pub fn write_atomic(path: &Path, data: &[u8]) -> io::Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    // Keep the permissions of the file being replaced
    let permissions = fs::metadata(path).map(|m| m.permissions()).ok();

    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(data)?;
    tmp.as_file().sync_all()?;

    if let Some(permissions) = permissions {
        fs::set_permissions(tmp.path(), permissions)?;
    }

    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// First characters of the search text, for log messages
fn preview(search: &str) -> String {
    let mut chars = search.chars();
    let head: String = chars.by_ref().take(PREVIEW_CHARS).collect();
    if chars.next().is_some() {
        format!("{}...", head)
    } else {
        head
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edit::paths::resolve;
    use tempfile::tempdir;

    fn search_replace(search: &str, replace: &str) -> EditOperation {
        EditOperation::SearchReplace {
            path: "x.txt".to_string(),
            search: search.to_string(),
            replace: replace.to_string(),
        }
    }

    #[test]
    fn test_replaces_first_occurrence_only() -> io::Result<()> {
        let dir = tempdir()?;
        fs::write(dir.path().join("x.txt"), "x=1\nx=1\n")?;
        let target = resolve(dir.path(), "x.txt").unwrap();

        let outcome = apply(&search_replace("x=1", "x=2"), &target).unwrap();
        assert!(matches!(outcome, ApplyOutcome::Replaced { .. }));
        assert_eq!(fs::read_to_string(dir.path().join("x.txt"))?, "x=2\nx=1\n");
        Ok(())
    }

    #[test]
    fn test_missing_search_leaves_file_untouched() -> io::Result<()> {
        let dir = tempdir()?;
        fs::write(dir.path().join("x.txt"), "hello\n")?;
        let target = resolve(dir.path(), "x.txt").unwrap();

        let err = apply(&search_replace("goodbye", "hi"), &target).unwrap_err();
        assert!(matches!(err, EditError::SearchNotFound { .. }));
        assert_eq!(fs::read_to_string(dir.path().join("x.txt"))?, "hello\n");
        Ok(())
    }

    #[test]
    fn test_search_in_missing_file_is_io_error() -> io::Result<()> {
        let dir = tempdir()?;
        let target = resolve(dir.path(), "absent.txt").unwrap();

        let err = apply(&search_replace("a", "b"), &target).unwrap_err();
        assert!(matches!(err, EditError::Io { .. }));
        assert!(!dir.path().join("absent.txt").exists());
        Ok(())
    }

    #[test]
    fn test_whole_file_creates_parents() -> io::Result<()> {
        let dir = tempdir()?;
        let target = resolve(dir.path(), "deep/nested/new.rs").unwrap();
        let op = EditOperation::WholeFile {
            path: "deep/nested/new.rs".to_string(),
            content: "fn main() {}\n".to_string(),
        };

        let outcome = apply(&op, &target).unwrap();
        assert!(matches!(outcome, ApplyOutcome::Created { bytes: 13, .. }));
        assert_eq!(
            fs::read_to_string(dir.path().join("deep/nested/new.rs"))?,
            "fn main() {}\n"
        );

        let outcome = apply(&op, &target).unwrap();
        assert!(matches!(outcome, ApplyOutcome::Overwritten { .. }));
        Ok(())
    }

    #[cfg(unix)]
    #[test]
    fn test_overwrite_keeps_permissions() -> io::Result<()> {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir()?;
        let path = dir.path().join("run.sh");
        fs::write(&path, "#!/bin/sh\n")?;
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755))?;

        write_atomic(&path, b"#!/bin/sh\necho hi\n")?;
        assert_eq!(fs::metadata(&path)?.permissions().mode() & 0o777, 0o755);
        Ok(())
    }

    #[test]
    fn test_preview_is_truncated() {
        assert_eq!(preview("short"), "short");
        let long = "a".repeat(100);
        assert_eq!(preview(&long), format!("{}...", "a".repeat(PREVIEW_CHARS)));
    }
}
