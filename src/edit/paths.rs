/*!
 * Lexical path confinement for clipboard edits
 */

use std::fmt;
use std::path::{Component, Path, PathBuf};

use super::error::{EditError, EditResult};

/// An absolute, normalized path strictly inside a project root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SafePath {
    absolute: PathBuf,
    relative: PathBuf,
}

impl SafePath {
    /// The absolute target path
    pub fn as_path(&self) -> &Path {
        &self.absolute
    }

    /// The target relative to the project root, never empty
    pub fn relative(&self) -> &Path {
        &self.relative
    }
}

impl AsRef<Path> for SafePath {
    fn as_ref(&self) -> &Path {
        &self.absolute
    }
}

impl fmt::Display for SafePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.absolute.display())
    }
}

/// Resolve a declared path against `root`, rejecting anything that escapes
///
/// Relative paths are joined onto the root; absolute paths are taken as-is.
/// The check is purely lexical and never touches the filesystem.
pub fn resolve(root: &Path, declared: &str) -> EditResult<SafePath> {
    let root = normalize(root);
    let declared = Path::new(declared.trim());
    let target = if declared.is_absolute() {
        normalize(declared)
    } else {
        normalize(&root.join(declared))
    };

    let reject = || EditError::UnsafePath {
        root: root.clone(),
        target: target.clone(),
    };

    let relative = target.strip_prefix(&root).map_err(|_| reject())?;
    let escapes = match relative.components().next() {
        None => true,
        Some(Component::ParentDir | Component::RootDir | Component::Prefix(_)) => true,
        Some(_) => relative.is_absolute(),
    };
    if escapes {
        return Err(reject());
    }

    Ok(SafePath {
        relative: relative.to_path_buf(),
        absolute: target.clone(),
    })
}

/// Collapse `.` and `..` without consulting the filesystem
///
/// `..` at the top of an absolute path stays at the root; on a relative path
/// it is kept so the caller can see the escape.
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => out.push(".."),
            },
            other => out.push(other.as_os_str()),
        }
    }
    out
}
