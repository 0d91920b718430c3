/*!
 * Error types for clipboard edits
 */

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors that abandon a single clipboard edit
#[derive(Error, Debug)]
pub enum EditError {
    /// The search block is empty after trimming
    #[error("Search block is empty")]
    EmptySearch,

    /// The clipboard payload is too large to parse
    #[error("Clipboard payload too large: {size} bytes (limit {limit})")]
    PayloadTooLarge { size: usize, limit: usize },

    /// The declared path resolves outside the project root
    #[error("Blocked write outside project root: {target} (root: {root})")]
    UnsafePath { root: PathBuf, target: PathBuf },

    /// The search text does not occur in the target file
    #[error("Search text not found in {path}: {preview:?}")]
    SearchNotFound { path: PathBuf, preview: String },

    /// Filesystem failure while reading or writing the target
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl EditError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type for edit operations
pub type EditResult<T> = Result<T, EditError>;
