/*!
 * Clipboard edit engine
 *
 * Turns pasted text into an [`EditOperation`], confines its path to the
 * project root and applies it to disk.
 */

mod apply;
mod classify;
mod error;
mod paths;

pub use apply::{apply, write_atomic, ApplyOutcome};
pub use classify::{
    classify, MAX_PAYLOAD_BYTES, REPLACE_MARKER, SEARCH_MARKER, SEPARATOR_MARKER,
};
pub use error::{EditError, EditResult};
pub use paths::{normalize, resolve, SafePath};

/// A file mutation requested through the clipboard
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditOperation {
    /// Replace the whole file, creating it if needed
    WholeFile { path: String, content: String },
    /// Replace the first occurrence of `search` with `replace`
    SearchReplace {
        path: String,
        search: String,
        replace: String,
    },
}

impl EditOperation {
    /// The path as declared in the payload
    pub fn path(&self) -> &str {
        match self {
            Self::WholeFile { path, .. } | Self::SearchReplace { path, .. } => path,
        }
    }

    /// Short name of the operation kind, for logs
    pub fn kind(&self) -> &'static str {
        match self {
            Self::WholeFile { .. } => "whole-file",
            Self::SearchReplace { .. } => "search-replace",
        }
    }
}
