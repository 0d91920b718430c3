/*!
 * ctxdump - Concatenate project sources into LLM context and apply pasted edits
 *
 * The dump side detects what kind of project a directory holds, derives an
 * ignore set from that and renders the remaining sources as markdown, XML or
 * JSON. The monitor side watches the clipboard for whole-file or
 * search/replace edits and applies them inside the project root.
 */

pub mod clipboard;
pub mod config;
pub mod detect;
pub mod edit;
pub mod error;
pub mod ignore_set;
pub mod matcher;
pub mod monitor;
pub mod report;
pub mod scanner;
pub mod types;
pub mod utils;
pub mod writer;


// Re-export main components for easier access
pub use clipboard::{ClipboardBridge, SystemClipboard};
pub use config::{Args, Config, FileConfig};
pub use detect::{DetectionCandidate, ProjectDetector};
pub use edit::{EditError, EditOperation};
pub use error::{CtxError, Result};
pub use ignore_set::{IgnoreOverrides, IgnoreSet};
pub use monitor::{CancellationToken, DispatchOutcome, MonitorLoop, MonitorStats};
pub use report::{FileReportInfo, Reporter, ScanReport};
pub use scanner::Scanner;
pub use types::{BinaryNode, DirectoryNode, FileNode, FileType, Metadata, Node, SymlinkNode};
pub use utils::{count_files, format_file_size};
pub use writer::{OutputFormat, OutputWriter};

/// Version of the library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
