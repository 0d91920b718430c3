/*!
 * Directory and file scanning functionality
 *
 * Builds the project tree that the writers render. Ignored folders are
 * pruned before descending; text files are read in parallel.
 */

use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use glob_match::glob_match;
use ignore::WalkBuilder;
use indicatif::ProgressBar;
use rayon::prelude::*;
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::config::Config;
use crate::ignore_set::IgnoreSet;
use crate::report::FileReportInfo;
use crate::types::{BinaryNode, DirectoryNode, FileNode, FileType, Metadata, Node, SymlinkNode};
use crate::utils::format_file_size;

/// Files above this size are listed with a placeholder instead of content
pub const MAX_CONTENT_BYTES: u64 = 1_048_576;

/// Prefix of the default output files, never scanned
pub const OUTPUT_PREFIX: &str = ".ctxdump.context.";

/// Bytes sampled when guessing whether a file is text
const SNIFF_BYTES: usize = 8192;

/// Scanner statistics
#[derive(Debug, Clone, Default)]
pub struct ScannerStatistics {
    /// Number of files processed
    pub files_processed: usize,
    /// Total number of lines
    pub total_lines: usize,
    /// Total number of characters
    pub total_chars: usize,
    /// Details for each file, keyed by path relative to the scan root
    pub file_details: HashMap<String, FileReportInfo>,
}

/// One child of a directory being scanned
struct Entry {
    path: PathBuf,
    name: String,
    is_dir: bool,
}

/// Scanner for directory contents
pub struct Scanner {
    /// Scanner configuration
    config: Config,
    /// Effective ignore set for this scan
    ignore: IgnoreSet,
    /// Canonical location of the output file, skipped while scanning
    output_path: Option<PathBuf>,
    /// Progress bar
    pub progress: Arc<ProgressBar>,
    /// Scanner statistics
    statistics: Arc<Mutex<ScannerStatistics>>,
}

impl Scanner {
    /// Create a new scanner
    pub fn new(config: Config, ignore: IgnoreSet, progress: Arc<ProgressBar>) -> Self {
        Self {
            output_path: canonical_output_path(&config.output_file),
            config,
            ignore,
            progress,
            statistics: Arc::new(Mutex::new(ScannerStatistics::default())),
        }
    }

    /// Get scanner statistics
    pub fn get_statistics(&self) -> ScannerStatistics {
        self.statistics
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Scan the target directory and return the directory tree
    pub fn scan(&self) -> io::Result<DirectoryNode> {
        let abs_path = fs::canonicalize(&self.config.target_dir)?;
        let dir_name = abs_path
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string();

        self.scan_directory(&abs_path, &PathBuf::from(&dir_name))
    }

    /// Scan a directory and return its node representation
    fn scan_directory(&self, abs_path: &Path, rel_path: &Path) -> io::Result<DirectoryNode> {
        let metadata = get_metadata(abs_path)?;
        let mut contents = Vec::new();

        let (dirs, files): (Vec<Entry>, Vec<Entry>) = self
            .list_entries(abs_path)
            .into_iter()
            .filter(|e| !self.should_ignore(&e.path, e.is_dir))
            .filter(|e| e.is_dir || self.should_include(&e.path))
            .partition(|e| e.is_dir);

        // Directories first, sequentially
        for entry in dirs {
            match self.scan_directory(&entry.path, &rel_path.join(&entry.name)) {
                Ok(dir_node) => contents.push(Node::Directory(dir_node)),
                Err(e) => warn!("error processing directory {}: {}", entry.path.display(), e),
            }
        }

        // Files in parallel
        let file_nodes: Vec<Node> = files
            .par_iter()
            .filter_map(|entry| {
                match self.process_file(&entry.path, &rel_path.join(&entry.name)) {
                    Ok(node) => Some(node),
                    Err(e) => {
                        warn!("error processing {}: {}", entry.path.display(), e);
                        None
                    }
                }
            })
            .collect();
        contents.extend(file_nodes);

        contents.sort_by(|a, b| {
            let a_dir = matches!(a, Node::Directory(_));
            let b_dir = matches!(b, Node::Directory(_));
            b_dir.cmp(&a_dir).then_with(|| a.name().cmp(b.name()))
        });

        Ok(DirectoryNode {
            name: abs_path
                .file_name()
                .unwrap_or_default()
                .to_string_lossy()
                .to_string(),
            path: rel_path.to_path_buf(),
            metadata,
            contents,
        })
    }

    /// Immediate children of a directory, honoring .gitignore if configured
    fn list_entries(&self, dir: &Path) -> Vec<Entry> {
        if self.config.respect_gitignore {
            let mut walker = WalkBuilder::new(dir);
            walker.max_depth(Some(1)).require_git(false);

            if let Some(gitignore_path) = &self.config.gitignore_path {
                walker.add_custom_ignore_filename(gitignore_path);
            }

            walker
                .build()
                .filter_map(Result::ok)
                .filter(|e| e.depth() > 0)
                .map(|e| Entry {
                    is_dir: e.file_type().is_some_and(|ft| ft.is_dir()),
                    name: e.file_name().to_string_lossy().to_string(),
                    path: e.into_path(),
                })
                .collect()
        } else {
            WalkDir::new(dir)
                .min_depth(1)
                .max_depth(1)
                .into_iter()
                .filter_map(Result::ok)
                .map(|e| Entry {
                    is_dir: e.file_type().is_dir(),
                    name: e.file_name().to_string_lossy().to_string(),
                    path: e.into_path(),
                })
                .collect()
        }
    }

    /// Process a single file and return its node representation
    fn process_file(&self, abs_path: &Path, rel_path: &Path) -> io::Result<Node> {
        self.progress.inc(1);

        let file_name = abs_path
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string();
        // Keep the progress line short
        let display_name = if file_name.chars().count() > 40 {
            let tail: String = file_name.chars().rev().take(37).collect();
            format!("...{}", tail.chars().rev().collect::<String>())
        } else {
            file_name.clone()
        };
        self.progress
            .set_message(format!("Current file: {}", display_name));

        let file_type = get_file_type(abs_path)?;
        let metadata = get_metadata(abs_path)?;
        let report_path = rel_path.to_string_lossy().to_string();

        match file_type {
            FileType::TextFile => {
                let content = self.read_file_content(abs_path, report_path)?;
                Ok(Node::File(FileNode {
                    name: file_name,
                    path: rel_path.to_path_buf(),
                    metadata,
                    content: Some(content),
                }))
            }
            FileType::BinaryFile => {
                self.record(report_path, FileReportInfo::default());
                Ok(Node::Binary(BinaryNode {
                    name: file_name,
                    path: rel_path.to_path_buf(),
                    metadata,
                }))
            }
            FileType::Symlink => {
                let target = fs::read_link(abs_path)?.to_string_lossy().to_string();
                self.record(
                    report_path,
                    FileReportInfo {
                        lines: 0,
                        chars: target.chars().count(),
                    },
                );
                Ok(Node::Symlink(SymlinkNode {
                    name: file_name,
                    path: rel_path.to_path_buf(),
                    metadata,
                    target,
                }))
            }
            _ => Err(io::Error::new(
                io::ErrorKind::Other,
                format!("Unexpected file type for {}", abs_path.display()),
            )),
        }
    }

    /// Check if an entry is excluded by the ignore set or is our own output
    pub fn should_ignore(&self, path: &Path, is_dir: bool) -> bool {
        let name = path.file_name().unwrap_or_default().to_string_lossy();

        if is_dir {
            return self.ignore.ignores_folder(&name);
        }

        if self.ignore.ignores_file(&name) {
            return true;
        }

        // Don't process the output file itself
        name.starts_with(OUTPUT_PREFIX) || self.output_path.as_deref() == Some(path)
    }

    /// Check if a file should be included based on patterns
    pub fn should_include(&self, path: &Path) -> bool {
        if self.config.include_patterns.is_empty() {
            return true;
        }

        let file_name = path.file_name().unwrap_or_default().to_string_lossy();
        self.config
            .include_patterns
            .iter()
            .any(|pattern| glob_match(pattern, &file_name))
    }

    /// Read the content of a text file and update statistics
    fn read_file_content(&self, path: &Path, report_path: String) -> io::Result<String> {
        let size = fs::metadata(path)?.len();

        if size > MAX_CONTENT_BYTES {
            debug!("skipping content of {} ({} bytes)", path.display(), size);
            self.record(report_path, FileReportInfo::default());
            return Ok(format!(
                "File too large to include content. Size: {}",
                format_file_size(size)
            ));
        }

        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => return Ok(format!("Failed to read file content: {}", e)),
        };

        self.record(
            report_path,
            FileReportInfo {
                lines: content.lines().count(),
                chars: content.chars().count(),
            },
        );
        Ok(content)
    }

    fn record(&self, path: String, info: FileReportInfo) {
        let mut stats = self
            .statistics
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        stats.files_processed += 1;
        stats.total_lines += info.lines;
        stats.total_chars += info.chars;
        stats.file_details.insert(path, info);
    }
}

/// The output file's path with its directory resolved
fn canonical_output_path(output_file: &Path) -> Option<PathBuf> {
    let name = output_file.file_name()?;
    let parent = match output_file.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::canonicalize(parent).ok().map(|dir| dir.join(name))
}

/// Determine the type of a file without following symlinks
pub fn get_file_type(path: &Path) -> io::Result<FileType> {
    let metadata = fs::symlink_metadata(path)?;

    if metadata.file_type().is_symlink() {
        return Ok(FileType::Symlink);
    }
    if metadata.is_dir() {
        return Ok(FileType::Directory);
    }
    if !metadata.is_file() {
        return Ok(FileType::Other);
    }
    if metadata.len() == 0 {
        return Ok(FileType::TextFile);
    }

    let mut buffer = vec![0; SNIFF_BYTES.min(metadata.len() as usize)];
    let bytes_read = File::open(path)?.read(&mut buffer)?;
    buffer.truncate(bytes_read);

    if looks_like_text(&buffer) {
        Ok(FileType::TextFile)
    } else {
        Ok(FileType::BinaryFile)
    }
}

/// Valid UTF-8 with few control characters
fn looks_like_text(sample: &[u8]) -> bool {
    let text: &[u8] = match std::str::from_utf8(sample) {
        Ok(_) => sample,
        // A multi-byte char may be cut at the end of the sample
        Err(e) if e.error_len().is_none() => &sample[..e.valid_up_to()],
        Err(_) => return false,
    };

    if text.is_empty() {
        return true;
    }
    let control = text
        .iter()
        .filter(|&&b| (b < 9) || (b > 13 && b < 32))
        .count();
    (control as f32 / text.len() as f32) < 0.1
}

/// Extract metadata from a file
fn get_metadata(path: &Path) -> io::Result<Metadata> {
    let fs_metadata = fs::symlink_metadata(path)?;

    Ok(Metadata {
        size: fs_metadata.len(),
        modified: fs_metadata.modified()?,
        permissions: permissions_string(&fs_metadata),
    })
}

#[cfg(unix)]
fn permissions_string(metadata: &fs::Metadata) -> String {
    use std::os::unix::fs::PermissionsExt;
    format!("{:o}", metadata.permissions().mode() & 0o777)
}

#[cfg(not(unix))]
fn permissions_string(metadata: &fs::Metadata) -> String {
    if metadata.permissions().readonly() {
        "444".to_string()
    } else {
        "644".to_string()
    }
}
