/*!
 * Core types for the scanned project tree
 */

use std::path::PathBuf;
use std::time::SystemTime;

use chrono::{DateTime, Local};
use serde::{Serialize, Serializer};

/// Represents different types of filesystem entries
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileType {
    /// Text file with readable content
    TextFile,
    /// Binary file (non-text)
    BinaryFile,
    /// Symbolic link to another file
    Symlink,
    /// Directory containing other entries
    Directory,
    /// Other file types
    Other,
}

/// Metadata about a filesystem entry
#[derive(Debug, Clone, Serialize)]
pub struct Metadata {
    /// Size in bytes
    pub size: u64,
    /// Last modification time
    #[serde(serialize_with = "serialize_time")]
    pub modified: SystemTime,
    /// File permissions in octal format
    pub permissions: String,
}

/// Represents a directory in the file system
#[derive(Debug, Clone, Serialize)]
pub struct DirectoryNode {
    /// Directory name
    pub name: String,
    /// Relative path from scan root
    pub path: PathBuf,
    /// Directory metadata
    pub metadata: Metadata,
    /// Directory contents
    pub contents: Vec<Node>,
}

impl DirectoryNode {
    /// Visit every text file below this directory, depth first
    pub fn files(&self) -> Vec<&FileNode> {
        let mut files = Vec::new();
        self.collect_files(&mut files);
        files
    }

    fn collect_files<'a>(&'a self, out: &mut Vec<&'a FileNode>) {
        for node in &self.contents {
            match node {
                Node::Directory(dir) => dir.collect_files(out),
                Node::File(file) => out.push(file),
                Node::Binary(_) | Node::Symlink(_) => {}
            }
        }
    }
}

/// Represents a text file
#[derive(Debug, Clone, Serialize)]
pub struct FileNode {
    /// File name
    pub name: String,
    /// Relative path from scan root
    pub path: PathBuf,
    /// File metadata
    pub metadata: Metadata,
    /// File content (a placeholder message if too large)
    pub content: Option<String>,
}

/// Represents a binary file
#[derive(Debug, Clone, Serialize)]
pub struct BinaryNode {
    /// File name
    pub name: String,
    /// Relative path from scan root
    pub path: PathBuf,
    /// File metadata
    pub metadata: Metadata,
}

/// Represents a symbolic link
#[derive(Debug, Clone, Serialize)]
pub struct SymlinkNode {
    /// Link name
    pub name: String,
    /// Relative path from scan root
    pub path: PathBuf,
    /// Link metadata
    pub metadata: Metadata,
    /// Target of the symlink
    pub target: String,
}

/// A generic filesystem node
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Node {
    /// Directory node
    Directory(DirectoryNode),
    /// Text file node
    File(FileNode),
    /// Binary file node
    Binary(BinaryNode),
    /// Symbolic link node
    Symlink(SymlinkNode),
}

impl Node {
    /// Entry name
    pub fn name(&self) -> &str {
        match self {
            Node::Directory(n) => &n.name,
            Node::File(n) => &n.name,
            Node::Binary(n) => &n.name,
            Node::Symlink(n) => &n.name,
        }
    }
}

fn serialize_time<S: Serializer>(time: &SystemTime, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&DateTime::<Local>::from(*time).to_rfc3339())
}
