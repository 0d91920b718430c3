/*!
 * Output writers for the scanned project tree
 *
 * Every format renders to a string first so the same text can go to a
 * file, stdout or the clipboard.
 */

mod json;
mod markdown;
mod tree;
mod xml;

use std::path::Path;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumProperty, EnumString};

use crate::edit::write_atomic;
use crate::error::Result;
use crate::types::DirectoryNode;

pub use json::render_json;
pub use markdown::{fence_for, render_markdown};
pub use tree::render_tree;
pub use xml::render_xml;

/// Supported output formats
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    EnumIter,
    EnumString,
    Display,
    EnumProperty,
    ValueEnum,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Directory tree followed by fenced file blocks
    #[default]
    #[strum(props(extension = "md"))]
    Markdown,
    /// Structured XML with metadata
    #[strum(props(extension = "xml"))]
    Xml,
    /// The tree serialized as JSON
    #[strum(props(extension = "json"))]
    Json,
}

impl OutputFormat {
    /// File extension for the default output name
    pub fn extension(&self) -> &'static str {
        self.get_str("extension").unwrap_or("txt")
    }
}

/// Renders a scanned tree in the configured format
#[derive(Debug, Clone, Default)]
pub struct OutputWriter {
    format: OutputFormat,
    project_types: Vec<String>,
}

impl OutputWriter {
    /// Create a writer for the given format
    pub fn new(format: OutputFormat) -> Self {
        Self {
            format,
            project_types: Vec::new(),
        }
    }

    /// Record detected project types in the output header
    pub fn with_project_types(mut self, project_types: Vec<String>) -> Self {
        self.project_types = project_types;
        self
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Render the tree to a string
    pub fn render(&self, root: &DirectoryNode) -> Result<String> {
        match self.format {
            OutputFormat::Markdown => Ok(render_markdown(root, &self.project_types)),
            OutputFormat::Xml => render_xml(root, &self.project_types),
            OutputFormat::Json => render_json(root, &self.project_types),
        }
    }

    /// Render the tree and write it to `path`, returning the rendered text
    pub fn write(&self, root: &DirectoryNode, path: &Path) -> Result<String> {
        let text = self.render(root)?;
        write_atomic(path, text.as_bytes())?;
        Ok(text)
    }
}
