/*!
 * JSON output
 */

use chrono::Local;
use serde::Serialize;

use crate::error::Result;
use crate::types::DirectoryNode;

#[derive(Serialize)]
struct JsonDump<'a> {
    generated_at: String,
    project_types: &'a [String],
    root: &'a DirectoryNode,
}

/// Render the tree as pretty-printed JSON
pub fn render_json(root: &DirectoryNode, project_types: &[String]) -> Result<String> {
    let dump = JsonDump {
        generated_at: Local::now().to_rfc3339(),
        project_types,
        root,
    };
    Ok(serde_json::to_string_pretty(&dump)?)
}
