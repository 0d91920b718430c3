/*!
 * XML output
 */

use std::io::{self, Write};

use chrono::Local;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use crate::error::{CtxError, Result};
use crate::types::{BinaryNode, DirectoryNode, FileNode, Metadata, Node, SymlinkNode};

/// Render the tree as an XML document
pub fn render_xml(root: &DirectoryNode, project_types: &[String]) -> Result<String> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
    write_document(&mut writer, root, project_types)?;
    String::from_utf8(writer.into_inner())
        .map_err(|e| CtxError::Writer(format!("XML output is not UTF-8: {}", e)))
}

fn write_document<W: Write>(
    writer: &mut Writer<W>,
    root: &DirectoryNode,
    project_types: &[String],
) -> io::Result<()> {
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

    let mut start_tag = BytesStart::new("directory_scan");
    let timestamp = Local::now().to_rfc3339();
    start_tag.push_attribute(("timestamp", timestamp.as_str()));
    writer.write_event(Event::Start(start_tag))?;

    write_system_info(writer)?;

    writer.write_event(Event::Start(BytesStart::new("project_types")))?;
    for name in project_types {
        write_text_element(writer, "type", name)?;
    }
    writer.write_event(Event::End(BytesEnd::new("project_types")))?;

    write_directory(root, writer)?;

    writer.write_event(Event::End(BytesEnd::new("directory_scan")))?;
    Ok(())
}

fn write_text_element<W: Write>(writer: &mut Writer<W>, name: &str, text: &str) -> io::Result<()> {
    writer.write_event(Event::Start(BytesStart::new(name)))?;
    writer.write_event(Event::Text(BytesText::new(text)))?;
    writer.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}

fn write_system_info<W: Write>(writer: &mut Writer<W>) -> io::Result<()> {
    writer.write_event(Event::Start(BytesStart::new("system_info")))?;

    let hostname = hostname::get()
        .map(|h| h.to_string_lossy().to_string())
        .unwrap_or_else(|_| "unknown".to_string());
    write_text_element(writer, "hostname", &hostname)?;
    write_text_element(writer, "os", std::env::consts::OS)?;
    write_text_element(writer, "family", std::env::consts::FAMILY)?;

    writer.write_event(Event::End(BytesEnd::new("system_info")))?;
    Ok(())
}

fn open_node<W: Write>(
    writer: &mut Writer<W>,
    tag: &str,
    name: &str,
    path: &std::path::Path,
) -> io::Result<()> {
    let mut start_tag = BytesStart::new(tag);
    start_tag.push_attribute(("name", name));
    start_tag.push_attribute(("path", path.to_string_lossy().as_ref()));
    writer.write_event(Event::Start(start_tag))?;
    Ok(())
}

fn write_directory<W: Write>(dir: &DirectoryNode, writer: &mut Writer<W>) -> io::Result<()> {
    open_node(writer, "directory", &dir.name, &dir.path)?;
    write_metadata(&dir.metadata, writer)?;

    writer.write_event(Event::Start(BytesStart::new("contents")))?;
    for node in &dir.contents {
        match node {
            Node::Directory(dir_node) => write_directory(dir_node, writer)?,
            Node::File(file_node) => write_file(file_node, writer)?,
            Node::Binary(bin_node) => write_binary(bin_node, writer)?,
            Node::Symlink(sym_node) => write_symlink(sym_node, writer)?,
        }
    }
    writer.write_event(Event::End(BytesEnd::new("contents")))?;

    writer.write_event(Event::End(BytesEnd::new("directory")))?;
    Ok(())
}

fn write_file<W: Write>(file: &FileNode, writer: &mut Writer<W>) -> io::Result<()> {
    open_node(writer, "file", &file.name, &file.path)?;
    write_metadata(&file.metadata, writer)?;
    write_text_element(writer, "content", file.content.as_deref().unwrap_or_default())?;
    writer.write_event(Event::End(BytesEnd::new("file")))?;
    Ok(())
}

fn write_binary<W: Write>(binary: &BinaryNode, writer: &mut Writer<W>) -> io::Result<()> {
    open_node(writer, "binary", &binary.name, &binary.path)?;
    write_metadata(&binary.metadata, writer)?;
    writer.write_event(Event::End(BytesEnd::new("binary")))?;
    Ok(())
}

fn write_symlink<W: Write>(symlink: &SymlinkNode, writer: &mut Writer<W>) -> io::Result<()> {
    open_node(writer, "symlink", &symlink.name, &symlink.path)?;
    write_metadata(&symlink.metadata, writer)?;
    write_text_element(writer, "target", &symlink.target)?;
    writer.write_event(Event::End(BytesEnd::new("symlink")))?;
    Ok(())
}

fn write_metadata<W: Write>(metadata: &Metadata, writer: &mut Writer<W>) -> io::Result<()> {
    writer.write_event(Event::Start(BytesStart::new("metadata")))?;

    write_text_element(writer, "size", &metadata.size.to_string())?;
    let modified = chrono::DateTime::<Local>::from(metadata.modified).to_rfc3339();
    write_text_element(writer, "modified", &modified)?;
    write_text_element(writer, "permissions", &metadata.permissions)?;

    writer.write_event(Event::End(BytesEnd::new("metadata")))?;
    Ok(())
}
