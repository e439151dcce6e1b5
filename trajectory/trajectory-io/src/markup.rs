//! Hierarchical readable payloads as markup strings.

use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use trajectory_types::HierarchicalReadable;

use crate::error::{IoError, IoResult};

fn xml_error(error: impl std::fmt::Display) -> IoError {
    IoError::invalid_content(format!("XML error: {error}"))
}

/// Serializes one node (and its subtree) into `writer`.
pub(crate) fn write_node<W: std::io::Write>(
    writer: &mut Writer<W>,
    node: &HierarchicalReadable,
) -> IoResult<()> {
    let mut start = BytesStart::new(node.name.as_str());
    for (key, value) in &node.attributes {
        start.push_attribute((key.as_str(), value.as_str()));
    }
    if node.text.is_empty() && node.children.is_empty() {
        writer.write_event(Event::Empty(start)).map_err(xml_error)?;
        return Ok(());
    }
    writer.write_event(Event::Start(start)).map_err(xml_error)?;
    if !node.text.is_empty() {
        writer
            .write_event(Event::Text(BytesText::new(&node.text)))
            .map_err(xml_error)?;
    }
    for child in &node.children {
        write_node(writer, child)?;
    }
    writer
        .write_event(Event::End(BytesEnd::new(node.name.as_str())))
        .map_err(xml_error)?;
    Ok(())
}

/// Serializes a node to a markup string.
///
/// # Errors
///
/// Returns an error if the markup cannot be written.
pub fn to_markup(node: &HierarchicalReadable) -> IoResult<String> {
    let mut writer = Writer::new(Vec::new());
    write_node(&mut writer, node)?;
    Ok(String::from_utf8(writer.into_inner())?)
}

/// Serializes a node wrapped in a synthetic `<root>` element, the form used
/// by the binary readable payload.
pub(crate) fn to_markup_wrapped(node: &HierarchicalReadable) -> IoResult<String> {
    let mut writer = Writer::new(Vec::new());
    writer
        .write_event(Event::Start(BytesStart::new("root")))
        .map_err(xml_error)?;
    write_node(&mut writer, node)?;
    writer
        .write_event(Event::End(BytesEnd::new("root")))
        .map_err(xml_error)?;
    Ok(String::from_utf8(writer.into_inner())?)
}

fn node_from_start(element: &BytesStart<'_>) -> IoResult<HierarchicalReadable> {
    let mut node =
        HierarchicalReadable::new(String::from_utf8_lossy(element.local_name().as_ref()));
    for attribute in element.attributes() {
        let attribute = attribute.map_err(xml_error)?;
        let key = String::from_utf8_lossy(attribute.key.as_ref()).into_owned();
        let value = attribute.unescape_value().map_err(xml_error)?.into_owned();
        node.attributes.push((key, value));
    }
    Ok(node)
}

/// Parses a markup string holding exactly one root element.
///
/// # Errors
///
/// Returns an error if the markup is malformed or does not hold exactly
/// one root element.
pub fn parse_markup(text: &str) -> IoResult<HierarchicalReadable> {
    let mut reader = Reader::from_str(text);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<HierarchicalReadable> = Vec::new();
    let mut root: Option<HierarchicalReadable> = None;
    loop {
        match reader.read_event() {
            Ok(Event::Start(element)) => stack.push(node_from_start(&element)?),
            Ok(Event::Empty(element)) => {
                let node = node_from_start(&element)?;
                attach(&mut stack, &mut root, node)?;
            }
            Ok(Event::Text(content)) => {
                if let Some(top) = stack.last_mut() {
                    top.text.push_str(&content.unescape().map_err(xml_error)?);
                }
            }
            Ok(Event::End(_)) => {
                let node = stack
                    .pop()
                    .ok_or_else(|| IoError::invalid_content("unbalanced markup end tag"))?;
                attach(&mut stack, &mut root, node)?;
            }
            Ok(Event::Eof) => break,
            Err(error) => return Err(xml_error(error)),
            _ => {}
        }
    }
    if !stack.is_empty() {
        return Err(IoError::invalid_content("unclosed markup element"));
    }
    root.ok_or_else(|| IoError::invalid_content("markup payload has no root element"))
}

fn attach(
    stack: &mut [HierarchicalReadable],
    root: &mut Option<HierarchicalReadable>,
    node: HierarchicalReadable,
) -> IoResult<()> {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(node);
    } else if root.is_none() {
        *root = Some(node);
    } else {
        return Err(IoError::invalid_content(
            "markup payload has more than one root element",
        ));
    }
    Ok(())
}
