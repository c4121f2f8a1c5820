//! Tree construction on top of the `quick-xml` event reader.

use std::borrow::Cow;

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;
use tracing::trace;

use super::{Element, Result};
use crate::error::XmlError;

/// Decode raw export bytes into text.
///
/// Tally writes exports as UTF-16 with a byte order mark on some installs,
/// and as UTF-8 (optionally with a BOM) on others.
pub fn decode_text(bytes: &[u8]) -> Result<Cow<'_, str>> {
    match bytes {
        [0xEF, 0xBB, 0xBF, rest @ ..] => decode_utf8(rest),
        [0xFF, 0xFE, rest @ ..] => decode_utf16(rest, u16::from_le_bytes).map(Cow::Owned),
        [0xFE, 0xFF, rest @ ..] => decode_utf16(rest, u16::from_be_bytes).map(Cow::Owned),
        _ => decode_utf8(bytes),
    }
}

fn decode_utf8(bytes: &[u8]) -> Result<Cow<'_, str>> {
    std::str::from_utf8(bytes)
        .map(Cow::Borrowed)
        .map_err(|e| XmlError::Encoding(e.to_string()))
}

fn decode_utf16(bytes: &[u8], unit: fn([u8; 2]) -> u16) -> Result<String> {
    if bytes.len() % 2 != 0 {
        return Err(XmlError::Encoding("odd number of bytes in UTF-16 input".to_string()));
    }

    let units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|pair| unit([pair[0], pair[1]]))
        .collect();

    String::from_utf16(&units).map_err(|e| XmlError::Encoding(e.to_string()))
}

/// Read the whole input and return the document element.
pub(super) fn read_tree(text: &str) -> Result<Element> {
    let mut reader = Reader::from_str(text);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        let event = reader.read_event().map_err(|e| XmlError::Malformed {
            position: reader.error_position() as u64,
            message: e.to_string(),
        })?;

        match event {
            Event::Start(start) => {
                stack.push(Element::new(element_name(&start)));
            }
            Event::Empty(start) => {
                let element = Element::new(element_name(&start));
                attach(element, &mut stack, &mut root, reader.buffer_position() as u64)?;
            }
            Event::End(_) => {
                // quick-xml verifies that end tags match their start tags.
                let Some(element) = stack.pop() else {
                    return Err(XmlError::Malformed {
                        position: reader.buffer_position() as u64,
                        message: "unexpected closing tag".to_string(),
                    });
                };
                attach(element, &mut stack, &mut root, reader.buffer_position() as u64)?;
            }
            Event::Text(content) => {
                if let Some(current) = stack.last_mut() {
                    let unescaped = content.unescape().map_err(|e| XmlError::Malformed {
                        position: reader.buffer_position() as u64,
                        message: e.to_string(),
                    })?;
                    current.push_text(&unescaped);
                }
            }
            Event::CData(data) => {
                if let Some(current) = stack.last_mut() {
                    current.push_text(&String::from_utf8_lossy(&data.into_inner()));
                }
            }
            Event::Eof => break,
            // Declarations, comments, processing instructions and doctypes carry no voucher data.
            _ => {}
        }
    }

    if let Some(open) = stack.pop() {
        return Err(XmlError::Unclosed(open.name));
    }

    let root = root.ok_or(XmlError::NoRoot)?;
    trace!("Parsed document with root <{}>", root.name());
    Ok(root)
}

fn element_name(start: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(start.name().as_ref()).into_owned()
}

fn attach(
    element: Element,
    stack: &mut [Element],
    root: &mut Option<Element>,
    position: u64,
) -> Result<()> {
    if let Some(parent) = stack.last_mut() {
        parent.push_child(element);
        return Ok(());
    }

    if root.is_some() {
        return Err(XmlError::Malformed {
            position,
            message: format!("second top-level element <{}>", element.name),
        });
    }

    *root = Some(element);
    Ok(())
}
