//! In-memory XML document model.
//!
//! Tally exports are small enough to materialize fully, so the reader builds
//! a plain element tree and the extractor queries it with a handful of
//! path-like helpers (`child`, `find_descendant`, `descendants`).

mod reader;

pub use reader::decode_text;

use crate::error::XmlError;

/// Result type for XML operations.
pub type Result<T> = std::result::Result<T, XmlError>;

/// A parsed XML document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    root: Element,
}

impl Document {
    /// Parse a document from text.
    pub fn parse(text: &str) -> Result<Self> {
        let root = reader::read_tree(text)?;
        Ok(Self { root })
    }

    /// Parse a document from raw bytes, honouring UTF-8 and UTF-16 byte order marks.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let text = decode_text(bytes)?;
        Self::parse(&text)
    }

    /// The document element.
    pub fn root(&self) -> &Element {
        &self.root
    }
}

/// A single element with its text content and child elements.
///
/// Attributes are not retained; nothing in a voucher export is read from them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
    name: String,
    text: String,
    children: Vec<Element>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Append a child element.
    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(child);
        self
    }

    /// Set the element's text content.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn children(&self) -> &[Element] {
        &self.children
    }

    /// Trimmed text content, or `None` when the element has no text.
    pub fn text(&self) -> Option<&str> {
        let trimmed = self.text.trim();
        (!trimmed.is_empty()).then_some(trimmed)
    }

    /// First direct child with the given name.
    pub fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.name == name)
    }

    /// Text of the first direct child with the given name.
    pub fn child_text(&self, name: &str) -> Option<&str> {
        self.child(name).and_then(Element::text)
    }

    /// First descendant (document order, excluding `self`) with the given name.
    pub fn find_descendant(&self, name: &str) -> Option<&Element> {
        self.descendants(name).next()
    }

    /// All descendants with the given name, in document order, excluding `self`.
    pub fn descendants<'n>(&self, name: &'n str) -> Descendants<'_, 'n> {
        Descendants {
            name,
            stack: vec![self.children.iter()],
        }
    }

    pub(crate) fn push_text(&mut self, text: &str) {
        self.text.push_str(text);
    }

    pub(crate) fn push_child(&mut self, child: Element) {
        self.children.push(child);
    }
}

/// Pre-order iterator over named descendants.
pub struct Descendants<'a, 'n> {
    name: &'n str,
    stack: Vec<std::slice::Iter<'a, Element>>,
}

impl<'a> Iterator for Descendants<'a, '_> {
    type Item = &'a Element;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let level = self.stack.last_mut()?;
            match level.next() {
                Some(element) => {
                    self.stack.push(element.children.iter());
                    if element.name == self.name {
                        return Some(element);
                    }
                }
                None => {
                    self.stack.pop();
                }
            }
        }
    }
}
