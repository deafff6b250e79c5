//! # Markup Tree: Generic Ordered Elements and the XML Writer
//!
//! `Element` is the serializer's output: an element name, optional text,
//! attributes in insertion order, and child elements in document order. It
//! carries no schema knowledge.
//!
//! ## Writing
//!
//! [`write_xml`] streams a tree through `quick-xml`. Text and attribute
//! values are escaped by the writer. Elements with neither text nor children
//! are written self-closing (`<WeatherDataStationID IDref="an-id"/>`).
//! With `indent > 0` every child element starts on its own line; elements
//! holding text stay on one line.

use std::io::Write;

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use serde::{Deserialize, Serialize};

use crate::error::MarkupError;

/// One element of a generic markup tree.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Element {
    /// Element name.
    pub name: String,
    /// Text content, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Attributes as key/value pairs, in the order they were set.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<(String, String)>,
    /// Child elements in document order.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Element>,
}

impl Element {
    /// Create an empty element.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Builder form: set the text content.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Builder form: append an attribute.
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((key.into(), value.into()));
        self
    }

    /// Builder form: append a child element.
    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(child);
        self
    }

    /// Look up an attribute value by key.
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// The first child element with the given name.
    pub fn find(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.name == name)
    }

    /// All child elements with the given name, in document order.
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.children.iter().filter(move |c| c.name == name)
    }

    /// Returns true if the element has neither text nor children.
    pub fn is_empty(&self) -> bool {
        self.text.is_none() && self.children.is_empty()
    }
}

/// Options for stringifying a markup tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WriteOptions {
    /// Spaces per nesting level; `0` writes everything on one line.
    pub indent: usize,
    /// Emit `<?xml version="1.0" encoding="UTF-8"?>` first.
    pub xml_declaration: bool,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            indent: 2,
            xml_declaration: true,
        }
    }
}

impl WriteOptions {
    /// Single-line output without declaration.
    pub fn compact() -> Self {
        Self {
            indent: 0,
            xml_declaration: false,
        }
    }
}

/// Write `element` as XML to `out`.
///
/// # Errors
///
/// Returns `MarkupError::Write` if the underlying writer fails.
pub fn write_xml<W: Write>(
    element: &Element,
    options: &WriteOptions,
    out: W,
) -> Result<(), MarkupError> {
    let mut writer = if options.indent > 0 {
        Writer::new_with_indent(out, b' ', options.indent)
    } else {
        Writer::new(out)
    };

    if options.xml_declaration {
        emit(
            &mut writer,
            Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)),
        )?;
    }
    write_element(&mut writer, element)
}

/// Stringify `element` as XML.
///
/// # Errors
///
/// Returns `MarkupError` if writing fails or the output is not UTF-8.
pub fn to_xml_string(element: &Element, options: &WriteOptions) -> Result<String, MarkupError> {
    let mut buf = Vec::new();
    write_xml(element, options, &mut buf)?;
    Ok(String::from_utf8(buf)?)
}

fn write_element<W: Write>(writer: &mut Writer<W>, element: &Element) -> Result<(), MarkupError> {
    let mut start = BytesStart::new(element.name.as_str());
    for (key, value) in &element.attributes {
        start.push_attribute((key.as_str(), value.as_str()));
    }

    if element.is_empty() {
        return emit(writer, Event::Empty(start));
    }

    emit(writer, Event::Start(start))?;
    if let Some(text) = &element.text {
        emit(writer, Event::Text(BytesText::new(text)))?;
    }
    for child in &element.children {
        write_element(writer, child)?;
    }
    emit(writer, Event::End(BytesEnd::new(element.name.as_str())))
}

fn emit<W: Write>(writer: &mut Writer<W>, event: Event<'_>) -> Result<(), MarkupError> {
    writer
        .write_event(event)
        .map_err(|e| MarkupError::Write(e.to_string()))
}
