//! Serialization of node trees into markup.
//!
//! A node becomes an [`Element`] named by the slot it was attached under
//! (or its own element name at the root). Children are emitted slot by slot
//! in declared order, each slot's values in attachment order. Slots that
//! were never attached produce nothing.

use std::fmt;
use std::io::Write;

use bsync_core::{markup, Element, MarkupError, WriteOptions};

use crate::node::Node;

impl Node {
    /// Convert to a markup tree named by the type's element name.
    pub fn to_element(&self) -> Element {
        self.to_element_named(self.node_type.element_name())
    }

    /// Convert to a markup tree with an explicit element name.
    pub fn to_element_named(&self, name: &str) -> Element {
        let mut element = Element::new(name);
        element.text = self.text.clone();
        element.attributes = self.attributes.clone();
        for (slot, values) in self.slots() {
            element
                .children
                .extend(values.iter().map(|value| value.to_element_named(slot)));
        }
        element
    }

    /// Stringify as XML.
    pub fn to_xml_string(&self, options: &WriteOptions) -> Result<String, MarkupError> {
        markup::to_xml_string(&self.to_element(), options)
    }

    /// Write as XML to `out`.
    pub fn write_xml<W: Write>(&self, options: &WriteOptions, out: W) -> Result<(), MarkupError> {
        markup::write_xml(&self.to_element(), options, out)
    }
}

/// Indented XML without a declaration.
impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let options = WriteOptions {
            xml_declaration: false,
            ..WriteOptions::default()
        };
        let xml = self.to_xml_string(&options).map_err(|_| fmt::Error)?;
        f.write_str(&xml)
    }
}
