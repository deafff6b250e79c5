//! # bsync-node: The Node Engine
//!
//! Builds typed document trees against a [`SchemaRegistry`] and serializes
//! them in schema order. Every node type shares the same engine; the
//! registry supplies the per-type data.
//!
//! ## Construction (`construct`)
//!
//! [`NodeType::construct`] dispatches on the type's content model:
//! enumeration, union, scalar leaf, or composite. Leaf values are formatted
//! to their canonical text immediately; composite arguments go through the
//! composition operator.
//!
//! ## Nodes (`node`)
//!
//! [`Node`] holds text or children (never both) plus attributes. Children
//! are kept per declared slot, so serialization order is the schema's
//! regardless of the order nodes were attached in.
//!
//! ## Serialization (`serialize`)
//!
//! [`Node::to_element`] produces a generic [`bsync_core::Element`] tree;
//! [`Node::to_xml_string`] writes it as XML.
//!
//! ```
//! use std::sync::Arc;
//! use bsync_core::{ScalarKind, WriteOptions};
//! use bsync_node::NodeType;
//! use bsync_schema::{SchemaRegistry, TypeDescriptor};
//!
//! let registry = Arc::new(SchemaRegistry::from_descriptors([
//!     TypeDescriptor::composite("Sections").child("Section", "Section"),
//!     TypeDescriptor::composite("Sections.Section").child("Story", "Story"),
//!     TypeDescriptor::scalar("Sections.Section.Story", ScalarKind::Integer),
//! ])?);
//!
//! let story = NodeType::new(&registry, "Sections.Section.Story")?.value(1)?;
//! let section = NodeType::new(&registry, "Sections.Section")?.with_children([story])?;
//! assert_eq!(
//!     section.to_xml_string(&WriteOptions::compact())?,
//!     "<Section><Story>1</Story></Section>"
//! );
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! [`SchemaRegistry`]: bsync_schema::SchemaRegistry

pub mod construct;
pub mod node;
pub mod serialize;

pub use construct::{resolve_union, Argument, UnionResolution};
pub use node::{ChildRef, Node, NodeType};
