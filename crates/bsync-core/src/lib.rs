//! # bsync-core: Foundational Types for bsync
//!
//! This crate is the leaf of the bsync workspace. It defines the value-level
//! primitives that every schema-derived node type is parameterized by, and
//! the generic markup tree that nodes serialize into.
//!
//! ## Key Design Principles
//!
//! 1. **One closed set of scalar kinds.** `ScalarKind` has eleven variants,
//!    one per leaf value family the schema can declare. Formatting a value
//!    is an exhaustive `match`, so adding a kind forces every renderer to
//!    handle it.
//!
//! 2. **Canonical text is produced once.** `ScalarKind::format()` is the only
//!    path from a typed `ScalarValue` to the text stored on a node. Nodes keep
//!    the formatted string, never the original typed value.
//!
//! 3. **Markup is generic.** `Element` knows nothing about schemas. It is an
//!    ordered name/text/attributes/children tree that the XML writer in
//!    [`markup`] stringifies with `quick-xml`.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `bsync-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod error;
pub mod markup;
pub mod scalar;
pub mod temporal;

// Re-export primary types for ergonomic imports.
pub use error::{BsyncError, MarkupError, NodeError, ScalarError};
pub use markup::{to_xml_string, write_xml, Element, WriteOptions};
pub use scalar::{ScalarKind, ScalarValue};
