//! # bsync-schema: Schema Descriptors & Registry
//!
//! Every node type the engine can build is described by a [`TypeDescriptor`]:
//! plain data naming its scalar kind, enumeration literals, union
//! alternatives, ordered child slots, attribute names and optional base type.
//!
//! ## Registry (`registry`)
//!
//! [`SchemaRegistry`] resolves a set of descriptors into an immutable table
//! addressed by [`TypeId`] handles. Name references are resolved once,
//! inheritance is flattened, and the result is shared behind an `Arc` by
//! every node built from it. Key entry point:
//!
//! - [`SchemaRegistry::from_descriptors`]: resolve, check and index.
//!
//! ## Loading (`load`)
//!
//! [`load_registry`] reads descriptor documents from a YAML/JSON file or a
//! directory of them and builds a registry.
//!
//! ## Crate Policy
//!
//! - Depends only on `bsync-core` internally.
//! - Descriptor data is taken as given: the registry checks that references
//!   resolve and that inheritance terminates, nothing more.

pub mod descriptor;
pub mod error;
pub mod load;
pub mod registry;

pub use descriptor::{ChildSpec, Occurs, SchemaDocument, TypeDescriptor};
pub use error::SchemaError;
pub use load::{load_descriptors, load_registry, parse_document, DocumentFormat};
pub use registry::{
    AttributePolicy, ContentModel, RegistryBuilder, ResolvedChild, ResolvedType, SchemaRegistry,
    TypeId,
};
