//! Errors raised while loading descriptor documents and building a registry.

use bsync_core::BsyncError;
use thiserror::Error;

/// Error during descriptor loading or registry resolution.
#[derive(Error, Debug)]
pub enum SchemaError {
    /// A descriptor document could not be read or parsed.
    #[error("document load error for '{path}': {reason}")]
    DocumentLoad {
        /// Path to the document that failed to load.
        path: String,
        /// Reason the document could not be loaded.
        reason: String,
    },

    /// Two descriptors share one type name.
    #[error("duplicate type '{name}'")]
    DuplicateType {
        /// The repeated type name.
        name: String,
    },

    /// One descriptor declares the same child name twice.
    #[error("type '{type_name}' declares child '{child}' more than once")]
    DuplicateChild {
        /// Declaring type.
        type_name: String,
        /// The repeated child name.
        child: String,
    },

    /// A child type, union alternative or base names no known type.
    #[error("type '{type_name}' refers to unknown type '{reference}'")]
    UnresolvedType {
        /// Declaring type.
        type_name: String,
        /// The unresolved reference.
        reference: String,
    },

    /// Following `base` links from this type returns to it.
    #[error("inheritance cycle through type '{type_name}'")]
    InheritanceCycle {
        /// A type on the cycle.
        type_name: String,
    },

    /// Union alternatives refer back to the union itself.
    #[error("union cycle through type '{type_name}'")]
    UnionCycle {
        /// A type on the cycle.
        type_name: String,
    },

    /// IO error reading descriptor files.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<SchemaError> for BsyncError {
    fn from(err: SchemaError) -> Self {
        BsyncError::Schema(Box::new(err))
    }
}
