//! # Error Types: Structured Error Hierarchy
//!
//! Defines the error types used throughout bsync. All errors use `thiserror`
//! for derive-based `Display` and `Error` implementations.
//!
//! ## Design
//!
//! - Every node error names the node type it was raised on.
//! - Type errors carry expected vs. actual.
//! - There is no recovery path inside the engine: each variant reports a
//!   defect in the calling code or in the schema descriptor.

use thiserror::Error;

use crate::scalar::ScalarKind;

/// Top-level error type for bsync.
#[derive(Error, Debug)]
pub enum BsyncError {
    /// A node operation was rejected.
    #[error("node error: {0}")]
    Node(#[from] NodeError),

    /// A scalar value could not be formatted.
    #[error("scalar error: {0}")]
    Scalar(#[from] ScalarError),

    /// Markup could not be written.
    #[error("markup error: {0}")]
    Markup(#[from] MarkupError),

    /// Schema descriptors could not be loaded or resolved.
    ///
    /// Boxed because the schema error type lives downstream of this crate;
    /// downcast to recover the structured variant.
    #[error("schema error: {0}")]
    Schema(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Error while formatting a scalar value for a declared kind.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScalarError {
    /// The value's runtime type does not belong to the kind's value family.
    #[error("{expected} expected, got {found}")]
    TypeMismatch {
        /// The declared scalar kind.
        expected: ScalarKind,
        /// Runtime type name of the supplied value.
        found: &'static str,
    },

    /// The value has the right type but lies outside the kind's range.
    #[error("{value} is out of range for {kind}")]
    OutOfRange {
        /// The declared scalar kind.
        kind: ScalarKind,
        /// The offending value, rendered for diagnostics.
        value: String,
    },
}

/// Error raised by node construction, mutation, or access.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum NodeError {
    /// Wrong number of positional arguments for a scalar, enumerated, or union node.
    #[error("{type_name}: expected at most one value, got {given}")]
    Arity {
        /// Node type name.
        type_name: String,
        /// Number of positional arguments supplied.
        given: usize,
    },

    /// A value's runtime type does not match the declared scalar kind or child type.
    #[error("{type_name}: {expected} expected, got {found}")]
    TypeMismatch {
        /// Node type name.
        type_name: String,
        /// What the descriptor declares.
        expected: String,
        /// What was supplied.
        found: String,
    },

    /// A value is not one of the declared enumeration literals.
    #[error("{type_name}: invalid enumeration {value:?}, expected one of: {}", .allowed.join(", "))]
    Enumeration {
        /// Node type name.
        type_name: String,
        /// The rejected value.
        value: String,
        /// Declared literals, in schema order.
        allowed: Vec<String>,
    },

    /// No union alternative accepted the value.
    #[error("{type_name}: {value} is not accepted by any of: {}", .alternatives.join(", "))]
    InvalidUnionValue {
        /// Node type name.
        type_name: String,
        /// The rejected value.
        value: String,
        /// Alternative type names, in the order they were tried.
        alternatives: Vec<String>,
    },

    /// A value has the right type but lies outside the declared range.
    #[error("{type_name}: {reason}")]
    OutOfRange {
        /// Node type name.
        type_name: String,
        /// Range violation description.
        reason: String,
    },

    /// A scalar value was given where only child nodes are legal.
    #[error("{type_name}: scalar value {value} is not a valid child")]
    InvalidChild {
        /// Node type name.
        type_name: String,
        /// The rejected value.
        value: String,
    },

    /// A child node's type matches none of the declared child slots.
    #[error("{type_name}: unexpected child {child_type}, expecting one of: {}", .expected.join(", "))]
    UnrecognizedChild {
        /// Parent node type name.
        type_name: String,
        /// The rejected child's type name.
        child_type: String,
        /// Declared child type names, in schema order.
        expected: Vec<String>,
    },

    /// A child name is not declared for this node type.
    #[error("{type_name} has no child {name:?}")]
    UnknownChildName {
        /// Node type name.
        type_name: String,
        /// The requested child name.
        name: String,
    },

    /// A declared child was read before anything was attached to it.
    #[error("{type_name}: child {name:?} not set")]
    ChildNotSet {
        /// Node type name.
        type_name: String,
        /// The requested child name.
        name: String,
    },

    /// An attribute was read before it was set.
    #[error("{type_name}: attribute {key:?} not set")]
    MissingAttribute {
        /// Node type name.
        type_name: String,
        /// The requested attribute key.
        key: String,
    },

    /// An attribute key is not declared and the registry enforces attribute names.
    #[error("{type_name}: unknown attribute {key:?}, expecting one of: {}", .allowed.join(", "))]
    UnknownAttribute {
        /// Node type name.
        type_name: String,
        /// The rejected attribute key.
        key: String,
        /// Declared attribute names.
        allowed: Vec<String>,
    },

    /// A single-assignment slot (text, a mutator-set child, or a `once` child) was written twice.
    #[error("{type_name}: {slot:?} already set")]
    AlreadySet {
        /// Node type name.
        type_name: String,
        /// `"text"` or the child name.
        slot: String,
    },

    /// Text and children were both requested on one node.
    #[error("{type_name}: a node holds either text or children, not both")]
    MixedContent {
        /// Node type name.
        type_name: String,
    },

    /// Parent and child were built from different registries.
    #[error("{type_name}: child {child_type} belongs to a different schema registry")]
    ForeignRegistry {
        /// Parent node type name.
        type_name: String,
        /// Child node type name.
        child_type: String,
    },

    /// A type name is not declared in the registry.
    #[error("unknown node type {name:?}")]
    UnknownType {
        /// The requested type name.
        name: String,
    },
}

impl NodeError {
    /// Attach a node type name to a scalar formatting error.
    pub fn from_scalar(type_name: &str, err: ScalarError) -> Self {
        match err {
            ScalarError::TypeMismatch { expected, found } => NodeError::TypeMismatch {
                type_name: type_name.to_string(),
                expected: expected.to_string(),
                found: found.to_string(),
            },
            e @ ScalarError::OutOfRange { .. } => NodeError::OutOfRange {
                type_name: type_name.to_string(),
                reason: e.to_string(),
            },
        }
    }

    /// Returns true when the error means "this type does not accept the value".
    ///
    /// Union resolution moves on to the next alternative on these errors and
    /// propagates every other error unchanged.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            NodeError::TypeMismatch { .. }
                | NodeError::Enumeration { .. }
                | NodeError::InvalidUnionValue { .. }
                | NodeError::OutOfRange { .. }
                | NodeError::InvalidChild { .. }
        )
    }
}

/// Error while writing a markup tree.
#[derive(Error, Debug)]
pub enum MarkupError {
    /// The XML writer failed.
    #[error("xml write failed: {0}")]
    Write(String),

    /// The written bytes were not valid UTF-8.
    #[error("xml output is not valid UTF-8: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_type_mismatch_maps_to_node_type_mismatch() {
        let err = NodeError::from_scalar(
            "HistoricalLandmark",
            ScalarError::TypeMismatch {
                expected: ScalarKind::Boolean,
                found: "integer",
            },
        );
        assert_eq!(
            err,
            NodeError::TypeMismatch {
                type_name: "HistoricalLandmark".into(),
                expected: "boolean".into(),
                found: "integer".into(),
            }
        );
        assert!(err.is_rejection());
    }

    #[test]
    fn test_scalar_out_of_range_keeps_reason() {
        let err = NodeError::from_scalar(
            "NumberOfBusinesses",
            ScalarError::OutOfRange {
                kind: ScalarKind::NonNegativeInteger,
                value: "-1".into(),
            },
        );
        match err {
            NodeError::OutOfRange { type_name, reason } => {
                assert_eq!(type_name, "NumberOfBusinesses");
                assert!(reason.contains("-1"));
                assert!(reason.contains("non-negative integer"));
            }
            other => panic!("expected OutOfRange, got {other:?}"),
        }
    }

    #[test]
    fn test_arity_and_already_set_are_not_rejections() {
        let arity = NodeError::Arity {
            type_name: "Story".into(),
            given: 2,
        };
        let already = NodeError::AlreadySet {
            type_name: "Story".into(),
            slot: "text".into(),
        };
        assert!(!arity.is_rejection());
        assert!(!already.is_rejection());
    }

    #[test]
    fn test_unrecognized_child_lists_expected_types() {
        let err = NodeError::UnrecognizedChild {
            type_name: "Facilities".into(),
            child_type: "Sites".into(),
            expected: vec!["Facilities.Facility".into()],
        };
        let msg = err.to_string();
        assert!(msg.contains("expecting one of: Facilities.Facility"));
    }

    #[test]
    fn test_bsync_error_wraps_node_error() {
        let err: BsyncError = NodeError::UnknownType {
            name: "Nope".into(),
        }
        .into();
        assert!(err.to_string().starts_with("node error:"));
    }
}
