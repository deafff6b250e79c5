//! # Construction Dispatcher
//!
//! Turns positional arguments into a node's content. Dispatch follows the
//! type's [`ContentModel`]:
//!
//! - **Enumeration**: at most one string argument, equal to a declared literal.
//! - **Union**: at most one argument, resolved by trying each alternative in
//!   declared order (see [`resolve_union`]).
//! - **Scalar**: at most one argument of the kind's value family, formatted
//!   to canonical text.
//! - **Composite**: any number of node arguments, each attached through the
//!   composition operator.
//!
//! Zero arguments always yield an empty node.

use bsync_core::{NodeError, ScalarValue};
use bsync_schema::{ContentModel, SchemaRegistry, TypeId};
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Utc};

use crate::node::{Node, NodeType};

/// One positional construction argument.
#[derive(Debug, Clone, PartialEq)]
pub enum Argument {
    /// A scalar value for a leaf type.
    Value(ScalarValue),
    /// A child node for a composite type.
    Node(Node),
}

impl From<Node> for Argument {
    fn from(node: Node) -> Self {
        Argument::Node(node)
    }
}

impl From<ScalarValue> for Argument {
    fn from(value: ScalarValue) -> Self {
        Argument::Value(value)
    }
}

macro_rules! value_argument {
    ($($t:ty),* $(,)?) => {
        $(
            impl From<$t> for Argument {
                fn from(v: $t) -> Self {
                    Argument::Value(ScalarValue::from(v))
                }
            }
        )*
    };
}

value_argument!(
    bool,
    i64,
    i32,
    u32,
    f64,
    &str,
    String,
    NaiveDate,
    NaiveTime,
    NaiveDateTime,
    DateTime<FixedOffset>,
    DateTime<Utc>,
);

/// The outcome of resolving a value against a union type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnionResolution {
    /// The alternative that accepted the value.
    pub alternative: TypeId,
    /// Full name of that alternative.
    pub alternative_name: String,
    /// Canonical text produced by the alternative.
    pub text: String,
}

/// Try each alternative of `node_type` in declared order.
///
/// Alternatives may themselves be enumerations, scalars, or unions. An
/// alternative that rejects the value (type mismatch, enumeration miss,
/// range violation) is skipped; any other error is returned as is. A type
/// with no alternatives rejects every value.
///
/// # Errors
///
/// Returns `NodeError::InvalidUnionValue` when no alternative accepts the value.
pub fn resolve_union(
    node_type: &NodeType,
    value: &ScalarValue,
) -> Result<UnionResolution, NodeError> {
    union_resolution(node_type.registry(), node_type.id(), value)
}

fn union_resolution(
    registry: &SchemaRegistry,
    id: TypeId,
    value: &ScalarValue,
) -> Result<UnionResolution, NodeError> {
    let ty = registry.descriptor(id);
    for &alternative in &ty.union {
        let alternative_name = &registry.descriptor(alternative).name;
        match resolve_text(registry, alternative, value) {
            Ok(text) => {
                tracing::trace!(
                    union = %ty.name,
                    alternative = %alternative_name,
                    "union value resolved"
                );
                return Ok(UnionResolution {
                    alternative,
                    alternative_name: alternative_name.clone(),
                    text,
                });
            }
            Err(e) if e.is_rejection() => {
                tracing::trace!(
                    union = %ty.name,
                    alternative = %alternative_name,
                    error = %e,
                    "union alternative rejected value"
                );
            }
            Err(e) => return Err(e),
        }
    }
    Err(NodeError::InvalidUnionValue {
        type_name: ty.name.clone(),
        value: value.to_string(),
        alternatives: ty
            .union
            .iter()
            .map(|alt| registry.descriptor(*alt).name.clone())
            .collect(),
    })
}

/// Validate `value` for the leaf type `id` and produce its canonical text.
fn resolve_text(
    registry: &SchemaRegistry,
    id: TypeId,
    value: &ScalarValue,
) -> Result<String, NodeError> {
    let ty = registry.descriptor(id);
    match ty.content_model() {
        ContentModel::Enumeration => match value.as_str() {
            Some(s) if ty.enumerations.iter().any(|e| e == s) => Ok(s.to_string()),
            _ => Err(NodeError::Enumeration {
                type_name: ty.name.clone(),
                value: value.to_string(),
                allowed: ty.enumerations.clone(),
            }),
        },
        ContentModel::Union => union_resolution(registry, id, value).map(|r| r.text),
        ContentModel::Scalar(kind) => kind
            .format(value)
            .map_err(|e| NodeError::from_scalar(&ty.name, e)),
        ContentModel::Composite => Err(NodeError::InvalidChild {
            type_name: ty.name.clone(),
            value: value.to_string(),
        }),
    }
}

/// Canonical text for a leaf node holding `value`.
pub(crate) fn leaf_text(node_type: &NodeType, value: &ScalarValue) -> Result<String, NodeError> {
    resolve_text(node_type.registry(), node_type.id(), value)
}

/// Build a node of `node_type` from positional arguments.
pub(crate) fn construct(node_type: &NodeType, args: Vec<Argument>) -> Result<Node, NodeError> {
    let mut node = node_type.instantiate();
    let model = node_type.descriptor().content_model();

    if model == ContentModel::Composite {
        for arg in args {
            match arg {
                Argument::Node(child) => node.append(child)?,
                Argument::Value(value) => {
                    return Err(NodeError::InvalidChild {
                        type_name: node_type.name().to_string(),
                        value: value.to_string(),
                    })
                }
            }
        }
        return Ok(node);
    }

    if args.len() > 1 {
        return Err(NodeError::Arity {
            type_name: node_type.name().to_string(),
            given: args.len(),
        });
    }
    match args.into_iter().next() {
        Some(Argument::Value(value)) => node.text = Some(leaf_text(node_type, &value)?),
        Some(Argument::Node(child)) => {
            return Err(NodeError::TypeMismatch {
                type_name: node_type.name().to_string(),
                expected: leaf_expectation(model),
                found: child.type_name().to_string(),
            })
        }
        None => {}
    }
    Ok(node)
}

fn leaf_expectation(model: ContentModel) -> String {
    match model {
        ContentModel::Enumeration => "enumeration literal".to_string(),
        ContentModel::Union => "union value".to_string(),
        ContentModel::Scalar(kind) => kind.label().to_string(),
        ContentModel::Composite => "child node".to_string(),
    }
}
