//! # Type Descriptors
//!
//! The declarative, per-type schema data the engine is parameterized by.
//! Descriptors are produced outside this crate (by a schema-to-descriptor
//! generation step or by hand) and are immutable once registered.
//!
//! Type names are dotted paths: a type declared inside `Facilities` is named
//! `Facilities.Facility` and serializes as `<Facility>`.
//!
//! ```yaml
//! types:
//!   - name: Facilities
//!     children:
//!       - { name: Facility, type: Facilities.Facility }
//!   - name: Facilities.Facility
//!     attributes: [ID]
//! ```

use bsync_core::ScalarKind;
use serde::{Deserialize, Serialize};

/// How many values a child slot may hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Occurs {
    /// At most one value.
    Once,
    /// Any number of values, kept in attachment order.
    #[default]
    Repeated,
}

/// One declared child slot: the element name and the type it holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChildSpec {
    /// Element name used for values in this slot.
    pub name: String,
    /// Declared type; values may be this type or any subtype.
    #[serde(rename = "type")]
    pub type_name: String,
    /// Cardinality of the slot.
    #[serde(default, skip_serializing_if = "is_repeated")]
    pub occurs: Occurs,
}

fn is_repeated(occurs: &Occurs) -> bool {
    *occurs == Occurs::Repeated
}

impl ChildSpec {
    /// A repeatable slot.
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            occurs: Occurs::Repeated,
        }
    }

    /// A slot holding at most one value.
    pub fn once(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            occurs: Occurs::Once,
            ..Self::new(name, type_name)
        }
    }
}

/// Schema data for one node type.
///
/// Unset fields of a type with a `base` are inherited from the base when the
/// registry is built.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TypeDescriptor {
    /// Full dotted type name.
    pub name: String,
    /// Parent type this one specializes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base: Option<String>,
    /// Scalar leaf kind; `None` for composite types.
    #[serde(default, rename = "scalar", skip_serializing_if = "Option::is_none")]
    pub scalar_kind: Option<ScalarKind>,
    /// Legal string literals, in schema order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub enumerations: Vec<String>,
    /// Alternative types tried in order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub union: Vec<String>,
    /// Child slots in serialization order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ChildSpec>,
    /// Documented attribute names.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<String>,
    /// Annotation text from the source schema.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub documentation: Option<String>,
}

impl TypeDescriptor {
    /// A composite type with no children yet.
    pub fn composite(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// A scalar leaf type.
    pub fn scalar(name: impl Into<String>, kind: ScalarKind) -> Self {
        Self {
            name: name.into(),
            scalar_kind: Some(kind),
            ..Self::default()
        }
    }

    /// A string leaf restricted to `values`.
    pub fn enumeration<I, S>(name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            scalar_kind: Some(ScalarKind::String),
            enumerations: values.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// A leaf accepting whatever the first matching alternative accepts.
    pub fn union<I, S>(name: impl Into<String>, alternatives: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            union: alternatives.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Builder form: append a repeatable child slot.
    pub fn child(mut self, name: impl Into<String>, type_name: impl Into<String>) -> Self {
        self.children.push(ChildSpec::new(name, type_name));
        self
    }

    /// Builder form: append a single-value child slot.
    pub fn child_once(mut self, name: impl Into<String>, type_name: impl Into<String>) -> Self {
        self.children.push(ChildSpec::once(name, type_name));
        self
    }

    /// Builder form: declare an attribute name.
    pub fn attribute(mut self, name: impl Into<String>) -> Self {
        self.attributes.push(name.into());
        self
    }

    /// Builder form: make this type a subtype of `base`.
    pub fn extends(mut self, base: impl Into<String>) -> Self {
        self.base = Some(base.into());
        self
    }

    /// Builder form: attach annotation text.
    pub fn documented(mut self, text: impl Into<String>) -> Self {
        self.documentation = Some(text.into());
        self
    }

    /// The element name: the last dotted segment of the type name.
    pub fn element_name(&self) -> &str {
        element_name_of(&self.name)
    }

    /// The enclosing scope, if this type is nested (`Facilities` for `Facilities.Facility`).
    pub fn scope(&self) -> Option<&str> {
        self.name.rsplit_once('.').map(|(scope, _)| scope)
    }
}

/// The last dotted segment of a type name.
pub(crate) fn element_name_of(type_name: &str) -> &str {
    type_name.rsplit('.').next().unwrap_or(type_name)
}

/// A descriptor document: the unit read from one YAML/JSON file.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SchemaDocument {
    /// Descriptors declared in this document.
    #[serde(default)]
    pub types: Vec<TypeDescriptor>,
}
