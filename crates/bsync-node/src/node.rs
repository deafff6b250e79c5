//! # Node Types and Node Instances
//!
//! [`NodeType`] pairs a shared registry with one type handle; it is the
//! factory for [`Node`]s. A [`Node`] is the mutable instance: canonical
//! text or children (never both), plus attributes in insertion order.
//!
//! ## Child Slots
//!
//! Children are stored per declared slot, keyed by the slot's position in
//! the type's child list. A value lands in the first slot whose declared
//! type it matches exactly or as a subtype. Slots declared `once` hold at
//! most one value; [`Node::set_child`] is single-assignment for every slot.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use bsync_core::{NodeError, ScalarValue};
use bsync_schema::{AttributePolicy, ContentModel, Occurs, ResolvedType, SchemaRegistry, TypeId};

use crate::construct::{self, Argument};

/// A node type bound to the registry that declares it.
#[derive(Clone)]
pub struct NodeType {
    registry: Arc<SchemaRegistry>,
    id: TypeId,
}

impl NodeType {
    /// Look up a type by full dotted name.
    ///
    /// # Errors
    ///
    /// Returns `NodeError::UnknownType` if the registry does not declare `name`.
    pub fn new(registry: &Arc<SchemaRegistry>, name: &str) -> Result<Self, NodeError> {
        registry
            .lookup(name)
            .map(|id| Self {
                registry: Arc::clone(registry),
                id,
            })
            .ok_or_else(|| NodeError::UnknownType {
                name: name.to_string(),
            })
    }

    /// Bind a handle issued by `registry`.
    pub fn from_id(registry: &Arc<SchemaRegistry>, id: TypeId) -> Option<Self> {
        registry.get(id).map(|_| Self {
            registry: Arc::clone(registry),
            id,
        })
    }

    pub fn id(&self) -> TypeId {
        self.id
    }

    pub fn registry(&self) -> &Arc<SchemaRegistry> {
        &self.registry
    }

    /// The resolved descriptor for this type.
    pub fn descriptor(&self) -> &ResolvedType {
        self.registry.descriptor(self.id)
    }

    /// Full dotted type name.
    pub fn name(&self) -> &str {
        &self.descriptor().name
    }

    /// Element name used when the node is serialized without an override.
    pub fn element_name(&self) -> &str {
        self.descriptor().element_name()
    }

    /// Returns true if both types come from the same registry instance.
    pub fn same_registry(&self, other: &NodeType) -> bool {
        Arc::ptr_eq(&self.registry, &other.registry)
    }

    /// Returns true if this type is `ancestor` or a subtype of it.
    pub fn is_a(&self, ancestor: &NodeType) -> bool {
        self.same_registry(ancestor) && self.registry.is_subtype(self.id, ancestor.id)
    }

    /// The declared type of the child slot `name`.
    pub fn child_type(&self, name: &str) -> Result<NodeType, NodeError> {
        let slot = self
            .descriptor()
            .child(name)
            .ok_or_else(|| NodeError::UnknownChildName {
                type_name: self.name().to_string(),
                name: name.to_string(),
            })?;
        Ok(Self {
            registry: Arc::clone(&self.registry),
            id: slot.type_id,
        })
    }

    /// An empty node of this type.
    pub fn instantiate(&self) -> Node {
        Node {
            node_type: self.clone(),
            text: None,
            children: BTreeMap::new(),
            attributes: Vec::new(),
        }
    }

    /// Build a node from positional arguments.
    ///
    /// # Errors
    ///
    /// Leaf types: `Arity` for more than one argument, `Enumeration`,
    /// `InvalidUnionValue`, `TypeMismatch` or `OutOfRange` for a rejected
    /// value. Composite types: `InvalidChild` for a scalar argument and any
    /// error of [`Node::append`].
    pub fn construct<I, A>(&self, args: I) -> Result<Node, NodeError>
    where
        I: IntoIterator<Item = A>,
        A: Into<Argument>,
    {
        construct::construct(self, args.into_iter().map(Into::into).collect())
    }

    /// Build a node from positional arguments, then set `attributes` in order.
    pub fn construct_with_attributes<I, A, P, K, V>(
        &self,
        args: I,
        attributes: P,
    ) -> Result<Node, NodeError>
    where
        I: IntoIterator<Item = A>,
        A: Into<Argument>,
        P: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut node = self.construct(args)?;
        for (key, value) in attributes {
            node.set_attribute(key, value)?;
        }
        Ok(node)
    }

    /// Build a leaf node holding one value.
    pub fn value(&self, value: impl Into<ScalarValue>) -> Result<Node, NodeError> {
        self.construct([Argument::Value(value.into())])
    }

    /// Build a composite node from child nodes.
    pub fn with_children<I>(&self, children: I) -> Result<Node, NodeError>
    where
        I: IntoIterator<Item = Node>,
    {
        self.construct(children)
    }
}

impl PartialEq for NodeType {
    fn eq(&self, other: &Self) -> bool {
        self.same_registry(other) && self.id == other.id
    }
}

impl Eq for NodeType {}

impl fmt::Debug for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("NodeType").field(&self.name()).finish()
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A value stored under a child slot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ChildRef<'a> {
    /// Exactly one value is attached.
    Single(&'a Node),
    /// Two or more values, in attachment order.
    Many(&'a [Node]),
}

impl<'a> ChildRef<'a> {
    /// The value, if exactly one is attached.
    pub fn as_single(self) -> Option<&'a Node> {
        match self {
            ChildRef::Single(node) => Some(node),
            ChildRef::Many(_) => None,
        }
    }

    /// All attached values.
    pub fn as_slice(self) -> &'a [Node] {
        match self {
            ChildRef::Single(node) => std::slice::from_ref(node),
            ChildRef::Many(nodes) => nodes,
        }
    }

    pub fn len(self) -> usize {
        self.as_slice().len()
    }

    pub fn is_empty(self) -> bool {
        self.as_slice().is_empty()
    }
}

/// A mutable document node.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub(crate) node_type: NodeType,
    pub(crate) text: Option<String>,
    /// Slot position -> values in attachment order. Never holds an empty vec.
    pub(crate) children: BTreeMap<usize, Vec<Node>>,
    pub(crate) attributes: Vec<(String, String)>,
}

impl Node {
    pub fn node_type(&self) -> &NodeType {
        &self.node_type
    }

    /// Full dotted type name.
    pub fn type_name(&self) -> &str {
        self.node_type.name()
    }

    /// Canonical text, if this is a leaf with a value.
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    /// Returns true if any child is attached.
    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    /// Returns true if the node has neither text nor children.
    pub fn is_empty(&self) -> bool {
        self.text.is_none() && self.children.is_empty()
    }

    /// Assign the leaf value after construction.
    ///
    /// # Errors
    ///
    /// `InvalidChild` on a composite type, `AlreadySet` if text is present,
    /// otherwise the same errors as construction.
    pub fn set_value(&mut self, value: impl Into<ScalarValue>) -> Result<(), NodeError> {
        let value = value.into();
        if self.node_type.descriptor().content_model() == ContentModel::Composite {
            return Err(NodeError::InvalidChild {
                type_name: self.type_name().to_string(),
                value: value.to_string(),
            });
        }
        if self.text.is_some() {
            return Err(NodeError::AlreadySet {
                type_name: self.type_name().to_string(),
                slot: "text".to_string(),
            });
        }
        if self.has_children() {
            return Err(self.mixed_content());
        }
        self.text = Some(construct::leaf_text(&self.node_type, &value)?);
        Ok(())
    }

    /// Attach `child` to the first declared slot whose type it matches.
    ///
    /// # Errors
    ///
    /// - `ForeignRegistry` if `child` was built from another registry.
    /// - `MixedContent` if this node holds text.
    /// - `UnrecognizedChild` if no slot accepts the child's type.
    /// - `AlreadySet` if the matching slot is `once` and already filled.
    pub fn append(&mut self, child: Node) -> Result<(), NodeError> {
        if !self.node_type.same_registry(&child.node_type) {
            return Err(NodeError::ForeignRegistry {
                type_name: self.type_name().to_string(),
                child_type: child.type_name().to_string(),
            });
        }
        if self.text.is_some() {
            return Err(self.mixed_content());
        }

        let registry = self.node_type.registry();
        let ty = self.node_type.descriptor();
        let Some(index) = ty
            .children
            .iter()
            .position(|slot| registry.is_subtype(child.node_type.id, slot.type_id))
        else {
            return Err(NodeError::UnrecognizedChild {
                type_name: ty.name.clone(),
                child_type: child.type_name().to_string(),
                expected: ty
                    .children
                    .iter()
                    .map(|slot| registry.descriptor(slot.type_id).name.clone())
                    .collect(),
            });
        };

        let slot = &ty.children[index];
        if slot.occurs == Occurs::Once && self.children.contains_key(&index) {
            return Err(NodeError::AlreadySet {
                type_name: ty.name.clone(),
                slot: slot.name.clone(),
            });
        }
        tracing::trace!(
            parent = %ty.name,
            slot = %slot.name,
            child = %child.type_name(),
            "child appended"
        );
        self.children.entry(index).or_default().push(child);
        Ok(())
    }

    /// Chaining form of [`Node::append`].
    pub fn with_child(mut self, child: Node) -> Result<Self, NodeError> {
        self.append(child)?;
        Ok(self)
    }

    /// Store or overwrite an attribute. An overwritten key keeps its position.
    ///
    /// # Errors
    ///
    /// Returns `NodeError::UnknownAttribute` for an undeclared key when the
    /// registry's policy is [`AttributePolicy::Strict`].
    pub fn set_attribute(
        &mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<(), NodeError> {
        let key = key.into();
        let value = value.into();
        let ty = self.node_type.descriptor();
        if !ty.declares_attribute(&key) {
            match self.node_type.registry().attribute_policy() {
                AttributePolicy::Strict => {
                    return Err(NodeError::UnknownAttribute {
                        type_name: ty.name.clone(),
                        key,
                        allowed: ty.attributes.clone(),
                    })
                }
                AttributePolicy::Advisory => {
                    tracing::debug!(node_type = %ty.name, key = %key, "undeclared attribute");
                }
            }
        }
        match self.attributes.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.attributes.push((key, value)),
        }
        Ok(())
    }

    /// Chaining form of [`Node::set_attribute`].
    pub fn with_attribute(
        mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<Self, NodeError> {
        self.set_attribute(key, value)?;
        Ok(self)
    }

    /// Read an attribute value.
    ///
    /// # Errors
    ///
    /// Returns `NodeError::MissingAttribute` if `key` was never set.
    pub fn attribute(&self, key: &str) -> Result<&str, NodeError> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
            .ok_or_else(|| NodeError::MissingAttribute {
                type_name: self.type_name().to_string(),
                key: key.to_string(),
            })
    }

    /// All attributes in insertion order.
    pub fn attributes(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attributes.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Read the values attached under the child slot `name`.
    ///
    /// # Errors
    ///
    /// `UnknownChildName` if the slot is not declared, `ChildNotSet` if it
    /// holds nothing.
    pub fn child(&self, name: &str) -> Result<ChildRef<'_>, NodeError> {
        let index = self.slot_index(name)?;
        match self.children.get(&index).map(Vec::as_slice) {
            Some([single]) => Ok(ChildRef::Single(single)),
            Some(many) if !many.is_empty() => Ok(ChildRef::Many(many)),
            _ => Err(NodeError::ChildNotSet {
                type_name: self.type_name().to_string(),
                name: name.to_string(),
            }),
        }
    }

    /// The values under the child slot `name`; empty when nothing is attached.
    ///
    /// # Errors
    ///
    /// Returns `NodeError::UnknownChildName` if the slot is not declared.
    pub fn children(&self, name: &str) -> Result<&[Node], NodeError> {
        let index = self.slot_index(name)?;
        Ok(self.children.get(&index).map(Vec::as_slice).unwrap_or(&[]))
    }

    /// Assign the child slot `name` exactly once.
    ///
    /// # Errors
    ///
    /// - `UnknownChildName` if the slot is not declared.
    /// - `ForeignRegistry` if `value` was built from another registry.
    /// - `TypeMismatch` if `value` is neither the slot's type nor a subtype.
    /// - `MixedContent` if this node holds text.
    /// - `AlreadySet` if the slot already holds a value.
    pub fn set_child(&mut self, name: &str, value: Node) -> Result<(), NodeError> {
        let index = self.slot_index(name)?;
        if !self.node_type.same_registry(&value.node_type) {
            return Err(NodeError::ForeignRegistry {
                type_name: self.type_name().to_string(),
                child_type: value.type_name().to_string(),
            });
        }

        let registry = self.node_type.registry();
        let ty = self.node_type.descriptor();
        let slot = &ty.children[index];
        if !registry.is_subtype(value.node_type.id, slot.type_id) {
            return Err(NodeError::TypeMismatch {
                type_name: ty.name.clone(),
                expected: registry.descriptor(slot.type_id).name.clone(),
                found: value.type_name().to_string(),
            });
        }
        if self.text.is_some() {
            return Err(self.mixed_content());
        }
        if self.children.contains_key(&index) {
            return Err(NodeError::AlreadySet {
                type_name: ty.name.clone(),
                slot: slot.name.clone(),
            });
        }
        self.children.insert(index, vec![value]);
        Ok(())
    }

    /// Attached slots in schema order, as `(slot name, values)` pairs.
    pub fn slots(&self) -> impl Iterator<Item = (&str, &[Node])> {
        let ty = self.node_type.descriptor();
        self.children.iter().filter_map(move |(index, values)| {
            ty.children
                .get(*index)
                .map(|slot| (slot.name.as_str(), values.as_slice()))
        })
    }

    fn slot_index(&self, name: &str) -> Result<usize, NodeError> {
        self.node_type
            .descriptor()
            .child_index(name)
            .ok_or_else(|| NodeError::UnknownChildName {
                type_name: self.type_name().to_string(),
                name: name.to_string(),
            })
    }

    fn mixed_content(&self) -> NodeError {
        NodeError::MixedContent {
            type_name: self.type_name().to_string(),
        }
    }
}
