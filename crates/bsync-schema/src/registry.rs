//! # Descriptor Registry
//!
//! Resolves a set of [`TypeDescriptor`]s into an immutable table of
//! [`ResolvedType`]s addressed by [`TypeId`] handles.
//!
//! ## Resolution
//!
//! Child types and union alternatives are looked up relative to the
//! declaring type first, then outward through its enclosing scopes, then as
//! a full name. Inside `Sections.Section`, the reference `Story` resolves to
//! `Sections.Section.Story` if that type exists, else `Sections.Story`, else
//! `Story`. A `base` reference starts from the declaring type's enclosing
//! scope so a type never resolves to itself.
//!
//! ## Inheritance
//!
//! A type with a `base` inherits each field it leaves empty (scalar kind,
//! enumerations, union alternatives, children, attributes, documentation)
//! from the nearest ancestor that sets it. The registry stores the
//! flattened result, so the engine never walks base chains except to answer
//! [`SchemaRegistry::is_subtype`].
//!
//! ## Checks
//!
//! Building fails on duplicate type names, duplicate child names within a
//! type, unresolved references, cycles in `base` links, and unions whose
//! alternatives lead back to themselves.

use std::collections::{HashMap, HashSet};
use std::fmt;

use bsync_core::ScalarKind;
use serde::{Deserialize, Serialize};

use crate::descriptor::{element_name_of, Occurs, TypeDescriptor};
use crate::error::SchemaError;

/// Handle to a type in one [`SchemaRegistry`].
///
/// Handles are only meaningful for the registry that issued them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeId(u32);

impl TypeId {
    /// Position of the type in its registry.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "type#{}", self.0)
    }
}

/// Whether attribute keys outside a type's declared names are accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttributePolicy {
    /// Any key is stored; undeclared keys are logged at debug level.
    #[default]
    Advisory,
    /// Undeclared keys are rejected.
    Strict,
}

/// How construction arguments are interpreted for a type, in dispatch order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentModel {
    /// A string restricted to enumeration literals.
    Enumeration,
    /// A leaf resolved through alternative types.
    Union,
    /// A scalar leaf of the given kind.
    Scalar(ScalarKind),
    /// A node holding child nodes.
    Composite,
}

/// A child slot with its type resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedChild {
    /// Element name used for values in this slot.
    pub name: String,
    /// Declared type.
    pub type_id: TypeId,
    /// Cardinality of the slot.
    pub occurs: Occurs,
}

/// A descriptor with references resolved and inheritance flattened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedType {
    pub id: TypeId,
    pub name: String,
    pub base: Option<TypeId>,
    pub scalar_kind: Option<ScalarKind>,
    pub enumerations: Vec<String>,
    pub union: Vec<TypeId>,
    pub children: Vec<ResolvedChild>,
    pub attributes: Vec<String>,
    pub documentation: Option<String>,
}

impl ResolvedType {
    /// The element name: the last dotted segment of the type name.
    pub fn element_name(&self) -> &str {
        element_name_of(&self.name)
    }

    /// Classify the type for construction dispatch.
    ///
    /// Enumerations win over unions, unions over scalar kinds.
    pub fn content_model(&self) -> ContentModel {
        if !self.enumerations.is_empty() {
            ContentModel::Enumeration
        } else if !self.union.is_empty() {
            ContentModel::Union
        } else if let Some(kind) = self.scalar_kind {
            ContentModel::Scalar(kind)
        } else {
            ContentModel::Composite
        }
    }

    /// Position of the named child slot.
    pub fn child_index(&self, name: &str) -> Option<usize> {
        self.children.iter().position(|c| c.name == name)
    }

    /// Look up a child slot by name.
    pub fn child(&self, name: &str) -> Option<&ResolvedChild> {
        self.children.iter().find(|c| c.name == name)
    }

    /// Returns true if `key` is a declared attribute name.
    pub fn declares_attribute(&self, key: &str) -> bool {
        self.attributes.iter().any(|a| a == key)
    }
}

/// Immutable table of resolved node types.
///
/// Build once, wrap in an `Arc`, and share with every node built from it.
/// `SchemaRegistry` is `Send + Sync`.
#[derive(Debug)]
pub struct SchemaRegistry {
    types: Vec<ResolvedType>,
    by_name: HashMap<String, TypeId>,
    attribute_policy: AttributePolicy,
}

impl SchemaRegistry {
    /// Start building a registry.
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    /// Resolve `descriptors` with the default (advisory) attribute policy.
    ///
    /// # Errors
    ///
    /// Returns a `SchemaError` describing the first duplicate, unresolved
    /// reference, or cycle found.
    pub fn from_descriptors<I>(descriptors: I) -> Result<Self, SchemaError>
    where
        I: IntoIterator<Item = TypeDescriptor>,
    {
        Self::builder().descriptors(descriptors).build()
    }

    /// Returns the number of types.
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Returns true if no types are registered.
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Attribute policy nodes built from this registry follow.
    pub fn attribute_policy(&self) -> AttributePolicy {
        self.attribute_policy
    }

    /// Look up a type handle by full name.
    pub fn lookup(&self, name: &str) -> Option<TypeId> {
        self.by_name.get(name).copied()
    }

    /// Look up a resolved type by handle.
    pub fn get(&self, id: TypeId) -> Option<&ResolvedType> {
        self.types.get(id.index())
    }

    /// Look up a resolved type by full name.
    pub fn by_name(&self, name: &str) -> Option<&ResolvedType> {
        self.lookup(name).and_then(|id| self.get(id))
    }

    /// The resolved type for a handle issued by this registry.
    ///
    /// # Panics
    ///
    /// Panics if `id` was issued by a different registry with more types.
    pub fn descriptor(&self, id: TypeId) -> &ResolvedType {
        &self.types[id.index()]
    }

    /// Returns true if `ty` is `ancestor` or inherits from it.
    pub fn is_subtype(&self, ty: TypeId, ancestor: TypeId) -> bool {
        let mut current = Some(ty);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.get(id).and_then(|t| t.base);
        }
        false
    }

    /// Iterate over all types in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &ResolvedType> {
        self.types.iter()
    }

    /// Returns all type names, sorted alphabetically.
    pub fn type_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.types.iter().map(|t| t.name.as_str()).collect();
        names.sort_unstable();
        names
    }
}

/// Collects descriptors and options, then resolves them into a registry.
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    descriptors: Vec<TypeDescriptor>,
    attribute_policy: AttributePolicy,
}

impl RegistryBuilder {
    /// Add one descriptor.
    pub fn descriptor(mut self, descriptor: TypeDescriptor) -> Self {
        self.descriptors.push(descriptor);
        self
    }

    /// Add several descriptors.
    pub fn descriptors<I>(mut self, descriptors: I) -> Self
    where
        I: IntoIterator<Item = TypeDescriptor>,
    {
        self.descriptors.extend(descriptors);
        self
    }

    /// Set the attribute policy.
    pub fn attribute_policy(mut self, policy: AttributePolicy) -> Self {
        self.attribute_policy = policy;
        self
    }

    /// Resolve and check the collected descriptors.
    ///
    /// # Errors
    ///
    /// See [`SchemaRegistry::from_descriptors`].
    pub fn build(self) -> Result<SchemaRegistry, SchemaError> {
        let descriptors = self.descriptors;

        let mut by_name = HashMap::with_capacity(descriptors.len());
        for (i, d) in descriptors.iter().enumerate() {
            if by_name.insert(d.name.clone(), TypeId(i as u32)).is_some() {
                return Err(SchemaError::DuplicateType {
                    name: d.name.clone(),
                });
            }
        }

        let own: Vec<OwnReferences> = descriptors
            .iter()
            .enumerate()
            .map(|(i, d)| resolve_own(TypeId(i as u32), d, &by_name))
            .collect::<Result<_, _>>()?;

        check_inheritance(&descriptors, &own)?;

        let types: Vec<ResolvedType> = (0..descriptors.len())
            .map(|i| flatten(i, &descriptors, &own))
            .collect();

        check_unions(&types)?;

        tracing::debug!(
            types = types.len(),
            policy = ?self.attribute_policy,
            "schema registry built"
        );

        Ok(SchemaRegistry {
            types,
            by_name,
            attribute_policy: self.attribute_policy,
        })
    }
}

/// References declared directly on one descriptor, resolved to handles.
struct OwnReferences {
    base: Option<TypeId>,
    union: Vec<TypeId>,
    children: Vec<ResolvedChild>,
}

fn resolve_own(
    id: TypeId,
    d: &TypeDescriptor,
    by_name: &HashMap<String, TypeId>,
) -> Result<OwnReferences, SchemaError> {
    let unresolved = |reference: &str| SchemaError::UnresolvedType {
        type_name: d.name.clone(),
        reference: reference.to_string(),
    };

    let base = match &d.base {
        Some(reference) => Some(
            resolve_reference(by_name, d.scope(), reference, Some(id))
                .ok_or_else(|| unresolved(reference))?,
        ),
        None => None,
    };

    let union = d
        .union
        .iter()
        .map(|reference| {
            resolve_reference(by_name, Some(&d.name), reference, None)
                .ok_or_else(|| unresolved(reference))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let mut seen = HashSet::new();
    let mut children = Vec::with_capacity(d.children.len());
    for spec in &d.children {
        if !seen.insert(spec.name.as_str()) {
            return Err(SchemaError::DuplicateChild {
                type_name: d.name.clone(),
                child: spec.name.clone(),
            });
        }
        let type_id = resolve_reference(by_name, Some(&d.name), &spec.type_name, None)
            .ok_or_else(|| unresolved(&spec.type_name))?;
        children.push(ResolvedChild {
            name: spec.name.clone(),
            type_id,
            occurs: spec.occurs,
        });
    }

    Ok(OwnReferences {
        base,
        union,
        children,
    })
}

/// Resolve `reference` from within `scope`, innermost scope first.
///
/// A candidate equal to `exclude` is passed over, so a `base` reference
/// never lands on the declaring type itself.
fn resolve_reference(
    by_name: &HashMap<String, TypeId>,
    scope: Option<&str>,
    reference: &str,
    exclude: Option<TypeId>,
) -> Option<TypeId> {
    let accept = |id: &TypeId| Some(*id) != exclude;
    let mut scope = scope;
    while let Some(s) = scope {
        if let Some(id) = by_name.get(&format!("{s}.{reference}")).filter(|id| accept(id)) {
            return Some(*id);
        }
        scope = s.rsplit_once('.').map(|(outer, _)| outer);
    }
    by_name.get(reference).filter(|id| accept(id)).copied()
}

fn check_inheritance(
    descriptors: &[TypeDescriptor],
    own: &[OwnReferences],
) -> Result<(), SchemaError> {
    for start in 0..own.len() {
        let mut seen = HashSet::new();
        let mut current = Some(start);
        while let Some(i) = current {
            if !seen.insert(i) {
                return Err(SchemaError::InheritanceCycle {
                    type_name: descriptors[i].name.clone(),
                });
            }
            current = own[i].base.map(TypeId::index);
        }
    }
    Ok(())
}

/// Build the effective type at `index`: own fields, then the nearest ancestor's.
///
/// Leaf content (scalar kind, enumerations, union) is inherited as a unit
/// from the nearest type in the chain that declares any of it.
fn flatten(index: usize, descriptors: &[TypeDescriptor], own: &[OwnReferences]) -> ResolvedType {
    let mut chain = vec![index];
    while let Some(base) = own[chain[chain.len() - 1]].base {
        chain.push(base.index());
    }

    let leaf = chain.iter().copied().find(|&i| {
        descriptors[i].scalar_kind.is_some()
            || !descriptors[i].enumerations.is_empty()
            || !own[i].union.is_empty()
    });

    let d = &descriptors[index];
    ResolvedType {
        id: TypeId(index as u32),
        name: d.name.clone(),
        base: own[index].base,
        scalar_kind: leaf.and_then(|i| descriptors[i].scalar_kind),
        enumerations: leaf
            .map(|i| descriptors[i].enumerations.clone())
            .unwrap_or_default(),
        union: leaf.map(|i| own[i].union.clone()).unwrap_or_default(),
        children: first_non_empty(&chain, |i| &own[i].children),
        attributes: first_non_empty(&chain, |i| &descriptors[i].attributes),
        documentation: chain
            .iter()
            .find_map(|&i| descriptors[i].documentation.clone()),
    }
}

fn first_non_empty<'a, T: Clone + 'a>(
    chain: &[usize],
    field: impl Fn(usize) -> &'a Vec<T>,
) -> Vec<T> {
    chain
        .iter()
        .map(|&i| field(i))
        .find(|v| !v.is_empty())
        .cloned()
        .unwrap_or_default()
}

fn check_unions(types: &[ResolvedType]) -> Result<(), SchemaError> {
    #[derive(Clone, Copy, PartialEq)]
    enum Mark {
        Unvisited,
        InProgress,
        Done,
    }

    fn visit(i: usize, types: &[ResolvedType], marks: &mut [Mark]) -> Result<(), SchemaError> {
        match marks[i] {
            Mark::Done => return Ok(()),
            Mark::InProgress => {
                return Err(SchemaError::UnionCycle {
                    type_name: types[i].name.clone(),
                })
            }
            Mark::Unvisited => {}
        }
        marks[i] = Mark::InProgress;
        for alt in &types[i].union {
            visit(alt.index(), types, marks)?;
        }
        marks[i] = Mark::Done;
        Ok(())
    }

    let mut marks = vec![Mark::Unvisited; types.len()];
    for i in 0..types.len() {
        visit(i, types, &mut marks)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> SchemaRegistry {
        SchemaRegistry::from_descriptors([
            TypeDescriptor::composite("Sections").child("Section", "Section"),
            TypeDescriptor::composite("Sections.Section")
                .attribute("ID")
                .child_once("Story", "Story"),
            TypeDescriptor::scalar("Sections.Section.Story", ScalarKind::Integer),
            TypeDescriptor::scalar("Story", ScalarKind::String),
            TypeDescriptor::scalar("ContactID", ScalarKind::String).attribute("IDref"),
            TypeDescriptor::composite("PrimaryContactID").extends("ContactID"),
        ])
        .unwrap()
    }

    #[test]
    fn test_lookup_and_len() {
        let reg = sample();
        assert_eq!(reg.len(), 6);
        assert!(!reg.is_empty());
        assert!(reg.lookup("Sections.Section").is_some());
        assert!(reg.lookup("Section").is_none());
    }

    #[test]
    fn test_nested_reference_resolves_innermost_first() {
        let reg = sample();
        let sections = reg.by_name("Sections").unwrap();
        let section_id = reg.lookup("Sections.Section").unwrap();
        assert_eq!(sections.children[0].type_id, section_id);

        let section = reg.descriptor(section_id);
        let story = reg.descriptor(section.children[0].type_id);
        assert_eq!(story.name, "Sections.Section.Story");
        assert_eq!(story.scalar_kind, Some(ScalarKind::Integer));
        assert_eq!(story.element_name(), "Story");
    }

    #[test]
    fn test_subtype_inherits_fields() {
        let reg = sample();
        let primary = reg.by_name("PrimaryContactID").unwrap();
        assert_eq!(primary.scalar_kind, Some(ScalarKind::String));
        assert_eq!(primary.attributes, vec!["IDref"]);
        assert_eq!(primary.content_model(), ContentModel::Scalar(ScalarKind::String));

        let contact = reg.lookup("ContactID").unwrap();
        assert!(reg.is_subtype(primary.id, contact));
        assert!(!reg.is_subtype(contact, primary.id));
        assert!(reg.is_subtype(contact, contact));
    }

    #[test]
    fn test_own_fields_override_base() {
        let reg = SchemaRegistry::from_descriptors([
            TypeDescriptor::scalar("Measure", ScalarKind::Decimal).attribute("Units"),
            TypeDescriptor::scalar("MeasureCount", ScalarKind::Integer).extends("Measure"),
        ])
        .unwrap();
        let count = reg.by_name("MeasureCount").unwrap();
        assert_eq!(count.scalar_kind, Some(ScalarKind::Integer));
        assert_eq!(count.attributes, vec!["Units"]);
    }

    #[test]
    fn test_content_model_dispatch_order() {
        let reg = SchemaRegistry::from_descriptors([
            TypeDescriptor::enumeration("Unknown", ["Unknown"]),
            TypeDescriptor::scalar("Count", ScalarKind::Integer),
            TypeDescriptor::union("CountOrUnknown", ["Count", "Unknown"]),
            TypeDescriptor::composite("Box").child("Count", "Count"),
        ])
        .unwrap();
        assert_eq!(reg.by_name("Unknown").unwrap().content_model(), ContentModel::Enumeration);
        assert_eq!(
            reg.by_name("Count").unwrap().content_model(),
            ContentModel::Scalar(ScalarKind::Integer)
        );
        assert_eq!(reg.by_name("CountOrUnknown").unwrap().content_model(), ContentModel::Union);
        assert_eq!(reg.by_name("Box").unwrap().content_model(), ContentModel::Composite);
    }

    #[test]
    fn test_duplicate_type_rejected() {
        let err = SchemaRegistry::from_descriptors([
            TypeDescriptor::composite("Site"),
            TypeDescriptor::composite("Site"),
        ])
        .unwrap_err();
        assert!(matches!(err, SchemaError::DuplicateType { name } if name == "Site"));
    }

    #[test]
    fn test_duplicate_child_rejected() {
        let err = SchemaRegistry::from_descriptors([
            TypeDescriptor::scalar("Name", ScalarKind::String),
            TypeDescriptor::composite("Site")
                .child("Name", "Name")
                .child("Name", "Name"),
        ])
        .unwrap_err();
        assert!(matches!(err, SchemaError::DuplicateChild { child, .. } if child == "Name"));
    }

    #[test]
    fn test_unresolved_reference_rejected() {
        let err = SchemaRegistry::from_descriptors([
            TypeDescriptor::composite("Site").child("Buildings", "Buildings"),
        ])
        .unwrap_err();
        match err {
            SchemaError::UnresolvedType {
                type_name,
                reference,
            } => {
                assert_eq!(type_name, "Site");
                assert_eq!(reference, "Buildings");
            }
            other => panic!("expected UnresolvedType, got {other}"),
        }
    }

    #[test]
    fn test_inheritance_cycle_rejected() {
        let err = SchemaRegistry::from_descriptors([
            TypeDescriptor::composite("A").extends("B"),
            TypeDescriptor::composite("B").extends("A"),
        ])
        .unwrap_err();
        assert!(matches!(err, SchemaError::InheritanceCycle { .. }));
    }

    #[test]
    fn test_base_never_resolves_to_self() {
        let reg = SchemaRegistry::from_descriptors([
            TypeDescriptor::scalar("Building", ScalarKind::String),
            TypeDescriptor::composite("Buildings.Building").extends("Building"),
        ])
        .unwrap();
        let nested = reg.by_name("Buildings.Building").unwrap();
        assert_eq!(nested.base, reg.lookup("Building"));
    }

    #[test]
    fn test_base_skips_self_at_every_scope() {
        let reg = SchemaRegistry::from_descriptors([
            TypeDescriptor::scalar("Sections.Section.Story", ScalarKind::Integer),
            TypeDescriptor::scalar("Sections.Story", ScalarKind::String),
            TypeDescriptor::composite("Sections.Section.Story.Story").extends("Story"),
        ])
        .unwrap();
        let nested = reg.by_name("Sections.Section.Story.Story").unwrap();
        assert_eq!(nested.base, reg.lookup("Sections.Section.Story"));
        assert_eq!(nested.scalar_kind, Some(ScalarKind::Integer));
    }

    #[test]
    fn test_self_only_base_is_unresolved() {
        let err = SchemaRegistry::from_descriptors([
            TypeDescriptor::composite("Buildings.Building").extends("Building"),
        ])
        .unwrap_err();
        match err {
            SchemaError::UnresolvedType { reference, .. } => assert_eq!(reference, "Building"),
            other => panic!("expected UnresolvedType, got {other}"),
        }
    }

    #[test]
    fn test_leaf_content_inherited_as_a_unit() {
        let reg = SchemaRegistry::from_descriptors([
            TypeDescriptor::enumeration("Unknown", ["Unknown"]),
            TypeDescriptor::scalar("Count", ScalarKind::Integer).extends("Unknown"),
            TypeDescriptor::composite("MaybeUnknown").extends("Unknown"),
        ])
        .unwrap();
        let count = reg.by_name("Count").unwrap();
        assert!(count.enumerations.is_empty());
        assert_eq!(count.content_model(), ContentModel::Scalar(ScalarKind::Integer));

        let inherited = reg.by_name("MaybeUnknown").unwrap();
        assert_eq!(inherited.enumerations, vec!["Unknown"]);
        assert_eq!(inherited.content_model(), ContentModel::Enumeration);
    }

    #[test]
    fn test_union_cycle_rejected() {
        let err = SchemaRegistry::from_descriptors([
            TypeDescriptor::union("A", ["B"]),
            TypeDescriptor::union("B", ["A"]),
        ])
        .unwrap_err();
        assert!(matches!(err, SchemaError::UnionCycle { .. }));
    }

    #[test]
    fn test_type_names_sorted() {
        let reg = sample();
        let names = reg.type_names();
        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(names, sorted);
        assert_eq!(names.len(), 6);
    }

    #[test]
    fn test_attribute_policy_from_builder() {
        let reg = SchemaRegistry::builder()
            .descriptor(TypeDescriptor::composite("Root"))
            .attribute_policy(AttributePolicy::Strict)
            .build()
            .unwrap();
        assert_eq!(reg.attribute_policy(), AttributePolicy::Strict);
        assert_eq!(
            SchemaRegistry::from_descriptors([]).unwrap().attribute_policy(),
            AttributePolicy::Advisory
        );
    }

    #[test]
    fn test_registry_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SchemaRegistry>();
    }
}
