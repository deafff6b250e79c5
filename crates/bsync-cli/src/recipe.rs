//! # Recipes
//!
//! A recipe is a declarative description of a document tree. Each node
//! names its type and carries an optional value, attributes, and children:
//!
//! ```yaml
//! type: Sites.Site
//! attributes: { ID: Site-1 }
//! children:
//!   - { type: WeatherStationName, value: A weather station }
//! ```
//!
//! Children are attached through the composition operator unless they name
//! a `slot`, in which case they are assigned to that slot directly.
//!
//! ## Value Coercion
//!
//! YAML booleans, integers, floats and strings map to the matching scalar
//! values. Numbers given to decimal or float types become floats. Strings
//! given to temporal types are parsed: dates as `CCYY-MM-DD`, times as
//! `hh:mm:ss[.fff]`, date-times as RFC 3339 or `CCYY-MM-DDThh:mm:ss[.fff]`,
//! month-days as `MM-DD`, `--MM-DD` or a full date. Values for unions are
//! coerced against each alternative in turn.

use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use bsync_core::{ScalarKind, ScalarValue};
use bsync_node::{resolve_union, Node, NodeType};
use bsync_schema::{ContentModel, DocumentFormat, ResolvedType, SchemaRegistry};
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};

/// One node of a recipe tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Recipe {
    /// Full dotted type name.
    #[serde(rename = "type")]
    pub type_name: String,
    /// Assign to this child slot of the parent instead of composing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slot: Option<String>,
    /// Leaf value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    /// Attributes, applied in the order written.
    #[serde(default, skip_serializing_if = "Mapping::is_empty")]
    pub attributes: Mapping,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Recipe>,
}

impl Recipe {
    /// Read a recipe from a YAML or JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading recipe: {}", path.display()))?;
        match DocumentFormat::from_path(path) {
            Some(DocumentFormat::Yaml) => serde_yaml::from_str(&content)
                .with_context(|| format!("parsing recipe YAML: {}", path.display())),
            Some(DocumentFormat::Json) => serde_json::from_str(&content)
                .with_context(|| format!("parsing recipe JSON: {}", path.display())),
            None => bail!(
                "recipe {} must have a .yaml, .yml or .json extension",
                path.display()
            ),
        }
    }

    /// Build the node tree this recipe describes.
    pub fn build(&self, registry: &Arc<SchemaRegistry>) -> Result<Node> {
        self.build_at(registry, &self.type_name)
    }

    fn build_at(&self, registry: &Arc<SchemaRegistry>, path: &str) -> Result<Node> {
        let node_type = NodeType::new(registry, &self.type_name)
            .with_context(|| format!("at {path}"))?;

        let mut node = match &self.value {
            Some(value) => {
                let scalar = coerce(value, &node_type).with_context(|| format!("at {path}"))?;
                node_type
                    .value(scalar)
                    .with_context(|| format!("at {path}"))?
            }
            None => node_type.instantiate(),
        };

        for (key, value) in &self.attributes {
            let key = scalar_text(key).with_context(|| format!("attribute key at {path}"))?;
            let value =
                scalar_text(value).with_context(|| format!("attribute {key:?} at {path}"))?;
            node.set_attribute(key, value)
                .with_context(|| format!("at {path}"))?;
        }

        for child in &self.children {
            let child_path = format!("{path}/{}", child.type_name);
            let built = child.build_at(registry, &child_path)?;
            match &child.slot {
                Some(slot) => node.set_child(slot, built),
                None => node.append(built),
            }
            .with_context(|| format!("at {child_path}"))?;
        }

        tracing::trace!(path, "built recipe node");
        Ok(node)
    }
}

/// Convert a recipe value to a scalar value for `node_type`.
///
/// For a union, the value is coerced for each alternative's leaf kind in
/// declared order, nested unions included, and the first candidate the
/// union accepts wins.
pub fn coerce(value: &Value, node_type: &NodeType) -> Result<ScalarValue> {
    let ty = node_type.descriptor();
    if ty.content_model() != ContentModel::Union {
        return coerce_to(value, ty.scalar_kind);
    }

    let mut kinds = Vec::new();
    alternative_kinds(node_type.registry(), ty, &mut kinds);
    for kind in kinds {
        if let Ok(candidate) = coerce_to(value, kind) {
            if resolve_union(node_type, &candidate).is_ok() {
                return Ok(candidate);
            }
        }
    }
    coerce_to(value, None)
}

/// Leaf kinds of a union's alternatives, depth first, without repeats.
fn alternative_kinds(
    registry: &SchemaRegistry,
    ty: &ResolvedType,
    kinds: &mut Vec<Option<ScalarKind>>,
) {
    for &alternative in &ty.union {
        let alt = registry.descriptor(alternative);
        if alt.content_model() == ContentModel::Union {
            alternative_kinds(registry, alt, kinds);
        } else if !kinds.contains(&alt.scalar_kind) {
            kinds.push(alt.scalar_kind);
        }
    }
}

fn coerce_to(value: &Value, kind: Option<ScalarKind>) -> Result<ScalarValue> {
    match value {
        Value::Bool(b) => Ok(ScalarValue::Boolean(*b)),
        Value::Number(n) => {
            let wants_float = matches!(kind, Some(ScalarKind::Decimal | ScalarKind::Float));
            match (n.as_i64(), n.as_f64()) {
                (Some(i), _) if !wants_float => Ok(ScalarValue::Integer(i)),
                (_, Some(f)) => Ok(ScalarValue::Float(f)),
                _ => bail!("number {n} is out of range"),
            }
        }
        Value::String(s) => match kind {
            Some(ScalarKind::Date) => Ok(ScalarValue::Date(parse_date(s)?)),
            Some(ScalarKind::MonthDay) => Ok(ScalarValue::Date(parse_month_day(s)?)),
            Some(ScalarKind::Time) => Ok(ScalarValue::Time(parse_time(s)?)),
            Some(ScalarKind::DateTime) => parse_date_time(s),
            _ => Ok(ScalarValue::String(s.clone())),
        },
        Value::Tagged(tagged) => coerce_to(&tagged.value, kind),
        other => bail!("unsupported recipe value: {other:?}"),
    }
}

fn scalar_text(value: &Value) -> Result<String> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        other => bail!("expected a string, number or boolean, got {other:?}"),
    }
}

fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").with_context(|| format!("invalid date {s:?}"))
}

fn parse_month_day(s: &str) -> Result<NaiveDate> {
    let trimmed = s.trim_start_matches("--");
    if trimmed.len() == 5 {
        // Leap year, so 02-29 is accepted.
        NaiveDate::parse_from_str(&format!("2000-{trimmed}"), "%Y-%m-%d")
            .with_context(|| format!("invalid month-day {s:?}"))
    } else {
        parse_date(trimmed)
    }
}

fn parse_time(s: &str) -> Result<NaiveTime> {
    NaiveTime::parse_from_str(s, "%H:%M:%S%.f").with_context(|| format!("invalid time {s:?}"))
}

fn parse_date_time(s: &str) -> Result<ScalarValue> {
    if let Ok(zoned) = DateTime::parse_from_rfc3339(s) {
        return Ok(ScalarValue::ZonedDateTime(zoned));
    }
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .map(ScalarValue::DateTime)
        .with_context(|| format!("invalid date-time {s:?}"))
}

#[cfg(test)]
mod tests {
    use bsync_core::WriteOptions;
    use bsync_schema::TypeDescriptor;

    use super::*;

    fn registry() -> Arc<SchemaRegistry> {
        Arc::new(
            SchemaRegistry::from_descriptors([
                TypeDescriptor::composite("Site")
                    .attribute("ID")
                    .child("Name", "Label")
                    .child("Opened", "Opened")
                    .child("Area", "Area")
                    .child("Alias", "Label"),
                TypeDescriptor::scalar("Label", ScalarKind::String),
                TypeDescriptor::scalar("Opened", ScalarKind::Date),
                TypeDescriptor::scalar("Area", ScalarKind::Decimal),
                TypeDescriptor::scalar("Start", ScalarKind::DateTime),
                TypeDescriptor::scalar("Bell", ScalarKind::Time),
                TypeDescriptor::scalar("Due", ScalarKind::MonthDay),
                TypeDescriptor::enumeration("Unknown", ["Unknown"]),
                TypeDescriptor::union("UnknownOrArea", ["Unknown", "Area"]),
                TypeDescriptor::union("UnknownOrOpened", ["Unknown", "Opened"]),
                TypeDescriptor::union("AnyDay", ["UnknownOrOpened", "Bell"]),
            ])
            .unwrap(),
        )
    }

    fn ty(name: &str) -> NodeType {
        NodeType::new(&registry(), name).unwrap()
    }

    #[test]
    fn test_build_composes_and_assigns_slots() {
        let recipe: Recipe = serde_yaml::from_str(
            r#"
type: Site
attributes: { ID: 7 }
children:
  - { type: Area, value: 12 }
  - { type: Label, value: HQ }
  - { type: Label, slot: Alias, value: Head office }
  - { type: Opened, value: 2019-01-01 }
"#,
        )
        .unwrap();
        let site = recipe.build(&registry()).unwrap();
        assert_eq!(
            site.to_xml_string(&WriteOptions::compact()).unwrap(),
            "<Site ID=\"7\"><Name>HQ</Name><Opened>2019-01-01</Opened>\
             <Area>12.000000</Area><Alias>Head office</Alias></Site>"
        );
    }

    #[test]
    fn test_error_names_recipe_path() {
        let recipe: Recipe = serde_yaml::from_str(
            "type: Site\nchildren:\n  - { type: Opened, value: not-a-date }\n",
        )
        .unwrap();
        let err = recipe.build(&registry()).unwrap_err();
        let message = format!("{err:#}");
        assert!(message.contains("Site/Opened"), "{message}");
        assert!(message.contains("invalid date"), "{message}");
    }

    #[test]
    fn test_unknown_type_is_reported() {
        let recipe: Recipe = serde_yaml::from_str("type: Nope\n").unwrap();
        let err = recipe.build(&registry()).unwrap_err();
        assert!(format!("{err:#}").contains("unknown node type"));
    }

    #[test]
    fn test_temporal_coercion() {
        let start = coerce(&Value::from("2019-01-01T00:00:00"), &ty("Start")).unwrap();
        assert_eq!(
            ty("Start").value(start).unwrap().text(),
            Some("2019-01-01T00:00:00")
        );

        let zoned = coerce(&Value::from("2019-01-01T08:00:00+02:00"), &ty("Start")).unwrap();
        assert!(matches!(zoned, ScalarValue::ZonedDateTime(_)));

        let bell = coerce(&Value::from("07:45:00"), &ty("Bell")).unwrap();
        assert_eq!(ty("Bell").value(bell).unwrap().text(), Some("07:45:00"));

        for lexical in ["01-01", "--01-01", "2019-01-01"] {
            let due = coerce(&Value::from(lexical), &ty("Due")).unwrap();
            assert_eq!(ty("Due").value(due).unwrap().text(), Some("01-01"));
        }
    }

    #[test]
    fn test_numbers_follow_declared_kind() {
        assert_eq!(
            coerce(&Value::from(3), &ty("Area")).unwrap(),
            ScalarValue::Float(3.0)
        );
        assert_eq!(
            coerce(&Value::from(3), &ty("Label")).unwrap(),
            ScalarValue::Integer(3)
        );
        assert_eq!(
            coerce(&Value::from("3"), &ty("Label")).unwrap(),
            ScalarValue::String("3".into())
        );
    }

    #[test]
    fn test_union_with_decimal_alternative() {
        let area = coerce(&Value::from(1250), &ty("UnknownOrArea")).unwrap();
        assert_eq!(area, ScalarValue::Float(1250.0));
        assert_eq!(
            ty("UnknownOrArea").value(area).unwrap().text(),
            Some("1250.000000")
        );

        let unknown = coerce(&Value::from("Unknown"), &ty("UnknownOrArea")).unwrap();
        assert_eq!(unknown, ScalarValue::String("Unknown".into()));
    }

    #[test]
    fn test_union_with_date_alternative() {
        let opened = coerce(&Value::from("2019-01-01"), &ty("UnknownOrOpened")).unwrap();
        assert_eq!(
            ty("UnknownOrOpened").value(opened).unwrap().text(),
            Some("2019-01-01")
        );

        let bell = coerce(&Value::from("07:45:00"), &ty("AnyDay")).unwrap();
        assert_eq!(ty("AnyDay").value(bell).unwrap().text(), Some("07:45:00"));
    }

    #[test]
    fn test_union_recipe_builds() {
        let recipe: Recipe = serde_yaml::from_str("type: UnknownOrArea\nvalue: 1250\n").unwrap();
        let node = recipe.build(&registry()).unwrap();
        assert_eq!(node.text(), Some("1250.000000"));
    }

    #[test]
    fn test_union_rejecting_every_candidate_fails() {
        let recipe: Recipe =
            serde_yaml::from_str("type: UnknownOrOpened\nvalue: someday\n").unwrap();
        let err = recipe.build(&registry()).unwrap_err();
        assert!(format!("{err:#}").contains("UnknownOrOpened"));
    }

    #[test]
    fn test_sequences_are_not_values() {
        let value: Value = serde_yaml::from_str("[1, 2]").unwrap();
        assert!(coerce(&value, &ty("Label")).is_err());
    }

    #[test]
    fn test_unknown_recipe_field_rejected() {
        assert!(serde_yaml::from_str::<Recipe>("type: Site\nvalues: 1\n").is_err());
    }

    #[test]
    fn test_load_json_recipe() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("site.json");
        std::fs::write(
            &path,
            r#"{"type": "Site", "children": [{"type": "Label", "value": "HQ"}]}"#,
        )
        .unwrap();
        let recipe = Recipe::load(&path).unwrap();
        assert_eq!(recipe.children.len(), 1);
        assert_eq!(recipe.children[0].value, Some(Value::from("HQ")));
    }

    #[test]
    fn test_load_rejects_unknown_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("site.txt");
        std::fs::write(&path, "type: Site").unwrap();
        assert!(Recipe::load(&path).is_err());
    }
}
