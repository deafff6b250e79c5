//! # Schema Subcommand
//!
//! Inspects a descriptor registry.
//!
//! - `bsync schema list --schema <path>`: one line per type: name and content model.
//! - `bsync schema show <TYPE> --schema <path>`: the resolved descriptor.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use bsync_schema::{
    load_registry, AttributePolicy, ContentModel, Occurs, ResolvedType, SchemaRegistry, TypeId,
};
use clap::{Args, Subcommand};

/// Arguments for the `bsync schema` subcommand.
#[derive(Args, Debug)]
pub struct SchemaArgs {
    #[command(subcommand)]
    pub command: SchemaCommand,
}

/// Schema subcommands.
#[derive(Subcommand, Debug)]
pub enum SchemaCommand {
    /// List every type with its content model.
    List {
        /// Descriptor document or directory of documents.
        #[arg(long)]
        schema: PathBuf,
    },
    /// Show one resolved descriptor.
    Show {
        /// Full dotted type name.
        type_name: String,

        /// Descriptor document or directory of documents.
        #[arg(long)]
        schema: PathBuf,
    },
}

/// Execute the schema subcommand.
pub fn run_schema(args: &SchemaArgs) -> Result<u8> {
    match &args.command {
        SchemaCommand::List { schema } => {
            let registry = load(schema)?;
            for line in list_lines(&registry) {
                println!("{line}");
            }
            Ok(0)
        }
        SchemaCommand::Show { type_name, schema } => {
            let registry = load(schema)?;
            let ty = registry
                .by_name(type_name)
                .with_context(|| format!("unknown type {type_name:?}"))?;
            print!("{}", describe(&registry, ty));
            Ok(0)
        }
    }
}

fn load(path: &Path) -> Result<SchemaRegistry> {
    load_registry(path, AttributePolicy::Advisory)
        .with_context(|| format!("loading schema: {}", path.display()))
}

/// Short label for a type's content model.
pub fn model_label(ty: &ResolvedType) -> String {
    match ty.content_model() {
        ContentModel::Enumeration => "enumeration".to_string(),
        ContentModel::Union => "union".to_string(),
        ContentModel::Scalar(kind) => kind.xsd_name().to_string(),
        ContentModel::Composite => "composite".to_string(),
    }
}

/// One `name  model` line per type, sorted by name.
pub fn list_lines(registry: &SchemaRegistry) -> Vec<String> {
    let names = registry.type_names();
    let width = names.iter().map(|n| n.len()).max().unwrap_or(0);
    names
        .into_iter()
        .filter_map(|name| registry.by_name(name))
        .map(|ty| format!("{:<width$}  {}", ty.name, model_label(ty)))
        .collect()
}

/// Multi-line description of one resolved type.
pub fn describe(registry: &SchemaRegistry, ty: &ResolvedType) -> String {
    let name_of = |id: TypeId| registry.descriptor(id).name.as_str();

    let mut out = String::new();
    let _ = writeln!(out, "type:     {}", ty.name);
    let _ = writeln!(out, "element:  {}", ty.element_name());
    let _ = writeln!(out, "model:    {}", model_label(ty));
    if let Some(base) = ty.base {
        let _ = writeln!(out, "base:     {}", name_of(base));
    }
    if let Some(doc) = &ty.documentation {
        let _ = writeln!(out, "doc:      {doc}");
    }
    if !ty.enumerations.is_empty() {
        let _ = writeln!(out, "values:   {}", ty.enumerations.join(", "));
    }
    if !ty.union.is_empty() {
        let alternatives: Vec<&str> = ty.union.iter().map(|id| name_of(*id)).collect();
        let _ = writeln!(out, "union:    {}", alternatives.join(", "));
    }
    if !ty.attributes.is_empty() {
        let _ = writeln!(out, "attrs:    {}", ty.attributes.join(", "));
    }
    if !ty.children.is_empty() {
        let _ = writeln!(out, "children:");
        for child in &ty.children {
            let occurs = match child.occurs {
                Occurs::Once => " (once)",
                Occurs::Repeated => "",
            };
            let _ = writeln!(out, "  {}: {}{occurs}", child.name, name_of(child.type_id));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use bsync_core::ScalarKind;
    use bsync_schema::TypeDescriptor;

    use super::*;

    fn registry() -> SchemaRegistry {
        SchemaRegistry::from_descriptors([
            TypeDescriptor::composite("Sites")
                .documented("All sites.")
                .child_once("Site", "Site"),
            TypeDescriptor::composite("Sites.Site").attribute("ID"),
            TypeDescriptor::enumeration("Unknown", ["Unknown"]),
            TypeDescriptor::scalar("Count", ScalarKind::Integer),
            TypeDescriptor::union("CountOrUnknown", ["Count", "Unknown"]),
            TypeDescriptor::composite("MainSite").extends("Sites.Site"),
        ])
        .unwrap()
    }

    #[test]
    fn test_list_is_sorted_with_models() {
        let lines = list_lines(&registry());
        assert_eq!(lines.len(), 6);
        assert!(lines[0].starts_with("Count "));
        assert!(lines[0].ends_with("xs:integer"));
        assert!(lines.iter().any(|l| l.starts_with("CountOrUnknown") && l.ends_with("union")));
        assert!(lines.iter().any(|l| l.starts_with("Unknown") && l.ends_with("enumeration")));
        assert!(lines.iter().any(|l| l.starts_with("Sites ") && l.ends_with("composite")));
    }

    #[test]
    fn test_describe_composite() {
        let reg = registry();
        let text = describe(&reg, reg.by_name("Sites").unwrap());
        assert!(text.contains("type:     Sites\n"));
        assert!(text.contains("doc:      All sites.\n"));
        assert!(text.contains("  Site: Sites.Site (once)\n"));
    }

    #[test]
    fn test_describe_union_and_subtype() {
        let reg = registry();
        let union = describe(&reg, reg.by_name("CountOrUnknown").unwrap());
        assert!(union.contains("union:    Count, Unknown\n"));

        let main = describe(&reg, reg.by_name("MainSite").unwrap());
        assert!(main.contains("base:     Sites.Site\n"));
        assert!(main.contains("attrs:    ID\n"));
    }

    #[test]
    fn test_show_unknown_type_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("schema.yaml");
        std::fs::write(&path, "types:\n  - name: Sites\n").unwrap();
        let args = SchemaArgs {
            command: SchemaCommand::Show {
                type_name: "Nope".into(),
                schema: path.clone(),
            },
        };
        let err = run_schema(&args).unwrap_err();
        assert!(err.to_string().contains("unknown type"));

        let args = SchemaArgs {
            command: SchemaCommand::List { schema: path },
        };
        assert_eq!(run_schema(&args).unwrap(), 0);
    }
}
