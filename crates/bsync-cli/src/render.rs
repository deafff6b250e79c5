//! # Render Subcommand
//!
//! Builds a document from a recipe against a descriptor registry and writes
//! it as XML or JSON.
//!
//! ```bash
//! bsync render recipes/example-building.yaml --schema schemas/ --indent 4
//! bsync render building.json --schema schemas/ --format json --out building.json.out
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use bsync_node::Node;
use bsync_schema::load_registry;
use clap::Args;

use crate::config::{OutputConfig, OutputFormat};
use crate::recipe::Recipe;

/// Arguments for the `bsync render` subcommand.
#[derive(Args, Debug)]
pub struct RenderArgs {
    /// Recipe file (YAML or JSON).
    pub recipe: PathBuf,

    /// Descriptor document or directory of documents.
    #[arg(long)]
    pub schema: PathBuf,

    /// Write to this file instead of stdout.
    #[arg(long, short)]
    pub out: Option<PathBuf>,

    /// Output format.
    #[arg(long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Spaces per nesting level (0 for single-line output).
    #[arg(long)]
    pub indent: Option<usize>,

    /// Omit the XML declaration.
    #[arg(long)]
    pub no_declaration: bool,

    /// Reject attribute keys the schema does not declare.
    #[arg(long)]
    pub strict_attributes: bool,
}

impl RenderArgs {
    /// Overlay the command-line flags on `config`.
    pub fn apply(&self, mut config: OutputConfig) -> OutputConfig {
        if let Some(format) = self.format {
            config.format = format;
        }
        if let Some(indent) = self.indent {
            config.indent = indent;
        }
        if self.no_declaration {
            config.xml_declaration = false;
        }
        if self.strict_attributes {
            config.strict_attributes = true;
        }
        config
    }
}

/// Execute the render subcommand.
pub fn run_render(args: &RenderArgs, config: &OutputConfig) -> Result<u8> {
    let config = args.apply(config.clone());

    let registry = load_registry(&args.schema, config.attribute_policy())
        .with_context(|| format!("loading schema: {}", args.schema.display()))?;
    tracing::info!(types = registry.len(), "schema loaded");
    let registry = Arc::new(registry);

    let recipe = Recipe::load(&args.recipe)?;
    let root = recipe
        .build(&registry)
        .with_context(|| format!("building document from {}", args.recipe.display()))?;
    let rendered = render(&root, &config)?;

    match &args.out {
        Some(path) => {
            std::fs::write(path, &rendered)
                .with_context(|| format!("writing output: {}", path.display()))?;
            println!("wrote: {}", path.display());
        }
        None => print!("{rendered}"),
    }
    Ok(0)
}

/// Serialize `root` per `config`, with a trailing newline.
pub fn render(root: &Node, config: &OutputConfig) -> Result<String> {
    let mut rendered = match config.format {
        OutputFormat::Xml => root
            .to_xml_string(&config.write_options())
            .context("writing XML")?,
        OutputFormat::Json => {
            serde_json::to_string_pretty(&root.to_element()).context("writing JSON")?
        }
    };
    rendered.push('\n');
    Ok(rendered)
}
