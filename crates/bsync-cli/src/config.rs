//! # Output Configuration
//!
//! Defaults for rendering, read from the `--config` YAML file. Command-line
//! flags override individual fields.
//!
//! ```yaml
//! indent: 4
//! xml_declaration: false
//! strict_attributes: true
//! format: json
//! ```

use std::path::Path;

use anyhow::{Context, Result};
use bsync_core::WriteOptions;
use bsync_schema::AttributePolicy;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Serialized document format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// XML markup.
    #[default]
    Xml,
    /// The markup tree as JSON.
    Json,
}

/// Rendering options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    /// Spaces per nesting level; `0` for single-line output.
    pub indent: usize,
    /// Write the `<?xml ...?>` declaration.
    pub xml_declaration: bool,
    /// Reject attribute keys the schema does not declare.
    pub strict_attributes: bool,
    pub format: OutputFormat,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            indent: 2,
            xml_declaration: true,
            strict_attributes: false,
            format: OutputFormat::Xml,
        }
    }
}

impl OutputConfig {
    /// Read a configuration file. Missing fields take their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file: {}", path.display()))?;
        let config: Self = serde_yaml::from_str(&content)
            .with_context(|| format!("parsing config file: {}", path.display()))?;
        tracing::debug!(path = %path.display(), ?config, "loaded output config");
        Ok(config)
    }

    /// Read `path` if given, otherwise use the defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => {
                tracing::debug!("no config file given; using default output config");
                Ok(Self::default())
            }
        }
    }

    pub fn write_options(&self) -> WriteOptions {
        WriteOptions {
            indent: self.indent,
            xml_declaration: self.xml_declaration,
        }
    }

    pub fn attribute_policy(&self) -> AttributePolicy {
        if self.strict_attributes {
            AttributePolicy::Strict
        } else {
            AttributePolicy::Advisory
        }
    }
}
