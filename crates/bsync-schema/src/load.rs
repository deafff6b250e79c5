//! Loading descriptor documents from disk.
//!
//! A descriptor source is either a single YAML/JSON document or a directory
//! of them. Directory entries are read in file-name order so that the
//! resulting registry, and any `DuplicateType` error, is deterministic.

use std::path::{Path, PathBuf};

use crate::descriptor::{SchemaDocument, TypeDescriptor};
use crate::error::SchemaError;
use crate::registry::{AttributePolicy, SchemaRegistry};

/// Serialization format of a descriptor document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Yaml,
    Json,
}

impl DocumentFormat {
    /// Infer the format from a file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => Some(Self::Yaml),
            Some("json") => Some(Self::Json),
            _ => None,
        }
    }
}

/// Parse one descriptor document.
///
/// `origin` names the source in error messages.
pub fn parse_document(
    content: &str,
    format: DocumentFormat,
    origin: &str,
) -> Result<SchemaDocument, SchemaError> {
    let load_err = |reason: String| SchemaError::DocumentLoad {
        path: origin.to_string(),
        reason,
    };
    match format {
        DocumentFormat::Yaml => serde_yaml::from_str(content).map_err(|e| load_err(e.to_string())),
        DocumentFormat::Json => serde_json::from_str(content).map_err(|e| load_err(e.to_string())),
    }
}

/// Read every descriptor from a document file or a directory of documents.
///
/// Files in a directory without a `.yaml`, `.yml` or `.json` extension are
/// skipped. Subdirectories are not descended into.
pub fn load_descriptors(path: &Path) -> Result<Vec<TypeDescriptor>, SchemaError> {
    let files = if path.is_dir() {
        document_files(path)?
    } else {
        vec![path.to_path_buf()]
    };

    let mut descriptors = Vec::new();
    for file in &files {
        let doc = load_document(file)?;
        tracing::debug!(
            path = %file.display(),
            types = doc.types.len(),
            "loaded descriptor document"
        );
        descriptors.extend(doc.types);
    }
    Ok(descriptors)
}

/// Load descriptors from `path` and build a registry with `policy`.
pub fn load_registry(path: &Path, policy: AttributePolicy) -> Result<SchemaRegistry, SchemaError> {
    let descriptors = load_descriptors(path)?;
    SchemaRegistry::builder()
        .descriptors(descriptors)
        .attribute_policy(policy)
        .build()
}

fn load_document(path: &Path) -> Result<SchemaDocument, SchemaError> {
    let format = DocumentFormat::from_path(path).ok_or_else(|| SchemaError::DocumentLoad {
        path: path.display().to_string(),
        reason: "unrecognized extension (expected .yaml, .yml or .json)".to_string(),
    })?;
    let content = std::fs::read_to_string(path).map_err(|e| SchemaError::DocumentLoad {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;
    parse_document(&content, format, &path.display().to_string())
}

fn document_files(dir: &Path) -> Result<Vec<PathBuf>, SchemaError> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && DocumentFormat::from_path(&path).is_some() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}
