//! Specification loading and the adapter layer over the raw document tree.
//!
//! Each format is responsible for turning spec text into a JSON value tree.
//! YAML is transcoded to JSON so the extractors only ever see one shape.
//! The node views in [`node`] are the only place that reads raw
//! `serde_json::Value`s; extractors go through them.

mod node;

use std::path::Path;

use serde_json::Value;

use crate::diagnostic::GeneratorError;

pub use node::{AdditionalNode, AsyncApiDocument, ChannelNode, MessageNode, SchemaNode};

/// A specification text format.
pub trait SpecFormat {
    /// Returns the format name (e.g., "yaml", "json").
    fn name(&self) -> &str;

    /// Returns file extensions this format handles.
    fn extensions(&self) -> &[&str];

    /// Parses spec text into a JSON value tree.
    fn parse(&self, text: &str, path: &Path) -> Result<Value, GeneratorError>;
}

/// YAML specifications.
pub struct YamlFormat;

impl SpecFormat for YamlFormat {
    fn name(&self) -> &str {
        "yaml"
    }

    fn extensions(&self) -> &[&str] {
        &["yaml", "yml"]
    }

    fn parse(&self, text: &str, path: &Path) -> Result<Value, GeneratorError> {
        serde_yaml::from_str::<Value>(text).map_err(|e| {
            let location = e.location();
            GeneratorError::SpecParseError {
                path: path.to_path_buf(),
                message: e.to_string(),
                line: location.as_ref().map(|l| l.line()),
                column: location.as_ref().map(|l| l.column()),
            }
        })
    }
}

/// JSON specifications.
pub struct JsonFormat;

impl SpecFormat for JsonFormat {
    fn name(&self) -> &str {
        "json"
    }

    fn extensions(&self) -> &[&str] {
        &["json"]
    }

    fn parse(&self, text: &str, path: &Path) -> Result<Value, GeneratorError> {
        serde_json::from_str::<Value>(text).map_err(|e| GeneratorError::SpecParseError {
            path: path.to_path_buf(),
            message: e.to_string(),
            line: Some(e.line()),
            column: Some(e.column()),
        })
    }
}

/// Picks the format for a spec file by its extension.
pub fn format_for_path(path: &Path) -> Result<Box<dyn SpecFormat>, GeneratorError> {
    let extension = path
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();

    let formats: [Box<dyn SpecFormat>; 2] = [Box::new(YamlFormat), Box::new(JsonFormat)];
    formats
        .into_iter()
        .find(|f| f.extensions().contains(&extension.as_str()))
        .ok_or_else(|| GeneratorError::UnsupportedSpecFormat {
            path: path.to_path_buf(),
        })
}

/// Parses spec text, choosing the format from `path`.
pub fn parse_document(text: &str, path: &Path) -> Result<AsyncApiDocument, GeneratorError> {
    let format = format_for_path(path)?;
    let root = format.parse(text, path)?;
    if !root.is_object() {
        return Err(GeneratorError::SpecParseError {
            path: path.to_path_buf(),
            message: "the document root must be a mapping".to_string(),
            line: None,
            column: None,
        });
    }
    tracing::debug!(format = format.name(), path = %path.display(), "parsed specification");
    Ok(AsyncApiDocument::new(root))
}

/// Reads and parses a spec file.
pub fn load_document(path: &Path) -> Result<AsyncApiDocument, GeneratorError> {
    // Reject unknown extensions before touching the file system.
    format_for_path(path)?;
    let text = std::fs::read_to_string(path).map_err(|e| GeneratorError::io(path, e.to_string()))?;
    parse_document(&text, path)
}
