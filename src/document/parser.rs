//! YAML and JSON parsing into [`Document`] trees.

use std::path::Path;

use serde::Deserialize;

use crate::document::Document;
use crate::error::{LintError, Result};

/// Parse a single YAML (or JSON) document.
pub fn parse(text: &str) -> Result<Document> {
    serde_yaml::from_str::<serde_yaml::Value>(text)
        .map(Document::from)
        .map_err(|e| LintError::from_yaml(&e))
}

/// Parse a `---` separated YAML stream.
///
/// Empty entries come back as null documents so that document indices
/// match the source file.
pub fn parse_stream(text: &str) -> Result<Vec<Document>> {
    let mut documents = Vec::new();

    for deserializer in serde_yaml::Deserializer::from_str(text) {
        let value = serde_yaml::Value::deserialize(deserializer)
            .map_err(|e| LintError::from_yaml(&e))?;
        documents.push(Document::from(value));
    }

    log::debug!("Parsed {} document(s) from stream", documents.len());
    Ok(documents)
}

/// Parse strict JSON.
pub fn parse_json(text: &str) -> Result<Document> {
    serde_json::from_str::<serde_json::Value>(text)
        .map(Document::from)
        .map_err(|e| LintError::from_json(&e))
}

/// Read and parse a manifest file. `.json` files are parsed as a single JSON
/// document, everything else as a YAML stream.
pub fn read_stream(path: &Path) -> Result<Vec<Document>> {
    let content = std::fs::read_to_string(path)?;
    match path.extension().and_then(|e| e.to_str()) {
        Some("json") => parse_json(&content).map(|doc| vec![doc]),
        _ => parse_stream(&content),
    }
}
