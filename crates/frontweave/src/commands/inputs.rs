//! Loading documents and schemas for commands

use std::path::Path;

use anyhow::{Context, Result};
use frontweave_core::{Format, JsonSchema};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::frontmatter;

/// Frontmatter of every document, in order; documents without one are skipped
pub fn load_documents(paths: &[impl AsRef<Path>]) -> Result<Vec<Value>> {
    let mut items = Vec::with_capacity(paths.len());
    for path in paths {
        let path = path.as_ref();
        match frontmatter::read(path)? {
            Some(metadata) => {
                debug!(document = %path.display(), "frontmatter loaded");
                items.push(metadata);
            }
            None => warn!(document = %path.display(), "no frontmatter, skipping"),
        }
    }
    Ok(items)
}

/// Main data from an optional document; absent or frontmatter-less means empty
pub fn load_main(path: Option<&Path>) -> Result<Value> {
    let Some(path) = path else {
        return Ok(Value::Object(Map::new()));
    };
    match frontmatter::read(path)? {
        Some(metadata) => Ok(metadata),
        None => {
            warn!(document = %path.display(), "main document has no frontmatter");
            Ok(Value::Object(Map::new()))
        }
    }
}

/// Parse a JSON or YAML schema file
pub fn load_schema(path: &Path) -> Result<JsonSchema> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read schema '{}'", path.display()))?;
    let syntax = Format::from_path(path).unwrap_or_default();
    JsonSchema::parse(&text, syntax).with_context(|| format!("schema '{}'", path.display()))
}
