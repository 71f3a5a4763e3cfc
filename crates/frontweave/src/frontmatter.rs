//! YAML frontmatter extraction from Markdown documents

use std::path::Path;

use anyhow::Context;
use serde_json::{Map, Value};
use thiserror::Error;

const DELIMITER: &str = "---";
const YAML_END: &str = "...";

/// Frontmatter extraction errors
#[derive(Debug, Error)]
pub enum FrontmatterError {
    #[error("unterminated frontmatter block")]
    Unterminated,

    #[error("invalid frontmatter YAML: {0}")]
    Yaml(String),

    #[error("frontmatter must be a mapping")]
    NotMapping,
}

/// Extract the `---` delimited YAML block at the top of `text`
///
/// Returns `Ok(None)` when the document has no frontmatter. An empty block
/// yields an empty mapping.
pub fn extract(text: &str) -> Result<Option<Value>, FrontmatterError> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let mut lines = text.split_inclusive('\n');

    match lines.next() {
        Some(first) if first.trim_end() == DELIMITER => {}
        _ => return Ok(None),
    }

    let mut yaml = String::new();
    let mut terminated = false;
    for line in lines {
        let trimmed = line.trim_end();
        if trimmed == DELIMITER || trimmed == YAML_END {
            terminated = true;
            break;
        }
        yaml.push_str(line);
    }
    if !terminated {
        return Err(FrontmatterError::Unterminated);
    }

    if yaml.trim().is_empty() {
        return Ok(Some(Value::Object(Map::new())));
    }

    let value: Value =
        serde_yaml::from_str(&yaml).map_err(|e| FrontmatterError::Yaml(e.to_string()))?;
    match value {
        Value::Object(_) => Ok(Some(value)),
        _ => Err(FrontmatterError::NotMapping),
    }
}

/// Read `path` and extract its frontmatter
pub fn read(path: &Path) -> anyhow::Result<Option<Value>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read '{}'", path.display()))?;
    extract(&text).with_context(|| format!("invalid frontmatter in '{}'", path.display()))
}
