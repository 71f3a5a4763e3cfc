//! Structured (JSON) and line-oriented (YAML) text syntaxes

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{FrontweaveError, Result};

/// Text syntax of a template or output document
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    #[default]
    Json,
    Yaml,
}

impl Format {
    /// Infer the syntax from a file extension (`.yaml`/`.yml` → YAML)
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()?.to_ascii_lowercase().as_str() {
            "json" => Some(Format::Json),
            "yaml" | "yml" => Some(Format::Yaml),
            _ => None,
        }
    }

    /// Parse text into the tree model
    ///
    /// Returns the parser message on failure so callers can attach a path.
    pub fn parse(&self, text: &str) -> std::result::Result<Value, String> {
        match self {
            Format::Json => serde_json::from_str(text).map_err(|e| e.to_string()),
            Format::Yaml => serde_yaml::from_str(text).map_err(|e| e.to_string()),
        }
    }

    /// Serialize a tree to text
    ///
    /// JSON is pretty-printed with a trailing newline.
    pub fn serialize(&self, value: &Value) -> Result<String> {
        match self {
            Format::Json => {
                let mut text = serde_json::to_string_pretty(value)?;
                text.push('\n');
                Ok(text)
            }
            Format::Yaml => Ok(serde_yaml::to_string(value)?),
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Format::Json => write!(f, "json"),
            Format::Yaml => write!(f, "yaml"),
        }
    }
}

impl FromStr for Format {
    type Err = FrontweaveError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(Format::Json),
            "yaml" | "yml" => Ok(Format::Yaml),
            other => Err(FrontweaveError::ConfigInvalidValue {
                field: "format".to_string(),
                reason: format!("unknown format '{}', expected json or yaml", other),
            }),
        }
    }
}
