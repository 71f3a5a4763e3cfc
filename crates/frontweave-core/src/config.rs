use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::compose::DEFAULT_ITEMS_KEY;
use crate::error::{FrontweaveError, Result};
use crate::format::Format;
use crate::substitute::MissingMode;

/// Default config file name, looked up in the working directory
pub const CONFIG_FILE: &str = "frontweave.toml";

/// frontweave.toml schema
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub render: RenderConfig,
    #[serde(default)]
    pub schema: SchemaConfig,
    #[serde(default)]
    pub input: InputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    pub main_template: PathBuf,
    #[serde(default)]
    pub item_template: Option<PathBuf>,
    pub output: PathBuf,
    /// Inferred from the output extension when absent
    #[serde(default)]
    pub format: Option<Format>,
    #[serde(default)]
    pub missing: MissingMode,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaConfig {
    #[serde(default)]
    pub path: Option<PathBuf>,
    #[serde(default = "default_items_key")]
    pub items_key: String,
}

impl Default for SchemaConfig {
    fn default() -> Self {
        Self {
            path: None,
            items_key: default_items_key(),
        }
    }
}

fn default_items_key() -> String {
    DEFAULT_ITEMS_KEY.to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct InputConfig {
    /// Documents contributing one collection element each
    #[serde(default)]
    pub documents: Vec<PathBuf>,
    /// Document providing main data
    #[serde(default)]
    pub main: Option<PathBuf>,
}

impl Config {
    /// Load frontweave.toml
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| FrontweaveError::ConfigParseError(e.to_string()))?;

        let config: Config =
            toml::from_str(&content).map_err(|e| FrontweaveError::ConfigParseError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.schema.items_key.trim().is_empty() {
            return Err(FrontweaveError::ConfigInvalidValue {
                field: "schema.items_key".to_string(),
                reason: "must not be empty".to_string(),
            });
        }
        Ok(())
    }
}
