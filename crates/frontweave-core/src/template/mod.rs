//! Template definitions, loading, and caching
//!
//! Templates are JSON or YAML files whose root is a mapping. Both syntaxes parse
//! into the same tree model, so the rest of the engine never sees the difference.
//!
//! ## Syntax
//!
//! - Placeholders: `{key}` or `{nested.key}`
//! - Items marker: `{@items}` (see [`crate::items`])
//! - Positional variables inside item templates: `{$index}`, `{$first}`, `{$last}`

pub mod cache;
pub mod error;
pub mod loader;

use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::format::Format;

pub use cache::TemplateCache;
pub use error::TemplateError;
pub use loader::{TemplateLoader, TemplateSource};

/// A parsed template tree and where it came from
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateDefinition {
    content: Value,
    syntax: Format,
    source: Option<PathBuf>,
}

impl TemplateDefinition {
    /// Create a template from an in-memory tree
    pub fn new(content: Value, syntax: Format) -> Self {
        Self {
            content,
            syntax,
            source: None,
        }
    }

    /// Attach the path the template was loaded from
    pub fn with_source(mut self, path: impl Into<PathBuf>) -> Self {
        self.source = Some(path.into());
        self
    }

    pub fn content(&self) -> &Value {
        &self.content
    }

    pub fn syntax(&self) -> Format {
        self.syntax
    }

    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }
}
