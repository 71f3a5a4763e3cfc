//! Template loading through an injected reader

use std::path::Path;

use tracing::debug;

use crate::error::FrontweaveError;
use crate::format::Format;
use crate::io::FileReader;
use crate::value::type_name;

use super::{TemplateDefinition, TemplateError};

/// Anything that can produce a template for a path
pub trait TemplateSource {
    fn load(&self, path: &Path) -> Result<TemplateDefinition, TemplateError>;
}

impl<T: TemplateSource + ?Sized> TemplateSource for &T {
    fn load(&self, path: &Path) -> Result<TemplateDefinition, TemplateError> {
        (**self).load(path)
    }
}

/// Loads templates with a [`FileReader`], inferring syntax from the extension
///
/// Files without a recognised extension are read as JSON.
#[derive(Debug, Clone)]
pub struct TemplateLoader<R> {
    reader: R,
}

impl<R: FileReader> TemplateLoader<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }

    /// Parse template text that has already been read
    ///
    /// # Errors
    ///
    /// - `EMPTY_TEMPLATE_FILE` for empty or whitespace-only text
    /// - `TEMPLATE_PARSE_ERROR` for syntax errors or a non-mapping root
    pub fn parse(
        text: &str,
        syntax: Format,
        path: &Path,
    ) -> Result<TemplateDefinition, TemplateError> {
        if text.trim().is_empty() {
            return Err(TemplateError::EmptyFile {
                path: path.to_path_buf(),
            });
        }

        let content = syntax.parse(text).map_err(|message| TemplateError::Parse {
            path: path.to_path_buf(),
            message,
        })?;

        if !content.is_object() {
            return Err(TemplateError::Parse {
                path: path.to_path_buf(),
                message: format!("template root must be a mapping, found {}", type_name(&content)),
            });
        }

        Ok(TemplateDefinition::new(content, syntax).with_source(path))
    }
}

impl<R: FileReader> TemplateSource for TemplateLoader<R> {
    fn load(&self, path: &Path) -> Result<TemplateDefinition, TemplateError> {
        let text = self.reader.read(path).map_err(|e| match e {
            FrontweaveError::FileNotFound { path } => TemplateError::NotFound { path },
            other => TemplateError::Read {
                path: path.to_path_buf(),
                message: other.to_string(),
            },
        })?;

        let syntax = Format::from_path(path).unwrap_or_default();
        debug!(path = %path.display(), %syntax, "loading template");
        Self::parse(&text, syntax, path)
    }
}
