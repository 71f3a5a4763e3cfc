//! Rendering orchestrator
//!
//! Loads the container and item templates, composes the data context, fills the
//! container placeholders, expands the items marker, then serializes and writes.

use std::path::Path;
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info};

use crate::compose::{DataComposer, ExpansionKey, DEFAULT_ITEMS_KEY};
use crate::error::{FrontweaveError, Result};
use crate::format::Format;
use crate::io::{FileReader, FileWriter};
use crate::items::ExpansionEngine;
use crate::schema::{JsonSchema, SchemaBindingResolver};
use crate::substitute::{MissingMode, Substituter};
use crate::template::{TemplateCache, TemplateDefinition, TemplateError, TemplateLoader, TemplateSource};

/// Knobs for one [`Renderer`]
#[derive(Debug, Clone)]
pub struct RenderOptions {
    pub missing: MissingMode,
    /// Output syntax when neither the caller nor the output extension names one
    pub default_format: Format,
    /// Attach point for the collection when the schema declares no hierarchy root
    pub items_key: String,
    pub schema: Option<JsonSchema>,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            missing: MissingMode::default(),
            default_format: Format::default(),
            items_key: DEFAULT_ITEMS_KEY.to_string(),
            schema: None,
        }
    }
}

/// Renders one composed output document per call
///
/// Each call builds fresh values; the optional template cache is the only
/// state shared between calls.
#[derive(Debug)]
pub struct Renderer<R, W> {
    loader: TemplateLoader<R>,
    writer: W,
    cache: Option<TemplateCache>,
    options: RenderOptions,
}

impl<R: FileReader, W: FileWriter> Renderer<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        Self {
            loader: TemplateLoader::new(reader),
            writer,
            cache: None,
            options: RenderOptions::default(),
        }
    }

    pub fn with_options(mut self, options: RenderOptions) -> Self {
        self.options = options;
        self
    }

    /// Keep loaded templates across calls
    pub fn with_cache(mut self, cache: TemplateCache) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    pub fn cache(&self) -> Option<&TemplateCache> {
        self.cache.as_ref()
    }

    /// Render and write one output document
    ///
    /// The output syntax is `format`, else inferred from `output_path`, else
    /// [`RenderOptions::default_format`].
    ///
    /// # Errors
    ///
    /// - `INVALID_TEMPLATE` naming the template that could not be parsed
    /// - `TEMPLATE_LOAD_ERROR` when the item template cannot be fetched
    /// - loader, composition, expansion, and substitution errors
    /// - `WRITE_ERROR` naming `output_path`
    pub fn render_output(
        &self,
        main_template_path: &Path,
        item_template_path: Option<&Path>,
        main_data: &Value,
        items_data: &[Value],
        output_path: &Path,
        format: Option<Format>,
    ) -> Result<()> {
        let rendered = self.render_value(main_template_path, item_template_path, main_data, items_data)?;

        let format = format
            .or_else(|| Format::from_path(output_path))
            .unwrap_or(self.options.default_format);
        let text = format.serialize(&rendered)?;

        self.writer.write(output_path, &text)?;
        info!(output = %output_path.display(), %format, items = items_data.len(), "output written");
        Ok(())
    }

    /// Render to a tree without serializing or writing
    pub fn render_value(
        &self,
        main_template_path: &Path,
        item_template_path: Option<&Path>,
        main_data: &Value,
        items_data: &[Value],
    ) -> Result<Value> {
        let main_template = self.load(main_template_path).map_err(main_template_error)?;
        let item_template = item_template_path
            .map(|path| self.load(path).map_err(item_template_error))
            .transpose()?;

        let target = match &self.options.schema {
            Some(schema) => SchemaBindingResolver::new().resolve_hierarchy_root(schema)?,
            None => None,
        }
        .unwrap_or_else(|| self.options.items_key.clone());

        let composed = DataComposer::new().compose(
            main_data,
            &Value::Array(items_data.to_vec()),
            &[ExpansionKey::items(target)],
        )?;

        debug!(attached = ?composed.items_key(), "data composed");

        // The container is filled before splicing; `{@items}` has no value in
        // main data and stays in place as the marker. Spliced elements are
        // never substituted again.
        let substituter = Substituter::with_mode(self.options.missing);
        let container = substituter.substitute(main_template.content(), &composed.main_data)?;

        let engine = ExpansionEngine::with_substituter(substituter);
        let mut expansion = engine.expand(
            Some(&container),
            &composed.array_data,
            item_template.as_ref().map(|t| t.content()),
            &composed.main_data,
        )?;
        if !expansion.was_expanded {
            expansion = engine.splice_raw(Some(&container), &composed.array_data)?;
        }
        debug!(
            expanded = expansion.was_expanded,
            items = expansion.expanded_item_count,
            "items expansion finished"
        );

        Ok(expansion.expanded_content)
    }

    fn load(&self, path: &Path) -> std::result::Result<Arc<TemplateDefinition>, TemplateError> {
        match &self.cache {
            Some(cache) => cache.get_or_load(path, &self.loader),
            None => self.loader.load(path).map(Arc::new),
        }
    }
}

fn main_template_error(err: TemplateError) -> FrontweaveError {
    match err {
        TemplateError::Parse { path, message } => FrontweaveError::InvalidTemplate {
            path,
            reason: message,
        },
        other => FrontweaveError::Template(other),
    }
}

fn item_template_error(err: TemplateError) -> FrontweaveError {
    match err {
        TemplateError::Parse { path, message } => FrontweaveError::InvalidTemplate {
            path,
            reason: message,
        },
        other => FrontweaveError::TemplateLoad {
            path: other.path().to_path_buf(),
            reason: other.to_string(),
        },
    }
}
