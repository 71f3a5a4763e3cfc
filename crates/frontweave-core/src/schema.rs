//! Schema binding: which data field the items marker draws from
//!
//! A schema flags at most one field as the hierarchy root. Contexts built through
//! [`SchemaBindingResolver`] resolve `{@items}` to that field's sequence.

use std::borrow::Cow;

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::error::{FrontweaveError, Result};
use crate::format::Format;
use crate::items::context::ItemContextBuilder;
use crate::items::ITEMS_TOKEN;
use crate::substitute::tokenize::tokens;
use crate::substitute::VariableResolver;
use crate::value::{lookup, type_name};

/// JSON Schema extension keyword flagging the hierarchy root
pub const HIERARCHY_ROOT_FLAG: &str = "x-frontmatter-part";

/// What the resolver needs to know about a schema
pub trait SchemaProvider {
    /// Does `field` carry the repeatable-collection flag
    fn is_hierarchy_root(&self, field: &str) -> bool;

    /// Every top-level field the schema declares, in declaration order
    fn field_names(&self) -> Vec<String>;
}

/// Schema provider over a JSON Schema document's top-level `properties`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JsonSchema {
    properties: serde_json::Map<String, Value>,
}

impl JsonSchema {
    /// # Errors
    ///
    /// `SCHEMA_INVALID` when the root or `properties` is not a mapping.
    pub fn from_value(schema: &Value) -> Result<Self> {
        let Value::Object(root) = schema else {
            return Err(FrontweaveError::SchemaInvalid(format!(
                "schema root must be a mapping, found {}",
                type_name(schema)
            )));
        };

        let properties = match root.get("properties") {
            None => serde_json::Map::new(),
            Some(Value::Object(properties)) => properties.clone(),
            Some(other) => {
                return Err(FrontweaveError::SchemaInvalid(format!(
                    "'properties' must be a mapping, found {}",
                    type_name(other)
                )))
            }
        };

        Ok(Self { properties })
    }

    /// Parse schema text in the given syntax
    pub fn parse(text: &str, syntax: Format) -> Result<Self> {
        let value = syntax.parse(text).map_err(FrontweaveError::SchemaInvalid)?;
        Self::from_value(&value)
    }
}

impl SchemaProvider for JsonSchema {
    fn is_hierarchy_root(&self, field: &str) -> bool {
        self.properties
            .get(field)
            .and_then(|property| property.get(HIERARCHY_ROOT_FLAG))
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    fn field_names(&self) -> Vec<String> {
        self.properties.keys().cloned().collect()
    }
}

/// Why `{@items}` could not be bound
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BindingError {
    #[error("NO_HIERARCHY_ROOT: the schema declares no field flagged x-frontmatter-part")]
    NoHierarchyRoot,

    #[error("ROOT_FIELD_MISSING: hierarchy root '{field}' is not present in the data")]
    RootFieldMissing { field: String },

    #[error("ROOT_FIELD_NOT_SEQUENCE: hierarchy root '{field}' is a {found}, not a sequence")]
    RootFieldNotSequence { field: String, found: String },
}

impl BindingError {
    pub fn code(&self) -> &'static str {
        match self {
            BindingError::NoHierarchyRoot => "NO_HIERARCHY_ROOT",
            BindingError::RootFieldMissing { .. } => "ROOT_FIELD_MISSING",
            BindingError::RootFieldNotSequence { .. } => "ROOT_FIELD_NOT_SEQUENCE",
        }
    }
}

/// Data context aware of the hierarchy root
#[derive(Debug, Clone, PartialEq)]
pub struct VariableContext {
    data: Value,
    hierarchy_root: Option<String>,
}

impl VariableContext {
    pub fn new(data: Value, hierarchy_root: Option<String>) -> Self {
        Self {
            data,
            hierarchy_root,
        }
    }

    pub fn data(&self) -> &Value {
        &self.data
    }

    pub fn hierarchy_root(&self) -> Option<&str> {
        self.hierarchy_root.as_deref()
    }

    /// The collection `{@items}` is bound to
    pub fn resolve_items(&self) -> std::result::Result<&[Value], BindingError> {
        let field = self
            .hierarchy_root
            .as_deref()
            .ok_or(BindingError::NoHierarchyRoot)?;

        match lookup(&self.data, field) {
            None => Err(BindingError::RootFieldMissing {
                field: field.to_string(),
            }),
            Some(Value::Array(items)) => Ok(items),
            Some(other) => Err(BindingError::RootFieldNotSequence {
                field: field.to_string(),
                found: type_name(other).to_string(),
            }),
        }
    }
}

impl VariableResolver for VariableContext {
    fn resolve(&self, path: &str) -> Option<Cow<'_, Value>> {
        if path == ITEMS_TOKEN {
            return self
                .hierarchy_root
                .as_deref()
                .and_then(|field| lookup(&self.data, field))
                .filter(|value| value.is_array())
                .map(Cow::Borrowed);
        }
        lookup(&self.data, path).map(Cow::Borrowed)
    }

    fn validate(&self) -> Result<()> {
        self.data.validate()
    }
}

/// Token-resolvability and items-binding diagnostics for one template
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BindingReport {
    pub total_tokens: usize,
    pub valid_tokens: usize,
    pub invalid_tokens: usize,
    pub invalid_token_names: Vec<String>,
    pub uses_items: bool,
    pub items_binding_valid: bool,
    pub items_binding_reason: Option<String>,
    pub hierarchy_root: Option<String>,
}

impl BindingReport {
    /// No unresolvable tokens, and a valid items binding when one is used
    pub fn is_valid(&self) -> bool {
        self.invalid_tokens == 0 && (!self.uses_items || self.items_binding_valid)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SchemaBindingResolver;

impl SchemaBindingResolver {
    pub fn new() -> Self {
        Self
    }

    /// The single field flagged as hierarchy root, if any
    ///
    /// # Errors
    ///
    /// `AMBIGUOUS_HIERARCHY_ROOT` when more than one field is flagged.
    pub fn resolve_hierarchy_root<S>(&self, schema: &S) -> Result<Option<String>>
    where
        S: SchemaProvider + ?Sized,
    {
        let mut flagged: Vec<String> = schema
            .field_names()
            .into_iter()
            .filter(|field| schema.is_hierarchy_root(field))
            .collect();

        match flagged.len() {
            0 | 1 => Ok(flagged.pop()),
            _ => Err(FrontweaveError::AmbiguousHierarchyRoot {
                fields: flagged.join(", "),
            }),
        }
    }

    /// Context over `data` with the schema's hierarchy root attached
    ///
    /// # Errors
    ///
    /// `DATA_COMPOSITION_FAILED` when `data` is not a mapping (null is accepted
    /// as the empty mapping), plus [`Self::resolve_hierarchy_root`] errors.
    pub fn create_context<S>(&self, schema: &S, data: &Value) -> Result<VariableContext>
    where
        S: SchemaProvider + ?Sized,
    {
        data.validate()?;
        let root = self.resolve_hierarchy_root(schema)?;
        debug!(hierarchy_root = ?root, "variable context created");
        Ok(VariableContext::new(data.clone(), root))
    }

    /// One context per collection element, with positional variables
    ///
    /// # Errors
    ///
    /// `INVALID_ARRAY_DATA` when `array_data` is not a sequence.
    pub fn create_item_contexts<S>(&self, schema: &S, array_data: &Value) -> Result<Vec<VariableContext>>
    where
        S: SchemaProvider + ?Sized,
    {
        let Value::Array(elements) = array_data else {
            return Err(FrontweaveError::InvalidArrayData {
                found: type_name(array_data).to_string(),
            });
        };

        let root = self.resolve_hierarchy_root(schema)?;
        let builder = ItemContextBuilder::new();
        let total = elements.len();

        Ok(elements
            .iter()
            .enumerate()
            .map(|(index, element)| {
                VariableContext::new(builder.build(element, index, total, &Value::Null), root.clone())
            })
            .collect())
    }

    /// Check every token of `template` against `data`
    pub fn validate_binding<S>(&self, schema: &S, template: &Value, data: &Value) -> Result<BindingReport>
    where
        S: SchemaProvider + ?Sized,
    {
        let context = self.create_context(schema, data)?;

        let mut names = Vec::new();
        collect_tokens(template, &mut names);

        let uses_items = names.iter().any(|name| name == ITEMS_TOKEN);
        let invalid_token_names: Vec<String> = names
            .iter()
            .filter(|name| name.as_str() != ITEMS_TOKEN)
            .filter(|name| context.resolve(name).is_none())
            .cloned()
            .collect();
        let checked = names.iter().filter(|name| name.as_str() != ITEMS_TOKEN).count();

        let binding = if uses_items {
            context.resolve_items().err()
        } else {
            None
        };

        Ok(BindingReport {
            total_tokens: checked,
            valid_tokens: checked - invalid_token_names.len(),
            invalid_tokens: invalid_token_names.len(),
            invalid_token_names,
            uses_items,
            items_binding_valid: binding.is_none(),
            items_binding_reason: binding.map(|e| e.to_string()),
            hierarchy_root: context.hierarchy_root,
        })
    }
}

/// Gather token names from every scalar and mapping key, skipping
/// pass-through sigil tokens
fn collect_tokens(node: &Value, names: &mut Vec<String>) {
    match node {
        Value::String(text) => push_tokens(text, names),
        Value::Array(items) => items.iter().for_each(|item| collect_tokens(item, names)),
        Value::Object(map) => {
            for (key, value) in map {
                push_tokens(key, names);
                collect_tokens(value, names);
            }
        }
        _ => {}
    }
}

fn push_tokens(text: &str, names: &mut Vec<String>) {
    names.extend(
        tokens(text)
            .filter(|token| !token.is_sigil() || token.name == ITEMS_TOKEN)
            .map(|token| token.name.to_string()),
    );
}
