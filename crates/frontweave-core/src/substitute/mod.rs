//! Variable substitution over template trees
//!
//! Resolves `{path}` tokens inside every scalar, mapping key, and nested node of a
//! template against a data context.
//!
//! ## Rules
//!
//! - **Exact match**: a scalar that is exactly one token takes the resolved value
//!   with its original type (`"{count}"` → `42`, `"{tags}"` → `["a","b"]`)
//! - **Interpolation**: tokens mixed into literal text are rendered as text
//!   (`"n={count}"` → `"n=42"`); sequences and mappings use compact form
//! - **Sigil tokens**: `{@name}` passes through unresolved, except `{@items}`
//!   which resolves through contexts that know the hierarchy root
//! - **References**: `{ "valueRef": "path" }` resolves to the value at `path`;
//!   `{ "iterate": "coll", "valueRef": "inner" }` projects `inner` over `coll`
//! - **Missing values**: see [`MissingMode`]

pub mod tokenize;

use std::borrow::Cow;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{FrontweaveError, Result};
use crate::items::ITEMS_TOKEN;
use crate::value::{lookup, to_text, type_name};

use tokenize::{exact_token, Segment, Token, TokenStream};

/// Mapping key marking a direct value reference
pub const VALUE_REF_KEY: &str = "valueRef";

/// Mapping key marking a projected collection reference
pub const ITERATE_KEY: &str = "iterate";

/// Handling of tokens whose value is missing (or null, inside text)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissingMode {
    /// Substitute empty text
    #[default]
    Empty,
    /// Leave the original placeholder verbatim
    Verbose,
    /// Fail with `MissingRequiredField`
    Strict,
}

/// Source of variable values for substitution
pub trait VariableResolver {
    /// Resolve a dotted token path to a value
    fn resolve(&self, path: &str) -> Option<Cow<'_, Value>>;

    /// Check that the context is readable before substitution starts
    fn validate(&self) -> Result<()> {
        Ok(())
    }
}

impl VariableResolver for Value {
    fn resolve(&self, path: &str) -> Option<Cow<'_, Value>> {
        lookup(self, path).map(Cow::Borrowed)
    }

    fn validate(&self) -> Result<()> {
        match self {
            Value::Object(_) | Value::Null => Ok(()),
            other => Err(FrontweaveError::DataCompositionFailed(format!(
                "data context must be a mapping, found {}",
                type_name(other)
            ))),
        }
    }
}

/// Recursive substituter for template trees
#[derive(Debug, Clone, Copy, Default)]
pub struct Substituter {
    mode: MissingMode,
}

impl Substituter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_mode(mode: MissingMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> MissingMode {
        self.mode
    }

    /// Substitute every token in `node` against `context`
    pub fn substitute<R>(&self, node: &Value, context: &R) -> Result<Value>
    where
        R: VariableResolver + ?Sized,
    {
        context.validate()?;
        self.substitute_node(node, context)
    }

    fn substitute_node<R>(&self, node: &Value, context: &R) -> Result<Value>
    where
        R: VariableResolver + ?Sized,
    {
        match node {
            Value::String(text) => self.substitute_scalar(text, context),
            Value::Array(items) => items
                .iter()
                .map(|item| self.substitute_node(item, context))
                .collect::<Result<Vec<_>>>()
                .map(Value::Array),
            Value::Object(map) => {
                if let Some(resolved) = self.resolve_reference(map, context)? {
                    return Ok(resolved);
                }

                let mut out = Map::with_capacity(map.len());
                for (key, value) in map {
                    let key = self.interpolate(key, context)?;
                    out.insert(key, self.substitute_node(value, context)?);
                }
                Ok(Value::Object(out))
            }
            other => Ok(other.clone()),
        }
    }

    /// Substitute a scalar, preserving type when it is exactly one token
    fn substitute_scalar<R>(&self, text: &str, context: &R) -> Result<Value>
    where
        R: VariableResolver + ?Sized,
    {
        let Some(token) = exact_token(text) else {
            return self.interpolate(text, context).map(Value::String);
        };

        if passes_through(&token) {
            return Ok(Value::String(text.to_string()));
        }

        match context.resolve(token.name) {
            Some(value) => Ok(value.into_owned()),
            None if token.name == ITEMS_TOKEN => Ok(Value::String(text.to_string())),
            None => match self.mode {
                MissingMode::Empty => Ok(Value::String(String::new())),
                MissingMode::Verbose => Ok(Value::String(token.raw())),
                MissingMode::Strict => Err(missing(&token)),
            },
        }
    }

    /// Render all tokens of `text` into a string
    pub fn interpolate<R>(&self, text: &str, context: &R) -> Result<String>
    where
        R: VariableResolver + ?Sized,
    {
        let mut output = String::with_capacity(text.len());

        for segment in TokenStream::new(text) {
            match segment {
                Segment::Literal(literal) => output.push_str(literal),
                Segment::Token(token) if passes_through(&token) => output.push_str(&token.raw()),
                Segment::Token(token) => {
                    let resolved = context.resolve(token.name);
                    match resolved.as_deref() {
                        Some(Value::Null) | None if token.name == ITEMS_TOKEN => {
                            output.push_str(&token.raw())
                        }
                        Some(Value::Null) | None => match self.mode {
                            MissingMode::Empty => {}
                            MissingMode::Verbose => output.push_str(&token.raw()),
                            MissingMode::Strict => return Err(missing(&token)),
                        },
                        Some(value) => output.push_str(&to_text(value)),
                    }
                }
            }
        }

        Ok(output)
    }

    /// Resolve `{valueRef}` and `{iterate, valueRef}` mappings
    fn resolve_reference<R>(&self, map: &Map<String, Value>, context: &R) -> Result<Option<Value>>
    where
        R: VariableResolver + ?Sized,
    {
        let Some(Value::String(path)) = map.get(VALUE_REF_KEY) else {
            return Ok(None);
        };
        let path = strip_braces(path);

        match (map.len(), map.get(ITERATE_KEY)) {
            (1, None) => match context.resolve(path) {
                Some(value) => Ok(Some(value.into_owned())),
                None if self.mode == MissingMode::Strict => Err(missing_path(path)),
                None => Ok(Some(Value::Null)),
            },
            (2, Some(Value::String(collection))) => {
                let collection = strip_braces(collection);
                let projected = match context.resolve(collection).as_deref() {
                    Some(Value::Array(elements)) => elements
                        .iter()
                        .filter_map(|element| lookup(element, path).cloned())
                        .collect(),
                    Some(_) => Vec::new(),
                    None if self.mode == MissingMode::Strict => {
                        return Err(missing_path(collection))
                    }
                    None => Vec::new(),
                };
                Ok(Some(Value::Array(projected)))
            }
            _ => Ok(None),
        }
    }
}

/// Sigil tokens other than the items token are left untouched
fn passes_through(token: &Token<'_>) -> bool {
    token.is_sigil() && token.name != ITEMS_TOKEN
}

/// Accept both `path` and `{path}` in reference mappings
fn strip_braces(path: &str) -> &str {
    path.strip_prefix('{')
        .and_then(|p| p.strip_suffix('}'))
        .unwrap_or(path)
}

fn missing(token: &Token<'_>) -> FrontweaveError {
    missing_path(token.name)
}

fn missing_path(path: &str) -> FrontweaveError {
    FrontweaveError::MissingRequiredField {
        field: path.to_string(),
    }
}

/// Convenience function to substitute with the default missing-variable mode
pub fn substitute(node: &Value, data: &Value) -> Result<Value> {
    Substituter::new().substitute(node, data)
}

#[cfg(test)]
mod tests;
