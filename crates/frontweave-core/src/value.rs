//! Helpers over the shared tree model
//!
//! Metadata, templates, and rendered output all use [`serde_json::Value`] as a
//! closed set of node shapes: mappings, sequences, and scalars.

use serde_json::{Map, Value};

/// Resolve a dotted path against a tree
///
/// Mapping segments are looked up by key; sequence segments must be a
/// non-negative index (`authors.0.name`).
pub fn lookup<'a>(data: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = data;

    for part in path.split('.') {
        current = match current {
            Value::Object(map) => map.get(part)?,
            Value::Array(items) => items.get(part.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }

    Some(current)
}

/// Render a value as text for interpolation into surrounding literal text
///
/// Strings are emitted verbatim, numbers and booleans in canonical form, null as
/// empty text, and sequences/mappings in compact structured form (`[1,2,3]`).
pub fn to_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}

/// Short human-readable name of a node shape, for diagnostics
pub fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "sequence",
        Value::Object(_) => "mapping",
    }
}

/// Borrow a value as a mapping, treating null as the empty mapping
///
/// Returns `None` for any other shape.
pub fn as_mapping(value: &Value) -> Option<Map<String, Value>> {
    match value {
        Value::Object(map) => Some(map.clone()),
        Value::Null => Some(Map::new()),
        _ => None,
    }
}
