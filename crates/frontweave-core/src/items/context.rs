//! Per-item variable scopes

use serde_json::{Map, Value};

/// Positional variable: 0-based element index
pub const INDEX_VAR: &str = "$index";

/// Positional variable: `"true"` for the first element
pub const FIRST_VAR: &str = "$first";

/// Positional variable: `"true"` for the last element
pub const LAST_VAR: &str = "$last";

/// Field holding a scalar element
pub const SCALAR_VALUE_VAR: &str = "value";

/// Builds one fresh scope per collection element
#[derive(Debug, Clone, Copy, Default)]
pub struct ItemContextBuilder;

impl ItemContextBuilder {
    pub fn new() -> Self {
        Self
    }

    /// Scope for element `index` of `total`
    ///
    /// Globals are laid down first and element fields override them. Scalar
    /// elements are exposed as `value`. `$first`/`$last` are textual booleans.
    /// Non-mapping globals contribute nothing.
    pub fn build(&self, element: &Value, index: usize, total: usize, globals: &Value) -> Value {
        let mut scope = match globals {
            Value::Object(map) => map.clone(),
            _ => Map::new(),
        };

        match element {
            Value::Object(fields) => {
                for (key, value) in fields {
                    scope.insert(key.clone(), value.clone());
                }
            }
            scalar => {
                scope.insert(SCALAR_VALUE_VAR.to_string(), scalar.clone());
            }
        }

        scope.insert(INDEX_VAR.to_string(), Value::from(index));
        scope.insert(FIRST_VAR.to_string(), Value::String((index == 0).to_string()));
        scope.insert(
            LAST_VAR.to_string(),
            Value::String((index + 1 == total).to_string()),
        );

        Value::Object(scope)
    }
}
