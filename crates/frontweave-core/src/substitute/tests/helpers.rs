//! Shared data contexts for substituter tests

use serde_json::{json, Value};

/// Flat context with one value of each scalar shape
pub(super) fn scalar_context() -> Value {
    json!({
        "title": "My Title",
        "count": 42,
        "price": 9.99,
        "enabled": true,
        "nothing": null
    })
}

/// Nested context with sequences and mappings
pub(super) fn nested_context() -> Value {
    json!({
        "paper": {
            "title": "Research Paper",
            "tags": ["rust", "yaml"],
            "authors": [
                {"name": "John Doe", "email": "john@example.com"},
                {"name": "Jane Smith"}
            ]
        }
    })
}
