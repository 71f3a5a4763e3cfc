//! valueRef and iterate mappings

use super::helpers::nested_context;
use super::*;
use serde_json::json;

#[test]
fn test_value_ref_resolves_directly() {
    let rendered = substitute(
        &json!({"tags": {"valueRef": "paper.tags"}, "title": {"valueRef": "{paper.title}"}}),
        &nested_context(),
    )
    .unwrap();
    assert_eq!(
        rendered,
        json!({"tags": ["rust", "yaml"], "title": "Research Paper"})
    );
}

#[test]
fn test_missing_value_ref_is_null() {
    let rendered = substitute(&json!({"x": {"valueRef": "paper.absent"}}), &nested_context()).unwrap();
    assert_eq!(rendered, json!({"x": null}));
}

#[test]
fn test_iterate_projects_inner_path() {
    let rendered = substitute(
        &json!({"names": {"iterate": "paper.authors", "valueRef": "name"}}),
        &nested_context(),
    )
    .unwrap();
    assert_eq!(rendered, json!({"names": ["John Doe", "Jane Smith"]}));
}

#[test]
fn test_iterate_skips_elements_without_inner_path() {
    let rendered = substitute(
        &json!({"emails": {"iterate": "paper.authors", "valueRef": "email"}}),
        &nested_context(),
    )
    .unwrap();
    assert_eq!(rendered, json!({"emails": ["john@example.com"]}));
}

#[test]
fn test_iterate_over_non_sequence_is_empty() {
    let rendered = substitute(
        &json!({
            "a": {"iterate": "paper.title", "valueRef": "name"},
            "b": {"iterate": "paper.absent", "valueRef": "name"}
        }),
        &nested_context(),
    )
    .unwrap();
    assert_eq!(rendered, json!({"a": [], "b": []}));
}

#[test]
fn test_mappings_with_extra_keys_are_plain() {
    let template = json!({"r": {"valueRef": "paper.title", "label": "{paper.title}"}});
    let rendered = substitute(&template, &nested_context()).unwrap();
    assert_eq!(
        rendered,
        json!({"r": {"valueRef": "paper.title", "label": "Research Paper"}})
    );
}
