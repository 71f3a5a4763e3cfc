//! Behavioural properties of the expansion engine through the public API

use frontweave_core::items::{ExpansionFormat, FormatClassifier, ItemsDetector};
use frontweave_core::substitute::substitute;
use frontweave_core::{DataComposer, ExpansionEngine, ExpansionKey};
use serde_json::{Value, json};

fn expand(container: Value, data: Value, item: Option<Value>) -> frontweave_core::Result<Value> {
    ExpansionEngine::new()
        .expand(Some(&container), &data, item.as_ref(), &json!({}))
        .map(|result| result.expanded_content)
}

#[test]
fn test_item_count_matches_input_for_any_length() {
    let engine = ExpansionEngine::new();
    for len in [0usize, 1, 2, 7, 50] {
        let data = Value::Array((0..len).map(|i| json!({"n": i})).collect());
        let result = engine
            .expand(
                Some(&json!({"list": ["{@items}"]})),
                &data,
                Some(&json!({"n": "{n}", "i": "{$index}"})),
                &json!({}),
            )
            .unwrap();

        assert_eq!(result.expanded_item_count, len);
        let list = result.expanded_content["list"].as_array().unwrap().clone();
        assert_eq!(list.len(), len);
        for (i, entry) in list.iter().enumerate() {
            assert_eq!(entry, &json!({"n": i, "i": i}));
        }
    }
}

#[test]
fn test_shared_or_nested_marker_paths_are_rejected() {
    let detector = ItemsDetector::new();
    let cases = [
        json!({"a": "{@items} and {@items}"}),
        json!({"a": "{@items}", "b": "{@items}{@items}"}),
    ];
    for template in cases {
        let detection = detector.detect(&template).unwrap();
        let err = detector.validate(&detection.patterns).unwrap_err();
        assert_eq!(err.code(), "INVALID_ITEMS_PATTERNS");
    }
}

#[test]
fn test_shape_examples() {
    assert_eq!(
        expand(
            json!({"books": ["{@items}"]}),
            json!([{"title": "A"}, {"title": "B"}]),
            Some(json!({"title": "{title}"}))
        )
        .unwrap(),
        json!({"books": [{"title": "A"}, {"title": "B"}]})
    );

    let raw = ExpansionEngine::new()
        .splice_raw(Some(&json!("{@items}")), &json!(["x", "y"]))
        .unwrap();
    assert_eq!(raw.expanded_content, json!(["x", "y"]));

    let text = ExpansionEngine::new()
        .splice_raw(Some(&json!("Count: {@items}")), &json!([1, 2, 3]))
        .unwrap();
    assert_eq!(text.expanded_content, json!("Count: [1,2,3]"));
}

#[test]
fn test_textual_classification_agrees_with_structure() {
    let classifier = FormatClassifier::new();
    assert_eq!(
        classifier.classify("books:\n  - \"{@items}\"\n"),
        ExpansionFormat::List {
            key: Some("books".to_string())
        }
    );
    assert_eq!(classifier.classify("\"{@items}\""), ExpansionFormat::Array);
    assert_eq!(classifier.classify("Count: {@items}"), ExpansionFormat::Text);
}

#[test]
fn test_exact_match_preserves_type() {
    let data = json!({"count": 42});
    assert_eq!(substitute(&json!("{count}"), &data).unwrap(), json!(42));
    assert_eq!(substitute(&json!("n={count}"), &data).unwrap(), json!("n=42"));
}

#[test]
fn test_collision_example() {
    let composed = DataComposer::new()
        .compose(&json!({"books": "x"}), &json!([{"t": 1}]), &[ExpansionKey::items("books")])
        .unwrap();
    assert_eq!(composed.main_data["books"], json!("x"));
    assert_eq!(composed.main_data["books_items"], json!([{"t": 1}]));
}

#[test]
fn test_container_round_trip_is_a_fixed_point() {
    let data = json!({"title": "T"});
    let once = substitute(&json!({"title": "{title}"}), &data).unwrap();
    assert_eq!(once, json!({"title": "T"}));
    assert_eq!(substitute(&once, &data).unwrap(), once);
}
