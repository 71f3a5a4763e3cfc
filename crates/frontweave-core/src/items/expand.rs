//! Items expansion: render a collection and splice it at the marker

use std::path::Path;

use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::error::{FrontweaveError, Result};
use crate::substitute::Substituter;
use crate::template::TemplateSource;
use crate::value::{to_text, type_name};

use super::classify::{ExpansionFormat, FormatClassifier};
use super::context::ItemContextBuilder;
use super::detect::{ItemsDetector, ItemsPattern, PathSegment};
use super::ITEMS_MARKER;

/// Outcome of one expansion
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExpansionResult {
    /// Container with the rendered collection spliced in
    pub expanded_content: Value,
    /// Number of collection elements rendered (0 is a valid outcome)
    pub expanded_item_count: usize,
    /// False when the container was returned unchanged
    pub was_expanded: bool,
}

impl ExpansionResult {
    fn unchanged(container: &Value) -> Self {
        Self {
            expanded_content: container.clone(),
            expanded_item_count: 0,
            was_expanded: false,
        }
    }
}

/// Drives detect → validate → render items → classify → splice
#[derive(Debug, Clone, Copy, Default)]
pub struct ExpansionEngine {
    detector: ItemsDetector,
    classifier: FormatClassifier,
    contexts: ItemContextBuilder,
    substituter: Substituter,
}

impl ExpansionEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Engine whose item rendering uses the given substituter
    pub fn with_substituter(substituter: Substituter) -> Self {
        Self {
            substituter,
            ..Self::default()
        }
    }

    /// Expand the items marker in `container`
    ///
    /// Each element of `array_data` is rendered against `item_template` in its
    /// own scope (element fields, `$index`/`$first`/`$last`, then `globals`).
    /// Without an item template a marker is left in place and `was_expanded` is
    /// false, so the caller can retry once a template is available.
    ///
    /// # Errors
    ///
    /// - `INVALID_PROCESSING_CONTEXT`: container absent or null, globals not a mapping
    /// - `INVALID_ARRAY_DATA`: `array_data` is not a sequence
    /// - `EXPANSION_CONTEXT_ERROR`: item template given but the container has no marker
    /// - `ITEMS_DETECTION_ERROR` / `INVALID_ITEMS_PATTERNS` from detection
    pub fn expand(
        &self,
        container: Option<&Value>,
        array_data: &Value,
        item_template: Option<&Value>,
        globals: &Value,
    ) -> Result<ExpansionResult> {
        let (container, elements) = check_inputs(container, array_data, globals)?;
        let patterns = self.markers(container)?;

        let Some(item_template) = item_template else {
            if !patterns.is_empty() {
                debug!(markers = patterns.len(), "no item template, markers left in place");
            }
            return Ok(ExpansionResult::unchanged(container));
        };

        if patterns.is_empty() {
            return Err(FrontweaveError::ExpansionContext(
                "an item template was supplied but the container has no items marker".to_string(),
            ));
        }

        let total = elements.len();
        let rendered = elements
            .iter()
            .enumerate()
            .map(|(index, element)| {
                let scope = self.contexts.build(element, index, total, globals);
                self.substituter.substitute(item_template, &scope)
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(self.splice(container, &patterns, rendered))
    }

    /// Expand with an item template fetched from `source`
    ///
    /// # Errors
    ///
    /// `TEMPLATE_LOAD_ERROR` when the template cannot be loaded, plus everything
    /// [`ExpansionEngine::expand`] returns.
    pub fn expand_from_source<S>(
        &self,
        container: Option<&Value>,
        array_data: &Value,
        item_template_path: &Path,
        source: &S,
        globals: &Value,
    ) -> Result<ExpansionResult>
    where
        S: TemplateSource + ?Sized,
    {
        let item_template =
            source
                .load(item_template_path)
                .map_err(|e| FrontweaveError::TemplateLoad {
                    path: item_template_path.to_path_buf(),
                    reason: e.to_string(),
                })?;

        self.expand(container, array_data, Some(item_template.content()), globals)
    }

    /// Splice the collection elements as-is, without an item template
    ///
    /// A container without markers is returned unchanged.
    pub fn splice_raw(&self, container: Option<&Value>, array_data: &Value) -> Result<ExpansionResult> {
        let (container, elements) = check_inputs(container, array_data, &Value::Null)?;
        let patterns = self.markers(container)?;

        if patterns.is_empty() {
            return Ok(ExpansionResult::unchanged(container));
        }
        Ok(self.splice(container, &patterns, elements.clone()))
    }

    fn markers(&self, container: &Value) -> Result<Vec<ItemsPattern>> {
        let detection = self.detector.detect(container)?;
        self.detector.validate(&detection.patterns)?;
        Ok(detection.patterns)
    }

    /// Splice `rendered` at every marker
    ///
    /// Markers are processed last-to-first so sequence indices stay valid when
    /// several list markers share one sequence.
    fn splice(&self, container: &Value, patterns: &[ItemsPattern], rendered: Vec<Value>) -> ExpansionResult {
        let count = rendered.len();
        let mut content = container.clone();

        for pattern in patterns.iter().rev() {
            let format = self.classifier.classify_pattern(container, pattern);
            debug!(path = %pattern.path, ?format, items = count, "splicing items");
            splice_at(&mut content, pattern, &format, &rendered);
        }

        ExpansionResult {
            expanded_content: content,
            expanded_item_count: count,
            was_expanded: true,
        }
    }
}

fn check_inputs<'a>(
    container: Option<&'a Value>,
    array_data: &'a Value,
    globals: &Value,
) -> Result<(&'a Value, &'a Vec<Value>)> {
    let container = match container {
        Some(Value::Null) | None => {
            return Err(FrontweaveError::InvalidProcessingContext(
                "container template is absent".to_string(),
            ))
        }
        Some(container) => container,
    };

    if !matches!(globals, Value::Object(_) | Value::Null) {
        return Err(FrontweaveError::InvalidProcessingContext(format!(
            "globals must be a mapping, found {}",
            type_name(globals)
        )));
    }

    let Value::Array(elements) = array_data else {
        return Err(FrontweaveError::InvalidArrayData {
            found: type_name(array_data).to_string(),
        });
    };

    Ok((container, elements))
}

fn splice_at(content: &mut Value, pattern: &ItemsPattern, format: &ExpansionFormat, rendered: &[Value]) {
    match format {
        ExpansionFormat::List { .. } => {
            let (Some(parent), Some(PathSegment::Index(index))) =
                (pattern.path.parent(), pattern.path.last())
            else {
                return;
            };
            if let Some(Value::Array(sequence)) = parent.get_mut(content) {
                if *index < sequence.len() {
                    sequence.splice(*index..=*index, rendered.iter().cloned());
                }
            }
        }
        ExpansionFormat::Array => {
            if let Some(node) = pattern.path.get_mut(content) {
                *node = Value::Array(rendered.to_vec());
            }
        }
        ExpansionFormat::Text => {
            if let Some(Value::String(text)) = pattern.path.get_mut(content) {
                let replacement = to_text(&Value::Array(rendered.to_vec()));
                *text = text.replacen(ITEMS_MARKER, &replacement, 1);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::MemoryFs;
    use crate::template::TemplateLoader;
    use serde_json::json;

    fn engine() -> ExpansionEngine {
        ExpansionEngine::new()
    }

    #[test]
    fn test_list_expansion_in_order() {
        let result = engine()
            .expand(
                Some(&json!({"books": ["{@items}"]})),
                &json!([{"title": "A"}, {"title": "B"}]),
                Some(&json!({"title": "{title}"})),
                &json!({}),
            )
            .unwrap();

        assert!(result.was_expanded);
        assert_eq!(result.expanded_item_count, 2);
        assert_eq!(
            result.expanded_content,
            json!({"books": [{"title": "A"}, {"title": "B"}]})
        );
    }

    #[test]
    fn test_positional_and_global_variables() {
        let result = engine()
            .expand(
                Some(&json!({"entries": ["{@items}"]})),
                &json!(["x", "y", "z"]),
                Some(&json!({"n": "{$index}", "v": "{site}:{value}", "first": "{$first}", "last": "{$last}"})),
                &json!({"site": "S"}),
            )
            .unwrap();

        assert_eq!(
            result.expanded_content,
            json!({"entries": [
                {"n": 0, "v": "S:x", "first": "true", "last": "false"},
                {"n": 1, "v": "S:y", "first": "false", "last": "false"},
                {"n": 2, "v": "S:z", "first": "false", "last": "true"}
            ]})
        );
    }

    #[test]
    fn test_empty_collection_is_success() {
        let result = engine()
            .expand(
                Some(&json!({"books": ["{@items}"], "all": "{@items}", "summary": "Count: {@items}"})),
                &json!([]),
                Some(&json!({"title": "{title}"})),
                &Value::Null,
            )
            .unwrap();

        assert!(result.was_expanded);
        assert_eq!(result.expanded_item_count, 0);
        assert_eq!(
            result.expanded_content,
            json!({"books": [], "all": [], "summary": "Count: []"})
        );
    }

    #[test]
    fn test_list_marker_among_other_elements() {
        let result = engine()
            .expand(
                Some(&json!({"rows": ["header", "{@items}", "footer"]})),
                &json!([1, 2]),
                Some(&json!("row {value}")),
                &json!({}),
            )
            .unwrap();

        assert_eq!(
            result.expanded_content,
            json!({"rows": ["header", "row 1", "row 2", "footer"]})
        );
    }

    #[test]
    fn test_root_array_marker_keeps_types() {
        let result = engine()
            .expand(
                Some(&json!("{@items}")),
                &json!([{"n": 1}, {"n": 2}]),
                Some(&json!("{n}")),
                &json!({}),
            )
            .unwrap();
        assert_eq!(result.expanded_content, json!([1, 2]));
    }

    #[test]
    fn test_text_marker_uses_compact_text() {
        let result = engine()
            .expand(
                Some(&json!({"summary": "Count: {@items}"})),
                &json!([1, 2, 3]),
                Some(&json!("{value}")),
                &json!({}),
            )
            .unwrap();
        assert_eq!(result.expanded_content, json!({"summary": "Count: [1,2,3]"}));
    }

    #[test]
    fn test_marker_without_item_template_is_left_in_place() {
        let container = json!({"books": ["{@items}"]});
        let result = engine()
            .expand(Some(&container), &json!([{"title": "A"}]), None, &json!({}))
            .unwrap();

        assert!(!result.was_expanded);
        assert_eq!(result.expanded_item_count, 0);
        assert_eq!(result.expanded_content, container);
    }

    #[test]
    fn test_no_marker_without_item_template_passes_through() {
        let container = json!({"title": "{title}"});
        let result = engine()
            .expand(Some(&container), &json!([]), None, &json!({}))
            .unwrap();
        assert!(!result.was_expanded);
        assert_eq!(result.expanded_content, container);
    }

    #[test]
    fn test_item_template_without_marker_fails() {
        let err = engine()
            .expand(
                Some(&json!({"title": "{title}"})),
                &json!([]),
                Some(&json!({"title": "{title}"})),
                &json!({}),
            )
            .unwrap_err();
        assert_eq!(err.code(), "EXPANSION_CONTEXT_ERROR");
    }

    #[test]
    fn test_invalid_inputs() {
        let e = engine();
        let template = json!({"title": "{title}"});

        let err = e.expand(None, &json!([]), None, &json!({})).unwrap_err();
        assert_eq!(err.code(), "INVALID_PROCESSING_CONTEXT");

        let err = e.expand(Some(&Value::Null), &json!([]), None, &json!({})).unwrap_err();
        assert_eq!(err.code(), "INVALID_PROCESSING_CONTEXT");

        let err = e.expand(Some(&json!({})), &json!([]), None, &json!("g")).unwrap_err();
        assert_eq!(err.code(), "INVALID_PROCESSING_CONTEXT");

        let err = e
            .expand(Some(&json!({"b": ["{@items}"]})), &json!({"a": 1}), Some(&template), &json!({}))
            .unwrap_err();
        assert_eq!(err.code(), "INVALID_ARRAY_DATA");
        assert!(err.to_string().contains("mapping"));
    }

    #[test]
    fn test_duplicate_markers_fail_validation() {
        let err = engine()
            .expand(
                Some(&json!({"text": "{@items}{@items}"})),
                &json!([1]),
                Some(&json!("{value}")),
                &json!({}),
            )
            .unwrap_err();
        assert_eq!(err.code(), "INVALID_ITEMS_PATTERNS");
    }

    #[test]
    fn test_splice_raw() {
        let e = engine();
        let result = e.splice_raw(Some(&json!("{@items}")), &json!(["x", "y"])).unwrap();
        assert_eq!(result.expanded_content, json!(["x", "y"]));
        assert_eq!(result.expanded_item_count, 2);

        let result = e
            .splice_raw(Some(&json!({"books": ["{@items}"]})), &json!([{"title": "A"}]))
            .unwrap();
        assert_eq!(result.expanded_content, json!({"books": [{"title": "A"}]}));

        let result = e.splice_raw(Some(&json!({"a": 1})), &json!([1])).unwrap();
        assert!(!result.was_expanded);
    }

    #[test]
    fn test_expand_from_source() {
        let fs = MemoryFs::new();
        fs.insert("item.json", r#"{"title": "{title}", "pos": "{$index}"}"#);
        let loader = TemplateLoader::new(fs);

        let result = engine()
            .expand_from_source(
                Some(&json!({"books": ["{@items}"]})),
                &json!([{"title": "A"}]),
                Path::new("item.json"),
                &loader,
                &json!({}),
            )
            .unwrap();
        assert_eq!(
            result.expanded_content,
            json!({"books": [{"title": "A", "pos": 0}]})
        );

        let err = engine()
            .expand_from_source(
                Some(&json!({"books": ["{@items}"]})),
                &json!([]),
                Path::new("missing.json"),
                &loader,
                &json!({}),
            )
            .unwrap_err();
        assert_eq!(err.code(), "TEMPLATE_LOAD_ERROR");
        assert!(err.to_string().contains("missing.json"));
    }
}
