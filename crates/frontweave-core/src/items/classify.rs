//! Marker context classification

use serde::Serialize;
use serde_json::Value;

use super::detect::{ItemsPattern, PathSegment};
use super::ITEMS_MARKER;

/// Output shape chosen for an items marker
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "format", rename_all = "lowercase")]
pub enum ExpansionFormat {
    /// Sole content of a sequence element; `key` names the owning mapping field
    List { key: Option<String> },
    /// The entire value
    Array,
    /// Embedded in scalar text
    Text,
}

/// Decides how a marker occurrence is expanded
#[derive(Debug, Clone, Copy, Default)]
pub struct FormatClassifier;

impl FormatClassifier {
    pub fn new() -> Self {
        Self
    }

    /// Classify a template in its textual (line-oriented) form
    ///
    /// - List: ignoring trailing blank lines, the text ends with `<key>:` followed
    ///   by a list item holding only the (optionally quoted) marker
    /// - Array: the trimmed text is exactly the (optionally quoted) marker
    /// - Text: anything else
    pub fn classify(&self, template: &str) -> ExpansionFormat {
        if is_bare_marker(template) {
            return ExpansionFormat::Array;
        }

        let mut lines = template.lines().rev().filter(|line| !line.trim().is_empty());
        let (Some(last), Some(previous)) = (lines.next(), lines.next()) else {
            return ExpansionFormat::Text;
        };

        let item = last.trim_start().strip_prefix('-');
        let key = previous.trim_end().strip_suffix(':');
        match (item, key) {
            (Some(item), Some(key)) if is_bare_marker(item) => ExpansionFormat::List {
                key: Some(unquote(key.trim().trim_start_matches("- ")).to_string()),
            },
            _ => ExpansionFormat::Text,
        }
    }

    /// Classify a marker occurrence by its position in a parsed tree
    pub fn classify_pattern(&self, container: &Value, pattern: &ItemsPattern) -> ExpansionFormat {
        let Some(Value::String(scalar)) = pattern.path.get(container) else {
            return ExpansionFormat::Text;
        };
        if !is_bare_marker(scalar) {
            return ExpansionFormat::Text;
        }

        match pattern.path.last() {
            Some(PathSegment::Index(_)) => {
                let key = pattern
                    .path
                    .parent()
                    .and_then(|parent| match parent.last() {
                        Some(PathSegment::Key(key)) => Some(key.clone()),
                        _ => None,
                    });
                ExpansionFormat::List { key }
            }
            _ => ExpansionFormat::Array,
        }
    }
}

/// Trimmed text equals the marker, optionally wrapped in matching quotes
fn is_bare_marker(text: &str) -> bool {
    unquote(text.trim()) == ITEMS_MARKER
}

fn unquote(text: &str) -> &str {
    for quote in ['"', '\''] {
        if let Some(inner) = text
            .strip_prefix(quote)
            .and_then(|rest| rest.strip_suffix(quote))
        {
            return inner;
        }
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::items::ItemsDetector;
    use serde_json::json;

    fn classify(text: &str) -> ExpansionFormat {
        FormatClassifier::new().classify(text)
    }

    #[test]
    fn test_classify_list_text() {
        let template = "title: \"{title}\"\nbooks:\n  - \"{@items}\"\n\n\n";
        assert_eq!(
            classify(template),
            ExpansionFormat::List {
                key: Some("books".to_string())
            }
        );
    }

    #[test]
    fn test_classify_list_text_unquoted_and_single_quoted() {
        assert_eq!(
            classify("books:\n- {@items}"),
            ExpansionFormat::List {
                key: Some("books".to_string())
            }
        );
        assert_eq!(
            classify("\"books\":\n  - '{@items}'"),
            ExpansionFormat::List {
                key: Some("books".to_string())
            }
        );
    }

    #[test]
    fn test_classify_array_text() {
        assert_eq!(classify("{@items}"), ExpansionFormat::Array);
        assert_eq!(classify("  \"{@items}\"\n"), ExpansionFormat::Array);
        assert_eq!(classify("'{@items}'"), ExpansionFormat::Array);
    }

    #[test]
    fn test_classify_text() {
        assert_eq!(classify("Count: {@items}"), ExpansionFormat::Text);
        assert_eq!(classify("books:\n  - \"{@items} extra\""), ExpansionFormat::Text);
        assert_eq!(classify("books:\n  title: x\n  - {@items}"), ExpansionFormat::Text);
        assert_eq!(classify(""), ExpansionFormat::Text);
    }

    #[test]
    fn test_classify_pattern_shapes() {
        let container = json!({
            "books": ["{@items}"],
            "all": "{@items}",
            "summary": "Count: {@items}"
        });
        let detection = ItemsDetector::new().detect(&container).unwrap();
        let classifier = FormatClassifier::new();

        let formats: Vec<_> = detection
            .patterns
            .iter()
            .map(|p| (p.path.to_string(), classifier.classify_pattern(&container, p)))
            .collect();

        assert_eq!(
            formats,
            vec![
                (
                    "books[0]".to_string(),
                    ExpansionFormat::List {
                        key: Some("books".to_string())
                    }
                ),
                ("all".to_string(), ExpansionFormat::Array),
                ("summary".to_string(), ExpansionFormat::Text),
            ]
        );
    }

    #[test]
    fn test_classify_pattern_root_sequence_has_no_key() {
        let container = json!(["{@items}"]);
        let detection = ItemsDetector::new().detect(&container).unwrap();
        assert_eq!(
            FormatClassifier::new().classify_pattern(&container, &detection.patterns[0]),
            ExpansionFormat::List { key: None }
        );
    }
}
