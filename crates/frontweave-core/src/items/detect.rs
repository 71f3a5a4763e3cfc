//! Items marker detection

use std::fmt;

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, trace};

use crate::error::{FrontweaveError, Result};

use super::ITEMS_MARKER;

/// Deepest template nesting the detector walks
pub const MAX_DEPTH: usize = 128;

/// Characters of surrounding text kept in a pattern snippet (each side)
const SNIPPET_RADIUS: usize = 20;

/// Marker prefix used to spot unterminated occurrences
const MARKER_OPEN: &str = "{@items";

/// One step in a structural path
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

/// Structural location of a node inside a template tree
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct TreePath(Vec<PathSegment>);

impl TreePath {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Path extended by one segment
    pub fn child(&self, segment: PathSegment) -> Self {
        let mut segments = self.0.clone();
        segments.push(segment);
        Self(segments)
    }

    /// Path of the containing node, `None` at the root
    pub fn parent(&self) -> Option<Self> {
        let (_, rest) = self.0.split_last()?;
        Some(Self(rest.to_vec()))
    }

    pub fn last(&self) -> Option<&PathSegment> {
        self.0.last()
    }

    /// Whether `self` strictly contains `other`
    pub fn is_strict_prefix_of(&self, other: &TreePath) -> bool {
        self.0.len() < other.0.len() && other.0.starts_with(&self.0)
    }

    /// Borrow the node at this path
    pub fn get<'a>(&self, root: &'a Value) -> Option<&'a Value> {
        self.0.iter().try_fold(root, |node, segment| match (node, segment) {
            (Value::Object(map), PathSegment::Key(key)) => map.get(key),
            (Value::Array(items), PathSegment::Index(index)) => items.get(*index),
            _ => None,
        })
    }

    /// Mutably borrow the node at this path
    pub fn get_mut<'a>(&self, root: &'a mut Value) -> Option<&'a mut Value> {
        self.0.iter().try_fold(root, |node, segment| match (node, segment) {
            (Value::Object(map), PathSegment::Key(key)) => map.get_mut(key),
            (Value::Array(items), PathSegment::Index(index)) => items.get_mut(*index),
            _ => None,
        })
    }
}

impl fmt::Display for TreePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return write!(f, "<root>");
        }
        for (i, segment) in self.0.iter().enumerate() {
            match segment {
                PathSegment::Key(key) if i == 0 => write!(f, "{}", key)?,
                PathSegment::Key(key) => write!(f, ".{}", key)?,
                PathSegment::Index(index) => write!(f, "[{}]", index)?,
            }
        }
        Ok(())
    }
}

/// A marker occurrence inside a template scalar
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemsPattern {
    /// Structural path of the scalar holding the marker
    pub path: TreePath,
    /// Character offset of the marker within the scalar
    pub offset: usize,
    /// Surrounding text, for diagnostics
    pub context: String,
    /// False for malformed occurrences such as an unterminated marker
    pub valid: bool,
}

/// Result of scanning a template tree for markers
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Detection {
    pub has_markers: bool,
    /// Valid marker occurrences, in document order
    pub patterns: Vec<ItemsPattern>,
    /// Malformed occurrences excluded from `patterns`
    pub malformed: Vec<ItemsPattern>,
}

/// Finds items markers in template trees
#[derive(Debug, Clone, Copy, Default)]
pub struct ItemsDetector;

impl ItemsDetector {
    pub fn new() -> Self {
        Self
    }

    /// Walk `template` and record every marker occurrence
    ///
    /// # Errors
    ///
    /// `ITEMS_DETECTION_ERROR` when the root is null or the tree nests deeper than
    /// [`MAX_DEPTH`].
    pub fn detect(&self, template: &Value) -> Result<Detection> {
        if template.is_null() {
            return Err(FrontweaveError::ItemsDetection(
                "template root is null and cannot be traversed".to_string(),
            ));
        }

        let mut detection = Detection::default();
        walk(template, &TreePath::root(), 0, &mut detection)?;
        detection.has_markers = !detection.patterns.is_empty();

        debug!(
            markers = detection.patterns.len(),
            malformed = detection.malformed.len(),
            "items markers detected"
        );
        Ok(detection)
    }

    /// Reject duplicate paths and path-prefix nesting
    ///
    /// # Errors
    ///
    /// `INVALID_ITEMS_PATTERNS` naming the offending path(s).
    pub fn validate(&self, patterns: &[ItemsPattern]) -> Result<()> {
        for (i, first) in patterns.iter().enumerate() {
            for second in &patterns[i + 1..] {
                if first.path == second.path {
                    return Err(FrontweaveError::InvalidItemsPatterns(format!(
                        "more than one items marker at '{}'",
                        first.path
                    )));
                }
                if first.path.is_strict_prefix_of(&second.path)
                    || second.path.is_strict_prefix_of(&first.path)
                {
                    return Err(FrontweaveError::InvalidItemsPatterns(format!(
                        "items marker at '{}' is nested with marker at '{}'",
                        first.path, second.path
                    )));
                }
            }
        }
        Ok(())
    }
}

fn walk(node: &Value, path: &TreePath, depth: usize, detection: &mut Detection) -> Result<()> {
    if depth > MAX_DEPTH {
        return Err(FrontweaveError::ItemsDetection(format!(
            "template nesting exceeds {} levels at '{}'",
            MAX_DEPTH, path
        )));
    }

    match node {
        Value::Object(map) => {
            for (key, value) in map {
                walk(value, &path.child(PathSegment::Key(key.clone())), depth + 1, detection)?;
            }
        }
        Value::Array(items) => {
            for (index, value) in items.iter().enumerate() {
                walk(value, &path.child(PathSegment::Index(index)), depth + 1, detection)?;
            }
        }
        Value::String(text) => scan_scalar(text, path, detection),
        _ => {}
    }
    Ok(())
}

/// Record every marker occurrence in one scalar
fn scan_scalar(text: &str, path: &TreePath, detection: &mut Detection) {
    for (byte_offset, _) in text.match_indices(MARKER_OPEN) {
        let valid = text[byte_offset..].starts_with(ITEMS_MARKER);
        let pattern = ItemsPattern {
            path: path.clone(),
            offset: text[..byte_offset].chars().count(),
            context: snippet(text, byte_offset),
            valid,
        };

        trace!(path = %pattern.path, offset = pattern.offset, valid, "marker occurrence");
        if valid {
            detection.patterns.push(pattern);
        } else {
            detection.malformed.push(pattern);
        }
    }
}

fn snippet(text: &str, byte_offset: usize) -> String {
    let before: String = text[..byte_offset]
        .chars()
        .rev()
        .take(SNIPPET_RADIUS)
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();
    let after: String = text[byte_offset..]
        .chars()
        .take(ITEMS_MARKER.len() + SNIPPET_RADIUS)
        .collect();
    format!("{}{}", before, after)
}
