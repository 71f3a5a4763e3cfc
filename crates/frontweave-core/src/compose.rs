//! Data composition: build the main data context and the collection to expand
//!
//! Caller data is never overwritten. When the target name of an items key is
//! already taken, the collection attaches at `<name>_items` instead.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::{FrontweaveError, Result};
use crate::format::Format;
use crate::value::{as_mapping, type_name};

/// Key the collection attaches under when nothing else names one
pub const DEFAULT_ITEMS_KEY: &str = "items";

/// Suffix used when the target name is already present in main data
pub const COLLISION_SUFFIX: &str = "_items";

/// Where an expansion key takes its values from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeySource {
    /// The items collection itself
    ItemsMarker,
    /// A field of main data; contributes to the array data only
    Field(String),
}

/// A (source, target) pair governing how a collection attaches
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpansionKey {
    pub source: KeySource,
    pub target: String,
}

impl ExpansionKey {
    /// Attach the items collection at `target`
    pub fn items(target: impl Into<String>) -> Self {
        Self {
            source: KeySource::ItemsMarker,
            target: target.into(),
        }
    }

    /// Contribute main data's `source` field to the array data
    pub fn field(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: KeySource::Field(source.into()),
            target: target.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ComposedData {
    /// Caller main data plus the attached collection(s)
    pub main_data: Value,
    /// Sequence fed to the expansion engine
    pub array_data: Value,
    /// Names the collection actually attached under, in key order
    pub attached_keys: Vec<String>,
}

impl ComposedData {
    /// The name the first items key attached under
    pub fn items_key(&self) -> Option<&str> {
        self.attached_keys.first().map(String::as_str)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DataComposer;

impl DataComposer {
    pub fn new() -> Self {
        Self
    }

    /// Compose main data with the items collection
    ///
    /// # Errors
    ///
    /// `DATA_COMPOSITION_FAILED` when `main_data` is not a mapping (null counts as
    /// empty) or `items_data` is not a sequence.
    pub fn compose(
        &self,
        main_data: &Value,
        items_data: &Value,
        keys: &[ExpansionKey],
    ) -> Result<ComposedData> {
        let mut main = as_mapping(main_data).ok_or_else(|| {
            FrontweaveError::DataCompositionFailed(format!(
                "main data must be a mapping, found {}",
                type_name(main_data)
            ))
        })?;

        let Value::Array(items) = items_data else {
            return Err(FrontweaveError::DataCompositionFailed(format!(
                "items data must be a sequence, found {}",
                type_name(items_data)
            )));
        };

        let mut array_data = items.clone();
        let mut attached_keys = Vec::new();

        for key in keys {
            match &key.source {
                KeySource::ItemsMarker => {
                    let name = free_key(&main, &key.target);
                    if name != key.target {
                        debug!(requested = %key.target, attached = %name, "target taken, using collision key");
                    }
                    main.insert(name.clone(), Value::Array(items.clone()));
                    attached_keys.push(name);
                }
                KeySource::Field(source) => match main.get(source) {
                    Some(Value::Array(values)) => array_data.extend(values.iter().cloned()),
                    Some(Value::Null) | None => {}
                    Some(value) => array_data.push(value.clone()),
                },
            }
        }

        Ok(ComposedData {
            main_data: Value::Object(main),
            array_data: Value::Array(array_data),
            attached_keys,
        })
    }

    /// Compose main data with an empty collection
    pub fn compose_single(&self, main_data: &Value, keys: &[ExpansionKey]) -> Result<ComposedData> {
        self.compose(main_data, &Value::Array(Vec::new()), keys)
    }

    /// Compose a collection with empty main data
    pub fn compose_array(&self, items_data: &Value, keys: &[ExpansionKey]) -> Result<ComposedData> {
        self.compose(&Value::Object(Map::new()), items_data, keys)
    }

    /// Compose main data with per-item text rendered elsewhere
    ///
    /// Each text is parsed in `syntax`; text that does not parse is kept as a
    /// string. The result attaches under [`DEFAULT_ITEMS_KEY`].
    pub fn create_dual_template_data(
        &self,
        main_data: &Value,
        rendered_items: &[String],
        syntax: Format,
    ) -> Result<ComposedData> {
        let items = rendered_items
            .iter()
            .map(|text| {
                syntax
                    .parse(text)
                    .unwrap_or_else(|_| Value::String(text.clone()))
            })
            .collect();

        self.compose(
            main_data,
            &Value::Array(items),
            &[ExpansionKey::items(DEFAULT_ITEMS_KEY)],
        )
    }
}

/// `target`, or the first `<target>_items[_items...]` not already present
fn free_key(main: &Map<String, Value>, target: &str) -> String {
    let mut name = target.to_string();
    while main.contains_key(&name) {
        name.push_str(COLLISION_SUFFIX);
    }
    name
}
