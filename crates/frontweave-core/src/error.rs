use std::path::PathBuf;
use thiserror::Error;

use crate::template::TemplateError;

#[derive(Error, Debug)]
pub enum FrontweaveError {
    // Items marker errors
    #[error("ITEMS_DETECTION_ERROR: {0}")]
    ItemsDetection(String),

    #[error("INVALID_ITEMS_PATTERNS: {0}")]
    InvalidItemsPatterns(String),

    // Expansion errors
    #[error("INVALID_ARRAY_DATA: expected a sequence, found {found}")]
    InvalidArrayData { found: String },

    #[error("INVALID_PROCESSING_CONTEXT: {0}")]
    InvalidProcessingContext(String),

    #[error("EXPANSION_CONTEXT_ERROR: {0}")]
    ExpansionContext(String),

    #[error("TEMPLATE_LOAD_ERROR: failed to load item template '{path}': {reason}")]
    TemplateLoad { path: PathBuf, reason: String },

    // Template loader errors
    #[error(transparent)]
    Template(#[from] TemplateError),

    #[error("INVALID_TEMPLATE: template '{path}' could not be parsed: {reason}")]
    InvalidTemplate { path: PathBuf, reason: String },

    // Data errors
    #[error("DATA_COMPOSITION_FAILED: {0}")]
    DataCompositionFailed(String),

    #[error("MISSING_REQUIRED_FIELD: no value for '{field}'")]
    MissingRequiredField { field: String },

    // Schema errors
    #[error("AMBIGUOUS_HIERARCHY_ROOT: more than one field is flagged as hierarchy root: {fields}")]
    AmbiguousHierarchyRoot { fields: String },

    #[error("SCHEMA_INVALID: {0}")]
    SchemaInvalid(String),

    // I/O collaborator errors
    #[error("FILE_NOT_FOUND: '{path}' does not exist")]
    FileNotFound { path: PathBuf },

    #[error("READ_ERROR: failed to read '{path}': {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("WRITE_ERROR: failed to write '{path}': {reason}")]
    WriteError { path: PathBuf, reason: String },

    // Output errors
    #[error("SERIALIZATION_ERROR: {0}")]
    Serialization(String),

    // Config errors
    #[error("CONFIG_PARSE_ERROR: {0}")]
    ConfigParseError(String),

    #[error("CONFIG_INVALID_VALUE: {field}: {reason}")]
    ConfigInvalidValue { field: String, reason: String },

    // IO errors
    #[error("IO_ERROR: {0}")]
    IoError(#[from] std::io::Error),
}

impl FrontweaveError {
    /// Stable machine-readable code for this error
    pub fn code(&self) -> &'static str {
        match self {
            FrontweaveError::ItemsDetection(_) => "ITEMS_DETECTION_ERROR",
            FrontweaveError::InvalidItemsPatterns(_) => "INVALID_ITEMS_PATTERNS",
            FrontweaveError::InvalidArrayData { .. } => "INVALID_ARRAY_DATA",
            FrontweaveError::InvalidProcessingContext(_) => "INVALID_PROCESSING_CONTEXT",
            FrontweaveError::ExpansionContext(_) => "EXPANSION_CONTEXT_ERROR",
            FrontweaveError::TemplateLoad { .. } => "TEMPLATE_LOAD_ERROR",
            FrontweaveError::Template(e) => e.code(),
            FrontweaveError::InvalidTemplate { .. } => "INVALID_TEMPLATE",
            FrontweaveError::DataCompositionFailed(_) => "DATA_COMPOSITION_FAILED",
            FrontweaveError::MissingRequiredField { .. } => "MISSING_REQUIRED_FIELD",
            FrontweaveError::AmbiguousHierarchyRoot { .. } => "AMBIGUOUS_HIERARCHY_ROOT",
            FrontweaveError::SchemaInvalid(_) => "SCHEMA_INVALID",
            FrontweaveError::FileNotFound { .. } => "FILE_NOT_FOUND",
            FrontweaveError::ReadError { .. } => "READ_ERROR",
            FrontweaveError::WriteError { .. } => "WRITE_ERROR",
            FrontweaveError::Serialization(_) => "SERIALIZATION_ERROR",
            FrontweaveError::ConfigParseError(_) => "CONFIG_PARSE_ERROR",
            FrontweaveError::ConfigInvalidValue { .. } => "CONFIG_INVALID_VALUE",
            FrontweaveError::IoError(_) => "IO_ERROR",
        }
    }
}

impl From<serde_json::Error> for FrontweaveError {
    fn from(err: serde_json::Error) -> Self {
        FrontweaveError::Serialization(format!("JSON error: {}", err))
    }
}

impl From<serde_yaml::Error> for FrontweaveError {
    fn from(err: serde_yaml::Error) -> Self {
        FrontweaveError::Serialization(format!("YAML error: {}", err))
    }
}

pub type Result<T> = std::result::Result<T, FrontweaveError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_starts_with_code() {
        let errors = vec![
            FrontweaveError::ItemsDetection("root is null".to_string()),
            FrontweaveError::InvalidItemsPatterns("duplicate path".to_string()),
            FrontweaveError::InvalidArrayData {
                found: "string".to_string(),
            },
            FrontweaveError::DataCompositionFailed("main data is a number".to_string()),
            FrontweaveError::MissingRequiredField {
                field: "title".to_string(),
            },
        ];

        for err in errors {
            let message = err.to_string();
            assert!(
                message.starts_with(err.code()),
                "'{}' should start with '{}'",
                message,
                err.code()
            );
        }
    }

    #[test]
    fn test_template_error_code_passes_through() {
        let err: FrontweaveError = TemplateError::EmptyFile {
            path: PathBuf::from("item.json"),
        }
        .into();
        assert_eq!(err.code(), "EMPTY_TEMPLATE_FILE");
        assert!(err.to_string().contains("item.json"));
    }
}
