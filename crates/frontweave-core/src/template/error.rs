//! Template loading error types

use std::fmt;
use std::path::PathBuf;

/// Template loading errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateError {
    /// Template file does not exist
    NotFound {
        /// Path that was requested
        path: PathBuf,
    },

    /// Template file is empty or whitespace only
    EmptyFile {
        /// Path of the empty file
        path: PathBuf,
    },

    /// Template content could not be parsed into a mapping
    Parse {
        /// Path of the template
        path: PathBuf,
        /// Parser message
        message: String,
    },

    /// The reader failed for a reason other than a missing file
    Read {
        /// Path of the template
        path: PathBuf,
        /// Reader message
        message: String,
    },
}

impl TemplateError {
    /// Stable machine-readable code for this error
    pub fn code(&self) -> &'static str {
        match self {
            TemplateError::NotFound { .. } => "TEMPLATE_NOT_FOUND",
            TemplateError::EmptyFile { .. } => "EMPTY_TEMPLATE_FILE",
            TemplateError::Parse { .. } => "TEMPLATE_PARSE_ERROR",
            TemplateError::Read { .. } => "TEMPLATE_READ_ERROR",
        }
    }

    /// Path the error refers to
    pub fn path(&self) -> &PathBuf {
        match self {
            TemplateError::NotFound { path }
            | TemplateError::EmptyFile { path }
            | TemplateError::Parse { path, .. }
            | TemplateError::Read { path, .. } => path,
        }
    }
}

impl fmt::Display for TemplateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TemplateError::NotFound { path } => {
                write!(f, "TEMPLATE_NOT_FOUND: template '{}' not found", path.display())
            }
            TemplateError::EmptyFile { path } => {
                write!(f, "EMPTY_TEMPLATE_FILE: template '{}' is empty", path.display())
            }
            TemplateError::Parse { path, message } => {
                write!(
                    f,
                    "TEMPLATE_PARSE_ERROR: template '{}' could not be parsed: {}",
                    path.display(),
                    message
                )
            }
            TemplateError::Read { path, message } => {
                write!(
                    f,
                    "TEMPLATE_READ_ERROR: template '{}' could not be read: {}",
                    path.display(),
                    message
                )
            }
        }
    }
}

impl std::error::Error for TemplateError {}
