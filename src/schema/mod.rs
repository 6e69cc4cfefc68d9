//! Versioned document validation and migration.
//!
//! Raw JSON is checked structurally first (collecting every issue with its
//! dot path), then deserialized into the typed domain. Legacy `v1` documents
//! are validated against their own shape and migrated to `v2`.

use std::fmt;
use thiserror::Error;

mod checker;
pub mod document;
pub mod migrate;
pub mod v1;
pub mod v2;

pub use document::{
    create_document, export_document, parse_document, AppDocument, DocumentSource,
};
pub use migrate::migrate_v1_to_v2;
pub use v1::{parse_app_state_v1, AppStateV1};
pub use v2::parse_app_state;

/// One violation, located by a dot-joined path such as `holdings.0.classId`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    pub path: String,
    pub message: String,
}

impl ValidationIssue {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }

    /// The same issue nested under `prefix`.
    pub fn prefixed(self, prefix: &str) -> Self {
        let path = if self.path.is_empty() {
            prefix.to_string()
        } else {
            format!("{prefix}.{}", self.path)
        };
        Self { path, ..self }
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "{}", self.message)
        } else {
            write!(f, "{}: {}", self.path, self.message)
        }
    }
}

/// Why an import was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DocumentError {
    #[error("Invalid JSON: {0}")]
    InvalidJson(String),
    #[error("document failed validation with {} issue(s)", .0.len())]
    Invalid(Vec<ValidationIssue>),
}

impl DocumentError {
    /// Every problem rendered as `"<path>: <message>"`.
    pub fn messages(&self) -> Vec<String> {
        match self {
            DocumentError::InvalidJson(_) => vec![self.to_string()],
            DocumentError::Invalid(issues) => issues.iter().map(ToString::to_string).collect(),
        }
    }
}

/// Either the validated value or the complete list of problems.
pub type ParseOutcome<T> = Result<T, DocumentError>;

/// Deserialize a structurally checked value into its typed form.
fn into_typed<T: serde::de::DeserializeOwned>(value: serde_json::Value) -> ParseOutcome<T> {
    serde_json::from_value(value)
        .map_err(|err| DocumentError::Invalid(vec![ValidationIssue::new("", err.to_string())]))
}
