//! Error types for the credit inference core

use std::fmt;
use thiserror::Error;

/// Result type alias for inference operations
pub type Result<T> = std::result::Result<T, CreditError>;

/// A single rejected input field
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FieldViolation {
    pub field: String,
    pub reason: String,
}

impl FieldViolation {
    pub fn new(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for FieldViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}': {}", self.field, self.reason)
    }
}

fn join_violations(violations: &[FieldViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Main error type for the inference core
#[derive(Error, Debug)]
pub enum CreditError {
    /// Malformed or out-of-range client input. Never fatal, always per-request.
    #[error("Validation error: {}", join_violations(.violations))]
    Validation { violations: Vec<FieldViolation> },

    /// No usable artifact could be obtained for the requested key
    #[error("Model unavailable: {name}@{stage}: {reason}")]
    ModelUnavailable {
        name: String,
        stage: String,
        reason: String,
    },

    /// Model/schema skew detected while building or applying the feature transform
    #[error("Transform error: {0}")]
    Transform(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl CreditError {
    /// Validation error for a single field
    pub fn invalid_field(field: impl Into<String>, reason: impl Into<String>) -> Self {
        CreditError::Validation {
            violations: vec![FieldViolation::new(field, reason)],
        }
    }

    pub fn model_unavailable(
        name: impl Into<String>,
        stage: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        CreditError::ModelUnavailable {
            name: name.into(),
            stage: stage.into(),
            reason: reason.into(),
        }
    }

    /// Names of the offending fields, empty for non-validation errors
    pub fn fields(&self) -> Vec<&str> {
        match self {
            CreditError::Validation { violations } => {
                violations.iter().map(|v| v.field.as_str()).collect()
            }
            _ => Vec::new(),
        }
    }

    /// True when the caller sent bad input rather than the service failing
    pub fn is_client_error(&self) -> bool {
        matches!(self, CreditError::Validation { .. })
    }

    /// HTTP-style status for the route layer
    pub fn status_code(&self) -> u16 {
        match self {
            CreditError::Validation { .. } => 400,
            CreditError::ModelUnavailable { .. } => 503,
            _ => 500,
        }
    }
}

impl From<serde_json::Error> for CreditError {
    fn from(err: serde_json::Error) -> Self {
        CreditError::Serialization(err.to_string())
    }
}

impl From<ndarray::ShapeError> for CreditError {
    fn from(err: ndarray::ShapeError) -> Self {
        CreditError::Transform(format!("invalid shape: {}", err))
    }
}
