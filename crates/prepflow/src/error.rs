//! Error types for the quality engine.
//!
//! The taxonomy mirrors how failures surface to callers: validation and
//! computation errors are recorded per-action during preprocessing (the batch
//! continues), detector errors are fatal to an analysis call, and
//! configuration errors abort resampling with the dataset unchanged.
//!
//! Errors serialize as `{code, message}` so the serving layer can forward
//! them to a frontend without inspecting variants.

use serde::Serialize;
use serde::ser::SerializeStruct;
use thiserror::Error;

/// The main error type for analysis and preprocessing operations.
#[derive(Error, Debug)]
pub enum PrepError {
    /// Malformed action: unknown issue_type/method pair.
    #[error("No transform registered for issue type '{issue_type}' with method '{method}'")]
    UnknownMethod { issue_type: String, method: String },

    /// Column was not found in the dataset.
    #[error("Column '{0}' not found in dataset")]
    ColumnNotFound(String),

    /// Generic action validation failure.
    #[error("Invalid action: {0}")]
    Validation(String),

    /// A transform could not execute on the given data.
    #[error("Cannot apply transform to column '{column}': {reason}")]
    Computation { column: String, reason: String },

    /// A detector could not complete; fatal to the whole analysis.
    #[error("Detector '{detector}' failed: {reason}")]
    Detector { detector: &'static str, reason: String },

    /// Invalid parameters passed to the imbalance resolver.
    #[error("Invalid resampling configuration: {0}")]
    Configuration(String),

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Polars error wrapper.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl PrepError {
    pub fn computation(column: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Computation {
            column: column.into(),
            reason: reason.into(),
        }
    }

    pub fn detector(detector: &'static str, reason: impl Into<String>) -> Self {
        Self::Detector {
            detector,
            reason: reason.into(),
        }
    }

    /// Stable error code for frontend handling.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::UnknownMethod { .. } => "UNKNOWN_METHOD",
            Self::ColumnNotFound(_) => "COLUMN_NOT_FOUND",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Computation { .. } => "COMPUTATION_ERROR",
            Self::Detector { .. } => "DETECTOR_ERROR",
            Self::Configuration(_) => "CONFIGURATION_ERROR",
            Self::Io(_) => "IO_ERROR",
            Self::Polars(_) => "POLARS_ERROR",
            Self::Json(_) => "JSON_ERROR",
        }
    }

    /// Whether this error is recorded per-action instead of aborting a batch.
    pub fn is_action_local(&self) -> bool {
        matches!(
            self,
            Self::UnknownMethod { .. }
                | Self::ColumnNotFound(_)
                | Self::Validation(_)
                | Self::Computation { .. }
        )
    }
}

/// Serialize as `{code, message}` for IPC/HTTP forwarding.
impl Serialize for PrepError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("PrepError", 2)?;
        state.serialize_field("code", &self.error_code())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

/// Result type alias for engine operations.
pub type Result<T> = std::result::Result<T, PrepError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code() {
        assert_eq!(
            PrepError::ColumnNotFound("age".to_string()).error_code(),
            "COLUMN_NOT_FOUND"
        );
        assert_eq!(
            PrepError::detector("outliers", "bad shape").error_code(),
            "DETECTOR_ERROR"
        );
    }

    #[test]
    fn test_action_local_classification() {
        assert!(PrepError::ColumnNotFound("x".to_string()).is_action_local());
        assert!(PrepError::computation("x", "empty series").is_action_local());
        assert!(!PrepError::detector("skewness", "boom").is_action_local());
        assert!(!PrepError::Configuration("bad target".to_string()).is_action_local());
    }

    #[test]
    fn test_error_serialization() {
        let error = PrepError::UnknownMethod {
            issue_type: "missing_values".to_string(),
            method: "teleport".to_string(),
        };
        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains("UNKNOWN_METHOD"));
        assert!(json.contains("teleport"));
    }
}
