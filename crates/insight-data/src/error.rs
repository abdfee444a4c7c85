//! Custom error types for dataset ingestion and analysis.
//!
//! Errors are serializable as `{code, message}` objects so whatever glue
//! hosts the core (HTTP handler, IPC command, CLI) can forward them to a
//! client without reshaping.

use serde::Serialize;
use serde::ser::SerializeStruct;
use thiserror::Error;

/// The main error type for dataset operations.
#[derive(Error, Debug)]
pub enum DataError {
    /// No dataset is currently active in the session.
    #[error("No dataset loaded. Upload a dataset before requesting analysis")]
    NoDatasetLoaded,

    /// Column was not found in the dataset.
    #[error("Column '{0}' not found in dataset")]
    ColumnNotFound(String),

    /// The uploaded table has no columns (or could not be interpreted as a table).
    #[error("Dataset is empty: {0}")]
    EmptyDataset(String),

    /// Polars error wrapper (CSV parsing, casting, series access).
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl DataError {
    /// Get a stable error code for frontend/glue handling.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NoDatasetLoaded => "NO_DATASET_LOADED",
            Self::ColumnNotFound(_) => "COLUMN_NOT_FOUND",
            Self::EmptyDataset(_) => "EMPTY_DATASET",
            Self::Polars(_) => "POLARS_ERROR",
            Self::Io(_) => "IO_ERROR",
            Self::Json(_) => "JSON_ERROR",
        }
    }
}

/// Serialize as a struct with `code` and `message` fields.
impl Serialize for DataError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("DataError", 2)?;
        state.serialize_field("code", &self.error_code())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

/// Result type alias for dataset operations.
pub type Result<T> = std::result::Result<T, DataError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code() {
        assert_eq!(DataError::NoDatasetLoaded.error_code(), "NO_DATASET_LOADED");
        assert_eq!(
            DataError::ColumnNotFound("age".to_string()).error_code(),
            "COLUMN_NOT_FOUND"
        );
    }

    #[test]
    fn test_error_serialization() {
        let error = DataError::ColumnNotFound("Age".to_string());
        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains("COLUMN_NOT_FOUND"));
        assert!(json.contains("Age"));
    }

    #[test]
    fn test_no_dataset_message_is_actionable() {
        let message = DataError::NoDatasetLoaded.to_string();
        assert!(message.contains("Upload a dataset"));
    }
}
