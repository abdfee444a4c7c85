//! Custom error types for model training, evaluation and artifact storage.
//!
//! Mirrors the `{code, message}` serialization of `insight-data` so all
//! errors crossing the crate boundary look identical to the hosting glue.

use serde::ser::SerializeStruct;
use serde::Serialize;
use thiserror::Error;

/// The main error type for training operations.
#[derive(Error, Debug)]
pub enum TrainingError {
    /// No dataset is currently active in the session.
    #[error("No dataset loaded. Upload a dataset before training")]
    NoDatasetLoaded,

    /// The requested target column does not exist in the dataset.
    #[error("Target column '{0}' not found in dataset")]
    TargetNotFound(String),

    /// The requested model type is not one of the supported identifiers.
    #[error(
        "Unknown model type '{0}'. Expected one of: linear_regression, \
         logistic_regression, random_forest_classifier, random_forest_regressor"
    )]
    UnknownModelType(String),

    /// Too few rows remain after row filtering to fit a model.
    #[error("Dataset has {rows} usable rows but at least {minimum} are required for training")]
    InsufficientRows { rows: usize, minimum: usize },

    /// The dataset cannot be turned into a valid feature matrix or target vector.
    #[error("Invalid training data: {0}")]
    InvalidData(String),

    /// Estimator fitting or prediction failed.
    #[error("Estimator error: {0}")]
    Estimator(#[from] smartcore::error::Failed),

    /// A named artifact was requested but does not exist in the store.
    #[error("Model artifact '{name}' not found")]
    ArtifactNotFound { name: String },

    /// Artifact could not be written to or read from disk.
    #[error("Artifact persistence error: {0}")]
    Persistence(String),

    /// Invalid trainer configuration (split ratio, artifact directory).
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Error bubbled up from the data crate.
    #[error(transparent)]
    Data(#[from] insight_data::DataError),

    /// Polars error wrapper (column access, casting).
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl TrainingError {
    /// Get a stable error code for frontend/glue handling.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NoDatasetLoaded => "NO_DATASET_LOADED",
            Self::TargetNotFound(_) => "TARGET_NOT_FOUND",
            Self::UnknownModelType(_) => "UNKNOWN_MODEL_TYPE",
            Self::InsufficientRows { .. } => "INSUFFICIENT_ROWS",
            Self::InvalidData(_) => "INVALID_DATA",
            Self::Estimator(_) => "ESTIMATOR_ERROR",
            Self::ArtifactNotFound { .. } => "ARTIFACT_NOT_FOUND",
            Self::Persistence(_) => "PERSISTENCE_ERROR",
            Self::InvalidConfig(_) => "INVALID_CONFIG",
            Self::Data(inner) => inner.error_code(),
            Self::Polars(_) => "POLARS_ERROR",
            Self::Io(_) => "IO_ERROR",
            Self::Json(_) => "JSON_ERROR",
        }
    }
}

/// Serialize as a struct with `code` and `message` fields.
impl Serialize for TrainingError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("TrainingError", 2)?;
        state.serialize_field("code", &self.error_code())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

/// Result type alias for training operations.
pub type Result<T> = std::result::Result<T, TrainingError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code() {
        assert_eq!(
            TrainingError::TargetNotFound("label".to_string()).error_code(),
            "TARGET_NOT_FOUND"
        );
        assert_eq!(
            TrainingError::InsufficientRows { rows: 3, minimum: 5 }.error_code(),
            "INSUFFICIENT_ROWS"
        );
    }

    #[test]
    fn test_unknown_model_type_lists_valid_identifiers() {
        let message = TrainingError::UnknownModelType("svm".to_string()).to_string();
        assert!(message.contains("linear_regression"));
        assert!(message.contains("random_forest_regressor"));
    }

    #[test]
    fn test_data_error_keeps_its_code() {
        let error = TrainingError::Data(insight_data::DataError::NoDatasetLoaded);
        assert_eq!(error.error_code(), "NO_DATASET_LOADED");
    }

    #[test]
    fn test_error_serialization() {
        let error = TrainingError::ArtifactNotFound {
            name: "model_x.json".to_string(),
        };
        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains("ARTIFACT_NOT_FOUND"));
        assert!(json.contains("model_x.json"));
    }
}
