//! Request and report types for the training pipeline.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;
use crate::metrics::EvaluationMetrics;
use crate::model::ModelType;
use crate::split::SplitInfo;

/// What to train: which column to predict and with which model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainingRequest {
    pub target_column: String,
    pub model_type: ModelType,
}

/// Everything a training run produces, minus the fitted model itself
/// (which lives in the saved artifact).
///
/// # Fields
///
/// * `feature_importance` - present only for coefficient-based models
/// * `class_labels` - present only for classification runs
/// * `artifact` - file name of the saved model in the artifact store
/// * `warnings` - non-fatal degradations (e.g. metrics reduced to accuracy)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingReport {
    pub model_type: ModelType,
    pub target_column: String,
    pub feature_names: Vec<String>,
    pub metrics: EvaluationMetrics,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feature_importance: Option<BTreeMap<String, f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class_labels: Option<Vec<String>>,
    pub split_info: SplitInfo,
    pub artifact: String,
    pub trained_at: String,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub warnings: Vec<String>,
}

/// JSON envelope for glue layers that never want a transport-level
/// error: either `{success: true, result}` or `{success: false, error}`.
#[derive(Debug, Clone, Serialize)]
pub struct TrainingResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<TrainingReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<Value>,
}

impl TrainingResponse {
    /// Wrap a training outcome into the envelope.
    #[must_use]
    pub fn from_result(result: Result<TrainingReport>) -> Self {
        match result {
            Ok(report) => Self {
                success: true,
                result: Some(report),
                error: None,
            },
            Err(error) => Self {
                success: false,
                result: None,
                error: Some(serde_json::json!({
                    "code": error.error_code(),
                    "message": error.to_string(),
                })),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TrainingError;

    #[test]
    fn test_request_deserializes_snake_case_model() {
        let request: TrainingRequest = serde_json::from_str(
            r#"{"target_column": "price", "model_type": "random_forest_regressor"}"#,
        )
        .unwrap();
        assert_eq!(request.model_type, ModelType::RandomForestRegressor);
    }

    #[test]
    fn test_error_response_envelope() {
        let response =
            TrainingResponse::from_result(Err(TrainingError::TargetNotFound("y".to_string())));
        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(json["success"], false);
        assert_eq!(json["error"]["code"], "TARGET_NOT_FOUND");
        assert!(json.get("result").is_none());
    }
}
