//! The training pipeline.
//!
//! [`Trainer`] runs one training request end to end: feature
//! preparation, target encoding, deterministic split, fitting,
//! evaluation on both splits, feature importance, and artifact
//! persistence. Configuration goes through [`TrainerBuilder`] so a
//! misconfigured trainer is unrepresentable.

use std::path::PathBuf;

use tracing::info;

use insight_data::Dataset;

use crate::artifact::{artifact_timestamp, ArtifactStore, TrainedModelArtifact};
use crate::error::{Result, TrainingError};
use crate::features::{
    encode_class_labels, encode_continuous_target, prepare_features, EncodedTarget,
};
use crate::metrics::{classification_metrics, regression_metrics};
use crate::model::{to_matrix, Estimator, ModelFamily, Predictions};
use crate::split::{split_indices, SplitPolicy};
use crate::types::{TrainingReport, TrainingRequest};

/// Default directory for saved model artifacts.
pub const DEFAULT_ARTIFACT_DIR: &str = "models";

/// Runs training requests against a dataset.
#[derive(Debug)]
pub struct Trainer {
    split: SplitPolicy,
    store: ArtifactStore,
}

/// Builder for [`Trainer`].
#[derive(Debug, Clone)]
pub struct TrainerBuilder {
    split: SplitPolicy,
    artifact_dir: PathBuf,
}

impl Default for TrainerBuilder {
    fn default() -> Self {
        Self {
            split: SplitPolicy::default(),
            artifact_dir: PathBuf::from(DEFAULT_ARTIFACT_DIR),
        }
    }
}

impl TrainerBuilder {
    /// Override the train/test split policy.
    #[must_use]
    pub fn with_split_policy(mut self, split: SplitPolicy) -> Self {
        self.split = split;
        self
    }

    /// Override where artifacts are written.
    #[must_use]
    pub fn with_artifact_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.artifact_dir = dir.into();
        self
    }

    /// Validate the configuration and open the artifact store.
    pub fn build(self) -> Result<Trainer> {
        self.split.validate()?;
        let store = ArtifactStore::new(self.artifact_dir)?;
        Ok(Trainer {
            split: self.split,
            store,
        })
    }
}

impl Trainer {
    /// Start building a trainer with default settings.
    #[must_use]
    pub fn builder() -> TrainerBuilder {
        TrainerBuilder::default()
    }

    /// The artifact store this trainer saves into.
    #[must_use]
    pub fn store(&self) -> &ArtifactStore {
        &self.store
    }

    /// Train one model and persist it.
    ///
    /// Nothing is written until fitting and evaluation have succeeded,
    /// so a failed request leaves the artifact store untouched.
    pub fn train(&self, dataset: &Dataset, request: &TrainingRequest) -> Result<TrainingReport> {
        let model_type = request.model_type;
        info!(
            model = %model_type,
            target = %request.target_column,
            "training started"
        );

        let df = dataset.df();
        let features = prepare_features(df, &request.target_column)?;
        let target = match model_type.family() {
            ModelFamily::Regression => {
                EncodedTarget::Continuous(encode_continuous_target(df, &request.target_column)?)
            }
            ModelFamily::Classification => {
                let (codes, classes) = encode_class_labels(df, &request.target_column)?;
                EncodedTarget::Categorical { codes, classes }
            }
        };

        let split = split_indices(features.n_rows(), &self.split)?;
        let train_x = to_matrix(&features.select_rows(&split.train))?;
        let test_x = to_matrix(&features.select_rows(&split.test))?;

        let (estimator, metrics, warnings, class_labels) = match &target {
            EncodedTarget::Continuous(values) => {
                let train_y: Vec<f64> = split.train.iter().map(|&i| values[i]).collect();
                let test_y: Vec<f64> = split.test.iter().map(|&i| values[i]).collect();

                let estimator =
                    Estimator::fit(model_type, &train_x, &EncodedTarget::Continuous(train_y.clone()))?;
                let train_pred = continuous(estimator.predict(&train_x)?)?;
                let test_pred = continuous(estimator.predict(&test_x)?)?;
                let metrics = regression_metrics(&train_y, &train_pred, &test_y, &test_pred);
                (estimator, metrics, Vec::new(), None)
            }
            EncodedTarget::Categorical { codes, classes } => {
                let train_y: Vec<i64> = split.train.iter().map(|&i| codes[i]).collect();
                let test_y: Vec<i64> = split.test.iter().map(|&i| codes[i]).collect();

                let estimator = Estimator::fit(
                    model_type,
                    &train_x,
                    &EncodedTarget::Categorical {
                        codes: train_y.clone(),
                        classes: classes.clone(),
                    },
                )?;
                let train_pred = classes_of(estimator.predict(&train_x)?)?;
                let test_pred = classes_of(estimator.predict(&test_x)?)?;
                let (metrics, warnings) =
                    classification_metrics(&train_y, &train_pred, &test_y, &test_pred, classes);
                (estimator, metrics, warnings, Some(classes.clone()))
            }
        };

        let feature_importance = estimator.feature_importance(&features.feature_names);
        let split_info = split.info();
        let trained_at = artifact_timestamp();

        let artifact = TrainedModelArtifact {
            estimator,
            feature_names: features.feature_names.clone(),
            target_column: request.target_column.clone(),
            model_type,
            class_labels: class_labels.clone(),
            split_info,
            trained_at: trained_at.clone(),
        };
        let artifact_name = self.store.save(&artifact)?;

        info!(
            model = %model_type,
            artifact = %artifact_name,
            train_rows = split_info.train_size,
            test_rows = split_info.test_size,
            "training complete"
        );

        Ok(TrainingReport {
            model_type,
            target_column: request.target_column.clone(),
            feature_names: features.feature_names,
            metrics,
            feature_importance,
            class_labels,
            split_info,
            artifact: artifact_name,
            trained_at,
            warnings,
        })
    }
}

fn continuous(predictions: Predictions) -> Result<Vec<f64>> {
    match predictions {
        Predictions::Continuous(values) => Ok(values),
        Predictions::Classes(_) => Err(TrainingError::InvalidData(
            "regression estimator returned class predictions".to_string(),
        )),
    }
}

fn classes_of(predictions: Predictions) -> Result<Vec<i64>> {
    match predictions {
        Predictions::Classes(codes) => Ok(codes),
        Predictions::Continuous(_) => Err(TrainingError::InvalidData(
            "classifier returned continuous predictions".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ModelType;
    use polars::prelude::*;
    use pretty_assertions::assert_eq;

    fn regression_dataset() -> Dataset {
        let x: Vec<f64> = (0..30).map(|i| i as f64).collect();
        let noise: Vec<f64> = (0..30).map(|i| ((i * 7) % 5) as f64).collect();
        let y: Vec<f64> = x
            .iter()
            .zip(&noise)
            .map(|(x, n)| 3.0 * x + 0.5 * n + 2.0)
            .collect();
        let df = df! {
            "x" => &x,
            "noise" => &noise,
            "y" => &y,
        }
        .unwrap();
        Dataset::new(df).unwrap()
    }

    fn trainer(dir: &std::path::Path) -> Trainer {
        Trainer::builder().with_artifact_dir(dir).build().unwrap()
    }

    #[test]
    fn test_linear_regression_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let trainer = trainer(dir.path());

        let report = trainer
            .train(
                &regression_dataset(),
                &TrainingRequest {
                    target_column: "y".to_string(),
                    model_type: ModelType::LinearRegression,
                },
            )
            .unwrap();

        assert_eq!(report.feature_names, vec!["x", "noise"]);
        assert!(report.metrics.test_r2.unwrap() > 0.99);
        assert!(report.metrics.train_mse.unwrap() < 1.0);
        assert!(report.metrics.train_accuracy.is_none());
        assert!(report.feature_importance.is_some());
        assert!(report.class_labels.is_none());
        assert_eq!(report.split_info.train_size, 24);
        assert_eq!(report.split_info.test_size, 6);
        assert!(dir.path().join(&report.artifact).is_file());
    }

    #[test]
    fn test_forest_regressor_has_no_importance() {
        let dir = tempfile::tempdir().unwrap();
        let trainer = trainer(dir.path());

        let report = trainer
            .train(
                &regression_dataset(),
                &TrainingRequest {
                    target_column: "y".to_string(),
                    model_type: ModelType::RandomForestRegressor,
                },
            )
            .unwrap();
        assert!(report.feature_importance.is_none());
    }

    #[test]
    fn test_failed_request_writes_no_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let trainer = trainer(dir.path());

        let err = trainer
            .train(
                &regression_dataset(),
                &TrainingRequest {
                    target_column: "missing".to_string(),
                    model_type: ModelType::LinearRegression,
                },
            )
            .unwrap_err();

        assert_eq!(err.error_code(), "TARGET_NOT_FOUND");
        assert!(trainer.store().list().unwrap().is_empty());
    }

    #[test]
    fn test_mismatched_prediction_variant_is_an_error() {
        let err = continuous(Predictions::Classes(vec![0, 1])).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_DATA");

        let err = classes_of(Predictions::Continuous(vec![0.5])).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_DATA");
    }

    #[test]
    fn test_too_few_rows() {
        let dir = tempfile::tempdir().unwrap();
        let trainer = trainer(dir.path());
        let df = df! {
            "x" => &[1.0f64, 2.0, 3.0],
            "y" => &[1.0f64, 2.0, 3.0],
        }
        .unwrap();

        let err = trainer
            .train(
                &Dataset::new(df).unwrap(),
                &TrainingRequest {
                    target_column: "y".to_string(),
                    model_type: ModelType::LinearRegression,
                },
            )
            .unwrap_err();
        assert_eq!(err.error_code(), "INSUFFICIENT_ROWS");
    }
}
