//! Session state for a hosting application.
//!
//! One [`Session`] owns the active dataset, the most recent training
//! report and the trainer configuration. All mutation goes through
//! `RwLock`s, so the hosting glue (HTTP handler, IPC command, CLI) can
//! share one session across threads without its own synchronization.
//! Uploading a dataset replaces the previous one and invalidates the
//! last training report.

use std::path::PathBuf;

use parking_lot::RwLock;
use serde_json::{Map, Value};
use tracing::info;

use insight_data::{analyze, Dataset, DatasetAnalysis, DatasetSummary};

use crate::artifact::TrainedModelArtifact;
use crate::error::{Result, TrainingError};
use crate::pipeline::Trainer;
use crate::types::{TrainingReport, TrainingRequest, TrainingResponse};

/// Shared application state: dataset, last training report, trainer.
#[derive(Debug)]
pub struct Session {
    dataset: RwLock<Option<Dataset>>,
    last_report: RwLock<Option<TrainingReport>>,
    trainer: Trainer,
}

impl Session {
    /// Create a session around a configured trainer.
    #[must_use]
    pub fn new(trainer: Trainer) -> Self {
        Self {
            dataset: RwLock::new(None),
            last_report: RwLock::new(None),
            trainer,
        }
    }

    /// Create a session with the default trainer configuration.
    pub fn with_defaults() -> Result<Self> {
        Ok(Self::new(Trainer::builder().build()?))
    }

    /// Whether a dataset is currently loaded.
    #[must_use]
    pub fn has_dataset(&self) -> bool {
        self.dataset.read().is_some()
    }

    /// Parse CSV bytes and make the result the active dataset.
    ///
    /// Returns the new dataset's summary. The previous dataset and the
    /// last training report are discarded.
    pub fn load_csv(&self, bytes: &[u8]) -> Result<DatasetSummary> {
        let dataset = Dataset::from_csv_bytes(bytes)?;
        Ok(self.replace_dataset(dataset))
    }

    /// Make an already-parsed dataset the active one.
    pub fn replace_dataset(&self, dataset: Dataset) -> DatasetSummary {
        let summary = dataset.describe().clone();
        *self.dataset.write() = Some(dataset);
        *self.last_report.write() = None;
        info!(rows = summary.row_count, "active dataset replaced");
        summary
    }

    /// Drop the active dataset and last report.
    pub fn clear(&self) {
        *self.dataset.write() = None;
        *self.last_report.write() = None;
    }

    /// Summary of the active dataset.
    pub fn describe(&self) -> Result<DatasetSummary> {
        self.with_dataset(|dataset| Ok(dataset.describe().clone()))
    }

    /// First `n` rows of the active dataset as JSON records.
    pub fn preview(&self, n: usize) -> Result<Vec<Map<String, Value>>> {
        self.with_dataset(|dataset| Ok(dataset.preview(n)))
    }

    /// Full descriptive analysis of the active dataset.
    pub fn analyze(&self) -> Result<DatasetAnalysis> {
        self.with_dataset(|dataset| Ok(analyze(dataset)?))
    }

    /// Train a model on the active dataset and remember the report.
    pub fn train(&self, request: &TrainingRequest) -> Result<TrainingReport> {
        let dataset = self
            .dataset
            .read()
            .clone()
            .ok_or(TrainingError::NoDatasetLoaded)?;
        let report = self.trainer.train(&dataset, request)?;
        *self.last_report.write() = Some(report.clone());
        Ok(report)
    }

    /// Like [`Session::train`], wrapped in the `{success, ...}` envelope.
    pub fn train_response(&self, request: &TrainingRequest) -> TrainingResponse {
        TrainingResponse::from_result(self.train(request))
    }

    /// The most recent training report, if any.
    #[must_use]
    pub fn last_training(&self) -> Option<TrainingReport> {
        self.last_report.read().clone()
    }

    /// Path of a saved artifact, for download glue.
    pub fn artifact_path(&self, name: &str) -> Result<PathBuf> {
        self.trainer.store().resolve(name)
    }

    /// Load a saved artifact by file name.
    pub fn load_artifact(&self, name: &str) -> Result<TrainedModelArtifact> {
        self.trainer.store().load(name)
    }

    fn with_dataset<T>(&self, f: impl FnOnce(&Dataset) -> Result<T>) -> Result<T> {
        match self.dataset.read().as_ref() {
            Some(dataset) => f(dataset),
            None => Err(TrainingError::NoDatasetLoaded),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ModelType;
    use pretty_assertions::assert_eq;

    fn session(dir: &std::path::Path) -> Session {
        Session::new(Trainer::builder().with_artifact_dir(dir).build().unwrap())
    }

    const CSV: &[u8] = b"x,y\n1,3\n2,5\n3,7\n4,9\n5,11\n6,13\n7,15\n8,17\n9,19\n10,21\n";

    #[test]
    fn test_operations_require_a_dataset() {
        let dir = tempfile::tempdir().unwrap();
        let session = session(dir.path());

        assert!(!session.has_dataset());
        assert_eq!(
            session.describe().unwrap_err().error_code(),
            "NO_DATASET_LOADED"
        );
        assert_eq!(
            session.analyze().unwrap_err().error_code(),
            "NO_DATASET_LOADED"
        );
    }

    #[test]
    fn test_upload_then_describe_and_preview() {
        let dir = tempfile::tempdir().unwrap();
        let session = session(dir.path());

        let summary = session.load_csv(CSV).unwrap();
        assert_eq!(summary.row_count, 10);
        assert_eq!(session.preview(3).unwrap().len(), 3);
    }

    #[test]
    fn test_train_records_last_report() {
        let dir = tempfile::tempdir().unwrap();
        let session = session(dir.path());
        session.load_csv(CSV).unwrap();

        assert!(session.last_training().is_none());
        let report = session
            .train(&TrainingRequest {
                target_column: "y".to_string(),
                model_type: ModelType::LinearRegression,
            })
            .unwrap();
        assert_eq!(session.last_training().unwrap().artifact, report.artifact);

        // The artifact is resolvable through the session.
        assert!(session.artifact_path(&report.artifact).is_ok());
    }

    #[test]
    fn test_new_upload_invalidates_last_report() {
        let dir = tempfile::tempdir().unwrap();
        let session = session(dir.path());
        session.load_csv(CSV).unwrap();
        session
            .train(&TrainingRequest {
                target_column: "y".to_string(),
                model_type: ModelType::LinearRegression,
            })
            .unwrap();

        session.load_csv(CSV).unwrap();
        assert!(session.last_training().is_none());
    }

    #[test]
    fn test_train_response_envelope_on_error() {
        let dir = tempfile::tempdir().unwrap();
        let session = session(dir.path());

        let response = session.train_response(&TrainingRequest {
            target_column: "y".to_string(),
            model_type: ModelType::LinearRegression,
        });
        assert!(!response.success);
        let error = response.error.unwrap();
        assert_eq!(error["code"], "NO_DATASET_LOADED");
    }
}
