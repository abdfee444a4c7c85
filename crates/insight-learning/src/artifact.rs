//! Persisted model artifacts.
//!
//! A trained model is saved as one JSON file bundling the fitted
//! estimator with everything needed to use it later: the feature names
//! (in training order), the target column, the model type, class labels
//! for classifiers, and the split that produced its metrics. File names
//! are timestamped and never overwrite an existing artifact.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Local;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::info;

use crate::error::{Result, TrainingError};
use crate::features::encode_for_inference;
use crate::model::{to_matrix, Estimator, ModelType, Predictions};
use crate::split::SplitInfo;

/// Timestamp format embedded in artifact file names.
const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// A fitted model plus the context needed to reuse it.
#[derive(Debug, Serialize, Deserialize)]
pub struct TrainedModelArtifact {
    pub estimator: Estimator,
    pub feature_names: Vec<String>,
    pub target_column: String,
    pub model_type: ModelType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class_labels: Option<Vec<String>>,
    pub split_info: SplitInfo,
    pub trained_at: String,
}

impl TrainedModelArtifact {
    /// Predict for raw JSON records (original column name → value).
    ///
    /// Each record is aligned with the stored feature names the same way
    /// the training data was encoded. Classifier predictions come back
    /// as the original labels, regressor predictions as numbers.
    pub fn predict(&self, records: &[Map<String, Value>]) -> Result<Vec<Value>> {
        let rows = records
            .iter()
            .map(|record| encode_for_inference(record, &self.feature_names))
            .collect::<Result<Vec<_>>>()?;
        let x = to_matrix(&rows)?;

        match self.estimator.predict(&x)? {
            Predictions::Continuous(values) => Ok(values
                .into_iter()
                .map(|v| {
                    serde_json::Number::from_f64(v)
                        .map(Value::Number)
                        .unwrap_or(Value::Null)
                })
                .collect()),
            Predictions::Classes(codes) => Ok(codes
                .into_iter()
                .map(|code| self.decode_class(code))
                .collect()),
        }
    }

    fn decode_class(&self, code: i64) -> Value {
        match &self.class_labels {
            Some(labels) => labels
                .get(code as usize)
                .map(|label| Value::String(label.clone()))
                .unwrap_or(Value::Number(code.into())),
            None => Value::Number(code.into()),
        }
    }
}

/// Directory-backed artifact storage.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    dir: PathBuf,
}

impl ArtifactStore {
    /// Open (and create if needed) the store directory.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    /// The directory artifacts are written into.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Save an artifact under `model_{type}_{timestamp}.json`, appending
    /// `_{n}` when that name is already taken. Returns the file name.
    pub fn save(&self, artifact: &TrainedModelArtifact) -> Result<String> {
        let timestamp = Local::now().format(TIMESTAMP_FORMAT);
        let base = format!("model_{}_{}", artifact.model_type, timestamp);
        let payload = serde_json::to_vec(artifact)?;

        let mut attempt = 0usize;
        loop {
            let name = if attempt == 0 {
                format!("{base}.json")
            } else {
                format!("{base}_{attempt}.json")
            };
            let path = self.dir.join(&name);

            // create_new makes the collision check atomic.
            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(mut file) => {
                    file.write_all(&payload)?;
                    info!(artifact = %name, "model artifact saved");
                    return Ok(name);
                }
                Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                    attempt += 1;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Resolve an artifact name to its path inside the store.
    ///
    /// # Errors
    ///
    /// [`TrainingError::Persistence`] for names that are not bare file
    /// names, [`TrainingError::ArtifactNotFound`] when no such file
    /// exists.
    pub fn resolve(&self, name: &str) -> Result<PathBuf> {
        if name.is_empty() || name.contains('/') || name.contains('\\') || name.contains("..") {
            return Err(TrainingError::Persistence(format!(
                "artifact name '{name}' must be a bare file name"
            )));
        }

        let path = self.dir.join(name);
        if !path.is_file() {
            return Err(TrainingError::ArtifactNotFound {
                name: name.to_string(),
            });
        }
        Ok(path)
    }

    /// Load a previously saved artifact by file name.
    pub fn load(&self, name: &str) -> Result<TrainedModelArtifact> {
        let path = self.resolve(name)?;
        let bytes = std::fs::read(path)?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// File names of every artifact in the store, sorted.
    pub fn list(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in std::fs::read_dir(&self.dir)? {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().to_string();
            if name.ends_with(".json") && entry.file_type()?.is_file() {
                names.push(name);
            }
        }
        names.sort();
        Ok(names)
    }
}

/// Timestamp string recorded in artifacts and reports.
#[must_use]
pub fn artifact_timestamp() -> String {
    Local::now().format(TIMESTAMP_FORMAT).to_string()
}
