//! # Insight Learning
//!
//! Supervised model training for the insight prediction core. Takes a
//! [`Dataset`](insight_data::Dataset) from `insight-data`, prepares a
//! one-hot encoded feature matrix, fits one of four model types
//! (linear/logistic regression, random forest classifier/regressor),
//! evaluates it on a deterministic train/test split, and persists the
//! fitted model as a reloadable JSON artifact.
//!
//! ## Example
//!
//! ```no_run
//! use insight_learning::{ModelType, Session, TrainingRequest};
//!
//! # fn main() -> insight_learning::Result<()> {
//! let session = Session::with_defaults()?;
//! session.load_csv(&std::fs::read("customers.csv")?)?;
//!
//! let report = session.train(&TrainingRequest {
//!     target_column: "purchased".to_string(),
//!     model_type: ModelType::RandomForestClassifier,
//! })?;
//! println!("test accuracy: {:?}", report.metrics.test_accuracy);
//! println!("saved as {}", report.artifact);
//! # Ok(())
//! # }
//! ```

pub mod artifact;
pub mod error;
pub mod features;
pub mod metrics;
pub mod model;
pub mod pipeline;
pub mod session;
pub mod split;
pub mod types;

pub use artifact::{ArtifactStore, TrainedModelArtifact};
pub use error::{Result, TrainingError};
pub use features::{EncodedTarget, FeatureMatrix};
pub use metrics::{ConfusionMatrix, EvaluationMetrics};
pub use model::{Estimator, ImportanceKind, ModelFamily, ModelType, Predictions};
pub use pipeline::{Trainer, TrainerBuilder, DEFAULT_ARTIFACT_DIR};
pub use session::Session;
pub use split::{SplitInfo, SplitPolicy, MIN_TRAINING_ROWS};
pub use types::{TrainingReport, TrainingRequest, TrainingResponse};
