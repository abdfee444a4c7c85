//! Supported model types and the estimator wrapper around them.
//!
//! [`ModelType`] is the public identifier set; [`Estimator`] wraps the
//! fitted smartcore model behind a single fit/predict surface so the
//! pipeline and artifact code never match on concrete estimator types.
//! What each model can report (feature importance) is declared up front
//! via [`ImportanceKind`] instead of being probed after the fact.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use smartcore::ensemble::random_forest_classifier::{
    RandomForestClassifier, RandomForestClassifierParameters,
};
use smartcore::ensemble::random_forest_regressor::{
    RandomForestRegressor, RandomForestRegressorParameters,
};
use smartcore::linalg::basic::arrays::Array;
use smartcore::linalg::basic::matrix::DenseMatrix;
use smartcore::linear::linear_regression::{LinearRegression, LinearRegressionParameters};
use smartcore::linear::logistic_regression::{LogisticRegression, LogisticRegressionParameters};

use crate::error::{Result, TrainingError};
use crate::features::EncodedTarget;

/// Number of trees in both random forest models.
const FOREST_TREES: u16 = 100;
/// RNG seed for forest bootstrapping.
const FOREST_SEED: u64 = 42;

/// The four supported supervised model types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelType {
    LinearRegression,
    LogisticRegression,
    RandomForestClassifier,
    RandomForestRegressor,
}

/// Whether a model predicts a continuous value or a class label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelFamily {
    Regression,
    Classification,
}

/// How a model type reports feature importance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportanceKind {
    /// Absolute coefficient magnitudes (averaged over classes for
    /// multinomial models).
    Coefficients,
    /// No importance signal available.
    None,
}

impl ModelType {
    /// Stable string identifier, matching the serde representation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LinearRegression => "linear_regression",
            Self::LogisticRegression => "logistic_regression",
            Self::RandomForestClassifier => "random_forest_classifier",
            Self::RandomForestRegressor => "random_forest_regressor",
        }
    }

    /// Regression or classification.
    #[must_use]
    pub fn family(&self) -> ModelFamily {
        match self {
            Self::LinearRegression | Self::RandomForestRegressor => ModelFamily::Regression,
            Self::LogisticRegression | Self::RandomForestClassifier => {
                ModelFamily::Classification
            }
        }
    }

    /// Declared feature-importance capability.
    #[must_use]
    pub fn importance_kind(&self) -> ImportanceKind {
        match self {
            Self::LinearRegression | Self::LogisticRegression => ImportanceKind::Coefficients,
            Self::RandomForestClassifier | Self::RandomForestRegressor => ImportanceKind::None,
        }
    }

    /// All supported model types, for listings.
    #[must_use]
    pub fn all() -> [ModelType; 4] {
        [
            Self::LinearRegression,
            Self::LogisticRegression,
            Self::RandomForestClassifier,
            Self::RandomForestRegressor,
        ]
    }
}

impl fmt::Display for ModelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModelType {
    type Err = TrainingError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "linear_regression" => Ok(Self::LinearRegression),
            "logistic_regression" => Ok(Self::LogisticRegression),
            "random_forest_classifier" => Ok(Self::RandomForestClassifier),
            "random_forest_regressor" => Ok(Self::RandomForestRegressor),
            other => Err(TrainingError::UnknownModelType(other.to_string())),
        }
    }
}

/// Predictions from a fitted estimator, one entry per input row.
#[derive(Debug, Clone, PartialEq)]
pub enum Predictions {
    Continuous(Vec<f64>),
    Classes(Vec<i64>),
}

/// Build a smartcore matrix from row-major feature data.
pub fn to_matrix(rows: &[Vec<f64>]) -> Result<DenseMatrix<f64>> {
    Ok(DenseMatrix::from_2d_vec(&rows.to_vec())?)
}

/// A fitted model, serializable for artifact storage.
#[derive(Debug, Serialize, Deserialize)]
pub enum Estimator {
    LinearRegression(LinearRegression<f64, f64, DenseMatrix<f64>, Vec<f64>>),
    LogisticRegression(LogisticRegression<f64, i64, DenseMatrix<f64>, Vec<i64>>),
    RandomForestClassifier(RandomForestClassifier<f64, i64, DenseMatrix<f64>, Vec<i64>>),
    RandomForestRegressor(RandomForestRegressor<f64, f64, DenseMatrix<f64>, Vec<f64>>),
}

impl Estimator {
    /// Fit the requested model type on the given design matrix and
    /// encoded target.
    ///
    /// # Errors
    ///
    /// [`TrainingError::InvalidData`] when the target encoding does not
    /// match the model family, [`TrainingError::Estimator`] when the
    /// underlying solver fails.
    pub fn fit(model_type: ModelType, x: &DenseMatrix<f64>, y: &EncodedTarget) -> Result<Self> {
        match (model_type, y) {
            (ModelType::LinearRegression, EncodedTarget::Continuous(values)) => {
                let model = LinearRegression::fit(x, values, LinearRegressionParameters::default())?;
                Ok(Self::LinearRegression(model))
            }
            (ModelType::RandomForestRegressor, EncodedTarget::Continuous(values)) => {
                let params = RandomForestRegressorParameters::default()
                    .with_n_trees(FOREST_TREES.into())
                    .with_seed(FOREST_SEED);
                let model = RandomForestRegressor::fit(x, values, params)?;
                Ok(Self::RandomForestRegressor(model))
            }
            (ModelType::LogisticRegression, EncodedTarget::Categorical { codes, .. }) => {
                let model =
                    LogisticRegression::fit(x, codes, LogisticRegressionParameters::default())?;
                Ok(Self::LogisticRegression(model))
            }
            (ModelType::RandomForestClassifier, EncodedTarget::Categorical { codes, .. }) => {
                let params = RandomForestClassifierParameters::default()
                    .with_n_trees(FOREST_TREES)
                    .with_seed(FOREST_SEED);
                let model = RandomForestClassifier::fit(x, codes, params)?;
                Ok(Self::RandomForestClassifier(model))
            }
            (model_type, _) => Err(TrainingError::InvalidData(format!(
                "target encoding does not match the {} family of '{}'",
                match model_type.family() {
                    ModelFamily::Regression => "regression",
                    ModelFamily::Classification => "classification",
                },
                model_type
            ))),
        }
    }

    /// The model type this estimator was fitted as.
    #[must_use]
    pub fn model_type(&self) -> ModelType {
        match self {
            Self::LinearRegression(_) => ModelType::LinearRegression,
            Self::LogisticRegression(_) => ModelType::LogisticRegression,
            Self::RandomForestClassifier(_) => ModelType::RandomForestClassifier,
            Self::RandomForestRegressor(_) => ModelType::RandomForestRegressor,
        }
    }

    /// Predict for each row of the design matrix.
    pub fn predict(&self, x: &DenseMatrix<f64>) -> Result<Predictions> {
        match self {
            Self::LinearRegression(model) => Ok(Predictions::Continuous(model.predict(x)?)),
            Self::RandomForestRegressor(model) => Ok(Predictions::Continuous(model.predict(x)?)),
            Self::LogisticRegression(model) => Ok(Predictions::Classes(model.predict(x)?)),
            Self::RandomForestClassifier(model) => Ok(Predictions::Classes(model.predict(x)?)),
        }
    }

    /// Per-feature importance scores, keyed by feature name.
    ///
    /// Only models whose type declares [`ImportanceKind::Coefficients`]
    /// return a value; forests return `None`.
    #[must_use]
    pub fn feature_importance(&self, feature_names: &[String]) -> Option<BTreeMap<String, f64>> {
        match self {
            Self::LinearRegression(model) => {
                Some(coefficient_importance(model.coefficients(), feature_names))
            }
            Self::LogisticRegression(model) => {
                Some(coefficient_importance(model.coefficients(), feature_names))
            }
            Self::RandomForestClassifier(_) | Self::RandomForestRegressor(_) => None,
        }
    }
}

/// Mean absolute coefficient per feature.
///
/// The coefficient matrix is oriented features-by-one for linear models
/// and classes-by-features for logistic ones; the feature axis is
/// recovered by matching dimensions against the feature count.
fn coefficient_importance(
    coefficients: &DenseMatrix<f64>,
    feature_names: &[String],
) -> BTreeMap<String, f64> {
    let (rows, cols) = coefficients.shape();
    let n_features = feature_names.len();

    let value_at = |feature: usize| -> f64 {
        if cols == n_features {
            // One row per class; average the magnitudes.
            let sum: f64 = (0..rows)
                .map(|class| coefficients.get((class, feature)).abs())
                .sum();
            sum / rows as f64
        } else {
            let sum: f64 = (0..cols)
                .map(|class| coefficients.get((feature, class)).abs())
                .sum();
            sum / cols as f64
        }
    };

    feature_names
        .iter()
        .enumerate()
        .map(|(i, name)| (name.clone(), value_at(i)))
        .collect()
}
