//! Model evaluation metrics.
//!
//! Regression models report MSE, MAE and R² on both splits.
//! Classification models report accuracy and weighted
//! precision/recall/F1 on both splits, plus a confusion matrix on the
//! test split. The weighted metrics of a split require every predicted
//! label to be one of that split's actual labels; when the precondition
//! fails the split degrades to accuracy only and the report says so in
//! its warnings.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Metrics for one trained model. Regression and classification fill
/// disjoint subsets of the fields; absent fields are omitted from JSON.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EvaluationMetrics {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub train_mse: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub test_mse: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub train_mae: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub test_mae: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub train_r2: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub test_r2: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub train_accuracy: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub test_accuracy: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub train_precision: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub test_precision: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub train_recall: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub test_recall: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub train_f1: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub test_f1: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confusion_matrix: Option<ConfusionMatrix>,
}

/// Test-split confusion matrix: `matrix[i][j]` counts rows whose actual
/// label is `labels[i]` and predicted label is `labels[j]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfusionMatrix {
    pub labels: Vec<String>,
    pub matrix: Vec<Vec<usize>>,
}

/// Mean squared error.
#[must_use]
pub fn mse(actual: &[f64], predicted: &[f64]) -> f64 {
    actual
        .iter()
        .zip(predicted)
        .map(|(a, p)| (a - p).powi(2))
        .sum::<f64>()
        / actual.len() as f64
}

/// Mean absolute error.
#[must_use]
pub fn mae(actual: &[f64], predicted: &[f64]) -> f64 {
    actual
        .iter()
        .zip(predicted)
        .map(|(a, p)| (a - p).abs())
        .sum::<f64>()
        / actual.len() as f64
}

/// Coefficient of determination.
///
/// A constant actual vector has no variance to explain: the score is
/// 1.0 for an exact fit and 0.0 otherwise.
#[must_use]
pub fn r2(actual: &[f64], predicted: &[f64]) -> f64 {
    let mean = actual.iter().sum::<f64>() / actual.len() as f64;
    let ss_tot: f64 = actual.iter().map(|a| (a - mean).powi(2)).sum();
    let ss_res: f64 = actual
        .iter()
        .zip(predicted)
        .map(|(a, p)| (a - p).powi(2))
        .sum();

    if ss_tot == 0.0 {
        return if ss_res == 0.0 { 1.0 } else { 0.0 };
    }
    1.0 - ss_res / ss_tot
}

/// Fraction of matching labels.
#[must_use]
pub fn accuracy(actual: &[i64], predicted: &[i64]) -> f64 {
    let correct = actual
        .iter()
        .zip(predicted)
        .filter(|(a, p)| a == p)
        .count();
    correct as f64 / actual.len() as f64
}

/// Check the precondition for weighted precision/recall/F1: every
/// predicted label must also occur among the actual labels.
#[must_use]
pub fn label_sets_match(actual: &[i64], predicted: &[i64]) -> bool {
    let actual_set: BTreeSet<i64> = actual.iter().copied().collect();
    predicted.iter().all(|p| actual_set.contains(p))
}

/// Support-weighted precision, recall and F1 over the actual label set.
///
/// A class with no predicted occurrences contributes zero precision
/// rather than failing.
#[must_use]
pub fn weighted_precision_recall_f1(actual: &[i64], predicted: &[i64]) -> (f64, f64, f64) {
    let classes: BTreeSet<i64> = actual.iter().copied().collect();
    let total = actual.len() as f64;

    let mut precision = 0.0;
    let mut recall = 0.0;
    let mut f1 = 0.0;

    for class in classes {
        let tp = actual
            .iter()
            .zip(predicted)
            .filter(|(a, p)| **a == class && **p == class)
            .count() as f64;
        let predicted_positive = predicted.iter().filter(|p| **p == class).count() as f64;
        let support = actual.iter().filter(|a| **a == class).count() as f64;

        let class_precision = if predicted_positive > 0.0 {
            tp / predicted_positive
        } else {
            0.0
        };
        let class_recall = if support > 0.0 { tp / support } else { 0.0 };
        let class_f1 = if class_precision + class_recall > 0.0 {
            2.0 * class_precision * class_recall / (class_precision + class_recall)
        } else {
            0.0
        };

        let weight = support / total;
        precision += weight * class_precision;
        recall += weight * class_recall;
        f1 += weight * class_f1;
    }

    (precision, recall, f1)
}

/// Confusion matrix over the labels present in either vector, decoded
/// through `classes` and ordered as `classes` orders them.
#[must_use]
pub fn confusion_matrix(actual: &[i64], predicted: &[i64], classes: &[String]) -> ConfusionMatrix {
    let present: BTreeSet<i64> = actual.iter().chain(predicted).copied().collect();
    let codes: Vec<i64> = present.into_iter().collect();
    let labels: Vec<String> = codes
        .iter()
        .map(|&code| classes[code as usize].clone())
        .collect();

    let position = |code: i64| codes.iter().position(|&c| c == code).unwrap_or(0);
    let mut matrix = vec![vec![0usize; codes.len()]; codes.len()];
    for (a, p) in actual.iter().zip(predicted) {
        matrix[position(*a)][position(*p)] += 1;
    }

    ConfusionMatrix { labels, matrix }
}

/// Assemble regression metrics from both splits.
#[must_use]
pub fn regression_metrics(
    train_actual: &[f64],
    train_predicted: &[f64],
    test_actual: &[f64],
    test_predicted: &[f64],
) -> EvaluationMetrics {
    EvaluationMetrics {
        train_mse: Some(mse(train_actual, train_predicted)),
        test_mse: Some(mse(test_actual, test_predicted)),
        train_mae: Some(mae(train_actual, train_predicted)),
        test_mae: Some(mae(test_actual, test_predicted)),
        train_r2: Some(r2(train_actual, train_predicted)),
        test_r2: Some(r2(test_actual, test_predicted)),
        ..EvaluationMetrics::default()
    }
}

/// Assemble classification metrics from both splits.
///
/// Returns the metrics plus warnings describing any degradation. When a
/// split fails the label precondition its weighted metrics (and, for the
/// test split, the confusion matrix) are omitted and accuracy stands
/// alone.
#[must_use]
pub fn classification_metrics(
    train_actual: &[i64],
    train_predicted: &[i64],
    test_actual: &[i64],
    test_predicted: &[i64],
    classes: &[String],
) -> (EvaluationMetrics, Vec<String>) {
    let mut metrics = EvaluationMetrics {
        train_accuracy: Some(accuracy(train_actual, train_predicted)),
        test_accuracy: Some(accuracy(test_actual, test_predicted)),
        ..EvaluationMetrics::default()
    };
    let mut warnings = Vec::new();

    if label_sets_match(train_actual, train_predicted) {
        let (precision, recall, f1) = weighted_precision_recall_f1(train_actual, train_predicted);
        metrics.train_precision = Some(precision);
        metrics.train_recall = Some(recall);
        metrics.train_f1 = Some(f1);
    } else {
        let message = "train predictions contain labels absent from the train split; \
                       reporting train accuracy only"
            .to_string();
        warn!("{message}");
        warnings.push(message);
    }

    if label_sets_match(test_actual, test_predicted) {
        let (precision, recall, f1) = weighted_precision_recall_f1(test_actual, test_predicted);
        metrics.test_precision = Some(precision);
        metrics.test_recall = Some(recall);
        metrics.test_f1 = Some(f1);
        metrics.confusion_matrix = Some(confusion_matrix(test_actual, test_predicted, classes));
    } else {
        let message = "test predictions contain labels absent from the test split; \
                       reporting test accuracy only"
            .to_string();
        warn!("{message}");
        warnings.push(message);
    }

    (metrics, warnings)
}
