//! Feature matrix and target vector preparation.
//!
//! Turns the active DataFrame into an `f64` design matrix: numeric and
//! boolean columns pass through, string columns are expanded into 0/1
//! indicator columns named `{column}_{value}` (one per distinct value, in
//! sorted order). Column order follows the original table, so preparing
//! the same dataset twice yields the same feature names in the same
//! order.

use std::collections::{BTreeMap, BTreeSet};

use polars::prelude::*;
use serde_json::{Map, Value};
use tracing::debug;

use insight_data::{column_kind, ColumnKind};

use crate::error::{Result, TrainingError};

/// A prepared design matrix: row-major `f64` values plus the name of each
/// column, aligned with the row vectors.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureMatrix {
    pub feature_names: Vec<String>,
    pub rows: Vec<Vec<f64>>,
}

impl FeatureMatrix {
    /// Number of rows in the matrix.
    #[must_use]
    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    /// Select a subset of rows by index, preserving the given order.
    #[must_use]
    pub fn select_rows(&self, indices: &[usize]) -> Vec<Vec<f64>> {
        indices.iter().map(|&i| self.rows[i].clone()).collect()
    }
}

/// A target column encoded for fitting.
#[derive(Debug, Clone, PartialEq)]
pub enum EncodedTarget {
    /// Continuous values for regression models.
    Continuous(Vec<f64>),
    /// Class codes for classification models, plus the label each code
    /// stands for (`classes[code]`).
    Categorical { codes: Vec<i64>, classes: Vec<String> },
}

impl EncodedTarget {
    /// Number of target values.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Continuous(values) => values.len(),
            Self::Categorical { codes, .. } => codes.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Build the feature matrix from every column except the target.
///
/// Columns that are neither numeric, boolean nor string (dates, nested
/// types) are skipped. Null numeric cells are rejected; a null in a
/// string column produces an all-zero indicator row for that column.
///
/// # Errors
///
/// [`TrainingError::TargetNotFound`] if the target column is missing,
/// [`TrainingError::InvalidData`] if a numeric column contains nulls or
/// no usable feature column remains.
pub fn prepare_features(df: &DataFrame, target_column: &str) -> Result<FeatureMatrix> {
    if df.column(target_column).is_err() {
        return Err(TrainingError::TargetNotFound(target_column.to_string()));
    }

    let n_rows = df.height();
    let mut feature_names: Vec<String> = Vec::new();
    // Column-major staging; transposed into rows at the end.
    let mut columns: Vec<Vec<f64>> = Vec::new();

    for column in df.get_columns() {
        let name = column.name().as_str();
        if name == target_column {
            continue;
        }

        match column_kind(column.dtype()) {
            ColumnKind::Numeric | ColumnKind::Boolean => {
                let series = column.as_materialized_series().cast(&DataType::Float64)?;
                let mut values = Vec::with_capacity(n_rows);
                for value in series.f64()?.into_iter() {
                    match value {
                        Some(v) => values.push(v),
                        None => {
                            return Err(TrainingError::InvalidData(format!(
                                "numeric column '{name}' contains null values; \
                                 drop or fill them before training"
                            )));
                        }
                    }
                }
                feature_names.push(name.to_string());
                columns.push(values);
            }
            ColumnKind::Categorical => {
                let series = column.as_materialized_series().cast(&DataType::String)?;
                let raw: Vec<Option<String>> = series
                    .str()?
                    .into_iter()
                    .map(|v| v.map(str::to_string))
                    .collect();

                let distinct: BTreeSet<&String> = raw.iter().flatten().collect();
                for value in &distinct {
                    let indicator: Vec<f64> = raw
                        .iter()
                        .map(|cell| match cell {
                            Some(v) if v == *value => 1.0,
                            _ => 0.0,
                        })
                        .collect();
                    feature_names.push(format!("{name}_{value}"));
                    columns.push(indicator);
                }
            }
            ColumnKind::Other => {
                debug!(column = name, dtype = %column.dtype(), "skipping unsupported column");
            }
        }
    }

    if feature_names.is_empty() {
        return Err(TrainingError::InvalidData(
            "no usable feature columns remain after excluding the target".to_string(),
        ));
    }

    let rows = (0..n_rows)
        .map(|row| columns.iter().map(|col| col[row]).collect())
        .collect();

    Ok(FeatureMatrix {
        feature_names,
        rows,
    })
}

/// Encode the target column as continuous values for regression.
///
/// # Errors
///
/// [`TrainingError::InvalidData`] if the column is not numeric or
/// contains nulls.
pub fn encode_continuous_target(df: &DataFrame, target_column: &str) -> Result<Vec<f64>> {
    let column = df
        .column(target_column)
        .map_err(|_| TrainingError::TargetNotFound(target_column.to_string()))?;

    let series = column
        .as_materialized_series()
        .cast(&DataType::Float64)
        .map_err(|_| {
            TrainingError::InvalidData(format!(
                "target column '{target_column}' must be numeric for regression models"
            ))
        })?;

    let mut values = Vec::with_capacity(series.len());
    for value in series.f64()?.into_iter() {
        match value {
            Some(v) if v.is_finite() => values.push(v),
            Some(_) => {
                return Err(TrainingError::InvalidData(format!(
                    "target column '{target_column}' contains non-finite values"
                )));
            }
            None => {
                return Err(TrainingError::InvalidData(format!(
                    "target column '{target_column}' contains null values"
                )));
            }
        }
    }
    Ok(values)
}

/// Encode the target column as class codes for classification.
///
/// Labels are the stringified cell values. The label order is numeric
/// when every label parses as a number (so "2" sorts before "10"),
/// lexicographic otherwise; `classes[code]` recovers the original label.
///
/// # Errors
///
/// [`TrainingError::InvalidData`] if the column contains nulls or fewer
/// than two distinct labels.
pub fn encode_class_labels(df: &DataFrame, target_column: &str) -> Result<(Vec<i64>, Vec<String>)> {
    let column = df
        .column(target_column)
        .map_err(|_| TrainingError::TargetNotFound(target_column.to_string()))?;

    let mut labels = Vec::with_capacity(column.len());
    for idx in 0..column.len() {
        let value = column.get(idx)?;
        match cell_label(&value) {
            Some(label) => labels.push(label),
            None => {
                return Err(TrainingError::InvalidData(format!(
                    "target column '{target_column}' contains null values"
                )));
            }
        }
    }

    let mut classes: Vec<String> = labels
        .iter()
        .cloned()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    sort_labels(&mut classes);

    if classes.len() < 2 {
        return Err(TrainingError::InvalidData(format!(
            "target column '{target_column}' needs at least two distinct classes, found {}",
            classes.len()
        )));
    }

    let index: BTreeMap<&String, i64> = classes
        .iter()
        .enumerate()
        .map(|(i, label)| (label, i as i64))
        .collect();
    let codes = labels.iter().map(|label| index[label]).collect();

    Ok((codes, classes))
}

/// Stringify one target cell; `None` for nulls.
fn cell_label(value: &AnyValue) -> Option<String> {
    match value {
        AnyValue::Null => None,
        AnyValue::String(s) => Some((*s).to_string()),
        AnyValue::StringOwned(s) => Some(s.to_string()),
        AnyValue::Boolean(b) => Some(b.to_string()),
        other => Some(format!("{}", other)),
    }
}

/// Sort labels numerically when they all parse as numbers, otherwise
/// lexicographically.
fn sort_labels(labels: &mut [String]) {
    let numeric: Option<Vec<f64>> = labels.iter().map(|l| l.parse::<f64>().ok()).collect();
    if numeric.is_some() {
        labels.sort_by(|a, b| {
            let (a, b) = (a.parse::<f64>().unwrap(), b.parse::<f64>().unwrap());
            a.partial_cmp(&b).unwrap_or(std::cmp::Ordering::Equal)
        });
    } else {
        labels.sort();
    }
}

/// Align a raw JSON record with a trained model's feature names.
///
/// Numeric features are read directly from the record; indicator
/// features `{column}_{value}` become 1.0 when the record's `column`
/// holds exactly `value`. A category never seen at training time (or a
/// missing column) contributes zeros, matching how unseen categories
/// were encoded during training.
///
/// # Errors
///
/// [`TrainingError::InvalidData`] if a directly-named numeric feature is
/// present but not a number.
pub fn encode_for_inference(
    record: &Map<String, Value>,
    feature_names: &[String],
) -> Result<Vec<f64>> {
    let mut row = Vec::with_capacity(feature_names.len());
    for feature in feature_names {
        row.push(feature_value(record, feature)?);
    }
    Ok(row)
}

fn feature_value(record: &Map<String, Value>, feature: &str) -> Result<f64> {
    if let Some(value) = record.get(feature) {
        return match value {
            Value::Number(n) => n.as_f64().ok_or_else(|| {
                TrainingError::InvalidData(format!("feature '{feature}' is not a finite number"))
            }),
            Value::Bool(b) => Ok(if *b { 1.0 } else { 0.0 }),
            other => Err(TrainingError::InvalidData(format!(
                "feature '{feature}' expected a number, got {other}"
            ))),
        };
    }

    // Indicator lookup: find a record key that prefixes the feature name
    // as "{key}_{value}" and compare the record's string value.
    for (key, value) in record {
        if let Some(suffix) = feature
            .strip_prefix(key.as_str())
            .and_then(|rest| rest.strip_prefix('_'))
        {
            if let Value::String(s) = value {
                return Ok(if s == suffix { 1.0 } else { 0.0 });
            }
        }
    }

    // Unknown feature: treat as an unseen category.
    Ok(0.0)
}
