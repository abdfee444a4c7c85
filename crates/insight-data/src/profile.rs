//! Descriptive profiling of the active dataset.
//!
//! Produces the [`DatasetAnalysis`] payload: per-column summary
//! statistics, a Pearson correlation matrix over the numeric columns,
//! categorical cardinality, and histogram bins for plotting. All
//! statistics skip nulls; correlations are computed over pairwise
//! complete rows.

use polars::prelude::*;
use std::collections::BTreeMap;
use tracing::info;

use crate::column::{column_kind, ColumnKind};
use crate::dataset::Dataset;
use crate::error::Result;
use crate::types::{
    ColumnHistogram, CorrelationMatrix, DatasetAnalysis, HistogramBin, NumericSummary,
};

/// Number of bins used for column histograms.
const HISTOGRAM_BINS: usize = 10;

/// Run the full descriptive analysis over the active dataset.
///
/// Numeric columns (booleans included, as 0/1) contribute summary
/// statistics, correlations and histograms. Null counts and distinct
/// value counts cover every column regardless of type.
pub fn analyze(dataset: &Dataset) -> Result<DatasetAnalysis> {
    let df = dataset.df();

    let mut numeric_columns = Vec::new();
    let mut categorical_columns = Vec::new();
    let mut null_counts = BTreeMap::new();
    let mut summary_stats = BTreeMap::new();
    let mut cardinality = BTreeMap::new();
    let mut histograms = Vec::new();

    // Per-column non-null values, kept aligned by row for correlations.
    let mut numeric_values: Vec<Vec<Option<f64>>> = Vec::new();

    for column in df.get_columns() {
        let name = column.name().to_string();
        null_counts.insert(name.clone(), column.null_count());
        cardinality.insert(name.clone(), column.as_materialized_series().n_unique()?);

        match column_kind(column.dtype()) {
            ColumnKind::Numeric | ColumnKind::Boolean => {
                let series = column
                    .as_materialized_series()
                    .cast(&DataType::Float64)?;
                let values: Vec<Option<f64>> = series.f64()?.into_iter().collect();
                let present: Vec<f64> = values.iter().flatten().copied().collect();

                if let Some(summary) = summarize_values(&present) {
                    summary_stats.insert(name.clone(), summary);
                }
                if let Some(histogram) = build_histogram(&name, &present) {
                    histograms.push(histogram);
                }

                numeric_columns.push(name);
                numeric_values.push(values);
            }
            ColumnKind::Categorical => {
                categorical_columns.push(name);
            }
            ColumnKind::Other => {}
        }
    }

    let correlation_matrix = correlation_matrix(&numeric_columns, &numeric_values);

    info!(
        numeric = numeric_columns.len(),
        categorical = categorical_columns.len(),
        "dataset analysis complete"
    );

    Ok(DatasetAnalysis {
        numeric_columns,
        categorical_columns,
        null_counts,
        summary_stats,
        correlation_matrix,
        cardinality,
        histograms,
    })
}

/// Summary statistics over the non-null values of one column.
///
/// Returns `None` when the column has no values at all.
fn summarize_values(values: &[f64]) -> Option<NumericSummary> {
    if values.is_empty() {
        return None;
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let count = sorted.len();
    let mean = sorted.iter().sum::<f64>() / count as f64;

    Some(NumericSummary {
        count,
        mean,
        std: calculate_std(&sorted, mean),
        min: sorted[0],
        q25: quantile_sorted(&sorted, 0.25),
        median: quantile_sorted(&sorted, 0.5),
        q75: quantile_sorted(&sorted, 0.75),
        max: sorted[count - 1],
    })
}

/// Sample standard deviation (ddof = 1). Zero for a single value.
fn calculate_std(values: &[f64], mean: f64) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let variance = values
        .iter()
        .map(|v| (v - mean).powi(2))
        .sum::<f64>()
        / (values.len() - 1) as f64;
    variance.sqrt()
}

/// Linear-interpolation quantile over an already-sorted slice.
fn quantile_sorted(sorted: &[f64], q: f64) -> f64 {
    if sorted.len() == 1 {
        return sorted[0];
    }
    let position = q * (sorted.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    if lower == upper {
        sorted[lower]
    } else {
        let fraction = position - lower as f64;
        sorted[lower] + (sorted[upper] - sorted[lower]) * fraction
    }
}

/// Pearson correlation matrix over the numeric columns.
///
/// Each pair is computed over rows where both columns are non-null. A
/// pair with fewer than two complete rows, or with a constant column,
/// yields NaN for that cell; the diagonal of a non-empty column is 1.0.
fn correlation_matrix(columns: &[String], values: &[Vec<Option<f64>>]) -> CorrelationMatrix {
    let n = columns.len();
    let mut matrix = vec![vec![f64::NAN; n]; n];

    for i in 0..n {
        for j in i..n {
            let r = pearson(&values[i], &values[j]);
            matrix[i][j] = r;
            matrix[j][i] = r;
        }
    }

    CorrelationMatrix {
        columns: columns.to_vec(),
        values: matrix,
    }
}

/// Pearson correlation over pairwise complete rows.
fn pearson(a: &[Option<f64>], b: &[Option<f64>]) -> f64 {
    let pairs: Vec<(f64, f64)> = a
        .iter()
        .zip(b.iter())
        .filter_map(|(x, y)| match (x, y) {
            (Some(x), Some(y)) => Some((*x, *y)),
            _ => None,
        })
        .collect();

    if pairs.len() < 2 {
        return f64::NAN;
    }

    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|(x, _)| x).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|(_, y)| y).sum::<f64>() / n;

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (x, y) in &pairs {
        let dx = x - mean_x;
        let dy = y - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    if var_x == 0.0 || var_y == 0.0 {
        return f64::NAN;
    }
    cov / (var_x.sqrt() * var_y.sqrt())
}

/// Equal-width histogram over the non-null values of one column.
///
/// Returns `None` for empty columns. A constant column gets a single
/// bin holding every value.
fn build_histogram(column: &str, values: &[f64]) -> Option<ColumnHistogram> {
    if values.is_empty() {
        return None;
    }

    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    if min == max {
        return Some(ColumnHistogram {
            column: column.to_string(),
            bins: vec![HistogramBin {
                start: min,
                end: max,
                count: values.len(),
            }],
        });
    }

    let width = (max - min) / HISTOGRAM_BINS as f64;
    let mut counts = vec![0usize; HISTOGRAM_BINS];
    for value in values {
        let mut idx = ((value - min) / width) as usize;
        // The maximum lands in the last bin.
        if idx >= HISTOGRAM_BINS {
            idx = HISTOGRAM_BINS - 1;
        }
        counts[idx] += 1;
    }

    let bins = counts
        .into_iter()
        .enumerate()
        .map(|(i, count)| HistogramBin {
            start: min + width * i as f64,
            end: min + width * (i + 1) as f64,
            count,
        })
        .collect();

    Some(ColumnHistogram {
        column: column.to_string(),
        bins,
    })
}
