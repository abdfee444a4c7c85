//! Result types returned by dataset description and analysis.
//!
//! Every struct here derives `Serialize` so the hosting glue can hand the
//! payload straight to a JSON response.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Basic shape of a loaded dataset.
///
/// Computed once when the dataset is loaded and cached alongside the
/// DataFrame; served without re-computation thereafter.
///
/// # Fields
///
/// * `row_count` / `column_count` - table dimensions
/// * `column_names` - names in original column order
/// * `dtypes` - column name → dtype string
/// * `null_counts` - column name → number of null cells
/// * `numeric_columns` - names of numeric columns, in original order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetSummary {
    pub row_count: usize,
    pub column_count: usize,
    pub column_names: Vec<String>,
    pub dtypes: BTreeMap<String, String>,
    pub null_counts: BTreeMap<String, usize>,
    pub numeric_columns: Vec<String>,
}

/// Summary statistics for a single numeric column.
///
/// Mirrors the fields of a pandas-style `describe()`: count of non-null
/// values, mean, sample standard deviation, min, quartiles, max.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumericSummary {
    pub count: usize,
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub q25: f64,
    pub median: f64,
    pub q75: f64,
    pub max: f64,
}

/// Pearson correlation matrix over the numeric columns.
///
/// `values[i][j]` is the correlation between `columns[i]` and
/// `columns[j]`; the diagonal is 1.0 (or NaN for constant columns).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationMatrix {
    pub columns: Vec<String>,
    pub values: Vec<Vec<f64>>,
}

/// A single histogram bin: `[start, end)` and the number of values inside.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistogramBin {
    pub start: f64,
    pub end: f64,
    pub count: usize,
}

/// Binned distribution of one numeric column, ready for chart glue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnHistogram {
    pub column: String,
    pub bins: Vec<HistogramBin>,
}

/// Full descriptive analysis of the active dataset.
///
/// This is the payload behind the original tool's "analyze" and
/// "visualize" views: column classification, missing values, summary
/// statistics, correlations, cardinality and histogram data. No chart is
/// rendered here; the host is expected to feed `histograms` and
/// `correlation_matrix` to its plotting layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetAnalysis {
    pub numeric_columns: Vec<String>,
    pub categorical_columns: Vec<String>,
    pub null_counts: BTreeMap<String, usize>,
    pub summary_stats: BTreeMap<String, NumericSummary>,
    pub correlation_matrix: CorrelationMatrix,
    pub cardinality: BTreeMap<String, usize>,
    pub histograms: Vec<ColumnHistogram>,
}
