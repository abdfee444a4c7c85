//! # Insight Data
//!
//! Dataset ingestion and descriptive analysis for the insight prediction
//! core. This crate owns the tabular side of the system: parsing uploaded
//! CSV bytes into a polars DataFrame, summarizing its shape, previewing
//! rows as JSON records, and profiling it (summary statistics,
//! correlations, cardinality, histogram bins).
//!
//! The companion `insight-learning` crate consumes the [`Dataset`]
//! produced here for feature preparation and model training.
//!
//! ## Example
//!
//! ```no_run
//! use insight_data::{analyze, Dataset};
//!
//! # fn main() -> insight_data::Result<()> {
//! let bytes = std::fs::read("customers.csv")?;
//! let dataset = Dataset::from_csv_bytes(&bytes)?;
//!
//! println!("{} rows", dataset.describe().row_count);
//! let analysis = analyze(&dataset)?;
//! println!("numeric columns: {:?}", analysis.numeric_columns);
//! # Ok(())
//! # }
//! ```

pub mod column;
pub mod dataset;
pub mod error;
pub mod profile;
pub mod types;

pub use column::{column_kind, is_numeric_dtype, ColumnKind};
pub use dataset::{any_value_to_json, Dataset, DEFAULT_PREVIEW_ROWS};
pub use error::{DataError, Result};
pub use profile::analyze;
pub use types::{
    ColumnHistogram, CorrelationMatrix, DatasetAnalysis, DatasetSummary, HistogramBin,
    NumericSummary,
};
