//! The active dataset: a polars DataFrame bundled with cached metadata.
//!
//! A [`Dataset`] is created when the upload glue hands over raw CSV bytes
//! (or an already-parsed DataFrame) and is replaced wholesale by the next
//! upload. All descriptive queries are read-only; nothing here mutates
//! the underlying table.

use std::io::Cursor;

use polars::prelude::*;
use serde_json::{Map, Value};
use tracing::info;

use crate::column::{column_kind, ColumnKind};
use crate::error::{DataError, Result};
use crate::types::DatasetSummary;

/// Default number of rows returned by [`Dataset::preview`].
pub const DEFAULT_PREVIEW_ROWS: usize = 5;

/// How many rows the CSV reader inspects when inferring column types.
const CSV_SCHEMA_INFERENCE_ROWS: usize = 1000;

/// Container for the currently active table and its cached summary.
///
/// The summary is computed once at load time so repeated `describe()`
/// calls never re-scan the frame.
#[derive(Debug, Clone)]
pub struct Dataset {
    df: DataFrame,
    summary: DatasetSummary,
}

impl Dataset {
    /// Wrap an already-parsed DataFrame.
    ///
    /// # Errors
    ///
    /// Returns [`DataError::EmptyDataset`] if the frame has no columns.
    pub fn new(df: DataFrame) -> Result<Self> {
        if df.width() == 0 {
            return Err(DataError::EmptyDataset(
                "the table has no columns".to_string(),
            ));
        }

        let summary = summarize(&df);
        info!(
            rows = summary.row_count,
            columns = summary.column_count,
            "dataset loaded"
        );
        Ok(Self { df, summary })
    }

    /// Parse raw CSV bytes (header row expected, types inferred) into a
    /// dataset. This is the entry point for upload glue.
    ///
    /// # Errors
    ///
    /// Returns [`DataError::Polars`] if the bytes are not valid CSV, or
    /// [`DataError::EmptyDataset`] if parsing yields no columns.
    pub fn from_csv_bytes(bytes: &[u8]) -> Result<Self> {
        let df = CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(Some(CSV_SCHEMA_INFERENCE_ROWS))
            .into_reader_with_file_handle(Cursor::new(bytes))
            .finish()?;
        Self::new(df)
    }

    /// The underlying DataFrame.
    #[must_use]
    pub fn df(&self) -> &DataFrame {
        &self.df
    }

    /// Cached shape, dtype and null-count summary (the "upload response").
    #[must_use]
    pub fn describe(&self) -> &DatasetSummary {
        &self.summary
    }

    /// First `n` rows as JSON records (column name → value).
    ///
    /// Rows are returned in table order; `n` larger than the row count
    /// returns every row.
    #[must_use]
    pub fn preview(&self, n: usize) -> Vec<Map<String, Value>> {
        let rows = n.min(self.df.height());
        let mut records = Vec::with_capacity(rows);
        for idx in 0..rows {
            let mut record = Map::new();
            for column in self.df.get_columns() {
                let value = column
                    .get(idx)
                    .map(any_value_to_json)
                    .unwrap_or(Value::Null);
                record.insert(column.name().to_string(), value);
            }
            records.push(record);
        }
        records
    }
}

/// Compute the cached summary for a freshly loaded frame.
fn summarize(df: &DataFrame) -> DatasetSummary {
    let mut column_names = Vec::with_capacity(df.width());
    let mut dtypes = std::collections::BTreeMap::new();
    let mut null_counts = std::collections::BTreeMap::new();
    let mut numeric_columns = Vec::new();

    for column in df.get_columns() {
        let name = column.name().to_string();
        dtypes.insert(name.clone(), column.dtype().to_string());
        null_counts.insert(name.clone(), column.null_count());
        if matches!(
            column_kind(column.dtype()),
            ColumnKind::Numeric | ColumnKind::Boolean
        ) {
            numeric_columns.push(name.clone());
        }
        column_names.push(name);
    }

    DatasetSummary {
        row_count: df.height(),
        column_count: df.width(),
        column_names,
        dtypes,
        null_counts,
        numeric_columns,
    }
}

/// Convert a polars cell into a JSON value for preview records.
pub fn any_value_to_json(value: AnyValue) -> Value {
    match value {
        AnyValue::Null => Value::Null,
        AnyValue::Boolean(b) => Value::Bool(b),
        AnyValue::Int8(i) => Value::Number(i.into()),
        AnyValue::Int16(i) => Value::Number(i.into()),
        AnyValue::Int32(i) => Value::Number(i.into()),
        AnyValue::Int64(i) => Value::Number(i.into()),
        AnyValue::UInt8(u) => Value::Number(u.into()),
        AnyValue::UInt16(u) => Value::Number(u.into()),
        AnyValue::UInt32(u) => Value::Number(u.into()),
        AnyValue::UInt64(u) => Value::Number(u.into()),
        AnyValue::Float32(f) => serde_json::Number::from_f64(f64::from(f))
            .map(Value::Number)
            .unwrap_or(Value::Null),
        AnyValue::Float64(f) => serde_json::Number::from_f64(f)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        AnyValue::String(s) => Value::String(s.to_string()),
        AnyValue::StringOwned(s) => Value::String(s.to_string()),
        other => Value::String(format!("{}", other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample_df() -> DataFrame {
        df! {
            "age" => &[22i64, 38, 26, 35],
            "city" => &["NY", "LA", "NY", "LA"],
            "income" => &[Some(40_000.0f64), Some(72_000.0), None, Some(61_500.0)],
        }
        .unwrap()
    }

    #[test]
    fn test_describe_counts_and_dtypes() {
        let dataset = Dataset::new(sample_df()).unwrap();
        let summary = dataset.describe();

        assert_eq!(summary.row_count, 4);
        assert_eq!(summary.column_count, 3);
        assert_eq!(summary.column_names, vec!["age", "city", "income"]);
        assert_eq!(summary.null_counts["income"], 1);
        assert_eq!(summary.null_counts["age"], 0);
        assert_eq!(summary.numeric_columns, vec!["age", "income"]);
    }

    #[test]
    fn test_preview_returns_records_in_order() {
        let dataset = Dataset::new(sample_df()).unwrap();
        let records = dataset.preview(2);

        assert_eq!(records.len(), 2);
        assert_eq!(records[0]["age"], serde_json::json!(22));
        assert_eq!(records[0]["city"], serde_json::json!("NY"));
        assert_eq!(records[1]["city"], serde_json::json!("LA"));
    }

    #[test]
    fn test_preview_null_becomes_json_null() {
        let dataset = Dataset::new(sample_df()).unwrap();
        let records = dataset.preview(4);
        assert_eq!(records[2]["income"], Value::Null);
    }

    #[test]
    fn test_preview_clamps_to_row_count() {
        let dataset = Dataset::new(sample_df()).unwrap();
        assert_eq!(dataset.preview(100).len(), 4);
    }

    #[test]
    fn test_empty_frame_rejected() {
        let err = Dataset::new(DataFrame::empty()).unwrap_err();
        assert_eq!(err.error_code(), "EMPTY_DATASET");
    }

    #[test]
    fn test_from_csv_bytes() {
        let csv = b"age,city\n22,NY\n38,LA\n";
        let dataset = Dataset::from_csv_bytes(csv).unwrap();
        assert_eq!(dataset.describe().row_count, 2);
        assert_eq!(dataset.describe().numeric_columns, vec!["age"]);
    }

    #[test]
    fn test_from_csv_bytes_invalid_input() {
        // A lone 0xFF byte is not valid UTF-8 CSV.
        let result = Dataset::from_csv_bytes(&[0xFF, 0xFE, 0x00]);
        assert!(result.is_err());
    }
}
