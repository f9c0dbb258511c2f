//! In-memory tabular dataset
//!
//! Both the frozen reference data and the live prediction log are loaded
//! into this row-major table before drift detection. Cells are kept as raw
//! strings; numeric parsing happens at the point of use so a malformed cell
//! can name the offending feature.

use std::path::Path;

use crate::error::{MonitoringError, Result};

/// A table of rows conforming to a feature schema
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Dataset {
    /// Create an empty dataset with the given column layout
    pub fn empty(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Build a dataset from named columns (mainly for tests and fixtures).
    /// All columns must have the same length.
    pub fn from_columns(columns: Vec<(&str, Vec<String>)>) -> Result<Self> {
        let n_rows = columns.first().map(|(_, v)| v.len()).unwrap_or(0);
        if columns.iter().any(|(_, v)| v.len() != n_rows) {
            return Err(MonitoringError::internal(
                "column length mismatch while building dataset",
            ));
        }

        let names: Vec<String> = columns.iter().map(|(n, _)| n.to_string()).collect();
        let mut rows = vec![Vec::with_capacity(names.len()); n_rows];
        for (_, values) in columns {
            for (row, value) in rows.iter_mut().zip(values) {
                row.push(value);
            }
        }

        Ok(Self {
            columns: names,
            rows,
        })
    }

    /// Load a dataset from a CSV file with a header row.
    ///
    /// Rows whose field count does not match the header are skipped: the
    /// only way such a row appears in an append-only log is a writer caught
    /// mid-append, and a consistent prefix is an acceptable snapshot.
    pub fn from_csv_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_path(path.as_ref())?;

        let columns: Vec<String> = reader
            .headers()?
            .iter()
            .map(|h| h.to_string())
            .collect();

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            if record.len() != columns.len() {
                tracing::warn!(
                    path = %path.as_ref().display(),
                    expected = columns.len(),
                    got = record.len(),
                    "Skipping partial CSV row"
                );
                continue;
            }
            rows.push(record.iter().map(|f| f.to_string()).collect());
        }

        Ok(Self { columns, rows })
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// True if the dataset has no rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Column names in table order
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// True if the dataset has a column with this name
    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }

    /// All values of one column in row order, or `None` if the column
    /// does not exist
    pub fn column(&self, name: &str) -> Option<Vec<&str>> {
        let idx = self.columns.iter().position(|c| c == name)?;
        Some(self.rows.iter().map(|row| row[idx].as_str()).collect())
    }

    /// One row as (column, value) pairs
    pub fn row(&self, idx: usize) -> Option<Vec<(&str, &str)>> {
        self.rows.get(idx).map(|row| {
            self.columns
                .iter()
                .map(|c| c.as_str())
                .zip(row.iter().map(|v| v.as_str()))
                .collect()
        })
    }
}

/// Parse one column's raw values as f64, failing on the first cell that
/// does not parse
pub fn parse_numeric(feature: &str, values: &[&str]) -> Result<Vec<f64>> {
    values
        .iter()
        .map(|v| {
            v.trim()
                .parse::<f64>()
                .map_err(|_| MonitoringError::malformed_value(feature, *v))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_columns() {
        let ds = Dataset::from_columns(vec![
            ("age", vec!["30".to_string(), "40".to_string()]),
            ("workclass", vec!["Private".to_string(), "State-gov".to_string()]),
        ])
        .unwrap();

        assert_eq!(ds.len(), 2);
        assert_eq!(ds.column("age").unwrap(), vec!["30", "40"]);
        assert_eq!(ds.column("missing"), None);
    }

    #[test]
    fn test_from_columns_length_mismatch() {
        let result = Dataset::from_columns(vec![
            ("a", vec!["1".to_string()]),
            ("b", vec!["1".to_string(), "2".to_string()]),
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_numeric() {
        let values = vec!["1.5", " 2", "3.0"];
        let parsed = parse_numeric("age", &values).unwrap();
        assert_eq!(parsed, vec![1.5, 2.0, 3.0]);

        let bad = vec!["1.5", "abc"];
        let err = parse_numeric("age", &bad).unwrap_err();
        assert!(matches!(err, MonitoringError::MalformedValue { .. }));
    }

    #[test]
    fn test_csv_round_trip_skips_partial_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.csv");
        std::fs::write(&path, "age,workclass\n30,Private\n40,State-gov\n50\n").unwrap();

        let ds = Dataset::from_csv_path(&path).unwrap();
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.columns(), &["age".to_string(), "workclass".to_string()]);
    }
}
