//! Feature schema - expected input columns and their kinds
//!
//! The schema is built once at training time from the reference dataset and
//! persisted next to the model artifacts. It is never re-derived at drift
//! check time, so a change in the serving payload shows up as a loud
//! schema error instead of masquerading as statistical drift.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::dataset::Dataset;
use crate::error::{MonitoringError, Result};

/// Statistical kind of a feature column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureKind {
    Categorical,
    Numeric,
}

/// One expected column
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureColumn {
    pub name: String,
    pub kind: FeatureKind,
}

/// Ordered set of expected feature columns with unique names
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureSchema {
    columns: Vec<FeatureColumn>,
}

impl FeatureSchema {
    /// Create a schema, rejecting duplicate column names
    pub fn new(columns: Vec<FeatureColumn>) -> Result<Self> {
        for (i, column) in columns.iter().enumerate() {
            if columns[..i].iter().any(|c| c.name == column.name) {
                return Err(MonitoringError::invalid_schema(format!(
                    "duplicate feature name '{}'",
                    column.name
                )));
            }
        }
        Ok(Self { columns })
    }

    /// Look up the kind of a feature by name
    pub fn kind_of(&self, name: &str) -> Result<FeatureKind> {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.kind)
            .ok_or_else(|| MonitoringError::unknown_feature(name))
    }

    /// True if the schema contains this feature
    pub fn contains(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c.name == name)
    }

    /// Columns in schema order
    pub fn columns(&self) -> &[FeatureColumn] {
        &self.columns
    }

    /// Feature names in schema order
    pub fn feature_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    /// Number of features
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// True if the schema has no columns
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Infer a schema from a reference dataset: a column is numeric when
    /// every non-empty cell parses as f64, otherwise categorical.
    ///
    /// Training-time helper; the result is persisted and then treated as
    /// the fixed contract for the deployed model.
    pub fn infer_from_dataset(dataset: &Dataset) -> Result<Self> {
        let mut columns = Vec::with_capacity(dataset.columns().len());
        for name in dataset.columns() {
            let values = dataset
                .column(name)
                .ok_or_else(|| MonitoringError::missing_feature(name.as_str(), "reference"))?;

            let numeric = values
                .iter()
                .filter(|v| !v.trim().is_empty())
                .all(|v| v.trim().parse::<f64>().is_ok());

            columns.push(FeatureColumn {
                name: name.clone(),
                kind: if numeric {
                    FeatureKind::Numeric
                } else {
                    FeatureKind::Categorical
                },
            });
        }
        Self::new(columns)
    }

    /// Load a persisted schema from JSON
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let schema: Self = serde_json::from_str(&content)?;
        // Re-validate: the file may have been edited by hand
        Self::new(schema.columns)
    }

    /// Persist the schema as JSON next to the model artifacts
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_schema() -> FeatureSchema {
        FeatureSchema::new(vec![
            FeatureColumn {
                name: "age".to_string(),
                kind: FeatureKind::Numeric,
            },
            FeatureColumn {
                name: "workclass".to_string(),
                kind: FeatureKind::Categorical,
            },
        ])
        .unwrap()
    }

    #[test]
    fn test_kind_lookup() {
        let schema = sample_schema();
        assert_eq!(schema.kind_of("age").unwrap(), FeatureKind::Numeric);
        assert_eq!(schema.kind_of("workclass").unwrap(), FeatureKind::Categorical);

        let err = schema.kind_of("unknown").unwrap_err();
        assert!(matches!(err, MonitoringError::UnknownFeature(_)));
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let result = FeatureSchema::new(vec![
            FeatureColumn {
                name: "age".to_string(),
                kind: FeatureKind::Numeric,
            },
            FeatureColumn {
                name: "age".to_string(),
                kind: FeatureKind::Categorical,
            },
        ]);
        assert!(matches!(result, Err(MonitoringError::InvalidSchema { .. })));
    }

    #[test]
    fn test_infer_from_dataset() {
        let ds = Dataset::from_columns(vec![
            ("age", vec!["30".to_string(), "41.5".to_string()]),
            ("workclass", vec!["Private".to_string(), "42".to_string()]),
        ])
        .unwrap();

        let schema = FeatureSchema::infer_from_dataset(&ds).unwrap();
        assert_eq!(schema.kind_of("age").unwrap(), FeatureKind::Numeric);
        // One non-numeric cell makes the whole column categorical
        assert_eq!(schema.kind_of("workclass").unwrap(), FeatureKind::Categorical);
    }

    #[test]
    fn test_persistence_round_trip() {
        let schema = sample_schema();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model").join("feature_schema.json");

        schema.save_to_file(&path).unwrap();
        let loaded = FeatureSchema::from_file(&path).unwrap();
        assert_eq!(loaded, schema);
    }
}
