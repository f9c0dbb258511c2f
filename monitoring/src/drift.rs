//! Drift detector - per-feature distribution drift and aggregate verdict
//!
//! Compares a frozen reference dataset against the accumulating live
//! dataset, feature by feature:
//!
//! - **Categorical** features use the Population Stability Index over the
//!   union of both category sets, with epsilon smoothing so a category seen
//!   only on one side contributes finite mass instead of a division by zero.
//! - **Numeric** features use the two-sample Kolmogorov-Smirnov statistic
//!   (maximum gap between the empirical CDFs).
//!
//! Detection is a pure function of its inputs: identical datasets and
//! thresholds always produce identical results.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::dataset::{parse_numeric, Dataset};
use crate::error::{MonitoringError, Result};
use crate::schema::{FeatureKind, FeatureSchema};

/// Statistical test applied to a feature
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatTest {
    CategoricalPsi,
    NumericKs,
}

/// Detection thresholds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriftThresholds {
    /// Fraction of drifted features above which the whole dataset is
    /// declared drifted; must be in (0, 1]
    pub drift_share_threshold: f64,

    /// PSI above which a categorical feature is drifted
    pub categorical_psi_threshold: f64,

    /// KS statistic above which a numeric feature is drifted
    pub numeric_ks_threshold: f64,

    /// Smoothing floor for category probabilities in the PSI
    pub psi_epsilon: f64,
}

impl Default for DriftThresholds {
    fn default() -> Self {
        Self {
            drift_share_threshold: 0.5,
            categorical_psi_threshold: 0.25,
            numeric_ks_threshold: 0.1,
            psi_epsilon: 1e-4,
        }
    }
}

/// Drift verdict for a single feature
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureDrift {
    pub feature: String,
    pub score: f64,
    pub is_drifted: bool,
    pub test: StatTest,
}

/// Aggregate drift verdict over all schema features
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriftResult {
    pub features: Vec<FeatureDrift>,
    pub count_drifted_features: usize,
    pub share_drifted: f64,
    pub dataset_drift: bool,
    pub n_reference: usize,
    pub n_current: usize,
}

impl DriftResult {
    /// Drift verdict for one feature by name
    pub fn feature(&self, name: &str) -> Option<&FeatureDrift> {
        self.features.iter().find(|f| f.feature == name)
    }
}

/// Stateless drift detector bound to a feature schema and thresholds
#[derive(Debug, Clone)]
pub struct DriftDetector {
    schema: FeatureSchema,
    thresholds: DriftThresholds,
}

impl DriftDetector {
    /// Create a detector, validating the thresholds and schema
    pub fn new(schema: FeatureSchema, thresholds: DriftThresholds) -> Result<Self> {
        if !(thresholds.drift_share_threshold > 0.0 && thresholds.drift_share_threshold <= 1.0) {
            return Err(MonitoringError::internal(format!(
                "drift_share_threshold must be in (0, 1], got {}",
                thresholds.drift_share_threshold
            )));
        }
        if schema.is_empty() {
            return Err(MonitoringError::invalid_schema(
                "schema has no features to monitor",
            ));
        }
        Ok(Self { schema, thresholds })
    }

    /// Compare reference and current datasets.
    ///
    /// Fails with `InsufficientData` when either side has no rows and with
    /// `MissingFeature` when a schema column is absent from either dataset -
    /// a silent skip would hide an ingestion bug as "no drift".
    pub fn detect(&self, reference: &Dataset, current: &Dataset) -> Result<DriftResult> {
        if current.is_empty() {
            return Err(MonitoringError::insufficient_data(
                "current dataset has no rows; a drift verdict on an empty sample is meaningless",
            ));
        }
        if reference.is_empty() {
            return Err(MonitoringError::insufficient_data(
                "reference dataset has no rows",
            ));
        }

        let mut features = Vec::with_capacity(self.schema.len());
        for column in self.schema.columns() {
            let name = column.name.as_str();
            let ref_values = reference
                .column(name)
                .ok_or_else(|| MonitoringError::missing_feature(name, "reference"))?;
            let cur_values = current
                .column(name)
                .ok_or_else(|| MonitoringError::missing_feature(name, "current"))?;

            let (score, test, threshold) = match column.kind {
                FeatureKind::Categorical => (
                    psi(&ref_values, &cur_values, self.thresholds.psi_epsilon),
                    StatTest::CategoricalPsi,
                    self.thresholds.categorical_psi_threshold,
                ),
                FeatureKind::Numeric => {
                    let ref_sample = parse_numeric(name, &ref_values)?;
                    let cur_sample = parse_numeric(name, &cur_values)?;
                    (
                        ks_statistic(&ref_sample, &cur_sample),
                        StatTest::NumericKs,
                        self.thresholds.numeric_ks_threshold,
                    )
                }
            };

            features.push(FeatureDrift {
                feature: name.to_string(),
                score,
                is_drifted: score > threshold,
                test,
            });
        }

        let count_drifted_features = features.iter().filter(|f| f.is_drifted).count();
        let share_drifted = count_drifted_features as f64 / features.len() as f64;

        Ok(DriftResult {
            count_drifted_features,
            share_drifted,
            dataset_drift: share_drifted > self.thresholds.drift_share_threshold,
            n_reference: reference.len(),
            n_current: current.len(),
            features,
        })
    }
}

/// Population Stability Index between two empirical category distributions.
///
/// Iterates the union of categories in sorted order; probabilities are
/// floored at `epsilon`, which keeps categories unseen on one side (zero
/// mass) from producing an infinite log-ratio. Every term of the sum is
/// nonnegative, so the score is too.
fn psi(reference: &[&str], current: &[&str], epsilon: f64) -> f64 {
    let mut ref_counts: BTreeMap<&str, usize> = BTreeMap::new();
    let mut cur_counts: BTreeMap<&str, usize> = BTreeMap::new();
    for value in reference {
        *ref_counts.entry(value).or_insert(0) += 1;
    }
    for value in current {
        *cur_counts.entry(value).or_insert(0) += 1;
    }

    let categories: std::collections::BTreeSet<&str> = ref_counts
        .keys()
        .chain(cur_counts.keys())
        .copied()
        .collect();

    let n_ref = reference.len() as f64;
    let n_cur = current.len() as f64;

    let mut score = 0.0;
    for category in categories {
        let ref_p = (ref_counts.get(category).copied().unwrap_or(0) as f64 / n_ref).max(epsilon);
        let cur_p = (cur_counts.get(category).copied().unwrap_or(0) as f64 / n_cur).max(epsilon);
        score += (cur_p - ref_p) * (cur_p / ref_p).ln();
    }
    score
}

/// Two-sample Kolmogorov-Smirnov statistic: the maximum absolute gap
/// between the two empirical CDFs
fn ks_statistic(reference: &[f64], current: &[f64]) -> f64 {
    let mut a = reference.to_vec();
    let mut b = current.to_vec();
    a.sort_by(f64::total_cmp);
    b.sort_by(f64::total_cmp);

    let n = a.len() as f64;
    let m = b.len() as f64;
    let (mut i, mut j) = (0usize, 0usize);
    let mut d: f64 = 0.0;

    while i < a.len() && j < b.len() {
        let x = a[i].min(b[j]);
        while i < a.len() && a[i] <= x {
            i += 1;
        }
        while j < b.len() && b[j] <= x {
            j += 1;
        }
        d = d.max((i as f64 / n - j as f64 / m).abs());
    }
    d
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::FeatureColumn;

    fn numeric_schema(name: &str) -> FeatureSchema {
        FeatureSchema::new(vec![FeatureColumn {
            name: name.to_string(),
            kind: FeatureKind::Numeric,
        }])
        .unwrap()
    }

    fn categorical_schema(name: &str) -> FeatureSchema {
        FeatureSchema::new(vec![FeatureColumn {
            name: name.to_string(),
            kind: FeatureKind::Categorical,
        }])
        .unwrap()
    }

    fn numeric_dataset(name: &str, values: &[f64]) -> Dataset {
        Dataset::from_columns(vec![(name, values.iter().map(|v| v.to_string()).collect())])
            .unwrap()
    }

    #[test]
    fn test_ks_statistic_bounds() {
        // Identical samples: zero gap
        let sample: Vec<f64> = (0..100).map(|i| i as f64).collect();
        assert_eq!(ks_statistic(&sample, &sample), 0.0);

        // Disjoint supports: maximal gap
        let low: Vec<f64> = (0..100).map(|i| i as f64).collect();
        let high: Vec<f64> = (200..300).map(|i| i as f64).collect();
        assert!((ks_statistic(&low, &high) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_psi_identical_distributions() {
        let values: Vec<&str> = ["A", "B", "C"].iter().cycle().take(300).copied().collect();
        let score = psi(&values, &values, 1e-4);
        assert!(score.abs() < 1e-12);
    }

    #[test]
    fn test_psi_unseen_category_is_finite_and_nonzero() {
        let reference = vec!["A"; 100];
        let mut current = vec!["A"; 50];
        current.extend(vec!["B"; 50]);

        let score = psi(&reference, &current, 1e-4);
        assert!(score.is_finite());
        assert!(score > 0.0);
    }

    #[test]
    fn test_detect_is_deterministic() {
        let detector =
            DriftDetector::new(categorical_schema("workclass"), DriftThresholds::default())
                .unwrap();
        let reference = Dataset::from_columns(vec![(
            "workclass",
            vec!["Private".to_string(), "State-gov".to_string(), "Private".to_string()],
        )])
        .unwrap();
        let current = Dataset::from_columns(vec![(
            "workclass",
            vec!["Self-emp".to_string(), "Private".to_string()],
        )])
        .unwrap();

        let first = detector.detect(&reference, &current).unwrap();
        let second = detector.detect(&reference, &current).unwrap();
        assert_eq!(first.features[0].score, second.features[0].score);
        assert_eq!(first.dataset_drift, second.dataset_drift);
    }

    #[test]
    fn test_empty_current_fails() {
        let detector =
            DriftDetector::new(numeric_schema("age"), DriftThresholds::default()).unwrap();
        let reference = numeric_dataset("age", &[30.0, 40.0]);
        let current = Dataset::empty(vec!["age".to_string()]);

        let err = detector.detect(&reference, &current).unwrap_err();
        assert!(matches!(err, MonitoringError::InsufficientData { .. }));
    }

    #[test]
    fn test_missing_feature_fails_instead_of_skipping() {
        let detector =
            DriftDetector::new(numeric_schema("age"), DriftThresholds::default()).unwrap();
        let reference = numeric_dataset("age", &[30.0, 40.0]);
        let current = Dataset::from_columns(vec![(
            "other",
            vec!["1".to_string(), "2".to_string()],
        )])
        .unwrap();

        let err = detector.detect(&reference, &current).unwrap_err();
        match err {
            MonitoringError::MissingFeature { feature, dataset } => {
                assert_eq!(feature, "age");
                assert_eq!(dataset, "current");
            }
            other => panic!("expected MissingFeature, got {other}"),
        }
    }

    #[test]
    fn test_shifted_numeric_feature_drifts() {
        let detector =
            DriftDetector::new(numeric_schema("age"), DriftThresholds::default()).unwrap();
        let reference: Vec<f64> = (0..100).map(|i| 20.0 + (i % 20) as f64).collect();
        let current: Vec<f64> = (0..100).map(|i| 60.0 + (i % 20) as f64).collect();

        let result = detector
            .detect(
                &numeric_dataset("age", &reference),
                &numeric_dataset("age", &current),
            )
            .unwrap();

        let age = result.feature("age").unwrap();
        assert!(age.is_drifted);
        assert_eq!(age.test, StatTest::NumericKs);
        // Single feature drifted: share 1.0 > default 0.5
        assert!(result.dataset_drift);
        assert_eq!(result.count_drifted_features, 1);
    }

    #[test]
    fn test_malformed_numeric_cell_fails() {
        let detector =
            DriftDetector::new(numeric_schema("age"), DriftThresholds::default()).unwrap();
        let reference = numeric_dataset("age", &[30.0, 40.0]);
        let current = Dataset::from_columns(vec![(
            "age",
            vec!["35".to_string(), "forty".to_string()],
        )])
        .unwrap();

        let err = detector.detect(&reference, &current).unwrap_err();
        assert!(matches!(err, MonitoringError::MalformedValue { .. }));
    }

    #[test]
    fn test_invalid_share_threshold_rejected() {
        let thresholds = DriftThresholds {
            drift_share_threshold: 0.0,
            ..Default::default()
        };
        assert!(DriftDetector::new(numeric_schema("age"), thresholds).is_err());
    }
}
