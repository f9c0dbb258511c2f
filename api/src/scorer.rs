//! Scorer - the trained classifier behind the prediction endpoint
//!
//! The monitoring core treats the model as an opaque, deterministic
//! capability; this module is the serving side of that boundary. The
//! concrete implementation is a logistic model over one-hot encoded
//! categorical features and passthrough numeric features, loaded from a
//! JSON artifact produced at training time.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use sentinel_monitoring::{MonitoringError, Result};

/// Opaque scoring capability: encode a raw input, then predict
pub trait Scorer: Send + Sync {
    /// Encode a raw input row into the model's feature contributions
    fn transform(&self, input: &BTreeMap<String, String>) -> Result<Vec<f64>>;

    /// Predict (class label, positive-class probability) from an encoding
    fn predict(&self, encoded: &[f64]) -> (i64, f64);
}

fn default_decision_threshold() -> f64 {
    0.5
}

/// Logistic model artifact.
///
/// `numeric` maps a feature to its weight; `categorical` maps a feature to
/// per-category weights. Categories absent from the artifact contribute
/// zero weight, mirroring a one-hot encoder that ignores unknowns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinearScorer {
    bias: f64,

    #[serde(default)]
    numeric: BTreeMap<String, f64>,

    #[serde(default)]
    categorical: BTreeMap<String, BTreeMap<String, f64>>,

    #[serde(default = "default_decision_threshold")]
    decision_threshold: f64,
}

impl LinearScorer {
    /// Load the artifact from JSON
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let scorer: Self = serde_json::from_str(&content)?;
        Ok(scorer)
    }
}

impl Scorer for LinearScorer {
    fn transform(&self, input: &BTreeMap<String, String>) -> Result<Vec<f64>> {
        let mut encoded = Vec::with_capacity(self.numeric.len() + self.categorical.len());

        // BTreeMap iteration keeps the encoding order stable across calls
        for (feature, weight) in &self.numeric {
            let raw = input
                .get(feature)
                .ok_or_else(|| MonitoringError::missing_feature(feature.as_str(), "input"))?;
            let value: f64 = raw
                .trim()
                .parse()
                .map_err(|_| MonitoringError::malformed_value(feature.as_str(), raw.as_str()))?;
            encoded.push(value * weight);
        }

        for (feature, weights) in &self.categorical {
            let raw = input
                .get(feature)
                .ok_or_else(|| MonitoringError::missing_feature(feature.as_str(), "input"))?;
            encoded.push(weights.get(raw.trim()).copied().unwrap_or(0.0));
        }

        Ok(encoded)
    }

    fn predict(&self, encoded: &[f64]) -> (i64, f64) {
        let logit: f64 = self.bias + encoded.iter().sum::<f64>();
        let probability = 1.0 / (1.0 + (-logit).exp());
        let label = (probability >= self.decision_threshold) as i64;
        (label, probability)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_scorer() -> LinearScorer {
        let artifact = serde_json::json!({
            "bias": -4.0,
            "numeric": { "age": 0.1 },
            "categorical": {
                "workclass": { "Private": 0.5, "Self-emp": 1.5 }
            }
        });
        serde_json::from_value(artifact).unwrap()
    }

    fn input(age: &str, workclass: &str) -> BTreeMap<String, String> {
        let mut map = BTreeMap::new();
        map.insert("age".to_string(), age.to_string());
        map.insert("workclass".to_string(), workclass.to_string());
        map
    }

    #[test]
    fn test_predict_is_deterministic_and_bounded() {
        let scorer = sample_scorer();
        let encoded = scorer.transform(&input("45", "Private")).unwrap();

        let (label_a, prob_a) = scorer.predict(&encoded);
        let (label_b, prob_b) = scorer.predict(&encoded);
        assert_eq!(label_a, label_b);
        assert_eq!(prob_a, prob_b);
        assert!((0.0..=1.0).contains(&prob_a));
    }

    #[test]
    fn test_higher_logit_flips_label() {
        let scorer = sample_scorer();

        let low = scorer.transform(&input("10", "Private")).unwrap();
        let (label_low, prob_low) = scorer.predict(&low);
        assert_eq!(label_low, 0);

        let high = scorer.transform(&input("80", "Self-emp")).unwrap();
        let (label_high, prob_high) = scorer.predict(&high);
        assert_eq!(label_high, 1);
        assert!(prob_high > prob_low);
    }

    #[test]
    fn test_unknown_category_contributes_zero() {
        let scorer = sample_scorer();
        let known = scorer.transform(&input("45", "Private")).unwrap();
        let unknown = scorer.transform(&input("45", "Never-seen")).unwrap();

        assert_eq!(known[0], unknown[0]);
        assert_eq!(unknown[1], 0.0);
    }

    #[test]
    fn test_missing_and_malformed_inputs_fail() {
        let scorer = sample_scorer();

        let mut missing = BTreeMap::new();
        missing.insert("age".to_string(), "45".to_string());
        assert!(matches!(
            scorer.transform(&missing),
            Err(MonitoringError::MissingFeature { .. })
        ));

        assert!(matches!(
            scorer.transform(&input("forty", "Private")),
            Err(MonitoringError::MalformedValue { .. })
        ));
    }

    #[test]
    fn test_artifact_round_trip() {
        let scorer = sample_scorer();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scorer.json");
        std::fs::write(&path, serde_json::to_string(&scorer).unwrap()).unwrap();

        let loaded = LinearScorer::from_file(&path).unwrap();
        let encoded = loaded.transform(&input("45", "Private")).unwrap();
        assert_eq!(encoded, scorer.transform(&input("45", "Private")).unwrap());
    }
}
