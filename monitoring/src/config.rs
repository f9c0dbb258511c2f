//! Configuration for the monitoring core
//!
//! Loads from a YAML file or falls back to defaults matching the standard
//! deployment layout (model artifacts under `model/`, data under `data/`).

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::drift::DriftThresholds;
use crate::error::{MonitoringError, Result};

/// Monitoring configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MonitoringConfig {
    /// Reference dataset CSV, frozen at training time
    pub reference_path: PathBuf,

    /// Live record store CSV
    pub live_path: PathBuf,

    /// Persisted feature schema JSON
    pub schema_path: PathBuf,

    /// Directory receiving drift report artifacts
    pub report_dir: PathBuf,

    /// Drift detection thresholds
    pub thresholds: DriftThresholds,

    /// Metrics exporter settings
    pub exporter: ExporterConfig,
}

/// Metrics exporter settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ExporterConfig {
    /// Seconds between drift recomputation cycles
    pub interval_secs: u64,

    /// Address for the Prometheus scrape endpoint
    pub listen_addr: String,
}

impl Default for MonitoringConfig {
    fn default() -> Self {
        Self {
            reference_path: PathBuf::from("data/reference/reference_data.csv"),
            live_path: PathBuf::from("data/live/live_predictions.csv"),
            schema_path: PathBuf::from("model/feature_schema.json"),
            report_dir: PathBuf::from("data/drift_reports"),
            thresholds: DriftThresholds::default(),
            exporter: ExporterConfig {
                interval_secs: 30,
                listen_addr: "0.0.0.0:9100".to_string(),
            },
        }
    }
}

impl MonitoringConfig {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| MonitoringError::Config(config::ConfigError::Foreign(Box::new(e))))?;

        let config: Self = serde_yaml::from_str(&content)
            .map_err(|e| MonitoringError::Config(config::ConfigError::Foreign(Box::new(e))))?;

        Ok(config)
    }

    /// Load from `SENTINEL_CONFIG_PATH` if set, otherwise defaults
    pub fn from_env_and_file() -> Result<Self> {
        if let Ok(config_path) = std::env::var("SENTINEL_CONFIG_PATH") {
            tracing::info!("Loading monitoring config from: {}", config_path);
            return Self::from_file(config_path);
        }

        tracing::info!("Using default monitoring configuration");
        Ok(Self::default())
    }

    /// Save configuration to a YAML file (for generating examples)
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let yaml = serde_yaml::to_string(self)
            .map_err(|e| MonitoringError::internal(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, yaml)?;

        Ok(())
    }
}
