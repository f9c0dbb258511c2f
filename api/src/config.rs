//! Configuration for the prediction API

use std::env;
use std::path::PathBuf;

/// API configuration, loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// Server port
    pub port: u16,

    /// Persisted feature schema JSON
    pub schema_path: PathBuf,

    /// Scorer artifact JSON
    pub scorer_path: PathBuf,

    /// Live record store CSV
    pub live_path: PathBuf,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self {
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(5000),

            schema_path: env::var("SENTINEL_SCHEMA_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("model/feature_schema.json")),

            scorer_path: env::var("SENTINEL_SCORER_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("model/scorer.json")),

            live_path: env::var("SENTINEL_LIVE_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("data/live/live_predictions.csv")),
        }
    }
}
