//! Error types for the monitoring core

use thiserror::Error;

/// Result type alias for monitoring operations
pub type Result<T> = std::result::Result<T, MonitoringError>;

/// Error taxonomy for the drift monitoring core
#[derive(Error, Debug)]
pub enum MonitoringError {
    #[error("Unknown feature: '{0}' is not part of the feature schema")]
    UnknownFeature(String),

    #[error("Feature '{feature}' is missing from the {dataset} dataset")]
    MissingFeature { feature: String, dataset: String },

    #[error("Insufficient data: {message}")]
    InsufficientData { message: String },

    #[error("Malformed value '{value}' for numeric feature '{feature}'")]
    MalformedValue { feature: String, value: String },

    #[error("Live record store unavailable: {message}")]
    StoreUnavailable { message: String },

    #[error("Metrics publish failure: {message}")]
    PublishFailure { message: String },

    #[error("Invalid schema: {message}")]
    InvalidSchema { message: String },

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl MonitoringError {
    /// Create an unknown-feature error
    pub fn unknown_feature<S: Into<String>>(feature: S) -> Self {
        Self::UnknownFeature(feature.into())
    }

    /// Create a missing-feature error
    pub fn missing_feature<S: Into<String>>(feature: S, dataset: S) -> Self {
        Self::MissingFeature {
            feature: feature.into(),
            dataset: dataset.into(),
        }
    }

    /// Create an insufficient-data error
    pub fn insufficient_data<S: Into<String>>(message: S) -> Self {
        Self::InsufficientData {
            message: message.into(),
        }
    }

    /// Create a malformed-value error
    pub fn malformed_value<S: Into<String>>(feature: S, value: S) -> Self {
        Self::MalformedValue {
            feature: feature.into(),
            value: value.into(),
        }
    }

    /// Create a store-unavailable error
    pub fn store_unavailable<S: Into<String>>(message: S) -> Self {
        Self::StoreUnavailable {
            message: message.into(),
        }
    }

    /// Create a publish-failure error
    pub fn publish_failure<S: Into<String>>(message: S) -> Self {
        Self::PublishFailure {
            message: message.into(),
        }
    }

    /// Create an invalid-schema error
    pub fn invalid_schema<S: Into<String>>(message: S) -> Self {
        Self::InvalidSchema {
            message: message.into(),
        }
    }

    /// Create an internal error
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal(message.into())
    }

    /// Check if this error indicates a data or schema problem that the
    /// operator must fix (as opposed to a transient infrastructure failure)
    pub fn is_data_problem(&self) -> bool {
        matches!(
            self,
            MonitoringError::UnknownFeature(_)
                | MonitoringError::MissingFeature { .. }
                | MonitoringError::InsufficientData { .. }
                | MonitoringError::MalformedValue { .. }
                | MonitoringError::InvalidSchema { .. }
        )
    }
}
