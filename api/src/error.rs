//! Error handling for the prediction API

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use sentinel_monitoring::MonitoringError;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<MonitoringError> for ApiError {
    fn from(err: MonitoringError) -> Self {
        match err {
            // A prediction we cannot log is a prediction we refuse to serve:
            // silently dropping records corrupts the drift signal
            MonitoringError::StoreUnavailable { .. } => ApiError::StoreUnavailable(err.to_string()),
            MonitoringError::UnknownFeature(_)
            | MonitoringError::MissingFeature { .. }
            | MonitoringError::MalformedValue { .. } => ApiError::Validation(err.to_string()),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::Validation(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg.clone()),
            ApiError::StoreUnavailable(msg) => {
                tracing::error!("Live record store unavailable: {}", msg);
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "prediction log unavailable".to_string(),
                )
            }
            ApiError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": message,
            "status": status.as_u16()
        }));

        (status, body).into_response()
    }
}
