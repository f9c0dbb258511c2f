//! HTTP handlers for the prediction endpoint

use std::collections::BTreeMap;

use axum::{extract::State, Json};
use serde::Serialize;
use serde_json::{json, Value};

use sentinel_monitoring::{FeatureSchema, LiveRecord};

use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// Response shape for `POST /predict`
#[derive(Debug, Serialize)]
pub struct PredictResponse {
    pub prediction: i64,
    pub probability: f64,
}

/// `GET /` - liveness status
pub async fn status() -> Json<Value> {
    Json(json!({
        "status": "sentinel api running",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// `POST /predict` - score one input and log the served prediction.
///
/// The payload is validated against the feature schema before it gets
/// anywhere near the scorer; the record append happens before the response
/// so a prediction that cannot be logged is never silently served.
pub async fn predict(
    State(state): State<AppState>,
    Json(payload): Json<BTreeMap<String, Value>>,
) -> ApiResult<Json<PredictResponse>> {
    let features = validate_payload(&state.schema, payload)?;

    let encoded = state.scorer.transform(&features)?;
    let (prediction, probability) = state.scorer.predict(&encoded);

    let record = LiveRecord::new(features, prediction, probability);
    state.store.append(&record)?;

    tracing::debug!(
        id = %record.id,
        prediction,
        probability,
        "Prediction served and logged"
    );

    Ok(Json(PredictResponse {
        prediction,
        probability,
    }))
}

/// The schema validation boundary: the payload must carry exactly the
/// schema's features, each with a scalar value. Missing and unexpected
/// fields are rejected instead of being passed opaquely to the encoder.
fn validate_payload(
    schema: &FeatureSchema,
    payload: BTreeMap<String, Value>,
) -> Result<BTreeMap<String, String>, ApiError> {
    for name in payload.keys() {
        if !schema.contains(name) {
            return Err(ApiError::Validation(format!("unexpected field '{name}'")));
        }
    }

    let mut features = BTreeMap::new();
    for name in schema.feature_names() {
        let value = payload
            .get(name)
            .ok_or_else(|| ApiError::Validation(format!("missing field '{name}'")))?;

        let cell = match value {
            Value::String(s) => s.clone(),
            Value::Number(n) => n.to_string(),
            Value::Bool(b) => b.to_string(),
            _ => {
                return Err(ApiError::Validation(format!(
                    "field '{name}' must be a scalar value"
                )))
            }
        };
        features.insert(name.to_string(), cell);
    }

    Ok(features)
}
