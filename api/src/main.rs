//! Sentinel prediction API
//!
//! Serves the trained classifier over HTTP and appends every served
//! prediction to the live record store the drift monitor reads. The scorer
//! is loaded once at startup and injected through shared state - there is
//! no module-level model singleton.

mod config;
mod error;
mod handlers;
mod scorer;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sentinel_monitoring::{FeatureSchema, LiveRecordStore};

pub use error::{ApiError, ApiResult};
use scorer::{LinearScorer, Scorer};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub schema: FeatureSchema,
    pub scorer: Arc<dyn Scorer>,
    pub store: Arc<LiveRecordStore>,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sentinel_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = config::Config::from_env();
    tracing::info!("Sentinel API starting...");

    let schema = FeatureSchema::from_file(&config.schema_path)
        .expect("failed to load feature schema");
    let scorer = LinearScorer::from_file(&config.scorer_path)
        .expect("failed to load scorer artifact");
    let store = LiveRecordStore::new(config.live_path.clone(), schema.clone())
        .expect("failed to open live record store");

    tracing::info!(
        features = schema.len(),
        live_path = %config.live_path.display(),
        "Artifacts loaded"
    );

    let state = AppState {
        schema,
        scorer: Arc::new(scorer),
        store: Arc::new(store),
    };

    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("failed to bind listener");
    axum::serve(listener, app).await.expect("server error");
}

/// Create the router with all routes
fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::status))
        .route("/predict", post(handlers::predict))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
