//! Sentinel monitoring core
//!
//! Detects distribution drift between the frozen training-time reference
//! dataset and the live traffic a deployed classifier actually serves.
//!
//! ## Pipeline:
//! 1. **Live record store**: append-only log written by the prediction path
//! 2. **Drift detector**: per-feature PSI / KS scores + aggregate verdict
//! 3. **Report builder**: timestamped JSON drift artifacts
//! 4. **Metrics exporter**: periodic recomputation published as gauges

pub mod config;
pub mod dataset;
pub mod drift;
pub mod error;
pub mod exporter;
pub mod report;
pub mod schema;
pub mod store;

pub use config::{ExporterConfig, MonitoringConfig};
pub use dataset::Dataset;
pub use drift::{DriftDetector, DriftResult, DriftThresholds, FeatureDrift, StatTest};
pub use error::{MonitoringError, Result};
pub use exporter::{install_scrape_endpoint, DriftExporter};
pub use report::{DriftReport, DriftReportBuilder};
pub use schema::{FeatureColumn, FeatureKind, FeatureSchema};
pub use store::{LiveRecord, LiveRecordStore};

/// Version of the monitoring core
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
