//! Metrics exporter - periodic drift recomputation published as gauges
//!
//! A supervisory loop, not a one-shot computation: every cycle loads the
//! live dataset, runs the drift detector against the frozen reference and
//! sets Prometheus gauges with the verdict. A failed cycle is logged and
//! swallowed; the loop itself never exits, degrading to a stale value
//! rather than losing the scrape surface.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use metrics::{counter, describe_counter, describe_gauge, gauge};
use metrics_exporter_prometheus::PrometheusBuilder;
use tracing::{debug, error, info};

use crate::dataset::Dataset;
use crate::drift::{DriftDetector, DriftResult};
use crate::error::{MonitoringError, Result};
use crate::store::LiveRecordStore;

const GAUGE_DATASET_DRIFT: &str = "sentinel_dataset_drift";
const GAUGE_DRIFTED_FEATURES: &str = "sentinel_drifted_features";
const GAUGE_DRIFT_SHARE: &str = "sentinel_drift_share";
const GAUGE_LIVE_RECORDS: &str = "sentinel_live_records";
const COUNTER_CYCLE_FAILURES: &str = "sentinel_exporter_cycle_failures";

/// Install the Prometheus scrape endpoint and register metric metadata.
///
/// Call once at process startup, before the exporter loop runs.
pub fn install_scrape_endpoint(listen_addr: &str) -> Result<()> {
    let addr: SocketAddr = listen_addr
        .parse()
        .map_err(|_| MonitoringError::publish_failure(format!("invalid listen address '{listen_addr}'")))?;

    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| MonitoringError::publish_failure(e.to_string()))?;

    describe_gauge!(
        GAUGE_DATASET_DRIFT,
        "Aggregate drift verdict from the last completed cycle (1 = drifted)"
    );
    describe_gauge!(
        GAUGE_DRIFTED_FEATURES,
        "Number of features whose drift score exceeded their threshold"
    );
    describe_gauge!(GAUGE_DRIFT_SHARE, "Fraction of monitored features drifted");
    describe_gauge!(GAUGE_LIVE_RECORDS, "Rows currently in the live record store");
    describe_counter!(COUNTER_CYCLE_FAILURES, "Exporter cycles that ended in an error");

    info!(listen_addr, "Prometheus scrape endpoint installed");
    Ok(())
}

/// Periodically recomputes drift and publishes the verdict
pub struct DriftExporter {
    store: Arc<LiveRecordStore>,
    reference: Dataset,
    detector: DriftDetector,
    interval: Duration,
}

impl DriftExporter {
    pub fn new(
        store: Arc<LiveRecordStore>,
        reference: Dataset,
        detector: DriftDetector,
        interval: Duration,
    ) -> Self {
        Self {
            store,
            reference,
            detector,
            interval,
        }
    }

    /// One collection cycle: load live data, detect drift, set gauges.
    ///
    /// The drift gauges are only touched on success, so scrapes between
    /// failures keep serving the last good verdict.
    pub fn cycle(&self) -> Result<DriftResult> {
        let live = self.store.load_all()?;
        gauge!(GAUGE_LIVE_RECORDS, live.len() as f64);

        let result = self.detector.detect(&self.reference, &live)?;

        gauge!(
            GAUGE_DATASET_DRIFT,
            if result.dataset_drift { 1.0 } else { 0.0 }
        );
        gauge!(GAUGE_DRIFTED_FEATURES, result.count_drifted_features as f64);
        gauge!(GAUGE_DRIFT_SHARE, result.share_drifted);

        Ok(result)
    }

    /// Run cycles forever at the configured interval.
    ///
    /// Never returns under normal operation; shutdown is the process's
    /// concern (the caller races this future against a signal handler).
    pub async fn run(self) {
        info!(interval_secs = self.interval.as_secs(), "Drift exporter loop starting");
        let mut interval = tokio::time::interval(self.interval);

        loop {
            interval.tick().await;

            match self.cycle() {
                Ok(result) => {
                    debug!(
                        dataset_drift = result.dataset_drift,
                        drifted = result.count_drifted_features,
                        live_rows = result.n_current,
                        "Exporter cycle complete"
                    );
                }
                // No traffic yet is an expected state, not a failure
                Err(MonitoringError::InsufficientData { message }) => {
                    debug!(%message, "Skipping drift verdict");
                }
                Err(e) => {
                    counter!(COUNTER_CYCLE_FAILURES, 1);
                    error!(error = %e, "Exporter cycle failed; keeping last published value");
                }
            }
        }
    }
}
