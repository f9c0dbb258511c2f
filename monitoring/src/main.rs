//! Sentinel monitor - drift report jobs and the metrics exporter
//!
//! `sentinel-monitor report` runs a one-shot drift check and persists the
//! report; `sentinel-monitor export` runs the Prometheus exporter loop.

use std::sync::Arc;
use std::time::Duration;

use clap::{Arg, Command};
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sentinel_monitoring::{
    install_scrape_endpoint, Dataset, DriftDetector, DriftExporter, DriftReportBuilder,
    FeatureSchema, LiveRecordStore, MonitoringConfig, MonitoringError, Result, VERSION,
};

#[tokio::main]
async fn main() -> Result<()> {
    let matches = Command::new("sentinel-monitor")
        .version(VERSION)
        .about("Sentinel drift monitoring - reports and metrics export")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Configuration file path"),
        )
        .arg(
            Arg::new("log-level")
                .short('l')
                .long("log-level")
                .value_name("LEVEL")
                .help("Log level (trace, debug, info, warn, error)")
                .default_value("info"),
        )
        .arg(
            Arg::new("generate-config")
                .long("generate-config")
                .value_name("OUTPUT")
                .help("Generate example config and exit"),
        )
        .subcommand(Command::new("report").about("Run a one-shot drift report job"))
        .subcommand(Command::new("export").about("Run the metrics exporter loop"))
        .get_matches();

    let log_level = matches.get_one::<String>("log-level").unwrap();
    init_logging(log_level);

    if let Some(output_path) = matches.get_one::<String>("generate-config") {
        let config = MonitoringConfig::default();
        config.save_to_file(output_path)?;
        info!("Generated example config at: {}", output_path);
        return Ok(());
    }

    let config = if let Some(config_path) = matches.get_one::<String>("config") {
        info!("Loading config from: {}", config_path);
        MonitoringConfig::from_file(config_path)?
    } else {
        MonitoringConfig::from_env_and_file()?
    };

    match matches.subcommand() {
        Some(("report", _)) => run_report(&config),
        Some(("export", _)) => run_export(config).await,
        _ => Err(MonitoringError::internal(
            "missing subcommand; use 'report' or 'export'",
        )),
    }
}

/// Initialize logging
fn init_logging(log_level: &str) {
    let level = match log_level.to_lowercase().as_str() {
        "trace" => tracing::Level::TRACE,
        "debug" => tracing::Level::DEBUG,
        "info" => tracing::Level::INFO,
        "warn" => tracing::Level::WARN,
        "error" => tracing::Level::ERROR,
        _ => {
            eprintln!("Invalid log level: {}. Using 'info'", log_level);
            tracing::Level::INFO
        }
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("sentinel_monitoring={}", level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// One-shot drift report job.
///
/// Any detector error (insufficient data, schema mismatch, malformed rows)
/// propagates out and exits non-zero - a report job that cannot compute
/// drift must fail loudly, never emit a default report.
fn run_report(config: &MonitoringConfig) -> Result<()> {
    let schema = FeatureSchema::from_file(&config.schema_path)?;
    let reference = Dataset::from_csv_path(&config.reference_path)?;
    let store = LiveRecordStore::new(config.live_path.clone(), schema.clone())?;
    let live = store.load_all()?;

    info!(
        reference_rows = reference.len(),
        live_rows = live.len(),
        features = schema.len(),
        "Computing drift"
    );

    let detector = DriftDetector::new(schema, config.thresholds.clone())?;
    let result = detector.detect(&reference, &live)?;

    if result.dataset_drift {
        warn!(
            drifted = result.count_drifted_features,
            share = result.share_drifted,
            "Dataset drift detected"
        );
    }

    let builder = DriftReportBuilder::new(config.report_dir.clone());
    let report = builder.build(result);
    let path = builder.persist(&report)?;
    info!("Drift report saved to {}", path.display());

    Ok(())
}

/// Run the exporter loop until SIGINT/SIGTERM
async fn run_export(config: MonitoringConfig) -> Result<()> {
    let schema = FeatureSchema::from_file(&config.schema_path)?;
    let reference = Dataset::from_csv_path(&config.reference_path)?;
    let store = Arc::new(LiveRecordStore::new(config.live_path.clone(), schema.clone())?);
    let detector = DriftDetector::new(schema, config.thresholds.clone())?;

    install_scrape_endpoint(&config.exporter.listen_addr)?;

    let exporter = DriftExporter::new(
        store,
        reference,
        detector,
        Duration::from_secs(config.exporter.interval_secs),
    );

    info!(version = VERSION, "Sentinel exporter ready");

    tokio::select! {
        _ = exporter.run() => {
            info!("Exporter loop stopped");
        }
        _ = shutdown_signal() => {
            info!("Shutdown signal received");
        }
    }

    Ok(())
}

/// Wait for SIGINT or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
