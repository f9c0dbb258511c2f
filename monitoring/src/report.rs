//! Drift report builder - persisted, timestamped drift artifacts

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::drift::DriftResult;
use crate::error::Result;

/// A drift result frozen into a persistable artifact
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriftReport {
    /// Stable storage key, `drift_<YYYYMMDD_HHMMSS_mmm>`
    pub storage_key: String,

    /// When the report was built
    pub created_at: DateTime<Utc>,

    /// The underlying drift result
    pub result: DriftResult,
}

/// Builds and persists drift reports into a report directory
pub struct DriftReportBuilder {
    report_dir: PathBuf,
}

impl DriftReportBuilder {
    pub fn new(report_dir: PathBuf) -> Self {
        Self { report_dir }
    }

    /// Stamp a drift result with the current time and a storage key.
    ///
    /// Keys carry millisecond resolution; two reports built within the same
    /// millisecond share a key and the later persist overwrites the earlier
    /// one, which is far beyond any sane scheduled-job cadence.
    pub fn build(&self, result: DriftResult) -> DriftReport {
        let created_at = Utc::now();
        DriftReport {
            storage_key: format!("drift_{}", created_at.format("%Y%m%d_%H%M%S_%3f")),
            created_at,
            result,
        }
    }

    /// Write the report as pretty JSON under the report directory,
    /// creating missing parents. Returns the path written.
    pub fn persist(&self, report: &DriftReport) -> Result<PathBuf> {
        std::fs::create_dir_all(&self.report_dir)?;
        let path = self.report_dir.join(format!("{}.json", report.storage_key));
        let json = serde_json::to_string_pretty(report)?;
        std::fs::write(&path, json)?;
        Ok(path)
    }

    pub fn report_dir(&self) -> &Path {
        &self.report_dir
    }
}
