//! Live record store - append-only log of served predictions
//!
//! The prediction endpoint is the only writer; the drift detector and the
//! metrics exporter read snapshots. Each record is written as one CSV line
//! with a single `write_all` on an append-mode handle, so readers see whole
//! records or nothing - never a torn one in the consistent prefix.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::PathBuf;

use chrono::{DateTime, SecondsFormat, Utc};
use parking_lot::Mutex;
use uuid::Uuid;

use crate::dataset::Dataset;
use crate::error::{MonitoringError, Result};
use crate::schema::FeatureSchema;

/// Non-feature columns appended after the schema columns
const RESERVED_COLUMNS: [&str; 4] = ["prediction", "probability", "timestamp", "id"];

/// One served prediction, created exactly once per request and never mutated
#[derive(Debug, Clone)]
pub struct LiveRecord {
    /// Raw input feature values keyed by feature name
    pub features: BTreeMap<String, String>,

    /// Predicted class label
    pub prediction: i64,

    /// Probability of the positive class, in [0, 1]
    pub probability: f64,

    /// UTC instant the prediction was served
    pub timestamp: DateTime<Utc>,

    /// Globally unique record id, generated at write time
    pub id: Uuid,
}

impl LiveRecord {
    /// Create a record for a just-served prediction, stamping id and time
    pub fn new(features: BTreeMap<String, String>, prediction: i64, probability: f64) -> Self {
        Self {
            features,
            prediction,
            probability,
            timestamp: Utc::now(),
            id: Uuid::new_v4(),
        }
    }
}

/// Append-only CSV-backed store of live records.
///
/// Owns the underlying file exclusively: everything else in the system only
/// reads from it through [`LiveRecordStore::load_all`].
pub struct LiveRecordStore {
    path: PathBuf,
    schema: FeatureSchema,
    append_lock: Mutex<()>,
}

impl LiveRecordStore {
    /// Create a store handle for the given file and schema
    pub fn new(path: PathBuf, schema: FeatureSchema) -> Result<Self> {
        for reserved in RESERVED_COLUMNS {
            if schema.contains(reserved) {
                return Err(MonitoringError::invalid_schema(format!(
                    "feature name '{}' collides with a reserved record column",
                    reserved
                )));
            }
        }
        Ok(Self {
            path,
            schema,
            append_lock: Mutex::new(()),
        })
    }

    /// The file backing this store
    pub fn path(&self) -> &std::path::Path {
        &self.path
    }

    /// Append one record.
    ///
    /// The record must carry exactly the schema's features: a missing one
    /// fails with `MissingFeature`, an extra one with `UnknownFeature`.
    /// I/O failures surface as `StoreUnavailable` so the caller knows the
    /// served prediction was not logged.
    pub fn append(&self, record: &LiveRecord) -> Result<()> {
        for name in record.features.keys() {
            if !self.schema.contains(name) {
                return Err(MonitoringError::unknown_feature(name.as_str()));
            }
        }

        let mut fields = Vec::with_capacity(self.schema.len() + RESERVED_COLUMNS.len());
        for name in self.schema.feature_names() {
            let value = record
                .features
                .get(name)
                .ok_or_else(|| MonitoringError::missing_feature(name, "live record"))?;
            fields.push(value.clone());
        }
        fields.push(record.prediction.to_string());
        fields.push(record.probability.to_string());
        fields.push(record.timestamp.to_rfc3339_opts(SecondsFormat::Micros, true));
        fields.push(record.id.to_string());

        let _guard = self.append_lock.lock();

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| MonitoringError::store_unavailable(e.to_string()))?;
        }
        let need_header = !self.path.exists();

        // Header (first write only) and record go out in one write_all so a
        // concurrent reader never sees a partial line.
        let mut buf = Vec::new();
        {
            let mut writer = csv::Writer::from_writer(&mut buf);
            if need_header {
                writer
                    .write_record(self.header())
                    .map_err(|e| MonitoringError::store_unavailable(e.to_string()))?;
            }
            writer
                .write_record(&fields)
                .map_err(|e| MonitoringError::store_unavailable(e.to_string()))?;
            writer
                .flush()
                .map_err(|e| MonitoringError::store_unavailable(e.to_string()))?;
        }

        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| MonitoringError::store_unavailable(e.to_string()))?;
        file.write_all(&buf)
            .map_err(|e| MonitoringError::store_unavailable(e.to_string()))?;

        Ok(())
    }

    /// Load every record written so far, in write order.
    ///
    /// A store that does not exist yet is a valid "no traffic" state and
    /// yields an empty dataset.
    pub fn load_all(&self) -> Result<Dataset> {
        if !self.path.exists() {
            return Ok(Dataset::empty(self.header()));
        }
        Dataset::from_csv_path(&self.path)
            .map_err(|e| MonitoringError::store_unavailable(e.to_string()))
    }

    fn header(&self) -> Vec<String> {
        self.schema
            .feature_names()
            .map(|n| n.to_string())
            .chain(RESERVED_COLUMNS.iter().map(|c| c.to_string()))
            .collect()
    }
}
