//! Loading and saving the metrics/logs snapshot files.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use dt_core::{DailyLog, Metric};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::Config;

/// Metric definitions and daily logs loaded from disk.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub metrics: Vec<Metric>,
    pub logs: Vec<DailyLog>,
}

impl Snapshot {
    /// Loads both snapshot files named in `config`.
    ///
    /// The metrics file must exist; a missing logs file means no logs yet.
    /// Unreadable log records are skipped with a warning.
    pub fn load(config: &Config) -> Result<Self> {
        let metrics: Vec<Metric> = read_json_array(&config.metrics_path)?.with_context(|| {
            format!("metrics file not found: {}", config.metrics_path.display())
        })?;
        let logs = match read_json_array::<Value>(&config.logs_path)? {
            Some(records) => parse_logs(&config.logs_path, records),
            None => {
                tracing::debug!(path = %config.logs_path.display(), "no logs file, starting empty");
                Vec::new()
            }
        };

        tracing::debug!(
            metrics = metrics.len(),
            logs = logs.len(),
            "loaded snapshot"
        );
        Ok(Self { metrics, logs })
    }

    /// Active metrics, in file order.
    pub fn active_metrics(&self) -> impl Iterator<Item = &Metric> {
        self.metrics.iter().filter(|m| m.active)
    }

    /// First log of `metric` on `day`, if any.
    pub fn log_for(&self, metric: &Metric, day: chrono::NaiveDate) -> Option<&DailyLog> {
        self.logs
            .iter()
            .find(|log| log.metric_id == metric.id && log.date == day)
    }
}

fn parse_logs(path: &Path, records: Vec<Value>) -> Vec<DailyLog> {
    records
        .into_iter()
        .enumerate()
        .filter_map(|(index, record)| match serde_json::from_value(record) {
            Ok(log) => Some(log),
            Err(e) => {
                tracing::warn!(path = %path.display(), index, error = %e, "skipping invalid log");
                None
            }
        })
        .collect()
}

/// Reads a JSON array file; `Ok(None)` when the file does not exist.
pub fn read_json_array<T: DeserializeOwned>(path: &Path) -> Result<Option<Vec<T>>> {
    match fs::read_to_string(path) {
        Ok(contents) => {
            let parsed = serde_json::from_str(&contents)
                .with_context(|| format!("failed to parse {}", path.display()))?;
            Ok(Some(parsed))
        }
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(err) => Err(err).with_context(|| format!("failed to read {}", path.display())),
    }
}

/// Writes `items` as a pretty JSON array, atomically via a `.tmp` sibling file.
pub fn write_json_array<T: Serialize>(path: &Path, items: &[T]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }

    let json = serde_json::to_string_pretty(items)
        .with_context(|| format!("failed to encode {}", path.display()))?;
    let tmp_path = path.with_extension("tmp");
    fs::write(&tmp_path, json).with_context(|| format!("failed to write {}", tmp_path.display()))?;

    if let Err(err) = fs::rename(&tmp_path, path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(err).with_context(|| format!("failed to replace {}", path.display()));
    }
    Ok(())
}
