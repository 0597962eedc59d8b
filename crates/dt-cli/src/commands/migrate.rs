//! Migrate command: rewrite the metrics file in the current record format.
//!
//! Legacy records marked calendar opt-out with a `-1` entry in
//! `schedule_days`; current records carry `excluded_from_calendar` instead.
//! Records are edited as raw JSON so keys this tool does not model survive.

use std::io::Write;

use anyhow::{Context, Result};
use dt_core::Metric;
use serde::Deserialize;
use serde_json::Value;

use crate::Config;
use crate::snapshot::{read_json_array, write_json_array};

/// Outcome of a migration run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MigrationSummary {
    pub metrics: usize,
    pub opt_outs_converted: usize,
}

const LEGACY_OPT_OUT: i64 = -1;

/// Moves a legacy `-1` weekday into `excluded_from_calendar`.
///
/// Returns whether the record changed; every other key is left as it is.
fn convert_opt_out(record: &mut Value) -> bool {
    let Some(days) = record.get_mut("schedule_days").and_then(Value::as_array_mut) else {
        return false;
    };
    let before = days.len();
    days.retain(|d| d.as_i64() != Some(LEGACY_OPT_OUT));
    if days.len() == before {
        return false;
    }

    if let Some(fields) = record.as_object_mut() {
        fields.insert("excluded_from_calendar".to_string(), Value::Bool(true));
    }
    true
}

/// Migrates the metrics file in place unless `dry_run`.
pub fn migrate(config: &Config, dry_run: bool) -> Result<MigrationSummary> {
    let path = &config.metrics_path;
    let mut records: Vec<Value> = read_json_array(path)?
        .with_context(|| format!("metrics file not found: {}", path.display()))?;

    for (i, record) in records.iter().enumerate() {
        Metric::deserialize(record)
            .with_context(|| format!("invalid metric at index {i} in {}", path.display()))?;
    }

    let opt_outs_converted = records
        .iter_mut()
        .map(convert_opt_out)
        .filter(|&changed| changed)
        .count();

    if !dry_run && opt_outs_converted > 0 {
        write_json_array(path, &records)?;
        tracing::debug!(path = %path.display(), opt_outs_converted, "rewrote metrics file");
    }

    Ok(MigrationSummary {
        metrics: records.len(),
        opt_outs_converted,
    })
}

/// Runs the migrate command.
pub fn run<W: Write>(writer: &mut W, config: &Config, dry_run: bool) -> Result<()> {
    let summary = migrate(config, dry_run)?;
    let verb = if dry_run { "Would migrate" } else { "Migrated" };

    writeln!(
        writer,
        "{verb} {} metrics in {}",
        summary.metrics,
        config.metrics_path.display()
    )?;
    writeln!(
        writer,
        "Calendar opt-outs converted: {}",
        summary.opt_outs_converted
    )?;
    Ok(())
}
