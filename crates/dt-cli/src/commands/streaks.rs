//! Streaks command: current and longest runs per metric.

use std::fmt::Write;

use anyhow::Result;
use chrono::NaiveDate;
use dt_core::{CompletionCriteria, GoalConfig, MetricId, compute_streaks};
use serde::Serialize;

use crate::commands::util::format_day;
use crate::snapshot::Snapshot;

#[derive(Debug, Serialize)]
pub struct StreaksReport {
    pub as_of: NaiveDate,
    pub streaks: Vec<StreakEntry>,
}

#[derive(Debug, Serialize)]
pub struct StreakEntry {
    pub id: MetricId,
    pub name: String,
    pub current: u32,
    pub longest: u32,
}

/// Computes streaks for every active metric.
pub fn streaks_report(snapshot: &Snapshot, as_of: NaiveDate, config: &GoalConfig) -> StreaksReport {
    let streaks = snapshot
        .active_metrics()
        .map(|metric| {
            let criteria = CompletionCriteria::for_metric(metric);
            let streaks = compute_streaks(&snapshot.logs, &metric.id, &criteria, as_of, config);
            StreakEntry {
                id: metric.id.clone(),
                name: metric.name.clone(),
                current: streaks.current,
                longest: streaks.longest,
            }
        })
        .collect();

    StreaksReport { as_of, streaks }
}

/// Formats the human-readable streak table.
pub fn format_streaks(report: &StreaksReport) -> String {
    let mut output = String::new();

    writeln!(output, "STREAKS: {}", format_day(report.as_of)).unwrap();
    writeln!(output).unwrap();

    if report.streaks.is_empty() {
        writeln!(output, "No active metrics.").unwrap();
        return output;
    }

    for entry in &report.streaks {
        writeln!(
            output,
            "  {:<20} current {:>3}  longest {:>3}",
            entry.name, entry.current, entry.longest
        )
        .unwrap();
    }

    output
}

/// Runs the streaks command.
pub fn run(snapshot: &Snapshot, as_of: NaiveDate, config: &GoalConfig, json: bool) -> Result<()> {
    let report = streaks_report(snapshot, as_of, config);

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", format_streaks(&report));
    }
    Ok(())
}
