//! Goals command: goal progress per metric for a day.

use std::fmt::Write;

use anyhow::Result;
use chrono::NaiveDate;
use dt_core::{
    Goal, GoalConfig, MetricId, MetricWithLog, completed_goals_count, describe_goal,
    evaluate_goal, is_due,
};
use serde::Serialize;

use crate::commands::util::{format_day, progress_bar};
use crate::snapshot::Snapshot;

/// Goal progress for one day.
#[derive(Debug, Serialize)]
pub struct GoalsReport {
    pub date: NaiveDate,
    pub goals: Vec<GoalEntry>,
    pub completed: usize,
}

#[derive(Debug, Serialize)]
pub struct GoalEntry {
    pub id: MetricId,
    pub name: String,
    pub goal: Goal,
    pub label: String,
    pub satisfied: bool,
    pub progress: f64,
    /// Whether the value came from a log rather than the metric default.
    pub logged: bool,
}

/// Evaluates the goal of every active metric due on `day`.
///
/// Metrics whose goal kind does not fit their type are skipped.
pub fn goals_report(snapshot: &Snapshot, day: NaiveDate, config: &GoalConfig) -> GoalsReport {
    let mut entries = Vec::new();
    let mut goals = Vec::new();

    for metric in snapshot.active_metrics().filter(|m| is_due(m, day)) {
        let log = snapshot.log_for(metric, day);
        let Some(goal) = Goal::resolve(metric, log) else {
            continue;
        };
        let value = log.map_or_else(
            || metric.default_log_value(),
            |l| l.parsed_value(metric.metric_type),
        );

        let Some(progress) = evaluate_goal(metric.metric_type, &value, &goal, config) else {
            tracing::debug!(metric = %metric.id, kind = %goal.kind, "goal kind does not apply");
            continue;
        };
        let label = describe_goal(metric.metric_type, metric.unit.as_deref(), &value, &goal)
            .unwrap_or_default();

        entries.push(MetricWithLog { metric, log });
        goals.push(GoalEntry {
            id: metric.id.clone(),
            name: metric.name.clone(),
            goal,
            label,
            satisfied: progress.satisfied,
            progress: progress.progress,
            logged: log.is_some(),
        });
    }

    GoalsReport {
        date: day,
        completed: completed_goals_count(&entries, config),
        goals,
    }
}

/// Formats the human-readable goal list.
pub fn format_goals(report: &GoalsReport) -> String {
    let mut output = String::new();

    writeln!(output, "GOALS: {}", format_day(report.date)).unwrap();
    writeln!(output).unwrap();

    if report.goals.is_empty() {
        writeln!(output, "No goals set for this day.").unwrap();
        return output;
    }

    for entry in &report.goals {
        let mark = if entry.satisfied { "  ✓" } else { "" };
        writeln!(
            output,
            "  {:<20} {:<22} {} {:>3.0}%{mark}",
            entry.name,
            entry.label,
            progress_bar(entry.progress),
            entry.progress
        )
        .unwrap();
    }

    writeln!(output).unwrap();
    writeln!(
        output,
        "{} of {} goals met",
        report.completed,
        report.goals.len()
    )
    .unwrap();

    output
}

/// Runs the goals command.
pub fn run(snapshot: &Snapshot, day: NaiveDate, config: &GoalConfig, json: bool) -> Result<()> {
    let report = goals_report(snapshot, day, config);

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", format_goals(&report));
    }
    Ok(())
}
