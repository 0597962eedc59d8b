//! Per-day aggregates for dashboards and the month calendar.

use std::collections::HashSet;

use chrono::{Datelike, NaiveDate};
use rayon::prelude::*;
use serde::Serialize;
use serde_json::Value;

use crate::goal::{Goal, GoalConfig, HasGoal, evaluate_goal};
use crate::metric::{DailyLog, Metric};
use crate::schedule::appears_on_calendar;
use crate::types::{MetricId, MetricType};

/// Metrics that carry a usable default goal.
pub fn metrics_with_goals(metrics: &[Metric]) -> Vec<&Metric> {
    metrics.iter().filter(|m| m.has_goal()).collect()
}

/// A metric paired with its log for one day, if any.
#[derive(Debug, Clone, Copy)]
pub struct MetricWithLog<'a> {
    pub metric: &'a Metric,
    pub log: Option<&'a DailyLog>,
}

impl MetricWithLog<'_> {
    /// Whether the entry's goal is met.
    ///
    /// The value is the log's value or the metric's default when there is no
    /// log; the goal is the log's override or the metric's default goal.
    pub fn goal_satisfied(&self, config: &GoalConfig) -> bool {
        let Some(goal) = Goal::resolve(self.metric, self.log) else {
            return false;
        };
        let value = match self.log {
            Some(log) => log.parsed_value(self.metric.metric_type),
            None => self.metric.default_log_value(),
        };
        evaluate_goal(self.metric.metric_type, &value, &goal, config).is_some_and(|p| p.satisfied)
    }
}

/// Number of entries whose goal is met.
pub fn completed_goals_count(entries: &[MetricWithLog<'_>], config: &GoalConfig) -> usize {
    entries.iter().filter(|e| e.goal_satisfied(config)).count()
}

/// Whether a log records something beyond the metric's default value.
///
/// Logs with notes are always meaningful. Boolean `true` is meaningful even
/// when it is the default. Text logs must also be non-empty.
pub fn is_log_meaningful(log: &DailyLog, metric: &Metric) -> bool {
    let has_notes = log.has_notes();

    let decoded = serde_json::from_str::<Value>(&log.value).ok();
    let default = if metric.default_value.is_empty() {
        Some(Value::Null)
    } else {
        serde_json::from_str::<Value>(&metric.default_value).ok()
    };

    let (Some(value), Some(default)) = (decoded, default) else {
        // Undecodable: compare the raw encodings.
        return has_notes
            || (log.value != metric.default_value && !log.value.is_empty() && log.value != "0");
    };

    let differs = !same_json(&value, &default);
    match metric.metric_type {
        MetricType::Boolean => value == Value::Bool(true) || has_notes || differs,
        MetricType::Number | MetricType::Time | MetricType::Percentage => differs || has_notes,
        MetricType::Text => differs && !value.is_null() && value != Value::String(String::new()),
    }
}

/// JSON equality where numbers compare by value (`1` equals `1.0`).
fn same_json(a: &Value, b: &Value) -> bool {
    match (a.as_f64(), b.as_f64()) {
        (Some(x), Some(y)) => x == y,
        _ => a == b,
    }
}

/// Aggregates for one calendar day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DaySummary {
    pub date: NaiveDate,

    /// Distinct metrics with a meaningful log on the day.
    pub logged_metrics: usize,

    pub active_metrics: usize,

    /// Active metrics shown on the calendar for the day.
    pub scheduled_metrics: usize,

    /// Scheduled metrics with a default goal.
    pub goal_metrics: usize,

    /// Goal metrics whose meaningful log meets the goal.
    pub completed_goals: usize,

    /// Share of scheduled boolean metrics logged `true`, in `0..=100`.
    pub completion_percentage: f64,

    /// `completed_goals` as a share of `goal_metrics`, in `0..=100`.
    pub goal_completion_percentage: f64,
}

impl DaySummary {
    /// Whether anything meaningful was logged on the day.
    pub const fn has_logs(&self) -> bool {
        self.logged_metrics > 0
    }
}

/// Summarize one day.
///
/// `logs` may span any range; only logs dated `day` are considered.
pub fn day_summary(
    metrics: &[Metric],
    logs: &[DailyLog],
    day: NaiveDate,
    config: &GoalConfig,
) -> DaySummary {
    let meaningful: Vec<&DailyLog> = logs
        .iter()
        .filter(|log| log.date == day)
        .filter(|log| {
            metrics
                .iter()
                .find(|m| m.id == log.metric_id)
                .is_some_and(|m| is_log_meaningful(log, m))
        })
        .collect();
    let log_for = |id: &MetricId| meaningful.iter().copied().find(|log| &log.metric_id == id);

    let logged_metrics = meaningful
        .iter()
        .map(|log| &log.metric_id)
        .collect::<HashSet<_>>()
        .len();

    let scheduled: Vec<&Metric> = metrics
        .iter()
        .filter(|m| appears_on_calendar(m, day))
        .collect();

    // Goal entries without a meaningful log do not count as completed.
    let goal_entries: Vec<MetricWithLog<'_>> = scheduled
        .iter()
        .filter(|m| m.has_goal())
        .map(|&metric| MetricWithLog {
            metric,
            log: log_for(&metric.id),
        })
        .collect();
    let logged_goal_entries: Vec<MetricWithLog<'_>> =
        goal_entries.iter().filter(|e| e.log.is_some()).copied().collect();
    let completed_goals = completed_goals_count(&logged_goal_entries, config);

    let boolean_metrics: Vec<&Metric> = scheduled
        .iter()
        .copied()
        .filter(|m| m.metric_type == MetricType::Boolean)
        .collect();
    let completed_booleans = boolean_metrics
        .iter()
        .filter(|m| {
            log_for(&m.id).is_some_and(|log| log.parsed_value(MetricType::Boolean).is_true())
        })
        .count();

    DaySummary {
        date: day,
        logged_metrics,
        active_metrics: metrics.iter().filter(|m| m.active).count(),
        scheduled_metrics: scheduled.len(),
        goal_metrics: goal_entries.len(),
        completed_goals,
        completion_percentage: percentage(completed_booleans, boolean_metrics.len()),
        goal_completion_percentage: percentage(completed_goals, goal_entries.len()),
    }
}

#[expect(clippy::cast_precision_loss, reason = "day-level counts are small")]
fn percentage(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}

/// Summaries for every day of a month, in date order.
///
/// An invalid `year`/`month` yields no days.
pub fn month_summaries(
    metrics: &[Metric],
    logs: &[DailyLog],
    year: i32,
    month: u32,
    config: &GoalConfig,
) -> Vec<DaySummary> {
    let Some(first) = NaiveDate::from_ymd_opt(year, month, 1) else {
        return Vec::new();
    };
    let days: Vec<NaiveDate> = first.iter_days().take_while(|d| d.month() == month).collect();

    days.par_iter()
        .map(|&day| day_summary(metrics, logs, day, config))
        .collect()
}
