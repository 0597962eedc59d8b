//! Summary command: per-day aggregates for a month.

use std::fmt::Write;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use dt_core::{DaySummary, GoalConfig, month_summaries};
use serde::Serialize;

use crate::commands::util::progress_bar;
use crate::snapshot::Snapshot;

#[derive(Debug, Serialize)]
pub struct MonthReport {
    /// First day of the month.
    #[serde(serialize_with = "serialize_month")]
    pub month: NaiveDate,
    pub days: Vec<DaySummary>,
}

fn serialize_month<S: serde::Serializer>(month: &NaiveDate, s: S) -> Result<S::Ok, S::Error> {
    s.collect_str(&month.format("%Y-%m"))
}

/// Builds the month grid.
pub fn month_report(
    snapshot: &Snapshot,
    year: i32,
    month: u32,
    config: &GoalConfig,
) -> Result<MonthReport> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)
        .with_context(|| format!("invalid month: {year}-{month:02}"))?;
    let days = month_summaries(&snapshot.metrics, &snapshot.logs, year, month, config);
    tracing::debug!(days = days.len(), month = %first.format("%Y-%m"), "summarized month");

    Ok(MonthReport { month: first, days })
}

/// Formats the human-readable month grid.
///
/// Days with nothing scheduled or logged are omitted.
pub fn format_month(report: &MonthReport) -> String {
    let mut output = String::new();

    writeln!(output, "SUMMARY: {}", report.month.format("%B %Y")).unwrap();
    writeln!(output).unwrap();

    let shown: Vec<&DaySummary> = report
        .days
        .iter()
        .filter(|d| d.scheduled_metrics > 0 || d.has_logs())
        .collect();

    if shown.is_empty() {
        writeln!(output, "Nothing scheduled or logged this month.").unwrap();
        return output;
    }

    for day in &shown {
        writeln!(
            output,
            "  {}  logged {}/{}  goals {}/{} {} {:>3.0}%",
            day.date.format("%a %e"),
            day.logged_metrics,
            day.scheduled_metrics,
            day.completed_goals,
            day.goal_metrics,
            progress_bar(day.goal_completion_percentage),
            day.goal_completion_percentage
        )
        .unwrap();
    }

    let logged_days = report.days.iter().filter(|d| d.has_logs()).count();
    writeln!(output).unwrap();
    writeln!(
        output,
        "{logged_days} of {} days logged",
        report.days.len()
    )
    .unwrap();

    let goal_days: Vec<f64> = report
        .days
        .iter()
        .filter(|d| d.goal_metrics > 0 && d.has_logs())
        .map(|d| d.goal_completion_percentage)
        .collect();
    if let Some(average) = average(&goal_days) {
        writeln!(
            output,
            "Average goal completion: {average:.0}% over {} days",
            goal_days.len()
        )
        .unwrap();
    }

    output
}

#[expect(clippy::cast_precision_loss, reason = "at most 31 values")]
fn average(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Runs the summary command.
pub fn run(
    snapshot: &Snapshot,
    (year, month): (i32, u32),
    config: &GoalConfig,
    json: bool,
) -> Result<()> {
    let report = month_report(snapshot, year, month, config)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", format_month(&report));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use dt_core::{DailyLog, GoalKind, Metric, MetricId, MetricType};
    use insta::assert_snapshot;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 2, d).unwrap()
    }

    fn config() -> GoalConfig {
        GoalConfig::new(0.05).unwrap()
    }

    fn bounded(id: &str, metric_type: MetricType, goal: &str, kind: GoalKind) -> Metric {
        let mut metric = Metric::new(MetricId::new(id).unwrap(), id, metric_type);
        metric.schedule.start_date = Some(day(26));
        metric.schedule.end_date = Some(day(29));
        metric.goal_value = Some(goal.to_string());
        metric.goal_type = Some(kind);
        metric
    }

    fn snapshot() -> Snapshot {
        let gym = bounded("gym", MetricType::Boolean, "true", GoalKind::Boolean);
        let water = bounded("water", MetricType::Number, "8", GoalKind::Minimum);
        let log = |m: &Metric, d: u32, v: &str| DailyLog::new(m.id.clone(), day(d), v);

        Snapshot {
            logs: vec![
                log(&gym, 26, "true"),
                log(&water, 26, "8"),
                log(&gym, 27, "false"),
                log(&water, 27, "3"),
                log(&gym, 28, "true"),
                log(&water, 29, "9"),
            ],
            metrics: vec![gym, water],
        }
    }

    #[test]
    fn test_month_report_text() {
        let report = month_report(&snapshot(), 2024, 2, &config()).unwrap();
        assert_eq!(report.days.len(), 29);
        assert_snapshot!(format_month(&report), @r"
        SUMMARY: February 2024

          Mon 26  logged 2/2  goals 2/2 ██████████ 100%
          Tue 27  logged 2/2  goals 0/2 ░░░░░░░░░░   0%
          Wed 28  logged 1/2  goals 1/2 █████░░░░░  50%
          Thu 29  logged 1/2  goals 1/2 █████░░░░░  50%

        4 of 29 days logged
        Average goal completion: 50% over 4 days
        ");
    }

    #[test]
    fn test_month_report_empty() {
        let report = month_report(&Snapshot::default(), 2024, 4, &config()).unwrap();
        assert_eq!(report.days.len(), 30);
        assert_snapshot!(format_month(&report), @r"
        SUMMARY: April 2024

        Nothing scheduled or logged this month.
        ");
    }

    #[test]
    fn test_month_report_rejects_invalid_month() {
        assert!(month_report(&Snapshot::default(), 2024, 13, &config()).is_err());
    }

    #[test]
    fn test_month_json_output() {
        let report = month_report(&snapshot(), 2024, 2, &config()).unwrap();
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["month"], "2024-02");
        assert_eq!(json["days"][25]["date"], "2024-02-26");
        assert_eq!(json["days"][25]["completed_goals"], 2);
        assert_eq!(json["days"][25]["completion_percentage"], 100.0);
    }
}
