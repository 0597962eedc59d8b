//! Due command: which metrics are scheduled on a day.

use std::fmt::Write;

use anyhow::Result;
use chrono::NaiveDate;
use dt_core::{
    Frequency, IntervalUnit, MetricId, Schedule, appears_on_calendar, format_schedule_days, is_due,
};
use serde::Serialize;

use crate::commands::util::format_day;
use crate::snapshot::Snapshot;

/// Metrics due on one day.
#[derive(Debug, Serialize)]
pub struct DueReport {
    pub date: NaiveDate,
    pub active_metrics: usize,
    pub metrics: Vec<DueEntry>,
}

#[derive(Debug, Serialize)]
pub struct DueEntry {
    pub id: MetricId,
    pub name: String,
    pub schedule: String,
    pub on_calendar: bool,
}

/// Collects the active metrics due on `day`.
pub fn due_report(snapshot: &Snapshot, day: NaiveDate) -> DueReport {
    let metrics = snapshot
        .active_metrics()
        .filter(|m| is_due(m, day))
        .map(|m| DueEntry {
            id: m.id.clone(),
            name: m.name.clone(),
            schedule: describe_schedule(&m.schedule),
            on_calendar: appears_on_calendar(m, day),
        })
        .collect();

    DueReport {
        date: day,
        active_metrics: snapshot.active_metrics().count(),
        metrics,
    }
}

/// Short description of a recurrence rule, e.g. "every 3 days from 2024-01-01".
pub fn describe_schedule(schedule: &Schedule) -> String {
    if schedule.malformed_dates {
        return "invalid schedule dates".to_string();
    }
    if schedule.is_unset() {
        return "every day".to_string();
    }

    let mut out = match schedule.frequency {
        Some(Frequency::Daily) => "daily".to_string(),
        None | Some(Frequency::Weekly) if schedule.days.is_empty() => "every day".to_string(),
        None | Some(Frequency::Weekly) => {
            format!("weekly: {}", format_schedule_days(schedule.days))
        }
        Some(Frequency::Interval) => match schedule.interval_value {
            Some(1) => format!("every {}", singular(schedule.interval_unit.unwrap_or_default())),
            Some(n) => format!("every {n} {}", schedule.interval_unit.unwrap_or_default()),
            None => "interval (no length set)".to_string(),
        },
        Some(Frequency::Custom) => format!("custom: {}", format_schedule_days(schedule.days)),
    };

    if let Some(start) = schedule.start_date {
        write!(out, " from {start}").unwrap();
    }
    if let Some(end) = schedule.end_date {
        write!(out, " until {end}").unwrap();
    }
    out
}

const fn singular(unit: IntervalUnit) -> &'static str {
    match unit {
        IntervalUnit::Days => "day",
        IntervalUnit::Weeks => "week",
        IntervalUnit::Months => "month",
    }
}

/// Formats the human-readable due list.
pub fn format_due(report: &DueReport) -> String {
    let mut output = String::new();

    writeln!(output, "DUE: {}", format_day(report.date)).unwrap();
    writeln!(output).unwrap();

    if report.metrics.is_empty() {
        writeln!(output, "No metrics due.").unwrap();
        return output;
    }

    for entry in &report.metrics {
        let hidden = if entry.on_calendar { "" } else { " (hidden from calendar)" };
        writeln!(output, "  {:<20} {}{hidden}", entry.name, entry.schedule).unwrap();
    }

    writeln!(output).unwrap();
    writeln!(
        output,
        "{} of {} active metrics due",
        report.metrics.len(),
        report.active_metrics
    )
    .unwrap();

    output
}

/// Runs the due command.
pub fn run(snapshot: &Snapshot, day: NaiveDate, json: bool) -> Result<()> {
    let report = due_report(snapshot, day);
    tracing::debug!(due = report.metrics.len(), %day, "evaluated schedules");

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", format_due(&report));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use dt_core::{Metric, MetricType, WeekdaySet};
    use insta::assert_snapshot;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn metric(id: &str, name: &str) -> Metric {
        Metric::new(MetricId::new(id).unwrap(), name, MetricType::Boolean)
    }

    fn snapshot() -> Snapshot {
        let gym = metric("gym", "Gym");

        let mut vitamins = metric("vitamins", "Vitamins");
        vitamins.schedule.frequency = Some(Frequency::Weekly);
        vitamins.schedule.days = WeekdaySet::from_numbers([1, 3, 5]);
        vitamins.schedule.excluded_from_calendar = true;

        let mut run = metric("run", "Long run");
        run.schedule.frequency = Some(Frequency::Interval);
        run.schedule.start_date = Some(day(2024, 2, 1));
        run.schedule.interval_value = Some(2);
        run.schedule.interval_unit = Some(IntervalUnit::Weeks);

        let mut retired = metric("retired", "Retired");
        retired.active = false;

        Snapshot {
            metrics: vec![gym, vitamins, run, retired],
            logs: Vec::new(),
        }
    }

    #[test]
    fn test_describe_schedule() {
        let mut schedule = Schedule::default();
        assert_eq!(describe_schedule(&schedule), "every day");

        schedule.frequency = Some(Frequency::Interval);
        schedule.interval_value = Some(3);
        schedule.start_date = Some(day(2024, 1, 1));
        assert_eq!(describe_schedule(&schedule), "every 3 days from 2024-01-01");

        schedule.interval_value = Some(1);
        schedule.interval_unit = Some(IntervalUnit::Months);
        schedule.end_date = Some(day(2024, 12, 31));
        assert_eq!(
            describe_schedule(&schedule),
            "every month from 2024-01-01 until 2024-12-31"
        );

        let custom = Schedule {
            frequency: Some(Frequency::Custom),
            days: WeekdaySet::from_numbers([0, 6]),
            ..Schedule::default()
        };
        assert_eq!(describe_schedule(&custom), "custom: Weekends");

        let broken = Schedule {
            malformed_dates: true,
            ..Schedule::default()
        };
        assert_eq!(describe_schedule(&broken), "invalid schedule dates");
    }

    #[test]
    fn test_due_report_on_matching_day() {
        // 2024-02-02 is a Friday, one day after the run's anchor.
        let report = due_report(&snapshot(), day(2024, 2, 2));
        let output = format_due(&report);
        assert_snapshot!(output, @r"
        DUE: Friday, Feb 2, 2024

          Gym                  every day
          Vitamins             weekly: Monday, Wednesday, Friday (hidden from calendar)

        2 of 3 active metrics due
        ");
    }

    #[test]
    fn test_due_report_interval_anchor() {
        let report = due_report(&snapshot(), day(2024, 2, 15));
        let ids: Vec<&str> = report.metrics.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["gym", "run"]);
    }

    #[test]
    fn test_due_report_empty() {
        let report = due_report(&Snapshot::default(), day(2024, 2, 2));
        assert_snapshot!(format_due(&report), @r"
        DUE: Friday, Feb 2, 2024

        No metrics due.
        ");
    }

    #[test]
    fn test_due_json_output() {
        let report = due_report(&snapshot(), day(2024, 2, 1));
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["date"], "2024-02-01");
        assert_eq!(json["active_metrics"], 3);
        assert_eq!(json["metrics"][1]["id"], "run");
        assert_eq!(
            json["metrics"][1]["schedule"],
            "every 2 weeks from 2024-02-01"
        );
        assert_eq!(json["metrics"][1]["on_calendar"], true);
    }
}
