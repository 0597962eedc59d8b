//! Core domain logic for the daily tracker.
//!
//! This crate contains the pure evaluation rules behind the tracker views:
//! - Recurrence: deciding whether a metric is due on a calendar day
//! - Goals: measuring a logged value against a minimum/maximum/exact/boolean target
//! - Streaks: current and longest runs of completed days
//! - Summaries: per-day aggregates for the calendar grid
//!
//! Everything works on calendar days ([`chrono::NaiveDate`]); timestamps are
//! reduced to their date when records are deserialized.

pub mod day;
pub mod goal;
pub mod metric;
pub mod schedule;
pub mod streak;
pub mod summary;
pub mod types;
pub mod value;

pub use day::{parse_calendar_day, weekday_number};
pub use goal::{Goal, GoalConfig, GoalProgress, HasGoal, describe_goal, evaluate_goal};
pub use metric::{DailyLog, Metric, Schedule};
pub use schedule::{WeekdaySet, appears_on_calendar, format_schedule_days, is_due};
pub use streak::{CompletionCriteria, Streaks, compute_streaks};
pub use summary::{
    DaySummary, MetricWithLog, completed_goals_count, day_summary, is_log_meaningful,
    metrics_with_goals, month_summaries,
};
pub use types::{
    Frequency, GoalKind, IntervalUnit, LogId, MetricId, MetricType, ValidationError,
};
pub use value::LogValue;
