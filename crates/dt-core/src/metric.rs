//! Metric definitions and daily log records.

use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::day::{deserialize_day, parse_calendar_day};
use crate::goal::HasGoal;
use crate::schedule::WeekdaySet;
use crate::types::{Frequency, GoalKind, IntervalUnit, LogId, MetricId, MetricType};
use crate::value::LogValue;

/// Legacy `schedule_days` entry that opted a metric out of the calendar.
const LEGACY_CALENDAR_OPT_OUT: i64 = -1;

/// Recurrence configuration of a metric.
///
/// All fields are optional; a schedule with nothing set is due every day.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Schedule {
    #[serde(rename = "schedule_frequency", skip_serializing_if = "Option::is_none")]
    pub frequency: Option<Frequency>,

    /// First due day (inclusive).
    #[serde(rename = "schedule_start_date", skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,

    /// Last due day (inclusive).
    #[serde(rename = "schedule_end_date", skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,

    #[serde(rename = "schedule_days", skip_serializing_if = "WeekdaySet::is_empty")]
    pub days: WeekdaySet,

    /// Interval length for `interval` schedules; always at least 1 when set.
    #[serde(rename = "schedule_interval_value", skip_serializing_if = "Option::is_none")]
    pub interval_value: Option<u32>,

    /// Interval unit; `days` when not set.
    #[serde(rename = "schedule_interval_unit", skip_serializing_if = "Option::is_none")]
    pub interval_unit: Option<IntervalUnit>,

    /// Hidden from calendar views regardless of the recurrence rule.
    pub excluded_from_calendar: bool,

    /// A stored start or end date could not be read; such a schedule is never due.
    #[serde(skip)]
    pub malformed_dates: bool,
}

impl Schedule {
    /// Whether no recurrence field is set at all.
    pub const fn is_unset(&self) -> bool {
        !self.malformed_dates
            && self.frequency.is_none()
            && self.start_date.is_none()
            && self.end_date.is_none()
            && self.days.is_empty()
    }
}

/// A tracked quantity definition.
///
/// Deserialization accepts both the current record shape and legacy records
/// whose `schedule_days` carry the `-1` calendar opt-out entry; the entry is
/// migrated into [`Schedule::excluded_from_calendar`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "MetricRecord")]
pub struct Metric {
    pub id: MetricId,

    #[serde(default)]
    pub name: String,

    #[serde(rename = "type")]
    pub metric_type: MetricType,

    /// Display unit (e.g. "h", "glasses").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,

    /// JSON-encoded value used when no log exists for a day.
    #[serde(default)]
    pub default_value: String,

    #[serde(default = "default_active")]
    pub active: bool,

    #[serde(flatten)]
    pub schedule: Schedule,

    /// Default goal value, stringified.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub goal_value: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub goal_type: Option<GoalKind>,
}

impl Metric {
    /// Creates an active metric with no schedule and no goal.
    pub fn new(id: MetricId, name: impl Into<String>, metric_type: MetricType) -> Self {
        Self {
            id,
            name: name.into(),
            metric_type,
            unit: None,
            default_value: String::new(),
            active: true,
            schedule: Schedule::default(),
            goal_value: None,
            goal_type: None,
        }
    }

    /// Whether the metric tracks "keep it at zero": its goal value is literally `"0"`.
    pub fn is_zero_target(&self) -> bool {
        self.goal_value.as_deref() == Some("0")
    }

    /// The metric's default value decoded for its type.
    pub fn default_log_value(&self) -> LogValue {
        LogValue::parse(self.metric_type, &self.default_value)
    }
}

impl HasGoal for Metric {
    fn goal_value(&self) -> Option<&str> {
        self.goal_value.as_deref()
    }

    fn goal_kind(&self) -> Option<GoalKind> {
        self.goal_type
    }
}

/// One recorded value for a metric on a calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyLog {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<LogId>,

    /// The calendar day; timestamps are reduced to their date on input.
    #[serde(deserialize_with = "deserialize_day")]
    pub date: NaiveDate,

    pub metric_id: MetricId,

    /// JSON-encoded value matching the metric's type.
    #[serde(deserialize_with = "deserialize_encoded")]
    pub value: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,

    /// Per-entry goal override.
    #[serde(
        default,
        deserialize_with = "deserialize_optional_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub goal_value: Option<String>,

    #[serde(
        default,
        deserialize_with = "deserialize_lenient_goal_kind",
        skip_serializing_if = "Option::is_none"
    )]
    pub goal_type: Option<GoalKind>,
}

impl DailyLog {
    /// Creates a log without notes or goal override.
    pub fn new(metric_id: MetricId, date: NaiveDate, value: impl Into<String>) -> Self {
        Self {
            id: None,
            date,
            metric_id,
            value: value.into(),
            notes: None,
            goal_value: None,
            goal_type: None,
        }
    }

    /// The logged value decoded for the given metric type.
    pub fn parsed_value(&self, metric_type: MetricType) -> LogValue {
        LogValue::parse(metric_type, &self.value)
    }

    /// Whether the log carries non-blank notes.
    pub fn has_notes(&self) -> bool {
        self.notes.as_deref().is_some_and(|n| !n.trim().is_empty())
    }
}

impl HasGoal for DailyLog {
    fn goal_value(&self) -> Option<&str> {
        self.goal_value.as_deref()
    }

    fn goal_kind(&self) -> Option<GoalKind> {
        self.goal_type
    }
}

const fn default_active() -> bool {
    true
}

/// Wire shape of a metric, current or legacy.
#[derive(Deserialize)]
struct MetricRecord {
    id: MetricId,
    #[serde(default)]
    name: String,
    #[serde(rename = "type")]
    metric_type: MetricType,
    #[serde(default)]
    unit: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_text")]
    default_value: Option<String>,
    #[serde(default = "default_active")]
    active: bool,
    #[serde(default)]
    schedule_frequency: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_text")]
    schedule_start_date: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_text")]
    schedule_end_date: Option<String>,
    #[serde(default)]
    schedule_days: Option<Vec<i64>>,
    #[serde(default)]
    schedule_interval_value: Option<i64>,
    #[serde(default)]
    schedule_interval_unit: Option<String>,
    #[serde(default)]
    excluded_from_calendar: bool,
    #[serde(default, deserialize_with = "deserialize_optional_text")]
    goal_value: Option<String>,
    #[serde(default)]
    goal_type: Option<String>,
}

impl From<MetricRecord> for Metric {
    fn from(record: MetricRecord) -> Self {
        let id = record.id;

        let raw_days = record.schedule_days.unwrap_or_default();
        let legacy_opt_out = raw_days.contains(&LEGACY_CALENDAR_OPT_OUT);
        let weekdays: Vec<i64> = raw_days
            .into_iter()
            .filter(|&d| d != LEGACY_CALENDAR_OPT_OUT)
            .collect();
        if weekdays.iter().any(|d| !(0..=6).contains(d)) {
            tracing::warn!(metric = %id, days = ?weekdays, "dropping out-of-range schedule days");
        }
        let days = WeekdaySet::from_numbers(weekdays);

        let interval_value = record.schedule_interval_value.and_then(|v| {
            let value = u32::try_from(v).ok().filter(|&v| v >= 1);
            if value.is_none() {
                tracing::warn!(metric = %id, value = v, "ignoring invalid interval value");
            }
            value
        });

        let start_date = schedule_date(&id, "schedule_start_date", record.schedule_start_date);
        let end_date = schedule_date(&id, "schedule_end_date", record.schedule_end_date);

        let schedule = Schedule {
            frequency: lenient_parse(&id, record.schedule_frequency),
            start_date: start_date.unwrap_or_default(),
            end_date: end_date.unwrap_or_default(),
            days,
            interval_value,
            interval_unit: lenient_parse(&id, record.schedule_interval_unit),
            excluded_from_calendar: record.excluded_from_calendar || legacy_opt_out,
            malformed_dates: start_date.is_err() || end_date.is_err(),
        };

        Self {
            goal_type: lenient_parse(&id, record.goal_type),
            id,
            name: record.name,
            metric_type: record.metric_type,
            unit: record.unit.filter(|u| !u.is_empty()),
            default_value: record.default_value.unwrap_or_default(),
            active: record.active,
            schedule,
            goal_value: record.goal_value,
        }
    }
}

/// Reads an optional schedule bound; blank means unset, unreadable is `Err`.
fn schedule_date(
    metric: &MetricId,
    field: &'static str,
    raw: Option<String>,
) -> Result<Option<NaiveDate>, ()> {
    let Some(raw) = raw.filter(|s| !s.trim().is_empty()) else {
        return Ok(None);
    };
    match parse_calendar_day(&raw) {
        Some(day) => Ok(Some(day)),
        None => {
            tracing::warn!(
                %metric,
                field,
                value = %raw,
                "unreadable schedule date, metric will not be due"
            );
            Err(())
        }
    }
}

/// Parses an optional enum string, dropping unknown values with a warning.
fn lenient_parse<T>(metric: &MetricId, raw: Option<String>) -> Option<T>
where
    T: FromStr<Err = crate::types::ValidationError>,
{
    let raw = raw.filter(|s| !s.is_empty())?;
    match raw.parse() {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!(%metric, error = %e, "ignoring unknown schedule or goal setting");
            None
        }
    }
}

/// Accepts a JSON-encoded string or any raw JSON value (re-encoded).
fn deserialize_encoded<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        other => other.to_string(),
    })
}

/// Accepts a string, number or boolean as text; `null` means absent.
fn deserialize_optional_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s),
        Some(other) => Some(other.to_string()),
    })
}

fn deserialize_lenient_goal_kind<'de, D>(deserializer: D) -> Result<Option<GoalKind>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.filter(|s| !s.is_empty()).and_then(|s| match s.parse() {
        Ok(kind) => Some(kind),
        Err(e) => {
            tracing::warn!(error = %e, "ignoring unknown goal override");
            None
        }
    }))
}
