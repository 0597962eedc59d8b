//! Calendar-day normalization.
//!
//! Every comparison in this crate happens between calendar days. Stored
//! records may carry full timestamps, so they are reduced to a `NaiveDate`
//! (the date component as written, offset and time-of-day dropped) before
//! any equality or ordering test.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer};

/// Parse a stored date into a calendar day.
///
/// Supports:
/// - Plain dates: "2024-01-15"
/// - RFC 3339 timestamps: "2024-01-15T23:30:00-05:00" (yields 2024-01-15)
/// - Naive timestamps: "2024-01-15 08:00:00", "2024-01-15T08:00:00.000"
pub fn parse_calendar_day(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if let Ok(day) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(day);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }
    ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .map(|dt| dt.date())
}

/// Weekday number of a day, `0 = Sunday … 6 = Saturday`.
#[expect(
    clippy::cast_possible_truncation,
    reason = "num_days_from_sunday is always in 0..7"
)]
pub fn weekday_number(day: NaiveDate) -> u8 {
    day.weekday().num_days_from_sunday() as u8
}

/// Serde adapter for required calendar-day fields.
pub fn deserialize_day<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    parse_calendar_day(&s)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid calendar day: {s}")))
}
