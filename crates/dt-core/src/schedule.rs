//! Recurrence evaluation: is a metric due on a given day?
//!
//! # Rules
//!
//! Evaluated in order, the first applicable rule decides:
//!
//! 1. A schedule whose stored dates could not be read is never due.
//! 2. A schedule with no frequency, bounds or weekdays is due every day.
//! 3. Days before the start date or after the end date are never due
//!    (both bounds inclusive).
//! 4. The frequency decides: `daily` always, `weekly` on listed weekdays (any
//!    day if none are listed), `interval` every N days/weeks/months from the
//!    start date, `custom` only on listed weekdays. Without a frequency,
//!    listed weekdays still restrict the schedule.

use std::fmt;

use chrono::{Datelike, Duration, Months, NaiveDate};
use serde::Serialize;

use crate::day::weekday_number;
use crate::metric::{Metric, Schedule};
use crate::types::{Frequency, IntervalUnit};

const DAY_NAMES: [&str; 7] = [
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];

const WEEKDAYS: WeekdaySet = WeekdaySet(0b011_1110);
const WEEKENDS: WeekdaySet = WeekdaySet(0b100_0001);

/// A set of weekdays numbered `0 = Sunday … 6 = Saturday`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(into = "Vec<u8>")]
pub struct WeekdaySet(u8);

impl WeekdaySet {
    /// The empty set.
    pub const EMPTY: Self = Self(0);

    /// Builds a set from weekday numbers, ignoring anything outside `0..=6`.
    pub fn from_numbers(numbers: impl IntoIterator<Item = i64>) -> Self {
        let bits = numbers
            .into_iter()
            .filter_map(|n| u8::try_from(n).ok().filter(|&n| n <= 6))
            .fold(0u8, |bits, n| bits | (1 << n));
        Self(bits)
    }

    /// Whether the weekday number is in the set.
    pub const fn contains(self, weekday: u8) -> bool {
        weekday <= 6 && self.0 & (1 << weekday) != 0
    }

    /// Whether the day's weekday is in the set.
    pub fn contains_day(self, day: NaiveDate) -> bool {
        self.contains(weekday_number(day))
    }

    #[allow(
        clippy::trivially_copy_pass_by_ref,
        reason = "used as a serde skip_serializing_if predicate"
    )]
    pub const fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub const fn len(self) -> u32 {
        self.0.count_ones()
    }

    /// Weekday numbers in ascending order.
    pub fn iter(self) -> impl Iterator<Item = u8> {
        (0..=6).filter(move |&n| self.contains(n))
    }

    pub fn numbers(self) -> Vec<u8> {
        self.iter().collect()
    }
}

impl From<WeekdaySet> for Vec<u8> {
    fn from(set: WeekdaySet) -> Self {
        set.numbers()
    }
}

impl fmt::Display for WeekdaySet {
    /// Human-readable summary, e.g. "Weekdays" or "Monday, Friday".
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "No days selected");
        }
        match *self {
            s if s.len() == 7 => write!(f, "Every day"),
            WEEKDAYS => write!(f, "Weekdays"),
            WEEKENDS => write!(f, "Weekends"),
            s => {
                let names: Vec<&str> = s
                    .iter()
                    .map(|n| DAY_NAMES[usize::from(n)])
                    .collect();
                write!(f, "{}", names.join(", "))
            }
        }
    }
}

/// Formats a weekday set for display.
pub fn format_schedule_days(days: WeekdaySet) -> String {
    days.to_string()
}

impl Schedule {
    /// Whether the schedule selects `date`.
    pub fn is_due(&self, date: NaiveDate) -> bool {
        if self.malformed_dates {
            return false;
        }
        if self.is_unset() {
            return true;
        }

        if self.start_date.is_some_and(|start| date < start) {
            return false;
        }
        if self.end_date.is_some_and(|end| date > end) {
            return false;
        }

        match self.frequency {
            Some(Frequency::Daily) => true,
            Some(Frequency::Weekly) | None => self.days.is_empty() || self.days.contains_day(date),
            Some(Frequency::Interval) => self.interval_matches(date),
            Some(Frequency::Custom) => !self.days.is_empty() && self.days.contains_day(date),
        }
    }

    fn interval_matches(&self, date: NaiveDate) -> bool {
        let (Some(start), Some(every)) = (self.start_date, self.interval_value) else {
            return false;
        };
        let every = i64::from(every);

        match self.interval_unit.unwrap_or_default() {
            IntervalUnit::Days => {
                let elapsed = (date - start).num_days();
                elapsed >= 0 && elapsed % every == 0
            }
            IntervalUnit::Weeks => {
                let days = (date - start).num_days();
                if days < 0 {
                    return false;
                }
                let weeks = days / 7;
                weeks % every == 0
                    && start.checked_add_signed(Duration::weeks(weeks)) == Some(date)
            }
            IntervalUnit::Months => {
                let Some(months) = months_between(start, date) else {
                    return false;
                };
                i64::from(months) % every == 0
                    && start.checked_add_months(Months::new(months)) == Some(date)
            }
        }
    }
}

/// Calendar months from `start`'s month to `date`'s month, if not negative.
///
/// Only the month a date falls in matters: a re-added anchor can only equal
/// `date` when it lands in the same month, and anchors clamp to month end.
fn months_between(start: NaiveDate, date: NaiveDate) -> Option<u32> {
    let index = |d: NaiveDate| i64::from(d.year()) * 12 + i64::from(d.month0());
    u32::try_from(index(date) - index(start)).ok()
}

/// Whether `metric` is due on `date`.
pub fn is_due(metric: &Metric, date: NaiveDate) -> bool {
    metric.schedule.is_due(date)
}

/// Whether `metric` shows up on the calendar for `date`.
///
/// Inactive metrics and metrics excluded from calendar tracking never do.
pub fn appears_on_calendar(metric: &Metric, date: NaiveDate) -> bool {
    metric.active && !metric.schedule.excluded_from_calendar && is_due(metric, date)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{MetricId, MetricType};

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn metric() -> Metric {
        Metric::new(MetricId::new("m").unwrap(), "Test", MetricType::Number)
    }

    fn interval(start: NaiveDate, every: u32, unit: IntervalUnit) -> Metric {
        let mut m = metric();
        m.schedule.frequency = Some(Frequency::Interval);
        m.schedule.start_date = Some(start);
        m.schedule.interval_value = Some(every);
        m.schedule.interval_unit = Some(unit);
        m
    }

    #[test]
    fn unscheduled_metric_is_always_due() {
        let m = metric();
        for offset in 0..60 {
            assert!(is_due(&m, day(2024, 1, 1) + Duration::days(offset)));
        }
    }

    #[test]
    fn bounds_are_inclusive() {
        let mut m = metric();
        m.schedule.frequency = Some(Frequency::Daily);
        m.schedule.start_date = Some(day(2024, 3, 10));
        m.schedule.end_date = Some(day(2024, 3, 20));

        assert!(!is_due(&m, day(2024, 3, 9)));
        assert!(is_due(&m, day(2024, 3, 10)));
        assert!(is_due(&m, day(2024, 3, 15)));
        assert!(is_due(&m, day(2024, 3, 20)));
        assert!(!is_due(&m, day(2024, 3, 21)));
    }

    #[test]
    fn bounds_apply_without_frequency() {
        let mut m = metric();
        m.schedule.end_date = Some(day(2024, 3, 20));
        assert!(is_due(&m, day(2024, 1, 1)));
        assert!(!is_due(&m, day(2024, 3, 21)));
    }

    #[test]
    fn interval_every_three_days() {
        let m = interval(day(2024, 1, 1), 3, IntervalUnit::Days);

        assert!(is_due(&m, day(2024, 1, 1)));
        assert!(is_due(&m, day(2024, 1, 4)));
        assert!(is_due(&m, day(2024, 1, 7)));
        assert!(!is_due(&m, day(2024, 1, 2)));
        assert!(!is_due(&m, day(2024, 1, 3)));
        assert!(!is_due(&m, day(2024, 1, 5)));
        assert!(!is_due(&m, day(2023, 12, 29)));
    }

    #[test]
    fn interval_unit_defaults_to_days() {
        let mut m = interval(day(2024, 1, 1), 2, IntervalUnit::Days);
        m.schedule.interval_unit = None;
        assert!(is_due(&m, day(2024, 1, 3)));
        assert!(!is_due(&m, day(2024, 1, 4)));
    }

    #[test]
    fn interval_requires_start_and_value() {
        let mut m = interval(day(2024, 1, 1), 3, IntervalUnit::Days);
        m.schedule.interval_value = None;
        assert!(!is_due(&m, day(2024, 1, 1)));

        let mut m = interval(day(2024, 1, 1), 3, IntervalUnit::Days);
        m.schedule.start_date = None;
        assert!(!is_due(&m, day(2024, 1, 1)));
    }

    #[test]
    fn interval_every_two_weeks() {
        // 2024-01-03 is a Wednesday
        let m = interval(day(2024, 1, 3), 2, IntervalUnit::Weeks);

        assert!(is_due(&m, day(2024, 1, 3)));
        assert!(!is_due(&m, day(2024, 1, 10)));
        assert!(is_due(&m, day(2024, 1, 17)));
        assert!(!is_due(&m, day(2024, 1, 18)));
        assert!(is_due(&m, day(2024, 1, 31)));
    }

    #[test]
    fn interval_monthly_anchors_on_start_day() {
        let m = interval(day(2024, 1, 15), 1, IntervalUnit::Months);

        assert!(is_due(&m, day(2024, 1, 15)));
        assert!(is_due(&m, day(2024, 2, 15)));
        assert!(!is_due(&m, day(2024, 2, 14)));
        assert!(!is_due(&m, day(2024, 2, 16)));
        assert!(is_due(&m, day(2025, 1, 15)));
    }

    #[test]
    fn interval_months_clamp_to_month_end() {
        let m = interval(day(2024, 1, 31), 1, IntervalUnit::Months);

        assert!(is_due(&m, day(2024, 2, 29)));
        assert!(!is_due(&m, day(2024, 3, 1)));
        assert!(is_due(&m, day(2024, 3, 31)));
        assert!(is_due(&m, day(2024, 4, 30)));
    }

    #[test]
    fn interval_every_three_months() {
        let m = interval(day(2024, 1, 10), 3, IntervalUnit::Months);

        assert!(!is_due(&m, day(2024, 2, 10)));
        assert!(!is_due(&m, day(2024, 3, 10)));
        assert!(is_due(&m, day(2024, 4, 10)));
        assert!(is_due(&m, day(2024, 7, 10)));
    }

    #[test]
    fn weekly_mon_wed_fri() {
        let mut m = metric();
        m.schedule.frequency = Some(Frequency::Weekly);
        m.schedule.days = WeekdaySet::from_numbers([1, 3, 5]);

        // 2024-01-08 is a Monday
        let expected = [true, false, true, false, true, false, false];
        for (offset, due) in expected.iter().enumerate() {
            let date = day(2024, 1, 8) + Duration::days(i64::try_from(offset).unwrap());
            assert_eq!(is_due(&m, date), *due, "{date}");
        }
    }

    #[test]
    fn weekly_without_days_is_every_day() {
        let mut m = metric();
        m.schedule.frequency = Some(Frequency::Weekly);
        assert!(is_due(&m, day(2024, 1, 9)));
    }

    #[test]
    fn custom_without_days_is_never_due() {
        let mut m = metric();
        m.schedule.frequency = Some(Frequency::Custom);
        assert!(!is_due(&m, day(2024, 1, 9)));

        m.schedule.days = WeekdaySet::from_numbers([0]);
        assert!(is_due(&m, day(2024, 1, 7)));
        assert!(!is_due(&m, day(2024, 1, 8)));
    }

    #[test]
    fn days_without_frequency_restrict_schedule() {
        let mut m = metric();
        m.schedule.days = WeekdaySet::from_numbers([6]);
        assert!(is_due(&m, day(2024, 1, 13)));
        assert!(!is_due(&m, day(2024, 1, 12)));
    }

    #[test]
    fn calendar_opt_out_does_not_change_due_days() {
        let mut m = metric();
        m.schedule.excluded_from_calendar = true;
        assert!(is_due(&m, day(2024, 1, 1)));
        assert!(!appears_on_calendar(&m, day(2024, 1, 1)));
    }

    #[test]
    fn inactive_metric_is_not_on_calendar() {
        let mut m = metric();
        m.active = false;
        assert!(!appears_on_calendar(&m, day(2024, 1, 1)));
    }

    #[test]
    fn weekday_set_ignores_out_of_range() {
        let set = WeekdaySet::from_numbers([-1, 0, 3, 7, 42]);
        assert_eq!(set.numbers(), vec![0, 3]);
        assert_eq!(set.len(), 2);
        assert!(!set.contains(7));
    }

    #[test]
    fn weekday_set_serializes_sorted() {
        let set = WeekdaySet::from_numbers([5, 1]);
        assert_eq!(serde_json::to_string(&set).unwrap(), "[1,5]");
    }

    fn parse(json: &str) -> Metric {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn custom_with_only_opt_out_entry_is_never_due() {
        let m = parse(r#"{"id": "m", "type": "text", "schedule_frequency": "custom", "schedule_days": [-1]}"#);
        assert!(m.schedule.days.is_empty());
        for offset in 0..7 {
            assert!(!is_due(&m, day(2024, 1, 7) + Duration::days(offset)));
        }
    }

    #[test]
    fn weekly_with_only_opt_out_entry_is_every_day() {
        let m = parse(r#"{"id": "m", "type": "text", "schedule_frequency": "weekly", "schedule_days": [-1]}"#);
        for offset in 0..7 {
            let date = day(2024, 1, 7) + Duration::days(offset);
            assert!(is_due(&m, date));
            assert!(!appears_on_calendar(&m, date));
        }
    }

    #[test]
    fn opt_out_entry_does_not_match_a_weekday() {
        // -1 must not wrap around to Saturday.
        let m = parse(r#"{"id": "m", "type": "text", "schedule_frequency": "custom", "schedule_days": [0, -1]}"#);
        assert!(is_due(&m, day(2024, 1, 7)));
        assert!(!is_due(&m, day(2024, 1, 13)));
    }

    #[test]
    fn malformed_dates_are_never_due() {
        let m = parse(r#"{"id": "m", "type": "number", "schedule_end_date": "2024-02-30"}"#);
        assert!(!is_due(&m, day(2024, 1, 1)));
        assert!(!appears_on_calendar(&m, day(2024, 1, 1)));

        let m = parse(r#"{"id": "m", "type": "number", "schedule_frequency": "daily", "schedule_start_date": "next week"}"#);
        assert!(!is_due(&m, day(2024, 1, 1)));
    }

    #[test]
    fn formats_schedule_days() {
        assert_eq!(format_schedule_days(WeekdaySet::EMPTY), "No days selected");
        assert_eq!(
            format_schedule_days(WeekdaySet::from_numbers(0..7)),
            "Every day"
        );
        assert_eq!(
            format_schedule_days(WeekdaySet::from_numbers([1, 2, 3, 4, 5])),
            "Weekdays"
        );
        assert_eq!(
            format_schedule_days(WeekdaySet::from_numbers([6, 0])),
            "Weekends"
        );
        assert_eq!(
            format_schedule_days(WeekdaySet::from_numbers([5, 1])),
            "Monday, Friday"
        );
    }
}
