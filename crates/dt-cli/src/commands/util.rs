//! Shared utilities for CLI commands.

use std::sync::LazyLock;

use anyhow::Context;
use chrono::{Duration, NaiveDate};
use regex::Regex;

/// Pre-compiled regex for relative day parsing.
static RELATIVE_DAY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)\s+(day|week)s?\s+ago$").unwrap());

/// Pre-compiled regex for `YYYY-MM` months.
static MONTH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{4})-(\d{1,2})$").unwrap());

/// Conservative bound for relative day parsing (~1000 years).
const MAX_RELATIVE_DAYS: i64 = 1000 * 365;

/// Parse a day argument relative to `today`.
///
/// Supports:
/// - Calendar days: "2026-01-15" (timestamps are reduced to their date)
/// - Keywords: "today", "yesterday"
/// - Relative: "3 days ago", "1 week ago"
pub fn parse_day(s: &str, today: NaiveDate) -> anyhow::Result<NaiveDate> {
    let s = s.trim();
    match s {
        "today" => return Ok(today),
        "yesterday" => return Ok(today - Duration::days(1)),
        _ => {}
    }

    if let Some(day) = dt_core::parse_calendar_day(s) {
        return Ok(day);
    }

    let Some(caps) = RELATIVE_DAY_RE.captures(s) else {
        anyhow::bail!(
            "Invalid date: {s}. Use YYYY-MM-DD, 'today', 'yesterday' or relative (e.g., '3 days ago')"
        );
    };

    let n: i64 = caps[1]
        .parse()
        .context("failed to parse number in relative date")?;

    let days_per_unit = match &caps[2] {
        "day" => 1,
        "week" => 7,
        unit => anyhow::bail!("Unknown date unit: {unit}"),
    };

    if n > MAX_RELATIVE_DAYS / days_per_unit {
        anyhow::bail!("Relative date value too large: {n} {}", &caps[2]);
    }

    today
        .checked_sub_signed(Duration::days(n * days_per_unit))
        .with_context(|| format!("date out of range: {s}"))
}

/// Parse a `YYYY-MM` month argument into `(year, month)`.
pub fn parse_month(s: &str) -> anyhow::Result<(i32, u32)> {
    let invalid = || format!("Invalid month: {s}. Use YYYY-MM (e.g., 2026-01)");

    let caps = MONTH_RE.captures(s.trim()).with_context(invalid)?;
    let year: i32 = caps[1].parse().with_context(invalid)?;
    let month: u32 = caps[2].parse().with_context(invalid)?;
    if !(1..=12).contains(&month) {
        anyhow::bail!(invalid());
    }
    Ok((year, month))
}

/// Formats a day for report headers, e.g. "Friday, Mar 1, 2024".
pub fn format_day(day: NaiveDate) -> String {
    day.format("%A, %b %-d, %Y").to_string()
}

/// Generates a 10-character progress bar for a percentage.
/// Any progress above zero gets at least one block.
#[expect(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "percentage is clamped to 0..=100 before rounding"
)]
pub fn progress_bar(percent: f64) -> String {
    let percent = if percent.is_nan() { 0.0 } else { percent.clamp(0.0, 100.0) };
    let filled = if percent > 0.0 && percent < 10.0 {
        1
    } else {
        (percent / 10.0).round() as usize
    };

    format!("{}{}", "█".repeat(filled), "░".repeat(10 - filled))
}
