//! Streak calculation.
//!
//! # Algorithm Summary
//!
//! 1. Decide per log whether it counts as completed ([`CompletionCriteria`])
//! 2. Group the metric's logs by calendar day; a day is completed when any of
//!    its logs is (duplicate logs for a day are tolerated)
//! 3. Current streak: walk backward from the reference day (or from the last
//!    logged day when that was yesterday) while days are logged and completed
//! 4. Longest streak: scan logged days oldest first, counting runs of
//!    completed days that are exactly one calendar day apart

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::goal::{Goal, GoalConfig, HasGoal, evaluate_goal};
use crate::metric::{DailyLog, Metric};
use crate::types::{MetricId, MetricType};

/// Decides whether a single log counts toward a streak.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionCriteria {
    pub value_type: MetricType,

    /// Goal used when a log carries no override of its own.
    pub goal: Option<Goal>,

    /// Completion means logging exactly zero ("keep it at zero" metrics).
    pub zero_target: bool,
}

impl CompletionCriteria {
    /// Criteria for a value type with no goal.
    pub const fn new(value_type: MetricType) -> Self {
        Self {
            value_type,
            goal: None,
            zero_target: false,
        }
    }

    #[must_use]
    pub fn with_goal(mut self, goal: Option<Goal>) -> Self {
        self.goal = goal;
        self
    }

    /// Criteria derived from a metric's type and default goal.
    pub fn for_metric(metric: &Metric) -> Self {
        Self {
            value_type: metric.metric_type,
            goal: metric.goal(),
            zero_target: metric.is_zero_target(),
        }
    }

    /// Whether `log` counts as completed.
    ///
    /// Boolean metrics need a `true` value. Otherwise the resolved goal
    /// decides, and without a goal any positive value counts (or exactly zero
    /// for zero-target metrics).
    pub fn is_completed(&self, log: &DailyLog, config: &GoalConfig) -> bool {
        let value = log.parsed_value(self.value_type);

        if self.value_type == MetricType::Boolean {
            return value.is_true();
        }

        if let Some(goal) = log.goal().or_else(|| self.goal.clone()) {
            return evaluate_goal(self.value_type, &value, &goal, config)
                .is_some_and(|p| p.satisfied);
        }

        let n = value.as_number();
        if self.zero_target { n == 0.0 } else { n > 0.0 }
    }
}

/// Current and longest run of completed days.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Streaks {
    pub current: u32,
    pub longest: u32,
}

/// Calculate streaks for one metric.
///
/// `logs` may contain logs of other metrics; only those for `metric_id` are
/// considered. `as_of` is the reference day for the current streak.
pub fn compute_streaks(
    logs: &[DailyLog],
    metric_id: &MetricId,
    criteria: &CompletionCriteria,
    as_of: NaiveDate,
    config: &GoalConfig,
) -> Streaks {
    let mut days: BTreeMap<NaiveDate, bool> = BTreeMap::new();
    for log in logs.iter().filter(|log| &log.metric_id == metric_id) {
        let completed = criteria.is_completed(log, config);
        *days.entry(log.date).or_insert(false) |= completed;
    }

    let Some(&last_logged) = days.keys().next_back() else {
        return Streaks::default();
    };

    Streaks {
        current: current_streak(&days, last_logged, as_of),
        longest: longest_streak(&days),
    }
}

fn current_streak(days: &BTreeMap<NaiveDate, bool>, last_logged: NaiveDate, as_of: NaiveDate) -> u32 {
    let gap = (as_of - last_logged).num_days();
    if gap > 1 {
        return 0;
    }

    // Today not logged yet: yesterday's run still counts.
    let mut cursor = if gap == 1 { last_logged } else { as_of };
    let mut streak = 0;
    while days.get(&cursor).copied().unwrap_or(false) {
        streak += 1;
        match cursor.pred_opt() {
            Some(prev) => cursor = prev,
            None => break,
        }
    }
    streak
}

fn longest_streak(days: &BTreeMap<NaiveDate, bool>) -> u32 {
    let mut longest = 0;
    let mut run = 0;
    let mut prev: Option<NaiveDate> = None;

    for (&day, &completed) in days {
        if completed {
            let adjacent = prev.is_some_and(|p| (day - p).num_days() == 1);
            run = if adjacent { run + 1 } else { 1 };
            longest = longest.max(run);
        } else {
            run = 0;
        }
        prev = Some(day);
    }

    longest
}
