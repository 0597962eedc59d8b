//! Goal resolution and satisfaction.

use serde::Serialize;

use crate::metric::DailyLog;
use crate::types::{GoalKind, MetricType, ValidationError};
use crate::value::LogValue;

/// Goal value that marks a record as goal-less even when a goal type is set.
const NO_GOAL_SENTINEL: &str = "0";

/// A target a logged value is measured against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Goal {
    /// Stringified goal value.
    pub value: String,
    pub kind: GoalKind,
}

impl Goal {
    pub fn new(value: impl Into<String>, kind: GoalKind) -> Self {
        Self {
            value: value.into(),
            kind,
        }
    }

    /// Numeric reading of the goal value; unparseable values read as `0`.
    pub fn numeric_value(&self) -> f64 {
        LogValue::parse(MetricType::Number, &self.value).as_number()
    }

    /// Resolves the goal for a log: the log's own override when it has one,
    /// otherwise the record's default goal.
    pub fn resolve(default: &impl HasGoal, log: Option<&DailyLog>) -> Option<Self> {
        log.and_then(HasGoal::goal).or_else(|| default.goal())
    }
}

/// A record that may carry a goal (metrics carry defaults, logs carry overrides).
pub trait HasGoal {
    /// The stringified goal value, if any.
    fn goal_value(&self) -> Option<&str>;

    /// The goal kind, if any.
    fn goal_kind(&self) -> Option<GoalKind>;

    /// Whether the record carries a usable goal.
    ///
    /// An empty goal value or the literal `"0"` means "no goal".
    fn has_goal(&self) -> bool {
        self.goal().is_some()
    }

    /// The record's goal, if it has one.
    fn goal(&self) -> Option<Goal> {
        let value = self.goal_value()?;
        let kind = self.goal_kind()?;
        if value.is_empty() || value == NO_GOAL_SENTINEL {
            return None;
        }
        Some(Goal::new(value, kind))
    }
}

/// Settings shared by every goal evaluation.
///
/// Has no `Default`: callers whose results are compared must agree on one
/// exact-goal tolerance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GoalConfig {
    exact_tolerance: f64,
}

impl GoalConfig {
    /// Creates a config with the given `exact` tolerance, a fraction of the goal value.
    pub fn new(exact_tolerance: f64) -> Result<Self, ValidationError> {
        if !exact_tolerance.is_finite() || exact_tolerance < 0.0 {
            return Err(ValidationError::ToleranceOutOfRange {
                value: exact_tolerance,
            });
        }
        Ok(Self { exact_tolerance })
    }

    pub const fn exact_tolerance(&self) -> f64 {
        self.exact_tolerance
    }
}

/// Outcome of comparing one value against one goal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GoalProgress {
    pub satisfied: bool,
    /// Progress toward the goal, in `0..=100`.
    pub progress: f64,
}

impl GoalProgress {
    fn new(satisfied: bool, progress: f64) -> Self {
        let progress = if progress.is_nan() {
            0.0
        } else {
            progress.clamp(0.0, 100.0)
        };
        Self {
            satisfied,
            progress,
        }
    }
}

/// Compares a logged value against a goal.
///
/// Returns `None` when the goal kind does not apply to the value type:
/// numeric kinds only apply to number, time and percentage metrics, and the
/// boolean kind only to boolean metrics.
pub fn evaluate_goal(
    value_type: MetricType,
    value: &LogValue,
    goal: &Goal,
    config: &GoalConfig,
) -> Option<GoalProgress> {
    match goal.kind {
        GoalKind::Boolean => {
            if value_type != MetricType::Boolean {
                return None;
            }
            let done = value.is_true();
            Some(GoalProgress::new(done, if done { 100.0 } else { 0.0 }))
        }
        kind if value_type.is_numeric() => {
            let current = value.as_number();
            let target = goal.numeric_value();
            Some(evaluate_numeric(kind, current, target, config))
        }
        _ => None,
    }
}

fn evaluate_numeric(kind: GoalKind, current: f64, target: f64, config: &GoalConfig) -> GoalProgress {
    match kind {
        GoalKind::Minimum => {
            let progress = if target == 0.0 {
                0.0
            } else {
                (current / target * 100.0).min(100.0)
            };
            GoalProgress::new(current >= target, progress)
        }
        GoalKind::Maximum => {
            let progress = if target == 0.0 {
                100.0
            } else {
                100.0 - current / target * 100.0
            };
            GoalProgress::new(current <= target, progress)
        }
        GoalKind::Exact => {
            let diff = (current - target).abs();
            let tolerance = target.abs() * config.exact_tolerance;
            let progress = if tolerance == 0.0 {
                if diff == 0.0 { 100.0 } else { 0.0 }
            } else {
                100.0 - diff / tolerance * 100.0
            };
            GoalProgress::new(diff <= tolerance, progress)
        }
        GoalKind::Boolean => GoalProgress::new(false, 0.0),
    }
}

/// Display label for a value measured against a goal, e.g. `"8/10 (min)"`.
///
/// Percentages carry a `%` suffix and other metrics their unit. Returns
/// `None` when the goal kind does not apply to the value type.
pub fn describe_goal(
    value_type: MetricType,
    unit: Option<&str>,
    value: &LogValue,
    goal: &Goal,
) -> Option<String> {
    if goal.kind == GoalKind::Boolean {
        return (value_type == MetricType::Boolean).then(|| {
            if value.is_true() {
                "Completed".to_string()
            } else {
                "Not completed".to_string()
            }
        });
    }
    if !value_type.is_numeric() {
        return None;
    }

    let suffix = match (value_type, unit) {
        (MetricType::Percentage, _) => "%".to_string(),
        (_, Some(unit)) if !unit.is_empty() => format!(" {unit}"),
        _ => String::new(),
    };
    let tag = match goal.kind {
        GoalKind::Minimum => "min",
        GoalKind::Maximum => "max",
        GoalKind::Exact | GoalKind::Boolean => "exact",
    };

    Some(format!(
        "{}{suffix}/{}{suffix} ({tag})",
        value.as_number(),
        goal.numeric_value()
    ))
}
