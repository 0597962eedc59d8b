//! Typed views of JSON-encoded logged values.

use serde_json::Value;

use crate::types::MetricType;

/// A logged value decoded according to its metric's type.
#[derive(Debug, Clone, PartialEq)]
pub enum LogValue {
    Number(f64),
    Boolean(bool),
    Text(String),
}

impl LogValue {
    /// The value a metric type falls back to when its stored value is malformed.
    pub fn zero(metric_type: MetricType) -> Self {
        match metric_type {
            MetricType::Number | MetricType::Time | MetricType::Percentage => Self::Number(0.0),
            MetricType::Boolean => Self::Boolean(false),
            MetricType::Text => Self::Text(String::new()),
        }
    }

    /// Decode a JSON-encoded stored value.
    ///
    /// Never fails: a value that does not decode for the metric type becomes
    /// that type's zero value.
    pub fn parse(metric_type: MetricType, raw: &str) -> Self {
        let decoded = serde_json::from_str::<Value>(raw).ok();
        let parsed = match metric_type {
            MetricType::Number | MetricType::Time | MetricType::Percentage => {
                decoded.as_ref().and_then(number_from_json).map(Self::Number)
            }
            MetricType::Boolean => decoded.as_ref().and_then(bool_from_json).map(Self::Boolean),
            MetricType::Text => match decoded {
                Some(Value::String(s)) => Some(Self::Text(s)),
                Some(Value::Null) | None => None,
                Some(other) => Some(Self::Text(other.to_string())),
            },
        };

        parsed.unwrap_or_else(|| {
            tracing::debug!(%metric_type, raw, "malformed logged value, using zero value");
            Self::zero(metric_type)
        })
    }

    /// Numeric reading of the value; non-numeric values read as `0`.
    pub fn as_number(&self) -> f64 {
        match self {
            Self::Number(n) => *n,
            Self::Boolean(_) => 0.0,
            Self::Text(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()).unwrap_or(0.0),
        }
    }

    /// Whether the value is exactly boolean `true`.
    pub const fn is_true(&self) -> bool {
        matches!(self, Self::Boolean(true))
    }
}

fn number_from_json(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|n| n.is_finite())
}

fn bool_from_json(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}
