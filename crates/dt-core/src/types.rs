//! Core type definitions with validation.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Validation errors for core types.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    /// The provided value was empty.
    #[error("{field} cannot be empty")]
    Empty { field: &'static str },

    /// A string did not name a known variant.
    #[error("invalid {field}: {value}")]
    UnknownVariant { field: &'static str, value: String },

    /// The exact-goal tolerance was negative, NaN or infinite.
    #[error("exact tolerance must be a finite, non-negative fraction, got {value}")]
    ToleranceOutOfRange { value: f64 },
}

/// Generates a validated string ID newtype with common trait implementations.
macro_rules! define_string_id {
    (
        $(#[$meta:meta])*
        $name:ident, $field_name:literal
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Creates a new ID after validation.
            pub fn new(id: impl Into<String>) -> Result<Self, ValidationError> {
                let id = id.into();
                if id.is_empty() {
                    return Err(ValidationError::Empty { field: $field_name });
                }
                Ok(Self(id))
            }

            /// Returns the ID as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl TryFrom<String> for $name {
            type Error = ValidationError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

/// Generates a closed string enum with `as_str`, `Display` and `FromStr`.
macro_rules! define_str_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $field_name:literal {
            $( $(#[$vmeta:meta])* $variant:ident => $text:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "lowercase")]
        pub enum $name {
            $( $(#[$vmeta])* $variant, )+
        }

        impl $name {
            /// String representation used in stored records.
            #[must_use]
            pub const fn as_str(&self) -> &'static str {
                match self {
                    $( Self::$variant => $text, )+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = ValidationError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $( $text => Ok(Self::$variant), )+
                    _ => Err(ValidationError::UnknownVariant {
                        field: $field_name,
                        value: s.to_string(),
                    }),
                }
            }
        }
    };
}

define_string_id!(
    /// A validated metric identifier.
    ///
    /// Metric IDs must be non-empty strings. Uniqueness is the caller's concern.
    MetricId, "metric ID"
);

define_string_id!(
    /// A validated daily log identifier.
    LogId, "log ID"
);

define_str_enum!(
    /// The kind of value a metric records.
    MetricType, "metric type" {
        Number => "number",
        Boolean => "boolean",
        Time => "time",
        Percentage => "percentage",
        Text => "text",
    }
);

impl MetricType {
    /// Whether values of this type compare numerically against goals.
    #[must_use]
    pub const fn is_numeric(self) -> bool {
        matches!(self, Self::Number | Self::Time | Self::Percentage)
    }
}

define_str_enum!(
    /// How a logged value is compared against its goal value.
    GoalKind, "goal type" {
        /// The value must reach the goal.
        Minimum => "minimum",
        /// The value must stay at or below the goal (lower is better).
        Maximum => "maximum",
        /// The value must land within a tolerance of the goal.
        Exact => "exact",
        /// The value must be `true`.
        Boolean => "boolean",
    }
);

define_str_enum!(
    /// Recurrence rule of a metric's schedule.
    Frequency, "schedule frequency" {
        Daily => "daily",
        Weekly => "weekly",
        Interval => "interval",
        Custom => "custom",
    }
);

define_str_enum!(
    /// Unit of an interval schedule.
    IntervalUnit, "interval unit" {
        Days => "days",
        Weeks => "weeks",
        Months => "months",
    }
);

impl Default for IntervalUnit {
    fn default() -> Self {
        Self::Days
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metric_id_rejects_empty() {
        assert!(MetricId::new("").is_err());
        assert!(MetricId::new("water").is_ok());
    }

    #[test]
    fn metric_id_serde_roundtrip() {
        let id = MetricId::new("metric-123").unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"metric-123\"");
        let parsed: MetricId = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn metric_id_serde_rejects_empty() {
        let result: Result<MetricId, _> = serde_json::from_str("\"\"");
        assert!(result.is_err());
    }

    #[test]
    fn log_id_as_ref() {
        let id = LogId::new("log-1").unwrap();
        let s: &str = id.as_ref();
        assert_eq!(s, "log-1");
    }

    #[test]
    fn metric_type_from_str() {
        assert_eq!("number".parse::<MetricType>().unwrap(), MetricType::Number);
        assert_eq!(
            "percentage".parse::<MetricType>().unwrap(),
            MetricType::Percentage
        );
        let err = "duration".parse::<MetricType>().unwrap_err();
        assert_eq!(err.to_string(), "invalid metric type: duration");
    }

    #[test]
    fn metric_type_numeric_classification() {
        assert!(MetricType::Number.is_numeric());
        assert!(MetricType::Time.is_numeric());
        assert!(MetricType::Percentage.is_numeric());
        assert!(!MetricType::Boolean.is_numeric());
        assert!(!MetricType::Text.is_numeric());
    }

    #[test]
    fn goal_kind_serde_uses_lowercase() {
        let json = serde_json::to_string(&GoalKind::Maximum).unwrap();
        assert_eq!(json, "\"maximum\"");
        let parsed: GoalKind = serde_json::from_str("\"exact\"").unwrap();
        assert_eq!(parsed, GoalKind::Exact);
    }

    #[test]
    fn frequency_rejects_unknown() {
        assert!("fortnightly".parse::<Frequency>().is_err());
        assert_eq!("custom".parse::<Frequency>().unwrap(), Frequency::Custom);
    }

    #[test]
    fn interval_unit_defaults_to_days() {
        assert_eq!(IntervalUnit::default(), IntervalUnit::Days);
        assert_eq!(IntervalUnit::Months.to_string(), "months");
    }
}
