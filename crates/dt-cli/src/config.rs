//! Configuration loading and management.

use std::path::{Path, PathBuf};

use dt_core::{GoalConfig, ValidationError};
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};

/// Tolerance for `exact` goals, as a fraction of the goal value.
pub const DEFAULT_EXACT_TOLERANCE: f64 = 0.05;

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// JSON array of metric definitions.
    pub metrics_path: PathBuf,

    /// JSON array of daily logs.
    pub logs_path: PathBuf,

    /// Accepted deviation for `exact` goals, as a fraction of the goal value.
    pub exact_tolerance: f64,
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = dirs_data_path().unwrap_or_else(|| PathBuf::from("."));
        Self {
            metrics_path: data_dir.join("metrics.json"),
            logs_path: data_dir.join("daily_logs.json"),
            exact_tolerance: DEFAULT_EXACT_TOLERANCE,
        }
    }
}

impl Config {
    /// Loads configuration, optionally from a specific file.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(config_dir) = dirs_config_path() {
            figment = figment.merge(Toml::file(config_dir.join("config.toml")));
        }

        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        // DT_METRICS_PATH, DT_LOGS_PATH, DT_EXACT_TOLERANCE
        figment = figment.merge(Env::prefixed("DT_"));

        figment.extract()
    }

    /// Goal evaluation settings derived from this config.
    pub fn goal_config(&self) -> Result<GoalConfig, ValidationError> {
        GoalConfig::new(self.exact_tolerance)
    }
}

/// Returns the platform-specific config directory for dt.
fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("dt"))
}

/// Returns the platform-specific data directory for dt.
///
/// On Linux: `~/.local/share/dt`
pub fn dirs_data_path() -> Option<PathBuf> {
    dirs::data_dir().map(|p| p.join("dt"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dirs_data_path_ends_with_dt() {
        let path = dirs_data_path().unwrap();
        assert_eq!(path.file_name().unwrap(), "dt");
    }

    #[test]
    fn test_default_config_uses_data_dir() {
        let config = Config::default();
        let data_dir = dirs_data_path().unwrap();
        assert_eq!(config.metrics_path, data_dir.join("metrics.json"));
        assert_eq!(config.logs_path, data_dir.join("daily_logs.json"));
    }

    #[test]
    fn test_config_file_overrides_defaults() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("dt.toml");
        std::fs::write(
            &path,
            "metrics_path = \"/data/metrics.json\"\nexact_tolerance = 0.5\n",
        )
        .unwrap();

        let config = Config::load_from(Some(&path)).unwrap();
        assert_eq!(config.metrics_path, PathBuf::from("/data/metrics.json"));
        assert!((config.exact_tolerance - 0.5).abs() < f64::EPSILON);
        assert!(config.goal_config().is_ok());
    }

    #[test]
    fn test_negative_tolerance_is_rejected() {
        let config = Config {
            exact_tolerance: -0.1,
            ..Config::default()
        };
        assert!(config.goal_config().is_err());
    }
}
