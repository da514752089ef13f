//! ---
//! ems_section: "01-core-functionality"
//! ems_subsection: "module"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Shared primitives and utilities for the dashboard runtime."
//! ems_version: "v0.1.0"
//! ems_owner: "tbd"
//! ---
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DurationMilliSeconds};
use thiserror::Error;
use tracing::debug;

use crate::logging::LogFormat;

/// Title rendered in the dashboard header bar.
pub const DEFAULT_TITLE: &str = "Smart Electricity Digital Twin";

/// Period between two reading replacements.
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(3000);

fn default_title() -> String {
    DEFAULT_TITLE.to_owned()
}

fn default_tick_interval() -> Duration {
    DEFAULT_TICK_INTERVAL
}

fn default_logging_directory() -> PathBuf {
    PathBuf::from("target/logs")
}

fn default_log_format() -> LogFormat {
    LogFormat::StructuredJson
}

/// Structural problems detected after a configuration was parsed.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("dashboard.tick_interval_ms must be greater than zero")]
    ZeroTickInterval,
    #[error("dashboard.title must not be empty")]
    EmptyTitle,
}

/// Primary configuration object for the dashboard.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub dashboard: DashboardConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Metadata describing where an [`AppConfig`] was loaded from.
///
/// `source` is `None` when no candidate file existed and defaults were used.
#[derive(Debug, Clone)]
pub struct LoadedAppConfig {
    pub config: AppConfig,
    pub source: Option<PathBuf>,
}

impl AppConfig {
    pub const ENV_CONFIG_PATH: &'static str = "TWIN_CONFIG";
    pub const DEFAULT_PATH: &'static str = "configs/twin.toml";

    /// Load configuration from disk, respecting the `TWIN_CONFIG` override.
    ///
    /// A path named by the environment variable must exist. Plain candidates
    /// are optional; when none of them exists the built-in defaults apply.
    pub fn load_with_source<P: AsRef<Path>>(candidates: &[P]) -> Result<LoadedAppConfig> {
        if let Ok(env_path) = std::env::var(Self::ENV_CONFIG_PATH) {
            if !env_path.trim().is_empty() {
                let path = PathBuf::from(env_path);
                let config = Self::from_path(&path)?;
                return Ok(LoadedAppConfig {
                    config,
                    source: Some(path),
                });
            }
        }

        for candidate in candidates {
            let path = candidate.as_ref();
            if path.exists() {
                let config = Self::from_path(path)?;
                return Ok(LoadedAppConfig {
                    config,
                    source: Some(path.to_path_buf()),
                });
            }
        }

        debug!("no configuration file found, using defaults");
        Ok(LoadedAppConfig {
            config: Self::default(),
            source: None,
        })
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        debug!(config_path = %path.display(), "loading configuration");
        let contents = fs::read_to_string(path)
            .with_context(|| format!("unable to read config file {}", path.display()))?;
        contents
            .parse::<AppConfig>()
            .with_context(|| format!("invalid config file {}", path.display()))
    }

    /// Validate structural invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.dashboard.validate()
    }
}

impl std::str::FromStr for AppConfig {
    type Err = anyhow::Error;

    fn from_str(content: &str) -> std::result::Result<Self, Self::Err> {
        let config: AppConfig =
            toml::from_str(content).with_context(|| "failed to parse configuration")?;
        config.validate()?;
        Ok(config)
    }
}

#[serde_as]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardConfig {
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(rename = "tick_interval_ms", default = "default_tick_interval")]
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    pub tick_interval: Duration,
    /// Fixed RNG seed; entropy-seeded when absent.
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            tick_interval: default_tick_interval(),
            seed: None,
        }
    }
}

impl DashboardConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_interval.is_zero() {
            return Err(ConfigError::ZeroTickInterval);
        }
        if self.title.trim().is_empty() {
            return Err(ConfigError::EmptyTitle);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_logging_directory")]
    pub directory: PathBuf,
    #[serde(default = "default_log_format")]
    pub format: LogFormat,
    #[serde(default)]
    pub file_prefix: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            directory: default_logging_directory(),
            format: default_log_format(),
            file_prefix: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_dashboard_constants() {
        let config = AppConfig::default();
        assert_eq!(config.dashboard.title, "Smart Electricity Digital Twin");
        assert_eq!(config.dashboard.tick_interval, Duration::from_millis(3000));
        assert!(config.dashboard.seed.is_none());
        assert_eq!(config.logging.format, LogFormat::StructuredJson);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn empty_document_uses_defaults() {
        let config: AppConfig = "".parse().unwrap();
        assert_eq!(config.dashboard.tick_interval, DEFAULT_TICK_INTERVAL);
        assert_eq!(config.logging.directory, PathBuf::from("target/logs"));
    }

    #[test]
    fn parses_dashboard_section() {
        let config: AppConfig = r#"
            [dashboard]
            title = "Lab Bench"
            tick_interval_ms = 250
            seed = 7

            [logging]
            format = "pretty"
            file_prefix = "bench"
        "#
        .parse()
        .unwrap();
        assert_eq!(config.dashboard.title, "Lab Bench");
        assert_eq!(config.dashboard.tick_interval, Duration::from_millis(250));
        assert_eq!(config.dashboard.seed, Some(7));
        assert_eq!(config.logging.format, LogFormat::Pretty);
        assert_eq!(config.logging.file_prefix.as_deref(), Some("bench"));
    }

    #[test]
    fn zero_interval_is_rejected() {
        let err = "[dashboard]\ntick_interval_ms = 0\n"
            .parse::<AppConfig>()
            .unwrap_err();
        assert_eq!(
            err.downcast_ref::<ConfigError>(),
            Some(&ConfigError::ZeroTickInterval)
        );
    }

    #[test]
    fn blank_title_is_rejected() {
        let mut config = AppConfig::default();
        config.dashboard.title = "   ".to_owned();
        assert_eq!(config.validate(), Err(ConfigError::EmptyTitle));
    }
}
