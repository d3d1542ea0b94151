//! Configuration management for sprintboard.
//!
//! Configuration is a small YAML file. Every field has a default, so a
//! partial file (or none at all) is valid.
//!
//! ```yaml
//! sprint-length-days: 14
//! log-filter: sprintboard=info
//! output:
//!   color: true
//! ```

use crate::error::{Error, Result};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::fs;

/// Default sprint length used by the CLI when it creates sprints
pub const DEFAULT_SPRINT_LENGTH_DAYS: u32 = 14;

/// Longest sprint the configuration accepts, in days
pub const MAX_SPRINT_LENGTH_DAYS: u32 = 3650;

/// Default tracing filter when `RUST_LOG` is unset
pub const DEFAULT_LOG_FILTER: &str = "sprintboard=info";

/// Configuration file structure for sprintboard
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "kebab-case")]
pub struct TrackerConfig {
    /// Length of sprints created by the CLI, in days
    pub sprint_length_days: u32,

    /// Tracing filter directive
    pub log_filter: String,

    /// Output settings
    pub output: OutputSettings,
}

/// Output configuration section
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct OutputSettings {
    /// Colorize text output (`NO_COLOR` still wins)
    pub color: bool,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self { color: true }
    }
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            sprint_length_days: DEFAULT_SPRINT_LENGTH_DAYS,
            log_filter: DEFAULT_LOG_FILTER.to_string(),
            output: OutputSettings::default(),
        }
    }
}

impl TrackerConfig {
    /// Load configuration from a file
    pub async fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).await?;
        Self::from_yaml(&content)
    }

    /// Load configuration from `path` if given, defaults otherwise
    pub async fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path).await,
            None => Ok(Self::default()),
        }
    }

    /// Parse configuration from YAML text
    pub fn from_yaml(content: &str) -> Result<Self> {
        let config: Self =
            serde_yaml::from_str(content).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a file
    pub async fn save(&self, path: &Path) -> Result<()> {
        let content =
            serde_yaml::to_string(self).map_err(|e| Error::Config(format!("YAML error: {}", e)))?;
        fs::write(path, content).await?;
        Ok(())
    }

    /// End of a sprint of the configured length starting at `start`.
    ///
    /// `None` if the end falls outside the representable calendar.
    pub fn sprint_end(&self, start: DateTime<Utc>) -> Option<DateTime<Utc>> {
        Duration::try_days(i64::from(self.sprint_length_days))
            .and_then(|length| start.checked_add_signed(length))
    }

    fn validate(&self) -> Result<()> {
        if self.sprint_length_days == 0 {
            return Err(Error::Config(
                "sprint-length-days must be at least 1".to_string(),
            ));
        }
        if self.sprint_length_days > MAX_SPRINT_LENGTH_DAYS {
            return Err(Error::Config(format!(
                "sprint-length-days must be at most {MAX_SPRINT_LENGTH_DAYS}"
            )));
        }
        if self.log_filter.trim().is_empty() {
            return Err(Error::Config("log-filter cannot be empty".to_string()));
        }
        Ok(())
    }
}
