//! Engine configuration
//!
//! Loaded from a JSON file. Every field has a default, so `{}` is a valid
//! configuration.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::observability::{log_event, Event, Logger, Severity};

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Read(#[from] std::io::Error),

    #[error("Invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Engine configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Action tree step budget
    #[serde(default = "default_max_steps")]
    pub max_steps: u64,

    /// Minimum log severity (trace, info, warn, error, fatal)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// View type of the default predicate for non-schema views
    #[serde(default = "default_view")]
    pub default_view: String,
}

fn default_max_steps() -> u64 {
    1000
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_view() -> String {
    "table".to_string()
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_steps: default_max_steps(),
            log_level: default_log_level(),
            default_view: default_view(),
        }
    }
}

impl EngineConfig {
    /// Load configuration from file
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = fs::read_to_string(path)?;
        let config: EngineConfig = serde_json::from_str(&content)?;
        config.validate()?;

        log_event(
            Event::ConfigLoaded,
            &[
                ("max_steps", config.max_steps.to_string().as_str()),
                ("path", path.to_string_lossy().as_ref()),
            ],
        );
        Ok(config)
    }

    /// Validate field values
    pub fn validate(&self) -> ConfigResult<()> {
        if self.max_steps == 0 {
            return Err(ConfigError::Invalid("max_steps must be > 0".into()));
        }
        if self.default_view.is_empty() {
            return Err(ConfigError::Invalid("default_view must not be empty".into()));
        }
        self.severity().map(|_| ())
    }

    /// Configured minimum log severity
    pub fn severity(&self) -> ConfigResult<Severity> {
        Severity::parse(&self.log_level).ok_or_else(|| {
            ConfigError::Invalid(format!("Unknown log_level: '{}'", self.log_level))
        })
    }

    /// Apply the log level to the process-wide logger
    pub fn apply_logging(&self) -> ConfigResult<()> {
        Logger::set_min_severity(self.severity()?);
        Ok(())
    }
}
