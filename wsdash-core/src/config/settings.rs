//! Application settings stored in `settings.toml`

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::connection::ReconnectPolicy;
use crate::error::{ConfigError, ConfigResult};
use crate::readings::DEFAULT_MAX_ENTRIES;
use crate::tracing::TracingLevel;

/// Top-level settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    /// Reconnect behaviour after unexpected closes
    pub reconnect: ReconnectPolicy,
    /// Reading log settings
    pub log: LogSettings,
    /// Diagnostic logging settings
    pub logging: LoggingSettings,
}

impl AppSettings {
    /// Validates values that serde cannot check on its own
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] for the first bad field.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.log.max_entries == 0 {
            return Err(ConfigError::validation(
                "log.max_entries",
                "must be at least 1",
            ));
        }
        if self.reconnect.delay_ms == 0 {
            return Err(ConfigError::validation(
                "reconnect.delay_ms",
                "must be at least 1",
            ));
        }
        if !self.reconnect.backoff_multiplier.is_finite() {
            return Err(ConfigError::validation(
                "reconnect.backoff_multiplier",
                "must be a finite number",
            ));
        }
        if self.logging.level.parse::<TracingLevel>().is_err() {
            return Err(ConfigError::validation(
                "logging.level",
                format!("unknown level '{}'", self.logging.level),
            ));
        }
        Ok(())
    }
}

/// Reading log settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    /// Entries kept before the oldest are dropped
    pub max_entries: usize,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            max_entries: DEFAULT_MAX_ENTRIES,
        }
    }
}

/// Diagnostic logging settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Level name (`error`, `warn`, `info`, `debug`, `trace`)
    pub level: String,
    /// Log to this file instead of stderr
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
        }
    }
}
