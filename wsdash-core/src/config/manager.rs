//! Configuration directory and file persistence

use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::settings::AppSettings;
use crate::error::{ConfigError, ConfigResult};
use crate::models::Endpoint;

/// Environment variable overriding the configuration directory
pub const CONFIG_DIR_ENV: &str = "WSDASH_CONFIG_DIR";

const APP_DIR_NAME: &str = "wsdash";
const ENDPOINTS_FILE: &str = "endpoints.toml";
const SETTINGS_FILE: &str = "settings.toml";

/// On-disk layout of `endpoints.toml`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointFile {
    /// Index of the selected endpoint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active: Option<usize>,
    /// Saved endpoints in display order
    #[serde(default)]
    pub endpoints: Vec<Endpoint>,
}

/// Loads and saves configuration files
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config_dir: PathBuf,
}

impl ConfigManager {
    /// Creates a manager for the default directory
    ///
    /// Uses `$WSDASH_CONFIG_DIR` when set, otherwise `<config dir>/wsdash`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NoConfigDir`] when the platform has no
    /// configuration directory.
    pub fn new() -> ConfigResult<Self> {
        if let Some(dir) = std::env::var_os(CONFIG_DIR_ENV).filter(|dir| !dir.is_empty()) {
            return Ok(Self::with_config_dir(PathBuf::from(dir)));
        }
        let base = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(Self::with_config_dir(base.join(APP_DIR_NAME)))
    }

    /// Creates a manager for an explicit directory
    #[must_use]
    pub const fn with_config_dir(config_dir: PathBuf) -> Self {
        Self { config_dir }
    }

    /// Configuration directory
    #[must_use]
    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    /// Path of `endpoints.toml`
    #[must_use]
    pub fn endpoints_path(&self) -> PathBuf {
        self.config_dir.join(ENDPOINTS_FILE)
    }

    /// Path of `settings.toml`
    #[must_use]
    pub fn settings_path(&self) -> PathBuf {
        self.config_dir.join(SETTINGS_FILE)
    }

    /// Loads the endpoint list; a missing file yields an empty list
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load_endpoints(&self) -> ConfigResult<EndpointFile> {
        self.load_toml(&self.endpoints_path())
    }

    /// Saves the endpoint list
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    pub fn save_endpoints(&self, file: &EndpointFile) -> ConfigResult<()> {
        self.save_toml(&self.endpoints_path(), file)?;
        info!(count = file.endpoints.len(), active = ?file.active, "Saved endpoints");
        Ok(())
    }

    /// Loads settings; a missing file yields defaults
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or validated.
    pub fn load_settings(&self) -> ConfigResult<AppSettings> {
        let settings: AppSettings = self.load_toml(&self.settings_path())?;
        settings.validate()?;
        Ok(settings)
    }

    /// Saves settings
    ///
    /// # Errors
    ///
    /// Returns an error if validation, serialization or writing fails.
    pub fn save_settings(&self, settings: &AppSettings) -> ConfigResult<()> {
        settings.validate()?;
        self.save_toml(&self.settings_path(), settings)
    }

    /// Validates an endpoint before it is stored
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] for a blank name or bad address.
    pub fn validate_endpoint(endpoint: &Endpoint) -> ConfigResult<()> {
        endpoint.validate()
    }

    fn load_toml<T: DeserializeOwned + Default>(&self, path: &Path) -> ConfigResult<T> {
        let _span = tracing::debug_span!(
            crate::tracing::span_names::CONFIG_LOAD,
            path = %path.display()
        )
        .entered();

        if !path.exists() {
            debug!("Config file missing, using defaults");
            return Ok(T::default());
        }

        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    fn save_toml<T: Serialize>(&self, path: &Path, value: &T) -> ConfigResult<()> {
        let _span = tracing::debug_span!(
            crate::tracing::span_names::CONFIG_SAVE,
            path = %path.display()
        )
        .entered();

        fs::create_dir_all(&self.config_dir).map_err(|source| ConfigError::Io {
            path: self.config_dir.clone(),
            source,
        })?;

        let content =
            toml::to_string_pretty(value).map_err(|e| ConfigError::Serialize(e.to_string()))?;

        let tmp_path = path.with_extension("toml.tmp");
        fs::write(&tmp_path, content).map_err(|source| ConfigError::Io {
            path: tmp_path.clone(),
            source,
        })?;
        fs::rename(&tmp_path, path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        debug!("Config file written");
        Ok(())
    }
}
