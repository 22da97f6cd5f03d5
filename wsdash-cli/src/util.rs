//! Shared utility functions used across command modules.

use std::path::Path;

use wsdash_core::config::ConfigManager;
use wsdash_core::endpoint::EndpointManager;
use wsdash_core::tracing::{TracingConfig, TracingLevel, init_tracing};

use crate::error::CliError;

/// Creates a `ConfigManager` using the optional custom config directory
/// from CLI args.
pub fn create_config_manager(config_path: Option<&Path>) -> Result<ConfigManager, CliError> {
    match config_path {
        Some(path) => Ok(ConfigManager::with_config_dir(path.to_path_buf())),
        None => ConfigManager::new()
            .map_err(|e| CliError::Config(format!("Failed to initialize config: {e}"))),
    }
}

/// Loads the saved endpoint list
pub fn load_endpoints(config_path: Option<&Path>) -> Result<EndpointManager, CliError> {
    let config_manager = create_config_manager(config_path)?;
    EndpointManager::new(config_manager)
        .map_err(|e| CliError::Config(format!("Failed to load endpoints: {e}")))
}

/// Sets up logging from the verbosity flags and the `[logging]` settings
///
/// `-v`/`-q` win. Otherwise stderr gets warnings only, unless the settings
/// name a log file, which then receives the configured level.
pub fn init_logging(config_path: Option<&Path>, verbose: u8, quiet: bool) {
    let config = if quiet {
        TracingConfig::new().with_level(TracingLevel::Error)
    } else if verbose > 0 {
        TracingConfig::new().with_level(TracingLevel::from_verbosity(verbose))
    } else {
        settings_tracing_config(config_path)
            .unwrap_or_else(|| TracingConfig::new().with_level(TracingLevel::Warn))
    };

    if let Err(e) = init_tracing(&config.with_target(verbose > 1)) {
        eprintln!("Warning: {e}");
    }
}

fn settings_tracing_config(config_path: Option<&Path>) -> Option<TracingConfig> {
    let settings = create_config_manager(config_path)
        .ok()?
        .load_settings()
        .ok()?;
    settings.logging.file.as_ref()?;
    TracingConfig::from_settings(&settings.logging).ok()
}
