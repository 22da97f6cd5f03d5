//! Configuration management for `wsdash`
//!
//! This module provides the `ConfigManager` for loading and saving
//! configuration files in TOML format.

mod manager;
pub mod settings;

pub use manager::{CONFIG_DIR_ENV, ConfigManager, EndpointFile};
pub use settings::{AppSettings, LogSettings, LoggingSettings};
