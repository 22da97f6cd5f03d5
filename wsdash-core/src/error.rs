//! Error types for `wsdash`
//!
//! Each concern has its own `thiserror` enum and `Result` alias.
//! [`WsDashError`] wraps them for callers that deal with several at once.

use std::path::PathBuf;

use thiserror::Error;

pub use crate::export::{ExportError, ExportResult};

/// Errors raised while loading, saving or validating configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A value failed validation
    #[error("Invalid {field}: {reason}")]
    Validation {
        /// Name of the offending field
        field: String,
        /// Human-readable explanation
        reason: String,
    },

    /// A configuration file could not be parsed
    #[error("Failed to parse {}: {reason}", path.display())]
    Parse {
        /// File that failed to parse
        path: PathBuf,
        /// Parser message
        reason: String,
    },

    /// Serialization of configuration data failed
    #[error("Failed to serialize configuration: {0}")]
    Serialize(String),

    /// Reading or writing a configuration file failed
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        /// File or directory involved
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// No platform configuration directory could be determined
    #[error("Could not determine the configuration directory")]
    NoConfigDir,
}

impl ConfigError {
    /// Shorthand for a [`ConfigError::Validation`]
    #[must_use]
    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors raised by the dashboard glue around a live session
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// Connect was requested with no endpoint selected
    #[error("No active endpoint to connect to")]
    NoActiveEndpoint,

    /// An endpoint index was out of range
    #[error("Endpoint #{0} does not exist")]
    EndpointNotFound(usize),

    /// No endpoint matched a name, address or index
    #[error("No endpoint matches '{0}'")]
    UnknownEndpoint(String),

    /// A name prefix matched more than one endpoint
    #[error("'{query}' is ambiguous. Matches: {}", matches.join(", "))]
    AmbiguousEndpoint {
        /// The text that was looked up
        query: String,
        /// Names of every matching endpoint
        matches: Vec<String>,
    },
}

/// Result type for session operations
pub type SessionResult<T> = Result<T, SessionError>;

/// Umbrella error for the crate
#[derive(Debug, Error)]
pub enum WsDashError {
    /// Configuration error
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Export error
    #[error(transparent)]
    Export(#[from] ExportError),

    /// Session error
    #[error(transparent)]
    Session(#[from] SessionError),

    /// Plain I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type using the umbrella error
pub type WsDashResult<T> = Result<T, WsDashError>;
