//! CLI error types and exit codes.

use wsdash_core::error::{ConfigError, ExportError, SessionError, WsDashError};

/// Exit codes for CLI operations
pub mod exit_codes {
    /// General error - configuration, validation, export or I/O errors
    pub const GENERAL_ERROR: i32 = 1;
    /// Connection failure - the endpoint could not be found or reached
    pub const CONNECTION_FAILURE: i32 = 2;
}

/// CLI error type
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Endpoint not found
    #[error("Endpoint not found: {0}")]
    EndpointNotFound(String),

    /// Export error
    #[error("Export error: {0}")]
    Export(String),

    /// Connection error
    #[error("Connection error: {0}")]
    Connection(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<ExportError> for CliError {
    fn from(err: ExportError) -> Self {
        Self::Export(err.to_string())
    }
}

impl From<SessionError> for CliError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::UnknownEndpoint(query) => Self::EndpointNotFound(query),
            SessionError::EndpointNotFound(index) => Self::EndpointNotFound(format!("#{index}")),
            SessionError::NoActiveEndpoint => Self::Connection(err.to_string()),
            SessionError::AmbiguousEndpoint { .. } => Self::Config(err.to_string()),
        }
    }
}

impl From<WsDashError> for CliError {
    fn from(err: WsDashError) -> Self {
        match err {
            WsDashError::Config(e) => e.into(),
            WsDashError::Export(e) => e.into(),
            WsDashError::Session(e) => e.into(),
            WsDashError::Io(e) => Self::Io(e),
        }
    }
}

impl CliError {
    /// Returns the appropriate exit code for this error type.
    ///
    /// Exit codes:
    /// - 0: Success (not an error)
    /// - 1: General error (configuration, validation, export, IO)
    /// - 2: Connection failure (endpoint not found, connection failed)
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::EndpointNotFound(_) | Self::Connection(_) => exit_codes::CONNECTION_FAILURE,
            Self::Config(_) | Self::Export(_) | Self::Io(_) => exit_codes::GENERAL_ERROR,
        }
    }
}
