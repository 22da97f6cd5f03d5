//! `wsdash` Core Library
//!
//! Core of the `wsdash` live-data monitor: a WebSocket connection lifecycle
//! manager with automatic reconnect, a persisted endpoint list, a bounded
//! reading log and JSON/CSV export.
//!
//! # Crate Structure
//!
//! - [`connection`] - Lifecycle manager, reconnect policy, callbacks
//! - [`transport`] - Socket abstraction with WebSocket and in-memory backends
//! - [`models`] / [`endpoint`] - Endpoint records and the persisted list
//! - [`config`] - Settings and TOML persistence
//! - [`readings`] - Parsed messages and the bounded log
//! - [`export`] - JSON and CSV rendering
//! - [`dashboard`] - Glue between the manager, the list and the log

#![warn(missing_docs)]

pub mod config;
pub mod connection;
pub mod dashboard;
pub mod endpoint;
pub mod error;
pub mod export;
pub mod models;
pub mod readings;
pub mod tracing;
pub mod transport;

pub use config::{AppSettings, ConfigManager, EndpointFile, LogSettings, LoggingSettings};
pub use connection::{
    Callbacks, CloseInfo, CloseKind, ConnectionState, LifecycleManager, ReconnectPolicy,
    RetryTimer, close_codes,
};
pub use dashboard::{ConnectionStatus, Dashboard, SessionEvent, SessionStats, session_callbacks};
pub use endpoint::EndpointManager;
pub use error::{
    ConfigError, ConfigResult, SessionError, SessionResult, WsDashError, WsDashResult,
};
pub use export::{ExportError, ExportFormat, ExportResult, Record};
pub use models::Endpoint;
pub use readings::{EntryKind, LogEntry, Reading, ReadingLog};
pub use tracing::{
    TracingConfig, TracingError, TracingLevel, TracingOutput, TracingResult, get_tracing_config,
    init_tracing, is_tracing_initialized, span_names,
};
pub use transport::{
    MemoryTransport, Socket, SocketEvent, SocketId, Transport, TransportEvent, WebSocketTransport,
    is_valid_address,
};
