//! Dashboard glue around the lifecycle manager
//!
//! The manager reports through callbacks. [`session_callbacks`] turns those
//! into [`SessionEvent`]s on a channel so the owner of the manager can feed
//! them back into a [`Dashboard`], which keeps the endpoint list, the reading
//! log and the visible connection status in step.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use serde_json::Value;
use tokio::sync::mpsc;
use tracing::debug;

use crate::connection::{Callbacks, CloseInfo, ConnectionState, LifecycleManager};
use crate::endpoint::EndpointManager;
use crate::error::{ConfigError, ConfigResult, SessionError, SessionResult, WsDashResult};
use crate::export::{self, ExportFormat, ExportResult};
use crate::models::Endpoint;
use crate::readings::{LogEntry, Reading, ReadingLog};
use crate::transport::Transport;

/// Callback invocations forwarded as values
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// `on_open`
    Opened,
    /// `on_message`
    Reading(Value),
    /// `on_close`
    Closed(CloseInfo),
    /// `on_error`
    Error(String),
}

/// Builds callbacks that forward every invocation over `sender`
///
/// Sends fail silently once the receiver is gone.
#[must_use]
pub fn session_callbacks(sender: mpsc::UnboundedSender<SessionEvent>) -> Callbacks {
    let on_open = sender.clone();
    let on_message = sender.clone();
    let on_close = sender.clone();
    let on_error = sender;

    Callbacks::new()
        .on_open(move || {
            let _ = on_open.send(SessionEvent::Opened);
        })
        .on_message(move |value| {
            let _ = on_message.send(SessionEvent::Reading(value));
        })
        .on_close(move |info| {
            let _ = on_close.send(SessionEvent::Closed(info.clone()));
        })
        .on_error(move |message| {
            let _ = on_error.send(SessionEvent::Error(message.to_string()));
        })
}

/// Connection status shown to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ConnectionStatus {
    /// Not connected
    #[default]
    Disconnected,
    /// Connect requested
    Connecting,
    /// Connection open
    Connected,
    /// Last event was an error
    Error,
}

impl ConnectionStatus {
    /// Status label
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Disconnected => "Disconnected",
            Self::Connecting => "Connecting...",
            Self::Connected => "Connected",
            Self::Error => "Error",
        }
    }
}

impl std::fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Counters for the current watch session
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionStats {
    /// When the current connection opened
    pub connected_since: Option<DateTime<Local>>,
    /// Readings received
    pub readings: u64,
    /// Errors reported
    pub errors: u64,
    /// Connections opened
    pub opens: u64,
    /// Connections closed
    pub closes: u64,
}

impl SessionStats {
    /// Seconds the current connection has been open
    #[must_use]
    pub fn uptime_seconds(&self) -> i64 {
        self.connected_since
            .map_or(0, |since| (Local::now() - since).num_seconds().max(0))
    }

    /// Formats a duration in seconds as `1h 2m 3s`, `2m 3s` or `3s`
    #[must_use]
    pub fn format_duration(total_seconds: i64) -> String {
        let total_seconds = total_seconds.max(0);
        let hours = total_seconds / 3600;
        let minutes = (total_seconds % 3600) / 60;
        let seconds = total_seconds % 60;

        if hours > 0 {
            format!("{hours}h {minutes}m {seconds}s")
        } else if minutes > 0 {
            format!("{minutes}m {seconds}s")
        } else {
            format!("{seconds}s")
        }
    }
}

/// Endpoint list, reading log and visible status for one session
#[derive(Debug)]
pub struct Dashboard {
    endpoints: EndpointManager,
    log: ReadingLog,
    status: ConnectionStatus,
    stats: SessionStats,
    session_name: Option<String>,
}

impl Dashboard {
    /// Creates a dashboard
    #[must_use]
    pub fn new(endpoints: EndpointManager, log: ReadingLog) -> Self {
        Self {
            endpoints,
            log,
            status: ConnectionStatus::Disconnected,
            stats: SessionStats::default(),
            session_name: None,
        }
    }

    /// Endpoint list
    #[must_use]
    pub const fn endpoints(&self) -> &EndpointManager {
        &self.endpoints
    }

    /// Reading log
    #[must_use]
    pub const fn log(&self) -> &ReadingLog {
        &self.log
    }

    /// Visible connection status
    #[must_use]
    pub const fn status(&self) -> ConnectionStatus {
        self.status
    }

    /// Session counters
    #[must_use]
    pub const fn stats(&self) -> &SessionStats {
        &self.stats
    }

    /// Connects the manager to the selected endpoint
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::NoActiveEndpoint`] when nothing is selected.
    pub fn connect_active<T: Transport>(
        &mut self,
        manager: &mut LifecycleManager<T>,
    ) -> SessionResult<()> {
        let endpoint = self
            .endpoints
            .active()
            .cloned()
            .ok_or(SessionError::NoActiveEndpoint)?;

        self.status = ConnectionStatus::Connecting;
        self.session_name = Some(endpoint.name.clone());
        manager.connect(&endpoint.address);
        Ok(())
    }

    /// Disconnects when open, connects to the selected endpoint otherwise
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::NoActiveEndpoint`] when a connect is needed
    /// and nothing is selected.
    pub fn toggle<T: Transport>(&mut self, manager: &mut LifecycleManager<T>) -> SessionResult<()> {
        if manager.current_state() == ConnectionState::Open {
            self.disconnect(manager);
            Ok(())
        } else {
            self.connect_active(manager)
        }
    }

    /// Disconnects and cancels any pending reconnect
    ///
    /// Returns false when there was nothing to stop.
    pub fn disconnect<T: Transport>(&mut self, manager: &mut LifecycleManager<T>) -> bool {
        let active = manager.current_state() != ConnectionState::Closed || manager.retry_pending();
        manager.disconnect();
        if active {
            self.status = ConnectionStatus::Disconnected;
            self.log.push_system("Disconnected manually.");
        }
        active
    }

    /// Selects another endpoint
    ///
    /// An open connection to the previous endpoint is closed; the new
    /// selection is used by the next connect. Returns false when `index` was
    /// already selected.
    ///
    /// # Errors
    ///
    /// Returns an error for an unknown index or when saving fails.
    pub fn select<T: Transport>(
        &mut self,
        index: usize,
        manager: &mut LifecycleManager<T>,
    ) -> WsDashResult<bool> {
        let name = self
            .endpoints
            .get(index)
            .map(|e| e.name.clone())
            .ok_or(SessionError::EndpointNotFound(index))?;

        if self.endpoints.active_index() == Some(index) {
            return Ok(false);
        }

        if manager.current_state() == ConnectionState::Open {
            manager.disconnect();
        }
        self.endpoints.select(index)?;
        self.log.push_system(format!(
            "Selected endpoint: {name}. Connect to start receiving data."
        ));
        Ok(true)
    }

    /// Adds a new endpoint (and selects it) or, when `editing`, replaces the
    /// selected one
    ///
    /// Returns the index of the saved endpoint.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a blank name, bad or duplicate
    /// address, or when editing with nothing selected.
    pub fn save_endpoint(
        &mut self,
        name: &str,
        address: &str,
        editing: bool,
    ) -> ConfigResult<usize> {
        let endpoint = Endpoint::new(name, address);
        if editing {
            let index = self.endpoints.active_index().ok_or_else(|| {
                ConfigError::validation("endpoint", "no endpoint selected to edit")
            })?;
            self.endpoints.update(index, endpoint)?;
            Ok(index)
        } else {
            self.endpoints.add(endpoint)
        }
    }

    /// Deletes the selected endpoint, disconnecting first if needed
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::NoActiveEndpoint`] when nothing is selected,
    /// or a config error when saving fails.
    pub fn delete_active<T: Transport>(
        &mut self,
        manager: &mut LifecycleManager<T>,
    ) -> WsDashResult<Endpoint> {
        let index = self
            .endpoints
            .active_index()
            .ok_or(SessionError::NoActiveEndpoint)?;

        if manager.current_state() != ConnectionState::Closed {
            manager.disconnect();
        }
        Ok(self.endpoints.delete(index)?)
    }

    /// Applies a forwarded callback and returns the log entry it produced
    pub fn apply(&mut self, event: SessionEvent) -> &LogEntry {
        debug!(?event, "Applying session event");
        match event {
            SessionEvent::Opened => {
                self.status = ConnectionStatus::Connected;
                self.stats.opens += 1;
                self.stats.connected_since = Some(Local::now());
                let name = self
                    .session_name
                    .clone()
                    .or_else(|| self.endpoints.active().map(|e| e.name.clone()))
                    .unwrap_or_else(|| "endpoint".to_string());
                self.log.push_system(format!("Connected to {name}."))
            }
            SessionEvent::Reading(value) => {
                self.stats.readings += 1;
                self.log.push_reading(Reading::from_value(value))
            }
            SessionEvent::Closed(info) => {
                self.status = ConnectionStatus::Disconnected;
                self.stats.closes += 1;
                self.stats.connected_since = None;
                self.log
                    .push_system(format!("Connection closed. Code: {}", info.code))
            }
            SessionEvent::Error(message) => {
                self.status = ConnectionStatus::Error;
                self.stats.errors += 1;
                self.log.push_error(message)
            }
        }
    }

    /// Empties the log and records that it was cleared
    pub fn clear_log(&mut self) {
        self.log.clear();
        self.log.push_system("Log cleared.");
    }

    /// Renders the logged readings
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::EmptyLog`](crate::export::ExportError::EmptyLog)
    /// when no readings are logged.
    pub fn export(&self, format: ExportFormat) -> ExportResult<String> {
        export::render(&self.log.records(), format)
    }

    /// Writes the logged readings to `path` (a file or a directory)
    ///
    /// # Errors
    ///
    /// Returns an error when the log is empty or writing fails.
    pub fn export_to(&self, format: ExportFormat, path: &Path) -> ExportResult<PathBuf> {
        export::write_export(&self.log.records(), format, path)
    }
}
