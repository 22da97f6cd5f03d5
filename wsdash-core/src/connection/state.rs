//! Connection readiness states

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};

use serde::{Deserialize, Serialize};

/// Readiness of a transport connection
///
/// Mirrors the four readiness values a WebSocket reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionState {
    /// No connection, or the connection has finished closing
    #[default]
    Closed,
    /// Handshake in progress
    Connecting,
    /// Connected and receiving
    Open,
    /// Closure requested but not yet complete
    Closing,
}

impl ConnectionState {
    /// Returns the lowercase name used in status output
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Closed => "closed",
            Self::Connecting => "connecting",
            Self::Open => "open",
            Self::Closing => "closing",
        }
    }

    /// Returns true for `Connecting` and `Open`
    #[must_use]
    pub const fn is_live(self) -> bool {
        matches!(self, Self::Connecting | Self::Open)
    }

    const fn to_u8(self) -> u8 {
        match self {
            Self::Closed => 0,
            Self::Connecting => 1,
            Self::Open => 2,
            Self::Closing => 3,
        }
    }

    const fn from_u8(value: u8) -> Self {
        match value {
            1 => Self::Connecting,
            2 => Self::Open,
            3 => Self::Closing,
            _ => Self::Closed,
        }
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Readiness cell shared between a socket handle and its I/O task
///
/// The I/O side writes, the handle side reads. Cloning shares the cell.
#[derive(Debug, Clone)]
pub struct SharedReadyState(Arc<AtomicU8>);

impl SharedReadyState {
    /// Creates a cell holding `state`
    #[must_use]
    pub fn new(state: ConnectionState) -> Self {
        Self(Arc::new(AtomicU8::new(state.to_u8())))
    }

    /// Reads the current state
    #[must_use]
    pub fn get(&self) -> ConnectionState {
        ConnectionState::from_u8(self.0.load(Ordering::SeqCst))
    }

    /// Stores a new state
    pub fn set(&self, state: ConnectionState) {
        self.0.store(state.to_u8(), Ordering::SeqCst);
    }

    /// Stores `next` only if the cell currently holds `current`
    ///
    /// Returns true when the swap happened.
    pub fn transition(&self, current: ConnectionState, next: ConnectionState) -> bool {
        self.0
            .compare_exchange(
                current.to_u8(),
                next.to_u8(),
                Ordering::SeqCst,
                Ordering::SeqCst,
            )
            .is_ok()
    }
}
