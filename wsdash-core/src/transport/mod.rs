//! Transport boundary used by the lifecycle manager
//!
//! A [`Transport`] opens sockets. Each [`Socket`] is a handle that reports
//! its readiness and can be asked to close; everything else it has to say
//! (open, payloads, close, errors) arrives as [`TransportEvent`]s on the
//! channel passed to [`Transport::open`], tagged with the socket's
//! [`SocketId`] so late events from a replaced socket can be told apart.
//!
//! Two implementations ship with the crate:
//!
//! - [`WebSocketTransport`] - `tokio-tungstenite` client, one task per socket
//! - [`MemoryTransport`] - in-process sockets driven by test controls

mod memory;
mod websocket;

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use tokio::sync::mpsc;

use crate::connection::{CloseInfo, ConnectionState};

pub use memory::MemoryTransport;
pub use websocket::WebSocketTransport;

/// Identifier assigned to each opened socket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SocketId(pub u64);

impl fmt::Display for SocketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// What happened on a socket
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SocketEvent {
    /// Handshake completed
    Open,
    /// A text or binary frame arrived
    Message(Vec<u8>),
    /// The socket is finished; always the last event for a socket
    Close(CloseInfo),
    /// Something went wrong; a `Close` follows
    Error(String),
}

/// A socket event tagged with its origin
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportEvent {
    /// Socket that produced the event
    pub socket: SocketId,
    /// The event itself
    pub kind: SocketEvent,
}

impl TransportEvent {
    /// Creates a tagged event
    #[must_use]
    pub const fn new(socket: SocketId, kind: SocketEvent) -> Self {
        Self { socket, kind }
    }
}

/// Sending half of the transport event channel
pub type EventSender = mpsc::UnboundedSender<TransportEvent>;

/// Receiving half of the transport event channel
pub type EventReceiver = mpsc::UnboundedReceiver<TransportEvent>;

/// Opens sockets to an address
pub trait Transport {
    /// Handle type returned by [`Transport::open`]
    type Socket: Socket;

    /// Starts a connection attempt and returns its handle immediately
    ///
    /// Never fails synchronously: an unusable address is reported as an
    /// `Error` event followed by a `Close` event.
    fn open(&mut self, id: SocketId, address: &str, events: EventSender) -> Self::Socket;
}

/// Handle to one connection attempt
///
/// Dropping the handle closes the connection.
pub trait Socket {
    /// Current readiness as reported by the transport
    fn ready_state(&self) -> ConnectionState;

    /// Requests closure; a `Close` event follows once it completes
    fn close(&mut self);
}

static ADDRESS_PATTERN: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(
        r"^(ws|wss)://[a-zA-Z0-9.-]+(?::\d+)?(?:/[a-zA-Z0-9\-._~:/?#\[\]@!$&'()*+,;=]*)?$",
    )
    .ok()
});

/// Checks an address against the `ws`/`wss` URI grammar
///
/// Scheme `ws` or `wss`, a host of letters, digits, dots and hyphens, an
/// optional numeric port and an optional path of URI characters.
#[must_use]
pub fn is_valid_address(address: &str) -> bool {
    ADDRESS_PATTERN
        .as_ref()
        .is_some_and(|pattern| pattern.is_match(address))
}
