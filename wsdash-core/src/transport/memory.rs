//! In-process transport driven by explicit controls
//!
//! Sockets opened through [`MemoryTransport`] never touch the network. The
//! controlling side (usually a test) clones the transport and uses
//! [`accept`](MemoryTransport::accept), [`deliver`](MemoryTransport::deliver),
//! [`drop_connection`](MemoryTransport::drop_connection) and friends to
//! play the role of the remote peer for the most recently opened socket.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::{EventSender, Socket, SocketEvent, SocketId, Transport, TransportEvent};
use crate::connection::{CloseInfo, ConnectionState, SharedReadyState, close_codes};

#[derive(Debug)]
struct Entry {
    id: SocketId,
    address: String,
    state: SharedReadyState,
    events: EventSender,
}

impl Entry {
    fn emit(&self, kind: SocketEvent) {
        let _ = self.events.send(TransportEvent::new(self.id, kind));
    }
}

#[derive(Debug, Default)]
struct Inner {
    deferred_close: bool,
    sockets: Vec<Entry>,
}

/// Transport whose sockets are controlled from the same process
#[derive(Debug, Clone, Default)]
pub struct MemoryTransport {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryTransport {
    /// Creates a transport whose `close()` completes immediately
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a transport whose sockets stay `Closing` until
    /// [`finish_close`](Self::finish_close) is called
    #[must_use]
    pub fn with_deferred_close() -> Self {
        let transport = Self::default();
        transport.lock().deferred_close = true;
        transport
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn with_latest<R>(&self, f: impl FnOnce(&Entry) -> R) -> Option<R> {
        let inner = self.lock();
        inner.sockets.last().map(f)
    }

    /// Completes the handshake of the latest socket
    ///
    /// Returns false unless that socket was `Connecting`.
    pub fn accept(&self) -> bool {
        self.with_latest(|entry| {
            let opened = entry
                .state
                .transition(ConnectionState::Connecting, ConnectionState::Open);
            if opened {
                entry.emit(SocketEvent::Open);
            }
            opened
        })
        .unwrap_or(false)
    }

    /// Delivers a payload on the latest socket if it is open
    pub fn deliver(&self, payload: impl AsRef<[u8]>) -> bool {
        self.with_latest(|entry| {
            let open = entry.state.get() == ConnectionState::Open;
            if open {
                entry.emit(SocketEvent::Message(payload.as_ref().to_vec()));
            }
            open
        })
        .unwrap_or(false)
    }

    /// Ends the latest socket from the peer side with `code`
    pub fn drop_connection(&self, code: u16) -> bool {
        self.with_latest(|entry| {
            if entry.state.get() == ConnectionState::Closed {
                return false;
            }
            entry.state.set(ConnectionState::Closed);
            entry.emit(SocketEvent::Close(CloseInfo::new(
                code,
                "",
                code == close_codes::NORMAL,
            )));
            true
        })
        .unwrap_or(false)
    }

    /// Fails the handshake of the latest socket with an error and a 1006 close
    pub fn refuse(&self, reason: &str) -> bool {
        self.with_latest(|entry| {
            let refused = entry
                .state
                .transition(ConnectionState::Connecting, ConnectionState::Closed);
            if refused {
                entry.emit(SocketEvent::Error(reason.to_string()));
                entry.emit(SocketEvent::Close(CloseInfo::abnormal(reason)));
            }
            refused
        })
        .unwrap_or(false)
    }

    /// Completes a deferred close of the latest socket
    pub fn finish_close(&self) -> bool {
        self.with_latest(|entry| {
            let finished = entry
                .state
                .transition(ConnectionState::Closing, ConnectionState::Closed);
            if finished {
                entry.emit(SocketEvent::Close(CloseInfo::normal()));
            }
            finished
        })
        .unwrap_or(false)
    }

    /// Addresses passed to `open`, in order
    #[must_use]
    pub fn opened_addresses(&self) -> Vec<String> {
        self.lock()
            .sockets
            .iter()
            .map(|entry| entry.address.clone())
            .collect()
    }

    /// Number of sockets opened so far
    #[must_use]
    pub fn open_count(&self) -> usize {
        self.lock().sockets.len()
    }

    /// Number of sockets currently `Connecting` or `Open`
    #[must_use]
    pub fn live_count(&self) -> usize {
        self.lock()
            .sockets
            .iter()
            .filter(|entry| entry.state.get().is_live())
            .count()
    }

    /// Readiness of the latest socket, `Closed` when none was opened
    #[must_use]
    pub fn latest_state(&self) -> ConnectionState {
        self.with_latest(|entry| entry.state.get())
            .unwrap_or_default()
    }

    /// Identifier of the latest socket
    #[must_use]
    pub fn latest_id(&self) -> Option<SocketId> {
        self.with_latest(|entry| entry.id)
    }
}

impl Transport for MemoryTransport {
    type Socket = MemorySocket;

    fn open(&mut self, id: SocketId, address: &str, events: EventSender) -> Self::Socket {
        let state = SharedReadyState::new(ConnectionState::Connecting);
        let mut inner = self.lock();
        inner.sockets.push(Entry {
            id,
            address: address.to_string(),
            state: state.clone(),
            events: events.clone(),
        });

        MemorySocket {
            id,
            state,
            events,
            deferred_close: inner.deferred_close,
        }
    }
}

/// Handle to an in-process socket
#[derive(Debug)]
pub struct MemorySocket {
    id: SocketId,
    state: SharedReadyState,
    events: EventSender,
    deferred_close: bool,
}

impl MemorySocket {
    fn finish(&self, info: CloseInfo) {
        self.state.set(ConnectionState::Closed);
        let _ = self
            .events
            .send(TransportEvent::new(self.id, SocketEvent::Close(info)));
    }
}

impl Socket for MemorySocket {
    fn ready_state(&self) -> ConnectionState {
        self.state.get()
    }

    fn close(&mut self) {
        match self.state.get() {
            ConnectionState::Closed | ConnectionState::Closing => {}
            _ if self.deferred_close => self.state.set(ConnectionState::Closing),
            ConnectionState::Open => self.finish(CloseInfo::normal()),
            ConnectionState::Connecting => self.finish(CloseInfo::abnormal(
                "closed before the connection was established",
            )),
        }
    }
}

impl Drop for MemorySocket {
    fn drop(&mut self) {
        if self.state.get() != ConnectionState::Closed {
            self.finish(CloseInfo::abnormal("socket dropped"));
        }
    }
}
