//! Connection lifecycle manager
//!
//! [`LifecycleManager`] owns at most one socket at a time. It reconnects
//! after unexpected closes and never after a close requested through
//! [`disconnect`](LifecycleManager::disconnect). All transitions happen in
//! `&mut self` methods driven by [`process_next`](LifecycleManager::process_next)
//! (or [`handle_event`](LifecycleManager::handle_event) for callers that pump
//! the events themselves).

use serde_json::Value;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use super::callbacks::Callbacks;
use super::retry::{ReconnectPolicy, RetryTimer};
use super::state::ConnectionState;
use crate::tracing::span_names;
use crate::transport::{
    EventReceiver, EventSender, Socket, SocketEvent, SocketId, Transport, TransportEvent,
};

/// Reconnect-with-retry state machine around a single transport connection
pub struct LifecycleManager<T: Transport> {
    transport: T,
    policy: ReconnectPolicy,
    callbacks: Callbacks,
    socket: Option<(SocketId, T::Socket)>,
    next_socket_id: u64,
    address: Option<String>,
    manually_closed: bool,
    retry: Option<RetryTimer>,
    attempt: u32,
    events_tx: EventSender,
    events_rx: EventReceiver,
}

impl<T: Transport> LifecycleManager<T> {
    /// Creates a manager with the default reconnect policy
    #[must_use]
    pub fn new(transport: T) -> Self {
        Self::with_policy(transport, ReconnectPolicy::default())
    }

    /// Creates a manager with a custom reconnect policy
    #[must_use]
    pub fn with_policy(transport: T, policy: ReconnectPolicy) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            transport,
            policy,
            callbacks: Callbacks::default(),
            socket: None,
            next_socket_id: 0,
            address: None,
            manually_closed: false,
            retry: None,
            attempt: 0,
            events_tx,
            events_rx,
        }
    }

    /// Replaces the registered callbacks
    pub fn configure(&mut self, callbacks: Callbacks) {
        self.callbacks = callbacks;
    }

    /// Returns the reconnect policy
    #[must_use]
    pub const fn policy(&self) -> &ReconnectPolicy {
        &self.policy
    }

    /// Replaces the reconnect policy; applies from the next scheduled retry
    pub fn set_policy(&mut self, policy: ReconnectPolicy) {
        self.policy = policy;
    }

    /// Returns the transport
    #[must_use]
    pub const fn transport(&self) -> &T {
        &self.transport
    }

    /// Opens a connection to `address`
    ///
    /// Does nothing while `Connecting` or `Open`. Otherwise dispatches the
    /// events already queued for the old socket, cancels a pending retry,
    /// clears the manual-disconnect flag and starts a new attempt.
    /// Bad addresses are reported through `on_error` and `on_close`.
    pub fn connect(&mut self, address: &str) {
        let _span =
            tracing::info_span!(span_names::CONNECTION_CONNECT, address = %address).entered();
        let state = self.current_state();
        if state.is_live() {
            debug!(state = %state, "Already connected or connecting, ignoring connect");
            return;
        }

        // a close that already arrived must reach on_close before the socket is replaced
        if self.socket.is_some() {
            self.drain();
        }

        self.cancel_retry();
        self.manually_closed = false;
        self.attempt = 0;
        self.open_socket(address);
    }

    /// Closes the connection without scheduling a reconnect
    ///
    /// While `Closed` the transport is left alone, but a pending retry is
    /// still cancelled.
    pub fn disconnect(&mut self) {
        let _span = tracing::info_span!(span_names::CONNECTION_DISCONNECT).entered();
        if self.current_state() == ConnectionState::Closed {
            // close event for this socket is still queued
            if self.socket.is_some() {
                self.manually_closed = true;
            }
            if self.cancel_retry() {
                info!("Pending reconnect cancelled");
            }
            return;
        }

        self.manually_closed = true;
        self.cancel_retry();
        if let Some((id, socket)) = self.socket.as_mut() {
            info!(socket = %id, "Disconnecting");
            socket.close();
        }
    }

    /// Readiness of the current socket, `Closed` when there is none
    #[must_use]
    pub fn current_state(&self) -> ConnectionState {
        self.socket
            .as_ref()
            .map_or(ConnectionState::Closed, |(_, socket)| socket.ready_state())
    }

    /// Address used by the most recent connection attempt
    #[must_use]
    pub fn address(&self) -> Option<&str> {
        self.address.as_deref()
    }

    /// Returns true while a reconnect is scheduled
    #[must_use]
    pub const fn retry_pending(&self) -> bool {
        self.retry.is_some()
    }

    /// When the scheduled reconnect fires, if any
    #[must_use]
    pub fn retry_deadline(&self) -> Option<Instant> {
        self.retry.as_ref().map(RetryTimer::deadline)
    }

    /// Number of consecutive automatic reconnects since the last open or
    /// manual connect
    #[must_use]
    pub const fn retry_attempt(&self) -> u32 {
        self.attempt
    }

    /// Identifier of the current socket
    #[must_use]
    pub fn socket_id(&self) -> Option<SocketId> {
        self.socket.as_ref().map(|(id, _)| *id)
    }

    /// Waits for the next transport event or the retry timer and handles it
    ///
    /// Cancel-safe: dropping the future loses nothing, so it can sit in a
    /// `tokio::select!` next to other work.
    pub async fn process_next(&mut self) {
        tokio::select! {
            biased;
            event = self.events_rx.recv() => {
                if let Some(event) = event {
                    self.handle_event(event);
                }
            }
            () = RetryTimer::wait(&mut self.retry) => self.fire_retry(),
        }
    }

    /// Handles every transport event that is already queued
    ///
    /// Returns the number of events handled.
    pub fn drain(&mut self) -> usize {
        let mut handled = 0;
        while let Ok(event) = self.events_rx.try_recv() {
            self.handle_event(event);
            handled += 1;
        }
        handled
    }

    /// Handles a single transport event
    ///
    /// Events from sockets other than the current one are dropped.
    pub fn handle_event(&mut self, event: TransportEvent) {
        if self.socket_id() != Some(event.socket) {
            debug!(socket = %event.socket, "Ignoring event from stale socket");
            return;
        }

        match event.kind {
            SocketEvent::Open => {
                self.cancel_retry();
                self.attempt = 0;
                info!(socket = %event.socket, address = ?self.address, "Connection open");
                self.callbacks.opened();
            }
            SocketEvent::Message(payload) => match serde_json::from_slice::<Value>(&payload) {
                Ok(value) => self.callbacks.message(value),
                Err(err) => {
                    let message = format!(
                        "Failed to parse message: {}",
                        String::from_utf8_lossy(&payload)
                    );
                    warn!(socket = %event.socket, error = %err, "Discarding malformed payload");
                    self.callbacks.error(&message);
                }
            },
            SocketEvent::Close(info) => {
                self.socket = None;
                info!(
                    socket = %event.socket,
                    code = info.code,
                    clean = info.was_clean,
                    "Connection closed"
                );
                self.callbacks.closed(&info);

                if std::mem::take(&mut self.manually_closed) {
                    debug!("Closed by request, not reconnecting");
                } else if self.policy.enabled && self.retry.is_none() {
                    self.schedule_retry();
                }
            }
            SocketEvent::Error(message) => {
                warn!(socket = %event.socket, error = %message, "Transport error");
                self.callbacks.error(&message);
            }
        }
    }

    fn open_socket(&mut self, address: &str) {
        self.next_socket_id += 1;
        let id = SocketId(self.next_socket_id);
        self.address = Some(address.to_string());

        info!(socket = %id, address = %address, "Connecting");
        let socket = self.transport.open(id, address, self.events_tx.clone());
        // any previous socket here is already closing; dropping it is fine
        self.socket = Some((id, socket));
    }

    fn schedule_retry(&mut self) {
        let delay = self.policy.delay_for_attempt(self.attempt);
        info!(
            attempt = self.attempt + 1,
            delay_ms = delay.as_millis() as u64,
            "Scheduling reconnect"
        );
        self.retry = Some(RetryTimer::start(delay, self.attempt));
    }

    fn cancel_retry(&mut self) -> bool {
        self.retry.take().is_some()
    }

    fn fire_retry(&mut self) {
        let Some(timer) = self.retry.take() else {
            return;
        };
        self.attempt = timer.attempt().saturating_add(1);

        let Some(address) = self.address.clone() else {
            return;
        };
        if self.current_state().is_live() {
            return;
        }

        let _span =
            tracing::info_span!(span_names::CONNECTION_RETRY, attempt = self.attempt).entered();
        info!(address = %address, "Reconnecting");
        self.manually_closed = false;
        self.open_socket(&address);
    }
}

impl<T: Transport + std::fmt::Debug> std::fmt::Debug for LifecycleManager<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LifecycleManager")
            .field("transport", &self.transport)
            .field("state", &self.current_state())
            .field("socket", &self.socket_id())
            .field("address", &self.address)
            .field("manually_closed", &self.manually_closed)
            .field("retry_pending", &self.retry.is_some())
            .field("attempt", &self.attempt)
            .finish_non_exhaustive()
    }
}
