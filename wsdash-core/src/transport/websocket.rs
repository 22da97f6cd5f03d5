//! WebSocket transport over `tokio-tungstenite`

use futures_util::{SinkExt, StreamExt};
use tokio::sync::oneshot;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::Utf8Bytes;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tracing::{debug, warn};

use super::{EventSender, Socket, SocketEvent, SocketId, Transport, TransportEvent};
use crate::connection::{CloseInfo, ConnectionState, SharedReadyState, close_codes};

/// Client transport that opens real WebSocket connections
///
/// Each socket runs in its own tokio task, so [`Transport::open`] must be
/// called from inside a tokio runtime. `wss` addresses use the native TLS
/// backend.
#[derive(Debug, Clone, Copy, Default)]
pub struct WebSocketTransport;

impl WebSocketTransport {
    /// Creates the transport
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Transport for WebSocketTransport {
    type Socket = WebSocketSocket;

    fn open(&mut self, id: SocketId, address: &str, events: EventSender) -> Self::Socket {
        let state = SharedReadyState::new(ConnectionState::Connecting);
        let (close_tx, close_rx) = oneshot::channel();

        debug!(socket = %id, address = %address, "Opening WebSocket");
        tokio::spawn(run_socket(
            id,
            address.to_string(),
            state.clone(),
            close_rx,
            events,
        ));

        WebSocketSocket {
            id,
            state,
            close_tx: Some(close_tx),
        }
    }
}

/// Handle to a socket driven by a background task
#[derive(Debug)]
pub struct WebSocketSocket {
    id: SocketId,
    state: SharedReadyState,
    close_tx: Option<oneshot::Sender<()>>,
}

impl WebSocketSocket {
    /// Identifier this socket was opened with
    #[must_use]
    pub const fn id(&self) -> SocketId {
        self.id
    }
}

impl Socket for WebSocketSocket {
    fn ready_state(&self) -> ConnectionState {
        self.state.get()
    }

    fn close(&mut self) {
        let Some(close_tx) = self.close_tx.take() else {
            return;
        };
        if self
            .state
            .transition(ConnectionState::Open, ConnectionState::Closing)
            || self
                .state
                .transition(ConnectionState::Connecting, ConnectionState::Closing)
        {
            debug!(socket = %self.id, "Close requested");
        }
        let _ = close_tx.send(());
    }
}

impl Drop for WebSocketSocket {
    fn drop(&mut self) {
        self.close();
    }
}

async fn run_socket(
    id: SocketId,
    address: String,
    state: SharedReadyState,
    mut close_rx: oneshot::Receiver<()>,
    events: EventSender,
) {
    let emit = |kind: SocketEvent| {
        let _ = events.send(TransportEvent::new(id, kind));
    };

    let ws = tokio::select! {
        result = connect_async(address.as_str()) => match result {
            Ok((ws, _response)) => ws,
            Err(err) => {
                warn!(socket = %id, address = %address, error = %err, "WebSocket connect failed");
                state.set(ConnectionState::Closed);
                emit(SocketEvent::Error(format!("failed to connect to {address}: {err}")));
                emit(SocketEvent::Close(CloseInfo::abnormal(err.to_string())));
                return;
            }
        },
        _ = &mut close_rx => {
            debug!(socket = %id, "Closed during handshake");
            state.set(ConnectionState::Closed);
            emit(SocketEvent::Close(CloseInfo::abnormal(
                "closed before the connection was established",
            )));
            return;
        }
    };

    if state.transition(ConnectionState::Connecting, ConnectionState::Open) {
        debug!(socket = %id, "WebSocket open");
        emit(SocketEvent::Open);
    }

    let (mut sink, mut stream) = ws.split();
    let mut closing = state.get() == ConnectionState::Closing;
    let mut received: Option<CloseInfo> = None;

    if closing {
        send_close_frame(id, &mut sink).await;
    }

    let info = loop {
        tokio::select! {
            _ = &mut close_rx, if !closing => {
                closing = true;
                state.set(ConnectionState::Closing);
                if !send_close_frame(id, &mut sink).await {
                    break CloseInfo::abnormal("failed to send close frame");
                }
            }
            frame = stream.next() => match frame {
                Some(Ok(Message::Text(text))) => {
                    emit(SocketEvent::Message(text.as_str().as_bytes().to_vec()));
                }
                Some(Ok(Message::Binary(data))) => {
                    emit(SocketEvent::Message(data.to_vec()));
                }
                Some(Ok(Message::Close(frame))) => {
                    let info = match frame {
                        Some(frame) => {
                            CloseInfo::new(u16::from(frame.code), frame.reason.as_str(), true)
                        }
                        None => CloseInfo::new(close_codes::NO_STATUS, "", true),
                    };
                    debug!(socket = %id, code = info.code, "Close frame received");
                    state.set(ConnectionState::Closing);
                    received = Some(info);
                }
                Some(Ok(_)) => {}
                Some(Err(err)) => {
                    if let Some(info) = received.take() {
                        break info;
                    }
                    if closing {
                        break CloseInfo::new(close_codes::NORMAL, "", false);
                    }
                    warn!(socket = %id, error = %err, "WebSocket read failed");
                    emit(SocketEvent::Error(format!("connection error: {err}")));
                    break CloseInfo::abnormal(err.to_string());
                }
                None => {
                    break received.take().unwrap_or_else(|| {
                        if closing {
                            CloseInfo::new(close_codes::NORMAL, "", false)
                        } else {
                            CloseInfo::abnormal("connection closed without a close frame")
                        }
                    });
                }
            }
        }
    };

    state.set(ConnectionState::Closed);
    debug!(socket = %id, code = info.code, clean = info.was_clean, "WebSocket closed");
    emit(SocketEvent::Close(info));
}

async fn send_close_frame<S>(id: SocketId, sink: &mut S) -> bool
where
    S: futures_util::Sink<Message> + Unpin,
    S::Error: std::fmt::Display,
{
    let frame = CloseFrame {
        code: CloseCode::Normal,
        reason: Utf8Bytes::from_static(""),
    };
    match sink.send(Message::Close(Some(frame))).await {
        Ok(()) => true,
        Err(err) => {
            debug!(socket = %id, error = %err, "Failed to send close frame");
            false
        }
    }
}
