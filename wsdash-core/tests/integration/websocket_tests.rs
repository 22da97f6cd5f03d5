//! Real WebSocket sessions against a local `tokio-tungstenite` server

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use serde_json::json;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio_tungstenite::accept_async;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::{Message, Utf8Bytes};
use wsdash_core::connection::{ConnectionState, LifecycleManager, ReconnectPolicy};
use wsdash_core::dashboard::{SessionEvent, session_callbacks};
use wsdash_core::transport::WebSocketTransport;

const STEP_TIMEOUT: Duration = Duration::from_secs(5);

async fn bind() -> (TcpListener, String) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    (listener, format!("ws://127.0.0.1:{port}/live"))
}

fn create_manager(
    policy: ReconnectPolicy,
) -> (
    LifecycleManager<WebSocketTransport>,
    mpsc::UnboundedReceiver<SessionEvent>,
) {
    let (tx, rx) = mpsc::unbounded_channel();
    let mut manager = LifecycleManager::with_policy(WebSocketTransport::new(), policy);
    manager.configure(session_callbacks(tx));
    (manager, rx)
}

/// Pumps the manager until a callback fires
async fn next_event(
    manager: &mut LifecycleManager<WebSocketTransport>,
    events: &mut mpsc::UnboundedReceiver<SessionEvent>,
) -> SessionEvent {
    tokio::time::timeout(STEP_TIMEOUT, async {
        loop {
            if let Ok(event) = events.try_recv() {
                return event;
            }
            manager.process_next().await;
        }
    })
    .await
    .expect("timed out waiting for a session event")
}

#[tokio::test]
async fn test_open_message_and_manual_close() {
    let (listener, address) = bind().await;
    let server = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let mut ws = accept_async(stream).await.unwrap();
        ws.send(Message::text(r#"{"temp": 21.5, "unit": "C"}"#))
            .await
            .unwrap();
        ws.send(Message::text("definitely not json")).await.unwrap();
        // drain until the client closes
        let mut close_code = None;
        while let Some(Ok(message)) = ws.next().await {
            if let Message::Close(Some(frame)) = message {
                close_code = Some(u16::from(frame.code));
            }
        }
        close_code
    });

    let (mut manager, mut events) = create_manager(ReconnectPolicy::default());
    manager.connect(&address);
    assert_eq!(manager.current_state(), ConnectionState::Connecting);

    assert_eq!(
        next_event(&mut manager, &mut events).await,
        SessionEvent::Opened
    );
    assert_eq!(manager.current_state(), ConnectionState::Open);
    assert_eq!(
        next_event(&mut manager, &mut events).await,
        SessionEvent::Reading(json!({"temp": 21.5, "unit": "C"}))
    );
    match next_event(&mut manager, &mut events).await {
        SessionEvent::Error(message) => assert!(message.contains("definitely not json")),
        other => panic!("expected an error, got {other:?}"),
    }

    manager.disconnect();
    match next_event(&mut manager, &mut events).await {
        SessionEvent::Closed(info) => assert_eq!(info.code, 1000),
        other => panic!("expected a close, got {other:?}"),
    }
    assert_eq!(manager.current_state(), ConnectionState::Closed);
    assert!(!manager.retry_pending());

    assert_eq!(server.await.unwrap(), Some(1000));
}

#[tokio::test]
async fn test_server_close_triggers_reconnect() {
    let (listener, address) = bind().await;
    let server = tokio::spawn(async move {
        // first session: close with 1011
        let (stream, _) = listener.accept().await.unwrap();
        let mut ws = accept_async(stream).await.unwrap();
        ws.close(Some(CloseFrame {
            code: CloseCode::Error,
            reason: Utf8Bytes::from_static("restarting"),
        }))
        .await
        .unwrap();
        while ws.next().await.is_some() {}

        // second session: one reading, then wait for the client to leave
        let (stream, _) = listener.accept().await.unwrap();
        let mut ws = accept_async(stream).await.unwrap();
        ws.send(Message::text(r#"{"v": 2}"#)).await.unwrap();
        while ws.next().await.is_some() {}
    });

    let policy = ReconnectPolicy::fixed(Duration::from_millis(100));
    let (mut manager, mut events) = create_manager(policy);
    manager.connect(&address);

    assert_eq!(
        next_event(&mut manager, &mut events).await,
        SessionEvent::Opened
    );
    match next_event(&mut manager, &mut events).await {
        SessionEvent::Closed(info) => {
            assert_eq!(info.code, 1011);
            assert_eq!(info.reason, "restarting");
        }
        other => panic!("expected a close, got {other:?}"),
    }
    assert!(manager.retry_pending());

    assert_eq!(
        next_event(&mut manager, &mut events).await,
        SessionEvent::Opened
    );
    assert_eq!(manager.address(), Some(address.as_str()));
    assert_eq!(
        next_event(&mut manager, &mut events).await,
        SessionEvent::Reading(json!({"v": 2}))
    );

    manager.disconnect();
    assert!(matches!(
        next_event(&mut manager, &mut events).await,
        SessionEvent::Closed(_)
    ));
    server.await.unwrap();
}

#[tokio::test]
async fn test_unreachable_endpoint_fails_then_schedules_retry() {
    let (listener, address) = bind().await;
    drop(listener);

    let (mut manager, mut events) = create_manager(ReconnectPolicy::default());
    manager.connect(&address);

    assert!(matches!(
        next_event(&mut manager, &mut events).await,
        SessionEvent::Error(_)
    ));
    match next_event(&mut manager, &mut events).await {
        SessionEvent::Closed(info) => assert_eq!(info.code, 1006),
        other => panic!("expected a close, got {other:?}"),
    }
    assert_eq!(manager.current_state(), ConnectionState::Closed);
    assert!(manager.retry_pending());

    manager.disconnect();
    assert!(!manager.retry_pending());
}
