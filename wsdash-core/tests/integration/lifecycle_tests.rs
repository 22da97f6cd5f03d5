//! Lifecycle scenarios driven through the in-memory transport
//!
//! All tests run on a paused clock, so retry delays elapse instantly once
//! every task is idle.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use wsdash_core::connection::{Callbacks, ConnectionState, LifecycleManager, ReconnectPolicy};
use wsdash_core::transport::MemoryTransport;

#[derive(Debug, Default)]
struct Counts {
    opens: usize,
    messages: usize,
    closes: Vec<u16>,
    errors: Vec<String>,
}

fn counting_manager(
    policy: ReconnectPolicy,
) -> (
    LifecycleManager<MemoryTransport>,
    MemoryTransport,
    Arc<Mutex<Counts>>,
) {
    let transport = MemoryTransport::new();
    let mut manager = LifecycleManager::with_policy(transport.clone(), policy);
    let counts = Arc::new(Mutex::new(Counts::default()));

    let (a, b, c, d) = (
        Arc::clone(&counts),
        Arc::clone(&counts),
        Arc::clone(&counts),
        Arc::clone(&counts),
    );
    manager.configure(
        Callbacks::new()
            .on_open(move || a.lock().unwrap().opens += 1)
            .on_message(move |_| b.lock().unwrap().messages += 1)
            .on_close(move |info| c.lock().unwrap().closes.push(info.code))
            .on_error(move |m| d.lock().unwrap().errors.push(m.to_string())),
    );
    (manager, transport, counts)
}

/// Runs `process_next` until `window` of paused time passes without work
async fn idle_for(manager: &mut LifecycleManager<MemoryTransport>, window: Duration) {
    while tokio::time::timeout(window, manager.process_next())
        .await
        .is_ok()
    {}
}

#[tokio::test(start_paused = true)]
async fn test_manual_disconnect_stays_closed() {
    let (mut manager, transport, counts) = counting_manager(ReconnectPolicy::default());

    manager.connect("ws://host/a");
    transport.accept();
    manager.drain();
    assert_eq!(manager.current_state(), ConnectionState::Open);

    manager.disconnect();
    assert_eq!(manager.current_state(), ConnectionState::Closed);

    idle_for(&mut manager, Duration::from_secs(6)).await;

    assert_eq!(manager.current_state(), ConnectionState::Closed);
    assert!(!manager.retry_pending());
    assert_eq!(transport.open_count(), 1);
    assert_eq!(counts.lock().unwrap().closes, vec![1000]);
}

#[tokio::test(start_paused = true)]
async fn test_abnormal_close_reconnects_once_after_delay() {
    let (mut manager, transport, counts) = counting_manager(ReconnectPolicy::default());

    manager.connect("ws://host/a");
    transport.accept();
    transport.drop_connection(1006);
    manager.drain();

    assert_eq!(manager.current_state(), ConnectionState::Closed);
    assert!(manager.retry_pending());

    // nothing happens before the delay
    let early = tokio::time::timeout(Duration::from_millis(4_900), manager.process_next()).await;
    assert!(early.is_err());
    assert_eq!(transport.open_count(), 1);

    manager.process_next().await;
    assert_eq!(
        transport.opened_addresses(),
        vec!["ws://host/a", "ws://host/a"]
    );
    assert_eq!(manager.current_state(), ConnectionState::Connecting);

    // the new attempt never opens; no further attempt is made while it is pending
    idle_for(&mut manager, Duration::from_secs(30)).await;
    assert_eq!(transport.open_count(), 2);
    assert_eq!(counts.lock().unwrap().closes, vec![1006]);
}

#[tokio::test(start_paused = true)]
async fn test_manual_connect_during_retry_window_cancels_timer() {
    let (mut manager, transport, _) = counting_manager(ReconnectPolicy::default());

    manager.connect("ws://host/a");
    transport.accept();
    transport.drop_connection(1006);
    manager.drain();
    assert!(manager.retry_pending());

    tokio::time::advance(Duration::from_secs(2)).await;
    manager.connect("ws://host/a");
    assert!(!manager.retry_pending());
    assert_eq!(transport.open_count(), 2);

    idle_for(&mut manager, Duration::from_secs(10)).await;
    assert_eq!(transport.open_count(), 2);
    assert_eq!(transport.live_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_connect_while_open_is_noop() {
    let (mut manager, transport, counts) = counting_manager(ReconnectPolicy::default());

    manager.connect("ws://host/a");
    transport.accept();
    manager.drain();
    let id = manager.socket_id();

    manager.connect("ws://host/a");
    manager.connect("ws://host/b");

    assert_eq!(manager.current_state(), ConnectionState::Open);
    assert_eq!(manager.socket_id(), id);
    assert_eq!(transport.open_count(), 1);
    assert_eq!(counts.lock().unwrap().opens, 1);
}

#[tokio::test(start_paused = true)]
async fn test_malformed_payload_reports_error_only() {
    let (mut manager, transport, counts) = counting_manager(ReconnectPolicy::default());

    manager.connect("ws://host/a");
    transport.accept();
    transport.deliver("{\"temp\": ");
    manager.drain();

    let counts = counts.lock().unwrap();
    assert_eq!(counts.messages, 0);
    assert_eq!(counts.errors.len(), 1);
    assert!(counts.errors[0].starts_with("Failed to parse message"));
    assert_eq!(manager.current_state(), ConnectionState::Open);
}

#[tokio::test(start_paused = true)]
async fn test_refused_connect_retries_until_open() {
    let policy = ReconnectPolicy::fixed(Duration::from_millis(500));
    let (mut manager, transport, counts) = counting_manager(policy);

    manager.connect("ws://host/a");
    for _ in 0..3 {
        transport.refuse("connection refused");
        manager.drain();
        assert!(manager.retry_pending());
        manager.process_next().await;
    }
    assert_eq!(manager.retry_attempt(), 3);

    transport.accept();
    manager.drain();

    assert_eq!(manager.current_state(), ConnectionState::Open);
    assert_eq!(manager.retry_attempt(), 0);
    assert_eq!(transport.open_count(), 4);
    let counts = counts.lock().unwrap();
    assert_eq!(counts.errors.len(), 3);
    assert_eq!(counts.closes, vec![1006, 1006, 1006]);
}

#[tokio::test(start_paused = true)]
async fn test_backoff_grows_and_caps() {
    let policy = ReconnectPolicy::new()
        .with_delay_ms(1_000)
        .with_backoff_multiplier(2.0)
        .with_max_delay_ms(3_000);
    let (mut manager, transport, _) = counting_manager(policy);

    manager.connect("ws://host/a");
    let mut delays = Vec::new();
    for _ in 0..4 {
        transport.refuse("connection refused");
        manager.drain();
        let deadline = manager.retry_deadline().unwrap();
        delays.push(deadline - tokio::time::Instant::now());
        manager.process_next().await;
    }

    assert_eq!(
        delays,
        vec![
            Duration::from_secs(1),
            Duration::from_secs(2),
            Duration::from_secs(3),
            Duration::from_secs(3),
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn test_disconnect_while_closing_keeps_manual_flag() {
    let transport = MemoryTransport::with_deferred_close();
    let mut manager = LifecycleManager::new(transport.clone());

    manager.connect("ws://host/a");
    transport.accept();
    manager.drain();

    manager.disconnect();
    assert_eq!(manager.current_state(), ConnectionState::Closing);
    manager.disconnect();

    transport.finish_close();
    manager.drain();

    assert_eq!(manager.current_state(), ConnectionState::Closed);
    assert!(!manager.retry_pending());
}

#[tokio::test(start_paused = true)]
async fn test_reconfigure_replaces_callbacks() {
    let (mut manager, transport, counts) = counting_manager(ReconnectPolicy::default());
    manager.configure(Callbacks::new());

    manager.connect("ws://host/a");
    transport.accept();
    transport.deliver("{}");
    manager.drain();

    assert_eq!(counts.lock().unwrap().opens, 0);
    assert_eq!(counts.lock().unwrap().messages, 0);
}
