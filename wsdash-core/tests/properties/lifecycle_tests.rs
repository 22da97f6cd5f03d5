//! Property tests for the connection lifecycle manager

use std::sync::{Arc, Mutex};
use std::time::Duration;

use proptest::prelude::*;
use wsdash_core::connection::{Callbacks, ConnectionState, LifecycleManager, ReconnectPolicy};
use wsdash_core::transport::MemoryTransport;

/// One step driven by the caller or by the simulated peer
#[derive(Debug, Clone)]
enum Step {
    Connect(u8),
    Disconnect,
    Accept,
    Deliver(bool),
    Drop(u16),
    Refuse,
    FinishClose,
    Wait(u64),
}

fn step_strategy() -> impl Strategy<Value = Step> {
    prop_oneof![
        (0u8..3).prop_map(Step::Connect),
        Just(Step::Disconnect),
        Just(Step::Accept),
        any::<bool>().prop_map(Step::Deliver),
        prop_oneof![Just(1000u16), Just(1001), Just(1006), Just(1011)].prop_map(Step::Drop),
        Just(Step::Refuse),
        Just(Step::FinishClose),
        (0u64..12_000).prop_map(Step::Wait),
    ]
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .start_paused(true)
        .build()
        .unwrap()
}

#[derive(Debug, Default)]
struct Tally {
    messages: usize,
    errors: usize,
}

fn tallying(manager: &mut LifecycleManager<MemoryTransport>) -> Arc<Mutex<Tally>> {
    let tally = Arc::new(Mutex::new(Tally::default()));
    let (m, e) = (Arc::clone(&tally), Arc::clone(&tally));
    manager.configure(
        Callbacks::new()
            .on_message(move |_| m.lock().unwrap().messages += 1)
            .on_error(move |_| e.lock().unwrap().errors += 1),
    );
    tally
}

async fn apply(
    manager: &mut LifecycleManager<MemoryTransport>,
    transport: &MemoryTransport,
    step: &Step,
) {
    match step {
        Step::Connect(n) => manager.connect(&format!("ws://host/{n}")),
        Step::Disconnect => manager.disconnect(),
        Step::Accept => {
            transport.accept();
        }
        Step::Deliver(valid) => {
            transport.deliver(if *valid { "{\"v\": 1}" } else { "{\"v\": " });
        }
        Step::Drop(code) => {
            transport.drop_connection(*code);
        }
        Step::Refuse => {
            transport.refuse("connection refused");
        }
        Step::FinishClose => {
            transport.finish_close();
        }
        Step::Wait(ms) => {
            let _ = tokio::time::timeout(Duration::from_millis(*ms), async {
                loop {
                    manager.process_next().await;
                }
            })
            .await;
        }
    }
    manager.drain();
}

proptest! {
    /// Property: At most one socket is live at any time
    #[test]
    fn at_most_one_live_socket(
        steps in proptest::collection::vec(step_strategy(), 1..40),
        deferred in any::<bool>(),
    ) {
        let rt = runtime();
        rt.block_on(async {
            let transport = if deferred {
                MemoryTransport::with_deferred_close()
            } else {
                MemoryTransport::new()
            };
            let mut manager = LifecycleManager::new(transport.clone());

            for step in &steps {
                apply(&mut manager, &transport, step).await;
                prop_assert!(transport.live_count() <= 1, "after {:?}", step);
                if manager.current_state().is_live() {
                    prop_assert_eq!(manager.socket_id(), transport.latest_id());
                }
            }
            Ok(())
        })?;
    }

    /// Property: A manual disconnect from Open is never followed by a reconnect
    #[test]
    fn manual_disconnect_never_reconnects(
        wait_ms in 0u64..120_000,
        deferred in any::<bool>(),
    ) {
        let rt = runtime();
        rt.block_on(async {
            let transport = if deferred {
                MemoryTransport::with_deferred_close()
            } else {
                MemoryTransport::new()
            };
            let mut manager = LifecycleManager::new(transport.clone());

            apply(&mut manager, &transport, &Step::Connect(0)).await;
            apply(&mut manager, &transport, &Step::Accept).await;
            prop_assert_eq!(manager.current_state(), ConnectionState::Open);

            apply(&mut manager, &transport, &Step::Disconnect).await;
            apply(&mut manager, &transport, &Step::FinishClose).await;
            apply(&mut manager, &transport, &Step::Wait(wait_ms)).await;

            prop_assert_eq!(manager.current_state(), ConnectionState::Closed);
            prop_assert!(!manager.retry_pending());
            prop_assert_eq!(transport.open_count(), 1);
            Ok(())
        })?;
    }

    /// Property: Each malformed payload yields one error and no message
    #[test]
    fn malformed_payloads_only_raise_errors(payloads in proptest::collection::vec(any::<bool>(), 0..20)) {
        let rt = runtime();
        rt.block_on(async {
            let transport = MemoryTransport::new();
            let mut manager = LifecycleManager::new(transport.clone());
            let tally = tallying(&mut manager);

            apply(&mut manager, &transport, &Step::Connect(0)).await;
            apply(&mut manager, &transport, &Step::Accept).await;
            for valid in &payloads {
                apply(&mut manager, &transport, &Step::Deliver(*valid)).await;
            }

            let valid = payloads.iter().filter(|v| **v).count();
            let tally = tally.lock().unwrap();
            prop_assert_eq!(tally.messages, valid);
            prop_assert_eq!(tally.errors, payloads.len() - valid);
            prop_assert_eq!(manager.current_state(), ConnectionState::Open);
            Ok(())
        })?;
    }

    /// Property: An unexpected close schedules exactly one retry at the policy delay
    #[test]
    fn unexpected_close_retries_once(
        delay_ms in 1u64..30_000,
        code in prop_oneof![Just(1001u16), Just(1006), Just(1011)],
    ) {
        let rt = runtime();
        rt.block_on(async {
            let transport = MemoryTransport::new();
            let policy = ReconnectPolicy::fixed(Duration::from_millis(delay_ms));
            let mut manager = LifecycleManager::with_policy(transport.clone(), policy);

            apply(&mut manager, &transport, &Step::Connect(0)).await;
            apply(&mut manager, &transport, &Step::Accept).await;
            apply(&mut manager, &transport, &Step::Drop(code)).await;
            prop_assert!(manager.retry_pending());

            apply(&mut manager, &transport, &Step::Wait(delay_ms - 1)).await;
            prop_assert_eq!(transport.open_count(), 1);

            // the new attempt stays pending, so nothing else fires
            apply(&mut manager, &transport, &Step::Wait(delay_ms * 4)).await;
            prop_assert_eq!(transport.open_count(), 2);
            let opened = transport.opened_addresses();
            prop_assert_eq!(opened[1].as_str(), "ws://host/0");
            Ok(())
        })?;
    }
}
