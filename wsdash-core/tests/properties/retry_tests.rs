//! Property tests for the reconnect policy

use proptest::prelude::*;
use std::time::Duration;
use wsdash_core::connection::ReconnectPolicy;

/// Strategy for generating reconnect policies
fn policy_strategy() -> impl Strategy<Value = ReconnectPolicy> {
    (
        1u64..10_000,      // delay_ms
        0.5f64..4.0,       // backoff_multiplier
        1_000u64..120_000, // max_delay_ms
        any::<bool>(),     // enabled
    )
        .prop_map(|(delay_ms, multiplier, max_delay_ms, enabled)| {
            ReconnectPolicy::new()
                .with_delay_ms(delay_ms)
                .with_backoff_multiplier(multiplier)
                .with_max_delay_ms(max_delay_ms)
                .with_enabled(enabled)
        })
}

proptest! {
    /// Property: Delay never exceeds the larger of the cap and the base delay
    #[test]
    fn delay_never_exceeds_cap(policy in policy_strategy(), attempt in 0u32..64) {
        let cap = policy.max_delay_ms.max(policy.delay_ms);
        let delay = policy.delay_for_attempt(attempt);
        prop_assert!(delay <= Duration::from_millis(cap));
    }

    /// Property: Delay never decreases with the attempt number
    #[test]
    fn delay_is_monotonic(policy in policy_strategy()) {
        let mut previous = Duration::ZERO;
        for attempt in 0..20 {
            let delay = policy.delay_for_attempt(attempt);
            prop_assert!(delay >= previous);
            previous = delay;
        }
    }

    /// Property: The first attempt waits exactly the base delay
    #[test]
    fn first_attempt_uses_base_delay(policy in policy_strategy()) {
        prop_assert_eq!(policy.delay_for_attempt(0), Duration::from_millis(policy.delay_ms));
    }

    /// Property: A multiplier of 1 gives a fixed delay
    #[test]
    fn unit_multiplier_is_fixed(delay_ms in 1u64..100_000, attempt in 0u32..1_000) {
        let policy = ReconnectPolicy::new()
            .with_delay_ms(delay_ms)
            .with_max_delay_ms(delay_ms);
        prop_assert_eq!(policy.delay_for_attempt(attempt), Duration::from_millis(delay_ms));
    }

    /// Property: Policies survive a TOML round trip
    #[test]
    fn policy_toml_round_trip(policy in policy_strategy()) {
        let text = toml::to_string(&policy).unwrap();
        let parsed: ReconnectPolicy = toml::from_str(&text).unwrap();
        prop_assert_eq!(parsed.enabled, policy.enabled);
        prop_assert_eq!(parsed.delay_ms, policy.delay_ms);
        prop_assert_eq!(parsed.max_delay_ms, policy.max_delay_ms);
        prop_assert!((parsed.backoff_multiplier - policy.backoff_multiplier).abs() < 1e-9);
    }
}
