//! Reconnect policy and the single pending retry timer
//!
//! The lifecycle manager holds at most one [`RetryTimer`] at a time, as an
//! `Option<RetryTimer>`: set when a retry is scheduled, cleared when it is
//! cancelled or fires.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::time::{Instant, Sleep};

/// Default delay before reconnecting after an unexpected close, in milliseconds
pub const DEFAULT_RETRY_DELAY_MS: u64 = 5_000;

/// Default cap on the reconnect delay, in milliseconds
pub const DEFAULT_MAX_RETRY_DELAY_MS: u64 = 60_000;

/// Default backoff multiplier (1.0 keeps the delay fixed)
pub const DEFAULT_BACKOFF_MULTIPLIER: f64 = 1.0;

/// Reconnection policy configuration
///
/// There is no attempt limit: reconnection continues until the user
/// disconnects or a connection opens. The delay for attempt `n` (0-indexed)
/// is `min(delay_ms * backoff_multiplier^n, max_delay_ms)`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ReconnectPolicy {
    /// Whether automatic reconnection is enabled
    pub enabled: bool,
    /// Delay before the first reconnection attempt, in milliseconds
    pub delay_ms: u64,
    /// Backoff multiplier applied per consecutive attempt
    pub backoff_multiplier: f64,
    /// Upper bound for the delay, in milliseconds
    pub max_delay_ms: u64,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            enabled: true,
            delay_ms: DEFAULT_RETRY_DELAY_MS,
            backoff_multiplier: DEFAULT_BACKOFF_MULTIPLIER,
            max_delay_ms: DEFAULT_MAX_RETRY_DELAY_MS,
        }
    }
}

impl ReconnectPolicy {
    /// Creates a policy with default values
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a policy that never reconnects
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    /// Creates an enabled policy with a fixed delay
    #[must_use]
    pub fn fixed(delay: Duration) -> Self {
        Self {
            delay_ms: duration_to_ms(delay),
            ..Self::default()
        }
    }

    /// Sets the base delay
    #[must_use]
    pub const fn with_delay_ms(mut self, delay_ms: u64) -> Self {
        self.delay_ms = delay_ms;
        self
    }

    /// Sets the backoff multiplier
    #[must_use]
    pub fn with_backoff_multiplier(mut self, multiplier: f64) -> Self {
        self.backoff_multiplier = multiplier;
        self
    }

    /// Sets the maximum delay
    #[must_use]
    pub const fn with_max_delay_ms(mut self, max_delay_ms: u64) -> Self {
        self.max_delay_ms = max_delay_ms;
        self
    }

    /// Enables or disables reconnection
    #[must_use]
    pub const fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Calculates the delay for a given attempt number (0-indexed)
    ///
    /// A multiplier below 1.0 is treated as 1.0 so the delay never shrinks.
    #[must_use]
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let multiplier = self.backoff_multiplier.max(1.0);
        let exponent = i32::try_from(attempt).unwrap_or(i32::MAX);
        let delay_ms = self.delay_ms as f64 * multiplier.powi(exponent);
        let cap = self.max_delay_ms.max(self.delay_ms);

        let capped_ms = if delay_ms.is_finite() && delay_ms < cap as f64 {
            delay_ms as u64
        } else {
            cap
        };

        Duration::from_millis(capped_ms)
    }
}

fn duration_to_ms(delay: Duration) -> u64 {
    u64::try_from(delay.as_millis()).unwrap_or(u64::MAX)
}

/// A single-shot timer for the next reconnection attempt
#[derive(Debug)]
pub struct RetryTimer {
    sleep: Pin<Box<Sleep>>,
    deadline: Instant,
    attempt: u32,
}

impl RetryTimer {
    /// Starts a timer that elapses after `delay`
    ///
    /// Must be called from within a tokio runtime.
    #[must_use]
    pub fn start(delay: Duration, attempt: u32) -> Self {
        let deadline = Instant::now() + delay;
        Self {
            sleep: Box::pin(tokio::time::sleep_until(deadline)),
            deadline,
            attempt,
        }
    }

    /// Instant at which the timer fires
    #[must_use]
    pub const fn deadline(&self) -> Instant {
        self.deadline
    }

    /// Attempt number this timer will start (0-indexed)
    #[must_use]
    pub const fn attempt(&self) -> u32 {
        self.attempt
    }

    /// Time left until the timer fires
    #[must_use]
    pub fn remaining(&self) -> Duration {
        self.deadline.saturating_duration_since(Instant::now())
    }

    /// Waits for the timer in `slot`, or forever when the slot is empty
    pub(crate) async fn wait(slot: &mut Option<Self>) {
        match slot {
            Some(timer) => timer.await,
            None => std::future::pending().await,
        }
    }
}

impl Future for RetryTimer {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        self.sleep.as_mut().poll(cx)
    }
}
