//! Connection lifecycle
//!
//! [`LifecycleManager`] keeps at most one live connection, reconnects after
//! unexpected closes with a single [`RetryTimer`], and reports everything
//! through a registered [`Callbacks`] set.

mod callbacks;
mod close;
mod manager;
mod retry;
mod state;

pub use callbacks::Callbacks;
pub use close::{CloseInfo, CloseKind, close_codes};
pub use manager::LifecycleManager;
pub use retry::{
    DEFAULT_BACKOFF_MULTIPLIER, DEFAULT_MAX_RETRY_DELAY_MS, DEFAULT_RETRY_DELAY_MS,
    ReconnectPolicy, RetryTimer,
};
pub use state::{ConnectionState, SharedReadyState};
