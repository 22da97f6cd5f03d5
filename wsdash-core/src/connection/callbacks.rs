//! Callback set registered with the lifecycle manager

use std::fmt;

use serde_json::Value;

use super::close::CloseInfo;

type OpenFn = Box<dyn FnMut() + Send>;
type MessageFn = Box<dyn FnMut(Value) + Send>;
type CloseFn = Box<dyn FnMut(&CloseInfo) + Send>;
type ErrorFn = Box<dyn FnMut(&str) + Send>;

/// Handlers for connection events
///
/// Unset handlers are no-ops. Passing a new set to
/// [`LifecycleManager::configure`](super::LifecycleManager::configure)
/// replaces the previous one entirely.
#[derive(Default)]
pub struct Callbacks {
    on_open: Option<OpenFn>,
    on_message: Option<MessageFn>,
    on_close: Option<CloseFn>,
    on_error: Option<ErrorFn>,
}

impl Callbacks {
    /// Creates an empty callback set
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Called when the connection opens
    #[must_use]
    pub fn on_open(mut self, f: impl FnMut() + Send + 'static) -> Self {
        self.on_open = Some(Box::new(f));
        self
    }

    /// Called with every successfully decoded payload
    #[must_use]
    pub fn on_message(mut self, f: impl FnMut(Value) + Send + 'static) -> Self {
        self.on_message = Some(Box::new(f));
        self
    }

    /// Called once per finished connection
    #[must_use]
    pub fn on_close(mut self, f: impl FnMut(&CloseInfo) + Send + 'static) -> Self {
        self.on_close = Some(Box::new(f));
        self
    }

    /// Called with transport errors and decode failures
    #[must_use]
    pub fn on_error(mut self, f: impl FnMut(&str) + Send + 'static) -> Self {
        self.on_error = Some(Box::new(f));
        self
    }

    pub(crate) fn opened(&mut self) {
        if let Some(f) = self.on_open.as_mut() {
            f();
        }
    }

    pub(crate) fn message(&mut self, value: Value) {
        if let Some(f) = self.on_message.as_mut() {
            f(value);
        }
    }

    pub(crate) fn closed(&mut self, info: &CloseInfo) {
        if let Some(f) = self.on_close.as_mut() {
            f(info);
        }
    }

    pub(crate) fn error(&mut self, message: &str) {
        if let Some(f) = self.on_error.as_mut() {
            f(message);
        }
    }
}

impl fmt::Debug for Callbacks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callbacks")
            .field("on_open", &self.on_open.is_some())
            .field("on_message", &self.on_message.is_some())
            .field("on_close", &self.on_close.is_some())
            .field("on_error", &self.on_error.is_some())
            .finish()
    }
}
