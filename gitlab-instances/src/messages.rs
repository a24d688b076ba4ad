//! User-facing message channel.
//!
//! Fetch failures are not errors for the caller; they are reported here as a
//! one-line status message instead.

use std::sync::Mutex;
use tracing::info;

/// Receives informational messages meant for the end user.
pub trait Messenger: Send + Sync {
    /// Adds a status message.
    fn add_status(&self, message: String);
}

/// A [`Messenger`] that keeps every message for later display.
#[derive(Debug, Default)]
pub struct MessageLog {
    messages: Mutex<Vec<String>>,
}

impl MessageLog {
    /// Creates an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the messages received so far.
    pub fn messages(&self) -> Vec<String> {
        self.messages
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Removes and returns all messages.
    pub fn drain(&self) -> Vec<String> {
        std::mem::take(
            &mut *self
                .messages
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner()),
        )
    }
}

impl Messenger for MessageLog {
    fn add_status(&self, message: String) {
        self.messages
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(message);
    }
}

/// A [`Messenger`] that emits each message as a tracing event.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingMessenger;

impl Messenger for TracingMessenger {
    fn add_status(&self, message: String) {
        info!(%message, "Status message");
    }
}
