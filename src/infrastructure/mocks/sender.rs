//! Mock sender with scripted failures.

use crate::application::ports::{SendError, Sender};
use crate::domain::location::LocationKey;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// How the mock responds to a delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendBehavior {
    /// Accept the message
    Succeed,
    /// Return the given error
    Fail(SendError),
    /// Panic with the given message
    Panic(String),
}

/// Sender that counts calls and behaves as scripted.
///
/// Clones share state, so a test can keep one handle while the dispatcher
/// owns another.
#[derive(Debug, Clone)]
pub struct MockSender {
    behavior: Arc<Mutex<SendBehavior>>,
    calls: Arc<AtomicUsize>,
}

impl MockSender {
    /// Create a sender that accepts every message.
    pub fn new() -> Self {
        Self::with_behavior(SendBehavior::Succeed)
    }

    /// Create a sender with a fixed behavior.
    pub fn with_behavior(behavior: SendBehavior) -> Self {
        Self {
            behavior: Arc::new(Mutex::new(behavior)),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Change the behavior for subsequent calls.
    pub fn set_behavior(&self, behavior: SendBehavior) {
        *self.behavior.lock() = behavior;
    }

    /// Number of `deliver` calls so far, failed ones included.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Default for MockSender {
    fn default() -> Self {
        Self::new()
    }
}

impl Sender for MockSender {
    fn deliver(&self, _location: LocationKey, _message: &str) -> Result<(), SendError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let behavior = self.behavior.lock().clone();
        match behavior {
            SendBehavior::Succeed => Ok(()),
            SendBehavior::Fail(e) => Err(e),
            SendBehavior::Panic(message) => panic!("{}", message),
        }
    }
}
