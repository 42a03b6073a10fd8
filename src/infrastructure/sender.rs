//! Sender adapters.
//!
//! Real delivery to observers belongs to the host. These adapters cover the
//! cases a host does not need to write itself:
//!
//! - [`TracingSender`]: emit each notice as a `tracing` event.
//! - [`NullSender`]: drop everything.
//! - [`RecordingSender`]: keep deliveries in memory for the host to drain.

use crate::application::ports::{SendError, Sender};
use crate::domain::location::LocationKey;
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::info;

/// Target used by [`TracingSender`] events.
pub const NOTICE_TARGET: &str = "quern_notify::notice";

/// Emits every notice as an `INFO` event on [`NOTICE_TARGET`].
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSender;

impl Sender for TracingSender {
    fn deliver(&self, location: LocationKey, message: &str) -> Result<(), SendError> {
        info!(target: NOTICE_TARGET, location = %location, "{}", message);
        Ok(())
    }
}

/// Discards every notice.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSender;

impl Sender for NullSender {
    fn deliver(&self, _location: LocationKey, _message: &str) -> Result<(), SendError> {
        Ok(())
    }
}

/// A delivered notice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    /// Where the notice was sent for
    pub location: LocationKey,
    /// Rendered notice text
    pub message: String,
}

/// Collects deliveries in memory.
///
/// Clones share the same buffer.
#[derive(Debug, Clone, Default)]
pub struct RecordingSender {
    deliveries: Arc<Mutex<Vec<Delivery>>>,
}

impl RecordingSender {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// All deliveries so far, oldest first.
    pub fn deliveries(&self) -> Vec<Delivery> {
        self.deliveries.lock().clone()
    }

    /// Number of deliveries so far.
    pub fn count(&self) -> usize {
        self.deliveries.lock().len()
    }

    /// Take all deliveries, leaving the recorder empty.
    pub fn drain(&self) -> Vec<Delivery> {
        std::mem::take(&mut *self.deliveries.lock())
    }
}

impl Sender for RecordingSender {
    fn deliver(&self, location: LocationKey, message: &str) -> Result<(), SendError> {
        self.deliveries.lock().push(Delivery {
            location,
            message: message.to_string(),
        });
        Ok(())
    }
}
