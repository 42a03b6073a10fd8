//! Mock tracing layer for asserting on diagnostics.

use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::field::{Field, Visit};
use tracing::Level;
use tracing_subscriber::Layer;

/// Mock layer that captures events for testing.
#[derive(Clone, Default)]
pub struct MockCaptureLayer {
    captured: Arc<Mutex<Vec<CapturedEvent>>>,
}

/// Captured event information.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct CapturedEvent {
    /// Event level
    pub level: Level,
    /// Event target
    pub target: String,
    /// Formatted message
    pub message: String,
    /// Remaining fields, formatted with `Debug`
    pub fields: BTreeMap<String, String>,
}

impl CapturedEvent {
    /// Value of a recorded field, if present.
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }
}

impl MockCaptureLayer {
    /// Create a new mock capture layer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get all captured events.
    pub fn get_captured(&self) -> Vec<CapturedEvent> {
        self.captured.lock().clone()
    }

    /// Get the count of captured events.
    pub fn count(&self) -> usize {
        self.captured.lock().len()
    }

    /// Captured events emitted on `target`.
    pub fn on_target(&self, target: &str) -> Vec<CapturedEvent> {
        self.captured
            .lock()
            .iter()
            .filter(|e| e.target == target)
            .cloned()
            .collect()
    }

    /// Clear all captured events.
    pub fn clear(&self) {
        self.captured.lock().clear();
    }
}

impl<S> Layer<S> for MockCaptureLayer
where
    S: tracing::Subscriber,
{
    fn on_event(
        &self,
        event: &tracing::Event<'_>,
        _ctx: tracing_subscriber::layer::Context<'_, S>,
    ) {
        let mut visitor = EventVisitor::default();
        event.record(&mut visitor);

        self.captured.lock().push(CapturedEvent {
            level: *event.metadata().level(),
            target: event.metadata().target().to_string(),
            message: visitor.message,
            fields: visitor.fields,
        });
    }
}

#[derive(Default)]
struct EventVisitor {
    message: String,
    fields: BTreeMap<String, String>,
}

impl Visit for EventVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = value.to_string();
        } else {
            self.fields.insert(field.name().to_string(), value.to_string());
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{:?}", value);
        } else {
            self.fields
                .insert(field.name().to_string(), format!("{:?}", value));
        }
    }
}
