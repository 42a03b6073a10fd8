//! Observability metrics for notification dispatch.
//!
//! Counts what happened to every event handed to the dispatcher.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Metrics tracking dispatch statistics.
///
/// All counters use relaxed atomics; clones share the same counters.
#[derive(Debug, Clone)]
pub struct Metrics {
    inner: Arc<MetricsInner>,
}

#[derive(Debug, Default)]
struct MetricsInner {
    /// Events handed to the dispatcher
    events_seen: AtomicU64,
    /// Events ignored because the caller was not authoritative
    skipped_not_authoritative: AtomicU64,
    /// Events whose subject passed validation
    subjects_acceptable: AtomicU64,
    /// Events dropped as duplicates within the window
    duplicates_suppressed: AtomicU64,
    /// Notifications handed to the sender successfully
    notifications_delivered: AtomicU64,
    /// Notifications the sender failed to deliver
    delivery_failures: AtomicU64,
    /// Validation errors and panics converted to "cannot proceed"
    validation_faults: AtomicU64,
}

impl Metrics {
    /// Create a new metrics tracker.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(MetricsInner::default()),
        }
    }

    pub(crate) fn record_seen(&self) {
        self.inner.events_seen.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_not_authoritative(&self) {
        self.inner
            .skipped_not_authoritative
            .fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_acceptable(&self) {
        self.inner.subjects_acceptable.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_duplicate(&self) {
        self.inner
            .duplicates_suppressed
            .fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_delivered(&self) {
        self.inner
            .notifications_delivered
            .fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_delivery_failure(&self) {
        self.inner.delivery_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_validation_fault(&self) {
        self.inner.validation_faults.fetch_add(1, Ordering::Relaxed);
    }

    /// Events handed to the dispatcher.
    pub fn events_seen(&self) -> u64 {
        self.inner.events_seen.load(Ordering::Relaxed)
    }

    /// Events ignored outside the authoritative context.
    pub fn skipped_not_authoritative(&self) -> u64 {
        self.inner.skipped_not_authoritative.load(Ordering::Relaxed)
    }

    /// Events whose subject was acceptable.
    pub fn subjects_acceptable(&self) -> u64 {
        self.inner.subjects_acceptable.load(Ordering::Relaxed)
    }

    /// Events suppressed as duplicates.
    pub fn duplicates_suppressed(&self) -> u64 {
        self.inner.duplicates_suppressed.load(Ordering::Relaxed)
    }

    /// Notifications delivered.
    pub fn notifications_delivered(&self) -> u64 {
        self.inner.notifications_delivered.load(Ordering::Relaxed)
    }

    /// Notifications that failed to deliver.
    pub fn delivery_failures(&self) -> u64 {
        self.inner.delivery_failures.load(Ordering::Relaxed)
    }

    /// Validation faults.
    pub fn validation_faults(&self) -> u64 {
        self.inner.validation_faults.load(Ordering::Relaxed)
    }

    /// Get a snapshot of all metrics.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            events_seen: self.events_seen(),
            skipped_not_authoritative: self.skipped_not_authoritative(),
            subjects_acceptable: self.subjects_acceptable(),
            duplicates_suppressed: self.duplicates_suppressed(),
            notifications_delivered: self.notifications_delivered(),
            delivery_failures: self.delivery_failures(),
            validation_faults: self.validation_faults(),
        }
    }

    /// Reset all metrics to zero.
    pub fn reset(&self) {
        let inner = &self.inner;
        for counter in [
            &inner.events_seen,
            &inner.skipped_not_authoritative,
            &inner.subjects_acceptable,
            &inner.duplicates_suppressed,
            &inner.notifications_delivered,
            &inner.delivery_failures,
            &inner.validation_faults,
        ] {
            counter.store(0, Ordering::Relaxed);
        }
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

/// A point-in-time snapshot of metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MetricsSnapshot {
    /// Total events handed to the dispatcher
    pub events_seen: u64,
    /// Events dropped because the caller was not authoritative
    pub skipped_not_authoritative: u64,
    /// Events whose subject passed validation
    pub subjects_acceptable: u64,
    /// Notices suppressed as duplicates within the window
    pub duplicates_suppressed: u64,
    /// Notices the sender accepted
    pub notifications_delivered: u64,
    /// Notices the sender rejected or panicked on
    pub delivery_failures: u64,
    /// Validations that errored or panicked
    pub validation_faults: u64,
}

impl MetricsSnapshot {
    /// Share of would-be notifications dropped as duplicates (0.0 to 1.0).
    ///
    /// Counts only events that reached the dedup store. Returns 0.0 when
    /// none did.
    pub fn suppression_rate(&self) -> f64 {
        let reached_store = self.notifications_attempted() + self.duplicates_suppressed;
        if reached_store == 0 {
            0.0
        } else {
            self.duplicates_suppressed as f64 / reached_store as f64
        }
    }

    /// Notifications handed to the sender, successful or not.
    pub fn notifications_attempted(&self) -> u64 {
        self.notifications_delivered
            .saturating_add(self.delivery_failures)
    }
}
