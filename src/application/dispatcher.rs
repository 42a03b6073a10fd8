//! Notification dispatch coordination.
//!
//! The dispatcher decides, for one event at one location, whether observers
//! hear about it:
//!
//! 1. Only the authoritative context notifies.
//! 2. Acceptable subjects need no notice.
//! 3. Duplicates within the window are dropped.
//! 4. Everything else is rendered and handed to the sender.
//!
//! No step ever panics or returns an error to the event source.

use crate::application::metrics::Metrics;
use crate::application::ports::{Sender, Storage};
use crate::application::store::DedupStore;
use crate::application::validator::{panic_message, Validator, Verdict};
use crate::domain::location::LocationKey;
use crate::domain::subject::Subject;
use crate::domain::template::MessageTemplate;
use crate::domain::window::DedupEntry;
use parking_lot::RwLock;
use std::borrow::Cow;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use tracing::{debug, error, trace, warn};

/// Execution role of the caller.
///
/// The same event can be observed from several vantage points; only the
/// authoritative one may emit notices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    /// Permitted to emit notifications
    Authoritative,
    /// Observes events but never notifies
    Observer,
}

impl Role {
    /// Map an "is authoritative" flag to a role.
    pub fn from_authoritative(is_authoritative: bool) -> Self {
        if is_authoritative {
            Role::Authoritative
        } else {
            Role::Observer
        }
    }
}

/// One observed state change.
#[derive(Debug, Clone)]
pub struct NotifyEvent<'a> {
    /// Where it happened
    pub location: LocationKey,
    /// What was placed there, if anything
    pub subject: Option<&'a dyn Subject>,
    /// Label embedded in the notice and used for deduplication
    pub label: Cow<'a, str>,
    /// Caller clock, in milliseconds
    pub now_ms: i64,
    /// Role of the observing context
    pub role: Role,
}

impl<'a> NotifyEvent<'a> {
    /// Create an event with an explicit label.
    pub fn new(
        location: LocationKey,
        subject: Option<&'a dyn Subject>,
        label: impl Into<Cow<'a, str>>,
        now_ms: i64,
        role: Role,
    ) -> Self {
        Self {
            location,
            subject,
            label: label.into(),
            now_ms,
            role,
        }
    }

    /// Create an event labelled with the subject's display name.
    pub fn for_subject(
        location: LocationKey,
        subject: &'a dyn Subject,
        now_ms: i64,
        role: Role,
    ) -> Self {
        Self {
            location,
            subject: Some(subject),
            label: subject.display_name(),
            now_ms,
            role,
        }
    }
}

/// What the dispatcher did with an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Caller was not authoritative; nothing happened
    NotAuthoritative,
    /// Subject passed validation; no notice needed
    Acceptable,
    /// Same notice already sent within the window
    Duplicate,
    /// Notice handed to the sender
    Delivered,
    /// Sender failed; the failure was logged
    DeliveryFailed,
}

impl DispatchOutcome {
    /// Whether the sender was invoked.
    pub fn reached_sender(&self) -> bool {
        matches!(
            self,
            DispatchOutcome::Delivered | DispatchOutcome::DeliveryFailed
        )
    }
}

/// Coordinates validation, deduplication and delivery.
///
/// Holds handles to its collaborators only. Each handle can be swapped at
/// any time; a call already in progress keeps the handles it started with.
#[derive(Debug)]
pub struct Dispatcher<S>
where
    S: Storage<LocationKey, DedupEntry>,
{
    store: RwLock<Arc<DedupStore<S>>>,
    validator: RwLock<Arc<Validator>>,
    sender: RwLock<Arc<dyn Sender>>,
    template: MessageTemplate,
    metrics: Metrics,
}

impl<S> Dispatcher<S>
where
    S: Storage<LocationKey, DedupEntry>,
{
    /// Create a dispatcher from its collaborators.
    pub fn new(
        store: Arc<DedupStore<S>>,
        validator: Validator,
        sender: Arc<dyn Sender>,
        template: MessageTemplate,
    ) -> Self {
        Self {
            store: RwLock::new(store),
            validator: RwLock::new(Arc::new(validator)),
            sender: RwLock::new(sender),
            template,
            metrics: Metrics::new(),
        }
    }

    /// Use an existing metrics tracker.
    pub fn with_metrics(mut self, metrics: Metrics) -> Self {
        self.metrics = metrics;
        self
    }

    /// Handle one event.
    ///
    /// Exactly one sender call happens when the caller is authoritative, the
    /// subject cannot proceed and the notice is not a duplicate. Otherwise
    /// the sender is not touched.
    pub fn maybe_notify(&self, event: NotifyEvent<'_>) -> DispatchOutcome {
        self.metrics.record_seen();

        if event.role != Role::Authoritative {
            trace!(location = %event.location, "not authoritative; skipping");
            self.metrics.record_not_authoritative();
            return DispatchOutcome::NotAuthoritative;
        }

        // Snapshot every handle before doing any work.
        let validator = self.validator();
        let store = self.store();
        let sender = self.sender();

        match validator.assess(event.subject) {
            Verdict::Proceed => {
                self.metrics.record_acceptable();
                return DispatchOutcome::Acceptable;
            }
            Verdict::Fault(_) => self.metrics.record_validation_fault(),
            Verdict::Reject => {}
        }

        if !store.should_send(event.location, &event.label, event.now_ms) {
            debug!(
                location = %event.location,
                label = %event.label,
                now_ms = event.now_ms,
                "duplicate notice suppressed"
            );
            self.metrics.record_duplicate();
            return DispatchOutcome::Duplicate;
        }

        let message = self.template.render(&event.label);
        let delivered =
            panic::catch_unwind(AssertUnwindSafe(|| sender.deliver(event.location, &message)));

        match delivered {
            Ok(Ok(())) => {
                self.metrics.record_delivered();
                DispatchOutcome::Delivered
            }
            Ok(Err(e)) => {
                warn!(location = %event.location, error = %e, "failed to deliver notice");
                self.metrics.record_delivery_failure();
                DispatchOutcome::DeliveryFailed
            }
            Err(payload) => {
                error!(
                    location = %event.location,
                    panic = %panic_message(payload.as_ref()),
                    "sender panicked while delivering notice"
                );
                self.metrics.record_delivery_failure();
                DispatchOutcome::DeliveryFailed
            }
        }
    }

    /// Current store handle.
    pub fn store(&self) -> Arc<DedupStore<S>> {
        self.store.read().clone()
    }

    /// Current validator handle.
    pub fn validator(&self) -> Arc<Validator> {
        self.validator.read().clone()
    }

    /// Current sender handle.
    pub fn sender(&self) -> Arc<dyn Sender> {
        self.sender.read().clone()
    }

    /// Swap the store, returning the previous one.
    pub fn replace_store(&self, store: Arc<DedupStore<S>>) -> Arc<DedupStore<S>> {
        std::mem::replace(&mut *self.store.write(), store)
    }

    /// Swap the validator, returning the previous one.
    pub fn replace_validator(&self, validator: Validator) -> Arc<Validator> {
        std::mem::replace(&mut *self.validator.write(), Arc::new(validator))
    }

    /// Swap the sender, returning the previous one.
    pub fn replace_sender(&self, sender: Arc<dyn Sender>) -> Arc<dyn Sender> {
        std::mem::replace(&mut *self.sender.write(), sender)
    }

    /// The message template.
    pub fn template(&self) -> &MessageTemplate {
        &self.template
    }

    /// Dispatch metrics.
    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }
}
