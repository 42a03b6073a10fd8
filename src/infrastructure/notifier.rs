//! Notifier facade.
//!
//! [`Notifier`] is the composition root: it owns one session's dedup store
//! and the dispatcher wired to it. Hosts build one per session (world load)
//! and call [`Notifier::reset_session`] on reload.

use crate::application::{
    dispatcher::{DispatchOutcome, Dispatcher, NotifyEvent, Role},
    metrics::Metrics,
    ports::{Sender, Storage},
    store::DedupStore,
    validator::Validator,
};
use crate::domain::{
    location::LocationKey,
    strategy::Strategy,
    subject::Subject,
    template::MessageTemplate,
    window::{ClockRegression, DedupEntry, DedupWindow},
};
use crate::infrastructure::config::{ConfigError, NotifierConfig};
use crate::infrastructure::sender::TracingSender;
use crate::infrastructure::storage::ShardedStorage;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Storage used unless the builder is given another.
pub type DefaultStorage = ShardedStorage<LocationKey, DedupEntry>;

/// Builder for constructing a [`Notifier`].
pub struct NotifierBuilder<S = DefaultStorage> {
    window_ms: u64,
    message_template: String,
    clock_regression: ClockRegression,
    strategy: Strategy,
    sender: Option<Arc<dyn Sender>>,
    metrics: Option<Metrics>,
    storage: S,
}

impl NotifierBuilder<DefaultStorage> {
    /// Start from the defaults: 500 ms window, declared-capability strategy,
    /// default template, notices emitted through `tracing`.
    pub fn new() -> Self {
        Self::from_config(&NotifierConfig::default())
    }

    /// Start from a configuration document.
    pub fn from_config(config: &NotifierConfig) -> Self {
        Self {
            window_ms: config.window_ms,
            message_template: config.message_template.clone(),
            clock_regression: config.clock_regression,
            strategy: Strategy::default(),
            sender: None,
            metrics: None,
            storage: DefaultStorage::new(),
        }
    }
}

impl Default for NotifierBuilder<DefaultStorage> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> NotifierBuilder<S> {
    /// Set the dedup window.
    ///
    /// Truncated to whole milliseconds; validated when `build()` is called.
    pub fn with_window(mut self, window: Duration) -> Self {
        self.window_ms = u64::try_from(window.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Set the dedup window in milliseconds.
    pub fn with_window_ms(mut self, window_ms: u64) -> Self {
        self.window_ms = window_ms;
        self
    }

    /// Set the message template. Must contain `{label}`.
    pub fn with_message_template(mut self, template: impl Into<String>) -> Self {
        self.message_template = template.into();
        self
    }

    /// Set how timestamps earlier than the last send are handled.
    pub fn with_clock_regression(mut self, clock_regression: ClockRegression) -> Self {
        self.clock_regression = clock_regression;
        self
    }

    /// Set the capability strategy.
    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Set the sender.
    pub fn with_sender(self, sender: impl Sender + 'static) -> Self {
        self.with_shared_sender(Arc::new(sender))
    }

    /// Set a sender that is shared with other owners.
    pub fn with_shared_sender(mut self, sender: Arc<dyn Sender>) -> Self {
        self.sender = Some(sender);
        self
    }

    /// Report into an existing metrics tracker.
    pub fn with_metrics(mut self, metrics: Metrics) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Use a different storage backend.
    pub fn with_storage<T>(self, storage: T) -> NotifierBuilder<T>
    where
        T: Storage<LocationKey, DedupEntry>,
    {
        NotifierBuilder {
            window_ms: self.window_ms,
            message_template: self.message_template,
            clock_regression: self.clock_regression,
            strategy: self.strategy,
            sender: self.sender,
            metrics: self.metrics,
            storage,
        }
    }
}

impl<S> NotifierBuilder<S>
where
    S: Storage<LocationKey, DedupEntry>,
{
    /// Build the notifier.
    ///
    /// # Errors
    /// Returns `ConfigError` if the window is zero or the template lacks
    /// the `{label}` placeholder.
    pub fn build(self) -> Result<Notifier<S>, ConfigError> {
        if self.window_ms == 0 {
            return Err(ConfigError::ZeroWindow);
        }
        let template = MessageTemplate::new(self.message_template)?;

        if let Strategy::Registry(scan) = &self.strategy {
            if scan.is_empty() {
                warn!("registry strategy has no rules; every subject will be reported");
            }
        }

        let window =
            DedupWindow::from_millis(self.window_ms).with_clock_regression(self.clock_regression);
        let store = Arc::new(DedupStore::new(self.storage, window));
        let sender = self
            .sender
            .unwrap_or_else(|| Arc::new(TracingSender) as Arc<dyn Sender>);

        debug!(
            window_ms = self.window_ms,
            strategy = self.strategy.name(),
            "notifier built"
        );

        let mut dispatcher =
            Dispatcher::new(store, Validator::new(self.strategy), sender, template);
        if let Some(metrics) = self.metrics {
            dispatcher = dispatcher.with_metrics(metrics);
        }

        Ok(Notifier {
            dispatcher: Arc::new(dispatcher),
        })
    }
}

/// Deduplicating notifier for one session.
///
/// Cheap to clone; clones share the same store, sender and metrics.
///
/// # Example
/// ```
/// use quern_notify::{ItemStack, LocationKey, Notifier, RecordingSender, Role};
///
/// let sender = RecordingSender::new();
/// let notifier = Notifier::builder()
///     .with_sender(sender.clone())
///     .build()
///     .unwrap();
///
/// let flint = ItemStack::new("game:flint").named("Flint");
/// let pos = LocationKey::new(1, 2, 3);
///
/// notifier.notify(pos, Some(&flint), 1000, Role::Authoritative);
/// notifier.notify(pos, Some(&flint), 1200, Role::Authoritative);
///
/// assert_eq!(sender.count(), 1);
/// ```
pub struct Notifier<S = DefaultStorage>
where
    S: Storage<LocationKey, DedupEntry>,
{
    dispatcher: Arc<Dispatcher<S>>,
}

impl Notifier<DefaultStorage> {
    /// Create a notifier with default settings.
    pub fn new() -> Self {
        Self::builder()
            .build()
            .expect("default notifier configuration is valid")
    }

    /// Create a builder.
    pub fn builder() -> NotifierBuilder<DefaultStorage> {
        NotifierBuilder::new()
    }
}

impl Default for Notifier<DefaultStorage> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> Clone for Notifier<S>
where
    S: Storage<LocationKey, DedupEntry>,
{
    fn clone(&self) -> Self {
        Self {
            dispatcher: Arc::clone(&self.dispatcher),
        }
    }
}

impl<S> std::fmt::Debug for Notifier<S>
where
    S: Storage<LocationKey, DedupEntry>,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Notifier")
            .field("dispatcher", &self.dispatcher)
            .finish()
    }
}

impl<S> Notifier<S>
where
    S: Storage<LocationKey, DedupEntry>,
{
    /// Handle one event.
    pub fn maybe_notify(&self, event: NotifyEvent<'_>) -> DispatchOutcome {
        self.dispatcher.maybe_notify(event)
    }

    /// Handle one event, labelled with the subject's display name.
    ///
    /// Without a subject the label is empty.
    pub fn notify(
        &self,
        location: LocationKey,
        subject: Option<&dyn Subject>,
        now_ms: i64,
        role: Role,
    ) -> DispatchOutcome {
        let event = match subject {
            Some(subject) => NotifyEvent::for_subject(location, subject, now_ms, role),
            None => NotifyEvent::new(location, None, "", now_ms, role),
        };
        self.dispatcher.maybe_notify(event)
    }

    /// Forget all dedup state, e.g. on world reload.
    ///
    /// Each location is cleared atomically with respect to concurrent
    /// notifications for it. With the default [`ShardedStorage`] the reset
    /// walks shard by shard, so a notification racing the reset may land in
    /// an already cleared shard and survive it. Build with
    /// [`LockedStorage`](crate::infrastructure::storage::LockedStorage) when
    /// the whole reset must be a single atomic step.
    pub fn reset_session(&self) {
        let store = self.dispatcher.store();
        debug!(entries = store.len(), "resetting notifier session");
        store.clear();
    }

    /// Drop dedup entries that can no longer suppress anything.
    pub fn purge_expired(&self, now_ms: i64) -> usize {
        self.dispatcher.store().purge_expired(now_ms)
    }

    /// Number of locations currently tracked.
    pub fn tracked_locations(&self) -> usize {
        self.dispatcher.store().len()
    }

    /// The underlying dispatcher, for swapping collaborators.
    pub fn dispatcher(&self) -> &Dispatcher<S> {
        &self.dispatcher
    }

    /// Dispatch metrics.
    pub fn metrics(&self) -> &Metrics {
        self.dispatcher.metrics()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::capability::CapabilityDescriptor;
    use crate::domain::rule::IngredientRule;
    use crate::domain::subject::ItemStack;
    use crate::domain::template::TemplateError;
    use crate::infrastructure::mocks::MockCaptureLayer;
    use crate::infrastructure::sender::{RecordingSender, NOTICE_TARGET};
    use crate::infrastructure::storage::LockedStorage;
    use tracing_subscriber::layer::SubscriberExt;

    const POS: LocationKey = LocationKey::new(10, 64, -3);

    #[test]
    fn test_build_with_defaults() {
        let notifier = Notifier::builder().build().unwrap();
        assert_eq!(
            notifier.dispatcher().store().window(),
            DedupWindow::from_millis(500)
        );
        assert_eq!(notifier.dispatcher().validator().strategy().name(), "declared");
    }

    #[test]
    fn test_zero_window_rejected() {
        let result = Notifier::builder().with_window_ms(0).build();
        assert!(matches!(result, Err(ConfigError::ZeroWindow)));

        let result = Notifier::builder().with_window(Duration::from_micros(999)).build();
        assert!(matches!(result, Err(ConfigError::ZeroWindow)));
    }

    #[test]
    fn test_bad_template_rejected() {
        let result = Notifier::builder()
            .with_message_template("no placeholder")
            .build();
        assert!(matches!(
            result,
            Err(ConfigError::Template(TemplateError::MissingLabelPlaceholder(_)))
        ));
    }

    #[test]
    fn test_from_config() {
        let config = NotifierConfig {
            window_ms: 1000,
            message_template: "{label} is not grindable".to_string(),
            clock_regression: ClockRegression::Suppress,
        };
        let sender = RecordingSender::new();
        let notifier = NotifierBuilder::from_config(&config)
            .with_sender(sender.clone())
            .build()
            .unwrap();

        let flint = ItemStack::new("game:flint").named("Flint");
        notifier.notify(POS, Some(&flint), 1000, Role::Authoritative);
        notifier.notify(POS, Some(&flint), 1999, Role::Authoritative);
        notifier.notify(POS, Some(&flint), 500, Role::Authoritative);
        notifier.notify(POS, Some(&flint), 2000, Role::Authoritative);

        let messages: Vec<_> = sender.deliveries().into_iter().map(|d| d.message).collect();
        assert_eq!(messages, vec!["Flint is not grindable", "Flint is not grindable"]);
    }

    #[test]
    fn test_default_sender_emits_tracing_notice() {
        let capture = MockCaptureLayer::new();
        let subscriber = tracing_subscriber::registry().with(capture.clone());
        let notifier = Notifier::new();
        let flint = ItemStack::new("game:flint").named("Flint");

        tracing::subscriber::with_default(subscriber, || {
            notifier.notify(POS, Some(&flint), 0, Role::Authoritative);
        });

        let notices = capture.on_target(NOTICE_TARGET);
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].message, "'Flint' cannot be ground in a quern.");
    }

    #[test]
    fn test_registry_strategy_wiring() {
        let sender = RecordingSender::new();
        let notifier = Notifier::builder()
            .with_strategy(Strategy::registry(vec![Arc::new(IngredientRule::new(
                "game:grain-*",
            ))]))
            .with_sender(sender.clone())
            .build()
            .unwrap();

        let rye = ItemStack::new("game:grain-rye").named("Rye");
        let bone = ItemStack::new("game:bone").named("Bone");

        assert_eq!(
            notifier.notify(POS, Some(&rye), 0, Role::Authoritative),
            DispatchOutcome::Acceptable
        );
        assert_eq!(
            notifier.notify(POS, Some(&bone), 0, Role::Authoritative),
            DispatchOutcome::Delivered
        );
        assert_eq!(sender.count(), 1);
    }

    #[test]
    fn test_reset_session() {
        let sender = RecordingSender::new();
        let notifier = Notifier::builder()
            .with_sender(sender.clone())
            .build()
            .unwrap();
        let flint = ItemStack::new("game:flint").named("Flint");

        notifier.notify(POS, Some(&flint), 1000, Role::Authoritative);
        assert_eq!(notifier.tracked_locations(), 1);

        notifier.reset_session();
        assert_eq!(notifier.tracked_locations(), 0);

        notifier.notify(POS, Some(&flint), 1000, Role::Authoritative);
        assert_eq!(sender.count(), 2);
    }

    #[test]
    fn test_clones_share_state() {
        let sender = RecordingSender::new();
        let notifier = Notifier::builder()
            .with_sender(sender.clone())
            .build()
            .unwrap();
        let other = notifier.clone();
        let flint = ItemStack::new("game:flint").named("Flint");

        notifier.notify(POS, Some(&flint), 1000, Role::Authoritative);
        other.notify(POS, Some(&flint), 1100, Role::Authoritative);

        assert_eq!(sender.count(), 1);
        assert_eq!(other.metrics().duplicates_suppressed(), 1);
    }

    #[test]
    fn test_locked_storage_backend() {
        let sender = RecordingSender::new();
        let notifier = Notifier::builder()
            .with_storage(LockedStorage::new())
            .with_sender(sender.clone())
            .build()
            .unwrap();
        let grain = ItemStack::new("game:grain-spelt")
            .with_capability(CapabilityDescriptor::with_result("game:flour-spelt"));
        let flint = ItemStack::new("game:flint");

        notifier.notify(POS, Some(&grain), 0, Role::Authoritative);
        notifier.notify(POS, Some(&flint), 0, Role::Authoritative);

        assert_eq!(sender.count(), 1);
        assert_eq!(sender.deliveries()[0].message, "'game:flint' cannot be ground in a quern.");
    }

    #[test]
    fn test_reset_session_locked_storage() {
        let sender = RecordingSender::new();
        let notifier = Notifier::builder()
            .with_storage(LockedStorage::new())
            .with_sender(sender.clone())
            .build()
            .unwrap();
        let flint = ItemStack::new("game:flint").named("Flint");

        for x in 0..10 {
            notifier.notify(LocationKey::new(x, 0, 0), Some(&flint), 0, Role::Authoritative);
        }
        assert_eq!(notifier.tracked_locations(), 10);

        notifier.reset_session();
        assert_eq!(notifier.tracked_locations(), 0);

        for x in 0..10 {
            notifier.notify(LocationKey::new(x, 0, 0), Some(&flint), 1, Role::Authoritative);
        }
        assert_eq!(sender.count(), 20);
    }

    #[test]
    fn test_purge_expired() {
        let notifier = Notifier::builder()
            .with_sender(RecordingSender::new())
            .build()
            .unwrap();
        let flint = ItemStack::new("game:flint");

        notifier.notify(POS, Some(&flint), 0, Role::Authoritative);
        notifier.notify(LocationKey::new(0, 0, 0), Some(&flint), 400, Role::Authoritative);

        assert_eq!(notifier.purge_expired(500), 1);
        assert_eq!(notifier.tracked_locations(), 1);
    }

    #[test]
    fn test_shared_metrics() {
        let metrics = Metrics::new();
        let notifier = Notifier::builder()
            .with_sender(RecordingSender::new())
            .with_metrics(metrics.clone())
            .build()
            .unwrap();

        notifier.notify(POS, None, 0, Role::Observer);
        assert_eq!(metrics.skipped_not_authoritative(), 1);
    }
}
