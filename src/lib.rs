//! # quern-notify
//!
//! Position-keyed, time-windowed notification deduplication for block
//! interaction handlers.
//!
//! A grinding block (a quern) receives an item it cannot process. The host
//! wants to tell nearby players once, not on every tick the interaction
//! fires. This crate decides when that notice should go out:
//!
//! 1. Only the authoritative side (the server) notifies.
//! 2. A [`Validator`] decides whether the item is acceptable. It fails
//!    closed: any fault while inspecting the item counts as "not acceptable".
//! 3. A [`DedupStore`] suppresses repeats of the same label at the same
//!    location inside a window (500 ms by default).
//! 4. The [`Sender`] delivers the rendered message.
//!
//! ## Quick Start
//!
//! ```rust
//! use quern_notify::{ItemStack, LocationKey, Notifier, RecordingSender, Role};
//! use std::time::Duration;
//!
//! let sender = RecordingSender::new();
//! let notifier = Notifier::builder()
//!     .with_window(Duration::from_millis(500))
//!     .with_sender(sender.clone())
//!     .build()
//!     .unwrap();
//!
//! let bone = ItemStack::new("game:bone").named("Bone");
//! let quern = LocationKey::new(12, 70, -4);
//!
//! notifier.notify(quern, Some(&bone), 1_000, Role::Authoritative); // sent
//! notifier.notify(quern, Some(&bone), 1_300, Role::Authoritative); // suppressed
//! notifier.notify(quern, Some(&bone), 1_500, Role::Authoritative); // sent
//!
//! assert_eq!(sender.count(), 2);
//! assert_eq!(sender.deliveries()[0].message, "'Bone' cannot be ground in a quern.");
//! ```
//!
//! ## Capability Strategies
//!
//! Two ways to decide whether an item can be processed:
//!
//! - **Declared**: the item carries its own capability descriptor; the item
//!   is acceptable when the descriptor names a result.
//! - **Registry**: the item is acceptable when any registered [`Rule`]
//!   matches it.
//!
//! ```rust
//! use quern_notify::{IngredientRule, ItemStack, Strategy, Validator};
//! use std::sync::Arc;
//!
//! let validator = Validator::new(Strategy::registry(vec![
//!     Arc::new(IngredientRule::new("game:grain-*").producing("game:flour")),
//! ]));
//!
//! let rye = ItemStack::new("game:grain-rye");
//! assert!(validator.can_proceed(Some(&rye)));
//! assert!(!validator.can_proceed(None));
//! ```
//!
//! ## The Dedup Rule
//!
//! For a location, a notice is sent when any of these hold:
//! - nothing has been recorded for the location yet,
//! - the label differs from the last one sent there,
//! - at least the window has elapsed since the last send.
//!
//! Suppressed calls do not move the window. A burst of identical
//! interactions therefore produces one notice per window, not one notice
//! followed by silence.
//!
//! ```rust
//! use quern_notify::{DedupStore, DedupWindow, LocationKey, ShardedStorage};
//!
//! let store = DedupStore::new(ShardedStorage::new(), DedupWindow::from_millis(500));
//! let pos = LocationKey::new(0, 0, 0);
//!
//! assert!(store.should_send(pos, "Flint", 0));
//! assert!(!store.should_send(pos, "Flint", 499));
//! assert!(store.should_send(pos, "Bone", 499));
//! assert!(store.should_send(pos, "Bone", 999));
//! ```
//!
//! ## Sessions
//!
//! Dedup state is per session. Call [`Notifier::reset_session`] when the
//! world is reloaded, and [`Notifier::purge_expired`] periodically if the
//! number of distinct locations grows without bound.
//!
//! ## Observability
//!
//! Decisions are logged through `tracing` (debug for routine, warn for
//! validation faults, error for panics) and counted in [`Metrics`]:
//!
//! ```rust
//! # use quern_notify::{Notifier, NullSender};
//! let notifier = Notifier::builder().with_sender(NullSender).build().unwrap();
//! let snapshot = notifier.metrics().snapshot();
//! println!("delivered: {}", snapshot.notifications_delivered);
//! println!("suppressed: {}", snapshot.duplicates_suppressed);
//! ```

// Domain layer - pure business logic
pub mod domain;

// Application layer - orchestration
pub mod application;

// Infrastructure layer - external adapters
pub mod infrastructure;

// Re-export commonly used types for convenience
pub use domain::{
    capability::{Capability, CapabilityDescriptor, ValidationError},
    location::LocationKey,
    rule::{FnRule, IngredientRule, MatchFn, Rule},
    strategy::{CapabilityStrategy, DeclaredCapability, RegistryScan, Strategy},
    subject::{ItemStack, Subject},
    template::{MessageTemplate, TemplateError, DEFAULT_TEMPLATE, LABEL_PLACEHOLDER},
    window::{
        ClockRegression, DedupEntry, DedupWindow, SendReason, WindowDecision, DEFAULT_WINDOW_MS,
    },
};

pub use application::{
    dispatcher::{DispatchOutcome, Dispatcher, NotifyEvent, Role},
    metrics::{Metrics, MetricsSnapshot},
    ports::{SendError, Sender, Storage},
    store::DedupStore,
    validator::{Validator, Verdict},
};

pub use infrastructure::{
    config::{ConfigError, NotifierConfig},
    notifier::{DefaultStorage, Notifier, NotifierBuilder},
    sender::{Delivery, NullSender, RecordingSender, TracingSender, NOTICE_TARGET},
    storage::{LockedStorage, ShardedStorage},
};
