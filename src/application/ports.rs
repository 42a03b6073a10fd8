//! Ports (interfaces) for the application layer.
//!
//! In hexagonal architecture, ports define the interfaces that the application
//! layer needs. Infrastructure adapters implement these ports.

use crate::domain::location::LocationKey;
use std::fmt::Debug;
use std::hash::Hash;
use thiserror::Error;

/// Port for concurrent key-value storage.
///
/// This abstraction allows the dedup store to keep its entries without
/// depending on a specific concurrent map. Infrastructure provides concrete
/// implementations (ShardedStorage, LockedStorage).
pub trait Storage<K, V>: Send + Sync + Debug
where
    K: Hash + Eq + Clone + Send + Sync,
    V: Send + Sync,
{
    /// Inspect and optionally replace the value for `key` as one atomic step.
    ///
    /// The closure receives the current value (if any) and returns the value
    /// to store (`None` leaves the slot unchanged) together with a result.
    /// No other operation on the same key can interleave with the closure.
    fn compute<F, R>(&self, key: K, f: F) -> R
    where
        F: FnOnce(Option<&V>) -> (Option<V>, R);

    /// Get a clone of the value for `key`.
    fn get_cloned(&self, key: &K) -> Option<V>
    where
        V: Clone;

    /// Get the number of entries in the storage.
    fn len(&self) -> usize;

    /// Check if the storage is empty.
    fn is_empty(&self) -> bool;

    /// Clear all entries from the storage.
    fn clear(&self);

    /// Remove entries for which the predicate returns false.
    fn retain<F>(&self, f: F)
    where
        F: FnMut(&K, &mut V) -> bool;
}

/// Error returned by a [`Sender`] that could not deliver a message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SendError {
    /// No observer could be reached
    #[error("no observers reachable near {0}")]
    NoObservers(LocationKey),

    /// The delivery channel is gone
    #[error("delivery channel closed")]
    Closed,

    /// Adapter-specific failure
    #[error("delivery failed: {0}")]
    Other(String),
}

/// Port for delivering rendered notifications to observers.
///
/// Deciding *who* is near enough to `location` belongs to the adapter.
pub trait Sender: Send + Sync + Debug {
    /// Deliver `message` to the observers of `location`.
    fn deliver(&self, location: LocationKey, message: &str) -> Result<(), SendError>;
}

impl<T: Sender + ?Sized> Sender for std::sync::Arc<T> {
    fn deliver(&self, location: LocationKey, message: &str) -> Result<(), SendError> {
        (**self).deliver(location, message)
    }
}
