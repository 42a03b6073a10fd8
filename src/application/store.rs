//! Position-keyed dedup store.
//!
//! The store remembers, per location, the last label a notification was sent
//! for and when. It never reads a clock: every call carries its own
//! timestamp, which keeps it deterministic.

use crate::application::ports::Storage;
use crate::domain::location::LocationKey;
use crate::domain::window::{DedupEntry, DedupWindow, SendReason, WindowDecision};
use tracing::debug;

/// Dedup state for one logical session.
///
/// Generic over the storage implementation. In production, use
/// `ShardedStorage<LocationKey, DedupEntry>`.
#[derive(Debug)]
pub struct DedupStore<S>
where
    S: Storage<LocationKey, DedupEntry>,
{
    storage: S,
    window: DedupWindow,
}

impl<S> DedupStore<S>
where
    S: Storage<LocationKey, DedupEntry>,
{
    /// Create a store over `storage` using `window`.
    pub fn new(storage: S, window: DedupWindow) -> Self {
        Self { storage, window }
    }

    /// The window this store was built with.
    pub fn window(&self) -> DedupWindow {
        self.window
    }

    /// Decide whether a notification for `label` at `key` goes out, recording
    /// it if so.
    ///
    /// The lookup, the decision and the write happen under one storage lock,
    /// so concurrent callers can never both see "not a duplicate" for the same
    /// send.
    pub fn check(&self, key: LocationKey, label: &str, now_ms: i64) -> WindowDecision {
        let window = self.window;
        let decision = self.storage.compute(key, |previous| {
            let decision = window.decide(previous, label, now_ms);
            match decision {
                WindowDecision::Send(_) => (Some(DedupEntry::new(label, now_ms)), decision),
                WindowDecision::Suppress => (None, decision),
            }
        });

        if decision == WindowDecision::Send(SendReason::ClockRegressed) {
            debug!(
                location = %key,
                label,
                now_ms,
                "timestamp went backwards; treating notification as new"
            );
        }

        decision
    }

    /// `true` if a notification for `label` at `key` should be sent now.
    pub fn should_send(&self, key: LocationKey, label: &str, now_ms: i64) -> bool {
        self.check(key, label, now_ms).is_send()
    }

    /// Snapshot of the entry recorded for `key`.
    pub fn entry(&self, key: LocationKey) -> Option<DedupEntry> {
        self.storage.get_cloned(&key)
    }

    /// Drop entries that can no longer suppress anything at or after `now_ms`.
    ///
    /// Returns the number of entries removed. Later `should_send` calls with
    /// timestamps `>= now_ms` answer exactly as they would have without the
    /// purge.
    pub fn purge_expired(&self, now_ms: i64) -> usize {
        let window = self.window;
        let mut removed = 0;
        self.storage.retain(|_, entry| {
            let expired = window.is_expired(entry, now_ms);
            if expired {
                removed += 1;
            }
            !expired
        });
        if removed > 0 {
            debug!(removed, now_ms, "purged expired dedup entries");
        }
        removed
    }

    /// Forget every entry. Afterwards all locations behave as new.
    pub fn clear(&self) {
        self.storage.clear();
    }

    /// Number of locations with a recorded send.
    pub fn len(&self) -> usize {
        self.storage.len()
    }

    /// Check if nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.storage.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::window::ClockRegression;
    use crate::infrastructure::storage::{LockedStorage, ShardedStorage};
    use std::sync::Arc;
    use std::thread;

    const P: LocationKey = LocationKey::new(1, 2, 3);
    const Q: LocationKey = LocationKey::new(4, 5, 6);

    fn store(window_ms: u64) -> DedupStore<ShardedStorage<LocationKey, DedupEntry>> {
        DedupStore::new(ShardedStorage::new(), DedupWindow::from_millis(window_ms))
    }

    #[test]
    fn test_first_call_records_entry() {
        let store = store(500);

        assert!(store.is_empty());
        assert_eq!(store.check(P, "Flint", 1000), WindowDecision::Send(SendReason::FirstSeen));
        assert_eq!(store.entry(P), Some(DedupEntry::new("Flint", 1000)));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_suppressed_call_does_not_move_window() {
        let store = store(500);

        assert!(store.should_send(P, "Flint", 1000));
        assert!(!store.should_send(P, "Flint", 1300));
        assert_eq!(store.entry(P), Some(DedupEntry::new("Flint", 1000)));

        // Measured from 1000, not 1300
        assert!(store.should_send(P, "Flint", 1500));
        assert_eq!(store.entry(P), Some(DedupEntry::new("Flint", 1500)));
    }

    #[test]
    fn test_label_change_restarts_window() {
        let store = store(500);

        assert!(store.should_send(P, "Flint", 1000));
        assert!(store.should_send(P, "Bone", 1200));
        assert!(!store.should_send(P, "Bone", 1600));
        assert!(store.should_send(P, "Bone", 1700));
    }

    #[test]
    fn test_clear_forgets_everything() {
        let store = store(500);

        store.should_send(P, "Flint", 1000);
        store.should_send(Q, "Bone", 1000);
        store.clear();

        assert!(store.is_empty());
        assert!(store.should_send(P, "Flint", 1000));
        assert!(store.should_send(Q, "Bone", 1001));
    }

    #[test]
    fn test_clock_regression_default_resends() {
        let store = store(500);

        assert!(store.should_send(P, "Flint", 1000));
        assert_eq!(
            store.check(P, "Flint", 200),
            WindowDecision::Send(SendReason::ClockRegressed)
        );
        assert_eq!(store.entry(P), Some(DedupEntry::new("Flint", 200)));
        assert!(!store.should_send(P, "Flint", 300));
    }

    #[test]
    fn test_clock_regression_suppress() {
        let store = DedupStore::new(
            ShardedStorage::new(),
            DedupWindow::from_millis(500).with_clock_regression(ClockRegression::Suppress),
        );

        assert!(store.should_send(P, "Flint", 1000));
        assert!(!store.should_send(P, "Flint", 200));
        assert_eq!(store.entry(P), Some(DedupEntry::new("Flint", 1000)));
    }

    #[test]
    fn test_purge_expired_is_invisible() {
        let purged = store(500);
        let untouched = store(500);

        for s in [&purged, &untouched] {
            s.should_send(P, "Flint", 1000);
            s.should_send(Q, "Flint", 1400);
        }

        assert_eq!(purged.purge_expired(1500), 1);
        assert_eq!(purged.entry(P), None);
        assert!(purged.entry(Q).is_some());

        for (key, now) in [(P, 1500), (Q, 1500), (Q, 1900), (P, 1600)] {
            assert_eq!(
                purged.should_send(key, "Flint", now),
                untouched.should_send(key, "Flint", now),
                "diverged at {} {}",
                key,
                now
            );
        }
    }

    #[test]
    fn test_purge_keeps_future_entries() {
        let store = store(500);
        store.should_send(P, "Flint", 5000);

        assert_eq!(store.purge_expired(1000), 0);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_concurrent_same_key_single_winner() {
        let store = Arc::new(store(500));
        let mut handles = vec![];

        for _ in 0..16 {
            let store = Arc::clone(&store);
            handles.push(thread::spawn(move || store.should_send(P, "Flint", 1000)));
        }

        let sent = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|sent| *sent)
            .count();

        assert_eq!(sent, 1);
    }

    #[test]
    fn test_locked_storage_backend() {
        let store = DedupStore::new(LockedStorage::new(), DedupWindow::from_millis(1000));

        assert!(store.should_send(P, "Flint", 1000));
        assert!(!store.should_send(P, "Flint", 1999));
        assert!(store.should_send(P, "Flint", 2000));
    }
}
