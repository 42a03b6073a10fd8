//! Storage implementations for dedup entries.
//!
//! Two adapters implement the [`Storage`] port:
//!
//! - [`ShardedStorage`]: DashMap-backed, per-shard locking. The default.
//! - [`LockedStorage`]: one `parking_lot::Mutex` around a map. Every
//!   operation, `clear` included, is a single global critical section.

use crate::application::ports::Storage;
use ahash::RandomState;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;
use std::sync::Arc;

/// Thread-safe sharded storage backed by DashMap.
///
/// Operations on one key hold that key's shard lock, so the
/// check-then-record step of the dedup store cannot race with itself.
/// `clear` empties shards one at a time.
#[derive(Debug)]
pub struct ShardedStorage<K, V>
where
    K: Eq + Hash + Clone,
{
    map: DashMap<K, V, RandomState>,
}

impl<K, V> ShardedStorage<K, V>
where
    K: Eq + Hash + Clone,
{
    /// Create a new sharded storage instance.
    pub fn new() -> Self {
        Self {
            map: DashMap::with_hasher(RandomState::new()),
        }
    }

    /// Create a storage with room for `capacity` entries.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            map: DashMap::with_capacity_and_hasher(capacity, RandomState::new()),
        }
    }
}

impl<K, V> Default for ShardedStorage<K, V>
where
    K: Eq + Hash + Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> Storage<K, V> for ShardedStorage<K, V>
where
    K: Hash + Eq + Clone + Send + Sync + Debug,
    V: Send + Sync + Debug,
{
    fn compute<F, R>(&self, key: K, f: F) -> R
    where
        F: FnOnce(Option<&V>) -> (Option<V>, R),
    {
        match self.map.entry(key) {
            Entry::Occupied(mut occupied) => {
                let (replacement, result) = f(Some(occupied.get()));
                if let Some(value) = replacement {
                    occupied.insert(value);
                }
                result
            }
            Entry::Vacant(vacant) => {
                let (replacement, result) = f(None);
                if let Some(value) = replacement {
                    vacant.insert(value);
                }
                result
            }
        }
    }

    fn get_cloned(&self, key: &K) -> Option<V>
    where
        V: Clone,
    {
        self.map.get(key).map(|value| value.value().clone())
    }

    fn len(&self) -> usize {
        self.map.len()
    }

    fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    fn clear(&self) {
        self.map.clear()
    }

    fn retain<F>(&self, f: F)
    where
        F: FnMut(&K, &mut V) -> bool,
    {
        self.map.retain(f);
    }
}

/// Storage guarded by a single mutex.
///
/// Slower under contention than [`ShardedStorage`], but `clear` is atomic
/// with respect to every other operation.
#[derive(Debug)]
pub struct LockedStorage<K, V> {
    map: Mutex<HashMap<K, V, RandomState>>,
}

impl<K, V> LockedStorage<K, V> {
    /// Create an empty storage.
    pub fn new() -> Self {
        Self {
            map: Mutex::new(HashMap::with_hasher(RandomState::new())),
        }
    }
}

impl<K, V> Default for LockedStorage<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> Storage<K, V> for LockedStorage<K, V>
where
    K: Hash + Eq + Clone + Send + Sync + Debug,
    V: Send + Sync + Debug,
{
    fn compute<F, R>(&self, key: K, f: F) -> R
    where
        F: FnOnce(Option<&V>) -> (Option<V>, R),
    {
        let mut map = self.map.lock();
        let (replacement, result) = f(map.get(&key));
        if let Some(value) = replacement {
            map.insert(key, value);
        }
        result
    }

    fn get_cloned(&self, key: &K) -> Option<V>
    where
        V: Clone,
    {
        self.map.lock().get(key).cloned()
    }

    fn len(&self) -> usize {
        self.map.lock().len()
    }

    fn is_empty(&self) -> bool {
        self.map.lock().is_empty()
    }

    fn clear(&self) {
        self.map.lock().clear()
    }

    fn retain<F>(&self, f: F)
    where
        F: FnMut(&K, &mut V) -> bool,
    {
        self.map.lock().retain(f);
    }
}

// Lets one storage be shared between a store and whoever inspects it.
impl<K, V, S> Storage<K, V> for Arc<S>
where
    K: Hash + Eq + Clone + Send + Sync,
    V: Send + Sync,
    S: Storage<K, V>,
{
    fn compute<F, R>(&self, key: K, f: F) -> R
    where
        F: FnOnce(Option<&V>) -> (Option<V>, R),
    {
        (**self).compute(key, f)
    }

    fn get_cloned(&self, key: &K) -> Option<V>
    where
        V: Clone,
    {
        (**self).get_cloned(key)
    }

    fn len(&self) -> usize {
        (**self).len()
    }

    fn is_empty(&self) -> bool {
        (**self).is_empty()
    }

    fn clear(&self) {
        (**self).clear()
    }

    fn retain<F>(&self, f: F)
    where
        F: FnMut(&K, &mut V) -> bool,
    {
        (**self).retain(f)
    }
}
