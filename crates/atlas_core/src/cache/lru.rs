//! # LRU Core
//!
//! Single-threaded least-recently-used map. Every access stamps the entry
//! with a fresh sequence number; eviction walks sequence numbers upward.

use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::Duration;

/// A resident value plus its bookkeeping.
#[derive(Debug)]
pub struct CacheEntry<V> {
    /// Shared read-only value.
    value: Arc<V>,
    /// Sequence number of the most recent access.
    last_access: u64,
    /// Wall-clock time spent generating the value.
    cost: Duration,
}

impl<V> CacheEntry<V> {
    /// Returns a shared handle to the value.
    #[inline]
    #[must_use]
    pub fn value(&self) -> Arc<V> {
        Arc::clone(&self.value)
    }

    /// Returns the sequence number of the last access.
    #[inline]
    #[must_use]
    pub const fn last_access(&self) -> u64 {
        self.last_access
    }

    /// Returns how long the value took to generate.
    #[inline]
    #[must_use]
    pub const fn cost(&self) -> Duration {
        self.cost
    }
}

/// Bounded map with strict least-recently-used eviction.
///
/// # Thread Safety
///
/// Not thread-safe. [`super::CacheTier`] wraps one of these in a lock.
#[derive(Debug)]
pub struct LruCache<K, V> {
    /// Resident entries.
    entries: HashMap<K, CacheEntry<V>>,
    /// Access order: sequence number to key, oldest first.
    order: BTreeMap<u64, K>,
    /// Maximum number of resident entries.
    capacity: NonZeroUsize,
    /// Next sequence number to hand out.
    next_seq: u64,
}

impl<K, V> LruCache<K, V>
where
    K: Eq + Hash + Clone,
{
    /// Creates an empty cache holding at most `capacity` entries.
    #[must_use]
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            entries: HashMap::with_capacity(capacity.get()),
            order: BTreeMap::new(),
            capacity,
            next_seq: 0,
        }
    }

    /// Returns the maximum number of resident entries.
    #[inline]
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity.get()
    }

    /// Returns the number of resident entries.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing is resident.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns true if `key` is resident. Does not refresh its access order.
    #[inline]
    #[must_use]
    pub fn contains(&self, key: &K) -> bool {
        self.entries.contains_key(key)
    }

    /// Looks up an entry without refreshing its access order.
    #[inline]
    #[must_use]
    pub fn peek(&self, key: &K) -> Option<&CacheEntry<V>> {
        self.entries.get(key)
    }

    /// Looks up `key` and marks it most recently used.
    pub fn get(&mut self, key: &K) -> Option<Arc<V>> {
        let seq = self.bump();
        let entry = self.entries.get_mut(key)?;
        self.order.remove(&entry.last_access);
        entry.last_access = seq;
        self.order.insert(seq, key.clone());
        Some(Arc::clone(&entry.value))
    }

    /// Inserts `value` as the most recently used entry.
    ///
    /// Evicts least-recently-used entries until the cache is back within
    /// capacity. The inserted key is never among the evicted.
    ///
    /// # Returns
    ///
    /// The evicted `(key, value)` pairs, oldest first.
    pub fn insert(&mut self, key: K, value: Arc<V>, cost: Duration) -> Vec<(K, Arc<V>)> {
        let seq = self.bump();
        let entry = CacheEntry {
            value,
            last_access: seq,
            cost,
        };
        if let Some(previous) = self.entries.insert(key.clone(), entry) {
            self.order.remove(&previous.last_access);
        }
        self.order.insert(seq, key);

        let mut evicted = Vec::new();
        while self.entries.len() > self.capacity.get() {
            let Some((oldest_seq, oldest_key)) = self.order.pop_first() else {
                break;
            };
            debug_assert_ne!(oldest_seq, seq, "freshly inserted entry selected for eviction");
            if let Some(entry) = self.entries.remove(&oldest_key) {
                evicted.push((oldest_key, entry.value));
            }
        }
        evicted
    }

    /// Iterates resident keys from least to most recently used.
    pub fn keys_by_recency(&self) -> impl Iterator<Item = &K> {
        self.order.values()
    }

    fn bump(&mut self) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        seq
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cache(capacity: usize) -> LruCache<char, u32> {
        LruCache::new(NonZeroUsize::new(capacity).unwrap())
    }

    fn put(cache: &mut LruCache<char, u32>, key: char, value: u32) -> Vec<char> {
        cache
            .insert(key, Arc::new(value), Duration::ZERO)
            .into_iter()
            .map(|(k, _)| k)
            .collect()
    }

    #[test]
    fn test_lru_eviction() {
        let mut cache = cache(2);
        assert!(put(&mut cache, 'a', 1).is_empty());
        assert!(put(&mut cache, 'b', 2).is_empty());

        let evicted = put(&mut cache, 'c', 3);
        assert_eq!(evicted, vec!['a']);
        assert_eq!(cache.len(), 2);
        assert!(!cache.contains(&'a'));
    }

    #[test]
    fn test_lru_access_updates_order() {
        let mut cache = cache(2);
        put(&mut cache, 'a', 1);
        put(&mut cache, 'b', 2);

        assert_eq!(cache.get(&'a').as_deref(), Some(&1));
        let evicted = put(&mut cache, 'c', 3);

        assert_eq!(evicted, vec!['b']);
        assert!(cache.contains(&'a'));
        assert!(cache.contains(&'c'));
    }

    #[test]
    fn test_peek_does_not_refresh() {
        let mut cache = cache(2);
        put(&mut cache, 'a', 1);
        put(&mut cache, 'b', 2);

        assert!(cache.peek(&'a').is_some());
        assert_eq!(put(&mut cache, 'c', 3), vec!['a']);
    }

    #[test]
    fn test_reinsert_replaces_without_growth() {
        let mut cache = cache(2);
        put(&mut cache, 'a', 1);
        put(&mut cache, 'b', 2);
        assert!(put(&mut cache, 'a', 10).is_empty());

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get(&'a').as_deref(), Some(&10));
        let order: Vec<char> = cache.keys_by_recency().copied().collect();
        assert_eq!(order, vec!['b', 'a']);
    }

    #[test]
    fn test_capacity_one_keeps_newest() {
        let mut cache = cache(1);
        put(&mut cache, 'a', 1);
        assert_eq!(put(&mut cache, 'b', 2), vec!['a']);
        assert!(cache.contains(&'b'));
    }

    #[test]
    fn test_sequence_numbers_increase() {
        let mut cache = cache(4);
        put(&mut cache, 'a', 1);
        let first = cache.peek(&'a').unwrap().last_access();
        cache.get(&'a');
        let second = cache.peek(&'a').unwrap().last_access();
        assert!(second > first);
    }
}
