//! # Concurrent Cache Tier
//!
//! One lock guards the LRU core and the pending table of a tier. The lock is
//! never held while a value is generated; concurrent misses on the same key
//! park on that key's pending slot instead of generating twice.

use std::collections::HashMap;
use std::hash::Hash;
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};

use super::lru::{CacheEntry, LruCache};
use super::stats::CacheStats;
use crate::error::{CacheError, CacheResult};

/// Progress of an in-flight generation.
enum SlotState<V> {
    Running,
    Ready(Arc<V>),
    Abandoned,
}

/// Rendezvous point for callers waiting on the same key.
struct PendingSlot<V> {
    state: Mutex<SlotState<V>>,
    ready: Condvar,
}

impl<V> PendingSlot<V> {
    fn new() -> Self {
        Self {
            state: Mutex::new(SlotState::Running),
            ready: Condvar::new(),
        }
    }

    fn finish(&self, outcome: SlotState<V>) {
        *self.state.lock() = outcome;
        self.ready.notify_all();
    }

    /// Blocks until the owner finishes. `None` means the owner gave up.
    fn wait(&self) -> Option<Arc<V>> {
        let mut state = self.state.lock();
        while matches!(*state, SlotState::Running) {
            self.ready.wait(&mut state);
        }
        match &*state {
            SlotState::Ready(value) => Some(Arc::clone(value)),
            SlotState::Running | SlotState::Abandoned => None,
        }
    }
}

/// Who is asking: interactive lookups refresh recency and count in stats,
/// background fills do neither unless they generate.
#[derive(Clone, Copy, PartialEq, Eq)]
enum Lookup {
    Request,
    Fill,
}

enum Claim<V> {
    Resident(Arc<V>),
    Wait(Arc<PendingSlot<V>>),
    Owner(Arc<PendingSlot<V>>),
}

struct TierState<K, V> {
    lru: LruCache<K, V>,
    pending: HashMap<K, Arc<PendingSlot<V>>>,
    hits: u64,
    misses: u64,
    collapsed: u64,
    evictions: u64,
}

/// Thread-safe LRU tier with duplicate suppression.
///
/// Values are handed out as `Arc<V>`; an eviction only drops the tier's
/// handle, so a reader's view stays valid for as long as it holds it.
///
/// # Example
///
/// ```rust,ignore
/// let tier: CacheTier<u32, String> = CacheTier::new("regional", 2)?;
/// let v = tier.get_or_insert(7, || Ok::<_, ()>(format!("block {}", 7)))?;
/// ```
pub struct CacheTier<K, V>
where
    K: Eq + Hash + Clone,
{
    name: &'static str,
    state: Mutex<TierState<K, V>>,
}

impl<K, V> CacheTier<K, V>
where
    K: Eq + Hash + Clone,
{
    /// Creates a tier holding at most `capacity` entries.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::ZeroCapacity`] if `capacity` is zero.
    pub fn new(name: &'static str, capacity: usize) -> CacheResult<Self> {
        let capacity = NonZeroUsize::new(capacity).ok_or(CacheError::ZeroCapacity { tier: name })?;
        Ok(Self {
            name,
            state: Mutex::new(TierState {
                lru: LruCache::new(capacity),
                pending: HashMap::new(),
                hits: 0,
                misses: 0,
                collapsed: 0,
                evictions: 0,
            }),
        })
    }

    /// Returns the tier's name.
    #[inline]
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Returns the configured capacity.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.state.lock().lru.capacity()
    }

    /// Returns the number of resident entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.state.lock().lru.len()
    }

    /// Returns true if nothing is resident.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.state.lock().lru.is_empty()
    }

    /// Returns the cached value for `key`, generating it on a miss.
    ///
    /// A hit refreshes the entry's recency. On a miss `generate` runs without
    /// the tier lock held; other callers asking for the same key meanwhile
    /// wait for this result instead of generating their own.
    ///
    /// # Errors
    ///
    /// Propagates the error returned by `generate`. Nothing is cached in
    /// that case and waiting callers retry on their own.
    pub fn get_or_insert<E, F>(&self, key: K, generate: F) -> Result<Arc<V>, E>
    where
        F: FnOnce() -> Result<V, E>,
    {
        loop {
            match self.claim(&key, Lookup::Request) {
                Claim::Resident(value) => return Ok(value),
                Claim::Wait(slot) => {
                    if let Some(value) = slot.wait() {
                        return Ok(value);
                    }
                }
                Claim::Owner(slot) => return self.generate_as_owner(key, slot, generate),
            }
        }
    }

    /// Like [`CacheTier::get_or_insert`], but a resident value keeps its
    /// recency and no hit or collapse is counted.
    ///
    /// Background fills read parents through this, so speculative work does
    /// not keep parents alive ahead of what callers actually use.
    ///
    /// # Errors
    ///
    /// Propagates the error returned by `generate`.
    pub fn peek_or_insert<E, F>(&self, key: K, generate: F) -> Result<Arc<V>, E>
    where
        F: FnOnce() -> Result<V, E>,
    {
        loop {
            match self.claim(&key, Lookup::Fill) {
                Claim::Resident(value) => return Ok(value),
                Claim::Wait(slot) => {
                    if let Some(value) = slot.wait() {
                        return Ok(value);
                    }
                }
                Claim::Owner(slot) => return self.generate_as_owner(key, slot, generate),
            }
        }
    }

    /// Generates `key` only if it is neither resident nor already in flight.
    ///
    /// Used by background workers: a resident entry is left untouched so that
    /// speculative fills do not distort recency.
    ///
    /// # Returns
    ///
    /// `true` if this call generated and inserted the value.
    ///
    /// # Errors
    ///
    /// Propagates the error returned by `generate`.
    pub fn fill<E, F>(&self, key: K, generate: F) -> Result<bool, E>
    where
        F: FnOnce() -> Result<V, E>,
    {
        match self.claim(&key, Lookup::Fill) {
            Claim::Resident(_) | Claim::Wait(_) => Ok(false),
            Claim::Owner(slot) => self.generate_as_owner(key, slot, generate).map(|_| true),
        }
    }

    /// Returns the value for `key` without refreshing recency or counting stats.
    #[must_use]
    pub fn peek(&self, key: &K) -> Option<Arc<V>> {
        self.state.lock().lru.peek(key).map(CacheEntry::value)
    }

    /// Returns true if `key` is resident.
    #[must_use]
    pub fn contains(&self, key: &K) -> bool {
        self.state.lock().lru.contains(key)
    }

    /// Returns true if `key` is resident or currently being generated.
    #[must_use]
    pub fn is_known(&self, key: &K) -> bool {
        let state = self.state.lock();
        state.lru.contains(key) || state.pending.contains_key(key)
    }

    /// Returns how long the resident value for `key` took to generate.
    #[must_use]
    pub fn entry_cost(&self, key: &K) -> Option<Duration> {
        self.state.lock().lru.peek(key).map(CacheEntry::cost)
    }

    /// Returns resident keys from least to most recently used.
    #[must_use]
    pub fn keys_by_recency(&self) -> Vec<K> {
        self.state.lock().lru.keys_by_recency().cloned().collect()
    }

    /// Returns a snapshot of this tier's counters.
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        let state = self.state.lock();
        CacheStats {
            hits: state.hits,
            misses: state.misses,
            collapsed: state.collapsed,
            evictions: state.evictions,
            resident: state.lru.len(),
            capacity: state.lru.capacity(),
        }
    }

    fn claim(&self, key: &K, lookup: Lookup) -> Claim<V> {
        let mut state = self.state.lock();

        let resident = match lookup {
            Lookup::Request => state.lru.get(key),
            Lookup::Fill => state.lru.peek(key).map(CacheEntry::value),
        };
        if let Some(value) = resident {
            if lookup == Lookup::Request {
                state.hits += 1;
            }
            return Claim::Resident(value);
        }

        if let Some(slot) = state.pending.get(key).map(Arc::clone) {
            if lookup == Lookup::Request {
                state.collapsed += 1;
            }
            return Claim::Wait(slot);
        }

        state.misses += 1;
        let slot = Arc::new(PendingSlot::new());
        state.pending.insert(key.clone(), Arc::clone(&slot));
        Claim::Owner(slot)
    }

    fn generate_as_owner<E, F>(&self, key: K, slot: Arc<PendingSlot<V>>, generate: F) -> Result<Arc<V>, E>
    where
        F: FnOnce() -> Result<V, E>,
    {
        let guard = PendingGuard {
            tier: self,
            key: Some(key),
            slot,
        };
        let started = Instant::now();
        let value = Arc::new(generate()?);
        Ok(guard.complete(value, started.elapsed()))
    }
}

/// Clears a pending slot if its owner returns an error or unwinds.
struct PendingGuard<'a, K, V>
where
    K: Eq + Hash + Clone,
{
    tier: &'a CacheTier<K, V>,
    key: Option<K>,
    slot: Arc<PendingSlot<V>>,
}

impl<K, V> PendingGuard<'_, K, V>
where
    K: Eq + Hash + Clone,
{
    fn complete(mut self, value: Arc<V>, cost: Duration) -> Arc<V> {
        let Some(key) = self.key.take() else {
            return value;
        };

        let evicted = {
            let mut state = self.tier.state.lock();
            let evicted = state.lru.insert(key.clone(), Arc::clone(&value), cost);
            state.pending.remove(&key);
            state.evictions += evicted.len() as u64;
            evicted
        };

        self.slot.finish(SlotState::Ready(Arc::clone(&value)));

        if !evicted.is_empty() {
            tracing::debug!(
                tier = self.tier.name,
                count = evicted.len(),
                "evicted least-recently-used entries"
            );
        }
        value
    }
}

impl<K, V> Drop for PendingGuard<'_, K, V>
where
    K: Eq + Hash + Clone,
{
    fn drop(&mut self) {
        if let Some(key) = self.key.take() {
            self.tier.state.lock().pending.remove(&key);
            self.slot.finish(SlotState::Abandoned);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::panic::{self, AssertUnwindSafe};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Barrier;
    use std::thread;

    fn ok<T>(value: T) -> impl FnOnce() -> Result<T, ()> {
        move || Ok(value)
    }

    #[test]
    fn test_zero_capacity_rejected() {
        let result: CacheResult<CacheTier<u32, u32>> = CacheTier::new("world", 0);
        assert_eq!(result.err(), Some(CacheError::ZeroCapacity { tier: "world" }));
    }

    #[test]
    fn test_lru_recency_scenario() {
        let tier: CacheTier<char, u32> = CacheTier::new("test", 3).unwrap();
        tier.get_or_insert('A', ok(1)).unwrap();
        tier.get_or_insert('B', ok(2)).unwrap();
        tier.get_or_insert('C', ok(3)).unwrap();
        assert_eq!(*tier.get_or_insert('A', ok(99)).unwrap(), 1);
        tier.get_or_insert('D', ok(4)).unwrap();

        assert!(!tier.contains(&'B'));
        assert!(tier.contains(&'A'));
        assert!(tier.contains(&'C'));
        assert!(tier.contains(&'D'));
        assert_eq!(tier.stats().evictions, 1);
    }

    #[test]
    fn test_hit_does_not_regenerate() {
        let tier: CacheTier<u32, u32> = CacheTier::new("test", 4).unwrap();
        let calls = AtomicUsize::new(0);
        for _ in 0..5 {
            let v = tier
                .get_or_insert(1, || {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok::<_, ()>(10)
                })
                .unwrap();
            assert_eq!(*v, 10);
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        let stats = tier.stats();
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.hits, 4);
        assert_eq!(stats.resident, 1);
    }

    #[test]
    fn test_value_belongs_to_requested_key() {
        let tier: CacheTier<u32, u32> = CacheTier::new("test", 3).unwrap();
        for round in 0..3 {
            for key in 0..10u32 {
                let v = tier.get_or_insert(key, || Ok::<_, ()>(key * 100)).unwrap();
                assert_eq!(*v, key * 100, "round {round}");
            }
        }
    }

    #[test]
    fn test_error_is_not_cached() {
        let tier: CacheTier<u32, u32> = CacheTier::new("test", 2).unwrap();
        let result = tier.get_or_insert(5, || Err::<u32, _>("boom"));
        assert_eq!(result.err(), Some("boom"));
        assert!(!tier.is_known(&5));

        let v = tier.get_or_insert(5, || Ok::<_, &str>(50)).unwrap();
        assert_eq!(*v, 50);
    }

    #[test]
    fn test_panic_releases_pending_slot() {
        let tier: CacheTier<u32, u32> = CacheTier::new("test", 2).unwrap();
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            let _ = tier.get_or_insert(9, || -> Result<u32, ()> { panic!("generator exploded") });
        }));
        assert!(outcome.is_err());
        assert!(!tier.is_known(&9));

        let v = tier.get_or_insert(9, ok(90)).unwrap();
        assert_eq!(*v, 90);
    }

    #[test]
    fn test_concurrent_misses_collapse() {
        let tier: Arc<CacheTier<u32, u64>> = Arc::new(CacheTier::new("test", 8).unwrap());
        let calls = Arc::new(AtomicUsize::new(0));
        let barrier = Arc::new(Barrier::new(8));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let tier = Arc::clone(&tier);
                let calls = Arc::clone(&calls);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    tier.get_or_insert(42, || {
                        calls.fetch_add(1, Ordering::SeqCst);
                        thread::sleep(Duration::from_millis(50));
                        Ok::<_, ()>(4242)
                    })
                    .unwrap()
                })
            })
            .collect();

        for handle in handles {
            assert_eq!(*handle.join().unwrap(), 4242);
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        let stats = tier.stats();
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.hits + stats.collapsed, 7);
    }

    #[test]
    fn test_fill_skips_resident_and_keeps_recency() {
        let tier: CacheTier<char, u32> = CacheTier::new("test", 2).unwrap();
        tier.get_or_insert('a', ok(1)).unwrap();
        tier.get_or_insert('b', ok(2)).unwrap();

        assert!(!tier.fill('a', ok(100)).unwrap());
        assert_eq!(tier.keys_by_recency(), vec!['a', 'b']);
        assert_eq!(tier.stats().hits, 0);

        assert!(tier.fill('c', ok(3)).unwrap());
        assert_eq!(tier.keys_by_recency(), vec!['b', 'c']);
    }

    #[test]
    fn test_peek_or_insert_keeps_recency() {
        let tier: CacheTier<char, u32> = CacheTier::new("test", 2).unwrap();
        tier.get_or_insert('a', ok(1)).unwrap();
        tier.get_or_insert('b', ok(2)).unwrap();

        assert_eq!(*tier.peek_or_insert('a', ok(100)).unwrap(), 1);
        assert_eq!(tier.keys_by_recency(), vec!['a', 'b']);
        assert_eq!(tier.stats().hits, 0);

        // Absent keys are generated and inserted as usual
        assert_eq!(*tier.peek_or_insert('c', ok(3)).unwrap(), 3);
        assert_eq!(tier.keys_by_recency(), vec!['b', 'c']);
        assert_eq!(tier.stats().misses, 3);
    }

    #[test]
    fn test_eviction_then_regeneration_is_identical() {
        let tier: CacheTier<u32, Vec<u32>> = CacheTier::new("test", 1).unwrap();
        let make = |k: u32| move || Ok::<_, ()>((0..k).collect::<Vec<_>>());

        let first = tier.get_or_insert(3, make(3)).unwrap();
        tier.get_or_insert(4, make(4)).unwrap();
        assert!(!tier.contains(&3));

        let again = tier.get_or_insert(3, make(3)).unwrap();
        assert_eq!(*first, *again);
        // Reader's handle survived eviction
        assert_eq!(first.len(), 3);
    }

    #[test]
    fn test_entry_cost_recorded() {
        let tier: CacheTier<u32, u32> = CacheTier::new("test", 1).unwrap();
        tier.get_or_insert(1, || {
            thread::sleep(Duration::from_millis(5));
            Ok::<_, ()>(1)
        })
        .unwrap();
        assert!(tier.entry_cost(&1).unwrap() >= Duration::from_millis(5));
        assert!(tier.entry_cost(&2).is_none());
    }
}
