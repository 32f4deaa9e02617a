//! Cache Store Module
//!
//! Generic expiring key-value store guarded by a single mutex, with a
//! background sweep started at construction.

use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::cache::{CacheEntry, Entries, ParallelMapError, Values, DEFAULT_SWEEP_INTERVAL};
use crate::tasks::{spawn_sweep_task, SweepHandle};

// == TTL Cache ==
/// Concurrency-safe expiring key-value store.
///
/// Reads (`get`, `pop`) never return stale entries. Structural operations
/// (`update`, `len`, `values`, `entries`, `all`, `parallel_map`) see every
/// stored entry, stale ones included, until the sweep reclaims them.
#[derive(Debug)]
pub struct TtlCache<K, V> {
    /// Key-value storage
    entries: Mutex<HashMap<K, CacheEntry<V>>>,
    /// TTL applied by `set`
    default_ttl: Duration,
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash + Clone + Send + 'static,
    V: Clone + Send + 'static,
{
    // == Constructors ==
    /// Creates a cache and starts its sweep on the default interval.
    ///
    /// Must be called from within a tokio runtime. The returned handle stops
    /// the sweep when shut down or dropped.
    pub fn new(default_ttl: Duration) -> (Arc<Self>, SweepHandle) {
        Self::with_sweep_interval(default_ttl, DEFAULT_SWEEP_INTERVAL)
    }

    /// Creates a cache whose sweep runs every `sweep_interval`.
    pub fn with_sweep_interval(
        default_ttl: Duration,
        sweep_interval: Duration,
    ) -> (Arc<Self>, SweepHandle) {
        let cache = Arc::new(Self::detached(default_ttl));
        let task = spawn_sweep_task(Arc::downgrade(&cache), sweep_interval);
        (cache, SweepHandle::new(task))
    }

    /// Creates a cache without any background sweep.
    pub(crate) fn detached(default_ttl: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            default_ttl,
        }
    }

    /// Returns the TTL applied by [`set`](Self::set).
    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    // == Set ==
    /// Inserts or replaces `key` using the default TTL.
    pub fn set(&self, key: K, value: V) {
        self.set_with_ttl(key, value, self.default_ttl);
    }

    /// Inserts or replaces `key`, expiring `ttl` from now.
    pub fn set_with_ttl(&self, key: K, value: V, ttl: Duration) {
        self.entries.lock().insert(key, CacheEntry::new(value, ttl));
    }

    // == Get ==
    /// Returns the live value for `key`.
    ///
    /// A stale entry is deleted and reported as a miss.
    pub fn get(&self, key: &K) -> Option<V> {
        let mut entries = self.entries.lock();
        let entry = entries.get(key)?;

        if entry.is_expired() {
            entries.remove(key);
            return None;
        }

        Some(entry.value.clone())
    }

    // == Pop ==
    /// Removes `key` and returns its value if it was still live.
    ///
    /// The entry is deleted whether or not it had expired.
    pub fn pop(&self, key: &K) -> Option<V> {
        let entry = self.entries.lock().remove(key)?;

        if entry.is_expired() {
            return None;
        }

        Some(entry.value)
    }

    // == Remove ==
    /// Deletes `key`. Absent keys are ignored.
    pub fn remove(&self, key: &K) {
        self.entries.lock().remove(key);
    }

    // == Update ==
    /// Replaces the value of `key` with `f(old)`, keeping its deadline.
    ///
    /// Expiry is not checked, so a stale entry that has not been swept yet is
    /// updated as well. Returns whether the key was present.
    pub fn update<F>(&self, key: &K, f: F) -> bool
    where
        F: FnOnce(V) -> V,
    {
        let mut entries = self.entries.lock();
        match entries.remove(key) {
            Some(entry) => {
                let updated = CacheEntry {
                    value: f(entry.value),
                    expires_at: entry.expires_at,
                };
                entries.insert(key.clone(), updated);
                true
            }
            None => false,
        }
    }

    // == Length ==
    /// Number of stored entries, including stale ones not yet swept.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Returns true if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    // == Enumeration ==
    /// Lazily yields every stored value. Holds the lock while alive.
    pub fn values(&self) -> Values<'_, K, V> {
        Values::new(self.entries.lock())
    }

    /// Lazily yields every stored `(key, value)` pair. Holds the lock while alive.
    pub fn entries(&self) -> Entries<'_, K, V> {
        Entries::new(self.entries.lock())
    }

    /// Collects [`values`](Self::values). Order is unspecified.
    pub fn all(&self) -> Vec<V> {
        self.values().collect()
    }

    // == Cleanup Expired ==
    /// Removes all expired entries.
    ///
    /// Returns the number of entries removed.
    pub fn cleanup_expired(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.entries.lock();
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired_at(now));
        before - entries.len()
    }

    // == Parallel Map ==
    /// Runs `f` over a snapshot of every stored entry with at most `limit`
    /// workers in flight (`0` means unbounded).
    ///
    /// The lock is only held while the snapshot is copied. Results come back
    /// in completion order. The first failing worker closes the permit pool,
    /// so workers still waiting for a permit never start, and every running
    /// worker is aborted; its error is returned. Dropping the returned future
    /// aborts all workers as well.
    pub async fn parallel_map<R, E, F, Fut>(
        &self,
        limit: usize,
        f: F,
    ) -> Result<Vec<R>, ParallelMapError<E>>
    where
        F: Fn(K, V) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<R, E>> + Send + 'static,
        R: Send + 'static,
        E: Send + 'static,
    {
        let snapshot: Vec<(K, V)> = self.entries().collect();
        let permits = if limit == 0 {
            Semaphore::MAX_PERMITS
        } else {
            limit
        };
        let semaphore = Arc::new(Semaphore::new(permits));
        let f = Arc::new(f);

        let mut workers = JoinSet::new();
        for (key, value) in snapshot {
            let semaphore = Arc::clone(&semaphore);
            let f = Arc::clone(&f);
            workers.spawn(async move {
                // Closed after a failure: skip instead of starting.
                let Ok(_permit) = Arc::clone(&semaphore).acquire_owned().await else {
                    return Ok(None);
                };
                let result = f(key, value).await;
                if result.is_err() {
                    // Before `_permit` is released, so no waiter slips in.
                    semaphore.close();
                }
                result.map(Some)
            });
        }

        let mut results = Vec::with_capacity(workers.len());
        while let Some(joined) = workers.join_next().await {
            match joined {
                Ok(Ok(Some(result))) => results.push(result),
                Ok(Ok(None)) => {}
                Ok(Err(err)) => {
                    workers.abort_all();
                    return Err(ParallelMapError::Worker(err));
                }
                Err(err) => {
                    semaphore.close();
                    workers.abort_all();
                    return Err(ParallelMapError::Join(err));
                }
            }
        }

        Ok(results)
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread::sleep;

    fn cache(ttl_ms: u64) -> TtlCache<String, i32> {
        TtlCache::detached(Duration::from_millis(ttl_ms))
    }

    #[test]
    fn test_store_new() {
        let store = cache(300);
        assert_eq!(store.len(), 0);
        assert!(store.is_empty());
        assert_eq!(store.default_ttl(), Duration::from_millis(300));
    }

    #[test]
    fn test_store_set_and_get() {
        let store = cache(10_000);

        store.set("key1".to_string(), 1);

        assert_eq!(store.get(&"key1".to_string()), Some(1));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_store_get_nonexistent() {
        let store = cache(10_000);
        assert_eq!(store.get(&"nonexistent".to_string()), None);
    }

    #[test]
    fn test_store_overwrite() {
        let store = cache(10_000);

        store.set("key1".to_string(), 1);
        store.set("key1".to_string(), 2);

        assert_eq!(store.get(&"key1".to_string()), Some(2));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_store_ttl_expiration() {
        let store = cache(100);

        store.set_with_ttl("a".to_string(), 1, Duration::from_millis(50));
        assert_eq!(store.get(&"a".to_string()), Some(1));

        sleep(Duration::from_millis(60));

        // Still physically stored until touched
        assert_eq!(store.len(), 1);
        assert_eq!(store.get(&"a".to_string()), None);
        // The miss deleted it
        assert_eq!(store.len(), 0);
    }

    #[test]
    fn test_store_default_ttl_applies() {
        let store = cache(30);

        store.set("key".to_string(), 7);
        sleep(Duration::from_millis(50));

        assert_eq!(store.get(&"key".to_string()), None);
    }

    #[test]
    fn test_store_pop() {
        let store = cache(10_000);

        store.set("x".to_string(), 10);

        assert_eq!(store.pop(&"x".to_string()), Some(10));
        assert_eq!(store.pop(&"x".to_string()), None);
        assert_eq!(store.get(&"x".to_string()), None);
    }

    #[test]
    fn test_store_pop_expired_removes_entry() {
        let store = cache(10_000);

        store.set_with_ttl("x".to_string(), 10, Duration::ZERO);

        assert_eq!(store.len(), 1);
        assert_eq!(store.pop(&"x".to_string()), None);
        assert_eq!(store.len(), 0);
    }

    #[test]
    fn test_store_remove() {
        let store = cache(10_000);

        store.set("key1".to_string(), 1);
        store.remove(&"key1".to_string());
        store.remove(&"never_set".to_string());

        assert!(store.is_empty());
    }

    #[test]
    fn test_store_update_preserves_other_keys() {
        let store = cache(10_000);

        store.set("a".to_string(), 1);
        store.set("b".to_string(), 2);

        assert!(store.update(&"a".to_string(), |v| v * 10));
        assert!(!store.update(&"missing".to_string(), |v| v * 10));

        assert_eq!(store.get(&"a".to_string()), Some(10));
        assert_eq!(store.get(&"b".to_string()), Some(2));
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_store_update_keeps_deadline() {
        let store = cache(10_000);

        store.set_with_ttl("a".to_string(), 1, Duration::from_millis(40));
        sleep(Duration::from_millis(20));
        store.update(&"a".to_string(), |v| v + 1);
        sleep(Duration::from_millis(30));

        assert_eq!(store.get(&"a".to_string()), None);
    }

    #[test]
    fn test_store_update_ignores_expiry() {
        let store = cache(10_000);

        store.set_with_ttl("a".to_string(), 1, Duration::ZERO);

        assert!(store.update(&"a".to_string(), |v| v + 1));
        assert_eq!(store.all(), vec![2]);
    }

    #[test]
    fn test_store_enumeration_includes_stale() {
        let store = cache(10_000);

        store.set("live".to_string(), 1);
        store.set_with_ttl("stale".to_string(), 2, Duration::ZERO);

        let mut values = store.all();
        values.sort();
        assert_eq!(values, vec![1, 2]);

        let mut pairs: Vec<(String, i32)> = store.entries().collect();
        pairs.sort();
        assert_eq!(
            pairs,
            vec![("live".to_string(), 1), ("stale".to_string(), 2)]
        );
    }

    #[test]
    fn test_store_iterators_restart_per_call() {
        let store = cache(10_000);

        store.set("a".to_string(), 1);
        store.set("b".to_string(), 2);

        assert_eq!(store.values().take(1).count(), 1);
        assert_eq!(store.values().count(), 2);
        assert_eq!(store.entries().count(), 2);
    }

    #[test]
    fn test_store_cleanup_expired() {
        let store = cache(10_000);

        store.set_with_ttl("key1".to_string(), 1, Duration::from_millis(20));
        store.set_with_ttl("key2".to_string(), 2, Duration::from_secs(10));

        sleep(Duration::from_millis(40));

        let removed = store.cleanup_expired();
        assert_eq!(removed, 1);
        assert_eq!(store.len(), 1);
        assert_eq!(store.get(&"key2".to_string()), Some(2));
    }

    #[tokio::test]
    async fn test_parallel_map_collects_all_results() {
        let store = cache(10_000);
        for i in 0..20 {
            store.set(format!("key{i}"), i);
        }

        let mut results = store
            .parallel_map(4, |key, value| async move {
                Ok::<_, String>(format!("{key}={value}"))
            })
            .await
            .unwrap();
        results.sort();

        assert_eq!(results.len(), 20);
        assert!(results.contains(&"key7=7".to_string()));
    }

    #[tokio::test]
    async fn test_parallel_map_returns_worker_error() {
        let store = cache(10_000);
        for i in 0..10 {
            store.set(format!("key{i}"), i);
        }

        let result = store
            .parallel_map(2, |_, value| async move {
                if value == 5 {
                    Err(format!("failed on {value}"))
                } else {
                    Ok(value)
                }
            })
            .await;

        match result {
            Err(ParallelMapError::Worker(msg)) => assert_eq!(msg, "failed on 5"),
            other => panic!("expected worker error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_parallel_map_failure_stops_waiting_workers() {
        let store = cache(10_000);
        for i in 0..8 {
            store.set(format!("key{i}"), i);
        }

        let started = Arc::new(AtomicUsize::new(0));
        let started_in = Arc::clone(&started);

        let result = store
            .parallel_map(1, move |_, value| {
                let started = Arc::clone(&started_in);
                async move {
                    started.fetch_add(1, Ordering::SeqCst);
                    Err::<i32, _>(format!("failed on {value}"))
                }
            })
            .await;

        assert!(matches!(result, Err(ParallelMapError::Worker(_))));
        // Give any wrongly released worker a chance to run
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(started.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_parallel_map_dropped_future_aborts_workers() {
        let store = cache(10_000);
        for i in 0..8 {
            store.set(format!("key{i}"), i);
        }

        let completed = Arc::new(AtomicUsize::new(0));
        let completed_in = Arc::clone(&completed);

        let outcome = tokio::time::timeout(
            Duration::from_millis(20),
            store.parallel_map(0, move |_, value| {
                let completed = Arc::clone(&completed_in);
                async move {
                    tokio::time::sleep(Duration::from_millis(100)).await;
                    completed.fetch_add(1, Ordering::SeqCst);
                    Ok::<_, ()>(value)
                }
            }),
        )
        .await;
        assert!(outcome.is_err(), "parallel_map should still be running");

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(completed.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_parallel_map_respects_limit() {
        let store = cache(10_000);
        for i in 0..16 {
            store.set(format!("key{i}"), i);
        }

        let active = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));
        let (active_in, peak_in) = (Arc::clone(&active), Arc::clone(&peak));

        let results = store
            .parallel_map(3, move |_, value| {
                let active = Arc::clone(&active_in);
                let peak = Arc::clone(&peak_in);
                async move {
                    let now = active.fetch_add(1, Ordering::SeqCst) + 1;
                    peak.fetch_max(now, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(5)).await;
                    active.fetch_sub(1, Ordering::SeqCst);
                    Ok::<_, ()>(value)
                }
            })
            .await
            .unwrap();

        assert_eq!(results.len(), 16);
        assert!(peak.load(Ordering::SeqCst) <= 3);
    }

    #[tokio::test]
    async fn test_parallel_map_does_not_hold_lock() {
        let store = Arc::new(cache(10_000));
        store.set("a".to_string(), 1);

        let inner = Arc::clone(&store);
        let results = store
            .parallel_map(1, move |key, value| {
                let inner = Arc::clone(&inner);
                async move {
                    inner.update(&key, |v| v + 100);
                    Ok::<_, ()>(value)
                }
            })
            .await
            .unwrap();

        assert_eq!(results, vec![1]);
        assert_eq!(store.get(&"a".to_string()), Some(101));
    }

    #[tokio::test]
    async fn test_parallel_map_empty_cache() {
        let store = cache(10_000);

        let results = store
            .parallel_map(0, |_, value| async move { Ok::<_, ()>(value) })
            .await
            .unwrap();

        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_new_starts_sweep() {
        let (store, sweep) =
            TtlCache::<String, i32>::with_sweep_interval(Duration::from_millis(20), Duration::from_millis(30));

        store.set("short".to_string(), 1);
        store.set_with_ttl("long".to_string(), 2, Duration::from_secs(60));

        tokio::time::sleep(Duration::from_millis(120)).await;

        assert_eq!(store.len(), 1);
        assert_eq!(store.get(&"long".to_string()), Some(2));

        sweep.shutdown().await;
    }
}
