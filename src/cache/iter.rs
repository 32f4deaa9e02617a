//! Lazy iterators over a locked cache map.
//!
//! Both iterators keep the cache lock for as long as they are alive. Calling
//! any other operation on the same cache from inside the loop deadlocks.

use std::collections::HashMap;
use std::hash::Hash;

use parking_lot::MutexGuard;

use crate::cache::CacheEntry;

/// Iterator over every stored value, stale entries included.
pub struct Values<'a, K, V> {
    guard: MutexGuard<'a, HashMap<K, CacheEntry<V>>>,
    keys: std::vec::IntoIter<K>,
}

impl<'a, K, V> Values<'a, K, V>
where
    K: Eq + Hash + Clone,
{
    pub(crate) fn new(guard: MutexGuard<'a, HashMap<K, CacheEntry<V>>>) -> Self {
        let keys: Vec<K> = guard.keys().cloned().collect();
        Self {
            guard,
            keys: keys.into_iter(),
        }
    }
}

impl<K, V> Iterator for Values<'_, K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    type Item = V;

    fn next(&mut self) -> Option<V> {
        let key = self.keys.next()?;
        self.guard.get(&key).map(|entry| entry.value.clone())
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.keys.size_hint()
    }
}

/// Iterator over every stored `(key, value)` pair, stale entries included.
pub struct Entries<'a, K, V> {
    guard: MutexGuard<'a, HashMap<K, CacheEntry<V>>>,
    keys: std::vec::IntoIter<K>,
}

impl<'a, K, V> Entries<'a, K, V>
where
    K: Eq + Hash + Clone,
{
    pub(crate) fn new(guard: MutexGuard<'a, HashMap<K, CacheEntry<V>>>) -> Self {
        let keys: Vec<K> = guard.keys().cloned().collect();
        Self {
            guard,
            keys: keys.into_iter(),
        }
    }
}

impl<K, V> Iterator for Entries<'_, K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    type Item = (K, V);

    fn next(&mut self) -> Option<(K, V)> {
        let key = self.keys.next()?;
        let value = self.guard.get(&key)?.value.clone();
        Some((key, value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.keys.size_hint()
    }
}
