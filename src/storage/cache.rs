//! Bounded FIFO cache for the storage role
//!
//! Entries are evicted strictly in insertion order. Hits never reorder or
//! evict anything, and at most one entry is evicted per insertion.

use std::hash::Hash;

use indexmap::IndexMap;
use tracing::trace;

/// Default number of cached entries
pub const DEFAULT_CACHE_CAPACITY: usize = 2;

/// Fixed-capacity cache evicting the oldest inserted entry first
#[derive(Debug, Clone)]
pub struct FifoCache<K, V> {
    /// Maximum number of entries kept after an insertion
    capacity: usize,
    /// Entries in insertion order, oldest first
    entries: IndexMap<K, V>,
}

impl<K: Hash + Eq, V> Default for FifoCache<K, V> {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_CAPACITY)
    }
}

impl<K: Hash + Eq, V> FifoCache<K, V> {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: IndexMap::with_capacity(capacity + 1),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, key: &K) -> bool {
        self.entries.contains_key(key)
    }

    pub fn get(&self, key: &K) -> Option<&V> {
        self.entries.get(key)
    }

    /// Keys from oldest to newest
    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.entries.keys()
    }

    /// Insert at the newest position, returning the evicted entry if the
    /// cache went over capacity. Re-inserting a key keeps its position.
    pub fn insert(&mut self, key: K, value: V) -> Option<(K, V)> {
        self.entries.insert(key, value);

        if self.entries.len() > self.capacity {
            self.entries.shift_remove_index(0)
        } else {
            None
        }
    }
}

impl<K: Hash + Eq, V: Clone> FifoCache<K, V> {
    /// Return the cached value for `key`, or load and cache it.
    ///
    /// The loader only runs on a miss. A failed load caches nothing.
    pub fn get_or_load<F, E>(&mut self, key: K, loader: F) -> Result<V, E>
    where
        F: FnOnce(&K) -> Result<V, E>,
    {
        if let Some(value) = self.entries.get(&key) {
            return Ok(value.clone());
        }

        let value = loader(&key)?;
        if self.insert(key, value.clone()).is_some() {
            trace!(capacity = self.capacity, "evicted oldest cache entry");
        }
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn keys(cache: &FifoCache<String, String>) -> Vec<&str> {
        cache.keys().map(String::as_str).collect()
    }

    #[test]
    fn test_starts_empty() {
        let cache: FifoCache<String, String> = FifoCache::default();
        assert!(cache.is_empty());
        assert_eq!(cache.capacity(), 2);
    }

    #[test]
    fn test_miss_then_hit() {
        let mut cache = FifoCache::default();
        let calls = Cell::new(0);
        let loader = |key: &String| -> Result<String, ()> {
            calls.set(calls.get() + 1);
            Ok(format!("content of {}", key))
        };

        assert_eq!(cache.get_or_load("foo".to_string(), loader), Ok("content of foo".to_string()));
        assert_eq!(cache.get_or_load("foo".to_string(), loader), Ok("content of foo".to_string()));
        assert_eq!(calls.get(), 1);
        assert_eq!(keys(&cache), vec!["foo"]);
    }

    #[test]
    fn test_third_key_evicts_first() {
        let mut cache = FifoCache::new(2);
        let calls = Cell::new(0);
        let loader = |key: &String| -> Result<String, ()> {
            calls.set(calls.get() + 1);
            Ok(key.to_uppercase())
        };

        for key in ["bar", "baz", "foo"] {
            cache.get_or_load(key.to_string(), loader).unwrap();
        }
        assert_eq!(keys(&cache), vec!["baz", "foo"]);
        assert_eq!(calls.get(), 3);

        // The two newest entries are served without the loader
        cache.get_or_load("baz".to_string(), loader).unwrap();
        cache.get_or_load("foo".to_string(), loader).unwrap();
        assert_eq!(calls.get(), 3);

        // The evicted one is loaded again
        cache.get_or_load("bar".to_string(), loader).unwrap();
        assert_eq!(calls.get(), 4);
        assert_eq!(keys(&cache), vec!["foo", "bar"]);
    }

    #[test]
    fn test_hit_does_not_refresh_position() {
        let mut cache = FifoCache::new(2);
        cache.insert("a".to_string(), "1".to_string());
        cache.insert("b".to_string(), "2".to_string());

        cache
            .get_or_load("a".to_string(), |_| -> Result<String, ()> { unreachable!() })
            .unwrap();
        let evicted = cache.insert("c".to_string(), "3".to_string());

        assert_eq!(evicted, Some(("a".to_string(), "1".to_string())));
        assert_eq!(keys(&cache), vec!["b", "c"]);
    }

    #[test]
    fn test_failed_load_caches_nothing() {
        let mut cache: FifoCache<String, String> = FifoCache::new(2);
        cache.insert("a".to_string(), "1".to_string());

        let result = cache.get_or_load("missing".to_string(), |_| Err("not found"));

        assert_eq!(result, Err("not found"));
        assert_eq!(keys(&cache), vec!["a"]);
    }
}
