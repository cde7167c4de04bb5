//! Per-key in-memory cache.

use parking_lot::RwLock;
use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Cache holding at most one shared value per key.
///
/// Values are stored behind `Arc`, so a hit hands back the very value that
/// was inserted. Critical sections never span an `.await`.
pub struct KeyedCache<K, V> {
    data: Arc<RwLock<HashMap<K, Arc<V>>>>,
    hits: Arc<AtomicU64>,
    misses: Arc<AtomicU64>,
}

/// Cache statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
}

impl<K, V> KeyedCache<K, V>
where
    K: Eq + Hash,
{
    /// Create an empty cache
    pub fn new() -> Self {
        Self {
            data: Arc::new(RwLock::new(HashMap::new())),
            hits: Arc::new(AtomicU64::new(0)),
            misses: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Look up a key.
    pub fn get<Q>(&self, key: &Q) -> Option<Arc<V>>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let found = self.data.read().get(key).cloned();
        match found {
            Some(_) => self.hits.fetch_add(1, Ordering::Relaxed),
            None => self.misses.fetch_add(1, Ordering::Relaxed),
        };
        found
    }

    /// Store a value, replacing any previous entry, and return the shared
    /// handle now held by the cache.
    pub fn insert(&self, key: K, value: V) -> Arc<V> {
        let value = Arc::new(value);
        self.data.write().insert(key, value.clone());
        value
    }

    /// Store an already shared value.
    pub fn insert_arc(&self, key: K, value: Arc<V>) {
        self.data.write().insert(key, value);
    }

    /// Check whether a key is cached without touching the statistics.
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.data.read().contains_key(key)
    }

    /// Drop one entry. Returns whether it was present.
    pub fn invalidate<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.data.write().remove(key).is_some()
    }

    /// Drop every entry.
    pub fn clear(&self) {
        let removed = {
            let mut data = self.data.write();
            let n = data.len();
            data.clear();
            n
        };
        gazette_log::debug!(target: "gazette_cache", "cleared {} cached entries", removed);
    }

    pub fn len(&self) -> usize {
        self.data.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.read().is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.len(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}

impl<K: Eq + Hash, V> Default for KeyedCache<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> Clone for KeyedCache<K, V> {
    fn clone(&self) -> Self {
        Self {
            data: self.data.clone(),
            hits: self.hits.clone(),
            misses: self.misses.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hit_returns_same_arc() {
        let cache: KeyedCache<String, String> = KeyedCache::new();
        let stored = cache.insert("en".to_string(), "tree".to_string());

        let hit = cache.get("en").unwrap();
        assert!(Arc::ptr_eq(&stored, &hit));
        assert_eq!(cache.stats(), CacheStats { entries: 1, hits: 1, misses: 0 });
    }

    #[test]
    fn test_last_write_wins() {
        let cache: KeyedCache<&str, u32> = KeyedCache::new();
        cache.insert("ja", 1);
        cache.insert("ja", 2);

        assert_eq!(*cache.get("ja").unwrap(), 2);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_invalidate_and_clear() {
        let cache: KeyedCache<&str, u32> = KeyedCache::new();
        cache.insert("ja", 1);
        cache.insert("en", 2);

        assert!(cache.invalidate("ja"));
        assert!(!cache.invalidate("ja"));
        assert!(cache.get("ja").is_none());

        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_clones_share_storage() {
        let cache: KeyedCache<&str, u32> = KeyedCache::new();
        let other = cache.clone();
        other.insert("fr", 3);

        assert!(cache.contains("fr"));
    }
}
