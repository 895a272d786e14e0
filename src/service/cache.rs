// src/service/cache.rs
//! In-memory TTL cache for listings and assembled pages.
//!
//! Entries are timestamped on insert and ignored once older than the TTL.
//! Nothing is evicted proactively: an expired entry stays until the next
//! insert for the same key replaces it. Two requests missing at the same
//! time both fetch and the last insert wins.

use dashmap::DashMap;
use std::hash::Hash;
use std::sync::Arc;
use std::time::{Duration, Instant};

pub struct TtlCache<K, V> {
    entries: DashMap<K, (Instant, Arc<V>)>,
    ttl: Duration,
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash,
{
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
        }
    }

    /// Returns the cached value if it was stored less than `ttl` ago.
    pub fn get(&self, key: &K) -> Option<Arc<V>> {
        let entry = self.entries.get(key)?;
        let (stored_at, value) = entry.value();
        if stored_at.elapsed() < self.ttl {
            Some(Arc::clone(value))
        } else {
            None
        }
    }

    pub fn insert(&self, key: K, value: V) -> Arc<V> {
        let value = Arc::new(value);
        self.entries
            .insert(key, (Instant::now(), Arc::clone(&value)));
        value
    }

    /// Number of entries still fresh.
    pub fn len(&self) -> usize {
        self.entries
            .iter()
            .filter(|entry| entry.value().0.elapsed() < self.ttl)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hit_within_ttl() {
        let cache = TtlCache::new(Duration::from_secs(60));
        cache.insert("images", vec![1, 2, 3]);
        assert_eq!(cache.get(&"images").as_deref(), Some(&vec![1, 2, 3]));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_zero_ttl_never_hits() {
        let cache = TtlCache::new(Duration::ZERO);
        cache.insert("images", 1);
        assert!(cache.get(&"images").is_none());
        assert_eq!(cache.len(), 0);
    }

    #[test]
    fn test_insert_replaces_value() {
        let cache = TtlCache::new(Duration::from_secs(60));
        cache.insert("k", "old");
        cache.insert("k", "new");
        assert_eq!(cache.get(&"k").as_deref(), Some(&"new"));
    }

    #[test]
    fn test_expires_after_ttl() {
        let cache = TtlCache::new(Duration::from_millis(20));
        cache.insert(1u8, "v");
        std::thread::sleep(Duration::from_millis(40));
        assert!(cache.get(&1u8).is_none());
    }
}
