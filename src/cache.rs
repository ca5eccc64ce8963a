//! Explicitly constructed response cache
//!
//! Bounded (LRU) and TTL-expiring. The cache has a defined lifetime:
//! construct it once at startup and pass it by reference to consumers.
//! There is no global instance and no import-time side effect.

use std::num::NonZeroUsize;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use lru::LruCache;

struct Entry<V> {
    value: V,
    inserted_at: Instant,
}

/// A thread-safe key-value cache with LRU eviction and per-cache TTL.
pub struct ResponseCache<V> {
    entries: Mutex<LruCache<String, Entry<V>>>,
    ttl: Duration,
}

impl<V: Clone> ResponseCache<V> {
    /// Create a cache holding at most `capacity` entries, each valid for
    /// `ttl` after insertion.
    pub fn new(capacity: NonZeroUsize, ttl: Duration) -> Self {
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
            ttl,
        }
    }

    fn lock(&self) -> MutexGuard<'_, LruCache<String, Entry<V>>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Fetch a value, promoting it in LRU order. Expired entries are
    /// dropped on access.
    pub fn get(&self, key: &str) -> Option<V> {
        let mut entries = self.lock();
        let expired = match entries.get(key) {
            Some(entry) if entry.inserted_at.elapsed() < self.ttl => {
                return Some(entry.value.clone());
            }
            Some(_) => true,
            None => false,
        };
        if expired {
            entries.pop(key);
        }
        None
    }

    /// Insert or replace a value, resetting its TTL.
    pub fn insert(&self, key: impl Into<String>, value: V) {
        self.lock().put(
            key.into(),
            Entry {
                value,
                inserted_at: Instant::now(),
            },
        );
    }

    /// Remove one entry, returning its value if it was present and fresh.
    pub fn remove(&self, key: &str) -> Option<V> {
        let entry = self.lock().pop(key)?;
        (entry.inserted_at.elapsed() < self.ttl).then_some(entry.value)
    }

    /// Drop every entry.
    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Drop every entry whose key contains `pattern`, returning how many
    /// were evicted.
    pub fn clear_pattern(&self, pattern: &str) -> usize {
        let mut entries = self.lock();
        let matching: Vec<String> = entries
            .iter()
            .filter(|(key, _)| key.contains(pattern))
            .map(|(key, _)| key.clone())
            .collect();
        for key in &matching {
            entries.pop(key);
        }
        matching.len()
    }

    /// Number of stored entries, counting not-yet-evicted expired ones.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether the cache stores no entries at all.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

impl<V> std::fmt::Debug for ResponseCache<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResponseCache")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cache(capacity: usize) -> ResponseCache<String> {
        ResponseCache::new(
            NonZeroUsize::new(capacity).unwrap(),
            Duration::from_secs(60),
        )
    }

    #[test]
    fn stores_and_fetches_values() {
        let cache = cache(4);
        cache.insert("dashboard:user-1", "payload".to_string());
        assert_eq!(cache.get("dashboard:user-1").as_deref(), Some("payload"));
        assert_eq!(cache.get("dashboard:user-2"), None);
    }

    #[test]
    fn capacity_evicts_least_recently_used() {
        let cache = cache(2);
        cache.insert("a", "1".to_string());
        cache.insert("b", "2".to_string());
        // Touch "a" so "b" becomes the eviction candidate.
        cache.get("a");
        cache.insert("c", "3".to_string());

        assert!(cache.get("a").is_some());
        assert!(cache.get("b").is_none());
        assert!(cache.get("c").is_some());
    }

    #[test]
    fn expired_entries_are_dropped_on_access() {
        let cache = ResponseCache::new(
            NonZeroUsize::new(4).unwrap(),
            Duration::from_millis(10),
        );
        cache.insert("stale", "payload".to_string());
        std::thread::sleep(Duration::from_millis(25));
        assert_eq!(cache.get("stale"), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn clear_pattern_evicts_matching_keys() {
        let cache = cache(8);
        cache.insert("leaderboard:weekly", "w".to_string());
        cache.insert("leaderboard:monthly", "m".to_string());
        cache.insert("profile:user-1", "p".to_string());

        assert_eq!(cache.clear_pattern("leaderboard:"), 2);
        assert_eq!(cache.len(), 1);
        assert!(cache.get("profile:user-1").is_some());

        cache.clear();
        assert!(cache.is_empty());
    }
}
