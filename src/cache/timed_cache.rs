//! Time-based cache with TTL (Time To Live) support.
//!
//! Entries expire lazily: a read that finds a stale entry evicts it and reports
//! a miss. There is no background sweep.
//!
//! Ages are measured with `tokio::time::Instant`, the same clock the client's
//! timeouts and backoff use. Outside a runtime, or in a runtime whose clock is
//! not paused, it reads the monotonic system clock.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, RwLock};
use std::time::Duration;
use tokio::time::Instant;

/// A cache entry with the instant it was stored.
#[derive(Debug, Clone)]
struct CacheEntry<V> {
    value: V,
    inserted_at: Instant,
}

impl<V> CacheEntry<V> {
    fn is_fresh(&self, now: Instant, ttl: Duration) -> bool {
        now.saturating_duration_since(self.inserted_at) <= ttl
    }
}

/// A thread-safe cache with time-based expiration.
///
/// Cloning is cheap and clones share the same underlying map, so one cache can
/// be handed to several clients. Concurrent writers to the same key resolve
/// last-writer-wins.
///
/// Large values can be wrapped in `Arc` to avoid deep clones on every hit:
/// ```ignore
/// let cache = TimedCache::<String, Arc<serde_json::Value>>::new(60);
/// cache.insert("GET /pokemon/pikachu".to_string(), Arc::new(payload));
/// ```
#[derive(Clone)]
pub struct TimedCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    cache: Arc<RwLock<HashMap<K, CacheEntry<V>>>>,
    ttl: Duration,
}

impl<K, V> TimedCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    /// Create a new TimedCache with the specified TTL in seconds.
    pub fn new(ttl_seconds: u64) -> Self {
        Self::with_ttl(Duration::from_secs(ttl_seconds))
    }

    /// Create a new TimedCache with an arbitrary TTL.
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            cache: Arc::new(RwLock::new(HashMap::new())),
            ttl,
        }
    }

    /// Insert a value into the cache, replacing any prior entry for the key.
    pub fn insert(&self, key: K, value: V) {
        let entry = CacheEntry {
            value,
            inserted_at: Instant::now(),
        };

        if let Ok(mut cache) = self.cache.write() {
            cache.insert(key, entry);
        }
    }

    /// Get a value from the cache if it exists and hasn't expired.
    ///
    /// A stale entry is evicted as a side effect and `None` is returned.
    pub fn get(&self, key: &K) -> Option<V> {
        let now = Instant::now();

        if let Ok(cache) = self.cache.read() {
            match cache.get(key) {
                Some(entry) if entry.is_fresh(now, self.ttl) => return Some(entry.value.clone()),
                Some(_) => {}
                None => return None,
            }
        }

        // Stale. Re-check under the write lock since another writer may have
        // refreshed the key in between.
        if let Ok(mut cache) = self.cache.write() {
            if let Some(entry) = cache.get(key) {
                if entry.is_fresh(now, self.ttl) {
                    return Some(entry.value.clone());
                }
                cache.remove(key);
            }
        }

        None
    }

    /// Check if a key exists in the cache and hasn't expired.
    pub fn contains_key(&self, key: &K) -> bool {
        self.get(key).is_some()
    }

    /// Remove a specific key from the cache.
    pub fn remove(&self, key: &K) {
        if let Ok(mut cache) = self.cache.write() {
            cache.remove(key);
        }
    }

    /// Clear all entries from the cache.
    pub fn clear(&self) {
        if let Ok(mut cache) = self.cache.write() {
            cache.clear();
        }
    }

    /// Remove all expired entries from the cache.
    ///
    /// Not required for correctness since `get()` never returns a stale entry.
    pub fn cleanup_expired(&self) {
        let now = Instant::now();

        if let Ok(mut cache) = self.cache.write() {
            cache.retain(|_, entry| entry.is_fresh(now, self.ttl));
        }
    }

    /// Get the number of entries in the cache (including expired ones).
    pub fn len(&self) -> usize {
        if let Ok(cache) = self.cache.read() {
            cache.len()
        } else {
            0
        }
    }

    /// Check if the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Get the TTL duration for this cache.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }
}

impl<K, V> std::fmt::Debug for TimedCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimedCache")
            .field("ttl", &self.ttl)
            .field("entries", &self.len())
            .finish()
    }
}
