//! Bounded in-process LRU cache.
//!
//! Recency is tracked with a monotonically increasing tick per access; the
//! entry with the smallest tick is evicted once the capacity is exceeded.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::Utc;

use super::backend::KeyStore;
use super::entry::CacheEntry;
use crate::Error;

#[derive(Debug)]
struct Slot {
    entry: CacheEntry,
    tick: u64,
}

#[derive(Debug, Default)]
struct Lru {
    slots: HashMap<String, Slot>,
    order: BTreeMap<u64, String>,
    tick: u64,
}

impl Lru {
    fn next_tick(&mut self) -> u64 {
        self.tick += 1;
        self.tick
    }

    fn touch(&mut self, key: &str) {
        let tick = self.next_tick();
        if let Some(slot) = self.slots.get_mut(key) {
            self.order.remove(&slot.tick);
            slot.tick = tick;
            self.order.insert(tick, key.to_string());
        }
    }

    fn remove(&mut self, key: &str) -> Option<CacheEntry> {
        let slot = self.slots.remove(key)?;
        self.order.remove(&slot.tick);
        Some(slot.entry)
    }

    /// Unexpired keys from most to least recently used.
    fn live_keys_by_recency(&self) -> impl Iterator<Item = &String> {
        let now_ms = Utc::now().timestamp_millis();
        self.order.values().rev().filter(move |key| {
            self.slots
                .get(*key)
                .is_some_and(|slot| !slot.entry.metadata.is_expired_at(now_ms))
        })
    }
}

/// In-memory LRU keyed by string.
#[derive(Debug)]
pub struct MemoryCache {
    inner: Mutex<Lru>,
    capacity: usize,
}

impl MemoryCache {
    /// Create a cache holding at most `capacity` entries (minimum 1).
    pub fn new(capacity: usize) -> Self {
        Self { inner: Mutex::new(Lru::default()), capacity: capacity.max(1) }
    }

    fn lock(&self) -> MutexGuard<'_, Lru> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.lock().slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Read an entry and mark it most recently used.
    ///
    /// Expired entries are dropped and read as absent.
    pub fn get(&self, key: &str) -> Option<CacheEntry> {
        let mut lru = self.lock();
        let expired = lru.slots.get(key)?.entry.metadata.is_expired();
        if expired {
            lru.remove(key);
            return None;
        }
        lru.touch(key);
        lru.slots.get(key).map(|slot| slot.entry.clone())
    }

    /// Insert or replace an entry, evicting the least recently used ones past capacity.
    pub fn set(&self, key: &str, entry: CacheEntry) {
        let mut lru = self.lock();
        let tick = lru.next_tick();
        if let Some(old) = lru.slots.insert(key.to_string(), Slot { entry, tick }) {
            lru.order.remove(&old.tick);
        }
        lru.order.insert(tick, key.to_string());

        while lru.slots.len() > self.capacity {
            let Some((_, evicted)) = lru.order.pop_first() else { break };
            lru.slots.remove(&evicted);
            tracing::debug!(key = %evicted, "evicted from memory cache");
        }
    }

    /// Remove an entry. Returns whether it was present.
    pub fn remove(&self, key: &str) -> bool {
        self.lock().remove(key).is_some()
    }

    /// Up to `limit` unexpired keys, most recently used first.
    pub fn keys(&self, limit: usize) -> Vec<String> {
        self.lock().live_keys_by_recency().take(limit).cloned().collect()
    }

    /// Up to `limit` unexpired keys containing `query`, most recently used first.
    pub fn search_keys(&self, query: &str, limit: usize) -> Vec<String> {
        self.lock()
            .live_keys_by_recency()
            .filter(|key| key.contains(query))
            .take(limit)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl KeyStore for MemoryCache {
    async fn list(&self, limit: usize) -> Result<Vec<String>, Error> {
        Ok(self.keys(limit))
    }

    async fn search(&self, query: &str, limit: usize) -> Result<Vec<String>, Error> {
        Ok(self.search_keys(query, limit))
    }

    async fn delete(&self, key: &str) -> Result<bool, Error> {
        Ok(self.remove(key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::CacheMetadata;
    use serde_json::json;

    fn entry(value: i64) -> CacheEntry {
        CacheEntry::new(json!(value), None)
    }

    #[test]
    fn test_set_and_get() {
        let cache = MemoryCache::new(10);
        cache.set("a", entry(1));
        assert_eq!(cache.get("a").unwrap().value, json!(1));
        assert!(cache.get("b").is_none());
    }

    #[test]
    fn test_evicts_least_recently_used() {
        let cache = MemoryCache::new(2);
        cache.set("a", entry(1));
        cache.set("b", entry(2));
        cache.get("a");
        cache.set("c", entry(3));

        assert_eq!(cache.len(), 2);
        assert!(cache.get("b").is_none());
        assert!(cache.get("a").is_some());
        assert!(cache.get("c").is_some());
    }

    #[test]
    fn test_replace_does_not_grow() {
        let cache = MemoryCache::new(2);
        cache.set("a", entry(1));
        cache.set("a", entry(2));
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("a").unwrap().value, json!(2));
    }

    #[test]
    fn test_keys_most_recent_first() {
        let cache = MemoryCache::new(10);
        cache.set("a", entry(1));
        cache.set("b", entry(2));
        cache.set("c", entry(3));
        cache.get("a");

        assert_eq!(cache.keys(10), vec!["a", "c", "b"]);
        assert_eq!(cache.keys(2), vec!["a", "c"]);
    }

    #[test]
    fn test_search_keys_substring() {
        let cache = MemoryCache::new(10);
        cache.set("user:1", entry(1));
        cache.set("note:1", entry(2));
        cache.set("user:2", entry(3));

        assert_eq!(cache.search_keys("user", 10), vec!["user:2", "user:1"]);
        assert_eq!(cache.search_keys("user", 1), vec!["user:2"]);
        assert!(cache.search_keys("team", 10).is_empty());
    }

    #[test]
    fn test_expired_entry_reads_as_absent() {
        let cache = MemoryCache::new(10);
        let stale = CacheEntry { value: json!(1), metadata: CacheMetadata { created_time: 0, ttl_ms: Some(1) } };
        cache.set("old", stale);

        assert!(cache.get("old").is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_expired_keys_are_not_listed() {
        let cache = MemoryCache::new(10);
        cache.set("user:live", entry(1));
        let stale = CacheEntry { value: json!(2), metadata: CacheMetadata { created_time: 0, ttl_ms: Some(1) } };
        cache.set("user:stale", stale);

        assert_eq!(cache.keys(10), vec!["user:live"]);
        assert_eq!(cache.keys(1), vec!["user:live"]);
        assert_eq!(cache.search_keys("user", 10), vec!["user:live"]);
        assert!(cache.search_keys("stale", 10).is_empty());
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let cache = MemoryCache::new(10);
        cache.set("k", entry(1));

        assert!(cache.delete("k").await.unwrap());
        assert!(!cache.delete("k").await.unwrap());
        assert!(cache.list(10).await.unwrap().is_empty());
    }
}
