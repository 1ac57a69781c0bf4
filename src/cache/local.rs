//! In-process fallback cache.
//!
//! Uses DashMap for lock-free concurrent access.

use std::time::{Duration, Instant};

use dashmap::DashMap;

/// Configuration for the local fallback cache.
#[derive(Debug, Clone)]
pub struct LocalCacheConfig {
    pub max_entries: usize,
}

impl Default for LocalCacheConfig {
    fn default() -> Self {
        Self { max_entries: 10_000 }
    }
}

struct LocalEntry {
    value: String,
    inserted_at: Instant,
    /// `None` when the TTL reaches past the representable clock range.
    expires_at: Option<Instant>,
}

impl LocalEntry {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.map_or(true, |at| now < at)
    }
}

/// Expiring key/value map. Expired entries are evicted lazily on read.
pub struct LocalCache {
    entries: DashMap<String, LocalEntry>,
    config: LocalCacheConfig,
}

impl LocalCache {
    pub fn new(config: LocalCacheConfig) -> Self {
        Self {
            entries: DashMap::new(),
            config,
        }
    }

    pub fn get(&self, key: &str) -> Option<String> {
        {
            let entry = self.entries.get(key)?;
            if entry.is_live(Instant::now()) {
                return Some(entry.value.clone());
            }
        }
        self.entries
            .remove_if(key, |_, entry| !entry.is_live(Instant::now()));
        None
    }

    pub fn set(&self, key: &str, value: String, ttl: Duration) {
        if self.entries.len() >= self.config.max_entries && !self.entries.contains_key(key) {
            self.evict_oldest();
        }
        let now = Instant::now();
        self.entries.insert(
            key.to_string(),
            LocalEntry {
                value,
                inserted_at: now,
                expires_at: now.checked_add(ttl),
            },
        );
    }

    pub fn delete(&self, key: &str) {
        self.entries.remove(key);
    }

    pub fn clear(&self) {
        self.entries.clear();
    }

    /// Remove every expired entry. Returns the number removed.
    pub fn cleanup_expired(&self) -> usize {
        let before = self.entries.len();
        let now = Instant::now();
        self.entries.retain(|_, entry| entry.is_live(now));
        before.saturating_sub(self.entries.len())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn evict_oldest(&self) {
        let oldest = self
            .entries
            .iter()
            .min_by_key(|e| e.inserted_at)
            .map(|e| e.key().clone());
        if let Some(key) = oldest {
            self.entries.remove(&key);
        }
    }
}

impl Default for LocalCache {
    fn default() -> Self {
        Self::new(LocalCacheConfig::default())
    }
}
