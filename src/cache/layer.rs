//! Primary-with-fallback cache composition.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::error::CacheError;
use super::local::LocalCache;
use crate::telemetry;

/// Shared primary cache (e.g. a networked key/value store).
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Cheap connectivity check. An unavailable store is skipped entirely.
    fn is_available(&self) -> bool {
        true
    }

    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError>;

    async fn delete(&self, key: &str) -> Result<(), CacheError>;

    async fn clear(&self) -> Result<(), CacheError>;
}

/// Tiered cache: primary store when reachable, local map always.
///
/// Writes are mirrored into the local map regardless of the primary
/// outcome, so reads stay continuous if the primary drops out later.
pub struct CacheLayer {
    primary: Option<Arc<dyn CacheStore>>,
    local: LocalCache,
}

impl CacheLayer {
    pub fn new(primary: Option<Arc<dyn CacheStore>>, local: LocalCache) -> Self {
        Self { primary, local }
    }

    /// Local-only cache.
    pub fn local_only(local: LocalCache) -> Self {
        Self::new(None, local)
    }

    pub async fn get(&self, key: &str) -> Option<String> {
        if let Some(primary) = self.reachable_primary() {
            match primary.get(key).await {
                Ok(value) => return value,
                Err(e) => degraded("get", key, &e),
            }
        }
        self.local.get(key)
    }

    pub async fn set(&self, key: &str, value: String, ttl: Duration) {
        if let Some(primary) = self.reachable_primary() {
            if let Err(e) = primary.set(key, &value, ttl).await {
                degraded("set", key, &e);
            }
        }
        self.local.set(key, value, ttl);
    }

    pub async fn delete(&self, key: &str) {
        if let Some(primary) = self.reachable_primary() {
            if let Err(e) = primary.delete(key).await {
                degraded("delete", key, &e);
            }
        }
        self.local.delete(key);
    }

    pub async fn clear(&self) {
        if let Some(primary) = self.reachable_primary() {
            if let Err(e) = primary.clear().await {
                degraded("clear", "*", &e);
            }
        }
        self.local.clear();
    }

    /// Typed read. Undecodable payloads count as a miss.
    pub async fn get_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = self.get(key).await?;
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                degraded("decode", key, &CacheError::Serialization(e.to_string()));
                None
            }
        }
    }

    pub async fn set_json<T: Serialize>(&self, key: &str, value: &T, ttl: Duration) {
        match serde_json::to_string(value) {
            Ok(raw) => self.set(key, raw, ttl).await,
            Err(e) => degraded("encode", key, &CacheError::Serialization(e.to_string())),
        }
    }

    /// Sweep expired entries out of the local fallback.
    pub fn cleanup_expired(&self) -> usize {
        self.local.cleanup_expired()
    }

    pub fn local(&self) -> &LocalCache {
        &self.local
    }

    fn reachable_primary(&self) -> Option<&Arc<dyn CacheStore>> {
        self.primary.as_ref().filter(|p| p.is_available())
    }
}

fn degraded(op: &'static str, key: &str, error: &CacheError) {
    tracing::warn!(op, key, error = %error, "cache degraded to local fallback");
    telemetry::record_cache_degraded(op);
}
