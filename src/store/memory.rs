//! In-memory session cache
//!
//! This is primarily for development and testing.
//! For production, use RedisCache or another shared cache.

use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use super::{CacheEntry, CallbackCache, GetCallback, SessionCache, SetCallback};
use crate::error::SessionError;
use crate::session::SessionData;

struct StoredEntry {
    entry: CacheEntry,
    expires_at: Instant,
}

/// In-memory session cache
///
/// Clones share the same underlying map. The cache supports both calling
/// conventions: use it directly as a [`SessionCache`], or wrap it in
/// [`Callbacks`](super::Callbacks) to go through the [`CallbackCache`] interface.
///
/// Warning: This cache is not suitable for production use because:
/// - Sessions are lost on server restart
/// - Sessions are not shared across multiple server instances
pub struct MemoryCache {
    entries: Arc<RwLock<HashMap<String, StoredEntry>>>,
    prefix: String,
}

impl MemoryCache {
    /// Create a new memory cache
    pub fn new() -> Self {
        Self::with_prefix("sess:")
    }

    /// Create a new memory cache with a custom key prefix
    pub fn with_prefix<S: Into<String>>(prefix: S) -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            prefix: prefix.into(),
        }
    }

    fn make_key(&self, sid: &str) -> String {
        format!("{}{}", self.prefix, sid)
    }

    fn read(&self, sid: &str) -> Option<CacheEntry> {
        let entries = self.entries.read();
        entries
            .get(&self.make_key(sid))
            .filter(|stored| stored.expires_at > Instant::now())
            .map(|stored| stored.entry.clone())
    }

    fn write(&self, sid: &str, item: SessionData, ttl_ms: u64) {
        let stored = StoredEntry {
            entry: CacheEntry::new(item, ttl_ms),
            expires_at: Instant::now() + Duration::from_millis(ttl_ms),
        };
        self.entries.write().insert(self.make_key(sid), stored);
    }

    /// Drop expired entries
    pub fn cleanup_expired(&self) {
        let now = Instant::now();
        self.entries.write().retain(|_, stored| stored.expires_at > now);
    }

    /// Number of live entries
    pub fn len(&self) -> usize {
        self.cleanup_expired();
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for MemoryCache {
    fn clone(&self) -> Self {
        Self {
            entries: Arc::clone(&self.entries),
            prefix: self.prefix.clone(),
        }
    }
}

#[async_trait]
impl SessionCache for MemoryCache {
    async fn get(&self, key: &str) -> Result<Option<CacheEntry>, SessionError> {
        Ok(self.read(key))
    }

    async fn set(&self, key: &str, item: &SessionData, ttl_ms: u64) -> Result<(), SessionError> {
        self.write(key, item.clone(), ttl_ms);
        Ok(())
    }
}

impl CallbackCache for MemoryCache {
    fn get(&self, key: &str, done: GetCallback) {
        done(Ok(self.read(key)));
    }

    fn set(&self, key: &str, item: SessionData, ttl_ms: u64, done: SetCallback) {
        self.write(key, item, ttl_ms);
        done(Ok(()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Callbacks;
    use serde_json::json;

    fn sample() -> SessionData {
        let mut data = SessionData::new();
        data.insert("user".to_string(), json!("alice"));
        data
    }

    #[tokio::test]
    async fn test_memory_cache_basic() {
        let cache = MemoryCache::new();

        assert!(SessionCache::get(&cache, "test-id").await.unwrap().is_none());

        SessionCache::set(&cache, "test-id", &sample(), 60_000)
            .await
            .unwrap();

        let entry = SessionCache::get(&cache, "test-id").await.unwrap().unwrap();
        assert_eq!(entry.item, sample());
        assert_eq!(entry.ttl, 60_000);
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn test_memory_cache_expiry() {
        let cache = MemoryCache::new();
        SessionCache::set(&cache, "test-id", &sample(), 0)
            .await
            .unwrap(); // Already expired

        assert!(SessionCache::get(&cache, "test-id").await.unwrap().is_none());
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_clones_share_entries() {
        let cache = MemoryCache::with_prefix("test:");
        let other = cache.clone();
        SessionCache::set(&cache, "a", &sample(), 60_000).await.unwrap();
        assert!(SessionCache::get(&other, "a").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_callback_convention() {
        let cache = MemoryCache::new();
        let bridged = Callbacks::new(cache.clone());

        bridged.set("cb-id", &sample(), 60_000).await.unwrap();
        let entry = SessionCache::get(&cache, "cb-id").await.unwrap().unwrap();
        assert_eq!(entry.item, sample());

        let entry = bridged.get("cb-id").await.unwrap().unwrap();
        assert_eq!(entry.item, sample());
    }
}
