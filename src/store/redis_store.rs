//! Redis session cache
//!
//! - Key: `prefix + session_id` (default prefix: "sess:")
//! - Value: JSON serialized [`CacheEntry`]
//! - TTL: the session max age, applied with millisecond precision (`PSETEX`)

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use std::sync::Arc;

use super::{CacheEntry, SessionCache};
use crate::error::SessionError;
use crate::session::SessionData;

/// Redis-backed session cache
///
/// # Example
///
/// ```rust,ignore
/// use salvo_server_session::RedisCache;
///
/// let cache = RedisCache::from_url("redis://127.0.0.1/").await?;
/// ```
pub struct RedisCache {
    conn: Arc<ConnectionManager>,
    prefix: String,
}

impl RedisCache {
    /// Create a new Redis cache with the default "sess:" prefix
    pub async fn new(client: redis::Client) -> Result<Self, SessionError> {
        let conn = ConnectionManager::new(client).await?;
        Ok(Self::from_connection_manager(conn))
    }

    /// Create a new Redis cache from a connection string
    pub async fn from_url(url: &str) -> Result<Self, SessionError> {
        let client = redis::Client::open(url).map_err(|e| {
            SessionError::Cache(format!("Failed to create Redis client: {}", e))
        })?;
        Self::new(client).await
    }

    /// Create a new Redis cache from an existing connection manager
    pub fn from_connection_manager(conn: ConnectionManager) -> Self {
        Self {
            conn: Arc::new(conn),
            prefix: "sess:".to_string(),
        }
    }

    /// Build with custom key prefix
    pub fn with_prefix(mut self, prefix: &str) -> Self {
        self.prefix = prefix.to_string();
        self
    }

    fn make_key(&self, sid: &str) -> String {
        format!("{}{}", self.prefix, sid)
    }
}

impl Clone for RedisCache {
    fn clone(&self) -> Self {
        Self {
            conn: Arc::clone(&self.conn),
            prefix: self.prefix.clone(),
        }
    }
}

#[async_trait]
impl SessionCache for RedisCache {
    async fn get(&self, key: &str) -> Result<Option<CacheEntry>, SessionError> {
        let key = self.make_key(key);
        let mut conn = (*self.conn).clone();

        let data: Option<String> = conn.get(&key).await?;

        match data {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, item: &SessionData, ttl_ms: u64) -> Result<(), SessionError> {
        let key = self.make_key(key);
        let mut conn = (*self.conn).clone();

        if ttl_ms == 0 {
            // An entry that expires immediately is never readable
            conn.del::<_, ()>(&key).await?;
            return Ok(());
        }

        let json = serde_json::to_string(&CacheEntry::new(item.clone(), ttl_ms))?;
        conn.pset_ex::<_, _, ()>(&key, &json, ttl_ms).await?;

        Ok(())
    }
}
