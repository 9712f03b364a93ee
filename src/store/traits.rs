//! Cache adapter traits

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;

use crate::error::SessionError;
use crate::session::SessionData;

/// A cached session payload as returned by [`SessionCache::get`]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    /// The stored session data
    pub item: SessionData,
    /// When the entry was written
    pub stored: DateTime<Utc>,
    /// Lifetime of the entry in milliseconds
    pub ttl: u64,
}

impl CacheEntry {
    pub fn new(item: SessionData, ttl_ms: u64) -> Self {
        Self {
            item,
            stored: Utc::now(),
            ttl: ttl_ms,
        }
    }
}

/// Awaitable cache backend used by the session pipeline.
///
/// `get` on a missing or expired key must return `Ok(None)`. Any `Err` is
/// treated as a backend failure and aborts the current stage.
#[async_trait]
pub trait SessionCache: Send + Sync + 'static {
    /// Fetch the entry stored under `key`
    async fn get(&self, key: &str) -> Result<Option<CacheEntry>, SessionError>;

    /// Store `item` under `key`, expiring after `ttl_ms` milliseconds
    async fn set(&self, key: &str, item: &SessionData, ttl_ms: u64) -> Result<(), SessionError>;
}

/// Completion callback for [`CallbackCache::get`]
pub type GetCallback = Box<dyn FnOnce(Result<Option<CacheEntry>, SessionError>) + Send>;

/// Completion callback for [`CallbackCache::set`]
pub type SetCallback = Box<dyn FnOnce(Result<(), SessionError>) + Send>;

/// Cache backend with a completion-callback calling convention.
///
/// Wrap it in [`Callbacks`] to use it with the session handler. Each callback
/// must be invoked exactly once; a callback that is dropped without being
/// called is reported as a cache error.
pub trait CallbackCache: Send + Sync + 'static {
    fn get(&self, key: &str, done: GetCallback);

    fn set(&self, key: &str, item: SessionData, ttl_ms: u64, done: SetCallback);
}

/// Adapts a [`CallbackCache`] to the awaitable [`SessionCache`] interface
#[derive(Clone, Debug, Default)]
pub struct Callbacks<C>(pub C);

impl<C> Callbacks<C> {
    pub fn new(cache: C) -> Self {
        Self(cache)
    }

    pub fn into_inner(self) -> C {
        self.0
    }
}

fn dropped_callback(_: oneshot::error::RecvError) -> SessionError {
    SessionError::Cache("cache dropped the completion callback".to_string())
}

#[async_trait]
impl<C: CallbackCache> SessionCache for Callbacks<C> {
    async fn get(&self, key: &str) -> Result<Option<CacheEntry>, SessionError> {
        let (tx, rx) = oneshot::channel();
        self.0.get(
            key,
            Box::new(move |result| {
                let _ = tx.send(result);
            }),
        );
        rx.await.map_err(dropped_callback)?
    }

    async fn set(&self, key: &str, item: &SessionData, ttl_ms: u64) -> Result<(), SessionError> {
        let (tx, rx) = oneshot::channel();
        self.0.set(
            key,
            item.clone(),
            ttl_ms,
            Box::new(move |result| {
                let _ = tx.send(result);
            }),
        );
        rx.await.map_err(dropped_callback)?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tokio_test::{assert_err, assert_ok};

    /// Completes callbacks from a spawned task, like a driver with its own I/O loop
    struct DeferredCache {
        entry: Option<CacheEntry>,
    }

    impl CallbackCache for DeferredCache {
        fn get(&self, _key: &str, done: GetCallback) {
            let entry = self.entry.clone();
            tokio::spawn(async move { done(Ok(entry)) });
        }

        fn set(&self, _key: &str, _item: SessionData, _ttl_ms: u64, done: SetCallback) {
            tokio::spawn(async move { done(Err(SessionError::Cache("read-only".to_string()))) });
        }
    }

    /// Forgets to call its callbacks
    struct ForgetfulCache;

    impl CallbackCache for ForgetfulCache {
        fn get(&self, _key: &str, _done: GetCallback) {}

        fn set(&self, _key: &str, _item: SessionData, _ttl_ms: u64, _done: SetCallback) {}
    }

    #[tokio::test]
    async fn test_bridge_resolves_deferred_callbacks() {
        let mut item = SessionData::new();
        item.insert("foo".to_string(), json!("foo"));
        let cache = Callbacks::new(DeferredCache {
            entry: Some(CacheEntry::new(item.clone(), 1000)),
        });

        let entry = assert_ok!(SessionCache::get(&cache, "id").await);
        assert_eq!(entry.map(|e| e.item), Some(item.clone()));

        let err = assert_err!(SessionCache::set(&cache, "id", &item, 1000).await);
        assert!(matches!(err, SessionError::Cache(_)));
    }

    #[tokio::test]
    async fn test_bridge_reports_dropped_callback() {
        let cache = Callbacks::new(ForgetfulCache);
        let err = assert_err!(SessionCache::get(&cache, "id").await);
        assert!(matches!(err, SessionError::Cache(_)));

        let err = assert_err!(SessionCache::set(&cache, "id", &SessionData::new(), 1).await);
        assert!(matches!(err, SessionError::Cache(_)));
    }
}
