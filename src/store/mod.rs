//! Session cache adapters

mod memory;
mod traits;

pub use memory::MemoryCache;
pub use traits::{CacheEntry, CallbackCache, Callbacks, GetCallback, SessionCache, SetCallback};

#[cfg(feature = "redis-store")]
mod redis_store;

#[cfg(feature = "redis-store")]
pub use redis_store::RedisCache;
