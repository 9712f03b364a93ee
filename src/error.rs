//! Session error types

use std::fmt;

/// Errors that can occur while configuring or running the session pipeline
#[derive(Debug)]
pub enum SessionError {
    /// Invalid configuration, raised once when the handler is built
    Config(String),
    /// Error reported by the cache backend
    Cache(String),
    /// The session id generator could not produce an id
    IdGeneration(String),
    /// Persistence was attempted without a usable session id
    MissingSessionId,
    /// Error during serialization/deserialization
    Serialization(String),
    /// Redis error (when redis-store feature is enabled)
    #[cfg(feature = "redis-store")]
    Redis(redis::RedisError),
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::Config(msg) => write!(f, "Session configuration error: {}", msg),
            SessionError::Cache(msg) => write!(f, "Session cache error: {}", msg),
            SessionError::IdGeneration(msg) => write!(f, "Could not generate session id: {}", msg),
            SessionError::MissingSessionId => write!(f, "Missing session id"),
            SessionError::Serialization(msg) => write!(f, "Serialization error: {}", msg),
            #[cfg(feature = "redis-store")]
            SessionError::Redis(e) => write!(f, "Redis error: {}", e),
        }
    }
}

impl std::error::Error for SessionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            #[cfg(feature = "redis-store")]
            SessionError::Redis(e) => Some(e),
            _ => None,
        }
    }
}

#[cfg(feature = "redis-store")]
impl From<redis::RedisError> for SessionError {
    fn from(err: redis::RedisError) -> Self {
        SessionError::Redis(err)
    }
}

impl From<serde_json::Error> for SessionError {
    fn from(err: serde_json::Error) -> Self {
        SessionError::Serialization(err.to_string())
    }
}
