//! # salvo-server-session
//!
//! Cookie-backed server-side session middleware for the Salvo web framework.
//!
//! A client is identified by a signed, tamper-evident session cookie; the
//! session payload itself lives in an external cache. Sessions are only
//! written, and cookies only issued, when a handler actually modified the
//! session.
//!
//! ## Features
//!
//! - **Signed cookies**: `cookie-signature` compatible HMAC-SHA256 signatures
//! - **Lazy persistence**: untouched sessions cause no cache write and no `Set-Cookie`
//! - **Pluggable caches**: awaitable ([`SessionCache`]) or callback-style
//!   ([`CallbackCache`]) backends, with in-memory and Redis implementations
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use salvo::prelude::*;
//! use salvo_server_session::{MemoryCache, SessionConfig, SessionDepotExt, SessionHandler};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = SessionConfig::new("a-secret-of-at-least-thirty-two-chars!")
//!         .with_cookie_name("sessionid")
//!         .with_max_age(30 * 60 * 1000);
//!
//!     let session_handler = SessionHandler::new(MemoryCache::new(), config)
//!         .expect("valid session configuration");
//!
//!     let router = Router::new().hoop(session_handler).get(index);
//!
//!     let acceptor = TcpListener::new("127.0.0.1:5800").bind().await;
//!     Server::new(acceptor).serve(router).await;
//! }
//!
//! #[handler]
//! async fn index(depot: &mut Depot) -> String {
//!     let session = depot.session_mut().unwrap();
//!     let views: i32 = session.get("views").unwrap_or(0);
//!     session.set("views", views + 1).ok();
//!     format!("views: {}", views + 1)
//! }
//! ```

pub mod config;
pub mod cookie_signature;
pub mod error;
pub mod handler;
pub mod session;
pub mod session_id;
pub mod store;

pub use config::{CookieConfig, SameSite, SessionConfig, SessionOptions};
pub use error::SessionError;
pub use handler::SessionHandler;
pub use session::{Session, SessionData};
pub use session_id::{RandomIdGenerator, SessionIdGenerator};
pub use store::{CacheEntry, CallbackCache, Callbacks, MemoryCache, SessionCache};

#[cfg(feature = "redis-store")]
pub use store::RedisCache;

/// Extension trait for Depot to easily access session
pub mod depot_ext;
pub use depot_ext::SessionDepotExt;
