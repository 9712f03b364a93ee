//! Session middleware handler for Salvo
//!
//! The handler runs as a hoop around the rest of the chain:
//!
//! 1. **restore**: verify the inbound session cookie and load cached state
//! 2. the downstream handlers read and write the session through the depot
//! 3. **persist**: if the session was modified, store it and issue a signed cookie

use salvo_core::http::cookie::{self, Cookie};
use salvo_core::prelude::*;
use std::sync::Arc;

use crate::config::{SameSite, SessionConfig};
use crate::cookie_signature::{sign, unsign};
use crate::depot_ext::SESSION_KEY;
use crate::error::SessionError;
use crate::session::Session;
use crate::session_id::{RandomIdGenerator, SessionIdGenerator};
use crate::store::SessionCache;

/// Cookie-backed session middleware for Salvo
///
/// The cache calling convention is fixed by the cache type `C`: use a
/// [`SessionCache`] directly, or wrap a callback-style cache in
/// [`Callbacks`](crate::store::Callbacks).
pub struct SessionHandler<C: SessionCache> {
    cache: Arc<C>,
    config: Arc<SessionConfig>,
    secret: Arc<str>,
    ids: Arc<dyn SessionIdGenerator>,
}

impl<C: SessionCache> SessionHandler<C> {
    /// Create a new session handler.
    ///
    /// Fails with [`SessionError::Config`] when the configuration is invalid,
    /// so a misconfigured handler can never be mounted.
    pub fn new(cache: C, config: SessionConfig) -> Result<Self, SessionError> {
        let secret: Arc<str> = Arc::from(config.validate()?);
        Ok(Self {
            cache: Arc::new(cache),
            config: Arc::new(config),
            secret,
            ids: Arc::new(RandomIdGenerator),
        })
    }

    /// Replace the session id generator
    pub fn with_id_generator<G: SessionIdGenerator>(mut self, ids: G) -> Self {
        self.ids = Arc::new(ids);
        self
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Read the raw session cookie value from the request
    fn cookie_value(&self, req: &Request) -> Option<String> {
        let cookie = req.cookie(&self.config.cookie_name)?;
        let raw = cookie.value();

        // Some clients percent-encode cookie values
        let decoded = match urlencoding::decode(raw) {
            Ok(d) => d.into_owned(),
            Err(_) => raw.to_string(),
        };
        Some(decoded)
    }

    /// Resolve the inbound cookie value to a session.
    ///
    /// A missing cookie, a bad signature or a cache miss all yield a fresh
    /// session. Only a cache failure is an error.
    pub async fn restore(&self, cookie_value: Option<&str>) -> Result<Session, SessionError> {
        let Some(signed) = cookie_value.filter(|v| !v.is_empty()) else {
            return Ok(Session::new());
        };

        let Some(session_id) = unsign(signed, &self.secret) else {
            tracing::warn!("session id signature mismatch, starting new session");
            return Ok(Session::new());
        };
        tracing::trace!(session_id = %session_id, "session cookie verified");

        match self.cache.get(&session_id).await {
            Ok(Some(entry)) => {
                tracing::trace!(session_id = %session_id, "session restored");
                Ok(Session::from_data(entry.item).with_id(session_id))
            }
            Ok(None) => {
                tracing::trace!(session_id = %session_id, "session data missing (new/expired)");
                // Keep the verified id so a write revives the same session
                Ok(Session::new().with_id(session_id))
            }
            Err(e) => {
                tracing::trace!(session_id = %session_id, "could not retrieve session data");
                Err(e)
            }
        }
    }

    /// Store a modified session and build the cookie to send back.
    ///
    /// Returns `Ok(None)` for an untouched session: nothing is written and no
    /// cookie is issued. A cookie is only returned once the data is stored.
    pub async fn persist(&self, session: Session) -> Result<Option<Cookie<'static>>, SessionError> {
        if !session.is_dirty() {
            return Ok(None);
        }

        let session_id = match session.id() {
            Some(id) => id.to_string(),
            None => self.ids.generate()?,
        };
        if session_id.is_empty() {
            tracing::trace!("could not store session with missing id");
            return Err(SessionError::MissingSessionId);
        }

        self.cache
            .set(&session_id, session.data(), self.config.max_age)
            .await?;
        tracing::trace!(session_id = %session_id, "session stored");

        Ok(Some(self.session_cookie(&session_id)))
    }

    /// Build the signed session cookie for `session_id`
    fn session_cookie(&self, session_id: &str) -> Cookie<'static> {
        let signed = sign(session_id, &self.secret);
        let cookie_config = &self.config.cookie;

        let mut builder = Cookie::build((self.config.cookie_name.clone(), signed))
            .http_only(cookie_config.http_only);

        if let Some(domain) = cookie_config.domain.clone() {
            builder = builder.domain(domain);
        }
        if let Some(path) = cookie_config.path.clone() {
            builder = builder.path(path);
        }

        builder = match cookie_config.same_site {
            Some(SameSite::Strict) => builder.same_site(cookie::SameSite::Strict),
            Some(SameSite::Lax) => builder.same_site(cookie::SameSite::Lax),
            Some(SameSite::None) => builder.same_site(cookie::SameSite::None),
            None => builder,
        };

        // Without an expiry the browser drops the cookie when it closes
        if let Some(expires) = cookie_config.expires_at(cookie::time::OffsetDateTime::now_utc()) {
            builder = builder.expires(expires);
        }

        builder.build()
    }
}

impl<C: SessionCache> Clone for SessionHandler<C> {
    fn clone(&self) -> Self {
        Self {
            cache: Arc::clone(&self.cache),
            config: Arc::clone(&self.config),
            secret: Arc::clone(&self.secret),
            ids: Arc::clone(&self.ids),
        }
    }
}

#[async_trait]
impl<C: SessionCache> Handler for SessionHandler<C> {
    async fn handle(&self, req: &mut Request, depot: &mut Depot, res: &mut Response, ctrl: &mut FlowCtrl) {
        let cookie_value = self.cookie_value(req);
        let session = match self.restore(cookie_value.as_deref()).await {
            Ok(session) => session,
            Err(e) => {
                tracing::error!("Failed to restore session: {}", e);
                res.render(StatusError::internal_server_error().brief("Session could not be restored."));
                ctrl.skip_rest();
                return;
            }
        };

        depot.insert(SESSION_KEY, session);

        ctrl.call_next(req, depot, res).await;

        let Ok(session) = depot.remove::<Session>(SESSION_KEY) else {
            tracing::warn!("session was removed from the depot, skipping persistence");
            return;
        };

        match self.persist(session).await {
            Ok(Some(cookie)) => {
                res.add_cookie(cookie);
            }
            Ok(None) => {}
            Err(e) => {
                tracing::error!("Failed to persist session: {}", e);
                res.render(StatusError::internal_server_error().brief("Session could not be saved."));
            }
        }
    }
}
