//! Session configuration

use salvo_core::http::cookie::time::{Duration as CookieDuration, OffsetDateTime};
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;

use crate::error::SessionError;

/// Default session lifetime in the cache and default cookie expiry: 30 minutes
pub const DEFAULT_MAX_AGE_MS: u64 = 1_800_000;

/// Default name of the session cookie
pub const DEFAULT_COOKIE_NAME: &str = "sessionid";

/// Minimum accepted length of the signing secret, counted in Unicode scalar
/// values (`str::chars`). JavaScript's `String.length` counts UTF-16 code
/// units instead; the two only differ for characters outside the BMP, where a
/// secret passing here could be rejected by a UTF-16 count of the same text.
pub const MIN_SECRET_LEN: usize = 32;

/// Configuration for the session middleware
#[derive(Clone, Debug)]
pub struct SessionConfig {
    /// Secret key for signing session cookies. Required, at least 32 characters.
    pub secret_key: Option<String>,

    /// Name of the session cookie (default: "sessionid")
    pub cookie_name: String,

    /// Lifetime of cached session data in milliseconds (default: 30 minutes).
    /// This is the authoritative session lifetime.
    pub max_age: u64,

    /// Attributes of the issued cookie
    pub cookie: CookieConfig,
}

/// Attributes applied to the session cookie
#[derive(Clone, Debug, PartialEq)]
pub struct CookieConfig {
    /// Cookie domain (default: None - current domain only)
    pub domain: Option<String>,

    /// Cookie path (default: None)
    pub path: Option<String>,

    /// HttpOnly flag for cookie (default: true)
    pub http_only: bool,

    /// SameSite attribute (default: Strict). None omits the attribute.
    pub same_site: Option<SameSite>,

    /// Cookie expiry as a millisecond offset from the time the cookie is
    /// written (default: 30 minutes). None issues a browser-session cookie.
    pub expires: Option<u64>,
}

/// SameSite cookie attribute
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SameSite {
    /// Strict - cookie only sent for same-site requests
    Strict,
    /// Lax - cookie sent for same-site requests and top-level navigations
    Lax,
    /// None - cookie sent for all requests (requires Secure)
    None,
}

impl Default for CookieConfig {
    fn default() -> Self {
        Self {
            domain: None,
            path: None,
            http_only: true,
            same_site: Some(SameSite::Strict),
            expires: Some(DEFAULT_MAX_AGE_MS),
        }
    }
}

impl CookieConfig {
    /// Absolute expiry for a cookie written at `now`, or None for a
    /// browser-session cookie or an offset past the representable range
    pub fn expires_at(&self, now: OffsetDateTime) -> Option<OffsetDateTime> {
        let ms = i64::try_from(self.expires?).ok()?;
        now.checked_add(CookieDuration::milliseconds(ms))
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            secret_key: None,
            cookie_name: DEFAULT_COOKIE_NAME.to_string(),
            max_age: DEFAULT_MAX_AGE_MS,
            cookie: CookieConfig::default(),
        }
    }
}

impl SessionConfig {
    /// Create a new session configuration with the given secret
    pub fn new<S: Into<String>>(secret: S) -> Self {
        Self {
            secret_key: Some(secret.into()),
            ..Default::default()
        }
    }

    /// Set the cookie name (default: "sessionid")
    pub fn with_cookie_name<S: Into<String>>(mut self, name: S) -> Self {
        self.cookie_name = name.into();
        self
    }

    /// Set the cache lifetime of session data in milliseconds
    pub fn with_max_age(mut self, max_age_ms: u64) -> Self {
        self.max_age = max_age_ms;
        self
    }

    /// Set the cache lifetime of session data from a Duration
    pub fn with_max_age_duration(mut self, duration: Duration) -> Self {
        self.max_age = duration.as_millis().try_into().unwrap_or(u64::MAX);
        self
    }

    /// Set the cookie domain
    pub fn with_cookie_domain<S: Into<String>>(mut self, domain: S) -> Self {
        self.cookie.domain = Some(domain.into());
        self
    }

    /// Set the cookie path
    pub fn with_cookie_path<S: Into<String>>(mut self, path: S) -> Self {
        self.cookie.path = Some(path.into());
        self
    }

    /// Set the HttpOnly flag (default: true)
    pub fn with_http_only(mut self, http_only: bool) -> Self {
        self.cookie.http_only = http_only;
        self
    }

    /// Set the SameSite attribute (default: Strict)
    pub fn with_same_site(mut self, same_site: SameSite) -> Self {
        self.cookie.same_site = Some(same_site);
        self
    }

    /// Omit the SameSite attribute
    pub fn without_same_site(mut self) -> Self {
        self.cookie.same_site = None;
        self
    }

    /// Set the cookie expiry offset in milliseconds. 0 issues a browser-session cookie.
    pub fn with_cookie_expires(mut self, expires_ms: u64) -> Self {
        self.cookie.expires = Some(expires_ms).filter(|ms| *ms > 0);
        self
    }

    /// Issue a browser-session cookie without an Expires attribute
    pub fn without_cookie_expires(mut self) -> Self {
        self.cookie.expires = None;
        self
    }

    /// Load a configuration from a JSON options object, e.g.
    /// `{"secretKey": "...", "cookie": {"expires": 60000}}`
    pub fn from_json(json: &str) -> Result<Self, SessionError> {
        let options: SessionOptions = serde_json::from_str(json)
            .map_err(|e| SessionError::Config(format!("invalid session options: {}", e)))?;
        Self::from_options(options)
    }

    /// Build and validate a configuration from raw options
    pub fn from_options(options: SessionOptions) -> Result<Self, SessionError> {
        let defaults = Self::default();
        let config = Self {
            secret_key: options.secret_key,
            cookie_name: options.session_cookie_name.unwrap_or(defaults.cookie_name),
            max_age: options.session_max_age.unwrap_or(defaults.max_age),
            cookie: CookieConfig {
                domain: options.cookie.domain,
                path: options.cookie.path,
                http_only: options.cookie.http_only.unwrap_or(true),
                same_site: parse_same_site(&options.cookie.same_site)?,
                expires: parse_expires(&options.cookie.expires)?,
            },
        };
        config.validate()?;
        Ok(config)
    }

    /// Check the configuration and return the signing secret. Called once
    /// when the session handler is built.
    pub fn validate(&self) -> Result<&str, SessionError> {
        let secret = match self.secret_key.as_deref() {
            Some(secret) if !secret.is_empty() => secret,
            _ => return Err(SessionError::Config("must supply secretKey".to_string())),
        };
        if secret.chars().count() < MIN_SECRET_LEN {
            return Err(SessionError::Config(format!(
                "secretKey must be at least {} characters",
                MIN_SECRET_LEN
            )));
        }
        if self.cookie_name.is_empty() {
            return Err(SessionError::Config(
                "sessionCookieName must not be empty".to_string(),
            ));
        }
        if self.cookie.expires.is_some()
            && self.cookie.expires_at(OffsetDateTime::now_utc()).is_none()
        {
            return Err(SessionError::Config(
                "cookie expires time is out of range".to_string(),
            ));
        }
        Ok(secret)
    }
}

/// Raw, loosely typed session options as found in a JSON configuration file
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SessionOptions {
    pub secret_key: Option<String>,
    pub session_cookie_name: Option<String>,
    pub session_max_age: Option<u64>,
    pub cookie: CookieOptions,
}

/// Raw cookie options; `sameSite` and `expires` are validated on conversion
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CookieOptions {
    pub domain: Option<String>,
    pub path: Option<String>,
    pub http_only: Option<bool>,
    pub same_site: Value,
    pub expires: Value,
}

impl Default for CookieOptions {
    fn default() -> Self {
        Self {
            domain: None,
            path: None,
            http_only: None,
            same_site: Value::Bool(true),
            expires: Value::from(DEFAULT_MAX_AGE_MS),
        }
    }
}

/// Falsy values disable the expiry; any other non-integer is rejected
fn parse_expires(value: &Value) -> Result<Option<u64>, SessionError> {
    let invalid =
        || SessionError::Config("cookie expires time must be a value in milliseconds".to_string());
    match value {
        Value::Null | Value::Bool(false) => Ok(None),
        Value::String(s) if s.is_empty() => Ok(None),
        Value::Number(n) => {
            if let Some(ms) = n.as_u64() {
                return Ok(Some(ms).filter(|ms| *ms > 0));
            }
            match n.as_f64() {
                Some(f) if f == 0.0 => Ok(None),
                Some(f) if f > 0.0 && f.fract() == 0.0 && f <= u64::MAX as f64 => {
                    Ok(Some(f as u64))
                }
                _ => Err(invalid()),
            }
        }
        _ => Err(invalid()),
    }
}

fn parse_same_site(value: &Value) -> Result<Option<SameSite>, SessionError> {
    match value {
        Value::Null | Value::Bool(false) => Ok(None),
        Value::Bool(true) => Ok(Some(SameSite::Strict)),
        Value::String(s) => match s.to_ascii_lowercase().as_str() {
            "strict" => Ok(Some(SameSite::Strict)),
            "lax" => Ok(Some(SameSite::Lax)),
            "none" => Ok(Some(SameSite::None)),
            _ => Err(SessionError::Config(format!("unknown sameSite value: {}", s))),
        },
        other => Err(SessionError::Config(format!("unknown sameSite value: {}", other))),
    }
}
