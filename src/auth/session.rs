use std::fmt;

use chrono::{DateTime, Duration, Utc};

/// Session lifetime in hours.
/// Kibana sid cookies expire after 24 hours; 23 leaves a margin so a
/// request never races the backend's own expiry mid-flight.
const SESSION_TTL_HOURS: i64 = 23;

/// Cookie key carrying the Kibana session token
const SESSION_COOKIE_KEY: &str = "sid=";

/// Source of the current time, injected into the client so TTL expiry is
/// testable without real waits.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time. The default clock outside of tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// One authenticated Kibana session: the sid cookie value and when it
/// was obtained.
///
/// A session is valid while the token is non-empty and younger than the
/// TTL. It is destroyed when credentials change, the TTL elapses, or the
/// backend rejects the token.
#[derive(Clone)]
pub struct SessionData {
    token: String,
    created_at: DateTime<Utc>,
}

impl SessionData {
    pub fn new(token: String, created_at: DateTime<Utc>) -> Self {
        Self { token, created_at }
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub(crate) fn token(&self) -> &str {
        &self.token
    }

    /// Check validity against an externally supplied "now".
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        !self.token.is_empty()
            && now - self.created_at < Duration::hours(SESSION_TTL_HOURS)
    }
}

// Tokens must never leak through logs or debug formatting
impl fmt::Debug for SessionData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionData")
            .field("token", &"<redacted>")
            .field("created_at", &self.created_at)
            .finish()
    }
}

/// Extract the sid cookie value from a `set-cookie` header.
///
/// The token is the substring between `sid=` and the next `;`, or the end
/// of the header when no delimiter follows. Returns `None` when the header
/// has no `sid=` segment or the value is empty; the caller treats that as
/// an authentication failure.
pub fn extract_sid_token(set_cookie: &str) -> Option<&str> {
    let start = set_cookie.find(SESSION_COOKIE_KEY)? + SESSION_COOKIE_KEY.len();
    let rest = &set_cookie[start..];
    let token = match rest.find(';') {
        Some(end) => &rest[..end],
        None => rest,
    };
    if token.is_empty() {
        None
    } else {
        Some(token)
    }
}
