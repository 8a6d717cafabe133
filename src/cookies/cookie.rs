//! Cookie core type.
//!
//! A [`Cookie`] is what the jar holds and what gets sent back on the next
//! request. Attributes that only matter to a real browser (path, domain,
//! secure) are kept for inspection but are not used to filter requests: the
//! simulated client talks to a single provider.
//!
//! ```rust
//! use signin_sim::cookies::Cookie;
//!
//! let c = Cookie::new("idsrv", "abc123");
//! assert_eq!(c.to_string(), "idsrv=abc123");
//! ```

use std::fmt;
use time::OffsetDateTime;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cookie {
    /// Cookie name (case-sensitive).
    pub name: String,

    /// Raw cookie value (not URL-decoded).
    pub value: String,

    /// Absolute expiration, if any. Session cookies have `None`.
    ///
    /// A `Max-Age` attribute is resolved against the simulation clock at the
    /// moment the cookie is stored.
    pub expires: Option<OffsetDateTime>,

    /// Path scoping as sent by the server.
    pub path: Option<String>,

    /// Domain scoping as sent by the server (leading dot stripped).
    pub domain: Option<String>,

    pub secure: bool,

    pub http_only: bool,
}

impl Cookie {
    /// Creates a session cookie without any attributes.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            expires: None,
            path: None,
            domain: None,
            secure: false,
            http_only: false,
        }
    }

    /// Sets an absolute expiration.
    pub fn with_expires(mut self, expires: OffsetDateTime) -> Self {
        self.expires = Some(expires);
        self
    }

    /// Returns true when the cookie expired strictly before `now`.
    pub fn is_expired(&self, now: OffsetDateTime) -> bool {
        self.expires.is_some_and(|e| e < now)
    }
}

/// Request-header representation (`name=value`).
impl fmt::Display for Cookie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.name, self.value)
    }
}
