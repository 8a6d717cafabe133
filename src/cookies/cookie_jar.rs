//! The simulated client's cookie jar.
//!
//! A jar keeps the cookies of one simulated client, in the order they were
//! first written, keyed by name. It is fed from responses via
//! [`CookieJar::apply_response`] and serialized into the `Cookie` request
//! header via [`CookieJar::header_value`].
//!
//! ## Notes & limitations
//! - There is one bucket only: the simulated client talks to a single
//!   provider, so no origin, domain or path matching is done.
//! - Writing a cookie whose name is already held removes the old entry and
//!   appends the new one at the end.
//! - Expired cookies are only dropped when a response deletes them; the jar
//!   does not purge on its own.
//! - The jar is not internally synchronized. One client owns it.

use crate::cookies::{Cookie, SetCookie};
use crate::net::Response;
use time::OffsetDateTime;

#[derive(Debug, Clone, Default)]
pub struct CookieJar {
    entries: Vec<Cookie>,
}

impl CookieJar {
    /// Creates an empty jar.
    pub fn new() -> Self {
        Self { entries: Vec::new() }
    }

    /// Writes every cookie into the jar. Later writes for a name supersede
    /// earlier ones.
    pub fn add<I>(&mut self, cookies: I)
    where
        I: IntoIterator<Item = Cookie>,
    {
        for cookie in cookies {
            log::debug!("Jar: set {}", cookie.name);
            self.entries.retain(|c| c.name != cookie.name);
            self.entries.push(cookie);
        }
    }

    /// Adds cookies from raw `name=value` strings.
    ///
    /// Strings without a `=` or with an empty name are skipped.
    pub fn add_raw<I, S>(&mut self, values: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let cookies = values.into_iter().filter_map(|raw| {
            let raw = raw.as_ref();
            match raw.split_once('=') {
                Some((name, value)) if !name.trim().is_empty() => {
                    Some(Cookie::new(name.trim(), value.trim()))
                }
                _ => {
                    log::warn!("Jar: skipping raw cookie {:?}", raw);
                    None
                }
            }
        });
        let cookies: Vec<Cookie> = cookies.collect();
        self.add(cookies);
    }

    /// Removes every cookie whose name matches any of `names`.
    pub fn remove<I, S>(&mut self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for name in names {
            self.remove_cookie(name.as_ref());
        }
    }

    /// Removes a single cookie by name. Missing names are ignored.
    pub fn remove_cookie(&mut self, name: &str) {
        let before = self.entries.len();
        self.entries.retain(|c| c.name != name);
        if self.entries.len() != before {
            log::debug!("Jar: removed {}", name);
        }
    }

    /// Applies one `Set-Cookie` directive as seen at `now`.
    ///
    /// A directive that expired strictly before `now` deletes every name it
    /// carries, whether held or not. Anything else is stored.
    pub fn apply_set_cookie(&mut self, directive: &SetCookie, now: OffsetDateTime) {
        if directive.is_expired(now) {
            self.remove(directive.names());
        } else {
            self.add(directive.to_cookies(now));
        }
    }

    /// Applies all `Set-Cookie` directives of a response, in header order.
    ///
    /// Malformed directives are skipped.
    pub fn apply_response(&mut self, response: &Response, now: OffsetDateTime) {
        for directive in SetCookie::from_headers(&response.headers) {
            self.apply_set_cookie(&directive, now);
        }
    }

    /// Returns the `Cookie` request header value, or `None` for an empty jar.
    pub fn header_value(&self) -> Option<String> {
        if self.entries.is_empty() {
            return None;
        }

        let header = self
            .entries
            .iter()
            .map(Cookie::to_string)
            .collect::<Vec<_>>()
            .join("; ");
        Some(header)
    }

    pub fn get(&self, name: &str) -> Option<&Cookie> {
        self.entries.iter().find(|c| c.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Cookie> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Removes all cookies from the jar.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
