//! `Set-Cookie` directive parsing.
//!
//! A single `Set-Cookie` header value may carry more than one `name=value`
//! pair (the form ASP.NET style servers emit), followed by attributes. All
//! pairs in one directive share the same attributes, so an expired directive
//! deletes every name it carries.
//!
//! ## Notes & limitations
//! - Attributes handled: `Expires`, `Max-Age`, `Path`, `Domain` (leading dot
//!   stripped), `SameSite`, `Secure`, `HttpOnly`. `Max-Age` wins over
//!   `Expires` when both are present.
//! - `Expires` accepts the IMF-fixdate form (`Wed, 21 Oct 2015 07:28:00 GMT`)
//!   and the dashed form (`Thu, 01-Jan-1970 00:00:00 GMT`). Two-digit years
//!   are rejected.
//! - Any other bare token, an invalid name, or a directive without a single
//!   pair makes the whole directive malformed.

use crate::cookies::Cookie;
use http::header::SET_COOKIE;
use http::HeaderMap;
use std::fmt;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::{Duration, OffsetDateTime, PrimitiveDateTime, UtcOffset};

const IMF_FIXDATE: &[BorrowedFormatItem<'_>] = format_description!(
    "[weekday repr:short case_sensitive:false], [day] [month repr:short case_sensitive:false] [year] [hour]:[minute]:[second] GMT"
);

const DASHED_DATE: &[BorrowedFormatItem<'_>] = format_description!(
    "[weekday repr:short case_sensitive:false], [day]-[month repr:short case_sensitive:false]-[year] [hour]:[minute]:[second] GMT"
);

const OUTPUT_DATE: &[BorrowedFormatItem<'_>] =
    format_description!("[weekday repr:short], [day] [month repr:short] [year] [hour]:[minute]:[second] GMT");

/// Characters that may not appear in a cookie name (RFC 6265 token).
const NAME_SEPARATORS: &[char] = &[
    '(', ')', '<', '>', '@', ',', ';', ':', '\\', '"', '/', '[', ']', '?', '=', '{', '}', ' ', '\t',
];

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SetCookieError {
    #[error("directive carries no name=value pair")]
    MissingCookie,

    #[error("invalid cookie name {0:?}")]
    InvalidName(String),

    #[error("invalid cookie value {0:?}")]
    InvalidValue(String),

    #[error("invalid expires date {0:?}")]
    InvalidExpires(String),

    #[error("invalid max-age {0:?}")]
    InvalidMaxAge(String),

    #[error("unexpected token {0:?}")]
    UnexpectedToken(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SameSite {
    Strict,
    Lax,
    None,
}

impl SameSite {
    /// Case-insensitive parse. Unknown policies yield `None` and are ignored,
    /// the way browsers treat them.
    fn parse(s: &str) -> Option<Self> {
        if s.eq_ignore_ascii_case("strict") {
            Some(SameSite::Strict)
        } else if s.eq_ignore_ascii_case("lax") {
            Some(SameSite::Lax)
        } else if s.eq_ignore_ascii_case("none") {
            Some(SameSite::None)
        } else {
            None
        }
    }

    fn as_str(&self) -> &'static str {
        match self {
            SameSite::Strict => "strict",
            SameSite::Lax => "lax",
            SameSite::None => "none",
        }
    }
}

/// One parsed `Set-Cookie` header value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SetCookie {
    /// `(name, value)` pairs in header order.
    pub cookies: Vec<(String, String)>,
    pub expires: Option<OffsetDateTime>,
    /// Lifetime in seconds; zero or negative means "delete now".
    pub max_age: Option<i64>,
    pub path: Option<String>,
    pub domain: Option<String>,
    pub secure: bool,
    pub http_only: bool,
    pub same_site: Option<SameSite>,
}

impl SetCookie {
    /// Creates a directive for a single cookie without attributes.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            cookies: vec![(name.into(), value.into())],
            ..Default::default()
        }
    }

    pub fn expires(mut self, at: OffsetDateTime) -> Self {
        self.expires = Some(at);
        self
    }

    pub fn max_age(mut self, seconds: i64) -> Self {
        self.max_age = Some(seconds);
        self
    }

    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn secure(mut self, on: bool) -> Self {
        self.secure = on;
        self
    }

    pub fn http_only(mut self, on: bool) -> Self {
        self.http_only = on;
        self
    }

    /// Parses a single `Set-Cookie` header value.
    pub fn parse(header: &str) -> Result<Self, SetCookieError> {
        let mut directive = SetCookie::default();

        for part in header.split(';') {
            let part = part.trim();
            if part.is_empty() {
                continue;
            }

            if let Some((k, v)) = part.split_once('=') {
                let (k, v) = (k.trim(), v.trim());
                match k.to_ascii_lowercase().as_str() {
                    "expires" => directive.expires = Some(parse_http_date(v)?),
                    "max-age" => {
                        let secs = v
                            .parse::<i64>()
                            .map_err(|_| SetCookieError::InvalidMaxAge(v.to_string()))?;
                        directive.max_age = Some(secs);
                    }
                    "path" => directive.path = Some(v.to_string()),
                    "domain" => directive.domain = Some(v.trim_start_matches('.').to_string()),
                    "samesite" => directive.same_site = SameSite::parse(v),
                    _ => {
                        validate_name(k)?;
                        validate_value(v)?;
                        directive.cookies.push((k.to_string(), v.to_string()));
                    }
                }
            } else if part.eq_ignore_ascii_case("secure") {
                directive.secure = true;
            } else if part.eq_ignore_ascii_case("httponly") {
                directive.http_only = true;
            } else {
                return Err(SetCookieError::UnexpectedToken(part.to_string()));
            }
        }

        if directive.cookies.is_empty() {
            return Err(SetCookieError::MissingCookie);
        }

        Ok(directive)
    }

    /// Parses every `Set-Cookie` header in `headers`.
    ///
    /// Values that are not valid UTF-8 or fail to parse are skipped with a
    /// warning; a response may carry unrelated cookie traffic we cannot read.
    pub fn from_headers(headers: &HeaderMap) -> Vec<SetCookie> {
        headers
            .get_all(SET_COOKIE)
            .iter()
            .filter_map(|raw| {
                let value = match raw.to_str() {
                    Ok(v) => v,
                    Err(_) => {
                        log::warn!("Skipping non-text Set-Cookie header");
                        return None;
                    }
                };
                match SetCookie::parse(value) {
                    Ok(directive) => Some(directive),
                    Err(e) => {
                        log::warn!("Skipping malformed Set-Cookie {:?}: {}", value, e);
                        None
                    }
                }
            })
            .collect()
    }

    /// Names of all cookies carried by this directive.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.cookies.iter().map(|(name, _)| name.as_str())
    }

    /// Absolute expiration as seen at `now`. `Max-Age` takes precedence, even
    /// over an `Expires` already in the past. A `Max-Age` beyond the
    /// representable range saturates to the latest representable instant.
    pub fn expires_at(&self, now: OffsetDateTime) -> Option<OffsetDateTime> {
        match self.max_age {
            Some(secs) if secs <= 0 => Some(OffsetDateTime::UNIX_EPOCH),
            Some(secs) => Some(
                now.checked_add(Duration::seconds(secs))
                    .unwrap_or_else(|| PrimitiveDateTime::MAX.assume_utc()),
            ),
            None => self.expires,
        }
    }

    /// A directive is a deletion when it expires strictly before `now`.
    pub fn is_expired(&self, now: OffsetDateTime) -> bool {
        self.expires_at(now).is_some_and(|e| e < now)
    }

    /// Materializes the carried pairs as jar cookies.
    pub fn to_cookies(&self, now: OffsetDateTime) -> Vec<Cookie> {
        let expires = self.expires_at(now);
        self.cookies
            .iter()
            .map(|(name, value)| Cookie {
                name: name.clone(),
                value: value.clone(),
                expires,
                path: self.path.clone(),
                domain: self.domain.clone(),
                secure: self.secure,
                http_only: self.http_only,
            })
            .collect()
    }
}

/// Header representation, attributes in lower case.
impl fmt::Display for SetCookie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let pairs = self
            .cookies
            .iter()
            .map(|(n, v)| format!("{n}={v}"))
            .collect::<Vec<_>>()
            .join("; ");
        f.write_str(&pairs)?;

        if let Some(expires) = self.expires {
            write!(f, "; expires={}", format_http_date(expires))?;
        }
        if let Some(max_age) = self.max_age {
            write!(f, "; max-age={max_age}")?;
        }
        if let Some(domain) = &self.domain {
            write!(f, "; domain={domain}")?;
        }
        if let Some(path) = &self.path {
            write!(f, "; path={path}")?;
        }
        if self.secure {
            f.write_str("; secure")?;
        }
        if let Some(same_site) = self.same_site {
            write!(f, "; samesite={}", same_site.as_str())?;
        }
        if self.http_only {
            f.write_str("; httponly")?;
        }
        Ok(())
    }
}

/// Parses an HTTP date as used in the `Expires` attribute.
pub fn parse_http_date(s: &str) -> Result<OffsetDateTime, SetCookieError> {
    PrimitiveDateTime::parse(s, IMF_FIXDATE)
        .or_else(|_| PrimitiveDateTime::parse(s, DASHED_DATE))
        .map(PrimitiveDateTime::assume_utc)
        .map_err(|_| SetCookieError::InvalidExpires(s.to_string()))
}

/// Formats `at` as an IMF-fixdate.
pub fn format_http_date(at: OffsetDateTime) -> String {
    at.to_offset(UtcOffset::UTC)
        .format(OUTPUT_DATE)
        .unwrap_or_else(|_| String::from("Thu, 01 Jan 1970 00:00:00 GMT"))
}

fn validate_name(name: &str) -> Result<(), SetCookieError> {
    let bad = name.is_empty() || name.chars().any(|c| c.is_ascii_control() || !c.is_ascii() || NAME_SEPARATORS.contains(&c));
    if bad {
        return Err(SetCookieError::InvalidName(name.to_string()));
    }
    Ok(())
}

fn validate_value(value: &str) -> Result<(), SetCookieError> {
    let bad = value
        .chars()
        .any(|c| c.is_ascii_control() || c.is_whitespace() || matches!(c, ',' | ';' | '\\'));
    if bad {
        return Err(SetCookieError::InvalidValue(value.to_string()));
    }
    Ok(())
}
