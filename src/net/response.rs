//! Minimal HTTP response model.
//!
//! This struct represents a **fully buffered** HTTP response as returned by a
//! [`Transport`](crate::net::Transport). It is the "response snapshot" every
//! inspection and cookie update works from, and is never mutated after it has
//! been captured.
//!
//! ## Notes
//! - The body is stored as raw `Vec<u8>`. Use [`Response::text`] for HTML or
//!   `serde_json::from_slice::<T>(&resp.body)` for JSON.
//! - `headers` is an `http::HeaderMap`, which is **case-insensitive** for
//!   header names and keeps repeated `Set-Cookie` headers apart.
//! - `status_text` is derived from the status code's canonical reason phrase
//!   and may be `"Unknown"` for non-standard codes.
//!
use http::header::{CONTENT_TYPE, LOCATION};
use http::{HeaderMap, StatusCode};
use std::borrow::Cow;
use url::Url;

/// Simple structure for HTTP responses.
#[derive(Debug, Clone)]
pub struct Response {
    /// URL the response was received from, when known.
    pub url: Option<Url>,

    /// Numeric HTTP status code (e.g., `200`, `404`).
    pub status: u16,

    /// Human-readable reason phrase (e.g., `"OK"`, `"Not Found"`).
    pub status_text: String,

    /// Response headers as a case-insensitive map.
    pub headers: HeaderMap,

    /// Raw response body bytes.
    pub body: Vec<u8>,
}

impl Response {
    pub fn new(status: u16, headers: HeaderMap, body: impl Into<Vec<u8>>) -> Self {
        Self {
            url: None,
            status,
            status_text: reason(status),
            headers,
            body: body.into(),
        }
    }

    pub fn with_url(mut self, url: Url) -> Self {
        self.url = Some(url);
        self
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Body as text, replacing invalid UTF-8.
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }

    /// Full `Content-Type` header value.
    pub fn content_type(&self) -> Option<&str> {
        self.headers.get(CONTENT_TYPE).and_then(|v| v.to_str().ok())
    }

    /// Media type of the body without parameters, lower-cased
    /// (`text/html; charset=utf-8` becomes `text/html`).
    pub fn media_type(&self) -> Option<String> {
        self.content_type()
            .and_then(|ct| ct.split(';').next())
            .map(|mt| mt.trim().to_ascii_lowercase())
    }

    /// Redirect target, if the response carries one.
    pub fn location(&self) -> Option<&str> {
        self.headers.get(LOCATION).and_then(|v| v.to_str().ok())
    }
}

pub(crate) fn reason(status: u16) -> String {
    StatusCode::from_u16(status)
        .ok()
        .and_then(|s| s.canonical_reason())
        .unwrap_or("Unknown")
        .to_string()
}
