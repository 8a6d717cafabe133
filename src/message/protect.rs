//! Message protection.
//!
//! Turning a message into an opaque cookie value is the provider's business;
//! the flow driver only needs *some* capability that does it. A
//! [`MessageProtector`] returns the opaque value together with the complete
//! `Set-Cookie` descriptor the provider would have emitted, so the caller can
//! store the cookie without a real response.
//!
//! [`SignedCookieProtector`] is a simple keyed implementation: base64url JSON
//! followed by an HMAC-SHA256 tag over kind and payload. It detects tampering
//! but does not encrypt.

use crate::cookies::SetCookie;
use crate::errors::{FlowError, Result};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use time::{Duration, OffsetDateTime};
use uuid::Uuid;

/// Where and when a message cookie is being issued.
#[derive(Debug, Clone)]
pub struct ProtectContext {
    /// Cookie path (the provider's base path).
    pub path: String,
    /// Whether the provider is served over https.
    pub secure: bool,
    pub now: OffsetDateTime,
    pub lifetime: Duration,
}

/// Result of protecting one message.
#[derive(Debug, Clone)]
pub struct Protected {
    /// Correlation id referenced by follow-up URLs (`?signin=<id>`).
    pub id: String,
    /// Opaque cookie value.
    pub value: String,
    /// `Set-Cookie` header value carrying `value`.
    pub set_cookie: String,
}

pub trait MessageProtector {
    /// Protects a serialized message of the given kind.
    fn protect(&self, kind: &str, payload: &[u8], ctx: &ProtectContext) -> Result<Protected>;

    /// Reverses [`protect`](Self::protect) for a cookie value.
    fn unprotect(&self, kind: &str, value: &str) -> Result<Vec<u8>>;
}

/// Cookie name for a message of `kind` with correlation `id`.
pub fn message_cookie_name(kind: &str, id: &str) -> String {
    format!("{kind}.{id}")
}

pub struct SignedCookieProtector {
    key: Vec<u8>,
}

impl SignedCookieProtector {
    pub fn new(key: impl Into<Vec<u8>>) -> Self {
        Self { key: key.into() }
    }

    fn mac(&self, kind: &str, payload: &[u8]) -> Result<Hmac<Sha256>> {
        let mut mac = Hmac::<Sha256>::new_from_slice(&self.key)
            .map_err(|e| FlowError::Protocol(format!("message signing key: {e}")))?;
        mac.update(kind.as_bytes());
        mac.update(&[0u8]);
        mac.update(payload);
        Ok(mac)
    }
}

impl MessageProtector for SignedCookieProtector {
    fn protect(&self, kind: &str, payload: &[u8], ctx: &ProtectContext) -> Result<Protected> {
        let expires = ctx.now.checked_add(ctx.lifetime).ok_or_else(|| {
            FlowError::Protocol(format!("{kind} lifetime {} overflows the clock", ctx.lifetime))
        })?;

        let id = Uuid::new_v4().simple().to_string();
        let tag = self.mac(kind, payload)?.finalize().into_bytes();
        let value = format!("{}.{}", URL_SAFE_NO_PAD.encode(payload), URL_SAFE_NO_PAD.encode(tag));

        let set_cookie = SetCookie::new(message_cookie_name(kind, &id), value.clone())
            .expires(expires)
            .path(ctx.path.clone())
            .secure(ctx.secure)
            .http_only(true);

        Ok(Protected {
            id,
            value,
            set_cookie: set_cookie.to_string(),
        })
    }

    fn unprotect(&self, kind: &str, value: &str) -> Result<Vec<u8>> {
        let (payload, signature) = value
            .split_once('.')
            .ok_or_else(|| FlowError::Protocol(format!("{kind} cookie value is not signed")))?;

        let payload = URL_SAFE_NO_PAD
            .decode(payload)
            .map_err(|e| FlowError::Decode(format!("{kind} payload: {e}")))?;
        let signature = URL_SAFE_NO_PAD
            .decode(signature)
            .map_err(|e| FlowError::Decode(format!("{kind} signature: {e}")))?;

        self.mac(kind, &payload)?
            .verify_slice(&signature)
            .map_err(|_| FlowError::Protocol(format!("{kind} cookie signature mismatch")))?;
        Ok(payload)
    }
}
