//! Message codec: typed protocol messages carried in short-lived cookies.
//!
//! Writing a message protects it, stores the resulting cookie in the jar right
//! away (there is no real response to carry it) and hands back the
//! correlation id a follow-up URL refers to.

mod protect;
mod signin;

pub use protect::{message_cookie_name, MessageProtector, ProtectContext, Protected, SignedCookieProtector};
pub use signin::SignInMessage;

use crate::cookies::{CookieJar, SetCookie};
use crate::errors::{FlowError, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// A protocol message with a well-known kind tag.
pub trait Message: Serialize + DeserializeOwned {
    /// Kind tag; also the prefix of the message cookie name.
    const KIND: &'static str;
}

/// Protects `message` and stores its cookie in `jar`, returning the correlation id.
pub fn write_message<M: Message>(
    jar: &mut CookieJar,
    protector: &dyn MessageProtector,
    message: &M,
    ctx: &ProtectContext,
) -> Result<String> {
    let payload = serde_json::to_vec(message)?;
    let protected = protector.protect(M::KIND, &payload, ctx)?;

    if protected.set_cookie.trim().is_empty() {
        return Err(FlowError::Protocol(format!("{} issued no cookie", M::KIND)));
    }

    let directive = SetCookie::parse(&protected.set_cookie)
        .map_err(|e| FlowError::Protocol(format!("{} cookie failed to parse: {e}", M::KIND)))?;

    jar.apply_set_cookie(&directive, ctx.now);
    log::debug!("Wrote {} {}", M::KIND, protected.id);

    Ok(protected.id)
}

/// Reads back the message stored under correlation `id`.
pub fn read_message<M: Message>(jar: &CookieJar, protector: &dyn MessageProtector, id: &str) -> Result<M> {
    let name = message_cookie_name(M::KIND, id);
    let cookie = jar
        .get(&name)
        .ok_or_else(|| FlowError::Protocol(format!("no {name} cookie")))?;

    let payload = protector.unprotect(M::KIND, &cookie.value)?;
    Ok(serde_json::from_slice(&payload)?)
}
