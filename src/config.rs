//! Host configuration.
//!
//! `HostConfig` describes the provider a simulated client talks to: where it
//! lives, which routes it serves, how its primary authentication cookie is
//! called and how long message cookies stay valid.
//!
//! `HostConfig` provides sensible defaults via [`Default`] and a fluent
//! [`HostConfig::builder()`] for customization with validation.
//!
//! # Examples
//!
//! ## Use defaults
//! ```rust
//! use signin_sim::config::HostConfig;
//! let cfg = HostConfig::default();
//! assert_eq!(cfg.primary_authentication_cookie, "idsrv");
//! ```
//!
//! ## Customize with the builder
//! ```rust
//! use signin_sim::config::HostConfig;
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let cfg = HostConfig::builder()
//!     .base_url("https://idp.example.com/core")
//!     .primary_authentication_cookie("idsrv")
//!     .message_cookie_lifetime(time::Duration::minutes(5))
//!     .build()?; // returns Result<HostConfig, HostConfigError>
//! assert_eq!(cfg.base_path(), "/core");
//! # Ok(()) }
//! ```
//!
//! # Errors
//!
//! Builder validation returns [`HostConfigError`] for a base URL that does not
//! parse or is not http(s), an empty cookie name, or a non-positive message
//! cookie lifetime.

use std::fmt;
use time::Duration;
use url::Url;

const DEFAULT_BASE_URL: &str = "https://idsrv3.test/";
const DEFAULT_USER_AGENT: &str = "SigninSim/1.0";

/// Route paths, relative to the base URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutePaths {
    pub login: String,
    pub logout: String,
    pub authorize: String,
    pub token: String,
    pub user_info: String,
    pub discovery: String,
}

impl Default for RoutePaths {
    fn default() -> Self {
        Self {
            login: "login".into(),
            logout: "logout".into(),
            authorize: "connect/authorize".into(),
            token: "connect/token".into(),
            user_info: "connect/userinfo".into(),
            discovery: ".well-known/openid-configuration".into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct HostConfig {
    pub base_url: Url,
    /// Cookie whose presence proves the browser is signed in
    pub primary_authentication_cookie: String,
    pub message_cookie_lifetime: Duration,
    pub user_agent: String,
    pub routes: RoutePaths,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            base_url: Url::parse(DEFAULT_BASE_URL).expect("default base url is valid"),
            primary_authentication_cookie: "idsrv".into(),
            message_cookie_lifetime: Duration::minutes(10),
            user_agent: DEFAULT_USER_AGENT.into(),
            routes: RoutePaths::default(),
        }
    }
}

impl HostConfig {
    pub fn builder() -> HostConfigBuilder {
        HostConfigBuilder::default()
    }

    /// Base URL as a string that always ends with `/`.
    pub fn base_url_with_slash(&self) -> String {
        ensure_trailing_slash(self.base_url.as_str())
    }

    /// Path of the base URL, used to scope issued cookies (`/` at minimum).
    pub fn base_path(&self) -> String {
        let path = self.base_url.path().trim_end_matches('/');
        if path.is_empty() {
            "/".to_string()
        } else {
            path.to_string()
        }
    }

    pub fn is_https(&self) -> bool {
        self.base_url.scheme() == "https"
    }
}

pub(crate) fn ensure_trailing_slash(s: &str) -> String {
    if s.ends_with('/') {
        s.to_string()
    } else {
        format!("{s}/")
    }
}

/// Builder for [`HostConfig`].
#[derive(Debug, Clone, Default)]
pub struct HostConfigBuilder {
    inner: HostConfig,
    base_url: Option<String>,
}

impl HostConfigBuilder {
    #[inline]
    fn map(mut self, f: impl FnOnce(&mut HostConfig)) -> Self {
        f(&mut self.inner);
        self
    }

    pub fn base_url<S: Into<String>>(mut self, url: S) -> Self {
        self.base_url = Some(url.into());
        self
    }
    pub fn primary_authentication_cookie<S: Into<String>>(self, name: S) -> Self { self.map(|c| c.primary_authentication_cookie = name.into()) }
    pub fn message_cookie_lifetime(self, lifetime: Duration) -> Self { self.map(|c| c.message_cookie_lifetime = lifetime) }
    pub fn user_agent<S: Into<String>>(self, ua: S) -> Self { self.map(|c| c.user_agent = ua.into()) }
    pub fn routes(self, routes: RoutePaths) -> Self { self.map(|c| c.routes = routes) }

    /// Apply multiple changes in one go.
    pub fn with(self, f: impl FnOnce(&mut HostConfig)) -> Self { self.map(f) }

    /// Validate and build the final config.
    pub fn build(mut self) -> Result<HostConfig, HostConfigError> {
        if let Some(raw) = self.base_url.take() {
            self.inner.base_url = Url::parse(&raw).map_err(|_| HostConfigError::InvalidBaseUrl(raw))?;
        }
        validate(&self.inner)?;
        Ok(self.inner)
    }
}

// ---------- Validation ----------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostConfigError {
    InvalidBaseUrl(String),
    UnsupportedScheme(String),
    EmptyCookieName,
    NonPositiveLifetime,
}

impl fmt::Display for HostConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HostConfigError::InvalidBaseUrl(u) => write!(f, "base_url {u:?} is not a valid URL"),
            HostConfigError::UnsupportedScheme(s) => write!(f, "base_url scheme {s:?} is not http or https"),
            HostConfigError::EmptyCookieName => write!(f, "primary_authentication_cookie must not be empty"),
            HostConfigError::NonPositiveLifetime => write!(f, "message_cookie_lifetime must be positive"),
        }
    }
}
impl std::error::Error for HostConfigError {}

fn validate(c: &HostConfig) -> Result<(), HostConfigError> {
    if !matches!(c.base_url.scheme(), "http" | "https") {
        return Err(HostConfigError::UnsupportedScheme(c.base_url.scheme().to_string()));
    }
    if c.primary_authentication_cookie.trim().is_empty() {
        return Err(HostConfigError::EmptyCookieName);
    }
    if !c.message_cookie_lifetime.is_positive() {
        return Err(HostConfigError::NonPositiveLifetime);
    }
    Ok(())
}
