//! Flow driver.
//!
//! A [`Host`] stands for one identity provider as seen from one simulated
//! browser: its configuration, the users it knows, the capability that
//! protects message cookies, and the [`Client`] whose jar carries the
//! browser's state from step to step.
//!
//! [`Host::login`] runs the sign-in flow as a single deterministic pass:
//!
//! 1. [`FlowStep::IssueMessage`]: store a sign-in message cookie
//! 2. [`FlowStep::FetchLoginPage`]: load the login page for it and read its model
//! 3. [`FlowStep::SubmitCredentials`]: post the user's credentials with the anti-forgery token
//! 4. [`FlowStep::VerifyAuthenticated`]: require the primary authentication cookie
//!
//! Any failure ends the flow. Nothing is retried.

use crate::client::Client;
use crate::clock::{Clock, SystemClock};
use crate::config::{ensure_trailing_slash, HostConfig};
use crate::cookies::CookieJar;
use crate::errors::{FlowError, Result};
use crate::form::{build_form, IntoForm};
use crate::inspect::{assert_cookie, response_model};
use crate::message::{self, Message, MessageProtector, ProtectContext, SignInMessage};
use crate::net::{Response, Transport};
use crate::views::{AntiForgeryToken, LoginCredentials, LoginViewModel};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt;
use url::Url;

/// Username used by [`Host::login_default`].
pub const DEFAULT_USERNAME: &str = "bob";

/// A user the provider accepts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub subject: String,
    pub username: String,
    pub password: String,
}

impl User {
    pub fn new(subject: impl Into<String>, username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            username: username.into(),
            password: password.into(),
        }
    }
}

/// Named steps of the sign-in flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowStep {
    IssueMessage,
    FetchLoginPage,
    SubmitCredentials,
    VerifyAuthenticated,
}

impl fmt::Display for FlowStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FlowStep::IssueMessage => "issue message",
            FlowStep::FetchLoginPage => "fetch login page",
            FlowStep::SubmitCredentials => "submit credentials",
            FlowStep::VerifyAuthenticated => "verify authenticated",
        };
        f.write_str(name)
    }
}

pub struct Host<T: Transport> {
    config: HostConfig,
    users: Vec<User>,
    protector: Box<dyn MessageProtector>,
    client: Client<T>,
}

impl<T: Transport> Host<T> {
    /// Creates a host on the wall clock.
    pub fn new(config: HostConfig, transport: T, protector: Box<dyn MessageProtector>) -> Self {
        Self::with_clock(config, transport, protector, Box::new(SystemClock))
    }

    pub fn with_clock(
        config: HostConfig,
        transport: T,
        protector: Box<dyn MessageProtector>,
        clock: Box<dyn Clock>,
    ) -> Self {
        let mut client = Client::with_clock(transport, clock);
        client.set_user_agent(config.user_agent.clone());

        Self {
            config,
            users: Vec::new(),
            protector,
            client,
        }
    }

    /// Adds known users.
    pub fn with_users(mut self, users: impl IntoIterator<Item = User>) -> Self {
        self.users.extend(users);
        self
    }

    pub fn add_user(&mut self, user: User) {
        self.users.push(user);
    }

    pub fn users(&self) -> &[User] {
        &self.users
    }

    pub fn config(&self) -> &HostConfig {
        &self.config
    }

    pub fn client(&self) -> &Client<T> {
        &self.client
    }

    pub fn client_mut(&mut self) -> &mut Client<T> {
        &mut self.client
    }

    pub fn jar(&self) -> &CookieJar {
        self.client.jar()
    }

    pub fn protector(&self) -> &dyn MessageProtector {
        self.protector.as_ref()
    }

    /// Resolves `path` against the base URL the way a browser resolves a link:
    /// `login` lands under the base path, `/core/login` under the origin.
    /// Absolute `http(s)` URLs are used as is.
    pub fn url(&self, path: &str) -> Result<Url> {
        if path.starts_with("http") {
            return Ok(Url::parse(path)?);
        }
        let base = Url::parse(&self.config.base_url_with_slash())?;
        Ok(base.join(path)?)
    }

    fn route(&self, route: &str) -> String {
        ensure_trailing_slash(self.config.base_url.as_str()) + route
    }

    pub fn login_url(&self, signin_id: &str) -> String {
        format!("{}?signin={}", self.route(&self.config.routes.login), signin_id)
    }

    pub fn logout_url(&self) -> String {
        self.route(&self.config.routes.logout)
    }

    pub fn authorize_url(&self) -> String {
        self.route(&self.config.routes.authorize)
    }

    pub fn token_url(&self) -> String {
        self.route(&self.config.routes.token)
    }

    pub fn user_info_url(&self) -> String {
        self.route(&self.config.routes.user_info)
    }

    pub fn discovery_url(&self) -> String {
        self.route(&self.config.routes.discovery)
    }

    /// Protects `message` into a cookie held by the client and returns its correlation id.
    pub fn write_message_to_cookie<M: Message>(&mut self, message: &M) -> Result<String> {
        let ctx = ProtectContext {
            path: self.config.base_path(),
            secure: self.config.is_https(),
            now: self.client.now(),
            lifetime: self.config.message_cookie_lifetime,
        };
        message::write_message(self.client.jar_mut(), self.protector.as_ref(), message, &ctx)
    }

    /// Reads back a message previously written under `id`.
    pub fn read_message<M: Message>(&self, id: &str) -> Result<M> {
        message::read_message(self.client.jar(), self.protector.as_ref(), id)
    }

    /// Issues a sign-in message (by default returning to the base URL) and
    /// loads the login page for it.
    pub fn get_login_page(&mut self, message: Option<SignInMessage>) -> Result<Response> {
        log::debug!("Flow: {}", FlowStep::IssueMessage);
        let message = message.unwrap_or_else(|| SignInMessage::new(self.config.base_url_with_slash()));
        let signin_id = self.write_message_to_cookie(&message)?;

        log::debug!("Flow: {}", FlowStep::FetchLoginPage);
        let url = self.login_url(&signin_id);
        self.get(&url)
    }

    pub fn get(&mut self, path: &str) -> Result<Response> {
        let url = self.url(path)?;
        self.client.get(url)
    }

    /// GETs `path`, requires a success status and decodes the JSON body.
    pub fn get_json<V: DeserializeOwned>(&mut self, path: &str) -> Result<V> {
        let url = self.url(path)?;
        let response = self.client.get_json(url)?;
        if !response.is_success() {
            return Err(FlowError::Assertion(format!(
                "GET {path} returned {} {}",
                response.status, response.status_text
            )));
        }
        Ok(serde_json::from_slice(&response.body)?)
    }

    /// Posts `value` as a form, with the anti-forgery pair appended when given.
    pub fn post_form(
        &mut self,
        path: &str,
        value: &(impl IntoForm + ?Sized),
        anti_forgery: Option<&AntiForgeryToken>,
    ) -> Result<Response> {
        let url = self.url(path)?;
        let form = build_form(value, anti_forgery);
        self.client.post_form(url, &form)
    }

    pub fn post_json<V: Serialize + ?Sized>(&mut self, path: &str, value: &V) -> Result<Response> {
        let url = self.url(path)?;
        self.client.post_json(url, value)
    }

    pub fn find_user(&self, username: &str) -> Result<&User> {
        self.users
            .iter()
            .find(|u| u.username == username)
            .ok_or_else(|| FlowError::UnknownUser(username.to_string()))
    }

    /// Signs `username` in and returns the response that authenticated it.
    pub fn login(&mut self, username: &str) -> Result<Response> {
        let page = self.get_login_page(None)?;
        let model: LoginViewModel = response_model(&page)?;

        log::debug!("Flow: {} ({})", FlowStep::SubmitCredentials, username);
        let user = self.find_user(username)?;
        let credentials = LoginCredentials {
            username: user.username.clone(),
            password: user.password.clone(),
        };
        let response = self.post_form(&model.login_url, &credentials, Some(&model.anti_forgery))?;

        log::debug!("Flow: {}", FlowStep::VerifyAuthenticated);
        assert_cookie(&response, &self.config.primary_authentication_cookie)?;

        Ok(response)
    }

    /// [`login`](Self::login) as [`DEFAULT_USERNAME`].
    pub fn login_default(&mut self) -> Result<Response> {
        self.login(DEFAULT_USERNAME)
    }

    /// True when the client holds the primary authentication cookie.
    pub fn is_authenticated(&self) -> bool {
        self.client.jar().contains(&self.config.primary_authentication_cookie)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::SignedCookieProtector;
    use crate::net::Request;
    use http::HeaderMap;

    fn host() -> Host<impl FnMut(Request) -> Result<Response>> {
        let transport = |_req: Request| -> Result<Response> { Ok(Response::new(404, HeaderMap::new(), Vec::new())) };
        Host::new(
            HostConfig::default(),
            transport,
            Box::new(SignedCookieProtector::new("k")),
        )
        .with_users([User::new("88421113", "bob", "bob")])
    }

    #[test]
    fn builds_route_urls() {
        let host = host();

        assert_eq!(host.login_url("abc"), "https://idsrv3.test/login?signin=abc");
        assert_eq!(host.authorize_url(), "https://idsrv3.test/connect/authorize");
        assert_eq!(host.token_url(), "https://idsrv3.test/connect/token");
        assert_eq!(host.user_info_url(), "https://idsrv3.test/connect/userinfo");
        assert_eq!(host.discovery_url(), "https://idsrv3.test/.well-known/openid-configuration");
        assert_eq!(host.logout_url(), "https://idsrv3.test/logout");
    }

    #[test]
    fn resolves_relative_and_absolute_paths() {
        let host = host();

        assert_eq!(host.url("login").unwrap().as_str(), "https://idsrv3.test/login");
        assert_eq!(host.url("/login").unwrap().as_str(), "https://idsrv3.test/login");
        assert_eq!(host.url("http://other.test/x").unwrap().as_str(), "http://other.test/x");
    }

    #[test]
    fn absolute_paths_resolve_against_the_origin() {
        let transport = |_req: Request| -> Result<Response> { Ok(Response::new(404, HeaderMap::new(), Vec::new())) };
        let config = HostConfig::builder().base_url("https://idp.test/core").build().unwrap();
        let host = Host::new(config, transport, Box::new(SignedCookieProtector::new("k")));

        assert_eq!(host.url("login").unwrap().as_str(), "https://idp.test/core/login");
        assert_eq!(host.url("/core/login?signin=x").unwrap().as_str(), "https://idp.test/core/login?signin=x");
    }

    #[test]
    fn overflowing_message_lifetime_is_reported() {
        let transport = |_req: Request| -> Result<Response> { Ok(Response::new(404, HeaderMap::new(), Vec::new())) };
        let config = HostConfig::builder()
            .message_cookie_lifetime(time::Duration::days(1_000_000_000))
            .build()
            .unwrap();
        let mut host = Host::new(config, transport, Box::new(SignedCookieProtector::new("k")));

        let err = host.write_message_to_cookie(&SignInMessage::new("https://idsrv3.test/")).unwrap_err();
        assert!(matches!(err, FlowError::Protocol(_)));
        assert!(host.jar().is_empty());
    }

    #[test]
    fn written_message_round_trips_through_the_host() {
        let mut host = host();
        let id = host.write_message_to_cookie(&SignInMessage::new("https://idsrv3.test/")).unwrap();

        let cookie = host.jar().get(&format!("SignInMessage.{id}")).unwrap();
        assert_eq!(cookie.path.as_deref(), Some("/"));
        assert!(cookie.secure);

        let back: SignInMessage = host.read_message(&id).unwrap();
        assert_eq!(back.return_url, "https://idsrv3.test/");
    }

    #[test]
    fn login_page_without_model_is_not_found() {
        let mut host = host();
        let err = host.login("bob").unwrap_err();
        assert!(matches!(err, FlowError::NotFound(_)));
    }

    #[test]
    fn unknown_users_are_rejected() {
        let host = host();
        assert!(host.find_user("bob").is_ok());
        assert!(matches!(host.find_user("mallory"), Err(FlowError::UnknownUser(_))));
    }

    #[test]
    fn get_json_requires_success() {
        let mut host = host();
        let err = host.get_json::<serde_json::Value>("connect/userinfo").unwrap_err();
        assert!(matches!(err, FlowError::Assertion(_)));
    }
}
