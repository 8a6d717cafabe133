//! In-process identity provider double.
//!
//! Serves just enough of a provider for the browser-side flows: a login page
//! guarded by a sign-in message cookie and an anti-forgery token, a userinfo
//! endpoint guarded by the session cookie, discovery and logout.

#![allow(dead_code)]

use http::header::{CONTENT_TYPE, COOKIE, LOCATION, SET_COOKIE};
use http::{HeaderMap, HeaderValue, Method};
use rand::Rng;
use serde_json::json;
use signin_sim::config::HostConfig;
use signin_sim::flow::{Host, User};
use signin_sim::form::FormBody;
use signin_sim::message::{message_cookie_name, MessageProtector, SignInMessage, SignedCookieProtector};
use signin_sim::net::{Request, Response, Transport};
use signin_sim::Result;
use std::collections::HashMap;

pub const KEY: &str = "test-signing-key";
pub const BASE: &str = "https://idsrv3.test/";
pub const XSRF_COOKIE: &str = "idsrv.xsrf";

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn users() -> Vec<User> {
    vec![
        User::new("88421113", "bob", "bob"),
        User::new("818727", "alice", "alice"),
    ]
}

/// A host wired to a fresh provider that knows [`users`].
pub fn host() -> Host<TestProvider> {
    init_logging();
    Host::new(
        HostConfig::default(),
        TestProvider::new(users()),
        Box::new(SignedCookieProtector::new(KEY)),
    )
    .with_users(users())
}

pub struct TestProvider {
    users: Vec<User>,
    protector: SignedCookieProtector,
    /// session id -> subject
    sessions: HashMap<String, String>,
    pub requests: Vec<Request>,
}

impl TestProvider {
    pub fn new(users: Vec<User>) -> Self {
        Self {
            users,
            protector: SignedCookieProtector::new(KEY),
            sessions: HashMap::new(),
            requests: Vec::new(),
        }
    }

    fn login_page(&self, signin: &str, error: Option<&str>) -> Response {
        let token = format!("{:016x}", rand::rng().random::<u64>());
        let model = json!({
            "LoginUrl": format!("{BASE}login?signin={signin}"),
            "AntiForgery": { "Name": XSRF_COOKIE, "Value": token },
            "SiteName": "Test & <Co>",
            "ErrorMessage": error,
        });
        let encoded = model
            .to_string()
            .replace('&', "&amp;")
            .replace('"', "&quot;")
            .replace('<', "&lt;")
            .replace('>', "&gt;");

        let body = format!(
            "<html><body><div class='container page-login' ng-cloak>\
             <script id='modelJson' type='application/json'>{encoded}</script>\
             </div></body></html>"
        );

        let mut resp = html(200, body);
        set_cookie(&mut resp, &format!("{XSRF_COOKIE}={token}; path=/; httponly"));
        resp
    }

    fn get_login(&self, req: &Request) -> Response {
        let Some(signin) = query(req, "signin") else {
            return html(400, "missing signin".into());
        };
        if self.signin_message(req, &signin).is_none() {
            return html(400, "unknown signin".into());
        }
        self.login_page(&signin, None)
    }

    fn post_login(&mut self, req: &Request) -> Response {
        let Some(signin) = query(req, "signin") else {
            return html(400, "missing signin".into());
        };
        let Some(message) = self.signin_message(req, &signin) else {
            return html(400, "unknown signin".into());
        };

        let form = FormBody::parse(&req.text());
        let cookies = cookies(req);
        let xsrf_ok = matches!(
            (form.get(XSRF_COOKIE), cookies.get(XSRF_COOKIE)),
            (Some(posted), Some(held)) if posted == held.as_str()
        );
        if !xsrf_ok {
            return html(400, "anti-forgery check failed".into());
        }

        let user = self.users.iter().find(|u| {
            Some(u.username.as_str()) == form.get("Username") && Some(u.password.as_str()) == form.get("Password")
        });
        let Some(user) = user else {
            return self.login_page(&signin, Some("Invalid username or password"));
        };

        let session = format!("{:032x}", rand::rng().random::<u128>());
        self.sessions.insert(session.clone(), user.subject.clone());

        let mut resp = Response::new(302, HeaderMap::new(), Vec::new());
        resp.headers
            .insert(LOCATION, HeaderValue::from_str(&message.return_url).unwrap());
        set_cookie(&mut resp, &format!("idsrv={session}; path=/; secure; httponly"));
        set_cookie(
            &mut resp,
            &format!(
                "{}=; expires=Thu, 01-Jan-1970 00:00:00 GMT; path=/",
                message_cookie_name("SignInMessage", &signin)
            ),
        );
        resp
    }

    fn user_info(&self, req: &Request) -> Response {
        let subject = cookies(req)
            .get("idsrv")
            .and_then(|session| self.sessions.get(session))
            .cloned();
        match subject {
            Some(sub) => json_response(200, json!({ "sub": sub })),
            None => json_response(401, json!({ "error": "invalid_token" })),
        }
    }

    fn logout(&mut self, req: &Request) -> Response {
        if let Some(session) = cookies(req).get("idsrv") {
            self.sessions.remove(session);
        }
        let mut resp = html(200, "<div class='container page-loggedOut' ng-cloak></div>".into());
        set_cookie(&mut resp, "idsrv=; max-age=0; path=/");
        resp
    }

    fn discovery(&self) -> Response {
        json_response(
            200,
            json!({
                "issuer": "https://idsrv3.test",
                "authorization_endpoint": format!("{BASE}connect/authorize"),
                "token_endpoint": format!("{BASE}connect/token"),
                "userinfo_endpoint": format!("{BASE}connect/userinfo"),
                "scopes_supported": ["openid", "profile", "email"],
            }),
        )
    }

    fn signin_message(&self, req: &Request, signin: &str) -> Option<SignInMessage> {
        let name = message_cookie_name("SignInMessage", signin);
        let value = cookies(req).get(&name)?.clone();
        let payload = self.protector.unprotect("SignInMessage", &value).ok()?;
        serde_json::from_slice(&payload).ok()
    }
}

impl Transport for TestProvider {
    fn send(&mut self, request: Request) -> Result<Response> {
        let resp = match (&request.method, request.url.path()) {
            (&Method::GET, "/login") => self.get_login(&request),
            (&Method::POST, "/login") => self.post_login(&request),
            (&Method::GET, "/logout") => self.logout(&request),
            (&Method::GET, "/connect/userinfo") => self.user_info(&request),
            (&Method::GET, "/.well-known/openid-configuration") => self.discovery(),
            _ => html(404, "not found".into()),
        };
        self.requests.push(request);
        Ok(resp)
    }
}

fn html(status: u16, body: String) -> Response {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("text/html; charset=utf-8"));
    Response::new(status, headers, body)
}

fn json_response(status: u16, value: serde_json::Value) -> Response {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    Response::new(status, headers, value.to_string())
}

fn set_cookie(resp: &mut Response, value: &str) {
    resp.headers
        .append(SET_COOKIE, HeaderValue::from_str(value).unwrap());
}

fn query(req: &Request, key: &str) -> Option<String> {
    req.url
        .query_pairs()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.into_owned())
}

fn cookies(req: &Request) -> HashMap<String, String> {
    req.header(COOKIE)
        .unwrap_or_default()
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}
