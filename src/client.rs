//! Simulated browser client.
//!
//! A [`Client`] owns exactly one [`CookieJar`] and one [`Transport`]. Every
//! request carries the jar as its `Cookie` header and every response is
//! applied back to the jar before it is returned, judged against the client's
//! [`Clock`]. Requests are strictly sequential (`&mut self`), so the jar never
//! sees two in-flight responses.

use crate::clock::{Clock, SystemClock};
use crate::cookies::CookieJar;
use crate::errors::Result;
use crate::form::FormBody;
use crate::net::{Request, Response, Transport};
use http::header::{ACCEPT, COOKIE, USER_AGENT};
use serde::Serialize;
use time::OffsetDateTime;
use url::Url;

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";
const JSON_CONTENT_TYPE: &str = "application/json";

pub struct Client<T: Transport> {
    jar: CookieJar,
    transport: T,
    clock: Box<dyn Clock>,
    user_agent: String,
    last_response: Option<Response>,
}

impl<T: Transport> Client<T> {
    /// Creates a client with an empty jar on the wall clock.
    pub fn new(transport: T) -> Self {
        Self::with_clock(transport, Box::new(SystemClock))
    }

    pub fn with_clock(transport: T, clock: Box<dyn Clock>) -> Self {
        Self {
            jar: CookieJar::new(),
            transport,
            clock,
            user_agent: String::from("SigninSim/1.0"),
            last_response: None,
        }
    }

    pub fn set_user_agent(&mut self, user_agent: impl Into<String>) {
        self.user_agent = user_agent.into();
    }

    pub fn now(&self) -> OffsetDateTime {
        self.clock.now()
    }

    pub fn jar(&self) -> &CookieJar {
        &self.jar
    }

    pub fn jar_mut(&mut self) -> &mut CookieJar {
        &mut self.jar
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Most recent response, if any request was made.
    pub fn last_response(&self) -> Option<&Response> {
        self.last_response.as_ref()
    }

    /// Sends `request` with the jar attached and applies the response cookies.
    pub fn send(&mut self, request: Request) -> Result<Response> {
        let mut request = request.with_header(USER_AGENT, &self.user_agent);
        if let Some(cookies) = self.jar.header_value() {
            request = request.with_header(COOKIE, &cookies);
        }

        log::debug!("Client: {} {}", request.method, request.url);
        let response = self.transport.send(request)?;
        log::debug!("Client: <- {} {}", response.status, response.status_text);

        let now = self.clock.now();
        self.jar.apply_response(&response, now);
        self.last_response = Some(response.clone());

        Ok(response)
    }

    pub fn get(&mut self, url: Url) -> Result<Response> {
        self.send(Request::get(url))
    }

    /// GET asking for JSON.
    pub fn get_json(&mut self, url: Url) -> Result<Response> {
        self.send(Request::get(url).with_header(ACCEPT, JSON_CONTENT_TYPE))
    }

    pub fn post_form(&mut self, url: Url, form: &FormBody) -> Result<Response> {
        self.send(Request::post(url, FORM_CONTENT_TYPE, form.encode()))
    }

    pub fn post_json<V: Serialize + ?Sized>(&mut self, url: Url, value: &V) -> Result<Response> {
        let body = serde_json::to_vec(value)?;
        self.send(Request::post(url, JSON_CONTENT_TYPE, body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::errors::FlowError;
    use http::header::{CONTENT_TYPE, SET_COOKIE};
    use http::{HeaderMap, HeaderValue};
    use std::cell::RefCell;
    use std::rc::Rc;
    use time::macros::datetime;

    /// Records each request and answers with the next canned Set-Cookie list.
    fn scripted(
        seen: Rc<RefCell<Vec<Request>>>,
        replies: Vec<Vec<&'static str>>,
    ) -> impl FnMut(Request) -> Result<Response> {
        let mut replies = replies.into_iter();
        move |req: Request| {
            seen.borrow_mut().push(req);
            let mut headers = HeaderMap::new();
            for v in replies.next().unwrap_or_default() {
                headers.append(SET_COOKIE, HeaderValue::from_static(v));
            }
            Ok(Response::new(200, headers, "ok"))
        }
    }

    #[test]
    fn carries_jar_between_requests() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let transport = scripted(
            seen.clone(),
            vec![vec!["a=1", "b=2"], vec!["a=; expires=Thu, 01 Jan 1970 00:00:00 GMT"], vec![]],
        );
        let clock = FixedClock::new(datetime!(2025-06-01 00:00 UTC));
        let mut client = Client::with_clock(transport, Box::new(clock));
        let url = Url::parse("https://idp.test/").unwrap();

        client.get(url.clone()).unwrap();
        client.get(url.clone()).unwrap();
        client.get(url).unwrap();

        let seen = seen.borrow();
        assert_eq!(seen[0].header(COOKIE), None);
        assert_eq!(seen[1].header(COOKIE), Some("a=1; b=2"));
        assert_eq!(seen[2].header(COOKIE), Some("b=2"));
        assert_eq!(seen[0].header(USER_AGENT), Some("SigninSim/1.0"));
        assert!(client.last_response().is_some());
    }

    #[test]
    fn cookies_expire_against_the_client_clock() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let transport = scripted(
            seen,
            vec![
                vec!["a=1; expires=Sun, 01 Jun 2025 00:00:00 GMT"],
                vec!["a=2; expires=Sun, 01 Jun 2025 00:00:00 GMT"],
            ],
        );
        let clock = FixedClock::new(datetime!(2025-06-01 00:00 UTC));
        let mut client = Client::with_clock(transport, Box::new(clock.clone()));
        let url = Url::parse("https://idp.test/").unwrap();

        // Expiry equal to now is not in the past yet
        client.get(url.clone()).unwrap();
        assert_eq!(client.jar().get("a").map(|c| c.value.as_str()), Some("1"));

        clock.advance(time::Duration::SECOND);
        client.get(url).unwrap();
        assert!(!client.jar().contains("a"));
    }

    #[test]
    fn posts_form_body() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut client = Client::new(scripted(seen.clone(), vec![]));
        let form: FormBody = [("Username", "bob"), ("Password", "bob")].into_iter().collect();

        client
            .post_form(Url::parse("https://idp.test/login").unwrap(), &form)
            .unwrap();

        let seen = seen.borrow();
        assert_eq!(seen[0].method, http::Method::POST);
        assert_eq!(seen[0].header(CONTENT_TYPE), Some(FORM_CONTENT_TYPE));
        assert_eq!(seen[0].text(), "Username=bob&Password=bob");
    }

    #[test]
    fn transport_errors_propagate_without_touching_the_jar() {
        let mut client = Client::new(|_req: Request| -> Result<Response> {
            Err(FlowError::Transport("connection refused".into()))
        });
        client.jar_mut().add_raw(["keep=1"]);

        let err = client.get(Url::parse("https://idp.test/").unwrap()).unwrap_err();
        assert!(matches!(err, FlowError::Transport(_)));
        assert_eq!(client.jar().header_value().as_deref(), Some("keep=1"));
        assert!(client.last_response().is_none());
    }
}
