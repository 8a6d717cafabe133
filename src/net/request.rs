use http::header::{HeaderName, CONTENT_TYPE};
use http::{HeaderMap, HeaderValue, Method};
use url::Url;

/// Fully buffered outgoing request.
#[derive(Debug, Clone)]
pub struct Request {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl Request {
    pub fn new(method: Method, url: Url) -> Self {
        Self {
            method,
            url,
            headers: HeaderMap::new(),
            body: Vec::new(),
        }
    }

    pub fn get(url: Url) -> Self {
        Self::new(Method::GET, url)
    }

    /// POST with a body and its content type.
    pub fn post(url: Url, content_type: &'static str, body: impl Into<Vec<u8>>) -> Self {
        let mut req = Self::new(Method::POST, url);
        req.headers
            .insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
        req.body = body.into();
        req
    }

    /// Sets a header, replacing any previous value. Values that are not
    /// valid header text are dropped with a warning.
    pub fn with_header(mut self, name: HeaderName, value: &str) -> Self {
        match HeaderValue::from_str(value) {
            Ok(v) => {
                self.headers.insert(name, v);
            }
            Err(_) => log::warn!("Dropping invalid {} header value", name),
        }
        self
    }

    /// Body as text (lossy).
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Value of a header as text, if present and readable.
    pub fn header(&self, name: HeaderName) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}
