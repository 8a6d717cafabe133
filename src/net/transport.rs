use crate::errors::Result;
use crate::net::{Request, Response};

/// A request/response exchange with the identity provider.
///
/// Calls block until the response is fully buffered. Implementations may keep
/// state (a provider double holding sessions, a runtime), hence `&mut self`.
pub trait Transport {
    fn send(&mut self, request: Request) -> Result<Response>;
}

/// Any closure taking a request can act as a transport.
impl<F> Transport for F
where
    F: FnMut(Request) -> Result<Response>,
{
    fn send(&mut self, request: Request) -> Result<Response> {
        self(request)
    }
}
