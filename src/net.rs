//! Network model: request/response snapshots and the [`Transport`] seam.
//!
//! The simulated client never talks to a socket directly. Every exchange
//! goes through a [`Transport`], which is either an in-process provider
//! double or the reqwest-backed [`HttpTransport`].

mod http_transport;
mod request;
mod response;
mod transport;

pub use http_transport::HttpTransport;
pub use request::Request;
pub use response::Response;
pub use transport::Transport;
