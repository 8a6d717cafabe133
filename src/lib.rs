//! Simulated browser sign-in flows against an identity provider.
//!
//! The crate plays the browser side of a provider's login protocol: it keeps
//! a cookie jar, issues signed message cookies, reads the model embedded in
//! rendered pages and posts forms with their anti-forgery token, one
//! deterministic step at a time.
//!
//! ```rust,no_run
//! use signin_sim::config::HostConfig;
//! use signin_sim::flow::{Host, User};
//! use signin_sim::message::SignedCookieProtector;
//! use signin_sim::net::HttpTransport;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = HostConfig::builder().base_url("http://localhost:44333/core").build()?;
//! let transport = HttpTransport::new(&config.user_agent)?;
//! let mut host = Host::new(config, transport, Box::new(SignedCookieProtector::new("key")))
//!     .with_users([User::new("88421113", "bob", "bob")]);
//!
//! host.login("bob")?;
//! assert!(host.is_authenticated());
//! # Ok(()) }
//! ```

pub mod client;
pub mod clock;
pub mod config;
pub mod cookies;
pub mod errors;
pub mod flow;
pub mod form;
pub mod inspect;
pub mod message;
pub mod net;
pub mod views;

pub use client::Client;
pub use errors::{FlowError, Result};
pub use flow::Host;
