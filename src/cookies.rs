//! Cookies: [`Cookie`], [`SetCookie`] directives and the simulated [`CookieJar`].

mod cookie;
mod cookie_jar;
mod set_cookie;

pub use cookie::Cookie;
pub use cookie_jar::CookieJar;
pub use set_cookie::{SameSite, SetCookie, SetCookieError};
