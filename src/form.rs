//! Form encoder.
//!
//! Any record can be posted as a form as long as it lists its fields through
//! [`FormFields`], in declaration order. An already built [`FormBody`] passes
//! through untouched.
//!
//! Encoding joins `key=value` pairs with `&` and performs **no
//! percent-encoding**: values in this simulation are assumed to be URL-safe.

use crate::views::AntiForgeryToken;
use std::fmt;

/// Statically declared form fields of a record.
pub trait FormFields {
    /// `(key, value)` in declaration order. `None` renders as an empty value.
    fn form_fields(&self) -> Vec<(&'static str, Option<String>)>;
}

/// Anything that can become a form submission.
pub trait IntoForm {
    fn to_form(&self, anti_forgery: Option<&AntiForgeryToken>) -> FormBody;
}

impl<T: FormFields> IntoForm for T {
    fn to_form(&self, anti_forgery: Option<&AntiForgeryToken>) -> FormBody {
        let mut form = FormBody::new();
        for (key, value) in self.form_fields() {
            form.push(key, value.unwrap_or_default());
        }
        if let Some(token) = anti_forgery {
            form.push(token.name.clone(), token.value.clone());
        }
        form
    }
}

/// A ready-made collection is used as is; no token is appended.
impl IntoForm for FormBody {
    fn to_form(&self, _anti_forgery: Option<&AntiForgeryToken>) -> FormBody {
        self.clone()
    }
}

/// Builds the ordered form for `value`, the anti-forgery pair last.
pub fn build_form(value: &(impl IntoForm + ?Sized), anti_forgery: Option<&AntiForgeryToken>) -> FormBody {
    value.to_form(anti_forgery)
}

/// Ordered `(key, value)` pairs of a form submission.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormBody {
    pairs: Vec<(String, String)>,
}

impl FormBody {
    pub fn new() -> Self {
        Self { pairs: Vec::new() }
    }

    pub fn push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.pairs.push((key.into(), value.into()));
    }

    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }

    /// First value for `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// `key=value&key2=value2`, order preserved, nothing escaped.
    pub fn encode(&self) -> String {
        self.pairs
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("&")
    }

    /// Splits an encoded body on `&`, then on the first `=` of each pair.
    pub fn parse(body: &str) -> Self {
        let pairs = body
            .split('&')
            .filter(|p| !p.is_empty())
            .map(|p| match p.split_once('=') {
                Some((k, v)) => (k.to_string(), v.to_string()),
                None => (p.to_string(), String::new()),
            })
            .collect();
        Self { pairs }
    }
}

impl<K, V> FromIterator<(K, V)> for FormBody
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            pairs: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

impl fmt::Display for FormBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}
