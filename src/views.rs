//! View models exchanged with the provider's pages.
//!
//! The login page embeds its model as JSON with PascalCase keys; these types
//! mirror that shape. Only `LoginUrl` and `AntiForgery` are required, the
//! rest default when a page leaves them out.

use crate::form::FormFields;
use serde::{Deserialize, Serialize};

/// Server-issued name/value pair that must be echoed back in a form post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AntiForgeryToken {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LoginPageLink {
    pub text: String,
    pub href: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LoginViewModel {
    /// Where the credentials form posts to
    pub login_url: String,
    pub anti_forgery: AntiForgeryToken,

    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub allow_remember_me: bool,
    #[serde(default)]
    pub remember_me: bool,
    #[serde(default)]
    pub error_message: Option<String>,
    #[serde(default)]
    pub site_name: Option<String>,
    #[serde(default)]
    pub site_url: Option<String>,
    #[serde(default)]
    pub external_providers: Vec<LoginPageLink>,
    #[serde(default)]
    pub additional_links: Vec<LoginPageLink>,
}

/// Credentials posted to the login page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LoginCredentials {
    pub username: String,
    pub password: String,
}

impl FormFields for LoginCredentials {
    fn form_fields(&self) -> Vec<(&'static str, Option<String>)> {
        vec![
            ("Username", Some(self.username.clone())),
            ("Password", Some(self.password.clone())),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_model_needs_only_url_and_token() {
        let json = r#"{"LoginUrl":"/login","AntiForgery":{"Name":"x","Value":"y"}}"#;
        let model: LoginViewModel = serde_json::from_str(json).unwrap();

        assert_eq!(model.login_url, "/login");
        assert_eq!(model.anti_forgery.name, "x");
        assert_eq!(model.anti_forgery.value, "y");
        assert!(model.external_providers.is_empty());
        assert_eq!(model.username, None);
    }
}
