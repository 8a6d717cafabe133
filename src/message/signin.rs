use crate::message::Message;
use serde::{Deserialize, Serialize};

/// A pending sign-in request, handed to the login page through a message cookie.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SignInMessage {
    /// Where the provider sends the browser once sign-in completes
    pub return_url: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,

    /// Requested external identity provider
    #[serde(rename = "IdP", default, skip_serializing_if = "Option::is_none")]
    pub idp: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenant: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub login_hint: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_mode: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ui_locales: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub acr_values: Vec<String>,
}

impl SignInMessage {
    pub fn new(return_url: impl Into<String>) -> Self {
        Self {
            return_url: return_url.into(),
            ..Default::default()
        }
    }
}

impl Message for SignInMessage {
    const KIND: &'static str = "SignInMessage";
}
