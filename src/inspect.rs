//! Response inspection and assertions.
//!
//! Pages rendered by the provider carry two structural markers this module
//! relies on instead of parsing HTML:
//!
//! - the page model, as JSON inside
//!   `<script id='modelJson' type='application/json'>...</script>`;
//! - the page identity, as `<div class='container page-NAME' ng-cloak>`.

use crate::cookies::SetCookie;
use crate::errors::{FlowError, Result};
use crate::net::Response;
use serde::de::DeserializeOwned;

const MODEL_START: &str = "<script id='modelJson' type='application/json'>";
const MODEL_END: &str = "</script>";
const PAGE_START: &str = "<div class='container page-";
const PAGE_END: &str = "' ng-cloak>";

/// Extracts and decodes the page model embedded in `html`.
pub fn extract_model<T: DeserializeOwned>(html: &str) -> Result<T> {
    let start = html
        .find(MODEL_START)
        .ok_or_else(|| FlowError::NotFound("modelJson script".into()))?
        + MODEL_START.len();
    let len = html[start..]
        .find(MODEL_END)
        .ok_or_else(|| FlowError::NotFound("end of modelJson script".into()))?;

    let json = html_decode(&html[start..start + len]);
    Ok(serde_json::from_str(&json)?)
}

/// [`extract_model`] over a response body.
pub fn response_model<T: DeserializeOwned>(response: &Response) -> Result<T> {
    extract_model(&response.text())
}

/// All `Set-Cookie` directives of a response; malformed ones are left out.
pub fn extract_cookies(response: &Response) -> Vec<SetCookie> {
    SetCookie::from_headers(&response.headers)
}

/// Name of the page, as announced by its container marker.
pub fn page_name(html: &str) -> Option<&str> {
    let start = html.find(PAGE_START)? + PAGE_START.len();
    let len = html[start..].find(PAGE_END)?;
    Some(&html[start..start + len])
}

/// Checks that `response` is the HTML page called `name`.
pub fn assert_page(response: &Response, name: &str) -> Result<()> {
    assert_status(response, 200)?;

    let media_type = response.media_type();
    if media_type.as_deref() != Some("text/html") {
        return Err(FlowError::Assertion(format!(
            "expected text/html, got {}",
            media_type.as_deref().unwrap_or("no content type")
        )));
    }

    let html = response.text();
    match page_name(&html) {
        Some(found) if found == name => Ok(()),
        Some(found) => Err(FlowError::Assertion(format!("expected page {name:?}, got {found:?}"))),
        None => Err(FlowError::Assertion(format!("expected page {name:?}, no page marker"))),
    }
}

/// Checks that `response` sets a cookie called `name`.
pub fn assert_cookie(response: &Response, name: &str) -> Result<()> {
    let found = extract_cookies(response)
        .iter()
        .any(|directive| directive.names().any(|n| n == name));

    if found {
        Ok(())
    } else {
        Err(FlowError::Assertion(format!("expected cookie {name:?} in response")))
    }
}

pub fn assert_status(response: &Response, status: u16) -> Result<()> {
    if response.status == status {
        Ok(())
    } else {
        Err(FlowError::Assertion(format!(
            "expected status {status}, got {} {}",
            response.status, response.status_text
        )))
    }
}

/// Decodes HTML character references. Unknown references are kept verbatim.
pub fn html_decode(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut rest = s;

    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        rest = &rest[amp..];

        let decoded = rest
            .find(';')
            .filter(|&semi| semi > 1 && semi <= 10)
            .and_then(|semi| decode_entity(&rest[1..semi]).map(|c| (c, semi)));

        match decoded {
            Some((c, semi)) => {
                out.push(c);
                rest = &rest[semi + 1..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }

    out.push_str(rest);
    out
}

fn decode_entity(entity: &str) -> Option<char> {
    match entity {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some('\u{a0}'),
        _ => {
            let num = entity.strip_prefix('#')?;
            let code = match num.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => num.parse::<u32>().ok()?,
            };
            char::from_u32(code)
        }
    }
}
