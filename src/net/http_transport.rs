//! Transport over real HTTP.
//!
//! Used when the provider runs as a separate process. Each request is driven
//! to completion on a private current-thread runtime, so the caller still sees
//! one blocking exchange per step. Redirects are not followed and reqwest's
//! own cookie store stays disabled: the simulated client's jar is the only
//! cookie state.

use crate::errors::{FlowError, Result};
use crate::net::response::reason;
use crate::net::{Request, Response, Transport};
use tokio::runtime::Runtime;

pub struct HttpTransport {
    client: reqwest::Client,
    runtime: Runtime,
}

impl HttpTransport {
    pub fn new(user_agent: &str) -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| FlowError::Transport(format!("cannot create runtime: {e}")))?;

        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| FlowError::Transport(e.to_string()))?;

        Ok(Self { client, runtime })
    }
}

impl Transport for HttpTransport {
    fn send(&mut self, request: Request) -> Result<Response> {
        log::debug!("HTTP {} {}", request.method, request.url);
        self.runtime
            .block_on(fetch(&self.client, request))
            .map_err(|e| FlowError::Transport(e.to_string()))
    }
}

// Sends the request and buffers the full response
async fn fetch(client: &reqwest::Client, request: Request) -> std::result::Result<Response, reqwest::Error> {
    let res = client
        .request(request.method, request.url)
        .headers(request.headers)
        .body(request.body)
        .send()
        .await?;

    let final_url = res.url().clone();
    let status = res.status().as_u16();
    let headers = res.headers().clone();

    // We don't do streaming
    let body = res.bytes().await?.to_vec();

    Ok(Response {
        url: Some(final_url),
        status,
        status_text: reason(status),
        headers,
        body,
    })
}
