//! HTTP transport implementation using `reqwest`.

use std::time::Duration;

use reqwest::header::{CONTENT_TYPE, SET_COOKIE};
use reqwest::{Client, Url, redirect};

use crate::{
    BackendResponse, BackendTransport, JSON_CONTENT_TYPE, TransportError,
};

/// A [`BackendTransport`] that talks HTTP(S) through a pooled `reqwest`
/// client.
///
/// The client is built with redirects disabled and the given connect
/// timeout. `reqwest` keeps no response cache, so every POST reaches the
/// backend. `Content-Length` is set by the client from the body size.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Builds a transport with the given connect timeout.
    ///
    /// No overall request timeout is set: a slow backend that accepted
    /// the connection is waited on.
    pub fn new(connect_timeout: Duration) -> Result<Self, TransportError> {
        let client = Client::builder()
            .connect_timeout(connect_timeout)
            .redirect(redirect::Policy::none())
            .build()
            .map_err(|e| TransportError::Setup(e.to_string()))?;
        Ok(Self { client })
    }
}

impl BackendTransport for HttpTransport {
    async fn post_json(
        &self,
        url: &str,
        body: Vec<u8>,
    ) -> Result<BackendResponse, TransportError> {
        let url = Url::parse(url)
            .map_err(|e| TransportError::InvalidUrl(e.to_string()))?;

        tracing::debug!(%url, bytes = body.len(), "posting handshake body");

        // The response is dropped at the end of this function on every
        // path, which returns the connection to the pool (or closes it).
        let response = self
            .client
            .post(url)
            .header(CONTENT_TYPE, JSON_CONTENT_TYPE)
            .body(body)
            .send()
            .await
            .map_err(|e| TransportError::Unreachable(e.to_string()))?;

        let status = response.status().as_u16();
        let set_cookies = response
            .headers()
            .get_all(SET_COOKIE)
            .iter()
            // Every header is kept, in order: skipping one would promote
            // the next to "first".
            .map(|value| String::from_utf8_lossy(value.as_bytes()).into_owned())
            .collect();

        // Non-200 bodies are never parsed, so don't bother reading them.
        let body = if status == 200 {
            response
                .bytes()
                .await
                .map_err(|e| TransportError::Body(e.to_string()))?
                .to_vec()
        } else {
            Vec::new()
        };

        tracing::debug!(status, "backend responded");

        Ok(BackendResponse {
            status,
            set_cookies,
            body,
        })
    }
}
