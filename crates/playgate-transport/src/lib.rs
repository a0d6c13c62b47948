//! Transport abstraction layer for Playgate.
//!
//! Provides the [`BackendTransport`] trait: one JSON POST to the
//! application backend, returning the status, the `Set-Cookie` headers,
//! and (for a 200) the body. The handshake client is written against this
//! trait, so tests can swap the network out for a scripted fake.
//!
//! # Feature Flags
//!
//! - `http` (default): HTTP transport via `reqwest` ([`HttpTransport`])

mod error;
#[cfg(feature = "http")]
mod http;

pub use error::TransportError;
#[cfg(feature = "http")]
pub use http::HttpTransport;

use std::time::Duration;

/// How long to wait for the backend to accept the TCP/TLS connection.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(20);

/// The content type sent with every handshake body.
pub const JSON_CONTENT_TYPE: &str = "application/json; charset=utf-8";

/// What the transport hands back for one POST.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BackendResponse {
    /// The HTTP status code. Redirects are reported, never followed.
    pub status: u16,

    /// Every `Set-Cookie` header, in the order the backend sent them.
    pub set_cookies: Vec<String>,

    /// The response body. Only read for a 200; empty otherwise.
    pub body: Vec<u8>,
}

impl BackendResponse {
    /// Returns `true` for HTTP 200, the only status the handshake accepts.
    pub fn is_ok(&self) -> bool {
        self.status == 200
    }
}

/// Sends one JSON body to the backend and returns its response.
///
/// Implementations must:
/// - POST with `Content-Type: application/json; charset=utf-8` and a
///   `Content-Length` matching `body`
/// - not follow redirects and not serve responses from a cache
/// - release the connection before returning, whatever the outcome
pub trait BackendTransport: Send + Sync + 'static {
    /// POSTs `body` to `url`.
    ///
    /// # Errors
    /// Any failure to reach the backend or read a 200 body. A non-200
    /// status is NOT an error at this layer.
    fn post_json(
        &self,
        url: &str,
        body: Vec<u8>,
    ) -> impl std::future::Future<Output = Result<BackendResponse, TransportError>>
           + Send;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_response_is_ok_only_for_200() {
        let ok = BackendResponse {
            status: 200,
            ..BackendResponse::default()
        };
        let created = BackendResponse {
            status: 201,
            ..BackendResponse::default()
        };
        let redirect = BackendResponse {
            status: 302,
            ..BackendResponse::default()
        };

        assert!(ok.is_ok());
        assert!(!created.is_ok());
        assert!(!redirect.is_ok());
    }

    #[test]
    fn test_default_connect_timeout_is_twenty_seconds() {
        assert_eq!(DEFAULT_CONNECT_TIMEOUT, Duration::from_secs(20));
    }
}
