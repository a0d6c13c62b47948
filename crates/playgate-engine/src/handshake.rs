//! The backend handshake client.
//!
//! One POST per call, no retries. Every outcome is either a
//! [`HandshakeReply`] or a classified [`HandshakeError`]; the engine turns
//! that into exactly one server-auth status change.

use playgate_protocol::{
    Codec, HandshakeRequest, JsonCodec, ServerPlayer, session_token_from,
};
use playgate_transport::BackendTransport;

use crate::HandshakeError;

/// What a successful handshake produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandshakeReply {
    /// The backend's canonical view of the player.
    pub player: ServerPlayer,

    /// Value of the first cookie in the first `Set-Cookie` header, if the
    /// backend sent one.
    pub session_token: Option<String>,
}

/// Performs the backend handshake over a [`BackendTransport`].
///
/// Generic over the transport so tests can script responses.
#[derive(Debug, Clone)]
pub struct BackendClient<T> {
    transport: T,
    codec: JsonCodec,
}

impl<T: BackendTransport> BackendClient<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            codec: JsonCodec,
        }
    }

    /// POSTs `request` to `url` and classifies the response.
    ///
    /// # Errors
    /// - [`HandshakeError::Unreachable`] when the transport fails
    /// - [`HandshakeError::Rejected`] for any status other than 200
    /// - [`HandshakeError::Malformed`] when a 200 body (or its session
    ///   cookie) does not parse
    pub async fn authenticate(
        &self,
        url: &str,
        request: &HandshakeRequest,
    ) -> Result<HandshakeReply, HandshakeError> {
        let body = self
            .codec
            .encode(request)
            .map_err(|e| HandshakeError::Malformed(e.to_string()))?;

        let response = self
            .transport
            .post_json(url, body)
            .await
            .map_err(|e| HandshakeError::Unreachable(e.to_string()))?;

        if !response.is_ok() {
            tracing::warn!(status = response.status, "backend rejected handshake");
            return Err(HandshakeError::Rejected(response.status));
        }

        let player: ServerPlayer = self
            .codec
            .decode(&response.body)
            .map_err(|e| HandshakeError::Malformed(e.to_string()))?;

        let session_token = session_token_from(&response.set_cookies)
            .map_err(|e| HandshakeError::Malformed(e.to_string()))?;

        tracing::debug!(
            real_player_id = %player.real_player_id,
            anonymous = player.is_anonymous,
            has_session_token = session_token.is_some(),
            "handshake accepted"
        );

        Ok(HandshakeReply {
            player,
            session_token,
        })
    }
}
