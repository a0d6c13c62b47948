//! Codec trait and implementations for handshake bodies.
//!
//! A "codec" (coder/decoder) converts between Rust types and raw bytes.
//! The handshake client doesn't care HOW bodies are serialized; it just
//! needs something that implements [`Codec`]. The backend speaks JSON, so
//! [`JsonCodec`] is the only implementation today.

use serde::{Serialize, de::DeserializeOwned};

use crate::ProtocolError;

/// A codec that can encode Rust types to bytes and decode bytes back.
///
/// ## Trait bounds
///
/// - `Send + Sync` → the codec lives inside the engine and is used from
///   whatever Tokio worker thread runs the handshake task.
/// - `'static` → it owns everything it needs.
///
/// `decode` asks for `DeserializeOwned` (not plain `Deserialize`) so the
/// decoded value never borrows from the response buffer, which is dropped
/// as soon as decoding finishes.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into bytes.
    ///
    /// # Errors
    /// Returns `ProtocolError::Encode` if serialization fails.
    fn encode<T: Serialize>(
        &self,
        value: &T,
    ) -> Result<Vec<u8>, ProtocolError>;

    /// Deserializes bytes back into a value.
    ///
    /// # Errors
    /// Returns `ProtocolError::Decode` if the bytes are malformed,
    /// incomplete, or don't match the expected type.
    fn decode<T: DeserializeOwned>(
        &self,
        data: &[u8],
    ) -> Result<T, ProtocolError>;
}

// ---------------------------------------------------------------------------
// JsonCodec
// ---------------------------------------------------------------------------

/// A [`Codec`] that produces compact JSON (via `serde_json`).
///
/// Compact means no whitespace between tokens, which is what the backend
/// receives in the handshake body.
///
/// ## Example
///
/// ```rust
/// use playgate_protocol::{Codec, HandshakeRequest, JsonCodec};
///
/// let codec = JsonCodec;
/// let request = HandshakeRequest::new(
///     Some("g-1"),
///     None,
///     "GOOGLE",
///     Some("Ann"),
///     Some("tok-1"),
/// );
///
/// let bytes = codec.encode(&request).unwrap();
/// assert_eq!(
///     String::from_utf8(bytes.clone()).unwrap(),
///     r#"{"playerId":"g-1","serverPlayerId":"","network":"GOOGLE","playerName":"Ann","token":"tok-1"}"#
/// );
///
/// let decoded: HandshakeRequest = codec.decode(&bytes).unwrap();
/// assert_eq!(request, decoded);
/// ```
#[cfg(feature = "json")]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

#[cfg(feature = "json")]
impl Codec for JsonCodec {
    fn encode<T: Serialize>(
        &self,
        value: &T,
    ) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(
        &self,
        data: &[u8],
    ) -> Result<T, ProtocolError> {
        serde_json::from_slice(data).map_err(ProtocolError::Decode)
    }
}

#[cfg(all(test, feature = "json"))]
mod tests {
    use super::*;
    use crate::ServerPlayer;

    #[test]
    fn test_decode_truncated_body_returns_decode_error() {
        let result: Result<ServerPlayer, _> =
            JsonCodec.decode(br#"{"realPlayerID":"p1""#);

        assert!(matches!(result, Err(ProtocolError::Decode(_))));
    }

    #[test]
    fn test_decode_wrong_type_returns_decode_error() {
        let result: Result<ServerPlayer, _> = JsonCodec
            .decode(br#"{"realPlayerID":"p1","isAnonymous":"yes"}"#);

        let err = result.expect_err("isAnonymous must be a bool");
        assert!(err.to_string().starts_with("decode failed"));
    }

    #[test]
    fn test_encode_server_player_uses_backend_field_names() {
        let player = ServerPlayer {
            real_player_id: "p1".into(),
            player_name: "Ann".into(),
            is_anonymous: false,
        };

        let bytes = JsonCodec.encode(&player).unwrap();

        assert_eq!(
            String::from_utf8(bytes).unwrap(),
            r#"{"realPlayerID":"p1","playerName":"Ann","isAnonymous":false}"#
        );
    }
}
