//! Error types for the protocol layer.
//!
//! Each crate in Playgate defines its own error enum. When you see a
//! `ProtocolError`, the problem is in the shape of the bytes (JSON body or
//! cookie header), not in networking or auth state.

/// Errors that can occur in the protocol layer.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning a Rust type into bytes).
    #[cfg(feature = "json")]
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed (turning bytes into a Rust type).
    ///
    /// Common causes: malformed JSON, a missing `realPlayerID`, or a
    /// field with the wrong JSON type.
    #[cfg(feature = "json")]
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// A `Set-Cookie` header could not be parsed into a name/value pair.
    #[error("invalid cookie header: {0}")]
    InvalidCookie(String),
}
