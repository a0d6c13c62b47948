//! Error types for the engine layer.

use playgate_protocol::ProtocolError;
use playgate_session::SessionError;

/// Errors returned through an [`AuthHandle`](crate::AuthHandle).
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// The engine task has stopped (shut down, or its channel closed).
    #[error("auth engine is unavailable")]
    Unavailable,

    /// The identity provider refused the request.
    #[error(transparent)]
    Session(#[from] SessionError),

    /// A body could not be encoded.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}

/// Why a backend handshake failed.
///
/// `Display` is the text stored as the session's failure detail, so a
/// rejection reads exactly `Server auth failed` and a transport error is
/// the transport's own message.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HandshakeError {
    /// The backend could not be reached, or the exchange broke mid-way.
    #[error("{0}")]
    Unreachable(String),

    /// The backend answered with something other than 200.
    #[error("Server auth failed")]
    Rejected(u16),

    /// A 200 arrived but its body or session cookie could not be parsed.
    #[error("{0}")]
    Malformed(String),
}
