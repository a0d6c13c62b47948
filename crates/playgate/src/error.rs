//! Unified error type for Playgate.

use playgate_engine::{EngineError, HandshakeError};
use playgate_protocol::ProtocolError;
use playgate_session::SessionError;
use playgate_transport::TransportError;

/// Top-level error that wraps all crate-specific errors.
///
/// When using the `playgate` crate, you deal with this single error type
/// instead of importing errors from each sub-crate. The `#[from]`
/// attribute on each variant generates the `From` impls, so `?` converts
/// sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum PlaygateError {
    /// The HTTP client could not be set up, or a request failed.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A body or cookie could not be encoded or parsed.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// The identity provider refused (sign-in, token, achievement).
    #[error(transparent)]
    Session(#[from] SessionError),

    /// The engine is gone, or passed up one of the errors above.
    #[error(transparent)]
    Engine(#[from] EngineError),

    /// A backend handshake failed.
    #[error(transparent)]
    Handshake(#[from] HandshakeError),

    /// A global tracing subscriber was already installed.
    #[error("tracing already initialized: {0}")]
    Telemetry(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_transport_error() {
        let err = TransportError::Unreachable("connection refused".into());
        let playgate_err: PlaygateError = err.into();
        assert!(matches!(playgate_err, PlaygateError::Transport(_)));
        assert_eq!(playgate_err.to_string(), "connection refused");
    }

    #[test]
    fn test_from_protocol_error() {
        let err = ProtocolError::InvalidCookie("bad".into());
        let playgate_err: PlaygateError = err.into();
        assert!(matches!(playgate_err, PlaygateError::Protocol(_)));
    }

    #[test]
    fn test_from_session_error() {
        let err = SessionError::LoginCancelled;
        let playgate_err: PlaygateError = err.into();
        assert!(matches!(playgate_err, PlaygateError::Session(_)));
    }

    #[test]
    fn test_from_engine_error() {
        let playgate_err: PlaygateError = EngineError::Unavailable.into();
        assert!(matches!(playgate_err, PlaygateError::Engine(_)));
        assert_eq!(playgate_err.to_string(), "auth engine is unavailable");
    }

    #[test]
    fn test_from_handshake_error() {
        let playgate_err: PlaygateError = HandshakeError::Rejected(403).into();
        assert!(matches!(playgate_err, PlaygateError::Handshake(_)));
        assert_eq!(playgate_err.to_string(), "Server auth failed");
    }
}
