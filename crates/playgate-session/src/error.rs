//! Error types for the session layer.

use crate::provider::Resolution;

/// Errors raised by the identity provider or while handling its results.
///
/// Only [`TokenExchangeRecoverable`](Self::TokenExchangeRecoverable) is
/// not terminal: the attempt waits for the host to resolve it.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The provider could not sign the user in.
    #[error("login failed: {0}")]
    LoginFailed(String),

    /// The user backed out of sign-in.
    #[error("login cancelled")]
    LoginCancelled,

    /// No usable token came back: missing, empty, or the `"null"` sentinel.
    #[error("token exchange failed: {0}")]
    TokenExchangeFailed(String),

    /// The exchange broke on the way (network, provider service).
    #[error("{0}")]
    TokenExchangeIo(String),

    /// The provider wants the user to do something first.
    #[error("token exchange needs resolution: {0}")]
    TokenExchangeRecoverable(Resolution),

    /// An achievement could not be unlocked.
    #[error("achievement unlock failed: {0}")]
    Achievement(String),

    /// An operation that needs a signed-in account ran before sign-in.
    #[error("no account signed in")]
    NotSignedIn,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::ResolutionStage;

    #[test]
    fn test_login_errors_render_provider_detail() {
        assert_eq!(
            SessionError::LoginFailed("service disabled".into()).to_string(),
            "login failed: service disabled"
        );
        assert_eq!(SessionError::LoginCancelled.to_string(), "login cancelled");
    }

    #[test]
    fn test_recoverable_message_names_stage() {
        let err = SessionError::TokenExchangeRecoverable(Resolution::new(
            ResolutionStage::TokenExchange,
            "consent",
        ));

        assert!(err.to_string().starts_with("token exchange needs resolution: "));
        assert!(err.to_string().contains("consent"));
    }

    #[test]
    fn test_token_exchange_io_message_is_unprefixed() {
        let err = SessionError::TokenExchangeIo("connection reset".into());

        assert_eq!(err.to_string(), "connection reset");
    }
}
