//! Token-exchange orchestration.
//!
//! Wraps [`IdentityProvider::fetch_token`] and sorts its result into the
//! three cases the engine acts on. The exchange never touches session
//! state itself.

use playgate_session::{IdentityProvider, Resolution, SessionError, is_token_present};

/// How a token exchange ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExchangeOutcome {
    /// The provider returned a token. It may still fail the validity
    /// check; the session decides.
    Token(String),

    /// The user has to act before a token can be issued. No status moves
    /// until the host reports back.
    NeedsResolution(Resolution),

    /// Terminal failure, with the provider's description.
    Failed(String),
}

/// Runs one token exchange for `account` and `scope`.
pub async fn exchange_token<P: IdentityProvider>(
    provider: &P,
    account: &str,
    scope: &str,
) -> ExchangeOutcome {
    match provider.fetch_token(account, scope).await {
        Ok(token) => ExchangeOutcome::Token(token),
        Err(SessionError::TokenExchangeRecoverable(resolution)) => {
            tracing::info!(%resolution, "token exchange needs resolution");
            ExchangeOutcome::NeedsResolution(resolution)
        }
        Err(e) => {
            tracing::warn!(error = %e, "token exchange failed");
            ExchangeOutcome::Failed(e.to_string())
        }
    }
}

/// Runs one token exchange and hands back the token directly.
///
/// For callers that already sit in a task dedicated to the exchange and
/// just want the value. There is nobody to show a resolution to here, so
/// a recoverable error is reported as an I/O failure like any other.
///
/// # Errors
/// - [`SessionError::TokenExchangeFailed`] when the token fails the
///   validity check
/// - [`SessionError::TokenExchangeIo`] for every provider error
pub async fn exchange_inline<P: IdentityProvider>(
    provider: &P,
    account: &str,
    scope: &str,
) -> Result<String, SessionError> {
    let token = provider.fetch_token(account, scope).await.map_err(|e| match e {
        SessionError::TokenExchangeIo(msg) => SessionError::TokenExchangeIo(msg),
        other => SessionError::TokenExchangeIo(other.to_string()),
    })?;

    if !is_token_present(Some(&token)) {
        return Err(SessionError::TokenExchangeFailed(format!(
            "provider returned `{token}`"
        )));
    }
    Ok(token)
}
