//! The identity-provider collaborator.
//!
//! Playgate doesn't talk to any identity provider itself. It defines the
//! [`IdentityProvider`] trait instead: sign the user in, exchange their
//! account for a bearer token, and (optionally) forget a token or unlock
//! an achievement. The host implements it on top of whatever provider SDK
//! it uses; tests implement it with a scripted fake.

use std::fmt;

use crate::SessionError;

/// Builds the token-exchange scope for a backend OAuth client id.
///
/// ```rust
/// use playgate_session::token_scope;
///
/// assert_eq!(token_scope("1234.apps"), "audience:server:client_id:1234.apps");
/// ```
pub fn token_scope(client_id: &str) -> String {
    format!("audience:server:client_id:{client_id}")
}

/// Who the provider says signed in.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LoginInfo {
    /// Local account identifier; the token exchange is keyed on it.
    pub account_name: String,
    pub display_name: String,
    /// Provider-side player id.
    pub player_id: String,
}

/// How a sign-in ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignIn {
    /// Signed in.
    Connected(LoginInfo),

    /// The connection dropped before finishing. Sign-in is retried.
    Suspended,

    /// Sign-in failed. If `resolvable`, the user can fix it (pick an
    /// account, grant consent, ...) and the host is asked to do so.
    Failed { detail: String, resolvable: bool },

    /// The user backed out.
    Cancelled,
}

/// Which stage is waiting on the host to resolve something.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResolutionStage {
    Login,
    TokenExchange,
}

impl fmt::Display for ResolutionStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Login => write!(f, "login"),
            Self::TokenExchange => write!(f, "token exchange"),
        }
    }
}

/// A request for the host to resolve a user-recoverable error.
///
/// The attempt waits until the host reports back with
/// `resolution_finished`: resolved re-runs `stage`, not resolved cancels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub stage: ResolutionStage,
    /// Provider's description of what needs doing.
    pub detail: String,
}

impl Resolution {
    pub fn new(stage: ResolutionStage, detail: impl Into<String>) -> Self {
        Self {
            stage,
            detail: detail.into(),
        }
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.stage, self.detail)
    }
}

/// The identity provider behind an authentication attempt.
///
/// # Trait bounds
///
/// `Send + Sync + 'static`: the engine shares one provider across the
/// tasks it spawns for each stage, for as long as the engine lives.
///
/// # Example
///
/// ```rust
/// use playgate_session::{IdentityProvider, LoginInfo, SessionError, SignIn};
///
/// /// Signs everyone in as the same player. Tests only.
/// struct FixedProvider;
///
/// impl IdentityProvider for FixedProvider {
///     async fn sign_in(&self) -> SignIn {
///         SignIn::Connected(LoginInfo {
///             account_name: "ann@example.com".into(),
///             display_name: "Ann".into(),
///             player_id: "g-1".into(),
///         })
///     }
///
///     async fn fetch_token(
///         &self,
///         _account: &str,
///         _scope: &str,
///     ) -> Result<String, SessionError> {
///         Ok("tok-1".into())
///     }
/// }
/// ```
pub trait IdentityProvider: Send + Sync + 'static {
    /// Signs the user in.
    fn sign_in(&self) -> impl std::future::Future<Output = SignIn> + Send;

    /// Exchanges `account` for a bearer token valid for `scope`.
    ///
    /// # Errors
    /// - [`SessionError::TokenExchangeRecoverable`] if the user must act
    ///   first; the attempt pauses, it does not fail
    /// - [`SessionError::TokenExchangeIo`] / [`SessionError::TokenExchangeFailed`]
    ///   for anything terminal
    fn fetch_token(
        &self,
        account: &str,
        scope: &str,
    ) -> impl std::future::Future<Output = Result<String, SessionError>> + Send;

    /// Invalidates a previously issued token so the next exchange mints a
    /// fresh one. Does nothing unless overridden.
    fn clear_token(
        &self,
        _token: &str,
    ) -> impl std::future::Future<Output = Result<(), SessionError>> + Send {
        async { Ok(()) }
    }

    /// Unlocks an achievement for the signed-in player.
    fn unlock_achievement(
        &self,
        achievement_id: &str,
    ) -> impl std::future::Future<Output = Result<(), SessionError>> + Send {
        let id = achievement_id.to_string();
        async move { Err(SessionError::Achievement(format!("{id}: not supported"))) }
    }
}
