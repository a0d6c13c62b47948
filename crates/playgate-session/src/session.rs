//! Session types: the shared record of one authentication attempt.
//!
//! An [`AuthSession`] tracks:
//! - WHERE each of the three sub-authentications stands ([`SubStatus`])
//! - WHO the player is (provider id, canonical server id, display name)
//! - WHAT credentials were obtained (bearer token, session token)
//!
//! The sub-statuses can only be changed through [`AuthSession::apply`],
//! which runs the convergence rule exactly once after every change. That
//! makes "mutate, then evaluate" a single step for whoever owns the session.

use std::fmt;

use playgate_protocol::{HandshakeRequest, LoginResult, ServerPlayer};
use serde::{Deserialize, Serialize};

use crate::convergence::{Convergence, converge};
use crate::provider::token_scope;

/// The literal a stringified null turns into when it crosses a language
/// boundary. A token equal to this is treated as absent.
pub const NULL_TOKEN_SENTINEL: &str = "null";

/// Returns `true` if `token` is a usable bearer token: present, non-empty,
/// and not the `"null"` sentinel.
///
/// ```rust
/// use playgate_session::is_token_present;
///
/// assert!(is_token_present(Some("abc123")));
/// assert!(!is_token_present(Some("")));
/// assert!(!is_token_present(Some("null")));
/// assert!(!is_token_present(None));
/// ```
pub fn is_token_present(token: Option<&str>) -> bool {
    matches!(token, Some(t) if !t.is_empty() && t != NULL_TOKEN_SENTINEL)
}

// ---------------------------------------------------------------------------
// SubStatus
// ---------------------------------------------------------------------------

/// Progress of one sub-authentication.
///
/// ```text
///            ┌──→ Success
/// Working ───┼──→ Failure
///            └──→ Cancel
/// ```
///
/// Every attempt starts with all three sub-statuses at `Working`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize,
)]
pub enum SubStatus {
    #[default]
    Working,
    Success,
    Failure,
    Cancel,
}

impl SubStatus {
    /// All four values, in declaration order.
    pub const ALL: [SubStatus; 4] =
        [Self::Working, Self::Success, Self::Failure, Self::Cancel];
}

impl fmt::Display for SubStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Working => write!(f, "Working"),
            Self::Success => write!(f, "Success"),
            Self::Failure => write!(f, "Failure"),
            Self::Cancel => write!(f, "Cancel"),
        }
    }
}

/// The three sub-statuses of an attempt, as one value.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize,
)]
pub struct StatusTriple {
    /// Identity-provider login.
    pub login: SubStatus,
    /// Bearer-token exchange.
    pub oauth: SubStatus,
    /// Backend handshake.
    pub server_auth: SubStatus,
}

impl StatusTriple {
    pub fn new(login: SubStatus, oauth: SubStatus, server_auth: SubStatus) -> Self {
        Self {
            login,
            oauth,
            server_auth,
        }
    }

    /// Every one of the 4×4×4 = 64 possible triples.
    pub fn all() -> impl Iterator<Item = StatusTriple> {
        SubStatus::ALL.into_iter().flat_map(|login| {
            SubStatus::ALL.into_iter().flat_map(move |oauth| {
                SubStatus::ALL
                    .into_iter()
                    .map(move |server_auth| Self::new(login, oauth, server_auth))
            })
        })
    }
}

impl fmt::Display for StatusTriple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.login, self.oauth, self.server_auth)
    }
}

/// A change to one (or, for a cancel, two) sub-statuses.
///
/// This is the only way sub-statuses move. Each update is applied and then
/// evaluated exactly once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusUpdate {
    /// The provider login finished.
    Login(SubStatus),

    /// The token exchange finished without a token value to record.
    Oauth(SubStatus),

    /// The token exchange produced this token (or none). The oauth status
    /// becomes `Success` if [`is_token_present`], `Failure` otherwise.
    OauthToken(Option<String>),

    /// The backend handshake finished.
    ServerAuth(SubStatus),

    /// The user cancelled: login and oauth both become `Cancel` in one
    /// step, so the rule sees them together. Server auth goes back to
    /// `Working` until the handshake the cancel triggers reports back.
    Cancel,
}

// ---------------------------------------------------------------------------
// AttemptParams
// ---------------------------------------------------------------------------

/// Parameters fixed for the whole of one attempt.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AttemptParams {
    /// The backend's OAuth client id; goes into the token scope.
    pub client_id: String,
    /// Where the handshake is POSTed.
    pub server_url: String,
    /// Canonical id cached from an earlier session, if any.
    pub server_player_id: Option<String>,
}

impl AttemptParams {
    pub fn new(client_id: impl Into<String>, server_url: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            server_url: server_url.into(),
            server_player_id: None,
        }
    }

    /// Sets the cached canonical id to send as `serverPlayerId`.
    pub fn with_server_player_id(mut self, id: impl Into<String>) -> Self {
        self.server_player_id = Some(id.into());
        self
    }
}

// ---------------------------------------------------------------------------
// AuthSession
// ---------------------------------------------------------------------------

/// The process-wide record of authentication state.
///
/// Created once, [`begin`](Self::begin)-ed per attempt, and never torn
/// down: a completed session's identity stays available for later backend
/// calls without re-authenticating.
#[derive(Debug, Clone)]
pub struct AuthSession {
    status: StatusTriple,
    player_id: Option<String>,
    player_name: Option<String>,
    oauth_token: Option<String>,
    session_token: String,
    account_name: String,
    client_id: String,
    server_url: String,
    server_player_id: Option<String>,
    anonymous: bool,
    failure_error: Option<String>,

    /// The triple that produced the last notification in this attempt.
    /// Re-evaluating it must not notify again.
    last_notified: Option<StatusTriple>,
}

impl AuthSession {
    /// Creates an empty session: anonymous, no identity, all `Working`.
    pub fn new() -> Self {
        Self {
            status: StatusTriple::default(),
            player_id: None,
            player_name: None,
            oauth_token: None,
            session_token: String::new(),
            account_name: String::new(),
            client_id: String::new(),
            server_url: String::new(),
            server_player_id: None,
            anonymous: true,
            failure_error: None,
            last_notified: None,
        }
    }

    /// Resets the session for a new attempt.
    ///
    /// All three sub-statuses go back to `Working`, the failure detail is
    /// cleared, and the session is anonymous again until the next success.
    /// Identity fields (`player_id`, `session_token`, ...) survive so the
    /// account-switch check can compare against them.
    pub fn begin(&mut self, params: AttemptParams) {
        self.client_id = params.client_id;
        self.server_url = params.server_url;
        self.server_player_id = params.server_player_id;
        self.status = StatusTriple::default();
        self.failure_error = None;
        self.anonymous = true;
        self.last_notified = None;
    }

    /// Applies one status update and evaluates the convergence rule.
    ///
    /// Returns the outcome to notify the host with, or `None` if the
    /// attempt is still pending, the triple is unclassified, or this exact
    /// triple was already notified.
    pub fn apply(&mut self, update: StatusUpdate) -> Option<LoginResult> {
        match update {
            StatusUpdate::Login(status) => self.status.login = status,
            StatusUpdate::Oauth(status) => self.status.oauth = status,
            StatusUpdate::OauthToken(token) => {
                self.status.oauth = if is_token_present(token.as_deref()) {
                    SubStatus::Success
                } else {
                    SubStatus::Failure
                };
                self.oauth_token = token;
            }
            StatusUpdate::ServerAuth(status) => self.status.server_auth = status,
            StatusUpdate::Cancel => {
                self.status.login = SubStatus::Cancel;
                self.status.oauth = SubStatus::Cancel;
                self.status.server_auth = SubStatus::Working;
            }
        }
        self.evaluate()
    }

    fn evaluate(&mut self) -> Option<LoginResult> {
        let triple = self.status;
        let verdict = converge(triple);

        // Only a declared success leaves the session identified.
        self.anonymous = verdict != Convergence::Success;

        let Some(result) = verdict.login_result() else {
            if verdict == Convergence::Unclassified {
                tracing::warn!(%triple, "status triple has no defined outcome");
            }
            return None;
        };

        if self.last_notified == Some(triple) {
            tracing::debug!(%triple, %result, "outcome already notified");
            return None;
        }
        self.last_notified = Some(triple);
        Some(result)
    }

    /// Records the provider-local player id.
    ///
    /// Returns `true` when this is an account switch: a previously known
    /// non-empty id replaced by a different non-empty id.
    pub fn set_player_id(&mut self, player_id: impl Into<String>) -> bool {
        let player_id = player_id.into();
        let switched = match self.player_id.as_deref() {
            Some(previous) => {
                !previous.is_empty()
                    && !player_id.is_empty()
                    && previous != player_id
            }
            None => false,
        };
        if switched {
            tracing::info!(new_player_id = %player_id, "player id changed");
        }
        self.player_id = Some(player_id);
        switched
    }

    pub fn set_player_name(&mut self, name: impl Into<String>) {
        self.player_name = Some(name.into());
    }

    pub fn set_account_name(&mut self, account_name: impl Into<String>) {
        self.account_name = account_name.into();
    }

    /// Stores a fresh bearer token without touching the oauth status.
    /// Used when the token is re-fetched outside the normal stage chain.
    pub fn refresh_oauth_token(&mut self, token: impl Into<String>) {
        self.oauth_token = Some(token.into());
    }

    /// Copies the backend's view of the player into the session.
    ///
    /// `isAnonymous` is not copied: the `anonymous` flag only changes when
    /// the convergence rule evaluates, and only a success clears it.
    pub fn record_server_player(&mut self, player: ServerPlayer) {
        if player.is_anonymous {
            tracing::debug!(
                real_player_id = %player.real_player_id,
                "backend reports anonymous player"
            );
        }
        self.server_player_id = Some(player.real_player_id);
        self.player_name = Some(player.player_name);
    }

    pub fn set_session_token(&mut self, token: impl Into<String>) {
        self.session_token = token.into();
    }

    pub fn set_failure_error(&mut self, detail: impl Into<String>) {
        self.failure_error = Some(detail.into());
    }

    /// Builds the handshake body from the current identity fields.
    pub fn handshake_request(&self, network: &str) -> HandshakeRequest {
        HandshakeRequest::new(
            self.player_id.as_deref(),
            self.server_player_id.as_deref(),
            network,
            self.player_name.as_deref(),
            self.oauth_token.as_deref(),
        )
    }

    pub fn status(&self) -> StatusTriple {
        self.status
    }

    pub fn player_id(&self) -> Option<&str> {
        self.player_id.as_deref()
    }

    pub fn player_name(&self) -> Option<&str> {
        self.player_name.as_deref()
    }

    pub fn oauth_token(&self) -> Option<&str> {
        self.oauth_token.as_deref()
    }

    pub fn session_token(&self) -> &str {
        &self.session_token
    }

    pub fn account_name(&self) -> &str {
        &self.account_name
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub fn server_url(&self) -> &str {
        &self.server_url
    }

    pub fn server_player_id(&self) -> Option<&str> {
        self.server_player_id.as_deref()
    }

    pub fn is_anonymous(&self) -> bool {
        self.anonymous
    }

    pub fn failure_error(&self) -> Option<&str> {
        self.failure_error.as_deref()
    }

    /// The token-exchange scope for this attempt's client id.
    pub fn scope(&self) -> String {
        token_scope(&self.client_id)
    }

    /// Copies every field out for callers outside the owning task.
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            status: self.status,
            player_id: self.player_id.clone(),
            player_name: self.player_name.clone(),
            oauth_token: self.oauth_token.clone(),
            session_token: self.session_token.clone(),
            account_name: self.account_name.clone(),
            client_id: self.client_id.clone(),
            server_url: self.server_url.clone(),
            server_player_id: self.server_player_id.clone(),
            anonymous: self.anonymous,
            failure_error: self.failure_error.clone(),
        }
    }
}

impl Default for AuthSession {
    fn default() -> Self {
        Self::new()
    }
}

/// A point-in-time copy of an [`AuthSession`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub status: StatusTriple,
    pub player_id: Option<String>,
    pub player_name: Option<String>,
    pub oauth_token: Option<String>,
    pub session_token: String,
    pub account_name: String,
    pub client_id: String,
    pub server_url: String,
    pub server_player_id: Option<String>,
    pub anonymous: bool,
    pub failure_error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use SubStatus::{Cancel, Failure, Success, Working};

    fn started() -> AuthSession {
        let mut session = AuthSession::new();
        session.begin(
            AttemptParams::new("client-1", "https://backend.test/auth")
                .with_server_player_id("p-cached"),
        );
        session
    }

    fn server_player(id: &str, anonymous: bool) -> ServerPlayer {
        ServerPlayer {
            real_player_id: id.into(),
            player_name: "Ann".into(),
            is_anonymous: anonymous,
        }
    }

    // =====================================================================
    // is_token_present()
    // =====================================================================

    #[test]
    fn test_is_token_present_rejects_empty_null_and_sentinel() {
        assert!(!is_token_present(Some("")));
        assert!(!is_token_present(Some("null")));
        assert!(!is_token_present(None));
        assert!(is_token_present(Some("abc123")));
    }

    #[test]
    fn test_is_token_present_sentinel_is_case_sensitive() {
        assert!(is_token_present(Some("NULL")));
    }

    // =====================================================================
    // begin()
    // =====================================================================

    #[test]
    fn test_new_session_is_anonymous_with_empty_session_token() {
        let session = AuthSession::new();

        assert!(session.is_anonymous());
        assert_eq!(session.session_token(), "");
        assert_eq!(session.status(), StatusTriple::default());
    }

    #[test]
    fn test_begin_resets_statuses_and_failure_error() {
        let mut session = started();
        session.set_failure_error("boom");
        session.apply(StatusUpdate::Login(Success));
        session.apply(StatusUpdate::ServerAuth(Failure));

        session.begin(AttemptParams::new("client-2", "https://backend.test/v2"));

        assert_eq!(session.status(), StatusTriple::new(Working, Working, Working));
        assert_eq!(session.failure_error(), None);
        assert_eq!(session.client_id(), "client-2");
        assert_eq!(session.server_player_id(), None);
    }

    #[test]
    fn test_begin_flips_anonymous_back_to_true() {
        let mut session = started();
        session.apply(StatusUpdate::Login(Success));
        session.apply(StatusUpdate::OauthToken(Some("tok".into())));
        session.apply(StatusUpdate::ServerAuth(Success));
        assert!(!session.is_anonymous());

        session.begin(AttemptParams::new("client-1", "https://backend.test/auth"));

        assert!(session.is_anonymous());
    }

    #[test]
    fn test_begin_keeps_identity_for_reuse() {
        let mut session = started();
        session.set_player_id("g-1");
        session.set_session_token("sid-1");

        session.begin(AttemptParams::new("client-1", "https://backend.test/auth"));

        assert_eq!(session.player_id(), Some("g-1"));
        assert_eq!(session.session_token(), "sid-1");
    }

    // =====================================================================
    // apply()
    // =====================================================================

    #[test]
    fn test_apply_all_success_notifies_success_and_clears_anonymous() {
        let mut session = started();

        assert_eq!(session.apply(StatusUpdate::Login(Success)), None);
        assert_eq!(
            session.apply(StatusUpdate::OauthToken(Some("tok-1".into()))),
            None
        );
        let result = session.apply(StatusUpdate::ServerAuth(Success));

        assert_eq!(result, Some(LoginResult::Success));
        assert!(!session.is_anonymous());
    }

    #[test]
    fn test_apply_oauth_token_sentinel_sets_oauth_failure() {
        let mut session = started();

        session.apply(StatusUpdate::OauthToken(Some("null".into())));

        assert_eq!(session.status().oauth, Failure);
        assert_eq!(session.oauth_token(), Some("null"));
    }

    #[test]
    fn test_apply_oauth_token_none_sets_oauth_failure() {
        let mut session = started();

        session.apply(StatusUpdate::OauthToken(None));

        assert_eq!(session.status().oauth, Failure);
    }

    #[test]
    fn test_apply_cancel_sets_login_and_oauth_together() {
        let mut session = started();

        let result = session.apply(StatusUpdate::Cancel);

        assert_eq!(result, None, "server auth still working");
        assert_eq!(session.status(), StatusTriple::new(Cancel, Cancel, Working));
    }

    #[test]
    fn test_apply_cancel_then_server_success_notifies_cancel() {
        let mut session = started();
        session.apply(StatusUpdate::Cancel);
        session.record_server_player(server_player("p-anon", true));

        let result = session.apply(StatusUpdate::ServerAuth(Success));

        assert_eq!(result, Some(LoginResult::Cancel));
        assert!(session.is_anonymous());
    }

    #[test]
    fn test_apply_server_failure_notifies_failure_and_sets_anonymous() {
        let mut session = started();
        session.apply(StatusUpdate::Login(Success));
        session.apply(StatusUpdate::Oauth(Success));
        session.record_server_player(server_player("p1", false));

        let result = session.apply(StatusUpdate::ServerAuth(Failure));

        assert_eq!(result, Some(LoginResult::Failure));
        assert!(session.is_anonymous());
    }

    #[test]
    fn test_apply_same_terminal_triple_twice_notifies_once() {
        let mut session = started();
        session.apply(StatusUpdate::Login(Success));
        session.apply(StatusUpdate::Oauth(Success));

        let first = session.apply(StatusUpdate::ServerAuth(Success));
        let second = session.apply(StatusUpdate::ServerAuth(Success));

        assert_eq!(first, Some(LoginResult::Success));
        assert_eq!(second, None);
    }

    #[test]
    fn test_apply_cancel_after_success_waits_for_next_handshake() {
        // Anonymous flips back at once; the Cancel outcome waits for the
        // handshake the cancel triggers.
        let mut session = started();
        session.apply(StatusUpdate::Login(Success));
        session.apply(StatusUpdate::Oauth(Success));
        session.apply(StatusUpdate::ServerAuth(Success));

        assert_eq!(session.apply(StatusUpdate::Cancel), None);
        assert!(session.is_anonymous());
        assert_eq!(session.status(), StatusTriple::new(Cancel, Cancel, Working));

        let result = session.apply(StatusUpdate::ServerAuth(Success));
        assert_eq!(result, Some(LoginResult::Cancel));
        assert!(session.is_anonymous());
    }

    #[test]
    fn test_apply_cancel_after_failure_does_not_repeat_failure() {
        let mut session = started();
        session.apply(StatusUpdate::Login(Success));
        session.apply(StatusUpdate::Oauth(Success));
        let first = session.apply(StatusUpdate::ServerAuth(Failure));

        let on_cancel = session.apply(StatusUpdate::Cancel);

        assert_eq!(first, Some(LoginResult::Failure));
        assert_eq!(on_cancel, None);
        assert_eq!(
            session.apply(StatusUpdate::ServerAuth(Success)),
            Some(LoginResult::Cancel)
        );
    }

    #[test]
    fn test_apply_unclassified_after_backend_identified_player_stays_anonymous() {
        let mut session = started();
        session.apply(StatusUpdate::Login(Success));
        session.apply(StatusUpdate::Oauth(Failure));
        session.record_server_player(server_player("p1", false));

        let result = session.apply(StatusUpdate::ServerAuth(Success));

        assert_eq!(result, None);
        assert!(session.is_anonymous());
    }

    #[test]
    fn test_apply_leaving_success_flips_anonymous_before_any_outcome() {
        let mut session = started();
        session.apply(StatusUpdate::Login(Success));
        session.apply(StatusUpdate::Oauth(Success));
        session.apply(StatusUpdate::ServerAuth(Success));

        assert_eq!(session.apply(StatusUpdate::ServerAuth(Working)), None);
        assert!(session.is_anonymous());
    }

    #[test]
    fn test_apply_unclassified_triple_notifies_nothing() {
        let mut session = started();
        session.apply(StatusUpdate::Login(Success));
        session.apply(StatusUpdate::Oauth(Failure));

        let result = session.apply(StatusUpdate::ServerAuth(Success));

        assert_eq!(result, None);
    }

    #[test]
    fn test_apply_after_begin_can_notify_same_triple_again() {
        let mut session = started();
        session.apply(StatusUpdate::Login(Success));
        session.apply(StatusUpdate::Oauth(Success));
        session.apply(StatusUpdate::ServerAuth(Success));

        session.begin(AttemptParams::new("client-1", "https://backend.test/auth"));
        session.apply(StatusUpdate::Login(Success));
        session.apply(StatusUpdate::Oauth(Success));
        let result = session.apply(StatusUpdate::ServerAuth(Success));

        assert_eq!(result, Some(LoginResult::Success));
    }

    // =====================================================================
    // set_player_id()
    // =====================================================================

    #[test]
    fn test_set_player_id_first_value_is_not_a_switch() {
        let mut session = started();

        assert!(!session.set_player_id("p1"));
        assert_eq!(session.player_id(), Some("p1"));
    }

    #[test]
    fn test_set_player_id_different_value_is_a_switch() {
        let mut session = started();
        session.set_player_id("p1");

        assert!(session.set_player_id("p2"));
        assert_eq!(session.player_id(), Some("p2"));
    }

    #[test]
    fn test_set_player_id_same_value_is_not_a_switch() {
        let mut session = started();
        session.set_player_id("p1");

        assert!(!session.set_player_id("p1"));
    }

    #[test]
    fn test_set_player_id_empty_values_are_not_a_switch() {
        let mut session = started();
        session.set_player_id("");
        assert!(!session.set_player_id("p1"));
        assert!(!session.set_player_id(""));
    }

    // =====================================================================
    // record_server_player() / handshake_request()
    // =====================================================================

    #[test]
    fn test_record_server_player_sets_identity_fields() {
        let mut session = started();

        session.record_server_player(server_player("p1", false));

        assert_eq!(session.server_player_id(), Some("p1"));
        assert_eq!(session.player_name(), Some("Ann"));
        assert!(session.is_anonymous(), "only a converged success clears it");
    }

    #[test]
    fn test_handshake_request_uses_session_fields() {
        let mut session = started();
        session.set_player_id("g-1");
        session.set_player_name("Ann");
        session.apply(StatusUpdate::OauthToken(Some("tok-1".into())));

        let request = session.handshake_request("GOOGLE");

        assert_eq!(
            request,
            HandshakeRequest {
                player_id: "g-1".into(),
                server_player_id: "p-cached".into(),
                network: "GOOGLE".into(),
                player_name: "Ann".into(),
                token: "tok-1".into(),
            }
        );
    }

    #[test]
    fn test_scope_embeds_client_id() {
        let session = started();

        assert_eq!(session.scope(), "audience:server:client_id:client-1");
    }

    #[test]
    fn test_status_triple_all_yields_64_distinct_triples() {
        let all: std::collections::HashSet<_> = StatusTriple::all().collect();

        assert_eq!(all.len(), 64);
    }
}
