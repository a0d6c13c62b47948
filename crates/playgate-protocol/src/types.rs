//! Core protocol types for the backend handshake and host notifications.
//!
//! The JSON field names here are a fixed contract with the application
//! backend. They are spelled out with `#[serde(rename = ...)]` instead of a
//! blanket `rename_all`, because the backend mixes conventions
//! (`realPlayerID` vs `playerName`).

use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Backend handshake bodies
// ---------------------------------------------------------------------------

/// The body POSTed to the backend to exchange a bearer token for a
/// canonical player identity.
///
/// Every field is a string on the wire. Values the client doesn't know yet
/// (no provider login, no cached server id, failed token exchange) are sent
/// as `""` so the backend always sees the same five keys, in this order:
///
/// ```text
/// {"playerId":"…","serverPlayerId":"…","network":"…","playerName":"…","token":"…"}
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandshakeRequest {
    /// Provider-local player id (from the identity provider login).
    #[serde(rename = "playerId")]
    pub player_id: String,

    /// The canonical id the backend handed out last time, if cached.
    /// Lets the backend detect account switches and merge anonymous
    /// sessions.
    #[serde(rename = "serverPlayerId")]
    pub server_player_id: String,

    /// Name of the identity provider, e.g. `"GOOGLE"`.
    pub network: String,

    /// Display name reported by the provider.
    #[serde(rename = "playerName")]
    pub player_name: String,

    /// Bearer token from the token exchange. Empty when the exchange
    /// failed or was cancelled.
    pub token: String,
}

impl HandshakeRequest {
    /// Builds a request, mapping every absent value to `""`.
    pub fn new(
        player_id: Option<&str>,
        server_player_id: Option<&str>,
        network: &str,
        player_name: Option<&str>,
        token: Option<&str>,
    ) -> Self {
        Self {
            player_id: player_id.unwrap_or_default().to_string(),
            server_player_id: server_player_id.unwrap_or_default().to_string(),
            network: network.to_string(),
            player_name: player_name.unwrap_or_default().to_string(),
            token: token.unwrap_or_default().to_string(),
        }
    }
}

/// The backend's answer to a successful (HTTP 200) handshake.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerPlayer {
    /// The canonical player id. Required.
    #[serde(rename = "realPlayerID")]
    pub real_player_id: String,

    /// The name the backend knows this player by.
    #[serde(rename = "playerName", default)]
    pub player_name: String,

    /// `true` when the backend established an anonymous session (for
    /// example, because identity linking was declined).
    #[serde(rename = "isAnonymous", default)]
    pub is_anonymous: bool,
}

// ---------------------------------------------------------------------------
// Host notifications
// ---------------------------------------------------------------------------

/// Event name for terminal login outcomes.
pub const EVENT_LOGIN_RESULT: &str = "LoginResult";

/// Event name for account-switch signals.
pub const EVENT_PLAYER_CHANGE: &str = "PlayerChange";

/// The externally visible result of one authentication attempt.
///
/// `Display` renders the exact payload string the host receives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LoginResult {
    Success,
    Failure,
    Cancel,
}

impl fmt::Display for LoginResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => write!(f, "Success"),
            Self::Failure => write!(f, "Failure"),
            Self::Cancel => write!(f, "Cancel"),
        }
    }
}

/// A notification for the host, shaped as `(eventName, payload)`.
///
/// Hosts that only understand named string callbacks (a game engine's
/// message bus, for instance) can forward [`name`](Self::name) and
/// [`payload`](Self::payload) verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostEvent {
    /// An attempt converged on a terminal outcome.
    LoginResult(LoginResult),

    /// The canonical player id changed to a different account.
    PlayerChange,
}

impl HostEvent {
    /// The event name: `"LoginResult"` or `"PlayerChange"`.
    pub fn name(&self) -> &'static str {
        match self {
            Self::LoginResult(_) => EVENT_LOGIN_RESULT,
            Self::PlayerChange => EVENT_PLAYER_CHANGE,
        }
    }

    /// The event payload: the outcome for `LoginResult`, `"true"` for
    /// `PlayerChange`.
    pub fn payload(&self) -> String {
        match self {
            Self::LoginResult(result) => result.to_string(),
            Self::PlayerChange => "true".to_string(),
        }
    }
}

impl fmt::Display for HostEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.name(), self.payload())
    }
}
