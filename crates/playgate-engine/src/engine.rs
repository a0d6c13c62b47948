//! Engine actor: a Tokio task that owns the [`AuthSession`].
//!
//! Every status change arrives as a message in the actor's inbox and is
//! applied (and evaluated) before the next message is read. Stage work
//! (sign-in, token exchange, handshake) runs in spawned tasks that post
//! their result back into the same inbox, so a completion is just another
//! message.
//!
//! ```text
//!  begin ──→ sign-in task ──SignedIn──→ actor ──→ exchange task
//!                                         ↑              │
//!             handshake task ←── actor ←──TokenExchanged─┘
//!                   │
//!                   └──HandshakeFinished──→ actor ──→ evaluate ──→ HostSink
//! ```

use std::fmt;
use std::sync::Arc;

use playgate_protocol::{HandshakeRequest, HostEvent, ProtocolError};
use playgate_session::{
    AttemptParams, AuthSession, IdentityProvider, Resolution, ResolutionStage,
    SessionError, SessionSnapshot, SignIn, StatusUpdate, SubStatus,
    is_token_present,
};
use playgate_transport::BackendTransport;
use tokio::sync::{mpsc, oneshot};

use crate::exchange::{ExchangeOutcome, exchange_inline, exchange_token};
use crate::handshake::{BackendClient, HandshakeReply};
use crate::{EngineConfig, EngineError, HandshakeError, HostSink};

/// Identifies one authentication attempt.
///
/// Completions carry the id of the attempt that started them; anything
/// from an older attempt is dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AttemptId(pub u64);

impl fmt::Display for AttemptId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "A-{}", self.0)
    }
}

/// Commands processed by the engine actor.
///
/// The first group comes from [`AuthHandle`]; the second from the stage
/// tasks the actor spawns itself.
pub(crate) enum EngineCommand {
    Begin {
        params: AttemptParams,
        reply: oneshot::Sender<AttemptId>,
    },
    Cancel,
    ResolutionFinished {
        resolved: bool,
    },
    Submit(StatusUpdate),
    SetPlayerId(String),
    Snapshot {
        reply: oneshot::Sender<SessionSnapshot>,
    },
    AuthParams {
        reply: oneshot::Sender<Result<HandshakeRequest, EngineError>>,
    },
    AwardAchievement {
        achievement_id: String,
        reply: oneshot::Sender<Result<(), EngineError>>,
    },
    Shutdown,

    SignedIn {
        attempt: AttemptId,
        outcome: SignIn,
    },
    TokenExchanged {
        attempt: AttemptId,
        outcome: ExchangeOutcome,
    },
    HandshakeFinished {
        attempt: AttemptId,
        result: Result<HandshakeReply, HandshakeError>,
    },
    TokenRefreshed {
        result: Result<String, SessionError>,
        reply: oneshot::Sender<Result<HandshakeRequest, EngineError>>,
    },
}

// ---------------------------------------------------------------------------
// AuthHandle
// ---------------------------------------------------------------------------

/// Handle to a running engine. Cheap to clone; every clone talks to the
/// same actor.
///
/// All methods fail with [`EngineError::Unavailable`] once the engine has
/// shut down.
#[derive(Clone)]
pub struct AuthHandle {
    sender: mpsc::Sender<EngineCommand>,
}

impl AuthHandle {
    /// Starts a new attempt, superseding any attempt still in flight.
    ///
    /// Returns as soon as the attempt is registered; the outcome arrives
    /// through the [`HostSink`].
    pub async fn begin(&self, params: AttemptParams) -> Result<AttemptId, EngineError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(EngineCommand::Begin {
            params,
            reply: reply_tx,
        })
        .await?;
        reply_rx.await.map_err(|_| EngineError::Unavailable)
    }

    /// Cancels the current attempt: login and token exchange become
    /// `Cancel`, and one handshake still runs so the backend can set up an
    /// anonymous session.
    pub async fn cancel(&self) -> Result<(), EngineError> {
        self.send(EngineCommand::Cancel).await
    }

    /// Reports the result of a resolution the host was asked for.
    pub async fn resolution_finished(&self, resolved: bool) -> Result<(), EngineError> {
        self.send(EngineCommand::ResolutionFinished { resolved }).await
    }

    /// Pushes a status change from outside the engine's own stages.
    pub async fn submit(&self, update: StatusUpdate) -> Result<(), EngineError> {
        self.send(EngineCommand::Submit(update)).await
    }

    /// Records a provider player id. A switch to a different account
    /// emits `PlayerChange`.
    pub async fn set_player_id(&self, player_id: impl Into<String>) -> Result<(), EngineError> {
        self.send(EngineCommand::SetPlayerId(player_id.into())).await
    }

    pub async fn snapshot(&self) -> Result<SessionSnapshot, EngineError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(EngineCommand::Snapshot { reply: reply_tx }).await?;
        reply_rx.await.map_err(|_| EngineError::Unavailable)
    }

    /// Fetches a fresh bearer token for the signed-in account and returns
    /// the handshake record built from it.
    pub async fn auth_params(&self) -> Result<HandshakeRequest, EngineError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(EngineCommand::AuthParams { reply: reply_tx }).await?;
        reply_rx.await.map_err(|_| EngineError::Unavailable)?
    }

    /// [`auth_params`](Self::auth_params) as compact JSON.
    pub async fn auth_params_json(&self) -> Result<String, EngineError> {
        let request = self.auth_params().await?;
        serde_json::to_string(&request)
            .map_err(|e| EngineError::Protocol(ProtocolError::Encode(e)))
    }

    /// Unlocks an achievement for the player of the current session.
    pub async fn award_achievement(
        &self,
        achievement_id: impl Into<String>,
    ) -> Result<(), EngineError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(EngineCommand::AwardAchievement {
            achievement_id: achievement_id.into(),
            reply: reply_tx,
        })
        .await?;
        reply_rx.await.map_err(|_| EngineError::Unavailable)?
    }

    /// Stops the engine. Stage tasks still running finish, but their
    /// results are discarded.
    pub async fn shutdown(&self) -> Result<(), EngineError> {
        self.send(EngineCommand::Shutdown).await
    }

    async fn send(&self, command: EngineCommand) -> Result<(), EngineError> {
        self.sender
            .send(command)
            .await
            .map_err(|_| EngineError::Unavailable)
    }
}

// ---------------------------------------------------------------------------
// EngineActor
// ---------------------------------------------------------------------------

/// The internal engine state. Runs inside a Tokio task.
struct EngineActor<P, T, S> {
    provider: Arc<P>,
    backend: Arc<BackendClient<T>>,
    sink: S,
    config: EngineConfig,
    session: AuthSession,
    attempt: Option<AttemptId>,
    next_attempt: u64,
    /// The stage waiting on the host, if any.
    resolving: Option<ResolutionStage>,
    /// Set by a cancel; late sign-in and exchange results are ignored.
    cancelled: bool,
    handshake_in_flight: bool,
    /// For stage tasks to post results back. Weak, so the engine stops
    /// once every handle is gone and no stage is running.
    inbox: mpsc::WeakSender<EngineCommand>,
    receiver: mpsc::Receiver<EngineCommand>,
}

impl<P, T, S> EngineActor<P, T, S>
where
    P: IdentityProvider,
    T: BackendTransport,
    S: HostSink,
{
    /// Runs the actor loop, processing commands until shutdown.
    async fn run(mut self) {
        tracing::info!(network = %self.config.network, "auth engine started");

        while let Some(cmd) = self.receiver.recv().await {
            match cmd {
                EngineCommand::Begin { params, reply } => {
                    let attempt = self.handle_begin(params);
                    let _ = reply.send(attempt);
                }
                EngineCommand::Cancel => self.handle_cancel(),
                EngineCommand::ResolutionFinished { resolved } => {
                    self.handle_resolution_finished(resolved);
                }
                EngineCommand::Submit(update) => self.apply(update),
                EngineCommand::SetPlayerId(player_id) => {
                    self.record_player_id(player_id);
                }
                EngineCommand::Snapshot { reply } => {
                    let _ = reply.send(self.session.snapshot());
                }
                EngineCommand::AuthParams { reply } => self.handle_auth_params(reply),
                EngineCommand::AwardAchievement {
                    achievement_id,
                    reply,
                } => self.handle_award_achievement(achievement_id, reply),
                EngineCommand::Shutdown => {
                    tracing::info!("auth engine shutting down");
                    break;
                }
                EngineCommand::SignedIn { attempt, outcome } => {
                    if self.is_current(attempt) && !self.is_cancelled(attempt) {
                        self.handle_signed_in(attempt, outcome);
                    }
                }
                EngineCommand::TokenExchanged { attempt, outcome } => {
                    if self.is_current(attempt) && !self.is_cancelled(attempt) {
                        self.handle_token_exchanged(attempt, outcome);
                    }
                }
                EngineCommand::HandshakeFinished { attempt, result } => {
                    if self.is_current(attempt) {
                        self.handle_handshake_finished(attempt, result);
                    }
                }
                EngineCommand::TokenRefreshed { result, reply } => {
                    let result = result.map(|token| {
                        self.session.refresh_oauth_token(token);
                        self.session.handshake_request(&self.config.network)
                    });
                    let _ = reply.send(result.map_err(EngineError::from));
                }
            }
        }

        tracing::info!("auth engine stopped");
    }

    fn handle_begin(&mut self, params: AttemptParams) -> AttemptId {
        self.next_attempt += 1;
        let attempt = AttemptId(self.next_attempt);
        if let Some(previous) = self.attempt.replace(attempt) {
            tracing::info!(%previous, %attempt, "superseding attempt in flight");
        }

        // A token left over from the previous attempt is cleared before
        // signing in again, so the provider issues a fresh one.
        let stale_token = self
            .session
            .oauth_token()
            .filter(|t| is_token_present(Some(*t)))
            .map(str::to_string);

        self.session.begin(params);
        self.resolving = None;
        self.cancelled = false;
        self.handshake_in_flight = false;

        tracing::info!(%attempt, server_url = %self.session.server_url(), "attempt started");
        self.spawn_sign_in(attempt, stale_token);
        attempt
    }

    fn handle_signed_in(&mut self, attempt: AttemptId, outcome: SignIn) {
        match outcome {
            SignIn::Connected(info) => {
                tracing::info!(%attempt, player_id = %info.player_id, "signed in");
                self.session.set_account_name(info.account_name);
                self.session.set_player_name(info.display_name);
                self.record_player_id(info.player_id);
                self.spawn_exchange(attempt);
                self.apply(StatusUpdate::Login(SubStatus::Success));
            }
            SignIn::Suspended => {
                tracing::info!(%attempt, "sign-in suspended, retrying");
                self.spawn_sign_in(attempt, None);
            }
            SignIn::Failed { detail, resolvable } => {
                if self.resolving.is_some() {
                    tracing::debug!(%attempt, %detail, "already resolving, ignoring failure");
                    return;
                }
                self.session.set_failure_error(detail.clone());
                if resolvable {
                    tracing::info!(%attempt, %detail, "sign-in needs resolution");
                    self.resolving = Some(ResolutionStage::Login);
                    self.sink
                        .request_resolution(Resolution::new(ResolutionStage::Login, detail));
                } else {
                    let error = SessionError::LoginFailed(detail);
                    tracing::warn!(%attempt, %error, "sign-in failed");
                    self.apply(StatusUpdate::Login(SubStatus::Failure));
                    self.apply(StatusUpdate::Oauth(SubStatus::Failure));
                    self.dispatch_handshake(attempt);
                }
            }
            SignIn::Cancelled => {
                let error = SessionError::LoginCancelled;
                tracing::info!(%attempt, %error, "sign-in declined");
                self.handle_cancel();
            }
        }
    }

    fn handle_token_exchanged(&mut self, attempt: AttemptId, outcome: ExchangeOutcome) {
        match outcome {
            ExchangeOutcome::Token(token) => {
                self.apply(StatusUpdate::OauthToken(Some(token)));
                self.dispatch_handshake(attempt);
            }
            ExchangeOutcome::NeedsResolution(resolution) => {
                self.resolving = Some(ResolutionStage::TokenExchange);
                self.sink.request_resolution(resolution);
            }
            ExchangeOutcome::Failed(detail) => {
                self.session.set_failure_error(detail);
                self.apply(StatusUpdate::Oauth(SubStatus::Failure));
                self.dispatch_handshake(attempt);
            }
        }
    }

    fn handle_handshake_finished(
        &mut self,
        attempt: AttemptId,
        result: Result<HandshakeReply, HandshakeError>,
    ) {
        self.handshake_in_flight = false;
        match result {
            Ok(reply) => {
                tracing::info!(
                    %attempt,
                    server_player_id = %reply.player.real_player_id,
                    "backend handshake succeeded"
                );
                self.session.record_server_player(reply.player);
                if let Some(token) = reply.session_token {
                    self.session.set_session_token(token);
                }
                self.apply(StatusUpdate::ServerAuth(SubStatus::Success));
            }
            Err(e) => {
                tracing::warn!(%attempt, error = %e, "backend handshake failed");
                self.session.set_failure_error(e.to_string());
                self.apply(StatusUpdate::ServerAuth(SubStatus::Failure));
            }
        }
    }

    fn handle_cancel(&mut self) {
        let Some(attempt) = self.attempt else {
            tracing::warn!("cancel with no attempt in flight, ignoring");
            return;
        };
        tracing::info!(%attempt, "attempt cancelled");
        self.resolving = None;
        self.cancelled = true;
        // Server auth is back at Working here, so nothing is notified
        // until this handshake (or the one already running) reports.
        self.apply(StatusUpdate::Cancel);
        self.dispatch_handshake(attempt);
    }

    fn handle_resolution_finished(&mut self, resolved: bool) {
        let (Some(attempt), Some(stage)) = (self.attempt, self.resolving.take()) else {
            tracing::warn!(resolved, "resolution result with nothing pending, ignoring");
            return;
        };
        tracing::info!(%attempt, %stage, resolved, "resolution finished");
        match (resolved, stage) {
            (true, ResolutionStage::Login) => self.spawn_sign_in(attempt, None),
            (true, ResolutionStage::TokenExchange) => self.spawn_exchange(attempt),
            (false, _) => self.handle_cancel(),
        }
    }

    fn handle_auth_params(
        &mut self,
        reply: oneshot::Sender<Result<HandshakeRequest, EngineError>>,
    ) {
        let account = self.session.account_name().to_string();
        if account.is_empty() {
            let _ = reply.send(Err(SessionError::NotSignedIn.into()));
            return;
        }
        let Some(inbox) = self.inbox.upgrade() else {
            return;
        };
        let provider = Arc::clone(&self.provider);
        let scope = self.session.scope();
        tokio::spawn(async move {
            let result = exchange_inline(&*provider, &account, &scope).await;
            let _ = inbox.send(EngineCommand::TokenRefreshed { result, reply }).await;
        });
    }

    fn handle_award_achievement(
        &mut self,
        achievement_id: String,
        reply: oneshot::Sender<Result<(), EngineError>>,
    ) {
        if self.session.player_id().is_none() {
            let _ = reply.send(Err(SessionError::NotSignedIn.into()));
            return;
        }
        let provider = Arc::clone(&self.provider);
        tokio::spawn(async move {
            let result = provider.unlock_achievement(&achievement_id).await;
            if let Err(e) = &result {
                tracing::warn!(%achievement_id, error = %e, "achievement unlock failed");
            }
            let _ = reply.send(result.map_err(EngineError::from));
        });
    }

    // -- helpers ------------------------------------------------------------

    /// Applies one update and forwards the resulting outcome, if any.
    fn apply(&mut self, update: StatusUpdate) {
        if let Some(result) = self.session.apply(update) {
            tracing::info!(
                attempt = ?self.attempt,
                %result,
                anonymous = self.session.is_anonymous(),
                "attempt converged"
            );
            self.sink.notify(HostEvent::LoginResult(result));
        }
    }

    fn record_player_id(&mut self, player_id: String) {
        if self.session.set_player_id(player_id) {
            self.sink.notify(HostEvent::PlayerChange);
        }
    }

    fn is_current(&self, attempt: AttemptId) -> bool {
        if self.attempt == Some(attempt) {
            return true;
        }
        tracing::debug!(%attempt, current = ?self.attempt, "dropping stale completion");
        false
    }

    fn is_cancelled(&self, attempt: AttemptId) -> bool {
        if self.cancelled {
            tracing::debug!(%attempt, "attempt cancelled, ignoring stage result");
        }
        self.cancelled
    }

    fn spawn_sign_in(&self, attempt: AttemptId, stale_token: Option<String>) {
        let Some(inbox) = self.inbox.upgrade() else {
            return;
        };
        let provider = Arc::clone(&self.provider);
        tokio::spawn(async move {
            if let Some(token) = stale_token {
                if let Err(e) = provider.clear_token(&token).await {
                    tracing::warn!(%attempt, error = %e, "failed to clear previous token");
                }
            }
            let outcome = provider.sign_in().await;
            let _ = inbox.send(EngineCommand::SignedIn { attempt, outcome }).await;
        });
    }

    fn spawn_exchange(&self, attempt: AttemptId) {
        let Some(inbox) = self.inbox.upgrade() else {
            return;
        };
        let provider = Arc::clone(&self.provider);
        let account = self.session.account_name().to_string();
        let scope = self.session.scope();
        tracing::debug!(%attempt, %scope, "starting token exchange");
        tokio::spawn(async move {
            let outcome = exchange_token(&*provider, &account, &scope).await;
            let _ = inbox
                .send(EngineCommand::TokenExchanged { attempt, outcome })
                .await;
        });
    }

    /// Starts the backend handshake unless one is already running for this
    /// attempt. The running one reports against the latest statuses anyway.
    fn dispatch_handshake(&mut self, attempt: AttemptId) {
        if self.handshake_in_flight {
            tracing::debug!(%attempt, "handshake already in flight");
            return;
        }
        let Some(inbox) = self.inbox.upgrade() else {
            return;
        };
        self.handshake_in_flight = true;

        let backend = Arc::clone(&self.backend);
        let url = self.session.server_url().to_string();
        let request = self.session.handshake_request(&self.config.network);
        tracing::debug!(%attempt, %url, "dispatching backend handshake");
        tokio::spawn(async move {
            let result = backend.authenticate(&url, &request).await;
            let _ = inbox
                .send(EngineCommand::HandshakeFinished { attempt, result })
                .await;
        });
    }
}

/// Spawns the engine actor and returns a handle to it.
///
/// Must be called from within a Tokio runtime.
pub fn spawn_engine<P, T, S>(
    provider: P,
    transport: T,
    sink: S,
    config: EngineConfig,
) -> AuthHandle
where
    P: IdentityProvider,
    T: BackendTransport,
    S: HostSink,
{
    let (tx, rx) = mpsc::channel(config.channel_size.max(1));

    let actor = EngineActor {
        provider: Arc::new(provider),
        backend: Arc::new(BackendClient::new(transport)),
        sink,
        config,
        session: AuthSession::new(),
        attempt: None,
        next_attempt: 0,
        resolving: None,
        cancelled: false,
        handshake_in_flight: false,
        inbox: tx.downgrade(),
        receiver: rx,
    };

    tokio::spawn(actor.run());

    AuthHandle { sender: tx }
}
