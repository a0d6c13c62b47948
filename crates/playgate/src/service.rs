//! `AuthService` builder.
//!
//! This is the entry point for running Playgate. It ties together all the
//! layers: provider → engine → handshake → transport.

use std::time::Duration;

use playgate_engine::{AttemptId, AuthHandle, EngineConfig, HostSink, spawn_engine};
use playgate_protocol::HandshakeRequest;
use playgate_session::{AttemptParams, IdentityProvider, SessionSnapshot};
use playgate_transport::{BackendTransport, HttpTransport};

use crate::PlaygateError;

/// Builder for configuring and starting an auth engine.
///
/// # Example
///
/// ```rust,ignore
/// use playgate::prelude::*;
///
/// let service = AuthService::builder()
///     .connect_timeout(Duration::from_secs(10))
///     .build(my_provider, my_sink)?;
/// service.begin(AttemptParams::new(client_id, server_url)).await?;
/// ```
pub struct AuthServiceBuilder {
    config: EngineConfig,
}

impl AuthServiceBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            config: EngineConfig::default(),
        }
    }

    /// Sets the provider name sent as `network` in the handshake.
    pub fn network(mut self, network: &str) -> Self {
        self.config.network = network.to_string();
        self
    }

    /// Sets how long the handshake waits for the backend to accept a
    /// connection.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.config.connect_timeout = timeout;
        self
    }

    /// Sets the engine's command channel capacity.
    pub fn channel_size(mut self, size: usize) -> Self {
        self.config.channel_size = size;
        self
    }

    /// Replaces the whole engine configuration.
    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Builds the HTTP transport and starts the engine.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn build(
        self,
        provider: impl IdentityProvider,
        sink: impl HostSink,
    ) -> Result<AuthService, PlaygateError> {
        let transport = HttpTransport::new(self.config.connect_timeout)?;
        Ok(self.build_with_transport(provider, transport, sink))
    }

    /// Starts the engine over a caller-supplied transport.
    pub fn build_with_transport(
        self,
        provider: impl IdentityProvider,
        transport: impl BackendTransport,
        sink: impl HostSink,
    ) -> AuthService {
        tracing::debug!(config = ?self.config, "starting auth service");
        AuthService {
            handle: spawn_engine(provider, transport, sink, self.config),
        }
    }
}

impl Default for AuthServiceBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A running auth engine.
///
/// The common calls are forwarded with [`PlaygateError`]; everything else
/// is on the [`AuthHandle`] from [`handle()`](Self::handle).
#[derive(Clone)]
pub struct AuthService {
    handle: AuthHandle,
}

impl AuthService {
    /// Creates a new builder.
    pub fn builder() -> AuthServiceBuilder {
        AuthServiceBuilder::new()
    }

    /// Returns a handle to the engine for direct use.
    pub fn handle(&self) -> AuthHandle {
        self.handle.clone()
    }

    /// Starts an attempt. The outcome is delivered to the sink.
    pub async fn begin(&self, params: AttemptParams) -> Result<AttemptId, PlaygateError> {
        Ok(self.handle.begin(params).await?)
    }

    pub async fn cancel(&self) -> Result<(), PlaygateError> {
        Ok(self.handle.cancel().await?)
    }

    pub async fn resolution_finished(&self, resolved: bool) -> Result<(), PlaygateError> {
        Ok(self.handle.resolution_finished(resolved).await?)
    }

    pub async fn snapshot(&self) -> Result<SessionSnapshot, PlaygateError> {
        Ok(self.handle.snapshot().await?)
    }

    pub async fn auth_params(&self) -> Result<HandshakeRequest, PlaygateError> {
        Ok(self.handle.auth_params().await?)
    }

    pub async fn auth_params_json(&self) -> Result<String, PlaygateError> {
        Ok(self.handle.auth_params_json().await?)
    }

    pub async fn award_achievement(&self, achievement_id: &str) -> Result<(), PlaygateError> {
        Ok(self.handle.award_achievement(achievement_id).await?)
    }

    pub async fn shutdown(&self) -> Result<(), PlaygateError> {
        Ok(self.handle.shutdown().await?)
    }
}
