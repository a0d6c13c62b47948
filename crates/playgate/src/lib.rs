//! # Playgate
//!
//! Three-stage authentication for game clients: identity-provider login,
//! bearer-token exchange, and a handshake with your own backend.
//!
//! The host implements [`IdentityProvider`](playgate_session::IdentityProvider)
//! on top of its provider SDK and a [`HostSink`](playgate_engine::HostSink)
//! to receive `LoginResult` / `PlayerChange` events. Playgate runs the
//! stages, applies the convergence rule, and talks to the backend.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use playgate::prelude::*;
//!
//! // Implement IdentityProvider for your provider, then:
//! // let (sink, mut events) = ChannelSink::new();
//! // let service = AuthService::builder().build(my_provider, sink)?;
//! // service.begin(AttemptParams::new(client_id, server_url)).await?;
//! // while let Some(message) = events.recv().await { ... }
//! ```

mod error;
mod service;
mod telemetry;

pub use error::PlaygateError;
pub use service::{AuthService, AuthServiceBuilder};
pub use telemetry::init_tracing;

pub use playgate_engine as engine;
pub use playgate_protocol as protocol;
pub use playgate_session as session;
pub use playgate_transport as transport;

pub mod prelude {
    pub use crate::{AuthService, AuthServiceBuilder, PlaygateError, init_tracing};
    pub use playgate_engine::{
        AttemptId, AuthHandle, ChannelSink, EngineConfig, HostSink, SinkMessage,
    };
    pub use playgate_protocol::{HandshakeRequest, HostEvent, LoginResult, ServerPlayer};
    pub use playgate_session::{
        AttemptParams, IdentityProvider, LoginInfo, Resolution, ResolutionStage,
        SessionError, SessionSnapshot, SignIn, StatusUpdate, SubStatus,
    };
}
