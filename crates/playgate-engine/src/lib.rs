//! The convergence engine for Playgate.
//!
//! One engine runs as a single Tokio task (actor model) that owns the
//! [`AuthSession`](playgate_session::AuthSession). Every sub-status change,
//! from the engine's own stages or from the host, goes through that task,
//! so the convergence rule always sees one linear history.
//!
//! # Key types
//!
//! - [`spawn_engine`] / [`AuthHandle`]: start the engine, talk to it
//! - [`HostSink`]: where `LoginResult` / `PlayerChange` events go
//! - [`BackendClient`]: the backend handshake
//! - [`EngineConfig`]: provider name, connect timeout, channel size

mod config;
mod engine;
mod error;
mod exchange;
mod handshake;
mod sink;

pub use config::{DEFAULT_NETWORK, EngineConfig};
pub use engine::{AttemptId, AuthHandle, spawn_engine};
pub use error::{EngineError, HandshakeError};
pub use exchange::{ExchangeOutcome, exchange_inline, exchange_token};
pub use handshake::{BackendClient, HandshakeReply};
pub use sink::{ChannelSink, HostSink, SinkMessage};
