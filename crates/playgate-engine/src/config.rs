//! Engine configuration.

use std::time::Duration;

use playgate_transport::DEFAULT_CONNECT_TIMEOUT;
use serde::{Deserialize, Serialize};

/// The provider name sent as `network` in every handshake.
pub const DEFAULT_NETWORK: &str = "GOOGLE";

// ---------------------------------------------------------------------------
// EngineConfig
// ---------------------------------------------------------------------------

/// Configuration for an engine instance.
///
/// Fixed for the engine's lifetime. Per-attempt values (client id, backend
/// URL) travel with each `begin` in
/// [`AttemptParams`](playgate_session::AttemptParams) instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Identity-provider name the backend sees as `network`.
    pub network: String,

    /// How long the handshake waits for the backend to accept a connection.
    pub connect_timeout: Duration,

    /// Capacity of the engine's command channel. Senders wait when it is
    /// full. Zero is treated as one.
    pub channel_size: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            network: DEFAULT_NETWORK.to_string(),
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            channel_size: 64,
        }
    }
}
