//! Where the engine's notifications go.

use playgate_protocol::HostEvent;
use playgate_session::Resolution;
use tokio::sync::mpsc;

/// The host side of the engine.
///
/// Called from inside the engine task, so implementations must return
/// quickly: hand the event off, don't process it in place.
pub trait HostSink: Send + Sync + 'static {
    /// Delivers a `LoginResult` or `PlayerChange` event.
    fn notify(&self, event: HostEvent);

    /// Asks the host to let the user resolve something. The host answers
    /// later through `AuthHandle::resolution_finished`.
    ///
    /// Hosts without any UI can leave this as is; the attempt then waits
    /// until it is cancelled or superseded.
    fn request_resolution(&self, resolution: Resolution) {
        tracing::warn!(%resolution, "resolution requested but host cannot show one");
    }
}

/// Everything a [`ChannelSink`] forwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkMessage {
    Event(HostEvent),
    Resolution(Resolution),
}

/// A [`HostSink`] that forwards into an unbounded channel.
///
/// Unbounded so the engine never waits on a slow host. Messages sent
/// after the receiver is dropped are discarded.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    sender: mpsc::UnboundedSender<SinkMessage>,
}

impl ChannelSink {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<SinkMessage>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }
}

impl HostSink for ChannelSink {
    fn notify(&self, event: HostEvent) {
        let _ = self.sender.send(SinkMessage::Event(event));
    }

    fn request_resolution(&self, resolution: Resolution) {
        let _ = self.sender.send(SinkMessage::Resolution(resolution));
    }
}
