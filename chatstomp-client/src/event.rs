//! Client lifecycle events
//!
//! Every state transition the client goes through is reported to one
//! [`EventListener`] after the transition has completed.

use chatstomp_core::Frame;
use tokio::sync::mpsc::UnboundedSender;

/// Something the client did or observed
#[derive(Debug, Clone, PartialEq)]
pub enum ClientEvent {
    /// The transport opened and CONNECT was written
    Opened,
    /// The server accepted the handshake
    Connected(Frame),
    /// The server reported a protocol error
    ErrorFrame(Frame),
    /// The transport reported a failure
    TransportError(String),
    /// A MESSAGE frame was handed to its subscription callback
    MessageDelivered {
        /// Subscription the frame was routed to
        subscription: String,
        /// The delivered frame
        frame: Frame,
    },
    /// The connection was torn down
    Closed,
}

/// Why a connection attempt failed
#[derive(Debug, Clone, PartialEq)]
pub enum ConnectFailure {
    /// The server answered with an ERROR frame
    ErrorFrame(Frame),
    /// The transport failed
    Transport(String),
}

impl ConnectFailure {
    /// Human readable reason
    pub fn message(&self) -> &str {
        match self {
            ConnectFailure::ErrorFrame(frame) => frame
                .headers
                .message()
                .unwrap_or(frame.body.as_str()),
            ConnectFailure::Transport(reason) => reason,
        }
    }
}

/// Receiver of [`ClientEvent`]s
pub trait EventListener: Send {
    /// Called once per event, in order
    fn on_event(&mut self, event: &ClientEvent);
}

impl<F> EventListener for F
where
    F: FnMut(&ClientEvent) + Send,
{
    fn on_event(&mut self, event: &ClientEvent) {
        self(event)
    }
}

impl EventListener for UnboundedSender<ClientEvent> {
    fn on_event(&mut self, event: &ClientEvent) {
        if self.send(event.clone()).is_err() {
            tracing::trace!("event receiver dropped");
        }
    }
}
