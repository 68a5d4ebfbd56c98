//! Transport abstraction for outgoing sync messages.
//!
//! The simulation loop never touches sockets directly; it talks to a
//! [`Transport`] per connected client. Implementations:
//!
//! - [`ChannelTransport`]: in-proc unbounded channel, for tests and local
//!   tooling.
//! - `WsTransport` (in the server binary): a WebSocket connection's
//!   outgoing queue.

use tokio::sync::mpsc;

use crate::error::NetError;
use crate::messages::ServerMessage;

/// Capability interface over one client's outgoing half.
///
/// `send` must be non-blocking — it queues, it does not wait for delivery,
/// and the transport gives no delivery guarantee beyond per-connection
/// ordering. A closed transport is skipped for that tick's broadcast, never
/// an error that stops the loop.
pub trait Transport: Send {
    /// Queue a message for this client.
    ///
    /// # Errors
    ///
    /// Returns [`NetError::Closed`] if the connection is gone; the message
    /// is dropped.
    fn send(&self, msg: &ServerMessage) -> Result<(), NetError>;

    /// `true` while the connection can still accept messages.
    fn is_open(&self) -> bool;
}

/// In-process transport backed by an unbounded channel.
#[derive(Debug, Clone)]
pub struct ChannelTransport {
    tx: mpsc::UnboundedSender<ServerMessage>,
}

impl ChannelTransport {
    /// Create a transport and the receiving end of its queue.
    #[must_use]
    pub fn pair() -> (Self, mpsc::UnboundedReceiver<ServerMessage>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl Transport for ChannelTransport {
    fn send(&self, msg: &ServerMessage) -> Result<(), NetError> {
        self.tx.send(msg.clone()).map_err(|_| NetError::Closed)
    }

    fn is_open(&self) -> bool {
        !self.tx.is_closed()
    }
}
