//! Per-connection session state and the events connection tasks feed into
//! the simulation loop.

use uuid::Uuid;
use vtt_net::{AoiConfig, ClientMessage, SyncSystem, Transport, Viewport};

/// One connected client, owned by the simulation loop.
///
/// Every session carries its own [`SyncSystem`] — deltas are diffed per
/// observer, so two sessions never share a baseline.
pub struct Session {
    /// Stable connection identifier.
    pub id: String,
    /// The connection's outgoing half.
    pub transport: Box<dyn Transport>,
    /// The client's camera viewport; starts wide open.
    pub viewport: Viewport,
    /// This observer's delta state.
    pub sync: SyncSystem,
    /// Send a full snapshot instead of a delta on the next tick. Set at
    /// connect and again on RESYNC.
    pub needs_snapshot: bool,
}

impl Session {
    /// Create a session for a freshly accepted connection.
    #[must_use]
    pub fn new(transport: Box<dyn Transport>, aoi: AoiConfig) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            transport,
            viewport: Viewport::default(),
            sync: SyncSystem::new(aoi),
            needs_snapshot: true,
        }
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("viewport", &self.viewport)
            .field("needs_snapshot", &self.needs_snapshot)
            .finish_non_exhaustive()
    }
}

/// Events from connection tasks into the simulation loop. Applied between
/// ticks; a viewport update may therefore lag the in-progress tick by at
/// most one tick.
#[derive(Debug)]
pub enum SessionEvent {
    /// A connection completed its WebSocket handshake.
    Connected {
        /// The new session, transport included.
        session: Session,
    },
    /// A parsed client message.
    Message {
        /// The originating session.
        id: String,
        /// The decoded message.
        msg: ClientMessage,
    },
    /// The connection closed or failed.
    Disconnected {
        /// The session to remove.
        id: String,
    },
}
