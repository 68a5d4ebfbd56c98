//! WebSocket listener and per-connection tasks.
//!
//! Each accepted connection gets its own task: the receiving half parses
//! JSON text frames into [`ClientMessage`]s and forwards them to the
//! simulation loop as [`SessionEvent`]s; the sending half pumps the
//! session's outgoing queue into the socket. Malformed frames are logged at
//! debug and dropped — one bad client message must never crash or stall the
//! tick loop, and nothing is echoed back to the sender.

use anyhow::Result;
use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, info};

use vtt_net::{codec, ClientMessage, NetError, ServerMessage, Transport};

use crate::config::ServerConfig;
use crate::session::{Session, SessionEvent};

/// A WebSocket connection's outgoing queue, seen from the simulation loop.
pub struct WsTransport {
    tx: mpsc::UnboundedSender<ServerMessage>,
}

impl Transport for WsTransport {
    fn send(&self, msg: &ServerMessage) -> Result<(), NetError> {
        self.tx.send(msg.clone()).map_err(|_| NetError::Closed)
    }

    fn is_open(&self) -> bool {
        !self.tx.is_closed()
    }
}

/// Accept WebSocket connections forever, spawning one task per client.
///
/// # Errors
///
/// Returns an error only if binding the listen address fails; per-connection
/// errors are contained in their own tasks.
pub async fn run_listener(
    addr: &str,
    config: ServerConfig,
    events: mpsc::UnboundedSender<SessionEvent>,
) -> Result<()> {
    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "listening for WebSocket connections");

    loop {
        let (stream, peer) = listener.accept().await?;
        let events = events.clone();
        let config = config.clone();
        tokio::spawn(async move {
            if let Err(e) = handle_connection(stream, config, events).await {
                debug!(%peer, error = %e, "connection ended");
            }
        });
    }
}

async fn handle_connection(
    stream: TcpStream,
    config: ServerConfig,
    events: mpsc::UnboundedSender<SessionEvent>,
) -> Result<()> {
    let ws = tokio_tungstenite::accept_async(stream).await?;
    let (mut sink, mut source) = ws.split();

    let (tx, mut rx) = mpsc::unbounded_channel::<ServerMessage>();
    let session = Session::new(Box::new(WsTransport { tx }), config.aoi);
    let id = session.id.clone();
    info!(client = %id, "client connected");

    // The simulation loop takes ownership of the session and will send
    // the HELLO handshake through the queue we just handed over.
    if events.send(SessionEvent::Connected { session }).is_err() {
        return Ok(());
    }

    // Outgoing pump: queue -> socket. Ends when the queue or socket closes.
    let writer = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            let text = match codec::encode(&msg) {
                Ok(text) => text,
                Err(e) => {
                    debug!(error = %e, "dropping unencodable message");
                    continue;
                }
            };
            if sink.send(Message::Text(text)).await.is_err() {
                break;
            }
        }
    });

    // Incoming loop: socket -> simulation events.
    while let Some(frame) = source.next().await {
        let frame = match frame {
            Ok(frame) => frame,
            Err(_) => break,
        };
        let text = match frame {
            Message::Text(text) => text,
            Message::Close(_) => break,
            // Ping/pong are handled by tungstenite; binary frames are not
            // part of the protocol.
            _ => continue,
        };
        match codec::decode::<ClientMessage>(&text) {
            Ok(msg) => {
                if events
                    .send(SessionEvent::Message {
                        id: id.clone(),
                        msg,
                    })
                    .is_err()
                {
                    break;
                }
            }
            Err(e) => debug!(client = %id, error = %e, "ignoring malformed message"),
        }
    }

    info!(client = %id, "client disconnected");
    let _ = events.send(SessionEvent::Disconnected { id });
    writer.abort();
    Ok(())
}
