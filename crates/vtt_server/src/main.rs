//! # vtt-server
//!
//! The authoritative simulation server for tabletop sessions. It owns the
//! entity world, advances it on a fixed timestep, and streams per-client
//! AOI-filtered snapshots and deltas over WebSocket.
//!
//! ## Startup sequence
//!
//! 1. Parse arguments and seed the demo world.
//! 2. Spawn the simulation loop task (sole owner of world + sessions).
//! 3. Accept WebSocket connections, one task per client, feeding the loop
//!    through an event channel.

mod config;
mod session;
mod sim;
mod ws;

use anyhow::Result;
use clap::Parser;
use tokio::sync::mpsc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use config::Args;
use sim::SimServer;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .init();

    let args = Args::parse();
    let config = args.server_config();

    let (events_tx, events_rx) = mpsc::unbounded_channel();
    let sim = SimServer::new(config.clone(), events_rx)?;
    info!(
        tokens = config.tokens,
        capacity = config.capacity,
        "world seeded"
    );

    tokio::spawn(sim.run());
    ws::run_listener(&args.listen, config, events_tx).await?;

    Ok(())
}
