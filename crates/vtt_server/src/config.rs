//! Server configuration.

use clap::Parser;
use vtt_net::AoiConfig;

/// Command-line arguments for the simulation server.
#[derive(Debug, Parser)]
#[command(name = "vtt-server", about = "Real-time entity sync server for tabletop sessions")]
pub struct Args {
    /// Address to listen on for WebSocket connections
    #[arg(short, long, default_value = "127.0.0.1:9001")]
    pub listen: String,

    /// Fixed simulation steps per second
    #[arg(long, default_value_t = 10.0)]
    pub tick_rate: f64,

    /// Clock poll interval in milliseconds
    #[arg(long, default_value_t = 10)]
    pub poll_ms: u64,

    /// Maximum number of simultaneous entities
    #[arg(long, default_value_t = 10_000)]
    pub capacity: u32,

    /// Number of demo tokens to seed at startup
    #[arg(long, default_value_t = 64)]
    pub tokens: u32,

    /// Half-extent of the square bound tokens bounce off
    #[arg(long, default_value_t = 1_000.0)]
    pub bound: f32,

    /// Fraction of a client's requested camera span that is visible
    #[arg(long, default_value_t = 0.6)]
    pub view_scale: f32,

    /// Hard cap on entities sent to one client per tick
    #[arg(long, default_value_t = 2_500)]
    pub max_visible: usize,
}

impl Args {
    /// Collect the simulation-facing settings.
    #[must_use]
    pub fn server_config(&self) -> ServerConfig {
        ServerConfig {
            tick_rate: self.tick_rate,
            poll_ms: self.poll_ms,
            capacity: self.capacity,
            tokens: self.tokens,
            bound: self.bound,
            aoi: AoiConfig {
                view_scale: self.view_scale,
                max_visible: self.max_visible,
            },
        }
    }
}

/// Settings the simulation loop and connection handlers run with.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Fixed simulation steps per second.
    pub tick_rate: f64,
    /// Clock poll interval in milliseconds.
    pub poll_ms: u64,
    /// Maximum number of simultaneous entities.
    pub capacity: u32,
    /// Number of demo tokens seeded at startup.
    pub tokens: u32,
    /// Half-extent of the square bounce bound.
    pub bound: f32,
    /// Per-client visibility tunables.
    pub aoi: AoiConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            tick_rate: 10.0,
            poll_ms: 10,
            capacity: 10_000,
            tokens: 64,
            bound: 1_000.0,
            aoi: AoiConfig::default(),
        }
    }
}
