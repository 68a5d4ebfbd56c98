//! # vtt_net
//!
//! Network synchronization layer for the tabletop simulation.
//!
//! This crate provides:
//!
//! - [`messages`] — wire message types (JSON-over-WebSocket protocol).
//! - [`codec`] — JSON serialisation/deserialisation helpers.
//! - [`compare`] — the epsilon float-equality policy used for diffing.
//! - [`sync`] — [`SyncSystem`], the per-observer created/updated/removed
//!   delta computation.
//! - [`aoi`] — per-client area-of-interest viewport filtering.
//! - [`transport`] — the capability trait a concrete connection adapter
//!   implements.
//! - [`error`] — network-layer error types.

pub mod aoi;
pub mod codec;
pub mod compare;
pub mod error;
pub mod messages;
pub mod sync;
pub mod transport;

pub use aoi::{AoiConfig, Rect, Viewport};
pub use codec::{decode, encode};
pub use compare::{approx_eq, EPSILON};
pub use error::NetError;
pub use messages::{ClientMessage, EntityState, ServerMessage, Snapshot, StateDelta};
pub use sync::SyncSystem;
pub use transport::{ChannelTransport, Transport};
