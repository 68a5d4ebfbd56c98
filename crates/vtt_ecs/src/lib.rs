//! # vtt_ecs
//!
//! The entity-component world at the heart of the tabletop simulation.
//!
//! This crate provides:
//!
//! - [`Entity`] — dense `u32` entity identifiers, reused via a free list.
//! - [`World`] — entity lifecycle, liveness tracking, and the component
//!   stores, bounded by a fixed capacity.
//! - Component stores ([`TransformStore`], [`MovementStore`],
//!   [`AppearanceStore`]) — struct-of-arrays containers indexed by entity id.
//! - [`EntityCursor`] — allocation-free iteration over movable entities.
//! - [`movement`] — the per-tick Euler integrator.
//!
//! The crate is deliberately synchronous and I/O-free; networking and tick
//! scheduling live in `vtt_net` and `vtt_server`.

pub mod entity;
pub mod movement;
pub mod store;
pub mod world;

pub use entity::Entity;
pub use store::{
    Appearance, AppearanceStore, Movement, MovementStore, Transform2D, TransformStore,
};
pub use world::{EntityCursor, World, WorldError};
