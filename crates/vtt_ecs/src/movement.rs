//! Movement integration.
//!
//! A stateless per-tick system: for every alive entity with both a transform
//! and a movement component, advance the position by `velocity * dt` (plain
//! Euler). Bounds handling is deliberately not here — reflecting off a table
//! edge is a scenario rule that belongs to the server loop, not a general
//! engine rule.

use crate::world::{EntityCursor, World};

/// Advance every movable entity by one step of `dt` seconds.
///
/// When a movement component carries a non-zero `max_speed`, the velocity is
/// clamped to that magnitude for this step; the stored velocity itself is
/// left untouched.
pub fn integrate(world: &mut World, dt: f32) {
    let mut cursor = EntityCursor::new();
    while let Some(id) = cursor.next(world) {
        let Some(m) = world.movements().get(id) else {
            continue;
        };
        let (mut vx, mut vy) = (m.vx, m.vy);
        if m.max_speed > 0.0 {
            let speed = (vx * vx + vy * vy).sqrt();
            if speed > m.max_speed {
                let scale = m.max_speed / speed;
                vx *= scale;
                vy *= scale;
            }
        }
        world.transforms_mut().translate(id, vx * dt, vy * dt);
    }
}
