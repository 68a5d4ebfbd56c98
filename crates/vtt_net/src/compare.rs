//! Float equality policy for diffing.
//!
//! Positions drift by sub-visible amounts every tick from floating-point
//! noise alone; resending an entity for that would defeat the delta
//! protocol. Float fields therefore compare with an epsilon tolerance, while
//! discrete fields compare exactly.

use crate::messages::EntityState;

/// Tolerance below which two float field values count as equal.
pub const EPSILON: f32 = 1e-4;

/// Epsilon-tolerant float equality.
#[must_use]
pub fn approx_eq(a: f32, b: f32) -> bool {
    (a - b).abs() < EPSILON
}

/// Field-wise entity state equality under the diffing policy: floats within
/// [`EPSILON`], discrete fields exact.
#[must_use]
pub fn state_eq(a: &EntityState, b: &EntityState) -> bool {
    a.id == b.id
        && approx_eq(a.x, b.x)
        && approx_eq(a.y, b.y)
        && approx_eq(a.rot, b.rot)
        && approx_eq(a.sx, b.sx)
        && approx_eq(a.sy, b.sy)
        && approx_eq(a.alpha, b.alpha)
        && a.z_index == b.z_index
        && a.sprite == b.sprite
        && a.frame == b.frame
        && a.tint == b.tint
        && a.color == b.color
}
