//! Struct-of-arrays component stores.
//!
//! Each store keeps one pre-allocated vector per attribute, sized to the
//! world's entity capacity, plus a parallel `present` vector. `remove` only
//! clears the presence flag — stale values may remain in the attribute
//! vectors, and `add` rewrites every field, so a reused id can never observe
//! a previous tenant's data. `has` gates all reads.
//!
//! Stores do not bounds-check ids against their capacity. The
//! [`World`](crate::World) never hands out an id at or beyond capacity, so
//! an out-of-range index here is a caller bug and panics.

use crate::entity::Entity;

/// Spatial placement of an entity on the table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform2D {
    /// World-space position.
    pub x: f32,
    /// World-space position.
    pub y: f32,
    /// Rotation in radians.
    pub rot: f32,
    /// Non-uniform scale.
    pub sx: f32,
    /// Non-uniform scale.
    pub sy: f32,
    /// Draw-order layer.
    pub z_index: i32,
}

impl Default for Transform2D {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            rot: 0.0,
            sx: 1.0,
            sy: 1.0,
            z_index: 0,
        }
    }
}

impl Transform2D {
    /// A transform at the given position with default rotation and scale.
    #[must_use]
    pub fn at(x: f32, y: f32) -> Self {
        Self {
            x,
            y,
            ..Self::default()
        }
    }
}

/// Linear velocity, integrated into [`Transform2D`] each tick.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Movement {
    /// Velocity in world units per second.
    pub vx: f32,
    /// Velocity in world units per second.
    pub vy: f32,
    /// Speed cap applied before integration. `0.0` means uncapped.
    pub max_speed: f32,
}

impl Movement {
    /// A movement component with the given velocity and no speed cap.
    #[must_use]
    pub fn velocity(vx: f32, vy: f32) -> Self {
        Self {
            vx,
            vy,
            max_speed: 0.0,
        }
    }
}

/// Visual attributes. Written by game logic, read-only to the sync layer.
///
/// Discrete fields use `-1` as the "not set" sentinel so they survive a trip
/// through the flattened wire representation unchanged.
#[derive(Debug, Clone, PartialEq)]
pub struct Appearance {
    /// Sprite sheet index, `-1` if unset.
    pub sprite: i32,
    /// Animation frame, `-1` if unset.
    pub frame: i32,
    /// RGB tint channels, `-1` per channel if unset.
    pub tint: [i32; 3],
    /// Opacity in `[0, 1]`.
    pub alpha: f32,
    /// Optional CSS-style colour string.
    pub color: Option<String>,
}

impl Default for Appearance {
    fn default() -> Self {
        Self {
            sprite: -1,
            frame: -1,
            tint: [-1, -1, -1],
            alpha: 1.0,
            color: None,
        }
    }
}

/// Store for [`Transform2D`] components.
#[derive(Debug)]
pub struct TransformStore {
    x: Vec<f32>,
    y: Vec<f32>,
    rot: Vec<f32>,
    sx: Vec<f32>,
    sy: Vec<f32>,
    z_index: Vec<i32>,
    present: Vec<bool>,
}

impl TransformStore {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            x: vec![0.0; capacity],
            y: vec![0.0; capacity],
            rot: vec![0.0; capacity],
            sx: vec![1.0; capacity],
            sy: vec![1.0; capacity],
            z_index: vec![0; capacity],
            present: vec![false; capacity],
        }
    }

    /// Attach (or overwrite) the transform for `id`. Every field is written,
    /// including defaults.
    pub fn add(&mut self, id: Entity, t: Transform2D) {
        let i = id.index();
        self.x[i] = t.x;
        self.y[i] = t.y;
        self.rot[i] = t.rot;
        self.sx[i] = t.sx;
        self.sy[i] = t.sy;
        self.z_index[i] = t.z_index;
        self.present[i] = true;
    }

    /// Detach the component. Attribute values are left stale by design.
    pub fn remove(&mut self, id: Entity) {
        self.present[id.index()] = false;
    }

    /// O(1) presence check — the single source of truth for reads.
    #[must_use]
    pub fn has(&self, id: Entity) -> bool {
        self.present[id.index()]
    }

    /// Copy out the transform, or `None` if the entity has no transform.
    #[must_use]
    pub fn get(&self, id: Entity) -> Option<Transform2D> {
        let i = id.index();
        if !self.present[i] {
            return None;
        }
        Some(Transform2D {
            x: self.x[i],
            y: self.y[i],
            rot: self.rot[i],
            sx: self.sx[i],
            sy: self.sy[i],
            z_index: self.z_index[i],
        })
    }

    /// Move the entity by the given offset. No-op if the component is absent.
    pub fn translate(&mut self, id: Entity, dx: f32, dy: f32) {
        let i = id.index();
        if self.present[i] {
            self.x[i] += dx;
            self.y[i] += dy;
        }
    }

    /// Set the position directly. No-op if the component is absent.
    pub fn set_position(&mut self, id: Entity, x: f32, y: f32) {
        let i = id.index();
        if self.present[i] {
            self.x[i] = x;
            self.y[i] = y;
        }
    }
}

/// Store for [`Movement`] components.
#[derive(Debug)]
pub struct MovementStore {
    vx: Vec<f32>,
    vy: Vec<f32>,
    max_speed: Vec<f32>,
    present: Vec<bool>,
}

impl MovementStore {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            vx: vec![0.0; capacity],
            vy: vec![0.0; capacity],
            max_speed: vec![0.0; capacity],
            present: vec![false; capacity],
        }
    }

    /// Attach (or overwrite) the movement component for `id`.
    pub fn add(&mut self, id: Entity, m: Movement) {
        let i = id.index();
        self.vx[i] = m.vx;
        self.vy[i] = m.vy;
        self.max_speed[i] = m.max_speed;
        self.present[i] = true;
    }

    /// Detach the component.
    pub fn remove(&mut self, id: Entity) {
        self.present[id.index()] = false;
    }

    /// O(1) presence check.
    #[must_use]
    pub fn has(&self, id: Entity) -> bool {
        self.present[id.index()]
    }

    /// Copy out the movement component, or `None` if absent.
    #[must_use]
    pub fn get(&self, id: Entity) -> Option<Movement> {
        let i = id.index();
        if !self.present[i] {
            return None;
        }
        Some(Movement {
            vx: self.vx[i],
            vy: self.vy[i],
            max_speed: self.max_speed[i],
        })
    }

    /// Replace the velocity. No-op if the component is absent.
    pub fn set_velocity(&mut self, id: Entity, vx: f32, vy: f32) {
        let i = id.index();
        if self.present[i] {
            self.vx[i] = vx;
            self.vy[i] = vy;
        }
    }
}

/// Store for [`Appearance`] components.
#[derive(Debug)]
pub struct AppearanceStore {
    sprite: Vec<i32>,
    frame: Vec<i32>,
    tint_r: Vec<i32>,
    tint_g: Vec<i32>,
    tint_b: Vec<i32>,
    alpha: Vec<f32>,
    color: Vec<Option<String>>,
    present: Vec<bool>,
}

impl AppearanceStore {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            sprite: vec![-1; capacity],
            frame: vec![-1; capacity],
            tint_r: vec![-1; capacity],
            tint_g: vec![-1; capacity],
            tint_b: vec![-1; capacity],
            alpha: vec![1.0; capacity],
            color: vec![None; capacity],
            present: vec![false; capacity],
        }
    }

    /// Attach (or overwrite) the appearance for `id`.
    pub fn add(&mut self, id: Entity, a: Appearance) {
        let i = id.index();
        self.sprite[i] = a.sprite;
        self.frame[i] = a.frame;
        self.tint_r[i] = a.tint[0];
        self.tint_g[i] = a.tint[1];
        self.tint_b[i] = a.tint[2];
        self.alpha[i] = a.alpha;
        self.color[i] = a.color;
        self.present[i] = true;
    }

    /// Detach the component.
    pub fn remove(&mut self, id: Entity) {
        self.present[id.index()] = false;
    }

    /// O(1) presence check.
    #[must_use]
    pub fn has(&self, id: Entity) -> bool {
        self.present[id.index()]
    }

    /// Clone out the appearance, or `None` if absent.
    #[must_use]
    pub fn get(&self, id: Entity) -> Option<Appearance> {
        let i = id.index();
        if !self.present[i] {
            return None;
        }
        Some(Appearance {
            sprite: self.sprite[i],
            frame: self.frame[i],
            tint: [self.tint_r[i], self.tint_g[i], self.tint_b[i]],
            alpha: self.alpha[i],
            color: self.color[i].clone(),
        })
    }
}
