//! World state — entity lifecycle and composition of the component stores.
//!
//! The [`World`] is the single owner of all simulation state. It allocates
//! entity ids (reusing freed ids LIFO), tracks liveness, and guarantees by
//! construction that no id at or beyond the declared capacity is ever handed
//! out — which is what lets the stores skip bounds checks.

use thiserror::Error;

use crate::entity::Entity;
use crate::store::{AppearanceStore, MovementStore, TransformStore};

/// Errors raised by [`World`] operations.
#[derive(Debug, Error)]
pub enum WorldError {
    /// `create` was called when every id below the capacity is alive.
    #[error("entity capacity exceeded ({capacity})")]
    CapacityExceeded {
        /// The configured maximum entity count.
        capacity: u32,
    },
}

/// The entity-component world.
#[derive(Debug)]
pub struct World {
    capacity: u32,
    /// Liveness per id. An id is valid iff its slot is `true`.
    alive: Vec<bool>,
    /// Freed ids awaiting reuse, popped LIFO.
    free: Vec<Entity>,
    /// High-water mark: ids in `0..next` have been allocated at least once.
    next: u32,
    transforms: TransformStore,
    movements: MovementStore,
    appearances: AppearanceStore,
}

impl World {
    /// Create an empty world with room for `capacity` simultaneous entities.
    #[must_use]
    pub fn new(capacity: u32) -> Self {
        let cap = capacity as usize;
        Self {
            capacity,
            alive: vec![false; cap],
            free: Vec::new(),
            next: 0,
            transforms: TransformStore::with_capacity(cap),
            movements: MovementStore::with_capacity(cap),
            appearances: AppearanceStore::with_capacity(cap),
        }
    }

    /// The configured maximum entity count.
    #[must_use]
    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    /// Exclusive upper bound over every id allocated so far. Iterating
    /// `0..id_bound()` covers all ids that can possibly be alive.
    #[must_use]
    pub fn id_bound(&self) -> u32 {
        self.next
    }

    /// Allocate a fresh entity id.
    ///
    /// Reuses the most recently freed id if any, otherwise takes the next
    /// unused integer.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::CapacityExceeded`] when every id below the
    /// capacity is already alive.
    pub fn create(&mut self) -> Result<Entity, WorldError> {
        let id = if let Some(id) = self.free.pop() {
            id
        } else if self.next < self.capacity {
            let id = Entity(self.next);
            self.next += 1;
            id
        } else {
            return Err(WorldError::CapacityExceeded {
                capacity: self.capacity,
            });
        };
        self.alive[id.index()] = true;
        Ok(id)
    }

    /// Destroy an entity, detaching every component and returning the id to
    /// the free list. Idempotent — destroying a dead id is a no-op.
    pub fn destroy(&mut self, id: Entity) {
        if !self.is_alive(id) {
            return;
        }
        self.alive[id.index()] = false;
        self.transforms.remove(id);
        self.movements.remove(id);
        self.appearances.remove(id);
        self.free.push(id);
    }

    /// O(1) liveness check. Ids that were never allocated are not alive.
    #[must_use]
    pub fn is_alive(&self, id: Entity) -> bool {
        self.alive.get(id.index()).copied().unwrap_or(false)
    }

    /// Number of currently alive entities.
    #[must_use]
    pub fn alive_count(&self) -> usize {
        self.next as usize - self.free.len()
    }

    /// The transform store.
    #[must_use]
    pub fn transforms(&self) -> &TransformStore {
        &self.transforms
    }

    /// The transform store, mutable.
    pub fn transforms_mut(&mut self) -> &mut TransformStore {
        &mut self.transforms
    }

    /// The movement store.
    #[must_use]
    pub fn movements(&self) -> &MovementStore {
        &self.movements
    }

    /// The movement store, mutable.
    pub fn movements_mut(&mut self) -> &mut MovementStore {
        &mut self.movements
    }

    /// The appearance store.
    #[must_use]
    pub fn appearances(&self) -> &AppearanceStore {
        &self.appearances
    }

    /// The appearance store, mutable.
    pub fn appearances_mut(&mut self) -> &mut AppearanceStore {
        &mut self.appearances
    }

    /// Iterate alive entities that have both a transform and a movement
    /// component. Convenience wrapper over [`EntityCursor`] for read-only
    /// callers.
    pub fn movables(&self) -> impl Iterator<Item = Entity> + '_ {
        let mut cursor = EntityCursor::new();
        std::iter::from_fn(move || cursor.next(self))
    }
}

/// A restartable cursor over alive entities with both transform and movement
/// components.
///
/// Unlike a borrowing iterator, the cursor holds no reference to the world,
/// so a tick loop can interleave `next` calls with store mutations without
/// fighting the borrow checker — and without allocating a candidate list
/// every tick.
#[derive(Debug, Default)]
pub struct EntityCursor {
    next: u32,
}

impl EntityCursor {
    /// A cursor positioned before the first entity.
    #[must_use]
    pub fn new() -> Self {
        Self { next: 0 }
    }

    /// Advance to the next matching entity, or `None` when exhausted.
    pub fn next(&mut self, world: &World) -> Option<Entity> {
        while self.next < world.id_bound() {
            let id = Entity(self.next);
            self.next += 1;
            if world.is_alive(id) && world.transforms.has(id) && world.movements.has(id) {
                return Some(id);
            }
        }
        None
    }

    /// Rewind to the first entity, making the cursor reusable next tick.
    pub fn reset(&mut self) {
        self.next = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{Movement, Transform2D};

    #[test]
    fn test_create_assigns_dense_ids() {
        let mut world = World::new(4);
        assert_eq!(world.create().unwrap(), Entity(0));
        assert_eq!(world.create().unwrap(), Entity(1));
        assert_eq!(world.create().unwrap(), Entity(2));
        assert_eq!(world.alive_count(), 3);
    }

    #[test]
    fn test_destroy_then_create_reuses_id_lifo() {
        let mut world = World::new(4);
        let a = world.create().unwrap();
        let b = world.create().unwrap();
        world.destroy(a);
        world.destroy(b);
        // LIFO: the most recently freed id comes back first.
        assert_eq!(world.create().unwrap(), b);
        assert_eq!(world.create().unwrap(), a);
    }

    #[test]
    fn test_destroy_detaches_components_before_reuse() {
        let mut world = World::new(2);
        let e = world.create().unwrap();
        world.transforms_mut().add(e, Transform2D::at(1.0, 2.0));
        world.movements_mut().add(e, Movement::velocity(3.0, 0.0));

        world.destroy(e);
        assert!(!world.is_alive(e));

        let reused = world.create().unwrap();
        assert_eq!(reused, e);
        assert!(!world.transforms().has(reused));
        assert!(!world.movements().has(reused));
        assert!(world.transforms().get(reused).is_none());
    }

    #[test]
    fn test_capacity_exceeded() {
        let mut world = World::new(2);
        world.create().unwrap();
        world.create().unwrap();
        let err = world.create().unwrap_err();
        assert!(matches!(err, WorldError::CapacityExceeded { capacity: 2 }));
    }

    #[test]
    fn test_capacity_accounts_for_reuse() {
        let mut world = World::new(2);
        let a = world.create().unwrap();
        world.create().unwrap();
        world.destroy(a);
        // One slot free again, so one more create succeeds, then it is full.
        world.create().unwrap();
        assert!(world.create().is_err());
    }

    #[test]
    fn test_destroy_is_idempotent() {
        let mut world = World::new(2);
        let e = world.create().unwrap();
        world.destroy(e);
        world.destroy(e);
        // The id was only returned to the free list once.
        assert_eq!(world.create().unwrap(), e);
        assert_eq!(world.create().unwrap(), Entity(1));
    }

    #[test]
    fn test_is_alive_out_of_range() {
        let world = World::new(2);
        assert!(!world.is_alive(Entity(0)));
        assert!(!world.is_alive(Entity(99)));
    }

    #[test]
    fn test_cursor_yields_only_movables() {
        let mut world = World::new(8);
        let moving = world.create().unwrap();
        let static_prop = world.create().unwrap();
        let bare = world.create().unwrap();
        world.transforms_mut().add(moving, Transform2D::at(0.0, 0.0));
        world.movements_mut().add(moving, Movement::velocity(1.0, 0.0));
        world
            .transforms_mut()
            .add(static_prop, Transform2D::at(5.0, 5.0));
        let _ = bare;

        let found: Vec<Entity> = world.movables().collect();
        assert_eq!(found, vec![moving]);
    }

    #[test]
    fn test_cursor_is_restartable() {
        let mut world = World::new(4);
        for _ in 0..2 {
            let e = world.create().unwrap();
            world.transforms_mut().add(e, Transform2D::default());
            world.movements_mut().add(e, Movement::default());
        }

        let mut cursor = EntityCursor::new();
        let mut first_pass = 0;
        while cursor.next(&world).is_some() {
            first_pass += 1;
        }
        assert_eq!(first_pass, 2);
        assert!(cursor.next(&world).is_none());

        cursor.reset();
        assert_eq!(cursor.next(&world), Some(Entity(0)));
    }
}
