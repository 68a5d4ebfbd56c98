//! Per-observer delta synchronization.
//!
//! A [`SyncSystem`] diffs the world against the snapshot it emitted last
//! tick and classifies every visible entity as created, updated, or removed.
//! It only ever diffs against the immediately previous tick: `last` is a
//! single map, not a history ring, so memory stays O(visible entities) and
//! the diff is one pass. The trade-off is that a client must apply every
//! delta in order or fall back to a full snapshot — there is no resuming
//! from an arbitrary past sequence number.
//!
//! One instance per observer. Sharing an instance between viewers corrupts
//! the diff baseline for all but one of them, because each `update` replaces
//! `last` with that viewer's visible set.

use std::collections::HashMap;

use glam::Vec2;
use vtt_ecs::{Entity, World};

use crate::aoi::{AoiConfig, Viewport};
use crate::compare::state_eq;
use crate::messages::{EntityState, Snapshot, StateDelta};

/// Computes per-tick state deltas for one observer's view of the world.
#[derive(Debug)]
pub struct SyncSystem {
    /// Sequence number of the last emitted state; starts at 0.
    seq: u64,
    /// The entity states emitted last tick, keyed by id.
    last: HashMap<Entity, EntityState>,
    aoi: AoiConfig,
}

impl SyncSystem {
    /// Create a sync system with the given visibility tunables.
    #[must_use]
    pub fn new(aoi: AoiConfig) -> Self {
        Self {
            seq: 0,
            last: HashMap::new(),
            aoi,
        }
    }

    /// The current sequence number.
    #[must_use]
    pub fn seq(&self) -> u64 {
        self.seq
    }

    /// Diff the world against last tick's view and advance the sequence.
    ///
    /// An entity is visible to this pass iff it is alive, has a transform
    /// (the sole criterion for network visibility — entities without one do
    /// not exist to the network layer), and its position lies inside the
    /// viewport's scaled rectangle. At most `max_visible` entities are kept,
    /// in ascending id order; the rest are dropped for this tick.
    pub fn update(&mut self, world: &World, view: &Viewport) -> StateDelta {
        let rect = view.view_rect(self.aoi.view_scale);

        let mut next = HashMap::with_capacity(self.last.len());
        let mut created = Vec::new();
        let mut updated = Vec::new();

        for raw in 0..world.id_bound() {
            let id = Entity::from_raw(raw);
            if !world.is_alive(id) {
                continue;
            }
            let Some(t) = world.transforms().get(id) else {
                continue;
            };
            if !rect.contains(Vec2::new(t.x, t.y)) {
                continue;
            }
            if next.len() >= self.aoi.max_visible {
                break;
            }

            let appearance = world.appearances().get(id);
            let state = EntityState::capture(id, t, appearance.as_ref());
            match self.last.get(&id) {
                None => created.push(state.clone()),
                Some(prev) if !state_eq(prev, &state) => updated.push(state.clone()),
                Some(_) => {}
            }
            next.insert(id, state);
        }

        let mut removed: Vec<Entity> = self
            .last
            .keys()
            .filter(|id| !next.contains_key(id))
            .copied()
            .collect();
        removed.sort();

        let base_seq = self.seq;
        self.seq += 1;
        // Full replacement: next tick diffs against exactly this view.
        self.last = next;

        StateDelta {
            seq: self.seq,
            base_seq,
            created,
            updated,
            removed,
        }
    }

    /// The full view at the current sequence number, for initial sync or
    /// resync-after-gap.
    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        let mut entities: Vec<EntityState> = self.last.values().cloned().collect();
        entities.sort_by_key(|s| s.id);
        Snapshot {
            seq: self.seq,
            entities,
        }
    }

    /// Forget everything. The next `update` classifies every visible entity
    /// as created, starting a fresh delta chain from sequence zero.
    pub fn reset(&mut self) {
        self.last.clear();
        self.seq = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vtt_ecs::{movement, Movement, Transform2D};

    fn open_view() -> Viewport {
        Viewport::default()
    }

    fn ids(states: &[EntityState]) -> Vec<Entity> {
        states.iter().map(|s| s.id).collect()
    }

    /// The canonical three-entity scenario: create, move, destroy.
    #[test]
    fn test_created_updated_removed_lifecycle() {
        let mut world = World::new(10);
        let e0 = world.create().unwrap();
        let e1 = world.create().unwrap();
        let e2 = world.create().unwrap();
        world.transforms_mut().add(e0, Transform2D::at(0.0, 0.0));
        world.movements_mut().add(e0, Movement::velocity(1.0, 0.0));
        world.transforms_mut().add(e1, Transform2D::at(5.0, 5.0));
        world.transforms_mut().add(e2, Transform2D::at(10.0, 10.0));

        let mut sync = SyncSystem::new(AoiConfig::default());

        let first = sync.update(&world, &open_view());
        assert_eq!(first.seq, 1);
        assert_eq!(first.base_seq, 0);
        assert_eq!(ids(&first.created), vec![e0, e1, e2]);
        assert!(first.updated.is_empty());
        assert!(first.removed.is_empty());

        movement::integrate(&mut world, 1.0);

        let second = sync.update(&world, &open_view());
        assert_eq!(second.seq, 2);
        assert_eq!(second.base_seq, 1);
        assert!(second.created.is_empty());
        assert_eq!(ids(&second.updated), vec![e0]);
        assert_eq!(second.updated[0].x, 1.0);
        assert_eq!(second.updated[0].y, 0.0);
        assert!(second.removed.is_empty());

        world.destroy(e1);

        let third = sync.update(&world, &open_view());
        assert!(third.created.is_empty());
        assert!(third.updated.is_empty());
        assert_eq!(third.removed, vec![e1]);
    }

    #[test]
    fn test_noop_tick_yields_empty_delta() {
        let mut world = World::new(4);
        let e = world.create().unwrap();
        world.transforms_mut().add(e, Transform2D::at(1.0, 2.0));

        let mut sync = SyncSystem::new(AoiConfig::default());
        sync.update(&world, &open_view());
        let delta = sync.update(&world, &open_view());
        assert!(delta.is_empty());
        assert_eq!(delta.seq, 2);
    }

    #[test]
    fn test_sub_epsilon_drift_is_not_an_update() {
        let mut world = World::new(4);
        let e = world.create().unwrap();
        world.transforms_mut().add(e, Transform2D::at(1.00005, 2.0));

        let mut sync = SyncSystem::new(AoiConfig::default());
        sync.update(&world, &open_view());

        world.transforms_mut().set_position(e, 1.00006, 2.0);
        let delta = sync.update(&world, &open_view());
        assert!(delta.is_empty());
    }

    #[test]
    fn test_entities_without_transform_are_invisible() {
        let mut world = World::new(4);
        let seen = world.create().unwrap();
        let unseen = world.create().unwrap();
        world.transforms_mut().add(seen, Transform2D::at(0.0, 0.0));
        world.movements_mut().add(unseen, Movement::velocity(1.0, 0.0));

        let mut sync = SyncSystem::new(AoiConfig::default());
        let delta = sync.update(&world, &open_view());
        assert_eq!(ids(&delta.created), vec![seen]);
    }

    #[test]
    fn test_viewport_culls_and_exit_counts_as_removed() {
        let mut world = World::new(4);
        let inside = world.create().unwrap();
        let outside = world.create().unwrap();
        world.transforms_mut().add(inside, Transform2D::at(59.0, 0.0));
        world
            .transforms_mut()
            .add(outside, Transform2D::at(61.0, 0.0));

        let view = Viewport {
            cx: 0.0,
            cy: 0.0,
            span_x: 100.0,
            span_y: 100.0,
        };
        let mut sync = SyncSystem::new(AoiConfig::default());

        let first = sync.update(&world, &view);
        assert_eq!(ids(&first.created), vec![inside]);

        // The entity wanders out of view: removed, even though still alive.
        world.transforms_mut().set_position(inside, 61.0, 0.0);
        let second = sync.update(&world, &view);
        assert_eq!(second.removed, vec![inside]);
    }

    #[test]
    fn test_visible_entity_cap() {
        let mut world = World::new(8);
        for i in 0..5 {
            let e = world.create().unwrap();
            world.transforms_mut().add(e, Transform2D::at(i as f32, 0.0));
        }

        let aoi = AoiConfig {
            view_scale: 0.6,
            max_visible: 3,
        };
        let mut sync = SyncSystem::new(aoi);
        let delta = sync.update(&world, &open_view());
        // Lowest ids win; the overflow is silently dropped this tick.
        assert_eq!(
            ids(&delta.created),
            vec![Entity(0), Entity(1), Entity(2)]
        );
    }

    #[test]
    fn test_snapshot_apply_matches_next_snapshot() {
        let mut world = World::new(8);
        let e0 = world.create().unwrap();
        let e1 = world.create().unwrap();
        world.transforms_mut().add(e0, Transform2D::at(0.0, 0.0));
        world.movements_mut().add(e0, Movement::velocity(2.0, 1.0));
        world.transforms_mut().add(e1, Transform2D::at(5.0, 5.0));

        let mut sync = SyncSystem::new(AoiConfig::default());
        sync.update(&world, &open_view());
        let base = sync.snapshot();

        movement::integrate(&mut world, 0.5);
        world.destroy(e1);
        let spawned = world.create().unwrap();
        world.transforms_mut().add(spawned, Transform2D::at(9.0, 9.0));

        let delta = sync.update(&world, &open_view());
        let reconstructed = base.apply(&delta).unwrap();
        assert_eq!(reconstructed, sync.snapshot());
    }

    #[test]
    fn test_reset_restarts_the_delta_chain() {
        let mut world = World::new(4);
        let e = world.create().unwrap();
        world.transforms_mut().add(e, Transform2D::at(1.0, 1.0));

        let mut sync = SyncSystem::new(AoiConfig::default());
        sync.update(&world, &open_view());
        sync.update(&world, &open_view());
        assert_eq!(sync.seq(), 2);

        sync.reset();
        assert_eq!(sync.seq(), 0);
        assert!(sync.snapshot().entities.is_empty());

        let delta = sync.update(&world, &open_view());
        assert_eq!(delta.base_seq, 0);
        assert_eq!(ids(&delta.created), vec![e]);
    }

    #[test]
    fn test_independent_views_do_not_share_a_baseline() {
        let mut world = World::new(4);
        let e = world.create().unwrap();
        world.transforms_mut().add(e, Transform2D::at(0.0, 0.0));

        let mut a = SyncSystem::new(AoiConfig::default());
        let mut b = SyncSystem::new(AoiConfig::default());

        let from_a = a.update(&world, &open_view());
        let from_b = b.update(&world, &open_view());
        // Both observers see the entity as created on their own first tick.
        assert_eq!(ids(&from_a.created), vec![e]);
        assert_eq!(ids(&from_b.created), vec![e]);
    }
}
