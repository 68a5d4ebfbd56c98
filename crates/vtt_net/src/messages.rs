//! Message types exchanged between the simulation server and clients.
//!
//! All types serialise to JSON. Server-to-client and client-to-server
//! messages are tagged on a `"type"` field (`HELLO`, `SNAPSHOT`, `DELTA`,
//! `CAMERA`, `RESYNC`). Float fields are rounded to two decimal places on the
//! wire to trim payload size — a presentation-layer detail only; in-memory
//! values keep full precision.

use serde::{Deserialize, Serialize, Serializer};
use vtt_ecs::{Appearance, Entity, Transform2D};

use crate::error::NetError;

fn round2<S: Serializer>(v: &f32, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_f32((v * 100.0).round() / 100.0)
}

fn unset() -> i32 {
    -1
}

fn is_unset(v: &i32) -> bool {
    *v == -1
}

fn unset_tint() -> [i32; 3] {
    [-1, -1, -1]
}

fn is_unset_tint(v: &[i32; 3]) -> bool {
    *v == [-1, -1, -1]
}

fn opaque() -> f32 {
    1.0
}

fn is_opaque(v: &f32) -> bool {
    *v == 1.0
}

/// A flattened, serialisable view of one entity's transform and appearance.
///
/// Produced fresh each tick by [`SyncSystem`](crate::SyncSystem) and never
/// mutated after emission. Appearance fields fall back to their sentinels
/// (`-1`, `alpha = 1`, no colour) when the entity has no appearance
/// component, and sentinel-valued fields are omitted from the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityState {
    /// The entity this state describes.
    pub id: Entity,
    /// World-space position.
    #[serde(serialize_with = "round2")]
    pub x: f32,
    /// World-space position.
    #[serde(serialize_with = "round2")]
    pub y: f32,
    /// Rotation in radians.
    #[serde(serialize_with = "round2")]
    pub rot: f32,
    /// Non-uniform scale.
    #[serde(serialize_with = "round2")]
    pub sx: f32,
    /// Non-uniform scale.
    #[serde(serialize_with = "round2")]
    pub sy: f32,
    /// Draw-order layer.
    #[serde(rename = "zIndex")]
    pub z_index: i32,
    /// Sprite sheet index, `-1` if unset.
    #[serde(default = "unset", skip_serializing_if = "is_unset")]
    pub sprite: i32,
    /// Animation frame, `-1` if unset.
    #[serde(default = "unset", skip_serializing_if = "is_unset")]
    pub frame: i32,
    /// RGB tint channels, `-1` per channel if unset.
    #[serde(default = "unset_tint", skip_serializing_if = "is_unset_tint")]
    pub tint: [i32; 3],
    /// Opacity in `[0, 1]`.
    #[serde(
        default = "opaque",
        skip_serializing_if = "is_opaque",
        serialize_with = "round2"
    )]
    pub alpha: f32,
    /// Optional CSS-style colour string.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl EntityState {
    /// Flatten an entity's components into a wire state.
    #[must_use]
    pub fn capture(id: Entity, t: Transform2D, appearance: Option<&Appearance>) -> Self {
        let a = appearance.cloned().unwrap_or_default();
        Self {
            id,
            x: t.x,
            y: t.y,
            rot: t.rot,
            sx: t.sx,
            sy: t.sy,
            z_index: t.z_index,
            sprite: a.sprite,
            frame: a.frame,
            tint: a.tint,
            alpha: a.alpha,
            color: a.color,
        }
    }
}

/// A full point-in-time view of every entity visible to one observer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Sequence number, monotonically increasing by one per tick.
    pub seq: u64,
    /// Visible entities, in ascending id order.
    pub entities: Vec<EntityState>,
}

impl Snapshot {
    /// An empty snapshot at sequence zero.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            seq: 0,
            entities: Vec::new(),
        }
    }

    /// Apply a delta, producing the snapshot at the delta's sequence number.
    ///
    /// Created entities are added, updated entities replaced by their full
    /// field set, removed entities deleted.
    ///
    /// # Errors
    ///
    /// Returns [`NetError::StaleDelta`] when the delta was not computed
    /// against this snapshot's sequence number. There is no recovery other
    /// than requesting a full snapshot — the protocol only ever diffs against
    /// the immediately previous tick.
    pub fn apply(&self, delta: &StateDelta) -> Result<Snapshot, NetError> {
        if delta.base_seq != self.seq {
            return Err(NetError::StaleDelta {
                expected: self.seq,
                got: delta.base_seq,
            });
        }

        let mut entities: std::collections::HashMap<Entity, EntityState> = self
            .entities
            .iter()
            .map(|s| (s.id, s.clone()))
            .collect();
        for state in delta.created.iter().chain(&delta.updated) {
            entities.insert(state.id, state.clone());
        }
        for id in &delta.removed {
            entities.remove(id);
        }

        let mut entities: Vec<EntityState> = entities.into_values().collect();
        entities.sort_by_key(|s| s.id);
        Ok(Snapshot {
            seq: delta.seq,
            entities,
        })
    }
}

/// What changed between two consecutive ticks of one observer's view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateDelta {
    /// The new sequence number.
    pub seq: u64,
    /// The sequence number this delta is relative to.
    pub base_seq: u64,
    /// Entities that entered the view this tick.
    pub created: Vec<EntityState>,
    /// Entities whose state changed beyond the epsilon tolerance.
    pub updated: Vec<EntityState>,
    /// Entities that left the view this tick.
    pub removed: Vec<Entity>,
}

impl StateDelta {
    /// `true` when nothing changed this tick.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.created.is_empty() && self.updated.is_empty() && self.removed.is_empty()
    }
}

/// Server-to-client messages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ServerMessage {
    /// Handshake, sent once per connection.
    #[serde(rename = "HELLO", rename_all = "camelCase")]
    Hello {
        /// Fixed simulation steps per second; also the delta emission rate.
        tick_rate: f64,
    },
    /// A full view — initial sync and resync.
    #[serde(rename = "SNAPSHOT")]
    Snapshot(Snapshot),
    /// The per-tick incremental update.
    #[serde(rename = "DELTA")]
    Delta(StateDelta),
}

/// Client-to-server messages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ClientMessage {
    /// Partial viewport update; unset fields retain their prior values.
    #[serde(rename = "CAMERA", rename_all = "camelCase")]
    Camera {
        /// Viewport centre.
        #[serde(default)]
        cx: Option<f32>,
        /// Viewport centre.
        #[serde(default)]
        cy: Option<f32>,
        /// Requested half-width basis.
        #[serde(default)]
        span_x: Option<f32>,
        /// Requested half-height basis.
        #[serde(default)]
        span_y: Option<f32>,
    },
    /// Request a fresh full snapshot (the recovery path for a stale delta).
    #[serde(rename = "RESYNC")]
    Resync,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(id: u32, x: f32, y: f32) -> EntityState {
        EntityState::capture(Entity(id), Transform2D::at(x, y), None)
    }

    #[test]
    fn test_floats_round_to_two_decimals_on_the_wire() {
        let v = serde_json::to_value(state(0, 1.23456, 2.71828)).unwrap();
        // f32 values widen to f64 in serde_json, so compare with a tolerance.
        assert!((v["x"].as_f64().unwrap() - 1.23).abs() < 1e-6);
        assert!((v["y"].as_f64().unwrap() - 2.72).abs() < 1e-6);
    }

    #[test]
    fn test_sentinel_appearance_fields_are_omitted() {
        let v = serde_json::to_value(state(0, 0.0, 0.0)).unwrap();
        let obj = v.as_object().unwrap();
        assert!(!obj.contains_key("sprite"));
        assert!(!obj.contains_key("tint"));
        assert!(!obj.contains_key("alpha"));
        assert!(!obj.contains_key("color"));
        assert_eq!(v["zIndex"], 0);
    }

    #[test]
    fn test_present_appearance_fields_are_kept() {
        let appearance = Appearance {
            sprite: 2,
            frame: 1,
            tint: [255, 0, 0],
            alpha: 0.5,
            color: Some("#f00".to_string()),
        };
        let s = EntityState::capture(Entity(4), Transform2D::at(1.0, 2.0), Some(&appearance));
        let v = serde_json::to_value(&s).unwrap();
        assert_eq!(v["sprite"], 2);
        assert_eq!(v["tint"], serde_json::json!([255, 0, 0]));
        assert_eq!(v["alpha"], 0.5);
        assert_eq!(v["color"], "#f00");

        let restored: EntityState = serde_json::from_value(v).unwrap();
        assert_eq!(restored, s);
    }

    #[test]
    fn test_entity_state_decode_fills_sentinels() {
        let restored: EntityState = serde_json::from_str(
            r#"{"id":3,"x":1.0,"y":2.0,"rot":0.0,"sx":1.0,"sy":1.0,"zIndex":7}"#,
        )
        .unwrap();
        assert_eq!(restored.id, Entity(3));
        assert_eq!(restored.z_index, 7);
        assert_eq!(restored.sprite, -1);
        assert_eq!(restored.tint, [-1, -1, -1]);
        assert_eq!(restored.alpha, 1.0);
        assert!(restored.color.is_none());
    }

    #[test]
    fn test_hello_wire_shape() {
        let v = serde_json::to_value(ServerMessage::Hello { tick_rate: 10.0 }).unwrap();
        assert_eq!(v["type"], "HELLO");
        assert_eq!(v["tickRate"], 10.0);
    }

    #[test]
    fn test_delta_wire_shape() {
        let msg = ServerMessage::Delta(StateDelta {
            seq: 2,
            base_seq: 1,
            created: vec![],
            updated: vec![state(0, 1.0, 0.0)],
            removed: vec![Entity(9)],
        });
        let v = serde_json::to_value(msg).unwrap();
        assert_eq!(v["type"], "DELTA");
        assert_eq!(v["baseSeq"], 1);
        assert_eq!(v["removed"], serde_json::json!([9]));
    }

    #[test]
    fn test_camera_partial_decode() {
        let msg: ClientMessage =
            serde_json::from_str(r#"{"type":"CAMERA","cx":5.0,"spanX":200.0}"#).unwrap();
        match msg {
            ClientMessage::Camera {
                cx,
                cy,
                span_x,
                span_y,
            } => {
                assert_eq!(cx, Some(5.0));
                assert_eq!(cy, None);
                assert_eq!(span_x, Some(200.0));
                assert_eq!(span_y, None);
            }
            other => panic!("unexpected message: {other:?}"),
        }
    }

    #[test]
    fn test_resync_decode() {
        let msg: ClientMessage = serde_json::from_str(r#"{"type":"RESYNC"}"#).unwrap();
        assert_eq!(msg, ClientMessage::Resync);
    }

    #[test]
    fn test_apply_created_updated_removed() {
        let base = Snapshot {
            seq: 1,
            entities: vec![state(0, 0.0, 0.0), state(1, 5.0, 5.0)],
        };
        let delta = StateDelta {
            seq: 2,
            base_seq: 1,
            created: vec![state(2, 9.0, 9.0)],
            updated: vec![state(0, 1.0, 0.0)],
            removed: vec![Entity(1)],
        };

        let next = base.apply(&delta).unwrap();
        assert_eq!(next.seq, 2);
        let ids: Vec<Entity> = next.entities.iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![Entity(0), Entity(2)]);
        assert_eq!(next.entities[0].x, 1.0);
    }

    #[test]
    fn test_apply_rejects_stale_base() {
        let base = Snapshot::empty();
        let delta = StateDelta {
            seq: 5,
            base_seq: 4,
            created: vec![],
            updated: vec![],
            removed: vec![],
        };
        let err = base.apply(&delta).unwrap_err();
        assert!(matches!(
            err,
            NetError::StaleDelta {
                expected: 0,
                got: 4
            }
        ));
    }
}
