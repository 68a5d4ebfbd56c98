//! Entity identifiers.
//!
//! An [`Entity`] is a lightweight `u32` handle with no inherent data. Ids are
//! dense — they double as indices into the component stores — and are reused
//! after destruction, so an id is only meaningful while the
//! [`World`](crate::World) reports it alive.

use serde::{Deserialize, Serialize};

/// A dense entity identifier.
///
/// Entities are pure identifiers — they carry no data of their own.
/// Components are attached to entities to give them meaning, and the id is
/// used directly as the row index into every component store.
///
/// On the wire an `Entity` serialises as its bare integer value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Entity(pub u32);

impl Entity {
    /// Create an entity from a raw `u32` identifier.
    #[must_use]
    pub const fn from_raw(id: u32) -> Self {
        Self(id)
    }

    /// Returns the raw `u32` identifier.
    #[must_use]
    pub const fn id(self) -> u32 {
        self.0
    }

    /// Returns the id as a store index.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for Entity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Entity({})", self.0)
    }
}
