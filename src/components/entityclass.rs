//! Entity classification used to decide who may push whom.
//!
//! Every entity that takes part in mover pushing carries an [`EntityClass`].
//! The pushability rules themselves live in
//! [`crate::systems::pusher::classify`].

use bevy_ecs::prelude::Component;
use serde::{Deserialize, Serialize};

/// Broad kind of an entity as far as movers are concerned.
#[derive(Component, Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityClass {
    /// A client-controlled body.
    Player,
    /// A structure placed by a player. Stackable buildables may be pushed
    /// by other buildables.
    Buildable {
        #[serde(default)]
        stackable: bool,
    },
    /// A kinematic mover (door, platform, train, ...).
    Mover,
    /// A pickup lying in the world.
    Item,
    /// A dead body that still occupies space.
    Corpse,
    /// An independent physics object (crate, barrel, ...).
    PhysicsObject,
    /// Anything else: missiles, triggers, decorations.
    Other,
}

impl EntityClass {
    pub fn is_player(&self) -> bool {
        matches!(self, EntityClass::Player)
    }

    pub fn is_stackable(&self) -> bool {
        matches!(self, EntityClass::Buildable { stackable: true })
    }
}
