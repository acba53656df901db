//! Ground reference of an entity.
//!
//! An entity carrying [`GroundEntity`] is standing on the referenced entity.
//! Movers use this to find their riders: every entity whose ground entity
//! is the mover travels with it even when the mover's box does not
//! penetrate it this tick (for example when a platform moves down).
//!
//! Removing the component severs the reference; the next physics tick then
//! treats the entity as falling or sliding.

use bevy_ecs::prelude::{Component, Entity};

/// The entity this one is standing on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Component)]
pub struct GroundEntity {
    pub entity: Entity,
}

impl GroundEntity {
    pub fn new(entity: Entity) -> Self {
        Self { entity }
    }
}
