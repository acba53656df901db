use bevy_ecs::prelude::{Component, Entity};

/// The mover that last displaced this entity, and on which frame.
///
/// Read by client prediction and interpolation to extrapolate riders.
#[derive(Component, Clone, Copy, Debug, PartialEq, Eq)]
pub struct LastPusher {
    pub entity: Entity,
    pub frame: u64,
}
