//! Collision queries used by the push engine.
//!
//! Wraps the ECS queries and the static [`WorldGeometry`] behind a small
//! adapter. Results are sorted by entity so a push over the same world
//! always visits candidates in the same order.

use bevy_ecs::prelude::*;
use glam::Vec3;
use smallvec::SmallVec;

use crate::components::boxcollider::{BoxCollider, Obb};
use crate::components::groundentity::GroundEntity;
use crate::components::mapposition::MapPosition;
use crate::components::rotation::Rotation;
use crate::resources::worldgeometry::WorldGeometry;
use crate::systems::pusher::classify::is_intact;

/// What stopped an entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Blocker {
    World,
    Entity(Entity),
}

type BodyQuery = (
    Entity,
    &'static MapPosition,
    &'static BoxCollider,
    Option<&'static Rotation>,
);

pub struct CollisionQuery {
    bodies: QueryState<BodyQuery>,
    grounded: QueryState<(Entity, &'static GroundEntity)>,
}

impl CollisionQuery {
    pub fn new(world: &mut World) -> Self {
        Self {
            bodies: world.query::<BodyQuery>(),
            grounded: world.query::<(Entity, &GroundEntity)>(),
        }
    }

    /// Shape of `entity` if its origin were `origin`.
    pub fn bounds_at(world: &World, entity: Entity, origin: Vec3) -> Option<Obb> {
        let collider = world.get::<BoxCollider>(entity)?;
        let angles = world
            .get::<Rotation>(entity)
            .map(|r| r.angles)
            .unwrap_or(Vec3::ZERO);
        Some(collider.world_box(origin, angles))
    }

    /// Shape of `entity` where it is now.
    pub fn current_bounds(world: &World, entity: Entity) -> Option<Obb> {
        let origin = world.get::<MapPosition>(entity)?.pos;
        Self::bounds_at(world, entity, origin)
    }

    /// True if static world geometry overlaps `shape`.
    pub fn world_blocks(world: &World, shape: &Obb) -> bool {
        world
            .get_resource::<WorldGeometry>()
            .is_some_and(|geometry| geometry.blocks(shape))
    }

    /// Solid entities whose current shape overlaps `shape`, sorted.
    ///
    /// Axis-aligned bounds reject distant bodies first; survivors are
    /// tested in their real orientation.
    pub fn entities_in_box(&mut self, world: &World, shape: &Obb) -> SmallVec<[Entity; 16]> {
        let broad = shape.bounds();
        let mut found: SmallVec<[Entity; 16]> = self
            .bodies
            .iter(world)
            .filter(|(_, _, collider, _)| collider.solid)
            .filter(|(_, pos, collider, rot)| {
                let angles = rot.map(|r| r.angles).unwrap_or(Vec3::ZERO);
                collider.world_bounds(pos.pos, angles).intersects(&broad)
                    && collider.world_box(pos.pos, angles).intersects(shape)
            })
            .map(|(entity, ..)| entity)
            .collect();
        found.sort_unstable();
        found
    }

    /// Entities standing on `support`, sorted.
    pub fn riders_of(&mut self, world: &World, support: Entity) -> SmallVec<[Entity; 8]> {
        let mut riders: SmallVec<[Entity; 8]> = self
            .grounded
            .iter(world)
            .filter(|(rider, ground)| ground.entity == support && *rider != support)
            .map(|(rider, _)| rider)
            .collect();
        riders.sort_unstable();
        riders
    }

    /// First thing that `shape` would collide with, ignoring the entities
    /// in `ignore` and anything no longer intact. World geometry wins over
    /// entities.
    pub fn test_position(
        &mut self,
        world: &World,
        shape: &Obb,
        ignore: &[Entity],
    ) -> Option<Blocker> {
        if Self::world_blocks(world, shape) {
            return Some(Blocker::World);
        }
        self.entities_in_box(world, shape)
            .into_iter()
            .find(|other| !ignore.contains(other) && is_intact(world, *other))
            .map(Blocker::Entity)
    }
}
