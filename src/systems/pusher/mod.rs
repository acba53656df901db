//! Mover push engine.
//!
//! [`push_mover`] moves one mover by a linear and angular delta and carries,
//! shoves, strands or crushes whatever is in the way. It runs as a single
//! transaction: either every displaced entity ends up at a consistent
//! position, or the world is left exactly as it was. Stranding and crushing
//! wait for [`finish_team`], once every part of the mover's team got through.
//!
//! Submodules:
//! - [`classify`] – which entity classes can push which
//! - [`query`] – collision queries against entities and world geometry
//! - [`transaction`] – relation matrix, push records, undo stack
//! - [`graph`] – discovery of everything the move displaces
//! - [`block`] – blockage classification and propagation
//! - [`commit`] – applying or rolling back the result

pub mod block;
pub mod classify;
pub mod commit;
pub mod graph;
pub mod query;
pub mod transaction;

use bevy_ecs::prelude::*;
use glam::Vec3;
use log::debug;
use smallvec::SmallVec;

use crate::components::mapposition::MapPosition;
use crate::components::mover::Mover;
use crate::components::rotation::Rotation;
use crate::resources::worldtime::WorldTime;

pub use commit::finish_team;
pub use transaction::{MAX_PUSHED, PushKind, PushTransaction};

use query::CollisionQuery;
use transaction::UndoEntry;

/// Result of a single [`push_mover`] call.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PushOutcome {
    pub accepted: bool,
    /// Entities that stopped the mover. Empty when accepted.
    pub obstacles: SmallVec<[Entity; 4]>,
}

/// Move `mover` by `linear` units and `angular` degrees, pushing everything
/// in the way.
///
/// On success every displaced entity is committed and its pre-move state is
/// added to the team journal of `tx`; blocked riders and crushed entities
/// are queued for [`finish_team`]. On failure the mover and every
/// displaced entity are restored and the entities that stopped the mover are
/// returned.
///
/// # Panics
///
/// Panics if `mover` has no [`MapPosition`].
pub fn push_mover(
    world: &mut World,
    tx: &mut PushTransaction,
    mover: Entity,
    linear: Vec3,
    angular: Vec3,
) -> PushOutcome {
    let origin = world
        .get::<MapPosition>(mover)
        .map(|p| p.pos)
        .expect("push_mover called on an entity without MapPosition");
    let lethal = world.get::<Mover>(mover).is_some_and(|m| m.is_lethal());
    let frame = world
        .get_resource::<WorldTime>()
        .map(|t| t.frame_count)
        .unwrap_or(0);

    tx.begin(mover, origin, linear, angular, lethal);
    let prime_snapshot = UndoEntry::capture(world, mover);
    tx.snapshot(prime_snapshot);

    if let Some(mut pos) = world.get_mut::<MapPosition>(mover) {
        pos.pos += linear;
    }
    if let Some(mut rot) = world.get_mut::<Rotation>(mover) {
        rot.angles += angular;
    } else if angular != Vec3::ZERO {
        world.entity_mut(mover).insert(Rotation { angles: angular });
    }

    let mut query = CollisionQuery::new(world);
    graph::build_push_graph(world, tx, &mut query);
    let resolution = block::resolve_blocks(world, tx, &mut query);

    if !resolution.accepted {
        commit::rollback(world, tx);
        debug!(
            target: "push",
            "{mover:?} blocked by {:?}{}",
            resolution.obstacles,
            if tx.is_overflowed() { " (overflow)" } else { "" }
        );
        return PushOutcome {
            accepted: false,
            obstacles: resolution.obstacles,
        };
    }

    tx.journal(prime_snapshot);
    commit::commit(world, tx, frame);

    PushOutcome {
        accepted: true,
        obstacles: SmallVec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::boxcollider::{Aabb, BoxCollider};
    use crate::components::entityclass::EntityClass;
    use crate::components::groundentity::GroundEntity;
    use crate::components::health::Health;
    use crate::components::lastpusher::LastPusher;
    use crate::components::mover::MoverKind;
    use crate::components::trajectory::Trajectory;
    use crate::resources::worldgeometry::WorldGeometry;

    fn spawn_player(world: &mut World, origin: Vec3) -> Entity {
        world
            .spawn((
                EntityClass::Player,
                MapPosition::from_vec(origin),
                BoxCollider::new(Vec3::new(-8.0, -8.0, 0.0), Vec3::new(8.0, 8.0, 32.0)),
                Health::new(100),
            ))
            .id()
    }

    fn spawn_plat(world: &mut World, mover: Mover) -> Entity {
        world
            .spawn((
                mover,
                MapPosition::default(),
                BoxCollider::new(Vec3::new(-32.0, -32.0, -8.0), Vec3::new(32.0, 32.0, 0.0)),
            ))
            .id()
    }

    #[test]
    fn rider_follows_translation() {
        let mut world = World::new();
        let plat = spawn_plat(&mut world, Mover::new(MoverKind::Plat));
        let player = spawn_player(&mut world, Vec3::ZERO);
        world.entity_mut(player).insert(GroundEntity::new(plat));

        let mut tx = PushTransaction::default();
        let outcome = push_mover(&mut world, &mut tx, plat, Vec3::new(5.0, 0.0, 2.0), Vec3::ZERO);

        assert!(outcome.accepted);
        assert_eq!(world.get::<MapPosition>(plat).unwrap().pos, Vec3::new(5.0, 0.0, 2.0));
        assert_eq!(world.get::<MapPosition>(player).unwrap().pos, Vec3::new(5.0, 0.0, 2.0));
        assert_eq!(world.get::<LastPusher>(player).unwrap().entity, plat);
        assert_eq!(tx.journal_entries().len(), 2);
    }

    #[test]
    fn rotation_swings_riders_about_the_pivot() {
        let mut world = World::new();
        let plat = spawn_plat(&mut world, Mover::new(MoverKind::Rotator));
        let player = spawn_player(&mut world, Vec3::new(16.0, 0.0, 0.0));
        world.entity_mut(player).insert(GroundEntity::new(plat));

        let mut tx = PushTransaction::default();
        let outcome = push_mover(
            &mut world,
            &mut tx,
            plat,
            Vec3::ZERO,
            Vec3::new(0.0, 90.0, 0.0),
        );

        assert!(outcome.accepted);
        let pos = world.get::<MapPosition>(player).unwrap().pos;
        assert!((pos - Vec3::new(0.0, 16.0, 0.0)).length() < 1e-3, "{pos}");
        assert_eq!(
            world.get::<Rotation>(plat).unwrap().angles,
            Vec3::new(0.0, 90.0, 0.0)
        );
    }

    #[test]
    fn rejected_push_restores_everything() {
        let mut world = World::new();
        world.insert_resource(WorldGeometry::default().with_solid(Aabb::new(
            Vec3::new(-64.0, -64.0, 40.0),
            Vec3::new(64.0, 64.0, 48.0),
        )));
        let plat = spawn_plat(&mut world, Mover::new(MoverKind::Plat));
        let player = spawn_player(&mut world, Vec3::ZERO);
        world.entity_mut(player).insert(GroundEntity::new(plat));

        let mut tx = PushTransaction::default();
        let outcome = push_mover(&mut world, &mut tx, plat, Vec3::new(0.0, 0.0, 12.0), Vec3::ZERO);

        assert!(!outcome.accepted);
        assert_eq!(outcome.obstacles.as_slice(), &[player]);
        assert_eq!(world.get::<MapPosition>(plat).unwrap().pos, Vec3::ZERO);
        assert_eq!(world.get::<MapPosition>(player).unwrap().pos, Vec3::ZERO);
        assert!(world.get::<GroundEntity>(player).is_some());
        assert!(tx.journal_entries().is_empty());
    }

    #[test]
    fn sine_mover_gibs_what_blocks_it() {
        let mut world = World::new();
        world.insert_resource(WorldGeometry::default().with_solid(Aabb::new(
            Vec3::new(-64.0, -64.0, 40.0),
            Vec3::new(64.0, 64.0, 48.0),
        )));
        let bobber = Mover::new(MoverKind::Bobber).with_pos(Trajectory::sine(
            Vec3::ZERO,
            Vec3::new(0.0, 0.0, 16.0),
            0.0,
            4.0,
        ));
        let plat = spawn_plat(&mut world, bobber);
        let player = spawn_player(&mut world, Vec3::ZERO);
        world.entity_mut(player).insert(GroundEntity::new(plat));

        let mut tx = PushTransaction::default();
        let outcome = push_mover(&mut world, &mut tx, plat, Vec3::new(0.0, 0.0, 12.0), Vec3::ZERO);

        assert!(outcome.accepted);
        assert_eq!(world.get::<MapPosition>(plat).unwrap().pos, Vec3::new(0.0, 0.0, 12.0));
        assert!(!world.get::<Health>(player).unwrap().gibbed);

        finish_team(&mut world, &mut tx);
        let health = world.get::<Health>(player).unwrap();
        assert!(health.gibbed);
        assert!(!world.get::<BoxCollider>(player).unwrap().solid);
    }

    #[test]
    fn overflow_rejects_and_restores() {
        let mut world = World::new();
        let plat = world
            .spawn((
                Mover::new(MoverKind::Plat),
                MapPosition::default(),
                BoxCollider::new(Vec3::new(-512.0, -512.0, -8.0), Vec3::new(512.0, 512.0, 0.0)),
            ))
            .id();
        let mut riders = Vec::new();
        for i in 0..6 {
            let p = spawn_player(&mut world, Vec3::new(i as f32 * 32.0, 0.0, 0.0));
            world.entity_mut(p).insert(GroundEntity::new(plat));
            riders.push(p);
        }

        let mut tx = PushTransaction::new(4);
        let outcome = push_mover(&mut world, &mut tx, plat, Vec3::new(0.0, 0.0, -4.0), Vec3::ZERO);

        assert!(!outcome.accepted);
        assert!(tx.is_overflowed());
        assert_eq!(world.get::<MapPosition>(plat).unwrap().pos, Vec3::ZERO);
        for (i, p) in riders.into_iter().enumerate() {
            assert_eq!(
                world.get::<MapPosition>(p).unwrap().pos,
                Vec3::new(i as f32 * 32.0, 0.0, 0.0)
            );
        }
    }

    #[test]
    fn turning_bar_leaves_a_nearby_player_alone() {
        let mut world = World::new();
        let bar = world
            .spawn((
                Mover::new(MoverKind::Rotator),
                MapPosition::default(),
                Rotation::new(0.0, 5.0, 0.0),
                BoxCollider::new(Vec3::new(-64.0, -4.0, 0.0), Vec3::new(64.0, 4.0, 8.0)),
            ))
            .id();
        let player = spawn_player(&mut world, Vec3::new(40.0, 40.0, 0.0));

        let mut tx = PushTransaction::default();
        let outcome = push_mover(&mut world, &mut tx, bar, Vec3::ZERO, Vec3::new(0.0, 5.0, 0.0));

        assert!(outcome.accepted);
        assert!(tx.record(player).is_none());
        assert_eq!(
            world.get::<MapPosition>(player).unwrap().pos,
            Vec3::new(40.0, 40.0, 0.0)
        );
        assert!(world.get::<LastPusher>(player).is_none());
    }

    #[test]
    fn turning_bar_sweeps_the_player_it_touches() {
        let mut world = World::new();
        let bar = world
            .spawn((
                Mover::new(MoverKind::Rotator),
                MapPosition::default(),
                BoxCollider::new(Vec3::new(-64.0, -4.0, 0.0), Vec3::new(64.0, 4.0, 8.0)),
            ))
            .id();
        let player = spawn_player(&mut world, Vec3::new(40.0, 12.0, 0.0));

        let mut tx = PushTransaction::default();
        let outcome = push_mover(&mut world, &mut tx, bar, Vec3::ZERO, Vec3::new(0.0, 10.0, 0.0));

        assert!(outcome.accepted);
        assert_eq!(tx.record(player).unwrap().kind, PushKind::PrimeMoverHit);
        assert!(world.get::<MapPosition>(player).unwrap().pos.y > 12.0);
    }
}
