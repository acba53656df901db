//! Who may push whom.
//!
//! [`can_push`] is the pure class table; [`is_pushable`] adds the state
//! checks (solid, not gibbed, not a dead player) against the live world.

use bevy_ecs::prelude::*;

use crate::components::boxcollider::BoxCollider;
use crate::components::entityclass::EntityClass;
use crate::components::health::Health;
use crate::components::mover::Mover;

/// Class of an entity. Entities carrying a [`Mover`] without an explicit
/// class are movers.
pub fn entity_class(world: &World, entity: Entity) -> Option<EntityClass> {
    if let Some(class) = world.get::<EntityClass>(entity) {
        return Some(*class);
    }
    world.get::<Mover>(entity).map(|_| EntityClass::Mover)
}

/// Class table: can something of class `pusher` shove something of class
/// `candidate` out of its way?
pub fn can_push(pusher: EntityClass, candidate: EntityClass) -> bool {
    match pusher {
        EntityClass::Player => candidate.is_player(),
        EntityClass::Buildable { .. } => candidate.is_player() || candidate.is_stackable(),
        EntityClass::Mover => matches!(
            candidate,
            EntityClass::Player
                | EntityClass::Buildable { .. }
                | EntityClass::Item
                | EntityClass::Corpse
                | EntityClass::PhysicsObject
        ),
        EntityClass::Item
        | EntityClass::Corpse
        | EntityClass::PhysicsObject
        | EntityClass::Other => false,
    }
}

/// True if `entity` still takes part in collision: it has a solid box, is
/// not gibbed, and is not a dead player.
pub fn is_intact(world: &World, entity: Entity) -> bool {
    let Some(collider) = world.get::<BoxCollider>(entity) else {
        return false;
    };
    if !collider.solid {
        return false;
    }
    match world.get::<Health>(entity) {
        Some(health) if health.gibbed => false,
        Some(health) if health.is_dead() => {
            !entity_class(world, entity).is_some_and(|c| c.is_player())
        }
        _ => true,
    }
}

/// Can `pusher` move `candidate` right now?
pub fn is_pushable(world: &World, pusher: Entity, candidate: Entity) -> bool {
    if pusher == candidate || !is_intact(world, candidate) {
        return false;
    }
    match (entity_class(world, pusher), entity_class(world, candidate)) {
        (Some(p), Some(c)) => can_push(p, c),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::mover::MoverKind;
    use glam::Vec3;

    const STACKABLE: EntityClass = EntityClass::Buildable { stackable: true };
    const FIXED: EntityClass = EntityClass::Buildable { stackable: false };

    fn spawn(world: &mut World, class: EntityClass) -> Entity {
        world
            .spawn((class, BoxCollider::centered(Vec3::splat(16.0))))
            .id()
    }

    #[test]
    fn players_push_only_players() {
        assert!(can_push(EntityClass::Player, EntityClass::Player));
        assert!(!can_push(EntityClass::Player, STACKABLE));
        assert!(!can_push(EntityClass::Player, EntityClass::Item));
    }

    #[test]
    fn buildables_push_players_and_stackables() {
        assert!(can_push(FIXED, EntityClass::Player));
        assert!(can_push(FIXED, STACKABLE));
        assert!(!can_push(STACKABLE, FIXED));
        assert!(!can_push(STACKABLE, EntityClass::Corpse));
    }

    #[test]
    fn movers_push_loose_things_but_not_movers() {
        for class in [
            EntityClass::Player,
            FIXED,
            EntityClass::Item,
            EntityClass::Corpse,
            EntityClass::PhysicsObject,
        ] {
            assert!(can_push(EntityClass::Mover, class), "{class:?}");
        }
        assert!(!can_push(EntityClass::Mover, EntityClass::Mover));
        assert!(!can_push(EntityClass::Mover, EntityClass::Other));
    }

    #[test]
    fn inert_classes_push_nothing() {
        assert!(!can_push(EntityClass::Item, EntityClass::Player));
        assert!(!can_push(EntityClass::Other, EntityClass::Player));
    }

    #[test]
    fn dead_players_and_gibs_are_not_pushable() {
        let mut world = World::new();
        let door = world.spawn(Mover::new(MoverKind::Door)).id();
        let alive = spawn(&mut world, EntityClass::Player);
        world.entity_mut(alive).insert(Health::new(100));
        let dead = spawn(&mut world, EntityClass::Player);
        world.entity_mut(dead).insert(Health::new(0));
        let gib = spawn(&mut world, FIXED);
        world.entity_mut(gib).insert(Health {
            hp: -50,
            gibbed: true,
        });

        assert!(is_pushable(&world, door, alive));
        assert!(!is_pushable(&world, door, dead));
        assert!(!is_pushable(&world, door, gib));
    }

    #[test]
    fn broken_buildables_stay_pushable_until_gibbed() {
        let mut world = World::new();
        let door = world.spawn(Mover::new(MoverKind::Door)).id();
        let wreck = spawn(&mut world, FIXED);
        world.entity_mut(wreck).insert(Health::new(0));
        assert!(is_pushable(&world, door, wreck));
    }

    #[test]
    fn non_solid_entities_are_skipped() {
        let mut world = World::new();
        let door = world.spawn(Mover::new(MoverKind::Door)).id();
        let ghost = world
            .spawn((
                EntityClass::Player,
                BoxCollider::centered(Vec3::ONE).non_solid(),
            ))
            .id();
        assert!(!is_pushable(&world, door, ghost));
        assert!(!is_intact(&world, ghost));
    }

    #[test]
    fn mover_component_implies_mover_class() {
        let mut world = World::new();
        let plat = world.spawn(Mover::new(MoverKind::Plat)).id();
        assert_eq!(entity_class(&world, plat), Some(EntityClass::Mover));
        let bare = world.spawn_empty().id();
        assert_eq!(entity_class(&world, bare), None);
    }
}
