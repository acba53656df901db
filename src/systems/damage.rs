//! Damage dealt by movers.
//!
//! Blocked movers hurt what stops them; unstoppable movers and destroy
//! reactions deal lethal damage. A destroyed entity with [`Health`] is
//! gibbed (left in the world, non-solid, cut loose from its ground); one
//! without is removed outright. Every application triggers a
//! [`DamageEvent`].

use bevy_ecs::prelude::*;
use log::{debug, info};

use crate::components::boxcollider::BoxCollider;
use crate::components::groundentity::GroundEntity;
use crate::components::health::Health;
use crate::events::damage::{DamageEvent, DamageOutcome, MeansOfDeath};
use crate::resources::pushconfig::PushConfig;

/// Deal `amount` damage to `target`.
///
/// Returns `None` when nothing happened: the target is gone, already
/// gibbed, or has no health and the damage is not lethal.
pub fn apply_damage(
    world: &mut World,
    target: Entity,
    inflictor: Entity,
    amount: i32,
    means: MeansOfDeath,
) -> Option<DamageOutcome> {
    if world.get_entity(target).is_err() {
        return None;
    }
    let (lethal_damage, gib_health) = world
        .get_resource::<PushConfig>()
        .map(|c| (c.lethal_damage, c.gib_health))
        .unwrap_or_else(|| {
            let c = PushConfig::default();
            (c.lethal_damage, c.gib_health)
        });
    let lethal = amount >= lethal_damage;

    let outcome = match world.get_mut::<Health>(target) {
        Some(mut health) => {
            if health.gibbed {
                return None;
            }
            health.hp = health.hp.saturating_sub(amount);
            if lethal || health.hp <= gib_health {
                health.gibbed = true;
                DamageOutcome::Gibbed
            } else {
                DamageOutcome::Hurt
            }
        }
        None if lethal => DamageOutcome::Removed,
        None => return None,
    };

    match outcome {
        DamageOutcome::Hurt => {
            debug!("{target:?} took {amount} damage from {inflictor:?} ({means:?})");
        }
        DamageOutcome::Gibbed => {
            info!("{target:?} gibbed by {inflictor:?} ({means:?})");
            if let Some(mut collider) = world.get_mut::<BoxCollider>(target) {
                collider.solid = false;
            }
            world.entity_mut(target).remove::<GroundEntity>();
        }
        DamageOutcome::Removed => {
            info!("{target:?} removed by {inflictor:?} ({means:?})");
            world.despawn(target);
        }
    }

    world.trigger(DamageEvent {
        target,
        inflictor,
        amount,
        means,
        outcome,
    });
    Some(outcome)
}

/// Deal lethal damage to `target`.
pub fn destroy(world: &mut World, target: Entity, inflictor: Entity) -> Option<DamageOutcome> {
    let amount = world
        .get_resource::<PushConfig>()
        .map(|c| c.lethal_damage)
        .unwrap_or_else(|| PushConfig::default().lethal_damage);
    apply_damage(world, target, inflictor, amount, MeansOfDeath::Telefrag)
}
