//! Applying or discarding a resolved push.

use bevy_ecs::prelude::*;
use log::{debug, info};

use crate::components::groundentity::GroundEntity;
use crate::components::lastpusher::LastPusher;
use crate::components::mapposition::MapPosition;
use crate::components::viewangles::ViewAngles;
use crate::events::damage::MeansOfDeath;
use crate::resources::pushconfig::PushConfig;
use crate::systems::damage::apply_damage;
use crate::systems::pusher::transaction::{PushTransaction, UndoEntry};

/// Move every entity that is free to move.
///
/// The pre-commit state of each moved entity goes into the team journal.
/// Blocked entities are queued to lose their ground and crushed ones to
/// take lethal damage; [`finish_team`] applies both.
pub fn commit(world: &mut World, tx: &mut PushTransaction, frame: u64) {
    let prime = tx.prime();
    let yaw = tx.angular().y;
    let mut moved = Vec::new();
    let mut stranded = Vec::new();
    let mut crushed = Vec::new();
    for record in tx.records().iter().filter(|r| r.queued) {
        if record.crushed {
            crushed.push(record.entity);
        } else if record.block.is_blocked() {
            stranded.push(record.entity);
        } else {
            moved.push((record.entity, record.destination()));
        }
    }

    for (entity, destination) in moved {
        tx.journal(UndoEntry::capture(world, entity));
        if let Some(mut pos) = world.get_mut::<MapPosition>(entity) {
            pos.pos = destination;
        }
        if let Some(mut view) = world.get_mut::<ViewAngles>(entity) {
            view.delta_yaw += yaw;
        }
        world.entity_mut(entity).insert(LastPusher {
            entity: prime,
            frame,
        });
    }

    for entity in stranded {
        tx.defer_strand(entity);
    }
    for victim in crushed {
        tx.defer_crush(victim);
    }
}

/// Apply the effects queued by every accepted push of the team: stranded
/// entities lose their ground, crushed entities take lethal damage.
pub fn finish_team(world: &mut World, tx: &mut PushTransaction) {
    let (stranded, crushed) = tx.take_deferred();
    for (entity, mover) in stranded {
        let Ok(mut entity_mut) = world.get_entity_mut(entity) else {
            continue;
        };
        if entity_mut.take::<GroundEntity>().is_some() {
            debug!(target: "push", "{entity:?} left behind by {mover:?}");
        }
    }

    if crushed.is_empty() {
        return;
    }
    let lethal_damage = world
        .get_resource::<PushConfig>()
        .map(|c| c.lethal_damage)
        .unwrap_or_else(|| PushConfig::default().lethal_damage);
    for (victim, mover) in crushed {
        info!(target: "push", "{mover:?} cannot be stopped, crushing {victim:?}");
        apply_damage(world, victim, mover, lethal_damage, MeansOfDeath::Crush);
    }
}

/// Put every entity touched by the rejected push back where it was.
pub fn rollback(world: &mut World, tx: &mut PushTransaction) {
    tx.rollback(world);
}
