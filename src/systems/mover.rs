//! Mover team coordinator.
//!
//! Each tick every team captain evaluates its parts' trajectories and
//! pushes them through the world in order. A team moves as one unit: if any
//! part is stopped, every part goes back to where its trajectory had it one
//! tick earlier, whatever earlier parts pushed is restored, and the
//! obstacles get the mover's blocked reaction. Riders left behind and
//! entities crushed by earlier parts are only dealt with once every part
//! got through.
//!
//! # Events
//!
//! - [`MoverBlockedEvent`] once per distinct obstacle of a blocked team
//! - [`MoverReachedEvent`] when a part arrives at the end of a
//!   linear-stop trajectory; the part then comes to rest there

use bevy_ecs::prelude::*;
use glam::Vec3;
use log::{debug, info, warn};
use smallvec::{SmallVec, smallvec};

use crate::components::mapposition::MapPosition;
use crate::components::mover::{BlockedReaction, Mover};
use crate::components::rotation::Rotation;
use crate::components::team::{Team, TeamSlave};
use crate::components::trajectory::Trajectory;
use crate::events::damage::MeansOfDeath;
use crate::events::mover::{MoverBlockedEvent, MoverReachedEvent};
use crate::resources::pushconfig::PushConfig;
use crate::resources::worldtime::WorldTime;
use crate::systems::damage::{apply_damage, destroy};
use crate::systems::pusher::classify::entity_class;
use crate::systems::pusher::{MAX_PUSHED, PushTransaction, finish_team, push_mover};

/// What happened to a team this tick.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TeamOutcome {
    /// No part had anywhere to go.
    Idle,
    Moved,
    /// `part` was stopped by `obstacles`; the whole team was held back.
    Blocked {
        part: Entity,
        obstacles: SmallVec<[Entity; 4]>,
    },
}

/// Run every mover team once. Captains are visited in entity order.
pub fn mover_system(world: &mut World) {
    let mut captains: Vec<Entity> = world
        .query_filtered::<Entity, (With<Mover>, Without<TeamSlave>)>()
        .iter(world)
        .collect();
    captains.sort_unstable();

    for captain in captains {
        run_mover_team(world, captain);
    }
}

/// Move the team led by `captain` for the current tick.
///
/// # Panics
///
/// Panics if a team member has no [`Mover`] or no [`MapPosition`].
pub fn run_mover_team(world: &mut World, captain: Entity) -> TeamOutcome {
    let time = world
        .get_resource::<WorldTime>()
        .copied()
        .unwrap_or_default();
    let max_pushed = world
        .get_resource::<PushConfig>()
        .map(|c| c.max_pushed)
        .unwrap_or(MAX_PUSHED);
    let members: SmallVec<[Entity; 4]> = world
        .get::<Team>(captain)
        .map(|team| team.members.clone())
        .unwrap_or_else(|| smallvec![captain]);

    let mut tx = PushTransaction::new(max_pushed);
    let mut moved = false;
    let mut blocked = None;

    for &part in &members {
        let mover = world
            .get::<Mover>(part)
            .unwrap_or_else(|| panic!("team member {part:?} of {captain:?} is not a mover"));
        if mover.is_stationary() {
            continue;
        }
        let target = mover.pos.evaluate(time.elapsed);
        let target_angles = mover.apos.evaluate(time.elapsed);
        let origin = world
            .get::<MapPosition>(part)
            .map(|p| p.pos)
            .unwrap_or_else(|| panic!("mover {part:?} has no MapPosition"));
        let angles = world
            .get::<Rotation>(part)
            .map(|r| r.angles)
            .unwrap_or(Vec3::ZERO);

        let linear = target - origin;
        let angular = target_angles - angles;
        if linear == Vec3::ZERO && angular == Vec3::ZERO {
            continue;
        }

        moved = true;
        let outcome = push_mover(world, &mut tx, part, linear, angular);
        if !outcome.accepted {
            blocked = Some((part, outcome.obstacles));
            break;
        }
    }

    if let Some((part, obstacles)) = blocked {
        tx.rollback_journal(world);
        hold_team(world, &members, &time);
        dispatch_blocked(world, part, &obstacles);
        info!("mover {part:?} blocked by {obstacles:?}");
        return TeamOutcome::Blocked { part, obstacles };
    }

    finish_team(world, &mut tx);
    for &part in &members {
        settle_if_reached(world, part, time.elapsed);
    }

    if moved {
        TeamOutcome::Moved
    } else {
        TeamOutcome::Idle
    }
}

/// Delay every part's trajectories by one tick and snap the part to the
/// delayed position.
fn hold_team(world: &mut World, members: &[Entity], time: &WorldTime) {
    for &part in members {
        let Some(mut mover) = world.get_mut::<Mover>(part) else {
            continue;
        };
        if mover.is_stationary() {
            continue;
        }
        mover.pos.hold(time.delta);
        mover.apos.hold(time.delta);
        let pos = mover.pos.evaluate(time.elapsed);
        let angles = mover.apos.evaluate(time.elapsed);

        if let Some(mut map_pos) = world.get_mut::<MapPosition>(part) {
            map_pos.pos = pos;
        }
        if let Some(mut rot) = world.get_mut::<Rotation>(part) {
            rot.angles = angles;
        }
        debug!("mover {part:?} held at {pos}");
    }
}

fn dispatch_blocked(world: &mut World, part: Entity, obstacles: &[Entity]) {
    let Some(mover) = world.get::<Mover>(part).cloned() else {
        return;
    };
    let mut seen: SmallVec<[Entity; 4]> = SmallVec::new();
    for &obstacle in obstacles {
        if seen.contains(&obstacle) || world.get_entity(obstacle).is_err() {
            continue;
        }
        seen.push(obstacle);

        let Some(class) = entity_class(world, obstacle) else {
            warn!("obstacle {obstacle:?} has no entity class");
            continue;
        };
        let reverse = match mover.kind.blocked_reaction(class, mover.damage, mover.crusher) {
            BlockedReaction::Ignore => false,
            BlockedReaction::Crush { damage, reverse } => {
                if damage > 0 {
                    apply_damage(world, obstacle, part, damage, MeansOfDeath::Crush);
                }
                reverse
            }
            BlockedReaction::Destroy => {
                destroy(world, obstacle, part);
                false
            }
        };
        world.trigger(MoverBlockedEvent {
            mover: part,
            obstacle,
            reverse,
        });
    }
}

/// Bring a part that finished its linear-stop move to rest at the endpoint.
fn settle_if_reached(world: &mut World, part: Entity, now: f32) {
    let Some(mut mover) = world.get_mut::<Mover>(part) else {
        return;
    };
    if !mover.reached(now) {
        return;
    }
    if mover.pos.reached(now) {
        mover.pos = Trajectory::stationary(mover.pos.evaluate(now));
    }
    if mover.apos.reached(now) {
        mover.apos = Trajectory::stationary(mover.apos.evaluate(now));
    }
    debug!("mover {part:?} reached its destination");
    world.trigger(MoverReachedEvent { mover: part });
}
