//! Damage notifications.
//!
//! Score and kill bookkeeping lives outside the push engine; it observes
//! [`DamageEvent`] to learn who got crushed by what.

use bevy_ecs::observer::On;
use bevy_ecs::prelude::*;

/// How the damage was dealt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeansOfDeath {
    /// Squeezed by a blocked mover.
    Crush,
    /// Hit by an unstoppable mover, or removed by a blocked-reaction.
    Telefrag,
}

/// What the damage did to the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DamageOutcome {
    /// The target survived, possibly with hp at or below zero.
    Hurt,
    /// The target was destroyed and made non-solid.
    Gibbed,
    /// The target had no health and was removed from the world.
    Removed,
}

#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct DamageEvent {
    pub target: Entity,
    pub inflictor: Entity,
    pub amount: i32,
    pub means: MeansOfDeath,
    pub outcome: DamageOutcome,
}

/// Logs damage that destroyed its target.
pub fn damage_observer(trigger: On<DamageEvent>) {
    let ev = trigger.event();
    if ev.outcome != DamageOutcome::Hurt {
        log::info!(
            "{:?} {:?} by {:?} ({:?}, {} damage)",
            ev.target,
            ev.outcome,
            ev.inflictor,
            ev.means,
            ev.amount
        );
    }
}
