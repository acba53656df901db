//! Mover outcome events.
//!
//! The mover team coordinator reports back to the mover FSM through these
//! events. The FSM owns what happens next: reversing a door, playing a
//! sound, firing targets.
//!
//! # Example
//!
//! ```ignore
//! world.add_observer(|trigger: On<MoverBlockedEvent>| {
//!     let ev = trigger.event();
//!     if ev.reverse {
//!         // flip the door's trajectory
//!     }
//! });
//! ```

use bevy_ecs::observer::On;
use bevy_ecs::prelude::*;

/// A mover team could not complete its move this tick.
///
/// Triggered once per distinct obstacle, after the obstacle's blocked
/// reaction (damage or removal) has been applied.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoverBlockedEvent {
    /// The team part whose push was rejected.
    pub mover: Entity,
    /// The entity that stopped it.
    pub obstacle: Entity,
    /// The mover's kind asks to turn around.
    pub reverse: bool,
}

/// A mover part arrived at the end of its trajectory.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoverReachedEvent {
    pub mover: Entity,
}

/// Logs blocked movers.
pub fn mover_blocked_observer(trigger: On<MoverBlockedEvent>) {
    let ev = trigger.event();
    log::info!(
        "mover {:?} blocked by {:?}{}",
        ev.mover,
        ev.obstacle,
        if ev.reverse { ", reversing" } else { "" }
    );
}

/// Logs movers arriving at their destination.
pub fn mover_reached_observer(trigger: On<MoverReachedEvent>) {
    log::info!("mover {:?} reached its destination", trigger.event().mover);
}
