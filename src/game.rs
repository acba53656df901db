//! World setup and the per-tick schedule.
//!
//! [`setup_world`] builds a [`World`] with every resource the push engine
//! reads and the logging observers registered. [`build_schedule`] returns
//! the per-tick schedule and [`tick`] advances time and runs it once.

use bevy_ecs::observer::Observer;
use bevy_ecs::prelude::*;

use crate::events::damage::damage_observer;
use crate::events::mover::{mover_blocked_observer, mover_reached_observer};
use crate::resources::pushconfig::PushConfig;
use crate::resources::worldgeometry::WorldGeometry;
use crate::resources::worldtime::WorldTime;
use crate::systems::mover::mover_system;
use crate::systems::time::update_world_time;

/// Create a world holding `config`, fresh time, empty geometry, and the
/// logging observers.
pub fn setup_world(config: PushConfig) -> World {
    let mut world = World::new();
    world.insert_resource(WorldTime::default());
    world.insert_resource(WorldGeometry::default());
    world.insert_resource(config);

    world.spawn(Observer::new(mover_blocked_observer));
    world.spawn(Observer::new(mover_reached_observer));
    world.spawn(Observer::new(damage_observer));
    // Observers must exist before any system triggers events.
    world.flush();
    world
}

pub fn build_schedule() -> Schedule {
    let mut update = Schedule::default();
    update.add_systems(mover_system);
    update
}

/// Advance time by `dt` seconds and run one tick.
pub fn tick(world: &mut World, schedule: &mut Schedule, dt: f32) {
    update_world_time(world, dt);
    schedule.run(world);
}
