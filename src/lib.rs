//! Aberred Push library.
//!
//! Server-side mover physics: doors, platforms, trains and rotators push,
//! carry, strand and crush the entities in their way, one atomic
//! transaction per mover team per tick. This module exposes the ECS
//! components, resources, systems, and events for use in integration tests
//! and as a reusable library.

pub mod components;
pub mod events;
pub mod game;
pub mod resources;
pub mod systems;
