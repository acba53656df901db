//! Engine systems.
//!
//! This module groups the ECS systems that advance the simulation.
//!
//! Submodules overview
//! - [`damage`] – hurt, gib or remove entities hit by movers
//! - [`mover`] – mover team coordinator: evaluate trajectories, push, hold back
//! - [`pusher`] – the push transaction engine
//! - [`scenario`] – spawn entities and world geometry from scenario data
//! - [`time`] – update simulation time, delta, and frame counter

pub mod damage;
pub mod mover;
pub mod pusher;
pub mod scenario;
pub mod time;
