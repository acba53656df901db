//! ECS components for entities.
//!
//! This module groups all component types that take part in mover pushing:
//! placement, collision, classification, ground references, and the movers
//! themselves.
//!
//! Submodules overview:
//! - [`boxcollider`] – local bounds and the world-space [`boxcollider::Aabb`]
//! - [`entityclass`] – player/buildable/mover/... classification
//! - [`groundentity`] – which entity this one is standing on
//! - [`health`] – hit points and the gibbed state
//! - [`lastpusher`] – the mover that displaced an entity most recently
//! - [`mapposition`] – world-space origin
//! - [`mover`] – mover kinds, trajectories, and blocked reactions
//! - [`rotation`] – pitch/yaw/roll and rotation-about-pivot math
//! - [`targetname`] – human-readable entity name
//! - [`team`] – multi-part mover teams
//! - [`trajectory`] – parametric motion evaluated each tick
//! - [`viewangles`] – client view-yaw correction

pub mod boxcollider;
pub mod entityclass;
pub mod groundentity;
pub mod health;
pub mod lastpusher;
pub mod mapposition;
pub mod mover;
pub mod rotation;
pub mod targetname;
pub mod team;
pub mod trajectory;
pub mod viewangles;
