//! ECS resources made available to systems.
//!
//! This module groups the long-lived data injected into the ECS world and
//! accessed by systems during execution.
//!
//! Overview
//! - `pushconfig` – tunables of the push engine, loaded from INI
//! - `scenario` – JSON description of a world to spawn
//! - `worldgeometry` – static level solids used by collision tests
//! - `worldtime` – simulation time, delta, and frame counter
pub mod pushconfig;
pub mod scenario;
pub mod worldgeometry;
pub mod worldtime;
