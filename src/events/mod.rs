//! Event types used by the engine.
//!
//! Events provide a decoupled way for the push engine to report outcomes
//! to the systems around it without depending on them.
//!
//! Submodules:
//! - [`damage`] – damage applied by blocked or unstoppable movers
//! - [`mover`] – blocked and reached notifications for the mover FSM
pub mod damage;
pub mod mover;
