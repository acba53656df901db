//! Mover teams.
//!
//! Several movers can act as one logical unit (both leaves of a double
//! door, a platform and its rails). The captain carries [`Team`] listing
//! every part, itself first; every other part carries [`TeamSlave`] so the
//! coordinator skips it when iterating captains.

use bevy_ecs::prelude::{Component, Entity};
use smallvec::SmallVec;

/// Ordered list of team parts. Lives on the captain.
#[derive(Component, Clone, Debug, Default)]
pub struct Team {
    pub members: SmallVec<[Entity; 4]>,
}

impl Team {
    pub fn new(captain: Entity) -> Self {
        let mut members = SmallVec::new();
        members.push(captain);
        Self { members }
    }

    pub fn with_member(mut self, member: Entity) -> Self {
        self.push(member);
        self
    }

    pub fn push(&mut self, member: Entity) {
        if !self.members.contains(&member) {
            self.members.push(member);
        }
    }
}

/// Marks a non-captain team part.
#[derive(Component, Clone, Copy, Debug, PartialEq, Eq)]
pub struct TeamSlave {
    pub captain: Entity,
}
