//! Kinematic mover component and per-kind reactions.
//!
//! A [`Mover`] owns the trajectories of a door, platform, train, etc. The
//! trajectories are written by the mover FSM and read by the mover team
//! coordinator ([`crate::systems::mover`]) which turns them into pushes.
//!
//! What a mover does when something stops it depends on its [`MoverKind`];
//! [`MoverKind::blocked_reaction`] is the single dispatch point.

use bevy_ecs::prelude::Component;
use serde::{Deserialize, Serialize};

use crate::components::entityclass::EntityClass;
use crate::components::trajectory::Trajectory;

/// The closed set of mover kinds.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoverKind {
    Door,
    Plat,
    Button,
    Train,
    Static,
    Rotator,
    Bobber,
    Pendulum,
}

/// What a blocked mover does to the entity that stopped it.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BlockedReaction {
    /// Nothing happens to the obstacle.
    Ignore,
    /// Deal `damage` to the obstacle; `reverse` asks the FSM to turn around.
    Crush { damage: i32, reverse: bool },
    /// Remove the obstacle outright.
    Destroy,
}

impl MoverKind {
    /// Reaction of a mover of this kind towards an obstacle of class `obstacle`.
    pub fn blocked_reaction(
        &self,
        obstacle: EntityClass,
        damage: i32,
        crusher: bool,
    ) -> BlockedReaction {
        match self {
            MoverKind::Door | MoverKind::Plat | MoverKind::Button => match obstacle {
                EntityClass::Player | EntityClass::Buildable { .. } => BlockedReaction::Crush {
                    damage,
                    reverse: !crusher,
                },
                EntityClass::Item | EntityClass::Corpse | EntityClass::PhysicsObject => {
                    BlockedReaction::Destroy
                }
                EntityClass::Mover | EntityClass::Other => BlockedReaction::Ignore,
            },
            MoverKind::Train => match obstacle {
                EntityClass::Player => BlockedReaction::Crush {
                    damage,
                    reverse: false,
                },
                _ => BlockedReaction::Destroy,
            },
            MoverKind::Rotator => BlockedReaction::Crush {
                damage,
                reverse: false,
            },
            MoverKind::Static | MoverKind::Bobber | MoverKind::Pendulum => {
                BlockedReaction::Ignore
            }
        }
    }
}

/// A kinematic entity following scripted trajectories.
#[derive(Component, Clone, Debug)]
pub struct Mover {
    pub kind: MoverKind,
    /// Trajectory of the origin.
    pub pos: Trajectory,
    /// Trajectory of the angles (degrees).
    pub apos: Trajectory,
    /// Damage dealt to a blocking entity.
    pub damage: i32,
    /// Crushers keep going instead of reversing when blocked.
    pub crusher: bool,
}

impl Mover {
    pub fn new(kind: MoverKind) -> Self {
        Self {
            kind,
            pos: Trajectory::default(),
            apos: Trajectory::default(),
            damage: 0,
            crusher: false,
        }
    }

    pub fn with_pos(mut self, pos: Trajectory) -> Self {
        self.pos = pos;
        self
    }

    pub fn with_apos(mut self, apos: Trajectory) -> Self {
        self.apos = apos;
        self
    }

    pub fn with_damage(mut self, damage: i32) -> Self {
        self.damage = damage;
        self
    }

    pub fn with_crusher(mut self, crusher: bool) -> Self {
        self.crusher = crusher;
        self
    }

    pub fn is_stationary(&self) -> bool {
        self.pos.is_stationary() && self.apos.is_stationary()
    }

    /// Sine movers cannot be stopped; whatever blocks them dies instead.
    pub fn is_lethal(&self) -> bool {
        self.pos.is_sine() || self.apos.is_sine()
    }

    /// True when a linear-stop trajectory has arrived at its endpoint.
    pub fn reached(&self, time: f32) -> bool {
        self.pos.reached(time) || self.apos.reached(time)
    }
}
