//! Parametric motion for movers.
//!
//! A [`Trajectory`] describes where a mover's origin (or angles) should be
//! at any simulation time. The mover FSM writes trajectories; the mover
//! team coordinator evaluates them each tick to find the displacement it
//! has to push through the world.
//!
//! Supported shapes:
//! - [`TrajectoryKind::Stationary`] – stays at `base`
//! - [`TrajectoryKind::Linear`] – constant velocity `delta` forever
//! - [`TrajectoryKind::LinearStop`] – constant velocity for `duration`, then stops
//! - [`TrajectoryKind::Sine`] – oscillates around `base` with amplitude `delta`
//!   and period `duration` (bobbers, pendulums)
//!
//! All times are in seconds of [`WorldTime::elapsed`](crate::resources::worldtime::WorldTime).

use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::f32::consts::TAU;

/// Shape of a trajectory.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TrajectoryKind {
    #[default]
    Stationary,
    Linear,
    LinearStop,
    Sine,
}

/// Position (or angles) as a function of time.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Trajectory {
    pub kind: TrajectoryKind,
    /// Value at `start`, or the centre of oscillation for `Sine`.
    pub base: Vec3,
    /// Velocity for linear kinds, amplitude for `Sine`.
    pub delta: Vec3,
    /// Time the motion began.
    pub start: f32,
    /// Travel time for `LinearStop`, period for `Sine`.
    pub duration: f32,
}

impl Default for Trajectory {
    fn default() -> Self {
        Self::stationary(Vec3::ZERO)
    }
}

impl Trajectory {
    pub fn stationary(base: Vec3) -> Self {
        Trajectory {
            kind: TrajectoryKind::Stationary,
            base,
            delta: Vec3::ZERO,
            start: 0.0,
            duration: 0.0,
        }
    }

    pub fn linear(base: Vec3, velocity: Vec3, start: f32) -> Self {
        Trajectory {
            kind: TrajectoryKind::Linear,
            base,
            delta: velocity,
            start,
            duration: 0.0,
        }
    }

    /// Move from `from` to `to` in `duration` seconds starting at `start`.
    pub fn linear_stop(from: Vec3, to: Vec3, start: f32, duration: f32) -> Self {
        let velocity = if duration > 0.0 {
            (to - from) / duration
        } else {
            Vec3::ZERO
        };
        Trajectory {
            kind: TrajectoryKind::LinearStop,
            base: from,
            delta: velocity,
            start,
            duration,
        }
    }

    pub fn sine(base: Vec3, amplitude: Vec3, start: f32, period: f32) -> Self {
        Trajectory {
            kind: TrajectoryKind::Sine,
            base,
            delta: amplitude,
            start,
            duration: period,
        }
    }

    pub fn is_stationary(&self) -> bool {
        self.kind == TrajectoryKind::Stationary
    }

    pub fn is_sine(&self) -> bool {
        self.kind == TrajectoryKind::Sine
    }

    pub fn end_time(&self) -> f32 {
        self.start + self.duration
    }

    /// True once a `LinearStop` trajectory has arrived at its endpoint.
    /// Other kinds never "arrive".
    pub fn reached(&self, time: f32) -> bool {
        self.kind == TrajectoryKind::LinearStop && time >= self.end_time()
    }

    /// Evaluate the trajectory at `time`.
    pub fn evaluate(&self, time: f32) -> Vec3 {
        match self.kind {
            TrajectoryKind::Stationary => self.base,
            TrajectoryKind::Linear => self.base + self.delta * (time - self.start),
            TrajectoryKind::LinearStop => {
                let t = time.min(self.end_time());
                let elapsed = (t - self.start).max(0.0);
                self.base + self.delta * elapsed
            }
            TrajectoryKind::Sine => {
                if self.duration <= 0.0 {
                    return self.base;
                }
                let phase = ((time - self.start) / self.duration * TAU).sin();
                self.base + self.delta * phase
            }
        }
    }

    /// Delay the whole motion by `dt` seconds.
    ///
    /// Used when a move is rejected: evaluating at the current time then
    /// gives the position the trajectory had one tick earlier.
    pub fn hold(&mut self, dt: f32) {
        if !self.is_stationary() {
            self.start += dt;
        }
    }
}
