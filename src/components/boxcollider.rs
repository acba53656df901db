use bevy_ecs::prelude::Component;
use glam::{Mat3, Vec3};

use crate::components::rotation::rotation_matrix;

/// Boxes closer than this are treated as touching, not overlapping.
///
/// A rider resting on a platform shares a face with it; float drift from
/// repeated trajectory evaluation must not turn that into a collision.
pub const OVERLAP_EPSILON: f32 = 1e-3;

/// Axis-aligned box in world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub mins: Vec3,
    pub maxs: Vec3,
}

impl Aabb {
    pub fn new(mins: Vec3, maxs: Vec3) -> Self {
        Self {
            mins: mins.min(maxs),
            maxs: mins.max(maxs),
        }
    }

    pub fn translated(&self, delta: Vec3) -> Self {
        Self {
            mins: self.mins + delta,
            maxs: self.maxs + delta,
        }
    }

    /// Strict overlap test; shared faces do not count.
    pub fn intersects(&self, other: &Aabb) -> bool {
        self.mins.x < other.maxs.x - OVERLAP_EPSILON
            && self.maxs.x > other.mins.x + OVERLAP_EPSILON
            && self.mins.y < other.maxs.y - OVERLAP_EPSILON
            && self.maxs.y > other.mins.y + OVERLAP_EPSILON
            && self.mins.z < other.maxs.z - OVERLAP_EPSILON
            && self.maxs.z > other.mins.z + OVERLAP_EPSILON
    }
}

/// Oriented box in world space: the exact shape of a rotated collider.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Obb {
    pub center: Vec3,
    /// Local x, y and z axes as columns.
    pub axes: Mat3,
    pub half: Vec3,
}

impl Obb {
    pub fn is_axis_aligned(&self) -> bool {
        self.axes == Mat3::IDENTITY
    }

    /// Smallest axis-aligned box holding every corner.
    pub fn bounds(&self) -> Aabb {
        let extent = self.axes.x_axis.abs() * self.half.x
            + self.axes.y_axis.abs() * self.half.y
            + self.axes.z_axis.abs() * self.half.z;
        Aabb {
            mins: self.center - extent,
            maxs: self.center + extent,
        }
    }

    fn projected_radius(&self, axis: Vec3) -> f32 {
        self.half.x * self.axes.x_axis.dot(axis).abs()
            + self.half.y * self.axes.y_axis.dot(axis).abs()
            + self.half.z * self.axes.z_axis.dot(axis).abs()
    }

    /// Strict overlap by separating axes; shared faces do not count.
    pub fn intersects(&self, other: &Obb) -> bool {
        if self.is_axis_aligned() && other.is_axis_aligned() {
            return self.bounds().intersects(&other.bounds());
        }

        let between = other.center - self.center;
        let separates = |axis: Vec3| {
            let Some(axis) = axis.try_normalize() else {
                // parallel edges; covered by the face axes
                return false;
            };
            let reach = self.projected_radius(axis) + other.projected_radius(axis);
            between.dot(axis).abs() >= reach - OVERLAP_EPSILON
        };

        let ours = [self.axes.x_axis, self.axes.y_axis, self.axes.z_axis];
        let theirs = [other.axes.x_axis, other.axes.y_axis, other.axes.z_axis];
        if ours.iter().chain(theirs.iter()).any(|&axis| separates(axis)) {
            return false;
        }
        !ours
            .iter()
            .any(|a| theirs.iter().any(|b| separates(a.cross(*b))))
    }
}

impl From<Aabb> for Obb {
    fn from(aabb: Aabb) -> Self {
        Self {
            center: (aabb.mins + aabb.maxs) * 0.5,
            axes: Mat3::IDENTITY,
            half: (aabb.maxs - aabb.mins) * 0.5,
        }
    }
}

/// Solid bounding box of an entity, relative to its origin.
///
/// `solid == false` is the zero-contents state: the entity neither blocks
/// nor can be pushed.
#[derive(Debug, Clone, Copy, PartialEq, Component)]
pub struct BoxCollider {
    pub mins: Vec3,
    pub maxs: Vec3,
    pub solid: bool,
}

impl BoxCollider {
    /// Create a solid BoxCollider from local mins/maxs.
    pub fn new(mins: Vec3, maxs: Vec3) -> Self {
        Self {
            mins: mins.min(maxs),
            maxs: mins.max(maxs),
            solid: true,
        }
    }

    /// Create a solid box of the given size centred on the origin.
    pub fn centered(size: Vec3) -> Self {
        Self::new(-size * 0.5, size * 0.5)
    }

    pub fn non_solid(mut self) -> Self {
        self.solid = false;
        self
    }

    /// World shape at `origin` with orientation `angles`. The box turns
    /// about the origin, not about its own centre.
    pub fn world_box(&self, origin: Vec3, angles: Vec3) -> Obb {
        let local_center = (self.mins + self.maxs) * 0.5;
        let half = (self.maxs - self.mins) * 0.5;
        if angles == Vec3::ZERO {
            return Obb {
                center: origin + local_center,
                axes: Mat3::IDENTITY,
                half,
            };
        }
        let axes = rotation_matrix(angles);
        Obb {
            center: origin + axes * local_center,
            axes,
            half,
        }
    }

    /// Axis-aligned world bounds at `origin` with orientation `angles`.
    pub fn world_bounds(&self, origin: Vec3, angles: Vec3) -> Aabb {
        if angles == Vec3::ZERO {
            return Aabb {
                mins: origin + self.mins,
                maxs: origin + self.maxs,
            };
        }
        self.world_box(origin, angles).bounds()
    }
}
