use bevy_ecs::prelude::Component;
use glam::{Mat3, Vec3};

/// Orientation as pitch/yaw/roll in degrees. Yaw turns about +Z.
#[derive(Component, Clone, Debug, Copy, Default, PartialEq)]
pub struct Rotation {
    pub angles: Vec3,
}

impl Rotation {
    pub fn new(pitch: f32, yaw: f32, roll: f32) -> Self {
        Self {
            angles: Vec3::new(pitch, yaw, roll),
        }
    }
}

/// Rotation matrix for pitch/yaw/roll angles in degrees.
/// Roll is applied first, then pitch, then yaw.
pub fn rotation_matrix(angles: Vec3) -> Mat3 {
    let pitch = angles.x.to_radians();
    let yaw = angles.y.to_radians();
    let roll = angles.z.to_radians();
    Mat3::from_rotation_z(yaw) * Mat3::from_rotation_y(pitch) * Mat3::from_rotation_x(roll)
}

/// Offset a point picks up when rotated by `angles` about `pivot`.
///
/// Returns `rotated - point`, so adding it to `point` yields the point's
/// position after the rotation.
pub fn rotation_offset(point: Vec3, pivot: Vec3, angles: Vec3) -> Vec3 {
    if angles == Vec3::ZERO {
        return Vec3::ZERO;
    }
    let local = point - pivot;
    rotation_matrix(angles) * local - local
}
