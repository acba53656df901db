use bevy_ecs::prelude::Component;

/// Client view correction in degrees.
///
/// A player carried around by a rotating mover has its view yaw turned by
/// the same amount so it keeps facing the same way relative to the mover.
#[derive(Component, Clone, Copy, Debug, Default, PartialEq)]
pub struct ViewAngles {
    pub delta_yaw: f32,
}
