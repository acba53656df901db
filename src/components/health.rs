use bevy_ecs::prelude::Component;

/// Hit points of a damageable entity.
///
/// `gibbed` marks an entity that has been destroyed outright; it stays in
/// the world only until its owner cleans it up and must be ignored by
/// collision in the meantime.
#[derive(Component, Clone, Copy, Debug, PartialEq, Eq)]
pub struct Health {
    pub hp: i32,
    pub gibbed: bool,
}

impl Health {
    pub fn new(hp: i32) -> Self {
        Self { hp, gibbed: false }
    }

    pub fn is_dead(&self) -> bool {
        self.hp <= 0
    }
}
