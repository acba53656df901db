//! Static level geometry.
//!
//! The world brushes never move and never get pushed. The push engine
//! only needs to know whether a box would end up inside one of them.

use bevy_ecs::prelude::Resource;

use crate::components::boxcollider::{Aabb, Obb};

#[derive(Resource, Debug, Clone, Default)]
pub struct WorldGeometry {
    pub solids: Vec<Aabb>,
}

impl WorldGeometry {
    pub fn with_solid(mut self, solid: Aabb) -> Self {
        self.solids.push(solid);
        self
    }

    /// True if `shape` penetrates any world solid.
    pub fn blocks(&self, shape: &Obb) -> bool {
        let broad = shape.bounds();
        self.solids
            .iter()
            .any(|s| s.intersects(&broad) && Obb::from(*s).intersects(shape))
    }
}
