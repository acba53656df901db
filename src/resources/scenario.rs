//! Scenario description loaded from JSON.
//!
//! A scenario lists the static world solids and the entities to spawn.
//! [`crate::systems::scenario::spawn_scenario`] turns it into ECS entities.
//!
//! # JSON Format
//!
//! ```json
//! {
//!   "world": [ { "mins": [-256, -256, -16], "maxs": [256, 256, 0] } ],
//!   "entities": [
//!     {
//!       "name": "lift",
//!       "class": "mover",
//!       "origin": [0, 0, 0],
//!       "mins": [-32, -32, 0], "maxs": [32, 32, 8],
//!       "mover": {
//!         "kind": "plat",
//!         "pos": {
//!           "kind": "linear_stop", "base": [0, 0, 0], "delta": [0, 0, 32], "duration": 2.0
//!         }
//!       }
//!     },
//!     { "name": "player", "class": "player", "origin": [0, 0, 8],
//!       "mins": [-15, -15, 0], "maxs": [15, 15, 56], "health": 100, "ground": "lift" }
//!   ]
//! }
//! ```
//!
//! For `linear_stop` trajectories `delta` is the total travel, not a
//! velocity; it is converted with `duration` when spawning. A trajectory
//! without `base` starts from the entity's `origin` (for `pos`) or `angles`
//! (for `apos`); an omitted trajectory keeps the entity where it spawned.

use serde::{Deserialize, Serialize};

use crate::components::entityclass::EntityClass;
use crate::components::mover::MoverKind;
use crate::components::trajectory::TrajectoryKind;

/// A static world box.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolidData {
    pub mins: [f32; 3],
    pub maxs: [f32; 3],
}

/// Trajectory as written in a scenario file.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TrajectoryData {
    #[serde(default)]
    pub kind: TrajectoryKind,
    /// Defaults to the entity's spawn origin or angles.
    #[serde(default)]
    pub base: Option<[f32; 3]>,
    #[serde(default)]
    pub delta: [f32; 3],
    #[serde(default)]
    pub start: f32,
    #[serde(default)]
    pub duration: f32,
}

/// Mover settings of a scenario entity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoverData {
    pub kind: MoverKind,
    #[serde(default)]
    pub pos: TrajectoryData,
    #[serde(default)]
    pub apos: TrajectoryData,
    #[serde(default)]
    pub damage: i32,
    #[serde(default)]
    pub crusher: bool,
    /// Entities sharing a team name move as one unit. The first one listed
    /// becomes the captain.
    #[serde(default)]
    pub team: Option<String>,
}

/// One entity of a scenario.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityData {
    pub name: String,
    pub class: EntityClass,
    #[serde(default)]
    pub origin: [f32; 3],
    #[serde(default)]
    pub angles: [f32; 3],
    pub mins: [f32; 3],
    pub maxs: [f32; 3],
    #[serde(default)]
    pub health: Option<i32>,
    /// Name of the entity this one stands on.
    #[serde(default)]
    pub ground: Option<String>,
    #[serde(default)]
    pub mover: Option<MoverData>,
}

/// Complete scenario file.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ScenarioData {
    #[serde(default)]
    pub world: Vec<SolidData>,
    #[serde(default)]
    pub entities: Vec<EntityData>,
}

impl ScenarioData {
    /// Loads a scenario from a JSON file at the specified path.
    pub fn load_from_file(path: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let file_content = std::fs::read_to_string(path)?;
        let scenario: ScenarioData = serde_json::from_str(&file_content)?;
        Ok(scenario)
    }
}
