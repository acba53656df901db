//! Scenario spawning.
//!
//! [`spawn_scenario`] turns a parsed [`ScenarioData`] into ECS entities:
//! world solids go into [`WorldGeometry`], every entity gets a
//! [`TargetName`], position, collider and class, and movers sharing a team
//! name are linked into a [`Team`] led by the first one listed.
//!
//! # Related
//!
//! - [`crate::resources::scenario`] – the JSON format

use bevy_ecs::prelude::*;
use glam::Vec3;
use log::info;
use rustc_hash::FxHashMap;

use crate::components::boxcollider::{Aabb, BoxCollider};
use crate::components::groundentity::GroundEntity;
use crate::components::health::Health;
use crate::components::mapposition::MapPosition;
use crate::components::mover::Mover;
use crate::components::rotation::Rotation;
use crate::components::targetname::TargetName;
use crate::components::team::{Team, TeamSlave};
use crate::components::trajectory::{Trajectory, TrajectoryKind};
use crate::components::viewangles::ViewAngles;
use crate::resources::scenario::{MoverData, ScenarioData, TrajectoryData};
use crate::resources::worldgeometry::WorldGeometry;

impl TrajectoryData {
    /// Build the runtime trajectory, starting from `rest` when no base is
    /// given. For `linear_stop`, `delta` is the total travel and is spread
    /// over `duration`.
    pub fn to_trajectory(&self, rest: Vec3) -> Trajectory {
        let base = self.base.map_or(rest, Vec3::from_array);
        let delta = Vec3::from_array(self.delta);
        match self.kind {
            TrajectoryKind::Stationary => Trajectory::stationary(base),
            TrajectoryKind::Linear => Trajectory::linear(base, delta, self.start),
            TrajectoryKind::LinearStop => {
                Trajectory::linear_stop(base, base + delta, self.start, self.duration)
            }
            TrajectoryKind::Sine => Trajectory::sine(base, delta, self.start, self.duration),
        }
    }
}

impl MoverData {
    /// Build the mover of an entity spawned at `origin` facing `angles`.
    pub fn to_mover(&self, origin: Vec3, angles: Vec3) -> Mover {
        Mover::new(self.kind)
            .with_pos(self.pos.to_trajectory(origin))
            .with_apos(self.apos.to_trajectory(angles))
            .with_damage(self.damage)
            .with_crusher(self.crusher)
    }
}

/// Spawn everything in `scenario`. Returns the entities by name.
///
/// Fails on duplicate names and on ground references to unknown names.
pub fn spawn_scenario(
    world: &mut World,
    scenario: &ScenarioData,
) -> Result<FxHashMap<String, Entity>, String> {
    let geometry = scenario.world.iter().fold(WorldGeometry::default(), |geo, solid| {
        geo.with_solid(Aabb::new(
            Vec3::from_array(solid.mins),
            Vec3::from_array(solid.maxs),
        ))
    });
    world.insert_resource(geometry);

    let mut names: FxHashMap<String, Entity> = FxHashMap::default();
    let mut teams: Vec<(String, Vec<Entity>)> = Vec::new();

    for data in &scenario.entities {
        if names.contains_key(&data.name) {
            return Err(format!("duplicate entity name '{}'", data.name));
        }
        let origin = Vec3::from_array(data.origin);
        let angles = Vec3::from_array(data.angles);
        let mut entity = world.spawn((
            TargetName::new(data.name.clone()),
            data.class,
            MapPosition::from_vec(origin),
            BoxCollider::new(Vec3::from_array(data.mins), Vec3::from_array(data.maxs)),
        ));
        if angles != Vec3::ZERO {
            entity.insert(Rotation { angles });
        }
        if let Some(hp) = data.health {
            entity.insert(Health::new(hp));
        }
        if data.class.is_player() {
            entity.insert(ViewAngles::default());
        }
        if let Some(mover) = &data.mover {
            entity.insert(mover.to_mover(origin, angles));
            if let Some(team) = &mover.team {
                let id = entity.id();
                match teams.iter_mut().find(|(name, _)| name == team) {
                    Some((_, members)) => members.push(id),
                    None => teams.push((team.clone(), vec![id])),
                }
            }
        }
        names.insert(data.name.clone(), entity.id());
    }

    for data in &scenario.entities {
        let Some(ground) = &data.ground else {
            continue;
        };
        let support = *names
            .get(ground)
            .ok_or_else(|| format!("'{}' stands on unknown entity '{}'", data.name, ground))?;
        let entity = names[&data.name];
        world.entity_mut(entity).insert(GroundEntity::new(support));
    }

    for (name, members) in &teams {
        let captain = members[0];
        let team = members[1..]
            .iter()
            .fold(Team::new(captain), |team, &member| team.with_member(member));
        world.entity_mut(captain).insert(team);
        for &member in &members[1..] {
            world.entity_mut(member).insert(TeamSlave { captain });
        }
        info!("team '{}' with {} parts", name, members.len());
    }

    info!(
        "spawned {} entities and {} world solids",
        names.len(),
        scenario.world.len()
    );
    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::entityclass::EntityClass;
    use crate::game::{build_schedule, setup_world, tick};
    use crate::resources::pushconfig::PushConfig;

    const DOORS: &str = r#"{
        "world": [ { "mins": [-128, -128, -16], "maxs": [128, 128, 0] } ],
        "entities": [
            { "name": "left", "class": "mover", "origin": [0, 0, 0],
              "mins": [-4, -32, 0], "maxs": [4, 0, 96],
              "mover": { "kind": "door", "team": "gate",
                         "pos": { "kind": "linear_stop", "base": [0, 0, 0],
                                  "delta": [0, -32, 0], "duration": 2.0 } } },
            { "name": "right", "class": "mover", "origin": [0, 0, 0],
              "mins": [-4, 0, 0], "maxs": [4, 32, 96],
              "mover": { "kind": "door", "team": "gate" } },
            { "name": "player", "class": "player", "origin": [16, 0, 0],
              "mins": [-15, -15, 0], "maxs": [15, 15, 56], "health": 100, "ground": "left" }
        ]
    }"#;

    fn load(json: &str) -> ScenarioData {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn spawns_entities_geometry_and_teams() {
        let mut world = World::new();
        let names = spawn_scenario(&mut world, &load(DOORS)).unwrap();

        let left = names["left"];
        let right = names["right"];
        let player = names["player"];

        assert_eq!(world.resource::<WorldGeometry>().solids.len(), 1);
        assert_eq!(world.get::<Team>(left).unwrap().members.as_slice(), &[left, right]);
        assert_eq!(world.get::<TeamSlave>(right).unwrap().captain, left);
        assert_eq!(world.get::<GroundEntity>(player).unwrap().entity, left);
        assert_eq!(world.get::<Health>(player).unwrap().hp, 100);
        assert!(world.get::<ViewAngles>(player).is_some());
        assert_eq!(*world.get::<EntityClass>(player).unwrap(), EntityClass::Player);
        assert_eq!(world.get::<TargetName>(left).unwrap().name(), "left");
    }

    #[test]
    fn linear_stop_delta_is_total_travel() {
        let mut world = World::new();
        let names = spawn_scenario(&mut world, &load(DOORS)).unwrap();
        let mover = world.get::<Mover>(names["left"]).unwrap();
        assert_eq!(mover.pos.kind, TrajectoryKind::LinearStop);
        assert_eq!(mover.pos.evaluate(2.0), Vec3::new(0.0, -32.0, 0.0));
        assert_eq!(mover.pos.evaluate(1.0), Vec3::new(0.0, -16.0, 0.0));
    }

    #[test]
    fn unknown_ground_is_an_error() {
        let json = r#"{ "entities": [
            { "name": "p", "class": "player", "mins": [0,0,0], "maxs": [1,1,1],
              "ground": "nowhere" }
        ] }"#;
        let mut world = World::new();
        let err = spawn_scenario(&mut world, &load(json)).unwrap_err();
        assert!(err.contains("nowhere"));
    }

    #[test]
    fn duplicate_names_are_an_error() {
        let json = r#"{ "entities": [
            { "name": "p", "class": "player", "mins": [0,0,0], "maxs": [1,1,1] },
            { "name": "p", "class": "item", "mins": [0,0,0], "maxs": [1,1,1] }
        ] }"#;
        let mut world = World::new();
        assert!(spawn_scenario(&mut world, &load(json)).is_err());
    }

    const SPINNER: &str = r#"{ "entities": [
        { "name": "spinner", "class": "mover", "origin": [200, 0, 0], "angles": [0, 30, 0],
          "mins": [-32, -4, 0], "maxs": [32, 4, 8],
          "mover": { "kind": "rotator", "apos": { "kind": "linear", "delta": [0, 90, 0] } } },
        { "name": "lift", "class": "mover", "origin": [0, 64, 0],
          "mins": [-16, -16, -8], "maxs": [16, 16, 0],
          "mover": { "kind": "plat",
                     "pos": { "kind": "linear_stop", "delta": [0, 0, 32], "duration": 1.0 } } }
    ] }"#;

    #[test]
    fn missing_trajectories_and_bases_start_at_the_spawn_pose() {
        let mut world = World::new();
        let names = spawn_scenario(&mut world, &load(SPINNER)).unwrap();

        let spinner = world.get::<Mover>(names["spinner"]).unwrap();
        assert_eq!(spinner.pos, Trajectory::stationary(Vec3::new(200.0, 0.0, 0.0)));
        assert_eq!(spinner.apos.evaluate(0.0), Vec3::new(0.0, 30.0, 0.0));

        let lift = world.get::<Mover>(names["lift"]).unwrap();
        assert_eq!(lift.pos.evaluate(0.0), Vec3::new(0.0, 64.0, 0.0));
        assert_eq!(lift.pos.evaluate(1.0), Vec3::new(0.0, 64.0, 32.0));
        assert!(lift.apos.is_stationary());
    }

    #[test]
    fn spinner_off_the_world_origin_turns_in_place() {
        let mut world = setup_world(PushConfig::default());
        let names = spawn_scenario(&mut world, &load(SPINNER)).unwrap();
        let spinner = names["spinner"];

        let mut schedule = build_schedule();
        tick(&mut world, &mut schedule, 0.05);

        assert_eq!(
            world.get::<MapPosition>(spinner).unwrap().pos,
            Vec3::new(200.0, 0.0, 0.0)
        );
        let yaw = world.get::<Rotation>(spinner).unwrap().angles.y;
        assert!((yaw - 34.5).abs() < 1e-3, "{yaw}");
    }
}
