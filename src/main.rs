//! Aberred Push main entry point.
//!
//! Loads a scenario (world solids, movers, players, buildables) from JSON,
//! runs the mover simulation for a number of ticks and prints where every
//! named entity ended up.
//!
//! # Main Loop
//!
//! 1. Load `push.ini` (defaults are used if it is missing)
//! 2. Build the ECS world and spawn the scenario
//! 3. Tick the schedule: advance time, run every mover team
//! 4. Print final origins
//!
//! # Running
//!
//! ```sh
//! cargo run --release -- --scenario demos/plat_lift.json --ticks 60
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use aberredpush::components::health::Health;
use aberredpush::components::mapposition::MapPosition;
use aberredpush::game::{build_schedule, setup_world, tick};
use aberredpush::resources::pushconfig::PushConfig;
use aberredpush::resources::scenario::ScenarioData;
use aberredpush::systems::scenario::spawn_scenario;
use clap::Parser;

/// Mover push simulator
#[derive(Parser)]
#[command(version, about = "Runs mover push scenarios and reports the outcome.")]
struct Cli {
    /// Scenario JSON file to load.
    #[arg(long, short, value_name = "PATH")]
    scenario: PathBuf,

    /// INI configuration file.
    #[arg(long, short, value_name = "PATH", default_value = "./push.ini")]
    config: PathBuf,

    /// Number of ticks to simulate. Defaults to two seconds of simulation.
    #[arg(long, short)]
    ticks: Option<u32>,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let mut config = PushConfig::with_path(&cli.config);
    if let Err(e) = config.load_from_file() {
        log::warn!("{}; using defaults", e);
    }
    let dt = config.tick_seconds();
    let ticks = cli.ticks.unwrap_or(config.tick_rate * 2);

    let scenario = match ScenarioData::load_from_file(&cli.scenario.to_string_lossy()) {
        Ok(scenario) => scenario,
        Err(e) => {
            log::error!("Failed to load scenario {:?}: {}", cli.scenario, e);
            return ExitCode::FAILURE;
        }
    };

    let mut world = setup_world(config);
    let names = match spawn_scenario(&mut world, &scenario) {
        Ok(names) => names,
        Err(e) => {
            log::error!("Invalid scenario {:?}: {}", cli.scenario, e);
            return ExitCode::FAILURE;
        }
    };

    let mut schedule = build_schedule();
    for _ in 0..ticks {
        tick(&mut world, &mut schedule, dt);
    }
    log::info!("simulated {} ticks of {:.3}s", ticks, dt);

    let mut report: Vec<(&String, _)> = names.iter().collect();
    report.sort_by(|a, b| a.0.cmp(b.0));
    for (name, &entity) in report {
        let Ok(entity_ref) = world.get_entity(entity) else {
            println!("{name:<16} removed");
            continue;
        };
        let pos = entity_ref
            .get::<MapPosition>()
            .map(|p| p.pos)
            .unwrap_or_default();
        let origin = format!("{:8.2} {:8.2} {:8.2}", pos.x, pos.y, pos.z);
        match entity_ref.get::<Health>() {
            Some(health) if health.gibbed => println!("{name:<16} {origin} (gibbed)"),
            Some(health) => println!("{name:<16} {origin} hp={}", health.hp),
            None => println!("{name:<16} {origin}"),
        }
    }

    ExitCode::SUCCESS
}
