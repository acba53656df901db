//! Push engine configuration resource.
//!
//! Manages tunables loaded from an INI configuration file. Provides
//! defaults for safe startup and methods to load/save configuration.
//!
//! # Configuration File Format
//!
//! ```ini
//! [push]
//! max_pushed = 1024
//! lethal_damage = 100000
//! gib_health = -40
//!
//! [sim]
//! tick_rate = 20
//! ```

use bevy_ecs::prelude::*;
use configparser::ini::Ini;
use log::{info, warn};
use std::path::PathBuf;

use crate::systems::pusher::MAX_PUSHED;

/// Default safe values for startup
const DEFAULT_MAX_PUSHED: usize = MAX_PUSHED;
const DEFAULT_LETHAL_DAMAGE: i32 = 100_000;
const DEFAULT_GIB_HEALTH: i32 = -40;
const DEFAULT_TICK_RATE: u32 = 20;
const DEFAULT_CONFIG_PATH: &str = "./push.ini";

/// Push engine configuration resource.
#[derive(Resource, Debug, Clone)]
pub struct PushConfig {
    /// Undo-stack capacity per push. Clamped to [`MAX_PUSHED`].
    pub max_pushed: usize,
    /// Damage dealt by unstoppable (sine) movers and destroy reactions.
    pub lethal_damage: i32,
    /// Hit points at or below which a damaged entity is gibbed.
    pub gib_health: i32,
    /// Simulation ticks per second.
    pub tick_rate: u32,
    /// Path to the configuration file.
    pub config_path: PathBuf,
}

impl Default for PushConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl PushConfig {
    /// Create a new configuration with safe default values.
    pub fn new() -> Self {
        Self {
            max_pushed: DEFAULT_MAX_PUSHED,
            lethal_damage: DEFAULT_LETHAL_DAMAGE,
            gib_health: DEFAULT_GIB_HEALTH,
            tick_rate: DEFAULT_TICK_RATE,
            config_path: PathBuf::from(DEFAULT_CONFIG_PATH),
        }
    }

    /// Create a new configuration with a custom config file path.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: path.into(),
            ..Self::new()
        }
    }

    /// Seconds per simulation tick.
    pub fn tick_seconds(&self) -> f32 {
        1.0 / self.tick_rate.max(1) as f32
    }

    /// Load configuration from the INI file.
    ///
    /// Missing values retain their current (default) values.
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_from_file(&mut self) -> Result<(), String> {
        let mut config = Ini::new();
        config
            .load(&self.config_path)
            .map_err(|e| format!("Failed to load config file: {}", e))?;

        // [push] section
        if let Some(max) = config.getuint("push", "max_pushed").ok().flatten() {
            let max = max as usize;
            if max > MAX_PUSHED {
                warn!("max_pushed={} exceeds the hard cap, using {}", max, MAX_PUSHED);
            }
            self.max_pushed = max.min(MAX_PUSHED);
        }
        if let Some(damage) = config.getint("push", "lethal_damage").ok().flatten() {
            self.lethal_damage = damage as i32;
        }
        if let Some(gib) = config.getint("push", "gib_health").ok().flatten() {
            self.gib_health = gib as i32;
        }

        // [sim] section
        if let Some(rate) = config.getuint("sim", "tick_rate").ok().flatten() {
            self.tick_rate = (rate as u32).max(1);
        }

        info!(
            "Loaded config: max_pushed={}, lethal_damage={}, gib_health={}, tick_rate={}",
            self.max_pushed, self.lethal_damage, self.gib_health, self.tick_rate
        );

        Ok(())
    }

    /// Save configuration to the INI file.
    ///
    /// Creates the file if it doesn't exist.
    pub fn save_to_file(&self) -> Result<(), String> {
        let mut config = Ini::new();

        // [push] section
        config.set("push", "max_pushed", Some(self.max_pushed.to_string()));
        config.set("push", "lethal_damage", Some(self.lethal_damage.to_string()));
        config.set("push", "gib_health", Some(self.gib_health.to_string()));

        // [sim] section
        config.set("sim", "tick_rate", Some(self.tick_rate.to_string()));

        config
            .write(&self.config_path)
            .map_err(|e| format!("Failed to save config file: {}", e))?;

        info!("Saved config to {:?}", self.config_path);

        Ok(())
    }
}
