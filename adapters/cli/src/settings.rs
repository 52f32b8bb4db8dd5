//! Session settings aggregated from every system's configuration.

use std::{fs, path::Path, time::Duration};

use anyhow::{Context, Result};
use serde::Deserialize;
use thiserror::Error;
use ufo_strike_system_adversary::Config as AdversaryConfig;
use ufo_strike_system_combat::Config as CombatConfig;
use ufo_strike_system_movement::Config as MovementConfig;
use ufo_strike_system_player::Config as PlayerConfig;
use ufo_strike_system_spawning::Config as SpawningConfig;
use ufo_strike_world::WorldConfig;

/// Validation failures of loaded settings.
#[derive(Debug, Error, PartialEq)]
pub enum SettingsError {
    /// The time scale would turn every frame into a zero or undefined tick factor.
    #[error("reference frame rate must be positive and finite (received {rate})")]
    InvalidReferenceRate {
        /// Rate found in the settings.
        rate: f32,
    },
    /// A rejection-sampling loop was given no attempts.
    #[error("{sampler} needs at least one sampling attempt")]
    ZeroAttempts {
        /// Name of the sampler that was misconfigured.
        sampler: &'static str,
    },
    /// The session would end before its first tick.
    #[error("a session must run for at least one tick")]
    ZeroTicks,
    /// Frames would carry no elapsed time.
    #[error("frame duration must be positive")]
    ZeroFrameDuration,
    /// The spawn rectangle is empty or undefined.
    #[error("map dimensions must be positive and finite (received {width}x{depth})")]
    InvalidMapDimensions {
        /// Width of the rectangle along X.
        width: f32,
        /// Depth of the rectangle along Z.
        depth: f32,
    },
}

/// Everything needed to run a headless session.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Seed shared by every random stream of the session.
    pub seed: u64,
    /// Number of ticks to simulate.
    pub ticks: u32,
    /// Simulated duration of one frame in milliseconds.
    pub frame_ms: u64,
    /// Starts the session in fly mode.
    pub admin: bool,
    /// World tuning.
    pub world: WorldConfig,
    /// Player controller tuning.
    pub player: PlayerConfig,
    /// Movement resolver tuning.
    pub movement: MovementConfig,
    /// Combat resolver tuning.
    pub combat: CombatConfig,
    /// Adversary controller tuning.
    pub adversary: AdversaryConfig,
    /// Spawner tuning.
    pub spawning: SpawningConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            seed: 0x5eed,
            ticks: 5_000,
            frame_ms: 7,
            admin: false,
            world: WorldConfig::default(),
            player: PlayerConfig::default(),
            movement: MovementConfig::default(),
            combat: CombatConfig::default(),
            adversary: AdversaryConfig::default(),
            spawning: SpawningConfig::default(),
        }
    }
}

impl Settings {
    /// Loads settings from a TOML file, or the defaults when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read settings at {}", path.display()))?;
        Self::parse(&contents)
            .with_context(|| format!("failed to load settings from {}", path.display()))
    }

    /// Parses and validates settings from TOML contents.
    pub fn parse(contents: &str) -> Result<Self> {
        let settings: Self =
            toml::from_str(contents).context("failed to parse settings toml contents")?;
        settings.validate()?;
        Ok(settings)
    }

    /// Checks the invariants the simulation relies on.
    pub fn validate(&self) -> Result<(), SettingsError> {
        let rate = self.world.time_scale.reference_rate();
        if !rate.is_finite() || rate <= 0.0 {
            return Err(SettingsError::InvalidReferenceRate { rate });
        }
        if self.adversary.max_target_attempts == 0 {
            return Err(SettingsError::ZeroAttempts {
                sampler: "adversary target selection",
            });
        }
        if self.spawning.max_attempts == 0 {
            return Err(SettingsError::ZeroAttempts {
                sampler: "spawn point selection",
            });
        }
        if self.ticks == 0 {
            return Err(SettingsError::ZeroTicks);
        }
        if self.frame_ms == 0 {
            return Err(SettingsError::ZeroFrameDuration);
        }
        let dimensions = self.spawning.map_dimensions;
        if !dimensions.is_finite() || dimensions.x <= 0.0 || dimensions.y <= 0.0 {
            return Err(SettingsError::InvalidMapDimensions {
                width: dimensions.x,
                depth: dimensions.y,
            });
        }
        Ok(())
    }

    /// Returns a copy whose random streams all derive from `seed`.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Simulated duration of one frame.
    #[must_use]
    pub fn frame(&self) -> Duration {
        Duration::from_millis(self.frame_ms)
    }

    pub(crate) fn adversary_config(&self) -> AdversaryConfig {
        AdversaryConfig {
            rng_seed: self.seed,
            ..self.adversary
        }
    }

    pub(crate) fn spawning_config(&self) -> SpawningConfig {
        SpawningConfig {
            rng_seed: self.seed.rotate_left(32) ^ 0x9e37_79b9_7f4a_7c15,
            ..self.spawning
        }
    }
}
