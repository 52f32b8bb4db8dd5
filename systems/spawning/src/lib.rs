#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic spawning system responsible for emitting UFO spawn commands.

use glam::{Vec2, Vec3};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Deserialize;
use ufo_strike_core::{BobProfile, Command, Event, PlayerSnapshot, UfoView};

/// Configuration parameters required to construct the spawning system.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Spawn chance per tick at the start of the session.
    pub base_probability: f32,
    /// Increase of the per-tick chance for every elapsed tick.
    pub growth: f32,
    /// Upper bound of the per-tick chance.
    pub max_probability: f32,
    /// Centre of the spawn rectangle on the XZ plane.
    pub map_center: Vec2,
    /// Width (X) and depth (Z) of the spawn rectangle.
    pub map_dimensions: Vec2,
    /// Model altitude of freshly spawned adversaries.
    pub altitude: f32,
    /// Horizontal distance from the player inside which candidates are rejected.
    pub exclusion_radius: f32,
    /// Candidates drawn before the spawn is skipped for the tick.
    pub max_attempts: u32,
    /// Live adversaries above which no further spawns happen.
    pub max_active: usize,
    /// Seed of the random stream.
    pub rng_seed: u64,
}

impl Config {
    /// Creates a configuration with default tuning and the provided seed.
    #[must_use]
    pub fn new(rng_seed: u64) -> Self {
        Self {
            rng_seed,
            ..Self::default()
        }
    }

    fn probability(&self, elapsed: f32) -> f32 {
        (self.base_probability + self.growth * elapsed)
            .min(self.max_probability)
            .max(0.0)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_probability: 0.002,
            growth: 0.000_002,
            max_probability: 0.02,
            map_center: Vec2::new(11.5, -2121.0),
            map_dimensions: Vec2::new(16_000.0, 13_000.0),
            altitude: 200.0,
            exclusion_radius: 4000.0,
            max_attempts: 32,
            max_active: 12,
            rng_seed: 0x00c0_ffee_5eed,
        }
    }
}

/// Pure system that stochastically emits spawn commands as the session progresses.
#[derive(Debug)]
pub struct Spawning {
    config: Config,
    elapsed: f32,
    rng: ChaCha8Rng,
}

impl Spawning {
    /// Creates a new spawning system using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(config.rng_seed),
            elapsed: 0.0,
            config,
        }
    }

    /// Scaled ticks observed since the system was created.
    #[must_use]
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// Current per-tick spawn chance.
    #[must_use]
    pub fn probability(&self) -> f32 {
        self.config.probability(self.elapsed)
    }

    /// Consumes events and immutable views to emit spawn commands.
    pub fn handle(
        &mut self,
        events: &[Event],
        player: &PlayerSnapshot,
        ufos: &UfoView,
        out: &mut Vec<Command>,
    ) {
        let scale: f32 = events
            .iter()
            .filter_map(|event| match event {
                Event::TimeAdvanced { scale, .. } => Some(*scale),
                _ => None,
            })
            .sum();
        if !scale.is_finite() || scale <= 0.0 {
            return;
        }
        self.elapsed += scale;

        if ufos.live_count() >= self.config.max_active {
            return;
        }

        let roll: f32 = self.rng.gen();
        if roll >= self.probability() {
            return;
        }

        let Some(position) = self.sample_position(player.position) else {
            log::debug!(
                "skipped spawn after {} rejected candidates",
                self.config.max_attempts
            );
            return;
        };

        let amplitude = 150.0 + self.rng.gen::<f32>() * 100.0;
        let frequency = 0.5 + self.rng.gen::<f32>() * 0.5;
        out.push(Command::SpawnUfo {
            position,
            bob: BobProfile::new(amplitude, frequency),
        });
    }

    fn sample_position(&mut self, player: Vec3) -> Option<Vec3> {
        for _ in 0..self.config.max_attempts {
            let x = self.config.map_center.x
                + (self.rng.gen::<f32>() - 0.5) * self.config.map_dimensions.x;
            let z = self.config.map_center.y
                + (self.rng.gen::<f32>() - 0.5) * self.config.map_dimensions.y;
            let distance = Vec2::new(x - player.x, z - player.z).length();
            if distance >= self.config.exclusion_radius {
                return Some(Vec3::new(x, self.config.altitude, z));
            }
        }
        None
    }
}

impl Default for Spawning {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn probability_grows_until_the_cap() {
        let config = Config::default();

        assert_eq!(config.probability(0.0), 0.002);
        assert!(config.probability(1_000.0) > config.probability(10.0));
        assert_eq!(config.probability(1.0e7), 0.02);
    }

    #[test]
    fn candidates_stay_inside_the_map_and_outside_the_exclusion_radius() {
        let mut spawning = Spawning::default();
        let player = Vec3::new(0.0, 130.0, 20.0);

        for _ in 0..200 {
            let Some(position) = spawning.sample_position(player) else {
                continue;
            };
            assert!(position.x.abs() <= 8_011.5);
            assert!((position.z + 2121.0).abs() <= 6_500.0);
            assert_eq!(position.y, 200.0);
            let distance = Vec2::new(position.x - player.x, position.z - player.z).length();
            assert!(distance >= 4000.0);
        }
    }

    #[test]
    fn exhausted_attempts_skip_the_spawn() {
        let mut spawning = Spawning::new(Config {
            exclusion_radius: 1.0e9,
            ..Config::default()
        });

        assert_eq!(spawning.sample_position(Vec3::ZERO), None);
    }
}
