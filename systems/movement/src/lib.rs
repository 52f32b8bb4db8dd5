#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Movement resolver that integrates player intent against static geometry.
//!
//! Every axis is tested and committed independently so a body blocked on one
//! axis keeps sliding along the others. Gravity, the jump probe and the
//! clip-recovery nudge all reuse the same hitbox collision query.

use glam::Vec3;
use serde::Deserialize;
use ufo_strike_core::{Command, Event, Hitbox, MovementMode, PlayerIntent, PlayerSnapshot, Volume};

/// Tunable constants of the movement resolver.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Vertical velocity granted by a jump from solid ground.
    pub jump_impulse: f32,
    /// Distance below the body probed to decide whether it stands on ground.
    pub ground_probe: f32,
    /// Upward nudge applied when the body ends a tick inside geometry.
    pub clip_recovery: f32,
    /// Horizontal intent components smaller than this are treated as zero.
    pub dead_zone: f32,
}

impl Config {
    /// Creates a configuration with the provided jump impulse and default probes.
    #[must_use]
    pub fn new(jump_impulse: f32) -> Self {
        Self {
            jump_impulse,
            ..Self::default()
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            jump_impulse: 10.0,
            ground_probe: 1.0,
            clip_recovery: 1.0,
            dead_zone: 0.001,
        }
    }
}

/// Kinematic state of a body integrated by the resolver.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Body {
    /// Centre of the body's hitbox.
    pub position: Vec3,
    /// Hitbox of the body in its current stance.
    pub hitbox: Hitbox,
    /// Vertical velocity carried between ticks.
    pub vertical_velocity: f32,
    /// Acceleration added to the vertical velocity while falling.
    pub gravity: f32,
    /// Horizontal speed in units per tick.
    pub speed: f32,
    /// Movement strategy applied to the body.
    pub mode: MovementMode,
}

impl Body {
    /// Builds the body described by a player snapshot.
    #[must_use]
    pub fn from_player(player: &PlayerSnapshot) -> Self {
        Self {
            position: player.position,
            hitbox: player.hitbox(),
            vertical_velocity: player.vertical_velocity,
            gravity: player.gravity,
            speed: player.speed,
            mode: player.mode,
        }
    }

    fn collides(&self, position: Vec3, volumes: &[Volume]) -> bool {
        self.hitbox.collides_at(position, volumes)
    }
}

/// Result of a single integration step.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Integration {
    /// Position after all axis commits, gravity and clip recovery.
    pub position: Vec3,
    /// Vertical velocity to carry into the next tick.
    pub vertical_velocity: f32,
    /// Whether gravity was stopped by solid ground this tick.
    pub landed: bool,
    /// Whether the clip-recovery nudge was applied.
    pub recovered: bool,
}

/// Integrates one tick of movement for `body`.
///
/// `scale` is the tick factor produced by the time scale. Non-finite or
/// negative factors leave the body untouched.
#[must_use]
pub fn integrate(
    body: &Body,
    intent: &PlayerIntent,
    volumes: &[Volume],
    scale: f32,
    config: &Config,
) -> Integration {
    let mut position = body.position;
    let mut vertical_velocity = body.vertical_velocity;
    if !scale.is_finite() || scale < 0.0 || !position.is_finite() {
        return Integration {
            position,
            vertical_velocity,
            landed: false,
            recovered: false,
        };
    }

    let walking = body.mode == MovementMode::Walking;
    if walking && intent.jump && body.collides(position - Vec3::Y * config.ground_probe, volumes) {
        vertical_velocity = config.jump_impulse;
    }

    let delta = displacement(body, intent, scale, config);
    let candidate = Vec3::new(position.x + delta.x, position.y, position.z);
    if !body.collides(candidate, volumes) {
        position = candidate;
    }
    let candidate = Vec3::new(position.x, position.y + delta.y, position.z);
    if !body.collides(candidate, volumes) {
        position = candidate;
    }
    let candidate = Vec3::new(position.x, position.y, position.z + delta.z);
    if !body.collides(candidate, volumes) {
        position = candidate;
    }

    let mut landed = false;
    if walking {
        let candidate = Vec3::new(
            position.x,
            position.y + vertical_velocity * scale,
            position.z,
        );
        if body.collides(candidate, volumes) {
            vertical_velocity = 0.0;
            landed = true;
        } else {
            position = candidate;
            vertical_velocity += body.gravity * scale;
        }
    }

    let recovered = body.collides(position, volumes);
    if recovered {
        position.y += config.clip_recovery;
    }

    Integration {
        position,
        vertical_velocity,
        landed,
        recovered,
    }
}

fn displacement(body: &Body, intent: &PlayerIntent, scale: f32, config: &Config) -> Vec3 {
    let zeroed = |value: f32| {
        if value.abs() < config.dead_zone || !value.is_finite() {
            0.0
        } else {
            value
        }
    };
    let planar = Vec3::new(zeroed(intent.planar.x), 0.0, zeroed(intent.planar.z));
    let planar = planar.try_normalize().unwrap_or(Vec3::ZERO) * body.speed * scale;

    let vertical = match body.mode {
        MovementMode::Flying if intent.vertical.is_finite() => intent.vertical * scale,
        _ => 0.0,
    };

    Vec3::new(planar.x, vertical, planar.z)
}

/// Pure system that turns the player's intent into a committed position.
#[derive(Debug, Default)]
pub struct Movement {
    config: Config,
}

impl Movement {
    /// Creates a movement system using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Consumes the tick's events and the player's state to emit a `MovePlayer` command.
    pub fn handle(
        &mut self,
        events: &[Event],
        player: &PlayerSnapshot,
        intent: &PlayerIntent,
        volumes: &[Volume],
        out: &mut Vec<Command>,
    ) {
        let scale: f32 = events
            .iter()
            .filter_map(|event| match event {
                Event::TimeAdvanced { scale, .. } => Some(*scale),
                _ => None,
            })
            .sum();
        if scale <= 0.0 {
            return;
        }

        let intent = if player.alive {
            *intent
        } else {
            PlayerIntent::default()
        };
        let body = Body::from_player(player);
        let step = integrate(&body, &intent, volumes, scale, &self.config);

        let moved = step.position != player.position;
        if moved || step.vertical_velocity != player.vertical_velocity {
            out.push(Command::MovePlayer {
                position: step.position,
                vertical_velocity: step.vertical_velocity,
            });
        }
    }
}
