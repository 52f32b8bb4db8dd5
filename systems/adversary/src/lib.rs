#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Adversary controller that drives the UFO state machine.
//!
//! Each tick the controller first reacts to damage reported by the world,
//! then walks the remaining adversaries in identifier order and emits the
//! commands of their current state: hovering, attacking, moving toward a
//! sampled target, or descending after being downed. Randomness comes from a
//! seeded ChaCha stream so a replayed session samples identical targets and
//! shots.

use std::{collections::BTreeMap, f32::consts::TAU};

use glam::Vec3;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Deserialize;
use ufo_strike_core::{
    line_of_sight, Command, Event, MovementMode, PlayerSnapshot, RetargetReason, UfoId,
    UfoSnapshot, UfoState, UfoView, Volume,
};

/// Tunable constants of the adversary controller.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Horizontal distance within which an adversary notices the player.
    pub passive_radius: f32,
    /// Closest horizontal distance an adversary tolerates.
    pub min_standoff: f32,
    /// Distance per tick while relocating from `Attack`.
    pub linear_speed: f32,
    /// Fraction of the remaining displacement covered per tick while relocating from `Hover`.
    pub geometric_rate: f32,
    /// Distance to the target under which a move counts as arrived.
    pub arrival_threshold: f32,
    /// Firing frequency constant of the weighted random trigger.
    pub shoot_frequency: f32,
    /// Session clock value before which no adversary fires.
    pub grace_period: f32,
    /// Accumulated damage above which a hit triggers a full evasive relocation.
    pub evade_threshold: f32,
    /// Horizontal length of a dodge away from an incoming projectile.
    pub dodge_distance: f32,
    /// Altitude lost per tick by a downed adversary.
    pub descent_rate: f32,
    /// Hitbox altitude at which a downed adversary counts as landed.
    pub landing_altitude: f32,
    /// Rejection-sampling attempts before the last candidate target is accepted.
    pub max_target_attempts: u32,
    /// Seed of the random stream used for targets and shots.
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

    fn third_quartile(&self) -> f32 {
        self.min_standoff + self.passive_radius * 3.0 / 4.0
    }

    fn avoidance_radius(&self) -> f32 {
        self.min_standoff + self.passive_radius / 4.0
    }

    fn engagement_radius(&self) -> f32 {
        self.min_standoff + self.passive_radius / 2.0
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            passive_radius: 5000.0,
            min_standoff: 200.0,
            linear_speed: 20.0,
            geometric_rate: 0.01,
            arrival_threshold: 10.0,
            shoot_frequency: 15.0,
            grace_period: 750.0,
            evade_threshold: 20.0,
            dodge_distance: 300.0,
            descent_rate: 1.0,
            landing_altitude: 55.0,
            max_target_attempts: 64,
            rng_seed: 0x5eed_0f_0ad5,
        }
    }
}

/// Relation between an adversary and the player in the current tick.
#[derive(Clone, Copy, Debug, PartialEq)]
struct Engagement {
    distance: f32,
    engaged: bool,
    violation: bool,
}

/// Damage report collected from the tick's events.
#[derive(Clone, Copy, Debug)]
struct Hit {
    direction: Vec3,
    damage_since_reposition: f32,
}

/// Pure system that reacts to world events and emits adversary commands.
#[derive(Debug)]
pub struct Adversary {
    config: Config,
    rng: ChaCha8Rng,
}

impl Adversary {
    /// Creates a new adversary controller using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(config.rng_seed),
            config,
        }
    }

    /// Consumes the tick's events and immutable views to emit adversary commands.
    pub fn handle(
        &mut self,
        events: &[Event],
        player: &PlayerSnapshot,
        ufos: &UfoView,
        volumes: &[Volume],
        session_clock: f32,
        out: &mut Vec<Command>,
    ) {
        let mut scale = 0.0;
        let mut hits: BTreeMap<UfoId, Hit> = BTreeMap::new();
        for event in events {
            match event {
                Event::TimeAdvanced { scale: factor, .. } => scale += *factor,
                Event::UfoDamaged {
                    ufo,
                    direction,
                    damage_since_reposition,
                    ..
                } => {
                    let _ = hits.insert(
                        *ufo,
                        Hit {
                            direction: *direction,
                            damage_since_reposition: *damage_since_reposition,
                        },
                    );
                }
                _ => {}
            }
        }

        for ufo in ufos.iter() {
            if let Some(hit) = hits.get(&ufo.id) {
                if !ufo.state.is_dead() {
                    self.react_to_hit(ufo, *hit, player, volumes, out);
                    continue;
                }
            }

            if !scale.is_finite() || scale <= 0.0 {
                continue;
            }

            match ufo.state {
                UfoState::Hover => self.hover(ufo, player, volumes, out),
                UfoState::Attack => self.attack(ufo, player, volumes, session_clock, out),
                UfoState::Moving => self.relocate(ufo, player, volumes, scale, session_clock, out),
                UfoState::Dead => self.descend(ufo, scale, out),
            }
        }
    }

    fn hover(
        &mut self,
        ufo: &UfoSnapshot,
        player: &PlayerSnapshot,
        volumes: &[Volume],
        out: &mut Vec<Command>,
    ) {
        let engagement = self.engagement(ufo, player, volumes);
        if !engagement.engaged {
            return;
        }

        if engagement.violation {
            self.begin_move(ufo, UfoState::Hover, engagement, player, volumes, out);
        } else {
            out.push(Command::TransitionUfo {
                ufo: ufo.id,
                state: UfoState::Attack,
                resume: UfoState::Hover,
            });
        }
    }

    fn attack(
        &mut self,
        ufo: &UfoSnapshot,
        player: &PlayerSnapshot,
        volumes: &[Volume],
        session_clock: f32,
        out: &mut Vec<Command>,
    ) {
        self.orient(ufo, player, out);
        self.try_fire(ufo, player, session_clock, out);

        let engagement = self.engagement(ufo, player, volumes);
        if !engagement.engaged {
            out.push(Command::TransitionUfo {
                ufo: ufo.id,
                state: UfoState::Hover,
                resume: UfoState::Hover,
            });
        } else if engagement.violation {
            self.begin_move(ufo, UfoState::Attack, engagement, player, volumes, out);
        }
    }

    fn relocate(
        &mut self,
        ufo: &UfoSnapshot,
        player: &PlayerSnapshot,
        volumes: &[Volume],
        scale: f32,
        session_clock: f32,
        out: &mut Vec<Command>,
    ) {
        let Some(target) = ufo.target else {
            out.push(Command::TransitionUfo {
                ufo: ufo.id,
                state: ufo.resume,
                resume: ufo.resume,
            });
            return;
        };

        let displacement = target - ufo.equilibrium;
        let distance = displacement.length();
        let step = if ufo.resume == UfoState::Attack {
            displacement.normalize_or_zero() * self.config.linear_speed * scale
        } else {
            displacement * (self.config.geometric_rate * scale).min(1.0)
        };
        let equilibrium = ufo.equilibrium + step;
        let remaining = (target - equilibrium).length();
        out.push(Command::MoveUfo {
            ufo: ufo.id,
            equilibrium,
        });

        let overshot = remaining > distance && ufo.resume != UfoState::Hover;
        if overshot || remaining < self.config.arrival_threshold {
            out.push(Command::TransitionUfo {
                ufo: ufo.id,
                state: ufo.resume,
                resume: ufo.resume,
            });
            return;
        }

        let moved = UfoSnapshot {
            equilibrium,
            ..*ufo
        };
        let engagement = self.engagement(&moved, player, volumes);
        if !engagement.engaged {
            return;
        }

        self.orient(&moved, player, out);
        self.try_fire(&moved, player, session_clock, out);
        if ufo.resume == UfoState::Hover && !engagement.violation {
            out.push(Command::TransitionUfo {
                ufo: ufo.id,
                state: UfoState::Attack,
                resume: UfoState::Hover,
            });
        }
    }

    fn descend(&mut self, ufo: &UfoSnapshot, scale: f32, out: &mut Vec<Command>) {
        if ufo.grounded {
            return;
        }

        if ufo.equilibrium.y > self.config.landing_altitude {
            out.push(Command::DescendUfo {
                ufo: ufo.id,
                altitude: ufo.equilibrium.y - self.config.descent_rate * scale,
            });
        } else {
            out.push(Command::GroundUfo { ufo: ufo.id });
        }
    }

    fn react_to_hit(
        &mut self,
        ufo: &UfoSnapshot,
        hit: Hit,
        player: &PlayerSnapshot,
        volumes: &[Volume],
        out: &mut Vec<Command>,
    ) {
        let resume = if ufo.state == UfoState::Moving {
            ufo.resume
        } else {
            ufo.state
        };

        let dodge = (hit.damage_since_reposition <= self.config.evade_threshold)
            .then(|| self.dodge_target(ufo, hit.direction, volumes))
            .flatten();
        let (target, reason) = match dodge {
            Some(target) => (target, RetargetReason::Dodge),
            None => {
                let radius = self.config.engagement_radius();
                let target = self.sample_target(ufo, player.position, radius, volumes);
                (target, RetargetReason::Evade)
            }
        };

        out.push(Command::TransitionUfo {
            ufo: ufo.id,
            state: UfoState::Moving,
            resume,
        });
        out.push(Command::RetargetUfo {
            ufo: ufo.id,
            target,
            reason,
        });
    }

    fn dodge_target(
        &self,
        ufo: &UfoSnapshot,
        direction: Vec3,
        volumes: &[Volume],
    ) -> Option<Vec3> {
        let away = Vec3::new(direction.x, 0.0, direction.z).try_normalize()?;
        let target = (ufo.equilibrium + away * self.config.dodge_distance).round();
        (!ufo.hitbox().collides_at(target, volumes)).then_some(target)
    }

    fn begin_move(
        &mut self,
        ufo: &UfoSnapshot,
        resume: UfoState,
        engagement: Engagement,
        player: &PlayerSnapshot,
        volumes: &[Volume],
        out: &mut Vec<Command>,
    ) {
        let radius = if engagement.distance < self.config.min_standoff {
            self.config.avoidance_radius()
        } else {
            self.config.engagement_radius()
        };
        let target = self.sample_target(ufo, player.position, radius, volumes);

        out.push(Command::TransitionUfo {
            ufo: ufo.id,
            state: UfoState::Moving,
            resume,
        });
        out.push(Command::RetargetUfo {
            ufo: ufo.id,
            target,
            reason: RetargetReason::Engage,
        });
    }

    /// Samples a point on a circle around the player at the adversary's altitude.
    ///
    /// Candidates whose hitbox overlaps solid geometry are rejected. After the
    /// configured number of attempts the last candidate is accepted as is.
    fn sample_target(
        &mut self,
        ufo: &UfoSnapshot,
        around: Vec3,
        radius: f32,
        volumes: &[Volume],
    ) -> Vec3 {
        let hitbox = ufo.hitbox();
        let attempts = self.config.max_target_attempts.max(1);
        let mut candidate = ufo.equilibrium;
        for _ in 0..attempts {
            let angle = self.rng.gen::<f32>() * TAU;
            candidate = Vec3::new(
                (around.x + radius * angle.sin()).round(),
                ufo.equilibrium.y.round(),
                (around.z + radius * angle.cos()).round(),
            );
            if !hitbox.collides_at(candidate, volumes) {
                return candidate;
            }
        }

        log::warn!(
            "no free target for ufo {} after {} attempts, accepting {:?}",
            ufo.id.get(),
            attempts,
            candidate
        );
        candidate
    }

    fn engagement(
        &self,
        ufo: &UfoSnapshot,
        player: &PlayerSnapshot,
        volumes: &[Volume],
    ) -> Engagement {
        let offset = ufo.equilibrium - player.position;
        let distance = Vec3::new(offset.x, 0.0, offset.z).length();
        let engaged = distance < self.config.passive_radius
            && line_of_sight(ufo.equilibrium, player.position, volumes);
        let outside_band =
            distance < self.config.min_standoff || distance > self.config.third_quartile();
        let violation = engaged && outside_band;
        Engagement {
            distance,
            engaged,
            violation,
        }
    }

    fn orient(&self, ufo: &UfoSnapshot, player: &PlayerSnapshot, out: &mut Vec<Command>) {
        let offset = ufo.equilibrium - player.position;
        let yaw = -offset.z.atan2(offset.x);
        if yaw != ufo.yaw {
            out.push(Command::OrientUfo { ufo: ufo.id, yaw });
        }
    }

    fn try_fire(
        &mut self,
        ufo: &UfoSnapshot,
        player: &PlayerSnapshot,
        session_clock: f32,
        out: &mut Vec<Command>,
    ) {
        out.push(Command::ChargeUfoWeapon { ufo: ufo.id });
        let attempts = ufo.ticks_since_last_shot.saturating_add(1);
        let weighted = self.rng.gen::<f32>() * 100_000.0 / attempts as f32;

        if !player.alive
            || player.mode == MovementMode::Flying
            || session_clock <= self.config.grace_period
            || weighted >= self.config.shoot_frequency
        {
            return;
        }

        if let Some(direction) = (player.position - ufo.position).try_normalize() {
            out.push(Command::FireLaser {
                ufo: ufo.id,
                direction,
            });
        }
    }
}

impl Default for Adversary {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ufo_strike_core::{AssetState, Stance};

    fn player_at(position: Vec3) -> PlayerSnapshot {
        PlayerSnapshot {
            position,
            half_extents: Vec3::new(50.0, 100.0, 50.0),
            vertical_velocity: 0.0,
            gravity: -0.19,
            speed: 10.0,
            health: 100.0,
            cooldown: 0.0,
            damage: 3.0,
            alive: true,
            aiming: false,
            stance: Stance::Standing,
            mode: MovementMode::Walking,
            ticks_since_heal: 0,
            ticks_since_damage: 0,
            damage_overlay: false,
            overlay: AssetState::Ready,
        }
    }

    fn ufo_at(equilibrium: Vec3, state: UfoState) -> UfoSnapshot {
        UfoSnapshot {
            id: UfoId::new(0),
            state,
            resume: UfoState::Hover,
            equilibrium,
            position: equilibrium,
            half_extents: Vec3::new(235.0, 92.5, 235.0),
            health: 100.0,
            target: None,
            ticks_since_last_shot: 1,
            damage_since_reposition: 0.0,
            yaw: 0.0,
            grounded: false,
            asset: AssetState::Ready,
        }
    }

    fn lasers(commands: &[Command]) -> usize {
        commands
            .iter()
            .filter(|command| matches!(command, Command::FireLaser { .. }))
            .count()
    }

    #[test]
    fn standoff_band_bounds_follow_the_passive_radius() {
        let config = Config::default();

        assert_eq!(config.third_quartile(), 3950.0);
        assert_eq!(config.avoidance_radius(), 1450.0);
        assert_eq!(config.engagement_radius(), 2700.0);
    }

    #[test]
    fn sampled_targets_lie_on_the_requested_circle() {
        let mut adversary = Adversary::default();
        let ufo = ufo_at(Vec3::new(0.0, 360.0, 3000.0), UfoState::Hover);

        for _ in 0..32 {
            let target = adversary.sample_target(&ufo, Vec3::ZERO, 2700.0, &[]);
            let radius = Vec3::new(target.x, 0.0, target.z).length();
            assert!((radius - 2700.0).abs() <= 1.0);
            assert_eq!(target.y, 360.0);
        }
    }

    #[test]
    fn sampling_terminates_when_every_candidate_is_blocked() {
        let mut adversary = Adversary::new(Config {
            max_target_attempts: 8,
            ..Config::default()
        });
        let ufo = ufo_at(Vec3::new(0.0, 360.0, 3000.0), UfoState::Hover);
        let everywhere = Volume::new(Vec3::ZERO, Vec3::splat(100_000.0));

        let target = adversary.sample_target(&ufo, Vec3::ZERO, 2700.0, &[everywhere]);

        assert!(target.is_finite());
    }

    #[test]
    fn yaw_faces_away_from_player_offset() {
        let adversary = Adversary::default();
        let ufo = ufo_at(Vec3::new(0.0, 360.0, 1000.0), UfoState::Attack);
        let mut commands = Vec::new();

        adversary.orient(&ufo, &player_at(Vec3::ZERO), &mut commands);

        match commands.as_slice() {
            [Command::OrientUfo { yaw, .. }] => {
                assert!((yaw + std::f32::consts::FRAC_PI_2).abs() < 1e-5)
            }
            other => panic!("unexpected commands {other:?}"),
        }
    }

    #[test]
    fn grace_period_suppresses_fire() {
        let mut adversary = Adversary::default();
        let mut ufo = ufo_at(Vec3::new(0.0, 360.0, 1000.0), UfoState::Attack);
        ufo.ticks_since_last_shot = u32::MAX;
        let player = player_at(Vec3::ZERO);
        let mut commands = Vec::new();

        for _ in 0..100 {
            adversary.try_fire(&ufo, &player, 10.0, &mut commands);
        }
        assert_eq!(lasers(&commands), 0);

        for _ in 0..100 {
            adversary.try_fire(&ufo, &player, 1_000.0, &mut commands);
        }
        assert!(lasers(&commands) > 0);
    }

    #[test]
    fn flying_or_dead_players_are_never_targeted() {
        let mut adversary = Adversary::default();
        let mut ufo = ufo_at(Vec3::new(0.0, 360.0, 1000.0), UfoState::Attack);
        ufo.ticks_since_last_shot = u32::MAX;
        let mut flying = player_at(Vec3::ZERO);
        flying.mode = MovementMode::Flying;
        let mut dead = player_at(Vec3::ZERO);
        dead.alive = false;
        let mut commands = Vec::new();

        for _ in 0..100 {
            adversary.try_fire(&ufo, &flying, 1_000.0, &mut commands);
            adversary.try_fire(&ufo, &dead, 1_000.0, &mut commands);
        }

        assert_eq!(lasers(&commands), 0);
        assert_eq!(commands.len(), 200);
    }

    #[test]
    fn every_attempt_charges_the_weapon() {
        let mut adversary = Adversary::default();
        let mut ufo = ufo_at(Vec3::new(0.0, 360.0, 1000.0), UfoState::Attack);
        ufo.ticks_since_last_shot = 0;
        let mut commands = Vec::new();

        adversary.try_fire(&ufo, &player_at(Vec3::ZERO), 10.0, &mut commands);

        assert_eq!(commands, vec![Command::ChargeUfoWeapon { ufo: ufo.id }]);
    }

    #[test]
    fn dodge_moves_along_the_projectile_direction() {
        let adversary = Adversary::default();
        let ufo = ufo_at(Vec3::new(0.0, 360.0, 1000.0), UfoState::Attack);

        let target = adversary
            .dodge_target(&ufo, Vec3::new(0.0, 0.3, 1.0), &[])
            .expect("free dodge target");

        assert_eq!(target, Vec3::new(0.0, 360.0, 1300.0));
        assert!(adversary.dodge_target(&ufo, Vec3::Y, &[]).is_none());
    }
}
