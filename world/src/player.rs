//! Authoritative player state.

use glam::Vec3;
use ufo_strike_core::{AssetState, MovementMode, PlayerSnapshot, Stance, MAX_HEALTH};

use crate::WorldConfig;

/// Outcome of a damage intake applied to the player.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum PlayerHit {
    /// The player survived with the remaining health.
    Wounded { health: f32 },
    /// The hit brought health to zero and the player died.
    Killed { was_aiming: bool },
    /// The player was already dead.
    Ignored,
}

/// Mutable player record owned by the world.
#[derive(Clone, Debug)]
pub(crate) struct Player {
    pub(crate) position: Vec3,
    pub(crate) standing_extents: Vec3,
    pub(crate) half_extents: Vec3,
    pub(crate) vertical_velocity: f32,
    pub(crate) gravity: f32,
    pub(crate) speed: f32,
    pub(crate) health: f32,
    pub(crate) cooldown: f32,
    pub(crate) damage: f32,
    pub(crate) alive: bool,
    pub(crate) aiming: bool,
    pub(crate) stance: Stance,
    pub(crate) mode: MovementMode,
    pub(crate) ticks_since_heal: u32,
    pub(crate) ticks_since_damage: u32,
    pub(crate) damage_overlay: bool,
    pub(crate) overlay: AssetState,
}

impl Player {
    /// Creates a standing, fully healed player at the configured spawn point.
    pub(crate) fn spawn(config: &WorldConfig) -> Self {
        Self {
            position: config.spawn_point,
            standing_extents: config.player_half_extents,
            half_extents: config.player_half_extents,
            vertical_velocity: 0.0,
            gravity: config.gravity,
            speed: config.walk_speed,
            health: MAX_HEALTH,
            cooldown: 0.0,
            damage: config.bullet_damage,
            alive: true,
            aiming: false,
            stance: Stance::Standing,
            mode: MovementMode::Walking,
            ticks_since_heal: 0,
            ticks_since_damage: 0,
            damage_overlay: false,
            overlay: AssetState::Pending,
        }
    }

    pub(crate) fn snapshot(&self) -> PlayerSnapshot {
        PlayerSnapshot {
            position: self.position,
            half_extents: self.half_extents,
            vertical_velocity: self.vertical_velocity,
            gravity: self.gravity,
            speed: self.speed,
            health: self.health,
            cooldown: self.cooldown,
            damage: self.damage,
            alive: self.alive,
            aiming: self.aiming,
            stance: self.stance,
            mode: self.mode,
            ticks_since_heal: self.ticks_since_heal,
            ticks_since_damage: self.ticks_since_damage,
            damage_overlay: self.damage_overlay,
            overlay: self.overlay,
        }
    }

    /// Applies a stance, returning whether it changed.
    pub(crate) fn set_stance(&mut self, stance: Stance) -> bool {
        if !self.alive || self.stance == stance {
            return false;
        }

        self.stance = stance;
        self.half_extents = match stance {
            Stance::Standing => self.standing_extents,
            Stance::Crouching => Vec3::new(
                self.standing_extents.x,
                self.standing_extents.y / 2.0,
                self.standing_extents.z,
            ),
        };
        true
    }

    /// Applies aim mode, returning whether it changed.
    pub(crate) fn set_aiming(&mut self, aiming: bool, config: &WorldConfig) -> bool {
        if !self.alive || self.aiming == aiming {
            return false;
        }

        self.aiming = aiming;
        if aiming {
            self.speed = config.walk_speed / 2.0;
            self.damage = config.aimed_bullet_damage;
        } else {
            self.speed = config.walk_speed;
            self.damage = config.bullet_damage;
        }
        true
    }

    /// Restores health, returning the new value when anything was healed.
    pub(crate) fn heal(&mut self, amount: f32) -> Option<f32> {
        if !self.alive || !amount.is_finite() || amount <= 0.0 {
            return None;
        }

        self.health = (self.health + amount).min(MAX_HEALTH);
        self.ticks_since_heal = 0;
        Some(self.health)
    }

    /// Applies damage intake, collapsing the player on death.
    pub(crate) fn take_damage(&mut self, amount: f32, config: &WorldConfig) -> PlayerHit {
        if !self.alive {
            return PlayerHit::Ignored;
        }

        self.ticks_since_damage = 0;
        self.ticks_since_heal = 0;
        self.damage_overlay = true;
        self.health = (self.health - amount.max(0.0)).max(0.0);
        if self.health > 0.0 {
            return PlayerHit::Wounded {
                health: self.health,
            };
        }

        let was_aiming = self.aiming;
        self.alive = false;
        self.aiming = false;
        self.speed = config.walk_speed;
        self.damage = config.bullet_damage;
        self.vertical_velocity = 0.0;
        self.gravity = config.dead_gravity;
        self.half_extents = Vec3::new(
            self.half_extents.x,
            self.half_extents.y / 10.0,
            self.half_extents.z,
        );
        PlayerHit::Killed { was_aiming }
    }

    /// Opacity of the damage overlay for the current health.
    pub(crate) fn overlay_alpha(&self) -> f32 {
        (MAX_HEALTH - self.health) / 400.0
    }

    /// Advances per-tick counters and the weapon cooldown.
    pub(crate) fn advance(&mut self, scale: f32) {
        self.cooldown = (self.cooldown - scale).max(0.0);
        self.ticks_since_damage = self.ticks_since_damage.saturating_add(1);
        if self.alive {
            self.ticks_since_heal = self.ticks_since_heal.saturating_add(1);
        }
    }
}
