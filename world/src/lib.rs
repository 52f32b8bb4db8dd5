#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for UFO Strike.

mod player;
mod projectiles;
mod ufos;

use std::time::Duration;

use glam::Vec3;
use serde::Deserialize;
use ufo_strike_core::{
    AmbienceFade, AssetRef, AssetState, AudioCue, Command, Event, HitTarget, HudReport,
    MovementMode, ProjectileId, ProjectileKind, RetargetReason, TimeScale, UfoId, UfoState,
    VisualCue, VisualTarget, Volume,
};

use player::{Player, PlayerHit};
use projectiles::{Launch, ProjectileRegistry};
use ufos::{UfoHit, UfoRegistry};

/// Tunable constants of the authoritative world.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Hitbox centre the player starts at.
    pub spawn_point: Vec3,
    /// Standing half-extents of the player hitbox.
    pub player_half_extents: Vec3,
    /// Horizontal player speed in units per tick. Halved while aiming.
    pub walk_speed: f32,
    /// Downward acceleration applied to a living player.
    pub gravity: f32,
    /// Softened downward acceleration applied after death.
    pub dead_gravity: f32,
    /// Damage of a bullet fired from the hip.
    pub bullet_damage: f32,
    /// Damage of a bullet fired while aiming.
    pub aimed_bullet_damage: f32,
    /// Damage of an adversary laser.
    pub laser_damage: f32,
    /// Cooldown restored after every shot of the player's weapon.
    pub weapon_cooldown: f32,
    /// Distance a projectile travels per tick.
    pub projectile_speed: f32,
    /// Half-extents of an adversary hitbox.
    pub ufo_half_extents: Vec3,
    /// Offset between an adversary's model origin and its hitbox centre.
    pub ufo_hitbox_offset: Vec3,
    /// Field-of-view change rate requested when entering or leaving aim mode.
    pub aim_fov_delta: f32,
    /// Length of the red flash after a non-lethal hit, in milliseconds.
    pub damage_flash_ms: u64,
    /// Length of each death flash, in milliseconds.
    pub death_flash_ms: u64,
    /// Spacing between the three death flashes, in milliseconds.
    pub death_flash_interval_ms: u64,
    /// Conversion between measured frame time and tick factors.
    pub time_scale: TimeScale,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            spawn_point: Vec3::new(0.0, 130.0, 20.0),
            player_half_extents: Vec3::new(50.0, 100.0, 50.0),
            walk_speed: 10.0,
            gravity: -0.19,
            dead_gravity: -0.1,
            bullet_damage: 3.0,
            aimed_bullet_damage: 10.0,
            laser_damage: 5.0,
            weapon_cooldown: 100.0,
            projectile_speed: 40.0,
            ufo_half_extents: Vec3::new(235.0, 92.5, 235.0),
            ufo_hitbox_offset: Vec3::new(0.0, 160.0, 0.0),
            aim_fov_delta: 2.0,
            damage_flash_ms: 100,
            death_flash_ms: 300,
            death_flash_interval_ms: 600,
            time_scale: TimeScale::default(),
        }
    }
}

/// Represents the authoritative UFO Strike world state.
#[derive(Debug)]
pub struct World {
    config: WorldConfig,
    volumes: Vec<Volume>,
    player: Player,
    ufos: UfoRegistry,
    projectiles: ProjectileRegistry,
    clock: f32,
    tick_index: u64,
    kills: u32,
}

impl World {
    /// Creates a new world with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(WorldConfig::default())
    }

    /// Creates a new world using the provided configuration.
    #[must_use]
    pub fn with_config(config: WorldConfig) -> Self {
        log::info!(
            "world created with spawn point {:?} at reference rate {}",
            config.spawn_point,
            config.time_scale.reference_rate()
        );
        Self {
            player: Player::spawn(&config),
            volumes: Vec::new(),
            ufos: UfoRegistry::new(),
            projectiles: ProjectileRegistry::new(),
            clock: 0.0,
            tick_index: 0,
            kills: 0,
            config,
        }
    }

    fn begin_tick(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        for projectile in self.projectiles.remove_inactive() {
            out_events.push(Event::ProjectileRemoved { projectile });
        }
        for ufo in self.ufos.remove_grounded() {
            log::info!("ufo {} removed after landing", ufo.get());
            out_events.push(Event::UfoRemoved { ufo });
        }

        let scale = self.config.time_scale.factor(dt);
        self.tick_index = self.tick_index.saturating_add(1);
        self.clock += scale;
        out_events.push(Event::TimeAdvanced { dt, scale });

        self.player.advance(scale);
        for ufo in self.ufos.iter_mut() {
            for duration in ufo.advance(dt, scale) {
                out_events.push(Event::Visual {
                    target: VisualTarget::Ufo(ufo.id),
                    cue: VisualCue::Flash { duration },
                });
            }
        }
    }

    fn fire_player_weapon(&mut self, direction: Vec3, out_events: &mut Vec<Event>) {
        if !self.player.alive || self.player.cooldown > 0.0 {
            log::debug!("player weapon not ready");
            return;
        }
        let Some(direction) = direction.try_normalize() else {
            log::debug!("rejected player shot with degenerate direction");
            return;
        };

        let origin = self.player.position;
        let projectile = self.projectiles.launch(Launch {
            kind: ProjectileKind::Bullet,
            origin,
            direction,
            speed: self.config.projectile_speed,
            damage: self.player.damage,
        });
        self.player.cooldown = self.config.weapon_cooldown;

        out_events.push(Event::ProjectileFired {
            projectile,
            kind: ProjectileKind::Bullet,
            origin,
            direction,
        });
        out_events.push(Event::Audio {
            cue: AudioCue::GunFired,
        });
        out_events.push(Event::Visual {
            target: VisualTarget::Player,
            cue: VisualCue::ShootAnimation,
        });
    }

    fn fire_laser(&mut self, ufo_id: UfoId, direction: Vec3, out_events: &mut Vec<Event>) {
        let Some(direction) = direction.try_normalize() else {
            log::debug!("rejected laser from ufo {} with degenerate direction", ufo_id.get());
            return;
        };
        let Some(ufo) = self.ufos.get_mut(ufo_id) else {
            log::debug!("rejected laser from unknown ufo {}", ufo_id.get());
            return;
        };
        if ufo.state.is_dead() {
            return;
        }

        ufo.ticks_since_last_shot = 0;
        let origin = ufo.position();
        let projectile = self.projectiles.launch(Launch {
            kind: ProjectileKind::Laser,
            origin,
            direction,
            speed: self.config.projectile_speed,
            damage: self.config.laser_damage,
        });

        out_events.push(Event::ProjectileFired {
            projectile,
            kind: ProjectileKind::Laser,
            origin,
            direction,
        });
        out_events.push(Event::Audio {
            cue: AudioCue::LaserFired,
        });
    }

    fn resolve_hit(
        &mut self,
        projectile_id: ProjectileId,
        target: HitTarget,
        out_events: &mut Vec<Event>,
    ) {
        let Some(projectile) = self.projectiles.active_mut(projectile_id) else {
            log::debug!("projectile {} already spent", projectile_id.get());
            return;
        };
        let matches_kind = matches!(
            (projectile.kind, target),
            (ProjectileKind::Bullet, HitTarget::Ufo(_)) | (ProjectileKind::Laser, HitTarget::Player)
        );
        if !matches_kind {
            log::debug!("projectile {} cannot strike {:?}", projectile_id.get(), target);
            return;
        }

        projectile.active = false;
        let damage = projectile.damage;
        let direction = projectile.direction;
        out_events.push(Event::ProjectileHit {
            projectile: projectile_id,
            target,
            damage,
        });

        match target {
            HitTarget::Player => self.damage_player(damage, out_events),
            HitTarget::Ufo(ufo) => self.damage_ufo(ufo, damage, direction, out_events),
        }
    }

    fn damage_player(&mut self, amount: f32, out_events: &mut Vec<Event>) {
        match self.player.take_damage(amount, &self.config) {
            PlayerHit::Ignored => {}
            PlayerHit::Wounded { health } => {
                out_events.push(Event::PlayerDamaged { amount, health });
                out_events.push(Event::Visual {
                    target: VisualTarget::Player,
                    cue: VisualCue::DamageOverlay {
                        alpha: self.player.overlay_alpha(),
                    },
                });
            }
            PlayerHit::Killed { was_aiming } => {
                log::info!("player died with {} kills", self.kills);
                out_events.push(Event::PlayerDamaged {
                    amount,
                    health: 0.0,
                });
                out_events.push(Event::Visual {
                    target: VisualTarget::Player,
                    cue: VisualCue::DamageOverlay {
                        alpha: self.player.overlay_alpha(),
                    },
                });
                if was_aiming {
                    out_events.push(Event::AimChanged {
                        aiming: false,
                        fov_delta: self.config.aim_fov_delta,
                    });
                }
                out_events.push(Event::Visual {
                    target: VisualTarget::Player,
                    cue: VisualCue::DeathOverlay,
                });
                out_events.push(Event::Ambience {
                    fade: AmbienceFade::Out,
                });
                out_events.push(Event::PlayerDied { kills: self.kills });
            }
        }
    }

    fn damage_ufo(
        &mut self,
        ufo_id: UfoId,
        amount: f32,
        direction: Vec3,
        out_events: &mut Vec<Event>,
    ) {
        let damage_flash = Duration::from_millis(self.config.damage_flash_ms);
        let death_flash = Duration::from_millis(self.config.death_flash_ms);
        let interval = Duration::from_millis(self.config.death_flash_interval_ms);
        let Some(ufo) = self.ufos.get_mut(ufo_id) else {
            log::debug!("hit on unknown ufo {}", ufo_id.get());
            return;
        };

        match ufo.take_damage(amount) {
            UfoHit::Ignored => {}
            UfoHit::Damaged {
                state,
                damage_since_reposition,
            } => {
                ufo.schedule_flash(Duration::ZERO, damage_flash);
                out_events.push(Event::UfoDamaged {
                    ufo: ufo_id,
                    amount,
                    direction,
                    state,
                    damage_since_reposition,
                });
            }
            UfoHit::Downed { from } => {
                ufo.schedule_flash(Duration::ZERO, damage_flash);
                for stage in 0..3 {
                    ufo.schedule_flash(interval * stage, death_flash);
                }
                log::info!("ufo {} downed", ufo_id.get());
                out_events.push(Event::UfoStateChanged {
                    ufo: ufo_id,
                    from,
                    to: UfoState::Dead,
                });
                out_events.push(Event::Audio {
                    cue: AudioCue::UfoPoweredDown,
                });
                out_events.push(Event::UfoDowned { ufo: ufo_id });
            }
        }
    }

    fn transition_ufo(
        &mut self,
        ufo_id: UfoId,
        state: UfoState,
        resume: UfoState,
        out_events: &mut Vec<Event>,
    ) {
        if state.is_dead() || resume.is_dead() {
            log::debug!("ufo {} cannot be transitioned into dead", ufo_id.get());
            return;
        }
        let Some(ufo) = self.ufos.get_mut(ufo_id) else {
            log::debug!("transition for unknown ufo {}", ufo_id.get());
            return;
        };
        if ufo.state.is_dead() {
            return;
        }

        let from = ufo.state;
        ufo.resume = resume;
        if from == state {
            return;
        }
        if from == UfoState::Moving {
            ufo.target = None;
        }
        ufo.state = state;
        out_events.push(Event::UfoStateChanged {
            ufo: ufo_id,
            from,
            to: state,
        });
    }

    fn mark_asset_ready(&mut self, asset: AssetRef, out_events: &mut Vec<Event>) {
        let slot = match asset {
            AssetRef::PlayerOverlay => Some(&mut self.player.overlay),
            AssetRef::Ufo(ufo) => self.ufos.get_mut(ufo).map(|ufo| &mut ufo.asset),
        };
        let Some(slot) = slot else {
            log::debug!("asset {:?} belongs to no entity", asset);
            return;
        };
        if slot.is_ready() {
            return;
        }
        *slot = AssetState::Ready;
        out_events.push(Event::AssetReady { asset });
    }

    fn hud_report(&self) -> HudReport {
        HudReport::new(self.player.health, self.kills, self.player.position)
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::AddVolume { volume } => {
            if !volume.is_finite() {
                log::debug!("rejected non-finite volume");
                return;
            }
            world.volumes.push(volume);
            out_events.push(Event::GeometryChanged {
                volumes: world.volumes.len(),
            });
        }
        Command::RemoveVolume { id } => {
            let before = world.volumes.len();
            world.volumes.retain(|volume| volume.id() != Some(id));
            if world.volumes.len() != before {
                out_events.push(Event::GeometryChanged {
                    volumes: world.volumes.len(),
                });
            }
        }
        Command::SetMovementMode { mode } => {
            if world.player.mode == mode {
                return;
            }
            world.player.mode = mode;
            if mode == MovementMode::Flying {
                world.player.vertical_velocity = 0.0;
            }
            out_events.push(Event::MovementModeChanged { mode });
        }
        Command::Tick { dt } => world.begin_tick(dt, out_events),
        Command::EndTick => {
            out_events.push(Event::FrameCompleted {
                hud: world.hud_report(),
            });
        }
        Command::MovePlayer {
            position,
            vertical_velocity,
        } => {
            if !position.is_finite() || !vertical_velocity.is_finite() {
                log::debug!("rejected non-finite player move");
                return;
            }
            let from = world.player.position;
            world.player.position = position;
            world.player.vertical_velocity = vertical_velocity;
            if from != position {
                out_events.push(Event::PlayerMoved { from, to: position });
            }
        }
        Command::SetPlayerStance { stance } => {
            if world.player.set_stance(stance) {
                out_events.push(Event::StanceChanged { stance });
            }
        }
        Command::SetAiming { aiming } => {
            if world.player.set_aiming(aiming, &world.config) {
                let delta = world.config.aim_fov_delta;
                out_events.push(Event::AimChanged {
                    aiming,
                    fov_delta: if aiming { -delta } else { delta },
                });
            }
        }
        Command::HealPlayer { amount } => {
            if let Some(health) = world.player.heal(amount) {
                out_events.push(Event::PlayerHealed { health });
            }
        }
        Command::ClearDamageOverlay => {
            if world.player.damage_overlay {
                world.player.damage_overlay = false;
                out_events.push(Event::Visual {
                    target: VisualTarget::Player,
                    cue: VisualCue::DamageOverlayCleared,
                });
            }
        }
        Command::FirePlayerWeapon { direction } => world.fire_player_weapon(direction, out_events),
        Command::ChargeUfoWeapon { ufo } => {
            if let Some(entry) = world.ufos.get_mut(ufo) {
                if !entry.state.is_dead() {
                    entry.ticks_since_last_shot = entry.ticks_since_last_shot.saturating_add(1);
                }
            }
        }
        Command::FireLaser { ufo, direction } => world.fire_laser(ufo, direction, out_events),
        Command::MoveProjectile {
            projectile,
            position,
            elapsed,
        } => {
            if !position.is_finite() || !elapsed.is_finite() {
                log::debug!("rejected non-finite projectile move");
                return;
            }
            if let Some(projectile) = world.projectiles.active_mut(projectile) {
                projectile.position = position;
                projectile.age += elapsed.max(0.0);
            }
        }
        Command::ResolveHit { projectile, target } => {
            world.resolve_hit(projectile, target, out_events);
        }
        Command::ExpireProjectile { projectile } => {
            if let Some(entry) = world.projectiles.active_mut(projectile) {
                entry.active = false;
                log::debug!("projectile {} expired", projectile.get());
                out_events.push(Event::ProjectileExpired { projectile });
            }
        }
        Command::SpawnUfo { position, bob } => {
            if !position.is_finite() || !bob.amplitude.is_finite() || !bob.frequency.is_finite() {
                log::debug!("rejected non-finite ufo spawn");
                return;
            }
            let equilibrium = position + world.config.ufo_hitbox_offset;
            let ufo = world
                .ufos
                .spawn(equilibrium, world.config.ufo_half_extents, bob);
            log::info!("ufo {} spawned at {:?}", ufo.get(), equilibrium);
            out_events.push(Event::UfoSpawned { ufo, equilibrium });
        }
        Command::MarkAssetReady { asset } => world.mark_asset_ready(asset, out_events),
        Command::TransitionUfo { ufo, state, resume } => {
            world.transition_ufo(ufo, state, resume, out_events);
        }
        Command::RetargetUfo { ufo, target, reason } => {
            if !target.is_finite() {
                log::debug!("rejected non-finite target for ufo {}", ufo.get());
                return;
            }
            if let Some(entry) = world.ufos.get_mut(ufo) {
                if entry.state.is_dead() {
                    return;
                }
                entry.target = Some(target);
                if reason == RetargetReason::Evade {
                    entry.damage_since_reposition = 0.0;
                }
            }
        }
        Command::MoveUfo { ufo, equilibrium } => {
            if !equilibrium.is_finite() {
                log::debug!("rejected non-finite move for ufo {}", ufo.get());
                return;
            }
            if let Some(entry) = world.ufos.get_mut(ufo) {
                if !entry.state.is_dead() {
                    entry.equilibrium = equilibrium;
                }
            }
        }
        Command::OrientUfo { ufo, yaw } => {
            if !yaw.is_finite() {
                return;
            }
            if let Some(entry) = world.ufos.get_mut(ufo) {
                if !entry.state.is_dead() {
                    entry.yaw = yaw;
                }
            }
        }
        Command::DescendUfo { ufo, altitude } => {
            if !altitude.is_finite() {
                return;
            }
            if let Some(entry) = world.ufos.get_mut(ufo) {
                if entry.state.is_dead() && !entry.grounded {
                    entry.equilibrium.y = altitude;
                }
            }
        }
        Command::GroundUfo { ufo } => {
            let Some(entry) = world.ufos.get_mut(ufo) else {
                return;
            };
            if !entry.state.is_dead() || entry.grounded {
                return;
            }
            entry.grounded = true;
            world.kills = world.kills.saturating_add(1);
            log::info!("ufo {} grounded, {} kills", ufo.get(), world.kills);
            out_events.push(Event::UfoGrounded {
                ufo,
                kills: world.kills,
            });
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use ufo_strike_core::{
        PlayerSnapshot, ProjectileSnapshot, ProjectileView, UfoSnapshot, UfoView, Volume,
    };

    use super::{World, WorldConfig};

    /// Configuration the world was created with.
    #[must_use]
    pub fn config(world: &World) -> &WorldConfig {
        &world.config
    }

    /// Static geometry in insertion order.
    #[must_use]
    pub fn volumes(world: &World) -> &[Volume] {
        &world.volumes
    }

    /// Captures a read-only snapshot of the player.
    #[must_use]
    pub fn player(world: &World) -> PlayerSnapshot {
        world.player.snapshot()
    }

    /// Captures a read-only view of the adversaries.
    #[must_use]
    pub fn ufo_view(world: &World) -> UfoView {
        let snapshots: Vec<UfoSnapshot> = world.ufos.iter().map(|ufo| ufo.snapshot()).collect();
        UfoView::from_snapshots(snapshots)
    }

    /// Captures a read-only view of the projectiles, including those awaiting removal.
    #[must_use]
    pub fn projectile_view(world: &World) -> ProjectileView {
        let snapshots: Vec<ProjectileSnapshot> = world
            .projectiles
            .iter()
            .map(|projectile| projectile.snapshot())
            .collect();
        ProjectileView::from_snapshots(snapshots)
    }

    /// Scaled ticks elapsed since the session started.
    #[must_use]
    pub fn session_clock(world: &World) -> f32 {
        world.clock
    }

    /// Number of ticks processed so far.
    #[must_use]
    pub fn tick_index(world: &World) -> u64 {
        world.tick_index
    }

    /// Adversaries downed and landed during the session.
    #[must_use]
    pub fn kills(world: &World) -> u32 {
        world.kills
    }
}
