#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Combat resolver that advances projectiles and tests them against their targets.

use glam::Vec3;
use serde::Deserialize;
use ufo_strike_core::{
    Command, Event, HitTarget, PlayerSnapshot, ProjectileKind, ProjectileSnapshot, ProjectileView,
    UfoView, Volume,
};

/// Tunable constants of the combat resolver.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Edge length of the probe volume built at a projectile's position.
    pub probe_size: f32,
    /// Scaled ticks a projectile may stay in flight before it expires.
    pub lifetime: f32,
}

impl Config {
    /// Creates a configuration with the provided lifetime cap.
    #[must_use]
    pub const fn new(lifetime: f32) -> Self {
        Self {
            probe_size: 0.1,
            lifetime,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(400.0)
    }
}

/// Position a projectile reaches after travelling for `scale` ticks.
#[must_use]
pub fn advance(projectile: &ProjectileSnapshot, scale: f32) -> Vec3 {
    projectile.position + projectile.direction * projectile.speed * scale
}

/// Tiny probe volume used to hit-test a projectile at `position`.
#[must_use]
pub fn probe_at(position: Vec3, config: &Config) -> Volume {
    Volume::new(position, Vec3::splat(config.probe_size))
}

/// Pure system that moves projectiles of one kind and reports hits or expiry.
#[derive(Debug, Default)]
pub struct Combat {
    config: Config,
}

impl Combat {
    /// Creates a combat system using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Advances every active projectile of `kind` and emits the resulting commands.
    ///
    /// Bullets are tested against adversaries that are not yet dead, lasers
    /// against the living player. Each projectile reports at most one hit.
    pub fn handle(
        &mut self,
        events: &[Event],
        kind: ProjectileKind,
        projectiles: &ProjectileView,
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

        for projectile in projectiles.active_of(kind) {
            let position = advance(projectile, scale);
            out.push(Command::MoveProjectile {
                projectile: projectile.id,
                position,
                elapsed: scale,
            });

            let probe = probe_at(position, &self.config);
            let target = match kind {
                ProjectileKind::Bullet => struck_ufo(&probe, ufos),
                ProjectileKind::Laser => struck_player(&probe, player),
            };

            if let Some(target) = target {
                out.push(Command::ResolveHit {
                    projectile: projectile.id,
                    target,
                });
            } else if projectile.age + scale > self.config.lifetime {
                log::debug!("projectile {} reached its lifetime cap", projectile.id.get());
                out.push(Command::ExpireProjectile {
                    projectile: projectile.id,
                });
            }
        }
    }
}

fn struck_ufo(probe: &Volume, ufos: &UfoView) -> Option<HitTarget> {
    ufos.iter()
        .filter(|ufo| !ufo.state.is_dead())
        .find(|ufo| ufo.hitbox().at(ufo.position).overlaps(probe))
        .map(|ufo| HitTarget::Ufo(ufo.id))
}

fn struck_player(probe: &Volume, player: &PlayerSnapshot) -> Option<HitTarget> {
    (player.alive && player.hitbox().at(player.position).overlaps(probe))
        .then_some(HitTarget::Player)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ufo_strike_core::ProjectileId;

    fn bullet() -> ProjectileSnapshot {
        ProjectileSnapshot {
            id: ProjectileId::new(0),
            kind: ProjectileKind::Bullet,
            position: Vec3::new(0.0, 10.0, 0.0),
            direction: Vec3::X,
            speed: 40.0,
            damage: 3.0,
            age: 0.0,
            active: true,
        }
    }

    #[test]
    fn advance_scales_with_tick_factor() {
        assert_eq!(advance(&bullet(), 1.0), Vec3::new(40.0, 10.0, 0.0));
        assert_eq!(advance(&bullet(), 0.5), Vec3::new(20.0, 10.0, 0.0));
    }

    #[test]
    fn probe_is_a_tiny_cube() {
        let probe = probe_at(Vec3::ONE, &Config::default());

        assert!((probe.right() - probe.left() - 0.1).abs() < 1e-6);
        assert!(probe.contains_point(Vec3::ONE));
    }

    #[test]
    fn old_projectiles_expire_instead_of_flying_forever() {
        let mut combat = Combat::new(Config::new(10.0));
        let mut projectile = bullet();
        projectile.age = 9.5;
        let view = ProjectileView::from_snapshots(vec![projectile]);
        let player = PlayerSnapshot {
            position: Vec3::new(0.0, 130.0, 20.0),
            half_extents: Vec3::new(50.0, 100.0, 50.0),
            vertical_velocity: 0.0,
            gravity: -0.19,
            speed: 10.0,
            health: 100.0,
            cooldown: 0.0,
            damage: 3.0,
            alive: true,
            aiming: false,
            stance: Default::default(),
            mode: Default::default(),
            ticks_since_heal: 0,
            ticks_since_damage: 0,
            damage_overlay: false,
            overlay: Default::default(),
        };
        let mut commands = Vec::new();

        combat.handle(
            &[Event::TimeAdvanced {
                dt: std::time::Duration::from_millis(7),
                scale: 1.0,
            }],
            ProjectileKind::Bullet,
            &view,
            &player,
            &UfoView::default(),
            &mut commands,
        );

        assert_eq!(
            commands.last(),
            Some(&Command::ExpireProjectile {
                projectile: ProjectileId::new(0),
            })
        );
    }
}
