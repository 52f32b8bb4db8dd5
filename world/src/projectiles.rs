//! Authoritative projectile population.

use glam::Vec3;
use ufo_strike_core::{ProjectileId, ProjectileKind, ProjectileSnapshot};

#[derive(Clone, Debug)]
pub(crate) struct Projectile {
    pub(crate) id: ProjectileId,
    pub(crate) kind: ProjectileKind,
    pub(crate) position: Vec3,
    pub(crate) direction: Vec3,
    pub(crate) speed: f32,
    pub(crate) damage: f32,
    pub(crate) age: f32,
    pub(crate) active: bool,
}

impl Projectile {
    pub(crate) fn snapshot(&self) -> ProjectileSnapshot {
        ProjectileSnapshot {
            id: self.id,
            kind: self.kind,
            position: self.position,
            direction: self.direction,
            speed: self.speed,
            damage: self.damage,
            age: self.age,
            active: self.active,
        }
    }
}

/// Launch parameters for a new projectile.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Launch {
    pub(crate) kind: ProjectileKind,
    pub(crate) origin: Vec3,
    pub(crate) direction: Vec3,
    pub(crate) speed: f32,
    pub(crate) damage: f32,
}

/// Projectile population. Deactivated entries linger until the next tick begins.
#[derive(Debug)]
pub(crate) struct ProjectileRegistry {
    entries: Vec<Projectile>,
    next_id: u32,
}

impl ProjectileRegistry {
    pub(crate) fn new() -> Self {
        Self {
            entries: Vec::new(),
            next_id: 0,
        }
    }

    pub(crate) fn launch(&mut self, launch: Launch) -> ProjectileId {
        let id = ProjectileId::new(self.next_id);
        self.next_id = self.next_id.saturating_add(1);
        self.entries.push(Projectile {
            id,
            kind: launch.kind,
            position: launch.origin,
            direction: launch.direction,
            speed: launch.speed,
            damage: launch.damage,
            age: 0.0,
            active: true,
        });
        id
    }

    /// Active projectile with the identifier, if any.
    pub(crate) fn active_mut(&mut self, id: ProjectileId) -> Option<&mut Projectile> {
        self.entries
            .iter_mut()
            .find(|projectile| projectile.id == id && projectile.active)
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &Projectile> {
        self.entries.iter()
    }

    /// Drops deactivated projectiles, returning their identifiers.
    pub(crate) fn remove_inactive(&mut self) -> Vec<ProjectileId> {
        let removed: Vec<ProjectileId> = self
            .entries
            .iter()
            .filter(|projectile| !projectile.active)
            .map(|projectile| projectile.id)
            .collect();
        self.entries.retain(|projectile| projectile.active);
        removed
    }
}
