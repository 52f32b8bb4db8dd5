//! Authoritative adversary state and identifier allocation.

use std::{collections::VecDeque, time::Duration};

use glam::Vec3;
use ufo_strike_core::{AssetState, BobProfile, UfoId, UfoSnapshot, UfoState, MAX_HEALTH};

/// Red tint scheduled to start once the adversary's effect clock reaches `at`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct ScheduledFlash {
    pub(crate) at: Duration,
    pub(crate) duration: Duration,
}

/// Outcome of a damage intake applied to an adversary.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum UfoHit {
    /// The adversary survived.
    Damaged {
        state: UfoState,
        damage_since_reposition: f32,
    },
    /// The adversary lost its remaining health and entered `Dead`.
    Downed { from: UfoState },
    /// The adversary was already dead.
    Ignored,
}

/// Mutable adversary record owned by the world.
#[derive(Clone, Debug)]
pub(crate) struct Ufo {
    pub(crate) id: UfoId,
    pub(crate) state: UfoState,
    pub(crate) resume: UfoState,
    pub(crate) equilibrium: Vec3,
    pub(crate) bob_offset: Vec3,
    pub(crate) half_extents: Vec3,
    pub(crate) health: f32,
    pub(crate) target: Option<Vec3>,
    pub(crate) ticks_since_last_shot: u32,
    pub(crate) damage_since_reposition: f32,
    pub(crate) yaw: f32,
    pub(crate) age: f32,
    pub(crate) bob: BobProfile,
    pub(crate) grounded: bool,
    pub(crate) asset: AssetState,
    effect_clock: Duration,
    flashes: VecDeque<ScheduledFlash>,
}

impl Ufo {
    pub(crate) fn new(id: UfoId, equilibrium: Vec3, half_extents: Vec3, bob: BobProfile) -> Self {
        Self {
            id,
            state: UfoState::Hover,
            resume: UfoState::Hover,
            equilibrium,
            bob_offset: bob.offset(0.0),
            half_extents,
            health: MAX_HEALTH,
            target: None,
            ticks_since_last_shot: 0,
            damage_since_reposition: 0.0,
            yaw: 0.0,
            age: 0.0,
            bob,
            grounded: false,
            asset: AssetState::Pending,
            effect_clock: Duration::ZERO,
            flashes: VecDeque::new(),
        }
    }

    /// Hitbox centre including the bobbing offset.
    pub(crate) fn position(&self) -> Vec3 {
        self.equilibrium + self.bob_offset
    }

    pub(crate) fn snapshot(&self) -> UfoSnapshot {
        UfoSnapshot {
            id: self.id,
            state: self.state,
            resume: self.resume,
            equilibrium: self.equilibrium,
            position: self.position(),
            half_extents: self.half_extents,
            health: self.health,
            target: self.target,
            ticks_since_last_shot: self.ticks_since_last_shot,
            damage_since_reposition: self.damage_since_reposition,
            yaw: self.yaw,
            grounded: self.grounded,
            asset: self.asset,
        }
    }

    /// Queues a flash `delay` after the current effect clock.
    pub(crate) fn schedule_flash(&mut self, delay: Duration, duration: Duration) {
        let flash = ScheduledFlash {
            at: self.effect_clock + delay,
            duration,
        };
        let index = self
            .flashes
            .iter()
            .position(|queued| queued.at > flash.at)
            .unwrap_or(self.flashes.len());
        self.flashes.insert(index, flash);
    }

    /// Advances age, bobbing and the effect clock, returning flashes that became due.
    pub(crate) fn advance(&mut self, dt: Duration, scale: f32) -> Vec<Duration> {
        self.age += scale;
        if !self.state.is_dead() {
            self.bob_offset = self.bob.offset(self.age);
        }

        self.effect_clock = self.effect_clock.saturating_add(dt);
        let mut due = Vec::new();
        while let Some(flash) = self.flashes.front() {
            if flash.at > self.effect_clock {
                break;
            }
            if let Some(flash) = self.flashes.pop_front() {
                due.push(flash.duration);
            }
        }
        due
    }

    /// Applies damage intake. Entering `Dead` freezes the bobbing offset into the anchor.
    pub(crate) fn take_damage(&mut self, amount: f32) -> UfoHit {
        if self.state.is_dead() {
            return UfoHit::Ignored;
        }

        let amount = amount.max(0.0);
        self.damage_since_reposition += amount;
        self.health = (self.health - amount).max(0.0);
        if self.health > 0.0 {
            return UfoHit::Damaged {
                state: self.state,
                damage_since_reposition: self.damage_since_reposition,
            };
        }

        let from = self.state;
        self.state = UfoState::Dead;
        self.resume = UfoState::Dead;
        self.target = None;
        self.equilibrium = self.position();
        self.bob_offset = Vec3::ZERO;
        UfoHit::Downed { from }
    }
}

/// Ordered adversary population with monotonically allocated identifiers.
#[derive(Debug)]
pub(crate) struct UfoRegistry {
    entries: Vec<Ufo>,
    next_id: u32,
}

impl UfoRegistry {
    pub(crate) fn new() -> Self {
        Self {
            entries: Vec::new(),
            next_id: 0,
        }
    }

    pub(crate) fn spawn(&mut self, equilibrium: Vec3, half_extents: Vec3, bob: BobProfile) -> UfoId {
        let id = UfoId::new(self.next_id);
        self.next_id = self.next_id.saturating_add(1);
        self.entries.push(Ufo::new(id, equilibrium, half_extents, bob));
        id
    }

    pub(crate) fn get_mut(&mut self, id: UfoId) -> Option<&mut Ufo> {
        self.entries.iter_mut().find(|ufo| ufo.id == id)
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &Ufo> {
        self.entries.iter()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut Ufo> {
        self.entries.iter_mut()
    }

    /// Removes adversaries that finished their descent, returning their identifiers.
    pub(crate) fn remove_grounded(&mut self) -> Vec<UfoId> {
        let removed: Vec<UfoId> = self
            .entries
            .iter()
            .filter(|ufo| ufo.grounded)
            .map(|ufo| ufo.id)
            .collect();
        self.entries.retain(|ufo| !ufo.grounded);
        removed
    }
}
