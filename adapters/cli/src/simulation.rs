//! Headless tick driver wiring the world to every system.

use std::time::Duration;

use ufo_strike_core::{
    AssetRef, Command, Event, InputState, MovementMode, ProjectileKind, Volume,
};
use ufo_strike_rendering::{Camera, FieldOfView, Scene};
use ufo_strike_system_adversary::Adversary;
use ufo_strike_system_combat::Combat;
use ufo_strike_system_movement::Movement;
use ufo_strike_system_player::PlayerController;
use ufo_strike_system_spawning::Spawning;
use ufo_strike_world::{self as world, query, World};

use crate::Settings;

/// Owns the world and the systems and advances them one tick at a time.
#[derive(Debug)]
pub struct Simulation {
    world: World,
    controller: PlayerController,
    movement: Movement,
    bullets: Combat,
    lasers: Combat,
    adversary: Adversary,
    spawning: Spawning,
    field_of_view: FieldOfView,
}

impl Simulation {
    /// Builds a session from the settings and the static geometry.
    #[must_use]
    pub fn new(settings: &Settings, geometry: &[Volume]) -> Self {
        let mut simulation = Self {
            world: World::with_config(settings.world.clone()),
            controller: PlayerController::new(settings.player),
            movement: Movement::new(settings.movement),
            bullets: Combat::new(settings.combat),
            lasers: Combat::new(settings.combat),
            adversary: Adversary::new(settings.adversary_config()),
            spawning: Spawning::new(settings.spawning_config()),
            field_of_view: FieldOfView::default(),
        };

        let mut events = Vec::new();
        for volume in geometry {
            world::apply(
                &mut simulation.world,
                Command::AddVolume { volume: *volume },
                &mut events,
            );
        }
        if settings.admin {
            world::apply(
                &mut simulation.world,
                Command::SetMovementMode {
                    mode: MovementMode::Flying,
                },
                &mut events,
            );
        }
        log::debug!("session built with {} volumes", query::volumes(&simulation.world).len());
        simulation
    }

    /// Read access to the authoritative world.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Camera yaw and tilt in degrees.
    #[must_use]
    pub fn heading(&self) -> (f32, f32) {
        (self.controller.yaw(), self.controller.tilt())
    }

    /// Applies an out-of-band command, such as a scripted spawn or an asset becoming ready.
    pub fn apply(&mut self, command: Command) -> Vec<Event> {
        let mut events = Vec::new();
        world::apply(&mut self.world, command, &mut events);
        events
    }

    /// Marks every asset requested by `events` as loaded.
    ///
    /// Headless sessions have no asset collaborator, so models resolve right
    /// after the tick that requested them.
    pub fn resolve_assets(&mut self, events: &[Event]) -> Vec<Event> {
        let mut resolved = Vec::new();
        for event in events {
            if let Event::UfoSpawned { ufo, .. } = event {
                world::apply(
                    &mut self.world,
                    Command::MarkAssetReady {
                        asset: AssetRef::Ufo(*ufo),
                    },
                    &mut resolved,
                );
            }
        }
        resolved
    }

    /// Runs one tick and returns every event it produced in order.
    ///
    /// Systems run in a fixed order: player controller, movement, bullets,
    /// adversaries, lasers, spawner. Each system sees the events emitted
    /// earlier in the same tick.
    pub fn step(&mut self, dt: Duration, input: &InputState) -> Vec<Event> {
        let mut events = Vec::new();
        world::apply(&mut self.world, Command::Tick { dt }, &mut events);

        let mut commands = Vec::new();
        let intent = self.controller.handle(
            &events,
            input,
            &query::player(&self.world),
            &mut commands,
        );
        self.flush(&mut commands, &mut events);

        self.movement.handle(
            &events,
            &query::player(&self.world),
            &intent,
            query::volumes(&self.world),
            &mut commands,
        );
        self.flush(&mut commands, &mut events);

        self.bullets.handle(
            &events,
            ProjectileKind::Bullet,
            &query::projectile_view(&self.world),
            &query::player(&self.world),
            &query::ufo_view(&self.world),
            &mut commands,
        );
        self.flush(&mut commands, &mut events);

        self.adversary.handle(
            &events,
            &query::player(&self.world),
            &query::ufo_view(&self.world),
            query::volumes(&self.world),
            query::session_clock(&self.world),
            &mut commands,
        );
        self.flush(&mut commands, &mut events);

        self.lasers.handle(
            &events,
            ProjectileKind::Laser,
            &query::projectile_view(&self.world),
            &query::player(&self.world),
            &query::ufo_view(&self.world),
            &mut commands,
        );
        self.flush(&mut commands, &mut events);

        self.spawning.handle(
            &events,
            &query::player(&self.world),
            &query::ufo_view(&self.world),
            &mut commands,
        );
        commands.push(Command::EndTick);
        self.flush(&mut commands, &mut events);

        self.field_of_view.observe(&events);
        events
    }

    /// Captures the scene a rendering backend would draw after `events`.
    #[must_use]
    pub fn scene(&self, events: &[Event]) -> Scene {
        let camera = Camera {
            yaw: self.controller.yaw(),
            tilt: self.controller.tilt(),
            field_of_view: self.field_of_view.value(),
        };
        Scene::capture(
            camera,
            &query::player(&self.world),
            &query::ufo_view(&self.world),
            &query::projectile_view(&self.world),
            query::config(&self.world).ufo_hitbox_offset,
            events,
        )
    }

    fn flush(&mut self, commands: &mut Vec<Command>, events: &mut Vec<Event>) {
        for command in commands.drain(..) {
            world::apply(&mut self.world, command, events);
        }
    }
}
