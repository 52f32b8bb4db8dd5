use std::{fs, path::PathBuf};

use glam::Vec3;
use ufo_strike_cli::{default_arena, Pilot, Settings, Simulation, Telemetry};
use ufo_strike_core::{
    AssetRef, BobProfile, Command, Event, InputState, ProjectileKind, UfoId,
};
use ufo_strike_system_adversary::Config as AdversaryConfig;
use ufo_strike_system_spawning::Config as SpawningConfig;
use ufo_strike_world::query;

fn hostile_settings() -> Settings {
    Settings {
        adversary: AdversaryConfig {
            shoot_frequency: 1.0e9,
            grace_period: 0.0,
            ..AdversaryConfig::default()
        },
        ..Settings::default()
    }
}

fn spawn_in_front(simulation: &mut Simulation) -> UfoId {
    let player = query::player(simulation.world()).position;
    let events = simulation.apply(Command::SpawnUfo {
        position: player + Vec3::new(0.0, 70.0, 1000.0),
        bob: BobProfile::new(0.0, 0.5),
    });
    let ufo = events
        .iter()
        .find_map(|event| match event {
            Event::UfoSpawned { ufo, .. } => Some(*ufo),
            _ => None,
        })
        .expect("ufo spawned");
    let _ = simulation.resolve_assets(&events);
    ufo
}

fn ready_simulation(settings: &Settings) -> Simulation {
    let mut simulation = Simulation::new(settings, &default_arena());
    let _ = simulation.apply(Command::MarkAssetReady {
        asset: AssetRef::PlayerOverlay,
    });
    simulation
}

#[test]
fn every_tick_opens_with_time_and_closes_with_hud() {
    let settings = Settings::default();
    let mut simulation = ready_simulation(&settings);

    for _ in 0..50 {
        let events = simulation.step(settings.frame(), &InputState::new());
        assert!(matches!(events.first(), Some(Event::TimeAdvanced { .. })));
        assert!(matches!(events.last(), Some(Event::FrameCompleted { .. })));
        let reports = events
            .iter()
            .filter(|event| matches!(event, Event::FrameCompleted { .. }))
            .count();
        assert_eq!(reports, 1);
    }
}

#[test]
fn player_lands_on_the_arena_floor() {
    let settings = Settings::default();
    let mut simulation = ready_simulation(&settings);

    let mut last = None;
    for _ in 0..300 {
        let events = simulation.step(settings.frame(), &InputState::new());
        last = events.into_iter().find_map(|event| match event {
            Event::FrameCompleted { hud } => Some(hud),
            _ => None,
        });
    }

    let hud = last.expect("hud reported");
    assert_eq!(hud.health_percent, 100);
    assert_eq!(hud.coordinates, [0, 100, 20]);
}

#[test]
fn hostile_fire_kills_the_player_exactly_once() {
    let settings = hostile_settings();
    let mut simulation = ready_simulation(&settings);
    let _ = spawn_in_front(&mut simulation);
    let mut deaths = 0;
    let mut reports = Vec::new();

    for _ in 0..3_000 {
        for event in simulation.step(settings.frame(), &InputState::new()) {
            match event {
                Event::PlayerDied { kills } => {
                    deaths += 1;
                    assert_eq!(kills, 0);
                }
                Event::FrameCompleted { hud } => reports.push(hud),
                _ => {}
            }
        }
    }

    assert_eq!(deaths, 1);
    assert!(reports.iter().all(|hud| hud.health_percent <= 100));
    assert_eq!(reports.last().map(|hud| hud.health_percent), Some(0));
    assert!(!query::player(simulation.world()).alive);
}

#[test]
fn flying_player_is_never_targeted() {
    let settings = Settings {
        admin: true,
        ..hostile_settings()
    };
    let mut simulation = ready_simulation(&settings);
    let _ = spawn_in_front(&mut simulation);

    let lasers = (0..1_000)
        .flat_map(|_| simulation.step(settings.frame(), &InputState::new()))
        .filter(|event| {
            matches!(
                event,
                Event::ProjectileFired {
                    kind: ProjectileKind::Laser,
                    ..
                }
            )
        })
        .count();

    assert_eq!(lasers, 0);
    assert_eq!(query::player(simulation.world()).health, 100.0);
    assert_eq!(query::player(simulation.world()).position.y, 130.0);
}

#[test]
fn scene_hides_models_until_they_load() {
    let settings = Settings {
        spawning: SpawningConfig {
            max_active: 1,
            ..SpawningConfig::default()
        },
        ..Settings::default()
    };
    let mut simulation = ready_simulation(&settings);
    let player = query::player(simulation.world()).position;
    let spawned = simulation.apply(Command::SpawnUfo {
        position: player + Vec3::new(0.0, 70.0, 1000.0),
        bob: BobProfile::new(0.0, 0.5),
    });

    let events = simulation.step(settings.frame(), &InputState::new());
    let scene = simulation.scene(&events);
    assert_eq!(scene.ufos.len(), 1);
    assert_eq!(scene.visible_ufos().count(), 0);

    let _ = simulation.resolve_assets(&spawned);
    let events = simulation.step(settings.frame(), &InputState::new());
    let scene = simulation.scene(&events);
    assert_eq!(scene.visible_ufos().count(), 1);
    assert!(scene.hud.is_some());
}

#[test]
fn seeded_session_replays_identically() {
    let first = replay(0x0dd_ba11);
    let second = replay(0x0dd_ba11);

    assert_eq!(first, second, "replay diverged between runs");
    assert_ne!(first, replay(0xfee1_600d));

    let mut telemetry = Telemetry::default();
    telemetry.record(&first);
    assert_eq!(telemetry.ticks, 3_000);
    assert!(telemetry.spawned > 0, "no adversary spawned");
}

fn replay(seed: u64) -> Vec<Event> {
    let settings = Settings::default().with_seed(seed);
    let mut simulation = ready_simulation(&settings);
    let mut pilot = Pilot::new(settings.player.mouse_sensitivity);
    let mut log = Vec::new();

    for _ in 0..3_000 {
        let input = pilot.next(&simulation);
        let events = simulation.step(settings.frame(), &input);
        let resolved = simulation.resolve_assets(&events);
        log.extend(events);
        log.extend(resolved);
    }
    log
}

#[test]
fn settings_file_is_loaded_and_validated() {
    let path = scratch_file("valid");
    fs::write(&path, "seed = 9\nticks = 12\n\n[spawning]\nmax_active = 2\n").expect("write settings");

    let settings = Settings::load(Some(&path)).expect("settings load");
    let _ = fs::remove_file(&path);

    assert_eq!(settings.seed, 9);
    assert_eq!(settings.ticks, 12);
    assert_eq!(settings.spawning.max_active, 2);
}

#[test]
fn unreadable_or_invalid_settings_carry_context() {
    let missing = scratch_file("missing");
    let error = Settings::load(Some(&missing)).expect_err("missing file");
    assert!(format!("{error:#}").contains("failed to read settings"));

    let path = scratch_file("invalid");
    fs::write(&path, "frame_ms = 0\n").expect("write settings");
    let error = Settings::load(Some(&path)).expect_err("zero frame rejected");
    let _ = fs::remove_file(&path);
    assert!(format!("{error:#}").contains("frame duration must be positive"));

    assert_eq!(Settings::load(None).expect("defaults"), Settings::default());
}

fn scratch_file(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("ufo-strike-{}-{name}.toml", std::process::id()))
}
