use std::time::Duration;

use glam::Vec3;
use ufo_strike_core::{BobProfile, Command, Event, HitTarget, ProjectileKind, UfoId};
use ufo_strike_system_combat::{Combat, Config};
use ufo_strike_world::{self as world, query, World};

const FRAME: Duration = Duration::from_millis(7);

fn spawn_still_ufo(world: &mut World, hitbox_center: Vec3) -> UfoId {
    let mut events = Vec::new();
    let offset = query::config(world).ufo_hitbox_offset;
    world::apply(
        world,
        Command::SpawnUfo {
            position: hitbox_center - offset,
            bob: BobProfile::new(0.0, 0.5),
        },
        &mut events,
    );
    events
        .iter()
        .find_map(|event| match event {
            Event::UfoSpawned { ufo, .. } => Some(*ufo),
            _ => None,
        })
        .expect("ufo spawned")
}

fn tick(world: &mut World, combat: &mut Combat, kind: ProjectileKind) -> Vec<Event> {
    let mut events = Vec::new();
    world::apply(world, Command::Tick { dt: FRAME }, &mut events);

    let mut commands = Vec::new();
    combat.handle(
        &events,
        kind,
        &query::projectile_view(world),
        &query::player(world),
        &query::ufo_view(world),
        &mut commands,
    );
    for command in commands {
        world::apply(world, command, &mut events);
    }
    events
}

fn hit_tick(events_per_tick: &[Vec<Event>]) -> Option<usize> {
    events_per_tick.iter().position(|events| {
        events
            .iter()
            .any(|event| matches!(event, Event::ProjectileHit { .. }))
    })
}

#[test]
fn bullet_reaches_adversary_after_expected_ticks() {
    let mut world = World::new();
    let mut combat = Combat::default();
    let player = query::player(&world).position;
    let half_width = query::config(&world).ufo_half_extents.x;
    let ufo = spawn_still_ufo(&mut world, player + Vec3::new(100.0 + half_width, 0.0, 0.0));

    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::FirePlayerWeapon { direction: Vec3::X },
        &mut events,
    );

    let log: Vec<Vec<Event>> = (0..10)
        .map(|_| tick(&mut world, &mut combat, ProjectileKind::Bullet))
        .collect();

    let expected_ticks = (100.0_f32 / 40.0).ceil() as usize;
    assert_eq!(hit_tick(&log).map(|index| index + 1), Some(expected_ticks));
    let ufo = query::ufo_view(&world).get(ufo).copied().expect("ufo alive");
    assert_eq!(ufo.health, 97.0);
}

#[test]
fn spent_projectile_is_removed_on_the_next_tick() {
    let mut world = World::new();
    let mut combat = Combat::default();
    let player = query::player(&world).position;
    let _ = spawn_still_ufo(&mut world, player + Vec3::new(250.0, 0.0, 0.0));

    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::FirePlayerWeapon { direction: Vec3::X },
        &mut events,
    );

    let first = tick(&mut world, &mut combat, ProjectileKind::Bullet);
    assert!(first
        .iter()
        .any(|event| matches!(event, Event::ProjectileHit { .. })));
    let active = query::projectile_view(&world)
        .active_of(ProjectileKind::Bullet)
        .count();
    assert_eq!(active, 0);

    let second = tick(&mut world, &mut combat, ProjectileKind::Bullet);
    assert!(second
        .iter()
        .any(|event| matches!(event, Event::ProjectileRemoved { .. })));
    assert_eq!(query::projectile_view(&world).iter().count(), 0);
}

#[test]
fn laser_strikes_player_and_ignores_adversaries() {
    let mut world = World::new();
    let mut combat = Combat::default();
    let player = query::player(&world).position;
    let ufo = spawn_still_ufo(&mut world, player + Vec3::new(0.0, 0.0, 1000.0));

    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::FireLaser {
            ufo,
            direction: Vec3::NEG_Z,
        },
        &mut events,
    );

    let log: Vec<Vec<Event>> = (0..40)
        .map(|_| tick(&mut world, &mut combat, ProjectileKind::Laser))
        .collect();

    let hits: Vec<&Event> = log
        .iter()
        .flatten()
        .filter(|event| matches!(event, Event::ProjectileHit { .. }))
        .collect();
    assert_eq!(hits.len(), 1);
    assert!(matches!(
        hits[0],
        Event::ProjectileHit {
            target: HitTarget::Player,
            ..
        }
    ));
    assert_eq!(query::player(&world).health, 95.0);
}

#[test]
fn bullets_pass_through_downed_adversaries() {
    let mut world = World::new();
    let mut combat = Combat::new(Config::new(20.0));
    let player = query::player(&world).position;
    let ufo = spawn_still_ufo(&mut world, player + Vec3::new(400.0, 0.0, 0.0));
    let mut events = Vec::new();

    for _ in 0..34 {
        world::apply(
            &mut world,
            Command::FirePlayerWeapon { direction: Vec3::X },
            &mut events,
        );
        for _ in 0..101 {
            let _ = tick(&mut world, &mut combat, ProjectileKind::Bullet);
        }
    }
    let downed = query::ufo_view(&world).get(ufo).map(|ufo| ufo.state.is_dead());
    assert_eq!(downed, Some(true));

    world::apply(
        &mut world,
        Command::FirePlayerWeapon { direction: Vec3::X },
        &mut events,
    );
    let log: Vec<Vec<Event>> = (0..30)
        .map(|_| tick(&mut world, &mut combat, ProjectileKind::Bullet))
        .collect();

    assert_eq!(hit_tick(&log), None);
    assert!(log
        .iter()
        .flatten()
        .any(|event| matches!(event, Event::ProjectileExpired { .. })));
}
