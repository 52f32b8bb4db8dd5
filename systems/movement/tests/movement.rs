use std::time::Duration;

use glam::Vec3;
use ufo_strike_core::{Command, Event, MovementMode, PlayerIntent, Stance, Volume};
use ufo_strike_system_movement::Movement;
use ufo_strike_world::{self as world, query, World};

const FRAME: Duration = Duration::from_millis(7);

fn ground() -> Volume {
    Volume::new(Vec3::new(0.0, -10.0, 0.0), Vec3::new(20_000.0, 20.0, 20_000.0))
}

fn world_with(volumes: &[Volume]) -> World {
    let mut world = World::new();
    let mut events = Vec::new();
    for volume in volumes {
        world::apply(&mut world, Command::AddVolume { volume: *volume }, &mut events);
    }
    world
}

fn step(world: &mut World, movement: &mut Movement, intent: PlayerIntent) {
    let mut events = Vec::new();
    world::apply(world, Command::Tick { dt: FRAME }, &mut events);

    let player = query::player(world);
    let mut commands = Vec::new();
    movement.handle(&events, &player, &intent, query::volumes(world), &mut commands);
    for command in commands {
        world::apply(world, command, &mut events);
    }
}

#[test]
fn player_settles_on_ground_and_stays_there() {
    let mut world = world_with(&[ground()]);
    let mut movement = Movement::default();

    for _ in 0..400 {
        step(&mut world, &mut movement, PlayerIntent::default());
    }

    let player = query::player(&world);
    assert!(player.position.y >= 100.0);
    assert!(player.position.y < 101.0);
    assert!(player.vertical_velocity.abs() <= 0.2);
}

#[test]
fn falling_height_decreases_monotonically() {
    let mut world = world_with(&[ground()]);
    let mut movement = Movement::default();
    let mut previous = query::player(&world).position.y;

    for _ in 0..60 {
        step(&mut world, &mut movement, PlayerIntent::default());
        let height = query::player(&world).position.y;
        assert!(height <= previous, "player rose while falling freely");
        previous = height;
    }
    assert!(previous < 130.0);
}

#[test]
fn blocked_axis_still_allows_sliding() {
    let wall = Volume::new(Vec3::new(100.0, 100.0, 20.0), Vec3::new(20.0, 400.0, 4000.0));
    let mut world = world_with(&[ground(), wall]);
    let mut movement = Movement::default();
    let intent = PlayerIntent {
        planar: Vec3::new(10.0, 0.0, 10.0),
        ..PlayerIntent::default()
    };

    for _ in 0..50 {
        step(&mut world, &mut movement, intent);
    }

    let player = query::player(&world);
    assert!(player.position.x + 50.0 <= wall.left());
    assert!(player.position.z > 150.0, "no sliding along the wall");
}

#[test]
fn walking_into_wall_converges_within_one_step() {
    let wall = Volume::new(Vec3::new(300.0, 100.0, 20.0), Vec3::new(20.0, 400.0, 4000.0));
    let mut world = world_with(&[ground(), wall]);
    let mut movement = Movement::default();
    let intent = PlayerIntent {
        planar: Vec3::X,
        ..PlayerIntent::default()
    };

    for _ in 0..100 {
        step(&mut world, &mut movement, intent);
    }

    let gap = wall.left() - (query::player(&world).position.x + 50.0);
    assert!(gap >= 0.0);
    assert!(gap <= 10.0, "player stopped {gap} units short of the wall");
}

#[test]
fn standing_up_from_crouch_recovers_out_of_the_ground() {
    let mut world = world_with(&[ground()]);
    let mut movement = Movement::default();
    for _ in 0..400 {
        step(&mut world, &mut movement, PlayerIntent::default());
    }
    let standing = query::player(&world).position.y;

    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::SetPlayerStance {
            stance: Stance::Crouching,
        },
        &mut events,
    );
    for _ in 0..400 {
        step(&mut world, &mut movement, PlayerIntent::default());
    }
    let crouched = query::player(&world).position.y;
    assert!(crouched < standing);

    world::apply(
        &mut world,
        Command::SetPlayerStance {
            stance: Stance::Standing,
        },
        &mut events,
    );
    for _ in 0..200 {
        step(&mut world, &mut movement, PlayerIntent::default());
    }
    let recovered = query::player(&world).position.y;
    assert!(recovered >= standing - 1.0);
}

#[test]
fn flying_mode_holds_altitude_without_input() {
    let mut world = world_with(&[ground()]);
    let mut movement = Movement::default();
    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::SetMovementMode {
            mode: MovementMode::Flying,
        },
        &mut events,
    );
    assert!(events.contains(&Event::MovementModeChanged {
        mode: MovementMode::Flying
    }));

    for _ in 0..50 {
        step(&mut world, &mut movement, PlayerIntent::default());
    }

    assert_eq!(query::player(&world).position.y, 130.0);
}
