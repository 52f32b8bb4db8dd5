//! Scripted input for headless sessions.

use glam::Vec3;
use ufo_strike_core::{InputState, Key};
use ufo_strike_world::query;

use crate::Simulation;

/// Degrees the pilot may turn per tick.
const MAX_TURN: f32 = 6.0;
/// Angular error in degrees under which the pilot pulls the trigger.
const FIRE_TOLERANCE: f32 = 1.5;
/// Horizontal distance under which the pilot aims down the sights.
const AIM_RANGE: f32 = 3_000.0;
/// Ticks between strafe direction changes.
const STRAFE_PERIOD: u64 = 200;

/// Deterministic pilot that hunts the nearest loaded adversary.
#[derive(Debug)]
pub struct Pilot {
    sensitivity: f32,
    tick: u64,
    trigger_down: bool,
}

impl Pilot {
    /// Creates a pilot whose mouse movement matches the controller's sensitivity.
    #[must_use]
    pub fn new(sensitivity: f32) -> Self {
        Self {
            sensitivity,
            tick: 0,
            trigger_down: false,
        }
    }

    /// Samples the input for the next tick.
    pub fn next(&mut self, simulation: &Simulation) -> InputState {
        self.tick += 1;
        let world = simulation.world();
        let player = query::player(world).position;
        let (yaw, tilt) = simulation.heading();

        let target = query::ufo_view(world)
            .iter()
            .filter(|ufo| !ufo.state.is_dead() && ufo.asset.is_ready())
            .map(|ufo| ufo.position)
            .min_by(|a, b| a.distance_squared(player).total_cmp(&b.distance_squared(player)));

        let Some(target) = target else {
            self.trigger_down = false;
            return self.wander();
        };

        let (desired_yaw, desired_tilt) = facing(target - player);
        let yaw_error = wrap_degrees(desired_yaw - yaw);
        let tilt_error = desired_tilt - tilt;
        let mut input = self.turn(yaw_error, tilt_error);

        let offset = target - player;
        if Vec3::new(offset.x, 0.0, offset.z).length() < AIM_RANGE {
            input.set(Key::Aim, true);
        }
        input.set(self.strafe_key(), true);

        let aligned = yaw_error.abs() < FIRE_TOLERANCE && tilt_error.abs() < FIRE_TOLERANCE;
        self.trigger_down = aligned && !self.trigger_down;
        input.set(Key::Fire, self.trigger_down);
        input
    }

    fn wander(&self) -> InputState {
        let input = InputState::new().with_mouse_delta(1.0 / self.sensitivity, 0.0);
        if (self.tick / STRAFE_PERIOD) % 3 == 0 {
            input
        } else {
            input.with_pressed(Key::Forward)
        }
    }

    fn turn(&self, yaw_error: f32, tilt_error: f32) -> InputState {
        let yaw_step = yaw_error.clamp(-MAX_TURN, MAX_TURN);
        let tilt_step = tilt_error.clamp(-MAX_TURN, MAX_TURN);
        InputState::new().with_mouse_delta(yaw_step / self.sensitivity, tilt_step / self.sensitivity)
    }

    fn strafe_key(&self) -> Key {
        if (self.tick / STRAFE_PERIOD) % 2 == 0 {
            Key::Left
        } else {
            Key::Right
        }
    }
}

/// Camera yaw and tilt in degrees that point the weapon along `offset`.
fn facing(offset: Vec3) -> (f32, f32) {
    let horizontal = Vec3::new(offset.x, 0.0, offset.z).length();
    let tilt = offset.y.atan2(horizontal).to_degrees();
    let heading = offset.z.atan2(offset.x).to_degrees();
    ((-heading - 90.0).rem_euclid(360.0), tilt)
}

fn wrap_degrees(angle: f32) -> f32 {
    (angle + 180.0).rem_euclid(360.0) - 180.0
}
