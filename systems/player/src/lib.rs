#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Player controller that turns sampled input into intents and commands.
//!
//! The controller owns the camera orientation. Yaw and tilt are kept in
//! degrees because every direction derived from them is expressed as an
//! offset in degrees from the current yaw.

use glam::Vec3;
use serde::Deserialize;
use ufo_strike_core::{
    Command, Event, InputState, Key, MovementMode, PlayerIntent, PlayerSnapshot, Stance, MAX_HEALTH,
};

/// Tunable constants of the player controller.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Degrees of rotation per unit of mouse movement.
    pub mouse_sensitivity: f32,
    /// Largest tilt magnitude in degrees.
    pub tilt_limit: f32,
    /// Tilt of the camera when the session starts.
    pub initial_tilt: f32,
    /// Vertical speed while flying.
    pub fly_speed: f32,
    /// Ticks without healing before one regeneration step.
    pub regen_interval: u32,
    /// Health restored by one regeneration step.
    pub regen_amount: f32,
    /// Ticks without damage before the damage overlay is hidden.
    pub overlay_timeout: u32,
}

impl Config {
    /// Creates a configuration with the provided mouse sensitivity.
    #[must_use]
    pub fn new(mouse_sensitivity: f32) -> Self {
        Self {
            mouse_sensitivity,
            ..Self::default()
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            mouse_sensitivity: -0.5 * 0.1,
            tilt_limit: 89.99,
            initial_tilt: 15.0,
            fly_speed: 10.0,
            regen_interval: 250,
            regen_amount: 1.0,
            overlay_timeout: 300,
        }
    }
}

/// Pure system translating input into a movement intent and player commands.
#[derive(Debug)]
pub struct PlayerController {
    config: Config,
    yaw: f32,
    tilt: f32,
    fire_held: bool,
    trigger_latched: bool,
}

impl PlayerController {
    /// Creates a controller facing yaw zero at the configured initial tilt.
    #[must_use]
    pub fn new(config: Config) -> Self {
        let tilt = config.initial_tilt.clamp(-config.tilt_limit, config.tilt_limit);
        Self {
            config,
            yaw: 0.0,
            tilt,
            fire_held: false,
            trigger_latched: false,
        }
    }

    /// Camera yaw in degrees, within `[0, 360)`.
    #[must_use]
    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    /// Camera tilt in degrees, within the configured limit.
    #[must_use]
    pub fn tilt(&self) -> f32 {
        self.tilt
    }

    /// Unit vector a fired bullet travels along.
    #[must_use]
    pub fn aim_direction(&self) -> Vec3 {
        let yaw = (-self.yaw - 90.0).to_radians();
        let pitch = self.tilt.to_radians();
        Vec3::new(yaw.cos() * pitch.cos(), pitch.sin(), yaw.sin() * pitch.cos())
    }

    /// Consumes the tick's events and input to emit player commands.
    ///
    /// Returns the intent handed to the movement resolver. Nothing beyond
    /// camera look is read from the input once the player is dead.
    pub fn handle(
        &mut self,
        events: &[Event],
        input: &InputState,
        player: &PlayerSnapshot,
        out: &mut Vec<Command>,
    ) -> PlayerIntent {
        let ticked = events
            .iter()
            .any(|event| matches!(event, Event::TimeAdvanced { .. }));
        if !ticked {
            return PlayerIntent::default();
        }

        self.look(input.mouse_delta());

        if !player.alive {
            self.fire_held = false;
            self.trigger_latched = false;
            return PlayerIntent::default();
        }

        self.recover(player, out);
        self.aim(input, player, out);
        self.trigger(input, player, out);
        self.intent(input, player, out)
    }

    fn look(&mut self, (dx, dy): (f32, f32)) {
        if !dx.is_finite() || !dy.is_finite() {
            log::debug!("ignored non-finite mouse delta");
            return;
        }
        self.yaw = (self.yaw + dx * self.config.mouse_sensitivity).rem_euclid(360.0);
        self.tilt = (self.tilt + dy * self.config.mouse_sensitivity)
            .clamp(-self.config.tilt_limit, self.config.tilt_limit);
    }

    fn recover(&self, player: &PlayerSnapshot, out: &mut Vec<Command>) {
        if player.ticks_since_heal > self.config.regen_interval && player.health < MAX_HEALTH {
            out.push(Command::HealPlayer {
                amount: self.config.regen_amount,
            });
        }
        if player.damage_overlay && player.ticks_since_damage > self.config.overlay_timeout {
            out.push(Command::ClearDamageOverlay);
        }
    }

    fn aim(&self, input: &InputState, player: &PlayerSnapshot, out: &mut Vec<Command>) {
        let aiming = input.is_pressed(Key::Aim);
        if aiming != player.aiming {
            out.push(Command::SetAiming { aiming });
        }
    }

    fn trigger(&mut self, input: &InputState, player: &PlayerSnapshot, out: &mut Vec<Command>) {
        let pressed = input.is_pressed(Key::Fire);
        if pressed && !self.fire_held && player.cooldown <= 0.0 {
            self.trigger_latched = true;
        }
        self.fire_held = pressed;

        // The weapon stays silent until the overlay model it animates is loaded.
        if self.trigger_latched && player.cooldown <= 0.0 && player.overlay.is_ready() {
            self.trigger_latched = false;
            out.push(Command::FirePlayerWeapon {
                direction: self.aim_direction(),
            });
        }
    }

    fn intent(
        &self,
        input: &InputState,
        player: &PlayerSnapshot,
        out: &mut Vec<Command>,
    ) -> PlayerIntent {
        let headings = [
            (Key::Forward, 180.0),
            (Key::Left, 270.0),
            (Key::Backward, 0.0),
            (Key::Right, 90.0),
        ];
        let planar: Vec3 = headings
            .iter()
            .filter(|(key, _)| input.is_pressed(*key))
            .map(|(_, offset)| heading(self.yaw + offset, player.speed))
            .sum();

        let jump = input.is_pressed(Key::Jump);
        let crouch = input.is_pressed(Key::Crouch);
        match player.mode {
            MovementMode::Flying => {
                let mut vertical = 0.0;
                if jump {
                    vertical += self.config.fly_speed;
                }
                if crouch {
                    vertical -= self.config.fly_speed;
                }
                PlayerIntent {
                    planar,
                    vertical,
                    jump: false,
                }
            }
            MovementMode::Walking => {
                let stance = if crouch {
                    Stance::Crouching
                } else {
                    Stance::Standing
                };
                if stance != player.stance {
                    out.push(Command::SetPlayerStance { stance });
                }
                PlayerIntent {
                    planar,
                    vertical: 0.0,
                    jump,
                }
            }
        }
    }
}

impl Default for PlayerController {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

fn heading(degrees: f32, speed: f32) -> Vec3 {
    let radians = degrees.to_radians();
    Vec3::new(speed * radians.sin(), 0.0, speed * radians.cos())
}
