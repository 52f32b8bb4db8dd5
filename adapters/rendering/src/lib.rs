#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering, audio and HUD contracts for UFO Strike adapters.
//!
//! The simulation never draws, plays or loads anything. Adapters capture a
//! [`Scene`] from the world's snapshots after every tick and forward the
//! tick's cues to the collaborators implementing the traits below.

use glam::Vec3;
use thiserror::Error;
use ufo_strike_core::{
    AmbienceFade, AudioCue, Event, HudReport, PlayerSnapshot, ProjectileId,
    ProjectileKind, ProjectileView, UfoId, UfoState, UfoView, VisualCue, VisualTarget,
};

/// Linear RGBA color of a debug tint or projectile beam.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red channel in `0.0..=1.0`.
    pub red: f32,
    /// Green channel in `0.0..=1.0`.
    pub green: f32,
    /// Blue channel in `0.0..=1.0`.
    pub blue: f32,
    /// Opacity in `0.0..=1.0`.
    pub alpha: f32,
}

impl Color {
    /// Creates a color from its four channels.
    #[must_use]
    pub const fn new(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Unpacks an opaque color from a `0xRRGGBB` value.
    #[must_use]
    pub const fn from_hex(rgb: u32) -> Self {
        Self::new(channel(rgb >> 16), channel(rgb >> 8), channel(rgb), 1.0)
    }
}

const fn channel(packed: u32) -> f32 {
    (packed & 0xff) as f32 / 255.0
}

/// Debug tint of an adversary hitbox for each state.
#[must_use]
pub const fn state_color(state: UfoState) -> Color {
    match state {
        UfoState::Hover => Color::from_hex(0x00ff00),
        UfoState::Attack => Color::from_hex(0xff0000),
        UfoState::Moving => Color::from_hex(0xfc7b03),
        UfoState::Dead => Color::from_hex(0x0000ff),
    }
}

/// Errors that can occur when constructing rendering descriptors.
#[derive(Debug, Error, PartialEq)]
pub enum RenderingError {
    /// The field of view bounds are empty or the initial value lies outside them.
    #[error("field of view {value} must lie within {min}..={max}")]
    InvalidFieldOfView {
        /// Initial field of view in degrees.
        value: f32,
        /// Narrowest field of view.
        min: f32,
        /// Widest field of view.
        max: f32,
    },
}

/// Vertical field of view animated by aim changes.
///
/// Each tick moves the value by the last requested per-tick delta. The
/// animation stops as soon as the next step would leave the bounds.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FieldOfView {
    value: f32,
    rate: f32,
    min: f32,
    max: f32,
}

impl FieldOfView {
    /// Creates a field of view starting at `value` within `min..=max`.
    pub fn new(value: f32, min: f32, max: f32) -> Result<Self, RenderingError> {
        let valid = value.is_finite() && min.is_finite() && max.is_finite();
        if !valid || min <= 0.0 || min >= max || !(min..=max).contains(&value) {
            return Err(RenderingError::InvalidFieldOfView { value, min, max });
        }
        Ok(Self {
            value,
            rate: 0.0,
            min,
            max,
        })
    }

    /// Current field of view in degrees.
    #[must_use]
    pub fn value(&self) -> f32 {
        self.value
    }

    /// Applies the aim changes and elapsed time reported by a tick.
    pub fn observe(&mut self, events: &[Event]) {
        for event in events {
            match event {
                Event::AimChanged { fov_delta, .. } => self.rate = *fov_delta,
                Event::TimeAdvanced { scale, .. } => self.advance(*scale),
                _ => {}
            }
        }
    }

    fn advance(&mut self, scale: f32) {
        let next = self.value + self.rate * scale;
        if next > self.max || next < self.min || !next.is_finite() {
            self.rate = 0.0;
        } else {
            self.value = next;
        }
    }
}

impl Default for FieldOfView {
    fn default() -> Self {
        Self {
            value: 60.0,
            rate: 0.0,
            min: 30.0,
            max: 60.0,
        }
    }
}

/// First-person camera placed at the player's position.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Camera {
    /// Yaw in degrees.
    pub yaw: f32,
    /// Tilt in degrees.
    pub tilt: f32,
    /// Vertical field of view in degrees.
    pub field_of_view: f32,
}

/// Player state relevant to the overlay and camera.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScenePlayer {
    /// Camera position.
    pub position: Vec3,
    /// Whether the overlay is drawn in its aiming pose.
    pub aiming: bool,
    /// Whether the overlay is drawn at all.
    pub alive: bool,
    /// Whether the overlay model finished loading.
    pub ready: bool,
}

/// Adversary model placement.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SceneUfo {
    /// Identifier of the adversary.
    pub id: UfoId,
    /// Model origin, which sits below the hitbox centre by the hitbox offset.
    pub model_position: Vec3,
    /// Rotation around the vertical axis in radians.
    pub yaw: f32,
    /// State used for the debug tint.
    pub state: UfoState,
    /// Debug tint of the hitbox.
    pub hint: Color,
    /// Whether the model finished loading.
    pub ready: bool,
}

/// Projectile beam placement.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SceneProjectile {
    /// Identifier of the projectile.
    pub id: ProjectileId,
    /// Bullet or laser.
    pub kind: ProjectileKind,
    /// Centre of the beam.
    pub position: Vec3,
    /// Unit direction the beam is aligned with.
    pub direction: Vec3,
    /// Length of the drawn cylinder.
    pub beam_length: f32,
    /// Beam color.
    pub color: Color,
}

impl SceneProjectile {
    fn beam(kind: ProjectileKind) -> (f32, Color) {
        match kind {
            ProjectileKind::Bullet => (20.0, Color::from_hex(0x444444)),
            ProjectileKind::Laser => (100.0, Color::from_hex(0xff0000)),
        }
    }
}

/// Everything a backend needs to draw one frame.
#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
    /// Camera description.
    pub camera: Camera,
    /// Player overlay state.
    pub player: ScenePlayer,
    /// Adversaries of the session, including ones whose model is still loading.
    pub ufos: Vec<SceneUfo>,
    /// Active projectiles.
    pub projectiles: Vec<SceneProjectile>,
    /// Visual cues emitted during the tick, minus those aimed at unloaded models.
    pub cues: Vec<(VisualTarget, VisualCue)>,
    /// HUD values reported at the end of the tick.
    pub hud: Option<HudReport>,
}

impl Scene {
    /// Captures a scene from the world's snapshots and the tick's events.
    #[must_use]
    pub fn capture(
        camera: Camera,
        player: &PlayerSnapshot,
        ufos: &UfoView,
        projectiles: &ProjectileView,
        hitbox_offset: Vec3,
        events: &[Event],
    ) -> Self {
        let ufos: Vec<SceneUfo> = ufos
            .iter()
            .map(|ufo| SceneUfo {
                id: ufo.id,
                model_position: ufo.position - hitbox_offset,
                yaw: ufo.yaw,
                state: ufo.state,
                hint: state_color(ufo.state),
                ready: ufo.asset.is_ready(),
            })
            .collect();

        let projectiles = projectiles
            .iter()
            .filter(|projectile| projectile.active)
            .map(|projectile| {
                let (beam_length, color) = SceneProjectile::beam(projectile.kind);
                SceneProjectile {
                    id: projectile.id,
                    kind: projectile.kind,
                    position: projectile.position,
                    direction: projectile.direction,
                    beam_length,
                    color,
                }
            })
            .collect();

        let player = ScenePlayer {
            position: player.position,
            aiming: player.aiming,
            alive: player.alive,
            ready: player.overlay.is_ready(),
        };

        let mut cues = Vec::new();
        let mut hud = None;
        for event in events {
            match event {
                Event::Visual { target, cue } => {
                    let ready = match target {
                        VisualTarget::Player => player.ready,
                        VisualTarget::Ufo(id) => ufos.iter().any(|ufo| ufo.id == *id && ufo.ready),
                    };
                    if ready {
                        cues.push((*target, *cue));
                    }
                }
                Event::FrameCompleted { hud: report } => hud = Some(*report),
                _ => {}
            }
        }

        Self {
            camera,
            player,
            ufos,
            projectiles,
            cues,
            hud,
        }
    }

    /// Adversaries whose model is loaded and can be drawn.
    pub fn visible_ufos(&self) -> impl Iterator<Item = &SceneUfo> + '_ {
        self.ufos.iter().filter(|ufo| ufo.ready)
    }
}

/// Collaborator playing sound effects and the ambience track.
pub trait AudioSink {
    /// Plays a one-shot sound effect.
    fn play(&mut self, cue: AudioCue);

    /// Fades the ambience track.
    fn fade(&mut self, fade: AmbienceFade);
}

/// Collaborator displaying HUD telemetry.
pub trait HudSink {
    /// Displays the values reported at the end of a tick.
    fn present(&mut self, hud: &HudReport);
}

/// Forwards the tick's audio and HUD events to their collaborators.
pub fn dispatch(events: &[Event], audio: &mut dyn AudioSink, hud: &mut dyn HudSink) {
    for event in events {
        match event {
            Event::Audio { cue } => audio.play(*cue),
            Event::Ambience { fade } => audio.fade(*fade),
            Event::FrameCompleted { hud: report } => hud.present(report),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use ufo_strike_core::{
        AssetState, MovementMode, ProjectileSnapshot, Stance, UfoSnapshot,
    };

    fn player() -> PlayerSnapshot {
        PlayerSnapshot {
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
            stance: Stance::Standing,
            mode: MovementMode::Walking,
            ticks_since_heal: 0,
            ticks_since_damage: 0,
            damage_overlay: false,
            overlay: AssetState::Ready,
        }
    }

    fn ufo(id: u32, asset: AssetState) -> UfoSnapshot {
        let equilibrium = Vec3::new(1000.0, 360.0, 0.0);
        UfoSnapshot {
            id: UfoId::new(id),
            state: UfoState::Attack,
            resume: UfoState::Hover,
            equilibrium,
            position: equilibrium + Vec3::new(150.0, 0.0, 0.0),
            half_extents: Vec3::new(235.0, 92.5, 235.0),
            health: 100.0,
            target: None,
            ticks_since_last_shot: 0,
            damage_since_reposition: 0.0,
            yaw: 1.0,
            grounded: false,
            asset,
        }
    }

    fn camera() -> Camera {
        Camera {
            yaw: 0.0,
            tilt: 15.0,
            field_of_view: 60.0,
        }
    }

    #[test]
    fn hex_colors_unpack_channels() {
        assert_eq!(Color::from_hex(0xff0000), Color::new(1.0, 0.0, 0.0, 1.0));
        assert_eq!(state_color(UfoState::Dead), Color::new(0.0, 0.0, 1.0, 1.0));
    }

    #[test]
    fn pending_models_are_skipped_but_kept() {
        let ufos = UfoView::from_snapshots(vec![
            ufo(0, AssetState::Pending),
            ufo(1, AssetState::Ready),
        ]);
        let events = [
            Event::Visual {
                target: VisualTarget::Ufo(UfoId::new(0)),
                cue: VisualCue::Flash {
                    duration: Duration::from_millis(100),
                },
            },
            Event::Visual {
                target: VisualTarget::Ufo(UfoId::new(1)),
                cue: VisualCue::Flash {
                    duration: Duration::from_millis(100),
                },
            },
        ];

        let scene = Scene::capture(
            camera(),
            &player(),
            &ufos,
            &ProjectileView::default(),
            Vec3::new(0.0, 160.0, 0.0),
            &events,
        );

        assert_eq!(scene.ufos.len(), 2);
        let visible: Vec<UfoId> = scene.visible_ufos().map(|ufo| ufo.id).collect();
        assert_eq!(visible, vec![UfoId::new(1)]);
        assert_eq!(scene.cues.len(), 1);
        assert_eq!(scene.cues[0].0, VisualTarget::Ufo(UfoId::new(1)));
        assert_eq!(
            scene.ufos[1].model_position,
            Vec3::new(1150.0, 200.0, 0.0)
        );
    }

    #[test]
    fn spent_projectiles_are_not_drawn() {
        let laser = ProjectileSnapshot {
            id: ProjectileId::new(3),
            kind: ProjectileKind::Laser,
            position: Vec3::ZERO,
            direction: Vec3::X,
            speed: 40.0,
            damage: 5.0,
            age: 1.0,
            active: true,
        };
        let spent = ProjectileSnapshot {
            id: ProjectileId::new(4),
            active: false,
            ..laser
        };
        let projectiles = ProjectileView::from_snapshots(vec![laser, spent]);

        let scene = Scene::capture(
            camera(),
            &player(),
            &UfoView::default(),
            &projectiles,
            Vec3::ZERO,
            &[],
        );

        assert_eq!(scene.projectiles.len(), 1);
        assert_eq!(scene.projectiles[0].beam_length, 100.0);
        assert_eq!(scene.projectiles[0].color, Color::from_hex(0xff0000));
    }

    #[test]
    fn field_of_view_narrows_while_aiming_and_stops_at_bounds() {
        let mut fov = FieldOfView::default();
        let tick = Event::TimeAdvanced {
            dt: Duration::from_millis(7),
            scale: 1.0,
        };

        fov.observe(&[Event::AimChanged {
            aiming: true,
            fov_delta: -2.0,
        }]);
        for _ in 0..40 {
            fov.observe(&[tick.clone()]);
        }
        assert_eq!(fov.value(), 30.0);

        fov.observe(&[Event::AimChanged {
            aiming: false,
            fov_delta: 2.0,
        }]);
        for _ in 0..40 {
            fov.observe(&[tick.clone()]);
        }
        assert_eq!(fov.value(), 60.0);
    }

    #[test]
    fn invalid_field_of_view_is_rejected() {
        let error = FieldOfView::new(90.0, 30.0, 60.0).expect_err("outside bounds");

        assert_eq!(
            error,
            RenderingError::InvalidFieldOfView {
                value: 90.0,
                min: 30.0,
                max: 60.0,
            }
        );
        assert!(FieldOfView::new(45.0, 60.0, 30.0).is_err());
        assert!(FieldOfView::new(45.0, 30.0, 60.0).is_ok());
    }

    #[derive(Default)]
    struct Recorder {
        sounds: Vec<AudioCue>,
        fades: Vec<AmbienceFade>,
        reports: Vec<HudReport>,
    }

    impl AudioSink for Recorder {
        fn play(&mut self, cue: AudioCue) {
            self.sounds.push(cue);
        }

        fn fade(&mut self, fade: AmbienceFade) {
            self.fades.push(fade);
        }
    }

    impl HudSink for Recorder {
        fn present(&mut self, hud: &HudReport) {
            self.reports.push(*hud);
        }
    }

    #[test]
    fn dispatch_routes_cues_to_their_sinks() {
        let mut audio = Recorder::default();
        let mut hud = Recorder::default();
        let report = HudReport::new(42.4, 3, Vec3::new(1.4, 2.6, -3.5));

        dispatch(
            &[
                Event::Audio {
                    cue: AudioCue::GunFired,
                },
                Event::Ambience {
                    fade: AmbienceFade::Out,
                },
                Event::FrameCompleted { hud: report },
            ],
            &mut audio,
            &mut hud,
        );

        assert_eq!(audio.sounds, vec![AudioCue::GunFired]);
        assert_eq!(audio.fades, vec![AmbienceFade::Out]);
        assert!(audio.reports.is_empty());
        assert_eq!(hud.reports, vec![report]);
    }
}
