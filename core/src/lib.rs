#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the UFO Strike simulation.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters and systems submit
//! [`Command`] values describing desired mutations, the world executes those
//! commands via its `apply` entry point, and then broadcasts [`Event`] values
//! for systems and presentation layers to react to. Systems consume event
//! streams, query immutable snapshots, and respond exclusively with new
//! command batches.
//!
//! The spatial primitives every collision and visibility query is built on
//! ([`Volume`], [`Hitbox`], [`line_of_sight`]) live here as well so that the
//! player and the adversaries share one collision engine.

mod collision;
mod input;
mod time;
mod volume;

use std::time::Duration;

pub use collision::{line_of_sight, overlaps_any, ray_box_distance, Hitbox};
pub use glam::Vec3;
pub use input::{InputState, Key};
use serde::{Deserialize, Serialize};
pub use time::{TimeScale, DEFAULT_REFERENCE_RATE};
pub use volume::{Volume, VolumeId};

/// Upper bound of every health pool.
pub const MAX_HEALTH: f32 = 100.0;

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Appends a volume to the static geometry collection.
    AddVolume {
        /// Volume supplied by the static geometry provider.
        volume: Volume,
    },
    /// Removes every static volume tagged with the identifier.
    RemoveVolume {
        /// Identifier attached to the volume when it was added.
        id: VolumeId,
    },
    /// Selects the player's movement strategy.
    SetMovementMode {
        /// Strategy the movement resolver should apply from now on.
        mode: MovementMode,
    },
    /// Advances the simulation clock by the provided frame delta.
    Tick {
        /// Measured duration of the frame that just elapsed.
        dt: Duration,
    },
    /// Closes the current tick and publishes HUD telemetry.
    EndTick,
    /// Commits the player position produced by the movement resolver.
    MovePlayer {
        /// Resolved centre of the player's hitbox.
        position: Vec3,
        /// Vertical velocity carried into the next tick.
        vertical_velocity: f32,
    },
    /// Switches the player between standing and crouching.
    SetPlayerStance {
        /// Requested stance.
        stance: Stance,
    },
    /// Enters or leaves aim mode.
    SetAiming {
        /// Whether the aim input is held.
        aiming: bool,
    },
    /// Restores player health, clamped to [`MAX_HEALTH`].
    HealPlayer {
        /// Amount of health to restore.
        amount: f32,
    },
    /// Fades out the damage overlay after the player stayed unharmed.
    ClearDamageOverlay,
    /// Fires the player's weapon if its cooldown elapsed.
    FirePlayerWeapon {
        /// Unit direction of travel for the bullet.
        direction: Vec3,
    },
    /// Counts one firing attempt of an adversary's weapon.
    ChargeUfoWeapon {
        /// Adversary that attempted to fire.
        ufo: UfoId,
    },
    /// Fires a laser from an adversary toward the player.
    FireLaser {
        /// Adversary firing the laser.
        ufo: UfoId,
        /// Unit direction of travel for the laser.
        direction: Vec3,
    },
    /// Commits a projectile's straight-line advance.
    MoveProjectile {
        /// Projectile that moved.
        projectile: ProjectileId,
        /// Position reached during this tick.
        position: Vec3,
        /// Scaled time factor the projectile travelled for.
        elapsed: f32,
    },
    /// Applies a projectile hit to its target.
    ResolveHit {
        /// Projectile that struck a target.
        projectile: ProjectileId,
        /// Entity that was struck.
        target: HitTarget,
    },
    /// Retires a projectile that outlived its lifetime cap.
    ExpireProjectile {
        /// Projectile to deactivate.
        projectile: ProjectileId,
    },
    /// Creates a new adversary.
    SpawnUfo {
        /// Centre of the adversary's model before the hitbox offset is applied.
        position: Vec3,
        /// Cosmetic bobbing profile chosen for the adversary.
        bob: BobProfile,
    },
    /// Reports that an asset collaborator finished loading a model.
    MarkAssetReady {
        /// Entity whose model became available.
        asset: AssetRef,
    },
    /// Moves an adversary's state machine into a new state.
    TransitionUfo {
        /// Adversary to update.
        ufo: UfoId,
        /// State to enter.
        state: UfoState,
        /// State to resume once a move completes.
        resume: UfoState,
    },
    /// Assigns a movement target to an adversary.
    RetargetUfo {
        /// Adversary to update.
        ufo: UfoId,
        /// Point the adversary should move toward.
        target: Vec3,
        /// Why the target was selected.
        reason: RetargetReason,
    },
    /// Moves an adversary's equilibrium anchor.
    MoveUfo {
        /// Adversary to move.
        ufo: UfoId,
        /// New equilibrium point.
        equilibrium: Vec3,
    },
    /// Rotates an adversary around the vertical axis.
    OrientUfo {
        /// Adversary to rotate.
        ufo: UfoId,
        /// Yaw in radians.
        yaw: f32,
    },
    /// Lowers a downed adversary toward the ground.
    DescendUfo {
        /// Downed adversary.
        ufo: UfoId,
        /// Altitude reached during this tick.
        altitude: f32,
    },
    /// Marks a downed adversary as landed and credits the kill.
    GroundUfo {
        /// Downed adversary that finished its descent.
        ufo: UfoId,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Measured duration of the frame.
        dt: Duration,
        /// Frame delta converted into a tick factor.
        scale: f32,
    },
    /// Reports that the static geometry collection changed.
    GeometryChanged {
        /// Number of volumes in the collection after the change.
        volumes: usize,
    },
    /// Announces the player's movement strategy.
    MovementModeChanged {
        /// Strategy that became active.
        mode: MovementMode,
    },
    /// Confirms that the player moved.
    PlayerMoved {
        /// Position before the move.
        from: Vec3,
        /// Position after the move.
        to: Vec3,
    },
    /// Confirms a stance change.
    StanceChanged {
        /// Stance that became active.
        stance: Stance,
    },
    /// Announces aim mode changes together with the requested camera zoom.
    AimChanged {
        /// Whether aim mode is active.
        aiming: bool,
        /// Field-of-view change rate requested from the camera collaborator.
        fov_delta: f32,
    },
    /// Confirms that the player regenerated health.
    PlayerHealed {
        /// Health after regeneration.
        health: f32,
    },
    /// Reports damage taken by the player.
    PlayerDamaged {
        /// Damage applied.
        amount: f32,
        /// Health after the damage, never negative.
        health: f32,
    },
    /// Announces the player's death.
    PlayerDied {
        /// Adversaries downed during the session.
        kills: u32,
    },
    /// Confirms that a projectile was created.
    ProjectileFired {
        /// Identifier of the new projectile.
        projectile: ProjectileId,
        /// Variant of the projectile.
        kind: ProjectileKind,
        /// Launch point.
        origin: Vec3,
        /// Unit direction of travel.
        direction: Vec3,
    },
    /// Reports that a projectile struck a target.
    ProjectileHit {
        /// Projectile that hit.
        projectile: ProjectileId,
        /// Entity that was struck.
        target: HitTarget,
        /// Damage delivered.
        damage: f32,
    },
    /// Reports that a projectile reached its lifetime cap.
    ProjectileExpired {
        /// Projectile that expired.
        projectile: ProjectileId,
    },
    /// Reports that an inactive projectile left the population.
    ProjectileRemoved {
        /// Projectile that was removed.
        projectile: ProjectileId,
    },
    /// Confirms that an adversary was created.
    UfoSpawned {
        /// Identifier of the new adversary.
        ufo: UfoId,
        /// Equilibrium point of the new adversary.
        equilibrium: Vec3,
    },
    /// Reports an adversary state machine transition.
    UfoStateChanged {
        /// Adversary that changed state.
        ufo: UfoId,
        /// State before the transition.
        from: UfoState,
        /// State after the transition.
        to: UfoState,
    },
    /// Reports damage taken by an adversary that survived it.
    UfoDamaged {
        /// Adversary that was hit.
        ufo: UfoId,
        /// Damage applied.
        amount: f32,
        /// Direction the projectile was travelling in.
        direction: Vec3,
        /// State the adversary was in when hit.
        state: UfoState,
        /// Damage accumulated since the adversary last repositioned.
        damage_since_reposition: f32,
    },
    /// Announces that an adversary lost all health and entered `Dead`.
    UfoDowned {
        /// Adversary that was downed.
        ufo: UfoId,
    },
    /// Announces that a downed adversary landed and was credited as a kill.
    UfoGrounded {
        /// Adversary that landed.
        ufo: UfoId,
        /// Kill counter after crediting the adversary.
        kills: u32,
    },
    /// Reports that a landed adversary left the population.
    UfoRemoved {
        /// Adversary that was removed.
        ufo: UfoId,
    },
    /// Confirms that a model finished loading.
    AssetReady {
        /// Entity whose model is now available.
        asset: AssetRef,
    },
    /// Fire-and-forget cue for the audio collaborator.
    Audio {
        /// Sound to play.
        cue: AudioCue,
    },
    /// Ambience fade request for the audio collaborator.
    Ambience {
        /// Fade direction.
        fade: AmbienceFade,
    },
    /// Discrete visual-state request for the rendering collaborator.
    Visual {
        /// Entity the cue applies to.
        target: VisualTarget,
        /// Visual effect to apply.
        cue: VisualCue,
    },
    /// Single per-tick telemetry report for the HUD sink.
    FrameCompleted {
        /// Clamped HUD values.
        hud: HudReport,
    },
}

/// Unique identifier assigned to an adversary.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UfoId(u32);

impl UfoId {
    /// Creates a new adversary identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a projectile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProjectileId(u32);

impl ProjectileId {
    /// Creates a new projectile identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// States of the adversary behaviour controller.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UfoState {
    /// Idle bobbing around the equilibrium point.
    Hover,
    /// Facing and shooting at the player.
    Attack,
    /// Travelling toward a target point.
    Moving,
    /// Downed and descending. Terminal.
    Dead,
}

impl UfoState {
    /// Reports whether the state is the terminal `Dead` state.
    #[must_use]
    pub const fn is_dead(self) -> bool {
        matches!(self, Self::Dead)
    }
}

/// Sides that exchange fire.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Faction {
    /// The player character.
    Player,
    /// The adversary population.
    Adversary,
}

/// Variants of projectiles sharing one physics and hit-testing path.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProjectileKind {
    /// Player-fired round that damages adversaries.
    Bullet,
    /// Adversary-fired beam that damages the player.
    Laser,
}

impl ProjectileKind {
    /// Side that fires this projectile.
    #[must_use]
    pub const fn owner(self) -> Faction {
        match self {
            Self::Bullet => Faction::Player,
            Self::Laser => Faction::Adversary,
        }
    }

    /// Side this projectile can damage.
    #[must_use]
    pub const fn targets(self) -> Faction {
        match self {
            Self::Bullet => Faction::Adversary,
            Self::Laser => Faction::Player,
        }
    }
}

/// Movement strategies selectable for the player.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MovementMode {
    /// Gravity, jumping and crouching apply.
    #[default]
    Walking,
    /// Debug fly mode: no gravity, vertical fly controls, ignored by adversary fire.
    Flying,
}

/// Player posture affecting the collision height.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Stance {
    /// Full collision height.
    #[default]
    Standing,
    /// Collision height halved.
    Crouching,
}

/// Loading state of an entity's model.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum AssetState {
    /// The asset collaborator has not delivered the model yet.
    #[default]
    Pending,
    /// The model is available for rendering.
    Ready,
}

impl AssetState {
    /// Reports whether the model is available.
    #[must_use]
    pub const fn is_ready(self) -> bool {
        matches!(self, Self::Ready)
    }
}

/// Entity whose model is loaded by the asset collaborator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AssetRef {
    /// First-person weapon overlay.
    PlayerOverlay,
    /// Adversary model.
    Ufo(UfoId),
}

/// Entity struck by a projectile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HitTarget {
    /// The player character.
    Player,
    /// An adversary.
    Ufo(UfoId),
}

/// Entity a visual cue applies to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum VisualTarget {
    /// The player's overlay and screen effects.
    Player,
    /// An adversary model.
    Ufo(UfoId),
}

/// Sounds requested from the audio collaborator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AudioCue {
    /// The player's weapon fired.
    GunFired,
    /// An adversary fired a laser.
    LaserFired,
    /// An adversary powered down.
    UfoPoweredDown,
}

impl AudioCue {
    /// Asset identifier of the sound.
    #[must_use]
    pub const fn asset(self) -> &'static str {
        match self {
            Self::GunFired => "assets/gun-sfx.mp3",
            Self::LaserFired => "assets/laser.mp3",
            Self::UfoPoweredDown => "assets/power-down.mp3",
        }
    }
}

/// Ambience fade direction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AmbienceFade {
    /// Fade the ambience track in.
    In,
    /// Fade the ambience track out.
    Out,
}

/// Discrete visual-state selectors consumed by the rendering collaborator.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum VisualCue {
    /// Play the weapon overlay's shooting animation.
    ShootAnimation,
    /// Tint the model red for the given duration.
    Flash {
        /// How long the tint lasts.
        duration: Duration,
    },
    /// Show the damage overlay with the given opacity.
    DamageOverlay {
        /// Overlay opacity in `0.0..=0.25`.
        alpha: f32,
    },
    /// Hide the damage overlay.
    DamageOverlayCleared,
    /// Switch the screen to the death effect.
    DeathOverlay,
}

/// Why an adversary selected a movement target.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RetargetReason {
    /// Correcting the standoff distance to the player.
    Engage,
    /// Full random repositioning after accumulating damage.
    Evade,
    /// Short knockback-style dodge away from an incoming projectile.
    Dodge,
}

/// Cosmetic bobbing oscillation applied on top of an adversary's equilibrium.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BobProfile {
    /// Horizontal amplitude in world units; the vertical amplitude is half of it.
    pub amplitude: f32,
    /// Angular speed multiplier.
    pub frequency: f32,
}

impl BobProfile {
    /// Creates a bobbing profile.
    #[must_use]
    pub const fn new(amplitude: f32, frequency: f32) -> Self {
        Self {
            amplitude,
            frequency,
        }
    }

    /// Offset from the equilibrium point after `age` scaled ticks.
    #[must_use]
    pub fn offset(&self, age: f32) -> Vec3 {
        let phase = age * self.frequency / 200.0;
        Vec3::new(
            self.amplitude * phase.cos(),
            self.amplitude * (2.0 * phase).sin() / 2.0,
            0.0,
        )
    }
}

/// Movement intent produced by the player controller for the movement resolver.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PlayerIntent {
    /// Sum of the pressed planar direction vectors. Only its direction is used.
    pub planar: Vec3,
    /// Vertical fly input used in [`MovementMode::Flying`].
    pub vertical: f32,
    /// Whether the jump input is held.
    pub jump: bool,
}

/// Immutable representation of the player's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlayerSnapshot {
    /// Centre of the player's hitbox.
    pub position: Vec3,
    /// Current hitbox half-extents, reflecting stance and death.
    pub half_extents: Vec3,
    /// Vertical velocity carried between ticks.
    pub vertical_velocity: f32,
    /// Downward acceleration added to the vertical velocity every tick.
    pub gravity: f32,
    /// Horizontal speed in units per tick.
    pub speed: f32,
    /// Health in `0.0..=100.0`.
    pub health: f32,
    /// Remaining weapon cooldown.
    pub cooldown: f32,
    /// Damage carried by the next bullet.
    pub damage: f32,
    /// Whether the player is still alive.
    pub alive: bool,
    /// Whether aim mode is active.
    pub aiming: bool,
    /// Current stance.
    pub stance: Stance,
    /// Active movement strategy.
    pub mode: MovementMode,
    /// Ticks since health last regenerated or the player was hurt.
    pub ticks_since_heal: u32,
    /// Ticks since the player was last hurt.
    pub ticks_since_damage: u32,
    /// Whether the damage overlay is currently shown.
    pub damage_overlay: bool,
    /// Loading state of the weapon overlay model.
    pub overlay: AssetState,
}

impl PlayerSnapshot {
    /// Hitbox of the player in its current stance.
    #[must_use]
    pub const fn hitbox(&self) -> Hitbox {
        Hitbox::new(self.half_extents)
    }

    /// Reports whether the player can fire right now.
    #[must_use]
    pub fn weapon_ready(&self) -> bool {
        self.alive && self.cooldown <= 0.0
    }
}

/// Immutable representation of a single adversary used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct UfoSnapshot {
    /// Unique identifier assigned to the adversary.
    pub id: UfoId,
    /// Current state machine state.
    pub state: UfoState,
    /// State resumed after a move completes.
    pub resume: UfoState,
    /// Logical anchor point, free of the bobbing offset.
    pub equilibrium: Vec3,
    /// Hitbox centre including the bobbing offset.
    pub position: Vec3,
    /// Hitbox half-extents.
    pub half_extents: Vec3,
    /// Health in `0.0..=100.0`.
    pub health: f32,
    /// Current movement target, if any.
    pub target: Option<Vec3>,
    /// Firing attempts since the adversary last fired.
    pub ticks_since_last_shot: u32,
    /// Damage accumulated since the adversary last repositioned.
    pub damage_since_reposition: f32,
    /// Yaw in radians.
    pub yaw: f32,
    /// Whether the downed adversary landed and awaits removal.
    pub grounded: bool,
    /// Loading state of the model.
    pub asset: AssetState,
}

impl UfoSnapshot {
    /// Hitbox of the adversary.
    #[must_use]
    pub const fn hitbox(&self) -> Hitbox {
        Hitbox::new(self.half_extents)
    }
}

/// Read-only snapshot describing all adversaries.
#[derive(Clone, Debug, Default)]
pub struct UfoView {
    snapshots: Vec<UfoSnapshot>,
}

impl UfoView {
    /// Creates a new adversary view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<UfoSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &UfoSnapshot> {
        self.snapshots.iter()
    }

    /// Looks up the snapshot of a single adversary.
    #[must_use]
    pub fn get(&self, id: UfoId) -> Option<&UfoSnapshot> {
        self.snapshots
            .binary_search_by_key(&id, |snapshot| snapshot.id)
            .ok()
            .map(|index| &self.snapshots[index])
    }

    /// Number of adversaries that are not yet downed.
    #[must_use]
    pub fn live_count(&self) -> usize {
        self.snapshots
            .iter()
            .filter(|snapshot| !snapshot.state.is_dead())
            .count()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<UfoSnapshot> {
        self.snapshots
    }
}

/// Immutable representation of a single projectile used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProjectileSnapshot {
    /// Unique identifier assigned to the projectile.
    pub id: ProjectileId,
    /// Variant of the projectile.
    pub kind: ProjectileKind,
    /// Current position.
    pub position: Vec3,
    /// Unit direction of travel.
    pub direction: Vec3,
    /// Distance travelled per unit of scaled time.
    pub speed: f32,
    /// Damage delivered on hit.
    pub damage: f32,
    /// Scaled time the projectile has been in flight.
    pub age: f32,
    /// Whether the projectile can still hit something.
    pub active: bool,
}

/// Read-only snapshot describing all projectiles.
#[derive(Clone, Debug, Default)]
pub struct ProjectileView {
    snapshots: Vec<ProjectileSnapshot>,
}

impl ProjectileView {
    /// Creates a new projectile view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<ProjectileSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &ProjectileSnapshot> {
        self.snapshots.iter()
    }

    /// Iterator over active projectiles of the given kind.
    pub fn active_of(&self, kind: ProjectileKind) -> impl Iterator<Item = &ProjectileSnapshot> {
        self.snapshots
            .iter()
            .filter(move |snapshot| snapshot.active && snapshot.kind == kind)
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<ProjectileSnapshot> {
        self.snapshots
    }
}

/// Scalar values displayed by the HUD.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct HudReport {
    /// Player health percentage, clamped to `0..=100`.
    pub health_percent: u8,
    /// Adversaries downed and landed during the session.
    pub kills: u32,
    /// Player coordinates rounded to whole units.
    pub coordinates: [i32; 3],
}

impl HudReport {
    /// Builds a report from raw values, clamping health into the display range.
    #[must_use]
    pub fn new(health: f32, kills: u32, position: Vec3) -> Self {
        let health = if health.is_finite() { health } else { 0.0 };
        let health_percent = health.round().clamp(0.0, MAX_HEALTH) as u8;
        Self {
            health_percent,
            kills,
            coordinates: [
                round_coordinate(position.x),
                round_coordinate(position.y),
                round_coordinate(position.z),
            ],
        }
    }
}

fn round_coordinate(value: f32) -> i32 {
    if value.is_finite() {
        value.round() as i32
    } else {
        0
    }
}
