//! Session counters and the logging collaborators of the headless binary.

use ufo_strike_core::{AmbienceFade, AudioCue, Event, HudReport, ProjectileKind};
use ufo_strike_rendering::{AudioSink, HudSink};

/// Running totals accumulated from every tick's events.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Telemetry {
    /// Ticks observed.
    pub ticks: u64,
    /// Bullets fired by the player.
    pub shots: u32,
    /// Lasers fired by adversaries.
    pub lasers: u32,
    /// Projectiles that struck their target.
    pub hits: u32,
    /// Adversaries spawned.
    pub spawned: u32,
    /// Adversaries downed by the player.
    pub downed: u32,
    /// Whether the player died during the session.
    pub player_died: bool,
}

impl Telemetry {
    /// Folds one tick's events into the totals.
    pub fn record(&mut self, events: &[Event]) {
        for event in events {
            match event {
                Event::TimeAdvanced { .. } => self.ticks += 1,
                Event::ProjectileFired { kind, .. } => match kind {
                    ProjectileKind::Bullet => self.shots += 1,
                    ProjectileKind::Laser => self.lasers += 1,
                },
                Event::ProjectileHit { .. } => self.hits += 1,
                Event::UfoSpawned { .. } => self.spawned += 1,
                Event::UfoDowned { .. } => self.downed += 1,
                Event::PlayerDied { .. } => self.player_died = true,
                _ => {}
            }
        }
    }
}

/// Audio collaborator that only logs the requested cues.
#[derive(Debug, Default)]
pub struct LoggedAudio;

impl AudioSink for LoggedAudio {
    fn play(&mut self, cue: AudioCue) {
        log::debug!("play {}", cue.asset());
    }

    fn fade(&mut self, fade: AmbienceFade) {
        log::info!("ambience fade {fade:?}");
    }
}

/// HUD collaborator that keeps the most recent report.
#[derive(Debug, Default)]
pub struct LatestHud {
    report: Option<HudReport>,
}

impl LatestHud {
    /// Last report presented, if any tick completed.
    #[must_use]
    pub fn report(&self) -> Option<HudReport> {
        self.report
    }
}

impl HudSink for LatestHud {
    fn present(&mut self, hud: &HudReport) {
        self.report = Some(*hud);
    }
}
