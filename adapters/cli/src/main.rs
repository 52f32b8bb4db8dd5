#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs a scripted headless UFO Strike session.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use ufo_strike_core::{AmbienceFade, AssetRef, Command};
use ufo_strike_rendering::{dispatch, AudioSink};
use ufo_strike_cli::{
    default_arena, logging, LatestHud, LoggedAudio, Pilot, Settings, Simulation, Telemetry,
};

/// Headless UFO Strike session.
#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Number of ticks to simulate.
    #[arg(long)]
    ticks: Option<u32>,
    /// Simulated duration of a frame in milliseconds.
    #[arg(long)]
    frame_ms: Option<u64>,
    /// Seed of every random stream.
    #[arg(long)]
    seed: Option<u64>,
    /// TOML settings file.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Enable verbose logging.
    #[arg(short, long)]
    verbose: bool,
    /// Start in fly mode, out of reach of adversary fire.
    #[arg(long)]
    admin: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    logging::init(args.verbose);

    let mut settings = Settings::load(args.config.as_deref())?;
    if let Some(ticks) = args.ticks {
        settings.ticks = ticks;
    }
    if let Some(frame_ms) = args.frame_ms {
        settings.frame_ms = frame_ms;
    }
    if let Some(seed) = args.seed {
        settings = settings.with_seed(seed);
    }
    settings.admin |= args.admin;
    settings.validate()?;

    let mut simulation = Simulation::new(&settings, &default_arena());
    let mut pilot = Pilot::new(settings.player.mouse_sensitivity);
    let mut audio = LoggedAudio;
    let mut hud = LatestHud::default();
    let mut telemetry = Telemetry::default();

    let _ = simulation.apply(Command::MarkAssetReady {
        asset: AssetRef::PlayerOverlay,
    });
    audio.fade(AmbienceFade::In);

    for _ in 0..settings.ticks {
        let input = pilot.next(&simulation);
        let mut events = simulation.step(settings.frame(), &input);
        events.extend(simulation.resolve_assets(&events));
        dispatch(&events, &mut audio, &mut hud);
        telemetry.record(&events);
    }

    log::info!(
        "session over after {} ticks: {} shots, {} lasers, {} hits, {} spawned, {} downed, player {}",
        telemetry.ticks,
        telemetry.shots,
        telemetry.lasers,
        telemetry.hits,
        telemetry.spawned,
        telemetry.downed,
        if telemetry.player_died { "dead" } else { "alive" },
    );

    if let Some(report) = hud.report() {
        let [x, y, z] = report.coordinates;
        println!(
            "health {}/100  kills {}  position {x}, {y}, {z}",
            report.health_percent, report.kills
        );
    }
    Ok(())
}
