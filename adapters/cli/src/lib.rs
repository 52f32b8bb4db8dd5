#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Headless driver for UFO Strike sessions.
//!
//! The library wires the world to every system in tick order and provides
//! the settings, logging and scripted input used by the `ufo-strike`
//! binary and the replay tests.

mod arena;
pub mod logging;
mod pilot;
mod settings;
mod simulation;
mod telemetry;

pub use arena::default_arena;
pub use pilot::Pilot;
pub use settings::{Settings, SettingsError};
pub use simulation::Simulation;
pub use telemetry::{LatestHud, LoggedAudio, Telemetry};
