//! Frame-rate independent scaling of per-tick deltas.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Reference rate the original gameplay constants were tuned against.
pub const DEFAULT_REFERENCE_RATE: f32 = 1000.0 / 7.0;

/// Converts measured frame durations into dimensionless tick factors.
///
/// A frame lasting exactly `1 / reference_rate` seconds yields a factor of
/// one, so constants expressed "per tick" keep their tuned meaning at any
/// frame rate.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TimeScale {
    reference_rate: f32,
}

impl TimeScale {
    /// Creates a time scale anchored at the provided reference rate.
    ///
    /// Non-positive or non-finite rates fall back to
    /// [`DEFAULT_REFERENCE_RATE`].
    #[must_use]
    pub fn new(reference_rate: f32) -> Self {
        let reference_rate = if reference_rate.is_finite() && reference_rate > 0.0 {
            reference_rate
        } else {
            DEFAULT_REFERENCE_RATE
        };
        Self { reference_rate }
    }

    /// Reference rate the time scale was built with.
    #[must_use]
    pub const fn reference_rate(&self) -> f32 {
        self.reference_rate
    }

    /// Scales the measured frame delta into a tick factor.
    #[must_use]
    pub fn factor(&self, dt: Duration) -> f32 {
        dt.as_secs_f32() * self.reference_rate
    }

    /// Frame delta that produces a factor of exactly one.
    #[must_use]
    pub fn unit_frame(&self) -> Duration {
        Duration::from_secs_f32(1.0 / self.reference_rate)
    }
}

impl Default for TimeScale {
    fn default() -> Self {
        Self::new(DEFAULT_REFERENCE_RATE)
    }
}
