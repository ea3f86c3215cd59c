//! Fresh-snow age tracking.
//!
//! The fresh snow is a logical view over the top of the column: its height
//! and the time since it fell drive snow albedo and roughness decay.

use serde::{Deserialize, Serialize};

use crate::constants::SECONDS_PER_HOUR;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FreshSnow {
    /// Height of the most recent snowfall still at the surface [m].
    pub height: f64,
    /// Seconds since the most recent snowfall.
    pub timestamp: f64,
    /// Age of the snow underneath the most recent snowfall [s].
    pub old_timestamp: f64,
}

impl FreshSnow {
    pub fn new(height: f64, timestamp: f64, old_timestamp: f64) -> Self {
        Self {
            height,
            timestamp,
            old_timestamp,
        }
    }

    /// Record a snowfall of `height` at the end of a step of `dt` seconds.
    /// The snow it buries keeps aging from its previous age.
    pub fn snowfall(&mut self, height: f64, dt: f64) {
        self.old_timestamp = self.timestamp + dt;
        self.height = height;
        self.timestamp = 0.0;
    }

    /// A step without snowfall.
    pub fn age(&mut self, seconds: f64) {
        self.timestamp += seconds;
        self.old_timestamp += seconds;
    }

    /// Fall back to the age of the buried snow once the fresh layer is gone.
    pub fn revert_to_old(&mut self) {
        self.timestamp = self.old_timestamp;
    }

    pub fn hours_since_snowfall(&self) -> f64 {
        self.timestamp / SECONDS_PER_HOUR
    }
}
