//! Raw sensor inputs.
//!
//! Both types are ephemeral: a `RawFix` is dropped once filtered and fused,
//! and only the most recent `BarometricReading` is retained by the fuser.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single position reading from the satellite receiver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawFix {
    pub timestamp: DateTime<Utc>,
    pub latitude: f64,
    pub longitude: f64,
    pub altitude_gps: f64,
    /// Metres; negative means the receiver has no fix.
    pub horizontal_accuracy: f64,
    pub vertical_accuracy: f64,
    /// Metres per second; negative means unknown.
    pub speed: f64,
    #[serde(default = "default_true")]
    pub horizontal_accuracy_valid: bool,
}

fn default_true() -> bool {
    true
}

impl RawFix {
    pub fn new(
        timestamp: DateTime<Utc>,
        latitude: f64,
        longitude: f64,
        altitude_gps: f64,
        horizontal_accuracy: f64,
    ) -> Self {
        Self {
            timestamp,
            latitude,
            longitude,
            altitude_gps,
            horizontal_accuracy,
            vertical_accuracy: -1.0,
            speed: -1.0,
            horizontal_accuracy_valid: true,
        }
    }

    pub fn with_vertical_accuracy(mut self, vertical_accuracy: f64) -> Self {
        self.vertical_accuracy = vertical_accuracy;
        self
    }

    pub fn with_speed(mut self, speed: f64) -> Self {
        self.speed = speed;
        self
    }
}

/// Altitude change reported by the barometer since it was last armed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BarometricReading {
    pub relative_altitude: f64,
    #[serde(default = "default_true")]
    pub valid: bool,
}

impl BarometricReading {
    pub fn new(relative_altitude: f64) -> Self {
        Self {
            relative_altitude,
            valid: true,
        }
    }

    pub fn invalid() -> Self {
        Self {
            relative_altitude: 0.0,
            valid: false,
        }
    }
}
