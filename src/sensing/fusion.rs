//! GPS/barometer altitude fusion.
//!
//! The barometer only reports altitude *relative to when it was armed*, so an
//! absolute barometric altitude needs a GPS-derived baseline. The baseline is
//! the GPS altitude of the first logged fix of a session and is moved to the
//! last logged best altitude every time the barometer is re-armed.

use crate::models::{BarometricReading, FusedPoint, RawFix};

/// Fuses one fix against an explicit barometric reading and baseline.
///
/// A missing baseline counts as zero. Invalid readings are ignored.
pub fn fuse(
    fix: &RawFix,
    latest_barometric: Option<BarometricReading>,
    baseline_gps_altitude: Option<f64>,
) -> FusedPoint {
    FusedPoint::from_fix(fix, absolute_altitude(latest_barometric, baseline_gps_altitude))
}

fn absolute_altitude(reading: Option<BarometricReading>, baseline: Option<f64>) -> Option<f64> {
    reading
        .filter(|reading| reading.valid)
        .map(|reading| baseline.unwrap_or(0.0) + reading.relative_altitude)
}

/// Session-scoped fusion state.
#[derive(Debug, Clone, Default)]
pub struct AltitudeFuser {
    barometer_available: bool,
    baseline: Option<f64>,
    /// Last valid reading since the barometer was (re)armed.
    latest_reading: Option<BarometricReading>,
}

impl AltitudeFuser {
    pub fn new(barometer_available: bool) -> Self {
        Self {
            barometer_available,
            ..Self::default()
        }
    }

    pub fn barometer_available(&self) -> bool {
        self.barometer_available
    }

    pub fn baseline(&self) -> Option<f64> {
        self.baseline
    }

    /// Absolute barometric altitude that the next fused point would carry.
    pub fn latest_absolute(&self) -> Option<f64> {
        if !self.barometer_available {
            return None;
        }
        absolute_altitude(self.latest_reading, self.baseline)
    }

    /// Drops the baseline and any barometric reading.
    pub fn reset(&mut self) {
        self.baseline = None;
        self.latest_reading = None;
    }

    /// Called whenever the barometer is re-armed. Its relative reference
    /// restarts at zero, so the previous reading is meaningless from here on.
    /// `reference` becomes the new baseline when given.
    pub fn rearm(&mut self, reference: Option<f64>) {
        if let Some(reference) = reference {
            self.baseline = Some(reference);
        }
        self.latest_reading = None;
    }

    /// Records a barometer update. Returns `false` when it was ignored.
    pub fn record_barometric(&mut self, reading: BarometricReading) -> bool {
        if !self.barometer_available || !reading.valid || !reading.relative_altitude.is_finite() {
            return false;
        }
        self.latest_reading = Some(reading);
        true
    }

    /// Sets the baseline from the first logged fix. No-op once a baseline exists.
    pub fn establish_baseline(&mut self, gps_altitude: f64) {
        if self.baseline.is_some() {
            return;
        }
        self.baseline = Some(gps_altitude);
    }

    pub fn fuse(&self, fix: &RawFix) -> FusedPoint {
        FusedPoint::from_fix(fix, self.latest_absolute())
    }
}
