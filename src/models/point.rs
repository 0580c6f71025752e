//! Fused point data model.
//!
//! One `FusedPoint` is produced per accepted fix. It is immutable once built:
//! `best_altitude` is decided at creation time and never recomputed, even if
//! the barometer starts reporting later in the session.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::fix::RawFix;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FusedPoint {
    id: String,
    timestamp: DateTime<Utc>,
    latitude: f64,
    longitude: f64,
    altitude_gps: f64,
    altitude_barometric: Option<f64>,
    horizontal_accuracy: f64,
    vertical_accuracy: f64,
    speed: f64,
}

impl FusedPoint {
    pub fn from_fix(fix: &RawFix, altitude_barometric: Option<f64>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            timestamp: fix.timestamp,
            latitude: fix.latitude,
            longitude: fix.longitude,
            altitude_gps: fix.altitude_gps,
            altitude_barometric,
            horizontal_accuracy: fix.horizontal_accuracy,
            vertical_accuracy: known_or_unknown(fix.vertical_accuracy),
            speed: known_or_unknown(fix.speed),
        }
    }

    /// False if any numeric field is NaN or infinite.
    pub fn is_finite(&self) -> bool {
        [
            self.latitude,
            self.longitude,
            self.altitude_gps,
            self.horizontal_accuracy,
            self.vertical_accuracy,
            self.speed,
        ]
        .iter()
        .chain(self.altitude_barometric.iter())
        .all(|value| value.is_finite())
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    pub fn altitude_gps(&self) -> f64 {
        self.altitude_gps
    }

    pub fn altitude_barometric(&self) -> Option<f64> {
        self.altitude_barometric
    }

    /// Barometric altitude when present, GPS altitude otherwise.
    pub fn best_altitude(&self) -> f64 {
        self.altitude_barometric.unwrap_or(self.altitude_gps)
    }

    pub fn horizontal_accuracy(&self) -> f64 {
        self.horizontal_accuracy
    }

    pub fn vertical_accuracy(&self) -> f64 {
        self.vertical_accuracy
    }

    /// Metres per second; negative when the receiver did not know.
    pub fn speed(&self) -> f64 {
        self.speed
    }

    /// Speed in km/h, with the unknown sentinel mapped to zero.
    pub fn speed_kmh(&self) -> f64 {
        if self.speed >= 0.0 {
            self.speed * 3.6
        } else {
            0.0
        }
    }
}

/// Receivers report unknown optional values as `-1`; NaN and infinity mean
/// the same thing.
fn known_or_unknown(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        -1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fix(altitude: f64) -> RawFix {
        let ts = Utc.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).unwrap();
        RawFix::new(ts, 46.5, 7.9, altitude, 5.0)
    }

    #[test]
    fn best_altitude_prefers_barometric() {
        let point = FusedPoint::from_fix(&fix(100.0), Some(97.25));
        assert_eq!(point.best_altitude(), 97.25);
        assert_eq!(point.altitude_gps(), 100.0);
    }

    #[test]
    fn best_altitude_falls_back_to_gps() {
        let point = FusedPoint::from_fix(&fix(100.0), None);
        assert_eq!(point.best_altitude(), 100.0);
        assert!(point.altitude_barometric().is_none());
    }

    #[test]
    fn unknown_speed_maps_to_zero_kmh() {
        let moving = FusedPoint::from_fix(&fix(0.0).with_speed(2.5), None);
        let unknown = FusedPoint::from_fix(&fix(0.0).with_speed(-1.0), None);
        assert_eq!(moving.speed_kmh(), 9.0);
        assert_eq!(unknown.speed_kmh(), 0.0);
    }

    #[test]
    fn non_finite_optional_values_become_unknown() {
        let fix = fix(10.0)
            .with_vertical_accuracy(f64::NAN)
            .with_speed(f64::INFINITY);
        let point = FusedPoint::from_fix(&fix, None);
        assert_eq!(point.vertical_accuracy(), -1.0);
        assert_eq!(point.speed(), -1.0);
        assert_eq!(point.speed_kmh(), 0.0);
        assert!(point.is_finite());
    }

    #[test]
    fn non_finite_altitude_is_reported() {
        assert!(!FusedPoint::from_fix(&fix(f64::NAN), None).is_finite());
        assert!(!FusedPoint::from_fix(&fix(10.0), Some(f64::INFINITY)).is_finite());
    }

    #[test]
    fn ids_are_unique() {
        let a = FusedPoint::from_fix(&fix(1.0), None);
        let b = FusedPoint::from_fix(&fix(1.0), None);
        assert_ne!(a.id(), b.id());
    }
}
