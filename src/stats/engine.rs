//! Session statistics.
//!
//! Everything here is a pure function of a point-log snapshot and is
//! recomputed from scratch on every query, so there is no incremental state
//! that could drift from the log.

use serde::{Deserialize, Serialize};

use crate::models::FusedPoint;

use super::distance::haversine_m;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStats {
    pub total_points: usize,
    pub elevation_gain: f64,
    pub elevation_loss: f64,
    pub min_altitude: Option<f64>,
    pub max_altitude: Option<f64>,
    pub duration_seconds: f64,
    pub distance_meters: f64,
    pub average_speed_kmh: f64,
}

pub fn compute(points: &[FusedPoint]) -> SessionStats {
    let mut stats = SessionStats {
        total_points: points.len(),
        ..SessionStats::default()
    };

    for pair in points.windows(2) {
        let (prev, next) = (&pair[0], &pair[1]);
        let delta = next.best_altitude() - prev.best_altitude();
        if delta > 0.0 {
            stats.elevation_gain += delta;
        } else if delta < 0.0 {
            stats.elevation_loss -= delta;
        }
        stats.distance_meters += haversine_m(
            prev.latitude(),
            prev.longitude(),
            next.latitude(),
            next.longitude(),
        );
    }

    for altitude in points.iter().map(FusedPoint::best_altitude) {
        stats.min_altitude = Some(stats.min_altitude.map_or(altitude, |min| min.min(altitude)));
        stats.max_altitude = Some(stats.max_altitude.map_or(altitude, |max| max.max(altitude)));
    }

    if let (Some(first), Some(last)) = (points.first(), points.last()) {
        if points.len() >= 2 {
            let elapsed = last.timestamp() - first.timestamp();
            stats.duration_seconds = elapsed
                .num_microseconds()
                .map(|us| us as f64 / 1_000_000.0)
                .unwrap_or_else(|| elapsed.num_milliseconds() as f64 / 1_000.0);
        }
    }

    if stats.duration_seconds > 0.0 {
        stats.average_speed_kmh = stats.distance_meters / stats.duration_seconds * 3.6;
    }

    stats
}
