use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    error::{Result, TrackError},
    models::FusedPoint,
};

use super::{iso_timestamp, ExportPayload};

/// JSON export document. Serialized through `serde_json::Value`, whose map
/// keeps keys sorted, so output key order never depends on field order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportDocument {
    pub session: String,
    pub exported_at: String,
    pub point_count: usize,
    pub points: Vec<ExportPoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportPoint {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub latitude: f64,
    pub longitude: f64,
    pub altitude_gps: f64,
    pub altitude_barometric: Option<f64>,
    pub best_altitude: f64,
    pub horizontal_accuracy: f64,
    pub vertical_accuracy: f64,
    pub speed_kmh: f64,
}

impl From<&FusedPoint> for ExportPoint {
    fn from(point: &FusedPoint) -> Self {
        Self {
            id: point.id().to_string(),
            timestamp: point.timestamp(),
            latitude: point.latitude(),
            longitude: point.longitude(),
            altitude_gps: point.altitude_gps(),
            altitude_barometric: point.altitude_barometric(),
            best_altitude: point.best_altitude(),
            horizontal_accuracy: point.horizontal_accuracy(),
            vertical_accuracy: point.vertical_accuracy(),
            speed_kmh: point.speed_kmh(),
        }
    }
}

impl From<&ExportPayload<'_>> for ExportDocument {
    fn from(payload: &ExportPayload<'_>) -> Self {
        Self {
            session: payload.session_name.clone(),
            exported_at: iso_timestamp(payload.exported_at),
            point_count: payload.points.len(),
            points: payload.points.iter().map(ExportPoint::from).collect(),
        }
    }
}

/// JSON has no NaN or infinity, so a point carrying one is refused rather
/// than written as `null` into a numeric field.
pub(super) fn encode(payload: &ExportPayload<'_>) -> Result<Vec<u8>> {
    if let Some(point) = payload.points.iter().find(|point| !point.is_finite()) {
        return Err(TrackError::Encode(format!(
            "point {} has a non-finite value",
            point.id()
        )));
    }
    let value = serde_json::to_value(ExportDocument::from(payload))?;
    let mut bytes = serde_json::to_vec_pretty(&value)?;
    bytes.push(b'\n');
    Ok(bytes)
}

pub fn decode_json(bytes: &[u8]) -> Result<ExportDocument> {
    Ok(serde_json::from_slice(bytes)?)
}
