//! Session export.
//!
//! Both encodings are byte-stable: the same points, name and export time
//! always produce the same bytes.

mod document;
mod tabular;
mod writer;

use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::{error::Result, models::FusedPoint};

pub use document::{decode_json, ExportDocument, ExportPoint};
pub use writer::{file_name, write_export};

pub const CSV_HEADER: [&str; 9] = [
    "timestamp",
    "latitude",
    "longitude",
    "altitude_gps_m",
    "altitude_barometric_m",
    "best_altitude_m",
    "horizontal_accuracy_m",
    "vertical_accuracy_m",
    "speed_kmh",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Csv,
    Json,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// A log snapshot plus the metadata written alongside it.
#[derive(Debug, Clone)]
pub struct ExportPayload<'a> {
    pub session_name: String,
    pub exported_at: DateTime<Utc>,
    pub points: &'a [FusedPoint],
}

impl<'a> ExportPayload<'a> {
    pub fn new(
        points: &'a [FusedPoint],
        session_name: Option<&str>,
        exported_at: DateTime<Utc>,
    ) -> Self {
        let session_name = session_name
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_owned)
            .unwrap_or_else(|| default_session_name(exported_at));

        Self {
            session_name,
            exported_at,
            points,
        }
    }
}

pub fn default_session_name(at: DateTime<Utc>) -> String {
    format!("Session {}", at.format("%Y-%m-%d %H:%M"))
}

/// UTC ISO-8601 with millisecond precision, e.g. `2024-05-01T07:00:00.000Z`.
pub fn iso_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub fn export(
    points: &[FusedPoint],
    format: ExportFormat,
    session_name: Option<&str>,
    exported_at: DateTime<Utc>,
) -> Result<Vec<u8>> {
    let payload = ExportPayload::new(points, session_name, exported_at);
    match format {
        ExportFormat::Csv => tabular::encode(&payload),
        ExportFormat::Json => document::encode(&payload),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RawFix;
    use chrono::TimeZone;

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 8, 3, 16, 45, 9).unwrap()
    }

    #[test]
    fn blank_name_gets_default() {
        let payload = ExportPayload::new(&[], Some("   "), at());
        assert_eq!(payload.session_name, "Session 2024-08-03 16:45");
        let payload = ExportPayload::new(&[], None, at());
        assert_eq!(payload.session_name, "Session 2024-08-03 16:45");
        let payload = ExportPayload::new(&[], Some(" Eiger "), at());
        assert_eq!(payload.session_name, "Eiger");
    }

    #[test]
    fn identical_input_gives_identical_bytes() {
        let points: Vec<FusedPoint> = (0..4)
            .map(|i| {
                FusedPoint::from_fix(
                    &RawFix::new(at(), 46.0 + i as f64 * 1e-5, 7.0, 1000.0 + i as f64, 3.0),
                    Some(999.5 + i as f64),
                )
            })
            .collect();

        for format in [ExportFormat::Csv, ExportFormat::Json] {
            let a = export(&points, format, Some("Loop"), at()).unwrap();
            let b = export(&points, format, Some("Loop"), at()).unwrap();
            assert_eq!(a, b, "{format}");
        }
    }

    #[test]
    fn iso_timestamp_is_utc_millis() {
        assert_eq!(iso_timestamp(at()), "2024-08-03T16:45:09.000Z");
    }
}
