use std::io::Write;

use csv::{Terminator, WriterBuilder};

use crate::{
    error::{Result, TrackError},
    models::FusedPoint,
};

use super::{iso_timestamp, ExportPayload, CSV_HEADER};

/// Four `#` metadata lines, the fixed header, then one row per point.
pub(super) fn encode(payload: &ExportPayload<'_>) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    let name = payload.session_name.replace(['\r', '\n'], " ");
    writeln!(buffer, "# Session: {name}").map_err(encode_err)?;
    writeln!(buffer, "# Exported: {}", iso_timestamp(payload.exported_at)).map_err(encode_err)?;
    writeln!(buffer, "# Points: {}", payload.points.len()).map_err(encode_err)?;
    writeln!(buffer, "#").map_err(encode_err)?;

    let mut writer = WriterBuilder::new()
        .terminator(Terminator::Any(b'\n'))
        .from_writer(buffer);

    writer.write_record(CSV_HEADER)?;
    for point in payload.points {
        writer.write_record(row(point))?;
    }

    writer
        .into_inner()
        .map_err(|err| TrackError::Encode(err.to_string()))
}

fn row(point: &FusedPoint) -> [String; 9] {
    [
        iso_timestamp(point.timestamp()),
        format!("{:.8}", point.latitude()),
        format!("{:.8}", point.longitude()),
        format!("{:.2}", point.altitude_gps()),
        point
            .altitude_barometric()
            .map(|alt| format!("{alt:.2}"))
            .unwrap_or_default(),
        format!("{:.2}", point.best_altitude()),
        format!("{:.1}", point.horizontal_accuracy()),
        format!("{:.1}", point.vertical_accuracy()),
        format!("{:.2}", point.speed_kmh()),
    ]
}

fn encode_err(err: std::io::Error) -> TrackError {
    TrackError::Encode(err.to_string())
}
