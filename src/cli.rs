//! `altitrack` replay command.
//!
//! Replays a JSON-lines file of recorded lifecycle calls and sensor samples
//! through a session, prints the resulting stats and writes an export.

use std::{fs, path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use clap::Parser;
use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::{
    export::ExportFormat,
    models::{BarometricReading, RawFix},
    sensing::PassiveSensorHub,
    session::{FixOutcome, SessionController, SessionState},
    settings::{MinimumDistance, SettingsStore},
    stats::SessionStats,
};

#[derive(Parser, Debug, Clone)]
#[command(name = "altitrack")]
#[command(about = "Replay recorded GPS/barometer samples and export the fused session")]
#[command(version)]
pub struct Args {
    /// JSON-lines file of events, one per line
    #[arg(value_name = "EVENTS")]
    pub events: PathBuf,

    /// Export file format
    #[arg(short, long, value_enum, default_value = "csv")]
    pub format: ExportFormat,

    /// Session name written into the export
    #[arg(short, long)]
    pub name: Option<String>,

    /// Directory the export is written to
    #[arg(short, long, default_value = "exports")]
    pub out: PathBuf,

    /// Settings file holding the minimum-distance preference
    #[arg(long)]
    pub settings: Option<PathBuf>,

    /// Minimum distance in metres (1, 3, 5, 10, 20 or 50); saved when --settings is given
    #[arg(long)]
    pub min_distance: Option<u32>,

    /// Behave as if the device had no barometric altimeter
    #[arg(long)]
    pub no_barometer: bool,
}

/// One line of a replay file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ReplayLine {
    Start,
    Pause,
    Resume,
    Stop,
    Clear,
    Position(RawFix),
    Barometric(BarometricReading),
    Failure { message: String },
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplaySummary {
    pub lines: usize,
    pub rejected_fixes: usize,
    pub rejected_transitions: usize,
    pub stats: SessionStats,
    pub export_path: PathBuf,
}

pub async fn replay(args: Args) -> Result<ReplaySummary> {
    let minimum_distance = resolve_minimum_distance(&args)?;
    let hub = Arc::new(PassiveSensorHub::new(!args.no_barometer));
    let session = SessionController::new(hub, minimum_distance);

    let contents = fs::read_to_string(&args.events)
        .with_context(|| format!("Failed to read events from {}", args.events.display()))?;

    let mut summary_lines = 0;
    let mut rejected_fixes = 0;
    let mut rejected_transitions = 0;

    for (index, raw) in contents.lines().enumerate() {
        let raw = raw.trim();
        if raw.is_empty() || raw.starts_with('#') {
            continue;
        }
        let line: ReplayLine = serde_json::from_str(raw)
            .with_context(|| format!("{}:{}: invalid event", args.events.display(), index + 1))?;
        summary_lines += 1;

        let result = match line {
            ReplayLine::Start => session.start().map(drop),
            ReplayLine::Pause => session.pause().map(drop),
            ReplayLine::Resume => session.resume().map(drop),
            ReplayLine::Stop => session.stop().map(drop),
            ReplayLine::Clear => session.clear().map(drop),
            ReplayLine::Position(fix) => {
                if session.on_position_update(&fix) == FixOutcome::Rejected {
                    rejected_fixes += 1;
                }
                Ok(())
            }
            ReplayLine::Barometric(reading) => {
                session.on_barometric_update(reading);
                Ok(())
            }
            ReplayLine::Failure { message } => {
                session.on_position_failure(&message);
                Ok(())
            }
        };

        if let Err(err) = result {
            warn!("line {}: {err}", index + 1);
            rejected_transitions += 1;
        }
    }

    if session.state() != SessionState::Idle {
        session.stop()?;
    }

    let stats = session.stats();
    let export_path = session
        .export_to_dir(args.format, args.name.as_deref(), &args.out)
        .await?;
    info!(
        "replayed {} events: {} points, {:.1}m gain, {:.1}m loss",
        summary_lines, stats.total_points, stats.elevation_gain, stats.elevation_loss
    );

    Ok(ReplaySummary {
        lines: summary_lines,
        rejected_fixes,
        rejected_transitions,
        stats,
        export_path,
    })
}

fn resolve_minimum_distance(args: &Args) -> Result<MinimumDistance> {
    let store = args
        .settings
        .clone()
        .map(SettingsStore::new)
        .transpose()?;

    match (args.min_distance, store) {
        (Some(metres), store) => {
            let distance = MinimumDistance::try_from(metres)?;
            if let Some(store) = store {
                store.update_minimum_distance(distance)?;
            }
            Ok(distance)
        }
        (None, Some(store)) => Ok(store.minimum_distance()),
        (None, None) => Ok(MinimumDistance::default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::decode_json;
    use uuid::Uuid;

    fn scratch_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("altitrack-cli-{}", Uuid::new_v4()));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn args(dir: &PathBuf, events: &str) -> Args {
        let path = dir.join("events.jsonl");
        fs::write(&path, events).unwrap();
        Args::parse_from([
            "altitrack",
            path.to_str().unwrap(),
            "--format",
            "json",
            "--name",
            "Replay",
            "--out",
            dir.join("out").to_str().unwrap(),
        ])
    }

    const EVENTS: &str = r#"
# three good fixes, one coarse one, a bad pause
{"type":"start"}
{"type":"position","timestamp":"2024-05-01T07:00:00Z","latitude":46.0,"longitude":7.0,"altitudeGps":100.0,"horizontalAccuracy":5.0,"verticalAccuracy":3.0,"speed":1.0}
{"type":"position","timestamp":"2024-05-01T07:00:10Z","latitude":46.0001,"longitude":7.0,"altitudeGps":105.0,"horizontalAccuracy":5.0,"verticalAccuracy":3.0,"speed":1.0}
{"type":"position","timestamp":"2024-05-01T07:00:15Z","latitude":46.0002,"longitude":7.0,"altitudeGps":300.0,"horizontalAccuracy":60.0,"verticalAccuracy":3.0,"speed":1.0}
{"type":"resume"}
{"type":"failure","message":"weak signal"}
{"type":"position","timestamp":"2024-05-01T07:00:20Z","latitude":46.0002,"longitude":7.0,"altitudeGps":98.0,"horizontalAccuracy":5.0,"verticalAccuracy":3.0,"speed":-1.0}
"#;

    #[tokio::test]
    async fn replays_and_exports() {
        let dir = scratch_dir();
        let summary = replay(args(&dir, EVENTS)).await.unwrap();

        assert_eq!(summary.lines, 7);
        assert_eq!(summary.rejected_fixes, 1);
        assert_eq!(summary.rejected_transitions, 1);
        assert_eq!(summary.stats.total_points, 3);
        assert_eq!(summary.stats.elevation_gain, 5.0);
        assert_eq!(summary.stats.elevation_loss, 7.0);
        assert_eq!(summary.stats.duration_seconds, 20.0);

        let document = decode_json(&fs::read(&summary.export_path).unwrap()).unwrap();
        assert_eq!(document.session, "Replay");
        assert_eq!(document.point_count, 3);

        fs::remove_dir_all(&dir).unwrap();
    }

    #[tokio::test]
    async fn malformed_line_is_reported_with_position() {
        let dir = scratch_dir();
        let err = replay(args(&dir, "{\"type\":\"start\"}\n{\"type\":\"teleport\"}\n"))
            .await
            .unwrap_err();
        assert!(err.to_string().ends_with(":2: invalid event"), "{err}");
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn minimum_distance_resolution() {
        let dir = scratch_dir();
        let settings = dir.join("settings.json");
        let mut args = args(&dir, "");
        assert_eq!(resolve_minimum_distance(&args).unwrap().metres(), 5);

        args.settings = Some(settings.clone());
        args.min_distance = Some(10);
        assert_eq!(resolve_minimum_distance(&args).unwrap().metres(), 10);

        args.min_distance = None;
        assert_eq!(resolve_minimum_distance(&args).unwrap().metres(), 10);

        args.min_distance = Some(7);
        assert!(resolve_minimum_distance(&args).is_err());

        fs::remove_dir_all(&dir).unwrap();
    }
}
