use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::{
    models::{BarometricReading, RawFix},
    session::{FixOutcome, SessionController},
};

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_info, log_warn};

/// One message from either sensor producer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "camelCase")]
pub enum SensorEvent {
    Position(RawFix),
    Barometric(BarometricReading),
    PositionFailure(String),
}

impl SensorEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            SensorEvent::Position(_) => "position",
            SensorEvent::Barometric(_) => "barometric",
            SensorEvent::PositionFailure(_) => "failure",
        }
    }
}

/// Counters reported when the pump shuts down.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PumpStats {
    pub positions: u64,
    pub logged: u64,
    pub rejected: u64,
    pub barometric: u64,
    pub failures: u64,
    /// Events refused by a full queue and never applied.
    pub dropped: u64,
}

/// Drains sensor events into the session one at a time until cancelled or
/// every sender is dropped. On cancellation, events already queued are still
/// applied before the loop exits.
pub async fn pump_loop(
    session: SessionController,
    mut events: mpsc::Receiver<SensorEvent>,
    cancel_token: CancellationToken,
) -> PumpStats {
    let mut stats = PumpStats::default();

    loop {
        tokio::select! {
            biased;
            _ = cancel_token.cancelled() => {
                events.close();
                let mut drained = 0usize;
                while let Some(event) = events.recv().await {
                    apply(&session, event, &mut stats);
                    drained += 1;
                }
                log_info!("sensor pump shutting down ({drained} queued events drained)");
                break;
            }
            event = events.recv() => match event {
                Some(event) => apply(&session, event, &mut stats),
                None => {
                    log_info!("all sensor producers gone; sensor pump exiting");
                    break;
                }
            }
        }
    }

    stats
}

fn apply(session: &SessionController, event: SensorEvent, stats: &mut PumpStats) {
    match event {
        SensorEvent::Position(fix) => {
            stats.positions += 1;
            match session.on_position_update(&fix) {
                FixOutcome::Logged => stats.logged += 1,
                FixOutcome::Rejected => {
                    stats.rejected += 1;
                    log_debug!(
                        "dropped fix at {} (accuracy {:.1}m)",
                        fix.timestamp,
                        fix.horizontal_accuracy
                    );
                }
                FixOutcome::Displayed => {}
            }
        }
        SensorEvent::Barometric(reading) => {
            stats.barometric += 1;
            session.on_barometric_update(reading);
        }
        SensorEvent::PositionFailure(message) => {
            stats.failures += 1;
            log_warn!("position failure forwarded to session: {message}");
            session.on_position_failure(&message);
        }
    }
}
