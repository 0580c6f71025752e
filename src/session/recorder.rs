use std::sync::Arc;

use chrono::{DateTime, Utc};
use log::debug;
use serde::Serialize;

use crate::{
    error::Result,
    models::{BarometricReading, FusedPoint, RawFix},
    sensing::{filter, AltitudeFuser},
    stats::{self, SessionStats},
};

use super::{PointLog, SessionState, Transition};

/// What happened to a position update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum FixOutcome {
    /// Filtered out; no point was created.
    Rejected,
    /// Fused and shown as the current point, but not logged.
    Displayed,
    /// Fused and appended to the point log.
    Logged,
}

/// Read-only view published to the display side after every mutation.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub state: SessionState,
    pub started_at: Option<DateTime<Utc>>,
    pub current_point: Option<FusedPoint>,
    pub stats: SessionStats,
    pub last_error: Option<String>,
}

/// All mutable session data. Lives behind the controller's lock.
#[derive(Debug, Clone)]
pub struct Recorder {
    state: SessionState,
    started_at: Option<DateTime<Utc>>,
    log: PointLog,
    fuser: AltitudeFuser,
    current_point: Option<FusedPoint>,
    last_error: Option<String>,
}

impl Recorder {
    pub fn new(barometer_available: bool) -> Self {
        Self {
            state: SessionState::Idle,
            started_at: None,
            log: PointLog::new(),
            fuser: AltitudeFuser::new(barometer_available),
            current_point: None,
            last_error: None,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    pub fn barometer_available(&self) -> bool {
        self.fuser.barometer_available()
    }

    pub fn baseline_altitude(&self) -> Option<f64> {
        self.fuser.baseline()
    }

    pub fn current_point(&self) -> Option<&FusedPoint> {
        self.current_point.as_ref()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn points(&self) -> Arc<[FusedPoint]> {
        self.log.snapshot()
    }

    pub fn point_count(&self) -> usize {
        self.log.len()
    }

    pub fn stats(&self) -> SessionStats {
        stats::compute(self.log.as_slice())
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            state: self.state,
            started_at: self.started_at,
            current_point: self.current_point.clone(),
            stats: self.stats(),
            last_error: self.last_error.clone(),
        }
    }

    /// Applies a lifecycle transition. On error nothing is modified.
    pub fn transition(&mut self, transition: Transition, now: DateTime<Utc>) -> Result<SessionState> {
        let next = self.state.apply(transition)?;

        match transition {
            Transition::Start => {
                self.log.clear();
                self.fuser.reset();
                self.started_at = Some(now);
                self.current_point = None;
                self.last_error = None;
            }
            Transition::Resume => {
                // The barometer restarts from zero; re-base on the last
                // logged altitude so the channel stays continuous.
                let reference = self.log.last().map(FusedPoint::best_altitude);
                self.fuser.rearm(reference);
            }
            Transition::Clear => {
                self.log.clear();
                self.fuser.reset();
                self.started_at = None;
                self.current_point = None;
            }
            Transition::Pause | Transition::Stop => {}
        }

        self.state = next;
        Ok(next)
    }

    /// Filters, fuses and (only while tracking) logs a position update.
    pub fn ingest_fix(&mut self, fix: &RawFix) -> FixOutcome {
        if !filter::accept(fix) {
            debug!(
                "rejected fix at {} (horizontal accuracy {})",
                fix.timestamp, fix.horizontal_accuracy
            );
            return FixOutcome::Rejected;
        }

        let tracking = self.state == SessionState::Tracking;
        if tracking {
            self.fuser.establish_baseline(fix.altitude_gps);
        }

        let point = self.fuser.fuse(fix);
        self.current_point = Some(point.clone());

        if tracking {
            self.log.append(point);
            FixOutcome::Logged
        } else {
            FixOutcome::Displayed
        }
    }

    pub fn ingest_barometric(&mut self, reading: BarometricReading) -> bool {
        self.fuser.record_barometric(reading)
    }

    pub fn record_failure(&mut self, message: impl Into<String>) {
        self.last_error = Some(message.into());
    }

    pub fn clear_error(&mut self) {
        self.last_error = None;
    }
}
