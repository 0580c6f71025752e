use std::{
    path::{Path, PathBuf},
    sync::{
        atomic::{AtomicU32, Ordering},
        Arc, Mutex, MutexGuard, PoisonError,
    },
};

use chrono::{DateTime, Utc};
use log::{error, info, warn};
use tokio::sync::watch;

use crate::{
    error::{Result, TrackError},
    export::{self, ExportFormat},
    models::{BarometricReading, FusedPoint, RawFix},
    sensing::SensorHub,
    settings::MinimumDistance,
    stats::SessionStats,
};

use super::{FixOutcome, Recorder, SessionSnapshot, SessionState, Transition};

/// Handle to the one recording session.
///
/// Every read and write goes through a single mutex, so the position and
/// barometer producers and the display side never observe a half-applied
/// update. Clones share the same session.
#[derive(Clone)]
pub struct SessionController {
    recorder: Arc<Mutex<Recorder>>,
    sensors: Arc<dyn SensorHub>,
    minimum_distance: Arc<AtomicU32>,
    updates: Arc<watch::Sender<SessionSnapshot>>,
}

impl SessionController {
    pub fn new(sensors: Arc<dyn SensorHub>, minimum_distance: MinimumDistance) -> Self {
        let recorder = Recorder::new(sensors.barometer_available());
        if !recorder.barometer_available() {
            info!("no barometer on this device; altitude will be GPS-only");
        }
        let (updates, _) = watch::channel(recorder.snapshot());

        Self {
            recorder: Arc::new(Mutex::new(recorder)),
            sensors,
            minimum_distance: Arc::new(AtomicU32::new(minimum_distance.metres())),
            updates: Arc::new(updates),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Recorder> {
        self.recorder.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, recorder: &Recorder) {
        self.updates.send_replace(recorder.snapshot());
    }

    /// Receives a fresh [`SessionSnapshot`] after every change.
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.updates.subscribe()
    }

    pub fn state(&self) -> SessionState {
        self.lock().state()
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.lock().started_at()
    }

    pub fn current_point(&self) -> Option<FusedPoint> {
        self.lock().current_point().cloned()
    }

    pub fn points(&self) -> Arc<[FusedPoint]> {
        self.lock().points()
    }

    pub fn stats(&self) -> SessionStats {
        self.lock().stats()
    }

    pub fn last_error(&self) -> Option<String> {
        self.lock().last_error().map(str::to_owned)
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.lock().snapshot()
    }

    pub fn minimum_distance(&self) -> u32 {
        self.minimum_distance.load(Ordering::SeqCst)
    }

    /// Takes effect immediately if the position source is armed.
    pub fn set_minimum_distance(&self, distance: MinimumDistance) {
        let recorder = self.lock();
        self.minimum_distance.store(distance.metres(), Ordering::SeqCst);
        if recorder.state() == SessionState::Tracking {
            self.sensors.set_minimum_distance(distance.metres());
        }
    }

    pub fn start(&self) -> Result<SessionState> {
        self.transition(Transition::Start)
    }

    pub fn pause(&self) -> Result<SessionState> {
        self.transition(Transition::Pause)
    }

    pub fn resume(&self) -> Result<SessionState> {
        self.transition(Transition::Resume)
    }

    pub fn stop(&self) -> Result<SessionState> {
        self.transition(Transition::Stop)
    }

    pub fn clear(&self) -> Result<SessionState> {
        self.transition(Transition::Clear)
    }

    fn transition(&self, transition: Transition) -> Result<SessionState> {
        let mut recorder = self.lock();
        let from = recorder.state();
        let next = recorder
            .transition(transition, Utc::now())
            .inspect_err(|err| warn!("rejected lifecycle call: {err}"))?;

        match transition {
            Transition::Start | Transition::Resume => self.arm(&recorder),
            Transition::Pause | Transition::Stop => self.disarm(&recorder),
            Transition::Clear => {}
        }

        info!(
            "session {} -> {} ({} points)",
            from,
            next,
            recorder.point_count()
        );
        self.publish(&recorder);
        Ok(next)
    }

    fn arm(&self, recorder: &Recorder) {
        self.sensors.set_minimum_distance(self.minimum_distance());
        self.sensors.arm_position();
        if recorder.barometer_available() {
            self.sensors.arm_barometer();
        }
    }

    fn disarm(&self, recorder: &Recorder) {
        self.sensors.disarm_position();
        if recorder.barometer_available() {
            self.sensors.disarm_barometer();
        }
    }

    /// Entry point for the position source.
    pub fn on_position_update(&self, fix: &RawFix) -> FixOutcome {
        let mut recorder = self.lock();
        let outcome = recorder.ingest_fix(fix);
        if outcome != FixOutcome::Rejected {
            self.publish(&recorder);
        }
        outcome
    }

    /// Entry point for the barometric altimeter.
    pub fn on_barometric_update(&self, reading: BarometricReading) {
        let mut recorder = self.lock();
        recorder.ingest_barometric(reading);
    }

    /// The position source reported an error. Shown to the user; the
    /// session keeps going.
    pub fn on_position_failure(&self, message: &str) {
        warn!("{}", TrackError::SensorFailure(message.to_owned()));
        let mut recorder = self.lock();
        recorder.record_failure(message);
        self.publish(&recorder);
    }

    /// A sensor event was lost before reaching the session. Surfaced through
    /// `last_error` so the display knows the log has a gap.
    pub fn on_samples_dropped(&self, kind: &str) {
        let message = format!("sensor queue full; {kind} sample dropped");
        warn!("{message}");
        let mut recorder = self.lock();
        recorder.record_failure(message);
        self.publish(&recorder);
    }

    pub fn clear_error(&self) {
        let mut recorder = self.lock();
        recorder.clear_error();
        self.publish(&recorder);
    }

    /// Serializes the current log without touching the filesystem.
    pub fn export_bytes(&self, format: ExportFormat, session_name: Option<&str>) -> Result<Vec<u8>> {
        let points = self.points();
        export::export(&points, format, session_name, Utc::now())
    }

    /// Writes the current log into `dir` and returns the final path.
    ///
    /// The log is copied under the lock and written after it is released,
    /// so recording continues while the file is produced. Nothing is left
    /// behind in `dir` on failure, and the session can be exported again.
    pub async fn export_to_dir(
        &self,
        format: ExportFormat,
        session_name: Option<&str>,
        dir: impl AsRef<Path>,
    ) -> Result<PathBuf> {
        let points = self.points();
        let exported_at = Utc::now();

        match export::write_export(dir.as_ref(), &points, format, session_name, exported_at).await {
            Ok(path) => {
                info!("exported {} points to {}", points.len(), path.display());
                Ok(path)
            }
            Err(err) => {
                error!("export failed: {err}");
                Err(err)
            }
        }
    }
}
