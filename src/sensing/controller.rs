use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

use anyhow::{bail, Context, Result};
use log::info;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::models::{BarometricReading, RawFix};
use crate::session::SessionController;

use super::loop_worker::{pump_loop, PumpStats, SensorEvent};

const EVENT_QUEUE_CAPACITY: usize = 256;

/// Producer side of the pump. Cheap to clone; one per platform callback.
#[derive(Clone)]
pub struct SensorSender {
    tx: mpsc::Sender<SensorEvent>,
    session: SessionController,
    dropped: Arc<AtomicU64>,
}

impl SensorSender {
    pub async fn send(&self, event: SensorEvent) -> Result<()> {
        self.tx
            .send(event)
            .await
            .map_err(|_| anyhow::anyhow!("sensor pump is not running"))
    }

    /// Non-blocking variant for callbacks that run outside the runtime.
    /// Returns `false` if the event had to be dropped. A drop caused by a
    /// full queue is counted and reported to the session.
    pub fn try_send(&self, event: SensorEvent) -> bool {
        match self.tx.try_send(event) {
            Ok(()) => true,
            Err(TrySendError::Full(event)) => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
                self.session.on_samples_dropped(event.kind());
                false
            }
            Err(TrySendError::Closed(_)) => false,
        }
    }

    pub fn position(&self, fix: RawFix) -> bool {
        self.try_send(SensorEvent::Position(fix))
    }

    pub fn barometric(&self, reading: BarometricReading) -> bool {
        self.try_send(SensorEvent::Barometric(reading))
    }

    pub fn failure(&self, message: impl Into<String>) -> bool {
        self.try_send(SensorEvent::PositionFailure(message.into()))
    }
}

/// Owns the task that funnels both sensor streams into the session.
pub struct SensorPump {
    handle: Option<JoinHandle<PumpStats>>,
    cancel_token: Option<CancellationToken>,
    dropped: Arc<AtomicU64>,
}

impl SensorPump {
    pub fn new() -> Self {
        Self {
            handle: None,
            cancel_token: None,
            dropped: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle.is_some()
    }

    pub fn start(&mut self, session: SessionController) -> Result<SensorSender> {
        if self.handle.is_some() {
            bail!("sensor pump already running");
        }

        let (tx, rx) = mpsc::channel(EVENT_QUEUE_CAPACITY);
        let cancel_token = CancellationToken::new();
        let handle = tokio::spawn(pump_loop(session.clone(), rx, cancel_token.clone()));
        self.dropped = Arc::new(AtomicU64::new(0));

        self.handle = Some(handle);
        self.cancel_token = Some(cancel_token);
        info!("sensor pump started");
        Ok(SensorSender {
            tx,
            session,
            dropped: self.dropped.clone(),
        })
    }

    /// Stops the pump after applying whatever is already queued.
    pub async fn stop(&mut self) -> Result<PumpStats> {
        if let Some(token) = self.cancel_token.take() {
            token.cancel();
        }

        let Some(handle) = self.handle.take() else {
            return Ok(PumpStats::default());
        };
        let mut stats = handle.await.context("sensor pump task failed to join")?;
        stats.dropped = self.dropped.load(Ordering::Relaxed);
        Ok(stats)
    }
}

impl Default for SensorPump {
    fn default() -> Self {
        Self::new()
    }
}
