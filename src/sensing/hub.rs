//! Seam to the platform sensor services.
//!
//! The session controller decides *when* sources are armed; a thin platform
//! shim implementing [`SensorHub`] decides *how*.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use log::{debug, info};

pub trait SensorHub: Send + Sync {
    /// Whether the hardware has a barometric altimeter at all.
    fn barometer_available(&self) -> bool;

    /// Movement granularity the position source should use once armed.
    fn set_minimum_distance(&self, metres: u32);

    fn arm_position(&self);
    fn disarm_position(&self);

    /// Re-arming restarts the relative-altitude reference at zero.
    fn arm_barometer(&self);
    fn disarm_barometer(&self);
}

/// A hub that only records arm state and logs it.
///
/// Used when samples are fed in from somewhere other than live hardware,
/// e.g. when replaying a recorded event file.
#[derive(Debug, Default)]
pub struct PassiveSensorHub {
    barometer: bool,
    position_armed: AtomicBool,
    barometer_armed: AtomicBool,
    minimum_distance: AtomicU32,
    barometer_arm_count: AtomicU32,
}

impl PassiveSensorHub {
    pub fn new(barometer: bool) -> Self {
        Self {
            barometer,
            ..Self::default()
        }
    }

    pub fn position_armed(&self) -> bool {
        self.position_armed.load(Ordering::SeqCst)
    }

    pub fn barometer_armed(&self) -> bool {
        self.barometer_armed.load(Ordering::SeqCst)
    }

    pub fn minimum_distance(&self) -> u32 {
        self.minimum_distance.load(Ordering::SeqCst)
    }

    pub fn barometer_arm_count(&self) -> u32 {
        self.barometer_arm_count.load(Ordering::SeqCst)
    }
}

impl SensorHub for PassiveSensorHub {
    fn barometer_available(&self) -> bool {
        self.barometer
    }

    fn set_minimum_distance(&self, metres: u32) {
        debug!("position source distance filter set to {metres}m");
        self.minimum_distance.store(metres, Ordering::SeqCst);
    }

    fn arm_position(&self) {
        info!("position source armed");
        self.position_armed.store(true, Ordering::SeqCst);
    }

    fn disarm_position(&self) {
        info!("position source disarmed");
        self.position_armed.store(false, Ordering::SeqCst);
    }

    fn arm_barometer(&self) {
        info!("barometer armed");
        self.barometer_armed.store(true, Ordering::SeqCst);
        self.barometer_arm_count.fetch_add(1, Ordering::SeqCst);
    }

    fn disarm_barometer(&self) {
        info!("barometer disarmed");
        self.barometer_armed.store(false, Ordering::SeqCst);
    }
}
