//! Logging macros gated by a module-level `ENABLE_LOGS` flag.
//!
//! High-rate paths (the sensor pump sees every fix and every barometer
//! sample) can be silenced per module without touching `RUST_LOG`:
//!
//! ```ignore
//! const ENABLE_LOGS: bool = false;
//! use crate::{log_debug, log_info, log_warn};
//!
//! log_info!("only printed when ENABLE_LOGS is true");
//! ```

/// `log::debug!` when the calling module's `ENABLE_LOGS` is true.
#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)*) => {
        if ENABLE_LOGS {
            log::debug!($($arg)*);
        }
    };
}

/// `log::info!` when the calling module's `ENABLE_LOGS` is true.
#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {
        if ENABLE_LOGS {
            log::info!($($arg)*);
        }
    };
}

/// `log::warn!` when the calling module's `ENABLE_LOGS` is true.
#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => {
        if ENABLE_LOGS {
            log::warn!($($arg)*);
        }
    };
}

/// Initialises `env_logger` once for the process. `RUST_LOG` wins over
/// `default_level` when set.
pub fn init(default_level: log::LevelFilter) {
    let _ = env_logger::Builder::new()
        .filter_level(default_level)
        .parse_default_env()
        .try_init();
}
