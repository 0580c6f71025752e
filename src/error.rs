use std::{io, path::PathBuf};

use thiserror::Error;

use crate::session::SessionState;

pub type Result<T> = std::result::Result<T, TrackError>;

#[derive(Debug, Error)]
pub enum TrackError {
    /// A lifecycle call made from a state that does not permit it.
    /// Session state and the point log are left untouched.
    #[error("cannot {action} while {from}")]
    InvalidTransition {
        action: &'static str,
        from: SessionState,
    },

    /// Position source reported a failure. Non-fatal; logging continues.
    #[error("position source failed: {0}")]
    SensorFailure(String),

    #[error("failed to write export {}: {source}", .path.display())]
    Export {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to encode export: {0}")]
    Encode(String),

    #[error("unsupported minimum distance {0}m (expected one of 1, 3, 5, 10, 20, 50)")]
    InvalidSetting(u32),
}

impl TrackError {
    pub fn export(path: impl Into<PathBuf>, source: io::Error) -> Self {
        TrackError::Export {
            path: path.into(),
            source,
        }
    }
}

impl From<serde_json::Error> for TrackError {
    fn from(err: serde_json::Error) -> Self {
        TrackError::Encode(err.to_string())
    }
}

impl From<csv::Error> for TrackError {
    fn from(err: csv::Error) -> Self {
        TrackError::Encode(err.to_string())
    }
}
