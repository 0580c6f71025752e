use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TrackError};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum SessionState {
    #[default]
    Idle,
    Tracking,
    Paused,
}

impl SessionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionState::Idle => "idle",
            SessionState::Tracking => "tracking",
            SessionState::Paused => "paused",
        }
    }

    /// Validates `transition` against the current state and returns the
    /// state it leads to.
    pub fn apply(self, transition: Transition) -> Result<SessionState> {
        let next = match (self, transition) {
            (SessionState::Idle, Transition::Start) => SessionState::Tracking,
            (SessionState::Tracking, Transition::Pause) => SessionState::Paused,
            (SessionState::Paused, Transition::Resume) => SessionState::Tracking,
            (SessionState::Tracking | SessionState::Paused, Transition::Stop) => SessionState::Idle,
            (SessionState::Idle, Transition::Clear) => SessionState::Idle,
            (from, transition) => {
                return Err(TrackError::InvalidTransition {
                    action: transition.as_str(),
                    from,
                })
            }
        };
        Ok(next)
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Start,
    Pause,
    Resume,
    Stop,
    Clear,
}

impl Transition {
    pub fn as_str(&self) -> &'static str {
        match self {
            Transition::Start => "start",
            Transition::Pause => "pause",
            Transition::Resume => "resume",
            Transition::Stop => "stop",
            Transition::Clear => "clear",
        }
    }
}
