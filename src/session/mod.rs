pub mod controller;
pub mod point_log;
pub mod recorder;
pub mod state;

pub use controller::SessionController;
pub use point_log::PointLog;
pub use recorder::{FixOutcome, Recorder, SessionSnapshot};
pub use state::{SessionState, Transition};
