pub mod controller;
pub mod filter;
pub mod fusion;
pub mod hub;
pub mod loop_worker;

pub use controller::{SensorPump, SensorSender};
pub use fusion::AltitudeFuser;
pub use hub::{PassiveSensorHub, SensorHub};
pub use loop_worker::{PumpStats, SensorEvent};
