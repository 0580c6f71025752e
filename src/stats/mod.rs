pub mod distance;
pub mod engine;

pub use distance::haversine_m;
pub use engine::{compute, SessionStats};
