pub mod fix;
pub mod point;

pub use fix::{BarometricReading, RawFix};
pub use point::FusedPoint;
