use crate::models::RawFix;

/// Fixes at or beyond this horizontal accuracy are too coarse to log.
pub const MAX_HORIZONTAL_ACCURACY_M: f64 = 50.0;

/// Accepts a fix only when its horizontal accuracy is known and under
/// [`MAX_HORIZONTAL_ACCURACY_M`], and its position and altitude are real numbers.
pub fn accept(fix: &RawFix) -> bool {
    if !fix.horizontal_accuracy_valid || !fix.horizontal_accuracy.is_finite() {
        return false;
    }
    if ![fix.latitude, fix.longitude, fix.altitude_gps]
        .iter()
        .all(|value| value.is_finite())
    {
        return false;
    }
    fix.horizontal_accuracy >= 0.0 && fix.horizontal_accuracy < MAX_HORIZONTAL_ACCURACY_M
}
