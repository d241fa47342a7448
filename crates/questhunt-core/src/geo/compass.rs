//! Compass helpers for pointing the user at the target.

use super::distance::normalize_deg;

/// Below this distance the bearing is meaningless and no needle is drawn.
pub const MIN_NEEDLE_DISTANCE_M: f64 = 0.5;

const POINTS: [&str; 8] = ["N", "NE", "E", "SE", "S", "SO", "O", "NO"];

/// Needle angle relative to the device: bearing to the target minus the
/// direction the device is facing, in `[0, 360)`.
pub fn relative_bearing(bearing_deg: f64, heading_deg: f64) -> f64 {
    normalize_deg(bearing_deg - heading_deg)
}

/// Eight-point compass label for a bearing (French initials: O is west).
pub fn cardinal(bearing_deg: f64) -> &'static str {
    let sector = ((normalize_deg(bearing_deg) + 22.5) / 45.0) as usize % 8;
    POINTS[sector]
}
