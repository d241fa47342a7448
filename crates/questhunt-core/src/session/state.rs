use crate::geo::compass::{relative_bearing, MIN_NEEDLE_DISTANCE_M};
use crate::geo::Coordinate;
use crate::proximity::tier::{lowest, ProximityTier};

/// Live state of one guidance session.
///
/// Only [`GuidanceSession`](super::GuidanceSession) mutates it; everyone
/// else gets a shared reference.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionState {
    pub current_position: Option<Coordinate>,
    pub current_distance_m: Option<f64>,
    pub current_bearing_deg: Option<f64>,
    pub current_tier: &'static ProximityTier,
    /// Tier before the last update, for edge detection.
    pub previous_tier: &'static ProximityTier,
    /// Monotonic: once true, stays true.
    pub unlocked: bool,
    pub last_error: Option<String>,
    pub device_heading_deg: Option<f64>,
    pub fix_count: u64,
}

impl SessionState {
    pub fn new() -> Self {
        Self {
            current_position: None,
            current_distance_m: None,
            current_bearing_deg: None,
            current_tier: lowest(),
            previous_tier: lowest(),
            unlocked: false,
            last_error: None,
            device_heading_deg: None,
            fix_count: 0,
        }
    }

    /// Compass needle angle relative to the device. `None` without a
    /// bearing, without a heading, or when standing on the target.
    pub fn arrow_angle_deg(&self) -> Option<f64> {
        let distance = self.current_distance_m?;
        if distance < MIN_NEEDLE_DISTANCE_M {
            return None;
        }
        Some(relative_bearing(
            self.current_bearing_deg?,
            self.device_heading_deg?,
        ))
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_in_lowest_tier() {
        let state = SessionState::new();
        assert_eq!(state.current_tier.name, "Glacial");
        assert_eq!(state.previous_tier.name, "Glacial");
        assert!(!state.unlocked);
    }

    #[test]
    fn arrow_needs_bearing_and_heading() {
        let mut state = SessionState::new();
        assert_eq!(state.arrow_angle_deg(), None);

        state.current_distance_m = Some(120.0);
        state.current_bearing_deg = Some(45.0);
        assert_eq!(state.arrow_angle_deg(), None);

        state.device_heading_deg = Some(90.0);
        assert_eq!(state.arrow_angle_deg(), Some(315.0));

        state.current_distance_m = Some(0.0);
        assert_eq!(state.arrow_angle_deg(), None);
    }
}
