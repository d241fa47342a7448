//! Proximity tiers.
//!
//! The table is process-wide and immutable. Entries are ordered by
//! descending `min_distance_m`; the last one starts at 0 so every
//! non-negative distance lands somewhere.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ProximityTier {
    pub name: &'static str,
    /// Display token for front ends (CSS color).
    pub color: &'static str,
    pub min_distance_m: f64,
    /// Visual pulse strength, 0-5.
    pub pulse_intensity: u8,
    /// Audio cues per cadence window, 0-4. Zero means silent.
    pub bip_rate: u8,
}

impl ProximityTier {
    const fn new(
        name: &'static str,
        color: &'static str,
        min_distance_m: f64,
        pulse_intensity: u8,
        bip_rate: u8,
    ) -> Self {
        Self {
            name,
            color,
            min_distance_m,
            pulse_intensity,
            bip_rate,
        }
    }

    /// Interval between two cues for a cadence window of `base_ms`.
    /// `None` when the tier is silent.
    pub fn cue_period_ms(&self, base_ms: u64) -> Option<u64> {
        if self.bip_rate == 0 {
            None
        } else {
            Some((base_ms / u64::from(self.bip_rate)).max(1))
        }
    }
}

pub static TIERS: [ProximityTier; 6] = [
    ProximityTier::new("Glacial", "#3b82f6", 1000.0, 0, 0),
    ProximityTier::new("Froid", "#06b6d4", 300.0, 1, 0),
    ProximityTier::new("Tiède", "#eab308", 100.0, 2, 1),
    ProximityTier::new("Chaud", "#f97316", 30.0, 3, 2),
    ProximityTier::new("Très chaud", "#ef4444", 10.0, 4, 3),
    ProximityTier::new("Brûlant", "#dc2626", 0.0, 5, 4),
];

/// The tier used before any fix: the farthest one.
pub fn lowest() -> &'static ProximityTier {
    &TIERS[0]
}

/// First tier whose threshold is at or below `distance_m`.
///
/// NaN or negative input (never produced by the calculator) falls back to
/// the lowest tier.
pub fn classify(distance_m: f64) -> &'static ProximityTier {
    if distance_m.is_nan() || distance_m < 0.0 {
        return lowest();
    }
    TIERS
        .iter()
        .find(|tier| tier.min_distance_m <= distance_m)
        .unwrap_or(&TIERS[TIERS.len() - 1])
}

/// Look a tier up by name.
pub fn by_name(name: &str) -> Option<&'static ProximityTier> {
    TIERS.iter().find(|tier| tier.name == name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn table_is_descending_and_total() {
        for pair in TIERS.windows(2) {
            assert!(pair[0].min_distance_m > pair[1].min_distance_m);
        }
        assert_eq!(TIERS[TIERS.len() - 1].min_distance_m, 0.0);
    }

    #[test]
    fn thresholds_match_heat_scale() {
        assert_eq!(classify(0.0).name, "Brûlant");
        assert_eq!(classify(9.99).name, "Brûlant");
        assert_eq!(classify(10.0).name, "Très chaud");
        assert_eq!(classify(29.9).name, "Très chaud");
        assert_eq!(classify(30.0).name, "Chaud");
        assert_eq!(classify(100.0).name, "Tiède");
        assert_eq!(classify(299.0).name, "Tiède");
        assert_eq!(classify(500.0).name, "Froid");
        assert_eq!(classify(1000.0).name, "Glacial");
        assert_eq!(classify(5_000_000.0).name, "Glacial");
    }

    #[test]
    fn nan_and_negative_fall_back_to_lowest() {
        assert_eq!(classify(f64::NAN), lowest());
        assert_eq!(classify(-1.0), lowest());
    }

    #[test]
    fn cue_period_from_bip_rate() {
        assert_eq!(by_name("Très chaud").unwrap().cue_period_ms(1200), Some(400));
        assert_eq!(by_name("Brûlant").unwrap().cue_period_ms(1200), Some(300));
        assert_eq!(by_name("Froid").unwrap().cue_period_ms(1200), None);
    }

    proptest! {
        #[test]
        fn closer_is_never_less_intense(a in 0.0f64..5000.0, b in 0.0f64..5000.0) {
            let (near, far) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(classify(near).pulse_intensity >= classify(far).pulse_intensity);
            prop_assert!(classify(near).bip_rate >= classify(far).bip_rate);
        }

        #[test]
        fn every_distance_has_a_tier(d in 0.0f64..1.0e8) {
            let tier = classify(d);
            prop_assert!(tier.min_distance_m <= d);
        }
    }
}
