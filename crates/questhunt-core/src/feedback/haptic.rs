//! Haptic feedback on tier transitions.

use tracing::debug;

use crate::proximity::ProximityTier;

/// Vibration pattern in milliseconds: on, off, on.
pub const HAPTIC_PATTERN_MS: [u64; 3] = [100, 50, 100];

/// Platform vibration capability.
pub trait Vibrator: Send {
    fn is_available(&self) -> bool;

    /// Play a pattern of alternating on/off durations. Never fails; devices
    /// that cannot comply simply do nothing.
    fn vibrate(&mut self, pattern_ms: &[u64]);
}

/// Device without a vibration motor.
#[derive(Debug, Default)]
pub struct NoVibrator;

impl Vibrator for NoVibrator {
    fn is_available(&self) -> bool {
        false
    }

    fn vibrate(&mut self, _pattern_ms: &[u64]) {}
}

/// Stand-in for terminals: records the buzz in the log.
#[derive(Debug, Default)]
pub struct LogVibrator;

impl Vibrator for LogVibrator {
    fn is_available(&self) -> bool {
        true
    }

    fn vibrate(&mut self, pattern_ms: &[u64]) {
        debug!(?pattern_ms, "bzz");
    }
}

/// Fires [`HAPTIC_PATTERN_MS`] once per tier edge.
pub struct HapticNotifier {
    vibrator: Box<dyn Vibrator>,
    enabled: bool,
}

impl HapticNotifier {
    pub fn new(vibrator: Box<dyn Vibrator>, enabled: bool) -> Self {
        Self { vibrator, enabled }
    }

    /// Returns `true` when the pattern was actually sent to the device.
    pub fn notify_if_changed(&mut self, previous: &ProximityTier, current: &ProximityTier) -> bool {
        if previous.name == current.name {
            return false;
        }
        if !self.enabled || !self.vibrator.is_available() {
            return false;
        }
        self.vibrator.vibrate(&HAPTIC_PATTERN_MS);
        debug!(from = previous.name, to = current.name, "haptic edge");
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proximity::tier::by_name;
    use std::sync::{Arc, Mutex};

    #[derive(Default, Clone)]
    struct CountingVibrator {
        calls: Arc<Mutex<Vec<Vec<u64>>>>,
    }

    impl Vibrator for CountingVibrator {
        fn is_available(&self) -> bool {
            true
        }

        fn vibrate(&mut self, pattern_ms: &[u64]) {
            self.calls.lock().unwrap().push(pattern_ms.to_vec());
        }
    }

    #[test]
    fn fires_once_per_edge() {
        let vib = CountingVibrator::default();
        let mut notifier = HapticNotifier::new(Box::new(vib.clone()), true);
        let froid = by_name("Froid").unwrap();
        let tiede = by_name("Tiède").unwrap();

        assert!(notifier.notify_if_changed(froid, tiede));
        assert!(!notifier.notify_if_changed(tiede, tiede));
        assert!(!notifier.notify_if_changed(tiede, tiede));

        let calls = vib.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0], vec![100, 50, 100]);
    }

    #[test]
    fn unavailable_device_is_silent() {
        let mut notifier = HapticNotifier::new(Box::new(NoVibrator), true);
        let froid = by_name("Froid").unwrap();
        let chaud = by_name("Chaud").unwrap();
        assert!(!notifier.notify_if_changed(froid, chaud));
    }

    #[test]
    fn disabled_by_setting() {
        let vib = CountingVibrator::default();
        let mut notifier = HapticNotifier::new(Box::new(vib.clone()), false);
        let froid = by_name("Froid").unwrap();
        let chaud = by_name("Chaud").unwrap();
        assert!(!notifier.notify_if_changed(froid, chaud));
        assert!(vib.calls.lock().unwrap().is_empty());
    }
}
