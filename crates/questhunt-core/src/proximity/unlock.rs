//! One-way unlock latch.

/// Distance under which the quest unlocks.
pub const UNLOCK_RADIUS_M: f64 = 10.0;

/// Latch that flips to unlocked once the user comes within
/// [`UNLOCK_RADIUS_M`] and then stays unlocked for the rest of the session,
/// wherever the user goes next.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UnlockGate {
    unlocked: bool,
}

impl UnlockGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_unlocked(&self) -> bool {
        self.unlocked
    }

    /// Feed a distance. Returns `true` only on the call that flips the latch.
    pub fn evaluate(&mut self, distance_m: f64) -> bool {
        let was = self.unlocked;
        self.unlocked = was || distance_m < UNLOCK_RADIUS_M;
        self.unlocked && !was
    }
}
