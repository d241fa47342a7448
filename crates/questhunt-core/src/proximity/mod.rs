//! Proximity policy: distance tiers and the unlock latch.

pub mod tier;
mod unlock;

pub use tier::{classify, ProximityTier, TIERS};
pub use unlock::{UnlockGate, UNLOCK_RADIUS_M};
