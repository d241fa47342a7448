//! Multi-modal feedback: the audio cadence scheduler and haptic edges.

pub mod audio;
pub mod haptic;
pub mod scheduler;

pub use audio::{AudioCue, SilentCue, TerminalBell};
pub use haptic::{HapticNotifier, LogVibrator, NoVibrator, Vibrator, HAPTIC_PATTERN_MS};
pub use scheduler::{FeedbackScheduler, SchedulerState, DEFAULT_CADENCE_BASE_MS};
