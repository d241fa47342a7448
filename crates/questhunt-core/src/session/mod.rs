//! Guidance sessions: one quest, one position watch, live feedback.

mod guidance;
pub mod runner;
mod state;

pub use guidance::{FeedbackDevices, GuidanceSession};
pub use runner::{run_session, RunOptions, SessionClock, StopReason};
pub use state::SessionState;
