//! # Questhunt Core Library
//!
//! Proximity guidance for location-based treasure hunts. A player picks a
//! quest; the engine watches the device position, works out distance and
//! bearing to the target, and turns them into "hot/cold" feedback: a
//! proximity tier, a haptic buzz on every tier change and an audio cue whose
//! cadence speeds up as the player closes in. Within 10 m the quest unlocks.
//!
//! ## Architecture
//!
//! - **Geo**: coordinate math and the supervised position stream
//! - **Proximity**: the static tier table and the unlock latch
//! - **Feedback**: haptic edge notifier and the wall-clock cue scheduler
//! - **Session**: orchestrator owning all live state, plus an async runner
//! - **Storage**: TOML configuration
//!
//! ## Key Components
//!
//! - [`GuidanceSession`]: per-quest state machine fed with fixes
//! - [`run_session`]: drives a session from a [`Subscription`]
//! - [`QuestCatalog`]: quest targets by id
//! - [`Config`]: application configuration management

pub mod catalog;
pub mod error;
pub mod events;
pub mod feedback;
pub mod geo;
pub mod proximity;
pub mod session;
pub mod storage;
pub mod validation;

pub use catalog::{QuestCatalog, QuestTarget};
pub use error::{
    AudioError, CatalogError, ConfigError, CoordinateError, CoreError, PositionError,
    SessionError, TrackError, ValidationError,
};
pub use events::Event;
pub use feedback::{FeedbackScheduler, HapticNotifier};
pub use geo::{Coordinate, GeoEvent, PositionFix, PositionSource, Subscription, WatchOptions};
pub use proximity::{classify, ProximityTier, UnlockGate, TIERS};
pub use session::{run_session, FeedbackDevices, GuidanceSession, RunOptions, SessionState, StopReason};
pub use storage::Config;
pub use validation::ValidationClient;
