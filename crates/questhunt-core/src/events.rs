use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::geo::Coordinate;

/// Every state change in a guidance session produces an Event.
/// Front ends render them; the CLI prints them as JSON lines.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum Event {
    SessionOpened {
        session_id: Uuid,
        quest_id: u32,
        quest_name: String,
        target: Coordinate,
        at: DateTime<Utc>,
    },
    PositionUpdated {
        position: Coordinate,
        distance_m: f64,
        bearing_deg: f64,
        cardinal: String,
        tier: String,
        pulse_intensity: u8,
        at: DateTime<Utc>,
    },
    TierChanged {
        from: String,
        to: String,
        color: String,
        pulse_intensity: u8,
        bip_rate: u8,
        at: DateTime<Utc>,
    },
    /// The unlock latch flipped. Emitted once per session.
    Unlocked {
        distance_m: f64,
        at: DateTime<Utc>,
    },
    HapticFired {
        pattern_ms: Vec<u64>,
        from: String,
        to: String,
        at: DateTime<Utc>,
    },
    /// An audio cue was due. `delivered` is false when playback failed.
    CuePlayed {
        tier: String,
        period_ms: u64,
        delivered: bool,
        at: DateTime<Utc>,
    },
    /// A pending cue was dropped (tier change or teardown).
    CueCancelled {
        tier: String,
        due_ms: u64,
        at: DateTime<Utc>,
    },
    PositionError {
        message: String,
        at: DateTime<Utc>,
    },
    HeadingUpdated {
        heading_deg: f64,
        arrow_angle_deg: Option<f64>,
        at: DateTime<Utc>,
    },
    ValidationSent {
        quest_id: u32,
        endpoint: String,
        at: DateTime<Utc>,
    },
    SessionClosed {
        session_id: Uuid,
        unlocked: bool,
        fixes: u64,
        at: DateTime<Utc>,
    },
    StateSnapshot {
        quest_id: u32,
        quest_name: String,
        position: Option<Coordinate>,
        distance_m: Option<f64>,
        bearing_deg: Option<f64>,
        arrow_angle_deg: Option<f64>,
        tier: String,
        color: String,
        pulse_intensity: u8,
        bip_rate: u8,
        unlocked: bool,
        last_error: Option<String>,
        at: DateTime<Utc>,
    },
}

impl Event {
    /// Snake-case name of the variant, for compact logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Event::SessionOpened { .. } => "session_opened",
            Event::PositionUpdated { .. } => "position_updated",
            Event::TierChanged { .. } => "tier_changed",
            Event::Unlocked { .. } => "unlocked",
            Event::HapticFired { .. } => "haptic_fired",
            Event::CuePlayed { .. } => "cue_played",
            Event::CueCancelled { .. } => "cue_cancelled",
            Event::PositionError { .. } => "position_error",
            Event::HeadingUpdated { .. } => "heading_updated",
            Event::ValidationSent { .. } => "validation_sent",
            Event::SessionClosed { .. } => "session_closed",
            Event::StateSnapshot { .. } => "state_snapshot",
        }
    }
}
