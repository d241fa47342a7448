//! Guidance session orchestrator.
//!
//! On every fix: distance/bearing against the target, tier classification,
//! unlock latch, haptic edge (against the prior tier), then the tier is
//! handed to the cue scheduler. All of it happens inside one `on_fix` call,
//! so a stale tier's cue can never interleave with the new tier's state.

use chrono::Utc;
use tokio::task::JoinHandle;
use tracing::{info, warn};
use uuid::Uuid;

use super::state::SessionState;
use crate::catalog::{QuestCatalog, QuestTarget};
use crate::error::{CoreError, PositionError, SessionError};
use crate::events::Event;
use crate::feedback::{
    AudioCue, FeedbackScheduler, HapticNotifier, NoVibrator, SilentCue, Vibrator,
    HAPTIC_PATTERN_MS,
};
use crate::geo::{cardinal, distance_and_bearing, Coordinate};
use crate::proximity::{classify, UnlockGate};
use crate::storage::FeedbackConfig;
use crate::validation::ValidationClient;

/// Output devices a session drives.
pub struct FeedbackDevices {
    pub audio: Box<dyn AudioCue>,
    pub vibrator: Box<dyn Vibrator>,
}

impl FeedbackDevices {
    pub fn new(audio: Box<dyn AudioCue>, vibrator: Box<dyn Vibrator>) -> Self {
        Self { audio, vibrator }
    }

    /// No sound, no vibration.
    pub fn silent() -> Self {
        Self::new(Box::new(SilentCue), Box::new(NoVibrator))
    }
}

pub struct GuidanceSession {
    id: Uuid,
    target: QuestTarget,
    state: SessionState,
    gate: UnlockGate,
    haptics: HapticNotifier,
    scheduler: FeedbackScheduler,
    closed: bool,
}

impl GuidanceSession {
    /// Open a session for quest `quest_id`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::TargetNotFound`] when the catalog has no such
    /// quest; nothing is started in that case.
    pub fn open(
        catalog: &QuestCatalog,
        quest_id: u32,
        devices: FeedbackDevices,
        feedback: &FeedbackConfig,
    ) -> Result<(Self, Event), CoreError> {
        let target = catalog.find(quest_id)?.clone();
        Ok(Self::for_target(target, devices, feedback))
    }

    pub fn for_target(
        target: QuestTarget,
        devices: FeedbackDevices,
        feedback: &FeedbackConfig,
    ) -> (Self, Event) {
        let session = Self {
            id: Uuid::new_v4(),
            state: SessionState::new(),
            gate: UnlockGate::new(),
            haptics: HapticNotifier::new(devices.vibrator, feedback.haptics_enabled),
            scheduler: FeedbackScheduler::new(devices.audio, feedback.cadence_base_ms),
            closed: false,
            target,
        };
        info!(
            session_id = %session.id,
            quest_id = session.target.id,
            quest = %session.target.name,
            "guidance session opened"
        );
        let event = Event::SessionOpened {
            session_id: session.id,
            quest_id: session.target.id,
            quest_name: session.target.name.clone(),
            target: session.target.location,
            at: Utc::now(),
        };
        (session, event)
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn target(&self) -> &QuestTarget {
        &self.target
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// When the next audio cue is due, on the clock passed to `on_fix`.
    pub fn next_cue_due_ms(&self) -> Option<u64> {
        if self.closed {
            return None;
        }
        self.scheduler.next_due_ms()
    }

    /// Build a full state snapshot event.
    pub fn snapshot(&self) -> Event {
        let tier = self.state.current_tier;
        Event::StateSnapshot {
            quest_id: self.target.id,
            quest_name: self.target.name.clone(),
            position: self.state.current_position,
            distance_m: self.state.current_distance_m,
            bearing_deg: self.state.current_bearing_deg,
            arrow_angle_deg: self.state.arrow_angle_deg(),
            tier: tier.name.to_string(),
            color: tier.color.to_string(),
            pulse_intensity: tier.pulse_intensity,
            bip_rate: tier.bip_rate,
            unlocked: self.state.unlocked,
            last_error: self.state.last_error.clone(),
            at: Utc::now(),
        }
    }

    // ── Position stream handlers ─────────────────────────────────────

    pub fn on_fix(&mut self, position: Coordinate, now_ms: u64) -> Vec<Event> {
        if self.closed {
            return Vec::new();
        }
        if let Err(e) = position.validate() {
            return self.on_error(&PositionError::Source(format!("invalid fix: {e}")));
        }

        let mut events = Vec::new();
        let (distance_m, bearing_deg) = distance_and_bearing(position, self.target.location);
        let tier = classify(distance_m);

        self.state.current_position = Some(position);
        self.state.current_distance_m = Some(distance_m);
        self.state.current_bearing_deg = Some(bearing_deg);
        self.state.fix_count += 1;
        events.push(Event::PositionUpdated {
            position,
            distance_m,
            bearing_deg,
            cardinal: cardinal(bearing_deg).to_string(),
            tier: tier.name.to_string(),
            pulse_intensity: tier.pulse_intensity,
            at: Utc::now(),
        });

        if self.gate.evaluate(distance_m) {
            self.state.unlocked = true;
            info!(quest_id = self.target.id, distance_m, "quest unlocked");
            events.push(Event::Unlocked {
                distance_m,
                at: Utc::now(),
            });
        }

        let previous = self.state.current_tier;
        let buzzed = self.haptics.notify_if_changed(previous, tier);
        if previous.name != tier.name {
            info!(from = previous.name, to = tier.name, distance_m, "tier changed");
            events.push(Event::TierChanged {
                from: previous.name.to_string(),
                to: tier.name.to_string(),
                color: tier.color.to_string(),
                pulse_intensity: tier.pulse_intensity,
                bip_rate: tier.bip_rate,
                at: Utc::now(),
            });
        }
        if buzzed {
            events.push(Event::HapticFired {
                pattern_ms: HAPTIC_PATTERN_MS.to_vec(),
                from: previous.name.to_string(),
                to: tier.name.to_string(),
                at: Utc::now(),
            });
        }
        self.state.previous_tier = previous;
        self.state.current_tier = tier;

        events.extend(self.scheduler.set_tier(tier, now_ms));
        events
    }

    /// Record a position error. Tracking goes on.
    pub fn on_error(&mut self, error: &PositionError) -> Vec<Event> {
        if self.closed {
            return Vec::new();
        }
        warn!(error = %error, "position unavailable");
        let message = error.to_string();
        self.state.last_error = Some(message.clone());
        vec![Event::PositionError {
            message,
            at: Utc::now(),
        }]
    }

    /// Device compass update.
    pub fn on_heading(&mut self, heading_deg: f64) -> Option<Event> {
        if self.closed || !heading_deg.is_finite() {
            return None;
        }
        let heading_deg = crate::geo::distance::normalize_deg(heading_deg);
        self.state.device_heading_deg = Some(heading_deg);
        Some(Event::HeadingUpdated {
            heading_deg,
            arrow_angle_deg: self.state.arrow_angle_deg(),
            at: Utc::now(),
        })
    }

    /// Let the scheduler play a cue that is due.
    pub fn tick(&mut self, now_ms: u64) -> Option<Event> {
        if self.closed {
            return None;
        }
        self.scheduler.tick(now_ms)
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Tell the remote service the quest was found. Must be called inside a
    /// Tokio runtime. The request runs in the background; keep the handle
    /// and await it before the runtime goes away.
    ///
    /// # Errors
    ///
    /// Fails with [`SessionError::NotUnlocked`] before the unlock latch is
    /// set, and with [`SessionError::Closed`] after teardown.
    pub fn request_validation(
        &self,
        client: &ValidationClient,
    ) -> Result<(Event, JoinHandle<()>), SessionError> {
        if self.closed {
            return Err(SessionError::Closed);
        }
        if !self.state.unlocked {
            return Err(SessionError::NotUnlocked);
        }
        let request = client.submit(self.target.id);
        info!(quest_id = self.target.id, endpoint = %client.endpoint(), "validation requested");
        let event = Event::ValidationSent {
            quest_id: self.target.id,
            endpoint: client.endpoint().to_string(),
            at: Utc::now(),
        };
        Ok((event, request))
    }

    /// Cancel the pending cue and release the audio resource. The position
    /// subscription belongs to the caller and must be dropped first.
    /// Idempotent.
    pub fn close(&mut self) -> Vec<Event> {
        if self.closed {
            return Vec::new();
        }
        self.closed = true;
        let mut events: Vec<Event> = self.scheduler.shutdown().into_iter().collect();
        info!(
            session_id = %self.id,
            unlocked = self.state.unlocked,
            fixes = self.state.fix_count,
            "guidance session closed"
        );
        events.push(Event::SessionClosed {
            session_id: self.id,
            unlocked: self.state.unlocked,
            fixes: self.state.fix_count,
            at: Utc::now(),
        });
        events
    }
}

impl Drop for GuidanceSession {
    fn drop(&mut self) {
        self.close();
    }
}
