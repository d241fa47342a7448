//! Audio cadence scheduler.
//!
//! A wall-clock state machine with a single pending cue. It has no thread
//! and no timer of its own: the caller passes the current time to every
//! command and calls `tick()` when `next_due_ms()` is reached.
//!
//! ## State Transitions
//!
//! ```text
//! Idle --set_tier(bip_rate > 0)--> Active(tier) --tick--> Active(tier)
//!   ^                                   |
//!   +---- set_tier(other) / shutdown ---+
//! ```
//!
//! Every tier change cancels the pending cue before anything else happens.
//! While active, cues are due on a fixed grid anchored at the activation
//! time (`anchor + n * period`), so late ticks do not accumulate drift. A
//! tick that arrives several slots late plays one cue, not a burst.

use chrono::Utc;
use serde::Serialize;
use tracing::debug;

use super::audio::AudioCue;
use crate::events::Event;
use crate::proximity::ProximityTier;

/// Cadence window in milliseconds: a tier with `bip_rate = n` plays `n`
/// cues per window.
pub const DEFAULT_CADENCE_BASE_MS: u64 = 1200;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SchedulerState {
    Idle,
    Active,
}

/// The one scheduled cue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PendingCue {
    anchor_ms: u64,
    period_ms: u64,
    slot: u64,
}

impl PendingCue {
    fn due_ms(&self) -> u64 {
        self.anchor_ms
            .saturating_add(self.slot.saturating_mul(self.period_ms))
    }
}

pub struct FeedbackScheduler {
    audio: Box<dyn AudioCue>,
    cadence_base_ms: u64,
    tier: Option<&'static ProximityTier>,
    pending: Option<PendingCue>,
    cues_played: u64,
    released: bool,
}

impl FeedbackScheduler {
    pub fn new(audio: Box<dyn AudioCue>, cadence_base_ms: u64) -> Self {
        Self {
            audio,
            cadence_base_ms: cadence_base_ms.max(1),
            tier: None,
            pending: None,
            cues_played: 0,
            released: false,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> SchedulerState {
        if self.pending.is_some() {
            SchedulerState::Active
        } else {
            SchedulerState::Idle
        }
    }

    /// Tier the scheduler is currently following.
    pub fn tier(&self) -> Option<&'static ProximityTier> {
        self.tier
    }

    /// When the pending cue is due, if any.
    pub fn next_due_ms(&self) -> Option<u64> {
        self.pending.map(|p| p.due_ms())
    }

    pub fn period_ms(&self) -> Option<u64> {
        self.pending.map(|p| p.period_ms)
    }

    pub fn cues_played(&self) -> u64 {
        self.cues_played
    }

    pub fn is_released(&self) -> bool {
        self.released
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Follow `tier` from `now_ms`. Same tier as before is a no-op.
    pub fn set_tier(&mut self, tier: &'static ProximityTier, now_ms: u64) -> Vec<Event> {
        let mut events = Vec::new();
        if self.released || self.tier.map(|t| t.name) == Some(tier.name) {
            return events;
        }

        events.extend(self.cancel());
        self.tier = Some(tier);

        let Some(period_ms) = tier.cue_period_ms(self.cadence_base_ms) else {
            debug!(tier = tier.name, "scheduler idle");
            return events;
        };

        events.push(self.play(tier, period_ms));
        self.pending = Some(PendingCue {
            anchor_ms: now_ms,
            period_ms,
            slot: 1,
        });
        debug!(tier = tier.name, period_ms, "scheduler active");
        events
    }

    /// Play the pending cue if it is due and schedule the next one.
    pub fn tick(&mut self, now_ms: u64) -> Option<Event> {
        let pending = self.pending?;
        if self.released || now_ms < pending.due_ms() {
            return None;
        }
        let tier = self.tier?;

        let event = self.play(tier, pending.period_ms);

        let elapsed_slots = (now_ms - pending.anchor_ms) / pending.period_ms;
        let next_slot = elapsed_slots + 1;
        if next_slot > pending.slot + 1 {
            debug!(
                skipped = next_slot - pending.slot - 1,
                "coalesced late cues"
            );
        }
        self.pending = Some(PendingCue {
            slot: next_slot,
            ..pending
        });
        Some(event)
    }

    /// Cancel the pending cue and release the audio resource. Idempotent;
    /// nothing plays afterwards.
    pub fn shutdown(&mut self) -> Option<Event> {
        if self.released {
            return None;
        }
        let cancelled = self.cancel();
        self.audio.stop();
        self.audio.release();
        self.released = true;
        debug!(cues_played = self.cues_played, "scheduler released");
        cancelled
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn cancel(&mut self) -> Option<Event> {
        let pending = self.pending.take()?;
        let tier = self.tier.map(|t| t.name).unwrap_or_default();
        debug!(tier, due_ms = pending.due_ms(), "cue cancelled");
        Some(Event::CueCancelled {
            tier: tier.to_string(),
            due_ms: pending.due_ms(),
            at: Utc::now(),
        })
    }

    fn play(&mut self, tier: &ProximityTier, period_ms: u64) -> Event {
        let result = self.audio.rewind().and_then(|_| self.audio.play());
        let delivered = match result {
            Ok(()) => true,
            Err(e) => {
                debug!(error = %e, "cue playback failed");
                false
            }
        };
        self.cues_played += 1;
        Event::CuePlayed {
            tier: tier.name.to_string(),
            period_ms,
            delivered,
            at: Utc::now(),
        }
    }
}

impl Drop for FeedbackScheduler {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AudioError;
    use crate::proximity::tier::by_name;
    use std::sync::{Arc, Mutex};

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        Rewind,
        Play,
        Stop,
        Release,
    }

    #[derive(Default, Clone)]
    struct RecordingCue {
        calls: Arc<Mutex<Vec<Call>>>,
        fail: bool,
    }

    impl RecordingCue {
        fn plays(&self) -> usize {
            self.calls
                .lock()
                .unwrap()
                .iter()
                .filter(|c| **c == Call::Play)
                .count()
        }
    }

    impl AudioCue for RecordingCue {
        fn rewind(&mut self) -> Result<(), AudioError> {
            self.calls.lock().unwrap().push(Call::Rewind);
            Ok(())
        }

        fn play(&mut self) -> Result<(), AudioError> {
            self.calls.lock().unwrap().push(Call::Play);
            if self.fail {
                Err(AudioError::NotReady)
            } else {
                Ok(())
            }
        }

        fn stop(&mut self) {
            self.calls.lock().unwrap().push(Call::Stop);
        }

        fn release(&mut self) {
            self.calls.lock().unwrap().push(Call::Release);
        }
    }

    fn scheduler(cue: &RecordingCue) -> FeedbackScheduler {
        FeedbackScheduler::new(Box::new(cue.clone()), DEFAULT_CADENCE_BASE_MS)
    }

    #[test]
    fn silent_tier_stays_idle() {
        let cue = RecordingCue::default();
        let mut s = scheduler(&cue);
        let events = s.set_tier(by_name("Froid").unwrap(), 0);
        assert!(events.is_empty());
        assert_eq!(s.state(), SchedulerState::Idle);
        assert_eq!(s.next_due_ms(), None);
        assert_eq!(cue.plays(), 0);
    }

    #[test]
    fn active_tier_plays_immediately_then_every_period() {
        let cue = RecordingCue::default();
        let mut s = scheduler(&cue);
        s.set_tier(by_name("Très chaud").unwrap(), 1_000);

        assert_eq!(s.state(), SchedulerState::Active);
        assert_eq!(s.period_ms(), Some(400));
        assert_eq!(cue.plays(), 1);
        assert_eq!(s.next_due_ms(), Some(1_400));

        assert!(s.tick(1_399).is_none());
        assert!(s.tick(1_400).is_some());
        assert_eq!(s.next_due_ms(), Some(1_800));
        assert!(s.tick(1_800).is_some());
        assert!(s.tick(2_200).is_some());
        assert_eq!(cue.plays(), 4);
    }

    #[test]
    fn each_cue_rewinds_first() {
        let cue = RecordingCue::default();
        let mut s = scheduler(&cue);
        s.set_tier(by_name("Chaud").unwrap(), 0);
        s.tick(600);
        let calls = cue.calls.lock().unwrap().clone();
        assert_eq!(calls, vec![Call::Rewind, Call::Play, Call::Rewind, Call::Play]);
    }

    #[test]
    fn late_tick_plays_once_and_stays_on_grid() {
        let cue = RecordingCue::default();
        let mut s = scheduler(&cue);
        s.set_tier(by_name("Brûlant").unwrap(), 0); // 300 ms

        assert!(s.tick(1_000).is_some());
        assert_eq!(cue.plays(), 2);
        assert_eq!(s.next_due_ms(), Some(1_200));
    }

    #[test]
    fn same_tier_does_not_restart_cadence() {
        let cue = RecordingCue::default();
        let mut s = scheduler(&cue);
        let tier = by_name("Tiède").unwrap();
        s.set_tier(tier, 0);
        assert!(s.set_tier(tier, 500).is_empty());
        assert_eq!(s.next_due_ms(), Some(1_200));
        assert_eq!(cue.plays(), 1);
    }

    #[test]
    fn tier_change_cancels_before_rescheduling() {
        let cue = RecordingCue::default();
        let mut s = scheduler(&cue);
        s.set_tier(by_name("Tiède").unwrap(), 0);

        let events = s.set_tier(by_name("Chaud").unwrap(), 700);
        assert!(matches!(
            events.as_slice(),
            [Event::CueCancelled { due_ms: 1_200, .. }, Event::CuePlayed { period_ms: 600, .. }]
        ));
        assert_eq!(s.next_due_ms(), Some(1_300));

        // Moving to a silent tier only cancels.
        let events = s.set_tier(by_name("Froid").unwrap(), 800);
        assert!(matches!(events.as_slice(), [Event::CueCancelled { .. }]));
        assert_eq!(s.state(), SchedulerState::Idle);
        assert!(s.tick(5_000).is_none());
    }

    #[test]
    fn at_most_one_pending_cue_across_changes() {
        let cue = RecordingCue::default();
        let mut s = scheduler(&cue);
        let sequence = ["Tiède", "Chaud", "Très chaud", "Brûlant", "Chaud", "Froid", "Tiède"];
        let mut now = 0;
        for name in sequence {
            let had_pending = s.next_due_ms().is_some();
            let events = s.set_tier(by_name(name).unwrap(), now);
            let cancels = events
                .iter()
                .filter(|e| matches!(e, Event::CueCancelled { .. }))
                .count();
            assert_eq!(cancels, usize::from(had_pending));
            if let (Some(Event::CueCancelled { .. }), Some(_)) = (events.first(), events.get(1)) {
                assert!(matches!(events[1], Event::CuePlayed { .. }));
            }
            now += 250;
            s.tick(now);
        }
    }

    #[test]
    fn playback_failure_keeps_schedule() {
        let cue = RecordingCue {
            fail: true,
            ..Default::default()
        };
        let mut s = scheduler(&cue);
        let events = s.set_tier(by_name("Chaud").unwrap(), 0);
        assert!(matches!(events[0], Event::CuePlayed { delivered: false, .. }));
        assert!(matches!(s.tick(600), Some(Event::CuePlayed { delivered: false, .. })));
        assert_eq!(s.next_due_ms(), Some(1_200));
    }

    #[test]
    fn shutdown_releases_and_silences() {
        let cue = RecordingCue::default();
        let mut s = scheduler(&cue);
        s.set_tier(by_name("Chaud").unwrap(), 0);

        assert!(matches!(s.shutdown(), Some(Event::CueCancelled { .. })));
        assert!(s.shutdown().is_none());
        assert!(s.tick(10_000).is_none());
        assert!(s.set_tier(by_name("Brûlant").unwrap(), 10_000).is_empty());

        let calls = cue.calls.lock().unwrap().clone();
        assert_eq!(&calls[calls.len() - 2..], &[Call::Stop, Call::Release]);
        assert_eq!(cue.plays(), 1);
    }
}
