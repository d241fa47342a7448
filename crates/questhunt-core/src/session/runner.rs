//! Async driver for a [`GuidanceSession`].
//!
//! Multiplexes three inputs on one task: the shutdown signal, the position
//! subscription and the next cue deadline. Teardown order is fixed:
//! unsubscribe first, then close the session (cancel cue, release audio),
//! then wait for any validation request still in flight.

use std::future::Future;
use std::time::Duration;

use serde::Serialize;
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, timeout, Instant};
use tracing::{debug, warn};

use super::GuidanceSession;
use crate::events::Event;
use crate::geo::{GeoEvent, Subscription};
use crate::validation::ValidationClient;

/// Millisecond clock anchored at session start.
#[derive(Debug, Clone, Copy)]
pub struct SessionClock {
    origin: Instant,
}

impl SessionClock {
    pub fn start() -> Self {
        Self {
            origin: Instant::now(),
        }
    }

    pub fn now_ms(&self) -> u64 {
        self.origin.elapsed().as_millis() as u64
    }

    pub fn instant_at(&self, ms: u64) -> Instant {
        self.origin + Duration::from_millis(ms)
    }
}

#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Stop as soon as the quest unlocks.
    pub exit_on_unlock: bool,
    /// Send the validation notification on unlock.
    pub validator: Option<ValidationClient>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    Shutdown,
    Unlocked,
}

/// Drive `session` until `shutdown` resolves (or unlock, if asked).
///
/// Every event produced along the way, teardown events included, is passed
/// to `on_event` in order. Returns only once a validation request sent on
/// unlock has completed or hit the client timeout, so the caller may drop
/// the runtime right away.
pub async fn run_session<S, F>(
    session: &mut GuidanceSession,
    mut subscription: Subscription,
    options: RunOptions,
    shutdown: S,
    mut on_event: F,
) -> StopReason
where
    S: Future<Output = ()>,
    F: FnMut(&Event),
{
    let clock = SessionClock::start();
    tokio::pin!(shutdown);
    let mut stream_open = true;
    let mut in_flight: Option<(JoinHandle<()>, Duration)> = None;

    let reason = loop {
        let due = session.next_cue_due_ms().map(|ms| clock.instant_at(ms));

        let mut events = tokio::select! {
            biased;

            _ = &mut shutdown => break StopReason::Shutdown,

            event = subscription.recv(), if stream_open => match event {
                Some(GeoEvent::Fix(fix)) => session.on_fix(fix.coordinate, clock.now_ms()),
                Some(GeoEvent::Error(e)) => session.on_error(&e),
                Some(GeoEvent::Heading(deg)) => session.on_heading(deg).into_iter().collect(),
                None => {
                    debug!("position stream ended");
                    stream_open = false;
                    Vec::new()
                }
            },

            _ = sleep_until(due.unwrap_or_else(Instant::now)), if due.is_some() => {
                session.tick(clock.now_ms()).into_iter().collect()
            }
        };

        if let Some(validator) = options.validator.as_ref() {
            if events.iter().any(|e| matches!(e, Event::Unlocked { .. })) {
                match session.request_validation(validator) {
                    Ok((sent, request)) => {
                        events.push(sent);
                        in_flight = Some((request, validator.timeout()));
                    }
                    Err(e) => warn!(error = %e, "validation not sent"),
                }
            }
        }

        for event in &events {
            on_event(event);
        }

        if options.exit_on_unlock && session.state().unlocked {
            break StopReason::Unlocked;
        }
    };

    subscription.unsubscribe();
    for event in session.close() {
        on_event(&event);
    }
    if let Some((request, limit)) = in_flight {
        if timeout(limit, request).await.is_err() {
            warn!(?limit, "validation request still pending at shutdown");
        }
    }
    debug!(?reason, "session runner stopped");
    reason
}
