//! Continuous position stream.
//!
//! A [`PositionSource`] is turned into a [`Subscription`] by `watch()`. The
//! subscription pushes [`GeoEvent`]s until it is unsubscribed (explicitly or
//! by drop); it never ends on its own. Watch options are enforced by a
//! supervisor task sitting between the source and the subscriber:
//!
//! ```text
//! source task --raw--> supervisor (max age, timeout) --events--> Subscription
//! ```
//!
//! Both tasks are spawned on the current tokio runtime, so `watch()` must be
//! called from inside one.

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Duration, Instant};
use tracing::debug;

use super::Coordinate;
use crate::error::PositionError;

const CHANNEL_CAPACITY: usize = 64;

/// One position reading.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PositionFix {
    pub coordinate: Coordinate,
    /// Reported horizontal accuracy in meters, when the source knows it.
    #[serde(default)]
    pub accuracy_m: Option<f64>,
    /// How old the reading already is when delivered (cached fixes).
    #[serde(default)]
    pub age_ms: u64,
}

impl PositionFix {
    pub fn fresh(coordinate: Coordinate) -> Self {
        Self {
            coordinate,
            accuracy_m: None,
            age_ms: 0,
        }
    }
}

/// Everything a subscription can deliver.
#[derive(Debug, Clone, PartialEq)]
pub enum GeoEvent {
    Fix(PositionFix),
    Error(PositionError),
    /// Device compass heading in degrees (0 = north).
    Heading(f64),
}

/// Watch configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatchOptions {
    /// Ask the platform for its most precise fix. Recorded sources ignore it.
    #[serde(default = "default_true")]
    pub high_accuracy: bool,
    /// Fixes older than this are discarded instead of delivered.
    #[serde(default = "default_max_cached_fix_age_ms")]
    pub max_cached_fix_age_ms: u64,
    /// Report a timeout error when no fix arrives within this window.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_true() -> bool {
    true
}
fn default_max_cached_fix_age_ms() -> u64 {
    1000
}
fn default_timeout_ms() -> u64 {
    5000
}

impl Default for WatchOptions {
    fn default() -> Self {
        Self {
            high_accuracy: true,
            max_cached_fix_age_ms: default_max_cached_fix_age_ms(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

/// A producer of position readings.
pub trait PositionSource {
    /// Start streaming. The source is consumed; a new watch needs a new source.
    fn watch(self, options: WatchOptions) -> Subscription;
}

/// Handle on a running watch.
///
/// `unsubscribe()` is idempotent, stops both tasks and drops anything still
/// buffered, so no event is observed afterwards. Dropping the handle does the
/// same.
pub struct Subscription {
    rx: Option<mpsc::Receiver<GeoEvent>>,
    tasks: Vec<JoinHandle<()>>,
}

impl Subscription {
    /// Wire a raw reading channel through the supervisor.
    ///
    /// `producers` are the source's own tasks; they are aborted on unsubscribe.
    pub fn supervise(
        raw: mpsc::Receiver<GeoEvent>,
        options: WatchOptions,
        producers: Vec<JoinHandle<()>>,
    ) -> Self {
        debug!(
            high_accuracy = options.high_accuracy,
            max_cached_fix_age_ms = options.max_cached_fix_age_ms,
            timeout_ms = options.timeout_ms,
            "position watch started"
        );
        let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
        let mut tasks = producers;
        tasks.push(tokio::spawn(run_supervisor(raw, tx, options)));
        Self {
            rx: Some(rx),
            tasks,
        }
    }

    /// Next event. Returns `None` once unsubscribed.
    pub async fn recv(&mut self) -> Option<GeoEvent> {
        match self.rx.as_mut() {
            Some(rx) => rx.recv().await,
            None => None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.rx.is_some()
    }

    pub fn unsubscribe(&mut self) {
        for task in self.tasks.drain(..) {
            task.abort();
        }
        if let Some(mut rx) = self.rx.take() {
            rx.close();
            debug!("position watch stopped");
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}

async fn run_supervisor(
    mut raw: mpsc::Receiver<GeoEvent>,
    tx: mpsc::Sender<GeoEvent>,
    options: WatchOptions,
) {
    let timeout = Duration::from_millis(options.timeout_ms.max(1));
    let mut deadline = Instant::now() + timeout;
    let mut raw_open = true;

    loop {
        let next = if raw_open {
            match tokio::time::timeout_at(deadline, raw.recv()).await {
                Ok(Some(event)) => Some(event),
                Ok(None) => {
                    // Source exhausted: keep reporting timeouts until unsubscribed.
                    raw_open = false;
                    continue;
                }
                Err(_) => None,
            }
        } else {
            tokio::time::sleep_until(deadline).await;
            None
        };

        let event = match next {
            Some(GeoEvent::Fix(fix)) if fix.age_ms > options.max_cached_fix_age_ms => {
                debug!(age_ms = fix.age_ms, "discarding stale fix");
                continue;
            }
            Some(GeoEvent::Fix(fix)) => {
                deadline = Instant::now() + timeout;
                GeoEvent::Fix(fix)
            }
            Some(other) => other,
            None => {
                deadline = Instant::now() + timeout;
                GeoEvent::Error(PositionError::Timeout {
                    timeout_ms: options.timeout_ms,
                })
            }
        };

        if tx.send(event).await.is_err() {
            break;
        }
    }
}

/// Source fed by hand through a [`ManualFeed`]. Used for embedding the
/// engine behind another event loop, and in tests.
pub struct ManualSource {
    rx: mpsc::Receiver<GeoEvent>,
}

/// Sending half of a [`ManualSource`].
#[derive(Clone)]
pub struct ManualFeed {
    tx: mpsc::Sender<GeoEvent>,
}

/// Create a connected feed/source pair.
pub fn manual() -> (ManualFeed, ManualSource) {
    let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
    (ManualFeed { tx }, ManualSource { rx })
}

impl ManualFeed {
    /// Push an event. Returns `false` once the watch is gone.
    pub async fn send(&self, event: GeoEvent) -> bool {
        self.tx.send(event).await.is_ok()
    }

    pub async fn fix(&self, coordinate: Coordinate) -> bool {
        self.send(GeoEvent::Fix(PositionFix::fresh(coordinate))).await
    }

    pub async fn error(&self, error: PositionError) -> bool {
        self.send(GeoEvent::Error(error)).await
    }

    pub async fn heading(&self, heading_deg: f64) -> bool {
        self.send(GeoEvent::Heading(heading_deg)).await
    }
}

impl PositionSource for ManualSource {
    fn watch(self, options: WatchOptions) -> Subscription {
        Subscription::supervise(self.rx, options, Vec::new())
    }
}
