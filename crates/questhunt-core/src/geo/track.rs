//! Recorded tracks.
//!
//! A track is a JSON document listing timed readings:
//!
//! ```json
//! { "points": [
//!     { "at_ms": 0,    "latitude": 50.6740, "longitude": 3.1468 },
//!     { "at_ms": 2000, "latitude": 50.6745, "longitude": 3.1468, "age_ms": 1500 },
//!     { "at_ms": 4000, "error": "signal_lost" },
//!     { "at_ms": 4500, "heading": 12.0 }
//! ] }
//! ```
//!
//! [`TrackSource`] replays it in real time (relative to the moment the watch
//! starts).

use std::path::Path;

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio::time::{Duration, Instant};

use tracing::warn;

use super::stream::{GeoEvent, PositionFix, PositionSource, Subscription, WatchOptions};
use super::Coordinate;
use crate::error::{PositionError, TrackError};

/// What happened at a point in time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TrackReading {
    Fix {
        latitude: f64,
        longitude: f64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        accuracy_m: Option<f64>,
        #[serde(default)]
        age_ms: u64,
    },
    Error {
        error: String,
    },
    Heading {
        heading: f64,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackPoint {
    /// Offset from the start of the replay.
    pub at_ms: u64,
    #[serde(flatten)]
    pub reading: TrackReading,
}

impl TrackPoint {
    fn to_event(&self) -> GeoEvent {
        match &self.reading {
            TrackReading::Fix {
                latitude,
                longitude,
                accuracy_m,
                age_ms,
            } => GeoEvent::Fix(PositionFix {
                coordinate: Coordinate::new(*latitude, *longitude),
                accuracy_m: *accuracy_m,
                age_ms: *age_ms,
            }),
            TrackReading::Error { error } => GeoEvent::Error(PositionError::from_code(error)),
            TrackReading::Heading { heading } => GeoEvent::Heading(*heading),
        }
    }
}

/// Longest replay accepted: one week.
pub const MAX_TRACK_DURATION_MS: u64 = 7 * 24 * 60 * 60 * 1000;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Track {
    pub points: Vec<TrackPoint>,
}

impl Track {
    /// Load and validate a track file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, if points are
    /// out of order, or if a fix carries an invalid coordinate.
    pub fn load(path: &Path) -> Result<Self, TrackError> {
        let content = std::fs::read_to_string(path).map_err(|e| TrackError::LoadFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let track: Track = serde_json::from_str(&content).map_err(|e| TrackError::LoadFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        track.validate()?;
        Ok(track)
    }

    pub fn validate(&self) -> Result<(), TrackError> {
        let mut last = 0;
        for (index, point) in self.points.iter().enumerate() {
            if point.at_ms < last {
                return Err(TrackError::Unordered { index });
            }
            if point.at_ms > MAX_TRACK_DURATION_MS {
                return Err(TrackError::TooLong {
                    index,
                    at_ms: point.at_ms,
                    max_ms: MAX_TRACK_DURATION_MS,
                });
            }
            last = point.at_ms;
            if let TrackReading::Fix {
                latitude,
                longitude,
                ..
            } = point.reading
            {
                Coordinate::new(latitude, longitude)
                    .validate()
                    .map_err(|source| TrackError::InvalidPoint { index, source })?;
            }
        }
        Ok(())
    }

    /// A straight walk from `from` to `to`: `steps + 1` evenly spaced fixes,
    /// one every `interval_ms`, both endpoints included.
    pub fn straight_walk(
        from: Coordinate,
        to: Coordinate,
        steps: u32,
        interval_ms: u64,
    ) -> Result<Self, TrackError> {
        if steps == 0 {
            return Err(TrackError::NoSteps);
        }
        let points = (0..=steps)
            .map(|i| {
                let t = f64::from(i) / f64::from(steps);
                TrackPoint {
                    at_ms: u64::from(i).saturating_mul(interval_ms),
                    reading: TrackReading::Fix {
                        latitude: from.latitude + (to.latitude - from.latitude) * t,
                        longitude: from.longitude + (to.longitude - from.longitude) * t,
                        accuracy_m: None,
                        age_ms: 0,
                    },
                }
            })
            .collect();
        let track = Self { points };
        track.validate()?;
        Ok(track)
    }

    /// Replay duration (timestamp of the last point).
    pub fn duration_ms(&self) -> u64 {
        self.points.last().map(|p| p.at_ms).unwrap_or(0)
    }
}

/// Replays a [`Track`] in real time.
pub struct TrackSource {
    track: Track,
}

impl TrackSource {
    pub fn new(track: Track) -> Self {
        Self { track }
    }
}

impl PositionSource for TrackSource {
    fn watch(self, options: WatchOptions) -> Subscription {
        let (raw_tx, raw_rx) = mpsc::channel(self.track.points.len().max(1));
        let origin = Instant::now();
        let producer = tokio::spawn(async move {
            for point in &self.track.points {
                let Some(at) = origin.checked_add(Duration::from_millis(point.at_ms)) else {
                    warn!(at_ms = point.at_ms, "track point out of clock range, replay stopped");
                    break;
                };
                tokio::time::sleep_until(at).await;
                if raw_tx.send(point.to_event()).await.is_err() {
                    break;
                }
            }
        });
        Subscription::supervise(raw_rx, options, vec![producer])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{ "points": [
        { "at_ms": 0, "latitude": 50.6740, "longitude": 3.1468 },
        { "at_ms": 1000, "latitude": 50.6745, "longitude": 3.1468, "accuracy_m": 4.5 },
        { "at_ms": 2000, "error": "signal_lost" },
        { "at_ms": 2500, "heading": 12.0 }
    ] }"#;

    #[test]
    fn parses_all_reading_kinds() {
        let track: Track = serde_json::from_str(SAMPLE).unwrap();
        assert_eq!(track.points.len(), 4);
        assert!(matches!(track.points[1].reading, TrackReading::Fix { accuracy_m: Some(a), .. } if a == 4.5));
        assert_eq!(
            track.points[2].reading,
            TrackReading::Error {
                error: "signal_lost".into()
            }
        );
        assert_eq!(track.points[3].reading, TrackReading::Heading { heading: 12.0 });
        assert_eq!(track.duration_ms(), 2500);
    }

    #[test]
    fn rejects_points_out_of_order() {
        let mut track: Track = serde_json::from_str(SAMPLE).unwrap();
        track.points.swap(0, 1);
        assert!(matches!(track.validate(), Err(TrackError::Unordered { index: 1 })));
    }

    #[test]
    fn rejects_points_past_replay_limit() {
        let json = r#"{ "points": [
            { "at_ms": 0, "latitude": 50.6740, "longitude": 3.1468 },
            { "at_ms": 18446744073709551615, "latitude": 50.6745, "longitude": 3.1468 }
        ] }"#;
        let track: Track = serde_json::from_str(json).unwrap();
        assert!(matches!(
            track.validate(),
            Err(TrackError::TooLong { index: 1, at_ms: u64::MAX, .. })
        ));

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("far.json");
        std::fs::write(&path, json).unwrap();
        assert!(matches!(Track::load(&path), Err(TrackError::TooLong { .. })));
    }

    #[test]
    fn straight_walk_rejects_overlong_interval() {
        let from = Coordinate::new(50.0, 3.0);
        let to = Coordinate::new(50.001, 3.0);
        assert!(matches!(
            Track::straight_walk(from, to, 4, u64::MAX / 2),
            Err(TrackError::TooLong { .. })
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn replay_stops_at_unreachable_point() {
        let track = Track {
            points: vec![
                TrackPoint {
                    at_ms: 0,
                    reading: TrackReading::Heading { heading: 10.0 },
                },
                TrackPoint {
                    at_ms: u64::MAX,
                    reading: TrackReading::Heading { heading: 20.0 },
                },
            ],
        };
        let mut sub = TrackSource::new(track).watch(WatchOptions::default());
        assert_eq!(sub.recv().await, Some(GeoEvent::Heading(10.0)));
        // The producer gives up instead of panicking; the stream reports silence.
        assert!(matches!(
            sub.recv().await,
            Some(GeoEvent::Error(PositionError::Timeout { .. }))
        ));
    }

    #[test]
    fn load_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("walk.json");
        std::fs::write(&path, SAMPLE).unwrap();
        let track = Track::load(&path).unwrap();
        assert_eq!(track.points.len(), 4);
    }

    #[test]
    fn load_reports_bad_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(Track::load(&path), Err(TrackError::LoadFailed { .. })));
    }

    #[test]
    fn straight_walk_includes_both_ends() {
        let from = Coordinate::new(50.0, 3.0);
        let to = Coordinate::new(50.01, 3.0);
        let track = Track::straight_walk(from, to, 4, 1000).unwrap();
        assert_eq!(track.points.len(), 5);
        assert_eq!(track.duration_ms(), 4000);
        assert_eq!(
            track.points[4].reading,
            TrackReading::Fix {
                latitude: 50.01,
                longitude: 3.0,
                accuracy_m: None,
                age_ms: 0
            }
        );
    }

    #[test]
    fn straight_walk_needs_steps() {
        let c = Coordinate::new(0.0, 0.0);
        assert!(matches!(Track::straight_walk(c, c, 0, 1000), Err(TrackError::NoSteps)));
    }

    #[tokio::test(start_paused = true)]
    async fn replay_follows_timestamps() {
        let track: Track = serde_json::from_str(SAMPLE).unwrap();
        let start = Instant::now();
        let mut sub = TrackSource::new(track).watch(WatchOptions::default());

        assert!(matches!(sub.recv().await, Some(GeoEvent::Fix(_))));
        assert!(matches!(sub.recv().await, Some(GeoEvent::Fix(_))));
        assert!(start.elapsed() >= Duration::from_millis(1000));
        assert_eq!(sub.recv().await, Some(GeoEvent::Error(PositionError::SignalLost)));
        assert_eq!(sub.recv().await, Some(GeoEvent::Heading(12.0)));
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_millis(2500) && elapsed < Duration::from_millis(2600));
    }
}
