//! Core error types for questhunt-core.
//!
//! This module defines the error hierarchy using thiserror. Only a few of
//! these ever reach the user: position errors are recorded on the session,
//! audio errors are swallowed by the feedback scheduler.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for questhunt-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// The requested quest id has no catalog entry
    #[error("Quest {id} not found")]
    TargetNotFound { id: u32 },

    /// Catalog-related errors
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Recorded track errors
    #[error("Track error: {0}")]
    Track(#[from] TrackError),

    /// Coordinate parsing errors
    #[error("Coordinate error: {0}")]
    Coordinate(#[from] CoordinateError),

    /// Session lifecycle errors
    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    /// Validation call errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors reported by a position source.
///
/// None of these stop tracking: the session records them and keeps waiting
/// for the next fix.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PositionError {
    /// No fix was delivered within the watch timeout
    #[error("no position fix within {timeout_ms} ms")]
    Timeout { timeout_ms: u64 },

    /// The platform refused access to the position
    #[error("position permission denied")]
    PermissionDenied,

    /// Signal lost (tunnel, indoors, ...)
    #[error("position signal lost")]
    SignalLost,

    /// Any other source-specific failure
    #[error("{0}")]
    Source(String),
}

impl PositionError {
    /// Map a recorded error code (as found in track files) to an error.
    pub fn from_code(code: &str) -> Self {
        match code {
            "permission_denied" => PositionError::PermissionDenied,
            "signal_lost" => PositionError::SignalLost,
            other => PositionError::Source(other.to_string()),
        }
    }
}

/// Audio cue playback errors. Always swallowed by the scheduler.
#[derive(Error, Debug)]
pub enum AudioError {
    /// Resource not loaded yet
    #[error("audio resource not ready")]
    NotReady,

    /// Resource already released
    #[error("audio resource released")]
    Released,

    /// Output device failure
    #[error("audio output failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Session lifecycle errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// Validation requested before the unlock latch was set
    #[error("quest is not unlocked yet")]
    NotUnlocked,

    /// Operation on a session that was already closed
    #[error("session already closed")]
    Closed,
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Unknown configuration key
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Config directory could not be created
    #[error("Cannot prepare config directory {path}: {source}")]
    DataDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Quest catalog errors.
#[derive(Error, Debug)]
pub enum CatalogError {
    /// Catalog contains no quest
    #[error("catalog is empty")]
    Empty,

    /// Two quests share an id
    #[error("duplicate quest id {0}")]
    DuplicateId(u32),

    /// Quest location is not a valid coordinate
    #[error("quest {id} has an invalid location: {source}")]
    InvalidLocation {
        id: u32,
        #[source]
        source: CoordinateError,
    },

    /// Failed to read the catalog file
    #[error("Failed to read catalog {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },
}

/// Recorded track errors.
#[derive(Error, Debug)]
pub enum TrackError {
    /// Failed to read or parse the track file
    #[error("Failed to load track {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Points are not in chronological order
    #[error("track point {index} goes back in time")]
    Unordered { index: usize },

    /// Point carries an invalid coordinate
    #[error("track point {index} has an invalid coordinate: {source}")]
    InvalidPoint {
        index: usize,
        #[source]
        source: CoordinateError,
    },

    /// Point lies beyond the longest replay we accept
    #[error("track point {index} at {at_ms} ms is past the {max_ms} ms replay limit")]
    TooLong { index: usize, at_ms: u64, max_ms: u64 },

    /// A generated walk needs at least one step
    #[error("a walk needs at least one step")]
    NoSteps,
}

/// Coordinate parsing and validation errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoordinateError {
    /// Text is not of the form `lat,lon`
    #[error("expected 'lat,lon', got '{0}'")]
    Format(String),

    /// NaN or infinite component
    #[error("coordinate is not finite")]
    NotFinite,

    /// Latitude outside [-90, 90] or longitude outside [-180, 180]
    #[error("coordinate out of range: {latitude}, {longitude}")]
    OutOfRange { latitude: f64, longitude: f64 },
}

/// Remote validation call errors.
#[derive(Error, Debug)]
pub enum ValidationError {
    /// Base URL cannot be joined with the endpoint path
    #[error("Invalid validation URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// HTTP client could not be built
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
