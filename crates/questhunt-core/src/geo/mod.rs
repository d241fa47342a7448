//! Geographic primitives: coordinates, great-circle math, compass helpers
//! and the continuous position stream.

pub mod compass;
mod coordinate;
pub mod distance;
pub mod line;
pub mod stream;
pub mod track;

pub use compass::{cardinal, relative_bearing};
pub use coordinate::Coordinate;
pub use distance::{bearing_deg, distance_and_bearing, distance_m, EARTH_RADIUS_M};
pub use line::LineSource;
pub use stream::{
    manual, GeoEvent, ManualFeed, ManualSource, PositionFix, PositionSource, Subscription,
    WatchOptions,
};
pub use track::{Track, TrackPoint, TrackReading, TrackSource, MAX_TRACK_DURATION_MS};
