use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoordinateError;

/// A WGS-84 position in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    pub fn is_finite(&self) -> bool {
        self.latitude.is_finite() && self.longitude.is_finite()
    }

    /// Check the coordinate is finite and within latitude/longitude bounds.
    pub fn validate(&self) -> Result<(), CoordinateError> {
        if !self.is_finite() {
            return Err(CoordinateError::NotFinite);
        }
        if !(-90.0..=90.0).contains(&self.latitude) || !(-180.0..=180.0).contains(&self.longitude)
        {
            return Err(CoordinateError::OutOfRange {
                latitude: self.latitude,
                longitude: self.longitude,
            });
        }
        Ok(())
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6}, {:.6}", self.latitude, self.longitude)
    }
}

/// Parses `"lat,lon"` (whitespace around either part is allowed).
impl FromStr for Coordinate {
    type Err = CoordinateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (lat, lon) = s
            .split_once(',')
            .ok_or_else(|| CoordinateError::Format(s.to_string()))?;
        let latitude = lat
            .trim()
            .parse::<f64>()
            .map_err(|_| CoordinateError::Format(s.to_string()))?;
        let longitude = lon
            .trim()
            .parse::<f64>()
            .map_err(|_| CoordinateError::Format(s.to_string()))?;
        let coord = Coordinate::new(latitude, longitude);
        coord.validate()?;
        Ok(coord)
    }
}
