//! WGS84 coordinates.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{Error, Result};

/// Valid latitude range in degrees.
pub const LAT_RANGE: std::ops::RangeInclusive<f64> = -90.0..=90.0;

/// Valid longitude range in degrees.
pub const LNG_RANGE: std::ops::RangeInclusive<f64> = -180.0..=180.0;

/// A geographic position in degrees.
///
/// Fields are public so raw positions can be carried around before they are
/// checked; anything that groups or stores reports calls [`is_valid`](Self::is_valid)
/// first.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    /// Latitude (WGS84).
    pub lat: f64,
    /// Longitude (WGS84).
    pub lng: f64,
}

impl Coordinates {
    /// Creates validated coordinates.
    pub fn new(lat: f64, lng: f64) -> Result<Self> {
        let coords = Self { lat, lng };
        coords.validate()?;
        Ok(coords)
    }

    /// Builds coordinates from a GeoJSON `[lng, lat]` position.
    pub fn from_lng_lat(position: &[f64]) -> Result<Self> {
        match position {
            [lng, lat] => Self::new(*lat, *lng),
            [lng, lat, _altitude] => Self::new(*lat, *lng),
            _ => Err(Error::validation_field(
                "coordinates",
                format!("expected [lng, lat], got {} values", position.len()),
            )),
        }
    }

    /// Returns the GeoJSON `[lng, lat]` position.
    pub fn to_lng_lat(self) -> [f64; 2] {
        [self.lng, self.lat]
    }

    /// Returns `true` if both axes are finite and in range.
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && LAT_RANGE.contains(&self.lat)
            && LNG_RANGE.contains(&self.lng)
    }

    /// Checks [`is_valid`](Self::is_valid), naming the offending axis.
    pub fn validate(&self) -> Result<()> {
        if !self.lat.is_finite() || !LAT_RANGE.contains(&self.lat) {
            return Err(Error::validation_field(
                "lat",
                format!("latitude {} is outside [-90, 90]", self.lat),
            ));
        }
        if !self.lng.is_finite() || !LNG_RANGE.contains(&self.lng) {
            return Err(Error::validation_field(
                "lng",
                format!("longitude {} is outside [-180, 180]", self.lng),
            ));
        }
        Ok(())
    }
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6}, {:.6}", self.lat, self.lng)
    }
}
