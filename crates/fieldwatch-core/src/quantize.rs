//! Coordinate quantization into cluster keys.
//!
//! Each axis is rounded independently to [`CLUSTER_PRECISION`] decimal places
//! (about 0.11 m of latitude) and stored as a fixed-point integer, so keys
//! hash and compare exactly and never go through string formatting.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::types::Coordinates;

/// Decimal places kept by the quantizer.
pub const CLUSTER_PRECISION: u32 = 6;

const SCALE: f64 = 1_000_000.0;

/// Rounds one axis to fixed-point micro-degrees.
pub fn quantize(degrees: f64) -> i64 {
    // Finite inputs are bounded by +/-180, so the scaled value fits easily.
    (degrees * SCALE).round() as i64
}

/// Grouping key of a cluster: both axes in micro-degrees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ClusterKey {
    /// Latitude in micro-degrees.
    pub lat_e6: i64,
    /// Longitude in micro-degrees.
    pub lng_e6: i64,
}

impl ClusterKey {
    /// Quantizes a position. Returns `None` for invalid coordinates.
    ///
    /// # Examples
    ///
    /// ```
    /// use fieldwatch_core::{ClusterKey, Coordinates};
    ///
    /// let a = ClusterKey::from_coordinates(&Coordinates { lat: 28.123456789, lng: 79.1 });
    /// let b = ClusterKey::from_coordinates(&Coordinates { lat: 28.123457, lng: 79.1 });
    /// assert_eq!(a, b);
    /// ```
    pub fn from_coordinates(coordinates: &Coordinates) -> Option<Self> {
        if !coordinates.is_valid() {
            return None;
        }
        Some(Self {
            lat_e6: quantize(coordinates.lat),
            lng_e6: quantize(coordinates.lng),
        })
    }

    /// The representative (rounded) position of the key.
    pub fn location(&self) -> Coordinates {
        Coordinates {
            lat: self.lat_e6 as f64 / SCALE,
            lng: self.lng_e6 as f64 / SCALE,
        }
    }
}

impl fmt::Display for ClusterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let location = self.location();
        write!(f, "{:.6},{:.6}", location.lat, location.lng)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn key(lat: f64, lng: f64) -> ClusterKey {
        ClusterKey::from_coordinates(&Coordinates { lat, lng }).unwrap()
    }

    #[test]
    fn test_sub_threshold_differences_collapse() {
        assert_eq!(key(28.1, 79.1), key(28.1000001, 79.1));
        assert_eq!(key(28.123456789, 79.1), key(28.123457, 79.1));
        assert_eq!(key(28.0, 79.0), key(28.0000001, 79.0000001));
    }

    #[test]
    fn test_distinct_positions_stay_apart() {
        assert_ne!(key(28.1, 79.1), key(28.2, 79.1));
        assert_ne!(key(28.000001, 79.0), key(28.000002, 79.0));
    }

    #[test]
    fn test_axes_quantized_independently() {
        assert_ne!(key(28.0, 79.0), key(28.0, 79.000001));
        assert_ne!(key(28.0, 79.0), key(28.000001, 79.0));
    }

    #[test]
    fn test_negative_coordinates() {
        let k = key(-33.8688197, 151.2092957);
        assert_eq!(k.lat_e6, -33_868_820);
        assert_eq!(k.lng_e6, 151_209_296);
    }

    #[test]
    fn test_invalid_coordinates_have_no_key() {
        assert!(ClusterKey::from_coordinates(&Coordinates { lat: f64::NAN, lng: 0.0 }).is_none());
        assert!(ClusterKey::from_coordinates(&Coordinates { lat: 95.0, lng: 0.0 }).is_none());
    }

    #[test]
    fn test_location_and_display() {
        let k = key(28.123456789, 79.1);
        let loc = k.location();
        assert!((loc.lat - 28.123457).abs() < 1e-9);
        assert_eq!(k.to_string(), "28.123457,79.100000");
    }
}
