//! Nearby Geographic Primitives
//!
//! Latitude/longitude points and great-circle distance on a spherical Earth.
//!
//! # Model
//!
//! The Earth is treated as a sphere of mean radius 6,371,000 m. Distances use
//! the haversine formula in its `atan2` form, which stays well conditioned for
//! the short (sub-kilometre) separations the proximity service cares about.
//!
//! Coordinates are degrees. A [`GeoPoint`] can only be built from finite
//! values inside the valid ranges, so every point that reaches the distance
//! functions is well formed.

mod point;
mod distance;

pub use point::GeoPoint;
pub use distance::{haversine_meters, destination};

use thiserror::Error;

/// Mean Earth radius in meters.
pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// Latitude bound in degrees (inclusive).
pub const MAX_LATITUDE: f64 = 90.0;

/// Longitude bound in degrees (inclusive).
pub const MAX_LONGITUDE: f64 = 180.0;

/// Errors produced when constructing geographic values.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum GeoError {
    /// Latitude is not finite or lies outside [-90, 90].
    #[error("invalid latitude: {0}")]
    InvalidLatitude(f64),

    /// Longitude is not finite or lies outside [-180, 180].
    #[error("invalid longitude: {0}")]
    InvalidLongitude(f64),
}

/// Result type for geographic operations.
pub type Result<T> = std::result::Result<T, GeoError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_messages_name_the_axis() {
        assert_eq!(
            GeoError::InvalidLatitude(91.0).to_string(),
            "invalid latitude: 91"
        );
        assert_eq!(
            GeoError::InvalidLongitude(-181.5).to_string(),
            "invalid longitude: -181.5"
        );
    }
}
