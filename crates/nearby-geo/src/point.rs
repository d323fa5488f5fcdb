//! Latitude/longitude points.

use crate::{GeoError, Result, MAX_LATITUDE, MAX_LONGITUDE};

/// A position on the Earth's surface in degrees.
///
/// Both coordinates are always present and valid; there is no way to build a
/// half-set point.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GeoPoint {
    lat: f64,
    lon: f64,
}

impl GeoPoint {
    /// Null Island (0, 0).
    pub const ORIGIN: Self = Self { lat: 0.0, lon: 0.0 };

    /// Create a point, rejecting non-finite or out-of-range coordinates.
    pub fn new(lat: f64, lon: f64) -> Result<Self> {
        if !lat.is_finite() || lat.abs() > MAX_LATITUDE {
            return Err(GeoError::InvalidLatitude(lat));
        }
        if !lon.is_finite() || lon.abs() > MAX_LONGITUDE {
            return Err(GeoError::InvalidLongitude(lon));
        }
        Ok(Self { lat, lon })
    }

    /// Build a point from values already known to be in range.
    pub(crate) const fn new_unchecked(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Latitude in degrees.
    pub const fn lat(&self) -> f64 {
        self.lat
    }

    /// Longitude in degrees.
    pub const fn lon(&self) -> f64 {
        self.lon
    }
}

impl TryFrom<(f64, f64)> for GeoPoint {
    type Error = GeoError;

    fn try_from((lat, lon): (f64, f64)) -> Result<Self> {
        Self::new(lat, lon)
    }
}

impl From<GeoPoint> for (f64, f64) {
    fn from(p: GeoPoint) -> Self {
        (p.lat, p.lon)
    }
}

impl std::fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.6}, {:.6})", self.lat, self.lon)
    }
}
