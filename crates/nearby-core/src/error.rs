//! Error types for the Nearby core.

use thiserror::Error;

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while validating inbound participant data.
///
/// Registry and resolver operations never fail; these only come from
/// constructing the values they take.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// Registration without a handle (no consent)
    #[error("a handle is required to share your location")]
    EmptyHandle,

    /// Only one of latitude/longitude was supplied
    #[error("position requires both latitude and longitude")]
    PartialPosition,

    /// Coordinates out of range
    #[error("invalid position: {0}")]
    Geo(#[from] nearby_geo::GeoError),
}
