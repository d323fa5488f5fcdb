//! Great-circle distance and projection on a spherical Earth.

use crate::{GeoPoint, EARTH_RADIUS_METERS, MAX_LATITUDE};

/// Haversine great-circle distance between two points, in meters.
///
/// Symmetric in its arguments and never negative.
pub fn haversine_meters(a: GeoPoint, b: GeoPoint) -> f64 {
    let d_lat = (b.lat() - a.lat()).to_radians();
    let d_lon = (b.lon() - a.lon()).to_radians();
    let lat1 = a.lat().to_radians();
    let lat2 = b.lat().to_radians();

    let h = (d_lat / 2.0).sin().powi(2)
        + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
    // Rounding can push h a hair past 1 for antipodal points
    let h = h.min(1.0);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());
    EARTH_RADIUS_METERS * c
}

/// Point reached by travelling `distance_meters` from `origin` along the
/// initial bearing `bearing_degrees` (0 = north, 90 = east).
pub fn destination(origin: GeoPoint, bearing_degrees: f64, distance_meters: f64) -> GeoPoint {
    let delta = distance_meters / EARTH_RADIUS_METERS;
    let theta = bearing_degrees.to_radians();
    let phi1 = origin.lat().to_radians();
    let lambda1 = origin.lon().to_radians();

    let phi2 = (phi1.sin() * delta.cos() + phi1.cos() * delta.sin() * theta.cos()).asin();
    let lambda2 = lambda1
        + (theta.sin() * delta.sin() * phi1.cos()).atan2(delta.cos() - phi1.sin() * phi2.sin());

    let lat = phi2.to_degrees().clamp(-MAX_LATITUDE, MAX_LATITUDE);
    // Wrap into [-180, 180)
    let lon = (lambda2.to_degrees() + 540.0) % 360.0 - 180.0;
    GeoPoint::new_unchecked(lat, lon)
}
