//! Proximity matching configuration.

use std::time::Duration;

/// Default proximity radius in meters.
pub const DEFAULT_RADIUS_METERS: f64 = 100.0;

/// Default staleness threshold.
pub const DEFAULT_STALE_AFTER: Duration = Duration::from_millis(60_000);

/// Tunables for the proximity resolver.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProximityConfig {
    /// Maximum distance (inclusive, after rounding) to count as nearby
    pub radius_meters: f64,
    /// Reports older than this are ignored
    pub stale_after: Duration,
}

impl Default for ProximityConfig {
    fn default() -> Self {
        Self {
            radius_meters: DEFAULT_RADIUS_METERS,
            stale_after: DEFAULT_STALE_AFTER,
        }
    }
}

impl ProximityConfig {
    /// Override the radius.
    pub fn with_radius(mut self, radius_meters: f64) -> Self {
        self.radius_meters = radius_meters;
        self
    }

    /// Override the staleness threshold.
    pub fn with_stale_after(mut self, stale_after: Duration) -> Self {
        self.stale_after = stale_after;
        self
    }

    /// Staleness threshold in milliseconds.
    pub fn stale_after_millis(&self) -> u64 {
        self.stale_after.as_millis() as u64
    }
}
