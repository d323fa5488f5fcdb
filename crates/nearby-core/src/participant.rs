//! Participant types.

use nearby_geo::GeoPoint;
use serde::Serialize;

use crate::error::{Error, Result};

/// Display name used when a participant registers without one.
pub const DEFAULT_NAME: &str = "Anonymous";

/// Unix timestamp in milliseconds.
pub type Timestamp = u64;

/// Identifier of one live connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SessionId(pub u64);

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "session-{}", self.0)
    }
}

/// The consent-bearing identifier a participant shares with others.
///
/// Never empty: a participant without a handle cannot be registered.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Handle(String);

impl Handle {
    /// Create a handle from user input, trimming surrounding whitespace.
    pub fn new(raw: impl AsRef<str>) -> Result<Self> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(Error::EmptyHandle);
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Get the handle as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Handle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Current profile of a registered participant.
#[derive(Debug, Clone, PartialEq)]
pub struct Participant {
    /// Display name.
    pub name: String,
    /// Shared handle.
    pub handle: Handle,
    /// Last reported position, if any.
    pub position: Option<GeoPoint>,
    /// Time of the last location report.
    pub last_seen: Timestamp,
}

impl Participant {
    /// Create a participant, substituting [`DEFAULT_NAME`] for a blank name.
    pub fn new(
        name: Option<&str>,
        handle: Handle,
        position: Option<GeoPoint>,
        last_seen: Timestamp,
    ) -> Self {
        let name = match name.map(str::trim) {
            Some(n) if !n.is_empty() => n.to_string(),
            _ => DEFAULT_NAME.to_string(),
        };
        Self { name, handle, position, last_seen }
    }

    /// Milliseconds elapsed since the last report, saturating at zero.
    pub fn age(&self, now: Timestamp) -> u64 {
        now.saturating_sub(self.last_seen)
    }
}

/// Combine optional coordinates into an all-or-nothing position.
pub fn position_from(lat: Option<f64>, lon: Option<f64>) -> Result<Option<GeoPoint>> {
    match (lat, lon) {
        (Some(lat), Some(lon)) => Ok(Some(GeoPoint::new(lat, lon)?)),
        (None, None) => Ok(None),
        _ => Err(Error::PartialPosition),
    }
}
