//! Nearby Core
//!
//! In-memory participant registry and proximity resolver.
//!
//! # Design
//!
//! Participants opt in with a handle, report positions, and ask "who is near
//! me". The [`Registry`] holds only current state keyed by [`SessionId`]; the
//! [`Resolver`] scans it and returns the other fresh participants within the
//! configured radius, closest first.
//!
//! Everything here is synchronous and infallible once inputs are validated.
//! Ownership of the registry (and any locking around it) belongs to the
//! caller, so tests can run many isolated instances side by side.
//!
//! # Example
//!
//! ```
//! use nearby_core::{Handle, ProximityConfig, Registry, Resolver, SessionId};
//! use nearby_geo::{destination, GeoPoint};
//!
//! let mut registry = Registry::new();
//! registry.register(SessionId(1), Some("Ada"), Handle::new("@ada")?, Some(GeoPoint::ORIGIN));
//! registry.register(SessionId(2), None, Handle::new("@bo")?, Some(destination(GeoPoint::ORIGIN, 0.0, 50.0)));
//!
//! let nearby = Resolver::new(ProximityConfig::default()).find_nearby(&registry, SessionId(1));
//! assert_eq!(nearby[0].distance_meters, 50);
//! # Ok::<(), nearby_core::Error>(())
//! ```

mod clock;
mod config;
mod error;
mod participant;
mod registry;
mod resolver;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{ProximityConfig, DEFAULT_RADIUS_METERS, DEFAULT_STALE_AFTER};
pub use error::{Error, Result};
pub use participant::{position_from, Handle, Participant, SessionId, Timestamp, DEFAULT_NAME};
pub use registry::{CandidateSource, Registry};
pub use resolver::{find_nearby, NearbyParticipant, Resolver};
