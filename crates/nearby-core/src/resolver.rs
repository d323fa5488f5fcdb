//! Proximity resolver.
//!
//! Given a querying session, finds every other *fresh* participant within the
//! configured radius and ranks them by distance. Pure read over a
//! [`CandidateSource`]; never fails.

use nearby_geo::haversine_meters;
use serde::Serialize;

use crate::config::ProximityConfig;
use crate::participant::{Handle, Participant, SessionId};
use crate::registry::CandidateSource;

/// One entry of a nearby list, as shown to the querying participant.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NearbyParticipant {
    pub name: String,
    pub handle: Handle,
    /// Great-circle distance rounded to the nearest meter
    pub distance_meters: u64,
}

/// Computes nearby lists under a fixed [`ProximityConfig`].
#[derive(Debug, Clone, Copy, Default)]
pub struct Resolver {
    config: ProximityConfig,
}

impl Resolver {
    /// Create a resolver with the given configuration.
    pub fn new(config: ProximityConfig) -> Self {
        Self { config }
    }

    /// The active configuration.
    pub fn config(&self) -> &ProximityConfig {
        &self.config
    }

    /// Participants near `query`, closest first.
    ///
    /// Empty if `query` is unknown or has not reported a position yet.
    /// Equal distances keep the source's iteration order.
    pub fn find_nearby<S: CandidateSource>(&self, source: &S, query: SessionId) -> Vec<NearbyParticipant> {
        self.matches(source, query)
            .into_iter()
            .map(|(_, nearby)| nearby)
            .collect()
    }

    /// Sessions whose own nearby list currently contains `subject`.
    ///
    /// Empty if `subject` is unknown, has no position or is itself stale,
    /// since nobody sees it then. The watchers' own freshness does not
    /// matter: a stale participant still sees fresh ones.
    pub fn watchers_of<S: CandidateSource>(&self, source: &S, subject: SessionId) -> Vec<SessionId> {
        let visible = source
            .participant(subject)
            .is_some_and(|p| p.age(source.now_millis()) <= self.config.stale_after_millis());
        if !visible {
            return Vec::new();
        }
        self.in_range(source, subject)
            .into_iter()
            .map(|(id, _, _)| id)
            .collect()
    }

    fn matches<S: CandidateSource>(&self, source: &S, query: SessionId) -> Vec<(SessionId, NearbyParticipant)> {
        let now = source.now_millis();
        let stale_after = self.config.stale_after_millis();

        let mut found: Vec<(SessionId, NearbyParticipant)> = self
            .in_range(source, query)
            .into_iter()
            .filter(|(_, p, _)| p.age(now) <= stale_after)
            .map(|(id, p, meters)| {
                (id, NearbyParticipant {
                    name: p.name.clone(),
                    handle: p.handle.clone(),
                    distance_meters: meters,
                })
            })
            .collect();

        // Stable: ties stay in scan order
        found.sort_by_key(|(_, nearby)| nearby.distance_meters);
        found
    }

    /// Other positioned participants within the radius of `query`, in scan
    /// order, with their rounded distance. No staleness filtering.
    fn in_range<'a, S: CandidateSource>(
        &self,
        source: &'a S,
        query: SessionId,
    ) -> Vec<(SessionId, &'a Participant, u64)> {
        let Some(origin) = source.participant(query).and_then(|p| p.position) else {
            return Vec::new();
        };

        source
            .candidates_near(origin)
            .filter(|(id, _)| **id != query)
            .filter_map(|(id, p)| {
                let meters = haversine_meters(origin, p.position?).round();
                (meters <= self.config.radius_meters).then_some((*id, p, meters as u64))
            })
            .collect()
    }
}

/// One-shot form of [`Resolver::find_nearby`].
pub fn find_nearby<S: CandidateSource>(
    source: &S,
    query: SessionId,
    config: &ProximityConfig,
) -> Vec<NearbyParticipant> {
    Resolver::new(*config).find_nearby(source, query)
}
