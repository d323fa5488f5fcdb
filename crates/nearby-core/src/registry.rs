//! Participant registry.

use std::collections::btree_map;
use std::collections::BTreeMap;

use nearby_geo::GeoPoint;
use tracing::debug;

use crate::clock::{Clock, SystemClock};
use crate::participant::{Handle, Participant, SessionId, Timestamp};

/// Where the resolver gets its candidates from.
///
/// The registry answers with a full scan. An indexed implementation only has
/// to return a superset of the participants near `point`; radius and
/// staleness filtering stay in the resolver.
pub trait CandidateSource {
    /// Iterator over candidate entries.
    type Candidates<'a>: Iterator<Item = (&'a SessionId, &'a Participant)>
    where
        Self: 'a;

    /// Look up one participant.
    fn participant(&self, id: SessionId) -> Option<&Participant>;

    /// Participants that may be near `point`, in a deterministic order.
    fn candidates_near(&self, point: GeoPoint) -> Self::Candidates<'_>;

    /// Current time as seen by this source.
    fn now_millis(&self) -> Timestamp;
}

/// Current state of every registered participant, keyed by session.
///
/// Holds no history. Entries iterate in session order, which is registration
/// order because session ids are allocated monotonically.
#[derive(Debug)]
pub struct Registry<C = SystemClock> {
    participants: BTreeMap<SessionId, Participant>,
    clock: C,
}

impl Default for Registry<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry<SystemClock> {
    /// Create an empty registry on the system clock.
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }
}

impl<C: Clock> Registry<C> {
    /// Create an empty registry on the given clock.
    pub fn with_clock(clock: C) -> Self {
        Self {
            participants: BTreeMap::new(),
            clock,
        }
    }

    /// Insert or overwrite the entry for `id`, stamped with the current time.
    pub fn register(
        &mut self,
        id: SessionId,
        name: Option<&str>,
        handle: Handle,
        position: Option<GeoPoint>,
    ) -> &Participant {
        let participant = Participant::new(name, handle, position, self.clock.now_millis());
        debug!(%id, handle = %participant.handle, "participant registered");
        match self.participants.entry(id) {
            btree_map::Entry::Occupied(mut slot) => {
                slot.insert(participant);
                slot.into_mut()
            }
            btree_map::Entry::Vacant(slot) => slot.insert(participant),
        }
    }

    /// Record a new position for `id`.
    ///
    /// Returns false (and changes nothing) if the session is not registered.
    pub fn update_location(&mut self, id: SessionId, position: GeoPoint) -> bool {
        let now = self.clock.now_millis();
        match self.participants.get_mut(&id) {
            Some(p) => {
                p.position = Some(position);
                p.last_seen = now;
                true
            }
            None => {
                debug!(%id, "dropping location update for unregistered session");
                false
            }
        }
    }

    /// Remove the entry for `id`, if any.
    pub fn remove(&mut self, id: SessionId) -> Option<Participant> {
        self.participants.remove(&id)
    }

    /// Get an entry.
    pub fn get(&self, id: SessionId) -> Option<&Participant> {
        self.participants.get(&id)
    }

    /// Check whether `id` is registered.
    pub fn contains(&self, id: SessionId) -> bool {
        self.participants.contains_key(&id)
    }

    /// Number of registered participants.
    pub fn len(&self) -> usize {
        self.participants.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }

    /// All entries in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (&SessionId, &Participant)> {
        self.participants.iter()
    }
}

impl<C: Clock> CandidateSource for Registry<C> {
    type Candidates<'a> = btree_map::Iter<'a, SessionId, Participant>
    where
        Self: 'a;

    fn participant(&self, id: SessionId) -> Option<&Participant> {
        self.get(id)
    }

    /// Linear scan: every entry is a candidate.
    fn candidates_near(&self, _point: GeoPoint) -> Self::Candidates<'_> {
        self.participants.iter()
    }

    fn now_millis(&self) -> Timestamp {
        self.clock.now_millis()
    }
}
