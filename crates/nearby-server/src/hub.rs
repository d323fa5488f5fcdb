//! Session hub: owns the registry and the per-session push channels.
//!
//! Every inbound event takes the hub lock once, applies one registry
//! mutation, resolves, queues the resulting pushes and releases the lock.
//! Events are therefore fully processed one at a time. Pushes go through
//! unbounded channels so no socket I/O happens under the lock.

use std::collections::HashMap;

use nearby_core::{
    position_from, Clock, Handle, ProximityConfig, Registry, Resolver, SessionId, SystemClock,
};
use nearby_geo::GeoPoint;
use tokio::sync::{mpsc, Mutex};
use tracing::{debug, info, warn};

use crate::config::PushMode;
use crate::protocol::{ClientEvent, ServerEvent};

/// Sending half of a session's push channel.
pub type EventSender = mpsc::UnboundedSender<ServerEvent>;

/// Receiving half of a session's push channel.
pub type EventReceiver = mpsc::UnboundedReceiver<ServerEvent>;

struct HubState<C> {
    registry: Registry<C>,
    sessions: HashMap<SessionId, EventSender>,
    next_session: u64,
}

impl<C: Clock> HubState<C> {
    fn send(&self, id: SessionId, event: ServerEvent) {
        match self.sessions.get(&id) {
            Some(tx) => {
                if tx.send(event).is_err() {
                    debug!(%id, "push channel closed");
                }
            }
            None => debug!(%id, "no push channel for session"),
        }
    }

    fn push_nearby(&self, resolver: &Resolver, id: SessionId) {
        let participants = resolver.find_nearby(&self.registry, id);
        debug!(%id, count = participants.len(), "pushing nearby list");
        self.send(id, ServerEvent::Nearby { participants });
    }

    /// Apply one event to the registry.
    ///
    /// Returns true if the sender's position may have changed and a nearby
    /// list should be pushed.
    fn apply(&mut self, id: SessionId, event: ClientEvent) -> nearby_core::Result<bool> {
        match event {
            ClientEvent::Register { name, handle, lat, lon } => {
                let handle = Handle::new(handle)?;
                let position = position_from(lat, lon)?;
                let participant = self.registry.register(id, name.as_deref(), handle, position);
                info!(%id, handle = %participant.handle, located = position.is_some(), "participant registered");
                Ok(true)
            }
            ClientEvent::UpdateLocation { lat, lon } => {
                if !self.registry.contains(id) {
                    debug!(%id, "dropping location update for unregistered session");
                    return Ok(false);
                }
                let position = GeoPoint::new(lat, lon)?;
                Ok(self.registry.update_location(id, position))
            }
            ClientEvent::Stop => {
                if self.registry.remove(id).is_some() {
                    info!(%id, "participant stopped sharing");
                }
                Ok(false)
            }
        }
    }
}

/// Owner of the participant registry for one server process.
pub struct Hub<C = SystemClock> {
    state: Mutex<HubState<C>>,
    resolver: Resolver,
    push_mode: PushMode,
}

impl Hub<SystemClock> {
    /// Create a hub on the system clock.
    pub fn new(proximity: ProximityConfig, push_mode: PushMode) -> Self {
        Self::with_clock(SystemClock, proximity, push_mode)
    }
}

impl<C: Clock> Hub<C> {
    /// Create a hub on the given clock.
    pub fn with_clock(clock: C, proximity: ProximityConfig, push_mode: PushMode) -> Self {
        Self {
            state: Mutex::new(HubState {
                registry: Registry::with_clock(clock),
                sessions: HashMap::new(),
                next_session: 0,
            }),
            resolver: Resolver::new(proximity),
            push_mode,
        }
    }

    /// Proximity settings used for every push.
    pub fn proximity(&self) -> &ProximityConfig {
        self.resolver.config()
    }

    /// Push fan-out mode.
    pub fn push_mode(&self) -> PushMode {
        self.push_mode
    }

    /// Open a session and return its id and push channel.
    pub async fn connect(&self) -> (SessionId, EventReceiver) {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut state = self.state.lock().await;
        let id = SessionId(state.next_session);
        state.next_session += 1;
        state.sessions.insert(id, tx);
        (id, rx)
    }

    /// Process one inbound event for `id`.
    pub async fn handle(&self, id: SessionId, event: ClientEvent) {
        let mut state = self.state.lock().await;
        if !state.sessions.contains_key(&id) {
            debug!(%id, "ignoring event for closed session");
            return;
        }

        let watched_by = self.watchers(&state, id);
        match state.apply(id, event) {
            Ok(moved) => {
                if moved {
                    state.push_nearby(&self.resolver, id);
                }
                // Old watchers learn the sender left, new ones that it arrived
                let mut notify = watched_by;
                for watcher in self.watchers(&state, id) {
                    if !notify.contains(&watcher) {
                        notify.push(watcher);
                    }
                }
                for watcher in notify {
                    state.push_nearby(&self.resolver, watcher);
                }
            }
            Err(e) => {
                warn!(%id, error = %e, "rejected event");
                state.send(id, ServerEvent::Error { message: e.to_string() });
            }
        }
    }

    /// Tell `id` that a frame could not be understood.
    pub async fn reject(&self, id: SessionId, message: impl Into<String>) {
        let state = self.state.lock().await;
        state.send(id, ServerEvent::Error { message: message.into() });
    }

    /// Close a session and forget its participant.
    pub async fn disconnect(&self, id: SessionId) {
        let mut state = self.state.lock().await;
        let watched_by = self.watchers(&state, id);
        state.sessions.remove(&id);
        if state.registry.remove(id).is_some() {
            debug!(%id, "removed participant on disconnect");
        }
        for watcher in watched_by {
            state.push_nearby(&self.resolver, watcher);
        }
    }

    /// Sessions to refresh when `id` changes; empty unless pushing to neighbors.
    fn watchers(&self, state: &HubState<C>, id: SessionId) -> Vec<SessionId> {
        match self.push_mode {
            PushMode::Origin => Vec::new(),
            PushMode::Neighbors => self.resolver.watchers_of(&state.registry, id),
        }
    }

    /// Number of registered participants.
    pub async fn participant_count(&self) -> usize {
        self.state.lock().await.registry.len()
    }

    /// Number of open sessions, registered or not.
    pub async fn session_count(&self) -> usize {
        self.state.lock().await.sessions.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nearby_core::{ManualClock, NearbyParticipant};
    use nearby_geo::destination;
    use std::time::Duration;

    fn hub(mode: PushMode) -> (Hub<ManualClock>, ManualClock) {
        let clock = ManualClock::new(1_700_000_000_000);
        let hub = Hub::with_clock(clock.clone(), ProximityConfig::default(), mode);
        (hub, clock)
    }

    fn register_at(handle: &str, point: GeoPoint) -> ClientEvent {
        ClientEvent::Register {
            name: None,
            handle: handle.into(),
            lat: Some(point.lat()),
            lon: Some(point.lon()),
        }
    }

    fn north(meters: f64) -> GeoPoint {
        destination(GeoPoint::ORIGIN, 0.0, meters)
    }

    fn nearby(rx: &mut EventReceiver) -> Vec<NearbyParticipant> {
        match rx.try_recv() {
            Ok(ServerEvent::Nearby { participants }) => participants,
            other => panic!("expected nearby list, got {other:?}"),
        }
    }

    fn handles(list: &[NearbyParticipant]) -> Vec<&str> {
        list.iter().map(|n| n.handle.as_str()).collect()
    }

    #[tokio::test]
    async fn sessions_get_unique_ids() {
        let (hub, _) = hub(PushMode::Origin);
        let (a, _rx_a) = hub.connect().await;
        let (b, _rx_b) = hub.connect().await;
        assert_ne!(a, b);
        assert_eq!(hub.session_count().await, 2);
        assert_eq!(hub.participant_count().await, 0);
    }

    #[tokio::test]
    async fn registration_pushes_to_sender_only() {
        let (hub, _) = hub(PushMode::Origin);
        let (a, mut rx_a) = hub.connect().await;
        let (b, mut rx_b) = hub.connect().await;

        hub.handle(a, register_at("@a", GeoPoint::ORIGIN)).await;
        assert!(nearby(&mut rx_a).is_empty());

        hub.handle(b, register_at("@b", north(50.0))).await;
        let list = nearby(&mut rx_b);
        assert_eq!(handles(&list), vec!["@a"]);
        assert_eq!(list[0].distance_meters, 50);

        // A is not told about B until A's next event
        assert!(rx_a.try_recv().is_err());
        hub.handle(a, ClientEvent::UpdateLocation { lat: 0.0, lon: 0.0 }).await;
        assert_eq!(handles(&nearby(&mut rx_a)), vec!["@b"]);
    }

    #[tokio::test]
    async fn neighbors_mode_notifies_people_in_range() {
        let (hub, _) = hub(PushMode::Neighbors);
        let (a, mut rx_a) = hub.connect().await;
        let (b, mut rx_b) = hub.connect().await;
        let (c, mut rx_c) = hub.connect().await;

        hub.handle(a, register_at("@a", GeoPoint::ORIGIN)).await;
        hub.handle(c, register_at("@c", north(5_000.0))).await;
        nearby(&mut rx_a);
        nearby(&mut rx_c);

        hub.handle(b, register_at("@b", north(30.0))).await;
        assert_eq!(handles(&nearby(&mut rx_b)), vec!["@a"]);
        assert_eq!(handles(&nearby(&mut rx_a)), vec!["@b"]);
        // Out of range, so untouched
        assert!(rx_c.try_recv().is_err());
    }

    #[tokio::test]
    async fn neighbors_mode_tells_watchers_when_someone_leaves() {
        let (hub, _) = hub(PushMode::Neighbors);
        let (a, mut rx_a) = hub.connect().await;
        let (b, mut rx_b) = hub.connect().await;

        hub.handle(a, register_at("@a", GeoPoint::ORIGIN)).await;
        nearby(&mut rx_a);
        hub.handle(b, register_at("@b", north(30.0))).await;
        nearby(&mut rx_b);
        assert_eq!(handles(&nearby(&mut rx_a)), vec!["@b"]);

        // Walking out of range
        let far = north(5_000.0);
        hub.handle(b, ClientEvent::UpdateLocation { lat: far.lat(), lon: far.lon() }).await;
        assert!(nearby(&mut rx_b).is_empty());
        assert!(nearby(&mut rx_a).is_empty());
        assert!(rx_a.try_recv().is_err());

        // Coming back
        let near = north(40.0);
        hub.handle(b, ClientEvent::UpdateLocation { lat: near.lat(), lon: near.lon() }).await;
        nearby(&mut rx_b);
        assert_eq!(handles(&nearby(&mut rx_a)), vec!["@b"]);

        // Stopping
        hub.handle(b, ClientEvent::Stop).await;
        assert!(rx_b.try_recv().is_err());
        assert!(nearby(&mut rx_a).is_empty());

        // Disconnecting while in range
        hub.handle(b, register_at("@b", north(20.0))).await;
        nearby(&mut rx_b);
        assert_eq!(handles(&nearby(&mut rx_a)), vec!["@b"]);
        hub.disconnect(b).await;
        assert!(nearby(&mut rx_a).is_empty());
        assert!(rx_a.try_recv().is_err());
    }

    #[tokio::test]
    async fn origin_mode_leaves_watchers_alone() {
        let (hub, _) = hub(PushMode::Origin);
        let (a, mut rx_a) = hub.connect().await;
        let (b, _rx_b) = hub.connect().await;

        hub.handle(a, register_at("@a", GeoPoint::ORIGIN)).await;
        nearby(&mut rx_a);
        hub.handle(b, register_at("@b", north(30.0))).await;
        hub.handle(b, ClientEvent::Stop).await;
        hub.disconnect(b).await;

        assert!(rx_a.try_recv().is_err());
    }

    #[tokio::test]
    async fn empty_handle_is_rejected() {
        let (hub, _) = hub(PushMode::Origin);
        let (a, mut rx) = hub.connect().await;

        hub.handle(a, register_at("  ", GeoPoint::ORIGIN)).await;

        assert!(matches!(rx.try_recv(), Ok(ServerEvent::Error { .. })));
        assert_eq!(hub.participant_count().await, 0);
    }

    #[tokio::test]
    async fn invalid_positions_are_rejected() {
        let (hub, _) = hub(PushMode::Origin);
        let (a, mut rx) = hub.connect().await;

        let partial = ClientEvent::Register {
            name: None,
            handle: "@a".into(),
            lat: Some(10.0),
            lon: None,
        };
        hub.handle(a, partial).await;
        assert!(matches!(rx.try_recv(), Ok(ServerEvent::Error { .. })));
        assert_eq!(hub.participant_count().await, 0);

        hub.handle(a, register_at("@a", GeoPoint::ORIGIN)).await;
        nearby(&mut rx);
        hub.handle(a, ClientEvent::UpdateLocation { lat: 123.0, lon: 0.0 }).await;
        match rx.try_recv() {
            Ok(ServerEvent::Error { message }) => assert!(message.contains("latitude")),
            other => panic!("expected error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn registration_without_position_gets_empty_list() {
        let (hub, _) = hub(PushMode::Origin);
        let (a, mut rx_a) = hub.connect().await;
        let (b, _rx_b) = hub.connect().await;
        hub.handle(b, register_at("@b", GeoPoint::ORIGIN)).await;

        let no_position = ClientEvent::Register {
            name: Some("Ada".into()),
            handle: "@a".into(),
            lat: None,
            lon: None,
        };
        hub.handle(a, no_position).await;
        assert!(nearby(&mut rx_a).is_empty());
        assert_eq!(hub.participant_count().await, 2);
    }

    #[tokio::test]
    async fn update_before_register_is_dropped() {
        let (hub, _) = hub(PushMode::Origin);
        let (a, mut rx) = hub.connect().await;

        hub.handle(a, ClientEvent::UpdateLocation { lat: 1.0, lon: 1.0 }).await;

        assert!(rx.try_recv().is_err());
        assert_eq!(hub.participant_count().await, 0);
    }

    #[tokio::test]
    async fn bad_coordinates_from_unregistered_sessions_are_dropped() {
        let (hub, _) = hub(PushMode::Origin);
        let (a, mut rx) = hub.connect().await;

        hub.handle(a, ClientEvent::UpdateLocation { lat: 123.0, lon: 0.0 }).await;
        assert!(rx.try_recv().is_err());

        hub.handle(a, register_at("@a", GeoPoint::ORIGIN)).await;
        nearby(&mut rx);
        hub.handle(a, ClientEvent::Stop).await;
        hub.handle(a, ClientEvent::UpdateLocation { lat: 123.0, lon: 0.0 }).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn stop_and_disconnect_remove_participant() {
        let (hub, _) = hub(PushMode::Origin);
        let (a, mut rx_a) = hub.connect().await;
        let (b, mut rx_b) = hub.connect().await;
        let (c, mut rx_c) = hub.connect().await;

        hub.handle(a, register_at("@a", GeoPoint::ORIGIN)).await;
        hub.handle(b, register_at("@b", north(10.0))).await;
        hub.handle(c, register_at("@c", north(20.0))).await;
        nearby(&mut rx_a);
        nearby(&mut rx_b);
        nearby(&mut rx_c);

        hub.handle(b, ClientEvent::Stop).await;
        hub.disconnect(c).await;
        assert_eq!(hub.participant_count().await, 1);

        hub.handle(a, ClientEvent::UpdateLocation { lat: 0.0, lon: 0.0 }).await;
        assert!(nearby(&mut rx_a).is_empty());

        // Stopped sessions stay connected but silent until they register again
        hub.handle(b, ClientEvent::UpdateLocation { lat: 0.0, lon: 0.0 }).await;
        assert!(rx_b.try_recv().is_err());

        // Closed sessions are ignored entirely
        hub.handle(c, register_at("@c", GeoPoint::ORIGIN)).await;
        assert_eq!(hub.participant_count().await, 1);
    }

    #[tokio::test]
    async fn stale_participants_drop_out() {
        let (hub, clock) = hub(PushMode::Origin);
        let (a, mut rx_a) = hub.connect().await;
        let (b, _rx_b) = hub.connect().await;

        hub.handle(b, register_at("@b", north(10.0))).await;
        clock.advance(Duration::from_secs(61));
        hub.handle(a, register_at("@a", GeoPoint::ORIGIN)).await;

        assert!(nearby(&mut rx_a).is_empty());
    }

    #[tokio::test]
    async fn reject_sends_error() {
        let (hub, _) = hub(PushMode::Origin);
        let (a, mut rx) = hub.connect().await;
        hub.reject(a, "bad frame").await;
        assert_eq!(rx.try_recv().unwrap(), ServerEvent::Error { message: "bad frame".into() });
    }
}
