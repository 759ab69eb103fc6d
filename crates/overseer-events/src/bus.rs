//! Per-session event bus with settings-snapshot + replay + live fan-out (§4.6).

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use overseer_core::types::SessionId;
use parking_lot::Mutex;
use serde_json::Map;
use tokio::sync::mpsc;
use tracing::trace;

use crate::event::PipelineEvent;

/// Default number of past events replayed to a fresh subscriber.
pub const DEFAULT_REPLAY_DEPTH: usize = 50;
/// Default bounded channel capacity per subscriber.
pub const DEFAULT_SUBSCRIBER_CAPACITY: usize = 256;

struct SessionState {
    history: VecDeque<Arc<PipelineEvent>>,
    subscribers: std::collections::HashMap<u64, mpsc::Sender<Arc<PipelineEvent>>>,
}

struct SessionBus {
    state: Mutex<SessionState>,
    next_subscriber_id: AtomicU64,
}

impl SessionBus {
    fn new() -> Self {
        Self {
            state: Mutex::new(SessionState {
                history: VecDeque::new(),
                subscribers: std::collections::HashMap::new(),
            }),
            next_subscriber_id: AtomicU64::new(0),
        }
    }
}

/// Fans pipeline events out to per-session subscribers, replaying recent
/// history to each new one (§4.6).
///
/// Ordering is guaranteed within a session: `broadcast` holds the session's
/// lock for the duration of the append + fan-out, so two concurrent
/// broadcasts for the same session never interleave.
#[derive(Clone)]
pub struct EventBus {
    sessions: Arc<DashMap<SessionId, Arc<SessionBus>>>,
    replay_depth: usize,
    subscriber_capacity: usize,
}

impl EventBus {
    /// Create a bus with the given replay depth and per-subscriber channel
    /// capacity.
    #[must_use]
    pub fn new(replay_depth: usize, subscriber_capacity: usize) -> Self {
        Self {
            sessions: Arc::new(DashMap::new()),
            replay_depth,
            subscriber_capacity,
        }
    }

    fn session_bus(&self, session_id: &SessionId) -> Arc<SessionBus> {
        self.sessions
            .entry(session_id.clone())
            .or_insert_with(|| Arc::new(SessionBus::new()))
            .clone()
    }

    /// Append an event to a session's journal and fan it out to every live
    /// subscriber. A subscriber whose channel is full or closed is dropped
    /// from the set (§5 "if a subscriber cannot accept a message it is
    /// dropped from the set").
    pub fn broadcast(&self, event: PipelineEvent) {
        let session_id = event.session_id.clone();
        let bus = self.session_bus(&session_id);
        let event = Arc::new(event);

        let mut state = bus.state.lock();
        state.history.push_back(event.clone());
        while state.history.len() > self.replay_depth {
            state.history.pop_front();
        }

        state.subscribers.retain(|_, sender| match sender.try_send(event.clone()) {
            Ok(()) => true,
            Err(_) => {
                trace!(session = %session_id, "dropping slow or closed subscriber");
                false
            },
        });
    }

    /// Register a fresh subscriber: it first receives `settings_snapshot`,
    /// then the last `replay_depth` events oldest-first, then live events
    /// (§4.6). Returns the receiver and the id to pass to [`EventBus::unregister`].
    pub fn register(
        &self,
        session_id: &SessionId,
        settings_snapshot: Map<String, serde_json::Value>,
    ) -> (u64, mpsc::Receiver<Arc<PipelineEvent>>) {
        let bus = self.session_bus(session_id);
        let (tx, rx) = mpsc::channel(self.subscriber_capacity);

        let mut state = bus.state.lock();
        let snapshot = Arc::new(PipelineEvent::settings_snapshot(
            session_id.clone(),
            settings_snapshot,
        ));
        let _ = tx.try_send(snapshot);
        for past in &state.history {
            let _ = tx.try_send(past.clone());
        }

        let id = bus.next_subscriber_id.fetch_add(1, Ordering::Relaxed);
        state.subscribers.insert(id, tx);
        (id, rx)
    }

    /// Remove a subscriber explicitly (e.g. on WebSocket disconnect).
    pub fn unregister(&self, session_id: &SessionId, subscriber_id: u64) {
        if let Some(bus) = self.sessions.get(session_id) {
            bus.state.lock().subscribers.remove(&subscriber_id);
        }
    }

    /// Number of live subscribers on a session.
    #[must_use]
    pub fn subscriber_count(&self, session_id: &SessionId) -> usize {
        self.sessions
            .get(session_id)
            .map(|bus| bus.state.lock().subscribers.len())
            .unwrap_or(0)
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_REPLAY_DEPTH, DEFAULT_SUBSCRIBER_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn subscriber_receives_snapshot_then_replay_then_live() {
        let bus = EventBus::new(10, 10);
        let session_id = SessionId::new();

        bus.broadcast(PipelineEvent::new(
            "eye_result",
            session_id.clone(),
            Map::new(),
        ));

        let mut settings = Map::new();
        settings.insert("ambiguity_threshold".into(), json!(0.35));
        let (_id, mut rx) = bus.register(&session_id, settings);

        let snapshot = rx.recv().await.unwrap();
        assert_eq!(snapshot.event_type, "settings_snapshot");

        let replayed = rx.recv().await.unwrap();
        assert_eq!(replayed.event_type, "eye_result");

        bus.broadcast(PipelineEvent::new(
            "navigator_advance",
            session_id.clone(),
            Map::new(),
        ));
        let live = rx.recv().await.unwrap();
        assert_eq!(live.event_type, "navigator_advance");
    }

    #[tokio::test]
    async fn history_is_capped_at_replay_depth() {
        let bus = EventBus::new(2, 10);
        let session_id = SessionId::new();
        for i in 0..5 {
            bus.broadcast(PipelineEvent::new(
                format!("event_{i}"),
                session_id.clone(),
                Map::new(),
            ));
        }
        let (_id, mut rx) = bus.register(&session_id, Map::new());
        let _snapshot = rx.recv().await.unwrap();
        let first_replay = rx.recv().await.unwrap();
        assert_eq!(first_replay.event_type, "event_3");
    }

    #[tokio::test]
    async fn full_channel_drops_subscriber_without_blocking() {
        let bus = EventBus::new(0, 1);
        let session_id = SessionId::new();
        let (id, _rx) = bus.register(&session_id, Map::new());
        assert_eq!(bus.subscriber_count(&session_id), 1);

        // Fill the single slot, then push past it — broadcast must not block.
        bus.broadcast(PipelineEvent::new("a", session_id.clone(), Map::new()));
        bus.broadcast(PipelineEvent::new("b", session_id.clone(), Map::new()));

        assert_eq!(bus.subscriber_count(&session_id), 0);
        bus.unregister(&session_id, id);
    }

    #[tokio::test]
    async fn unregister_removes_subscriber() {
        let bus = EventBus::new(10, 10);
        let session_id = SessionId::new();
        let (id, _rx) = bus.register(&session_id, Map::new());
        assert_eq!(bus.subscriber_count(&session_id), 1);
        bus.unregister(&session_id, id);
        assert_eq!(bus.subscriber_count(&session_id), 0);
    }
}
