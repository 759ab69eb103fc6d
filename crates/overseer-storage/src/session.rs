//! Session storage (§3 "Session").

use std::sync::Arc;

use dashmap::DashMap;
use overseer_core::types::{SessionId, TenantId, Timestamp};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{StorageError, StorageResult};

/// A session record. `next_tools` is the pipeline state machine's allowlist
/// for the next call on this session (§4.2).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// Opaque session id.
    pub id: SessionId,
    /// Owning tenant, if bound.
    pub tenant: Option<TenantId>,
    /// When the session was created.
    pub created_at: Timestamp,
    /// Name of the profile this session currently resolves against.
    pub profile_name: String,
    /// Session-level settings overrides (§4.5).
    pub overrides: Map<String, Value>,
    /// Tool paths allowed on the next call, sorted lexicographically.
    pub next_tools: Vec<String>,
}

/// Holds every live session. Each session is guarded by its own lock so
/// concurrent calls against *different* sessions never contend, while calls
/// against the *same* session serialize at `with_session_mut` (§5 "Ordering
/// guarantees" — "per-session lock").
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: DashMap<SessionId, Arc<Mutex<Session>>>,
}

impl SessionStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a fresh session with `next_tools` seeded to the navigator-only
    /// allowlist (§4.2 "(fresh session) -> `{overseer/navigator}`").
    pub fn create(&self, tenant: Option<TenantId>, profile_name: impl Into<String>) -> Session {
        let session = Session {
            id: SessionId::new(),
            tenant,
            created_at: Timestamp::now(),
            profile_name: profile_name.into(),
            overrides: Map::new(),
            next_tools: vec!["overseer/navigator".to_string()],
        };
        self.sessions
            .insert(session.id.clone(), Arc::new(Mutex::new(session.clone())));
        session
    }

    /// Fetch a snapshot of a session by id.
    #[must_use]
    pub fn get(&self, id: &SessionId) -> Option<Session> {
        self.sessions.get(id).map(|entry| entry.lock().clone())
    }

    /// Snapshot every session, in no particular order.
    #[must_use]
    pub fn list(&self) -> Vec<Session> {
        self.sessions.iter().map(|entry| entry.lock().clone()).collect()
    }

    /// Run `f` against the session under its lock and return its result.
    /// This is the atomicity seam the pipeline state machine uses to make
    /// its check+advance sequence a single critical section (§4.2, §5).
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::UnknownSession`] if `id` doesn't exist.
    pub fn with_session_mut<F, R>(&self, id: &SessionId, f: F) -> StorageResult<R>
    where
        F: FnOnce(&mut Session) -> R,
    {
        let entry = self
            .sessions
            .get(id)
            .ok_or_else(|| StorageError::UnknownSession(id.to_string()))?;
        let mut session = entry.lock();
        Ok(f(&mut session))
    }

    /// Replace a session's profile name and override map (§4.5 settings update).
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::UnknownSession`] if `id` doesn't exist.
    pub fn update_settings(
        &self,
        id: &SessionId,
        profile_name: impl Into<String>,
        overrides: Map<String, Value>,
    ) -> StorageResult<()> {
        self.with_session_mut(id, |session| {
            session.profile_name = profile_name.into();
            session.overrides = overrides;
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_seeds_navigator_only_allowlist() {
        let store = SessionStore::new();
        let session = store.create(None, "enterprise");
        assert_eq!(session.next_tools, vec!["overseer/navigator".to_string()]);
    }

    #[test]
    fn with_session_mut_is_atomic_per_session() {
        let store = SessionStore::new();
        let session = store.create(None, "enterprise");
        store
            .with_session_mut(&session.id, |s| {
                s.next_tools = vec!["sharingan/clarify".to_string()];
            })
            .unwrap();
        assert_eq!(
            store.get(&session.id).unwrap().next_tools,
            vec!["sharingan/clarify".to_string()]
        );
    }

    #[test]
    fn unknown_session_errors() {
        let store = SessionStore::new();
        let result = store.with_session_mut(&SessionId::new(), |_| ());
        assert!(matches!(result, Err(StorageError::UnknownSession(_))));
    }
}
