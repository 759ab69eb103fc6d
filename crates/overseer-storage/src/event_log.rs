//! Append-only pipeline-event journal (§3 "Pipeline event").

use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use overseer_core::types::{SessionId, Timestamp};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The enumerated pipeline event types (§3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineEventType {
    /// An Eye ran and produced a verdict.
    EyeUpdate,
    /// The host agent submitted new input outside an Eye call.
    UserInput,
    /// The host requested resubmission of a rejected artifact.
    ResubmitRequested,
    /// The host requested a duel between two candidate artifacts.
    DuelRequested,
    /// The session's effective settings changed.
    SettingsUpdate,
}

/// One append-only record in a session's pipeline-event journal. Never
/// mutated after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineEventRecord {
    /// Session this event belongs to.
    pub session_id: SessionId,
    /// Monotonic sequence number, unique within the session.
    pub sequence: u64,
    /// Event kind.
    pub event_type: PipelineEventType,
    /// `[EYE/...]` tag, if this event came from an Eye call.
    pub eye_tag: Option<String>,
    /// The Eye's `ok` verdict, if applicable.
    pub ok: Option<bool>,
    /// The Eye's status code, rendered as its wire string.
    pub status_code: Option<String>,
    /// The tool's `tool-name@semver` version string.
    pub tool_version: Option<String>,
    /// Markdown blob carried with the event.
    pub md: Option<String>,
    /// Structured event-specific data.
    #[serde(default)]
    pub data: Map<String, Value>,
    /// When the event was appended.
    pub created_at: Timestamp,
}

struct SessionJournal {
    next_sequence: AtomicU64,
    records: Mutex<Vec<PipelineEventRecord>>,
}

/// Append-only per-session pipeline-event log, simulating the
/// `(session_id, created_at DESC)` composite index with an in-process map
/// (§6.4).
#[derive(Default)]
pub struct EventLog {
    journals: DashMap<SessionId, SessionJournal>,
}

impl EventLog {
    /// Create an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a new record for `session_id`, assigning the next monotonic
    /// sequence number for that session.
    pub fn append(
        &self,
        session_id: SessionId,
        event_type: PipelineEventType,
        eye_tag: Option<String>,
        ok: Option<bool>,
        status_code: Option<String>,
        tool_version: Option<String>,
        md: Option<String>,
        data: Map<String, Value>,
    ) -> PipelineEventRecord {
        let journal = self.journals.entry(session_id.clone()).or_insert_with(|| SessionJournal {
            next_sequence: AtomicU64::new(0),
            records: Mutex::new(Vec::new()),
        });
        let sequence = journal.next_sequence.fetch_add(1, Ordering::SeqCst);
        let record = PipelineEventRecord {
            session_id,
            sequence,
            event_type,
            eye_tag,
            ok,
            status_code,
            tool_version,
            md,
            data,
            created_at: Timestamp::now(),
        };
        journal.records.lock().push(record.clone());
        record
    }

    /// Every record for a session, newest first (`created_at DESC`, the
    /// index spec §6.4 names).
    #[must_use]
    pub fn for_session_desc(&self, session_id: &SessionId) -> Vec<PipelineEventRecord> {
        let Some(journal) = self.journals.get(session_id) else {
            return Vec::new();
        };
        let mut records = journal.records.lock().clone();
        records.reverse();
        records
    }

    /// Every record for a session, oldest first — the order the bus
    /// replays them in (§4.6).
    #[must_use]
    pub fn for_session_asc(&self, session_id: &SessionId) -> Vec<PipelineEventRecord> {
        self.journals
            .get(session_id)
            .map(|journal| journal.records.lock().clone())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequence_numbers_are_monotonic_per_session() {
        let log = EventLog::new();
        let sid = SessionId::new();
        let a = log.append(sid.clone(), PipelineEventType::EyeUpdate, None, None, None, None, None, Map::new());
        let b = log.append(sid.clone(), PipelineEventType::EyeUpdate, None, None, None, None, None, Map::new());
        assert_eq!(a.sequence, 0);
        assert_eq!(b.sequence, 1);
    }

    #[test]
    fn desc_order_is_newest_first() {
        let log = EventLog::new();
        let sid = SessionId::new();
        log.append(sid.clone(), PipelineEventType::UserInput, None, None, None, None, None, Map::new());
        log.append(sid.clone(), PipelineEventType::SettingsUpdate, None, None, None, None, None, Map::new());
        let desc = log.for_session_desc(&sid);
        assert_eq!(desc[0].event_type, PipelineEventType::SettingsUpdate);
        assert_eq!(desc[1].event_type, PipelineEventType::UserInput);
    }

    #[test]
    fn separate_sessions_have_independent_sequences() {
        let log = EventLog::new();
        let a = SessionId::new();
        let b = SessionId::new();
        log.append(a.clone(), PipelineEventType::UserInput, None, None, None, None, None, Map::new());
        let first_b = log.append(b, PipelineEventType::UserInput, None, None, None, None, None, Map::new());
        assert_eq!(first_b.sequence, 0);
    }
}
