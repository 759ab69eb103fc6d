//! The wire shape of a pipeline event (§4.6).

use overseer_core::types::{SessionId, Timestamp};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A single event on a session's pipeline stream. Every event carries
/// `type`, `session_id`, `ts` (§4.6); anything else lives in `data`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineEvent {
    /// Event kind, e.g. `"settings_snapshot"`, `"eye_result"`, `"navigator_advance"`.
    #[serde(rename = "type")]
    pub event_type: String,
    /// Session this event belongs to.
    pub session_id: SessionId,
    /// When the event was appended to the session's journal.
    pub ts: Timestamp,
    /// Event-specific payload.
    #[serde(default)]
    pub data: Map<String, Value>,
}

impl PipelineEvent {
    /// Construct an event stamped with the current time.
    #[must_use]
    pub fn new(event_type: impl Into<String>, session_id: SessionId, data: Map<String, Value>) -> Self {
        Self {
            event_type: event_type.into(),
            session_id,
            ts: Timestamp::now(),
            data,
        }
    }

    /// The `settings_snapshot` event sent first to every new subscriber
    /// (§4.6 "the bus first sends the current settings snapshot").
    #[must_use]
    pub fn settings_snapshot(session_id: SessionId, settings: Map<String, Value>) -> Self {
        Self::new("settings_snapshot", session_id, settings)
    }
}
