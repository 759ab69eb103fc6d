//! `GET /session/{id}/events`, `POST /session/{id}/clarifications`,
//! `POST /session/{id}/resubmit` (§6.1).

use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::Json;
use chrono::{DateTime, Utc};
use overseer_core::types::SessionId;
use overseer_storage::{PipelineEventRecord, PipelineEventType};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map};

use crate::error::GatewayResult;
use crate::routes::authorize_scoped;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct EventsQuery {
    #[serde(default = "default_limit")]
    limit: usize,
    from_ts: Option<DateTime<Utc>>,
    to_ts: Option<DateTime<Utc>>,
}

fn default_limit() -> usize {
    100
}

#[derive(Debug, Serialize)]
pub struct EventOut {
    sequence: u64,
    event_type: PipelineEventType,
    eye_tag: Option<String>,
    ok: Option<bool>,
    status_code: Option<String>,
    tool_version: Option<String>,
    md: Option<String>,
    data: Map<String, serde_json::Value>,
    created_at: String,
}

impl From<PipelineEventRecord> for EventOut {
    fn from(r: PipelineEventRecord) -> Self {
        Self {
            sequence: r.sequence,
            event_type: r.event_type,
            eye_tag: r.eye_tag,
            ok: r.ok,
            status_code: r.status_code,
            tool_version: r.tool_version,
            md: r.md,
            data: r.data,
            created_at: r.created_at.to_string(),
        }
    }
}

/// `GET /session/{id}/events?limit=&from_ts=&to_ts=`.
///
/// # Errors
///
/// Returns [`GatewayError::Policy`] if the key fails the policy layer, or
/// [`GatewayError::UnknownSession`] if `id` doesn't exist.
pub async fn list_events(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Query(query): Query<EventsQuery>,
) -> GatewayResult<Json<Vec<EventOut>>> {
    let session_id = SessionId(id);
    authorize_scoped(&state, &headers, "GET", &format!("/session/{session_id}/events"), &session_id)?;

    let events = state
        .event_log
        .for_session_desc(&session_id)
        .into_iter()
        .filter(|r| query.from_ts.is_none_or(|from| r.created_at.0 >= from))
        .filter(|r| query.to_ts.is_none_or(|to| r.created_at.0 <= to))
        .take(query.limit)
        .map(EventOut::from)
        .collect();
    Ok(Json(events))
}

#[derive(Debug, Deserialize)]
pub struct ClarificationRequest {
    answers_md: String,
}

/// `POST /session/{id}/clarifications`.
///
/// # Errors
///
/// Returns [`GatewayError::Policy`] if the key fails the policy layer, or
/// [`GatewayError::UnknownSession`] if `id` doesn't exist.
pub async fn submit_clarification(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<ClarificationRequest>,
) -> GatewayResult<Json<serde_json::Value>> {
    let session_id = SessionId(id);
    authorize_scoped(&state, &headers, "POST", &format!("/session/{session_id}/clarifications"), &session_id)?;

    let record = state.event_log.append(
        session_id.clone(),
        PipelineEventType::UserInput,
        None,
        None,
        None,
        None,
        Some(body.answers_md.clone()),
        Map::new(),
    );
    state.event_bus.broadcast(overseer_events::PipelineEvent::new(
        "user_input",
        session_id,
        json!({ "answers_md": body.answers_md }).as_object().cloned().unwrap_or_default(),
    ));
    Ok(Json(json!({ "sequence": record.sequence })))
}

#[derive(Debug, Deserialize)]
pub struct ResubmitRequest {
    tool: String,
    #[serde(default)]
    reason_md: Option<String>,
}

/// `POST /session/{id}/resubmit`.
///
/// # Errors
///
/// Returns [`GatewayError::Policy`] if the key fails the policy layer, or
/// [`GatewayError::UnknownSession`] if `id` doesn't exist.
pub async fn request_resubmit(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<ResubmitRequest>,
) -> GatewayResult<Json<serde_json::Value>> {
    let session_id = SessionId(id);
    authorize_scoped(&state, &headers, "POST", &format!("/session/{session_id}/resubmit"), &session_id)?;

    let mut data = Map::new();
    data.insert("tool".to_string(), json!(body.tool));
    if let Some(reason) = &body.reason_md {
        data.insert("reason_md".to_string(), json!(reason));
    }

    let record = state.event_log.append(
        session_id.clone(),
        PipelineEventType::ResubmitRequested,
        None,
        None,
        None,
        None,
        body.reason_md.clone(),
        data.clone(),
    );
    state
        .event_bus
        .broadcast(overseer_events::PipelineEvent::new("resubmit_requested", session_id, data));
    Ok(Json(json!({ "sequence": record.sequence })))
}
