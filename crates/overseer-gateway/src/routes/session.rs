//! `/session`, `/sessions`, `/sessions/{id}`, `/session/{id}/settings` (§6.1).

use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::Json;
use overseer_core::types::TenantId;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::auth::{authorize, require_admin, PolicyRequest};
use crate::error::{GatewayError, GatewayResult};
use crate::routes::enforce_session_scope;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateSessionRequest {
    #[serde(default)]
    tenant: Option<String>,
    #[serde(default = "default_profile")]
    profile: String,
    #[serde(default)]
    overrides: Map<String, Value>,
    /// Optional LLM provider hint, carried through verbatim (§1 "LLM
    /// provider plumbing" is out of scope for this core — the gateway only
    /// echoes what the caller names, it never dials out to one).
    #[serde(default)]
    provider: Option<String>,
}

fn default_profile() -> String {
    "enterprise".to_string()
}

#[derive(Debug, Serialize)]
pub struct CreateSessionResponse {
    session_id: String,
    profile: String,
    settings: Map<String, Value>,
    provider: Option<String>,
    portal_url: String,
}

/// `POST /session`.
///
/// # Errors
///
/// Returns [`GatewayError::Policy`] if the key fails the policy layer.
pub async fn create_session(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<CreateSessionRequest>,
) -> GatewayResult<Json<CreateSessionResponse>> {
    let tenant = body.tenant.clone().map(TenantId::from);
    let request = PolicyRequest {
        method: "POST".to_string(),
        path: "/session".to_string(),
        tenant: tenant.clone(),
        session: None,
        tool: None,
        budget_tokens: 0,
    };
    authorize(&state, &headers, &request)?;

    let session = state.sessions.create(tenant, body.profile.clone());
    let settings = overseer_config::resolve(&body.profile, &body.overrides, state.profiles.as_ref());
    state
        .sessions
        .update_settings(&session.id, body.profile.clone(), body.overrides.clone())
        .map_err(GatewayError::from)?;

    Ok(Json(CreateSessionResponse {
        session_id: session.id.to_string(),
        profile: body.profile,
        settings: settings.to_json_map(),
        provider: body.provider,
        portal_url: format!("/ws/pipeline/{}", session.id),
    }))
}

#[derive(Debug, Deserialize)]
pub struct ListSessionsQuery {
    #[serde(default = "default_limit")]
    limit: usize,
}

fn default_limit() -> usize {
    50
}

#[derive(Debug, Serialize)]
pub struct SessionSummary {
    session_id: String,
    tenant: Option<String>,
    profile: String,
    created_at: String,
}

/// `GET /sessions?limit=N`.
///
/// # Errors
///
/// Returns [`GatewayError::Policy`] if the key fails the policy layer.
pub async fn list_sessions(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<ListSessionsQuery>,
) -> GatewayResult<Json<Vec<SessionSummary>>> {
    let request = PolicyRequest {
        method: "GET".to_string(),
        path: "/sessions".to_string(),
        tenant: None,
        session: None,
        tool: None,
        budget_tokens: 0,
    };
    let key = authorize(&state, &headers, &request)?;

    let mut sessions = state.sessions.list();
    sessions.sort_by(|a, b| b.created_at.0.cmp(&a.created_at.0));
    let scoped = sessions
        .into_iter()
        .filter(|s| key.role == overseer_core::types::Role::Admin || s.tenant == key.tenant)
        .take(query.limit)
        .map(|s| SessionSummary {
            session_id: s.id.to_string(),
            tenant: s.tenant.map(|t| t.0),
            profile: s.profile_name,
            created_at: s.created_at.to_string(),
        })
        .collect();
    Ok(Json(scoped))
}

#[derive(Debug, Serialize)]
pub struct SessionDetail {
    session_id: String,
    tenant: Option<String>,
    profile: String,
    created_at: String,
    next_tools: Vec<String>,
}

/// `GET /sessions/{id}`.
///
/// # Errors
///
/// Returns [`GatewayError::Policy`] if the key fails the policy layer, or
/// [`GatewayError::UnknownSession`] if `id` doesn't exist.
pub async fn get_session(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> GatewayResult<Json<SessionDetail>> {
    let session_id = overseer_core::types::SessionId(id);
    let request = PolicyRequest {
        method: "GET".to_string(),
        path: format!("/sessions/{session_id}"),
        tenant: None,
        session: Some(session_id.clone()),
        tool: None,
        budget_tokens: 0,
    };
    let key = authorize(&state, &headers, &request)?;

    let session = state
        .sessions
        .get(&session_id)
        .ok_or_else(|| GatewayError::UnknownSession(session_id.to_string()))?;
    enforce_session_scope(session.tenant.as_ref(), &key)?;

    Ok(Json(SessionDetail {
        session_id: session.id.to_string(),
        tenant: session.tenant.map(|t| t.0),
        profile: session.profile_name,
        created_at: session.created_at.to_string(),
        next_tools: session.next_tools,
    }))
}

#[derive(Debug, Deserialize)]
pub struct UpdateSettingsRequest {
    profile: String,
    #[serde(default)]
    overrides: Map<String, Value>,
}

#[derive(Debug, Serialize)]
pub struct UpdateSettingsResponse {
    profile: String,
    settings: Map<String, Value>,
}

/// `PUT /session/{id}/settings` — admin only.
///
/// # Errors
///
/// Returns [`GatewayError::Policy`] if the key fails the policy layer or
/// isn't an admin, or [`GatewayError::UnknownSession`] if `id` doesn't exist.
pub async fn update_settings(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<UpdateSettingsRequest>,
) -> GatewayResult<Json<UpdateSettingsResponse>> {
    let session_id = overseer_core::types::SessionId(id);
    let request = PolicyRequest {
        method: "PUT".to_string(),
        path: format!("/session/{session_id}/settings"),
        tenant: None,
        session: Some(session_id.clone()),
        tool: None,
        budget_tokens: 0,
    };
    let key = authorize(&state, &headers, &request)?;
    require_admin(&key)?;

    state
        .sessions
        .update_settings(&session_id, body.profile.clone(), body.overrides.clone())
        .map_err(GatewayError::from)?;
    let settings = overseer_config::resolve(&body.profile, &body.overrides, state.profiles.as_ref());

    let data = settings.to_json_map();
    state.event_bus.broadcast(overseer_events::PipelineEvent::new(
        "settings_update",
        session_id,
        data.clone(),
    ));

    Ok(Json(UpdateSettingsResponse {
        profile: body.profile,
        settings: data,
    }))
}
