//! `POST /eyes/{tool-path}` (§6.1): the single entry point every Eye call
//! goes through — policy layer, tenant scope, pipeline ordering, settings
//! resolution, then dispatch (§2 "Data flow for a tool invocation").

use std::str::FromStr;

use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::Json;
use overseer_core::{RequestEnvelope, ResponseEnvelope, Tool};
use serde_json::{json, Map};

use crate::auth::{authorize, PolicyRequest};
use crate::error::{GatewayError, GatewayResult};
use crate::routes::enforce_session_scope;
use crate::state::AppState;

/// `POST /eyes/{tool-path}`, where `tool_path` is e.g. `"sharingan/clarify"`.
///
/// # Errors
///
/// Returns [`GatewayError::UnknownTool`] if `tool_path` doesn't name one of
/// the 13 Eyes, [`GatewayError::Policy`] if the key fails the policy layer,
/// [`GatewayError::UnknownSession`] if the envelope's session doesn't exist,
/// or [`GatewayError::OutOfOrder`] if the pipeline rejects the call.
pub async fn invoke(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(tool_path): Path<String>,
    Json(mut envelope): Json<RequestEnvelope>,
) -> GatewayResult<Json<ResponseEnvelope>> {
    let tool = Tool::from_str(&tool_path).map_err(|_| GatewayError::UnknownTool(tool_path.clone()))?;

    let request = PolicyRequest {
        method: "POST".to_string(),
        path: format!("/eyes/{tool_path}"),
        tenant: envelope.context.tenant.clone(),
        session: Some(envelope.context.session_id.clone()),
        tool: Some(tool),
        budget_tokens: envelope.context.budget_tokens,
    };
    let key = authorize(&state, &headers, &request)?;

    let session = state
        .sessions
        .get(&envelope.context.session_id)
        .ok_or_else(|| GatewayError::UnknownSession(envelope.context.session_id.to_string()))?;
    enforce_session_scope(session.tenant.as_ref(), &key)?;

    overseer_pipeline::check_and_advance(&state.sessions, &envelope.context.session_id, tool)?;

    let settings = overseer_config::resolve(&session.profile_name, &session.overrides, state.profiles.as_ref());
    envelope.context.settings = settings.to_json_map();

    let response = overseer_eyes::dispatch(tool, &envelope);

    state.event_log.append(
        envelope.context.session_id.clone(),
        overseer_storage::PipelineEventType::EyeUpdate,
        Some(response.tag.clone()),
        Some(response.ok),
        Some(response.code.as_str().to_string()),
        Some(tool.version().to_string()),
        Some(response.md.clone()),
        response.data.clone(),
    );

    let mut event_data = Map::new();
    event_data.insert("tag".to_string(), json!(response.tag));
    event_data.insert("ok".to_string(), json!(response.ok));
    event_data.insert("code".to_string(), json!(response.code.as_str()));
    event_data.insert("tool_version".to_string(), json!(tool.version()));
    event_data.insert("md".to_string(), json!(response.md));
    event_data.insert("next".to_string(), json!(response.next));
    event_data.insert("data".to_string(), json!(response.data));
    state.event_bus.broadcast(overseer_events::PipelineEvent::new(
        "eye_update",
        envelope.context.session_id.clone(),
        event_data,
    ));

    Ok(Json(response))
}
