//! `WS /ws/pipeline/{id}` (§2 "Control flow for a subscriber", §4.6).

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::response::Response;
use overseer_core::types::SessionId;
use tracing::debug;

use crate::error::GatewayResult;
use crate::routes::authorize_scoped;
use crate::state::AppState;

/// `GET /ws/pipeline/{id}` — upgrades to a WebSocket, then streams the
/// session's settings snapshot, its replayed history, and live events.
///
/// # Errors
///
/// Returns [`crate::error::GatewayError::Policy`] if the key fails the
/// policy layer, or [`crate::error::GatewayError::UnknownSession`] if `id`
/// doesn't exist. Both are checked before the upgrade completes.
pub async fn subscribe(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    ws: WebSocketUpgrade,
) -> GatewayResult<Response> {
    let session_id = SessionId(id);
    authorize_scoped(&state, &headers, "GET", &format!("/ws/pipeline/{session_id}"), &session_id)?;

    Ok(ws.on_upgrade(move |socket| stream_session(socket, state, session_id)))
}

async fn stream_session(mut socket: WebSocket, state: AppState, session_id: SessionId) {
    let settings = state
        .sessions
        .get(&session_id)
        .map(|s| overseer_config::resolve(&s.profile_name, &s.overrides, state.profiles.as_ref()).to_json_map())
        .unwrap_or_default();
    let (subscriber_id, mut events) = state.event_bus.register(&session_id, settings);

    loop {
        tokio::select! {
            incoming = socket.recv() => {
                match incoming {
                    Some(Ok(Message::Ping(payload))) => {
                        if socket.send(Message::Pong(payload)).await.is_err() {
                            break;
                        }
                    },
                    Some(Ok(Message::Text(text))) if text.trim() == "ping" => {
                        if socket.send(Message::Text("pong".into())).await.is_err() {
                            break;
                        }
                    },
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(_)) => break,
                    _ => {},
                }
            },
            event = events.recv() => {
                let Some(event) = event else { break };
                let Ok(payload) = serde_json::to_string(event.as_ref()) else { continue };
                if socket.send(Message::Text(payload)).await.is_err() {
                    break;
                }
            },
        }
    }

    debug!(session = %session_id, subscriber_id, "pipeline subscriber disconnected");
    state.event_bus.unregister(&session_id, subscriber_id);
}
