//! Route table assembly (§6.1).

use axum::routing::{get, post, put};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::routes::{events, eyes, health, session, ws};
use crate::state::AppState;

/// Build the full HTTP+WS router over a constructed [`AppState`].
#[must_use]
pub fn build(state: AppState) -> Router {
    Router::new()
        .route("/health/live", get(health::live))
        .route("/health/ready", get(health::ready))
        .route("/session", post(session::create_session))
        .route("/sessions", get(session::list_sessions))
        .route("/sessions/:id", get(session::get_session))
        .route("/session/:id/settings", put(session::update_settings))
        .route("/eyes/*tool_path", post(eyes::invoke))
        .route("/session/:id/events", get(events::list_events))
        .route("/session/:id/clarifications", post(events::submit_clarification))
        .route("/session/:id/resubmit", post(events::request_resubmit))
        .route("/ws/pipeline/:id", get(ws::subscribe))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
