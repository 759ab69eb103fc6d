//! Unauthenticated liveness/readiness probes.

use axum::extract::State;
use axum::Json;
use serde_json::{json, Value};

use crate::state::AppState;

/// `GET /health/live` — the process is up.
pub async fn live() -> Json<Value> {
    Json(json!({ "status": "live" }))
}

/// `GET /health/ready` — the in-process stores are constructed and reachable.
pub async fn ready(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ready",
        "sessions": state.sessions.list().len(),
        "audit_records": state.audit.len(),
    }))
}
