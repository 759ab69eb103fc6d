//! Shared fixtures for the gateway's integration tests (§8, §10.4): an
//! in-process router plus helpers to seed a key and drive one request
//! through it without a real socket bind.

#![allow(dead_code)]

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use overseer_capabilities::{ApiKey, Limits};
use overseer_config::OverseerConfig;
use overseer_core::types::{ApiKeyId, Role, TenantId, Timestamp};
use overseer_gateway::state::AppState;
use serde_json::Value;
use tower::ServiceExt;

pub struct TestApp {
    pub state: AppState,
    pub router: Router,
}

impl TestApp {
    pub fn new() -> Self {
        let state = AppState::new(OverseerConfig::default());
        let router = overseer_gateway::router::build(state.clone());
        Self { state, router }
    }

    /// Issue a key and return its raw secret for the `X-API-Key` header.
    pub fn issue_key(&self, id: &str, role: Role, tenant: Option<&str>) -> String {
        let raw_secret = format!("secret-{id}");
        self.state.capabilities.put(ApiKey {
            id: ApiKeyId(id.to_string()),
            hashed_secret: ApiKey::hash_secret(&raw_secret),
            role,
            tenant: tenant.map(TenantId::from),
            limits: Limits::default(),
            account_id: None,
            created_at: Timestamp::now(),
            expires_at: None,
            revoked_at: None,
            last_used_at: None,
            rotated_at: None,
        });
        raw_secret
    }

    pub async fn request(
        &self,
        method: &str,
        path: &str,
        api_key: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(path).header("content-type", "application/json");
        if let Some(key) = api_key {
            builder = builder.header("x-api-key", key);
        }
        let body = match body {
            Some(v) => Body::from(serde_json::to_vec(&v).unwrap()),
            None => Body::empty(),
        };
        let request = builder.body(body).unwrap();

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap() };
        (status, json)
    }
}

/// Drive a fresh session through `navigator -> sharingan -> helper -> jogan`
/// so the post-Jōgan set (every Code/Text branch tool) is unlocked (§4.2).
pub async fn advance_to_post_jogan(app: &TestApp, api_key: &str, session_id: &str) {
    app.request(
        "POST",
        "/eyes/overseer/navigator",
        Some(api_key),
        Some(envelope(session_id, serde_json::json!({}), None)),
    )
    .await;
    app.request(
        "POST",
        "/eyes/sharingan/clarify",
        Some(api_key),
        Some(envelope(
            session_id,
            serde_json::json!({"prompt": "Refactor the billing module's rounding function in src/billing.rs, fix the bug in the PR, and update tests and docs accordingly please."}),
            None,
        )),
    )
    .await;
    app.request(
        "POST",
        "/eyes/helper/rewrite_prompt",
        Some(api_key),
        Some(envelope(
            session_id,
            serde_json::json!({"user_prompt": "Fix the billing rounding bug", "clarification_answers_md": "- scope is the billing module"}),
            None,
        )),
    )
    .await;
    app.request(
        "POST",
        "/eyes/jogan/confirm_intent",
        Some(api_key),
        Some(envelope(
            session_id,
            serde_json::json!({
                "refined_prompt_md": "ROLE: a\nTASK: b\nCONTEXT: c\nREQUIREMENTS: d\nOUTPUT: e",
                "estimated_tokens": 500,
            }),
            None,
        )),
    )
    .await;
}

/// Build a `RequestEnvelope`-shaped JSON body for `/eyes/{tool}`.
pub fn envelope(session_id: &str, payload: Value, reasoning_md: Option<&str>) -> Value {
    let mut body = serde_json::json!({
        "context": {
            "session_id": session_id,
            "budget_tokens": 1000,
        },
        "payload": payload,
    });
    if let Some(reasoning) = reasoning_md {
        body["reasoning_md"] = Value::String(reasoning.to_string());
    }
    body
}
