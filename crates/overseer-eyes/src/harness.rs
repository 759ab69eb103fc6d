//! The shared harness every Eye runs through (§4.4): payload schema
//! validation, reasoning-requirement enforcement, a budget guard, then the
//! Eye's own predicate.

use overseer_core::{RequestEnvelope, ResponseEnvelope, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::{json, Map};

fn envelope(tag: &str, ok: bool, code: StatusCode, md: impl Into<String>, data: Map<String, serde_json::Value>, next: impl Into<String>) -> ResponseEnvelope {
    ResponseEnvelope::build(tag, ok, code, md, data, next)
        .expect("harness-constructed envelope stays within its own data-key registry")
}

fn schema_error(tag: &str, example: &serde_json::Value) -> ResponseEnvelope {
    let md = format!(
        "### Invalid Payload\nProvide a payload matching the schema. Minimal example:\n```json\n{}\n```",
        serde_json::to_string_pretty(example).unwrap_or_default()
    );
    envelope(tag, false, StatusCode::EBadPayloadSchema, md, Map::new(), "Re-send the request with a valid payload.")
}

fn reasoning_missing(tag: &str, details: &str, next_action: &str) -> ResponseEnvelope {
    let md = format!("### Rejected\n`reasoning_md` is required {details}");
    envelope(tag, false, StatusCode::EReasoningMissing, md, Map::new(), next_action)
}

fn budget_exceeded(tag: &str) -> ResponseEnvelope {
    let md = "### Budget Exceeded\nAvailable token budget is negative. Increase the budget or split the request.";
    envelope(tag, false, StatusCode::EBudgetExceeded, md, Map::new(), "Adjust budget_tokens and retry.")
}

/// Describes the reasoning requirement for a review-style Eye: the detail
/// clause appended to the rejection message and the `next` directive it
/// carries (§7 kind 4, grounded on each Eye's own resubmit action).
#[derive(Debug, Clone, Copy)]
pub struct ReasoningRequirement {
    /// Appended after "`reasoning_md` is required".
    pub details: &'static str,
    /// `next` directive on rejection.
    pub next_action: &'static str,
}

/// Run the shared harness for one Eye call: deserialize `P` from the
/// envelope payload, enforce reasoning if required, run the budget guard,
/// then hand off to `predicate`.
///
/// `predicate` is the Eye's own pure function; it never needs to re-check
/// schema, reasoning, or budget — the harness has already ruled those out.
pub fn run<P, F>(
    tag: &str,
    example: &serde_json::Value,
    env: &RequestEnvelope,
    reasoning: Option<ReasoningRequirement>,
    predicate: F,
) -> ResponseEnvelope
where
    P: DeserializeOwned,
    F: FnOnce(P, &RequestEnvelope) -> ResponseEnvelope,
{
    let payload: P = match serde_json::from_value(env.payload.clone()) {
        Ok(p) => p,
        Err(_) => return schema_error(tag, example),
    };

    if let Some(req) = reasoning {
        if env.reasoning().is_none() {
            return reasoning_missing(tag, req.details, req.next_action);
        }
    }

    if env.context.budget_tokens < 0 {
        return budget_exceeded(tag);
    }

    predicate(payload, env)
}

/// Build a successful or failing response. A thin wrapper over
/// [`ResponseEnvelope::build`] that panics (rather than propagating a
/// `Result`) on a registry violation, since that is always a bug in the
/// calling Eye, never a reachable runtime condition.
#[must_use]
pub fn respond(
    tag: &str,
    ok: bool,
    code: StatusCode,
    md: impl Into<String>,
    data: Map<String, serde_json::Value>,
    next: impl Into<String>,
) -> ResponseEnvelope {
    envelope(tag, ok, code, md, data, next)
}

/// Read `settings.<key>` as an `f64`, clamped to `[0,1]`, falling back to
/// `default` when absent or not a finite number (§4.5 "resolver always
/// overwrites `context.settings` before any Eye runs").
#[must_use]
pub fn settings_f64(env: &RequestEnvelope, key: &str, default: f64) -> f64 {
    env.context
        .settings
        .get(key)
        .and_then(serde_json::Value::as_f64)
        .map_or(default, |v| v.clamp(0.0, 1.0))
}

/// Read `settings.<key>` as a string, falling back to `default` when absent
/// or not a string.
#[must_use]
pub fn settings_str<'a>(env: &'a RequestEnvelope, key: &str, default: &'a str) -> &'a str {
    env.context
        .settings
        .get(key)
        .and_then(serde_json::Value::as_str)
        .unwrap_or(default)
}

/// Read `settings.<key>` as a `bool`, falling back to `default`.
#[must_use]
pub fn settings_bool(env: &RequestEnvelope, key: &str, default: bool) -> bool {
    env.context
        .settings
        .get(key)
        .and_then(serde_json::Value::as_bool)
        .unwrap_or(default)
}

/// A canonical example request envelope for a given payload, used in
/// `E_BAD_PAYLOAD_SCHEMA` responses.
#[must_use]
pub fn example_envelope(payload: serde_json::Value, reasoning_required: bool) -> serde_json::Value {
    let mut obj = json!({
        "context": {
            "session_id": "sess-example",
            "lang": "auto",
            "budget_tokens": 0,
        },
        "payload": payload,
    });
    if reasoning_required {
        obj["reasoning_md"] = json!("Explain how this submission was validated.");
    }
    obj
}
