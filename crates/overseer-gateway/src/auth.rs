//! `X-API-Key` extraction and the thin wrapper around [`PolicyLayer::authorize`]
//! every protected handler calls before touching its own state.

use axum::http::HeaderMap;
use overseer_capabilities::ApiKey;
use overseer_core::types::Role;

use crate::error::GatewayError;
use crate::state::AppState;

pub use overseer_approval::PolicyRequest;

/// Pull the raw secret out of the `X-API-Key` header.
///
/// # Errors
///
/// Returns [`GatewayError::Policy`] with [`overseer_approval::PolicyError::KeyNotFound`]
/// if the header is absent or not valid UTF-8 — the same outcome as an
/// unrecognized key, since the policy layer has no way to distinguish the two.
pub fn raw_api_key(headers: &HeaderMap) -> Result<&str, GatewayError> {
    headers
        .get("x-api-key")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| GatewayError::Policy(overseer_approval::PolicyError::KeyNotFound))
}

/// Run the full policy layer for one request (§4.3) and return the
/// authenticated key.
///
/// # Errors
///
/// Returns [`GatewayError::Policy`] for any of the ordered policy-layer
/// rejections (401/403/429).
pub fn authorize(state: &AppState, headers: &HeaderMap, request: &PolicyRequest) -> Result<ApiKey, GatewayError> {
    let raw = raw_api_key(headers)?;
    state.policy.authorize(raw, request).map_err(GatewayError::Policy)
}

/// Require the authenticated key to carry the admin role (§6.1 `PUT
/// /session/{id}/settings` "admin").
///
/// # Errors
///
/// Returns [`GatewayError::Policy`] with [`overseer_approval::PolicyError::ToolNotAllowed`]
/// reused here as the closest-fitting 403 when the key is not an admin —
/// the policy layer has no dedicated "role forbidden" variant since only
/// this one endpoint needs it.
pub fn require_admin(key: &ApiKey) -> Result<(), GatewayError> {
    if key.role == Role::Admin {
        Ok(())
    } else {
        Err(GatewayError::Policy(overseer_approval::PolicyError::ToolNotAllowed))
    }
}
