//! Route handler modules and the shared tenant-scoping check they all use.

pub mod events;
pub mod eyes;
pub mod health;
pub mod session;
pub mod ws;

use axum::http::HeaderMap;
use overseer_capabilities::ApiKey;
use overseer_core::types::{Role, SessionId, TenantId};

use crate::auth::{authorize, PolicyRequest};
use crate::error::{GatewayError, GatewayResult};
use crate::state::AppState;

/// A session's tenant, once set, cannot drift (§3 invariant): a non-admin
/// key may only act on sessions whose tenant matches its own.
///
/// # Errors
///
/// Returns [`GatewayError::Policy`] wrapping [`overseer_approval::PolicyError::TenantMismatch`]
/// if the key is not an admin and the tenants differ.
pub fn enforce_session_scope(session_tenant: Option<&TenantId>, key: &ApiKey) -> Result<(), GatewayError> {
    if key.role == Role::Admin {
        return Ok(());
    }
    if session_tenant != key.tenant.as_ref() {
        return Err(GatewayError::Policy(overseer_approval::PolicyError::TenantMismatch));
    }
    Ok(())
}

/// Authenticate, then enforce [`enforce_session_scope`] against the named
/// session. Shared by every `/session/{id}/...` handler that doesn't also
/// need the session body itself.
///
/// # Errors
///
/// Returns [`GatewayError::Policy`] if the key fails the policy layer, or
/// [`GatewayError::UnknownSession`] if `session_id` doesn't exist.
pub fn authorize_scoped(
    state: &AppState,
    headers: &HeaderMap,
    method: &str,
    path: &str,
    session_id: &SessionId,
) -> GatewayResult<()> {
    let request = PolicyRequest {
        method: method.to_string(),
        path: path.to_string(),
        tenant: None,
        session: Some(session_id.clone()),
        tool: None,
        budget_tokens: 0,
    };
    let key = authorize(state, headers, &request)?;
    let session = state
        .sessions
        .get(session_id)
        .ok_or_else(|| GatewayError::UnknownSession(session_id.to_string()))?;
    enforce_session_scope(session.tenant.as_ref(), &key)
}
