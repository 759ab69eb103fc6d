//! The policy layer: the ordered checks run on every authenticated request (§4.3).

use std::sync::Arc;

use overseer_audit::{AuditLog, AuditRecord};
use overseer_capabilities::{ApiKey, CapabilityError, CapabilityStore};
use overseer_config::OverseerConfig;
use overseer_core::tool::{Branch, Tool};
use overseer_core::types::{SessionId, TenantId};

use crate::budget::BudgetGuard;
use crate::error::{BudgetExceededReason, PolicyError, PolicyResult};
use crate::rate_limit::RateLimiter;

/// Everything about a request the policy layer needs beyond the raw key.
#[derive(Debug, Clone, Default)]
pub struct PolicyRequest {
    /// HTTP method, for the audit record.
    pub method: String,
    /// HTTP path, for the audit record.
    pub path: String,
    /// `context.tenant`, if the request named one.
    pub tenant: Option<TenantId>,
    /// The session this request targets, if any.
    pub session: Option<SessionId>,
    /// The Eye tool this request invokes, if this is a tool call.
    pub tool: Option<Tool>,
    /// `context.budget_tokens` carried on the request.
    pub budget_tokens: i64,
}

/// Runs the ordered policy checks (§4.3) and writes the resulting audit
/// record. Holds the shared, in-process rate-limit and budget counters, so
/// one instance should be shared across all workers.
pub struct PolicyLayer {
    capabilities: Arc<CapabilityStore>,
    audit: Arc<AuditLog>,
    config: OverseerConfig,
    rate_limiter: RateLimiter,
    budget_guard: BudgetGuard,
}

impl PolicyLayer {
    /// Construct a policy layer over shared capability and audit stores.
    #[must_use]
    pub fn new(capabilities: Arc<CapabilityStore>, audit: Arc<AuditLog>, config: OverseerConfig) -> Self {
        Self {
            capabilities,
            audit,
            config,
            rate_limiter: RateLimiter::new(),
            budget_guard: BudgetGuard::new(),
        }
    }

    /// Run every policy check in order and record the outcome. Returns the
    /// authenticated key on success (§4.3 steps 1-6).
    ///
    /// # Errors
    ///
    /// Returns the first [`PolicyError`] encountered, in the order the
    /// checks are specified.
    pub fn authorize(&self, raw_key: &str, request: &PolicyRequest) -> PolicyResult<ApiKey> {
        let key = match self.capabilities.authenticate(raw_key) {
            Ok(key) => key,
            Err(err) => {
                let (policy_err, status) = match err {
                    CapabilityError::KeyNotFound => (PolicyError::KeyNotFound, 401),
                    CapabilityError::KeyRevoked { .. } => (PolicyError::KeyRevoked, 403),
                    CapabilityError::KeyExpired { .. } => (PolicyError::KeyExpired, 403),
                };
                self.record(None, request, status);
                return Err(policy_err);
            },
        };

        if let Err(err) = self.check_tenant(&key, request) {
            self.record(Some(&key), request, err.http_status());
            return Err(err);
        }

        if let Err(err) = self.check_tool_and_branch(&key, request) {
            self.record(Some(&key), request, err.http_status());
            return Err(err);
        }

        if let Err(err) = self.check_rate_limit(&key) {
            self.record(Some(&key), request, err.http_status());
            return Err(err);
        }

        if let Err(err) = self.check_budget(&key, request) {
            self.record(Some(&key), request, err.http_status());
            return Err(err);
        }

        self.capabilities.touch(&key.id);
        self.record(Some(&key), request, 200);
        Ok(key)
    }

    fn check_tenant(&self, key: &ApiKey, request: &PolicyRequest) -> PolicyResult<()> {
        use overseer_core::types::Role;
        if key.role == Role::Admin {
            return Ok(());
        }
        if let Some(bound) = &key.tenant {
            if let Some(requested) = &request.tenant {
                if requested != bound {
                    return Err(PolicyError::TenantMismatch);
                }
            }
        }
        if let Some(allowlist) = &key.limits.tenants {
            if let Some(requested) = &request.tenant {
                if !allowlist.contains(requested) {
                    return Err(PolicyError::TenantMismatch);
                }
            }
        }
        Ok(())
    }

    fn check_tool_and_branch(&self, key: &ApiKey, request: &PolicyRequest) -> PolicyResult<()> {
        let Some(tool) = request.tool else {
            return Ok(());
        };
        if let Some(tools) = &key.limits.tools {
            if !tools.iter().any(|t| t == tool.as_str()) {
                return Err(PolicyError::ToolNotAllowed);
            }
        }
        if let Some(branches) = &key.limits.branches {
            let branch: Branch = tool.branch();
            if !branches.contains(&branch) {
                return Err(PolicyError::BranchNotAllowed);
            }
        }
        Ok(())
    }

    fn check_rate_limit(&self, key: &ApiKey) -> PolicyResult<()> {
        let per_minute = key.limits.per_minute.unwrap_or(self.config.rate_limits.per_minute);
        let window_seconds = key
            .limits
            .window_seconds
            .unwrap_or(self.config.rate_limits.window_seconds);
        if self.rate_limiter.check_and_increment(&key.id, per_minute, window_seconds) {
            Ok(())
        } else {
            Err(PolicyError::RateLimited)
        }
    }

    fn check_budget(&self, key: &ApiKey, request: &PolicyRequest) -> PolicyResult<()> {
        let max_per_request = key
            .limits
            .max_per_request
            .unwrap_or(self.config.budgets.max_per_request);
        if request.budget_tokens > max_per_request {
            return Err(PolicyError::BudgetExceeded(BudgetExceededReason::PerRequest));
        }
        let daily = key.limits.daily.unwrap_or(self.config.budgets.daily);
        if self.budget_guard.check_and_reserve_daily(&key.id, request.budget_tokens, daily) {
            Ok(())
        } else {
            Err(PolicyError::BudgetExceeded(BudgetExceededReason::Daily))
        }
    }

    fn record(&self, key: Option<&ApiKey>, request: &PolicyRequest, status: u16) {
        let mut record = AuditRecord::for_request(status).with_request(request.method.clone(), request.path.clone());
        if let Some(key) = key {
            record = record.with_actor(key.hashed_secret.clone(), key.role);
        }
        if let Some(session) = request.session.clone() {
            record = record.with_session(session, request.tenant.clone());
        }
        if let Some(tool) = request.tool {
            record = record.with_tool(tool.as_str(), tool.branch());
        }
        record = record.with_budget_tokens(request.budget_tokens);
        self.audit.append(record);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use overseer_capabilities::Limits;
    use overseer_core::types::{Role, Timestamp};

    fn layer_with_key(role: Role, tenant: Option<TenantId>) -> (PolicyLayer, &'static str) {
        let capabilities = Arc::new(CapabilityStore::new());
        let raw_secret = "raw-secret-value";
        capabilities.put(ApiKey {
            id: overseer_core::types::ApiKeyId("key_1".to_string()),
            hashed_secret: ApiKey::hash_secret(raw_secret),
            role,
            tenant,
            limits: Limits::default(),
            account_id: None,
            created_at: Timestamp::now(),
            expires_at: None,
            revoked_at: None,
            last_used_at: None,
            rotated_at: None,
        });
        let audit = Arc::new(AuditLog::new());
        let layer = PolicyLayer::new(capabilities, audit, OverseerConfig::default());
        (layer, raw_secret)
    }

    #[test]
    fn unknown_key_is_rejected_with_401() {
        let (layer, _) = layer_with_key(Role::Consumer, None);
        let err = layer
            .authorize("wrong-secret", &PolicyRequest::default())
            .unwrap_err();
        assert_eq!(err.http_status(), 401);
    }

    #[test]
    fn tenant_mismatch_is_rejected_with_403() {
        let (layer, raw) = layer_with_key(Role::Consumer, Some(TenantId::from("ops")));
        let request = PolicyRequest {
            tenant: Some(TenantId::from("other")),
            ..Default::default()
        };
        let err = layer.authorize(raw, &request).unwrap_err();
        assert!(matches!(err, PolicyError::TenantMismatch));
        assert_eq!(err.http_status(), 403);
    }

    #[test]
    fn admin_bypasses_tenant_guard() {
        let (layer, raw) = layer_with_key(Role::Admin, Some(TenantId::from("ops")));
        let request = PolicyRequest {
            tenant: Some(TenantId::from("other")),
            ..Default::default()
        };
        assert!(layer.authorize(raw, &request).is_ok());
    }

    #[test]
    fn per_request_budget_is_enforced() {
        let (layer, raw) = layer_with_key(Role::Consumer, None);
        let request = PolicyRequest {
            budget_tokens: OverseerConfig::default().budgets.max_per_request + 1,
            ..Default::default()
        };
        let err = layer.authorize(raw, &request).unwrap_err();
        assert!(matches!(
            err,
            PolicyError::BudgetExceeded(BudgetExceededReason::PerRequest)
        ));
    }

    #[test]
    fn audit_record_is_written_on_success_without_raw_secret() {
        let (layer, raw) = layer_with_key(Role::Consumer, None);
        assert!(layer.authorize(raw, &PolicyRequest::default()).is_ok());
        let records = layer.audit.all();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].status, 200);
        assert!(records[0].hashed_key.is_some());
    }

    #[test]
    fn rate_limit_rejects_past_the_cap() {
        let (layer, raw) = layer_with_key(Role::Consumer, None);
        let mut config = OverseerConfig::default();
        config.rate_limits.per_minute = 1;
        let capabilities = Arc::new(CapabilityStore::new());
        capabilities.put(ApiKey {
            id: overseer_core::types::ApiKeyId("key_1".to_string()),
            hashed_secret: ApiKey::hash_secret(raw),
            role: Role::Consumer,
            tenant: None,
            limits: Limits::default(),
            account_id: None,
            created_at: Timestamp::now(),
            expires_at: None,
            revoked_at: None,
            last_used_at: None,
            rotated_at: None,
        });
        let layer = PolicyLayer::new(capabilities, Arc::new(AuditLog::new()), config);
        assert!(layer.authorize(raw, &PolicyRequest::default()).is_ok());
        let err = layer.authorize(raw, &PolicyRequest::default()).unwrap_err();
        assert!(matches!(err, PolicyError::RateLimited));
    }
}
