//! Audit record shape (§4.7, §4.3 step 6).

use overseer_core::tool::Branch;
use overseer_core::types::{Role, SessionId, TenantId, Timestamp};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One append-only audit record. Every authenticated request produces one;
/// every admin action produces one with `action` set explicitly. Never
/// carries the raw API key secret, only its hash.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditRecord {
    /// When the record was written.
    pub timestamp: Timestamp,
    /// Hex SHA-256 hash of the presented secret, if the request authenticated.
    pub hashed_key: Option<String>,
    /// Role the key authenticated as.
    pub role: Option<Role>,
    /// Tenant the request targeted.
    pub tenant: Option<TenantId>,
    /// Session the request targeted, if any.
    pub session: Option<SessionId>,
    /// HTTP method.
    pub method: Option<String>,
    /// Request path.
    pub path: Option<String>,
    /// HTTP status of the outcome.
    pub status: u16,
    /// Tool path invoked, if this was an Eye call.
    pub tool: Option<String>,
    /// Branch the tool belongs to.
    pub branch: Option<Branch>,
    /// `context.budget_tokens` carried on the request.
    pub budget_tokens: Option<i64>,
    /// Explicit admin action name, e.g. `"revoke_key"` (§4.7).
    pub action: Option<String>,
    /// Free-form structured detail (never the raw secret).
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

impl AuditRecord {
    /// Start building a record for an authenticated request outcome.
    #[must_use]
    pub fn for_request(status: u16) -> Self {
        Self {
            timestamp: Timestamp::now(),
            hashed_key: None,
            role: None,
            tenant: None,
            session: None,
            method: None,
            path: None,
            status,
            tool: None,
            branch: None,
            budget_tokens: None,
            action: None,
            metadata: Map::new(),
        }
    }

    /// Start building a record for an explicit admin action.
    #[must_use]
    pub fn for_admin_action(action: impl Into<String>, status: u16) -> Self {
        let mut record = Self::for_request(status);
        record.action = Some(action.into());
        record
    }

    /// Attach the hashed key and role that authenticated the request.
    #[must_use]
    pub fn with_actor(mut self, hashed_key: impl Into<String>, role: Role) -> Self {
        self.hashed_key = Some(hashed_key.into());
        self.role = Some(role);
        self
    }

    /// Attach request routing detail.
    #[must_use]
    pub fn with_request(mut self, method: impl Into<String>, path: impl Into<String>) -> Self {
        self.method = Some(method.into());
        self.path = Some(path.into());
        self
    }

    /// Attach the session and tenant this request targeted.
    #[must_use]
    pub fn with_session(mut self, session: SessionId, tenant: Option<TenantId>) -> Self {
        self.session = Some(session);
        self.tenant = tenant;
        self
    }

    /// Attach Eye-call detail.
    #[must_use]
    pub fn with_tool(mut self, tool: impl Into<String>, branch: Branch) -> Self {
        self.tool = Some(tool.into());
        self.branch = Some(branch);
        self
    }

    /// Attach the accepted token budget for this request.
    #[must_use]
    pub fn with_budget_tokens(mut self, budget_tokens: i64) -> Self {
        self.budget_tokens = Some(budget_tokens);
        self
    }

    /// Attach a metadata key-value pair.
    #[must_use]
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}
