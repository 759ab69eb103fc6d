//! Policy-layer errors, each mapping to a specific HTTP status (§4.3).

use thiserror::Error;

/// Which budget guard rejected a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BudgetExceededReason {
    /// `context.budget_tokens` exceeds `limits.budget.max_per_request`.
    PerRequest,
    /// Cumulative daily tokens would exceed `limits.budget.daily`.
    Daily,
}

impl std::fmt::Display for BudgetExceededReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::PerRequest => "per-request budget exceeded",
            Self::Daily => "daily budget exceeded",
        };
        write!(f, "{s}")
    }
}

/// Failure of the policy layer (§4.3 steps 1-5). Each variant corresponds to
/// a fixed HTTP status via [`PolicyError::http_status`].
#[derive(Debug, Error)]
pub enum PolicyError {
    /// No key matches the presented secret (401).
    #[error("unknown api key")]
    KeyNotFound,
    /// The key has been revoked (403).
    #[error("api key revoked")]
    KeyRevoked,
    /// The key has expired (403).
    #[error("api key expired")]
    KeyExpired,
    /// `context.tenant` doesn't match the key's bound tenant or allowlist (403).
    #[error("Tenant mismatch")]
    TenantMismatch,
    /// The requested tool isn't in the key's tool allowlist (403).
    #[error("tool not allowed for this key")]
    ToolNotAllowed,
    /// The requested tool's branch isn't in the key's branch allowlist (403).
    #[error("branch not allowed for this key")]
    BranchNotAllowed,
    /// The sliding-window rate limit was exceeded (429).
    #[error("rate limit exceeded")]
    RateLimited,
    /// A budget guard rejected the request (403).
    #[error("{0}")]
    BudgetExceeded(BudgetExceededReason),
}

impl PolicyError {
    /// The HTTP status this failure maps to at the gateway boundary.
    #[must_use]
    pub fn http_status(&self) -> u16 {
        match self {
            Self::KeyNotFound => 401,
            Self::KeyRevoked
            | Self::KeyExpired
            | Self::TenantMismatch
            | Self::ToolNotAllowed
            | Self::BranchNotAllowed
            | Self::BudgetExceeded(_) => 403,
            Self::RateLimited => 429,
        }
    }
}

/// Result alias for policy checks.
pub type PolicyResult<T> = Result<T, PolicyError>;
