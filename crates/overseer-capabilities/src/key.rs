//! The API key model (§4.3, §3 "API key").

use overseer_core::tool::Branch;
use overseer_core::types::{ApiKeyId, Role, TenantId, Timestamp};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Per-key overrides of the ambient rate-limit/budget defaults. Any field
/// left `None` falls back to the gateway's configured default (§4.3 "Default
/// (used when a limit is absent from the key)").
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Limits {
    /// Requests allowed per window.
    pub per_minute: Option<u32>,
    /// Window size in seconds.
    pub window_seconds: Option<u64>,
    /// Max `budget_tokens` on a single request.
    pub max_per_request: Option<i64>,
    /// Max cumulative daily tokens.
    pub daily: Option<i64>,
    /// If set, only these tool paths may be invoked with this key.
    pub tools: Option<Vec<String>>,
    /// If set, only these branches may be invoked with this key.
    pub branches: Option<Vec<Branch>>,
    /// If set, only these tenants may be targeted with this key.
    pub tenants: Option<Vec<TenantId>>,
}

/// An API key record (§3). Never holds the raw secret — only its SHA-256
/// hash, hex-encoded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiKey {
    /// Unique key id, e.g. `"key_…"`.
    pub id: ApiKeyId,
    /// Hex-encoded SHA-256 hash of the raw secret.
    pub hashed_secret: String,
    /// The role this key authenticates as.
    pub role: Role,
    /// Bound tenant, if any. `None` means unbound (subject to `limits.tenants`).
    pub tenant: Option<TenantId>,
    /// Per-key limit overrides.
    pub limits: Limits,
    /// Optional external account identifier this key was issued to.
    pub account_id: Option<String>,
    /// When the key was created.
    pub created_at: Timestamp,
    /// When the key expires, if it has a fixed lifetime.
    pub expires_at: Option<Timestamp>,
    /// When the key was revoked, if it has been.
    pub revoked_at: Option<Timestamp>,
    /// When the key was last used for a successful lookup.
    pub last_used_at: Option<Timestamp>,
    /// When the key's secret was last rotated.
    pub rotated_at: Option<Timestamp>,
}

impl ApiKey {
    /// Hash a raw secret the same way lookups do, for comparison/storage.
    #[must_use]
    pub fn hash_secret(raw: &str) -> String {
        let digest = Sha256::digest(raw.as_bytes());
        hex::encode(digest)
    }

    /// `true` once `revoked_at` has been set (§4.1 "An API key with
    /// `revoked_at` set never passes the policy layer").
    #[must_use]
    pub fn is_revoked(&self) -> bool {
        self.revoked_at.is_some()
    }

    /// `true` once `expires_at` is in the past.
    #[must_use]
    pub fn is_expired(&self, now: Timestamp) -> bool {
        self.expires_at.is_some_and(|exp| exp < now)
    }
}
