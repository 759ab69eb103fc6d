//! Capability-layer errors.

use thiserror::Error;

/// Errors raised while looking up or mutating API keys.
#[derive(Debug, Error)]
pub enum CapabilityError {
    /// No key matches the presented secret's hash.
    #[error("unknown api key")]
    KeyNotFound,

    /// The key exists but has been revoked.
    #[error("api key {key_id} is revoked")]
    KeyRevoked {
        /// The revoked key's id.
        key_id: String,
    },

    /// The key exists but has expired.
    #[error("api key {key_id} expired at {expires_at}")]
    KeyExpired {
        /// The expired key's id.
        key_id: String,
        /// Its expiry timestamp, rendered for the error message.
        expires_at: String,
    },
}

/// Result alias for capability operations.
pub type CapabilityResult<T> = Result<T, CapabilityError>;
