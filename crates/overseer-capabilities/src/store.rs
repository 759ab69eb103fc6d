//! In-process API key store.

use dashmap::DashMap;
use overseer_core::types::{ApiKeyId, Timestamp};

use crate::error::{CapabilityError, CapabilityResult};
use crate::key::ApiKey;

/// Holds every issued API key, indexed both by id and by hashed secret so a
/// request's presented key can be looked up in O(1) (§4.3 "Key lookup").
#[derive(Debug, Default)]
pub struct CapabilityStore {
    by_id: DashMap<ApiKeyId, ApiKey>,
    by_hash: DashMap<String, ApiKeyId>,
}

impl CapabilityStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite a key.
    pub fn put(&self, key: ApiKey) {
        self.by_hash.insert(key.hashed_secret.clone(), key.id.clone());
        self.by_id.insert(key.id.clone(), key);
    }

    /// Look up a key by its id.
    #[must_use]
    pub fn get(&self, id: &ApiKeyId) -> Option<ApiKey> {
        self.by_id.get(id).map(|entry| entry.clone())
    }

    /// Find the key matching a raw presented secret, validating it is
    /// neither revoked nor expired (§4.3 step 1).
    ///
    /// # Errors
    ///
    /// Returns [`CapabilityError::KeyNotFound`] if no key matches,
    /// [`CapabilityError::KeyRevoked`] if it has been revoked, or
    /// [`CapabilityError::KeyExpired`] if its `expires_at` has passed.
    pub fn authenticate(&self, raw_secret: &str) -> CapabilityResult<ApiKey> {
        let hashed = ApiKey::hash_secret(raw_secret);
        let id = self
            .by_hash
            .get(&hashed)
            .map(|entry| entry.clone())
            .ok_or(CapabilityError::KeyNotFound)?;
        let key = self.by_id.get(&id).map(|e| e.clone()).ok_or(CapabilityError::KeyNotFound)?;

        if key.is_revoked() {
            return Err(CapabilityError::KeyRevoked {
                key_id: key.id.to_string(),
            });
        }
        let now = Timestamp::now();
        if key.is_expired(now) {
            return Err(CapabilityError::KeyExpired {
                key_id: key.id.to_string(),
                expires_at: key
                    .expires_at
                    .map(|t| t.to_string())
                    .unwrap_or_default(),
            });
        }
        Ok(key)
    }

    /// Revoke a key by id. No-op if the id is unknown.
    pub fn revoke(&self, id: &ApiKeyId) {
        if let Some(mut entry) = self.by_id.get_mut(id) {
            entry.revoked_at = Some(Timestamp::now());
        }
    }

    /// Record a successful authenticated use (§4.3 step 6, "touch
    /// `last_used_at`").
    pub fn touch(&self, id: &ApiKeyId) {
        if let Some(mut entry) = self.by_id.get_mut(id) {
            entry.last_used_at = Some(Timestamp::now());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use overseer_core::types::Role;

    fn sample_key(id: &str, secret: &str) -> ApiKey {
        ApiKey {
            id: ApiKeyId(id.to_string()),
            hashed_secret: ApiKey::hash_secret(secret),
            role: Role::Consumer,
            tenant: None,
            limits: crate::key::Limits::default(),
            account_id: None,
            created_at: Timestamp::now(),
            expires_at: None,
            revoked_at: None,
            last_used_at: None,
            rotated_at: None,
        }
    }

    #[test]
    fn authenticate_finds_matching_secret() {
        let store = CapabilityStore::new();
        store.put(sample_key("key_1", "abc123"));
        assert!(store.authenticate("abc123").is_ok());
    }

    #[test]
    fn authenticate_rejects_unknown_secret() {
        let store = CapabilityStore::new();
        store.put(sample_key("key_1", "abc123"));
        assert!(matches!(
            store.authenticate("wrong"),
            Err(CapabilityError::KeyNotFound)
        ));
    }

    #[test]
    fn revoked_key_is_rejected() {
        let store = CapabilityStore::new();
        let key = sample_key("key_1", "abc123");
        let id = key.id.clone();
        store.put(key);
        store.revoke(&id);
        assert!(matches!(
            store.authenticate("abc123"),
            Err(CapabilityError::KeyRevoked { .. })
        ));
    }

    #[test]
    fn expired_key_is_rejected() {
        let store = CapabilityStore::new();
        let mut key = sample_key("key_1", "abc123");
        key.expires_at = Some(Timestamp(chrono::Utc::now() - chrono::Duration::hours(1)));
        store.put(key);
        assert!(matches!(
            store.authenticate("abc123"),
            Err(CapabilityError::KeyExpired { .. })
        ));
    }

    #[test]
    fn touch_updates_last_used() {
        let store = CapabilityStore::new();
        let key = sample_key("key_1", "abc123");
        let id = key.id.clone();
        store.put(key);
        store.touch(&id);
        assert!(store.get(&id).unwrap().last_used_at.is_some());
    }
}
