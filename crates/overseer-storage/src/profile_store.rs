//! DashMap-backed implementation of [`overseer_config::resolver::ProfileStore`].

use dashmap::DashMap;
use overseer_config::resolver::ProfileStore;
use overseer_config::Profile;

/// Persists named profiles in-process (§4.5 "persisted on first use").
#[derive(Debug, Default)]
pub struct InMemoryProfileStore {
    profiles: DashMap<String, Profile>,
}

impl InMemoryProfileStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProfileStore for InMemoryProfileStore {
    fn get(&self, name: &str) -> Option<Profile> {
        self.profiles.get(name).map(|entry| entry.clone())
    }

    fn put(&self, profile: Profile) {
        self.profiles.insert(profile.name.clone(), profile);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use overseer_config::resolve_profile;

    #[test]
    fn unknown_profile_falls_back_and_is_persisted() {
        let store = InMemoryProfileStore::new();
        let profile = resolve_profile("does-not-exist", &store);
        assert_eq!(profile.name, "enterprise");
        assert!(store.get("does-not-exist").is_some());
    }

    #[test]
    fn put_then_get_round_trips() {
        let store = InMemoryProfileStore::new();
        let profile = resolve_profile("security", &store);
        assert_eq!(store.get("security").unwrap().name, "security");
    }
}
