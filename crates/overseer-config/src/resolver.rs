//! The settings resolver: system defaults ← profile ← session overrides (§4.5).

use serde_json::{Map, Value};
use std::str::FromStr;
use tracing::warn;

use crate::profile::{builtin_profile, EffectiveSettings, MangekyoStrictness, Profile};

/// Storage seam for named profiles. The resolver never persists anything
/// itself; it asks the store for a profile and, on miss, hands the store the
/// built-in fallback to persist for next time (§4.5 "persisted on first use").
pub trait ProfileStore: Send + Sync {
    /// Fetch a previously stored profile by name, if any.
    fn get(&self, name: &str) -> Option<Profile>;
    /// Persist a profile (insert or overwrite).
    fn put(&self, profile: Profile);
}

/// Resolve the named profile, falling back to the built-in table (and
/// `enterprise` beyond that) when the store has never seen this name.
pub fn resolve_profile(name: &str, store: &dyn ProfileStore) -> Profile {
    if let Some(profile) = store.get(name) {
        return profile;
    }
    let fallback = builtin_profile(name).unwrap_or_else(|| {
        warn!(profile = name, "unknown profile, falling back to enterprise");
        builtin_profile("enterprise").expect("enterprise is always registered")
    });
    store.put(fallback.clone());
    fallback
}

/// Overlay a session override map onto a profile's settings, then normalize
/// (clamp numbers, coerce booleans, restrict enum strings) per §4.5.
///
/// Unknown keys in `overrides` are ignored; malformed values for a known key
/// (wrong JSON type, or an enum string outside its known set) are also
/// ignored rather than rejected — the resolver always produces *some* valid
/// effective settings, it never fails the request.
#[must_use]
pub fn apply_overrides(base: EffectiveSettings, overrides: &Map<String, Value>) -> EffectiveSettings {
    let mut settings = base;

    if let Some(v) = overrides.get("ambiguity_threshold").and_then(Value::as_f64) {
        settings.ambiguity_threshold = v;
    }
    if let Some(v) = overrides.get("citation_cutoff").and_then(Value::as_f64) {
        settings.citation_cutoff = v;
    }
    if let Some(v) = overrides
        .get("consistency_tolerance")
        .and_then(Value::as_f64)
    {
        settings.consistency_tolerance = v;
    }
    if let Some(v) = overrides.get("require_rollback").and_then(Value::as_bool) {
        settings.require_rollback = v;
    }
    if let Some(v) = overrides
        .get("mangekyo")
        .and_then(Value::as_str)
        .and_then(|s| MangekyoStrictness::from_str(s).ok())
    {
        settings.mangekyo = v;
    }

    settings.clamped()
}

/// Full resolution: profile lookup (with persist-on-first-use) + override
/// overlay + normalization, ready to attach to `context.settings`.
#[must_use]
pub fn resolve(
    profile_name: &str,
    overrides: &Map<String, Value>,
    store: &dyn ProfileStore,
) -> EffectiveSettings {
    let profile = resolve_profile(profile_name, store);
    apply_overrides(profile.settings, overrides)
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::collections::HashMap;

    #[derive(Default)]
    struct MemProfileStore {
        profiles: Mutex<HashMap<String, Profile>>,
    }

    impl ProfileStore for MemProfileStore {
        fn get(&self, name: &str) -> Option<Profile> {
            self.profiles.lock().get(name).cloned()
        }

        fn put(&self, profile: Profile) {
            self.profiles.lock().insert(profile.name.clone(), profile);
        }
    }

    #[test]
    fn unknown_profile_falls_back_and_persists() {
        let store = MemProfileStore::default();
        let profile = resolve_profile("does-not-exist", &store);
        assert_eq!(profile.name, "enterprise");
        // Second lookup now finds the persisted fallback directly.
        assert!(store.get("does-not-exist").is_some());
    }

    #[test]
    fn overrides_clamp_out_of_range_values() {
        let store = MemProfileStore::default();
        let mut overrides = Map::new();
        overrides.insert("ambiguity_threshold".into(), serde_json::json!(5.0));
        let settings = resolve("enterprise", &overrides, &store);
        assert_eq!(settings.ambiguity_threshold, 1.0);
    }

    #[test]
    fn malformed_enum_override_is_ignored() {
        let store = MemProfileStore::default();
        let mut overrides = Map::new();
        overrides.insert("mangekyo".into(), serde_json::json!("ultra"));
        let settings = resolve("enterprise", &overrides, &store);
        assert_eq!(settings.mangekyo, MangekyoStrictness::Normal);
    }

    #[test]
    fn known_profile_applies_its_own_baseline() {
        let store = MemProfileStore::default();
        let settings = resolve("security", &Map::new(), &store);
        assert_eq!(settings.mangekyo, MangekyoStrictness::Strict);
    }
}
