//! Profiles — named bundles of Eye-tuning settings (§3 "Profile").

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Mangekyō coverage-review strictness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MangekyoStrictness {
    /// lines 70% / branches 55%
    Lenient,
    /// lines 75% / branches 60%
    Normal,
    /// lines 85% / branches 75%
    Strict,
}

impl MangekyoStrictness {
    /// Minimum `(lines_pct, branches_pct)` coverage required to pass
    /// `mangekyo/review_tests` at this strictness (§4.4.6).
    #[must_use]
    pub fn thresholds(self) -> (f64, f64) {
        match self {
            Self::Lenient => (70.0, 55.0),
            Self::Normal => (75.0, 60.0),
            Self::Strict => (85.0, 75.0),
        }
    }
}

impl fmt::Display for MangekyoStrictness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Lenient => "lenient",
            Self::Normal => "normal",
            Self::Strict => "strict",
        };
        write!(f, "{s}")
    }
}

impl FromStr for MangekyoStrictness {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "lenient" => Ok(Self::Lenient),
            "normal" => Ok(Self::Normal),
            "strict" => Ok(Self::Strict),
            _ => Err(()),
        }
    }
}

/// The resolved settings an Eye sees in `context.settings`, after the
/// system → profile → session-override merge (§4.5).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EffectiveSettings {
    /// Sharingan ambiguity cutoff, `[0,1]`.
    pub ambiguity_threshold: f64,
    /// Tenseigan per-citation confidence cutoff, `[0,1]`.
    pub citation_cutoff: f64,
    /// Byakugan consistency-score cutoff, `[0,1]`.
    pub consistency_tolerance: f64,
    /// Whether Rinnegan plan review requires a Rollback Plan section.
    pub require_rollback: bool,
    /// Mangekyō coverage strictness.
    pub mangekyo: MangekyoStrictness,
}

impl EffectiveSettings {
    /// Clamp every numeric field into its declared range. Booleans and enums
    /// are already total after deserialization, so this is the entirety of
    /// the resolver's normalization pass (§4.5).
    #[must_use]
    pub fn clamped(mut self) -> Self {
        self.ambiguity_threshold = self.ambiguity_threshold.clamp(0.0, 1.0);
        self.citation_cutoff = self.citation_cutoff.clamp(0.0, 1.0);
        self.consistency_tolerance = self.consistency_tolerance.clamp(0.0, 1.0);
        self
    }

    /// Serialize into the flat JSON map carried on `context.settings`.
    #[must_use]
    pub fn to_json_map(self) -> serde_json::Map<String, serde_json::Value> {
        let mut map = serde_json::Map::new();
        map.insert("ambiguity_threshold".into(), self.ambiguity_threshold.into());
        map.insert("citation_cutoff".into(), self.citation_cutoff.into());
        map.insert(
            "consistency_tolerance".into(),
            self.consistency_tolerance.into(),
        );
        map.insert("require_rollback".into(), self.require_rollback.into());
        map.insert("mangekyo".into(), self.mangekyo.to_string().into());
        map
    }
}

impl Default for EffectiveSettings {
    /// The `enterprise` profile, the default built-in (§3).
    fn default() -> Self {
        Self {
            ambiguity_threshold: 0.35,
            citation_cutoff: 0.80,
            consistency_tolerance: 0.85,
            require_rollback: true,
            mangekyo: MangekyoStrictness::Normal,
        }
    }
}

/// A named, persistable settings bundle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    /// Unique profile name.
    pub name: String,
    /// The settings this profile carries.
    pub settings: EffectiveSettings,
}

/// The three built-in profiles (§3). `enterprise` is the system default.
#[must_use]
pub fn builtin_profiles() -> Vec<Profile> {
    vec![
        Profile {
            name: "casual".to_string(),
            settings: EffectiveSettings {
                ambiguity_threshold: 0.50,
                citation_cutoff: 0.60,
                consistency_tolerance: 0.70,
                require_rollback: false,
                mangekyo: MangekyoStrictness::Lenient,
            },
        },
        Profile {
            name: "enterprise".to_string(),
            settings: EffectiveSettings::default(),
        },
        Profile {
            name: "security".to_string(),
            settings: EffectiveSettings {
                ambiguity_threshold: 0.25,
                citation_cutoff: 0.90,
                consistency_tolerance: 0.95,
                require_rollback: true,
                mangekyo: MangekyoStrictness::Strict,
            },
        },
    ]
}

/// Look up a built-in profile by name.
#[must_use]
pub fn builtin_profile(name: &str) -> Option<Profile> {
    builtin_profiles().into_iter().find(|p| p.name == name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enterprise_is_the_default() {
        assert_eq!(EffectiveSettings::default().ambiguity_threshold, 0.35);
    }

    #[test]
    fn clamp_keeps_values_in_range() {
        let s = EffectiveSettings {
            ambiguity_threshold: 1.5,
            citation_cutoff: -0.2,
            consistency_tolerance: 0.5,
            require_rollback: true,
            mangekyo: MangekyoStrictness::Normal,
        }
        .clamped();
        assert_eq!(s.ambiguity_threshold, 1.0);
        assert_eq!(s.citation_cutoff, 0.0);
    }

    #[test]
    fn strictness_thresholds_match_registry() {
        assert_eq!(MangekyoStrictness::Lenient.thresholds(), (70.0, 55.0));
        assert_eq!(MangekyoStrictness::Normal.thresholds(), (75.0, 60.0));
        assert_eq!(MangekyoStrictness::Strict.thresholds(), (85.0, 75.0));
    }
}
