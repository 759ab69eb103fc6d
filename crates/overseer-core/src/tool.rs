//! The fixed registry of 13 tools (Eyes) and the branches they belong to.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

/// One of the three policy branches a tool belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Branch {
    /// Tools every session passes through regardless of code/text split.
    Shared,
    /// Tools only reachable once Sharingan classifies the prompt as code-related.
    Code,
    /// Tools only reachable once Sharingan classifies the prompt as text-related.
    Text,
}

impl fmt::Display for Branch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Shared => "shared",
            Self::Code => "code",
            Self::Text => "text",
        };
        write!(f, "{s}")
    }
}

/// One of the 13 Eyes, identified by its `branch/tool` tool path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Tool {
    /// `overseer/navigator`
    OverseerNavigator,
    /// `sharingan/clarify`
    SharinganClarify,
    /// `helper/rewrite_prompt`
    HelperRewritePrompt,
    /// `jogan/confirm_intent`
    JoganConfirmIntent,
    /// `rinnegan/plan_requirements`
    RinneganPlanRequirements,
    /// `rinnegan/plan_review`
    RinneganPlanReview,
    /// `rinnegan/final_approval`
    RinneganFinalApproval,
    /// `mangekyo/review_scaffold`
    MangekyoReviewScaffold,
    /// `mangekyo/review_impl`
    MangekyoReviewImpl,
    /// `mangekyo/review_tests`
    MangekyoReviewTests,
    /// `mangekyo/review_docs`
    MangekyoReviewDocs,
    /// `tenseigan/validate_claims`
    TenseiganValidateClaims,
    /// `byakugan/consistency_check`
    ByakuganConsistencyCheck,
}

impl Tool {
    /// All 13 tools, in registry order.
    pub const ALL: [Tool; 13] = [
        Self::OverseerNavigator,
        Self::SharinganClarify,
        Self::HelperRewritePrompt,
        Self::JoganConfirmIntent,
        Self::RinneganPlanRequirements,
        Self::RinneganPlanReview,
        Self::RinneganFinalApproval,
        Self::MangekyoReviewScaffold,
        Self::MangekyoReviewImpl,
        Self::MangekyoReviewTests,
        Self::MangekyoReviewDocs,
        Self::TenseiganValidateClaims,
        Self::ByakuganConsistencyCheck,
    ];

    /// The `branch/tool` wire path, e.g. `"sharingan/clarify"`.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::OverseerNavigator => "overseer/navigator",
            Self::SharinganClarify => "sharingan/clarify",
            Self::HelperRewritePrompt => "helper/rewrite_prompt",
            Self::JoganConfirmIntent => "jogan/confirm_intent",
            Self::RinneganPlanRequirements => "rinnegan/plan_requirements",
            Self::RinneganPlanReview => "rinnegan/plan_review",
            Self::RinneganFinalApproval => "rinnegan/final_approval",
            Self::MangekyoReviewScaffold => "mangekyo/review_scaffold",
            Self::MangekyoReviewImpl => "mangekyo/review_impl",
            Self::MangekyoReviewTests => "mangekyo/review_tests",
            Self::MangekyoReviewDocs => "mangekyo/review_docs",
            Self::TenseiganValidateClaims => "tenseigan/validate_claims",
            Self::ByakuganConsistencyCheck => "byakugan/consistency_check",
        }
    }

    /// The `[EYE/TAG]` displayed in response envelopes.
    #[must_use]
    pub fn eye_tag(self) -> &'static str {
        match self {
            Self::OverseerNavigator => "[EYE/OVERSEER]",
            Self::SharinganClarify => "[EYE/SHARINGAN]",
            Self::HelperRewritePrompt => "[EYE/HELPER]",
            Self::JoganConfirmIntent => "[EYE/JOGAN]",
            Self::RinneganPlanRequirements
            | Self::RinneganPlanReview
            | Self::RinneganFinalApproval => "[EYE/RINNEGAN]",
            Self::MangekyoReviewScaffold
            | Self::MangekyoReviewImpl
            | Self::MangekyoReviewTests
            | Self::MangekyoReviewDocs => "[EYE/MANGEKYO]",
            Self::TenseiganValidateClaims => "[EYE/TENSEIGAN]",
            Self::ByakuganConsistencyCheck => "[EYE/BYAKUGAN]",
        }
    }

    /// The fixed `tool-name@semver` version string emitted in pipeline events
    /// and responses.
    #[must_use]
    pub fn version(self) -> &'static str {
        match self {
            Self::OverseerNavigator => "overseer-navigator@1.0.0",
            Self::SharinganClarify => "sharingan-clarify@1.0.0",
            Self::HelperRewritePrompt => "helper-rewrite-prompt@1.0.0",
            Self::JoganConfirmIntent => "jogan-confirm-intent@1.0.0",
            Self::RinneganPlanRequirements => "rinnegan-plan-requirements@1.0.0",
            Self::RinneganPlanReview => "rinnegan-plan-review@1.0.0",
            Self::RinneganFinalApproval => "rinnegan-final-approval@1.0.0",
            Self::MangekyoReviewScaffold => "mangekyo-review-scaffold@1.0.0",
            Self::MangekyoReviewImpl => "mangekyo-review-impl@1.0.0",
            Self::MangekyoReviewTests => "mangekyo-review-tests@1.0.0",
            Self::MangekyoReviewDocs => "mangekyo-review-docs@1.0.0",
            Self::TenseiganValidateClaims => "tenseigan-validate-claims@1.0.0",
            Self::ByakuganConsistencyCheck => "byakugan-consistency-check@1.0.0",
        }
    }

    /// The policy branch this tool belongs to.
    #[must_use]
    pub fn branch(self) -> Branch {
        match self {
            Self::OverseerNavigator
            | Self::SharinganClarify
            | Self::HelperRewritePrompt
            | Self::JoganConfirmIntent => Branch::Shared,
            Self::RinneganPlanRequirements
            | Self::RinneganPlanReview
            | Self::RinneganFinalApproval
            | Self::MangekyoReviewScaffold
            | Self::MangekyoReviewImpl
            | Self::MangekyoReviewTests
            | Self::MangekyoReviewDocs => Branch::Code,
            Self::TenseiganValidateClaims | Self::ByakuganConsistencyCheck => Branch::Text,
        }
    }

    /// The full set of tools reachable once Jōgan has confirmed intent:
    /// every `Code` and `Text` branch tool, plus `RinneganFinalApproval`
    /// which is reachable from either branch. Sorted lexicographically by
    /// wire path for deterministic emission.
    #[must_use]
    pub fn post_jogan_set() -> BTreeSet<&'static str> {
        Self::ALL
            .iter()
            .filter(|t| t.branch() != Branch::Shared || **t == Self::RinneganFinalApproval)
            .filter(|t| **t != Self::OverseerNavigator)
            .filter(|t| **t != Self::SharinganClarify)
            .filter(|t| **t != Self::HelperRewritePrompt)
            .filter(|t| **t != Self::JoganConfirmIntent)
            .map(|t| t.as_str())
            .collect()
    }
}

impl fmt::Display for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Tool {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| CoreError::UnknownTool(s.to_string()))
    }
}

impl Serialize for Tool {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Tool {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::from_str(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_str() {
        for tool in Tool::ALL {
            assert_eq!(Tool::from_str(tool.as_str()).unwrap(), tool);
        }
    }

    #[test]
    fn post_jogan_set_excludes_pre_jogan_tools() {
        let set = Tool::post_jogan_set();
        assert!(!set.contains(Tool::OverseerNavigator.as_str()));
        assert!(!set.contains(Tool::SharinganClarify.as_str()));
        assert!(set.contains(Tool::RinneganPlanRequirements.as_str()));
        assert!(set.contains(Tool::TenseiganValidateClaims.as_str()));
        assert!(set.contains(Tool::RinneganFinalApproval.as_str()));
    }

    #[test]
    fn post_jogan_set_is_sorted() {
        let set: Vec<&str> = Tool::post_jogan_set().into_iter().collect();
        let mut sorted = set.clone();
        sorted.sort_unstable();
        assert_eq!(set, sorted);
    }

    #[test]
    fn branch_mapping_matches_registry() {
        assert_eq!(Tool::OverseerNavigator.branch(), Branch::Shared);
        assert_eq!(Tool::RinneganPlanReview.branch(), Branch::Code);
        assert_eq!(Tool::ByakuganConsistencyCheck.branch(), Branch::Text);
    }

    #[test]
    fn unknown_tool_path_errors() {
        assert!(Tool::from_str("not/a-tool").is_err());
    }
}
