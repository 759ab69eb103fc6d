//! The closed set of status codes an Eye may return.
//!
//! Any value outside [`StatusCode`]'s variants is a programming error; the
//! harness never constructs a response with a free-form code string.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

/// A status code returned by an Eye, either an `OK_*` success or an `E_*`
/// failure class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusCode {
    /// Overseer navigator guide emitted.
    OkOverseerGuide,
    /// Sharingan found the prompt unambiguous.
    OkNoClarificationNeeded,
    /// Prompt Helper assembled the optimized prompt.
    OkPromptReady,
    /// Jōgan confirmed the refined prompt carries all five sections.
    OkIntentConfirmed,
    /// Rinnegan plan-requirements schema emitted.
    OkSchemaEmitted,
    /// Rinnegan plan review passed.
    OkPlanApproved,
    /// Mangekyō scaffold review passed.
    OkScaffoldApproved,
    /// Mangekyō implementation review passed.
    OkImplApproved,
    /// Mangekyō tests review passed.
    OkTestsApproved,
    /// Mangekyō docs review passed.
    OkDocsApproved,
    /// Tenseigan validated citations.
    OkTextValidated,
    /// Byakugan found the draft consistent.
    OkConsistent,
    /// Rinnegan final approval granted.
    OkAllApproved,

    /// Sharingan flagged the prompt as ambiguous.
    ENeedsClarification,
    /// Jōgan found a required section missing or a non-positive token estimate.
    EIntentUnconfirmed,
    /// Rinnegan plan review found missing sections or a malformed file table.
    EPlanIncomplete,
    /// Mangekyō scaffold review found duplicate paths or an empty file list.
    EScaffoldIssues,
    /// Mangekyō implementation review found no diff fence.
    EImplIssues,
    /// Mangekyō tests review found coverage below the strictness threshold.
    ETestsInsufficient,
    /// Mangekyō docs review found no documentation signal.
    EDocsMissing,
    /// Tenseigan found no citations section, or all citations too weak.
    ECitationsMissing,
    /// Reserved for claims unsupported by any citation (not currently emitted
    /// by any Eye, kept for forward compatibility with the status registry).
    EUnsupportedClaims,
    /// Byakugan found a contradiction below the consistency tolerance.
    EContradictionDetected,
    /// A review-style Eye was called without `reasoning_md`.
    EReasoningMissing,
    /// Rinnegan final approval found one or more phases not yet approved.
    EPhasesIncomplete,
    /// The request payload failed schema validation.
    EBadPayloadSchema,
    /// `context.budget_tokens` was negative.
    EBudgetExceeded,
    /// The prompt matched a prompt-injection guard pattern.
    EPromptGuard,
    /// An unexpected internal error occurred inside the harness.
    EInternalError,
}

impl StatusCode {
    /// `true` for all `OK_*` variants.
    #[must_use]
    pub fn is_ok(self) -> bool {
        self.as_str().starts_with("OK_")
    }

    /// The wire representation, e.g. `"OK_PLAN_APPROVED"`.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::OkOverseerGuide => "OK_OVERSEER_GUIDE",
            Self::OkNoClarificationNeeded => "OK_NO_CLARIFICATION_NEEDED",
            Self::OkPromptReady => "OK_PROMPT_READY",
            Self::OkIntentConfirmed => "OK_INTENT_CONFIRMED",
            Self::OkSchemaEmitted => "OK_SCHEMA_EMITTED",
            Self::OkPlanApproved => "OK_PLAN_APPROVED",
            Self::OkScaffoldApproved => "OK_SCAFFOLD_APPROVED",
            Self::OkImplApproved => "OK_IMPL_APPROVED",
            Self::OkTestsApproved => "OK_TESTS_APPROVED",
            Self::OkDocsApproved => "OK_DOCS_APPROVED",
            Self::OkTextValidated => "OK_TEXT_VALIDATED",
            Self::OkConsistent => "OK_CONSISTENT",
            Self::OkAllApproved => "OK_ALL_APPROVED",
            Self::ENeedsClarification => "E_NEEDS_CLARIFICATION",
            Self::EIntentUnconfirmed => "E_INTENT_UNCONFIRMED",
            Self::EPlanIncomplete => "E_PLAN_INCOMPLETE",
            Self::EScaffoldIssues => "E_SCAFFOLD_ISSUES",
            Self::EImplIssues => "E_IMPL_ISSUES",
            Self::ETestsInsufficient => "E_TESTS_INSUFFICIENT",
            Self::EDocsMissing => "E_DOCS_MISSING",
            Self::ECitationsMissing => "E_CITATIONS_MISSING",
            Self::EUnsupportedClaims => "E_UNSUPPORTED_CLAIMS",
            Self::EContradictionDetected => "E_CONTRADICTION_DETECTED",
            Self::EReasoningMissing => "E_REASONING_MISSING",
            Self::EPhasesIncomplete => "E_PHASES_INCOMPLETE",
            Self::EBadPayloadSchema => "E_BAD_PAYLOAD_SCHEMA",
            Self::EBudgetExceeded => "E_BUDGET_EXCEEDED",
            Self::EPromptGuard => "E_PROMPT_GUARD",
            Self::EInternalError => "E_INTERNAL_ERROR",
        }
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for StatusCode {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "OK_OVERSEER_GUIDE" => Self::OkOverseerGuide,
            "OK_NO_CLARIFICATION_NEEDED" => Self::OkNoClarificationNeeded,
            "OK_PROMPT_READY" => Self::OkPromptReady,
            "OK_INTENT_CONFIRMED" => Self::OkIntentConfirmed,
            "OK_SCHEMA_EMITTED" => Self::OkSchemaEmitted,
            "OK_PLAN_APPROVED" => Self::OkPlanApproved,
            "OK_SCAFFOLD_APPROVED" => Self::OkScaffoldApproved,
            "OK_IMPL_APPROVED" => Self::OkImplApproved,
            "OK_TESTS_APPROVED" => Self::OkTestsApproved,
            "OK_DOCS_APPROVED" => Self::OkDocsApproved,
            "OK_TEXT_VALIDATED" => Self::OkTextValidated,
            "OK_CONSISTENT" => Self::OkConsistent,
            "OK_ALL_APPROVED" => Self::OkAllApproved,
            "E_NEEDS_CLARIFICATION" => Self::ENeedsClarification,
            "E_INTENT_UNCONFIRMED" => Self::EIntentUnconfirmed,
            "E_PLAN_INCOMPLETE" => Self::EPlanIncomplete,
            "E_SCAFFOLD_ISSUES" => Self::EScaffoldIssues,
            "E_IMPL_ISSUES" => Self::EImplIssues,
            "E_TESTS_INSUFFICIENT" => Self::ETestsInsufficient,
            "E_DOCS_MISSING" => Self::EDocsMissing,
            "E_CITATIONS_MISSING" => Self::ECitationsMissing,
            "E_UNSUPPORTED_CLAIMS" => Self::EUnsupportedClaims,
            "E_CONTRADICTION_DETECTED" => Self::EContradictionDetected,
            "E_REASONING_MISSING" => Self::EReasoningMissing,
            "E_PHASES_INCOMPLETE" => Self::EPhasesIncomplete,
            "E_BAD_PAYLOAD_SCHEMA" => Self::EBadPayloadSchema,
            "E_BUDGET_EXCEEDED" => Self::EBudgetExceeded,
            "E_PROMPT_GUARD" => Self::EPromptGuard,
            "E_INTERNAL_ERROR" => Self::EInternalError,
            other => return Err(CoreError::UnknownStatusCode(other.to_string())),
        })
    }
}

impl Serialize for StatusCode {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for StatusCode {
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
        for code in [
            StatusCode::OkPlanApproved,
            StatusCode::ENeedsClarification,
            StatusCode::EInternalError,
        ] {
            let s = code.as_str();
            assert_eq!(StatusCode::from_str(s).unwrap(), code);
        }
    }

    #[test]
    fn is_ok_matches_prefix() {
        assert!(StatusCode::OkConsistent.is_ok());
        assert!(!StatusCode::EContradictionDetected.is_ok());
    }

    #[test]
    fn unknown_code_errors() {
        assert!(StatusCode::from_str("NOT_A_CODE").is_err());
    }
}
