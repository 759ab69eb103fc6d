//! The transition table itself (§4.2): a pure function from "the tool that
//! was just accepted" to "the allowlist for the next call".

use overseer_core::tool::Tool;

/// The `next_tools` allowlist to install after `tool` has just run,
/// sorted lexicographically for deterministic emission (§4.2 "Tie-break").
#[must_use]
pub fn next_allowlist(tool: Tool) -> Vec<String> {
    match tool {
        Tool::OverseerNavigator => vec![Tool::SharinganClarify.as_str().to_string()],
        Tool::SharinganClarify => vec![Tool::HelperRewritePrompt.as_str().to_string()],
        Tool::HelperRewritePrompt => vec![Tool::JoganConfirmIntent.as_str().to_string()],
        // Jōgan, and every tool reachable after it, land on the same
        // post-Jōgan set: the host may interleave code/text branch tools
        // freely until final approval.
        Tool::JoganConfirmIntent
        | Tool::RinneganPlanRequirements
        | Tool::RinneganPlanReview
        | Tool::RinneganFinalApproval
        | Tool::MangekyoReviewScaffold
        | Tool::MangekyoReviewImpl
        | Tool::MangekyoReviewTests
        | Tool::MangekyoReviewDocs
        | Tool::TenseiganValidateClaims
        | Tool::ByakuganConsistencyCheck => Tool::post_jogan_set().into_iter().map(String::from).collect(),
    }
}

/// The allowlist a brand new session starts with (§4.2 "(fresh session)").
/// Mirrored by [`overseer_storage::SessionStore::create`]; kept here too so
/// the transition table documents the whole state space in one file.
#[must_use]
pub fn initial_allowlist() -> Vec<String> {
    vec![Tool::OverseerNavigator.as_str().to_string()]
}
