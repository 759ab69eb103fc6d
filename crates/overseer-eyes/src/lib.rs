//! The 13 deterministic Eye validators (§4.4): pure functions from a
//! [`overseer_core::RequestEnvelope`] to a [`overseer_core::ResponseEnvelope`],
//! each grounded in exactly one entry of [`overseer_core::tool::Tool`].

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]

pub mod byakugan;
pub mod harness;
pub mod helper;
pub mod jogan;
pub mod mangekyo;
pub mod navigator;
pub mod prelude;
pub mod rinnegan;
pub mod sharingan;
pub mod tenseigan;

use overseer_core::{RequestEnvelope, ResponseEnvelope, Tool};

/// Dispatch a request to the Eye named by `tool`.
///
/// This is the single place that maps the closed [`Tool`] enum onto its
/// implementing function; the gateway and pipeline never match on `tool`
/// themselves.
#[must_use]
pub fn dispatch(tool: Tool, env: &RequestEnvelope) -> ResponseEnvelope {
    match tool {
        Tool::OverseerNavigator => navigator::run_eye(env),
        Tool::SharinganClarify => sharingan::run_eye(env),
        Tool::HelperRewritePrompt => helper::run_eye(env),
        Tool::JoganConfirmIntent => jogan::run_eye(env),
        Tool::RinneganPlanRequirements => rinnegan::run_plan_requirements(env),
        Tool::RinneganPlanReview => rinnegan::run_plan_review(env),
        Tool::RinneganFinalApproval => rinnegan::run_final_approval(env),
        Tool::MangekyoReviewScaffold => mangekyo::run_review_scaffold(env),
        Tool::MangekyoReviewImpl => mangekyo::run_review_impl(env),
        Tool::MangekyoReviewTests => mangekyo::run_review_tests(env),
        Tool::MangekyoReviewDocs => mangekyo::run_review_docs(env),
        Tool::TenseiganValidateClaims => tenseigan::run_eye(env),
        Tool::ByakuganConsistencyCheck => byakugan::run_eye(env),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use overseer_core::{Lang, RequestContext, SessionId};
    use serde_json::{json, Map};

    #[test]
    fn dispatch_reaches_every_tool() {
        for tool in Tool::ALL {
            let env = RequestEnvelope {
                context: RequestContext {
                    session_id: SessionId::new(),
                    user_id: None,
                    tenant: None,
                    lang: Lang::En,
                    budget_tokens: 0,
                    request_id: None,
                    settings: Map::new(),
                },
                payload: json!({}),
                reasoning_md: None,
            };
            // Every tool must produce a well-formed envelope even on a
            // maximally empty payload: either a schema/reasoning rejection
            // or a genuine result, never a panic.
            let response = dispatch(tool, &env);
            assert_eq!(response.tag, tool.eye_tag());
        }
    }
}
