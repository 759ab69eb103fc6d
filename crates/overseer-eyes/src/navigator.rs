//! Overseer Navigator (§4.4.1): the entry-point guide, reset-pipeline side effect.

use overseer_core::{RequestEnvelope, ResponseEnvelope, StatusCode, Tool};
use once_cell::sync::Lazy;
use serde::Deserialize;
use serde_json::{json, Map, Value};

use crate::harness::{example_envelope, run};

const TAG: &str = "[EYE/OVERSEER]";

#[derive(Debug, Deserialize)]
struct Payload {
    #[serde(default)]
    #[allow(dead_code)]
    goal: Option<String>,
}

static EXAMPLE: Lazy<Value> = Lazy::new(|| example_envelope(json!({"goal": "Generate a quarterly engineering report"}), false));

static CONTRACT: Lazy<Value> = Lazy::new(|| {
    json!({
        "tools": Tool::ALL.iter().map(|t| (t.as_str(), t.version())).collect::<std::collections::BTreeMap<_, _>>(),
    })
});

const INSTRUCTIONS_MD: &str = "### Next Steps\n\
- Call `sharingan/clarify` to score ambiguity and classify the request.\n\
- Use `helper/rewrite_prompt` to assemble a ROLE/TASK/CONTEXT/REQUIREMENTS/OUTPUT brief.\n\
- Run `jogan/confirm_intent` to confirm scope.\n\
- Follow the Code branch (Rinnegan + Mangekyō phases) for implementation work.\n\
- Follow the Text branch (Rinnegan → Tenseigan → Byakugan) for factual or narrative work.\n\
- Finish with `rinnegan/final_approval` once every gate returns `ok=true`.";

const SCHEMA_MD: &str = "### Request Envelope\nEvery tool call uses this JSON wrapper; `context.session_id` stays constant for the session's lifetime.";

/// Run the Overseer Navigator. The orchestrator (the pipeline state
/// machine) is responsible for the side effect this Eye names — resetting
/// the session's `next_tools` allowlist — since that is storage-layer
/// state, not something a pure validator touches.
#[must_use]
pub fn run_eye(env: &RequestEnvelope) -> ResponseEnvelope {
    run::<Payload, _>(TAG, &EXAMPLE, env, None, |payload, _env| {
        let mut summary = "Overseer gateway. Host agents own all deliverables; this navigator establishes the contract for the session.".to_string();
        if let Some(goal) = payload.goal.as_deref().filter(|g| !g.is_empty()) {
            summary.push_str(&format!("\nGoal noted: `{goal}`."));
        }

        let mut data = Map::new();
        data.insert("summary_md".into(), json!(summary));
        data.insert("instructions_md".into(), json!(INSTRUCTIONS_MD));
        data.insert("schema_md".into(), json!(SCHEMA_MD));
        data.insert(
            "example_md".into(),
            json!(format!("```json\n{}\n```", serde_json::to_string_pretty(&*EXAMPLE).unwrap_or_default())),
        );
        data.insert("contract_json".into(), CONTRACT.clone());
        data.insert(
            "next_action_md".into(),
            json!("### Next Action\nStart with sharingan/clarify to evaluate ambiguity."),
        );

        crate::harness::respond(
            TAG,
            true,
            StatusCode::OkOverseerGuide,
            summary,
            data,
            "Start with sharingan/clarify to evaluate ambiguity.",
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use overseer_core::{Lang, RequestContext, SessionId};

    fn env(payload: Value) -> RequestEnvelope {
        RequestEnvelope {
            context: RequestContext {
                session_id: SessionId::new(),
                user_id: None,
                tenant: None,
                lang: Lang::En,
                budget_tokens: 0,
                request_id: None,
                settings: Map::new(),
            },
            payload,
            reasoning_md: None,
        }
    }

    #[test]
    fn returns_guide_with_full_contract() {
        let response = run_eye(&env(json!({})));
        assert!(response.ok);
        assert_eq!(response.code, StatusCode::OkOverseerGuide);
        assert!(response.data.contains_key("contract_json"));
    }

    #[test]
    fn echoes_goal_in_summary() {
        let response = run_eye(&env(json!({"goal": "ship the thing"})));
        assert!(response.md.contains("ship the thing"));
    }
}
