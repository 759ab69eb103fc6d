//! Prompt Helper (§4.4.3): assembles the ROLE/TASK/CONTEXT/REQUIREMENTS/OUTPUT
//! optimized-prompt block from the user's prompt and Sharingan's clarification
//! answers.

use once_cell::sync::Lazy;
use overseer_core::{RequestEnvelope, ResponseEnvelope, StatusCode};
use serde::Deserialize;
use serde_json::{json, Map, Value};

use crate::harness::{example_envelope, respond, run};

const TAG: &str = "[EYE/HELPER]";

static EXAMPLE: Lazy<Value> = Lazy::new(|| {
    example_envelope(
        json!({"user_prompt": "Summarize Q2 churn drivers", "clarification_answers_md": "- Audience is the leadership team\n- Scope is enterprise accounts"}),
        false,
    )
});

#[derive(Debug, Deserialize)]
struct Payload {
    user_prompt: String,
    clarification_answers_md: String,
}

fn sanitize_lines(markdown: &str) -> Vec<String> {
    markdown
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(|l| l.trim_start_matches(['-', ' ']).to_string())
        .collect()
}

fn build_prompt_md(user_prompt: &str, clarifications_md: &str) -> String {
    let clarifications = sanitize_lines(clarifications_md);
    let context_section = if clarifications.is_empty() {
        "- No additional clarifications supplied.".to_string()
    } else {
        clarifications.iter().map(|l| format!("- {l}")).collect::<Vec<_>>().join("\n")
    };

    format!(
        "### Optimized Prompt\nROLE: Host analyst acting on behalf of the requester\nTASK: {}\nCONTEXT:\n{}\nREQUIREMENTS:\n- Follow the clarified constraints and cite sources when appropriate.\nOUTPUT:\n- Deliverable that satisfies the clarified intent with actionable detail.",
        user_prompt.trim(),
        context_section,
    )
}

/// Run Prompt Helper.
#[must_use]
pub fn run_eye(env: &RequestEnvelope) -> ResponseEnvelope {
    run::<Payload, _>(TAG, &EXAMPLE, env, None, |payload, _env| {
        let prompt_md = build_prompt_md(&payload.user_prompt, &payload.clarification_answers_md);

        let mut data = Map::new();
        data.insert("prompt_md".into(), json!(prompt_md));
        data.insert(
            "instructions_md".into(),
            json!("### Instructions\nReview the optimized prompt for accuracy, then send it to jogan/confirm_intent unedited or with corrections."),
        );
        data.insert(
            "next_action_md".into(),
            json!("### Next Action\nSend the optimized prompt to jogan/confirm_intent."),
        );

        respond(
            TAG,
            true,
            StatusCode::OkPromptReady,
            "### Prompt Ready\nPrompt ready for confirmation.",
            data,
            "Send the optimized prompt to jogan/confirm_intent.",
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use overseer_core::{Lang, RequestContext, SessionId};

    #[test]
    fn assembles_all_five_sections() {
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
            payload: json!({"user_prompt": "Write the thing", "clarification_answers_md": "- scope is narrow"}),
            reasoning_md: None,
        };
        let response = run_eye(&env);
        let prompt_md = response.data.get("prompt_md").and_then(Value::as_str).unwrap();
        for section in ["ROLE:", "TASK:", "CONTEXT:", "REQUIREMENTS:", "OUTPUT:"] {
            assert!(prompt_md.contains(section), "missing {section}");
        }
        assert!(prompt_md.contains("scope is narrow"));
        assert!(response.data.contains_key("instructions_md"));
    }
}
