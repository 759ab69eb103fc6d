//! Jōgan (§4.4.4): intent confirmation — the refined prompt must carry all
//! five ROLE/TASK/CONTEXT/REQUIREMENTS/OUTPUT sections and a positive token
//! estimate.

use once_cell::sync::Lazy;
use overseer_core::{RequestEnvelope, ResponseEnvelope, StatusCode};
use serde::Deserialize;
use serde_json::{json, Map, Value};

use crate::harness::{example_envelope, respond, run};

const TAG: &str = "[EYE/JOGAN]";
const REQUIRED_SECTIONS: &[&str] = &["ROLE:", "TASK:", "CONTEXT:", "REQUIREMENTS:", "OUTPUT:"];

static EXAMPLE: Lazy<Value> = Lazy::new(|| {
    example_envelope(
        json!({"refined_prompt_md": "ROLE: ...\nTASK: ...\nCONTEXT: ...\nREQUIREMENTS: ...\nOUTPUT: ...", "estimated_tokens": 500}),
        false,
    )
});

#[derive(Debug, Deserialize)]
struct Payload {
    refined_prompt_md: String,
    estimated_tokens: i64,
}

fn missing_sections(markdown: &str) -> Vec<String> {
    let upper = markdown.to_uppercase();
    REQUIRED_SECTIONS
        .iter()
        .filter(|section| !upper.contains(**section))
        .map(|section| section.trim_end_matches(':').to_string())
        .collect()
}

/// Run Jōgan's intent-confirmation check.
#[must_use]
pub fn run_eye(env: &RequestEnvelope) -> ResponseEnvelope {
    run::<Payload, _>(TAG, &EXAMPLE, env, None, |payload, _env| {
        let prompt_md = payload.refined_prompt_md.trim();
        let missing = missing_sections(prompt_md);

        if !missing.is_empty() {
            let issues = format!("Missing sections: {}.", missing.join(", "));
            let mut data = Map::new();
            data.insert("missing_sections".into(), json!(missing));
            data.insert("issues_md".into(), json!(issues));
            return respond(
                TAG,
                false,
                StatusCode::EIntentUnconfirmed,
                format!("### Intent Not Confirmed\n{issues}"),
                data,
                "Rerun jogan/confirm_intent once the refined prompt carries every section.",
            );
        }

        if payload.estimated_tokens <= 0 {
            let issues = "Estimated token count must be greater than zero.";
            let mut data = Map::new();
            data.insert("missing_sections".into(), json!(Vec::<String>::new()));
            data.insert("issues_md".into(), json!(issues));
            return respond(
                TAG,
                false,
                StatusCode::EIntentUnconfirmed,
                format!("### Intent Not Confirmed\n{issues}"),
                data,
                "Rerun jogan/confirm_intent once the refined prompt carries every section.",
            );
        }

        let mut data = Map::new();
        data.insert("missing_sections".into(), json!(Vec::<String>::new()));
        data.insert("issues_md".into(), json!(""));
        respond(
            TAG,
            true,
            StatusCode::OkIntentConfirmed,
            "### Intent Confirmed\nPrompt structure looks complete.",
            data,
            "Proceed to rinnegan/plan_requirements.",
        )
    })
}
