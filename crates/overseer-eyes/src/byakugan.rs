//! Byakugan (§4.4.8): consistency scoring against `settings.consistency_tolerance`.

use once_cell::sync::Lazy;
use overseer_core::{RequestEnvelope, ResponseEnvelope, StatusCode};
use regex::Regex;
use serde::Deserialize;
use serde_json::{json, Map, Value};

use crate::harness::{example_envelope, respond, run, settings_f64, ReasoningRequirement};

const TAG: &str = "[EYE/BYAKUGAN]";

static TODO_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\b(todo|tbd|fixme)\b").expect("static pattern"));
static NO_CHANGE_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\bno\s+change\b").expect("static pattern"));
static GROWTH_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(grew|increased|declined|decreased)\b").expect("static pattern"));
static NEVER_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\bnever\b").expect("static pattern"));
static PREVIOUSLY_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\bpreviously\b").expect("static pattern"));

static EXAMPLE: Lazy<Value> = Lazy::new(|| example_envelope(json!({"draft_md": "Revenue grew steadily this quarter."}), true));

#[derive(Debug, Deserialize)]
struct Payload {
    draft_md: String,
}

fn consistency_score(draft_md: &str) -> (f64, Vec<&'static str>) {
    let mut score = 1.0;
    let mut reasons = Vec::new();

    if TODO_PATTERN.is_match(draft_md) {
        score -= 0.4;
        reasons.push("contains an unresolved TODO/TBD/FIXME marker");
    }

    let no_change = NO_CHANGE_PATTERN.is_match(draft_md);
    let growth = GROWTH_PATTERN.is_match(draft_md);
    if no_change && growth {
        score -= 0.3;
        reasons.push("claims \"no change\" alongside a growth or decline term");
    }

    if NEVER_PATTERN.is_match(draft_md) && PREVIOUSLY_PATTERN.is_match(draft_md) {
        score -= 0.3;
        reasons.push("claims \"never\" alongside a \"previously\" reference");
    }

    if no_change && growth {
        score -= 0.2;
    }

    (score.clamp(0.0, 1.0), reasons)
}

/// Run Byakugan's consistency check.
#[must_use]
pub fn run_eye(env: &RequestEnvelope) -> ResponseEnvelope {
    let reasoning = ReasoningRequirement {
        details: "to justify the consistency assessment of the draft.",
        next_action: "Resubmit to byakugan/consistency_check with reasoning_md.",
    };
    run::<Payload, _>(TAG, &EXAMPLE, env, Some(reasoning), |payload, env| {
        let tolerance = settings_f64(env, "consistency_tolerance", 0.85);
        let (score, reasons) = consistency_score(&payload.draft_md);

        if score < tolerance {
            let issues_md = if reasons.is_empty() {
                format!("Consistency score {score:.2} is below the {tolerance:.2} tolerance.")
            } else {
                format!(
                    "Consistency score {score:.2} is below the {tolerance:.2} tolerance: {}.",
                    reasons.join("; ")
                )
            };
            let mut data = Map::new();
            data.insert("consistency_score".into(), json!(score));
            data.insert("issues_md".into(), json!(issues_md));
            return respond(
                TAG,
                false,
                StatusCode::EContradictionDetected,
                format!("### Contradiction Detected\n{issues_md}"),
                data,
                "Resolve the contradiction and resubmit to byakugan/check_consistency.",
            );
        }

        let mut data = Map::new();
        data.insert("consistency_score".into(), json!(score));
        data.insert("issues_md".into(), json!(""));
        respond(
            TAG,
            true,
            StatusCode::OkConsistent,
            "### Consistent\nDraft is internally consistent.",
            data,
            "Proceed to rinnegan/final_approval.",
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use overseer_core::{Lang, RequestContext, SessionId};

    fn env(draft_md: &str, tolerance: Option<f64>) -> RequestEnvelope {
        let mut settings = Map::new();
        if let Some(tolerance) = tolerance {
            settings.insert("consistency_tolerance".into(), json!(tolerance));
        }
        RequestEnvelope {
            context: RequestContext {
                session_id: SessionId::new(),
                user_id: None,
                tenant: None,
                lang: Lang::En,
                budget_tokens: 0,
                request_id: None,
                settings,
            },
            payload: json!({"draft_md": draft_md}),
            reasoning_md: Some("because".to_string()),
        }
    }

    #[test]
    fn missing_reasoning_is_rejected() {
        let mut request = env("Revenue grew steadily this quarter.", None);
        request.reasoning_md = None;
        let response = run_eye(&request);
        assert_eq!(response.code, StatusCode::EReasoningMissing);
    }

    #[test]
    fn clean_draft_is_consistent() {
        let response = run_eye(&env("Revenue grew steadily this quarter.", None));
        assert_eq!(response.code, StatusCode::OkConsistent);
    }

    #[test]
    fn todo_marker_lowers_score_below_tolerance() {
        let response = run_eye(&env("Revenue TODO figure out the number.", None));
        assert_eq!(response.code, StatusCode::EContradictionDetected);
    }

    #[test]
    fn no_change_beside_growth_term_is_a_contradiction() {
        let response = run_eye(&env("There was no change, though revenue grew sharply.", None));
        assert_eq!(response.code, StatusCode::EContradictionDetected);
    }

    #[test]
    fn lenient_tolerance_accepts_a_lower_score() {
        let response = run_eye(&env("Revenue TODO figure out the number.", Some(0.3)));
        assert_eq!(response.code, StatusCode::OkConsistent);
    }
}
