//! Tenseigan (§4.4.7): requires a `### Citations` table whose entries each
//! clear `settings.citation_cutoff`.

use once_cell::sync::Lazy;
use overseer_core::{RequestEnvelope, ResponseEnvelope, StatusCode};
use regex::Regex;
use serde::Deserialize;
use serde_json::{json, Map, Value};

use crate::harness::{example_envelope, respond, run, settings_f64, ReasoningRequirement};

const TAG: &str = "[EYE/TENSEIGAN]";

static CITATIONS_HEADING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)###\s*citations").expect("static pattern"));
static TABLE_ROW: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\|(.+)\|$").expect("static pattern"));

static EXAMPLE: Lazy<Value> = Lazy::new(|| {
    example_envelope(
        json!({"draft_md": "The churn rate declined.\n\n### Citations\n| Source | Claim | Confidence |\n|---|---|---|\n| Q2 report | churn declined | 0.9 |"}),
        true,
    )
});

#[derive(Debug, Deserialize)]
struct CitationEntry {
    statement: String,
    citation: Option<String>,
    confidence: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct Payload {
    draft_md: String,
    #[serde(default)]
    citations: Option<Vec<CitationEntry>>,
}

struct Citation {
    source: String,
    confidence: f64,
}

fn parse_citations(markdown: &str) -> Option<Vec<Citation>> {
    let heading_pos = CITATIONS_HEADING.find(markdown)?.start();
    let section = &markdown[heading_pos..];

    let rows: Vec<&str> = section
        .lines()
        .filter(|line| TABLE_ROW.is_match(line.trim()))
        .collect();
    if rows.len() < 2 {
        return None;
    }

    // Skip the header row and the `---` divider row.
    let mut citations = Vec::new();
    for row in rows.iter().skip(2) {
        let cells: Vec<&str> = row.trim().trim_matches('|').split('|').map(str::trim).collect();
        if cells.is_empty() || cells[0].is_empty() {
            continue;
        }
        let source = cells[0].to_string();
        let confidence = cells
            .iter()
            .rev()
            .find_map(|cell| cell.trim_end_matches('%').parse::<f64>().ok())
            .unwrap_or(0.0);
        citations.push(Citation { source, confidence });
    }

    if citations.is_empty() {
        None
    } else {
        Some(citations)
    }
}

/// Run Tenseigan's citation check.
#[must_use]
pub fn run_eye(env: &RequestEnvelope) -> ResponseEnvelope {
    let reasoning = ReasoningRequirement {
        details: "to justify the claims made in the draft.",
        next_action: "Resubmit to tenseigan/validate_claims with reasoning_md.",
    };
    run::<Payload, _>(TAG, &EXAMPLE, env, Some(reasoning), |payload, env| {
        let cutoff = settings_f64(env, "citation_cutoff", 0.80);
        let citations = parse_citations(&payload.draft_md);

        let Some(citations) = citations else {
            let issues_md = "No ### Citations table with a Source/Claim/Confidence breakdown was found.";
            let mut data = Map::new();
            data.insert("approved".into(), json!(false));
            data.insert("issues_md".into(), json!(issues_md));
            data.insert("weak_citations".into(), json!(Vec::<String>::new()));
            return respond(
                TAG,
                false,
                StatusCode::ECitationsMissing,
                format!("### Citations Missing\n{issues_md}"),
                data,
                "Add a ### Citations table and resubmit.",
            );
        };

        let mut weak: Vec<String> = citations
            .iter()
            .filter(|c| c.source.is_empty() || c.confidence < cutoff)
            .map(|c| c.source.clone())
            .collect();

        if let Some(entries) = &payload.citations {
            for entry in entries {
                let confidence = entry.confidence.unwrap_or(0.0);
                let has_source = entry.citation.as_deref().is_some_and(|c| !c.is_empty());
                if confidence < cutoff || !has_source {
                    weak.push(entry.statement.clone());
                }
            }
        }

        if !weak.is_empty() {
            let issues_md = format!(
                "Citations below the {cutoff:.2} confidence cutoff: {}.",
                weak.join(", ")
            );
            let mut data = Map::new();
            data.insert("approved".into(), json!(false));
            data.insert("issues_md".into(), json!(issues_md));
            data.insert("weak_citations".into(), json!(weak));
            return respond(
                TAG,
                false,
                StatusCode::ECitationsMissing,
                format!("### Citations Too Weak\n{issues_md}"),
                data,
                "Strengthen the weak citations and resubmit.",
            );
        }

        let mut data = Map::new();
        data.insert("approved".into(), json!(true));
        data.insert("issues_md".into(), json!(""));
        data.insert("weak_citations".into(), json!(Vec::<String>::new()));
        respond(
            TAG,
            true,
            StatusCode::OkTextValidated,
            "### Citations Validated\nAll citations clear the confidence cutoff.",
            data,
            "Proceed to byakugan/check_consistency.",
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use overseer_core::{Lang, RequestContext, SessionId};

    fn env(draft_md: &str, reasoning_md: Option<&str>, cutoff: Option<f64>) -> RequestEnvelope {
        env_with_payload(json!({"draft_md": draft_md}), reasoning_md, cutoff)
    }

    fn env_with_payload(payload: Value, reasoning_md: Option<&str>, cutoff: Option<f64>) -> RequestEnvelope {
        let mut settings = Map::new();
        if let Some(cutoff) = cutoff {
            settings.insert("citation_cutoff".into(), json!(cutoff));
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
            payload,
            reasoning_md: reasoning_md.map(str::to_string),
        }
    }

    #[test]
    fn missing_citations_section_is_rejected() {
        let response = run_eye(&env("Plain text with no citations.", Some("because"), None));
        assert_eq!(response.code, StatusCode::ECitationsMissing);
    }

    #[test]
    fn weak_citation_confidence_is_rejected() {
        let draft = "### Citations\n| Source | Claim | Confidence |\n|---|---|---|\n| blog post | x | 0.3 |";
        let response = run_eye(&env(draft, Some("because"), None));
        assert_eq!(response.code, StatusCode::ECitationsMissing);
        assert!(!response.ok);
    }

    #[test]
    fn strong_citations_are_validated() {
        let draft = "### Citations\n| Source | Claim | Confidence |\n|---|---|---|\n| Q2 report | churn declined | 0.92 |";
        let response = run_eye(&env(draft, Some("because"), None));
        assert_eq!(response.code, StatusCode::OkTextValidated);
    }

    #[test]
    fn custom_cutoff_is_respected() {
        let draft = "### Citations\n| Source | Claim | Confidence |\n|---|---|---|\n| Q2 report | churn declined | 0.85 |";
        let response = run_eye(&env(draft, Some("because"), Some(0.90)));
        assert_eq!(response.code, StatusCode::ECitationsMissing);
    }

    #[test]
    fn structured_citation_below_cutoff_is_rejected() {
        let draft = "### Citations\n| Source | Claim | Confidence |\n|---|---|---|\n| Q2 report | churn declined | 0.92 |";
        let payload = json!({
            "draft_md": draft,
            "citations": [{"statement": "Churn declined 4%", "citation": "Q2 report", "confidence": 0.40}],
        });
        let response = run_eye(&env_with_payload(payload, Some("because"), None));
        assert_eq!(response.code, StatusCode::ECitationsMissing);
    }

    #[test]
    fn structured_citation_missing_source_is_rejected() {
        let draft = "### Citations\n| Source | Claim | Confidence |\n|---|---|---|\n| Q2 report | churn declined | 0.92 |";
        let payload = json!({
            "draft_md": draft,
            "citations": [{"statement": "Churn declined 4%", "citation": null, "confidence": 0.95}],
        });
        let response = run_eye(&env_with_payload(payload, Some("because"), None));
        assert_eq!(response.code, StatusCode::ECitationsMissing);
    }

    #[test]
    fn structured_citations_all_strong_are_validated() {
        let draft = "### Citations\n| Source | Claim | Confidence |\n|---|---|---|\n| Q2 report | churn declined | 0.92 |";
        let payload = json!({
            "draft_md": draft,
            "citations": [{"statement": "Churn declined 4%", "citation": "Q2 report", "confidence": 0.95}],
        });
        let response = run_eye(&env_with_payload(payload, Some("because"), None));
        assert_eq!(response.code, StatusCode::OkTextValidated);
    }
}
