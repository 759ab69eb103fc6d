//! Mangekyō (§4.4.6): the four code-phase reviewers — scaffold, impl,
//! tests, docs. All four require `reasoning_md` and respect
//! `settings.mangekyo`'s strictness tier.

use once_cell::sync::Lazy;
use overseer_core::{RequestEnvelope, ResponseEnvelope, StatusCode};
use regex::Regex;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::collections::HashSet;

use crate::harness::{example_envelope, respond, run, settings_str, ReasoningRequirement};

const TAG: &str = "[EYE/MANGEKYO]";

static COVERAGE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(lines|branches)\s*:\s*(\d+)%").expect("static pattern"));

fn strictness(env: &RequestEnvelope) -> &'static str {
    match settings_str(env, "mangekyo", "normal") {
        "lenient" => "lenient",
        "strict" => "strict",
        _ => "normal",
    }
}

fn thresholds(level: &str) -> (u32, u32) {
    match level {
        "lenient" => (70, 55),
        "strict" => (85, 75),
        _ => (75, 60),
    }
}

const SCAFFOLD_INTENTS: &[&str] = &["create", "modify", "delete"];

#[derive(Debug, Clone, Deserialize)]
struct ScaffoldFile {
    path: String,
    intent: String,
    reason: String,
}

#[derive(Debug, Deserialize)]
struct ScaffoldPayload {
    files: Vec<ScaffoldFile>,
}

fn scaffold_violations(files: &[ScaffoldFile]) -> Vec<String> {
    if files.is_empty() {
        return vec!["`files` must be a non-empty list.".to_string()];
    }
    let mut issues = Vec::new();
    for file in files {
        if file.path.trim().is_empty() {
            issues.push("an entry has an empty `path`.".to_string());
        }
        if file.reason.trim().is_empty() {
            issues.push(format!("`{}` has an empty `reason`.", file.path));
        }
        if !SCAFFOLD_INTENTS.contains(&file.intent.as_str()) {
            issues.push(format!(
                "`{}` has intent `{}`, must be one of create/modify/delete.",
                file.path, file.intent
            ));
        }
    }
    issues
}

#[derive(Debug, Deserialize)]
struct ImplPayload {
    diffs_md: String,
}

#[derive(Debug, Deserialize)]
struct TestsPayload {
    coverage_summary_md: String,
}

#[derive(Debug, Deserialize)]
struct DocsPayload {
    diffs_md: String,
}

static SCAFFOLD_EXAMPLE: Lazy<Value> = Lazy::new(|| {
    example_envelope(
        json!({"files": [{"path": "src/lib.rs", "intent": "modify", "reason": "add the new endpoint"}]}),
        true,
    )
});
static IMPL_EXAMPLE: Lazy<Value> = Lazy::new(|| example_envelope(json!({"diffs_md": "```diff\n+ fn x() {}\n```"}), true));
static TESTS_EXAMPLE: Lazy<Value> = Lazy::new(|| example_envelope(json!({"coverage_summary_md": "lines: 80%\nbranches: 65%"}), true));
static DOCS_EXAMPLE: Lazy<Value> = Lazy::new(|| example_envelope(json!({"diffs_md": "Updated README with the new endpoint."}), true));

/// `mangekyo/review_scaffold`.
#[must_use]
pub fn run_review_scaffold(env: &RequestEnvelope) -> ResponseEnvelope {
    let reasoning = ReasoningRequirement {
        details: "to explain the proposed scaffold changes.",
        next_action: "Resubmit to mangekyo/review_scaffold with reasoning_md.",
    };
    run::<ScaffoldPayload, _>(TAG, &SCAFFOLD_EXAMPLE, env, Some(reasoning), |payload, env| {
        let level = strictness(env);

        let violations = scaffold_violations(&payload.files);
        if !violations.is_empty() {
            let issues_md = format!(
                "### Scaffold Rejected\n{}",
                violations.iter().map(|v| format!("- {v}")).collect::<Vec<_>>().join("\n")
            );
            let mut data = Map::new();
            data.insert("issues_md".into(), json!(issues_md));
            data.insert("approved".into(), json!(false));
            return respond(TAG, false, StatusCode::EScaffoldIssues, issues_md, data, "Resubmit to mangekyo/review_scaffold.");
        }

        let mut seen = HashSet::new();
        let duplicates: Vec<&str> = payload
            .files
            .iter()
            .filter(|f| !seen.insert(f.path.as_str()))
            .map(|f| f.path.as_str())
            .collect();

        if !duplicates.is_empty() {
            let issues_md = format!(
                "### Scaffold Rejected\n{}",
                duplicates.iter().map(|p| format!("- Duplicate entry for `{p}`")).collect::<Vec<_>>().join("\n")
            );
            let mut data = Map::new();
            data.insert("issues_md".into(), json!(issues_md));
            data.insert("approved".into(), json!(false));
            return respond(TAG, false, StatusCode::EScaffoldIssues, issues_md, data, "Resubmit to mangekyo/review_scaffold.");
        }

        let checklist_md = format!(
            "### Scaffold Checklist\n{}\n- Strictness: {}",
            payload.files.iter().map(|f| format!("- `{}` → {}: {}", f.path, f.intent, f.reason)).collect::<Vec<_>>().join("\n"),
            title_case(level),
        );
        let mut data = Map::new();
        data.insert("checklist_md".into(), json!(checklist_md));
        data.insert("issues_md".into(), json!(""));
        data.insert("approved".into(), json!(true));
        respond(TAG, true, StatusCode::OkScaffoldApproved, "### Scaffold Approved\nScaffold looks ready.", data, "Continue with mangekyo/review_impl.")
    })
}

/// `mangekyo/review_impl`.
#[must_use]
pub fn run_review_impl(env: &RequestEnvelope) -> ResponseEnvelope {
    let reasoning = ReasoningRequirement {
        details: "to share the rationale for implementation changes.",
        next_action: "Resubmit to mangekyo/review_impl with reasoning_md.",
    };
    run::<ImplPayload, _>(TAG, &IMPL_EXAMPLE, env, Some(reasoning), |payload, env| {
        let level = strictness(env);
        if !payload.diffs_md.contains("```diff") {
            let issues_md = "Diff snippets must use ```diff fences.";
            let mut data = Map::new();
            data.insert("issues_md".into(), json!(issues_md));
            data.insert("approved".into(), json!(false));
            return respond(
                TAG,
                false,
                StatusCode::EImplIssues,
                "### Implementation Rejected\nInclude diffs using ```diff``` fences.",
                data,
                "Resubmit to mangekyo/review_impl.",
            );
        }

        let checklist_md = format!("### Implementation Checklist\n- Diff provided\n- Reasoning supplied\n- Strictness: {}", title_case(level));
        let mut data = Map::new();
        data.insert("checklist_md".into(), json!(checklist_md));
        data.insert("issues_md".into(), json!(""));
        data.insert("approved".into(), json!(true));
        respond(TAG, true, StatusCode::OkImplApproved, "### Implementation Approved\nImplementation changes look sound.", data, "Proceed to mangekyo/review_tests.")
    })
}

fn parse_coverage(summary: &str) -> (u32, u32) {
    let mut lines = 0u32;
    let mut branches = 0u32;
    for caps in COVERAGE_PATTERN.captures_iter(summary) {
        let label = caps[1].to_lowercase();
        let value: u32 = caps[2].parse().unwrap_or(0);
        if label == "lines" {
            lines = value;
        } else if label == "branches" {
            branches = value;
        }
    }
    (lines, branches)
}

/// `mangekyo/review_tests`.
#[must_use]
pub fn run_review_tests(env: &RequestEnvelope) -> ResponseEnvelope {
    let reasoning = ReasoningRequirement {
        details: "to explain the regression coverage provided.",
        next_action: "Resubmit to mangekyo/review_tests with reasoning_md.",
    };
    run::<TestsPayload, _>(TAG, &TESTS_EXAMPLE, env, Some(reasoning), |payload, env| {
        let level = strictness(env);
        let (required_lines, required_branches) = thresholds(level);
        let (lines, branches) = parse_coverage(&payload.coverage_summary_md);

        if lines < required_lines || branches < required_branches {
            let issues_md = format!(
                "Coverage insufficient for {level} mode (lines: {lines}% / required {required_lines}%, branches: {branches}% / required {required_branches}%)."
            );
            let mut data = Map::new();
            data.insert("issues_md".into(), json!(issues_md));
            data.insert("approved".into(), json!(false));
            data.insert("coverage".into(), json!({"lines": lines, "branches": branches}));
            return respond(
                TAG,
                false,
                StatusCode::ETestsInsufficient,
                format!("### Tests Rejected\n{issues_md}"),
                data,
                "Resubmit to mangekyo/review_tests.",
            );
        }

        let checklist_md = format!("### Test Checklist\n- Coverage summary provided\n- Reasoning supplied\n- Strictness: {}", title_case(level));
        let mut data = Map::new();
        data.insert("checklist_md".into(), json!(checklist_md));
        data.insert("issues_md".into(), json!(""));
        data.insert("approved".into(), json!(true));
        data.insert("coverage".into(), json!({"lines": lines, "branches": branches}));
        respond(TAG, true, StatusCode::OkTestsApproved, "### Test Gate\nTest coverage meets expectations.", data, "Proceed to mangekyo/review_docs.")
    })
}

/// `mangekyo/review_docs`.
#[must_use]
pub fn run_review_docs(env: &RequestEnvelope) -> ResponseEnvelope {
    let reasoning = ReasoningRequirement {
        details: "to describe documentation updates before submitting.",
        next_action: "Resubmit to mangekyo/review_docs with reasoning_md.",
    };
    run::<DocsPayload, _>(TAG, &DOCS_EXAMPLE, env, Some(reasoning), |payload, env| {
        let level = strictness(env);
        let lower = payload.diffs_md.to_lowercase();
        if !["readme", "docs/", "doc/", "documentation"].iter().any(|t| lower.contains(t)) {
            let issues_md = "Mention README/docs/changelog updates in the diff.";
            let mut data = Map::new();
            data.insert("issues_md".into(), json!(issues_md));
            data.insert("approved".into(), json!(false));
            return respond(
                TAG,
                false,
                StatusCode::EDocsMissing,
                "### Docs Rejected\nReference the documentation artifact being updated.",
                data,
                "Resubmit to mangekyo/review_docs.",
            );
        }

        let checklist_md = format!("### Documentation Checklist\n- Diff references documentation\n- Reasoning supplied\n- Strictness: {}", title_case(level));
        let mut data = Map::new();
        data.insert("checklist_md".into(), json!(checklist_md));
        data.insert("issues_md".into(), json!(""));
        data.insert("approved".into(), json!(true));
        respond(TAG, true, StatusCode::OkDocsApproved, "### Docs Approved\nDocumentation updates look complete.", data, "Proceed to rinnegan/final_approval.")
    })
}

fn title_case(level: &str) -> String {
    let mut chars = level.chars();
    match chars.next() {
        Some(c) => c.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use overseer_core::{Lang, RequestContext, SessionId};

    fn env(payload: Value, reasoning_md: Option<&str>, settings: Map<String, Value>) -> RequestEnvelope {
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
    fn scaffold_rejects_duplicate_paths() {
        let payload = json!({"files": [
            {"path": "a.rs", "intent": "modify", "reason": "x"},
            {"path": "a.rs", "intent": "create", "reason": "y"},
        ]});
        let response = run_review_scaffold(&env(payload, Some("because"), Map::new()));
        assert_eq!(response.code, StatusCode::EScaffoldIssues);
    }

    #[test]
    fn scaffold_rejects_empty_file_list() {
        let response = run_review_scaffold(&env(json!({"files": []}), Some("because"), Map::new()));
        assert_eq!(response.code, StatusCode::EScaffoldIssues);
    }

    #[test]
    fn scaffold_rejects_unknown_intent() {
        let payload = json!({"files": [{"path": "a.rs", "intent": "frobnicate", "reason": "x"}]});
        let response = run_review_scaffold(&env(payload, Some("because"), Map::new()));
        assert_eq!(response.code, StatusCode::EScaffoldIssues);
    }

    #[test]
    fn scaffold_rejects_empty_path_or_reason() {
        let payload = json!({"files": [{"path": "", "intent": "create", "reason": ""}]});
        let response = run_review_scaffold(&env(payload, Some("because"), Map::new()));
        assert_eq!(response.code, StatusCode::EScaffoldIssues);
    }

    #[test]
    fn impl_requires_diff_fence() {
        let response = run_review_impl(&env(json!({"diffs_md": "no fence here"}), Some("because"), Map::new()));
        assert_eq!(response.code, StatusCode::EImplIssues);
    }

    #[test]
    fn tests_respect_strictness_threshold() {
        let mut settings = Map::new();
        settings.insert("mangekyo".into(), json!("strict"));
        let payload = json!({"coverage_summary_md": "lines: 80%\nbranches: 65%"});
        let response = run_review_tests(&env(payload, Some("because"), settings));
        assert_eq!(response.code, StatusCode::ETestsInsufficient);
    }

    #[test]
    fn tests_pass_at_normal_strictness() {
        let payload = json!({"coverage_summary_md": "lines: 80%\nbranches: 65%"});
        let response = run_review_tests(&env(payload, Some("because"), Map::new()));
        assert_eq!(response.code, StatusCode::OkTestsApproved);
    }

    #[test]
    fn docs_requires_a_documentation_mention() {
        let response = run_review_docs(&env(json!({"diffs_md": "fixed a typo"}), Some("because"), Map::new()));
        assert_eq!(response.code, StatusCode::EDocsMissing);
    }
}
