//! Rinnegan (§4.4.5): plan requirements, plan review, and final approval.

use once_cell::sync::Lazy;
use overseer_core::{RequestEnvelope, ResponseEnvelope, StatusCode};
use serde::Deserialize;
use serde_json::{json, Map, Value};

use crate::harness::{example_envelope, respond, run, settings_bool, ReasoningRequirement};

const TAG: &str = "[EYE/RINNEGAN]";

const SCHEMA_SECTIONS: &[&str] = &[
    "High-Level Overview",
    "File Impact Table",
    "Step-by-step Implementation Plan",
    "Error Handling & Edge Cases",
    "Test Strategy",
    "Rollback Plan",
    "Documentation Updates",
];

const TABLE_HEADER: &str = "| Path | Action | Reason |";
const TABLE_DIVIDER: &str = "|---|---|---|";

const SCHEMA_MD: &str = "### Plan Schema\n\
1. High-Level Overview\n\
2. File Impact Table (path, action, reason)\n\
3. Step-by-step Implementation Plan\n\
4. Error Handling & Edge Cases\n\
5. Test Strategy\n\
6. Rollback Plan\n\
7. Documentation Updates";

const EXAMPLE_PLAN_MD: &str = "### Example Plan\n\
1. High-Level Overview — add a notification dropdown to the dashboard header\n\
2. File Impact Table\n\
   | Path | Action | Reason |\n\
   |---|---|---|\n\
   | src/components/Header.tsx | modify | Render bell icon and menu |\n\
3. Step-by-step Implementation Plan — add API client, render icon, implement dropdown\n\
4. Error Handling & Edge Cases — handle network timeouts, empty states\n\
5. Test Strategy — component and integration tests for the badge\n\
6. Rollback Plan — revert the feature flag\n\
7. Documentation Updates — README usage section and changelog entry";

const ACCEPTANCE_CRITERIA_MD: &str = "### Acceptance Criteria\n\
- Plan lists all files to be changed with reasons\n\
- Includes error handling and test strategy\n\
- Includes a rollback plan";

static PLAN_REQUIREMENTS_EXAMPLE: Lazy<Value> = Lazy::new(|| example_envelope(json!({}), false));
static PLAN_REVIEW_EXAMPLE: Lazy<Value> =
    Lazy::new(|| example_envelope(json!({"submitted_plan_md": "### High-Level Overview\n..."}), true));
static FINAL_APPROVAL_EXAMPLE: Lazy<Value> = Lazy::new(|| {
    example_envelope(
        json!({
            "plan_approved": true, "scaffold_approved": true, "impl_approved": true,
            "tests_approved": true, "docs_approved": true, "text_validated": true, "consistent": true,
        }),
        false,
    )
});

#[derive(Debug, Deserialize)]
struct PlanRequirementsPayload {}

#[derive(Debug, Deserialize)]
struct PlanReviewPayload {
    submitted_plan_md: String,
}

#[derive(Debug, Deserialize)]
struct FinalApprovalPayload {
    plan_approved: bool,
    scaffold_approved: bool,
    impl_approved: bool,
    tests_approved: bool,
    docs_approved: bool,
    text_validated: bool,
    consistent: bool,
}

/// `rinnegan/plan_requirements`: static schema emission.
#[must_use]
pub fn run_plan_requirements(env: &RequestEnvelope) -> ResponseEnvelope {
    run::<PlanRequirementsPayload, _>(TAG, &PLAN_REQUIREMENTS_EXAMPLE, env, None, |_payload, _env| {
        let mut data = Map::new();
        data.insert("schema_md".into(), json!(SCHEMA_MD));
        data.insert("example_md".into(), json!(EXAMPLE_PLAN_MD));
        data.insert("acceptance_criteria_md".into(), json!(ACCEPTANCE_CRITERIA_MD));
        respond(
            TAG,
            true,
            StatusCode::OkSchemaEmitted,
            "### Plan Schema\nHost must supply a plan matching the schema.",
            data,
            "Submit the plan to rinnegan/plan_review.",
        )
    })
}

fn missing_sections(markdown: &str, require_rollback: bool) -> Vec<&'static str> {
    SCHEMA_SECTIONS
        .iter()
        .copied()
        .filter(|section| !markdown.contains(section))
        .filter(|section| require_rollback || *section != "Rollback Plan")
        .collect()
}

/// `rinnegan/plan_review`: requires `reasoning_md`; checks the seven
/// section headings and the file-impact table.
#[must_use]
pub fn run_plan_review(env: &RequestEnvelope) -> ResponseEnvelope {
    let reasoning = ReasoningRequirement {
        details: "to explain the plan's rationale.",
        next_action: "Resubmit to rinnegan/plan_review with reasoning_md.",
    };
    run::<PlanReviewPayload, _>(TAG, &PLAN_REVIEW_EXAMPLE, env, Some(reasoning), |payload, env| {
        let require_rollback = settings_bool(env, "require_rollback", true);
        let plan_md = &payload.submitted_plan_md;
        let missing = missing_sections(plan_md, require_rollback);
        let table_present = plan_md.contains(TABLE_HEADER) && plan_md.contains(TABLE_DIVIDER);

        let mut issues = Vec::new();
        if !missing.is_empty() {
            issues.push(format!("Missing sections: {}", missing.join(", ")));
        }
        if !table_present {
            issues.push("File Impact Table must include a Markdown table with Path, Action, Reason columns.".to_string());
        }

        let summary_lines: Vec<String> = SCHEMA_SECTIONS
            .iter()
            .map(|section| {
                let present = !missing.contains(section);
                format!("- [{}] {section}", if present { "x" } else { " " })
            })
            .chain(std::iter::once(format!(
                "- [{}] File impact table uses Markdown columns",
                if table_present { "x" } else { " " }
            )))
            .collect();
        let summary_md = format!("### Plan Checklist\n{}", summary_lines.join("\n"));

        let issues_md = if issues.is_empty() {
            "### Issues\n- None".to_string()
        } else {
            format!("### Issues\n{}", issues.iter().map(|i| format!("- {i}")).collect::<Vec<_>>().join("\n"))
        };

        if !issues.is_empty() {
            let mut data = Map::new();
            data.insert("approved".into(), json!(false));
            data.insert("summary_md".into(), json!(summary_md));
            data.insert("issues_md".into(), json!(issues_md));
            return respond(
                TAG,
                false,
                StatusCode::EPlanIncomplete,
                "### Plan Rejected\nResolve the issues listed before resubmitting.",
                data,
                "Resolve the issues and resubmit to rinnegan/plan_review.",
            );
        }

        let mut data = Map::new();
        data.insert("approved".into(), json!(true));
        data.insert("summary_md".into(), json!(summary_md));
        data.insert("issues_md".into(), json!(issues_md));
        respond(
            TAG,
            true,
            StatusCode::OkPlanApproved,
            "### Plan Approved\nAll acceptance criteria satisfied.",
            data,
            "Proceed to mangekyo/review_scaffold.",
        )
    })
}

/// `rinnegan/final_approval`: seven-phase gate.
#[must_use]
pub fn run_final_approval(env: &RequestEnvelope) -> ResponseEnvelope {
    run::<FinalApprovalPayload, _>(TAG, &FINAL_APPROVAL_EXAMPLE, env, None, |payload, _env| {
        let phases: [(&str, bool); 7] = [
            ("Plan", payload.plan_approved),
            ("Scaffold", payload.scaffold_approved),
            ("Implementation", payload.impl_approved),
            ("Tests", payload.tests_approved),
            ("Docs", payload.docs_approved),
            ("Evidence", payload.text_validated),
            ("Consistency", payload.consistent),
        ];

        let summary_lines: Vec<String> = phases
            .iter()
            .map(|(label, ok)| format!("- {label}: {}", if *ok { "OK" } else { "Pending" }))
            .collect();
        let summary_md = format!("### Summary\n{}", summary_lines.join("\n"));

        let missing: Vec<&str> = phases.iter().filter(|(_, ok)| !ok).map(|(label, _)| *label).collect();
        let phases_json: Map<String, Value> = phases.iter().map(|(label, ok)| (label.to_lowercase(), json!(ok))).collect();

        if !missing.is_empty() {
            let mut data = Map::new();
            data.insert("approved".into(), json!(false));
            data.insert("summary_md".into(), json!(summary_md));
            data.insert("phases".into(), Value::Object(phases_json));
            return respond(
                TAG,
                false,
                StatusCode::EPhasesIncomplete,
                format!("### Final Approval Blocked\nOutstanding phases: {}", missing.join(", ")),
                data,
                "Complete missing phases and resubmit.",
            );
        }

        let mut data = Map::new();
        data.insert("approved".into(), json!(true));
        data.insert("summary_md".into(), json!(summary_md));
        data.insert("phases".into(), Value::Object(phases_json));
        respond(
            TAG,
            true,
            StatusCode::OkAllApproved,
            "### Final Approval\nAll phases approved. Host may deliver the final artifact.",
            data,
            "Return the final deliverable to the user (host action).",
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use overseer_core::{Lang, RequestContext, SessionId};

    fn env(payload: Value, reasoning_md: Option<&str>) -> RequestEnvelope {
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
            reasoning_md: reasoning_md.map(str::to_string),
        }
    }

    #[test]
    fn plan_requirements_emits_schema() {
        let response = run_plan_requirements(&env(json!({}), None));
        assert_eq!(response.code, StatusCode::OkSchemaEmitted);
    }

    #[test]
    fn plan_review_without_reasoning_is_rejected() {
        let response = run_plan_review(&env(json!({"submitted_plan_md": "whatever"}), None));
        assert_eq!(response.code, StatusCode::EReasoningMissing);
    }

    #[test]
    fn plan_review_requires_all_seven_sections() {
        let plan = "### High-Level Overview\ntext";
        let response = run_plan_review(&env(json!({"submitted_plan_md": plan}), Some("because")));
        assert_eq!(response.code, StatusCode::EPlanIncomplete);
    }

    #[test]
    fn plan_review_approves_complete_plan() {
        let plan = SCHEMA_SECTIONS
            .iter()
            .map(|s| format!("### {s}\ndetail"))
            .collect::<Vec<_>>()
            .join("\n")
            + "\n| Path | Action | Reason |\n|---|---|---|\n| a | modify | b |";
        let response = run_plan_review(&env(json!({"submitted_plan_md": plan}), Some("because")));
        assert_eq!(response.code, StatusCode::OkPlanApproved);
    }

    #[test]
    fn final_approval_blocked_when_a_phase_is_pending() {
        let payload = json!({
            "plan_approved": true, "scaffold_approved": true, "impl_approved": true,
            "tests_approved": true, "docs_approved": true, "text_validated": true, "consistent": false,
        });
        let response = run_final_approval(&env(payload, None));
        assert_eq!(response.code, StatusCode::EPhasesIncomplete);
    }

    #[test]
    fn final_approval_passes_when_all_phases_ok() {
        let payload = json!({
            "plan_approved": true, "scaffold_approved": true, "impl_approved": true,
            "tests_approved": true, "docs_approved": true, "text_validated": true, "consistent": true,
        });
        let response = run_final_approval(&env(payload, None));
        assert_eq!(response.code, StatusCode::OkAllApproved);
    }
}
