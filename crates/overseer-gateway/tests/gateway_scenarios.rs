//! End-to-end scenarios over the full HTTP surface (§8), driven through an
//! in-process router via `tower::ServiceExt::oneshot` — no socket bind.

mod common;

use axum::http::StatusCode;
use common::{advance_to_post_jogan, envelope, TestApp};
use overseer_core::types::Role;
use serde_json::json;

async fn create_session(app: &TestApp, api_key: &str, profile: &str) -> String {
    let (status, body) = app
        .request("POST", "/session", Some(api_key), Some(json!({"profile": profile})))
        .await;
    assert_eq!(status, StatusCode::OK);
    body["session_id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn ambiguous_prompt_requires_clarification() {
    let app = TestApp::new();
    let key = app.issue_key("key_1", Role::Consumer, None);
    let session_id = create_session(&app, &key, "enterprise").await;

    app.request("POST", "/eyes/overseer/navigator", Some(&key), Some(envelope(&session_id, json!({}), None)))
        .await;

    let (status, body) = app
        .request(
            "POST",
            "/eyes/sharingan/clarify",
            Some(&key),
            Some(envelope(&session_id, json!({"prompt": "Do something cool"}), None)),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["code"], "E_NEEDS_CLARIFICATION");
    assert_eq!(body["ok"], false);
    assert_eq!(body["data"]["ambiguous"], true);
    assert!(body["data"]["x"].as_i64().unwrap() >= 2);
}

#[tokio::test]
async fn concrete_code_prompt_is_classified_code_related() {
    let app = TestApp::new();
    let key = app.issue_key("key_1", Role::Consumer, None);
    let session_id = create_session(&app, &key, "enterprise").await;

    app.request("POST", "/eyes/overseer/navigator", Some(&key), Some(envelope(&session_id, json!({}), None)))
        .await;

    let prompt = "Refactor the src/components/Header.module.css stylesheet and the Next.js page \
        component to fix the responsive layout bug, then update the PR, tests, and docs accordingly.";
    let (status, body) = app
        .request("POST", "/eyes/sharingan/clarify", Some(&key), Some(envelope(&session_id, json!({"prompt": prompt}), None)))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["code"], "OK_NO_CLARIFICATION_NEEDED");
    assert_eq!(body["data"]["is_code_related"], true);
}

#[tokio::test]
async fn out_of_order_call_is_rejected_with_409() {
    let app = TestApp::new();
    let key = app.issue_key("key_1", Role::Consumer, None);
    let session_id = create_session(&app, &key, "enterprise").await;

    let (status, body) = app
        .request(
            "POST",
            "/eyes/sharingan/clarify",
            Some(&key),
            Some(envelope(&session_id, json!({"prompt": "anything"}), None)),
        )
        .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["expected_next"], json!(["overseer/navigator"]));
}

#[tokio::test]
async fn complete_plan_is_approved() {
    let app = TestApp::new();
    let key = app.issue_key("key_1", Role::Consumer, None);
    let session_id = create_session(&app, &key, "enterprise").await;
    advance_to_post_jogan(&app, &key, &session_id).await;

    let plan = [
        "High-Level Overview",
        "File Impact Table",
        "Step-by-step Implementation Plan",
        "Error Handling & Edge Cases",
        "Test Strategy",
        "Rollback Plan",
        "Documentation Updates",
    ]
    .iter()
    .map(|section| format!("### {section}\ndetail"))
    .collect::<Vec<_>>()
    .join("\n")
        + "\n| Path | Action | Reason |\n|---|---|---|\n| src/a.rs | modify | fix rounding |";

    let (status, body) = app
        .request(
            "POST",
            "/eyes/rinnegan/plan_review",
            Some(&key),
            Some(envelope(&session_id, json!({"submitted_plan_md": plan}), Some("because the schema requires it"))),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["code"], "OK_PLAN_APPROVED");
    assert_eq!(body["data"]["approved"], true);
}

#[tokio::test]
async fn mangekyo_tests_threshold_follows_profile_strictness() {
    let app = TestApp::new();
    let admin_key = app.issue_key("key_admin", Role::Admin, None);
    let session_id = create_session(&app, &admin_key, "security").await;
    advance_to_post_jogan(&app, &admin_key, &session_id).await;

    let coverage = json!({"coverage_summary_md": "lines: 80%\nbranches: 65%"});

    let (status, body) = app
        .request(
            "POST",
            "/eyes/mangekyo/review_tests",
            Some(&admin_key),
            Some(envelope(&session_id, coverage.clone(), Some("coverage report attached"))),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["code"], "E_TESTS_INSUFFICIENT");

    let (status, _) = app
        .request(
            "PUT",
            &format!("/session/{session_id}/settings"),
            Some(&admin_key),
            Some(json!({"profile": "casual"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app
        .request(
            "POST",
            "/eyes/mangekyo/review_tests",
            Some(&admin_key),
            Some(envelope(&session_id, coverage, Some("coverage report attached"))),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["code"], "OK_TESTS_APPROVED");
}

#[tokio::test]
async fn session_from_another_tenant_is_not_reachable() {
    let app = TestApp::new();
    let admin_key = app.issue_key("key_admin", Role::Admin, None);
    let (status, body) = app
        .request("POST", "/session", Some(&admin_key), Some(json!({"tenant": "other", "profile": "enterprise"})))
        .await;
    assert_eq!(status, StatusCode::OK);
    let session_id = body["session_id"].as_str().unwrap().to_string();

    let ops_key = app.issue_key("key_ops", Role::Consumer, Some("ops"));
    let (status, body) = app.request("GET", &format!("/sessions/{session_id}"), Some(&ops_key), None).await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["detail"], "Tenant mismatch");
}
