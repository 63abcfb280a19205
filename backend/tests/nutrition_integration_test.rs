//! Integration tests for daily nutrition targets

mod common;

use axum::http::StatusCode;
use serde_json::json;
use uuid::Uuid;

#[tokio::test]
#[ignore = "requires database"]
async fn test_daily_targets_unknown_user() {
    let app = common::TestApp::new().await;

    let (status, _) = app.get("/api/v1/nutrition/daily", Uuid::new_v4()).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_daily_targets_after_onboarding() {
    let app = common::TestApp::new().await;
    let user = app.onboard_user().await;

    let (status, body) = app.get("/api/v1/nutrition/daily", user).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["base"]["calories"], 2006);
    assert_eq!(body["adjusted"]["calories"], 2006);
    assert_eq!(body["weekly_goal_kg"], -0.5);
    let macros = &body["base"]["macro_targets"];
    assert_eq!(macros["protein_pct"], 30);
    assert_eq!(macros["carbs_pct"], 50);
    assert_eq!(macros["fat_pct"], 20);
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_incomplete_profile_is_unprocessable() {
    let app = common::TestApp::new().await;
    let user = Uuid::new_v4();
    app.put(
        "/api/v1/onboarding/steps/body_metrics",
        user,
        json!({ "weight_kg": 70 }),
    )
    .await;

    let (status, body) = app.get("/api/v1/nutrition/daily", user).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"]["code"], "INCOMPLETE_PROFILE");
    let message = body["error"]["message"].as_str().unwrap();
    assert!(message.contains("height_cm"));
    assert!(!message.contains("weight_kg"));
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_drafts_preview_targets_before_completion() {
    let app = common::TestApp::new().await;
    let user = Uuid::new_v4();
    app.put(
        "/api/v1/onboarding/steps/body_metrics",
        user,
        json!({ "weight_kg": 70, "height_cm": 175, "age": 30, "gender": "male" }),
    )
    .await;
    app.put("/api/v1/onboarding/steps/goals", user, json!({ "primary_goal": "maintain" }))
        .await;

    let (status, body) = app.get("/api/v1/nutrition/daily", user).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["base"]["calories"], 2556);
    assert_eq!(body["weekly_goal_kg"], 0.0);
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_drafts_ignored_after_completion() {
    let app = common::TestApp::new().await;
    let user = app.onboard_user().await;
    app.put("/api/v1/onboarding/steps/goals", user, json!({ "primary_goal": "maintain" }))
        .await;

    let (_, body) = app.get("/api/v1/nutrition/daily", user).await;

    assert_eq!(body["base"]["calories"], 2006);
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_weekly_goal_preview() {
    let app = common::TestApp::new().await;

    let (status, body) = app
        .post(
            "/api/v1/nutrition/weekly-goal",
            Uuid::new_v4(),
            json!({ "primary_goal": "lose_weight", "rate_option": "standard" }),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["weekly_goal_kg"], -0.5);
    assert_eq!(body["provenance"]["magnitude"], 0.5);
}
