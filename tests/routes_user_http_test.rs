// ABOUTME: HTTP integration tests for profile, onboarding, and weight tracking routes
// ABOUTME: Verifies validation errors and that weigh-ins update the current weight
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright (c) 2025 FitCoach Contributors

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;
mod helpers;

use axum::http::StatusCode;
use helpers::axum_test::AxumTestRequest;
use serde_json::{json, Value};

#[tokio::test]
async fn test_profile_is_null_before_onboarding() {
    let resources = common::create_test_resources().await.unwrap();
    let (user, token) = common::create_user_and_token(&resources).await.unwrap();

    let body: Value = AxumTestRequest::get("/api/user/profile")
        .bearer(&token)
        .send(common::app(&resources))
        .await
        .assert_status(StatusCode::OK)
        .json();

    assert_eq!(body["user"]["id"], user.id.as_str());
    assert!(body["profile"].is_null());
}

#[tokio::test]
async fn test_onboarding_requires_core_fields() {
    let resources = common::create_test_resources().await.unwrap();
    let (_, token) = common::create_user_and_token(&resources).await.unwrap();

    let body: Value = AxumTestRequest::post("/api/user/onboarding")
        .bearer(&token)
        .json(&json!({"age": 30, "gender": "female"}))
        .send(common::app(&resources))
        .await
        .assert_status(StatusCode::BAD_REQUEST)
        .json();
    assert_eq!(body["code"], "MISSING_REQUIRED_FIELD");
}

#[tokio::test]
async fn test_onboarding_marks_profile_complete() {
    let resources = common::create_test_resources().await.unwrap();
    let (_, token) = common::create_user_and_token(&resources).await.unwrap();

    let body: Value = AxumTestRequest::post("/api/user/onboarding")
        .bearer(&token)
        .json(&common::sample_onboarding())
        .send(common::app(&resources))
        .await
        .assert_status(StatusCode::OK)
        .json();

    assert_eq!(body["onboarding_completed"], true);
    assert_eq!(body["goal"], "lose_weight");
    assert_eq!(body["available_equipment"], json!(["dumbbells", "barbell"]));
}

#[tokio::test]
async fn test_profile_update_rejects_out_of_range_values() {
    let resources = common::create_test_resources().await.unwrap();
    let (_, token) = common::create_user_and_token(&resources).await.unwrap();

    let body: Value = AxumTestRequest::put("/api/user/profile")
        .bearer(&token)
        .json(&json!({"age": 7}))
        .send(common::app(&resources))
        .await
        .assert_status(StatusCode::BAD_REQUEST)
        .json();
    assert_eq!(body["code"], "VALUE_OUT_OF_RANGE");

    AxumTestRequest::put("/api/user/profile")
        .bearer(&token)
        .json(&json!({"goal": "become_a_wizard"}))
        .send(common::app(&resources))
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_weight_entry_updates_current_weight() {
    let resources = common::create_test_resources().await.unwrap();
    let (user, token) = common::create_user_and_token(&resources).await.unwrap();
    common::onboard_user(&resources.database, &user.id)
        .await
        .unwrap();

    let entry: Value = AxumTestRequest::post("/api/user/weight")
        .bearer(&token)
        .json(&json!({"weight_kg": 82.5, "notes": "morning"}))
        .send(common::app(&resources))
        .await
        .assert_status(StatusCode::CREATED)
        .json();
    assert_eq!(entry["weight_kg"], 82.5);

    let profile = resources
        .database
        .profiles()
        .get(&user.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(profile.current_weight_kg, Some(82.5));

    let history: Value = AxumTestRequest::get("/api/user/weight?limit=1")
        .bearer(&token)
        .send(common::app(&resources))
        .await
        .assert_status(StatusCode::OK)
        .json();
    let history = history.as_array().unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0]["weight_kg"], 82.5);
}

#[tokio::test]
async fn test_weight_entry_rejects_implausible_values() {
    let resources = common::create_test_resources().await.unwrap();
    let (_, token) = common::create_user_and_token(&resources).await.unwrap();

    AxumTestRequest::post("/api/user/weight")
        .bearer(&token)
        .json(&json!({"weight_kg": 5.0}))
        .send(common::app(&resources))
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}
