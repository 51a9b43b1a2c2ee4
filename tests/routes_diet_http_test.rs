// ABOUTME: HTTP integration tests for diet plans and the daily meal log
// ABOUTME: Checks planned-meal defaults, day totals, and the calorie target fallback
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright (c) 2025 FitCoach Contributors

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;
mod helpers;

use axum::http::StatusCode;
use chrono::Utc;
use helpers::axum_test::AxumTestRequest;
use serde_json::{json, Value};

fn diet_payload() -> Value {
    json!({
        "name": "Cut 2200",
        "daily_calories": 2200,
        "protein_g": 170.0,
        "carbs_g": 210.0,
        "fat_g": 70.0,
        "meals": [
            {
                "meal_type": "breakfast",
                "name": "Oats and whey",
                "calories": 520,
                "protein_g": 40.0,
                "carbs_g": 65.0,
                "fat_g": 10.0,
                "ingredients": ["oats", "whey", "blueberries"]
            },
            {
                "day_of_week": 1,
                "meal_type": "dinner",
                "name": "Salmon and rice",
                "calories": 700,
                "protein_g": 45.0,
                "carbs_g": 70.0,
                "fat_g": 22.0
            }
        ]
    })
}

#[tokio::test]
async fn test_create_and_fetch_diet_plan() {
    let resources = common::create_test_resources().await.unwrap();
    let (_, token) = common::create_user_and_token(&resources).await.unwrap();
    let app = common::app(&resources);

    let plan: Value = AxumTestRequest::post("/api/diet/plans")
        .bearer(&token)
        .json(&diet_payload())
        .send(app.clone())
        .await
        .assert_status(StatusCode::CREATED)
        .json();
    assert_eq!(plan["is_active"], true);
    assert_eq!(plan["ai_generated"], false);
    assert_eq!(plan["meals"].as_array().unwrap().len(), 2);

    let active: Value = AxumTestRequest::get("/api/diet/plans/active")
        .bearer(&token)
        .send(app.clone())
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(active["id"], plan["id"]);

    let listed: Value = AxumTestRequest::get("/api/diet/plans")
        .bearer(&token)
        .send(app)
        .await
        .json();
    assert_eq!(listed.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_active_diet_plan_missing_is_404() {
    let resources = common::create_test_resources().await.unwrap();
    let (_, token) = common::create_user_and_token(&resources).await.unwrap();

    AxumTestRequest::get("/api/diet/plans/active")
        .bearer(&token)
        .send(common::app(&resources))
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_logging_planned_meal_copies_its_values() {
    let resources = common::create_test_resources().await.unwrap();
    let (_, token) = common::create_user_and_token(&resources).await.unwrap();
    let app = common::app(&resources);

    let plan: Value = AxumTestRequest::post("/api/diet/plans")
        .bearer(&token)
        .json(&diet_payload())
        .send(app.clone())
        .await
        .json();
    let breakfast = plan["meals"]
        .as_array()
        .unwrap()
        .iter()
        .find(|meal| meal["meal_type"] == "breakfast")
        .unwrap()
        .clone();

    let log: Value = AxumTestRequest::post("/api/diet/meals/log")
        .bearer(&token)
        .json(&json!({"meal_id": breakfast["id"]}))
        .send(app.clone())
        .await
        .assert_status(StatusCode::CREATED)
        .json();
    assert_eq!(log["name"], "Oats and whey");
    assert_eq!(log["calories"], 520);
    assert_eq!(log["meal_type"], "breakfast");

    // Explicit values win over the planned ones
    AxumTestRequest::post("/api/diet/meals/log")
        .bearer(&token)
        .json(&json!({"meal_id": breakfast["id"], "calories": 600}))
        .send(app.clone())
        .await
        .assert_status(StatusCode::CREATED);

    AxumTestRequest::post("/api/diet/meals/log")
        .bearer(&token)
        .json(&json!({"meal_type": "Snack", "name": "Apple", "calories": 95, "carbs_g": 25.0}))
        .send(app.clone())
        .await
        .assert_status(StatusCode::CREATED);

    let day: Value = AxumTestRequest::get("/api/diet/meals/log")
        .bearer(&token)
        .send(app)
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(day["date"], Utc::now().date_naive().format("%Y-%m-%d").to_string());
    assert_eq!(day["logs"].as_array().unwrap().len(), 3);
    assert_eq!(day["totals"]["calories"], 520 + 600 + 95);
    assert_eq!(day["totals"]["protein_g"], 80.0);
    assert_eq!(day["target_calories"], 2200);
}

#[tokio::test]
async fn test_meal_log_requires_core_fields() {
    let resources = common::create_test_resources().await.unwrap();
    let (_, token) = common::create_user_and_token(&resources).await.unwrap();
    let app = common::app(&resources);

    let body: Value = AxumTestRequest::post("/api/diet/meals/log")
        .bearer(&token)
        .json(&json!({"name": "Mystery"}))
        .send(app.clone())
        .await
        .assert_status(StatusCode::BAD_REQUEST)
        .json();
    assert_eq!(body["code"], "MISSING_REQUIRED_FIELD");

    AxumTestRequest::post("/api/diet/meals/log")
        .bearer(&token)
        .json(&json!({"meal_id": "not-my-meal"}))
        .send(app)
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_day_view_falls_back_to_profile_estimate() {
    let resources = common::create_test_resources().await.unwrap();
    let (user, token) = common::create_user_and_token(&resources).await.unwrap();
    let profile = common::onboard_user(&resources.database, &user.id)
        .await
        .unwrap();

    let day: Value = AxumTestRequest::get("/api/diet/meals/log?date=2024-03-01")
        .bearer(&token)
        .send(common::app(&resources))
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(day["date"], "2024-03-01");
    assert_eq!(day["logs"], json!([]));
    assert_eq!(day["totals"]["calories"], 0);
    assert_eq!(day["target_calories"], json!(profile.estimated_daily_calories()));
}

#[tokio::test]
async fn test_day_view_rejects_bad_date() {
    let resources = common::create_test_resources().await.unwrap();
    let (_, token) = common::create_user_and_token(&resources).await.unwrap();

    AxumTestRequest::get("/api/diet/meals/log?date=01/03/2024")
        .bearer(&token)
        .send(common::app(&resources))
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_delete_meal_log() {
    let resources = common::create_test_resources().await.unwrap();
    let (_, token) = common::create_user_and_token(&resources).await.unwrap();
    let (_, other_token) = common::create_user_and_token(&resources).await.unwrap();
    let app = common::app(&resources);

    let log: Value = AxumTestRequest::post("/api/diet/meals/log")
        .bearer(&token)
        .json(&json!({"meal_type": "lunch", "name": "Wrap", "calories": 450}))
        .send(app.clone())
        .await
        .json();
    let uri = format!("/api/diet/meals/log/{}", log["id"].as_str().unwrap());

    AxumTestRequest::delete(&uri)
        .bearer(&other_token)
        .send(app.clone())
        .await
        .assert_status(StatusCode::NOT_FOUND);
    AxumTestRequest::delete(&uri)
        .bearer(&token)
        .send(app.clone())
        .await
        .assert_status(StatusCode::NO_CONTENT);
    AxumTestRequest::delete(&uri)
        .bearer(&token)
        .send(app)
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_new_diet_plan_replaces_active_one() {
    let resources = common::create_test_resources().await.unwrap();
    let (_, token) = common::create_user_and_token(&resources).await.unwrap();
    let app = common::app(&resources);

    let first: Value = AxumTestRequest::post("/api/diet/plans")
        .bearer(&token)
        .json(&diet_payload())
        .send(app.clone())
        .await
        .assert_status(StatusCode::CREATED)
        .json();
    let mut payload = diet_payload();
    payload["name"] = json!("Maintenance 2600");
    payload["daily_calories"] = json!(2600);
    let second: Value = AxumTestRequest::post("/api/diet/plans")
        .bearer(&token)
        .json(&payload)
        .send(app.clone())
        .await
        .assert_status(StatusCode::CREATED)
        .json();

    let plans: Value = AxumTestRequest::get("/api/diet/plans")
        .bearer(&token)
        .send(app.clone())
        .await
        .json();
    let active: Vec<&Value> = plans
        .as_array()
        .unwrap()
        .iter()
        .filter(|plan| plan["is_active"] == true)
        .collect();
    assert_eq!(plans.as_array().unwrap().len(), 2);
    assert_eq!(active.len(), 1);
    assert_eq!(active[0]["id"], second["id"]);

    let first_id = first["id"].as_str().unwrap();
    let activated: Value = AxumTestRequest::put(&format!("/api/diet/plans/{first_id}/activate"))
        .bearer(&token)
        .send(app.clone())
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(activated["is_active"], true);

    let active: Value = AxumTestRequest::get("/api/diet/plans/active")
        .bearer(&token)
        .send(app.clone())
        .await
        .json();
    assert_eq!(active["id"], first["id"]);

    // The day view follows the active plan's target
    let day: Value = AxumTestRequest::get("/api/diet/meals/log")
        .bearer(&token)
        .send(app)
        .await
        .json();
    assert_eq!(day["target_calories"], 2200);
}

#[tokio::test]
async fn test_diet_plans_are_private_to_their_owner() {
    let resources = common::create_test_resources().await.unwrap();
    let (_, token) = common::create_user_and_token(&resources).await.unwrap();
    let (_, other_token) = common::create_user_and_token(&resources).await.unwrap();
    let app = common::app(&resources);

    let plan: Value = AxumTestRequest::post("/api/diet/plans")
        .bearer(&token)
        .json(&diet_payload())
        .send(app.clone())
        .await
        .json();
    let uri = format!("/api/diet/plans/{}", plan["id"].as_str().unwrap());

    AxumTestRequest::get(&uri)
        .bearer(&other_token)
        .send(app.clone())
        .await
        .assert_status(StatusCode::NOT_FOUND);
    AxumTestRequest::put(&format!("{uri}/activate"))
        .bearer(&other_token)
        .send(app.clone())
        .await
        .assert_status(StatusCode::NOT_FOUND);
    AxumTestRequest::delete(&uri)
        .bearer(&other_token)
        .send(app.clone())
        .await
        .assert_status(StatusCode::NOT_FOUND);

    // A rejected activation leaves the owner's active plan alone
    let active: Value = AxumTestRequest::get("/api/diet/plans/active")
        .bearer(&token)
        .send(app.clone())
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(active["id"], plan["id"]);

    let listed: Value = AxumTestRequest::get("/api/diet/plans")
        .bearer(&other_token)
        .send(app)
        .await
        .json();
    assert_eq!(listed, json!([]));
}

#[tokio::test]
async fn test_delete_diet_plan() {
    let resources = common::create_test_resources().await.unwrap();
    let (_, token) = common::create_user_and_token(&resources).await.unwrap();
    let app = common::app(&resources);

    let plan: Value = AxumTestRequest::post("/api/diet/plans")
        .bearer(&token)
        .json(&diet_payload())
        .send(app.clone())
        .await
        .json();
    let uri = format!("/api/diet/plans/{}", plan["id"].as_str().unwrap());

    AxumTestRequest::delete(&uri)
        .bearer(&token)
        .send(app.clone())
        .await
        .assert_status(StatusCode::NO_CONTENT);
    AxumTestRequest::get(&uri)
        .bearer(&token)
        .send(app.clone())
        .await
        .assert_status(StatusCode::NOT_FOUND);
    AxumTestRequest::get("/api/diet/plans/active")
        .bearer(&token)
        .send(app.clone())
        .await
        .assert_status(StatusCode::NOT_FOUND);
    AxumTestRequest::delete(&uri)
        .bearer(&token)
        .send(app)
        .await
        .assert_status(StatusCode::NOT_FOUND);
}
