// ABOUTME: HTTP integration tests for the exercise catalog, workout plans, and sessions
// ABOUTME: Covers alias search, the single-active-plan rule, session conflicts, and GIF back-fill
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
use tempfile::TempDir;
use tokio::task::JoinSet;

fn plan_payload(name: &str) -> Value {
    json!({
        "name": name,
        "description": "Upper/lower split",
        "days": [
            {
                "day_number": 1,
                "name": "Upper",
                "focus": "chest and back",
                "exercises": [
                    {"name": "Bench Press", "sets": 4, "reps": "6-8", "rest_seconds": 120},
                    {"name": "Barbell Row", "sets": 4, "reps": "8"}
                ]
            },
            {
                "day_number": 3,
                "name": "Lower",
                "exercises": [
                    {"name": "Squat", "sets": 5, "reps": "5"}
                ]
            }
        ]
    })
}

#[tokio::test]
async fn test_exercise_search_resolves_spanish_alias() {
    let resources = common::create_test_resources().await.unwrap();
    let (_, token) = common::create_user_and_token(&resources).await.unwrap();

    let body: Value = AxumTestRequest::get("/api/workouts/exercises?search=pierna")
        .bearer(&token)
        .send(common::app(&resources))
        .await
        .assert_status(StatusCode::OK)
        .json();

    let exercises = body.as_array().unwrap();
    assert!(!exercises.is_empty());
    for exercise in exercises {
        let group = exercise["muscle_group"].as_str().unwrap();
        assert!(
            ["quadriceps", "hamstrings", "glutes", "calves"].contains(&group),
            "unexpected muscle group {group}"
        );
    }
}

#[tokio::test]
async fn test_exercise_search_is_accent_insensitive() {
    let resources = common::create_test_resources().await.unwrap();
    let (_, token) = common::create_user_and_token(&resources).await.unwrap();

    let body: Value = AxumTestRequest::get("/api/workouts/exercises?search=elevacion")
        .bearer(&token)
        .send(common::app(&resources))
        .await
        .assert_status(StatusCode::OK)
        .json();

    let names: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["name"].as_str().unwrap())
        .collect();
    assert!(names.contains(&"Hanging Leg Raise"), "got {names:?}");
}

#[tokio::test]
async fn test_unknown_exercise_is_404() {
    let resources = common::create_test_resources().await.unwrap();
    let (_, token) = common::create_user_and_token(&resources).await.unwrap();

    AxumTestRequest::get("/api/workouts/exercises/does-not-exist")
        .bearer(&token)
        .send(common::app(&resources))
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_only_one_plan_is_active() {
    let resources = common::create_test_resources().await.unwrap();
    let (_, token) = common::create_user_and_token(&resources).await.unwrap();
    let app = common::app(&resources);

    let first: Value = AxumTestRequest::post("/api/workouts/plans")
        .bearer(&token)
        .json(&plan_payload("Block A"))
        .send(app.clone())
        .await
        .assert_status(StatusCode::CREATED)
        .json();
    assert_eq!(first["is_active"], true);
    assert_eq!(first["days_per_week"], 2);

    let second: Value = AxumTestRequest::post("/api/workouts/plans")
        .bearer(&token)
        .json(&plan_payload("Block B"))
        .send(app.clone())
        .await
        .assert_status(StatusCode::CREATED)
        .json();

    let active: Value = AxumTestRequest::get("/api/workouts/plans/active")
        .bearer(&token)
        .send(app.clone())
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(active["id"], second["id"]);
    assert_eq!(active["days"].as_array().unwrap().len(), 2);

    let first_id = first["id"].as_str().unwrap();
    AxumTestRequest::put(&format!("/api/workouts/plans/{first_id}/activate"))
        .bearer(&token)
        .send(app.clone())
        .await
        .assert_status(StatusCode::OK);

    let plans: Value = AxumTestRequest::get("/api/workouts/plans")
        .bearer(&token)
        .send(app)
        .await
        .json();
    let active_ids: Vec<&str> = plans
        .as_array()
        .unwrap()
        .iter()
        .filter(|plan| plan["is_active"] == true)
        .map(|plan| plan["id"].as_str().unwrap())
        .collect();
    assert_eq!(active_ids, vec![first_id]);
}

#[tokio::test]
async fn test_plans_are_private_to_their_owner() {
    let resources = common::create_test_resources().await.unwrap();
    let (_, owner_token) = common::create_user_and_token(&resources).await.unwrap();
    let (_, other_token) = common::create_user_and_token(&resources).await.unwrap();
    let app = common::app(&resources);

    let plan: Value = AxumTestRequest::post("/api/workouts/plans")
        .bearer(&owner_token)
        .json(&plan_payload("Mine"))
        .send(app.clone())
        .await
        .json();
    let uri = format!("/api/workouts/plans/{}", plan["id"].as_str().unwrap());

    AxumTestRequest::get(&uri)
        .bearer(&other_token)
        .send(app.clone())
        .await
        .assert_status(StatusCode::NOT_FOUND);
    AxumTestRequest::delete(&uri)
        .bearer(&other_token)
        .send(app.clone())
        .await
        .assert_status(StatusCode::NOT_FOUND);
    AxumTestRequest::delete(&uri)
        .bearer(&owner_token)
        .send(app.clone())
        .await
        .assert_status(StatusCode::NO_CONTENT);
    AxumTestRequest::get(&uri)
        .bearer(&owner_token)
        .send(app)
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_invalid_plan_is_rejected() {
    let resources = common::create_test_resources().await.unwrap();
    let (_, token) = common::create_user_and_token(&resources).await.unwrap();

    let mut payload = plan_payload("Too many sets");
    payload["days"][0]["exercises"][0]["sets"] = json!(25);

    AxumTestRequest::post("/api/workouts/plans")
        .bearer(&token)
        .json(&payload)
        .send(common::app(&resources))
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_session_completion_conflicts_and_ownership() {
    let resources = common::create_test_resources().await.unwrap();
    let (_, token) = common::create_user_and_token(&resources).await.unwrap();
    let (_, other_token) = common::create_user_and_token(&resources).await.unwrap();
    let app = common::app(&resources);

    let log: Value = AxumTestRequest::post("/api/workouts/logs")
        .bearer(&token)
        .json(&json!({}))
        .send(app.clone())
        .await
        .assert_status(StatusCode::CREATED)
        .json();
    assert!(log["completed_at"].is_null());
    let complete_uri = format!("/api/workouts/logs/{}/complete", log["id"].as_str().unwrap());
    let payload = json!({
        "duration_minutes": 45,
        "rating": 4,
        "exercises": [
            {"exercise_name": "Squat", "set_number": 1, "reps": 5, "weight_kg": 100.0}
        ]
    });

    AxumTestRequest::put(&complete_uri)
        .bearer(&other_token)
        .json(&payload)
        .send(app.clone())
        .await
        .assert_status(StatusCode::NOT_FOUND);

    let completed: Value = AxumTestRequest::put(&complete_uri)
        .bearer(&token)
        .json(&payload)
        .send(app.clone())
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert!(completed["log"]["completed_at"].is_string());
    assert_eq!(completed["log"]["exercises"].as_array().unwrap().len(), 1);
    let unlocked: Vec<&str> = completed["new_achievements"]
        .as_array()
        .unwrap()
        .iter()
        .map(|a| a["achievement_type"].as_str().unwrap())
        .collect();
    assert!(unlocked.contains(&"first_workout"), "got {unlocked:?}");

    let body: Value = AxumTestRequest::put(&complete_uri)
        .bearer(&token)
        .json(&payload)
        .send(app.clone())
        .await
        .assert_status(StatusCode::CONFLICT)
        .json();
    assert_eq!(body["code"], "RESOURCE_CONFLICT");

    AxumTestRequest::put("/api/workouts/logs/missing/complete")
        .bearer(&token)
        .json(&payload)
        .send(app)
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_starting_session_for_foreign_plan_is_404() {
    let resources = common::create_test_resources().await.unwrap();
    let (_, owner_token) = common::create_user_and_token(&resources).await.unwrap();
    let (_, other_token) = common::create_user_and_token(&resources).await.unwrap();
    let app = common::app(&resources);

    let plan: Value = AxumTestRequest::post("/api/workouts/plans")
        .bearer(&owner_token)
        .json(&plan_payload("Owner plan"))
        .send(app.clone())
        .await
        .json();

    AxumTestRequest::post("/api/workouts/logs")
        .bearer(&other_token)
        .json(&json!({"plan_id": plan["id"]}))
        .send(app)
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_gif_backfill_is_idempotent() {
    let resources = common::create_test_resources().await.unwrap();
    let (_, token) = common::create_user_and_token(&resources).await.unwrap();
    let app = common::app(&resources);

    // Exercises outside the catalog are created without media
    let mut payload = plan_payload("Custom moves");
    payload["days"][1]["exercises"] = json!([
        {"name": "Bulgarian Split Squat Deluxe", "sets": 3, "reps": "10"},
        {"name": "Mystery Core Thing", "sets": 3, "reps": "12"}
    ]);
    AxumTestRequest::post("/api/workouts/plans")
        .bearer(&token)
        .json(&payload)
        .send(app.clone())
        .await
        .assert_status(StatusCode::CREATED);

    let first: Value = AxumTestRequest::post("/api/workouts/exercises/backfill-gifs")
        .bearer(&token)
        .send(app.clone())
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert!(first["total_updated"].as_u64().unwrap() >= 2);
    assert_eq!(first["remaining_without_gif"], 0);

    let second: Value = AxumTestRequest::post("/api/workouts/exercises/backfill-gifs")
        .bearer(&token)
        .send(app)
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(second["total_updated"], 0);
    assert_eq!(second["remaining_without_gif"], 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_plan_creation_keeps_one_active() {
    let dir = TempDir::new().unwrap();
    let mut config = common::test_config();
    config.database.url = format!("sqlite:{}", dir.path().join("fitcoach.db").display());
    let resources = common::create_resources_with(config, None).await.unwrap();
    let (_, token) = common::create_user_and_token(&resources).await.unwrap();
    let app = common::app(&resources);

    let mut requests = JoinSet::new();
    for n in 0..8 {
        let app = app.clone();
        let token = token.clone();
        requests.spawn(async move {
            AxumTestRequest::post("/api/workouts/plans")
                .bearer(&token)
                .json(&plan_payload(&format!("Block {n}")))
                .send(app)
                .await
                .status()
        });
    }

    let mut created = 0;
    while let Some(status) = requests.join_next().await {
        match status.unwrap() {
            201 => created += 1,
            409 => {}
            other => panic!("unexpected status {other}"),
        }
    }
    assert!(created >= 1);

    let plans: Value = AxumTestRequest::get("/api/workouts/plans")
        .bearer(&token)
        .send(app.clone())
        .await
        .json();
    let plans = plans.as_array().unwrap();
    assert_eq!(plans.len(), created);
    assert_eq!(plans.iter().filter(|plan| plan["is_active"] == true).count(), 1);

    // Activating an unknown plan rolls back and keeps the current one active
    let before: Value = AxumTestRequest::get("/api/workouts/plans/active")
        .bearer(&token)
        .send(app.clone())
        .await
        .json();
    AxumTestRequest::put("/api/workouts/plans/missing-plan/activate")
        .bearer(&token)
        .send(app.clone())
        .await
        .assert_status(StatusCode::NOT_FOUND);
    let after: Value = AxumTestRequest::get("/api/workouts/plans/active")
        .bearer(&token)
        .send(app)
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(after["id"], before["id"]);
}
