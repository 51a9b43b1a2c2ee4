// ABOUTME: Integration tests for achievement evaluation and the progress dashboard
// ABOUTME: Uses back-dated sessions so streak rules are checked against fixed calendar days
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright (c) 2025 FitCoach Contributors

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;
mod helpers;

use axum::http::StatusCode;
use chrono::{NaiveDate, TimeZone, Utc};
use fitcoach_core::models::{AchievementKind, CompleteWorkout, ProfileUpdate};
use fitcoach_server::database::Database;
use helpers::axum_test::AxumTestRequest;
use serde_json::{json, Value};

/// Start and complete one session at 18:00 UTC on `day`
async fn complete_session_on(database: &Database, user_id: &str, day: NaiveDate) {
    let at = Utc.from_utc_datetime(&day.and_hms_opt(18, 0, 0).unwrap());
    let workouts = database.workouts();
    let log = workouts
        .start_workout_at(user_id, None, None, at)
        .await
        .unwrap();
    workouts
        .complete_workout_at(user_id, &log.id, &CompleteWorkout::default(), at)
        .await
        .unwrap();
}

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
}

#[tokio::test]
async fn test_week_streak_unlocks_once() {
    let database = common::create_test_database().await.unwrap();
    let user = common::create_test_user(&database).await.unwrap();

    for d in 1..=6 {
        complete_session_on(&database, &user.id, day(d)).await;
    }
    let progress = database.progress();

    let unlocked = progress
        .evaluate_achievements(&user.id, day(6))
        .await
        .unwrap();
    let kinds: Vec<AchievementKind> = unlocked.iter().map(|a| a.achievement_type).collect();
    assert!(kinds.contains(&AchievementKind::FirstWorkout));
    assert!(!kinds.contains(&AchievementKind::WeekStreak));

    complete_session_on(&database, &user.id, day(7)).await;
    let unlocked = progress
        .evaluate_achievements(&user.id, day(7))
        .await
        .unwrap();
    let kinds: Vec<AchievementKind> = unlocked.iter().map(|a| a.achievement_type).collect();
    assert_eq!(kinds, vec![AchievementKind::WeekStreak]);

    // Re-evaluation never duplicates
    let again = progress
        .evaluate_achievements(&user.id, day(7))
        .await
        .unwrap();
    assert!(again.is_empty());

    let held = progress.achievements(&user.id).await.unwrap();
    let streaks = held
        .iter()
        .filter(|a| a.achievement_type == AchievementKind::WeekStreak)
        .count();
    assert_eq!(streaks, 1);
}

#[tokio::test]
async fn test_week_streak_requires_consecutive_days() {
    let database = common::create_test_database().await.unwrap();
    let user = common::create_test_user(&database).await.unwrap();

    // Seven sessions, but 2024-01-04 is missing
    for d in [1, 2, 3, 5, 6, 7] {
        complete_session_on(&database, &user.id, day(d)).await;
    }
    complete_session_on(&database, &user.id, day(7)).await;

    let unlocked = database
        .progress()
        .evaluate_achievements(&user.id, day(7))
        .await
        .unwrap();
    assert!(unlocked
        .iter()
        .all(|a| a.achievement_type != AchievementKind::WeekStreak));
}

#[tokio::test]
async fn test_ten_workouts_and_weight_goal() {
    let database = common::create_test_database().await.unwrap();
    let user = common::create_test_user(&database).await.unwrap();
    common::onboard_user(&database, &user.id).await.unwrap();

    for d in (1..=20).step_by(2) {
        complete_session_on(&database, &user.id, day(d)).await;
    }
    // Losing weight: 78 kg target reached from 85 kg
    database
        .profiles()
        .add_weight(&user.id, 77.8, None)
        .await
        .unwrap();

    let unlocked = database
        .progress()
        .evaluate_achievements(&user.id, day(20))
        .await
        .unwrap();
    let kinds: Vec<AchievementKind> = unlocked.iter().map(|a| a.achievement_type).collect();
    assert!(kinds.contains(&AchievementKind::TenWorkouts));
    assert!(kinds.contains(&AchievementKind::WeightGoal));
    assert!(!kinds.contains(&AchievementKind::WeekStreak));
}

#[tokio::test]
async fn test_weight_goal_not_met_without_direction() {
    let database = common::create_test_database().await.unwrap();
    let user = common::create_test_user(&database).await.unwrap();
    let update = ProfileUpdate {
        goal: Some(fitcoach_core::models::FitnessGoal::GeneralFitness),
        current_weight_kg: Some(70.0),
        target_weight_kg: Some(70.0),
        ..ProfileUpdate::default()
    };
    database.profiles().upsert(&user.id, &update).await.unwrap();

    let unlocked = database
        .progress()
        .evaluate_achievements(&user.id, day(1))
        .await
        .unwrap();
    assert!(unlocked.is_empty());
}

#[tokio::test]
async fn test_progress_routes_report_dashboard() {
    let resources = common::create_test_resources().await.unwrap();
    let (user, token) = common::create_user_and_token(&resources).await.unwrap();
    common::onboard_user(&resources.database, &user.id)
        .await
        .unwrap();
    let app = common::app(&resources);

    let log: Value = AxumTestRequest::post("/api/workouts/logs")
        .bearer(&token)
        .json(&json!({}))
        .send(app.clone())
        .await
        .json();
    AxumTestRequest::put(&format!(
        "/api/workouts/logs/{}/complete",
        log["id"].as_str().unwrap()
    ))
    .bearer(&token)
    .json(&json!({"duration_minutes": 30}))
    .send(app.clone())
    .await
    .assert_status(StatusCode::OK);

    let summary: Value = AxumTestRequest::get("/api/progress/summary")
        .bearer(&token)
        .send(app.clone())
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(summary["total_workouts"], 1);
    assert_eq!(summary["current_streak_days"], 1);
    assert_eq!(summary["current_weight_kg"], 85.0);
    assert_eq!(summary["achievements_unlocked"], 1);

    let weekly: Value = AxumTestRequest::get("/api/progress/weekly")
        .bearer(&token)
        .send(app.clone())
        .await
        .json();
    let weekly = weekly.as_array().unwrap();
    assert_eq!(weekly.len(), 7);
    assert_eq!(weekly[6]["workouts"], 1);

    let achievements: Value = AxumTestRequest::get("/api/progress/achievements")
        .bearer(&token)
        .send(app.clone())
        .await
        .json();
    assert_eq!(achievements["unlocked"].as_array().unwrap().len(), 1);
    assert_eq!(achievements["catalogue"].as_array().unwrap().len(), 4);

    let check: Value = AxumTestRequest::post("/api/progress/achievements/check")
        .bearer(&token)
        .send(app)
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(check["new_achievements"], json!([]));
}
