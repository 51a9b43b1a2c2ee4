// ABOUTME: Tests for file-backed SQLite databases across reopen cycles
// ABOUTME: Verifies data survives restarts and migration plus seeding stay idempotent
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FitCoach Contributors

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use fitcoach_server::database::Database;
use tempfile::TempDir;

fn database_url(dir: &TempDir) -> String {
    // The nested directory does not exist yet; opening must create it
    format!("sqlite:{}", dir.path().join("data/fitcoach.db").display())
}

#[tokio::test]
async fn test_data_survives_reopen() {
    common::init_test_logging();
    let dir = TempDir::new().unwrap();
    let url = database_url(&dir);

    let user_id = {
        let database = Database::new(&url).await.unwrap();
        let user = common::create_test_user(&database).await.unwrap();
        common::onboard_user(&database, &user.id).await.unwrap();
        database.pool().close().await;
        user.id
    };
    assert!(dir.path().join("data/fitcoach.db").exists());

    let database = Database::new(&url).await.unwrap();
    let user = database.users().get_by_id(&user_id).await.unwrap();
    assert!(user.is_some());
    let profile = database.profiles().get(&user_id).await.unwrap().unwrap();
    assert!(profile.onboarding_completed);
}

#[tokio::test]
async fn test_reopen_does_not_reseed_catalog() {
    common::init_test_logging();
    let dir = TempDir::new().unwrap();
    let url = database_url(&dir);

    let first = Database::new(&url).await.unwrap();
    first.pool().close().await;

    let database = Database::new(&url).await.unwrap();
    assert_eq!(database.exercises().seed_catalog().await.unwrap(), 0);
    database.migrate().await.unwrap();
}

#[tokio::test]
async fn test_ensure_column_is_additive() {
    let database = common::create_test_database().await.unwrap();

    assert!(database
        .ensure_column("exercises", "video_url", "TEXT")
        .await
        .unwrap());
    assert!(!database
        .ensure_column("exercises", "video_url", "TEXT")
        .await
        .unwrap());
    assert!(!database
        .ensure_column("exercises", "gif_url", "TEXT")
        .await
        .unwrap());
    assert!(database
        .ensure_column("exercises; DROP TABLE users", "x", "TEXT")
        .await
        .is_err());
}
