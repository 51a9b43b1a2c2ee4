// ABOUTME: Progress route handlers for the dashboard summary, weekly chart, and achievements
// ABOUTME: Achievement checks are idempotent and only report newly unlocked entries
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FitCoach Contributors

use std::sync::Arc;

use axum::extract::State;
use axum::middleware::from_fn_with_state;
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use chrono::Utc;
use fitcoach_core::errors::AppResult;
use fitcoach_core::models::{Achievement, AchievementStatus, DailyProgress, ProgressSummary};
use serde::Serialize;

use crate::auth::AuthUser;
use crate::middleware::require_auth;
use crate::resources::ServerResources;

/// Held achievements plus the full catalogue
#[derive(Debug, Serialize)]
pub struct AchievementsResponse {
    /// Unlocked, oldest first
    pub unlocked: Vec<Achievement>,
    /// Every achievement with its unlock state
    pub catalogue: Vec<AchievementStatus>,
}

/// Result of an achievement check
#[derive(Debug, Serialize)]
pub struct AchievementCheckResponse {
    /// Unlocked by this check; empty on repeat
    pub new_achievements: Vec<Achievement>,
}

/// Progress routes
pub struct ProgressRoutes;

impl ProgressRoutes {
    /// Create all progress routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/summary", get(Self::handle_summary))
            .route("/weekly", get(Self::handle_weekly))
            .route("/achievements", get(Self::handle_achievements))
            .route("/achievements/check", post(Self::handle_check_achievements))
            .route_layer(from_fn_with_state(resources.clone(), require_auth))
            .with_state(resources)
    }

    async fn handle_summary(
        State(resources): State<Arc<ServerResources>>,
        Extension(auth): Extension<AuthUser>,
    ) -> AppResult<Json<ProgressSummary>> {
        Ok(Json(
            resources
                .database
                .progress()
                .summary(&auth.user_id, Utc::now().date_naive())
                .await?,
        ))
    }

    async fn handle_weekly(
        State(resources): State<Arc<ServerResources>>,
        Extension(auth): Extension<AuthUser>,
    ) -> AppResult<Json<Vec<DailyProgress>>> {
        Ok(Json(
            resources
                .database
                .progress()
                .weekly(&auth.user_id, Utc::now().date_naive())
                .await?,
        ))
    }

    async fn handle_achievements(
        State(resources): State<Arc<ServerResources>>,
        Extension(auth): Extension<AuthUser>,
    ) -> AppResult<Json<AchievementsResponse>> {
        let progress = resources.database.progress();
        Ok(Json(AchievementsResponse {
            unlocked: progress.achievements(&auth.user_id).await?,
            catalogue: progress.achievement_catalogue(&auth.user_id).await?,
        }))
    }

    async fn handle_check_achievements(
        State(resources): State<Arc<ServerResources>>,
        Extension(auth): Extension<AuthUser>,
    ) -> AppResult<Json<AchievementCheckResponse>> {
        let new_achievements = resources
            .database
            .progress()
            .evaluate_achievements(&auth.user_id, Utc::now().date_naive())
            .await?;
        Ok(Json(AchievementCheckResponse { new_achievements }))
    }
}
