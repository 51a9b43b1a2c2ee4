// ABOUTME: Workout route handlers for the exercise catalog, plans, and training sessions
// ABOUTME: Completing a session also evaluates achievements and returns any new unlocks
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FitCoach Contributors

//! Workout routes
//!
//! Plans are owned by the caller; a plan that belongs to someone else is reported
//! as not found. Creating or activating a plan makes it the single active plan.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::middleware::from_fn_with_state;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Extension, Json, Router};
use chrono::Utc;
use fitcoach_core::errors::{AppError, AppResult};
use fitcoach_core::models::{
    Achievement, CompleteWorkout, Exercise, NewWorkoutPlan, WorkoutLog, WorkoutPlan,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::extract::{ApiJson, ApiQuery};
use super::ListQuery;
use crate::auth::AuthUser;
use crate::database::{ExerciseQuery, GifBackfillReport};
use crate::middleware::require_auth;
use crate::resources::ServerResources;

/// Session start payload
#[derive(Debug, Default, Deserialize)]
pub struct StartWorkoutRequest {
    /// Plan being followed
    #[serde(default)]
    pub plan_id: Option<String>,
    /// Day of that plan
    #[serde(default)]
    pub day_id: Option<String>,
}

/// Completed session plus achievements it unlocked
#[derive(Debug, Serialize)]
pub struct CompleteWorkoutResponse {
    /// Completed session
    pub log: WorkoutLog,
    /// Achievements unlocked by this completion
    pub new_achievements: Vec<Achievement>,
}

/// Workout routes
pub struct WorkoutRoutes;

impl WorkoutRoutes {
    /// Create all workout routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/exercises", get(Self::handle_search_exercises))
            .route("/exercises/backfill-gifs", post(Self::handle_backfill_gifs))
            .route("/exercises/:id", get(Self::handle_get_exercise))
            .route(
                "/plans",
                get(Self::handle_list_plans).post(Self::handle_create_plan),
            )
            .route("/plans/active", get(Self::handle_active_plan))
            .route(
                "/plans/:id",
                get(Self::handle_get_plan).delete(Self::handle_delete_plan),
            )
            .route("/plans/:id/activate", put(Self::handle_activate_plan))
            .route(
                "/logs",
                get(Self::handle_list_logs).post(Self::handle_start_workout),
            )
            .route("/logs/:id/complete", put(Self::handle_complete_workout))
            .route_layer(from_fn_with_state(resources.clone(), require_auth))
            .with_state(resources)
    }

    async fn handle_search_exercises(
        State(resources): State<Arc<ServerResources>>,
        ApiQuery(query): ApiQuery<ExerciseQuery>,
    ) -> AppResult<Json<Vec<Exercise>>> {
        Ok(Json(resources.database.exercises().search(&query).await?))
    }

    async fn handle_get_exercise(
        State(resources): State<Arc<ServerResources>>,
        Path(exercise_id): Path<String>,
    ) -> AppResult<Json<Exercise>> {
        resources
            .database
            .exercises()
            .get(&exercise_id)
            .await?
            .map(Json)
            .ok_or_else(|| AppError::not_found("Exercise"))
    }

    async fn handle_backfill_gifs(
        State(resources): State<Arc<ServerResources>>,
        Extension(auth): Extension<AuthUser>,
    ) -> AppResult<Json<GifBackfillReport>> {
        let report = resources.database.exercises().backfill_gifs().await?;
        info!(user.id = %auth.user_id, updated = report.total_updated, "GIF back-fill requested");
        Ok(Json(report))
    }

    async fn handle_list_plans(
        State(resources): State<Arc<ServerResources>>,
        Extension(auth): Extension<AuthUser>,
    ) -> AppResult<Json<Vec<WorkoutPlan>>> {
        Ok(Json(
            resources.database.workouts().list_plans(&auth.user_id).await?,
        ))
    }

    async fn handle_create_plan(
        State(resources): State<Arc<ServerResources>>,
        Extension(auth): Extension<AuthUser>,
        ApiJson(plan): ApiJson<NewWorkoutPlan>,
    ) -> AppResult<Response> {
        let plan = resources
            .database
            .workouts()
            .create_plan(&auth.user_id, &plan, false)
            .await?;
        Ok((StatusCode::CREATED, Json(plan)).into_response())
    }

    async fn handle_active_plan(
        State(resources): State<Arc<ServerResources>>,
        Extension(auth): Extension<AuthUser>,
    ) -> AppResult<Json<WorkoutPlan>> {
        resources
            .database
            .workouts()
            .active_plan(&auth.user_id)
            .await?
            .map(Json)
            .ok_or_else(|| AppError::not_found("Active workout plan"))
    }

    async fn handle_get_plan(
        State(resources): State<Arc<ServerResources>>,
        Extension(auth): Extension<AuthUser>,
        Path(plan_id): Path<String>,
    ) -> AppResult<Json<WorkoutPlan>> {
        resources
            .database
            .workouts()
            .get_plan(&auth.user_id, &plan_id)
            .await?
            .map(Json)
            .ok_or_else(|| AppError::not_found("Workout plan"))
    }

    async fn handle_activate_plan(
        State(resources): State<Arc<ServerResources>>,
        Extension(auth): Extension<AuthUser>,
        Path(plan_id): Path<String>,
    ) -> AppResult<Json<WorkoutPlan>> {
        Ok(Json(
            resources
                .database
                .workouts()
                .activate_plan(&auth.user_id, &plan_id)
                .await?,
        ))
    }

    async fn handle_delete_plan(
        State(resources): State<Arc<ServerResources>>,
        Extension(auth): Extension<AuthUser>,
        Path(plan_id): Path<String>,
    ) -> AppResult<StatusCode> {
        resources
            .database
            .workouts()
            .delete_plan(&auth.user_id, &plan_id)
            .await?;
        Ok(StatusCode::NO_CONTENT)
    }

    async fn handle_start_workout(
        State(resources): State<Arc<ServerResources>>,
        Extension(auth): Extension<AuthUser>,
        ApiJson(request): ApiJson<StartWorkoutRequest>,
    ) -> AppResult<Response> {
        let log = resources
            .database
            .workouts()
            .start_workout(
                &auth.user_id,
                request.plan_id.as_deref(),
                request.day_id.as_deref(),
            )
            .await?;
        Ok((StatusCode::CREATED, Json(log)).into_response())
    }

    async fn handle_complete_workout(
        State(resources): State<Arc<ServerResources>>,
        Extension(auth): Extension<AuthUser>,
        Path(log_id): Path<String>,
        ApiJson(payload): ApiJson<CompleteWorkout>,
    ) -> AppResult<Json<CompleteWorkoutResponse>> {
        let log = resources
            .database
            .workouts()
            .complete_workout(&auth.user_id, &log_id, &payload)
            .await?;

        // The completion is committed; a failed evaluation is retried on the next check
        let new_achievements = match resources
            .database
            .progress()
            .evaluate_achievements(&auth.user_id, Utc::now().date_naive())
            .await
        {
            Ok(unlocked) => unlocked,
            Err(e) => {
                warn!(user.id = %auth.user_id, error = %e, "Achievement evaluation failed");
                Vec::new()
            }
        };

        Ok(Json(CompleteWorkoutResponse {
            log,
            new_achievements,
        }))
    }

    async fn handle_list_logs(
        State(resources): State<Arc<ServerResources>>,
        Extension(auth): Extension<AuthUser>,
        ApiQuery(query): ApiQuery<ListQuery>,
    ) -> AppResult<Json<Vec<WorkoutLog>>> {
        Ok(Json(
            resources
                .database
                .workouts()
                .list_logs(&auth.user_id, query.limit)
                .await?,
        ))
    }
}
