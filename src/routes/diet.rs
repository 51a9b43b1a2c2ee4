// ABOUTME: Diet route handlers for nutrition plans and the daily meal log
// ABOUTME: Day views sum logged macros and compare them with the calorie target
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FitCoach Contributors

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::middleware::from_fn_with_state;
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, put};
use axum::{Extension, Json, Router};
use chrono::{NaiveDate, Utc};
use fitcoach_core::errors::{AppError, AppResult};
use fitcoach_core::models::{DietPlan, MealLog, NewDietPlan, NewMealLog, NutritionTotals};
use serde::{Deserialize, Serialize};

use super::extract::{ApiJson, ApiQuery};
use crate::auth::AuthUser;
use crate::middleware::require_auth;
use crate::resources::ServerResources;

/// `?date=YYYY-MM-DD`
#[derive(Debug, Default, Deserialize)]
pub struct DayQuery {
    /// Day to show; today (UTC) when absent
    #[serde(default)]
    pub date: Option<String>,
}

/// Meals logged on one day
#[derive(Debug, Serialize)]
pub struct DayLogResponse {
    /// `YYYY-MM-DD`
    pub date: String,
    /// Entries, oldest first
    pub logs: Vec<MealLog>,
    /// Summed nutrition
    pub totals: NutritionTotals,
    /// Active plan's calories, else the profile estimate
    pub target_calories: Option<i64>,
}

/// Diet routes
pub struct DietRoutes;

impl DietRoutes {
    /// Create all diet routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
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
                "/meals/log",
                get(Self::handle_day_log).post(Self::handle_log_meal),
            )
            .route("/meals/log/:id", delete(Self::handle_delete_meal_log))
            .route_layer(from_fn_with_state(resources.clone(), require_auth))
            .with_state(resources)
    }

    async fn handle_list_plans(
        State(resources): State<Arc<ServerResources>>,
        Extension(auth): Extension<AuthUser>,
    ) -> AppResult<Json<Vec<DietPlan>>> {
        Ok(Json(
            resources.database.diet().list_plans(&auth.user_id).await?,
        ))
    }

    async fn handle_create_plan(
        State(resources): State<Arc<ServerResources>>,
        Extension(auth): Extension<AuthUser>,
        ApiJson(plan): ApiJson<NewDietPlan>,
    ) -> AppResult<Response> {
        let plan = resources
            .database
            .diet()
            .create_plan(&auth.user_id, &plan, false)
            .await?;
        Ok((StatusCode::CREATED, Json(plan)).into_response())
    }

    async fn handle_active_plan(
        State(resources): State<Arc<ServerResources>>,
        Extension(auth): Extension<AuthUser>,
    ) -> AppResult<Json<DietPlan>> {
        resources
            .database
            .diet()
            .active_plan(&auth.user_id)
            .await?
            .map(Json)
            .ok_or_else(|| AppError::not_found("Active diet plan"))
    }

    async fn handle_get_plan(
        State(resources): State<Arc<ServerResources>>,
        Extension(auth): Extension<AuthUser>,
        Path(plan_id): Path<String>,
    ) -> AppResult<Json<DietPlan>> {
        resources
            .database
            .diet()
            .get_plan(&auth.user_id, &plan_id)
            .await?
            .map(Json)
            .ok_or_else(|| AppError::not_found("Diet plan"))
    }

    async fn handle_activate_plan(
        State(resources): State<Arc<ServerResources>>,
        Extension(auth): Extension<AuthUser>,
        Path(plan_id): Path<String>,
    ) -> AppResult<Json<DietPlan>> {
        Ok(Json(
            resources
                .database
                .diet()
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
            .diet()
            .delete_plan(&auth.user_id, &plan_id)
            .await?;
        Ok(StatusCode::NO_CONTENT)
    }

    async fn handle_log_meal(
        State(resources): State<Arc<ServerResources>>,
        Extension(auth): Extension<AuthUser>,
        ApiJson(payload): ApiJson<NewMealLog>,
    ) -> AppResult<Response> {
        let log = resources
            .database
            .diet()
            .log_meal(&auth.user_id, payload)
            .await?;
        Ok((StatusCode::CREATED, Json(log)).into_response())
    }

    async fn handle_day_log(
        State(resources): State<Arc<ServerResources>>,
        Extension(auth): Extension<AuthUser>,
        ApiQuery(query): ApiQuery<DayQuery>,
    ) -> AppResult<Json<DayLogResponse>> {
        let date = match query.date.as_deref().map(str::trim).filter(|d| !d.is_empty()) {
            Some(raw) => NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| {
                AppError::invalid_input(format!("Invalid date '{raw}', expected YYYY-MM-DD"))
            })?,
            None => Utc::now().date_naive(),
        };

        let diet = resources.database.diet();
        let logs = diet.meal_logs_for_date(&auth.user_id, date).await?;
        let target_calories = match diet.active_plan(&auth.user_id).await? {
            Some(plan) => Some(plan.daily_calories),
            None => resources
                .database
                .profiles()
                .get(&auth.user_id)
                .await?
                .and_then(|profile| profile.estimated_daily_calories()),
        };

        Ok(Json(DayLogResponse {
            date: date.format("%Y-%m-%d").to_string(),
            totals: NutritionTotals::from_logs(&logs),
            logs,
            target_calories,
        }))
    }

    async fn handle_delete_meal_log(
        State(resources): State<Arc<ServerResources>>,
        Extension(auth): Extension<AuthUser>,
        Path(log_id): Path<String>,
    ) -> AppResult<StatusCode> {
        resources
            .database
            .diet()
            .delete_meal_log(&auth.user_id, &log_id)
            .await?;
        Ok(StatusCode::NO_CONTENT)
    }
}
