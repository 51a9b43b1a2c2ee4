// ABOUTME: User profile route handlers for onboarding, profile edits, and weight tracking
// ABOUTME: All handlers require a bearer token and act on the caller's own data
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FitCoach Contributors

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::middleware::from_fn_with_state;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use fitcoach_core::errors::AppResult;
use fitcoach_core::models::{ProfileUpdate, User, UserProfile, WeightEntry};
use serde::{Deserialize, Serialize};

use super::extract::{ApiJson, ApiQuery};
use super::ListQuery;
use crate::auth::AuthUser;
use crate::middleware::require_auth;
use crate::resources::ServerResources;

/// Account plus profile (absent before onboarding)
#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    /// Account
    pub user: User,
    /// Profile, `null` until first saved
    pub profile: Option<UserProfile>,
}

/// Weight entry payload
#[derive(Debug, Deserialize)]
pub struct WeightRequest {
    /// Body weight in kilograms
    pub weight_kg: f64,
    /// Free-form note
    #[serde(default)]
    pub notes: Option<String>,
}

/// Profile routes
pub struct UserRoutes;

impl UserRoutes {
    /// Create all profile routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route(
                "/profile",
                get(Self::handle_get_profile).put(Self::handle_update_profile),
            )
            .route("/onboarding", post(Self::handle_onboarding))
            .route(
                "/weight",
                get(Self::handle_weight_history).post(Self::handle_add_weight),
            )
            .route_layer(from_fn_with_state(resources.clone(), require_auth))
            .with_state(resources)
    }

    async fn handle_get_profile(
        State(resources): State<Arc<ServerResources>>,
        Extension(auth): Extension<AuthUser>,
    ) -> AppResult<Json<ProfileResponse>> {
        let user = resources.database.users().get_required(&auth.user_id).await?;
        let profile = resources.database.profiles().get(&auth.user_id).await?;
        Ok(Json(ProfileResponse { user, profile }))
    }

    async fn handle_update_profile(
        State(resources): State<Arc<ServerResources>>,
        Extension(auth): Extension<AuthUser>,
        ApiJson(update): ApiJson<ProfileUpdate>,
    ) -> AppResult<Json<UserProfile>> {
        let profile = resources
            .database
            .profiles()
            .upsert(&auth.user_id, &update)
            .await?;
        Ok(Json(profile))
    }

    async fn handle_onboarding(
        State(resources): State<Arc<ServerResources>>,
        Extension(auth): Extension<AuthUser>,
        ApiJson(update): ApiJson<ProfileUpdate>,
    ) -> AppResult<Json<UserProfile>> {
        let profile = resources
            .database
            .profiles()
            .complete_onboarding(&auth.user_id, &update)
            .await?;
        tracing::info!(user.id = %auth.user_id, "Onboarding completed");
        Ok(Json(profile))
    }

    async fn handle_add_weight(
        State(resources): State<Arc<ServerResources>>,
        Extension(auth): Extension<AuthUser>,
        ApiJson(request): ApiJson<WeightRequest>,
    ) -> AppResult<Response> {
        let entry = resources
            .database
            .profiles()
            .add_weight(&auth.user_id, request.weight_kg, request.notes.as_deref())
            .await?;
        Ok((StatusCode::CREATED, Json(entry)).into_response())
    }

    async fn handle_weight_history(
        State(resources): State<Arc<ServerResources>>,
        Extension(auth): Extension<AuthUser>,
        ApiQuery(query): ApiQuery<ListQuery>,
    ) -> AppResult<Json<Vec<WeightEntry>>> {
        let history = resources
            .database
            .profiles()
            .weight_history(&auth.user_id, query.limit)
            .await?;
        Ok(Json(history))
    }
}
