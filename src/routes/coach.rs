// ABOUTME: AI coach route handlers for chat, conversation history, and plan generation
// ABOUTME: Thin wrappers over CoachService; generated plans are returned as stored
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
use fitcoach_core::models::ConversationMessage;
use serde::{Deserialize, Serialize};

use super::extract::{ApiJson, ApiQuery};
use crate::auth::AuthUser;
use crate::coach::{normalize_context, ChatReply, DietPlanRequest, WorkoutPlanRequest};
use crate::middleware::require_auth;
use crate::resources::ServerResources;

/// Chat payload
#[derive(Debug, Deserialize)]
pub struct ChatRequestBody {
    /// User message
    pub message: String,
    /// Conversation name, `general` by default
    #[serde(default)]
    pub context: Option<String>,
}

/// `?context=`
#[derive(Debug, Default, Deserialize)]
pub struct ContextQuery {
    /// Conversation name
    #[serde(default)]
    pub context: Option<String>,
}

/// Stored conversation
#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    /// Conversation name
    pub context: String,
    /// Messages, oldest first
    pub messages: Vec<ConversationMessage>,
}

/// Result of clearing history
#[derive(Debug, Serialize)]
pub struct ClearHistoryResponse {
    /// Messages removed
    pub deleted: u64,
}

/// AI coach routes
pub struct CoachRoutes;

impl CoachRoutes {
    /// Create all coach routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/chat", post(Self::handle_chat))
            .route(
                "/history",
                get(Self::handle_history).delete(Self::handle_clear_history),
            )
            .route("/generate-workout", post(Self::handle_generate_workout))
            .route("/generate-diet", post(Self::handle_generate_diet))
            .route_layer(from_fn_with_state(resources.clone(), require_auth))
            .with_state(resources)
    }

    async fn handle_chat(
        State(resources): State<Arc<ServerResources>>,
        Extension(auth): Extension<AuthUser>,
        ApiJson(body): ApiJson<ChatRequestBody>,
    ) -> AppResult<Json<ChatReply>> {
        Ok(Json(
            resources
                .coach
                .chat(&auth.user_id, &body.message, body.context.as_deref())
                .await?,
        ))
    }

    async fn handle_history(
        State(resources): State<Arc<ServerResources>>,
        Extension(auth): Extension<AuthUser>,
        ApiQuery(query): ApiQuery<ContextQuery>,
    ) -> AppResult<Json<HistoryResponse>> {
        let context = normalize_context(query.context.as_deref())?;
        let messages = resources
            .coach
            .history(&auth.user_id, Some(&context))
            .await?;
        Ok(Json(HistoryResponse { context, messages }))
    }

    async fn handle_clear_history(
        State(resources): State<Arc<ServerResources>>,
        Extension(auth): Extension<AuthUser>,
        ApiQuery(query): ApiQuery<ContextQuery>,
    ) -> AppResult<Json<ClearHistoryResponse>> {
        let deleted = resources
            .coach
            .clear_history(&auth.user_id, query.context.as_deref())
            .await?;
        Ok(Json(ClearHistoryResponse { deleted }))
    }

    async fn handle_generate_workout(
        State(resources): State<Arc<ServerResources>>,
        Extension(auth): Extension<AuthUser>,
        ApiJson(request): ApiJson<WorkoutPlanRequest>,
    ) -> AppResult<Response> {
        let plan = resources
            .coach
            .generate_workout_plan(&auth.user_id, &request)
            .await?;
        Ok((StatusCode::CREATED, Json(plan)).into_response())
    }

    async fn handle_generate_diet(
        State(resources): State<Arc<ServerResources>>,
        Extension(auth): Extension<AuthUser>,
        ApiJson(request): ApiJson<DietPlanRequest>,
    ) -> AppResult<Response> {
        let plan = resources
            .coach
            .generate_diet_plan(&auth.user_id, &request)
            .await?;
        Ok((StatusCode::CREATED, Json(plan)).into_response())
    }
}
