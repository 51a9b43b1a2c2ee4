// ABOUTME: Health check route handlers for service monitoring and status endpoints
// ABOUTME: Provides liveness and database-backed readiness endpoints
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FitCoach Contributors

//! Health check routes for service monitoring
//!
//! `/health` answers as long as the process serves requests; `/ready` also pings
//! the database and reports whether the AI coach is configured.

use std::sync::Arc;

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use fitcoach_core::errors::AppResult;

use crate::resources::ServerResources;

/// Health routes implementation
pub struct HealthRoutes;

impl HealthRoutes {
    /// Create all health check routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/health", get(Self::handle_health))
            .route("/ready", get(Self::handle_ready))
            .with_state(resources)
    }

    async fn handle_health() -> Json<serde_json::Value> {
        Json(serde_json::json!({
            "status": "healthy",
            "timestamp": chrono::Utc::now().to_rfc3339()
        }))
    }

    async fn handle_ready(
        State(resources): State<Arc<ServerResources>>,
    ) -> AppResult<Json<serde_json::Value>> {
        resources.database.ping().await?;
        Ok(Json(serde_json::json!({
            "status": "ready",
            "database": "ok",
            "ai_coach": if resources.coach.is_available() { "configured" } else { "not configured" },
            "timestamp": chrono::Utc::now().to_rfc3339()
        })))
    }
}
