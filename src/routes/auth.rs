// ABOUTME: User authentication route handlers for registration, login, and identity
// ABOUTME: Issues bearer tokens after password checks and returns the authenticated user
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FitCoach Contributors

//! Authentication routes
//!
//! `register` and `login` are public; `me` sits behind the bearer-token guard.
//! Login failures never reveal whether the email exists.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::middleware::from_fn_with_state;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use fitcoach_core::constants::limits::MIN_PASSWORD_LENGTH;
use fitcoach_core::errors::{AppError, AppResult};
use fitcoach_core::models::User;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::extract::ApiJson;
use crate::auth::{hash_password, verify_password, AuthUser};
use crate::logging::AppLogger;
use crate::middleware::require_auth;
use crate::resources::ServerResources;

/// User registration request
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterRequest {
    /// Login email
    pub email: String,
    /// Plain-text password, at least 8 characters
    pub password: String,
    /// Optional display name
    #[serde(default)]
    pub name: Option<String>,
}

/// User login request
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// Login email
    pub email: String,
    /// Plain-text password
    pub password: String,
}

/// Token plus the account it belongs to
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    /// Bearer token
    pub token: String,
    /// Token lifetime in seconds
    pub expires_in: i64,
    /// Account
    pub user: User,
}

/// Authentication routes
pub struct AuthRoutes;

impl AuthRoutes {
    /// Create all authentication routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/me", get(Self::handle_me))
            .route_layer(from_fn_with_state(resources.clone(), require_auth))
            .route("/register", post(Self::handle_register))
            .route("/login", post(Self::handle_login))
            .with_state(resources)
    }

    fn respond(resources: &ServerResources, user: User) -> AppResult<AuthResponse> {
        Ok(AuthResponse {
            token: resources.auth_manager.generate_token(&user)?,
            expires_in: resources.auth_manager.token_expiry_hours() * 3600,
            user,
        })
    }

    async fn handle_register(
        State(resources): State<Arc<ServerResources>>,
        ApiJson(request): ApiJson<RegisterRequest>,
    ) -> AppResult<Response> {
        if request.email.trim().is_empty() {
            return Err(AppError::missing_field("email"));
        }
        if !User::is_valid_email(&request.email) {
            return Err(AppError::invalid_input("Invalid email format"));
        }
        if request.password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(AppError::invalid_input(format!(
                "Password must be at least {MIN_PASSWORD_LENGTH} characters"
            )));
        }

        let password_hash = hash_password(request.password).await?;
        let user = resources
            .database
            .users()
            .create(&request.email, &password_hash, request.name.as_deref())
            .await?;

        AppLogger::log_auth_event(&user.id, "register", true, None);
        info!(user.id = %user.id, "User registered");
        let body = Self::respond(&resources, user)?;
        Ok((StatusCode::CREATED, Json(body)).into_response())
    }

    async fn handle_login(
        State(resources): State<Arc<ServerResources>>,
        ApiJson(request): ApiJson<LoginRequest>,
    ) -> AppResult<Json<AuthResponse>> {
        if request.email.trim().is_empty() {
            return Err(AppError::missing_field("email"));
        }
        if request.password.is_empty() {
            return Err(AppError::missing_field("password"));
        }

        let invalid = || AppError::auth_invalid("Invalid email or password");
        let Some(user) = resources.database.users().get_by_email(&request.email).await? else {
            AppLogger::log_auth_event("unknown", "login", false, Some("unknown email"));
            return Err(invalid());
        };

        if !verify_password(request.password, user.password_hash.clone()).await? {
            AppLogger::log_auth_event(&user.id, "login", false, Some("wrong password"));
            return Err(invalid());
        }

        AppLogger::log_auth_event(&user.id, "login", true, None);
        Ok(Json(Self::respond(&resources, user)?))
    }

    async fn handle_me(
        State(resources): State<Arc<ServerResources>>,
        Extension(auth): Extension<AuthUser>,
    ) -> AppResult<Json<User>> {
        Ok(Json(
            resources.database.users().get_required(&auth.user_id).await?,
        ))
    }
}
