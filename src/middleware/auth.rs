// ABOUTME: Bearer-token authentication middleware for protected API routes
// ABOUTME: Validates the session JWT and exposes the caller as an AuthUser extension
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FitCoach Contributors

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::header::AUTHORIZATION;
use axum::middleware::Next;
use axum::response::Response;
use fitcoach_core::errors::{AppError, AppResult};

use crate::auth::{bearer_token, AuthUser};
use crate::resources::ServerResources;

/// Reject requests without a valid bearer token
///
/// On success the handler can extract `Extension<AuthUser>`.
///
/// # Errors
///
/// - `AuthRequired` when no `Authorization` header is present
/// - `AuthInvalid` for a malformed header or a bad token
/// - `AuthExpired` for an expired token
pub async fn require_auth(
    State(resources): State<Arc<ServerResources>>,
    mut request: Request,
    next: Next,
) -> AppResult<Response> {
    let header = request
        .headers()
        .get(AUTHORIZATION)
        .ok_or_else(AppError::auth_required)?;
    let token = header
        .to_str()
        .ok()
        .and_then(bearer_token)
        .ok_or_else(|| AppError::auth_invalid("Authorization header must be 'Bearer <token>'"))?;

    let claims = resources.auth_manager.validate_token(token)?;
    tracing::Span::current().record("user_id", claims.sub.as_str());
    request.extensions_mut().insert(AuthUser::from(claims));

    Ok(next.run(request).await)
}
