// ABOUTME: HTTP server assembly mounting every route group behind the shared middleware stack
// ABOUTME: Binds the listener and serves with client socket info for rate limiting
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FitCoach Contributors

//! # Server
//!
//! Layer order, outermost first: CORS, request ID assignment, tracing span,
//! request ID propagation, panic catcher, body limit, rate limiter. The
//! limiter therefore sees every request, including unknown routes, and the
//! rate-limit headers end up on every response it lets through.

use std::any::Any;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::middleware::from_fn_with_state;
use axum::response::{IntoResponse, Response};
use axum::Router;
use fitcoach_core::constants::limits::MAX_REQUEST_BODY_BYTES;
use fitcoach_core::errors::{AppError, AppResult};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::middleware::{create_request_span, enforce_rate_limit, setup_cors};
use crate::resources::ServerResources;
use crate::routes::{
    AuthRoutes, CoachRoutes, DietRoutes, HealthRoutes, ProgressRoutes, UserRoutes, WorkoutRoutes,
};

/// Build the complete application router
pub fn build_router(resources: Arc<ServerResources>) -> Router {
    let api = Router::new()
        .nest("/auth", AuthRoutes::routes(resources.clone()))
        .nest("/user", UserRoutes::routes(resources.clone()))
        .nest("/workouts", WorkoutRoutes::routes(resources.clone()))
        .nest("/diet", DietRoutes::routes(resources.clone()))
        .nest("/progress", ProgressRoutes::routes(resources.clone()))
        .nest("/coach", CoachRoutes::routes(resources.clone()));

    Router::new()
        .merge(HealthRoutes::routes(resources.clone()))
        .nest("/api", api)
        .fallback(handle_not_found)
        .layer(from_fn_with_state(resources.clone(), enforce_rate_limit))
        .layer(DefaultBodyLimit::max(MAX_REQUEST_BODY_BYTES))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(TraceLayer::new_for_http().make_span_with(create_request_span))
                .layer(PropagateRequestIdLayer::x_request_id())
                .layer(CatchPanicLayer::custom(handle_panic)),
        )
        // Separate call so the body is mapped back to axum's before CORS wraps it
        .layer(setup_cors(&resources.config.cors))
}

/// Bind the configured address and serve until the process stops
///
/// # Errors
///
/// Returns an error if the listener cannot be bound or the server fails
pub async fn run(resources: Arc<ServerResources>) -> AppResult<()> {
    let addr = SocketAddr::new(resources.config.host, resources.config.http_port);
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;

    info!(%addr, "FitCoach API listening");

    let router = build_router(resources);
    axum::serve(
        listener,
        router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .map_err(|e| AppError::internal(format!("HTTP server error: {e}")))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received, draining connections");
}

async fn handle_not_found() -> AppError {
    AppError::not_found("Route")
}

fn handle_panic(panic: Box<dyn Any + Send + 'static>) -> Response {
    let details = panic
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| panic.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    error!(panic = %details, "Request handler panicked");
    AppError::internal("Internal server error").into_response()
}
