// ABOUTME: Route module organization for the FitCoach HTTP API
// ABOUTME: Provides route definitions organized by domain with thin handlers over the managers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FitCoach Contributors

//! Route module for the FitCoach API
//!
//! Each domain module exposes a `*Routes::routes(resources)` constructor that
//! returns a fully stated `Router`; `server::build_router` nests them under
//! `/api/<domain>`. Handlers only extract, delegate, and wrap the result.

use serde::Deserialize;

/// Registration, login, and current-user routes
pub mod auth;
/// AI coach chat, history, and plan generation routes
pub mod coach;
/// Diet plan and meal log routes
pub mod diet;
/// JSON and query extractors that reject with the API error envelope
pub mod extract;
/// Health check and readiness routes
pub mod health;
/// Progress dashboard and achievement routes
pub mod progress;
/// Profile, onboarding, and weight routes
pub mod user;
/// Exercise catalog, workout plan, and session routes
pub mod workouts;

/// Authentication route handlers
pub use auth::AuthRoutes;
/// AI coach route handlers
pub use coach::CoachRoutes;
/// Diet route handlers
pub use diet::DietRoutes;
/// Health route handlers
pub use health::HealthRoutes;
/// Progress route handlers
pub use progress::ProgressRoutes;
/// Profile route handlers
pub use user::UserRoutes;
/// Workout route handlers
pub use workouts::WorkoutRoutes;

/// `?limit=N` for newest-first listings
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    /// Maximum rows; the manager applies its own default when absent
    #[serde(default)]
    pub limit: Option<i64>,
}
