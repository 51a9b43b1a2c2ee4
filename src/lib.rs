// ABOUTME: Main library entry point for the FitCoach coaching API
// ABOUTME: Wires configuration, storage, authentication, the AI coach, and HTTP routes
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FitCoach Contributors

#![deny(unsafe_code)]

//! # FitCoach API
//!
//! Backend for an AI-assisted fitness coaching application: users onboard with
//! body metrics and goals, receive generated workout and diet plans, log
//! sessions, meals, and weight, and track progress and achievements.
//!
//! ## Architecture
//!
//! - **Database**: SQLite via `sqlx`, one manager per aggregate
//! - **Coach**: prompt building, LLM calls, and typed parsing of generated plans
//! - **Routes**: axum routers per domain, guarded by bearer-token middleware
//! - **Server**: router assembly with tracing, request IDs, CORS, and rate limiting
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use fitcoach_server::config::ServerConfig;
//! use fitcoach_server::resources::ServerResources;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ServerConfig::from_env()?;
//!     let resources = Arc::new(ServerResources::from_config(config).await?);
//!     fitcoach_server::server::run(resources).await?;
//!     Ok(())
//! }
//! ```

/// Achievement rules and streak calculation
pub mod achievements;

/// Password hashing and session tokens
pub mod auth;

/// AI coach: prompts, plan parsing, and the chat/generation service
pub mod coach;

/// Environment-driven server configuration
pub mod config;

/// SQLite storage and per-aggregate managers
pub mod database;

/// Built-in exercise catalog, search aliases, and GIF matching
pub mod exercise_catalog;

/// LLM provider abstraction and the OpenAI-compatible client
pub mod llm;

/// Structured logging setup and audit helpers
pub mod logging;

/// HTTP middleware (auth, CORS, rate limiting, tracing)
pub mod middleware;

/// Fixed-window request limiter
pub mod rate_limiting;

/// Shared handler state
pub mod resources;

/// HTTP route handlers by domain
pub mod routes;

/// Router assembly and the serve loop
pub mod server;

pub use fitcoach_core::{constants, errors, models};
