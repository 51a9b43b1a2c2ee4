// ABOUTME: Shared test utilities and setup functions for integration tests
// ABOUTME: Provides in-memory resources, a scripted LLM provider, and user/token helpers
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright (c) 2025 FitCoach Contributors
#![allow(
    dead_code,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate,
    clippy::unwrap_used,
    clippy::expect_used
)]
//! Shared test utilities for `fitcoach_server`
//!
//! Every helper builds on a fresh `sqlite::memory:` database so tests never
//! share state.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, Once};

use anyhow::Result;
use async_trait::async_trait;
use fitcoach_core::errors::{AppError, AppResult};
use fitcoach_core::models::{
    FitnessGoal, FitnessLevel, Gender, ProfileUpdate, User, UserProfile,
};
use fitcoach_server::{
    config::{RateLimitConfig, ServerConfig},
    database::Database,
    llm::{ChatRequest, ChatResponse, LlmProvider},
    resources::ServerResources,
    server::build_router,
};
use uuid::Uuid;

static INIT_LOGGER: Once = Once::new();

/// Initialize quiet logging for tests (call once per test process)
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        let log_level = match std::env::var("TEST_LOG").as_deref() {
            Ok("TRACE") => tracing::Level::TRACE,
            Ok("DEBUG") => tracing::Level::DEBUG,
            Ok("INFO") => tracing::Level::INFO,
            _ => tracing::Level::WARN,
        };

        tracing_subscriber::fmt()
            .with_max_level(log_level)
            .with_test_writer()
            .init();
    });
}

/// Reply used when the script runs out
pub const DEFAULT_MOCK_REPLY: &str = "Stay consistent and keep hydrating.";

/// LLM provider that answers from a script and records every request
#[derive(Default)]
pub struct MockLlmProvider {
    script: Mutex<VecDeque<AppResult<String>>>,
    requests: Mutex<Vec<ChatRequest>>,
}

impl MockLlmProvider {
    /// Provider answering with `replies` in order, then [`DEFAULT_MOCK_REPLY`]
    pub fn with_replies<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let provider = Self::default();
        for reply in replies {
            provider.push_reply(reply);
        }
        provider
    }

    /// Queue a successful reply
    pub fn push_reply(&self, reply: impl Into<String>) {
        self.script.lock().unwrap().push_back(Ok(reply.into()));
    }

    /// Queue a failure
    pub fn push_error(&self, error: AppError) {
        self.script.lock().unwrap().push_back(Err(error));
    }

    /// Requests received so far
    pub fn requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmProvider for MockLlmProvider {
    fn name(&self) -> &'static str {
        "mock"
    }

    fn default_model(&self) -> &str {
        "mock-model"
    }

    async fn complete(&self, request: &ChatRequest) -> AppResult<ChatResponse> {
        self.requests.lock().unwrap().push(request.clone());
        let next = self.script.lock().unwrap().pop_front();
        let content = match next {
            Some(Ok(content)) => content,
            Some(Err(error)) => return Err(error),
            None => DEFAULT_MOCK_REPLY.to_owned(),
        };
        Ok(ChatResponse {
            content,
            model: "mock-model".to_owned(),
            usage: None,
            finish_reason: Some("stop".to_owned()),
        })
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(true)
    }
}

/// Configuration for tests: in-memory database, limiter off, fixed secret
pub fn test_config() -> ServerConfig {
    let mut config = ServerConfig::default();
    config.database.url = "sqlite::memory:".to_owned();
    config.auth.jwt_secret = "integration-test-secret-with-enough-length".to_owned();
    config.rate_limit = RateLimitConfig {
        enabled: false,
        ..RateLimitConfig::default()
    };
    config
}

/// Standard test database setup
pub async fn create_test_database() -> Result<Database> {
    init_test_logging();
    Ok(Database::new("sqlite::memory:").await?)
}

/// Resources with the given config and optional LLM
pub async fn create_resources_with(
    config: ServerConfig,
    llm: Option<Arc<dyn LlmProvider>>,
) -> Result<Arc<ServerResources>> {
    init_test_logging();
    let database = Database::new(&config.database.url).await?;
    Ok(Arc::new(ServerResources::new(config, database, llm)))
}

/// Resources without an LLM provider
pub async fn create_test_resources() -> Result<Arc<ServerResources>> {
    create_resources_with(test_config(), None).await
}

/// Resources backed by `provider`
pub async fn create_test_resources_with_llm(
    provider: Arc<MockLlmProvider>,
) -> Result<Arc<ServerResources>> {
    let llm: Arc<dyn LlmProvider> = provider;
    create_resources_with(test_config(), Some(llm)).await
}

/// Full application router over `resources`
pub fn app(resources: &Arc<ServerResources>) -> axum::Router {
    build_router(resources.clone())
}

/// Insert a user directly (the stored hash is not a valid bcrypt hash)
pub async fn create_test_user(database: &Database) -> Result<User> {
    let email = format!("user_{}@example.com", Uuid::new_v4().simple());
    create_test_user_with_email(database, &email).await
}

/// Insert a user with a specific email
pub async fn create_test_user_with_email(database: &Database, email: &str) -> Result<User> {
    Ok(database
        .users()
        .create(email, "not-a-real-hash", Some("Test User"))
        .await?)
}

/// Create a user and return it with a valid bearer token
pub async fn create_user_and_token(resources: &ServerResources) -> Result<(User, String)> {
    let user = create_test_user(&resources.database).await?;
    let token = resources.auth_manager.generate_token(&user)?;
    Ok((user, token))
}

/// Onboarding payload for a 30-year-old intermediate lifter
pub fn sample_onboarding() -> ProfileUpdate {
    ProfileUpdate {
        age: Some(30),
        gender: Some(Gender::Male),
        height_cm: Some(180.0),
        current_weight_kg: Some(85.0),
        target_weight_kg: Some(78.0),
        fitness_level: Some(FitnessLevel::Intermediate),
        goal: Some(FitnessGoal::LoseWeight),
        workout_days_per_week: Some(4),
        available_equipment: Some(vec!["dumbbells".to_owned(), "barbell".to_owned()]),
        ..ProfileUpdate::default()
    }
}

/// Store the sample onboarding profile for `user_id`
pub async fn onboard_user(database: &Database, user_id: &str) -> Result<UserProfile> {
    Ok(database
        .profiles()
        .complete_onboarding(user_id, &sample_onboarding())
        .await?)
}
