// ABOUTME: Centralized resource container for dependency injection into HTTP handlers
// ABOUTME: Holds the database, token manager, rate limiter, AI coach, and configuration
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FitCoach Contributors

//! # Server Resources
//!
//! Built once at startup and shared as `Arc<ServerResources>` router state.
//! Tests build the same container with an in-memory database and a scripted
//! LLM provider.

use std::sync::Arc;

use fitcoach_core::errors::AppResult;
use tracing::info;

use crate::auth::AuthManager;
use crate::coach::CoachService;
use crate::config::ServerConfig;
use crate::database::Database;
use crate::llm::{LlmProvider, OpenAiCompatibleConfig, OpenAiCompatibleProvider};
use crate::rate_limiting::RateLimiter;

/// Shared server state
#[derive(Clone)]
pub struct ServerResources {
    /// Storage
    pub database: Database,
    /// Session token issuer/validator
    pub auth_manager: Arc<AuthManager>,
    /// Global request limiter
    pub rate_limiter: RateLimiter,
    /// AI coach (answers 503 when no provider is configured)
    pub coach: CoachService,
    /// Loaded configuration
    pub config: Arc<ServerConfig>,
}

impl ServerResources {
    /// Assemble resources around an existing database and optional provider
    #[must_use]
    pub fn new(
        config: ServerConfig,
        database: Database,
        llm: Option<Arc<dyn LlmProvider>>,
    ) -> Self {
        let auth_manager = AuthManager::new(
            config.auth.jwt_secret.as_bytes(),
            config.auth.jwt_expiry_hours,
        );
        Self {
            rate_limiter: RateLimiter::new(&config.rate_limit),
            coach: CoachService::new(database.clone(), llm),
            auth_manager: Arc::new(auth_manager),
            database,
            config: Arc::new(config),
        }
    }

    /// Connect the database and build the configured LLM provider
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or migrated, or if the
    /// HTTP client for the LLM provider cannot be built
    pub async fn from_config(config: ServerConfig) -> AppResult<Self> {
        let database = Database::new(&config.database.url).await?;

        let llm: Option<Arc<dyn LlmProvider>> =
            match OpenAiCompatibleConfig::from_llm_config(&config.llm) {
                Some(provider_config) => {
                    let provider = OpenAiCompatibleProvider::new(provider_config)?;
                    info!(
                        provider = provider.name(),
                        model = provider.default_model(),
                        "AI coach enabled"
                    );
                    Some(Arc::new(provider))
                }
                None => None,
            };

        Ok(Self::new(config, database, llm))
    }
}
