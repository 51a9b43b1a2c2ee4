// ABOUTME: AI coach operations: chat with stored history and plan generation
// ABOUTME: Builds prompts, calls the LLM provider, validates output, and persists results
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FitCoach Contributors

use std::sync::Arc;
use std::time::Instant;

use fitcoach_core::constants::contexts;
use fitcoach_core::constants::limits::{CONVERSATION_CONTEXT_WINDOW, MAX_CHAT_MESSAGE_CHARS};
use fitcoach_core::constants::llm::{
    CHAT_MAX_TOKENS, CHAT_TEMPERATURE, PLAN_MAX_TOKENS, PLAN_TEMPERATURE,
};
use fitcoach_core::errors::{AppError, AppResult};
use fitcoach_core::models::{
    ConversationMessage, ConversationRole, DietPlan, UserProfile, WorkoutPlan,
};
use serde::Serialize;
use tracing::{info, instrument, warn};

use super::parsing::{parse_ai_payload, GeneratedDietPlan, GeneratedWorkoutPlan};
use super::prompts::{
    coach_system_prompt, diet_plan_prompt, workout_plan_prompt, DietPlanRequest,
    WorkoutPlanRequest,
};
use crate::database::Database;
use crate::llm::{ChatMessage, ChatRequest, ChatResponse, LlmProvider};
use crate::logging::AppLogger;

/// System message for plan generation calls
const PLAN_SYSTEM_MESSAGE: &str =
    "You are a certified fitness and nutrition coach. You answer with a single JSON object only.";

/// Longest accepted conversation context name
const MAX_CONTEXT_LEN: usize = 64;

/// Reply to a chat message
#[derive(Debug, Clone, Serialize)]
pub struct ChatReply {
    /// Assistant text
    pub reply: String,
    /// Conversation the exchange was stored in
    pub context: String,
}

/// Normalize a client-supplied conversation context, defaulting to `general`
///
/// # Errors
///
/// Returns `InvalidInput` for names outside `[a-z0-9_-]{1,64}`
pub fn normalize_context(context: Option<&str>) -> AppResult<String> {
    let Some(raw) = context.map(str::trim).filter(|c| !c.is_empty()) else {
        return Ok(contexts::GENERAL.to_owned());
    };
    let context = raw.to_lowercase();
    let valid = context.len() <= MAX_CONTEXT_LEN
        && context
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if valid {
        Ok(context)
    } else {
        Err(AppError::invalid_input(format!(
            "Invalid conversation context '{raw}'"
        )))
    }
}

/// AI coach backed by an optional LLM provider
#[derive(Clone)]
pub struct CoachService {
    database: Database,
    llm: Option<Arc<dyn LlmProvider>>,
}

impl CoachService {
    /// Create a coach; without a provider every AI operation answers `ResourceUnavailable`
    #[must_use]
    pub fn new(database: Database, llm: Option<Arc<dyn LlmProvider>>) -> Self {
        Self { database, llm }
    }

    /// Whether an LLM provider is configured
    #[must_use]
    pub fn is_available(&self) -> bool {
        self.llm.is_some()
    }

    /// Check the provider; `None` when no provider is configured
    ///
    /// # Errors
    ///
    /// Returns `ExternalServiceError` when the endpoint cannot be reached
    pub async fn check_provider(&self) -> AppResult<Option<bool>> {
        match &self.llm {
            Some(provider) => provider.health_check().await.map(Some),
            None => Ok(None),
        }
    }

    fn provider(&self) -> AppResult<&Arc<dyn LlmProvider>> {
        self.llm.as_ref().ok_or_else(|| {
            AppError::unavailable("The AI coach is not configured on this server")
        })
    }

    async fn call(
        provider: &dyn LlmProvider,
        user_id: &str,
        operation: &str,
        request: &ChatRequest,
    ) -> AppResult<ChatResponse> {
        let started = Instant::now();
        let result = provider.complete(request).await;
        let duration_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        let model = result.as_ref().map_or_else(
            |_| {
                request
                    .model
                    .as_deref()
                    .unwrap_or(provider.default_model())
                    .to_owned()
            },
            |response| response.model.clone(),
        );
        AppLogger::log_ai_call(user_id, operation, &model, result.is_ok(), duration_ms);
        result
    }

    async fn required_profile(&self, user_id: &str) -> AppResult<UserProfile> {
        self.database.profiles().get(user_id).await?.ok_or_else(|| {
            AppError::invalid_input("Complete your profile before generating a plan")
        })
    }

    /// Store a generation exchange; the plan is already saved, so failures are only logged
    async fn record_exchange(&self, user_id: &str, context: &str, request: String, reply: String) {
        let exchange = [
            ConversationMessage::now(ConversationRole::User, request),
            ConversationMessage::now(ConversationRole::Assistant, reply),
        ];
        if let Err(e) = self
            .database
            .conversations()
            .append_messages(user_id, context, &exchange)
            .await
        {
            warn!(user.id = %user_id, context, error = %e, "Failed to record plan generation");
        }
    }

    /// Send one chat message and store the exchange
    ///
    /// The model sees the profile-derived system prompt and the most recent stored
    /// messages of the same context.
    ///
    /// # Errors
    ///
    /// - `InvalidInput` for empty or oversized messages or a bad context name
    /// - `ResourceUnavailable` when no provider is configured
    /// - `ExternalServiceError` when the provider fails; nothing is stored then
    #[instrument(skip(self, message), fields(user.id = %user_id))]
    pub async fn chat(
        &self,
        user_id: &str,
        message: &str,
        context: Option<&str>,
    ) -> AppResult<ChatReply> {
        let message = message.trim();
        if message.is_empty() {
            return Err(AppError::missing_field("message"));
        }
        if message.chars().count() > MAX_CHAT_MESSAGE_CHARS {
            return Err(AppError::invalid_input(format!(
                "message must be at most {MAX_CHAT_MESSAGE_CHARS} characters"
            )));
        }
        let context = normalize_context(context)?;
        let provider = self.provider()?;

        let user = self.database.users().get_required(user_id).await?;
        let profile = self.database.profiles().get(user_id).await?;
        let history = self
            .database
            .conversations()
            .get_messages(user_id, &context)
            .await?;

        let recent = &history[history.len().saturating_sub(CONVERSATION_CONTEXT_WINDOW)..];
        let mut messages = Vec::with_capacity(recent.len() + 2);
        messages.push(ChatMessage::system(coach_system_prompt(
            &user,
            profile.as_ref(),
        )));
        messages.extend(recent.iter().map(ChatMessage::from));
        messages.push(ChatMessage::user(message));

        let request = ChatRequest::new(messages)
            .with_temperature(CHAT_TEMPERATURE)
            .with_max_tokens(CHAT_MAX_TOKENS);
        let response = Self::call(provider.as_ref(), user_id, "chat", &request).await?;

        let reply = response.content.trim().to_owned();
        if reply.is_empty() {
            return Err(AppError::invalid_ai_response("The AI coach returned an empty reply"));
        }

        self.database
            .conversations()
            .append_messages(
                user_id,
                &context,
                &[
                    ConversationMessage::now(ConversationRole::User, message),
                    ConversationMessage::now(ConversationRole::Assistant, reply.clone()),
                ],
            )
            .await?;

        Ok(ChatReply { reply, context })
    }

    /// Stored messages of one context, oldest first
    ///
    /// # Errors
    ///
    /// Returns an error for a bad context name or if the query fails
    pub async fn history(
        &self,
        user_id: &str,
        context: Option<&str>,
    ) -> AppResult<Vec<ConversationMessage>> {
        let context = normalize_context(context)?;
        self.database
            .conversations()
            .get_messages(user_id, &context)
            .await
    }

    /// Clear one context, or all of them when `context` is `None`
    ///
    /// Returns the number of messages removed.
    ///
    /// # Errors
    ///
    /// Returns an error for a bad context name or if the delete fails
    pub async fn clear_history(&self, user_id: &str, context: Option<&str>) -> AppResult<u64> {
        let context = match context.map(str::trim).filter(|c| !c.is_empty()) {
            Some(raw) => Some(normalize_context(Some(raw))?),
            None => None,
        };
        let deleted = self
            .database
            .conversations()
            .clear(user_id, context.as_deref())
            .await?;
        info!(user.id = %user_id, context = ?context, deleted, "Coach history cleared");
        Ok(deleted)
    }

    /// Generate, validate, and store a workout plan; it becomes the active plan
    ///
    /// # Errors
    ///
    /// - `InvalidInput` without a profile or with out-of-range overrides
    /// - `ResourceUnavailable` when no provider is configured
    /// - `ExternalServiceError` when the provider fails
    /// - `InvalidAiResponse` when the output does not match the plan shape
    #[instrument(skip(self, overrides), fields(user.id = %user_id))]
    pub async fn generate_workout_plan(
        &self,
        user_id: &str,
        overrides: &WorkoutPlanRequest,
    ) -> AppResult<WorkoutPlan> {
        if overrides.days_per_week.is_some_and(|d| !(1..=7).contains(&d)) {
            return Err(AppError::out_of_range("days_per_week must be between 1 and 7"));
        }
        let provider = self.provider()?;
        let profile = self.required_profile(user_id).await?;

        let prompt = workout_plan_prompt(&profile, overrides);
        let request = ChatRequest::new(vec![
            ChatMessage::system(PLAN_SYSTEM_MESSAGE),
            ChatMessage::user(prompt),
        ])
        .with_temperature(PLAN_TEMPERATURE)
        .with_max_tokens(PLAN_MAX_TOKENS);
        let response =
            Self::call(provider.as_ref(), user_id, "generate_workout_plan", &request).await?;

        let generated: GeneratedWorkoutPlan =
            parse_ai_payload(&response.content).inspect_err(|e| {
                warn!(user.id = %user_id, error = %e, chars = response.content.len(),
                    "Rejected generated workout plan");
            })?;
        let goal = profile.goal.map(|goal| goal.as_str().to_owned());
        let plan = self
            .database
            .workouts()
            .create_plan(user_id, &generated.into_new_plan(goal), true)
            .await?;

        let summary = overrides.focus.as_deref().map_or_else(
            || "Generate a workout plan".to_owned(),
            |focus| format!("Generate a workout plan focused on {focus}"),
        );
        self.record_exchange(user_id, contexts::WORKOUT_PLAN, summary, response.content)
            .await;
        info!(user.id = %user_id, plan.id = %plan.id, days = plan.days.len(), "Generated workout plan");
        Ok(plan)
    }

    /// Generate, validate, and store a diet plan; it becomes the active plan
    ///
    /// # Errors
    ///
    /// Same as [`Self::generate_workout_plan`]
    #[instrument(skip(self, overrides), fields(user.id = %user_id))]
    pub async fn generate_diet_plan(
        &self,
        user_id: &str,
        overrides: &DietPlanRequest,
    ) -> AppResult<DietPlan> {
        use fitcoach_core::constants::validation::{MAX_DAILY_CALORIES, MIN_DAILY_CALORIES};

        if overrides
            .calorie_target
            .is_some_and(|c| !(MIN_DAILY_CALORIES..=MAX_DAILY_CALORIES).contains(&c))
        {
            return Err(AppError::out_of_range(format!(
                "calorie_target must be between {MIN_DAILY_CALORIES} and {MAX_DAILY_CALORIES}"
            )));
        }
        let provider = self.provider()?;
        let profile = self.required_profile(user_id).await?;

        let prompt = diet_plan_prompt(&profile, overrides);
        let request = ChatRequest::new(vec![
            ChatMessage::system(PLAN_SYSTEM_MESSAGE),
            ChatMessage::user(prompt),
        ])
        .with_temperature(PLAN_TEMPERATURE)
        .with_max_tokens(PLAN_MAX_TOKENS);
        let response =
            Self::call(provider.as_ref(), user_id, "generate_diet_plan", &request).await?;

        let generated: GeneratedDietPlan =
            parse_ai_payload(&response.content).inspect_err(|e| {
                warn!(user.id = %user_id, error = %e, chars = response.content.len(),
                    "Rejected generated diet plan");
            })?;
        let plan = self
            .database
            .diet()
            .create_plan(user_id, &generated.into_new_plan(), true)
            .await?;

        let summary = overrides.calorie_target.map_or_else(
            || "Generate a diet plan".to_owned(),
            |calories| format!("Generate a diet plan with {calories} kcal per day"),
        );
        self.record_exchange(user_id, contexts::DIET_PLAN, summary, response.content)
            .await;
        info!(user.id = %user_id, plan.id = %plan.id, meals = plan.meals.len(), "Generated diet plan");
        Ok(plan)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fitcoach_core::errors::ErrorCode;

    #[test]
    fn test_normalize_context() {
        assert_eq!(normalize_context(None).unwrap(), "general");
        assert_eq!(normalize_context(Some("  ")).unwrap(), "general");
        assert_eq!(
            normalize_context(Some("Workout_Plan")).unwrap(),
            "workout_plan"
        );
        assert_eq!(
            normalize_context(Some("drop table;")).unwrap_err().code,
            ErrorCode::InvalidInput
        );
    }
}
