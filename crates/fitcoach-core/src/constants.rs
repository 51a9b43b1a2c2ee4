// ABOUTME: Application constants organized by domain for the FitCoach platform
// ABOUTME: Service names, limits, validation ranges, defaults, and media locations
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FitCoach Contributors

//! Constants module
//!
//! Constants are grouped into small domain modules rather than a single flat list.

/// Service identity used in logs and JWT audience
pub mod service_names {
    /// Server name reported in logs and health responses
    pub const FITCOACH_SERVER: &str = "fitcoach-server";
    /// Audience claim for user tokens
    pub const API_AUDIENCE: &str = "fitcoach-api";
}

/// Network defaults
pub mod ports {
    /// Default HTTP port
    pub const DEFAULT_HTTP_PORT: u16 = 8081;
}

/// Default limits
pub mod limits {
    /// Stored messages kept per (user, context) conversation
    pub const CONVERSATION_HISTORY_CAP: usize = 20;
    /// Stored messages sent to the model as context
    pub const CONVERSATION_CONTEXT_WINDOW: usize = 10;
    /// Default page size for list endpoints
    pub const DEFAULT_LIST_LIMIT: i64 = 50;
    /// Upper bound for any list endpoint
    pub const MAX_LIST_LIMIT: i64 = 200;
    /// Longest accepted coach chat message
    pub const MAX_CHAT_MESSAGE_CHARS: usize = 4000;
    /// Default user session length
    pub const DEFAULT_SESSION_HOURS: i64 = 168;
    /// Maximum accepted request body
    pub const MAX_REQUEST_BODY_BYTES: usize = 1024 * 1024;
    /// Minimum password length at registration
    pub const MIN_PASSWORD_LENGTH: usize = 8;
}

/// Fixed-window rate limiting defaults
pub mod rate_limit {
    /// Requests allowed per client per window
    pub const DEFAULT_MAX_REQUESTS: u32 = 100;
    /// Window length (15 minutes)
    pub const DEFAULT_WINDOW_SECS: u64 = 15 * 60;
    /// Map size above which stale client entries are swept
    pub const CLEANUP_THRESHOLD: usize = 10_000;
}

/// Accepted ranges for profile and log values
pub mod validation {
    /// Minimum user age
    pub const MIN_AGE: i64 = 13;
    /// Maximum user age
    pub const MAX_AGE: i64 = 120;
    /// Minimum height in centimetres
    pub const MIN_HEIGHT_CM: f64 = 100.0;
    /// Maximum height in centimetres
    pub const MAX_HEIGHT_CM: f64 = 250.0;
    /// Minimum body weight in kilograms
    pub const MIN_WEIGHT_KG: f64 = 30.0;
    /// Maximum body weight in kilograms
    pub const MAX_WEIGHT_KG: f64 = 400.0;
    /// Minimum daily calorie target in AI diet plans
    pub const MIN_DAILY_CALORIES: i64 = 800;
    /// Maximum daily calorie target in AI diet plans
    pub const MAX_DAILY_CALORIES: i64 = 6000;
    /// Maximum sets per exercise in AI workout plans
    pub const MAX_SETS: i64 = 10;
    /// Workout rating scale upper bound
    pub const MAX_RATING: i64 = 5;
}

/// LLM client defaults
pub mod llm {
    /// Default OpenAI-compatible base URL
    pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
    /// Default chat model
    pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
    /// Default outbound timeout
    pub const DEFAULT_TIMEOUT_SECS: u64 = 60;
    /// Temperature for conversational replies
    pub const CHAT_TEMPERATURE: f32 = 0.7;
    /// Temperature for JSON plan generation
    pub const PLAN_TEMPERATURE: f32 = 0.4;
    /// Token budget for plan generation
    pub const PLAN_MAX_TOKENS: u32 = 4000;
    /// Token budget for chat replies
    pub const CHAT_MAX_TOKENS: u32 = 800;
}

/// Exercise media locations
pub mod media {
    /// CDN base for exercise demonstration GIFs
    pub const GIF_CDN_BASE: &str = "https://cdn.fitcoach.app/exercises";
}

/// Conversation context labels
pub mod contexts {
    /// Default free-form coaching thread
    pub const GENERAL: &str = "general";
    /// Thread recording workout plan generations
    pub const WORKOUT_PLAN: &str = "workout_plan";
    /// Thread recording diet plan generations
    pub const DIET_PLAN: &str = "diet_plan";
}
