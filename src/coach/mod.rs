// ABOUTME: AI coach module: prompts, strict response parsing, and the coach service
// ABOUTME: The only place that turns model output into stored plans and conversations
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FitCoach Contributors

//! # AI Coach
//!
//! The coach formats prompts from the user's profile, calls the configured
//! [`LlmProvider`](crate::llm::LlmProvider), and stores what comes back:
//!
//! - chat replies go into a capped per-context conversation history
//! - generated plans are parsed into typed shapes, validated, and saved as the
//!   user's active plan
//!
//! Model output that does not match the declared shape is rejected with
//! `InvalidAiResponse`; nothing partial is stored.

pub mod parsing;
pub mod prompts;
mod service;

pub use prompts::{DietPlanRequest, WorkoutPlanRequest};
pub use service::{normalize_context, ChatReply, CoachService};
