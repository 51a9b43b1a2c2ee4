// ABOUTME: Coach conversation message stored in the per-context history array
// ABOUTME: Roles are limited to user and assistant; system prompts are never persisted
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FitCoach Contributors

use serde::{Deserialize, Serialize};

text_enum! {
    /// Author of a stored coach message
    pub enum ConversationRole {
        /// The end user
        User => "user",
        /// The AI coach
        Assistant => "assistant",
    }
}

/// Entry of `coach_conversations.messages`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationMessage {
    /// Author
    pub role: ConversationRole,
    /// Message text
    pub content: String,
    /// RFC 3339 time the message was stored
    pub timestamp: String,
}

impl ConversationMessage {
    /// Message stamped with the current time
    pub fn now(role: ConversationRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            timestamp: chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
        }
    }
}
