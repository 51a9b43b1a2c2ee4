// ABOUTME: Database operations for coach conversation history
// ABOUTME: One JSON message array per (user, context) capped to the most recent messages
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FitCoach Contributors

use fitcoach_core::constants::limits::CONVERSATION_HISTORY_CAP;
use fitcoach_core::errors::{AppError, AppResult};
use fitcoach_core::models::ConversationMessage;
use sqlx::{Row, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use super::now_rfc3339;

/// Coach conversation database operations
pub struct ConversationManager {
    pool: SqlitePool,
}

impl ConversationManager {
    /// Create a new conversation manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Stored messages for one context, oldest first
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or the stored array is unreadable
    pub async fn get_messages(
        &self,
        user_id: &str,
        context: &str,
    ) -> AppResult<Vec<ConversationMessage>> {
        let raw: Option<String> = sqlx::query(
            "SELECT messages FROM coach_conversations WHERE user_id = $1 AND context = $2",
        )
        .bind(user_id)
        .bind(context)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to get conversation: {e}")))?
        .map(|row| row.get("messages"));

        match raw {
            Some(raw) => Ok(serde_json::from_str(&raw)?),
            None => Ok(Vec::new()),
        }
    }

    /// Append `messages` and keep only the most recent ones
    ///
    /// Returns the stored history after trimming.
    ///
    /// # Errors
    ///
    /// Returns an error if the read or write fails; the history is unchanged then
    pub async fn append_messages(
        &self,
        user_id: &str,
        context: &str,
        messages: &[ConversationMessage],
    ) -> AppResult<Vec<ConversationMessage>> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::database(format!("Failed to begin transaction: {e}")))?;

        // Claiming the row first takes the write lock before the history is read
        let now = now_rfc3339();
        sqlx::query(
            r"
            INSERT INTO coach_conversations (id, user_id, context, messages, created_at, updated_at)
            VALUES ($1, $2, $3, '[]', $4, $4)
            ON CONFLICT(user_id, context) DO UPDATE SET updated_at = excluded.updated_at
            ",
        )
        .bind(Uuid::new_v4().to_string())
        .bind(user_id)
        .bind(context)
        .bind(&now)
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::database(format!("Failed to save conversation: {e}")))?;

        let raw: String = sqlx::query(
            "SELECT messages FROM coach_conversations WHERE user_id = $1 AND context = $2",
        )
        .bind(user_id)
        .bind(context)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| AppError::database(format!("Failed to get conversation: {e}")))?
        .get("messages");

        let mut history: Vec<ConversationMessage> = serde_json::from_str(&raw)?;
        history.extend_from_slice(messages);
        if history.len() > CONVERSATION_HISTORY_CAP {
            history.drain(..history.len() - CONVERSATION_HISTORY_CAP);
        }

        sqlx::query(
            "UPDATE coach_conversations SET messages = $1 WHERE user_id = $2 AND context = $3",
        )
        .bind(serde_json::to_string(&history)?)
        .bind(user_id)
        .bind(context)
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::database(format!("Failed to save conversation: {e}")))?;

        tx.commit()
            .await
            .map_err(|e| AppError::database(format!("Failed to commit conversation: {e}")))?;
        debug!(user.id = %user_id, context, stored = history.len(), "Conversation updated");
        Ok(history)
    }

    /// Delete one context, or every context when `context` is `None`
    ///
    /// Returns the number of messages removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the delete fails; nothing is removed then
    pub async fn clear(&self, user_id: &str, context: Option<&str>) -> AppResult<u64> {
        let removed: i64 = sqlx::query(
            r"
            DELETE FROM coach_conversations
            WHERE user_id = $1 AND ($2 IS NULL OR context = $2)
            RETURNING json_array_length(messages) AS removed
            ",
        )
        .bind(user_id)
        .bind(context)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to clear conversation: {e}")))?
        .iter()
        .map(|row| row.get::<i64, _>("removed"))
        .sum();

        Ok(u64::try_from(removed).unwrap_or_default())
    }
}
