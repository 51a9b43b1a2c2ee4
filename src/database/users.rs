// ABOUTME: Database operations for user accounts
// ABOUTME: Creates users with unique emails and looks them up by id or email
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FitCoach Contributors

use fitcoach_core::errors::{AppError, AppResult};
use fitcoach_core::models::User;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use super::now_rfc3339;

/// User account database operations
pub struct UserManager {
    pool: SqlitePool,
}

impl UserManager {
    /// Create a new user manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a new account
    ///
    /// # Errors
    ///
    /// Returns `ResourceAlreadyExists` when the email is taken, or a database error
    pub async fn create(
        &self,
        email: &str,
        password_hash: &str,
        name: Option<&str>,
    ) -> AppResult<User> {
        let user = User {
            id: Uuid::new_v4().to_string(),
            email: User::normalize_email(email),
            name: name.map(str::trim).filter(|n| !n.is_empty()).map(ToOwned::to_owned),
            password_hash: password_hash.to_owned(),
            created_at: now_rfc3339(),
            updated_at: now_rfc3339(),
        };

        sqlx::query(
            r"
            INSERT INTO users (id, email, password_hash, name, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            ",
        )
        .bind(&user.id)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.name)
        .bind(&user.created_at)
        .bind(&user.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                AppError::already_exists("An account with this email already exists")
            }
            _ => AppError::database(format!("Failed to create user: {e}")),
        })?;

        Ok(user)
    }

    /// Look up an account by email (case-insensitive)
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn get_by_email(&self, email: &str) -> AppResult<Option<User>> {
        sqlx::query(
            r"
            SELECT id, email, password_hash, name, created_at, updated_at
            FROM users WHERE email = $1
            ",
        )
        .bind(User::normalize_email(email))
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to get user by email: {e}")))
        .map(|row| row.as_ref().map(row_to_user))
    }

    /// Look up an account by id
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn get_by_id(&self, user_id: &str) -> AppResult<Option<User>> {
        sqlx::query(
            r"
            SELECT id, email, password_hash, name, created_at, updated_at
            FROM users WHERE id = $1
            ",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to get user: {e}")))
        .map(|row| row.as_ref().map(row_to_user))
    }

    /// Look up an account by id, failing when absent
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` when the user does not exist
    pub async fn get_required(&self, user_id: &str) -> AppResult<User> {
        self.get_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::not_found("User"))
    }
}

fn row_to_user(row: &SqliteRow) -> User {
    User {
        id: row.get("id"),
        email: row.get("email"),
        password_hash: row.get("password_hash"),
        name: row.get("name"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}
