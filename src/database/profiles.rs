// ABOUTME: Database operations for user profiles and weight history
// ABOUTME: Profile upserts, onboarding, and transactional weight logging
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FitCoach Contributors

use chrono::{DateTime, Utc};
use fitcoach_core::errors::{AppError, AppResult};
use fitcoach_core::models::{ProfileUpdate, UserProfile, WeightEntry};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection, SqlitePool};
use uuid::Uuid;

use super::{clamp_limit, json_list, now_rfc3339, parse_column, timestamp};

/// Profile and weight history database operations
pub struct ProfileManager {
    pool: SqlitePool,
}

impl ProfileManager {
    /// Create a new profile manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Fetch the profile for `user_id`, if one was ever saved
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or a stored enum is unreadable
    pub async fn get(&self, user_id: &str) -> AppResult<Option<UserProfile>> {
        let mut conn = self
            .pool
            .acquire()
            .await
            .map_err(|e| AppError::database(format!("Failed to acquire connection: {e}")))?;
        fetch_profile(&mut conn, user_id).await
    }

    /// Merge `update` into the stored profile, creating it when missing
    ///
    /// # Errors
    ///
    /// Returns validation errors from the update or a database error
    pub async fn upsert(&self, user_id: &str, update: &ProfileUpdate) -> AppResult<UserProfile> {
        update.validate()?;
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::database(format!("Failed to begin transaction: {e}")))?;

        claim_profile_row(&mut tx, user_id).await?;
        let mut profile = fetch_profile(&mut tx, user_id)
            .await?
            .unwrap_or_else(|| empty_profile(user_id));
        profile.apply(update);
        profile.updated_at = now_rfc3339();
        write_profile(&mut tx, &profile).await?;

        tx.commit()
            .await
            .map_err(|e| AppError::database(format!("Failed to commit profile: {e}")))?;
        Ok(profile)
    }

    /// Save the full onboarding profile and record the starting weight
    ///
    /// # Errors
    ///
    /// Returns `MissingRequiredField` / `ValueOutOfRange` for incomplete input, or a
    /// database error (in which case nothing is written)
    pub async fn complete_onboarding(
        &self,
        user_id: &str,
        update: &ProfileUpdate,
    ) -> AppResult<UserProfile> {
        update.validate_onboarding()?;
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::database(format!("Failed to begin transaction: {e}")))?;

        claim_profile_row(&mut tx, user_id).await?;
        let mut profile = fetch_profile(&mut tx, user_id)
            .await?
            .unwrap_or_else(|| empty_profile(user_id));
        profile.apply(update);
        profile.onboarding_completed = true;
        profile.updated_at = now_rfc3339();
        write_profile(&mut tx, &profile).await?;

        if let Some(weight) = update.current_weight_kg {
            insert_weight(&mut tx, user_id, weight, Some("Starting weight"), Utc::now()).await?;
        }

        tx.commit()
            .await
            .map_err(|e| AppError::database(format!("Failed to commit onboarding: {e}")))?;
        Ok(profile)
    }

    /// Append a weigh-in and make it the profile's current weight
    ///
    /// # Errors
    ///
    /// Returns `ValueOutOfRange` for an implausible weight or a database error (in
    /// which case neither table changes)
    pub async fn add_weight(
        &self,
        user_id: &str,
        weight_kg: f64,
        notes: Option<&str>,
    ) -> AppResult<WeightEntry> {
        fitcoach_core::models::validate_weight("weight_kg", weight_kg)?;
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::database(format!("Failed to begin transaction: {e}")))?;

        let entry = insert_weight(&mut tx, user_id, weight_kg, notes, Utc::now()).await?;

        let now = now_rfc3339();
        sqlx::query(
            r"
            INSERT INTO user_profiles (user_id, current_weight_kg, updated_at)
            VALUES ($1, $2, $3)
            ON CONFLICT(user_id) DO UPDATE SET
                current_weight_kg = excluded.current_weight_kg,
                updated_at = excluded.updated_at
            ",
        )
        .bind(user_id)
        .bind(weight_kg)
        .bind(&now)
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::database(format!("Failed to update current weight: {e}")))?;

        tx.commit()
            .await
            .map_err(|e| AppError::database(format!("Failed to commit weight entry: {e}")))?;
        Ok(entry)
    }

    /// Weight history, newest first
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn weight_history(
        &self,
        user_id: &str,
        limit: Option<i64>,
    ) -> AppResult<Vec<WeightEntry>> {
        let rows = sqlx::query(
            r"
            SELECT id, user_id, weight_kg, notes, recorded_at
            FROM weight_history
            WHERE user_id = $1
            ORDER BY recorded_at DESC, rowid DESC
            LIMIT $2
            ",
        )
        .bind(user_id)
        .bind(clamp_limit(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to list weight history: {e}")))?;

        Ok(rows.iter().map(row_to_weight).collect())
    }
}

fn empty_profile(user_id: &str) -> UserProfile {
    UserProfile {
        user_id: user_id.to_owned(),
        ..UserProfile::default()
    }
}

/// Insert a blank profile row if none exists
///
/// Runs first in every read-modify-write transaction so the write lock is held
/// before the profile is read.
async fn claim_profile_row(conn: &mut SqliteConnection, user_id: &str) -> AppResult<()> {
    sqlx::query(
        r"
        INSERT INTO user_profiles (user_id, updated_at)
        VALUES ($1, $2)
        ON CONFLICT(user_id) DO NOTHING
        ",
    )
    .bind(user_id)
    .bind(now_rfc3339())
    .execute(&mut *conn)
    .await
    .map_err(|e| AppError::database(format!("Failed to create profile: {e}")))?;
    Ok(())
}

/// Load a profile on an existing connection or transaction
pub(crate) async fn fetch_profile(
    conn: &mut SqliteConnection,
    user_id: &str,
) -> AppResult<Option<UserProfile>> {
    let row = sqlx::query(
        r"
        SELECT user_id, age, gender, height_cm, current_weight_kg, target_weight_kg,
               fitness_level, goal, activity_level, workout_days_per_week,
               available_equipment, dietary_preferences, allergies, injuries,
               onboarding_completed, updated_at
        FROM user_profiles WHERE user_id = $1
        ",
    )
    .bind(user_id)
    .fetch_optional(&mut *conn)
    .await
    .map_err(|e| AppError::database(format!("Failed to get profile: {e}")))?;

    row.as_ref().map(row_to_profile).transpose()
}

async fn write_profile(conn: &mut SqliteConnection, profile: &UserProfile) -> AppResult<()> {
    sqlx::query(
        r"
        INSERT INTO user_profiles (
            user_id, age, gender, height_cm, current_weight_kg, target_weight_kg,
            fitness_level, goal, activity_level, workout_days_per_week,
            available_equipment, dietary_preferences, allergies, injuries,
            onboarding_completed, updated_at
        ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
        ON CONFLICT(user_id) DO UPDATE SET
            age = excluded.age,
            gender = excluded.gender,
            height_cm = excluded.height_cm,
            current_weight_kg = excluded.current_weight_kg,
            target_weight_kg = excluded.target_weight_kg,
            fitness_level = excluded.fitness_level,
            goal = excluded.goal,
            activity_level = excluded.activity_level,
            workout_days_per_week = excluded.workout_days_per_week,
            available_equipment = excluded.available_equipment,
            dietary_preferences = excluded.dietary_preferences,
            allergies = excluded.allergies,
            injuries = excluded.injuries,
            onboarding_completed = excluded.onboarding_completed,
            updated_at = excluded.updated_at
        ",
    )
    .bind(&profile.user_id)
    .bind(profile.age)
    .bind(profile.gender.map(|g| g.as_str()))
    .bind(profile.height_cm)
    .bind(profile.current_weight_kg)
    .bind(profile.target_weight_kg)
    .bind(profile.fitness_level.map(|l| l.as_str()))
    .bind(profile.goal.map(|g| g.as_str()))
    .bind(profile.activity_level.map(|a| a.as_str()))
    .bind(profile.workout_days_per_week)
    .bind(serde_json::to_string(&profile.available_equipment)?)
    .bind(serde_json::to_string(&profile.dietary_preferences)?)
    .bind(serde_json::to_string(&profile.allergies)?)
    .bind(&profile.injuries)
    .bind(profile.onboarding_completed)
    .bind(&profile.updated_at)
    .execute(&mut *conn)
    .await
    .map_err(|e| AppError::database(format!("Failed to save profile: {e}")))?;

    Ok(())
}

async fn insert_weight(
    conn: &mut SqliteConnection,
    user_id: &str,
    weight_kg: f64,
    notes: Option<&str>,
    at: DateTime<Utc>,
) -> AppResult<WeightEntry> {
    let entry = WeightEntry {
        id: Uuid::new_v4().to_string(),
        user_id: user_id.to_owned(),
        weight_kg,
        notes: notes.map(ToOwned::to_owned),
        recorded_at: timestamp(at),
    };

    sqlx::query(
        r"
        INSERT INTO weight_history (id, user_id, weight_kg, notes, recorded_at)
        VALUES ($1, $2, $3, $4, $5)
        ",
    )
    .bind(&entry.id)
    .bind(&entry.user_id)
    .bind(entry.weight_kg)
    .bind(&entry.notes)
    .bind(&entry.recorded_at)
    .execute(&mut *conn)
    .await
    .map_err(|e| AppError::database(format!("Failed to record weight: {e}")))?;

    Ok(entry)
}

fn row_to_profile(row: &SqliteRow) -> AppResult<UserProfile> {
    let text_enum = |column: &str| -> Option<String> { row.get(column) };

    Ok(UserProfile {
        user_id: row.get("user_id"),
        age: row.get("age"),
        gender: text_enum("gender")
            .map(|v| parse_column(&v, "gender"))
            .transpose()?,
        height_cm: row.get("height_cm"),
        current_weight_kg: row.get("current_weight_kg"),
        target_weight_kg: row.get("target_weight_kg"),
        fitness_level: text_enum("fitness_level")
            .map(|v| parse_column(&v, "fitness_level"))
            .transpose()?,
        goal: text_enum("goal")
            .map(|v| parse_column(&v, "goal"))
            .transpose()?,
        activity_level: text_enum("activity_level")
            .map(|v| parse_column(&v, "activity_level"))
            .transpose()?,
        workout_days_per_week: row.get("workout_days_per_week"),
        available_equipment: json_list(row.get("available_equipment")),
        dietary_preferences: json_list(row.get("dietary_preferences")),
        allergies: json_list(row.get("allergies")),
        injuries: row.get("injuries"),
        onboarding_completed: row.get("onboarding_completed"),
        updated_at: row.get("updated_at"),
    })
}

fn row_to_weight(row: &SqliteRow) -> WeightEntry {
    WeightEntry {
        id: row.get("id"),
        user_id: row.get("user_id"),
        weight_kg: row.get("weight_kg"),
        notes: row.get("notes"),
        recorded_at: row.get("recorded_at"),
    }
}
