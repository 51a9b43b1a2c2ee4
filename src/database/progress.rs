// ABOUTME: Progress aggregates, weekly chart data, and achievement storage queries
// ABOUTME: Summaries read workouts, weight history, meal logs, and the active diet target
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FitCoach Contributors

use chrono::{Duration, NaiveDate};
use fitcoach_core::errors::{AppError, AppResult};
use fitcoach_core::models::{Achievement, AchievementStatus, DailyProgress, ProgressSummary};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use super::{fetch_profile, parse_column};
use crate::achievements::{self, current_streak, ACHIEVEMENTS};

/// Trailing window for "this week" figures, including today
const WEEK_DAYS: i64 = 7;

fn day_key(day: NaiveDate) -> String {
    day.format("%Y-%m-%d").to_string()
}

/// Progress and achievement database operations
pub struct ProgressManager {
    pool: SqlitePool,
}

impl ProgressManager {
    /// Create a new progress manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Dashboard figures as of `today`
    ///
    /// # Errors
    ///
    /// Returns an error if any query fails
    pub async fn summary(&self, user_id: &str, today: NaiveDate) -> AppResult<ProgressSummary> {
        let week_start = today - Duration::days(WEEK_DAYS - 1);
        let counts = sqlx::query(
            r"
            SELECT
                COUNT(*) AS total,
                COALESCE(SUM(CASE WHEN substr(completed_at, 1, 10) BETWEEN $2 AND $3
                             THEN 1 ELSE 0 END), 0) AS this_week
            FROM workout_logs
            WHERE user_id = $1 AND completed_at IS NOT NULL
            ",
        )
        .bind(user_id)
        .bind(day_key(week_start))
        .bind(day_key(today))
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to count workouts: {e}")))?;

        let workout_days: Vec<NaiveDate> = sqlx::query(
            r"
            SELECT DISTINCT substr(completed_at, 1, 10) AS day
            FROM workout_logs
            WHERE user_id = $1 AND completed_at IS NOT NULL
            ORDER BY day DESC
            LIMIT 400
            ",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to list workout days: {e}")))?
        .iter()
        .filter_map(|row| NaiveDate::parse_from_str(row.get("day"), "%Y-%m-%d").ok())
        .collect();

        let profile = {
            let mut conn = self
                .pool
                .acquire()
                .await
                .map_err(|e| AppError::database(format!("Failed to acquire connection: {e}")))?;
            fetch_profile(&mut conn, user_id).await?
        };

        let start_weight_kg: Option<f64> = sqlx::query(
            r"
            SELECT weight_kg FROM weight_history
            WHERE user_id = $1
            ORDER BY recorded_at ASC, rowid ASC
            LIMIT 1
            ",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to get starting weight: {e}")))?
        .map(|row| row.get("weight_kg"));

        let calories_today = self.calories_on(user_id, today).await?;

        let diet_target: Option<i64> = sqlx::query(
            "SELECT daily_calories FROM diet_plans WHERE user_id = $1 AND is_active = 1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to get calorie target: {e}")))?
        .map(|row| row.get("daily_calories"));

        let achievements_unlocked: i64 =
            sqlx::query("SELECT COUNT(*) AS count FROM achievements WHERE user_id = $1")
                .bind(user_id)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| AppError::database(format!("Failed to count achievements: {e}")))?
                .get("count");

        let current_weight_kg = profile.as_ref().and_then(|p| p.current_weight_kg);
        let start_weight_kg = start_weight_kg.or(current_weight_kg);
        Ok(ProgressSummary {
            total_workouts: counts.get("total"),
            workouts_this_week: counts.get("this_week"),
            current_streak_days: current_streak(&workout_days, today),
            current_weight_kg,
            target_weight_kg: profile.as_ref().and_then(|p| p.target_weight_kg),
            start_weight_kg,
            weight_change_kg: current_weight_kg
                .zip(start_weight_kg)
                .map(|(current, start)| current - start),
            calories_today,
            calorie_target: diet_target
                .or_else(|| profile.as_ref().and_then(|p| p.estimated_daily_calories())),
            achievements_unlocked,
        })
    }

    /// Completed workouts and logged calories for each of the 7 days ending `today`,
    /// oldest first
    ///
    /// # Errors
    ///
    /// Returns an error if any query fails
    pub async fn weekly(&self, user_id: &str, today: NaiveDate) -> AppResult<Vec<DailyProgress>> {
        let week_start = today - Duration::days(WEEK_DAYS - 1);

        let workouts: Vec<(String, i64)> = sqlx::query(
            r"
            SELECT substr(completed_at, 1, 10) AS day, COUNT(*) AS count
            FROM workout_logs
            WHERE user_id = $1 AND completed_at IS NOT NULL
              AND substr(completed_at, 1, 10) BETWEEN $2 AND $3
            GROUP BY day
            ",
        )
        .bind(user_id)
        .bind(day_key(week_start))
        .bind(day_key(today))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to aggregate workouts: {e}")))?
        .iter()
        .map(|row| (row.get("day"), row.get("count")))
        .collect();

        let calories: Vec<(String, i64)> = sqlx::query(
            r"
            SELECT substr(logged_at, 1, 10) AS day, COALESCE(SUM(calories), 0) AS calories
            FROM meal_logs
            WHERE user_id = $1 AND substr(logged_at, 1, 10) BETWEEN $2 AND $3
            GROUP BY day
            ",
        )
        .bind(user_id)
        .bind(day_key(week_start))
        .bind(day_key(today))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to aggregate calories: {e}")))?
        .iter()
        .map(|row| (row.get("day"), row.get("calories")))
        .collect();

        let lookup = |series: &[(String, i64)], day: &str| {
            series
                .iter()
                .find(|(key, _)| key == day)
                .map_or(0, |(_, value)| *value)
        };

        Ok((0..WEEK_DAYS)
            .map(|offset| {
                let date = day_key(week_start + Duration::days(offset));
                DailyProgress {
                    workouts: lookup(&workouts, &date),
                    calories: lookup(&calories, &date),
                    date,
                }
            })
            .collect())
    }

    /// Achievements the user holds, oldest first
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn achievements(&self, user_id: &str) -> AppResult<Vec<Achievement>> {
        let rows = sqlx::query(
            r"
            SELECT id, user_id, achievement_type, title, description, unlocked_at
            FROM achievements
            WHERE user_id = $1
            ORDER BY unlocked_at, rowid
            ",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to list achievements: {e}")))?;

        rows.iter().map(row_to_achievement).collect()
    }

    /// Every achievement with the user's unlock state
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn achievement_catalogue(&self, user_id: &str) -> AppResult<Vec<AchievementStatus>> {
        let held = self.achievements(user_id).await?;
        Ok(ACHIEVEMENTS
            .iter()
            .map(|rule| {
                let unlocked_at = held
                    .iter()
                    .find(|a| a.achievement_type == rule.kind)
                    .map(|a| a.unlocked_at.clone());
                AchievementStatus {
                    achievement_type: rule.kind,
                    title: rule.title.to_owned(),
                    description: rule.description.to_owned(),
                    unlocked: unlocked_at.is_some(),
                    unlocked_at,
                }
            })
            .collect())
    }

    /// Unlock every newly met achievement as of `today`
    ///
    /// # Errors
    ///
    /// Returns an error if evaluation fails; nothing is stored in that case
    pub async fn evaluate_achievements(
        &self,
        user_id: &str,
        today: NaiveDate,
    ) -> AppResult<Vec<Achievement>> {
        achievements::evaluate_all(&self.pool, user_id, today).await
    }

    /// Calories logged on `day`
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn calories_on(&self, user_id: &str, day: NaiveDate) -> AppResult<i64> {
        Ok(sqlx::query(
            r"
            SELECT COALESCE(SUM(calories), 0) AS calories FROM meal_logs
            WHERE user_id = $1 AND substr(logged_at, 1, 10) = $2
            ",
        )
        .bind(user_id)
        .bind(day_key(day))
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to sum calories: {e}")))?
        .get("calories"))
    }
}

fn row_to_achievement(row: &SqliteRow) -> AppResult<Achievement> {
    Ok(Achievement {
        id: row.get("id"),
        user_id: row.get("user_id"),
        achievement_type: parse_column(row.get("achievement_type"), "achievement_type")?,
        title: row.get("title"),
        description: row.get("description"),
        unlocked_at: row.get("unlocked_at"),
    })
}
