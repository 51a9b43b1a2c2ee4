// ABOUTME: Database operations for workout plans and training session logs
// ABOUTME: Transactional plan creation with single-active enforcement and guarded completion
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FitCoach Contributors

use chrono::{DateTime, Utc};
use fitcoach_core::errors::{AppError, AppResult};
use fitcoach_core::models::{
    CompleteWorkout, ExerciseLog, NewWorkoutPlan, WorkoutDay, WorkoutExercise, WorkoutLog,
    WorkoutPlan,
};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection, SqlitePool};
use tracing::info;
use uuid::Uuid;

use super::exercises::find_or_create_on;
use super::{clamp_limit, map_active_plan_error, now_rfc3339, timestamp};

/// Workout plan and session log database operations
pub struct WorkoutManager {
    pool: SqlitePool,
}

impl WorkoutManager {
    /// Create a new workout manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Store a plan with its days and exercises and make it the active plan
    ///
    /// Deactivation of the previous plan and the insert happen in one transaction;
    /// the partial unique index turns a concurrent second activation into a conflict.
    ///
    /// # Errors
    ///
    /// Returns validation errors, `ResourceConflict` on a concurrent activation, or a
    /// database error (nothing is written in either case)
    pub async fn create_plan(
        &self,
        user_id: &str,
        plan: &NewWorkoutPlan,
        ai_generated: bool,
    ) -> AppResult<WorkoutPlan> {
        plan.validate()?;
        let plan_id = Uuid::new_v4().to_string();
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::database(format!("Failed to begin transaction: {e}")))?;

        deactivate_all(&mut tx, user_id).await?;

        sqlx::query(
            r"
            INSERT INTO workout_plans (
                id, user_id, name, description, goal, days_per_week, is_active,
                ai_generated, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, 1, $7, $8)
            ",
        )
        .bind(&plan_id)
        .bind(user_id)
        .bind(plan.name.trim())
        .bind(&plan.description)
        .bind(&plan.goal)
        .bind(plan.days_per_week())
        .bind(ai_generated)
        .bind(now_rfc3339())
        .execute(&mut *tx)
        .await
        .map_err(|e| map_active_plan_error(e, "workout plan"))?;

        for day in &plan.days {
            let day_id = Uuid::new_v4().to_string();
            sqlx::query(
                r"
                INSERT INTO workout_days (id, plan_id, day_number, name, focus)
                VALUES ($1, $2, $3, $4, $5)
                ",
            )
            .bind(&day_id)
            .bind(&plan_id)
            .bind(day.day_number)
            .bind(day.name.trim())
            .bind(&day.focus)
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::database(format!("Failed to save workout day: {e}")))?;

            for (order_index, exercise) in (0_i64..).zip(&day.exercises) {
                let exercise_id =
                    resolve_exercise(&mut tx, exercise.exercise_id.as_deref(), &exercise.name)
                        .await?;
                sqlx::query(
                    r"
                    INSERT INTO workout_exercises (
                        id, day_id, exercise_id, exercise_name, sets, reps, rest_seconds,
                        notes, order_index
                    ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
                    ",
                )
                .bind(Uuid::new_v4().to_string())
                .bind(&day_id)
                .bind(&exercise_id)
                .bind(exercise.name.trim())
                .bind(exercise.sets)
                .bind(&exercise.reps)
                .bind(exercise.rest_seconds)
                .bind(&exercise.notes)
                .bind(order_index)
                .execute(&mut *tx)
                .await
                .map_err(|e| AppError::database(format!("Failed to save workout exercise: {e}")))?;
            }
        }

        tx.commit()
            .await
            .map_err(|e| AppError::database(format!("Failed to commit workout plan: {e}")))?;
        info!(user.id = %user_id, plan.id = %plan_id, ai_generated, "Created workout plan");

        self.get_plan(user_id, &plan_id)
            .await?
            .ok_or_else(|| AppError::internal("Workout plan vanished after commit"))
    }

    /// Plan summaries (without days), newest first
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn list_plans(&self, user_id: &str) -> AppResult<Vec<WorkoutPlan>> {
        let rows = sqlx::query(
            r"
            SELECT id, user_id, name, description, goal, days_per_week, is_active,
                   ai_generated, created_at
            FROM workout_plans
            WHERE user_id = $1
            ORDER BY created_at DESC, rowid DESC
            ",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to list workout plans: {e}")))?;

        Ok(rows.iter().map(row_to_plan).collect())
    }

    /// Full plan owned by `user_id`
    ///
    /// # Errors
    ///
    /// Returns an error if a query fails
    pub async fn get_plan(&self, user_id: &str, plan_id: &str) -> AppResult<Option<WorkoutPlan>> {
        let row = sqlx::query(
            r"
            SELECT id, user_id, name, description, goal, days_per_week, is_active,
                   ai_generated, created_at
            FROM workout_plans
            WHERE id = $1 AND user_id = $2
            ",
        )
        .bind(plan_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to get workout plan: {e}")))?;

        match row {
            Some(row) => {
                let mut plan = row_to_plan(&row);
                plan.days = self.load_days(&plan.id).await?;
                Ok(Some(plan))
            }
            None => Ok(None),
        }
    }

    /// The user's active plan, fully loaded
    ///
    /// # Errors
    ///
    /// Returns an error if a query fails
    pub async fn active_plan(&self, user_id: &str) -> AppResult<Option<WorkoutPlan>> {
        let plan_id: Option<String> = sqlx::query(
            "SELECT id FROM workout_plans WHERE user_id = $1 AND is_active = 1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to get active workout plan: {e}")))?
        .map(|row| row.get("id"));

        match plan_id {
            Some(plan_id) => self.get_plan(user_id, &plan_id).await,
            None => Ok(None),
        }
    }

    /// Make `plan_id` the user's single active plan
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` when the plan is not the user's, or
    /// `ResourceConflict` on a concurrent activation
    pub async fn activate_plan(&self, user_id: &str, plan_id: &str) -> AppResult<WorkoutPlan> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::database(format!("Failed to begin transaction: {e}")))?;

        deactivate_all(&mut tx, user_id).await?;
        let activated =
            sqlx::query("UPDATE workout_plans SET is_active = 1 WHERE id = $1 AND user_id = $2")
                .bind(plan_id)
                .bind(user_id)
                .execute(&mut *tx)
                .await
                .map_err(|e| map_active_plan_error(e, "workout plan"))?;
        if activated.rows_affected() == 0 {
            return Err(AppError::not_found("Workout plan"));
        }

        tx.commit()
            .await
            .map_err(|e| AppError::database(format!("Failed to commit activation: {e}")))?;

        self.get_plan(user_id, plan_id)
            .await?
            .ok_or_else(|| AppError::not_found("Workout plan"))
    }

    /// Delete a plan and its children
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` when the plan is not the user's
    pub async fn delete_plan(&self, user_id: &str, plan_id: &str) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM workout_plans WHERE id = $1 AND user_id = $2")
            .bind(plan_id)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to delete workout plan: {e}")))?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found("Workout plan"));
        }
        Ok(())
    }

    /// Open a session now
    ///
    /// # Errors
    ///
    /// See [`Self::start_workout_at`]
    pub async fn start_workout(
        &self,
        user_id: &str,
        plan_id: Option<&str>,
        day_id: Option<&str>,
    ) -> AppResult<WorkoutLog> {
        self.start_workout_at(user_id, plan_id, day_id, Utc::now())
            .await
    }

    /// Open a session at `at`
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` when the referenced plan or day is not the user's
    pub async fn start_workout_at(
        &self,
        user_id: &str,
        plan_id: Option<&str>,
        day_id: Option<&str>,
        at: DateTime<Utc>,
    ) -> AppResult<WorkoutLog> {
        if let Some(plan_id) = plan_id {
            let owned = sqlx::query("SELECT 1 FROM workout_plans WHERE id = $1 AND user_id = $2")
                .bind(plan_id)
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| AppError::database(format!("Failed to get workout plan: {e}")))?;
            if owned.is_none() {
                return Err(AppError::not_found("Workout plan"));
            }
        }
        if let Some(day_id) = day_id {
            let owned = sqlx::query(
                r"
                SELECT 1 FROM workout_days d
                JOIN workout_plans p ON p.id = d.plan_id
                WHERE d.id = $1 AND p.user_id = $2 AND ($3 IS NULL OR p.id = $3)
                ",
            )
            .bind(day_id)
            .bind(user_id)
            .bind(plan_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to get workout day: {e}")))?;
            if owned.is_none() {
                return Err(AppError::not_found("Workout day"));
            }
        }

        let log = WorkoutLog {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_owned(),
            plan_id: plan_id.map(ToOwned::to_owned),
            day_id: day_id.map(ToOwned::to_owned),
            started_at: timestamp(at),
            completed_at: None,
            duration_minutes: None,
            rating: None,
            notes: None,
            exercises: Vec::new(),
        };

        sqlx::query(
            r"
            INSERT INTO workout_logs (id, user_id, plan_id, day_id, started_at)
            VALUES ($1, $2, $3, $4, $5)
            ",
        )
        .bind(&log.id)
        .bind(&log.user_id)
        .bind(&log.plan_id)
        .bind(&log.day_id)
        .bind(&log.started_at)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to start workout: {e}")))?;

        Ok(log)
    }

    /// Complete a session now
    ///
    /// # Errors
    ///
    /// See [`Self::complete_workout_at`]
    pub async fn complete_workout(
        &self,
        user_id: &str,
        log_id: &str,
        payload: &CompleteWorkout,
    ) -> AppResult<WorkoutLog> {
        self.complete_workout_at(user_id, log_id, payload, Utc::now())
            .await
    }

    /// Stamp `completed_at` and record the performed sets in one transaction
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` if the log is missing or belongs to someone else,
    /// `ResourceConflict` if it was already completed, or validation errors
    pub async fn complete_workout_at(
        &self,
        user_id: &str,
        log_id: &str,
        payload: &CompleteWorkout,
        at: DateTime<Utc>,
    ) -> AppResult<WorkoutLog> {
        payload.validate()?;
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::database(format!("Failed to begin transaction: {e}")))?;

        let updated = sqlx::query(
            r"
            UPDATE workout_logs
            SET completed_at = $1, duration_minutes = $2, rating = $3, notes = $4
            WHERE id = $5 AND user_id = $6 AND completed_at IS NULL
            ",
        )
        .bind(timestamp(at))
        .bind(payload.duration_minutes)
        .bind(payload.rating)
        .bind(&payload.notes)
        .bind(log_id)
        .bind(user_id)
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::database(format!("Failed to complete workout: {e}")))?;

        if updated.rows_affected() == 0 {
            let exists = sqlx::query("SELECT 1 FROM workout_logs WHERE id = $1 AND user_id = $2")
                .bind(log_id)
                .bind(user_id)
                .fetch_optional(&mut *tx)
                .await
                .map_err(|e| AppError::database(format!("Failed to get workout log: {e}")))?;
            return Err(match exists {
                Some(_) => AppError::conflict("Workout log is already completed"),
                None => AppError::not_found("Workout log"),
            });
        }

        for set in &payload.exercises {
            sqlx::query(
                r"
                INSERT INTO exercise_logs (
                    id, workout_log_id, exercise_id, exercise_name, set_number, reps,
                    weight_kg, completed
                ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                ",
            )
            .bind(Uuid::new_v4().to_string())
            .bind(log_id)
            .bind(&set.exercise_id)
            .bind(set.exercise_name.trim())
            .bind(set.set_number)
            .bind(set.reps)
            .bind(set.weight_kg)
            .bind(set.completed)
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::database(format!("Failed to record set: {e}")))?;
        }

        tx.commit()
            .await
            .map_err(|e| AppError::database(format!("Failed to commit workout: {e}")))?;
        info!(user.id = %user_id, log.id = %log_id, sets = payload.exercises.len(), "Completed workout");

        self.get_log(user_id, log_id)
            .await?
            .ok_or_else(|| AppError::not_found("Workout log"))
    }

    /// One session with its sets
    ///
    /// # Errors
    ///
    /// Returns an error if a query fails
    pub async fn get_log(&self, user_id: &str, log_id: &str) -> AppResult<Option<WorkoutLog>> {
        let row = sqlx::query(
            r"
            SELECT id, user_id, plan_id, day_id, started_at, completed_at,
                   duration_minutes, rating, notes
            FROM workout_logs WHERE id = $1 AND user_id = $2
            ",
        )
        .bind(log_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to get workout log: {e}")))?;

        match row {
            Some(row) => {
                let mut log = row_to_log(&row);
                log.exercises = self.load_sets(&log.id).await?;
                Ok(Some(log))
            }
            None => Ok(None),
        }
    }

    /// Session history with sets, newest first
    ///
    /// # Errors
    ///
    /// Returns an error if a query fails
    pub async fn list_logs(&self, user_id: &str, limit: Option<i64>) -> AppResult<Vec<WorkoutLog>> {
        let rows = sqlx::query(
            r"
            SELECT id, user_id, plan_id, day_id, started_at, completed_at,
                   duration_minutes, rating, notes
            FROM workout_logs
            WHERE user_id = $1
            ORDER BY started_at DESC, rowid DESC
            LIMIT $2
            ",
        )
        .bind(user_id)
        .bind(clamp_limit(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to list workout logs: {e}")))?;

        let mut logs = Vec::with_capacity(rows.len());
        for row in &rows {
            let mut log = row_to_log(row);
            log.exercises = self.load_sets(&log.id).await?;
            logs.push(log);
        }
        Ok(logs)
    }

    async fn load_days(&self, plan_id: &str) -> AppResult<Vec<WorkoutDay>> {
        let day_rows = sqlx::query(
            r"
            SELECT id, plan_id, day_number, name, focus
            FROM workout_days WHERE plan_id = $1
            ORDER BY day_number, rowid
            ",
        )
        .bind(plan_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to load workout days: {e}")))?;

        let exercise_rows = sqlx::query(
            r"
            SELECT we.id, we.day_id, we.exercise_id, we.exercise_name, we.sets, we.reps,
                   we.rest_seconds, we.notes, we.order_index, e.muscle_group, e.gif_url
            FROM workout_exercises we
            JOIN workout_days d ON d.id = we.day_id
            LEFT JOIN exercises e ON e.id = we.exercise_id
            WHERE d.plan_id = $1
            ORDER BY we.order_index
            ",
        )
        .bind(plan_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to load workout exercises: {e}")))?;

        let exercises: Vec<WorkoutExercise> = exercise_rows.iter().map(row_to_exercise).collect();
        Ok(day_rows
            .iter()
            .map(|row| {
                let id: String = row.get("id");
                WorkoutDay {
                    exercises: exercises
                        .iter()
                        .filter(|exercise| exercise.day_id == id)
                        .cloned()
                        .collect(),
                    plan_id: row.get("plan_id"),
                    day_number: row.get("day_number"),
                    name: row.get("name"),
                    focus: row.get("focus"),
                    id,
                }
            })
            .collect())
    }

    async fn load_sets(&self, log_id: &str) -> AppResult<Vec<ExerciseLog>> {
        let rows = sqlx::query(
            r"
            SELECT id, workout_log_id, exercise_id, exercise_name, set_number, reps,
                   weight_kg, completed
            FROM exercise_logs WHERE workout_log_id = $1
            ORDER BY rowid
            ",
        )
        .bind(log_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to load exercise logs: {e}")))?;

        Ok(rows
            .iter()
            .map(|row| ExerciseLog {
                id: row.get("id"),
                workout_log_id: row.get("workout_log_id"),
                exercise_id: row.get("exercise_id"),
                exercise_name: row.get("exercise_name"),
                set_number: row.get("set_number"),
                reps: row.get("reps"),
                weight_kg: row.get("weight_kg"),
                completed: row.get("completed"),
            })
            .collect())
    }
}

async fn deactivate_all(conn: &mut SqliteConnection, user_id: &str) -> AppResult<()> {
    sqlx::query("UPDATE workout_plans SET is_active = 0 WHERE user_id = $1 AND is_active = 1")
        .bind(user_id)
        .execute(&mut *conn)
        .await
        .map_err(|e| AppError::database(format!("Failed to deactivate workout plans: {e}")))?;
    Ok(())
}

/// Keep a caller-supplied catalog id when it exists, otherwise resolve by name
async fn resolve_exercise(
    conn: &mut SqliteConnection,
    exercise_id: Option<&str>,
    name: &str,
) -> AppResult<String> {
    if let Some(exercise_id) = exercise_id {
        let known = sqlx::query("SELECT 1 FROM exercises WHERE id = $1")
            .bind(exercise_id)
            .fetch_optional(&mut *conn)
            .await
            .map_err(|e| AppError::database(format!("Failed to look up exercise: {e}")))?;
        if known.is_some() {
            return Ok(exercise_id.to_owned());
        }
    }
    Ok(find_or_create_on(conn, name).await?.id)
}

fn row_to_plan(row: &SqliteRow) -> WorkoutPlan {
    WorkoutPlan {
        id: row.get("id"),
        user_id: row.get("user_id"),
        name: row.get("name"),
        description: row.get("description"),
        goal: row.get("goal"),
        days_per_week: row.get("days_per_week"),
        is_active: row.get("is_active"),
        ai_generated: row.get("ai_generated"),
        created_at: row.get("created_at"),
        days: Vec::new(),
    }
}

fn row_to_exercise(row: &SqliteRow) -> WorkoutExercise {
    WorkoutExercise {
        id: row.get("id"),
        day_id: row.get("day_id"),
        exercise_id: row.get("exercise_id"),
        exercise_name: row.get("exercise_name"),
        sets: row.get("sets"),
        reps: row.get("reps"),
        rest_seconds: row.get("rest_seconds"),
        notes: row.get("notes"),
        order_index: row.get("order_index"),
        muscle_group: row.get("muscle_group"),
        gif_url: row.get("gif_url"),
    }
}

fn row_to_log(row: &SqliteRow) -> WorkoutLog {
    WorkoutLog {
        id: row.get("id"),
        user_id: row.get("user_id"),
        plan_id: row.get("plan_id"),
        day_id: row.get("day_id"),
        started_at: row.get("started_at"),
        completed_at: row.get("completed_at"),
        duration_minutes: row.get("duration_minutes"),
        rating: row.get("rating"),
        notes: row.get("notes"),
        exercises: Vec::new(),
    }
}
