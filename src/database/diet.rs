// ABOUTME: Database operations for diet plans, planned meals, and meal logs
// ABOUTME: Transactional plan creation with single-active enforcement and daily meal queries
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FitCoach Contributors

use chrono::{DateTime, NaiveDate, Utc};
use fitcoach_core::errors::{AppError, AppResult};
use fitcoach_core::models::{DietPlan, Meal, MealLog, NewDietPlan, NewMealLog};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection, SqlitePool};
use tracing::info;
use uuid::Uuid;

use super::{json_list, map_active_plan_error, now_rfc3339, parse_column, timestamp};

const PLAN_COLUMNS: &str = "id, user_id, name, daily_calories, protein_g, carbs_g, fat_g, notes, \
                            is_active, ai_generated, created_at";

const MEAL_COLUMNS: &str = "id, diet_plan_id, day_of_week, meal_type, name, description, \
                            calories, protein_g, carbs_g, fat_g, ingredients, order_index";

/// Diet plan and meal log database operations
pub struct DietManager {
    pool: SqlitePool,
}

impl DietManager {
    /// Create a new diet manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Store a plan with its meals and make it the active plan
    ///
    /// # Errors
    ///
    /// Returns validation errors, `ResourceConflict` on a concurrent activation, or a
    /// database error (nothing is written in either case)
    pub async fn create_plan(
        &self,
        user_id: &str,
        plan: &NewDietPlan,
        ai_generated: bool,
    ) -> AppResult<DietPlan> {
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
            INSERT INTO diet_plans (
                id, user_id, name, daily_calories, protein_g, carbs_g, fat_g, notes,
                is_active, ai_generated, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, 1, $9, $10)
            ",
        )
        .bind(&plan_id)
        .bind(user_id)
        .bind(plan.name.trim())
        .bind(plan.daily_calories)
        .bind(plan.protein_g)
        .bind(plan.carbs_g)
        .bind(plan.fat_g)
        .bind(&plan.notes)
        .bind(ai_generated)
        .bind(now_rfc3339())
        .execute(&mut *tx)
        .await
        .map_err(|e| map_active_plan_error(e, "diet plan"))?;

        for (order_index, meal) in (0_i64..).zip(&plan.meals) {
            sqlx::query(
                r"
                INSERT INTO meals (
                    id, diet_plan_id, day_of_week, meal_type, name, description, calories,
                    protein_g, carbs_g, fat_g, ingredients, order_index
                ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
                ",
            )
            .bind(Uuid::new_v4().to_string())
            .bind(&plan_id)
            .bind(meal.day_of_week)
            .bind(meal.meal_type.as_str())
            .bind(meal.name.trim())
            .bind(&meal.description)
            .bind(meal.calories)
            .bind(meal.protein_g)
            .bind(meal.carbs_g)
            .bind(meal.fat_g)
            .bind(serde_json::to_string(&meal.ingredients)?)
            .bind(order_index)
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::database(format!("Failed to save meal: {e}")))?;
        }

        tx.commit()
            .await
            .map_err(|e| AppError::database(format!("Failed to commit diet plan: {e}")))?;
        info!(user.id = %user_id, plan.id = %plan_id, ai_generated, "Created diet plan");

        self.get_plan(user_id, &plan_id)
            .await?
            .ok_or_else(|| AppError::internal("Diet plan vanished after commit"))
    }

    /// Plan summaries (without meals), newest first
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn list_plans(&self, user_id: &str) -> AppResult<Vec<DietPlan>> {
        let rows = sqlx::query(&format!(
            r"
            SELECT {PLAN_COLUMNS} FROM diet_plans
            WHERE user_id = $1
            ORDER BY created_at DESC, rowid DESC
            "
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to list diet plans: {e}")))?;

        Ok(rows.iter().map(row_to_plan).collect())
    }

    /// Full plan owned by `user_id`
    ///
    /// # Errors
    ///
    /// Returns an error if a query fails or a stored meal type is unreadable
    pub async fn get_plan(&self, user_id: &str, plan_id: &str) -> AppResult<Option<DietPlan>> {
        let row = sqlx::query(&format!(
            "SELECT {PLAN_COLUMNS} FROM diet_plans WHERE id = $1 AND user_id = $2"
        ))
        .bind(plan_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to get diet plan: {e}")))?;

        let Some(row) = row else {
            return Ok(None);
        };
        let mut plan = row_to_plan(&row);

        let meal_rows = sqlx::query(&format!(
            r"
            SELECT {MEAL_COLUMNS} FROM meals
            WHERE diet_plan_id = $1
            ORDER BY order_index
            "
        ))
        .bind(plan_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to load meals: {e}")))?;
        plan.meals = meal_rows
            .iter()
            .map(row_to_meal)
            .collect::<AppResult<Vec<_>>>()?;

        Ok(Some(plan))
    }

    /// The user's active plan, fully loaded
    ///
    /// # Errors
    ///
    /// Returns an error if a query fails
    pub async fn active_plan(&self, user_id: &str) -> AppResult<Option<DietPlan>> {
        let plan_id: Option<String> =
            sqlx::query("SELECT id FROM diet_plans WHERE user_id = $1 AND is_active = 1")
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| AppError::database(format!("Failed to get active diet plan: {e}")))?
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
    pub async fn activate_plan(&self, user_id: &str, plan_id: &str) -> AppResult<DietPlan> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::database(format!("Failed to begin transaction: {e}")))?;

        deactivate_all(&mut tx, user_id).await?;
        let activated =
            sqlx::query("UPDATE diet_plans SET is_active = 1 WHERE id = $1 AND user_id = $2")
                .bind(plan_id)
                .bind(user_id)
                .execute(&mut *tx)
                .await
                .map_err(|e| map_active_plan_error(e, "diet plan"))?;
        if activated.rows_affected() == 0 {
            return Err(AppError::not_found("Diet plan"));
        }

        tx.commit()
            .await
            .map_err(|e| AppError::database(format!("Failed to commit activation: {e}")))?;

        self.get_plan(user_id, plan_id)
            .await?
            .ok_or_else(|| AppError::not_found("Diet plan"))
    }

    /// Delete a plan and its meals
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` when the plan is not the user's
    pub async fn delete_plan(&self, user_id: &str, plan_id: &str) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM diet_plans WHERE id = $1 AND user_id = $2")
            .bind(plan_id)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to delete diet plan: {e}")))?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found("Diet plan"));
        }
        Ok(())
    }

    /// A planned meal from one of the user's plans
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn get_meal(&self, user_id: &str, meal_id: &str) -> AppResult<Option<Meal>> {
        let row = sqlx::query(
            r"
            SELECT m.id, m.diet_plan_id, m.day_of_week, m.meal_type, m.name, m.description,
                   m.calories, m.protein_g, m.carbs_g, m.fat_g, m.ingredients, m.order_index
            FROM meals m
            JOIN diet_plans p ON p.id = m.diet_plan_id
            WHERE m.id = $1 AND p.user_id = $2
            ",
        )
        .bind(meal_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to get meal: {e}")))?;

        row.as_ref().map(row_to_meal).transpose()
    }

    /// Record a meal now
    ///
    /// # Errors
    ///
    /// See [`Self::log_meal_at`]
    pub async fn log_meal(&self, user_id: &str, payload: NewMealLog) -> AppResult<MealLog> {
        self.log_meal_at(user_id, payload, Utc::now()).await
    }

    /// Record a meal at `at`; fields omitted alongside a `meal_id` are copied from
    /// the planned meal
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` for a `meal_id` outside the user's plans, or
    /// validation errors for incomplete input
    pub async fn log_meal_at(
        &self,
        user_id: &str,
        payload: NewMealLog,
        at: DateTime<Utc>,
    ) -> AppResult<MealLog> {
        let payload = match payload.meal_id.clone() {
            Some(meal_id) => {
                let meal = self
                    .get_meal(user_id, &meal_id)
                    .await?
                    .ok_or_else(|| AppError::not_found("Meal"))?;
                payload.with_defaults_from(&meal)
            }
            None => payload,
        };
        payload.validate()?;

        let (Some(meal_type), Some(name), Some(calories)) =
            (payload.meal_type, payload.name, payload.calories)
        else {
            return Err(AppError::invalid_input("meal_type, name and calories are required"));
        };
        let log = MealLog {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_owned(),
            meal_id: payload.meal_id,
            meal_type,
            name: name.trim().to_owned(),
            calories,
            protein_g: payload.protein_g.unwrap_or_default(),
            carbs_g: payload.carbs_g.unwrap_or_default(),
            fat_g: payload.fat_g.unwrap_or_default(),
            logged_at: timestamp(at),
        };

        sqlx::query(
            r"
            INSERT INTO meal_logs (
                id, user_id, meal_id, meal_type, name, calories, protein_g, carbs_g, fat_g,
                logged_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            ",
        )
        .bind(&log.id)
        .bind(&log.user_id)
        .bind(&log.meal_id)
        .bind(log.meal_type.as_str())
        .bind(&log.name)
        .bind(log.calories)
        .bind(log.protein_g)
        .bind(log.carbs_g)
        .bind(log.fat_g)
        .bind(&log.logged_at)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to log meal: {e}")))?;

        Ok(log)
    }

    /// Meals logged on the UTC calendar day `date`, in logging order
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn meal_logs_for_date(
        &self,
        user_id: &str,
        date: NaiveDate,
    ) -> AppResult<Vec<MealLog>> {
        let rows = sqlx::query(
            r"
            SELECT id, user_id, meal_id, meal_type, name, calories, protein_g, carbs_g, fat_g,
                   logged_at
            FROM meal_logs
            WHERE user_id = $1 AND substr(logged_at, 1, 10) = $2
            ORDER BY logged_at, rowid
            ",
        )
        .bind(user_id)
        .bind(date.format("%Y-%m-%d").to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to list meal logs: {e}")))?;

        rows.iter().map(row_to_meal_log).collect()
    }

    /// Remove one of the user's meal logs
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` when the log is not the user's
    pub async fn delete_meal_log(&self, user_id: &str, log_id: &str) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM meal_logs WHERE id = $1 AND user_id = $2")
            .bind(log_id)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to delete meal log: {e}")))?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found("Meal log"));
        }
        Ok(())
    }
}

async fn deactivate_all(conn: &mut SqliteConnection, user_id: &str) -> AppResult<()> {
    sqlx::query("UPDATE diet_plans SET is_active = 0 WHERE user_id = $1 AND is_active = 1")
        .bind(user_id)
        .execute(&mut *conn)
        .await
        .map_err(|e| AppError::database(format!("Failed to deactivate diet plans: {e}")))?;
    Ok(())
}

fn row_to_plan(row: &SqliteRow) -> DietPlan {
    DietPlan {
        id: row.get("id"),
        user_id: row.get("user_id"),
        name: row.get("name"),
        daily_calories: row.get("daily_calories"),
        protein_g: row.get("protein_g"),
        carbs_g: row.get("carbs_g"),
        fat_g: row.get("fat_g"),
        notes: row.get("notes"),
        is_active: row.get("is_active"),
        ai_generated: row.get("ai_generated"),
        created_at: row.get("created_at"),
        meals: Vec::new(),
    }
}

fn row_to_meal(row: &SqliteRow) -> AppResult<Meal> {
    Ok(Meal {
        id: row.get("id"),
        diet_plan_id: row.get("diet_plan_id"),
        day_of_week: row.get("day_of_week"),
        meal_type: parse_column(row.get("meal_type"), "meal_type")?,
        name: row.get("name"),
        description: row.get("description"),
        calories: row.get("calories"),
        protein_g: row.get("protein_g"),
        carbs_g: row.get("carbs_g"),
        fat_g: row.get("fat_g"),
        ingredients: json_list(row.get("ingredients")),
        order_index: row.get("order_index"),
    })
}

fn row_to_meal_log(row: &SqliteRow) -> AppResult<MealLog> {
    Ok(MealLog {
        id: row.get("id"),
        user_id: row.get("user_id"),
        meal_id: row.get("meal_id"),
        meal_type: parse_column(row.get("meal_type"), "meal_type")?,
        name: row.get("name"),
        calories: row.get("calories"),
        protein_g: row.get("protein_g"),
        carbs_g: row.get("carbs_g"),
        fat_g: row.get("fat_g"),
        logged_at: row.get("logged_at"),
    })
}
