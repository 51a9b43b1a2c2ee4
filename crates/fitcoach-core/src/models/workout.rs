// ABOUTME: Workout plan hierarchy (plan, day, exercise) and session log models
// ABOUTME: Request payloads for plan creation and workout completion with validation
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FitCoach Contributors

use serde::{Deserialize, Serialize};

use crate::constants::validation::{MAX_RATING, MAX_SETS};
use crate::errors::{AppError, AppResult};

/// Workout plan; `days` is empty in list responses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkoutPlan {
    /// UUID v4 identifier
    pub id: String,
    /// Owning user
    pub user_id: String,
    /// Plan name
    pub name: String,
    /// Optional description
    pub description: Option<String>,
    /// Goal the plan targets
    pub goal: Option<String>,
    /// Number of training days
    pub days_per_week: i64,
    /// Whether this is the user's active plan
    pub is_active: bool,
    /// Created by the AI coach
    pub ai_generated: bool,
    /// RFC 3339 creation time
    pub created_at: String,
    /// Training days ordered by `day_number`
    #[serde(default)]
    pub days: Vec<WorkoutDay>,
}

/// One training day in a plan
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkoutDay {
    /// UUID v4 identifier
    pub id: String,
    /// Parent plan
    pub plan_id: String,
    /// 1-based position in the week
    pub day_number: i64,
    /// Day label ("Push", "Legs", ...)
    pub name: String,
    /// Focus description
    pub focus: Option<String>,
    /// Exercises ordered by `order_index`
    #[serde(default)]
    pub exercises: Vec<WorkoutExercise>,
}

/// Prescribed exercise within a day
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkoutExercise {
    /// UUID v4 identifier
    pub id: String,
    /// Parent day
    pub day_id: String,
    /// Catalog exercise, when matched
    pub exercise_id: Option<String>,
    /// Display name
    pub exercise_name: String,
    /// Number of sets
    pub sets: i64,
    /// Rep prescription ("8-12", "30s", ...)
    pub reps: String,
    /// Rest between sets
    pub rest_seconds: Option<i64>,
    /// Coaching notes
    pub notes: Option<String>,
    /// Position within the day
    pub order_index: i64,
    /// Muscle group from the catalog
    pub muscle_group: Option<String>,
    /// Demonstration GIF from the catalog
    pub gif_url: Option<String>,
}

/// Payload for creating a plan with all of its children
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewWorkoutPlan {
    /// Plan name
    pub name: String,
    /// Optional description
    #[serde(default)]
    pub description: Option<String>,
    /// Goal the plan targets
    #[serde(default)]
    pub goal: Option<String>,
    /// Training days
    pub days: Vec<NewWorkoutDay>,
}

/// Day within [`NewWorkoutPlan`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewWorkoutDay {
    /// 1-based position in the week
    pub day_number: i64,
    /// Day label
    pub name: String,
    /// Focus description
    #[serde(default)]
    pub focus: Option<String>,
    /// Exercises in order
    pub exercises: Vec<NewWorkoutExercise>,
}

/// Exercise within [`NewWorkoutDay`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewWorkoutExercise {
    /// Catalog exercise; resolved by name when absent
    #[serde(default)]
    pub exercise_id: Option<String>,
    /// Display name
    pub name: String,
    /// Number of sets
    pub sets: i64,
    /// Rep prescription
    pub reps: String,
    /// Rest between sets
    #[serde(default)]
    pub rest_seconds: Option<i64>,
    /// Coaching notes
    #[serde(default)]
    pub notes: Option<String>,
}

impl NewWorkoutPlan {
    /// Structural checks shared by manual and AI-generated plans
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` / `ValueOutOfRange` describing the first problem found
    pub fn validate(&self) -> AppResult<()> {
        if self.name.trim().is_empty() {
            return Err(AppError::missing_field("name"));
        }
        if self.days.is_empty() {
            return Err(AppError::invalid_input("plan must contain at least one day"));
        }
        for day in &self.days {
            if !(1..=7).contains(&day.day_number) {
                return Err(AppError::out_of_range(format!(
                    "day_number must be between 1 and 7 (got {})",
                    day.day_number
                )));
            }
            if day.name.trim().is_empty() {
                return Err(AppError::missing_field("days[].name"));
            }
            if day.exercises.is_empty() {
                return Err(AppError::invalid_input(format!(
                    "day {} must contain at least one exercise",
                    day.day_number
                )));
            }
            for exercise in &day.exercises {
                if exercise.name.trim().is_empty() {
                    return Err(AppError::missing_field("exercises[].name"));
                }
                if !(1..=MAX_SETS).contains(&exercise.sets) {
                    return Err(AppError::out_of_range(format!(
                        "sets for '{}' must be between 1 and {MAX_SETS}",
                        exercise.name
                    )));
                }
                if exercise.rest_seconds.is_some_and(|rest| rest < 0) {
                    return Err(AppError::out_of_range("rest_seconds cannot be negative"));
                }
            }
        }
        Ok(())
    }

    /// Distinct training days in the plan
    #[must_use]
    pub fn days_per_week(&self) -> i64 {
        let mut numbers: Vec<i64> = self.days.iter().map(|day| day.day_number).collect();
        numbers.sort_unstable();
        numbers.dedup();
        i64::try_from(numbers.len()).unwrap_or(i64::MAX)
    }
}

/// Training session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkoutLog {
    /// UUID v4 identifier
    pub id: String,
    /// Owning user
    pub user_id: String,
    /// Plan the session followed
    pub plan_id: Option<String>,
    /// Day the session followed
    pub day_id: Option<String>,
    /// RFC 3339 start time
    pub started_at: String,
    /// RFC 3339 completion time, `None` while in progress
    pub completed_at: Option<String>,
    /// Session length
    pub duration_minutes: Option<i64>,
    /// Perceived quality 1-5
    pub rating: Option<i64>,
    /// Free-text notes
    pub notes: Option<String>,
    /// Performed sets
    #[serde(default)]
    pub exercises: Vec<ExerciseLog>,
}

/// One performed set
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExerciseLog {
    /// UUID v4 identifier
    pub id: String,
    /// Parent session
    pub workout_log_id: String,
    /// Catalog exercise
    pub exercise_id: Option<String>,
    /// Display name
    pub exercise_name: String,
    /// 1-based set number
    pub set_number: i64,
    /// Repetitions performed
    pub reps: Option<i64>,
    /// Load used
    pub weight_kg: Option<f64>,
    /// Whether the set was finished
    pub completed: bool,
}

/// Payload for completing a session
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompleteWorkout {
    /// Session length
    #[serde(default)]
    pub duration_minutes: Option<i64>,
    /// Perceived quality 1-5
    #[serde(default)]
    pub rating: Option<i64>,
    /// Free-text notes
    #[serde(default)]
    pub notes: Option<String>,
    /// Performed sets
    #[serde(default)]
    pub exercises: Vec<NewExerciseLog>,
}

/// Set within [`CompleteWorkout`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewExerciseLog {
    /// Catalog exercise
    #[serde(default)]
    pub exercise_id: Option<String>,
    /// Display name
    pub exercise_name: String,
    /// 1-based set number
    pub set_number: i64,
    /// Repetitions performed
    #[serde(default)]
    pub reps: Option<i64>,
    /// Load used
    #[serde(default)]
    pub weight_kg: Option<f64>,
    /// Whether the set was finished (defaults to true)
    #[serde(default = "default_true")]
    pub completed: bool,
}

const fn default_true() -> bool {
    true
}

impl CompleteWorkout {
    /// Range checks for the completion payload
    ///
    /// # Errors
    ///
    /// Returns `ValueOutOfRange` / `MissingRequiredField` for the first problem found
    pub fn validate(&self) -> AppResult<()> {
        if let Some(rating) = self.rating {
            if !(1..=MAX_RATING).contains(&rating) {
                return Err(AppError::out_of_range(format!(
                    "rating must be between 1 and {MAX_RATING}"
                )));
            }
        }
        if self.duration_minutes.is_some_and(|minutes| minutes < 0) {
            return Err(AppError::out_of_range("duration_minutes cannot be negative"));
        }
        for set in &self.exercises {
            if set.exercise_name.trim().is_empty() {
                return Err(AppError::missing_field("exercises[].exercise_name"));
            }
            if set.set_number < 1 {
                return Err(AppError::out_of_range("set_number must be at least 1"));
            }
            if set.reps.is_some_and(|reps| reps < 0)
                || set.weight_kg.is_some_and(|weight| weight < 0.0)
            {
                return Err(AppError::out_of_range("reps and weight_kg cannot be negative"));
            }
        }
        Ok(())
    }
}
