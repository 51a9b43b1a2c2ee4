// ABOUTME: Strict parsing of model output into declared plan shapes
// ABOUTME: Embedded-JSON recovery, typed deserialization, and structural validation
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FitCoach Contributors

//! # AI Response Parsing
//!
//! Models are asked for JSON only but often wrap it in prose or code fences.
//! [`extract_json_value`] parses the whole body first and otherwise scans for the
//! first balanced `{...}` object that parses. The value is then deserialized into
//! a declared shape and validated; any failure is
//! [`ErrorCode::InvalidAiResponse`](fitcoach_core::errors::ErrorCode::InvalidAiResponse),
//! never a partially empty plan.

use fitcoach_core::constants::validation::{MAX_DAILY_CALORIES, MAX_SETS, MIN_DAILY_CALORIES};
use fitcoach_core::errors::{AppError, AppResult};
use fitcoach_core::models::{
    MealType, NewDietPlan, NewMeal, NewWorkoutDay, NewWorkoutExercise, NewWorkoutPlan,
};
use serde::de::{self, DeserializeOwned, Deserializer};
use serde::Deserialize;
use serde_json::Value;

/// Structural checks run after deserialization
pub trait Validate {
    /// Describe the first structural problem, if any
    ///
    /// # Errors
    ///
    /// Returns `InvalidAiResponse` naming the offending field
    fn validate(&self) -> AppResult<()>;
}

/// Locate and parse the JSON object in a model response
///
/// # Errors
///
/// Returns `InvalidAiResponse` when the body holds no parseable JSON object
pub fn extract_json_value(body: &str) -> AppResult<Value> {
    let trimmed = body.trim();
    if let Ok(value @ Value::Object(_)) = serde_json::from_str::<Value>(trimmed) {
        return Ok(value);
    }

    let mut search_from = 0;
    while let Some(offset) = trimmed[search_from..].find('{') {
        let start = search_from + offset;
        if let Some(end) = balanced_object_end(&trimmed[start..]) {
            if let Ok(value @ Value::Object(_)) =
                serde_json::from_str::<Value>(&trimmed[start..start + end])
            {
                return Ok(value);
            }
        }
        search_from = start + 1;
    }

    Err(AppError::invalid_ai_response(
        "The AI coach did not return a JSON object",
    ))
}

/// Byte length of the balanced object starting at `text[0] == '{'`
fn balanced_object_end(text: &str) -> Option<usize> {
    let mut depth = 0_usize;
    let mut in_string = false;
    let mut escaped = false;

    for (index, c) in text.char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(index + 1);
                }
            }
            _ => {}
        }
    }
    None
}

/// Extract, deserialize, and validate a model response
///
/// # Errors
///
/// Returns `InvalidAiResponse` if any step fails
pub fn parse_ai_payload<T>(body: &str) -> AppResult<T>
where
    T: DeserializeOwned + Validate,
{
    let value = extract_json_value(body)?;
    let payload: T = serde_json::from_value(value).map_err(|e| {
        AppError::invalid_ai_response(format!("AI response has an unexpected shape: {e}"))
    })?;
    payload.validate()?;
    Ok(payload)
}

/// Number as models actually write it: `10`, `10.0`, or `"10"`
#[derive(Deserialize)]
#[serde(untagged)]
enum LenientNumber {
    Int(i64),
    Float(f64),
    Text(String),
}

impl LenientNumber {
    fn into_f64<E: de::Error>(self) -> Result<f64, E> {
        let value = match self {
            #[allow(clippy::cast_precision_loss)]
            Self::Int(n) => n as f64,
            Self::Float(f) => f,
            Self::Text(text) => text
                .trim()
                .parse()
                .map_err(|_| E::custom(format!("expected a number, got '{text}'")))?,
        };
        if value.is_finite() {
            Ok(value)
        } else {
            Err(E::custom("expected a finite number"))
        }
    }

    #[allow(clippy::cast_possible_truncation)]
    fn into_i64<E: de::Error>(self) -> Result<i64, E> {
        match self {
            Self::Int(n) => Ok(n),
            other => other.into_f64().map(|f| f.round() as i64),
        }
    }
}

/// Accept `10`, `10.0`, or `"10"`
fn whole_number<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    LenientNumber::deserialize(deserializer)?.into_i64()
}

/// [`whole_number`] for optional fields; `null` stays `None`
fn optional_whole_number<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<LenientNumber>::deserialize(deserializer)?
        .map(LenientNumber::into_i64)
        .transpose()
}

/// Accept `42.5`, `42`, or `"42.5"`
fn lenient_float<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    LenientNumber::deserialize(deserializer)?.into_f64()
}

/// Accept `"8-12"` or `10`
fn rep_scheme<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(text) => Ok(text),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(de::Error::custom(format!("expected reps, got {other}"))),
    }
}

/// Workout plan as the model must return it
#[derive(Debug, Clone, Deserialize)]
pub struct GeneratedWorkoutPlan {
    /// Plan name
    pub name: String,
    /// Optional description
    #[serde(default)]
    pub description: Option<String>,
    /// Training days
    pub days: Vec<GeneratedWorkoutDay>,
}

/// Day of [`GeneratedWorkoutPlan`]
#[derive(Debug, Clone, Deserialize)]
pub struct GeneratedWorkoutDay {
    /// 1-7
    #[serde(deserialize_with = "whole_number")]
    pub day_number: i64,
    /// Day label
    pub name: String,
    /// Focus description
    #[serde(default)]
    pub focus: Option<String>,
    /// Exercises in order
    pub exercises: Vec<GeneratedExercise>,
}

/// Exercise of [`GeneratedWorkoutDay`]
#[derive(Debug, Clone, Deserialize)]
pub struct GeneratedExercise {
    /// Exercise name
    pub name: String,
    /// 1-10
    #[serde(deserialize_with = "whole_number")]
    pub sets: i64,
    /// Rep prescription
    #[serde(deserialize_with = "rep_scheme")]
    pub reps: String,
    /// Rest between sets
    #[serde(default, deserialize_with = "optional_whole_number")]
    pub rest_seconds: Option<i64>,
    /// Coaching notes
    #[serde(default)]
    pub notes: Option<String>,
}

impl Validate for GeneratedWorkoutPlan {
    fn validate(&self) -> AppResult<()> {
        if self.name.trim().is_empty() {
            return Err(AppError::invalid_ai_response("Workout plan has no name"));
        }
        if self.days.is_empty() {
            return Err(AppError::invalid_ai_response("Workout plan has no days"));
        }
        for day in &self.days {
            if !(1..=7).contains(&day.day_number) {
                return Err(AppError::invalid_ai_response(format!(
                    "Workout day_number {} is outside 1-7",
                    day.day_number
                )));
            }
            if day.exercises.is_empty() {
                return Err(AppError::invalid_ai_response(format!(
                    "Workout day {} has no exercises",
                    day.day_number
                )));
            }
            for exercise in &day.exercises {
                if exercise.name.trim().is_empty() {
                    return Err(AppError::invalid_ai_response("Exercise without a name"));
                }
                if !(1..=MAX_SETS).contains(&exercise.sets) {
                    return Err(AppError::invalid_ai_response(format!(
                        "'{}' has {} sets (expected 1-{MAX_SETS})",
                        exercise.name, exercise.sets
                    )));
                }
            }
        }
        Ok(())
    }
}

impl GeneratedWorkoutPlan {
    /// Convert into a storable plan
    #[must_use]
    pub fn into_new_plan(self, goal: Option<String>) -> NewWorkoutPlan {
        NewWorkoutPlan {
            name: self.name,
            description: self.description,
            goal,
            days: self
                .days
                .into_iter()
                .map(|day| NewWorkoutDay {
                    day_number: day.day_number,
                    name: day.name,
                    focus: day.focus,
                    exercises: day
                        .exercises
                        .into_iter()
                        .map(|exercise| NewWorkoutExercise {
                            exercise_id: None,
                            name: exercise.name,
                            sets: exercise.sets,
                            reps: exercise.reps,
                            rest_seconds: exercise.rest_seconds,
                            notes: exercise.notes,
                        })
                        .collect(),
                })
                .collect(),
        }
    }
}

/// Diet plan as the model must return it
#[derive(Debug, Clone, Deserialize)]
pub struct GeneratedDietPlan {
    /// Plan name
    pub name: String,
    /// 800-6000
    #[serde(deserialize_with = "whole_number")]
    pub daily_calories: i64,
    /// Daily protein target
    #[serde(deserialize_with = "lenient_float")]
    pub protein_g: f64,
    /// Daily carbohydrate target
    #[serde(deserialize_with = "lenient_float")]
    pub carbs_g: f64,
    /// Daily fat target
    #[serde(deserialize_with = "lenient_float")]
    pub fat_g: f64,
    /// Guidance
    #[serde(default)]
    pub notes: Option<String>,
    /// Planned meals
    pub meals: Vec<GeneratedMeal>,
}

/// Meal of [`GeneratedDietPlan`]
#[derive(Debug, Clone, Deserialize)]
pub struct GeneratedMeal {
    /// 1-7 when the plan varies by day
    #[serde(default, deserialize_with = "optional_whole_number")]
    pub day_of_week: Option<i64>,
    /// breakfast / lunch / dinner / snack
    pub meal_type: MealType,
    /// Meal name
    pub name: String,
    /// Preparation notes
    #[serde(default)]
    pub description: Option<String>,
    /// Energy
    #[serde(deserialize_with = "whole_number")]
    pub calories: i64,
    /// Protein
    #[serde(deserialize_with = "lenient_float")]
    pub protein_g: f64,
    /// Carbohydrates
    #[serde(deserialize_with = "lenient_float")]
    pub carbs_g: f64,
    /// Fat
    #[serde(deserialize_with = "lenient_float")]
    pub fat_g: f64,
    /// Ingredient list
    #[serde(default)]
    pub ingredients: Vec<String>,
}

impl Validate for GeneratedDietPlan {
    fn validate(&self) -> AppResult<()> {
        if self.name.trim().is_empty() {
            return Err(AppError::invalid_ai_response("Diet plan has no name"));
        }
        if !(MIN_DAILY_CALORIES..=MAX_DAILY_CALORIES).contains(&self.daily_calories) {
            return Err(AppError::invalid_ai_response(format!(
                "daily_calories {} is outside {MIN_DAILY_CALORIES}-{MAX_DAILY_CALORIES}",
                self.daily_calories
            )));
        }
        if [self.protein_g, self.carbs_g, self.fat_g]
            .iter()
            .any(|grams| !grams.is_finite() || *grams < 0.0)
        {
            return Err(AppError::invalid_ai_response("Diet plan has negative macros"));
        }
        if self.meals.is_empty() {
            return Err(AppError::invalid_ai_response("Diet plan has no meals"));
        }
        for meal in &self.meals {
            if meal.name.trim().is_empty() {
                return Err(AppError::invalid_ai_response("Meal without a name"));
            }
            if meal.day_of_week.is_some_and(|day| !(1..=7).contains(&day)) {
                return Err(AppError::invalid_ai_response(format!(
                    "'{}' has day_of_week outside 1-7",
                    meal.name
                )));
            }
            if meal.calories < 0
                || [meal.protein_g, meal.carbs_g, meal.fat_g]
                    .iter()
                    .any(|grams| !grams.is_finite() || *grams < 0.0)
            {
                return Err(AppError::invalid_ai_response(format!(
                    "'{}' has negative nutrition values",
                    meal.name
                )));
            }
        }
        Ok(())
    }
}

impl GeneratedDietPlan {
    /// Convert into a storable plan
    #[must_use]
    pub fn into_new_plan(self) -> NewDietPlan {
        NewDietPlan {
            name: self.name,
            daily_calories: self.daily_calories,
            protein_g: self.protein_g,
            carbs_g: self.carbs_g,
            fat_g: self.fat_g,
            notes: self.notes,
            meals: self
                .meals
                .into_iter()
                .map(|meal| NewMeal {
                    day_of_week: meal.day_of_week,
                    meal_type: meal.meal_type,
                    name: meal.name,
                    description: meal.description,
                    calories: meal.calories,
                    protein_g: meal.protein_g,
                    carbs_g: meal.carbs_g,
                    fat_g: meal.fat_g,
                    ingredients: meal.ingredients,
                })
                .collect(),
        }
    }
}
