// ABOUTME: Core data models for the FitCoach API
// ABOUTME: Re-exports user, profile, exercise, workout, diet, progress, and conversation types
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FitCoach Contributors

//! # Data Models
//!
//! Records mirror the relational schema one-to-one; request payloads (`New*`,
//! `*Update`) carry their own `validate` methods so routes reject bad input
//! before any SQL runs.
//!
//! Enumerations stored as TEXT columns share one representation: a lowercase
//! `snake_case` string, parsed case-insensitively so model output such as
//! `"Breakfast"` or `"gain-muscle"` still maps onto the right variant.

/// Declares a TEXT-backed enum with `as_str`, `FromStr`, and serde support
macro_rules! text_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $(
                $(#[$vmeta:meta])*
                $variant:ident => $text:literal
            ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        #[serde(try_from = "String", into = "&'static str")]
        pub enum $name {
            $(
                $(#[$vmeta])*
                $variant
            ),+
        }

        impl $name {
            /// All variants in declaration order
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            /// Stored/serialized representation
            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $text),+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = $crate::errors::AppError;

            fn from_str(value: &str) -> Result<Self, Self::Err> {
                let normalized = value.trim().to_lowercase().replace(['-', ' '], "_");
                match normalized.as_str() {
                    $($text => Ok(Self::$variant),)+
                    _ => Err($crate::errors::AppError::invalid_input(format!(
                        "Invalid {}: '{}' (expected one of: {})",
                        stringify!($name),
                        value,
                        [$($text),+].join(", ")
                    ))),
                }
            }
        }

        impl TryFrom<String> for $name {
            type Error = $crate::errors::AppError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                value.parse()
            }
        }

        impl From<$name> for &'static str {
            fn from(value: $name) -> Self {
                value.as_str()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

mod conversation;
mod diet;
mod exercise;
mod profile;
mod progress;
mod user;
mod workout;

pub use conversation::{ConversationMessage, ConversationRole};
pub use diet::{
    DietPlan, Meal, MealLog, MealType, NewDietPlan, NewMeal, NewMealLog, NutritionTotals,
};
pub use exercise::{Exercise, MUSCLE_GROUPS};
pub use profile::{
    validate_weight, ActivityLevel, FitnessGoal, FitnessLevel, Gender, GoalDirection,
    ProfileUpdate, UserProfile, WeightEntry,
};
pub use progress::{
    Achievement, AchievementKind, AchievementStatus, DailyProgress, ProgressSummary,
};
pub use user::User;
pub use workout::{
    CompleteWorkout, ExerciseLog, NewExerciseLog, NewWorkoutDay, NewWorkoutExercise,
    NewWorkoutPlan, WorkoutDay, WorkoutExercise, WorkoutLog, WorkoutPlan,
};
