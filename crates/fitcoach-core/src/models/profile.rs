// ABOUTME: User profile model with anthropometrics, goals, and preferences
// ABOUTME: Includes profile update validation and weight history entries
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FitCoach Contributors

use serde::{Deserialize, Serialize};

use crate::constants::validation::{
    MAX_AGE, MAX_HEIGHT_CM, MAX_WEIGHT_KG, MIN_AGE, MIN_HEIGHT_CM, MIN_WEIGHT_KG,
};
use crate::errors::{AppError, AppResult};

text_enum! {
    /// Self-reported gender, used for calorie estimation
    pub enum Gender {
        /// Male
        Male => "male",
        /// Female
        Female => "female",
        /// Other / prefer not to say
        Other => "other",
    }
}

text_enum! {
    /// Training experience
    pub enum FitnessLevel {
        /// Less than six months of regular training
        Beginner => "beginner",
        /// Trains regularly
        Intermediate => "intermediate",
        /// Years of structured training
        Advanced => "advanced",
    }
}

text_enum! {
    /// Primary goal driving plan generation and the weight-goal achievement
    pub enum FitnessGoal {
        /// Reduce body weight
        LoseWeight => "lose_weight",
        /// Build muscle mass
        GainMuscle => "gain_muscle",
        /// Keep current weight
        Maintain => "maintain",
        /// Cardio capacity
        ImproveEndurance => "improve_endurance",
        /// No specific target
        GeneralFitness => "general_fitness",
    }
}

text_enum! {
    /// Daily activity outside of training
    pub enum ActivityLevel {
        /// Desk job, little walking
        Sedentary => "sedentary",
        /// Light activity 1-3 days a week
        Light => "light",
        /// Moderate activity 3-5 days a week
        Moderate => "moderate",
        /// Hard activity 6-7 days a week
        Active => "active",
        /// Physical job plus training
        VeryActive => "very_active",
    }
}

/// Which way the weight must move to reach the target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GoalDirection {
    /// Goal is reached at or below the target
    Loss,
    /// Goal is reached at or above the target
    Gain,
}

impl FitnessGoal {
    /// Direction of the weight target, `None` for goals without one
    #[must_use]
    pub const fn weight_direction(self) -> Option<GoalDirection> {
        match self {
            Self::LoseWeight => Some(GoalDirection::Loss),
            Self::GainMuscle => Some(GoalDirection::Gain),
            Self::Maintain | Self::ImproveEndurance | Self::GeneralFitness => None,
        }
    }

    /// Daily calorie adjustment relative to maintenance
    #[must_use]
    pub const fn calorie_adjustment(self) -> f64 {
        match self {
            Self::LoseWeight => -500.0,
            Self::GainMuscle => 300.0,
            Self::Maintain | Self::ImproveEndurance | Self::GeneralFitness => 0.0,
        }
    }
}

impl GoalDirection {
    /// Whether `current` satisfies the target in this direction
    #[must_use]
    pub fn is_reached(self, current: f64, target: f64) -> bool {
        match self {
            Self::Loss => current <= target,
            Self::Gain => current >= target,
        }
    }
}

impl ActivityLevel {
    /// Multiplier applied to the basal metabolic rate
    #[must_use]
    pub const fn multiplier(self) -> f64 {
        match self {
            Self::Sedentary => 1.2,
            Self::Light => 1.375,
            Self::Moderate => 1.55,
            Self::Active => 1.725,
            Self::VeryActive => 1.9,
        }
    }
}

/// Body metrics, goals, and preferences (1:1 with `User`)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserProfile {
    /// Owning user
    pub user_id: String,
    /// Age in years
    pub age: Option<i64>,
    /// Gender
    pub gender: Option<Gender>,
    /// Height in centimetres
    pub height_cm: Option<f64>,
    /// Latest recorded weight
    pub current_weight_kg: Option<f64>,
    /// Weight the user is working towards
    pub target_weight_kg: Option<f64>,
    /// Training experience
    pub fitness_level: Option<FitnessLevel>,
    /// Primary goal
    pub goal: Option<FitnessGoal>,
    /// Activity outside training
    pub activity_level: Option<ActivityLevel>,
    /// Preferred training days per week (1-7)
    pub workout_days_per_week: Option<i64>,
    /// Equipment the user has access to
    pub available_equipment: Vec<String>,
    /// Diet styles (vegetarian, keto, ...)
    pub dietary_preferences: Vec<String>,
    /// Food allergies
    pub allergies: Vec<String>,
    /// Free-text injuries or limitations
    pub injuries: Option<String>,
    /// Set once onboarding has been submitted
    pub onboarding_completed: bool,
    /// RFC 3339 last update time
    pub updated_at: String,
}

impl UserProfile {
    /// Body mass index, when height and weight are known
    #[must_use]
    pub fn bmi(&self) -> Option<f64> {
        let height_m = self.height_cm? / 100.0;
        let weight = self.current_weight_kg?;
        (height_m > 0.0).then(|| weight / (height_m * height_m))
    }

    /// Estimated daily calorie need (Mifflin-St Jeor, activity multiplier, goal adjustment)
    #[must_use]
    pub fn estimated_daily_calories(&self) -> Option<i64> {
        let weight = self.current_weight_kg?;
        let height = self.height_cm?;
        #[allow(clippy::cast_precision_loss)]
        let age = self.age? as f64;
        let sex_offset = match self.gender {
            Some(Gender::Male) => 5.0,
            Some(Gender::Female) => -161.0,
            Some(Gender::Other) | None => -78.0,
        };
        let bmr = 10.0_f64.mul_add(weight, 6.25_f64.mul_add(height, -5.0 * age)) + sex_offset;
        let activity = self.activity_level.map_or(1.375, ActivityLevel::multiplier);
        let adjustment = self.goal.map_or(0.0, FitnessGoal::calorie_adjustment);
        #[allow(clippy::cast_possible_truncation)]
        let calories = bmr.mul_add(activity, adjustment).round() as i64;
        Some(calories)
    }

    /// Apply every field present in `update`
    pub fn apply(&mut self, update: &ProfileUpdate) {
        macro_rules! merge {
            ($($field:ident),+) => {
                $(self.$field = update.$field.or(self.$field);)+
            };
        }
        merge!(
            age,
            gender,
            height_cm,
            current_weight_kg,
            target_weight_kg,
            fitness_level,
            goal,
            activity_level,
            workout_days_per_week
        );
        if let Some(injuries) = &update.injuries {
            self.injuries = Some(injuries.clone());
        }
        if let Some(equipment) = &update.available_equipment {
            self.available_equipment.clone_from(equipment);
        }
        if let Some(preferences) = &update.dietary_preferences {
            self.dietary_preferences.clone_from(preferences);
        }
        if let Some(allergies) = &update.allergies {
            self.allergies.clone_from(allergies);
        }
    }
}

/// Partial profile payload used by `PUT /api/user/profile` and onboarding
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileUpdate {
    /// Age in years
    pub age: Option<i64>,
    /// Gender
    pub gender: Option<Gender>,
    /// Height in centimetres
    pub height_cm: Option<f64>,
    /// Current weight
    pub current_weight_kg: Option<f64>,
    /// Target weight
    pub target_weight_kg: Option<f64>,
    /// Training experience
    pub fitness_level: Option<FitnessLevel>,
    /// Primary goal
    pub goal: Option<FitnessGoal>,
    /// Activity outside training
    pub activity_level: Option<ActivityLevel>,
    /// Preferred training days per week
    pub workout_days_per_week: Option<i64>,
    /// Equipment list (replaces the stored list)
    pub available_equipment: Option<Vec<String>>,
    /// Diet styles (replaces the stored list)
    pub dietary_preferences: Option<Vec<String>>,
    /// Allergies (replaces the stored list)
    pub allergies: Option<Vec<String>>,
    /// Injuries or limitations
    pub injuries: Option<String>,
}

impl ProfileUpdate {
    /// Check every present field against its accepted range
    ///
    /// # Errors
    ///
    /// Returns `ValueOutOfRange` naming the first offending field
    pub fn validate(&self) -> AppResult<()> {
        if let Some(age) = self.age {
            if !(MIN_AGE..=MAX_AGE).contains(&age) {
                return Err(AppError::out_of_range(format!(
                    "age must be between {MIN_AGE} and {MAX_AGE}"
                )));
            }
        }
        if let Some(height) = self.height_cm {
            if !(MIN_HEIGHT_CM..=MAX_HEIGHT_CM).contains(&height) {
                return Err(AppError::out_of_range(format!(
                    "height_cm must be between {MIN_HEIGHT_CM} and {MAX_HEIGHT_CM}"
                )));
            }
        }
        for (field, value) in [
            ("current_weight_kg", self.current_weight_kg),
            ("target_weight_kg", self.target_weight_kg),
        ] {
            if let Some(weight) = value {
                validate_weight(field, weight)?;
            }
        }
        if let Some(days) = self.workout_days_per_week {
            if !(1..=7).contains(&days) {
                return Err(AppError::out_of_range(
                    "workout_days_per_week must be between 1 and 7",
                ));
            }
        }
        Ok(())
    }

    /// Validate and additionally require the onboarding fields
    ///
    /// # Errors
    ///
    /// Returns `MissingRequiredField` for the first absent onboarding field, or the
    /// range error from [`Self::validate`]
    pub fn validate_onboarding(&self) -> AppResult<()> {
        let required = [
            ("age", self.age.is_some()),
            ("gender", self.gender.is_some()),
            ("height_cm", self.height_cm.is_some()),
            ("current_weight_kg", self.current_weight_kg.is_some()),
            ("goal", self.goal.is_some()),
            ("fitness_level", self.fitness_level.is_some()),
        ];
        if let Some((field, _)) = required.iter().find(|(_, present)| !present) {
            return Err(AppError::missing_field(field));
        }
        self.validate()
    }
}

/// Check a body weight value
///
/// # Errors
///
/// Returns `ValueOutOfRange` when the weight is outside the accepted range
pub fn validate_weight(field: &str, weight: f64) -> AppResult<()> {
    if weight.is_finite() && (MIN_WEIGHT_KG..=MAX_WEIGHT_KG).contains(&weight) {
        Ok(())
    } else {
        Err(AppError::out_of_range(format!(
            "{field} must be between {MIN_WEIGHT_KG} and {MAX_WEIGHT_KG} kg"
        )))
    }
}

/// One weigh-in
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeightEntry {
    /// UUID v4 identifier
    pub id: String,
    /// Owning user
    pub user_id: String,
    /// Recorded weight
    pub weight_kg: f64,
    /// Optional note
    pub notes: Option<String>,
    /// RFC 3339 time of the weigh-in
    pub recorded_at: String,
}
