// ABOUTME: Diet plan, meal, and meal log models with nutrition totals
// ABOUTME: Request payloads for manual diet plans and meal logging with validation
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FitCoach Contributors

use serde::{Deserialize, Serialize};

use crate::errors::{AppError, AppResult};

text_enum! {
    /// Slot a meal occupies in the day
    pub enum MealType {
        /// Morning meal
        Breakfast => "breakfast",
        /// Midday meal
        Lunch => "lunch",
        /// Evening meal
        Dinner => "dinner",
        /// Anything in between
        Snack => "snack",
    }
}

/// Diet plan; `meals` is empty in list responses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DietPlan {
    /// UUID v4 identifier
    pub id: String,
    /// Owning user
    pub user_id: String,
    /// Plan name
    pub name: String,
    /// Daily calorie target
    pub daily_calories: i64,
    /// Daily protein target
    pub protein_g: f64,
    /// Daily carbohydrate target
    pub carbs_g: f64,
    /// Daily fat target
    pub fat_g: f64,
    /// Free-text guidance
    pub notes: Option<String>,
    /// Whether this is the user's active plan
    pub is_active: bool,
    /// Created by the AI coach
    pub ai_generated: bool,
    /// RFC 3339 creation time
    pub created_at: String,
    /// Meals ordered by day and `order_index`
    #[serde(default)]
    pub meals: Vec<Meal>,
}

/// Planned meal
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Meal {
    /// UUID v4 identifier
    pub id: String,
    /// Parent plan
    pub diet_plan_id: String,
    /// 1-7, `None` when the meal applies to every day
    pub day_of_week: Option<i64>,
    /// Slot in the day
    pub meal_type: MealType,
    /// Meal name
    pub name: String,
    /// Preparation notes
    pub description: Option<String>,
    /// Energy
    pub calories: i64,
    /// Protein
    pub protein_g: f64,
    /// Carbohydrates
    pub carbs_g: f64,
    /// Fat
    pub fat_g: f64,
    /// Ingredient list
    pub ingredients: Vec<String>,
    /// Position within the day
    pub order_index: i64,
}

/// Payload for creating a diet plan with its meals
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewDietPlan {
    /// Plan name
    pub name: String,
    /// Daily calorie target
    pub daily_calories: i64,
    /// Daily protein target
    #[serde(default)]
    pub protein_g: f64,
    /// Daily carbohydrate target
    #[serde(default)]
    pub carbs_g: f64,
    /// Daily fat target
    #[serde(default)]
    pub fat_g: f64,
    /// Free-text guidance
    #[serde(default)]
    pub notes: Option<String>,
    /// Meals
    #[serde(default)]
    pub meals: Vec<NewMeal>,
}

/// Meal within [`NewDietPlan`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewMeal {
    /// 1-7, or `None` for every day
    #[serde(default)]
    pub day_of_week: Option<i64>,
    /// Slot in the day
    pub meal_type: MealType,
    /// Meal name
    pub name: String,
    /// Preparation notes
    #[serde(default)]
    pub description: Option<String>,
    /// Energy
    pub calories: i64,
    /// Protein
    #[serde(default)]
    pub protein_g: f64,
    /// Carbohydrates
    #[serde(default)]
    pub carbs_g: f64,
    /// Fat
    #[serde(default)]
    pub fat_g: f64,
    /// Ingredient list
    #[serde(default)]
    pub ingredients: Vec<String>,
}

impl NewDietPlan {
    /// Structural checks for a diet plan
    ///
    /// # Errors
    ///
    /// Returns `MissingRequiredField` / `ValueOutOfRange` for the first problem found
    pub fn validate(&self) -> AppResult<()> {
        if self.name.trim().is_empty() {
            return Err(AppError::missing_field("name"));
        }
        if self.daily_calories <= 0 {
            return Err(AppError::out_of_range("daily_calories must be positive"));
        }
        if [self.protein_g, self.carbs_g, self.fat_g]
            .iter()
            .any(|grams| !grams.is_finite() || *grams < 0.0)
        {
            return Err(AppError::out_of_range("macros cannot be negative"));
        }
        for meal in &self.meals {
            if meal.name.trim().is_empty() {
                return Err(AppError::missing_field("meals[].name"));
            }
            if meal.day_of_week.is_some_and(|day| !(1..=7).contains(&day)) {
                return Err(AppError::out_of_range("day_of_week must be between 1 and 7"));
            }
            if meal.calories < 0
                || [meal.protein_g, meal.carbs_g, meal.fat_g]
                    .iter()
                    .any(|grams| !grams.is_finite() || *grams < 0.0)
            {
                return Err(AppError::out_of_range(format!(
                    "nutrition values for '{}' cannot be negative",
                    meal.name
                )));
            }
        }
        Ok(())
    }
}

/// Consumed meal
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MealLog {
    /// UUID v4 identifier
    pub id: String,
    /// Owning user
    pub user_id: String,
    /// Planned meal this log refers to
    pub meal_id: Option<String>,
    /// Slot in the day
    pub meal_type: MealType,
    /// Meal name
    pub name: String,
    /// Energy
    pub calories: i64,
    /// Protein
    pub protein_g: f64,
    /// Carbohydrates
    pub carbs_g: f64,
    /// Fat
    pub fat_g: f64,
    /// RFC 3339 time of consumption
    pub logged_at: String,
}

/// Payload for logging a meal; missing values are copied from `meal_id`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewMealLog {
    /// Planned meal
    #[serde(default)]
    pub meal_id: Option<String>,
    /// Slot in the day
    #[serde(default)]
    pub meal_type: Option<MealType>,
    /// Meal name
    #[serde(default)]
    pub name: Option<String>,
    /// Energy
    #[serde(default)]
    pub calories: Option<i64>,
    /// Protein
    #[serde(default)]
    pub protein_g: Option<f64>,
    /// Carbohydrates
    #[serde(default)]
    pub carbs_g: Option<f64>,
    /// Fat
    #[serde(default)]
    pub fat_g: Option<f64>,
}

impl NewMealLog {
    /// Fill absent values from a planned meal
    #[must_use]
    pub fn with_defaults_from(mut self, meal: &Meal) -> Self {
        self.meal_type = self.meal_type.or(Some(meal.meal_type));
        if self.name.is_none() {
            self.name = Some(meal.name.clone());
        }
        self.calories = self.calories.or(Some(meal.calories));
        self.protein_g = self.protein_g.or(Some(meal.protein_g));
        self.carbs_g = self.carbs_g.or(Some(meal.carbs_g));
        self.fat_g = self.fat_g.or(Some(meal.fat_g));
        self
    }

    /// Check required fields once defaults have been applied
    ///
    /// # Errors
    ///
    /// Returns `MissingRequiredField` / `ValueOutOfRange` for the first problem found
    pub fn validate(&self) -> AppResult<()> {
        if self.meal_type.is_none() {
            return Err(AppError::missing_field("meal_type"));
        }
        if !matches!(self.name.as_deref(), Some(name) if !name.trim().is_empty()) {
            return Err(AppError::missing_field("name"));
        }
        match self.calories {
            None => return Err(AppError::missing_field("calories")),
            Some(calories) if calories < 0 => {
                return Err(AppError::out_of_range("calories cannot be negative"));
            }
            Some(_) => {}
        }
        if [self.protein_g, self.carbs_g, self.fat_g]
            .iter()
            .flatten()
            .any(|grams| *grams < 0.0)
        {
            return Err(AppError::out_of_range("macros cannot be negative"));
        }
        Ok(())
    }
}

/// Summed nutrition values
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct NutritionTotals {
    /// Energy
    pub calories: i64,
    /// Protein
    pub protein_g: f64,
    /// Carbohydrates
    pub carbs_g: f64,
    /// Fat
    pub fat_g: f64,
}

impl NutritionTotals {
    /// Sum a set of meal logs
    #[must_use]
    pub fn from_logs(logs: &[MealLog]) -> Self {
        logs.iter().fold(Self::default(), |acc, log| Self {
            calories: acc.calories + log.calories,
            protein_g: acc.protein_g + log.protein_g,
            carbs_g: acc.carbs_g + log.carbs_g,
            fat_g: acc.fat_g + log.fat_g,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn planned_meal() -> Meal {
        Meal {
            id: "m1".to_owned(),
            diet_plan_id: "p1".to_owned(),
            day_of_week: None,
            meal_type: MealType::Lunch,
            name: "Chicken rice bowl".to_owned(),
            description: None,
            calories: 650,
            protein_g: 45.0,
            carbs_g: 70.0,
            fat_g: 15.0,
            ingredients: vec!["chicken".to_owned(), "rice".to_owned()],
            order_index: 0,
        }
    }

    #[test]
    fn test_meal_type_accepts_capitalized() {
        let meal_type: MealType = serde_json::from_str("\"Breakfast\"").unwrap();
        assert_eq!(meal_type, MealType::Breakfast);
        assert_eq!(serde_json::to_string(&MealType::Snack).unwrap(), "\"snack\"");
        assert!(serde_json::from_str::<MealType>("\"brunch\"").is_err());
    }

    #[test]
    fn test_meal_log_defaults_from_plan() {
        let log = NewMealLog {
            meal_id: Some("m1".to_owned()),
            calories: Some(500),
            ..NewMealLog::default()
        }
        .with_defaults_from(&planned_meal());
        assert_eq!(log.name.as_deref(), Some("Chicken rice bowl"));
        assert_eq!(log.calories, Some(500));
        assert_eq!(log.meal_type, Some(MealType::Lunch));
        assert!(log.validate().is_ok());
    }

    #[test]
    fn test_meal_log_requires_fields() {
        let log = NewMealLog {
            meal_type: Some(MealType::Snack),
            name: Some("Apple".to_owned()),
            ..NewMealLog::default()
        };
        assert!(log.validate().unwrap_err().message.contains("calories"));
    }

    #[test]
    fn test_totals() {
        let logs = vec![
            MealLog {
                id: "l1".to_owned(),
                user_id: "u1".to_owned(),
                meal_id: None,
                meal_type: MealType::Breakfast,
                name: "Oats".to_owned(),
                calories: 350,
                protein_g: 12.0,
                carbs_g: 60.0,
                fat_g: 6.0,
                logged_at: "2024-01-01T08:00:00+00:00".to_owned(),
            },
            MealLog {
                id: "l2".to_owned(),
                user_id: "u1".to_owned(),
                meal_id: None,
                meal_type: MealType::Lunch,
                name: "Salad".to_owned(),
                calories: 400,
                protein_g: 30.0,
                carbs_g: 20.0,
                fat_g: 18.0,
                logged_at: "2024-01-01T13:00:00+00:00".to_owned(),
            },
        ];
        let totals = NutritionTotals::from_logs(&logs);
        assert_eq!(totals.calories, 750);
        assert!((totals.protein_g - 42.0).abs() < f64::EPSILON);
    }
}
