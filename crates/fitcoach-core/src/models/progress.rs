// ABOUTME: Achievement and progress summary models
// ABOUTME: Achievement kinds are stored once per user and never updated
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FitCoach Contributors

use serde::{Deserialize, Serialize};

text_enum! {
    /// Unlockable milestone kinds
    pub enum AchievementKind {
        /// At least one completed workout
        FirstWorkout => "first_workout",
        /// A completed workout on each of the last 7 calendar days
        WeekStreak => "week_streak",
        /// Ten completed workouts
        TenWorkouts => "ten_workouts",
        /// Current weight reached the target in the goal's direction
        WeightGoal => "weight_goal",
    }
}

/// Unlocked milestone
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Achievement {
    /// UUID v4 identifier
    pub id: String,
    /// Owning user
    pub user_id: String,
    /// Milestone kind (unique per user)
    pub achievement_type: AchievementKind,
    /// Display title
    pub title: String,
    /// Display description
    pub description: String,
    /// RFC 3339 unlock time
    pub unlocked_at: String,
}

/// Catalogue entry with the caller's unlock state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AchievementStatus {
    /// Milestone kind
    pub achievement_type: AchievementKind,
    /// Display title
    pub title: String,
    /// Display description
    pub description: String,
    /// Whether the caller has unlocked it
    pub unlocked: bool,
    /// Unlock time when unlocked
    pub unlocked_at: Option<String>,
}

/// Dashboard numbers for `GET /api/progress/summary`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProgressSummary {
    /// All-time completed workouts
    pub total_workouts: i64,
    /// Completed workouts in the trailing 7 days
    pub workouts_this_week: i64,
    /// Consecutive days with a completion, ending today or yesterday
    pub current_streak_days: i64,
    /// Latest weight
    pub current_weight_kg: Option<f64>,
    /// Target weight
    pub target_weight_kg: Option<f64>,
    /// Oldest recorded weight
    pub start_weight_kg: Option<f64>,
    /// `current - start`
    pub weight_change_kg: Option<f64>,
    /// Calories logged today
    pub calories_today: i64,
    /// Daily target of the active diet plan
    pub calorie_target: Option<i64>,
    /// Unlocked achievements
    pub achievements_unlocked: i64,
}

/// One point of the weekly chart
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyProgress {
    /// `YYYY-MM-DD`
    pub date: String,
    /// Completed workouts that day
    pub workouts: i64,
    /// Calories logged that day
    pub calories: i64,
}
