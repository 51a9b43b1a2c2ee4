// ABOUTME: Prompt construction for the AI coach
// ABOUTME: Static instructions loaded at compile time plus a rendered profile section
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FitCoach Contributors

//! # Coach Prompts
//!
//! Instructions live in markdown files next to this module and are embedded with
//! `include_str!`. Each prompt appends a plain-text description of the user's
//! profile and any per-request overrides.

use std::fmt::Write as _;

use fitcoach_core::models::{User, UserProfile};
use serde::Deserialize;

/// Persona and safety rules for free-form chat
pub const COACH_SYSTEM_PROMPT: &str = include_str!("coach_system.md");

/// JSON contract for generated workout plans
pub const WORKOUT_PLAN_PROMPT: &str = include_str!("workout_plan.md");

/// JSON contract for generated diet plans
pub const DIET_PLAN_PROMPT: &str = include_str!("diet_plan.md");

/// Optional adjustments for workout generation
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WorkoutPlanRequest {
    /// Emphasis, e.g. "upper body" or "5k preparation"
    #[serde(default)]
    pub focus: Option<String>,
    /// Training days, overrides the profile
    #[serde(default)]
    pub days_per_week: Option<i64>,
    /// Equipment list, overrides the profile
    #[serde(default)]
    pub equipment: Option<Vec<String>>,
}

/// Optional adjustments for diet generation
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DietPlanRequest {
    /// Daily calories, overrides the estimate
    #[serde(default)]
    pub calorie_target: Option<i64>,
    /// Extra preferences, merged with the profile's
    #[serde(default)]
    pub preferences: Option<Vec<String>>,
}

fn push_line(out: &mut String, label: &str, value: impl std::fmt::Display) {
    let _ = writeln!(out, "- {label}: {value}");
}

fn push_list(out: &mut String, label: &str, values: &[String]) {
    if !values.is_empty() {
        push_line(out, label, values.join(", "));
    }
}

/// Render the known profile fields as a bullet list
#[must_use]
pub fn profile_summary(profile: &UserProfile) -> String {
    let mut out = String::new();
    if let Some(age) = profile.age {
        push_line(&mut out, "Age", age);
    }
    if let Some(gender) = profile.gender {
        push_line(&mut out, "Gender", gender);
    }
    if let Some(height) = profile.height_cm {
        push_line(&mut out, "Height", format!("{height:.0} cm"));
    }
    if let Some(weight) = profile.current_weight_kg {
        push_line(&mut out, "Current weight", format!("{weight:.1} kg"));
    }
    if let Some(target) = profile.target_weight_kg {
        push_line(&mut out, "Target weight", format!("{target:.1} kg"));
    }
    if let Some(bmi) = profile.bmi() {
        push_line(&mut out, "BMI", format!("{bmi:.1}"));
    }
    if let Some(level) = profile.fitness_level {
        push_line(&mut out, "Fitness level", level);
    }
    if let Some(goal) = profile.goal {
        push_line(&mut out, "Goal", goal);
    }
    if let Some(activity) = profile.activity_level {
        push_line(&mut out, "Daily activity", activity);
    }
    if let Some(days) = profile.workout_days_per_week {
        push_line(&mut out, "Training days per week", days);
    }
    push_list(&mut out, "Equipment", &profile.available_equipment);
    push_list(&mut out, "Dietary preferences", &profile.dietary_preferences);
    push_list(&mut out, "Allergies", &profile.allergies);
    if let Some(injuries) = profile.injuries.as_deref().filter(|s| !s.trim().is_empty()) {
        push_line(&mut out, "Injuries / limitations", injuries);
    }
    if out.is_empty() {
        out.push_str("- No profile details yet\n");
    }
    out
}

/// System prompt for free-form chat
#[must_use]
pub fn coach_system_prompt(user: &User, profile: Option<&UserProfile>) -> String {
    let mut prompt = String::from(COACH_SYSTEM_PROMPT);
    if let Some(name) = user.name.as_deref().filter(|n| !n.trim().is_empty()) {
        push_line(&mut prompt, "Name", name);
    }
    match profile {
        Some(profile) => prompt.push_str(&profile_summary(profile)),
        None => prompt.push_str(
            "- The user has not completed onboarding; ask about goals and experience when relevant\n",
        ),
    }
    prompt
}

/// Instructions for a generated workout plan
#[must_use]
pub fn workout_plan_prompt(profile: &UserProfile, overrides: &WorkoutPlanRequest) -> String {
    let mut prompt = String::from(WORKOUT_PLAN_PROMPT);
    prompt.push_str("\n## User\n");
    prompt.push_str(&profile_summary(profile));

    let mut request = String::new();
    if let Some(focus) = overrides.focus.as_deref().filter(|f| !f.trim().is_empty()) {
        push_line(&mut request, "Focus", focus);
    }
    if let Some(days) = overrides.days_per_week {
        push_line(&mut request, "Training days per week", days);
    }
    if let Some(equipment) = &overrides.equipment {
        if equipment.is_empty() {
            push_line(&mut request, "Equipment", "bodyweight only");
        } else {
            push_list(&mut request, "Equipment", equipment);
        }
    }
    if !request.is_empty() {
        prompt.push_str("\n## Request (overrides the profile)\n");
        prompt.push_str(&request);
    }
    prompt
}

/// Instructions for a generated diet plan
#[must_use]
pub fn diet_plan_prompt(profile: &UserProfile, overrides: &DietPlanRequest) -> String {
    let mut prompt = String::from(DIET_PLAN_PROMPT);
    prompt.push_str("\n## User\n");
    prompt.push_str(&profile_summary(profile));

    let calories = overrides
        .calorie_target
        .or_else(|| profile.estimated_daily_calories());
    let mut request = String::new();
    if let Some(calories) = calories {
        push_line(&mut request, "Daily calories", calories);
    }
    if let Some(preferences) = &overrides.preferences {
        push_list(&mut request, "Additional preferences", preferences);
    }
    if !request.is_empty() {
        prompt.push_str("\n## Request\n");
        prompt.push_str(&request);
    }
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;
    use fitcoach_core::models::{FitnessGoal, FitnessLevel, Gender};

    fn profile() -> UserProfile {
        UserProfile {
            user_id: "u1".to_owned(),
            age: Some(30),
            gender: Some(Gender::Female),
            height_cm: Some(165.0),
            current_weight_kg: Some(70.0),
            target_weight_kg: Some(62.0),
            fitness_level: Some(FitnessLevel::Beginner),
            goal: Some(FitnessGoal::LoseWeight),
            allergies: vec!["peanuts".to_owned()],
            ..UserProfile::default()
        }
    }

    #[test]
    fn test_profile_summary_lists_known_fields() {
        let summary = profile_summary(&profile());
        assert!(summary.contains("- Age: 30"));
        assert!(summary.contains("- Goal: lose_weight"));
        assert!(summary.contains("- Allergies: peanuts"));
        assert!(!summary.contains("Equipment"));
        assert_eq!(
            profile_summary(&UserProfile::default()),
            "- No profile details yet\n"
        );
    }

    #[test]
    fn test_workout_prompt_includes_overrides() {
        let prompt = workout_plan_prompt(
            &profile(),
            &WorkoutPlanRequest {
                focus: Some("glutes".to_owned()),
                days_per_week: Some(3),
                equipment: Some(Vec::new()),
            },
        );
        assert!(prompt.starts_with(WORKOUT_PLAN_PROMPT));
        assert!(prompt.contains("- Focus: glutes"));
        assert!(prompt.contains("- Equipment: bodyweight only"));
    }

    #[test]
    fn test_diet_prompt_prefers_explicit_calories() {
        let prompt = diet_plan_prompt(
            &profile(),
            &DietPlanRequest {
                calorie_target: Some(1800),
                preferences: None,
            },
        );
        assert!(prompt.contains("- Daily calories: 1800"));
    }
}
