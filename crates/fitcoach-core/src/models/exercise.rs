// ABOUTME: Exercise catalog record with muscle group, equipment, and media URL
// ABOUTME: Defines the canonical muscle group labels used by search aliases
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FitCoach Contributors

use serde::{Deserialize, Serialize};

/// Canonical muscle group labels stored in `exercises.muscle_group`
pub const MUSCLE_GROUPS: &[&str] = &[
    "chest",
    "back",
    "shoulders",
    "biceps",
    "triceps",
    "forearms",
    "quadriceps",
    "hamstrings",
    "glutes",
    "calves",
    "abs",
    "cardio",
    "full_body",
];

/// Catalog exercise
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Exercise {
    /// UUID v4 identifier
    pub id: String,
    /// English name (unique)
    pub name: String,
    /// Spanish name
    pub name_es: Option<String>,
    /// One of [`MUSCLE_GROUPS`]
    pub muscle_group: String,
    /// Required equipment (`bodyweight` when none)
    pub equipment: Option<String>,
    /// beginner / intermediate / advanced
    pub difficulty: Option<String>,
    /// Short execution cue
    pub instructions: Option<String>,
    /// Demonstration GIF on the media CDN
    pub gif_url: Option<String>,
}
