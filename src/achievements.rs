// ABOUTME: Declarative achievement rules with idempotent unlock storage
// ABOUTME: Completion-count, consecutive-day, and weight-goal criteria plus streak arithmetic
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FitCoach Contributors

//! # Achievements
//!
//! Every milestone is one row of [`ACHIEVEMENTS`]. Evaluation loads the kinds the
//! user already holds and checks the remaining criteria, then inserts the newly
//! met ones in one transaction: a failed insert rolls back every unlock of that
//! pass, and the next call re-evaluates from scratch. `ON CONFLICT DO NOTHING`
//! keeps two concurrent passes from reporting the same unlock twice.
//!
//! Days are UTC calendar days taken from the first ten characters of the fixed-width
//! `completed_at` timestamps.

use chrono::{Duration, NaiveDate, Utc};
use fitcoach_core::errors::{AppError, AppResult};
use fitcoach_core::models::{Achievement, AchievementKind};
use sqlx::{Row, SqliteConnection, SqlitePool};
use tracing::info;
use uuid::Uuid;

use crate::database::{fetch_profile, timestamp};

/// Condition a user must satisfy to unlock an achievement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Criterion {
    /// At least `n` completed workouts ever
    CompletedWorkouts(i64),
    /// A completed workout on each of the `n` calendar days ending today
    ConsecutiveDays(i64),
    /// Current weight reached the target in the goal's direction
    WeightGoalReached,
}

/// One declarative achievement
#[derive(Debug, Clone, Copy)]
pub struct AchievementRule {
    /// Stored type
    pub kind: AchievementKind,
    /// Display title
    pub title: &'static str,
    /// Display description
    pub description: &'static str,
    /// Unlock condition
    pub criterion: Criterion,
}

/// Every achievement, in evaluation order
pub const ACHIEVEMENTS: &[AchievementRule] = &[
    AchievementRule {
        kind: AchievementKind::FirstWorkout,
        title: "First Workout",
        description: "Completed your first workout",
        criterion: Criterion::CompletedWorkouts(1),
    },
    AchievementRule {
        kind: AchievementKind::WeekStreak,
        title: "Week Warrior",
        description: "Worked out every day for 7 days in a row",
        criterion: Criterion::ConsecutiveDays(7),
    },
    AchievementRule {
        kind: AchievementKind::TenWorkouts,
        title: "Dedicated",
        description: "Completed 10 workouts",
        criterion: Criterion::CompletedWorkouts(10),
    },
    AchievementRule {
        kind: AchievementKind::WeightGoal,
        title: "Goal Crusher",
        description: "Reached your target weight",
        criterion: Criterion::WeightGoalReached,
    },
];

/// Rule for a stored kind
#[must_use]
pub fn rule_for(kind: AchievementKind) -> Option<&'static AchievementRule> {
    ACHIEVEMENTS.iter().find(|rule| rule.kind == kind)
}

/// Length of the run of consecutive workout days ending today or yesterday
///
/// `days` may be unsorted and contain duplicates.
#[must_use]
pub fn current_streak(days: &[NaiveDate], today: NaiveDate) -> i64 {
    let mut sorted: Vec<NaiveDate> = days.iter().copied().filter(|day| *day <= today).collect();
    sorted.sort_unstable_by(|a, b| b.cmp(a));
    sorted.dedup();

    let Some(&latest) = sorted.first() else {
        return 0;
    };
    if latest < today - Duration::days(1) {
        return 0;
    }

    let mut streak = 0;
    let mut expected = latest;
    for day in sorted {
        if day != expected {
            break;
        }
        streak += 1;
        expected = day - Duration::days(1);
    }
    streak
}

impl Criterion {
    async fn is_met(
        self,
        conn: &mut SqliteConnection,
        user_id: &str,
        today: NaiveDate,
    ) -> AppResult<bool> {
        match self {
            Self::CompletedWorkouts(n) => {
                let completed: i64 = sqlx::query(
                    r"
                    SELECT COUNT(*) AS count FROM workout_logs
                    WHERE user_id = $1 AND completed_at IS NOT NULL
                    ",
                )
                .bind(user_id)
                .fetch_one(&mut *conn)
                .await
                .map_err(|e| AppError::database(format!("Failed to count workouts: {e}")))?
                .get("count");
                Ok(completed >= n)
            }
            Self::ConsecutiveDays(n) => {
                let first_day = today - Duration::days(n - 1);
                let distinct_days: i64 = sqlx::query(
                    r"
                    SELECT COUNT(DISTINCT substr(completed_at, 1, 10)) AS days
                    FROM workout_logs
                    WHERE user_id = $1
                      AND completed_at IS NOT NULL
                      AND substr(completed_at, 1, 10) BETWEEN $2 AND $3
                    ",
                )
                .bind(user_id)
                .bind(first_day.format("%Y-%m-%d").to_string())
                .bind(today.format("%Y-%m-%d").to_string())
                .fetch_one(&mut *conn)
                .await
                .map_err(|e| AppError::database(format!("Failed to count workout days: {e}")))?
                .get("days");
                Ok(distinct_days >= n)
            }
            Self::WeightGoalReached => {
                let Some(profile) = fetch_profile(conn, user_id).await? else {
                    return Ok(false);
                };
                let reached = match (
                    profile.goal.and_then(|goal| goal.weight_direction()),
                    profile.current_weight_kg,
                    profile.target_weight_kg,
                ) {
                    (Some(direction), Some(current), Some(target)) => {
                        direction.is_reached(current, target)
                    }
                    _ => false,
                };
                Ok(reached)
            }
        }
    }
}

/// Evaluate every rule the user has not unlocked yet and store the newly met ones
///
/// Returns only the achievements unlocked by this call.
///
/// # Errors
///
/// Returns an error if any query fails; no achievement is stored in that case
pub async fn evaluate_all(
    pool: &SqlitePool,
    user_id: &str,
    today: NaiveDate,
) -> AppResult<Vec<Achievement>> {
    let candidates = {
        let mut conn = pool
            .acquire()
            .await
            .map_err(|e| AppError::database(format!("Failed to acquire connection: {e}")))?;

        let held: Vec<String> =
            sqlx::query("SELECT achievement_type FROM achievements WHERE user_id = $1")
                .bind(user_id)
                .fetch_all(&mut *conn)
                .await
                .map_err(|e| AppError::database(format!("Failed to load achievements: {e}")))?
                .iter()
                .map(|row| row.get("achievement_type"))
                .collect();

        let mut candidates = Vec::new();
        for rule in ACHIEVEMENTS {
            if held.iter().any(|kind| kind == rule.kind.as_str()) {
                continue;
            }
            if rule.criterion.is_met(&mut conn, user_id, today).await? {
                candidates.push(rule);
            }
        }
        candidates
    };
    if candidates.is_empty() {
        return Ok(Vec::new());
    }

    // Only inserts run inside the transaction
    let mut tx = pool
        .begin()
        .await
        .map_err(|e| AppError::database(format!("Failed to begin transaction: {e}")))?;

    let mut unlocked = Vec::new();
    for rule in candidates {
        let achievement = Achievement {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_owned(),
            achievement_type: rule.kind,
            title: rule.title.to_owned(),
            description: rule.description.to_owned(),
            unlocked_at: timestamp(Utc::now()),
        };
        let inserted = sqlx::query(
            r"
            INSERT INTO achievements (id, user_id, achievement_type, title, description, unlocked_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT(user_id, achievement_type) DO NOTHING
            ",
        )
        .bind(&achievement.id)
        .bind(&achievement.user_id)
        .bind(achievement.achievement_type.as_str())
        .bind(&achievement.title)
        .bind(&achievement.description)
        .bind(&achievement.unlocked_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::database(format!("Failed to store achievement: {e}")))?
        .rows_affected();

        if inserted > 0 {
            unlocked.push(achievement);
        }
    }

    tx.commit()
        .await
        .map_err(|e| AppError::database(format!("Failed to commit achievements: {e}")))?;

    for achievement in &unlocked {
        info!(
            user.id = %user_id,
            achievement = %achievement.achievement_type,
            "Achievement unlocked"
        );
    }
    Ok(unlocked)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    #[test]
    fn test_streak_ending_today() {
        let days: Vec<NaiveDate> = (1..=7).map(day).collect();
        assert_eq!(current_streak(&days, day(7)), 7);
    }

    #[test]
    fn test_streak_ending_yesterday_still_counts() {
        let days = vec![day(5), day(6), day(5)];
        assert_eq!(current_streak(&days, day(7)), 2);
    }

    #[test]
    fn test_streak_broken_by_gap() {
        let days = vec![day(1), day(2), day(4), day(5)];
        assert_eq!(current_streak(&days, day(5)), 2);
        assert_eq!(current_streak(&days, day(10)), 0);
        assert_eq!(current_streak(&[], day(10)), 0);
    }

    #[test]
    fn test_every_kind_has_one_rule() {
        for kind in AchievementKind::ALL {
            assert!(rule_for(*kind).is_some(), "missing rule for {kind}");
        }
        assert_eq!(ACHIEVEMENTS.len(), AchievementKind::ALL.len());
        assert_eq!(
            rule_for(AchievementKind::WeekStreak).map(|rule| rule.criterion),
            Some(Criterion::ConsecutiveDays(7))
        );
    }
}
