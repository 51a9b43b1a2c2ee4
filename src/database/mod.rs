// ABOUTME: SQLite connection pool, additive schema migration, and exercise catalog seeding
// ABOUTME: Hands out per-domain managers that share the injected connection pool
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FitCoach Contributors

//! # Database Management
//!
//! The schema is created and migrated at startup. Migration is strictly additive:
//! tables and indexes use `IF NOT EXISTS`, and columns introduced after a table
//! first shipped are added through [`Database::ensure_column`] when missing.
//! Nothing is ever dropped.
//!
//! Each domain gets a small manager holding a clone of the pool (`SqlitePool` is
//! reference counted). Multi-statement writes run in a single transaction, and
//! every statement inside that transaction goes through the transaction's
//! connection. The first statement of every transaction is a write: a deferred
//! SQLite transaction that reads first cannot later upgrade while another
//! connection is writing to the WAL, whereas one that writes first simply waits
//! out the busy timeout.

mod conversations;
mod diet;
mod exercises;
mod profiles;
mod progress;
mod users;
mod workouts;

pub use conversations::ConversationManager;
pub use diet::DietManager;
pub use exercises::{ExerciseManager, ExerciseQuery, GifBackfillReport};
pub use profiles::ProfileManager;
pub(crate) use profiles::fetch_profile;
pub use progress::ProgressManager;
pub use users::UserManager;
pub use workouts::WorkoutManager;

use std::str::FromStr;
use std::time::Duration;

use chrono::{DateTime, SecondsFormat, Utc};
use fitcoach_core::errors::{AppError, AppResult};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::{Row, SqlitePool};
use tracing::{debug, info};

/// Table definitions, in dependency order
const SCHEMA: &[&str] = &[
    r"
    CREATE TABLE IF NOT EXISTS users (
        id TEXT PRIMARY KEY,
        email TEXT NOT NULL UNIQUE,
        password_hash TEXT NOT NULL,
        name TEXT,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )
    ",
    r"
    CREATE TABLE IF NOT EXISTS user_profiles (
        user_id TEXT PRIMARY KEY REFERENCES users(id) ON DELETE CASCADE,
        age INTEGER,
        gender TEXT,
        height_cm REAL,
        current_weight_kg REAL,
        target_weight_kg REAL,
        fitness_level TEXT,
        goal TEXT,
        workout_days_per_week INTEGER,
        available_equipment TEXT NOT NULL DEFAULT '[]',
        dietary_preferences TEXT NOT NULL DEFAULT '[]',
        allergies TEXT NOT NULL DEFAULT '[]',
        injuries TEXT,
        updated_at TEXT NOT NULL
    )
    ",
    r"
    CREATE TABLE IF NOT EXISTS weight_history (
        id TEXT PRIMARY KEY,
        user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        weight_kg REAL NOT NULL,
        notes TEXT,
        recorded_at TEXT NOT NULL
    )
    ",
    "CREATE INDEX IF NOT EXISTS idx_weight_history_user ON weight_history(user_id, recorded_at)",
    r"
    CREATE TABLE IF NOT EXISTS exercises (
        id TEXT PRIMARY KEY,
        name TEXT NOT NULL UNIQUE,
        name_es TEXT,
        muscle_group TEXT NOT NULL,
        equipment TEXT,
        difficulty TEXT,
        instructions TEXT
    )
    ",
    "CREATE INDEX IF NOT EXISTS idx_exercises_muscle_group ON exercises(muscle_group)",
    r"
    CREATE TABLE IF NOT EXISTS workout_plans (
        id TEXT PRIMARY KEY,
        user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        name TEXT NOT NULL,
        description TEXT,
        goal TEXT,
        days_per_week INTEGER NOT NULL DEFAULT 0,
        is_active INTEGER NOT NULL DEFAULT 0,
        created_at TEXT NOT NULL
    )
    ",
    r"
    CREATE UNIQUE INDEX IF NOT EXISTS idx_workout_plans_single_active
        ON workout_plans(user_id) WHERE is_active = 1
    ",
    r"
    CREATE TABLE IF NOT EXISTS workout_days (
        id TEXT PRIMARY KEY,
        plan_id TEXT NOT NULL REFERENCES workout_plans(id) ON DELETE CASCADE,
        day_number INTEGER NOT NULL,
        name TEXT NOT NULL,
        focus TEXT
    )
    ",
    "CREATE INDEX IF NOT EXISTS idx_workout_days_plan ON workout_days(plan_id)",
    r"
    CREATE TABLE IF NOT EXISTS workout_exercises (
        id TEXT PRIMARY KEY,
        day_id TEXT NOT NULL REFERENCES workout_days(id) ON DELETE CASCADE,
        exercise_id TEXT REFERENCES exercises(id) ON DELETE SET NULL,
        exercise_name TEXT NOT NULL,
        sets INTEGER NOT NULL,
        reps TEXT NOT NULL,
        rest_seconds INTEGER,
        notes TEXT,
        order_index INTEGER NOT NULL DEFAULT 0
    )
    ",
    "CREATE INDEX IF NOT EXISTS idx_workout_exercises_day ON workout_exercises(day_id)",
    r"
    CREATE TABLE IF NOT EXISTS workout_logs (
        id TEXT PRIMARY KEY,
        user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        plan_id TEXT REFERENCES workout_plans(id) ON DELETE SET NULL,
        day_id TEXT REFERENCES workout_days(id) ON DELETE SET NULL,
        started_at TEXT NOT NULL,
        completed_at TEXT,
        duration_minutes INTEGER,
        rating INTEGER,
        notes TEXT
    )
    ",
    "CREATE INDEX IF NOT EXISTS idx_workout_logs_user ON workout_logs(user_id, completed_at)",
    r"
    CREATE TABLE IF NOT EXISTS exercise_logs (
        id TEXT PRIMARY KEY,
        workout_log_id TEXT NOT NULL REFERENCES workout_logs(id) ON DELETE CASCADE,
        exercise_id TEXT REFERENCES exercises(id) ON DELETE SET NULL,
        exercise_name TEXT NOT NULL,
        set_number INTEGER NOT NULL,
        reps INTEGER,
        weight_kg REAL,
        completed INTEGER NOT NULL DEFAULT 1
    )
    ",
    "CREATE INDEX IF NOT EXISTS idx_exercise_logs_log ON exercise_logs(workout_log_id)",
    r"
    CREATE TABLE IF NOT EXISTS diet_plans (
        id TEXT PRIMARY KEY,
        user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        name TEXT NOT NULL,
        daily_calories INTEGER NOT NULL,
        protein_g REAL NOT NULL DEFAULT 0,
        carbs_g REAL NOT NULL DEFAULT 0,
        fat_g REAL NOT NULL DEFAULT 0,
        notes TEXT,
        is_active INTEGER NOT NULL DEFAULT 0,
        created_at TEXT NOT NULL
    )
    ",
    r"
    CREATE UNIQUE INDEX IF NOT EXISTS idx_diet_plans_single_active
        ON diet_plans(user_id) WHERE is_active = 1
    ",
    r"
    CREATE TABLE IF NOT EXISTS meals (
        id TEXT PRIMARY KEY,
        diet_plan_id TEXT NOT NULL REFERENCES diet_plans(id) ON DELETE CASCADE,
        day_of_week INTEGER,
        meal_type TEXT NOT NULL,
        name TEXT NOT NULL,
        description TEXT,
        calories INTEGER NOT NULL DEFAULT 0,
        protein_g REAL NOT NULL DEFAULT 0,
        carbs_g REAL NOT NULL DEFAULT 0,
        fat_g REAL NOT NULL DEFAULT 0,
        ingredients TEXT NOT NULL DEFAULT '[]',
        order_index INTEGER NOT NULL DEFAULT 0
    )
    ",
    "CREATE INDEX IF NOT EXISTS idx_meals_plan ON meals(diet_plan_id)",
    r"
    CREATE TABLE IF NOT EXISTS meal_logs (
        id TEXT PRIMARY KEY,
        user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        meal_id TEXT REFERENCES meals(id) ON DELETE SET NULL,
        meal_type TEXT NOT NULL,
        name TEXT NOT NULL,
        calories INTEGER NOT NULL DEFAULT 0,
        protein_g REAL NOT NULL DEFAULT 0,
        carbs_g REAL NOT NULL DEFAULT 0,
        fat_g REAL NOT NULL DEFAULT 0,
        logged_at TEXT NOT NULL
    )
    ",
    "CREATE INDEX IF NOT EXISTS idx_meal_logs_user ON meal_logs(user_id, logged_at)",
    r"
    CREATE TABLE IF NOT EXISTS coach_conversations (
        id TEXT PRIMARY KEY,
        user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        context TEXT NOT NULL,
        messages TEXT NOT NULL DEFAULT '[]',
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL,
        UNIQUE(user_id, context)
    )
    ",
    r"
    CREATE TABLE IF NOT EXISTS achievements (
        id TEXT PRIMARY KEY,
        user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        achievement_type TEXT NOT NULL,
        title TEXT NOT NULL,
        description TEXT NOT NULL,
        unlocked_at TEXT NOT NULL,
        UNIQUE(user_id, achievement_type)
    )
    ",
];

/// Columns added after their table first shipped: `(table, column, definition)`
const ADDITIVE_COLUMNS: &[(&str, &str, &str)] = &[
    ("user_profiles", "activity_level", "TEXT"),
    (
        "user_profiles",
        "onboarding_completed",
        "INTEGER NOT NULL DEFAULT 0",
    ),
    ("exercises", "gif_url", "TEXT"),
    ("workout_plans", "ai_generated", "INTEGER NOT NULL DEFAULT 0"),
    ("diet_plans", "ai_generated", "INTEGER NOT NULL DEFAULT 0"),
];

/// Current time in the fixed-width RFC 3339 form used by every timestamp column
#[must_use]
pub fn now_rfc3339() -> String {
    timestamp(Utc::now())
}

/// Render `at` as a fixed-width RFC 3339 UTC string (`2024-01-07T10:30:00.000Z`)
///
/// Fixed width keeps lexical and chronological order identical, and the first ten
/// characters are always the UTC calendar day.
#[must_use]
pub fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Decode a JSON string-array column, treating malformed content as empty
pub(crate) fn json_list(raw: &str) -> Vec<String> {
    serde_json::from_str(raw).unwrap_or_default()
}

/// Parse a TEXT enum column
pub(crate) fn parse_column<T>(value: &str, column: &str) -> AppResult<T>
where
    T: FromStr<Err = AppError>,
{
    value
        .parse()
        .map_err(|e: AppError| AppError::database(format!("Invalid {column} value stored: {e}")))
}

/// Clamp a caller-supplied page size
pub(crate) fn clamp_limit(limit: Option<i64>) -> i64 {
    use fitcoach_core::constants::limits::{DEFAULT_LIST_LIMIT, MAX_LIST_LIMIT};
    limit.unwrap_or(DEFAULT_LIST_LIMIT).clamp(1, MAX_LIST_LIMIT)
}

/// Map an insert failure on a single-active-plan index to a conflict
pub(crate) fn map_active_plan_error(e: sqlx::Error, what: &str) -> AppError {
    match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => AppError::conflict(format!(
            "Another {what} was activated concurrently; retry the request"
        )),
        _ => AppError::database(format!("Failed to save {what}: {e}")),
    }
}

/// Database handle shared by every route
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Connect, migrate, and seed
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid, the connection fails, or migration fails
    pub async fn new(database_url: &str) -> AppResult<Self> {
        let in_memory = database_url.contains(":memory:");
        let options = SqliteConnectOptions::from_str(database_url)
            .map_err(|e| AppError::config(format!("Invalid DATABASE_URL: {e}")))?
            .create_if_missing(true)
            .foreign_keys(true)
            .busy_timeout(Duration::from_secs(5));

        let connected = if in_memory {
            // Each in-memory connection is its own database: pin the pool to one
            // connection that never expires.
            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
                .connect_with(options)
                .await
        } else {
            if let Some(parent) = options.get_filename().parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent).map_err(|e| {
                        AppError::config(format!(
                            "Cannot create database directory {}: {e}",
                            parent.display()
                        ))
                    })?;
                }
            }
            SqlitePoolOptions::new()
                .max_connections(8)
                .connect_with(options.journal_mode(SqliteJournalMode::Wal))
                .await
        };
        let pool = connected
            .map_err(|e| AppError::database(format!("Failed to connect to database: {e}")))?;

        let db = Self { pool };
        db.migrate().await?;
        db.exercises().seed_catalog().await?;
        Ok(db)
    }

    /// Get a reference to the database pool for advanced operations
    #[must_use]
    pub const fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Create tables and indexes, then add any missing columns
    ///
    /// # Errors
    ///
    /// Returns an error if any DDL statement fails
    pub async fn migrate(&self) -> AppResult<()> {
        for statement in SCHEMA {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .map_err(|e| AppError::database(format!("Migration failed: {e}")))?;
        }
        for (table, column, definition) in ADDITIVE_COLUMNS {
            self.ensure_column(table, column, definition).await?;
        }
        info!("Database schema is up to date");
        Ok(())
    }

    /// Add `column` to `table` unless it already exists
    ///
    /// Returns whether the column was added.
    ///
    /// # Errors
    ///
    /// Returns an error for non-identifier names or if the `ALTER TABLE` fails
    pub async fn ensure_column(
        &self,
        table: &str,
        column: &str,
        definition: &str,
    ) -> AppResult<bool> {
        let is_identifier =
            |name: &str| !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
        if !is_identifier(table) || !is_identifier(column) {
            return Err(AppError::internal(format!(
                "Refusing to migrate non-identifier {table}.{column}"
            )));
        }

        let exists: i64 = sqlx::query(
            "SELECT COUNT(*) AS count FROM pragma_table_info($1) WHERE name = $2",
        )
        .bind(table)
        .bind(column)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to inspect {table}: {e}")))?
        .get("count");

        if exists > 0 {
            return Ok(false);
        }

        sqlx::query(&format!("ALTER TABLE {table} ADD COLUMN {column} {definition}"))
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to add {table}.{column}: {e}")))?;
        debug!(table, column, "Added missing column");
        Ok(true)
    }

    /// Readiness check
    ///
    /// # Errors
    ///
    /// Returns an error if the database does not answer
    pub async fn ping(&self) -> AppResult<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map(|_| ())
            .map_err(|e| AppError::database(format!("Database ping failed: {e}")))
    }

    /// Account storage
    #[must_use]
    pub fn users(&self) -> UserManager {
        UserManager::new(self.pool.clone())
    }

    /// Profile and weight history storage
    #[must_use]
    pub fn profiles(&self) -> ProfileManager {
        ProfileManager::new(self.pool.clone())
    }

    /// Exercise catalog storage
    #[must_use]
    pub fn exercises(&self) -> ExerciseManager {
        ExerciseManager::new(self.pool.clone())
    }

    /// Workout plans and logs
    #[must_use]
    pub fn workouts(&self) -> WorkoutManager {
        WorkoutManager::new(self.pool.clone())
    }

    /// Diet plans and meal logs
    #[must_use]
    pub fn diet(&self) -> DietManager {
        DietManager::new(self.pool.clone())
    }

    /// Progress aggregates and achievements
    #[must_use]
    pub fn progress(&self) -> ProgressManager {
        ProgressManager::new(self.pool.clone())
    }

    /// Coach conversation history
    #[must_use]
    pub fn conversations(&self) -> ConversationManager {
        ConversationManager::new(self.pool.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[tokio::test]
    async fn test_migrate_is_idempotent() {
        let db = Database::new("sqlite::memory:").await.unwrap();
        db.migrate().await.unwrap();
        assert!(!db
            .ensure_column("exercises", "gif_url", "TEXT")
            .await
            .unwrap());
        db.ping().await.unwrap();
    }

    #[tokio::test]
    async fn test_ensure_column_adds_missing() {
        let db = Database::new("sqlite::memory:").await.unwrap();
        assert!(db
            .ensure_column("exercises", "video_url", "TEXT")
            .await
            .unwrap());
        assert!(!db
            .ensure_column("exercises", "video_url", "TEXT")
            .await
            .unwrap());
        assert!(db
            .ensure_column("exercises; DROP TABLE users", "x", "TEXT")
            .await
            .is_err());
    }

    #[test]
    fn test_timestamp_is_fixed_width() {
        let at = Utc.with_ymd_and_hms(2024, 1, 7, 9, 5, 0).unwrap();
        assert_eq!(timestamp(at), "2024-01-07T09:05:00.000Z");
    }

    #[test]
    fn test_clamp_limit() {
        assert_eq!(clamp_limit(None), 50);
        assert_eq!(clamp_limit(Some(0)), 1);
        assert_eq!(clamp_limit(Some(10_000)), 200);
    }
}
