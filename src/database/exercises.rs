// ABOUTME: Database operations for the exercise catalog
// ABOUTME: Alias-aware accent-insensitive search, catalog seeding, and GIF back-fill passes
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FitCoach Contributors

use fitcoach_core::errors::{AppError, AppResult};
use fitcoach_core::models::Exercise;
use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqliteRow;
use sqlx::{QueryBuilder, Row, Sqlite, SqliteConnection, SqlitePool};
use tracing::{debug, info};
use uuid::Uuid;

use super::clamp_limit;
use crate::exercise_catalog::{
    self, exact_name_gif, keyword_gif, muscle_group_default_gif, normalize_query, seed_name_gif,
    SearchFilter, ACCENT_FOLDS, SEED_EXERCISES,
};

const EXERCISE_COLUMNS: &str =
    "id, name, name_es, muscle_group, equipment, difficulty, instructions, gif_url";

/// Catalog search filters; every field is optional
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExerciseQuery {
    /// Free-text term or muscle-group alias
    pub search: Option<String>,
    /// Canonical muscle group
    pub muscle_group: Option<String>,
    /// Required equipment
    pub equipment: Option<String>,
    /// Page size
    pub limit: Option<i64>,
}

/// Rows updated by each back-fill pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct GifBackfillReport {
    /// Exact media library title
    pub exact_name: u64,
    /// Seed list name ignoring accents and punctuation
    pub seed_name: u64,
    /// Movement keyword
    pub keyword: u64,
    /// Muscle-group default clip
    pub muscle_group_default: u64,
    /// Sum of all passes
    pub total_updated: u64,
    /// Rows still without media afterwards
    pub remaining_without_gif: i64,
}

/// Row still lacking media
struct MissingGif {
    id: String,
    name: String,
    name_es: Option<String>,
    muscle_group: String,
}

/// Exercise catalog database operations
pub struct ExerciseManager {
    pool: SqlitePool,
}

impl ExerciseManager {
    /// Create a new exercise manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert any catalog entries that are not stored yet
    ///
    /// # Errors
    ///
    /// Returns an error if an insert fails (no entry is written in that case)
    pub async fn seed_catalog(&self) -> AppResult<u64> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::database(format!("Failed to begin transaction: {e}")))?;

        let mut inserted = 0;
        for seed in SEED_EXERCISES {
            let result = sqlx::query(
                r"
                INSERT INTO exercises (
                    id, name, name_es, muscle_group, equipment, difficulty, instructions, gif_url
                ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                ON CONFLICT(name) DO NOTHING
                ",
            )
            .bind(Uuid::new_v4().to_string())
            .bind(seed.name)
            .bind(seed.name_es)
            .bind(seed.muscle_group)
            .bind(seed.equipment)
            .bind(seed.difficulty)
            .bind(seed.instructions)
            .bind(seed.gif_url())
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::database(format!("Failed to seed exercise: {e}")))?;
            inserted += result.rows_affected();
        }

        tx.commit()
            .await
            .map_err(|e| AppError::database(format!("Failed to commit exercise seed: {e}")))?;
        if inserted > 0 {
            info!(inserted, "Seeded exercise catalog");
        }
        Ok(inserted)
    }

    /// Search the catalog
    ///
    /// A `search` term that is exactly a muscle-group alias filters by the alias's
    /// groups only; any other term is an accent-insensitive substring match over the
    /// English name, Spanish name, and muscle group.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn search(&self, query: &ExerciseQuery) -> AppResult<Vec<Exercise>> {
        let mut builder: QueryBuilder<Sqlite> =
            QueryBuilder::new(format!("SELECT {EXERCISE_COLUMNS} FROM exercises WHERE 1 = 1"));

        match query.search.as_deref().and_then(exercise_catalog::resolve_search) {
            Some(SearchFilter::MuscleGroups(groups)) => {
                builder.push(" AND muscle_group IN (");
                let mut separated = builder.separated(", ");
                for group in groups {
                    separated.push_bind(*group);
                }
                separated.push_unseparated(")");
            }
            Some(SearchFilter::Pattern(term)) => {
                let pattern = like_pattern(&term);
                builder.push(" AND (");
                for (index, column) in ["name", "name_es", "muscle_group"].iter().enumerate() {
                    if index > 0 {
                        builder.push(" OR ");
                    }
                    builder.push(folded_column(column));
                    builder.push(" LIKE ");
                    builder.push_bind(pattern.clone());
                    builder.push(" ESCAPE '\\'");
                }
                builder.push(")");
            }
            None => {}
        }

        if let Some(group) = query.muscle_group.as_deref().map(normalize_query) {
            if !group.is_empty() {
                builder.push(" AND muscle_group = ");
                builder.push_bind(group.replace(' ', "_"));
            }
        }
        if let Some(equipment) = query.equipment.as_deref().map(normalize_query) {
            if !equipment.is_empty() {
                builder.push(" AND LOWER(equipment) = ");
                builder.push_bind(equipment);
            }
        }

        builder.push(" ORDER BY muscle_group, name LIMIT ");
        builder.push_bind(clamp_limit(query.limit));

        let rows = builder
            .build()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to search exercises: {e}")))?;

        Ok(rows.iter().map(row_to_exercise).collect())
    }

    /// Fetch one exercise
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn get(&self, exercise_id: &str) -> AppResult<Option<Exercise>> {
        sqlx::query(&format!(
            "SELECT {EXERCISE_COLUMNS} FROM exercises WHERE id = $1"
        ))
        .bind(exercise_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to get exercise: {e}")))
        .map(|row| row.as_ref().map(row_to_exercise))
    }

    /// Find an exercise by English or Spanish name, adding it to the catalog if absent
    ///
    /// # Errors
    ///
    /// Returns an error if the lookup or insert fails
    pub async fn find_or_create_by_name(&self, name: &str) -> AppResult<Exercise> {
        let mut conn = self
            .pool
            .acquire()
            .await
            .map_err(|e| AppError::database(format!("Failed to acquire connection: {e}")))?;
        find_or_create_on(&mut conn, name).await
    }

    /// Assign media to rows without a GIF URL in four passes of decreasing specificity
    ///
    /// Each pass only touches rows still lacking a URL, so re-running after full
    /// coverage updates nothing.
    ///
    /// # Errors
    ///
    /// Returns an error if a pass fails; earlier passes stay applied
    pub async fn backfill_gifs(&self) -> AppResult<GifBackfillReport> {
        let exact_name = self.backfill_pass(|row| exact_name_gif(&row.name)).await?;
        let seed_name = self
            .backfill_pass(|row| {
                seed_name_gif(&row.name).or_else(|| row.name_es.as_deref().and_then(seed_name_gif))
            })
            .await?;
        let keyword = self
            .backfill_pass(|row| {
                keyword_gif(&row.name).or_else(|| row.name_es.as_deref().and_then(keyword_gif))
            })
            .await?;
        let muscle_group_default = self
            .backfill_pass(|row| Some(muscle_group_default_gif(&row.muscle_group)))
            .await?;

        let remaining_without_gif: i64 = sqlx::query(
            "SELECT COUNT(*) AS count FROM exercises WHERE gif_url IS NULL OR gif_url = ''",
        )
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to count exercises without GIF: {e}")))?
        .get("count");

        let report = GifBackfillReport {
            exact_name,
            seed_name,
            keyword,
            muscle_group_default,
            total_updated: exact_name + seed_name + keyword + muscle_group_default,
            remaining_without_gif,
        };
        info!(
            exact_name,
            seed_name,
            keyword,
            muscle_group_default,
            remaining_without_gif,
            "Exercise GIF back-fill finished"
        );
        Ok(report)
    }

    async fn backfill_pass<F>(&self, matcher: F) -> AppResult<u64>
    where
        F: Fn(&MissingGif) -> Option<String>,
    {
        let rows = sqlx::query(
            r"
            SELECT id, name, name_es, muscle_group FROM exercises
            WHERE gif_url IS NULL OR gif_url = ''
            ",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to list exercises without GIF: {e}")))?;

        let matches: Vec<(String, String)> = rows
            .iter()
            .filter_map(|row| {
                let missing = MissingGif {
                    id: row.get("id"),
                    name: row.get("name"),
                    name_es: row.get("name_es"),
                    muscle_group: row.get("muscle_group"),
                };
                matcher(&missing).map(|url| (missing.id, url))
            })
            .collect();
        if matches.is_empty() {
            return Ok(0);
        }

        // The guard on gif_url keeps a concurrent pass from overwriting an assignment
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::database(format!("Failed to begin transaction: {e}")))?;

        let mut updated = 0;
        for (id, url) in &matches {
            updated += sqlx::query(
                r"
                UPDATE exercises SET gif_url = $1
                WHERE id = $2 AND (gif_url IS NULL OR gif_url = '')
                ",
            )
            .bind(url)
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::database(format!("Failed to assign exercise GIF: {e}")))?
            .rows_affected();
        }

        tx.commit()
            .await
            .map_err(|e| AppError::database(format!("Failed to commit GIF pass: {e}")))?;
        Ok(updated)
    }
}

/// Resolve an exercise by name on an existing connection or transaction
pub(crate) async fn find_or_create_on(
    conn: &mut SqliteConnection,
    name: &str,
) -> AppResult<Exercise> {
    let name = name.trim();
    let existing = sqlx::query(&format!(
        r"
        SELECT {EXERCISE_COLUMNS} FROM exercises
        WHERE name = $1 COLLATE NOCASE OR name_es = $1 COLLATE NOCASE
        LIMIT 1
        "
    ))
    .bind(name)
    .fetch_optional(&mut *conn)
    .await
    .map_err(|e| AppError::database(format!("Failed to look up exercise: {e}")))?;

    if let Some(row) = existing {
        return Ok(row_to_exercise(&row));
    }

    let exercise = Exercise {
        id: Uuid::new_v4().to_string(),
        name: name.to_owned(),
        name_es: None,
        muscle_group: exercise_catalog::guess_muscle_group(name).to_owned(),
        equipment: None,
        difficulty: None,
        instructions: None,
        gif_url: None,
    };
    sqlx::query(
        r"
        INSERT INTO exercises (id, name, muscle_group)
        VALUES ($1, $2, $3)
        ",
    )
    .bind(&exercise.id)
    .bind(&exercise.name)
    .bind(&exercise.muscle_group)
    .execute(&mut *conn)
    .await
    .map_err(|e| AppError::database(format!("Failed to create exercise: {e}")))?;

    debug!(exercise.name = %exercise.name, "Added exercise outside the catalog");
    Ok(exercise)
}

/// `LOWER(column)` with accented characters folded, matching [`exercise_catalog::fold_accents`]
fn folded_column(column: &str) -> String {
    ACCENT_FOLDS
        .iter()
        .fold(format!("LOWER(COALESCE({column}, ''))"), |expr, (accented, plain)| {
            format!("REPLACE({expr}, '{accented}', '{plain}')")
        })
}

/// `%term%` with LIKE wildcards escaped
fn like_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

fn row_to_exercise(row: &SqliteRow) -> Exercise {
    Exercise {
        id: row.get("id"),
        name: row.get("name"),
        name_es: row.get("name_es"),
        muscle_group: row.get("muscle_group"),
        equipment: row.get("equipment"),
        difficulty: row.get("difficulty"),
        instructions: row.get("instructions"),
        gif_url: row.get("gif_url"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("100%_x"), "%100\\%\\_x%");
        assert_eq!(like_pattern("press"), "%press%");
    }

    #[test]
    fn test_folded_column_wraps_lower() {
        let expr = folded_column("name");
        assert!(expr.contains("LOWER(COALESCE(name, ''))"));
        assert!(expr.starts_with("REPLACE("));
        assert!(expr.contains("'ñ', 'n'"));
    }
}
