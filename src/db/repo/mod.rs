//! Repository layer for database operations.
//!
//! This module provides the `Repository` struct for all database operations.
//! Methods are organized across submodules by table:
//! - `predictions.rs` - Prediction window and one-shot enforcement
//! - `scores.rs` - Score records, streak counters, leaderboard and result writes
//! - `reminders.rs` - Reminder queue

mod predictions;
mod reminders;
mod scores;

pub use scores::{LeaderboardRow, ResultWriter, StreakCounter};

use crate::domain::{Match, MatchId, Score};
use crate::error::GameError;
use chrono::{DateTime, FixedOffset, Utc};
use sqlx::sqlite::{SqlitePool, SqliteRow};
use sqlx::Row;

/// Repository for database operations.
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Repository { pool }
    }

    /// Round-trip to the store, used by readiness checks.
    pub async fn ping(&self) -> Result<(), sqlx::Error> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    // =========================================================================
    // Match operations
    // =========================================================================

    /// Insert a new match and return its id.
    ///
    /// With `reject_duplicates`, a match with the same description and kickoff
    /// instant is refused atomically.
    ///
    /// # Errors
    /// `Validation` for an empty description, `DuplicateMatch`, or `Db`.
    pub async fn create_match(
        &self,
        description: &str,
        scheduled_start: DateTime<FixedOffset>,
        reject_duplicates: bool,
    ) -> Result<MatchId, GameError> {
        let description = description.trim();
        if description.is_empty() {
            return Err(GameError::Validation(
                "match description must not be empty".to_string(),
            ));
        }

        let start_ms = scheduled_start.timestamp_millis();
        let created_at = Utc::now().timestamp_millis();

        let result = if reject_duplicates {
            sqlx::query(
                r#"
                INSERT INTO matches (description, start_time, start_ms, created_at)
                SELECT ?, ?, ?, ?
                WHERE NOT EXISTS (
                    SELECT 1 FROM matches WHERE description = ? AND start_ms = ?
                )
                "#,
            )
            .bind(description)
            .bind(scheduled_start.to_rfc3339())
            .bind(start_ms)
            .bind(created_at)
            .bind(description)
            .bind(start_ms)
            .execute(&self.pool)
            .await?
        } else {
            sqlx::query(
                r#"
                INSERT INTO matches (description, start_time, start_ms, created_at)
                VALUES (?, ?, ?, ?)
                "#,
            )
            .bind(description)
            .bind(scheduled_start.to_rfc3339())
            .bind(start_ms)
            .bind(created_at)
            .execute(&self.pool)
            .await?
        };

        if result.rows_affected() == 0 {
            return Err(GameError::DuplicateMatch {
                description: description.to_string(),
                start: scheduled_start.to_rfc3339(),
            });
        }

        Ok(MatchId::new(result.last_insert_rowid()))
    }

    pub async fn find_match(&self, match_id: MatchId) -> Result<Option<Match>, sqlx::Error> {
        let row = sqlx::query(
            r#"
            SELECT id, description, start_time, home_score, away_score
            FROM matches
            WHERE id = ?
            "#,
        )
        .bind(match_id.as_i64())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(match_from_row).transpose()
    }

    /// All matches ordered by kickoff.
    pub async fn list_matches(&self) -> Result<Vec<Match>, sqlx::Error> {
        let rows = sqlx::query(
            r#"
            SELECT id, description, start_time, home_score, away_score
            FROM matches
            ORDER BY start_ms ASC, id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(match_from_row).collect()
    }

    /// Unresolved matches whose kickoff is strictly after `now`, earliest first.
    pub async fn list_open_matches(&self, now: DateTime<Utc>) -> Result<Vec<Match>, sqlx::Error> {
        let rows = sqlx::query(
            r#"
            SELECT id, description, start_time, home_score, away_score
            FROM matches
            WHERE start_ms > ? AND home_score IS NULL
            ORDER BY start_ms ASC, id ASC
            "#,
        )
        .bind(now.timestamp_millis())
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(match_from_row).collect()
    }

    /// Store (or overwrite) the final score of a match.
    ///
    /// This does not score predictions; see [`ResultWriter`] for the full cycle.
    ///
    /// # Errors
    /// `MatchNotFound` if the id is unknown.
    pub async fn set_result(&self, match_id: MatchId, score: Score) -> Result<(), GameError> {
        scores::write_result(&self.pool, match_id, score).await
    }

    /// Delete a match together with its predictions, score records and
    /// pending reminders.
    ///
    /// Returns `false` when no match had that id.
    pub async fn delete_match(&self, match_id: MatchId) -> Result<bool, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        let deleted = sqlx::query("DELETE FROM matches WHERE id = ?")
            .bind(match_id.as_i64())
            .execute(&mut *tx)
            .await?
            .rows_affected();

        sqlx::query("DELETE FROM reminders WHERE match_id = ?")
            .bind(match_id.as_i64())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(deleted > 0)
    }
}

fn match_from_row(row: &SqliteRow) -> Result<Match, sqlx::Error> {
    let start_time: String = row.try_get("start_time")?;
    let scheduled_start = DateTime::parse_from_rfc3339(&start_time)
        .map_err(|e| sqlx::Error::Decode(Box::new(e)))?;

    let home: Option<u32> = row.try_get("home_score")?;
    let away: Option<u32> = row.try_get("away_score")?;
    let result = match (home, away) {
        (Some(home), Some(away)) => Some(Score::new(home, away)),
        _ => None,
    };

    Ok(Match {
        id: MatchId::new(row.try_get("id")?),
        description: row.try_get("description")?,
        scheduled_start,
        result,
    })
}
