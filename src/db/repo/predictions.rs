//! Prediction operations for the repository.

use crate::config::PredictionPolicy;
use crate::domain::{MatchId, ParticipantId, Prediction, Score};
use crate::error::GameError;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{Sqlite, SqliteRow};
use sqlx::{Executor, Row};

use super::Repository;

impl Repository {
    /// Accept a prediction if the match exists and its window is still open.
    ///
    /// The insert is guarded by the kickoff and result checks in the same
    /// statement, so the window check, the one-shot check and the write happen
    /// as one unit.
    ///
    /// # Errors
    /// - `MatchNotFound` if the match does not exist
    /// - `WindowClosed` if `now` is at or after kickoff, or a result is recorded
    /// - `DuplicatePrediction` under [`PredictionPolicy::OneShot`] when the
    ///   participant already predicted this match
    pub async fn record_prediction(
        &self,
        prediction: &Prediction,
        now: DateTime<Utc>,
        policy: PredictionPolicy,
    ) -> Result<(), GameError> {
        let now_ms = now.timestamp_millis();
        let mut tx = self.pool.begin().await?;

        let sql = match policy {
            PredictionPolicy::OneShot => {
                r#"
                INSERT INTO predictions (match_id, user_id, display_name, home, away, submitted_at)
                SELECT id, ?, ?, ?, ?, ? FROM matches WHERE id = ? AND start_ms > ? AND home_score IS NULL
                ON CONFLICT(match_id, user_id) DO NOTHING
                "#
            }
            PredictionPolicy::Overwrite => {
                r#"
                INSERT INTO predictions (match_id, user_id, display_name, home, away, submitted_at)
                SELECT id, ?, ?, ?, ?, ? FROM matches WHERE id = ? AND start_ms > ? AND home_score IS NULL
                ON CONFLICT(match_id, user_id) DO UPDATE SET
                    display_name = excluded.display_name,
                    home = excluded.home,
                    away = excluded.away,
                    submitted_at = excluded.submitted_at
                "#
            }
        };

        let inserted = sqlx::query(sql)
            .bind(prediction.participant_id.as_i64())
            .bind(prediction.display_name.as_str())
            .bind(prediction.score.home)
            .bind(prediction.score.away)
            .bind(now_ms)
            .bind(prediction.match_id.as_i64())
            .bind(now_ms)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        if inserted == 0 {
            let window: Option<(i64, Option<u32>)> =
                sqlx::query_as("SELECT start_ms, home_score FROM matches WHERE id = ?")
                    .bind(prediction.match_id.as_i64())
                    .fetch_optional(&mut *tx)
                    .await?;

            return Err(match window {
                None => GameError::MatchNotFound(prediction.match_id),
                Some((start_ms, home_score)) if now_ms >= start_ms || home_score.is_some() => {
                    GameError::WindowClosed(prediction.match_id)
                }
                Some(_) => GameError::DuplicatePrediction {
                    match_id: prediction.match_id,
                    participant: prediction.participant_id,
                },
            });
        }

        tx.commit().await?;
        Ok(())
    }

    /// Predictions for a match, ordered by participant id.
    pub async fn list_predictions(&self, match_id: MatchId) -> Result<Vec<Prediction>, sqlx::Error> {
        predictions_for_match(&self.pool, match_id).await
    }

    pub async fn find_prediction(
        &self,
        match_id: MatchId,
        participant: ParticipantId,
    ) -> Result<Option<Prediction>, sqlx::Error> {
        let row = sqlx::query(
            r#"
            SELECT match_id, user_id, display_name, home, away
            FROM predictions
            WHERE match_id = ? AND user_id = ?
            "#,
        )
        .bind(match_id.as_i64())
        .bind(participant.as_i64())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(prediction_from_row).transpose()
    }
}

pub(super) async fn predictions_for_match<'e, E>(
    executor: E,
    match_id: MatchId,
) -> Result<Vec<Prediction>, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let rows = sqlx::query(
        r#"
        SELECT match_id, user_id, display_name, home, away
        FROM predictions
        WHERE match_id = ?
        ORDER BY user_id ASC
        "#,
    )
    .bind(match_id.as_i64())
    .fetch_all(executor)
    .await?;

    rows.iter().map(prediction_from_row).collect()
}

fn prediction_from_row(row: &SqliteRow) -> Result<Prediction, sqlx::Error> {
    Ok(Prediction {
        match_id: MatchId::new(row.try_get("match_id")?),
        participant_id: ParticipantId::new(row.try_get("user_id")?),
        display_name: row.try_get("display_name")?,
        score: Score::new(row.try_get("home")?, row.try_get("away")?),
    })
}
