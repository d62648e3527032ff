//! Score record, streak and leaderboard operations for the repository.

use crate::domain::{MatchId, ParticipantId, Prediction, Score, ScoreRecord};
use crate::error::GameError;
use sqlx::sqlite::{Sqlite, SqliteRow};
use sqlx::{Executor, Row, Transaction};

use super::predictions::predictions_for_match;
use super::Repository;

/// A participant's live streak and the match that last moved it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StreakCounter {
    pub count: u32,
    pub last_match: Option<MatchId>,
}

/// One leaderboard line: a participant's summed points across all matches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaderboardRow {
    pub participant_id: ParticipantId,
    /// Name from the participant's score record on the highest match id.
    pub display_name: String,
    pub total_points: i64,
}

impl Repository {
    pub async fn upsert_score(&self, record: &ScoreRecord) -> Result<(), sqlx::Error> {
        write_score(&self.pool, record).await
    }

    /// Current streak of a participant, 0 if none has been recorded.
    pub async fn get_streak(&self, participant: ParticipantId) -> Result<u32, sqlx::Error> {
        Ok(read_streak(&self.pool, participant).await?.count)
    }

    pub async fn set_streak(
        &self,
        participant: ParticipantId,
        value: u32,
    ) -> Result<(), sqlx::Error> {
        write_streak(&self.pool, participant, value, None).await
    }

    /// Score records of a match, ordered by participant id.
    pub async fn scores_for_match(&self, match_id: MatchId) -> Result<Vec<ScoreRecord>, sqlx::Error> {
        let rows = sqlx::query(
            r#"
            SELECT match_id, user_id, display_name, base_points, points, streak_before
            FROM scores
            WHERE match_id = ?
            ORDER BY user_id ASC
            "#,
        )
        .bind(match_id.as_i64())
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(score_from_row).collect()
    }

    /// Points summed per participant, highest first.
    ///
    /// Ties are broken by display name, then participant id, so the order is
    /// deterministic.
    pub async fn leaderboard(&self, limit: usize) -> Result<Vec<LeaderboardRow>, sqlx::Error> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let rows = sqlx::query(
            r#"
            SELECT
                s.user_id AS user_id,
                (
                    SELECT latest.display_name
                    FROM scores latest
                    WHERE latest.user_id = s.user_id
                    ORDER BY latest.match_id DESC
                    LIMIT 1
                ) AS display_name,
                SUM(s.points) AS total_points
            FROM scores s
            GROUP BY s.user_id
            ORDER BY total_points DESC, display_name ASC, user_id ASC
            LIMIT ?
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| {
                Ok(LeaderboardRow {
                    participant_id: ParticipantId::new(row.try_get("user_id")?),
                    display_name: row.try_get("display_name")?,
                    total_points: row.try_get("total_points")?,
                })
            })
            .collect()
    }

    /// Open a write transaction for recording a match result.
    pub async fn begin_result(&self) -> Result<ResultWriter, sqlx::Error> {
        Ok(ResultWriter {
            tx: self.pool.begin().await?,
        })
    }
}

/// Transaction spanning one result-recording cycle.
///
/// Callers must issue [`ResultWriter::set_result`] first: it takes the SQLite
/// write lock, which then covers every read and write until
/// [`ResultWriter::commit`]. Dropping the writer rolls everything back.
pub struct ResultWriter {
    tx: Transaction<'static, Sqlite>,
}

impl ResultWriter {
    /// # Errors
    /// `MatchNotFound` if the id is unknown.
    pub async fn set_result(&mut self, match_id: MatchId, score: Score) -> Result<(), GameError> {
        write_result(&mut *self.tx, match_id, score).await
    }

    pub async fn predictions(&mut self, match_id: MatchId) -> Result<Vec<Prediction>, sqlx::Error> {
        predictions_for_match(&mut *self.tx, match_id).await
    }

    pub async fn existing_score(
        &mut self,
        match_id: MatchId,
        participant: ParticipantId,
    ) -> Result<Option<ScoreRecord>, sqlx::Error> {
        let row = sqlx::query(
            r#"
            SELECT match_id, user_id, display_name, base_points, points, streak_before
            FROM scores
            WHERE match_id = ? AND user_id = ?
            "#,
        )
        .bind(match_id.as_i64())
        .bind(participant.as_i64())
        .fetch_optional(&mut *self.tx)
        .await?;

        row.as_ref().map(score_from_row).transpose()
    }

    pub async fn streak(&mut self, participant: ParticipantId) -> Result<StreakCounter, sqlx::Error> {
        read_streak(&mut *self.tx, participant).await
    }

    /// Set the live streak and remember `match_id` as the match that set it.
    pub async fn set_streak(
        &mut self,
        participant: ParticipantId,
        value: u32,
        match_id: MatchId,
    ) -> Result<(), sqlx::Error> {
        write_streak(&mut *self.tx, participant, value, Some(match_id)).await
    }

    pub async fn upsert_score(&mut self, record: &ScoreRecord) -> Result<(), sqlx::Error> {
        write_score(&mut *self.tx, record).await
    }

    /// Every match with a result, ordered by kickoff then id.
    pub async fn resolved_matches_by_kickoff(
        &mut self,
    ) -> Result<Vec<(MatchId, Score)>, sqlx::Error> {
        let rows = sqlx::query(
            r#"
            SELECT id, home_score, away_score
            FROM matches
            WHERE home_score IS NOT NULL AND away_score IS NOT NULL
            ORDER BY start_ms ASC, id ASC
            "#,
        )
        .fetch_all(&mut *self.tx)
        .await?;

        rows.iter()
            .map(|row| {
                Ok((
                    MatchId::new(row.try_get("id")?),
                    Score::new(row.try_get("home_score")?, row.try_get("away_score")?),
                ))
            })
            .collect()
    }

    /// Drop every streak counter, used before a full chronological replay.
    pub async fn reset_streaks(&mut self) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM streaks")
            .execute(&mut *self.tx)
            .await?;
        Ok(())
    }

    pub async fn commit(self) -> Result<(), sqlx::Error> {
        self.tx.commit().await
    }
}

pub(super) async fn write_result<'e, E>(
    executor: E,
    match_id: MatchId,
    score: Score,
) -> Result<(), GameError>
where
    E: Executor<'e, Database = Sqlite>,
{
    let updated = sqlx::query("UPDATE matches SET home_score = ?, away_score = ? WHERE id = ?")
        .bind(score.home)
        .bind(score.away)
        .bind(match_id.as_i64())
        .execute(executor)
        .await?
        .rows_affected();

    if updated == 0 {
        return Err(GameError::MatchNotFound(match_id));
    }
    Ok(())
}

async fn read_streak<'e, E>(
    executor: E,
    participant: ParticipantId,
) -> Result<StreakCounter, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let row: Option<(u32, Option<i64>)> =
        sqlx::query_as("SELECT count, last_match_id FROM streaks WHERE user_id = ?")
            .bind(participant.as_i64())
            .fetch_optional(executor)
            .await?;

    Ok(row
        .map(|(count, last_match)| StreakCounter {
            count,
            last_match: last_match.map(MatchId::new),
        })
        .unwrap_or_default())
}

async fn write_streak<'e, E>(
    executor: E,
    participant: ParticipantId,
    value: u32,
    last_match: Option<MatchId>,
) -> Result<(), sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query(
        r#"
        INSERT INTO streaks (user_id, count, last_match_id) VALUES (?, ?, ?)
        ON CONFLICT(user_id) DO UPDATE SET
            count = excluded.count,
            last_match_id = excluded.last_match_id
        "#,
    )
    .bind(participant.as_i64())
    .bind(value)
    .bind(last_match.map(|m| m.as_i64()))
    .execute(executor)
    .await?;
    Ok(())
}

async fn write_score<'e, E>(executor: E, record: &ScoreRecord) -> Result<(), sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query(
        r#"
        INSERT INTO scores (match_id, user_id, display_name, base_points, points, streak_before)
        VALUES (?, ?, ?, ?, ?, ?)
        ON CONFLICT(match_id, user_id) DO UPDATE SET
            display_name = excluded.display_name,
            base_points = excluded.base_points,
            points = excluded.points,
            streak_before = excluded.streak_before
        "#,
    )
    .bind(record.match_id.as_i64())
    .bind(record.participant_id.as_i64())
    .bind(record.display_name.as_str())
    .bind(record.base_points)
    .bind(record.points)
    .bind(record.streak_before)
    .execute(executor)
    .await?;
    Ok(())
}

fn score_from_row(row: &SqliteRow) -> Result<ScoreRecord, sqlx::Error> {
    Ok(ScoreRecord {
        match_id: MatchId::new(row.try_get("match_id")?),
        participant_id: ParticipantId::new(row.try_get("user_id")?),
        display_name: row.try_get("display_name")?,
        base_points: row.try_get("base_points")?,
        points: row.try_get("points")?,
        streak_before: row.try_get("streak_before")?,
    })
}

#[cfg(test)]
mod tests {
    use super::super::test_support::temp_repo;
    use super::*;
    use chrono::{FixedOffset, TimeZone};

    async fn new_match(repo: &Repository, day: u32) -> MatchId {
        let start = FixedOffset::east_opt(0)
            .unwrap()
            .with_ymd_and_hms(2025, 6, day, 18, 0, 0)
            .unwrap();
        repo.create_match(&format!("match {}", day), start, false)
            .await
            .unwrap()
    }

    fn record(match_id: MatchId, user: i64, name: &str, points: u32) -> ScoreRecord {
        ScoreRecord {
            match_id,
            participant_id: ParticipantId::new(user),
            display_name: name.to_string(),
            base_points: points,
            points,
            streak_before: 0,
        }
    }

    #[tokio::test]
    async fn test_streak_defaults_to_zero() {
        let (repo, _temp) = temp_repo().await;
        assert_eq!(repo.get_streak(ParticipantId::new(1)).await.unwrap(), 0);

        repo.set_streak(ParticipantId::new(1), 4).await.unwrap();
        repo.set_streak(ParticipantId::new(1), 5).await.unwrap();
        assert_eq!(repo.get_streak(ParticipantId::new(1)).await.unwrap(), 5);
    }

    #[tokio::test]
    async fn test_upsert_score_overwrites() {
        let (repo, _temp) = temp_repo().await;
        let m = new_match(&repo, 1).await;

        repo.upsert_score(&record(m, 1, "ann", 3)).await.unwrap();
        repo.upsert_score(&record(m, 1, "ann", 1)).await.unwrap();

        let scores = repo.scores_for_match(m).await.unwrap();
        assert_eq!(scores.len(), 1);
        assert_eq!(scores[0].points, 1);
    }

    #[tokio::test]
    async fn test_leaderboard_sums_and_orders() {
        let (repo, _temp) = temp_repo().await;
        let m1 = new_match(&repo, 1).await;
        let m2 = new_match(&repo, 2).await;

        repo.upsert_score(&record(m1, 1, "zoe", 3)).await.unwrap();
        repo.upsert_score(&record(m2, 1, "zoe", 1)).await.unwrap();
        repo.upsert_score(&record(m1, 2, "bob", 3)).await.unwrap();
        repo.upsert_score(&record(m2, 2, "bob", 1)).await.unwrap();
        repo.upsert_score(&record(m1, 3, "cat", 6)).await.unwrap();
        repo.upsert_score(&record(m1, 4, "dan", 0)).await.unwrap();

        let board = repo.leaderboard(10).await.unwrap();
        let names: Vec<(&str, i64)> = board
            .iter()
            .map(|r| (r.display_name.as_str(), r.total_points))
            .collect();
        assert_eq!(names, vec![("cat", 6), ("bob", 4), ("zoe", 4), ("dan", 0)]);

        assert_eq!(repo.leaderboard(2).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_leaderboard_uses_latest_display_name() {
        let (repo, _temp) = temp_repo().await;
        let m1 = new_match(&repo, 1).await;
        let m2 = new_match(&repo, 2).await;

        repo.upsert_score(&record(m1, 1, "old name", 3)).await.unwrap();
        repo.upsert_score(&record(m2, 1, "new name", 1)).await.unwrap();

        let board = repo.leaderboard(10).await.unwrap();
        assert_eq!(board.len(), 1);
        assert_eq!(board[0].display_name, "new name");
        assert_eq!(board[0].total_points, 4);
    }

    #[tokio::test]
    async fn test_delete_match_cascades_scores_but_not_streaks() {
        let (repo, _temp) = temp_repo().await;
        let m1 = new_match(&repo, 1).await;
        let m2 = new_match(&repo, 2).await;
        repo.upsert_score(&record(m1, 1, "ann", 3)).await.unwrap();
        repo.upsert_score(&record(m2, 1, "ann", 1)).await.unwrap();
        repo.set_streak(ParticipantId::new(1), 2).await.unwrap();

        assert!(repo.delete_match(m1).await.unwrap());

        let board = repo.leaderboard(10).await.unwrap();
        assert_eq!(board[0].total_points, 1);
        assert_eq!(repo.get_streak(ParticipantId::new(1)).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_result_writer_rolls_back_when_dropped() {
        let (repo, _temp) = temp_repo().await;
        let m = new_match(&repo, 1).await;

        {
            let mut writer = repo.begin_result().await.unwrap();
            writer.set_result(m, Score::new(1, 0)).await.unwrap();
            writer.set_streak(ParticipantId::new(1), 9, m).await.unwrap();
        }

        let found = repo.find_match(m).await.unwrap().unwrap();
        assert!(found.result.is_none());
        assert_eq!(repo.get_streak(ParticipantId::new(1)).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_writer_remembers_last_streak_match() {
        let (repo, _temp) = temp_repo().await;
        let m = new_match(&repo, 1).await;
        let participant = ParticipantId::new(1);

        let mut writer = repo.begin_result().await.unwrap();
        assert_eq!(writer.streak(participant).await.unwrap(), StreakCounter::default());
        writer.set_streak(participant, 2, m).await.unwrap();
        assert_eq!(
            writer.streak(participant).await.unwrap(),
            StreakCounter {
                count: 2,
                last_match: Some(m)
            }
        );
        writer.commit().await.unwrap();

        assert_eq!(repo.get_streak(participant).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_resolved_matches_by_kickoff() {
        let (repo, _temp) = temp_repo().await;
        let later = new_match(&repo, 9).await;
        let earlier = new_match(&repo, 3).await;
        let _unresolved = new_match(&repo, 5).await;
        repo.set_result(later, Score::new(1, 1)).await.unwrap();
        repo.set_result(earlier, Score::new(2, 0)).await.unwrap();

        let mut writer = repo.begin_result().await.unwrap();
        let resolved = writer.resolved_matches_by_kickoff().await.unwrap();
        assert_eq!(
            resolved,
            vec![(earlier, Score::new(2, 0)), (later, Score::new(1, 1))]
        );
    }
}
