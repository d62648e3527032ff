//! Result recording: scoring every prediction of a match and advancing streaks.

use super::LifecycleManager;
use crate::config::StreakOrder;
use crate::db::ResultWriter;
use crate::domain::{MatchId, Score, ScoreRecord};
use crate::engine::{score_prediction, Scorer};
use crate::error::GameError;
use tracing::info;

/// Where a participant's incoming streak is read from when scoring a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StreakBaseline {
    /// Reuse the incoming streak stored on an existing score record for this
    /// match, so re-recording a result does not count the match twice. The
    /// live counter only follows if this match was the last to move it.
    Stored,
    /// Always take the live streak counter.
    Live,
}

impl LifecycleManager {
    /// Record a match result and (re)score all of its predictions.
    ///
    /// Runs in one write transaction, so each prediction is scored exactly once
    /// and concurrent calls cannot double-apply streak increments. Calling this
    /// again with the same result produces the same score records.
    ///
    /// # Errors
    /// `MatchNotFound` if the match does not exist.
    pub async fn record_result(
        &self,
        match_id: MatchId,
        result: Score,
    ) -> Result<Vec<ScoreRecord>, GameError> {
        let scorer = self.settings.scorer;
        let mut writer = self.repo.begin_result().await?;
        writer.set_result(match_id, result).await?;

        let replay =
            scorer.tracks_streaks() && self.settings.streak_order == StreakOrder::Chronological;
        let records = if replay {
            replay_by_kickoff(&mut writer, scorer, match_id).await?
        } else {
            score_match(&mut writer, scorer, match_id, result, StreakBaseline::Stored).await?
        };

        writer.commit().await?;

        info!(
            match_id = %match_id,
            result = %result,
            predictions = records.len(),
            "Result recorded"
        );
        Ok(records)
    }
}

async fn score_match(
    writer: &mut ResultWriter,
    scorer: Scorer,
    match_id: MatchId,
    result: Score,
    baseline: StreakBaseline,
) -> Result<Vec<ScoreRecord>, sqlx::Error> {
    let predictions = writer.predictions(match_id).await?;
    let mut records = Vec::with_capacity(predictions.len());

    for prediction in predictions {
        let participant = prediction.participant_id;
        let stored = match baseline {
            StreakBaseline::Stored => writer
                .existing_score(match_id, participant)
                .await?
                .map(|previous| previous.streak_before),
            StreakBaseline::Live => None,
        };
        let live = writer.streak(participant).await?;
        let streak_before = stored.unwrap_or(live.count);

        let base_points = score_prediction(prediction.score, result);
        let outcome = scorer.award(base_points, streak_before);

        // Rescoring an older match leaves streaks built on later matches alone.
        let moves_live = stored.is_none() || live.last_match == Some(match_id);
        if scorer.tracks_streaks() && moves_live {
            writer.set_streak(participant, outcome.streak, match_id).await?;
        }

        let record = ScoreRecord {
            match_id,
            participant_id: participant,
            display_name: prediction.display_name,
            base_points,
            points: outcome.awarded,
            streak_before,
        };
        writer.upsert_score(&record).await?;
        records.push(record);
    }

    Ok(records)
}

/// Rebuild every streak from zero by replaying resolved matches in kickoff order.
/// Returns the records of `target`.
async fn replay_by_kickoff(
    writer: &mut ResultWriter,
    scorer: Scorer,
    target: MatchId,
) -> Result<Vec<ScoreRecord>, sqlx::Error> {
    writer.reset_streaks().await?;

    let mut target_records = Vec::new();
    for (match_id, result) in writer.resolved_matches_by_kickoff().await? {
        let records = score_match(writer, scorer, match_id, result, StreakBaseline::Live).await?;
        if match_id == target {
            target_records = records;
        }
    }
    Ok(target_records)
}
