use super::GameSettings;
use crate::clock::Clock;
use crate::db::Repository;
use crate::domain::{
    format_start_label, parse_start_time, ChatId, Match, MatchId, Participant, Prediction,
    Reminder, Score, ScoreRecord,
};
use crate::error::GameError;
use crate::gateway::ReminderScheduler;
use chrono::{DateTime, FixedOffset, Utc};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Owns the write path for matches and predictions.
///
/// Authorization is the caller's job: privileged operations (`create`,
/// `record_result`, `delete`) assume the caller already passed the check.
#[derive(Clone)]
pub struct LifecycleManager {
    pub(super) repo: Arc<Repository>,
    scheduler: Arc<dyn ReminderScheduler>,
    clock: Arc<dyn Clock>,
    pub(super) settings: GameSettings,
}

impl LifecycleManager {
    pub fn new(
        repo: Arc<Repository>,
        scheduler: Arc<dyn ReminderScheduler>,
        clock: Arc<dyn Clock>,
        settings: GameSettings,
    ) -> Self {
        Self {
            repo,
            scheduler,
            clock,
            settings,
        }
    }

    pub fn settings(&self) -> &GameSettings {
        &self.settings
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Create a match from a textual start time and queue its kickoff reminder.
    ///
    /// # Errors
    /// `Validation` for an unparseable start or empty description,
    /// `DuplicateMatch` when duplicate detection is enabled.
    pub async fn create(
        &self,
        chat: ChatId,
        description: &str,
        start_time: &str,
    ) -> Result<Match, GameError> {
        let scheduled_start = parse_start_time(start_time, self.settings.utc_offset)?;
        self.create_at(chat, description, scheduled_start).await
    }

    pub async fn create_at(
        &self,
        chat: ChatId,
        description: &str,
        scheduled_start: DateTime<FixedOffset>,
    ) -> Result<Match, GameError> {
        let id = self
            .repo
            .create_match(
                description,
                scheduled_start,
                self.settings.reject_duplicate_matches,
            )
            .await?;

        let created = Match {
            id,
            description: description.trim().to_string(),
            scheduled_start,
            result: None,
        };
        info!(match_id = %id, start = %scheduled_start, "Match created");

        self.schedule_reminder(chat, &created).await;
        Ok(created)
    }

    /// Queue the kickoff reminder. A fire time already in the past is skipped,
    /// and scheduling failures never fail match creation.
    async fn schedule_reminder(&self, chat: ChatId, created: &Match) {
        let fire_at = created.scheduled_start.with_timezone(&Utc) - self.settings.reminder_lead;
        if fire_at <= self.clock.now() {
            debug!(match_id = %created.id, fire_at = %fire_at, "Reminder time already passed");
            return;
        }

        let local_start = created.scheduled_start.with_timezone(&self.settings.utc_offset);
        let reminder = Reminder {
            chat_id: chat,
            match_id: created.id,
            fire_at,
            description: created.description.clone(),
            start_label: format_start_label(&local_start),
        };

        if let Err(e) = self.scheduler.schedule(reminder).await {
            warn!(match_id = %created.id, error = %e, "Failed to schedule reminder");
        }
    }

    /// Accept a participant's prediction while the match is open.
    ///
    /// # Errors
    /// `MatchNotFound`, `WindowClosed`, `DuplicatePrediction` (one-shot policy),
    /// or `Validation` for an empty display name.
    pub async fn submit_prediction(
        &self,
        match_id: MatchId,
        participant: &Participant,
        score: Score,
    ) -> Result<Prediction, GameError> {
        let display_name = participant.display_name.trim();
        if display_name.is_empty() {
            return Err(GameError::Validation(
                "display name must not be empty".to_string(),
            ));
        }

        let prediction = Prediction {
            match_id,
            participant_id: participant.id,
            display_name: display_name.to_string(),
            score,
        };

        self.repo
            .record_prediction(&prediction, self.clock.now(), self.settings.prediction_policy)
            .await?;

        info!(
            match_id = %match_id,
            participant = %participant.id,
            score = %score,
            "Prediction accepted"
        );
        Ok(prediction)
    }

    /// Delete a match and everything scored on it. Streaks are left as they are.
    ///
    /// Returns `false` for an unknown id.
    pub async fn delete(&self, match_id: MatchId) -> Result<bool, GameError> {
        let deleted = self.repo.delete_match(match_id).await?;
        if deleted {
            info!(match_id = %match_id, "Match deleted");
        } else {
            debug!(match_id = %match_id, "Delete requested for unknown match");
        }
        Ok(deleted)
    }

    pub async fn find_match(&self, match_id: MatchId) -> Result<Match, GameError> {
        self.repo
            .find_match(match_id)
            .await?
            .ok_or(GameError::MatchNotFound(match_id))
    }

    pub async fn list_matches(&self) -> Result<Vec<Match>, GameError> {
        Ok(self.repo.list_matches().await?)
    }

    /// Matches still accepting predictions, earliest kickoff first.
    pub async fn open_matches(&self) -> Result<Vec<Match>, GameError> {
        Ok(self.repo.list_open_matches(self.clock.now()).await?)
    }

    pub async fn predictions(&self, match_id: MatchId) -> Result<Vec<Prediction>, GameError> {
        self.find_match(match_id).await?;
        Ok(self.repo.list_predictions(match_id).await?)
    }

    pub async fn scores(&self, match_id: MatchId) -> Result<Vec<ScoreRecord>, GameError> {
        self.find_match(match_id).await?;
        Ok(self.repo.scores_for_match(match_id).await?)
    }
}
