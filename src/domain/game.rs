//! Match, prediction and score record entities.

use crate::domain::{MatchId, ParticipantId, Score};
use chrono::{DateTime, FixedOffset, Utc};
use serde::Serialize;

/// A scheduled contest that participants predict.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Match {
    pub id: MatchId,
    pub description: String,
    /// Kickoff. Predictions are accepted strictly before this instant.
    pub scheduled_start: DateTime<FixedOffset>,
    pub result: Option<Score>,
}

/// Where a match stands relative to a given instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchPhase {
    /// No result yet and `now < scheduled_start`.
    Open,
    /// No result yet and `now >= scheduled_start`.
    Closed,
    /// A result has been recorded.
    Resolved,
}

impl Match {
    pub fn phase(&self, now: DateTime<Utc>) -> MatchPhase {
        if self.result.is_some() {
            MatchPhase::Resolved
        } else if now < self.scheduled_start {
            MatchPhase::Open
        } else {
            MatchPhase::Closed
        }
    }

    /// True only in the `Open` phase: before kickoff and with no result.
    pub fn accepts_predictions(&self, now: DateTime<Utc>) -> bool {
        self.result.is_none() && now < self.scheduled_start
    }
}

/// A participant's guess for one match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Prediction {
    pub match_id: MatchId,
    pub participant_id: ParticipantId,
    pub display_name: String,
    pub score: Score,
}

/// Points awarded to one participant for one resolved match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreRecord {
    pub match_id: MatchId,
    pub participant_id: ParticipantId,
    pub display_name: String,
    /// Points before the streak multiplier.
    pub base_points: u32,
    pub points: u32,
    /// Streak the participant carried into this match.
    pub streak_before: u32,
}
