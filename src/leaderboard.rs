//! Read-only ranking of participants by accumulated points.

use crate::db::Repository;
use crate::domain::ParticipantId;
use serde::Serialize;
use std::sync::Arc;

pub const DEFAULT_LIMIT: usize = 20;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Standing {
    pub rank: i64,
    pub participant_id: ParticipantId,
    pub display_name: String,
    pub total_points: i64,
}

#[derive(Clone)]
pub struct Leaderboard {
    repo: Arc<Repository>,
    default_limit: usize,
}

impl Leaderboard {
    pub fn new(repo: Arc<Repository>, default_limit: usize) -> Self {
        Self {
            repo,
            default_limit,
        }
    }

    /// Top `limit` participants (the configured default when `None`).
    ///
    /// Ordered by total points descending, then display name, then id.
    pub async fn top(&self, limit: Option<usize>) -> Result<Vec<Standing>, sqlx::Error> {
        let limit = limit.unwrap_or(self.default_limit);
        if limit == 0 {
            return Ok(Vec::new());
        }

        let rows = self.repo.leaderboard(limit).await?;
        Ok(rows
            .into_iter()
            .enumerate()
            .map(|(idx, row)| Standing {
                rank: (idx + 1) as i64,
                participant_id: row.participant_id,
                display_name: row.display_name,
                total_points: row.total_points,
            })
            .collect())
    }
}
