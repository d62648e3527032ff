use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;

use crate::api::AppState;
use crate::error::AppError;
use crate::leaderboard::Standing;

const MAX_LIMIT: usize = 500;

#[derive(Debug, Deserialize)]
pub struct LeaderboardQuery {
    pub limit: Option<usize>,
}

pub async fn get_leaderboard(
    Query(params): Query<LeaderboardQuery>,
    State(state): State<AppState>,
) -> Result<Json<Vec<Standing>>, AppError> {
    if let Some(limit) = params.limit {
        if limit > MAX_LIMIT {
            return Err(AppError::BadRequest(format!(
                "limit must be <= {}",
                MAX_LIMIT
            )));
        }
    }

    let standings = state.leaderboard.top(params.limit).await?;
    Ok(Json(standings))
}
