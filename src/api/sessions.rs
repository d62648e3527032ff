//! Two-step prediction flow: pick an open match, then send a score.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::api::auth::Caller;
use crate::api::AppState;
use crate::domain::{MatchId, Participant, Prediction, Score};
use crate::error::{AppError, GameError};
use crate::session::SessionKey;

impl From<Caller> for SessionKey {
    fn from(caller: Caller) -> Self {
        SessionKey::new(caller.chat_id, caller.user_id)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectRequest {
    #[serde(flatten)]
    pub caller: Caller,
    pub match_id: MatchId,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectResponse {
    pub match_id: MatchId,
    pub description: String,
    pub expires_at: DateTime<Utc>,
}

/// Only open matches can be picked.
pub async fn select_match(
    State(state): State<AppState>,
    Json(req): Json<SelectRequest>,
) -> Result<(StatusCode, Json<SelectResponse>), AppError> {
    let now = state.lifecycle.now();
    let picked = state.lifecycle.find_match(req.match_id).await?;
    if !picked.accepts_predictions(now) {
        return Err(GameError::WindowClosed(picked.id).into());
    }

    let pending = state
        .sessions
        .select(req.caller.into(), picked.id, now)
        .await;

    Ok((
        StatusCode::CREATED,
        Json(SelectResponse {
            match_id: picked.id,
            description: picked.description,
            expires_at: pending.expires_at,
        }),
    ))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreRequest {
    #[serde(flatten)]
    pub caller: Caller,
    pub display_name: String,
    pub score: String,
}

/// A malformed score leaves the pick in place so the user can resend.
pub async fn submit_score(
    State(state): State<AppState>,
    Json(req): Json<ScoreRequest>,
) -> Result<(StatusCode, Json<Prediction>), AppError> {
    let now = state.lifecycle.now();
    let key = SessionKey::from(req.caller);

    state.sessions.current(key, now).await?;
    let score: Score = req.score.parse().map_err(GameError::from)?;

    let match_id = state.sessions.complete(key, now).await?;
    let participant = Participant::new(req.caller.user_id, req.display_name);
    let prediction = state
        .lifecycle
        .submit_prediction(match_id, &participant, score)
        .await?;

    Ok((StatusCode::CREATED, Json(prediction)))
}

#[derive(Debug, Serialize)]
pub struct CancelResponse {
    pub cancelled: bool,
}

pub async fn cancel(
    State(state): State<AppState>,
    Query(caller): Query<Caller>,
) -> Json<CancelResponse> {
    let cancelled = state.sessions.cancel(caller.into()).await;
    Json(CancelResponse { cancelled })
}
