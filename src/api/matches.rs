use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};

use crate::api::auth::{require_privileged, Caller};
use crate::api::AppState;
use crate::domain::{
    format_start_label, Match, MatchId, MatchPhase, Participant, ParticipantId, Prediction, Score,
    ScoreRecord,
};
use crate::error::{AppError, GameError};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchView {
    pub id: MatchId,
    pub description: String,
    pub scheduled_start: DateTime<FixedOffset>,
    /// Kickoff in the deployment's offset, as shown in chat.
    pub start_label: String,
    pub phase: MatchPhase,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Score>,
}

impl MatchView {
    fn new(m: Match, now: DateTime<Utc>, offset: FixedOffset) -> Self {
        let phase = m.phase(now);
        Self {
            id: m.id,
            start_label: format_start_label(&m.scheduled_start.with_timezone(&offset)),
            description: m.description,
            scheduled_start: m.scheduled_start,
            phase,
            result: m.result,
        }
    }
}

fn views(state: &AppState, matches: Vec<Match>) -> Vec<MatchView> {
    let now = state.lifecycle.now();
    let offset = state.lifecycle.settings().utc_offset;
    matches
        .into_iter()
        .map(|m| MatchView::new(m, now, offset))
        .collect()
}

pub async fn list_matches(State(state): State<AppState>) -> Result<Json<Vec<MatchView>>, AppError> {
    let matches = state.lifecycle.list_matches().await?;
    Ok(Json(views(&state, matches)))
}

pub async fn list_open_matches(
    State(state): State<AppState>,
) -> Result<Json<Vec<MatchView>>, AppError> {
    let matches = state.lifecycle.open_matches().await?;
    Ok(Json(views(&state, matches)))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMatchRequest {
    #[serde(flatten)]
    pub caller: Caller,
    pub description: String,
    pub start_time: String,
}

pub async fn create_match(
    State(state): State<AppState>,
    Json(req): Json<CreateMatchRequest>,
) -> Result<(StatusCode, Json<MatchView>), AppError> {
    require_privileged(state.authorizer.as_ref(), req.caller).await?;

    let created = state
        .lifecycle
        .create(req.caller.chat_id, &req.description, &req.start_time)
        .await?;

    let now = state.lifecycle.now();
    let offset = state.lifecycle.settings().utc_offset;
    Ok((StatusCode::CREATED, Json(MatchView::new(created, now, offset))))
}

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub deleted: bool,
}

/// Unknown ids answer `{"deleted": false}` rather than an error.
pub async fn delete_match(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(caller): Query<Caller>,
) -> Result<Json<DeleteResponse>, AppError> {
    require_privileged(state.authorizer.as_ref(), caller).await?;
    let deleted = state.lifecycle.delete(MatchId::new(id)).await?;
    Ok(Json(DeleteResponse { deleted }))
}

pub async fn list_predictions(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Vec<Prediction>>, AppError> {
    let predictions = state.lifecycle.predictions(MatchId::new(id)).await?;
    Ok(Json(predictions))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionRequest {
    pub user_id: ParticipantId,
    pub display_name: String,
    /// "H:G", e.g. "2:1".
    pub score: String,
}

pub async fn submit_prediction(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<PredictionRequest>,
) -> Result<(StatusCode, Json<Prediction>), AppError> {
    let score: Score = req.score.parse().map_err(GameError::from)?;
    let participant = Participant::new(req.user_id, req.display_name);

    let prediction = state
        .lifecycle
        .submit_prediction(MatchId::new(id), &participant, score)
        .await?;
    Ok((StatusCode::CREATED, Json(prediction)))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultRequest {
    #[serde(flatten)]
    pub caller: Caller,
    pub score: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultResponse {
    pub match_id: MatchId,
    pub result: Score,
    pub scores: Vec<ScoreRecord>,
}

pub async fn record_result(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<ResultRequest>,
) -> Result<Json<ResultResponse>, AppError> {
    require_privileged(state.authorizer.as_ref(), req.caller).await?;

    let result: Score = req.score.parse().map_err(GameError::from)?;
    let match_id = MatchId::new(id);
    let scores = state.lifecycle.record_result(match_id, result).await?;

    Ok(Json(ResultResponse {
        match_id,
        result,
        scores,
    }))
}
