use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::domain::{KickoffParseError, MatchId, ParticipantId, ScoreParseError};
use crate::session::SessionError;

/// Errors raised by the game core (repository, scoring, lifecycle).
#[derive(Debug, Error)]
pub enum GameError {
    #[error("Invalid input: {0}")]
    Validation(String),
    #[error("Match {0} not found")]
    MatchNotFound(MatchId),
    #[error("Predictions for match {0} are closed")]
    WindowClosed(MatchId),
    #[error("Participant {participant} already predicted match {match_id}")]
    DuplicatePrediction {
        match_id: MatchId,
        participant: ParticipantId,
    },
    #[error("A match {description:?} starting at {start} already exists")]
    DuplicateMatch { description: String, start: String },
    #[error("Not authorized: {0}")]
    Unauthorized(String),
    #[error(transparent)]
    Db(#[from] sqlx::Error),
}

impl From<ScoreParseError> for GameError {
    fn from(err: ScoreParseError) -> Self {
        GameError::Validation(err.to_string())
    }
}

impl From<KickoffParseError> for GameError {
    fn from(err: KickoffParseError) -> Self {
        GameError::Validation(err.to_string())
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Internal server error: {0}")]
    Internal(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Bad request: {0}")]
    BadRequest(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Forbidden: {0}")]
    Forbidden(String),
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<GameError> for AppError {
    fn from(err: GameError) -> Self {
        match err {
            GameError::Validation(_) => AppError::BadRequest(err.to_string()),
            GameError::MatchNotFound(_) => AppError::NotFound(err.to_string()),
            GameError::WindowClosed(_)
            | GameError::DuplicatePrediction { .. }
            | GameError::DuplicateMatch { .. } => AppError::Conflict(err.to_string()),
            GameError::Unauthorized(_) => AppError::Forbidden(err.to_string()),
            GameError::Db(e) => {
                tracing::error!(error = %e, "Database error");
                AppError::Internal(e.to_string())
            }
        }
    }
}

impl From<SessionError> for AppError {
    fn from(err: SessionError) -> Self {
        AppError::BadRequest(err.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}
