//! Final or predicted scoreline and its "H:G" token form.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::str::FromStr;
use thiserror::Error;

/// A scoreline (home goals, away goals).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Score {
    pub home: u32,
    pub away: u32,
}

impl Score {
    pub fn new(home: u32, away: u32) -> Self {
        Score { home, away }
    }

    /// Outcome tendency: `Greater` home win, `Equal` draw, `Less` away win.
    pub fn tendency(&self) -> Ordering {
        self.home.cmp(&self.away)
    }
}

impl std::fmt::Display for Score {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.home, self.away)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScoreParseError {
    #[error("score must look like H:G, got {0:?}")]
    Malformed(String),
    #[error("goal count {0:?} is not a non-negative integer")]
    InvalidGoals(String),
}

impl FromStr for Score {
    type Err = ScoreParseError;

    /// Accepts `2:1` and `2-1`, with optional whitespace around each side.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let (home, away) = trimmed
            .split_once(':')
            .or_else(|| trimmed.split_once('-'))
            .ok_or_else(|| ScoreParseError::Malformed(trimmed.to_string()))?;

        Ok(Score {
            home: parse_goals(home)?,
            away: parse_goals(away)?,
        })
    }
}

fn parse_goals(raw: &str) -> Result<u32, ScoreParseError> {
    let raw = raw.trim();
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ScoreParseError::InvalidGoals(raw.to_string()));
    }
    raw.parse::<u32>()
        .map_err(|_| ScoreParseError::InvalidGoals(raw.to_string()))
}
