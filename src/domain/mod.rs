//! Domain types for the prediction game.
//!
//! This module provides:
//! - Identifier primitives: MatchId, ParticipantId, ChatId
//! - Scorelines with "H:G" parsing
//! - Match, Prediction and ScoreRecord entities
//! - Start time parsing and reminder payloads

pub mod game;
pub mod kickoff;
pub mod primitives;
pub mod reminder;
pub mod score;

pub use game::{Match, MatchPhase, Prediction, ScoreRecord};
pub use kickoff::{format_start_label, parse_start_time, parse_utc_offset, KickoffParseError};
pub use primitives::{ChatId, MatchId, Participant, ParticipantId};
pub use reminder::{QueuedReminder, Reminder};
pub use score::{Score, ScoreParseError};
