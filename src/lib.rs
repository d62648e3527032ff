pub mod api;
pub mod clock;
pub mod config;
pub mod db;
pub mod domain;
pub mod engine;
pub mod error;
pub mod gateway;
pub mod leaderboard;
pub mod lifecycle;
pub mod session;

pub use clock::{Clock, FixedClock, SystemClock};
pub use config::Config;
pub use db::{init_db, Repository};
pub use domain::{ChatId, Match, MatchId, Participant, ParticipantId, Prediction, Score, ScoreRecord};
pub use error::{AppError, GameError};
pub use leaderboard::Leaderboard;
pub use lifecycle::{GameSettings, LifecycleManager};
pub use session::SessionStore;
