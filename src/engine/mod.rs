//! Pure computation engine for prediction scoring. No I/O.

pub mod scoring;
pub mod streak;

pub use scoring::{base_points, score_prediction, EXACT_POINTS, TENDENCY_POINTS};
pub use streak::{apply_streak, Scorer, StreakOutcome, StreakRule, STREAK_MULTIPLIER};
