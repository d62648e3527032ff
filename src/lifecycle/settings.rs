use crate::config::{Config, PredictionPolicy, StreakMode, StreakOrder};
use crate::engine::{Scorer, StreakRule};
use chrono::{Duration, FixedOffset, Offset, Utc};

/// Game rules a deployment can choose, extracted from [`Config`].
#[derive(Debug, Clone, Copy)]
pub struct GameSettings {
    pub prediction_policy: PredictionPolicy,
    pub scorer: Scorer,
    pub streak_order: StreakOrder,
    pub reminder_lead: Duration,
    /// Offset for start times given without one, and for reminder labels.
    pub utc_offset: FixedOffset,
    pub reject_duplicate_matches: bool,
}

impl GameSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            prediction_policy: config.prediction_policy,
            scorer: Scorer::new(
                config.streak_mode,
                StreakRule::new(config.streak_bonus_threshold),
            ),
            streak_order: config.streak_order,
            reminder_lead: Duration::minutes(config.reminder_lead_minutes),
            utc_offset: config.utc_offset,
            reject_duplicate_matches: config.reject_duplicate_matches,
        }
    }
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            prediction_policy: PredictionPolicy::OneShot,
            scorer: Scorer::new(StreakMode::Bonus, StreakRule::default()),
            streak_order: StreakOrder::Recorded,
            reminder_lead: Duration::minutes(30),
            utc_offset: Utc.fix(),
            reject_duplicate_matches: false,
        }
    }
}
