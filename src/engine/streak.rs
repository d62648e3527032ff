//! Streak transform: consecutive scoring predictions earn a multiplier.

use crate::config::StreakMode;

/// Multiplier applied once a streak reaches the threshold. Never grows beyond this.
pub const STREAK_MULTIPLIER: u32 = 2;

/// Streak length at which the multiplier starts, unless configured otherwise.
pub const DEFAULT_STREAK_THRESHOLD: u32 = 3;

/// Result of feeding one match outcome through the streak transform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreakOutcome {
    pub awarded: u32,
    pub streak: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreakRule {
    pub threshold: u32,
}

impl Default for StreakRule {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_STREAK_THRESHOLD,
        }
    }
}

impl StreakRule {
    pub fn new(threshold: u32) -> Self {
        Self { threshold }
    }

    pub fn apply(&self, base_points: u32, previous_streak: u32) -> StreakOutcome {
        if base_points == 0 {
            return StreakOutcome {
                awarded: 0,
                streak: 0,
            };
        }

        let streak = previous_streak.saturating_add(1);
        let multiplier = if streak >= self.threshold {
            STREAK_MULTIPLIER
        } else {
            1
        };

        StreakOutcome {
            awarded: base_points * multiplier,
            streak,
        }
    }
}

/// Apply the default rule: returns `(awarded_points, new_streak)`.
pub fn apply_streak(base_points: u32, previous_streak: u32) -> (u32, u32) {
    let outcome = StreakRule::default().apply(base_points, previous_streak);
    (outcome.awarded, outcome.streak)
}

/// Turns base points into awarded points according to the deployment's streak mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scorer {
    pub mode: StreakMode,
    pub rule: StreakRule,
}

impl Scorer {
    pub fn new(mode: StreakMode, rule: StreakRule) -> Self {
        Self { mode, rule }
    }

    pub fn tracks_streaks(&self) -> bool {
        self.mode == StreakMode::Bonus
    }

    /// With streaks off the previous streak is passed through untouched.
    pub fn award(&self, base_points: u32, previous_streak: u32) -> StreakOutcome {
        match self.mode {
            StreakMode::Bonus => self.rule.apply(base_points, previous_streak),
            StreakMode::Off => StreakOutcome {
                awarded: base_points,
                streak: previous_streak,
            },
        }
    }
}

impl Default for Scorer {
    fn default() -> Self {
        Self::new(StreakMode::Bonus, StreakRule::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(rule: StreakRule, bases: &[u32]) -> (Vec<u32>, Vec<u32>) {
        let mut streak = 0;
        let mut streaks = Vec::new();
        let mut awarded = Vec::new();
        for &base in bases {
            let outcome = rule.apply(base, streak);
            streak = outcome.streak;
            streaks.push(outcome.streak);
            awarded.push(outcome.awarded);
        }
        (streaks, awarded)
    }

    #[test]
    fn test_mixed_sequence_default_threshold() {
        let (streaks, awarded) = run(StreakRule::default(), &[3, 1, 0, 3, 3]);
        assert_eq!(streaks, vec![1, 2, 0, 1, 2]);
        assert_eq!(awarded, vec![3, 1, 0, 3, 3]);
    }

    #[test]
    fn test_long_run_default_threshold() {
        let (streaks, awarded) = run(StreakRule::default(), &[1, 1, 1, 1]);
        assert_eq!(streaks, vec![1, 2, 3, 4]);
        assert_eq!(awarded, vec![1, 1, 2, 2]);
    }

    #[test]
    fn test_threshold_two_sequences() {
        let rule = StreakRule::new(2);
        let (streaks, awarded) = run(rule, &[3, 1, 0, 3, 3]);
        assert_eq!(streaks, vec![1, 2, 0, 1, 2]);
        assert_eq!(awarded, vec![3, 2, 0, 3, 6]);

        let (_, awarded) = run(rule, &[1, 1, 1, 1]);
        assert_eq!(awarded, vec![1, 2, 2, 2]);
    }

    #[test]
    fn test_multiplier_capped() {
        let (awarded, streak) = apply_streak(3, 40);
        assert_eq!(streak, 41);
        assert_eq!(awarded, 6);
    }

    #[test]
    fn test_miss_resets() {
        assert_eq!(apply_streak(0, 7), (0, 0));
    }

    #[test]
    fn test_scorer_off_passes_base_through() {
        let scorer = Scorer::new(StreakMode::Off, StreakRule::default());
        let outcome = scorer.award(3, 5);
        assert_eq!(outcome.awarded, 3);
        assert_eq!(outcome.streak, 5);
        assert!(!scorer.tracks_streaks());
    }
}
