use crate::domain::Score;

/// Points for predicting the exact scoreline.
pub const EXACT_POINTS: u32 = 3;
/// Points for predicting the right outcome (home win, draw, away win).
pub const TENDENCY_POINTS: u32 = 1;

/// Base points for a prediction against the actual result: 3, 1 or 0.
pub fn base_points(
    predicted_home: u32,
    predicted_away: u32,
    actual_home: u32,
    actual_away: u32,
) -> u32 {
    score_prediction(
        Score::new(predicted_home, predicted_away),
        Score::new(actual_home, actual_away),
    )
}

/// Same as [`base_points`] over scorelines.
pub fn score_prediction(predicted: Score, actual: Score) -> u32 {
    if predicted == actual {
        EXACT_POINTS
    } else if predicted.tendency() == actual.tendency() {
        TENDENCY_POINTS
    } else {
        0
    }
}
