use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use strum_macros::Display;

use crate::prediction::models::{Claim, Direction, PredictionModel, PredictionStatus};
use crate::shared::AppError;

/// The outcome assigned to a prediction at resolution time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum Verdict {
    Correct,
    Incorrect,
    Push,
    Voided,
}

impl Verdict {
    pub fn status(&self) -> PredictionStatus {
        match self {
            Verdict::Correct => PredictionStatus::Correct,
            Verdict::Incorrect => PredictionStatus::Incorrect,
            Verdict::Push => PredictionStatus::Push,
            Verdict::Voided => PredictionStatus::Voided,
        }
    }

    /// Accuracy score used when the caller does not supply one.
    pub fn default_accuracy(&self) -> f64 {
        match self {
            Verdict::Correct => 1.0,
            _ => 0.0,
        }
    }
}

/// Stats where a smaller number is the better result. For these the
/// over/under comparison flips: beating the line means coming in low.
const LOWER_IS_BETTER_STATS: &[&str] = &["finish_position", "race_time", "golf_strokes"];

pub fn is_lower_better(stat: &str) -> bool {
    LOWER_IS_BETTER_STATS.contains(&stat)
}

/// Which side of a line an actual value landed on. `None` is a push.
pub fn side_of_line(actual: f64, line: f64) -> Option<Direction> {
    if actual > line {
        Some(Direction::Over)
    } else if actual < line {
        Some(Direction::Under)
    } else {
        None
    }
}

/// Grades a benchmark-style claim against an observed value.
///
/// Equality is always a Push regardless of direction; a missing actual
/// (withdrawn player, no data) is Voided, never guessed.
pub fn benchmark_verdict(
    stat: &str,
    direction: Direction,
    line: f64,
    actual: Option<f64>,
) -> Verdict {
    let actual = match actual {
        Some(value) => value,
        None => return Verdict::Voided,
    };

    let raw_side = match side_of_line(actual, line) {
        Some(side) => side,
        None => return Verdict::Push,
    };

    let outcome_side = if is_lower_better(stat) {
        raw_side.opposite()
    } else {
        raw_side
    };

    if outcome_side == direction {
        Verdict::Correct
    } else {
        Verdict::Incorrect
    }
}

/// Grades a directional claim against a prop line's result.
///
/// A pushed line grades referencing predictions as Push with a
/// partial-credit accuracy of 0.5 rather than voiding them.
pub fn verdict_against_line(claimed: Direction, line_side: Option<Direction>) -> (Verdict, f64) {
    match line_side {
        None => (Verdict::Push, 0.5),
        Some(side) if side == claimed => (Verdict::Correct, 1.0),
        Some(_) => (Verdict::Incorrect, 0.0),
    }
}

/// The real-world outcome of one event, as assembled by a batch caller
/// from the performance data source.
#[derive(Debug, Clone, Default)]
pub struct EventOutcome {
    pub event_id: String,
    pub winning_side: Option<String>,
    stats: HashMap<(String, String), f64>,
}

impl EventOutcome {
    pub fn new(event_id: &str) -> Self {
        Self {
            event_id: event_id.to_string(),
            ..Self::default()
        }
    }

    pub fn with_winner(mut self, side: &str) -> Self {
        self.winning_side = Some(side.to_string());
        self
    }

    pub fn set_stat(&mut self, subject_id: &str, stat: &str, value: f64) {
        self.stats
            .insert((subject_id.to_string(), stat.to_string()), value);
    }

    pub fn stat(&self, subject_id: &str, stat: &str) -> Option<f64> {
        self.stats
            .get(&(subject_id.to_string(), stat.to_string()))
            .copied()
    }
}

/// Maps one prediction plus the event's real outcome to a verdict.
/// Batch resolution is generic over this so sport- or type-specific
/// grading rules can be swapped in.
pub trait VerdictResolver: Send + Sync {
    fn verdict(
        &self,
        prediction: &PredictionModel,
        outcome: &EventOutcome,
    ) -> Result<Verdict, AppError>;
}

/// Default grading rules: benchmark/performance claims use the stat
/// comparison, weekly winners match the winning side, bold calls are
/// left for manual grading.
pub struct StandardResolver;

impl VerdictResolver for StandardResolver {
    fn verdict(
        &self,
        prediction: &PredictionModel,
        outcome: &EventOutcome,
    ) -> Result<Verdict, AppError> {
        match &prediction.claim {
            Claim::Benchmark {
                stat,
                direction,
                line,
            } => {
                let actual = prediction
                    .subject_id
                    .as_deref()
                    .and_then(|subject| outcome.stat(subject, stat));
                Ok(benchmark_verdict(stat, *direction, *line, actual))
            }
            Claim::Performance {
                stat,
                direction,
                target,
            } => {
                let actual = prediction
                    .subject_id
                    .as_deref()
                    .and_then(|subject| outcome.stat(subject, stat));
                Ok(benchmark_verdict(stat, *direction, *target, actual))
            }
            Claim::WeeklyWinner { pick } => match &outcome.winning_side {
                Some(winner) if winner == pick => Ok(Verdict::Correct),
                Some(_) => Ok(Verdict::Incorrect),
                None => Ok(Verdict::Voided),
            },
            Claim::BoldCall { .. } => Err(AppError::Validation(
                "Bold calls are graded manually".to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Direction::Over, 75.0, Verdict::Correct)]
    #[case(Direction::Over, 50.0, Verdict::Incorrect)]
    #[case(Direction::Under, 50.0, Verdict::Correct)]
    #[case(Direction::Under, 75.0, Verdict::Incorrect)]
    fn grades_regular_stats(
        #[case] direction: Direction,
        #[case] actual: f64,
        #[case] expected: Verdict,
    ) {
        assert_eq!(
            benchmark_verdict("rush_yards", direction, 60.5, Some(actual)),
            expected
        );
    }

    #[rstest]
    #[case(Direction::Over)]
    #[case(Direction::Under)]
    fn exact_line_is_always_a_push(#[case] direction: Direction) {
        assert_eq!(
            benchmark_verdict("rush_yards", direction, 60.0, Some(60.0)),
            Verdict::Push
        );
    }

    #[test]
    fn missing_actual_is_voided_not_guessed() {
        assert_eq!(
            benchmark_verdict("rush_yards", Direction::Over, 60.5, None),
            Verdict::Voided
        );
    }

    #[rstest]
    // Finishing position: a LOWER actual beats the line, so "over"
    // (outperform) is correct when the actual comes in under the number.
    #[case(Direction::Over, 2.0, Verdict::Correct)]
    #[case(Direction::Over, 8.0, Verdict::Incorrect)]
    #[case(Direction::Under, 8.0, Verdict::Correct)]
    #[case(Direction::Under, 2.0, Verdict::Incorrect)]
    fn lower_is_better_stats_flip_the_comparison(
        #[case] direction: Direction,
        #[case] actual: f64,
        #[case] expected: Verdict,
    ) {
        assert_eq!(
            benchmark_verdict("finish_position", direction, 5.0, Some(actual)),
            expected
        );
    }

    #[test]
    fn pushed_line_gives_partial_credit() {
        let (verdict, accuracy) = verdict_against_line(Direction::Over, None);
        assert_eq!(verdict, Verdict::Push);
        assert_eq!(accuracy, 0.5);
    }

    #[test]
    fn matching_line_side_is_correct() {
        let (verdict, accuracy) = verdict_against_line(Direction::Under, Some(Direction::Under));
        assert_eq!(verdict, Verdict::Correct);
        assert_eq!(accuracy, 1.0);

        let (verdict, accuracy) = verdict_against_line(Direction::Under, Some(Direction::Over));
        assert_eq!(verdict, Verdict::Incorrect);
        assert_eq!(accuracy, 0.0);
    }

    #[test]
    fn default_accuracy_is_one_for_correct_only() {
        assert_eq!(Verdict::Correct.default_accuracy(), 1.0);
        assert_eq!(Verdict::Incorrect.default_accuracy(), 0.0);
        assert_eq!(Verdict::Push.default_accuracy(), 0.0);
        assert_eq!(Verdict::Voided.default_accuracy(), 0.0);
    }
}
