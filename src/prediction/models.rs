use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};
use uuid::Uuid;

/// Sports the service accepts predictions for.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Display,
    EnumString, EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Sport {
    Nfl,
    Nba,
    Mlb,
    Nhl,
}

/// The fixed set of prediction types.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Display,
    EnumString, EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PredictionType {
    /// A call on a player's own performance against a target value
    Performance,
    /// An over/under call against a published or generated line
    Benchmark,
    /// Picking the winning side of a weekly matchup
    WeeklyWinner,
    /// A long-shot call with free-form reasoning
    BoldCall,
}

/// Which side of a line or matchup the claim takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Direction {
    Over,
    Under,
}

impl Direction {
    pub fn opposite(&self) -> Direction {
        match self {
            Direction::Over => Direction::Under,
            Direction::Under => Direction::Over,
        }
    }
}

/// Author-supplied conviction level. Weights feed the confidence-weighted
/// accuracy stat; unstated confidence counts as Medium.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Confidence {
    Low,
    Medium,
    High,
}

impl Confidence {
    pub fn weight(&self) -> f64 {
        match self {
            Confidence::High => 1.5,
            Confidence::Medium => 1.0,
            Confidence::Low => 0.75,
        }
    }
}

/// Lifecycle state of a prediction. Pending is the only non-terminal state;
/// a terminal state is never re-entered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum PredictionStatus {
    Pending,
    Correct,
    Incorrect,
    Push,
    Voided,
}

impl PredictionStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, PredictionStatus::Pending)
    }

    /// Only graded outcomes move reputation; Push and Voided do not.
    pub fn affects_reputation(&self) -> bool {
        matches!(self, PredictionStatus::Correct | PredictionStatus::Incorrect)
    }
}

/// The structured claim payload, tagged by prediction type so resolver
/// logic can match exhaustively instead of probing an untyped blob.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Claim {
    Performance {
        stat: String,
        direction: Direction,
        target: f64,
    },
    Benchmark {
        stat: String,
        direction: Direction,
        line: f64,
    },
    WeeklyWinner {
        pick: String,
    },
    BoldCall {
        direction: Direction,
        description: String,
    },
}

impl Claim {
    /// The prediction type this claim shape belongs to.
    pub fn prediction_type(&self) -> PredictionType {
        match self {
            Claim::Performance { .. } => PredictionType::Performance,
            Claim::Benchmark { .. } => PredictionType::Benchmark,
            Claim::WeeklyWinner { .. } => PredictionType::WeeklyWinner,
            Claim::BoldCall { .. } => PredictionType::BoldCall,
        }
    }

    /// The claimed direction, for types that take a side of a line.
    pub fn direction(&self) -> Option<Direction> {
        match self {
            Claim::Performance { direction, .. } => Some(*direction),
            Claim::Benchmark { direction, .. } => Some(*direction),
            Claim::BoldCall { direction, .. } => Some(*direction),
            Claim::WeeklyWinner { .. } => None,
        }
    }

    /// The claimed numeric benchmark, where one exists.
    pub fn benchmark_value(&self) -> Option<f64> {
        match self {
            Claim::Performance { target, .. } => Some(*target),
            Claim::Benchmark { line, .. } => Some(*line),
            _ => None,
        }
    }

    /// The stat category the claim is about, where one exists.
    pub fn stat(&self) -> Option<&str> {
        match self {
            Claim::Performance { stat, .. } => Some(stat),
            Claim::Benchmark { stat, .. } => Some(stat),
            _ => None,
        }
    }
}

/// A user's claim about a future sporting outcome, as stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionModel {
    pub id: Uuid,
    pub user_id: String,
    pub sport: Sport,
    pub prediction_type: PredictionType,
    pub category: String,
    pub event_id: String,
    pub subject_id: Option<String>,
    pub league_id: Option<String>,
    pub claim: Claim,
    pub is_public: bool,
    pub locks_at: DateTime<Utc>,
    pub status: PredictionStatus,
    pub accuracy_score: Option<f64>,
    pub rationale: Option<String>,
    pub confidence: Option<Confidence>,
    pub created_at: DateTime<Utc>,
    pub resolved_at: Option<DateTime<Utc>>,
}

impl PredictionModel {
    pub fn is_pending(&self) -> bool {
        self.status == PredictionStatus::Pending
    }

    pub fn is_locked(&self, now: DateTime<Utc>) -> bool {
        now >= self.locks_at
    }

    /// Weight applied to this prediction in confidence-weighted accuracy.
    pub fn confidence_weight(&self) -> f64 {
        self.confidence.unwrap_or(Confidence::Medium).weight()
    }

    /// The timestamp used for recency weighting: resolution time, falling
    /// back to creation time when the resolution timestamp is missing.
    pub fn graded_at(&self) -> DateTime<Utc> {
        self.resolved_at.unwrap_or(self.created_at)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn claim_reports_its_prediction_type() {
        let claim = Claim::Benchmark {
            stat: "rush_yards".to_string(),
            direction: Direction::Over,
            line: 62.5,
        };
        assert_eq!(claim.prediction_type(), PredictionType::Benchmark);
        assert_eq!(claim.direction(), Some(Direction::Over));
        assert_eq!(claim.benchmark_value(), Some(62.5));
        assert_eq!(claim.stat(), Some("rush_yards"));
    }

    #[test]
    fn weekly_winner_has_no_direction() {
        let claim = Claim::WeeklyWinner {
            pick: "home".to_string(),
        };
        assert_eq!(claim.direction(), None);
        assert_eq!(claim.benchmark_value(), None);
    }

    #[test]
    fn confidence_weights_match_tiers() {
        assert_eq!(Confidence::High.weight(), 1.5);
        assert_eq!(Confidence::Medium.weight(), 1.0);
        assert_eq!(Confidence::Low.weight(), 0.75);
    }

    #[test]
    fn terminal_states_exclude_pending() {
        assert!(!PredictionStatus::Pending.is_terminal());
        assert!(PredictionStatus::Correct.is_terminal());
        assert!(PredictionStatus::Voided.is_terminal());
    }

    #[test]
    fn push_and_voided_do_not_affect_reputation() {
        assert!(PredictionStatus::Correct.affects_reputation());
        assert!(PredictionStatus::Incorrect.affects_reputation());
        assert!(!PredictionStatus::Push.affects_reputation());
        assert!(!PredictionStatus::Voided.affects_reputation());
    }

    #[test]
    fn sport_round_trips_through_strings() {
        assert_eq!(Sport::from_str("nfl").unwrap(), Sport::Nfl);
        assert_eq!(Sport::Nba.to_string(), "nba");
    }

    #[test]
    fn claim_serializes_with_kind_tag() {
        let claim = Claim::BoldCall {
            direction: Direction::Over,
            description: "rookie outscores the starter".to_string(),
        };
        let json = serde_json::to_value(&claim).unwrap();
        assert_eq!(json["kind"], "bold_call");
        assert_eq!(json["direction"], "over");
    }
}
