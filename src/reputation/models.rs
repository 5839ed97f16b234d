use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::Display;

use crate::prediction::models::Sport;

/// The slice of a user's history a reputation row covers: one sport, or
/// the synthetic all-sports aggregate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SportScope {
    All,
    #[serde(untagged)]
    Sport(Sport),
}

impl SportScope {
    pub fn sport(&self) -> Option<Sport> {
        match self {
            SportScope::All => None,
            SportScope::Sport(sport) => Some(*sport),
        }
    }

    /// Storage key for this scope.
    pub fn key(&self) -> String {
        match self {
            SportScope::All => "all".to_string(),
            SportScope::Sport(sport) => sport.to_string(),
        }
    }
}

impl std::fmt::Display for SportScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.key())
    }
}

/// Reputation tier buckets, ascending.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ReputationTier {
    Rookie,
    Contender,
    Sharp,
    Expert,
    Elite,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum BadgeTier {
    Bronze,
    Silver,
    Gold,
    Platinum,
}

/// Typed achievement keys. A badge is idempotent by kind: the same
/// history always yields the same badge set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum BadgeKind {
    HotStreak,
    Volume,
    Sharpshooter,
    UpsetCaller,
    BoldAndRight,
    IronPredictor,
}

impl BadgeKind {
    pub fn display_name(&self) -> &'static str {
        match self {
            BadgeKind::HotStreak => "Hot Streak",
            BadgeKind::Volume => "Workhorse",
            BadgeKind::Sharpshooter => "Sharpshooter",
            BadgeKind::UpsetCaller => "Upset Caller",
            BadgeKind::BoldAndRight => "Bold & Right",
            BadgeKind::IronPredictor => "Iron Predictor",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Badge {
    pub kind: BadgeKind,
    pub name: String,
    pub tier: BadgeTier,
    pub earned_at: DateTime<Utc>,
}

impl Badge {
    pub fn new(kind: BadgeKind, tier: BadgeTier, earned_at: DateTime<Utc>) -> Self {
        Self {
            kind,
            name: kind.display_name().to_string(),
            tier,
            earned_at,
        }
    }
}

/// One user's track record within a scope. A pure cache over the
/// prediction store, rebuilt wholesale on every update.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserReputation {
    pub user_id: String,
    pub scope: SportScope,
    pub total: u32,
    pub correct: u32,
    /// correct / total, rounded to 4 decimals
    pub accuracy: f64,
    pub current_streak: u32,
    pub best_streak: u32,
    /// Accuracy with each call weighted by self-reported confidence
    pub weighted_accuracy: f64,
    pub tier: ReputationTier,
    pub badges: Vec<Badge>,
    pub updated_at: DateTime<Utc>,
}

impl UserReputation {
    pub fn empty(user_id: &str, scope: SportScope) -> Self {
        Self {
            user_id: user_id.to_string(),
            scope,
            total: 0,
            correct: 0,
            accuracy: 0.0,
            current_streak: 0,
            best_streak: 0,
            weighted_accuracy: 0.0,
            tier: ReputationTier::Rookie,
            badges: Vec::new(),
            updated_at: Utc::now(),
        }
    }
}
