use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::prediction::models::{Direction, PredictionType};
use crate::rating::models::{RatingTier, RatingTrend};
use crate::reputation::models::ReputationTier;

/// Window an accuracy board ranks over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Timeframe {
    Weekly,
    Season,
    All,
}

impl Timeframe {
    /// Earliest resolution time included, None for all-time. The season
    /// boundary is the most recent September 1st.
    pub fn cutoff(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match self {
            Timeframe::Weekly => Some(now - Duration::days(7)),
            Timeframe::Season => {
                let year = now.year();
                let sep_first = season_start(year);
                let start = if now >= sep_first {
                    sep_first
                } else {
                    season_start(year - 1)
                };
                Some(start)
            }
            Timeframe::All => None,
        }
    }
}

fn season_start(year: i32) -> DateTime<Utc> {
    // Sep 1 is valid for every year
    NaiveDate::from_ymd_opt(year, 9, 1)
        .unwrap_or_default()
        .and_hms_opt(0, 0, 0)
        .unwrap_or_default()
        .and_utc()
}

/// One row of the accuracy board.
#[derive(Debug, Clone, Serialize)]
pub struct AccuracyRow {
    pub user_id: String,
    pub resolved: u32,
    pub correct: u32,
    /// correct / resolved, rounded to 4 decimals
    pub accuracy: f64,
}

/// One row of the rating board, enriched with the holder's reputation
/// tier for profile rendering.
#[derive(Debug, Clone, Serialize)]
pub struct RatingRow {
    pub user_id: String,
    pub overall: u32,
    pub tier: RatingTier,
    pub trend: RatingTrend,
    pub total_graded: u32,
    pub reputation_tier: Option<ReputationTier>,
}

/// Per-direction tallies of a consensus pass.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DirectionBreakdown {
    pub over: u32,
    pub under: u32,
    /// Percentage of the over side, one decimal
    pub over_pct: f64,
    pub under_pct: f64,
}

/// Rating-weighted tallies: each vote counts `max(1, rating/10)`, so an
/// unrated voter still counts once.
#[derive(Debug, Clone, Default, Serialize)]
pub struct WeightedBreakdown {
    pub over_weight: f64,
    pub under_weight: f64,
    pub over_pct: f64,
    pub under_pct: f64,
}

/// What the highest-rated managers think, reported separately from the
/// crowd so a lopsided public cannot drown them out.
#[derive(Debug, Clone, Serialize)]
pub struct TopManagerAgreement {
    pub raters: u32,
    pub agreeing: u32,
    pub direction: Option<Direction>,
    pub label: String,
}

/// Full consensus report for one (event, subject, type) target.
#[derive(Debug, Clone, Serialize)]
pub struct ConsensusReport {
    pub event_id: String,
    pub subject_id: Option<String>,
    pub prediction_type: PredictionType,
    pub total_votes: u32,
    pub raw: DirectionBreakdown,
    pub weighted: WeightedBreakdown,
    pub top_managers: TopManagerAgreement,
}
