use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::Display;

/// Rating tier buckets, ascending.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum RatingTier {
    Developing,
    Average,
    Solid,
    Sharp,
    Expert,
    Elite,
}

/// Direction of movement since the previously stored rating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum RatingTrend {
    Up,
    Down,
    Stable,
}

/// One user's composite 0-100 rating. `overall` and the components stay
/// null until the user clears the minimum-sample gate; the row still
/// exists so callers can show progress toward it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClutchRating {
    pub user_id: String,
    pub overall: Option<u32>,
    pub accuracy: Option<u32>,
    pub consistency: Option<u32>,
    pub volume: Option<u32>,
    pub breadth: Option<u32>,
    pub tier: RatingTier,
    pub trend: RatingTrend,
    pub total_graded: u32,
    /// Snapshot of the raw inputs the components were derived from
    pub inputs: serde_json::Value,
    pub updated_at: DateTime<Utc>,
}

impl ClutchRating {
    /// Row for a user still below the minimum-sample gate.
    pub fn ungated(user_id: &str, total_graded: u32, required: u32) -> Self {
        Self {
            user_id: user_id.to_string(),
            overall: None,
            accuracy: None,
            consistency: None,
            volume: None,
            breadth: None,
            tier: RatingTier::Developing,
            trend: RatingTrend::Stable,
            total_graded,
            inputs: serde_json::json!({
                "graded": total_graded,
                "required": required,
            }),
            updated_at: Utc::now(),
        }
    }
}
