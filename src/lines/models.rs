use serde::{Deserialize, Serialize};
use strum_macros::Display;
use uuid::Uuid;

use crate::prediction::models::{Direction, Sport};

/// Which side of a line the actual value landed on once known.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum LineResult {
    Over,
    Under,
    Push,
}

impl LineResult {
    pub fn from_side(side: Option<Direction>) -> Self {
        match side {
            Some(Direction::Over) => LineResult::Over,
            Some(Direction::Under) => LineResult::Under,
            None => LineResult::Push,
        }
    }

    /// The side a referencing prediction must have claimed to be correct.
    pub fn side(&self) -> Option<Direction> {
        match self {
            LineResult::Over => Some(Direction::Over),
            LineResult::Under => Some(Direction::Under),
            LineResult::Push => None,
        }
    }
}

/// A generated benchmark line for one (sport, season, week, subject,
/// stat). Predictions reference it through `event_id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PropLine {
    pub id: Uuid,
    pub sport: Sport,
    pub season: u16,
    pub week: u8,
    pub subject_id: String,
    pub stat: String,
    /// Rounded to the nearest 0.5
    pub line: f64,
    /// Generation method tag, e.g. "ewma-0.9/last-10"
    pub method: String,
    pub result: Option<LineResult>,
    pub actual: Option<f64>,
    /// Join key predictions target; also the key actuals are fetched by
    pub event_id: String,
}

impl PropLine {
    /// Deterministic event key for a weekly line target. Includes the
    /// stat so each line grades only its own referencing predictions.
    pub fn event_key(sport: Sport, season: u16, week: u8, subject_id: &str, stat: &str) -> String {
        format!("{}-{}-w{}-{}-{}", sport, season, week, subject_id, stat)
    }
}
