use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::prediction::models::{PredictionStatus, Sport};

/// Activity-feed events emitted as a side effect of the prediction
/// lifecycle. These are facts about things that have already happened;
/// the scoring core never waits on, or fails because of, their delivery.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TimelineEvent {
    /// A user put a new prediction on record for a subject
    PredictionMade {
        prediction_id: Uuid,
        user_id: String,
        subject_id: String,
        sport: Sport,
        event_id: String,
        made_at: DateTime<Utc>,
    },

    /// A prediction reached a terminal verdict
    PredictionResolved {
        prediction_id: Uuid,
        user_id: String,
        subject_id: String,
        status: PredictionStatus,
        resolved_at: DateTime<Utc>,
    },
}

impl TimelineEvent {
    /// The subject entity this event belongs on the timeline of.
    pub fn subject_id(&self) -> &str {
        match self {
            TimelineEvent::PredictionMade { subject_id, .. } => subject_id,
            TimelineEvent::PredictionResolved { subject_id, .. } => subject_id,
        }
    }

    pub fn event_type(&self) -> &'static str {
        match self {
            TimelineEvent::PredictionMade { .. } => "prediction_made",
            TimelineEvent::PredictionResolved { .. } => "prediction_resolved",
        }
    }
}
