use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::models::{Claim, Confidence, PredictionModel, PredictionStatus, PredictionType, Sport};

/// Request body for submitting a prediction. The prediction type is
/// derived from the claim's tagged shape, so a claim can never disagree
/// with its type.
#[derive(Debug, Clone, Deserialize)]
pub struct SubmitPredictionRequest {
    pub user_id: String,
    pub sport: Sport,
    pub event_id: String,
    #[serde(default)]
    pub subject_id: Option<String>,
    #[serde(default)]
    pub league_id: Option<String>,
    pub claim: Claim,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default = "default_public")]
    pub is_public: bool,
    #[serde(default)]
    pub locks_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub rationale: Option<String>,
    #[serde(default)]
    pub confidence: Option<Confidence>,
}

fn default_public() -> bool {
    true
}

/// Request body for editing a still-open prediction. Only claim details,
/// rationale, confidence and visibility may change; the target tuple
/// (event, subject, type) is fixed at submission.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdatePredictionRequest {
    pub user_id: String,
    #[serde(default)]
    pub claim: Option<Claim>,
    #[serde(default)]
    pub rationale: Option<String>,
    #[serde(default)]
    pub confidence: Option<Confidence>,
    #[serde(default)]
    pub is_public: Option<bool>,
}

/// Request body for deleting a pending prediction
#[derive(Debug, Clone, Deserialize)]
pub struct DeletePredictionRequest {
    pub user_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionResponse {
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

impl From<PredictionModel> for PredictionResponse {
    fn from(model: PredictionModel) -> Self {
        Self {
            id: model.id,
            user_id: model.user_id,
            sport: model.sport,
            prediction_type: model.prediction_type,
            category: model.category,
            event_id: model.event_id,
            subject_id: model.subject_id,
            league_id: model.league_id,
            claim: model.claim,
            is_public: model.is_public,
            locks_at: model.locks_at,
            status: model.status,
            accuracy_score: model.accuracy_score,
            rationale: model.rationale,
            confidence: model.confidence,
            created_at: model.created_at,
            resolved_at: model.resolved_at,
        }
    }
}
