use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;
use tracing::instrument;
use uuid::Uuid;

use super::service::ResolutionSummary;
use super::verdict::{EventOutcome, StandardResolver, Verdict};
use crate::prediction::types::PredictionResponse;
use crate::shared::{AppError, AppState};

#[derive(Debug, Deserialize)]
pub struct ResolvePredictionRequest {
    pub verdict: Verdict,
    pub accuracy_score: Option<f64>,
}

/// HTTP handler for manually resolving one prediction (bold calls and
/// corrections)
///
/// POST /predictions/:id/resolve
#[instrument(name = "resolve_prediction", skip(state, request))]
pub async fn resolve_prediction(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<ResolvePredictionRequest>,
) -> Result<Json<PredictionResponse>, AppError> {
    let resolved = state
        .resolution_service
        .resolve_one(id, request.verdict, request.accuracy_score)
        .await?;
    Ok(Json(resolved.into()))
}

#[derive(Debug, Deserialize)]
pub struct SubjectStat {
    pub subject_id: String,
    pub stat: String,
    pub value: f64,
}

#[derive(Debug, Deserialize)]
pub struct ResolveEventRequest {
    pub winning_side: Option<String>,
    #[serde(default)]
    pub stats: Vec<SubjectStat>,
}

/// HTTP handler for batch-resolving an event once final stats land
///
/// POST /events/:event_id/resolve
#[instrument(name = "resolve_event", skip(state, request))]
pub async fn resolve_event(
    State(state): State<AppState>,
    Path(event_id): Path<String>,
    Json(request): Json<ResolveEventRequest>,
) -> Result<Json<ResolutionSummary>, AppError> {
    let mut outcome = EventOutcome::new(&event_id);
    outcome.winning_side = request.winning_side;
    for entry in request.stats {
        outcome.set_stat(&entry.subject_id, &entry.stat, entry.value);
    }

    let summary = state
        .resolution_service
        .resolve_event(&event_id, &outcome, &StandardResolver)
        .await?;
    Ok(Json(summary))
}
