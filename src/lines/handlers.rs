use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use tracing::instrument;

use super::generator::LineWeekSummary;
use super::models::PropLine;
use crate::prediction::models::Sport;
use crate::shared::{AppError, AppState};

#[derive(Debug, Deserialize)]
pub struct WeekQuery {
    pub sport: Sport,
    pub season: u16,
    pub week: u8,
}

/// HTTP handler for the weekly line generation job
///
/// POST /lines/generate?sport=nfl&season=2025&week=5
#[instrument(name = "generate_lines", skip(state))]
pub async fn generate_lines(
    State(state): State<AppState>,
    Query(query): Query<WeekQuery>,
) -> Result<Json<Vec<PropLine>>, AppError> {
    let lines = state
        .line_generator
        .generate_week(query.sport, query.season, query.week)
        .await?;
    Ok(Json(lines))
}

/// HTTP handler for the weekly line resolution job
///
/// POST /lines/resolve?sport=nfl&season=2025&week=5
#[instrument(name = "resolve_lines", skip(state))]
pub async fn resolve_lines(
    State(state): State<AppState>,
    Query(query): Query<WeekQuery>,
) -> Result<Json<LineWeekSummary>, AppError> {
    let summary = state
        .line_generator
        .resolve_week(query.sport, query.season, query.week)
        .await?;
    Ok(Json(summary))
}
