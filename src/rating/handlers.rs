use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use tracing::instrument;

use super::models::ClutchRating;
use super::service::RecomputeSummary;
use crate::shared::{AppError, AppState};

/// HTTP handler for a user's clutch rating
///
/// GET /users/:user_id/rating
#[instrument(name = "get_rating", skip(state))]
pub async fn get_rating(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<ClutchRating>, AppError> {
    let rating = state.rating_service.get(&user_id).await?;
    Ok(Json(rating))
}

#[derive(Debug, Deserialize)]
pub struct RecomputeQuery {
    pub concurrency: Option<usize>,
}

/// HTTP handler for the full-population rating recompute job
///
/// POST /ratings/recompute?concurrency=8
#[instrument(name = "recompute_ratings", skip(state))]
pub async fn recompute_ratings(
    State(state): State<AppState>,
    Query(query): Query<RecomputeQuery>,
) -> Result<Json<RecomputeSummary>, AppError> {
    let concurrency = query.concurrency.unwrap_or(8);
    let summary = state.rating_service.recompute_all(concurrency).await?;
    Ok(Json(summary))
}
