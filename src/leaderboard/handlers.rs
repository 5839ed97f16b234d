use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use tracing::instrument;

use super::types::{AccuracyRow, ConsensusReport, RatingRow, Timeframe};
use crate::prediction::models::{PredictionType, Sport};
use crate::reputation::models::SportScope;
use crate::shared::{AppError, AppState};

const DEFAULT_BOARD_LIMIT: usize = 50;

#[derive(Debug, Deserialize)]
pub struct AccuracyBoardQuery {
    pub sport: Option<Sport>,
    pub league_id: Option<String>,
    pub timeframe: Option<Timeframe>,
    pub limit: Option<usize>,
}

/// HTTP handler for the accuracy leaderboard
///
/// GET /leaderboards/accuracy?sport=nfl&timeframe=weekly
#[instrument(name = "accuracy_board", skip(state))]
pub async fn accuracy_board(
    State(state): State<AppState>,
    Query(query): Query<AccuracyBoardQuery>,
) -> Result<Json<Vec<AccuracyRow>>, AppError> {
    let scope = query.sport.map(SportScope::Sport).unwrap_or(SportScope::All);
    let board = state
        .leaderboard_service
        .accuracy_board(
            scope,
            query.league_id.as_deref(),
            query.timeframe.unwrap_or(Timeframe::All),
            query.limit.unwrap_or(DEFAULT_BOARD_LIMIT),
        )
        .await?;
    Ok(Json(board))
}

#[derive(Debug, Deserialize)]
pub struct RatingBoardQuery {
    pub min_graded: Option<u32>,
    pub limit: Option<usize>,
}

/// HTTP handler for the rating leaderboard
///
/// GET /leaderboards/rating
#[instrument(name = "rating_board", skip(state))]
pub async fn rating_board(
    State(state): State<AppState>,
    Query(query): Query<RatingBoardQuery>,
) -> Result<Json<Vec<RatingRow>>, AppError> {
    let board = state
        .leaderboard_service
        .rating_board(query.min_graded, query.limit.unwrap_or(DEFAULT_BOARD_LIMIT))
        .await?;
    Ok(Json(board))
}

#[derive(Debug, Deserialize)]
pub struct ConsensusQuery {
    pub subject_id: Option<String>,
    #[serde(rename = "type")]
    pub prediction_type: PredictionType,
}

/// HTTP handler for per-target consensus
///
/// GET /events/:event_id/consensus?subject_id=rb-1&type=benchmark
#[instrument(name = "get_consensus", skip(state))]
pub async fn get_consensus(
    State(state): State<AppState>,
    Path(event_id): Path<String>,
    Query(query): Query<ConsensusQuery>,
) -> Result<Json<ConsensusReport>, AppError> {
    let report = state
        .leaderboard_service
        .consensus(
            &event_id,
            query.subject_id.as_deref(),
            query.prediction_type,
        )
        .await?;
    Ok(Json(report))
}
