use axum::{
    extract::{Path, State},
    Json,
};
use tracing::{info, instrument};
use uuid::Uuid;

use super::types::{
    DeletePredictionRequest, PredictionResponse, SubmitPredictionRequest, UpdatePredictionRequest,
};
use crate::shared::{AppError, AppState};

/// HTTP handler for submitting a new prediction
///
/// POST /predictions
#[instrument(name = "submit_prediction", skip(state, request))]
pub async fn submit_prediction(
    State(state): State<AppState>,
    Json(request): Json<SubmitPredictionRequest>,
) -> Result<Json<PredictionResponse>, AppError> {
    info!(user_id = %request.user_id, event_id = %request.event_id, "Submitting prediction");

    let prediction = state.prediction_service.submit(request).await?;
    Ok(Json(prediction.into()))
}

/// HTTP handler for editing a still-open prediction
///
/// PATCH /predictions/:id
#[instrument(name = "update_prediction", skip(state, request))]
pub async fn update_prediction(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdatePredictionRequest>,
) -> Result<Json<PredictionResponse>, AppError> {
    let prediction = state.prediction_service.update(id, request).await?;
    Ok(Json(prediction.into()))
}

/// HTTP handler for deleting a pending prediction
///
/// DELETE /predictions/:id
#[instrument(name = "delete_prediction", skip(state, request))]
pub async fn delete_prediction(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<DeletePredictionRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    state.prediction_service.delete(id, &request.user_id).await?;
    Ok(Json(serde_json::json!({ "deleted": id })))
}

/// HTTP handler for fetching one prediction
///
/// GET /predictions/:id
#[instrument(name = "get_prediction", skip(state))]
pub async fn get_prediction(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<PredictionResponse>, AppError> {
    let prediction = state
        .prediction_repository
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Prediction not found".to_string()))?;
    Ok(Json(prediction.into()))
}

/// HTTP handler for a user's prediction history
///
/// GET /users/:user_id/predictions
#[instrument(name = "list_user_predictions", skip(state))]
pub async fn list_user_predictions(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<PredictionResponse>>, AppError> {
    let predictions = state.prediction_repository.list_for_user(&user_id).await?;
    Ok(Json(predictions.into_iter().map(Into::into).collect()))
}
