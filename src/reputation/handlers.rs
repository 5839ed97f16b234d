use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use tracing::instrument;

use super::models::{SportScope, UserReputation};
use crate::prediction::models::Sport;
use crate::shared::{AppError, AppState};

#[derive(Debug, Deserialize)]
pub struct ScopeQuery {
    /// Omitted means the all-sports aggregate
    pub sport: Option<Sport>,
}

/// HTTP handler for a user's reputation row
///
/// GET /users/:user_id/reputation?sport=nfl
#[instrument(name = "get_reputation", skip(state))]
pub async fn get_reputation(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Query(query): Query<ScopeQuery>,
) -> Result<Json<UserReputation>, AppError> {
    let scope = query.sport.map(SportScope::Sport).unwrap_or(SportScope::All);
    let row = state.reputation_service.get(&user_id, scope).await?;
    Ok(Json(row))
}
