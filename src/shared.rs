use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;

use crate::leaderboard::LeaderboardService;
use crate::lines::LineGenerator;
use crate::prediction::repository::PredictionRepository;
use crate::prediction::service::PredictionService;
use crate::rating::service::RatingService;
use crate::reputation::service::ReputationService;
use crate::resolution::service::ResolutionService;
use crate::timeline::TimelineBus;

/// Shared application state containing all dependencies
#[derive(Clone)]
pub struct AppState {
    pub prediction_repository: Arc<dyn PredictionRepository + Send + Sync>,
    pub prediction_service: Arc<PredictionService>,
    pub resolution_service: Arc<ResolutionService>,
    pub reputation_service: Arc<ReputationService>,
    pub rating_service: Arc<RatingService>,
    pub leaderboard_service: Arc<LeaderboardService>,
    pub line_generator: Arc<LineGenerator>,
    pub timeline_bus: TimelineBus,
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Locked: {0}")]
    Locked(String),

    #[error("Duplicate: {0}")]
    Duplicate(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Internal server error")]
    Internal,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            AppError::Locked(msg) => (StatusCode::CONFLICT, msg),
            AppError::Duplicate(msg) => (StatusCode::CONFLICT, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::DatabaseError(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Database error: {}", msg),
            ),
            AppError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
        };

        let body = Json(json!({
            "error": error_message
        }));

        (status, body).into_response()
    }
}

/// Wires an [`AppState`] from its parts. The in-memory path is the default
/// for development and tests; `main` swaps the prediction repository for
/// the Postgres implementation when a database is configured.
pub struct AppStateBuilder {
    prediction_repository: Option<Arc<dyn PredictionRepository + Send + Sync>>,
    performance_source:
        Option<Arc<dyn crate::statsfeed::PerformanceDataSource + Send + Sync>>,
    league_directory: Option<Arc<dyn crate::statsfeed::LeagueDirectory + Send + Sync>>,
    reputation_config: crate::reputation::ReputationConfig,
    rating_config: crate::rating::RatingConfig,
}

impl AppStateBuilder {
    pub fn new() -> Self {
        Self {
            prediction_repository: None,
            performance_source: None,
            league_directory: None,
            reputation_config: crate::reputation::ReputationConfig::default(),
            rating_config: crate::rating::RatingConfig::default(),
        }
    }

    pub fn with_prediction_repository(
        mut self,
        repo: Arc<dyn PredictionRepository + Send + Sync>,
    ) -> Self {
        self.prediction_repository = Some(repo);
        self
    }

    pub fn with_performance_source(
        mut self,
        source: Arc<dyn crate::statsfeed::PerformanceDataSource + Send + Sync>,
    ) -> Self {
        self.performance_source = Some(source);
        self
    }

    pub fn with_league_directory(
        mut self,
        directory: Arc<dyn crate::statsfeed::LeagueDirectory + Send + Sync>,
    ) -> Self {
        self.league_directory = Some(directory);
        self
    }

    pub fn with_reputation_config(
        mut self,
        config: crate::reputation::ReputationConfig,
    ) -> Self {
        self.reputation_config = config;
        self
    }

    pub fn with_rating_config(mut self, config: crate::rating::RatingConfig) -> Self {
        self.rating_config = config;
        self
    }

    pub fn build(self) -> AppState {
        use crate::lines::repository::InMemoryLineRepository;
        use crate::prediction::repository::InMemoryPredictionRepository;
        use crate::rating::repository::InMemoryRatingRepository;
        use crate::reputation::repository::InMemoryReputationRepository;
        use crate::statsfeed::{InMemoryLeagueDirectory, InMemoryPerformanceData};

        let prediction_repository = self
            .prediction_repository
            .unwrap_or_else(|| Arc::new(InMemoryPredictionRepository::new()));
        let performance_source = self
            .performance_source
            .unwrap_or_else(|| Arc::new(InMemoryPerformanceData::new()));
        let league_directory = self
            .league_directory
            .unwrap_or_else(|| Arc::new(InMemoryLeagueDirectory::new()));
        let reputation_repository = Arc::new(InMemoryReputationRepository::new());
        let rating_repository = Arc::new(InMemoryRatingRepository::new());
        let line_repository = Arc::new(InMemoryLineRepository::new());
        let timeline_bus = TimelineBus::new();

        let reputation_service = Arc::new(ReputationService::new(
            Arc::clone(&prediction_repository),
            reputation_repository.clone(),
            self.reputation_config,
        ));
        let rating_service = Arc::new(RatingService::new(
            Arc::clone(&prediction_repository),
            rating_repository.clone(),
            self.rating_config,
        ));
        let resolution_service = Arc::new(ResolutionService::new(
            Arc::clone(&prediction_repository),
            Arc::clone(&reputation_service),
            Arc::clone(&rating_service),
            timeline_bus.clone(),
        ));
        let prediction_service = Arc::new(PredictionService::new(
            Arc::clone(&prediction_repository),
            Arc::clone(&performance_source),
            timeline_bus.clone(),
        ));
        let leaderboard_service = Arc::new(LeaderboardService::new(
            Arc::clone(&prediction_repository),
            reputation_repository,
            rating_repository,
            league_directory,
        ));
        let line_generator = Arc::new(LineGenerator::new(
            line_repository,
            Arc::clone(&performance_source),
            Arc::clone(&resolution_service),
        ));

        AppState {
            prediction_repository,
            prediction_service,
            resolution_service,
            reputation_service,
            rating_service,
            leaderboard_service,
            line_generator,
            timeline_bus,
        }
    }
}

impl Default for AppStateBuilder {
    fn default() -> Self {
        Self::new()
    }
}
