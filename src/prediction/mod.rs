pub mod handlers;
pub mod models;
pub mod repository;
pub mod service;
pub mod types;

pub use models::{
    Claim, Confidence, Direction, PredictionModel, PredictionStatus, PredictionType, Sport,
};
pub use repository::{InMemoryPredictionRepository, PredictionRepository};
pub use service::PredictionService;
