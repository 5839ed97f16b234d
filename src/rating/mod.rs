pub mod config;
pub mod handlers;
pub mod models;
pub mod repository;
pub mod service;

pub use config::RatingConfig;
pub use models::{ClutchRating, RatingTier, RatingTrend};
pub use repository::{InMemoryRatingRepository, RatingRepository};
pub use service::{RatingService, RecomputeSummary};
