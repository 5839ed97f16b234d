// Library crate for the ClutchCall scoring service
// This file exposes the public API for integration tests

pub mod leaderboard;
pub mod lines;
pub mod prediction;
pub mod rating;
pub mod reputation;
pub mod resolution;
pub mod shared;
pub mod statsfeed;
pub mod timeline;

// Re-export commonly used types for easier access in tests
pub use leaderboard::{LeaderboardService, Timeframe};
pub use lines::{LineGenerator, PropLine};
pub use prediction::{PredictionModel, PredictionService, PredictionStatus};
pub use rating::{ClutchRating, RatingConfig, RatingService};
pub use reputation::{ReputationConfig, ReputationService, SportScope, UserReputation};
pub use resolution::{EventOutcome, ResolutionService, StandardResolver, Verdict};
pub use shared::{AppError, AppState, AppStateBuilder};
pub use timeline::{TimelineBus, TimelineEvent};
