pub mod handlers;
pub mod service;
pub mod types;

pub use service::LeaderboardService;
pub use types::{
    AccuracyRow, ConsensusReport, DirectionBreakdown, RatingRow, Timeframe,
    TopManagerAgreement, WeightedBreakdown,
};
