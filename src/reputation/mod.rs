pub mod badges;
pub mod config;
pub mod handlers;
pub mod models;
pub mod repository;
pub mod service;

pub use config::{BadgeThresholds, ReputationConfig, TierThreshold};
pub use models::{Badge, BadgeKind, BadgeTier, ReputationTier, SportScope, UserReputation};
pub use repository::{InMemoryReputationRepository, ReputationRepository};
pub use service::ReputationService;
