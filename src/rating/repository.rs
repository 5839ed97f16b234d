use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use tracing::debug;

use super::models::ClutchRating;
use crate::shared::AppError;

/// Trait for rating row storage, one row per user, last-write-wins.
#[async_trait]
pub trait RatingRepository: Send + Sync {
    async fn upsert(&self, rating: &ClutchRating) -> Result<(), AppError>;
    async fn get(&self, user_id: &str) -> Result<Option<ClutchRating>, AppError>;
    async fn list_all(&self) -> Result<Vec<ClutchRating>, AppError>;
}

/// In-memory implementation of RatingRepository
pub struct InMemoryRatingRepository {
    ratings: Mutex<HashMap<String, ClutchRating>>,
}

impl Default for InMemoryRatingRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryRatingRepository {
    pub fn new() -> Self {
        Self {
            ratings: Mutex::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl RatingRepository for InMemoryRatingRepository {
    async fn upsert(&self, rating: &ClutchRating) -> Result<(), AppError> {
        debug!(
            user_id = %rating.user_id,
            overall = ?rating.overall,
            "Upserting rating row"
        );
        let mut ratings = self.ratings.lock().unwrap();
        ratings.insert(rating.user_id.clone(), rating.clone());
        Ok(())
    }

    async fn get(&self, user_id: &str) -> Result<Option<ClutchRating>, AppError> {
        let ratings = self.ratings.lock().unwrap();
        Ok(ratings.get(user_id).cloned())
    }

    async fn list_all(&self) -> Result<Vec<ClutchRating>, AppError> {
        let ratings = self.ratings.lock().unwrap();
        Ok(ratings.values().cloned().collect())
    }
}
