use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Mutex;
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use super::models::{
    Claim, Confidence, PredictionModel, PredictionStatus, PredictionType, Sport,
};
use crate::shared::AppError;

/// Trait for prediction store operations.
///
/// The prediction store is the system of record; reputation and rating
/// rows are caches rebuilt from it. All writes are idempotent upserts so
/// retries are safe.
#[async_trait]
pub trait PredictionRepository: Send + Sync {
    async fn create(&self, prediction: &PredictionModel) -> Result<(), AppError>;
    async fn get(&self, id: Uuid) -> Result<Option<PredictionModel>, AppError>;
    async fn update(&self, prediction: &PredictionModel) -> Result<(), AppError>;

    /// Deletes a prediction. Only the lifecycle service calls this, and
    /// only for Pending predictions.
    async fn delete(&self, id: Uuid) -> Result<(), AppError>;

    /// Atomically transitions a Pending prediction to a terminal state.
    /// Fails with a state error if the prediction is already terminal;
    /// this is the guard that prevents double resolution.
    async fn resolve(
        &self,
        id: Uuid,
        status: PredictionStatus,
        accuracy_score: f64,
        resolved_at: DateTime<Utc>,
    ) -> Result<PredictionModel, AppError>;

    /// Finds an existing Pending prediction for the same
    /// (user, event, subject, type) tuple, if any.
    async fn find_pending_duplicate(
        &self,
        user_id: &str,
        event_id: &str,
        subject_id: Option<&str>,
        prediction_type: PredictionType,
    ) -> Result<Option<PredictionModel>, AppError>;

    async fn list_pending_for_event(
        &self,
        event_id: &str,
    ) -> Result<Vec<PredictionModel>, AppError>;

    /// All public predictions targeting one (event, subject, type),
    /// regardless of state. Consensus and upset detection read this.
    async fn list_public_for_target(
        &self,
        event_id: &str,
        subject_id: Option<&str>,
        prediction_type: PredictionType,
    ) -> Result<Vec<PredictionModel>, AppError>;

    /// A user's terminal predictions, oldest first by resolution time
    /// (creation time when the resolution timestamp is missing).
    async fn list_resolved_for_user(
        &self,
        user_id: &str,
        sport: Option<Sport>,
    ) -> Result<Vec<PredictionModel>, AppError>;

    /// Every prediction a user has made, oldest first by creation time.
    async fn list_for_user(&self, user_id: &str) -> Result<Vec<PredictionModel>, AppError>;

    /// All terminal predictions, optionally scoped by sport and a
    /// resolution-time cutoff. Feeds the accuracy leaderboard.
    async fn list_resolved_since(
        &self,
        sport: Option<Sport>,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<PredictionModel>, AppError>;

    /// Distinct users with at least one terminal prediction.
    async fn user_ids_with_resolved(&self) -> Result<Vec<String>, AppError>;
}

/// In-memory implementation of PredictionRepository for development and
/// testing. Data is lost when the application restarts.
pub struct InMemoryPredictionRepository {
    predictions: Mutex<HashMap<Uuid, PredictionModel>>,
}

impl Default for InMemoryPredictionRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryPredictionRepository {
    pub fn new() -> Self {
        Self {
            predictions: Mutex::new(HashMap::new()),
        }
    }

    /// Creates a repository pre-populated with predictions
    pub fn with_predictions(predictions: Vec<PredictionModel>) -> Self {
        let mut map = HashMap::new();
        for prediction in predictions {
            map.insert(prediction.id, prediction);
        }
        Self {
            predictions: Mutex::new(map),
        }
    }

    pub fn prediction_count(&self) -> usize {
        self.predictions.lock().unwrap().len()
    }
}

#[async_trait]
impl PredictionRepository for InMemoryPredictionRepository {
    #[instrument(skip(self, prediction))]
    async fn create(&self, prediction: &PredictionModel) -> Result<(), AppError> {
        debug!(prediction_id = %prediction.id, user_id = %prediction.user_id, "Creating prediction in memory");

        let mut predictions = self.predictions.lock().unwrap();
        if predictions.contains_key(&prediction.id) {
            warn!(prediction_id = %prediction.id, "Prediction already exists in memory");
            return Err(AppError::DatabaseError(
                "Prediction already exists".to_string(),
            ));
        }
        predictions.insert(prediction.id, prediction.clone());
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<PredictionModel>, AppError> {
        Ok(self.predictions.lock().unwrap().get(&id).cloned())
    }

    #[instrument(skip(self, prediction))]
    async fn update(&self, prediction: &PredictionModel) -> Result<(), AppError> {
        let mut predictions = self.predictions.lock().unwrap();
        if !predictions.contains_key(&prediction.id) {
            warn!(prediction_id = %prediction.id, "Prediction not found for update in memory");
            return Err(AppError::NotFound("Prediction not found".to_string()));
        }
        predictions.insert(prediction.id, prediction.clone());
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        let mut predictions = self.predictions.lock().unwrap();
        if predictions.remove(&id).is_none() {
            warn!(prediction_id = %id, "Prediction not found for deletion in memory");
            return Err(AppError::NotFound("Prediction not found".to_string()));
        }
        Ok(())
    }

    #[instrument(skip(self))]
    async fn resolve(
        &self,
        id: Uuid,
        status: PredictionStatus,
        accuracy_score: f64,
        resolved_at: DateTime<Utc>,
    ) -> Result<PredictionModel, AppError> {
        let mut predictions = self.predictions.lock().unwrap();
        let prediction = predictions
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound("Prediction not found".to_string()))?;

        if prediction.status.is_terminal() {
            warn!(prediction_id = %id, status = %prediction.status, "Prediction already resolved");
            return Err(AppError::Locked(
                "Prediction is already resolved".to_string(),
            ));
        }

        prediction.status = status;
        prediction.accuracy_score = Some(accuracy_score);
        prediction.resolved_at = Some(resolved_at);

        debug!(prediction_id = %id, status = %status, "Prediction resolved in memory");
        Ok(prediction.clone())
    }

    async fn find_pending_duplicate(
        &self,
        user_id: &str,
        event_id: &str,
        subject_id: Option<&str>,
        prediction_type: PredictionType,
    ) -> Result<Option<PredictionModel>, AppError> {
        let predictions = self.predictions.lock().unwrap();
        Ok(predictions
            .values()
            .find(|p| {
                p.is_pending()
                    && p.user_id == user_id
                    && p.event_id == event_id
                    && p.subject_id.as_deref() == subject_id
                    && p.prediction_type == prediction_type
            })
            .cloned())
    }

    async fn list_pending_for_event(
        &self,
        event_id: &str,
    ) -> Result<Vec<PredictionModel>, AppError> {
        let predictions = self.predictions.lock().unwrap();
        let mut pending: Vec<PredictionModel> = predictions
            .values()
            .filter(|p| p.is_pending() && p.event_id == event_id)
            .cloned()
            .collect();
        pending.sort_by_key(|p| p.created_at);
        Ok(pending)
    }

    async fn list_public_for_target(
        &self,
        event_id: &str,
        subject_id: Option<&str>,
        prediction_type: PredictionType,
    ) -> Result<Vec<PredictionModel>, AppError> {
        let predictions = self.predictions.lock().unwrap();
        Ok(predictions
            .values()
            .filter(|p| {
                p.is_public
                    && p.event_id == event_id
                    && p.subject_id.as_deref() == subject_id
                    && p.prediction_type == prediction_type
            })
            .cloned()
            .collect())
    }

    async fn list_resolved_for_user(
        &self,
        user_id: &str,
        sport: Option<Sport>,
    ) -> Result<Vec<PredictionModel>, AppError> {
        let predictions = self.predictions.lock().unwrap();
        let mut resolved: Vec<PredictionModel> = predictions
            .values()
            .filter(|p| {
                p.status.is_terminal()
                    && p.user_id == user_id
                    && sport.map(|s| p.sport == s).unwrap_or(true)
            })
            .cloned()
            .collect();
        resolved.sort_by_key(|p| p.graded_at());
        Ok(resolved)
    }

    async fn list_for_user(&self, user_id: &str) -> Result<Vec<PredictionModel>, AppError> {
        let predictions = self.predictions.lock().unwrap();
        let mut owned: Vec<PredictionModel> = predictions
            .values()
            .filter(|p| p.user_id == user_id)
            .cloned()
            .collect();
        owned.sort_by_key(|p| p.created_at);
        Ok(owned)
    }

    async fn list_resolved_since(
        &self,
        sport: Option<Sport>,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<PredictionModel>, AppError> {
        let predictions = self.predictions.lock().unwrap();
        Ok(predictions
            .values()
            .filter(|p| {
                p.status.is_terminal()
                    && sport.map(|s| p.sport == s).unwrap_or(true)
                    && since.map(|cutoff| p.graded_at() >= cutoff).unwrap_or(true)
            })
            .cloned()
            .collect())
    }

    async fn user_ids_with_resolved(&self) -> Result<Vec<String>, AppError> {
        let predictions = self.predictions.lock().unwrap();
        let mut ids: Vec<String> = predictions
            .values()
            .filter(|p| p.status.is_terminal())
            .map(|p| p.user_id.clone())
            .collect();
        ids.sort();
        ids.dedup();
        Ok(ids)
    }
}

/// PostgreSQL implementation of the prediction store
pub struct PostgresPredictionRepository {
    pool: PgPool,
}

impl PostgresPredictionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn row_to_prediction(row: &sqlx::postgres::PgRow) -> Result<PredictionModel, AppError> {
        let sport: String = row.get("sport");
        let prediction_type: String = row.get("prediction_type");
        let status: String = row.get("status");
        let confidence: Option<String> = row.get("confidence");
        let claim: serde_json::Value = row.get("claim");

        Ok(PredictionModel {
            id: row.get("id"),
            user_id: row.get("user_id"),
            sport: Sport::from_str(&sport)
                .map_err(|_| AppError::DatabaseError(format!("Unknown sport: {}", sport)))?,
            prediction_type: PredictionType::from_str(&prediction_type).map_err(|_| {
                AppError::DatabaseError(format!("Unknown prediction type: {}", prediction_type))
            })?,
            category: row.get("category"),
            event_id: row.get("event_id"),
            subject_id: row.get("subject_id"),
            league_id: row.get("league_id"),
            claim: serde_json::from_value::<Claim>(claim)
                .map_err(|e| AppError::DatabaseError(format!("Bad claim payload: {}", e)))?,
            is_public: row.get("is_public"),
            locks_at: row.get("locks_at"),
            status: PredictionStatus::from_str(&status)
                .map_err(|_| AppError::DatabaseError(format!("Unknown status: {}", status)))?,
            accuracy_score: row.get("accuracy_score"),
            rationale: row.get("rationale"),
            confidence: confidence
                .map(|c| {
                    Confidence::from_str(&c).map_err(|_| {
                        AppError::DatabaseError(format!("Unknown confidence: {}", c))
                    })
                })
                .transpose()?,
            created_at: row.get("created_at"),
            resolved_at: row.get("resolved_at"),
        })
    }
}

#[async_trait]
impl PredictionRepository for PostgresPredictionRepository {
    #[instrument(skip(self, prediction))]
    async fn create(&self, prediction: &PredictionModel) -> Result<(), AppError> {
        debug!(prediction_id = %prediction.id, user_id = %prediction.user_id, "Creating prediction in database");

        let claim = serde_json::to_value(&prediction.claim)
            .map_err(|e| AppError::DatabaseError(e.to_string()))?;

        sqlx::query(
            "INSERT INTO predictions \
             (id, user_id, sport, prediction_type, category, event_id, subject_id, league_id, \
              claim, is_public, locks_at, status, accuracy_score, rationale, confidence, \
              created_at, resolved_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)",
        )
        .bind(prediction.id)
        .bind(&prediction.user_id)
        .bind(prediction.sport.to_string())
        .bind(prediction.prediction_type.to_string())
        .bind(&prediction.category)
        .bind(&prediction.event_id)
        .bind(&prediction.subject_id)
        .bind(&prediction.league_id)
        .bind(claim)
        .bind(prediction.is_public)
        .bind(prediction.locks_at)
        .bind(prediction.status.to_string())
        .bind(prediction.accuracy_score)
        .bind(&prediction.rationale)
        .bind(prediction.confidence.map(|c| c.to_string()))
        .bind(prediction.created_at)
        .bind(prediction.resolved_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to create prediction in database");
            AppError::DatabaseError(e.to_string())
        })?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn get(&self, id: Uuid) -> Result<Option<PredictionModel>, AppError> {
        let row = sqlx::query("SELECT * FROM predictions WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(e.to_string()))?;

        row.as_ref().map(Self::row_to_prediction).transpose()
    }

    #[instrument(skip(self, prediction))]
    async fn update(&self, prediction: &PredictionModel) -> Result<(), AppError> {
        let claim = serde_json::to_value(&prediction.claim)
            .map_err(|e| AppError::DatabaseError(e.to_string()))?;

        let result = sqlx::query(
            "UPDATE predictions SET claim = $2, is_public = $3, locks_at = $4, \
             rationale = $5, confidence = $6, category = $7 WHERE id = $1",
        )
        .bind(prediction.id)
        .bind(claim)
        .bind(prediction.is_public)
        .bind(prediction.locks_at)
        .bind(&prediction.rationale)
        .bind(prediction.confidence.map(|c| c.to_string()))
        .bind(&prediction.category)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Prediction not found".to_string()));
        }
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM predictions WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Prediction not found".to_string()));
        }
        Ok(())
    }

    #[instrument(skip(self))]
    async fn resolve(
        &self,
        id: Uuid,
        status: PredictionStatus,
        accuracy_score: f64,
        resolved_at: DateTime<Utc>,
    ) -> Result<PredictionModel, AppError> {
        // The status predicate in the WHERE clause is the double-resolution guard
        let row = sqlx::query(
            "UPDATE predictions SET status = $2, accuracy_score = $3, resolved_at = $4 \
             WHERE id = $1 AND status = 'PENDING' RETURNING *",
        )
        .bind(id)
        .bind(status.to_string())
        .bind(accuracy_score)
        .bind(resolved_at)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, prediction_id = %id, "Failed to resolve prediction in database");
            AppError::DatabaseError(e.to_string())
        })?;

        match row {
            Some(row) => Self::row_to_prediction(&row),
            None => match self.get(id).await? {
                Some(_) => Err(AppError::Locked(
                    "Prediction is already resolved".to_string(),
                )),
                None => Err(AppError::NotFound("Prediction not found".to_string())),
            },
        }
    }

    async fn find_pending_duplicate(
        &self,
        user_id: &str,
        event_id: &str,
        subject_id: Option<&str>,
        prediction_type: PredictionType,
    ) -> Result<Option<PredictionModel>, AppError> {
        let row = sqlx::query(
            "SELECT * FROM predictions WHERE user_id = $1 AND event_id = $2 \
             AND subject_id IS NOT DISTINCT FROM $3 AND prediction_type = $4 \
             AND status = 'PENDING' LIMIT 1",
        )
        .bind(user_id)
        .bind(event_id)
        .bind(subject_id)
        .bind(prediction_type.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(e.to_string()))?;

        row.as_ref().map(Self::row_to_prediction).transpose()
    }

    async fn list_pending_for_event(
        &self,
        event_id: &str,
    ) -> Result<Vec<PredictionModel>, AppError> {
        let rows = sqlx::query(
            "SELECT * FROM predictions WHERE event_id = $1 AND status = 'PENDING' \
             ORDER BY created_at",
        )
        .bind(event_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(e.to_string()))?;

        rows.iter().map(Self::row_to_prediction).collect()
    }

    async fn list_public_for_target(
        &self,
        event_id: &str,
        subject_id: Option<&str>,
        prediction_type: PredictionType,
    ) -> Result<Vec<PredictionModel>, AppError> {
        let rows = sqlx::query(
            "SELECT * FROM predictions WHERE event_id = $1 \
             AND subject_id IS NOT DISTINCT FROM $2 AND prediction_type = $3 \
             AND is_public",
        )
        .bind(event_id)
        .bind(subject_id)
        .bind(prediction_type.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(e.to_string()))?;

        rows.iter().map(Self::row_to_prediction).collect()
    }

    async fn list_resolved_for_user(
        &self,
        user_id: &str,
        sport: Option<Sport>,
    ) -> Result<Vec<PredictionModel>, AppError> {
        let rows = sqlx::query(
            "SELECT * FROM predictions WHERE user_id = $1 AND status <> 'PENDING' \
             AND ($2::text IS NULL OR sport = $2) \
             ORDER BY COALESCE(resolved_at, created_at)",
        )
        .bind(user_id)
        .bind(sport.map(|s| s.to_string()))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(e.to_string()))?;

        rows.iter().map(Self::row_to_prediction).collect()
    }

    async fn list_for_user(&self, user_id: &str) -> Result<Vec<PredictionModel>, AppError> {
        let rows = sqlx::query(
            "SELECT * FROM predictions WHERE user_id = $1 ORDER BY created_at",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(e.to_string()))?;

        rows.iter().map(Self::row_to_prediction).collect()
    }

    async fn list_resolved_since(
        &self,
        sport: Option<Sport>,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<PredictionModel>, AppError> {
        let rows = sqlx::query(
            "SELECT * FROM predictions WHERE status <> 'PENDING' \
             AND ($1::text IS NULL OR sport = $1) \
             AND ($2::timestamptz IS NULL OR COALESCE(resolved_at, created_at) >= $2)",
        )
        .bind(sport.map(|s| s.to_string()))
        .bind(since)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(e.to_string()))?;

        rows.iter().map(Self::row_to_prediction).collect()
    }

    async fn user_ids_with_resolved(&self) -> Result<Vec<String>, AppError> {
        let rows = sqlx::query(
            "SELECT DISTINCT user_id FROM predictions WHERE status <> 'PENDING' ORDER BY user_id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(e.to_string()))?;

        Ok(rows.iter().map(|row| row.get("user_id")).collect())
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use crate::prediction::models::Direction;
    use chrono::Duration;

    /// Test helper functions for creating test data
    mod helpers {
        use super::*;

        pub fn benchmark_prediction(user_id: &str, event_id: &str) -> PredictionModel {
            let now = Utc::now();
            PredictionModel {
                id: Uuid::new_v4(),
                user_id: user_id.to_string(),
                sport: Sport::Nfl,
                prediction_type: PredictionType::Benchmark,
                category: "player-prop".to_string(),
                event_id: event_id.to_string(),
                subject_id: Some("rb-1".to_string()),
                league_id: None,
                claim: Claim::Benchmark {
                    stat: "rush_yards".to_string(),
                    direction: Direction::Over,
                    line: 60.5,
                },
                is_public: true,
                locks_at: now + Duration::hours(2),
                status: PredictionStatus::Pending,
                accuracy_score: None,
                rationale: None,
                confidence: None,
                created_at: now,
                resolved_at: None,
            }
        }
    }

    use helpers::*;

    #[tokio::test]
    async fn test_create_and_get_prediction() {
        let repo = InMemoryPredictionRepository::new();
        let prediction = benchmark_prediction("user-1", "evt-1");

        repo.create(&prediction).await.unwrap();

        let retrieved = repo.get(prediction.id).await.unwrap().unwrap();
        assert_eq!(retrieved.id, prediction.id);
        assert_eq!(retrieved.user_id, "user-1");
        assert_eq!(retrieved.status, PredictionStatus::Pending);
    }

    #[tokio::test]
    async fn test_resolve_transitions_to_terminal_state() {
        let repo = InMemoryPredictionRepository::new();
        let prediction = benchmark_prediction("user-1", "evt-1");
        repo.create(&prediction).await.unwrap();

        let resolved = repo
            .resolve(prediction.id, PredictionStatus::Correct, 1.0, Utc::now())
            .await
            .unwrap();

        assert_eq!(resolved.status, PredictionStatus::Correct);
        assert_eq!(resolved.accuracy_score, Some(1.0));
        assert!(resolved.resolved_at.is_some());
    }

    #[tokio::test]
    async fn test_resolve_twice_is_rejected() {
        let repo = InMemoryPredictionRepository::new();
        let prediction = benchmark_prediction("user-1", "evt-1");
        repo.create(&prediction).await.unwrap();

        repo.resolve(prediction.id, PredictionStatus::Correct, 1.0, Utc::now())
            .await
            .unwrap();
        let second = repo
            .resolve(prediction.id, PredictionStatus::Incorrect, 0.0, Utc::now())
            .await;

        assert!(matches!(second.unwrap_err(), AppError::Locked(_)));

        // First verdict stands
        let stored = repo.get(prediction.id).await.unwrap().unwrap();
        assert_eq!(stored.status, PredictionStatus::Correct);
    }

    #[tokio::test]
    async fn test_resolve_missing_prediction() {
        let repo = InMemoryPredictionRepository::new();
        let result = repo
            .resolve(Uuid::new_v4(), PredictionStatus::Correct, 1.0, Utc::now())
            .await;
        assert!(matches!(result.unwrap_err(), AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_find_pending_duplicate() {
        let repo = InMemoryPredictionRepository::new();
        let prediction = benchmark_prediction("user-1", "evt-1");
        repo.create(&prediction).await.unwrap();

        let duplicate = repo
            .find_pending_duplicate("user-1", "evt-1", Some("rb-1"), PredictionType::Benchmark)
            .await
            .unwrap();
        assert!(duplicate.is_some());

        // Different subject is not a duplicate
        let other_subject = repo
            .find_pending_duplicate("user-1", "evt-1", Some("rb-2"), PredictionType::Benchmark)
            .await
            .unwrap();
        assert!(other_subject.is_none());

        // A resolved prediction does not count as a duplicate
        repo.resolve(prediction.id, PredictionStatus::Correct, 1.0, Utc::now())
            .await
            .unwrap();
        let after_resolve = repo
            .find_pending_duplicate("user-1", "evt-1", Some("rb-1"), PredictionType::Benchmark)
            .await
            .unwrap();
        assert!(after_resolve.is_none());
    }

    #[tokio::test]
    async fn test_list_pending_for_event() {
        let repo = InMemoryPredictionRepository::new();
        let first = benchmark_prediction("user-1", "evt-1");
        let second = benchmark_prediction("user-2", "evt-1");
        let other_event = benchmark_prediction("user-3", "evt-2");
        repo.create(&first).await.unwrap();
        repo.create(&second).await.unwrap();
        repo.create(&other_event).await.unwrap();

        repo.resolve(second.id, PredictionStatus::Correct, 1.0, Utc::now())
            .await
            .unwrap();

        let pending = repo.list_pending_for_event("evt-1").await.unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].id, first.id);
    }

    #[tokio::test]
    async fn test_list_resolved_for_user_is_chronological() {
        let repo = InMemoryPredictionRepository::new();
        let now = Utc::now();

        let mut older = benchmark_prediction("user-1", "evt-1");
        older.status = PredictionStatus::Correct;
        older.resolved_at = Some(now - Duration::days(5));
        let mut newer = benchmark_prediction("user-1", "evt-2");
        newer.status = PredictionStatus::Incorrect;
        newer.resolved_at = Some(now - Duration::days(1));

        repo.create(&newer).await.unwrap();
        repo.create(&older).await.unwrap();

        let resolved = repo.list_resolved_for_user("user-1", None).await.unwrap();
        assert_eq!(resolved.len(), 2);
        assert_eq!(resolved[0].id, older.id);
        assert_eq!(resolved[1].id, newer.id);
    }

    #[tokio::test]
    async fn test_user_ids_with_resolved_is_distinct() {
        let repo = InMemoryPredictionRepository::new();
        for event in ["evt-1", "evt-2"] {
            let mut prediction = benchmark_prediction("user-1", event);
            prediction.status = PredictionStatus::Correct;
            prediction.resolved_at = Some(Utc::now());
            repo.create(&prediction).await.unwrap();
        }
        let pending = benchmark_prediction("user-2", "evt-3");
        repo.create(&pending).await.unwrap();

        let users = repo.user_ids_with_resolved().await.unwrap();
        assert_eq!(users, vec!["user-1".to_string()]);
    }

    #[tokio::test]
    async fn test_delete_prediction() {
        let repo = InMemoryPredictionRepository::new();
        let prediction = benchmark_prediction("user-1", "evt-1");
        repo.create(&prediction).await.unwrap();

        repo.delete(prediction.id).await.unwrap();
        assert!(repo.get(prediction.id).await.unwrap().is_none());

        let again = repo.delete(prediction.id).await;
        assert!(matches!(again.unwrap_err(), AppError::NotFound(_)));
    }
}
