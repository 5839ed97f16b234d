use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::models::{PredictionModel, PredictionStatus};
use super::repository::PredictionRepository;
use super::types::{SubmitPredictionRequest, UpdatePredictionRequest};
use crate::shared::AppError;
use crate::statsfeed::{EventStatus, PerformanceDataSource};
use crate::timeline::{TimelineBus, TimelineEvent};

/// Manages the open half of the prediction lifecycle: submit, update and
/// delete. Terminal transitions belong to the resolution engine.
pub struct PredictionService {
    repository: Arc<dyn PredictionRepository + Send + Sync>,
    performance_source: Arc<dyn PerformanceDataSource + Send + Sync>,
    timeline_bus: TimelineBus,
}

impl PredictionService {
    pub fn new(
        repository: Arc<dyn PredictionRepository + Send + Sync>,
        performance_source: Arc<dyn PerformanceDataSource + Send + Sync>,
        timeline_bus: TimelineBus,
    ) -> Self {
        Self {
            repository,
            performance_source,
            timeline_bus,
        }
    }

    /// Submits a new prediction.
    ///
    /// The lock time defaults to the event's scheduled start when not
    /// supplied; a defaulted submission against an event that already
    /// started or finished is rejected. At most one Pending prediction
    /// may exist per (user, event, subject, type).
    pub async fn submit(
        &self,
        request: SubmitPredictionRequest,
    ) -> Result<PredictionModel, AppError> {
        if request.user_id.trim().is_empty() {
            return Err(AppError::Validation("user_id is required".to_string()));
        }
        if request.event_id.trim().is_empty() {
            return Err(AppError::Validation("event_id is required".to_string()));
        }

        let now = Utc::now();
        let locks_at = match request.locks_at {
            Some(explicit) => explicit,
            None => {
                let event = self
                    .performance_source
                    .event_info(&request.event_id)
                    .await?
                    .ok_or_else(|| {
                        AppError::Validation(format!(
                            "Unknown event '{}' and no lock time provided",
                            request.event_id
                        ))
                    })?;

                if event.status != EventStatus::Scheduled || event.starts_at <= now {
                    return Err(AppError::Locked(format!(
                        "Event '{}' has already started",
                        request.event_id
                    )));
                }
                event.starts_at
            }
        };

        let prediction_type = request.claim.prediction_type();
        if let Some(existing) = self
            .repository
            .find_pending_duplicate(
                &request.user_id,
                &request.event_id,
                request.subject_id.as_deref(),
                prediction_type,
            )
            .await?
        {
            warn!(
                user_id = %request.user_id,
                event_id = %request.event_id,
                existing_id = %existing.id,
                "Duplicate pending prediction rejected"
            );
            return Err(AppError::Duplicate(
                "A pending prediction already exists for this target".to_string(),
            ));
        }

        let prediction = PredictionModel {
            id: Uuid::new_v4(),
            user_id: request.user_id,
            sport: request.sport,
            prediction_type,
            category: request.category.unwrap_or_else(|| "general".to_string()),
            event_id: request.event_id,
            subject_id: request.subject_id,
            league_id: request.league_id,
            claim: request.claim,
            is_public: request.is_public,
            locks_at,
            status: PredictionStatus::Pending,
            accuracy_score: None,
            rationale: request.rationale,
            confidence: request.confidence,
            created_at: now,
            resolved_at: None,
        };

        self.repository.create(&prediction).await?;
        info!(
            prediction_id = %prediction.id,
            user_id = %prediction.user_id,
            sport = %prediction.sport,
            prediction_type = %prediction.prediction_type,
            "Prediction submitted"
        );

        // Best-effort timeline notification; the submission never fails
        // or waits on it.
        if let Some(subject_id) = prediction.subject_id.clone() {
            let bus = self.timeline_bus.clone();
            let event = TimelineEvent::PredictionMade {
                prediction_id: prediction.id,
                user_id: prediction.user_id.clone(),
                subject_id,
                sport: prediction.sport,
                event_id: prediction.event_id.clone(),
                made_at: prediction.created_at,
            };
            tokio::spawn(async move {
                bus.emit(event).await;
            });
        }

        Ok(prediction)
    }

    /// Edits a prediction while it is still Pending and unlocked.
    /// Owner-only; the claim may change details but not its type.
    pub async fn update(
        &self,
        id: Uuid,
        request: UpdatePredictionRequest,
    ) -> Result<PredictionModel, AppError> {
        let mut prediction = self
            .repository
            .get(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Prediction not found".to_string()))?;

        if prediction.user_id != request.user_id {
            return Err(AppError::Unauthorized(
                "Only the prediction's owner may edit it".to_string(),
            ));
        }
        if !prediction.is_pending() {
            return Err(AppError::Locked(
                "Prediction is already resolved".to_string(),
            ));
        }
        if prediction.is_locked(Utc::now()) {
            return Err(AppError::Locked(
                "Prediction is locked for edits".to_string(),
            ));
        }

        if let Some(claim) = request.claim {
            if claim.prediction_type() != prediction.prediction_type {
                return Err(AppError::Validation(
                    "Claim type cannot change after submission".to_string(),
                ));
            }
            prediction.claim = claim;
        }
        if let Some(rationale) = request.rationale {
            prediction.rationale = Some(rationale);
        }
        if let Some(confidence) = request.confidence {
            prediction.confidence = Some(confidence);
        }
        if let Some(is_public) = request.is_public {
            prediction.is_public = is_public;
        }

        self.repository.update(&prediction).await?;
        debug!(prediction_id = %id, "Prediction updated");
        Ok(prediction)
    }

    /// Deletes a Pending prediction. Owner-only; resolved predictions
    /// are part of the permanent record and are never deleted.
    pub async fn delete(&self, id: Uuid, user_id: &str) -> Result<(), AppError> {
        let prediction = self
            .repository
            .get(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Prediction not found".to_string()))?;

        if prediction.user_id != user_id {
            return Err(AppError::Unauthorized(
                "Only the prediction's owner may delete it".to_string(),
            ));
        }
        if !prediction.is_pending() {
            return Err(AppError::Locked(
                "Resolved predictions cannot be deleted".to_string(),
            ));
        }

        self.repository.delete(id).await?;
        info!(prediction_id = %id, user_id = %user_id, "Prediction deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prediction::models::{Claim, Direction, Sport};
    use crate::prediction::repository::InMemoryPredictionRepository;
    use crate::statsfeed::{EventInfo, InMemoryPerformanceData};
    use chrono::Duration;

    fn service_with(
        repo: Arc<InMemoryPredictionRepository>,
        source: Arc<InMemoryPerformanceData>,
    ) -> PredictionService {
        PredictionService::new(repo, source, TimelineBus::new())
    }

    fn scheduled_event(event_id: &str, hours_from_now: i64) -> EventInfo {
        EventInfo {
            event_id: event_id.to_string(),
            sport: Sport::Nfl,
            starts_at: Utc::now() + Duration::hours(hours_from_now),
            status: EventStatus::Scheduled,
        }
    }

    fn submit_request(user_id: &str, event_id: &str) -> SubmitPredictionRequest {
        SubmitPredictionRequest {
            user_id: user_id.to_string(),
            sport: Sport::Nfl,
            event_id: event_id.to_string(),
            subject_id: Some("rb-1".to_string()),
            league_id: None,
            claim: Claim::Benchmark {
                stat: "rush_yards".to_string(),
                direction: Direction::Over,
                line: 60.5,
            },
            category: None,
            is_public: true,
            locks_at: None,
            rationale: None,
            confidence: None,
        }
    }

    #[tokio::test]
    async fn submit_defaults_lock_time_to_event_start() {
        let repo = Arc::new(InMemoryPredictionRepository::new());
        let source = Arc::new(InMemoryPerformanceData::new());
        let event = scheduled_event("evt-1", 3);
        let starts_at = event.starts_at;
        source.add_event(event);
        let service = service_with(repo, source);

        let prediction = service.submit(submit_request("user-1", "evt-1")).await.unwrap();

        assert_eq!(prediction.locks_at, starts_at);
        assert_eq!(prediction.status, PredictionStatus::Pending);
        assert_eq!(prediction.category, "general");
    }

    #[tokio::test]
    async fn submit_rejects_started_event() {
        let repo = Arc::new(InMemoryPredictionRepository::new());
        let source = Arc::new(InMemoryPerformanceData::new());
        source.add_event(scheduled_event("evt-1", -1));
        let service = service_with(repo, source);

        let result = service.submit(submit_request("user-1", "evt-1")).await;
        assert!(matches!(result.unwrap_err(), AppError::Locked(_)));
    }

    #[tokio::test]
    async fn submit_rejects_completed_event() {
        let repo = Arc::new(InMemoryPredictionRepository::new());
        let source = Arc::new(InMemoryPerformanceData::new());
        let mut event = scheduled_event("evt-1", 3);
        event.status = EventStatus::Final;
        source.add_event(event);
        let service = service_with(repo, source);

        let result = service.submit(submit_request("user-1", "evt-1")).await;
        assert!(matches!(result.unwrap_err(), AppError::Locked(_)));
    }

    #[tokio::test]
    async fn submit_rejects_unknown_event_without_lock_time() {
        let repo = Arc::new(InMemoryPredictionRepository::new());
        let source = Arc::new(InMemoryPerformanceData::new());
        let service = service_with(repo, source);

        let result = service.submit(submit_request("user-1", "evt-missing")).await;
        assert!(matches!(result.unwrap_err(), AppError::Validation(_)));
    }

    #[tokio::test]
    async fn submit_accepts_explicit_lock_time_without_event_metadata() {
        let repo = Arc::new(InMemoryPredictionRepository::new());
        let source = Arc::new(InMemoryPerformanceData::new());
        let service = service_with(repo, source);

        let mut request = submit_request("user-1", "evt-unknown");
        request.locks_at = Some(Utc::now() + Duration::hours(1));

        let prediction = service.submit(request).await.unwrap();
        assert!(prediction.is_pending());
    }

    #[tokio::test]
    async fn submit_rejects_duplicate_pending_target() {
        let repo = Arc::new(InMemoryPredictionRepository::new());
        let source = Arc::new(InMemoryPerformanceData::new());
        source.add_event(scheduled_event("evt-1", 3));
        let service = service_with(repo, source);

        service.submit(submit_request("user-1", "evt-1")).await.unwrap();
        let duplicate = service.submit(submit_request("user-1", "evt-1")).await;

        assert!(matches!(duplicate.unwrap_err(), AppError::Duplicate(_)));
    }

    #[tokio::test]
    async fn submit_allows_same_target_for_different_user() {
        let repo = Arc::new(InMemoryPredictionRepository::new());
        let source = Arc::new(InMemoryPerformanceData::new());
        source.add_event(scheduled_event("evt-1", 3));
        let service = service_with(repo, source);

        service.submit(submit_request("user-1", "evt-1")).await.unwrap();
        service.submit(submit_request("user-2", "evt-1")).await.unwrap();
    }

    #[tokio::test]
    async fn submit_emits_timeline_event_for_subject() {
        let repo = Arc::new(InMemoryPredictionRepository::new());
        let source = Arc::new(InMemoryPerformanceData::new());
        source.add_event(scheduled_event("evt-1", 3));
        let bus = TimelineBus::new();
        let service = PredictionService::new(repo, source, bus.clone());

        let mut receiver = bus.subscribe("rb-1").await;
        let prediction = service.submit(submit_request("user-1", "evt-1")).await.unwrap();

        let event = receiver.recv().await.unwrap();
        match event {
            TimelineEvent::PredictionMade { prediction_id, .. } => {
                assert_eq!(prediction_id, prediction.id);
            }
            other => panic!("unexpected timeline event: {:?}", other),
        }
    }

    #[tokio::test]
    async fn update_is_owner_only() {
        let repo = Arc::new(InMemoryPredictionRepository::new());
        let source = Arc::new(InMemoryPerformanceData::new());
        source.add_event(scheduled_event("evt-1", 3));
        let service = service_with(repo, source);

        let prediction = service.submit(submit_request("user-1", "evt-1")).await.unwrap();

        let result = service
            .update(
                prediction.id,
                UpdatePredictionRequest {
                    user_id: "user-2".to_string(),
                    claim: None,
                    rationale: Some("not mine".to_string()),
                    confidence: None,
                    is_public: None,
                },
            )
            .await;
        assert!(matches!(result.unwrap_err(), AppError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn update_rejects_locked_prediction() {
        let repo = Arc::new(InMemoryPredictionRepository::new());
        let source = Arc::new(InMemoryPerformanceData::new());
        let service = service_with(repo, source);

        let mut request = submit_request("user-1", "evt-1");
        request.locks_at = Some(Utc::now() - Duration::minutes(1));
        let prediction = service.submit(request).await.unwrap();

        let result = service
            .update(
                prediction.id,
                UpdatePredictionRequest {
                    user_id: "user-1".to_string(),
                    claim: None,
                    rationale: Some("too late".to_string()),
                    confidence: None,
                    is_public: None,
                },
            )
            .await;
        assert!(matches!(result.unwrap_err(), AppError::Locked(_)));
    }

    #[tokio::test]
    async fn update_rejects_claim_type_change() {
        let repo = Arc::new(InMemoryPredictionRepository::new());
        let source = Arc::new(InMemoryPerformanceData::new());
        source.add_event(scheduled_event("evt-1", 3));
        let service = service_with(repo, source);

        let prediction = service.submit(submit_request("user-1", "evt-1")).await.unwrap();

        let result = service
            .update(
                prediction.id,
                UpdatePredictionRequest {
                    user_id: "user-1".to_string(),
                    claim: Some(Claim::WeeklyWinner {
                        pick: "home".to_string(),
                    }),
                    rationale: None,
                    confidence: None,
                    is_public: None,
                },
            )
            .await;
        assert!(matches!(result.unwrap_err(), AppError::Validation(_)));
    }

    #[tokio::test]
    async fn update_applies_changes_while_open() {
        let repo = Arc::new(InMemoryPredictionRepository::new());
        let source = Arc::new(InMemoryPerformanceData::new());
        source.add_event(scheduled_event("evt-1", 3));
        let service = service_with(repo, source);

        let prediction = service.submit(submit_request("user-1", "evt-1")).await.unwrap();

        let updated = service
            .update(
                prediction.id,
                UpdatePredictionRequest {
                    user_id: "user-1".to_string(),
                    claim: Some(Claim::Benchmark {
                        stat: "rush_yards".to_string(),
                        direction: Direction::Under,
                        line: 55.5,
                    }),
                    rationale: Some("tough defense".to_string()),
                    confidence: Some(crate::prediction::models::Confidence::High),
                    is_public: Some(false),
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.claim.direction(), Some(Direction::Under));
        assert_eq!(updated.rationale.as_deref(), Some("tough defense"));
        assert!(!updated.is_public);
    }

    #[tokio::test]
    async fn delete_rejects_resolved_prediction() {
        let repo = Arc::new(InMemoryPredictionRepository::new());
        let source = Arc::new(InMemoryPerformanceData::new());
        source.add_event(scheduled_event("evt-1", 3));
        let service = service_with(Arc::clone(&repo), source);

        let prediction = service.submit(submit_request("user-1", "evt-1")).await.unwrap();
        repo.resolve(prediction.id, PredictionStatus::Correct, 1.0, Utc::now())
            .await
            .unwrap();

        let result = service.delete(prediction.id, "user-1").await;
        assert!(matches!(result.unwrap_err(), AppError::Locked(_)));
    }

    #[tokio::test]
    async fn delete_removes_pending_prediction() {
        let repo = Arc::new(InMemoryPredictionRepository::new());
        let source = Arc::new(InMemoryPerformanceData::new());
        source.add_event(scheduled_event("evt-1", 3));
        let service = service_with(Arc::clone(&repo), source);

        let prediction = service.submit(submit_request("user-1", "evt-1")).await.unwrap();
        service.delete(prediction.id, "user-1").await.unwrap();

        assert!(repo.get(prediction.id).await.unwrap().is_none());
    }
}
