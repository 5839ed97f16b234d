use chrono::Utc;
use serde::Serialize;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use super::verdict::{verdict_against_line, EventOutcome, Verdict, VerdictResolver};
use crate::prediction::models::{Direction, PredictionModel};
use crate::prediction::repository::PredictionRepository;
use crate::rating::service::RatingService;
use crate::reputation::service::ReputationService;
use crate::shared::AppError;
use crate::timeline::{TimelineBus, TimelineEvent};

/// Outcome of a batch resolution run. Batch callers get counts and error
/// strings instead of an abort on the first bad unit.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ResolutionSummary {
    pub resolved: usize,
    pub correct: usize,
    pub incorrect: usize,
    pub pushed: usize,
    pub voided: usize,
    pub errors: Vec<String>,
}

impl ResolutionSummary {
    fn record(&mut self, verdict: Verdict) {
        self.resolved += 1;
        match verdict {
            Verdict::Correct => self.correct += 1,
            Verdict::Incorrect => self.incorrect += 1,
            Verdict::Push => self.pushed += 1,
            Verdict::Voided => self.voided += 1,
        }
    }
}

/// Transitions predictions to their terminal state and triggers the
/// downstream reputation and rating recomputes.
pub struct ResolutionService {
    repository: Arc<dyn PredictionRepository + Send + Sync>,
    reputation_service: Arc<ReputationService>,
    rating_service: Arc<RatingService>,
    timeline_bus: TimelineBus,
}

impl ResolutionService {
    pub fn new(
        repository: Arc<dyn PredictionRepository + Send + Sync>,
        reputation_service: Arc<ReputationService>,
        rating_service: Arc<RatingService>,
        timeline_bus: TimelineBus,
    ) -> Self {
        Self {
            repository,
            reputation_service,
            rating_service,
            timeline_bus,
        }
    }

    /// Resolves a single prediction with the given verdict.
    ///
    /// The accuracy score defaults to 1.0 for Correct and 0.0 otherwise.
    /// Reputation and rating are refreshed for the owner only when the
    /// verdict is graded (Push and Voided leave them untouched). A
    /// recompute failure after the committed transition is logged, not
    /// propagated: a resolved prediction with stale reputation is an
    /// accepted inconsistency window closed by the next recompute.
    #[instrument(skip(self))]
    pub async fn resolve_one(
        &self,
        id: Uuid,
        verdict: Verdict,
        accuracy_score: Option<f64>,
    ) -> Result<PredictionModel, AppError> {
        let accuracy = accuracy_score.unwrap_or_else(|| verdict.default_accuracy());
        let resolved = self
            .repository
            .resolve(id, verdict.status(), accuracy, Utc::now())
            .await?;

        info!(
            prediction_id = %id,
            user_id = %resolved.user_id,
            verdict = %verdict,
            accuracy,
            "Prediction resolved"
        );

        if resolved.status.affects_reputation() {
            self.refresh_user(&resolved.user_id).await;
        }

        if let Some(subject_id) = resolved.subject_id.clone() {
            let bus = self.timeline_bus.clone();
            let event = TimelineEvent::PredictionResolved {
                prediction_id: resolved.id,
                user_id: resolved.user_id.clone(),
                subject_id,
                status: resolved.status,
                resolved_at: resolved.resolved_at.unwrap_or_else(Utc::now),
            };
            tokio::spawn(async move {
                bus.emit(event).await;
            });
        }

        Ok(resolved)
    }

    /// Resolves every still-Pending prediction for an event through the
    /// given resolver.
    ///
    /// A failure grading one prediction is recorded and skipped; the
    /// rest of the batch proceeds. Reputation and rating are recomputed
    /// once per distinct affected user after the batch, not once per
    /// prediction.
    #[instrument(skip(self, outcome, resolver))]
    pub async fn resolve_event(
        &self,
        event_id: &str,
        outcome: &EventOutcome,
        resolver: &dyn VerdictResolver,
    ) -> Result<ResolutionSummary, AppError> {
        let pending = self.repository.list_pending_for_event(event_id).await?;
        info!(event_id = %event_id, pending = pending.len(), "Resolving event batch");

        let mut summary = ResolutionSummary::default();
        let mut affected_users: BTreeSet<String> = BTreeSet::new();

        for prediction in pending {
            let verdict = match resolver.verdict(&prediction, outcome) {
                Ok(verdict) => verdict,
                Err(err) => {
                    warn!(
                        prediction_id = %prediction.id,
                        error = %err,
                        "Skipping prediction: resolver failed"
                    );
                    summary
                        .errors
                        .push(format!("{}: {}", prediction.id, err));
                    continue;
                }
            };

            match self
                .repository
                .resolve(
                    prediction.id,
                    verdict.status(),
                    verdict.default_accuracy(),
                    Utc::now(),
                )
                .await
            {
                Ok(resolved) => {
                    summary.record(verdict);
                    if resolved.status.affects_reputation() {
                        affected_users.insert(resolved.user_id);
                    }
                }
                Err(err) => {
                    warn!(
                        prediction_id = %prediction.id,
                        error = %err,
                        "Skipping prediction: state transition failed"
                    );
                    summary
                        .errors
                        .push(format!("{}: {}", prediction.id, err));
                }
            }
        }

        for user_id in &affected_users {
            self.refresh_user(user_id).await;
        }

        info!(
            event_id = %event_id,
            resolved = summary.resolved,
            correct = summary.correct,
            incorrect = summary.incorrect,
            pushed = summary.pushed,
            voided = summary.voided,
            errors = summary.errors.len(),
            affected_users = affected_users.len(),
            "Event batch resolved"
        );

        Ok(summary)
    }

    /// Grades every Pending prediction referencing a prop line by
    /// direction match against the line's result. A pushed line grades
    /// them Push with partial-credit accuracy 0.5. Predictions without a
    /// directional claim are recorded as errors and left Pending.
    #[instrument(skip(self))]
    pub async fn resolve_line_referencers(
        &self,
        event_id: &str,
        line_side: Option<Direction>,
    ) -> Result<ResolutionSummary, AppError> {
        let pending = self.repository.list_pending_for_event(event_id).await?;

        let mut summary = ResolutionSummary::default();
        let mut affected_users: BTreeSet<String> = BTreeSet::new();

        for prediction in pending {
            let Some(claimed) = prediction.claim.direction() else {
                summary
                    .errors
                    .push(format!("{}: claim has no direction", prediction.id));
                continue;
            };
            let (verdict, accuracy) = verdict_against_line(claimed, line_side);
            match self
                .repository
                .resolve(prediction.id, verdict.status(), accuracy, Utc::now())
                .await
            {
                Ok(resolved) => {
                    summary.record(verdict);
                    if resolved.status.affects_reputation() {
                        affected_users.insert(resolved.user_id);
                    }
                }
                Err(err) => {
                    warn!(
                        prediction_id = %prediction.id,
                        error = %err,
                        "Skipping prediction: state transition failed"
                    );
                    summary
                        .errors
                        .push(format!("{}: {}", prediction.id, err));
                }
            }
        }

        for user_id in &affected_users {
            self.refresh_user(user_id).await;
        }
        Ok(summary)
    }

    /// Rebuilds reputation and rating for one user, logging failures
    /// instead of propagating them.
    pub async fn refresh_user(&self, user_id: &str) {
        if let Err(err) = self.reputation_service.recompute_user(user_id).await {
            error!(user_id = %user_id, error = %err, "Failed to recompute reputation after resolution");
        }
        if let Err(err) = self.rating_service.recompute_user(user_id).await {
            error!(user_id = %user_id, error = %err, "Failed to recompute rating after resolution");
        }
    }
}
