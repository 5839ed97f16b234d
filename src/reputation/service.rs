use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{debug, instrument};

use super::badges::{self, BadgeInputs};
use super::config::ReputationConfig;
use super::models::{SportScope, UserReputation};
use super::repository::ReputationRepository;
use crate::prediction::models::{PredictionModel, PredictionStatus};
use crate::prediction::repository::PredictionRepository;
use crate::shared::AppError;

/// Rebuilds reputation rows wholesale from resolved history. Rows are
/// never incremented in place: every pass recomputes from the prediction
/// store, so a missed update is healed by the next one.
pub struct ReputationService {
    prediction_repository: Arc<dyn PredictionRepository + Send + Sync>,
    repository: Arc<dyn ReputationRepository + Send + Sync>,
    config: ReputationConfig,
}

impl ReputationService {
    pub fn new(
        prediction_repository: Arc<dyn PredictionRepository + Send + Sync>,
        repository: Arc<dyn ReputationRepository + Send + Sync>,
        config: ReputationConfig,
    ) -> Self {
        Self {
            prediction_repository,
            repository,
            config,
        }
    }

    /// Returns the stored row for a scope, or an empty rookie row when
    /// the user has no history there yet.
    pub async fn get(
        &self,
        user_id: &str,
        scope: SportScope,
    ) -> Result<UserReputation, AppError> {
        let stored = self.repository.get(user_id, scope).await?;
        Ok(stored.unwrap_or_else(|| UserReputation::empty(user_id, scope)))
    }

    /// Recomputes every scope the user has resolved activity in, plus
    /// the all-sports aggregate.
    #[instrument(skip(self))]
    pub async fn recompute_user(&self, user_id: &str) -> Result<Vec<UserReputation>, AppError> {
        let resolved = self
            .prediction_repository
            .list_resolved_for_user(user_id, None)
            .await?;
        let sports: BTreeSet<_> = resolved.iter().map(|p| p.sport).collect();

        let mut rows = Vec::with_capacity(sports.len() + 1);
        rows.push(self.recompute(user_id, SportScope::All).await?);
        for sport in sports {
            rows.push(self.recompute(user_id, SportScope::Sport(sport)).await?);
        }
        Ok(rows)
    }

    /// Recomputes one (user, scope) row from scratch and upserts it.
    #[instrument(skip(self))]
    pub async fn recompute(
        &self,
        user_id: &str,
        scope: SportScope,
    ) -> Result<UserReputation, AppError> {
        let resolved = self
            .prediction_repository
            .list_resolved_for_user(user_id, scope.sport())
            .await?;
        // Pushes and voids are terminal but do not count for or against
        let graded: Vec<PredictionModel> = resolved
            .into_iter()
            .filter(|p| p.status.affects_reputation())
            .collect();

        let history: Vec<PredictionModel> = self
            .prediction_repository
            .list_for_user(user_id)
            .await?
            .into_iter()
            .filter(|p| scope.sport().map_or(true, |sport| p.sport == sport))
            .collect();

        let total = graded.len() as u32;
        let correct = graded
            .iter()
            .filter(|p| p.status == PredictionStatus::Correct)
            .count() as u32;
        let accuracy = if total > 0 {
            round4(correct as f64 / total as f64)
        } else {
            0.0
        };

        let current_streak = graded
            .iter()
            .rev()
            .take_while(|p| p.status == PredictionStatus::Correct)
            .count() as u32;
        let best_streak = best_streak(&graded);
        let weighted_accuracy = weighted_accuracy(&graded);
        let tier = self.config.tier_for(total, accuracy);

        let previous = self
            .repository
            .get(user_id, scope)
            .await?
            .map(|row| row.badges)
            .unwrap_or_default();
        let earned = badges::evaluate(
            &self.config.badges,
            self.prediction_repository.as_ref(),
            BadgeInputs {
                total,
                accuracy,
                best_streak,
                graded: &graded,
                history: &history,
                previous: &previous,
            },
        )
        .await;

        let row = UserReputation {
            user_id: user_id.to_string(),
            scope,
            total,
            correct,
            accuracy,
            current_streak,
            best_streak,
            weighted_accuracy,
            tier,
            badges: earned,
            updated_at: chrono::Utc::now(),
        };
        self.repository.upsert(&row).await?;

        debug!(
            user_id = %user_id,
            scope = %scope,
            total,
            accuracy,
            tier = %tier,
            badges = row.badges.len(),
            "Reputation recomputed"
        );
        Ok(row)
    }
}

fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

/// Longest run of consecutive Correct results, oldest-first input.
fn best_streak(graded: &[PredictionModel]) -> u32 {
    let mut best = 0u32;
    let mut run = 0u32;
    for prediction in graded {
        if prediction.status == PredictionStatus::Correct {
            run += 1;
            best = best.max(run);
        } else {
            run = 0;
        }
    }
    best
}

/// Accuracy with each call weighted by self-reported confidence.
/// Unstated confidence weighs as medium.
fn weighted_accuracy(graded: &[PredictionModel]) -> f64 {
    let total_weight: f64 = graded.iter().map(|p| p.confidence_weight()).sum();
    if total_weight == 0.0 {
        return 0.0;
    }
    let correct_weight: f64 = graded
        .iter()
        .filter(|p| p.status == PredictionStatus::Correct)
        .map(|p| p.confidence_weight())
        .sum();
    round4(correct_weight / total_weight)
}
