use chrono::{DateTime, Datelike, Duration, Utc};
use futures::{stream, StreamExt};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use super::config::RatingConfig;
use super::models::{ClutchRating, RatingTrend};
use super::repository::RatingRepository;
use crate::prediction::models::{PredictionModel, PredictionStatus};
use crate::prediction::repository::PredictionRepository;
use crate::shared::AppError;

/// Outcome of a full-population recompute run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RecomputeSummary {
    pub users: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub errors: Vec<String>,
}

/// Composite 0-100 rating engine. Like reputation, ratings are always
/// rebuilt from full history; the stored row only matters as the trend
/// baseline.
pub struct RatingService {
    prediction_repository: Arc<dyn PredictionRepository + Send + Sync>,
    repository: Arc<dyn RatingRepository + Send + Sync>,
    config: RatingConfig,
}

impl RatingService {
    pub fn new(
        prediction_repository: Arc<dyn PredictionRepository + Send + Sync>,
        repository: Arc<dyn RatingRepository + Send + Sync>,
        config: RatingConfig,
    ) -> Self {
        Self {
            prediction_repository,
            repository,
            config,
        }
    }

    /// Returns the stored rating row, or the ungated placeholder for a
    /// user with no row yet.
    pub async fn get(&self, user_id: &str) -> Result<ClutchRating, AppError> {
        let stored = self.repository.get(user_id).await?;
        Ok(stored.unwrap_or_else(|| ClutchRating::ungated(user_id, 0, self.config.min_sample)))
    }

    /// Recomputes one user's rating from scratch and upserts it.
    #[instrument(skip(self))]
    pub async fn recompute_user(&self, user_id: &str) -> Result<ClutchRating, AppError> {
        let resolved = self
            .prediction_repository
            .list_resolved_for_user(user_id, None)
            .await?;
        let graded: Vec<PredictionModel> = resolved
            .into_iter()
            .filter(|p| p.status.affects_reputation())
            .collect();
        let total_graded = graded.len() as u32;

        if total_graded < self.config.min_sample {
            debug!(
                user_id = %user_id,
                graded = total_graded,
                required = self.config.min_sample,
                "Below rating gate, storing ungated row"
            );
            let row = ClutchRating::ungated(user_id, total_graded, self.config.min_sample);
            self.repository.upsert(&row).await?;
            return Ok(row);
        }

        let now = Utc::now();
        let previous = self.repository.get(user_id).await?;

        let (accuracy, decayed_fraction) = self.accuracy_component(&graded, now);
        let (consistency, qualifying_weeks, weekly_stddev) =
            self.consistency_component(&graded);
        let (volume, trailing_count) = self.volume_component(&graded, now);
        let (breadth, distinct_types, distinct_sports) = self.breadth_component(&graded);

        let overall = (accuracy as f64 * self.config.weight_accuracy
            + consistency as f64 * self.config.weight_consistency
            + volume as f64 * self.config.weight_volume
            + breadth as f64 * self.config.weight_breadth)
            .round() as u32;
        let tier = self.config.tier_for(overall);
        let trend = self.trend(overall, previous.as_ref(), now);

        let row = ClutchRating {
            user_id: user_id.to_string(),
            overall: Some(overall),
            accuracy: Some(accuracy),
            consistency: Some(consistency),
            volume: Some(volume),
            breadth: Some(breadth),
            tier,
            trend,
            total_graded,
            inputs: serde_json::json!({
                "graded": total_graded,
                "decayed_accuracy": decayed_fraction,
                "qualifying_weeks": qualifying_weeks,
                "weekly_stddev": weekly_stddev,
                "trailing_volume": trailing_count,
                "distinct_types": distinct_types,
                "distinct_sports": distinct_sports,
            }),
            updated_at: now,
        };
        self.repository.upsert(&row).await?;

        debug!(
            user_id = %user_id,
            overall,
            accuracy,
            consistency,
            volume,
            breadth,
            tier = %tier,
            trend = %trend,
            "Rating recomputed"
        );
        Ok(row)
    }

    /// Recomputes every user with resolved activity, at most
    /// `concurrency` users in flight. Users are independent and upserts
    /// are last-write-wins, so order does not matter. Per-user failures
    /// are counted, not fatal.
    #[instrument(skip(self))]
    pub async fn recompute_all(&self, concurrency: usize) -> Result<RecomputeSummary, AppError> {
        let user_ids = self.prediction_repository.user_ids_with_resolved().await?;
        info!(users = user_ids.len(), concurrency, "Recomputing all ratings");

        let results: Vec<(String, Result<ClutchRating, AppError>)> = stream::iter(user_ids)
            .map(|user_id| async move {
                let result = self.recompute_user(&user_id).await;
                (user_id, result)
            })
            .buffer_unordered(concurrency.max(1))
            .collect()
            .await;

        let mut summary = RecomputeSummary {
            users: results.len(),
            ..Default::default()
        };
        for (user_id, result) in results {
            match result {
                Ok(_) => summary.succeeded += 1,
                Err(err) => {
                    warn!(user_id = %user_id, error = %err, "Rating recompute failed");
                    summary.failed += 1;
                    summary.errors.push(format!("{}: {}", user_id, err));
                }
            }
        }

        info!(
            users = summary.users,
            succeeded = summary.succeeded,
            failed = summary.failed,
            "Rating recompute run finished"
        );
        Ok(summary)
    }

    /// Recency-decayed accuracy: each call weighs exp(-age / decay).
    fn accuracy_component(
        &self,
        graded: &[PredictionModel],
        now: DateTime<Utc>,
    ) -> (u32, f64) {
        let mut weighted_total = 0.0;
        let mut weighted_correct = 0.0;
        for prediction in graded {
            let age_days =
                (now - prediction.graded_at()).num_seconds().max(0) as f64 / 86_400.0;
            let weight = (-age_days / self.config.decay_days).exp();
            weighted_total += weight;
            if prediction.status == PredictionStatus::Correct {
                weighted_correct += weight;
            }
        }
        if weighted_total == 0.0 {
            return (0, 0.0);
        }
        let fraction = weighted_correct / weighted_total;
        ((100.0 * fraction).round() as u32, fraction)
    }

    /// Week-to-week steadiness: stddev of per-ISO-week accuracy over
    /// weeks with enough calls. Too few qualifying weeks reads as the
    /// midpoint rather than punishing new users.
    fn consistency_component(
        &self,
        graded: &[PredictionModel],
    ) -> (u32, usize, Option<f64>) {
        let mut weeks: BTreeMap<(i32, u32), (u32, u32)> = BTreeMap::new();
        for prediction in graded {
            let week = prediction.graded_at().iso_week();
            let entry = weeks.entry((week.year(), week.week())).or_default();
            entry.1 += 1;
            if prediction.status == PredictionStatus::Correct {
                entry.0 += 1;
            }
        }

        let weekly: Vec<f64> = weeks
            .values()
            .filter(|(_, total)| *total as usize >= self.config.consistency_min_week_calls)
            .map(|(correct, total)| *correct as f64 / *total as f64)
            .collect();
        if weekly.len() < self.config.consistency_min_weeks {
            return (50, weekly.len(), None);
        }

        let mean = weekly.iter().sum::<f64>() / weekly.len() as f64;
        let variance =
            weekly.iter().map(|a| (a - mean).powi(2)).sum::<f64>() / weekly.len() as f64;
        let stddev = variance.sqrt();
        let score = (100.0 * (1.0 - stddev / 0.5)).round().clamp(0.0, 100.0) as u32;
        (score, weekly.len(), Some(stddev))
    }

    /// Trailing-window activity on a log scale against the ceiling.
    fn volume_component(
        &self,
        graded: &[PredictionModel],
        now: DateTime<Utc>,
    ) -> (u32, usize) {
        let cutoff = now - Duration::days(self.config.trailing_window_days);
        let count = graded
            .iter()
            .filter(|p| p.graded_at() >= cutoff)
            .count();
        if count == 0 {
            return (0, 0);
        }
        let ratio = (count as f64).log2() / (self.config.volume_ceiling as f64).log2();
        let score = (100.0 * ratio).round().min(100.0) as u32;
        (score, count)
    }

    /// Variety of prediction types and sports, capped and shared.
    fn breadth_component(&self, graded: &[PredictionModel]) -> (u32, usize, usize) {
        let types: BTreeSet<_> = graded.iter().map(|p| p.prediction_type).collect();
        let sports: BTreeSet<_> = graded.iter().map(|p| p.sport).collect();

        let type_share = (types.len() as f64).min(self.config.breadth_max_types as f64)
            / self.config.breadth_max_types as f64;
        let sport_share = (sports.len() as f64).min(self.config.breadth_max_sports as f64)
            / self.config.breadth_max_sports as f64;
        let score = (100.0
            * (type_share * self.config.breadth_type_share
                + sport_share * (1.0 - self.config.breadth_type_share)))
            .round()
            .min(100.0) as u32;
        (score, types.len(), sports.len())
    }

    /// Trend against the immediately preceding stored value. Re-evaluated
    /// only when the previous row is at least a day old; a younger row
    /// keeps its trend so back-to-back recomputes are stable.
    fn trend(
        &self,
        overall: u32,
        previous: Option<&ClutchRating>,
        now: DateTime<Utc>,
    ) -> RatingTrend {
        let Some(previous) = previous else {
            return RatingTrend::Stable;
        };
        if now - previous.updated_at < Duration::days(self.config.trend_min_age_days) {
            return previous.trend;
        }
        let Some(previous_overall) = previous.overall else {
            return RatingTrend::Stable;
        };
        let delta = overall as i64 - previous_overall as i64;
        let threshold = self.config.trend_threshold as i64;
        if delta > threshold {
            RatingTrend::Up
        } else if delta < -threshold {
            RatingTrend::Down
        } else {
            RatingTrend::Stable
        }
    }
}
