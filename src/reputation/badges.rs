use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use tracing::warn;

use super::config::BadgeThresholds;
use super::models::{Badge, BadgeKind, BadgeTier};
use crate::prediction::models::{PredictionModel, PredictionStatus, PredictionType};
use crate::prediction::repository::PredictionRepository;

/// Everything a badge pass needs, precomputed by the aggregator.
pub struct BadgeInputs<'a> {
    pub total: u32,
    pub accuracy: f64,
    pub best_streak: u32,
    /// Correct/Incorrect predictions in scope, oldest first
    pub graded: &'a [PredictionModel],
    /// Every prediction the user has made, any state, oldest first
    pub history: &'a [PredictionModel],
    /// Badges from the previously stored row, for earned_at carry-over
    pub previous: &'a [Badge],
}

/// Evaluates every badge rule against the recomputed stats.
///
/// Rules are independent: a failure in one (the upset rule runs
/// secondary queries) skips that badge and never aborts the pass.
/// Badges already present at the same kind and tier keep their original
/// earned_at; upgrades and new awards get a fresh timestamp.
pub async fn evaluate(
    config: &BadgeThresholds,
    repository: &dyn PredictionRepository,
    inputs: BadgeInputs<'_>,
) -> Vec<Badge> {
    let now = Utc::now();
    let mut earned: Vec<(BadgeKind, BadgeTier)> = Vec::new();

    if let Some(tier) = milestone_tier(inputs.best_streak, &config.streak) {
        earned.push((BadgeKind::HotStreak, tier));
    }
    if let Some(tier) = milestone_tier(inputs.total, &config.volume) {
        earned.push((BadgeKind::Volume, tier));
    }
    if inputs.total >= config.sharpshooter_min_total
        && inputs.accuracy >= config.sharpshooter_min_accuracy
    {
        earned.push((BadgeKind::Sharpshooter, BadgeTier::Gold));
    }

    match called_upset(config, repository, inputs.graded).await {
        Ok(true) => earned.push((BadgeKind::UpsetCaller, BadgeTier::Platinum)),
        Ok(false) => {}
        Err(err) => {
            warn!(error = %err, "Skipping upset caller badge: consensus lookup failed");
        }
    }

    let bold_correct = inputs
        .graded
        .iter()
        .filter(|p| {
            p.prediction_type == PredictionType::BoldCall
                && p.status == PredictionStatus::Correct
        })
        .count() as u32;
    if let Some(tier) = milestone_tier(bold_correct, &config.bold) {
        earned.push((BadgeKind::BoldAndRight, tier));
    }

    let active_weeks = longest_consecutive_weeks(inputs.history);
    if let Some(tier) = milestone_tier(active_weeks, &config.iron_weeks) {
        earned.push((BadgeKind::IronPredictor, tier));
    }

    earned
        .into_iter()
        .map(|(kind, tier)| {
            let earned_at = inputs
                .previous
                .iter()
                .find(|badge| badge.kind == kind && badge.tier == tier)
                .map(|badge| badge.earned_at)
                .unwrap_or(now);
            Badge::new(kind, tier, earned_at)
        })
        .collect()
}

/// Highest tier on an ascending (floor, tier) ladder the value reaches.
fn milestone_tier(value: u32, ladder: &[(u32, BadgeTier)]) -> Option<BadgeTier> {
    ladder
        .iter()
        .filter(|(floor, _)| value >= *floor)
        .map(|(_, tier)| *tier)
        .last()
}

/// True if any correct call went against a well-established public
/// consensus: at least `upset_min_public_calls` directional public calls
/// on the same target, with agreement below `upset_max_agreement`.
async fn called_upset(
    config: &BadgeThresholds,
    repository: &dyn PredictionRepository,
    graded: &[PredictionModel],
) -> Result<bool, crate::shared::AppError> {
    for prediction in graded {
        if prediction.status != PredictionStatus::Correct {
            continue;
        }
        let Some(direction) = prediction.claim.direction() else {
            continue;
        };

        let public = repository
            .list_public_for_target(
                &prediction.event_id,
                prediction.subject_id.as_deref(),
                prediction.prediction_type,
            )
            .await?;
        let directional: Vec<_> = public
            .iter()
            .filter_map(|p| p.claim.direction())
            .collect();
        if directional.len() < config.upset_min_public_calls {
            continue;
        }

        let agreeing = directional.iter().filter(|d| **d == direction).count();
        let agreement = agreeing as f64 / directional.len() as f64;
        if agreement < config.upset_max_agreement {
            return Ok(true);
        }
    }
    Ok(false)
}

/// ISO-week Monday of a timestamp's date.
fn week_monday(at: DateTime<Utc>) -> NaiveDate {
    let date = at.date_naive();
    date - Duration::days(date.weekday().num_days_from_monday() as i64)
}

/// Longest run of consecutive calendar weeks containing at least one
/// prediction.
fn longest_consecutive_weeks(history: &[PredictionModel]) -> u32 {
    let mut mondays: Vec<NaiveDate> = history.iter().map(|p| week_monday(p.created_at)).collect();
    mondays.sort();
    mondays.dedup();

    let mut best: u32 = 0;
    let mut run: u32 = 0;
    let mut previous: Option<NaiveDate> = None;
    for monday in mondays {
        run = match previous {
            Some(prev) if monday - prev == Duration::days(7) => run + 1,
            _ => 1,
        };
        best = best.max(run);
        previous = Some(monday);
    }
    best
}
