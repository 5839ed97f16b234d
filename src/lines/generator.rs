use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use super::models::{LineResult, PropLine};
use super::repository::LineRepository;
use crate::prediction::models::Sport;
use crate::resolution::service::{ResolutionService, ResolutionSummary};
use crate::resolution::verdict::side_of_line;
use crate::shared::AppError;
use crate::statsfeed::PerformanceDataSource;

/// Weight applied per step back in time when averaging game logs.
const EWMA_DECAY: f64 = 0.9;
/// Game logs considered per subject.
const MAX_GAME_LOGS: usize = 10;
const METHOD_TAG: &str = "ewma-0.9/last-10";

/// Stat categories lined per position, with the minimum trailing average
/// below which a line is suppressed as noise.
fn tracked_stats(position: &str) -> &'static [(&'static str, f64)] {
    match position {
        "QB" => &[("pass_yards", 150.0), ("pass_tds", 0.5)],
        "RB" => &[("rush_yards", 30.0), ("receptions", 1.5)],
        "WR" | "TE" => &[("rec_yards", 25.0), ("receptions", 1.5)],
        "G" | "F" | "C" => &[("points", 8.0), ("rebounds", 3.0), ("assists", 2.0)],
        _ => &[],
    }
}

/// Outcome of a weekly line resolution run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct LineWeekSummary {
    pub lines: usize,
    pub graded_lines: usize,
    pub missing_actuals: usize,
    pub predictions: ResolutionSummary,
}

/// Derives weekly benchmark lines from trailing game history and, once
/// actuals land, closes the loop by grading the lines and every
/// prediction referencing them.
pub struct LineGenerator {
    repository: Arc<dyn LineRepository + Send + Sync>,
    performance_source: Arc<dyn PerformanceDataSource + Send + Sync>,
    resolution_service: Arc<ResolutionService>,
}

impl LineGenerator {
    pub fn new(
        repository: Arc<dyn LineRepository + Send + Sync>,
        performance_source: Arc<dyn PerformanceDataSource + Send + Sync>,
        resolution_service: Arc<ResolutionService>,
    ) -> Self {
        Self {
            repository,
            performance_source,
            resolution_service,
        }
    }

    /// Generates one line per (eligible subject, tracked stat) for the
    /// week. Re-running updates existing lines rather than duplicating.
    #[instrument(skip(self))]
    pub async fn generate_week(
        &self,
        sport: Sport,
        season: u16,
        week: u8,
    ) -> Result<Vec<PropLine>, AppError> {
        let subjects = self
            .performance_source
            .eligible_subjects(sport, season, week)
            .await?;

        let mut generated = Vec::new();
        let mut suppressed = 0usize;
        for subject in subjects {
            let stats = tracked_stats(&subject.position);
            if stats.is_empty() {
                continue;
            }
            let logs = self
                .performance_source
                .recent_game_logs(sport, &subject.subject_id, season, week, MAX_GAME_LOGS)
                .await?;
            if logs.is_empty() {
                continue;
            }

            for (stat, floor) in stats {
                // Newest first; a log without the stat contributes nothing
                let values: Vec<f64> = logs
                    .iter()
                    .filter_map(|log| log.stats.get(*stat).copied())
                    .collect();
                if values.is_empty() {
                    continue;
                }
                let average = ewma(&values);
                if average < *floor {
                    debug!(
                        subject_id = %subject.subject_id,
                        stat = *stat,
                        average,
                        floor = *floor,
                        "Suppressing line below category floor"
                    );
                    suppressed += 1;
                    continue;
                }

                let stored = self
                    .repository
                    .upsert(&PropLine {
                        id: Uuid::new_v4(),
                        sport,
                        season,
                        week,
                        subject_id: subject.subject_id.clone(),
                        stat: (*stat).to_string(),
                        line: round_to_half(average),
                        method: METHOD_TAG.to_string(),
                        result: None,
                        actual: None,
                        event_id: PropLine::event_key(
                            sport,
                            season,
                            week,
                            &subject.subject_id,
                            stat,
                        ),
                    })
                    .await?;
                generated.push(stored);
            }
        }

        info!(
            %sport,
            season,
            week,
            generated = generated.len(),
            suppressed,
            "Weekly lines generated"
        );
        Ok(generated)
    }

    /// Fills in actuals for a week's lines, sets each line's result, and
    /// grades referencing predictions. Lines with no observed actual are
    /// skipped and left open rather than guessed at.
    #[instrument(skip(self))]
    pub async fn resolve_week(
        &self,
        sport: Sport,
        season: u16,
        week: u8,
    ) -> Result<LineWeekSummary, AppError> {
        let lines = self.repository.list_for_week(sport, season, week).await?;
        let mut summary = LineWeekSummary {
            lines: lines.len(),
            ..Default::default()
        };

        for mut line in lines {
            let actual = self
                .performance_source
                .actual_stat(&line.event_id, &line.subject_id, &line.stat)
                .await?;
            let Some(actual) = actual else {
                warn!(
                    subject_id = %line.subject_id,
                    stat = %line.stat,
                    "No actual observed for line, leaving open"
                );
                summary.missing_actuals += 1;
                continue;
            };

            let result = LineResult::from_side(side_of_line(actual, line.line));
            line.actual = Some(actual);
            line.result = Some(result);
            self.repository.upsert(&line).await?;
            summary.graded_lines += 1;

            let graded = self
                .resolution_service
                .resolve_line_referencers(&line.event_id, result.side())
                .await?;
            summary.predictions.resolved += graded.resolved;
            summary.predictions.correct += graded.correct;
            summary.predictions.incorrect += graded.incorrect;
            summary.predictions.pushed += graded.pushed;
            summary.predictions.voided += graded.voided;
            summary.predictions.errors.extend(graded.errors);
        }

        info!(
            %sport,
            season,
            week,
            lines = summary.lines,
            graded_lines = summary.graded_lines,
            missing_actuals = summary.missing_actuals,
            predictions = summary.predictions.resolved,
            "Weekly lines resolved"
        );
        Ok(summary)
    }
}

/// Exponentially weighted average, newest value first.
fn ewma(values: &[f64]) -> f64 {
    let mut weighted_sum = 0.0;
    let mut weight_total = 0.0;
    let mut weight = 1.0;
    for value in values {
        weighted_sum += value * weight;
        weight_total += weight;
        weight *= EWMA_DECAY;
    }
    weighted_sum / weight_total
}

fn round_to_half(value: f64) -> f64 {
    (value * 2.0).round() / 2.0
}
