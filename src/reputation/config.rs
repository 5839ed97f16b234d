use super::models::{BadgeTier, ReputationTier};

/// One row of the tier ladder: both minimums must be met.
#[derive(Debug, Clone, Copy)]
pub struct TierThreshold {
    pub tier: ReputationTier,
    pub min_predictions: u32,
    /// Fractional accuracy floor (0.58 = 58%)
    pub min_accuracy: f64,
}

/// Badge criteria, kept as data so tests can run against alternate
/// thresholds.
#[derive(Debug, Clone)]
pub struct BadgeThresholds {
    /// (best streak floor, tier awarded), ascending
    pub streak: Vec<(u32, BadgeTier)>,
    /// (total predictions floor, tier awarded), ascending
    pub volume: Vec<(u32, BadgeTier)>,
    pub sharpshooter_min_total: u32,
    pub sharpshooter_min_accuracy: f64,
    /// Minimum public calls on a target before an upset can be scored
    pub upset_min_public_calls: usize,
    /// Agreement share strictly below which a correct call is an upset
    pub upset_max_agreement: f64,
    /// (correct bold calls floor, tier awarded), ascending
    pub bold: Vec<(u32, BadgeTier)>,
    /// (consecutive active weeks floor, tier awarded), ascending
    pub iron_weeks: Vec<(u32, BadgeTier)>,
}

/// Immutable reputation thresholds, injected at construction instead of
/// living as module state.
#[derive(Debug, Clone)]
pub struct ReputationConfig {
    /// Ascending ladder; the highest satisfied row wins
    pub tiers: Vec<TierThreshold>,
    pub badges: BadgeThresholds,
}

impl Default for ReputationConfig {
    fn default() -> Self {
        Self {
            tiers: vec![
                TierThreshold {
                    tier: ReputationTier::Rookie,
                    min_predictions: 0,
                    min_accuracy: 0.0,
                },
                TierThreshold {
                    tier: ReputationTier::Contender,
                    min_predictions: 20,
                    min_accuracy: 0.50,
                },
                TierThreshold {
                    tier: ReputationTier::Sharp,
                    min_predictions: 50,
                    min_accuracy: 0.58,
                },
                TierThreshold {
                    tier: ReputationTier::Expert,
                    min_predictions: 100,
                    min_accuracy: 0.65,
                },
                TierThreshold {
                    tier: ReputationTier::Elite,
                    min_predictions: 200,
                    min_accuracy: 0.72,
                },
            ],
            badges: BadgeThresholds {
                streak: vec![
                    (5, BadgeTier::Bronze),
                    (10, BadgeTier::Silver),
                    (20, BadgeTier::Gold),
                ],
                volume: vec![
                    (50, BadgeTier::Bronze),
                    (100, BadgeTier::Silver),
                    (500, BadgeTier::Gold),
                ],
                sharpshooter_min_total: 10,
                sharpshooter_min_accuracy: 0.80,
                upset_min_public_calls: 5,
                upset_max_agreement: 0.20,
                bold: vec![(1, BadgeTier::Bronze), (5, BadgeTier::Gold)],
                iron_weeks: vec![(10, BadgeTier::Silver), (20, BadgeTier::Gold)],
            },
        }
    }
}

impl ReputationConfig {
    /// Highest tier whose prediction-count and accuracy floors are both
    /// met. Monotonic in (total, accuracy) as long as the ladder is.
    pub fn tier_for(&self, total: u32, accuracy: f64) -> ReputationTier {
        let mut best = ReputationTier::Rookie;
        for row in &self.tiers {
            if total >= row.min_predictions && accuracy >= row.min_accuracy {
                best = best.max(row.tier);
            }
        }
        best
    }
}
