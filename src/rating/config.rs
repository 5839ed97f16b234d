use super::models::RatingTier;

/// Immutable rating constants, injected at construction.
#[derive(Debug, Clone)]
pub struct RatingConfig {
    /// Graded calls required before a rating is computed at all
    pub min_sample: u32,
    /// e-folding time of the recency decay on the accuracy component
    pub decay_days: f64,
    /// Window for the volume component
    pub trailing_window_days: i64,
    /// Graded-call count that maxes the volume component
    pub volume_ceiling: u32,
    pub weight_accuracy: f64,
    pub weight_consistency: f64,
    pub weight_volume: f64,
    pub weight_breadth: f64,
    /// Calls a week needs to count toward consistency
    pub consistency_min_week_calls: usize,
    /// Qualifying weeks below which consistency defaults to the midpoint
    pub consistency_min_weeks: usize,
    /// Prediction-type count that maxes the breadth type share
    pub breadth_max_types: u32,
    /// Sport count that maxes the breadth sport share
    pub breadth_max_sports: u32,
    /// Share of breadth carried by type variety (the rest is sports)
    pub breadth_type_share: f64,
    /// Absolute movement below which the trend reads Stable
    pub trend_threshold: u32,
    /// Minimum age of the previous row before trend is re-evaluated
    pub trend_min_age_days: i64,
    /// (overall floor, tier), descending; below all floors is Developing
    pub tier_floors: Vec<(u32, RatingTier)>,
}

impl Default for RatingConfig {
    fn default() -> Self {
        Self {
            min_sample: 50,
            decay_days: 90.0,
            trailing_window_days: 90,
            volume_ceiling: 500,
            weight_accuracy: 0.40,
            weight_consistency: 0.25,
            weight_volume: 0.20,
            weight_breadth: 0.15,
            consistency_min_week_calls: 2,
            consistency_min_weeks: 3,
            breadth_max_types: 4,
            breadth_max_sports: 4,
            breadth_type_share: 0.6,
            trend_threshold: 3,
            trend_min_age_days: 1,
            tier_floors: vec![
                (90, RatingTier::Elite),
                (80, RatingTier::Expert),
                (70, RatingTier::Sharp),
                (60, RatingTier::Solid),
                (50, RatingTier::Average),
            ],
        }
    }
}

impl RatingConfig {
    /// First floor the overall clears, descending.
    pub fn tier_for(&self, overall: u32) -> RatingTier {
        self.tier_floors
            .iter()
            .find(|(floor, _)| overall >= *floor)
            .map(|(_, tier)| *tier)
            .unwrap_or(RatingTier::Developing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(100, RatingTier::Elite)]
    #[case(90, RatingTier::Elite)]
    #[case(89, RatingTier::Expert)]
    #[case(70, RatingTier::Sharp)]
    #[case(60, RatingTier::Solid)]
    #[case(50, RatingTier::Average)]
    #[case(49, RatingTier::Developing)]
    #[case(0, RatingTier::Developing)]
    fn tier_floors_are_inclusive(#[case] overall: u32, #[case] expected: RatingTier) {
        assert_eq!(RatingConfig::default().tier_for(overall), expected);
    }
}
