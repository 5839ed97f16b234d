use chrono::Utc;
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use tracing::{debug, instrument};

use super::types::{
    AccuracyRow, ConsensusReport, DirectionBreakdown, RatingRow, Timeframe,
    TopManagerAgreement, WeightedBreakdown,
};
use crate::prediction::models::{Direction, PredictionStatus, PredictionType};
use crate::prediction::repository::PredictionRepository;
use crate::rating::repository::RatingRepository;
use crate::reputation::models::SportScope;
use crate::reputation::repository::ReputationRepository;
use crate::shared::AppError;
use crate::statsfeed::LeagueDirectory;

/// Resolved calls a user needs before appearing on a global board.
const GLOBAL_RESOLVED_FLOOR: u32 = 10;
/// Lower floor inside a single league, where fields are small.
const LEAGUE_RESOLVED_FLOOR: u32 = 3;
/// Rating at or above which a voter counts as a top manager.
const TOP_MANAGER_RATING: u32 = 70;
/// Default graded-call floor for the rating board.
const DEFAULT_RATING_BOARD_FLOOR: u32 = 5;

/// Read models over the prediction, reputation and rating stores:
/// accuracy boards, the rating board, and per-target consensus.
pub struct LeaderboardService {
    prediction_repository: Arc<dyn PredictionRepository + Send + Sync>,
    reputation_repository: Arc<dyn ReputationRepository + Send + Sync>,
    rating_repository: Arc<dyn RatingRepository + Send + Sync>,
    league_directory: Arc<dyn LeagueDirectory + Send + Sync>,
}

impl LeaderboardService {
    pub fn new(
        prediction_repository: Arc<dyn PredictionRepository + Send + Sync>,
        reputation_repository: Arc<dyn ReputationRepository + Send + Sync>,
        rating_repository: Arc<dyn RatingRepository + Send + Sync>,
        league_directory: Arc<dyn LeagueDirectory + Send + Sync>,
    ) -> Self {
        Self {
            prediction_repository,
            reputation_repository,
            rating_repository,
            league_directory,
        }
    }

    /// Ranks users by accuracy then raw correct count within a scope and
    /// timeframe, recomputed from the prediction store so windowed boards
    /// stay exact. Users below the resolved floor are hidden.
    #[instrument(skip(self))]
    pub async fn accuracy_board(
        &self,
        scope: SportScope,
        league_id: Option<&str>,
        timeframe: Timeframe,
        limit: usize,
    ) -> Result<Vec<AccuracyRow>, AppError> {
        let cutoff = timeframe.cutoff(Utc::now());
        let resolved = self
            .prediction_repository
            .list_resolved_since(scope.sport(), cutoff)
            .await?;

        let members: Option<HashSet<String>> = match league_id {
            Some(league_id) => Some(
                self.league_directory
                    .members(league_id)
                    .await?
                    .into_iter()
                    .collect(),
            ),
            None => None,
        };
        let floor = if league_id.is_some() {
            LEAGUE_RESOLVED_FLOOR
        } else {
            GLOBAL_RESOLVED_FLOOR
        };

        // (graded, correct) per user
        let mut tallies: BTreeMap<String, (u32, u32)> = BTreeMap::new();
        for prediction in resolved {
            if !prediction.status.affects_reputation() {
                continue;
            }
            if let Some(members) = &members {
                if !members.contains(&prediction.user_id) {
                    continue;
                }
            }
            let entry = tallies.entry(prediction.user_id).or_default();
            entry.0 += 1;
            if prediction.status == PredictionStatus::Correct {
                entry.1 += 1;
            }
        }

        let mut rows: Vec<AccuracyRow> = tallies
            .into_iter()
            .filter(|(_, (graded, _))| *graded >= floor)
            .map(|(user_id, (graded, correct))| AccuracyRow {
                user_id,
                resolved: graded,
                correct,
                accuracy: round4(correct as f64 / graded as f64),
            })
            .collect();
        rows.sort_by(|a, b| {
            b.accuracy
                .total_cmp(&a.accuracy)
                .then(b.correct.cmp(&a.correct))
                .then(a.user_id.cmp(&b.user_id))
        });
        rows.truncate(limit);

        debug!(scope = %scope, ?timeframe, rows = rows.len(), "Accuracy board built");
        Ok(rows)
    }

    /// Ranks rated users by stored composite descending. `min_graded`
    /// defaults to a small floor so fresh ratings on thin samples do not
    /// crowd the board.
    #[instrument(skip(self))]
    pub async fn rating_board(
        &self,
        min_graded: Option<u32>,
        limit: usize,
    ) -> Result<Vec<RatingRow>, AppError> {
        let floor = min_graded.unwrap_or(DEFAULT_RATING_BOARD_FLOOR);
        let ratings = self.rating_repository.list_all().await?;

        let mut rows = Vec::new();
        for rating in ratings {
            let Some(overall) = rating.overall else {
                continue;
            };
            if rating.total_graded < floor {
                continue;
            }
            let reputation_tier = self
                .reputation_repository
                .get(&rating.user_id, SportScope::All)
                .await?
                .map(|row| row.tier);
            rows.push(RatingRow {
                user_id: rating.user_id,
                overall,
                tier: rating.tier,
                trend: rating.trend,
                total_graded: rating.total_graded,
                reputation_tier,
            });
        }
        rows.sort_by(|a, b| {
            b.overall
                .cmp(&a.overall)
                .then(b.total_graded.cmp(&a.total_graded))
                .then(a.user_id.cmp(&b.user_id))
        });
        rows.truncate(limit);
        Ok(rows)
    }

    /// Tallies the claimed direction across public predictions on one
    /// target, three ways: raw counts, rating-weighted, and the majority
    /// among top-rated managers only.
    #[instrument(skip(self))]
    pub async fn consensus(
        &self,
        event_id: &str,
        subject_id: Option<&str>,
        prediction_type: PredictionType,
    ) -> Result<ConsensusReport, AppError> {
        let public = self
            .prediction_repository
            .list_public_for_target(event_id, subject_id, prediction_type)
            .await?;

        let mut raw = DirectionBreakdown::default();
        let mut weighted = WeightedBreakdown::default();
        let mut top_raters: u32 = 0;
        let mut top_over: u32 = 0;

        for prediction in &public {
            let Some(direction) = prediction.claim.direction() else {
                continue;
            };
            let overall = self
                .rating_repository
                .get(&prediction.user_id)
                .await?
                .and_then(|rating| rating.overall);
            // An unrated voter still counts once
            let weight = overall.map_or(1.0, |o| (o as f64 / 10.0).max(1.0));

            match direction {
                Direction::Over => {
                    raw.over += 1;
                    weighted.over_weight += weight;
                }
                Direction::Under => {
                    raw.under += 1;
                    weighted.under_weight += weight;
                }
            }
            if overall.is_some_and(|o| o >= TOP_MANAGER_RATING) {
                top_raters += 1;
                if direction == Direction::Over {
                    top_over += 1;
                }
            }
        }

        let total_votes = raw.over + raw.under;
        if total_votes > 0 {
            raw.over_pct = pct(raw.over as f64, total_votes as f64);
            raw.under_pct = pct(raw.under as f64, total_votes as f64);
        }
        let weight_total = weighted.over_weight + weighted.under_weight;
        if weight_total > 0.0 {
            weighted.over_pct = pct(weighted.over_weight, weight_total);
            weighted.under_pct = pct(weighted.under_weight, weight_total);
        }

        Ok(ConsensusReport {
            event_id: event_id.to_string(),
            subject_id: subject_id.map(str::to_string),
            prediction_type,
            total_votes,
            raw,
            weighted,
            top_managers: top_manager_agreement(top_raters, top_over),
        })
    }
}

fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

/// Percentage with one decimal.
fn pct(part: f64, whole: f64) -> f64 {
    (part / whole * 1000.0).round() / 10.0
}

fn top_manager_agreement(raters: u32, over: u32) -> TopManagerAgreement {
    let under = raters - over;
    let (direction, agreeing, label) = if raters == 0 {
        (
            None,
            0,
            "No top-rated managers have weighed in".to_string(),
        )
    } else if over > under {
        (
            Some(Direction::Over),
            over,
            format!("{} of {} top-rated managers like the over", over, raters),
        )
    } else if under > over {
        (
            Some(Direction::Under),
            under,
            format!("{} of {} top-rated managers like the under", under, raters),
        )
    } else {
        (None, over, "Top-rated managers are split".to_string())
    };
    TopManagerAgreement {
        raters,
        agreeing,
        direction,
        label,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prediction::models::{Claim, PredictionModel, Sport};
    use crate::prediction::repository::InMemoryPredictionRepository;
    use crate::rating::models::{ClutchRating, RatingTier, RatingTrend};
    use crate::rating::repository::InMemoryRatingRepository;
    use crate::reputation::repository::InMemoryReputationRepository;
    use crate::statsfeed::InMemoryLeagueDirectory;
    use chrono::{DateTime, Duration};
    use uuid::Uuid;

    /// Test helper functions for creating test data
    mod helpers {
        use super::*;

        pub struct Fixture {
            pub predictions: Arc<InMemoryPredictionRepository>,
            pub ratings: Arc<InMemoryRatingRepository>,
            pub leagues: Arc<InMemoryLeagueDirectory>,
            pub service: LeaderboardService,
        }

        pub fn fixture() -> Fixture {
            let predictions = Arc::new(InMemoryPredictionRepository::new());
            let reputations = Arc::new(InMemoryReputationRepository::new());
            let ratings = Arc::new(InMemoryRatingRepository::new());
            let leagues = Arc::new(InMemoryLeagueDirectory::new());
            let service = LeaderboardService::new(
                predictions.clone(),
                reputations,
                ratings.clone(),
                leagues.clone(),
            );
            Fixture {
                predictions,
                ratings,
                leagues,
                service,
            }
        }

        pub fn resolved(
            user_id: &str,
            sport: Sport,
            status: PredictionStatus,
            resolved_at: DateTime<Utc>,
        ) -> PredictionModel {
            PredictionModel {
                id: Uuid::new_v4(),
                user_id: user_id.to_string(),
                sport,
                prediction_type: PredictionType::Benchmark,
                category: "player-prop".to_string(),
                event_id: Uuid::new_v4().to_string(),
                subject_id: None,
                league_id: None,
                claim: Claim::Benchmark {
                    stat: "rush_yards".to_string(),
                    direction: Direction::Over,
                    line: 60.5,
                },
                is_public: true,
                locks_at: resolved_at,
                status,
                accuracy_score: None,
                rationale: None,
                confidence: None,
                created_at: resolved_at,
                resolved_at: Some(resolved_at),
            }
        }

        pub fn public_vote(
            user_id: &str,
            event_id: &str,
            subject_id: &str,
            direction: Direction,
        ) -> PredictionModel {
            let now = Utc::now();
            PredictionModel {
                id: Uuid::new_v4(),
                user_id: user_id.to_string(),
                sport: Sport::Nfl,
                prediction_type: PredictionType::Benchmark,
                category: "player-prop".to_string(),
                event_id: event_id.to_string(),
                subject_id: Some(subject_id.to_string()),
                league_id: None,
                claim: Claim::Benchmark {
                    stat: "rush_yards".to_string(),
                    direction,
                    line: 60.5,
                },
                is_public: true,
                locks_at: now + Duration::hours(1),
                status: PredictionStatus::Pending,
                accuracy_score: None,
                rationale: None,
                confidence: None,
                created_at: now,
                resolved_at: None,
            }
        }

        pub fn rated(user_id: &str, overall: u32) -> ClutchRating {
            ClutchRating {
                user_id: user_id.to_string(),
                overall: Some(overall),
                accuracy: Some(overall),
                consistency: Some(overall),
                volume: Some(overall),
                breadth: Some(overall),
                tier: RatingTier::Average,
                trend: RatingTrend::Stable,
                total_graded: 60,
                inputs: serde_json::json!({}),
                updated_at: Utc::now(),
            }
        }

        pub async fn seed_record(
            repo: &InMemoryPredictionRepository,
            user_id: &str,
            correct: usize,
            incorrect: usize,
        ) {
            let now = Utc::now();
            for i in 0..correct {
                repo.create(&resolved(
                    user_id,
                    Sport::Nfl,
                    PredictionStatus::Correct,
                    now - Duration::hours(i as i64 + 1),
                ))
                .await
                .unwrap();
            }
            for i in 0..incorrect {
                repo.create(&resolved(
                    user_id,
                    Sport::Nfl,
                    PredictionStatus::Incorrect,
                    now - Duration::hours(i as i64 + 1),
                ))
                .await
                .unwrap();
            }
        }
    }

    use helpers::*;

    #[tokio::test]
    async fn accuracy_board_ranks_by_accuracy_then_correct() {
        let f = fixture();
        seed_record(&f.predictions, "sharp", 9, 3).await; // 75%
        seed_record(&f.predictions, "sharper", 9, 1).await; // 90%
        seed_record(&f.predictions, "busy", 15, 5).await; // 75%, more correct
        let board = f
            .service
            .accuracy_board(SportScope::All, None, Timeframe::All, 10)
            .await
            .unwrap();

        let order: Vec<&str> = board.iter().map(|r| r.user_id.as_str()).collect();
        assert_eq!(order, vec!["sharper", "busy", "sharp"]);
        assert_eq!(board[0].accuracy, 0.9);
    }

    #[tokio::test]
    async fn accuracy_board_hides_users_below_the_floor() {
        let f = fixture();
        seed_record(&f.predictions, "thin", 5, 4).await; // 9 graded, floor is 10
        seed_record(&f.predictions, "established", 8, 4).await;

        let board = f
            .service
            .accuracy_board(SportScope::All, None, Timeframe::All, 10)
            .await
            .unwrap();

        assert_eq!(board.len(), 1);
        assert_eq!(board[0].user_id, "established");
    }

    #[tokio::test]
    async fn league_board_uses_membership_and_lower_floor() {
        let f = fixture();
        seed_record(&f.predictions, "member", 3, 1).await;
        seed_record(&f.predictions, "outsider", 20, 0).await;
        f.leagues.add_member("league-1", "member");

        let board = f
            .service
            .accuracy_board(SportScope::All, Some("league-1"), Timeframe::All, 10)
            .await
            .unwrap();

        assert_eq!(board.len(), 1);
        assert_eq!(board[0].user_id, "member");
        assert_eq!(board[0].resolved, 4);
    }

    #[tokio::test]
    async fn weekly_board_ignores_old_resolutions() {
        let f = fixture();
        let now = Utc::now();
        for i in 0..12 {
            f.predictions
                .create(&resolved(
                    "historic",
                    Sport::Nfl,
                    PredictionStatus::Correct,
                    now - Duration::days(30 + i),
                ))
                .await
                .unwrap();
        }

        let board = f
            .service
            .accuracy_board(SportScope::All, None, Timeframe::Weekly, 10)
            .await
            .unwrap();
        assert!(board.is_empty());

        let all_time = f
            .service
            .accuracy_board(SportScope::All, None, Timeframe::All, 10)
            .await
            .unwrap();
        assert_eq!(all_time.len(), 1);
    }

    #[tokio::test]
    async fn rating_board_orders_by_composite_and_applies_floor() {
        let f = fixture();
        f.ratings.upsert(&rated("top", 88)).await.unwrap();
        f.ratings.upsert(&rated("mid", 71)).await.unwrap();
        let mut thin = rated("thin", 95);
        thin.total_graded = 3;
        f.ratings.upsert(&thin).await.unwrap();
        f.ratings
            .upsert(&ClutchRating::ungated("gated", 10, 50))
            .await
            .unwrap();

        let board = f.service.rating_board(None, 10).await.unwrap();

        let order: Vec<&str> = board.iter().map(|r| r.user_id.as_str()).collect();
        assert_eq!(order, vec!["top", "mid"]);
    }

    #[tokio::test]
    async fn weighted_consensus_lets_rated_minority_prevail() {
        let f = fixture();
        // Six unrated overs vs four unders from 100-rated managers
        for i in 0..6 {
            f.predictions
                .create(&public_vote(
                    &format!("casual-{i}"),
                    "evt-1",
                    "rb-1",
                    Direction::Over,
                ))
                .await
                .unwrap();
        }
        for i in 0..4 {
            let user = format!("pro-{i}");
            f.predictions
                .create(&public_vote(&user, "evt-1", "rb-1", Direction::Under))
                .await
                .unwrap();
            f.ratings.upsert(&rated(&user, 100)).await.unwrap();
        }

        let report = f
            .service
            .consensus("evt-1", Some("rb-1"), PredictionType::Benchmark)
            .await
            .unwrap();

        assert_eq!(report.total_votes, 10);
        assert_eq!(report.raw.over_pct, 60.0);
        // 6x1.0 over vs 4x10.0 under
        assert!(report.weighted.under_pct > report.weighted.over_pct);
        assert_eq!(report.weighted.under_pct, 87.0);

        let top = report.top_managers;
        assert_eq!(top.raters, 4);
        assert_eq!(top.direction, Some(Direction::Under));
        assert_eq!(top.label, "4 of 4 top-rated managers like the under");
    }

    #[tokio::test]
    async fn consensus_with_no_votes_is_empty_not_an_error() {
        let f = fixture();
        let report = f
            .service
            .consensus("evt-none", Some("rb-1"), PredictionType::Benchmark)
            .await
            .unwrap();

        assert_eq!(report.total_votes, 0);
        assert_eq!(report.raw.over_pct, 0.0);
        assert!(report.top_managers.direction.is_none());
    }
}
