use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use clutchcall::prediction::models::{
    Claim, Confidence, Direction, PredictionModel, PredictionStatus, PredictionType, Sport,
};
use clutchcall::prediction::repository::PredictionRepository;

// ============================================================================
// Prediction Builders
// ============================================================================

/// Builds prediction rows for direct repository seeding, skipping the
/// lifecycle service when a test only cares about downstream scoring.
pub struct PredictionBuilder {
    user_id: String,
    sport: Sport,
    event_id: String,
    subject_id: Option<String>,
    league_id: Option<String>,
    claim: Claim,
    is_public: bool,
    status: PredictionStatus,
    confidence: Option<Confidence>,
    created_at: DateTime<Utc>,
    resolved_at: Option<DateTime<Utc>>,
}

impl PredictionBuilder {
    pub fn new(user_id: &str) -> Self {
        let now = Utc::now();
        Self {
            user_id: user_id.to_string(),
            sport: Sport::Nfl,
            event_id: Uuid::new_v4().to_string(),
            subject_id: Some("rb-1".to_string()),
            league_id: None,
            claim: Claim::Benchmark {
                stat: "rush_yards".to_string(),
                direction: Direction::Over,
                line: 60.5,
            },
            is_public: true,
            status: PredictionStatus::Pending,
            confidence: None,
            created_at: now,
            resolved_at: None,
        }
    }

    pub fn sport(mut self, sport: Sport) -> Self {
        self.sport = sport;
        self
    }

    pub fn event(mut self, event_id: &str) -> Self {
        self.event_id = event_id.to_string();
        self
    }

    pub fn subject(mut self, subject_id: &str) -> Self {
        self.subject_id = Some(subject_id.to_string());
        self
    }

    pub fn league(mut self, league_id: &str) -> Self {
        self.league_id = Some(league_id.to_string());
        self
    }

    pub fn direction(mut self, direction: Direction) -> Self {
        if let Claim::Benchmark {
            direction: claimed, ..
        } = &mut self.claim
        {
            *claimed = direction;
        }
        self
    }

    pub fn bold_call(mut self, description: &str) -> Self {
        self.claim = Claim::BoldCall {
            direction: Direction::Over,
            description: description.to_string(),
        };
        self
    }

    pub fn confidence(mut self, confidence: Confidence) -> Self {
        self.confidence = Some(confidence);
        self
    }

    pub fn private(mut self) -> Self {
        self.is_public = false;
        self
    }

    /// Marks the prediction as already graded, `days_ago` days back.
    pub fn graded(mut self, status: PredictionStatus, days_ago: i64) -> Self {
        let at = Utc::now() - Duration::days(days_ago);
        self.status = status;
        self.created_at = at - Duration::hours(6);
        self.resolved_at = Some(at);
        self
    }

    pub fn build(self) -> PredictionModel {
        let prediction_type = self.claim.prediction_type();
        PredictionModel {
            id: Uuid::new_v4(),
            user_id: self.user_id,
            sport: self.sport,
            prediction_type,
            category: "player-prop".to_string(),
            event_id: self.event_id,
            subject_id: self.subject_id,
            league_id: self.league_id,
            claim: self.claim,
            is_public: self.is_public,
            locks_at: self.created_at + Duration::hours(3),
            status: self.status,
            accuracy_score: match self.status {
                PredictionStatus::Correct => Some(1.0),
                PredictionStatus::Incorrect => Some(0.0),
                _ => None,
            },
            rationale: None,
            confidence: self.confidence,
            created_at: self.created_at,
            resolved_at: self.resolved_at,
        }
    }
}

/// Seeds a graded history: all-correct or alternating, one call per day
/// walking backwards from yesterday.
pub async fn seed_graded_history(
    repository: &dyn PredictionRepository,
    user_id: &str,
    count: usize,
    all_correct: bool,
) {
    for i in 0..count {
        let status = if all_correct || i % 2 == 0 {
            PredictionStatus::Correct
        } else {
            PredictionStatus::Incorrect
        };
        let prediction = PredictionBuilder::new(user_id)
            .graded(status, 1 + (i as i64 % 80))
            .build();
        repository
            .create(&prediction)
            .await
            .expect("seeding prediction should succeed");
    }
}
