use chrono::{Duration, Utc};
use std::sync::Arc;

use clutchcall::prediction::models::Sport;
use clutchcall::shared::{AppState, AppStateBuilder};
use clutchcall::statsfeed::{
    EventInfo, EventStatus, InMemoryLeagueDirectory, InMemoryPerformanceData,
};

// ============================================================================
// Test Setup Infrastructure
// ============================================================================

pub struct TestSetup {
    pub state: AppState,
    pub source: Arc<InMemoryPerformanceData>,
    pub leagues: Arc<InMemoryLeagueDirectory>,
}

pub struct TestSetupBuilder {
    scheduled_events: Vec<(String, Sport)>,
}

impl TestSetupBuilder {
    pub fn new() -> Self {
        Self {
            scheduled_events: vec![],
        }
    }

    /// Registers an event starting three hours from now, open for
    /// predictions.
    pub fn with_scheduled_event(mut self, event_id: &str, sport: Sport) -> Self {
        self.scheduled_events
            .push((event_id.to_string(), sport));
        self
    }

    pub fn build(self) -> TestSetup {
        let source = Arc::new(InMemoryPerformanceData::new());
        for (event_id, sport) in self.scheduled_events {
            source.add_event(EventInfo {
                event_id,
                sport,
                starts_at: Utc::now() + Duration::hours(3),
                status: EventStatus::Scheduled,
            });
        }
        let leagues = Arc::new(InMemoryLeagueDirectory::new());
        let state = AppStateBuilder::new()
            .with_performance_source(source.clone())
            .with_league_directory(leagues.clone())
            .build();

        TestSetup {
            state,
            source,
            leagues,
        }
    }
}
