use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Mutex;
use tracing::debug;

use crate::prediction::models::Sport;
use crate::shared::AppError;

/// Where an event sits in its real-world lifecycle, as reported by the
/// sports-data subsystem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EventStatus {
    Scheduled,
    InProgress,
    Final,
}

/// Metadata about a real-world event, used to default lock times and to
/// reject predictions on events that already started.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventInfo {
    pub event_id: String,
    pub sport: Sport,
    pub starts_at: DateTime<Utc>,
    pub status: EventStatus,
}

/// One game's final stat totals for a subject, most recent games first
/// when returned in a list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameLog {
    pub season: u16,
    pub week: u8,
    pub stats: HashMap<String, f64>,
}

/// A player eligible for line generation in a given week.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubjectInfo {
    pub subject_id: String,
    pub position: String,
}

/// Read-only boundary to the sports-data subsystem. The scoring core
/// consumes final results and schedules; it never writes back.
#[async_trait]
pub trait PerformanceDataSource: Send + Sync {
    async fn event_info(&self, event_id: &str) -> Result<Option<EventInfo>, AppError>;

    /// Final observed value of a stat for a subject in an event. `None`
    /// means the value is missing or the subject withdrew; callers void
    /// the affected prediction rather than guess.
    async fn actual_stat(
        &self,
        event_id: &str,
        subject_id: &str,
        stat: &str,
    ) -> Result<Option<f64>, AppError>;

    /// A subject's most recent game logs before the given week, newest
    /// first, capped at `limit`.
    async fn recent_game_logs(
        &self,
        sport: Sport,
        subject_id: &str,
        season: u16,
        before_week: u8,
        limit: usize,
    ) -> Result<Vec<GameLog>, AppError>;

    /// Subjects eligible for line generation in a sport/season/week.
    async fn eligible_subjects(
        &self,
        sport: Sport,
        season: u16,
        week: u8,
    ) -> Result<Vec<SubjectInfo>, AppError>;
}

/// League membership lookup, owned by the league-administration
/// subsystem. Used only to scope leaderboards.
#[async_trait]
pub trait LeagueDirectory: Send + Sync {
    async fn members(&self, league_id: &str) -> Result<Vec<String>, AppError>;
}

/// In-memory stand-in for the sports-data subsystem, used by tests and
/// the development binary.
#[derive(Default)]
pub struct InMemoryPerformanceData {
    events: Mutex<HashMap<String, EventInfo>>,
    // (event_id, subject_id, stat) -> actual value
    actuals: Mutex<HashMap<(String, String, String), f64>>,
    // (sport, subject_id) -> logs, newest first
    game_logs: Mutex<HashMap<(Sport, String), Vec<GameLog>>>,
    // (sport, season, week) -> eligible subjects
    subjects: Mutex<HashMap<(Sport, u16, u8), Vec<SubjectInfo>>>,
}

impl InMemoryPerformanceData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_event(&self, event: EventInfo) {
        self.events
            .lock()
            .unwrap()
            .insert(event.event_id.clone(), event);
    }

    pub fn set_actual(&self, event_id: &str, subject_id: &str, stat: &str, value: f64) {
        self.actuals.lock().unwrap().insert(
            (
                event_id.to_string(),
                subject_id.to_string(),
                stat.to_string(),
            ),
            value,
        );
    }

    pub fn add_game_log(&self, sport: Sport, subject_id: &str, log: GameLog) {
        self.game_logs
            .lock()
            .unwrap()
            .entry((sport, subject_id.to_string()))
            .or_default()
            .push(log);
    }

    pub fn add_subject(&self, sport: Sport, season: u16, week: u8, subject: SubjectInfo) {
        self.subjects
            .lock()
            .unwrap()
            .entry((sport, season, week))
            .or_default()
            .push(subject);
    }
}

#[async_trait]
impl PerformanceDataSource for InMemoryPerformanceData {
    async fn event_info(&self, event_id: &str) -> Result<Option<EventInfo>, AppError> {
        Ok(self.events.lock().unwrap().get(event_id).cloned())
    }

    async fn actual_stat(
        &self,
        event_id: &str,
        subject_id: &str,
        stat: &str,
    ) -> Result<Option<f64>, AppError> {
        let key = (
            event_id.to_string(),
            subject_id.to_string(),
            stat.to_string(),
        );
        let actual = self.actuals.lock().unwrap().get(&key).copied();
        debug!(event_id = %event_id, subject_id = %subject_id, stat = %stat, found = actual.is_some(), "Looked up actual stat");
        Ok(actual)
    }

    async fn recent_game_logs(
        &self,
        sport: Sport,
        subject_id: &str,
        season: u16,
        before_week: u8,
        limit: usize,
    ) -> Result<Vec<GameLog>, AppError> {
        let logs = self.game_logs.lock().unwrap();
        let mut recent: Vec<GameLog> = logs
            .get(&(sport, subject_id.to_string()))
            .map(|entries| {
                entries
                    .iter()
                    .filter(|log| log.season < season || (log.season == season && log.week < before_week))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        // Newest first: later seasons/weeks sort ahead
        recent.sort_by(|a, b| (b.season, b.week).cmp(&(a.season, a.week)));
        recent.truncate(limit);
        Ok(recent)
    }

    async fn eligible_subjects(
        &self,
        sport: Sport,
        season: u16,
        week: u8,
    ) -> Result<Vec<SubjectInfo>, AppError> {
        Ok(self
            .subjects
            .lock()
            .unwrap()
            .get(&(sport, season, week))
            .cloned()
            .unwrap_or_default())
    }
}

/// In-memory league membership, for tests and development.
#[derive(Default)]
pub struct InMemoryLeagueDirectory {
    members: Mutex<HashMap<String, Vec<String>>>,
}

impl InMemoryLeagueDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_member(&self, league_id: &str, user_id: &str) {
        self.members
            .lock()
            .unwrap()
            .entry(league_id.to_string())
            .or_default()
            .push(user_id.to_string());
    }
}

#[async_trait]
impl LeagueDirectory for InMemoryLeagueDirectory {
    async fn members(&self, league_id: &str) -> Result<Vec<String>, AppError> {
        Ok(self
            .members
            .lock()
            .unwrap()
            .get(league_id)
            .cloned()
            .unwrap_or_default())
    }
}
