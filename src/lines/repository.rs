use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use tracing::debug;

use super::models::PropLine;
use crate::prediction::models::Sport;
use crate::shared::AppError;

/// Upsert key for a prop line.
pub type LineKey = (Sport, u16, u8, String, String);

fn key_of(line: &PropLine) -> LineKey {
    (
        line.sport,
        line.season,
        line.week,
        line.subject_id.clone(),
        line.stat.clone(),
    )
}

/// Trait for prop-line storage. Re-running generation for a week updates
/// lines in place; the stored id survives the update so references hold.
#[async_trait]
pub trait LineRepository: Send + Sync {
    async fn upsert(&self, line: &PropLine) -> Result<PropLine, AppError>;
    async fn get(
        &self,
        sport: Sport,
        season: u16,
        week: u8,
        subject_id: &str,
        stat: &str,
    ) -> Result<Option<PropLine>, AppError>;
    async fn list_for_week(
        &self,
        sport: Sport,
        season: u16,
        week: u8,
    ) -> Result<Vec<PropLine>, AppError>;
}

/// In-memory implementation of LineRepository
pub struct InMemoryLineRepository {
    lines: Mutex<HashMap<LineKey, PropLine>>,
}

impl Default for InMemoryLineRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryLineRepository {
    pub fn new() -> Self {
        Self {
            lines: Mutex::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl LineRepository for InMemoryLineRepository {
    async fn upsert(&self, line: &PropLine) -> Result<PropLine, AppError> {
        let mut lines = self.lines.lock().unwrap();
        let key = key_of(line);
        let mut stored = line.clone();
        if let Some(existing) = lines.get(&key) {
            stored.id = existing.id;
        }
        debug!(
            subject_id = %stored.subject_id,
            stat = %stored.stat,
            line = stored.line,
            "Upserting prop line"
        );
        lines.insert(key, stored.clone());
        Ok(stored)
    }

    async fn get(
        &self,
        sport: Sport,
        season: u16,
        week: u8,
        subject_id: &str,
        stat: &str,
    ) -> Result<Option<PropLine>, AppError> {
        let lines = self.lines.lock().unwrap();
        Ok(lines
            .get(&(
                sport,
                season,
                week,
                subject_id.to_string(),
                stat.to_string(),
            ))
            .cloned())
    }

    async fn list_for_week(
        &self,
        sport: Sport,
        season: u16,
        week: u8,
    ) -> Result<Vec<PropLine>, AppError> {
        let lines = self.lines.lock().unwrap();
        let mut rows: Vec<PropLine> = lines
            .values()
            .filter(|line| line.sport == sport && line.season == season && line.week == week)
            .cloned()
            .collect();
        rows.sort_by(|a, b| {
            a.subject_id
                .cmp(&b.subject_id)
                .then(a.stat.cmp(&b.stat))
        });
        Ok(rows)
    }
}
