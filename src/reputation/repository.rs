use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use tracing::debug;

use super::models::{SportScope, UserReputation};
use crate::shared::AppError;

/// Trait for reputation row storage. Rows are caches of a pure function
/// over the prediction store; writes are last-write-wins upserts so a
/// recompute racing with itself is safe.
#[async_trait]
pub trait ReputationRepository: Send + Sync {
    async fn upsert(&self, reputation: &UserReputation) -> Result<(), AppError>;
    async fn get(
        &self,
        user_id: &str,
        scope: SportScope,
    ) -> Result<Option<UserReputation>, AppError>;
    async fn list_by_scope(&self, scope: SportScope) -> Result<Vec<UserReputation>, AppError>;
}

/// In-memory implementation of ReputationRepository
pub struct InMemoryReputationRepository {
    // (user_id, scope key) -> row
    rows: Mutex<HashMap<(String, String), UserReputation>>,
}

impl Default for InMemoryReputationRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryReputationRepository {
    pub fn new() -> Self {
        Self {
            rows: Mutex::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl ReputationRepository for InMemoryReputationRepository {
    async fn upsert(&self, reputation: &UserReputation) -> Result<(), AppError> {
        debug!(
            user_id = %reputation.user_id,
            scope = %reputation.scope,
            total = reputation.total,
            "Upserting reputation row"
        );
        let mut rows = self.rows.lock().unwrap();
        rows.insert(
            (reputation.user_id.clone(), reputation.scope.key()),
            reputation.clone(),
        );
        Ok(())
    }

    async fn get(
        &self,
        user_id: &str,
        scope: SportScope,
    ) -> Result<Option<UserReputation>, AppError> {
        let rows = self.rows.lock().unwrap();
        Ok(rows.get(&(user_id.to_string(), scope.key())).cloned())
    }

    async fn list_by_scope(&self, scope: SportScope) -> Result<Vec<UserReputation>, AppError> {
        let rows = self.rows.lock().unwrap();
        Ok(rows
            .values()
            .filter(|row| row.scope == scope)
            .cloned()
            .collect())
    }
}
