use std::sync::Arc;

use uuid::Uuid;

use crate::database::ranking_store::{InsertOutcome, RankingStore};
use crate::error::Result;
use crate::models::ranking::{NewRankingEntry, RankingEntry};

/// Guard outcome: either this call recorded the first attempt, or an
/// earlier entry exists and stays authoritative.
#[derive(Debug, Clone)]
pub enum AttemptOutcome {
    Recorded(RankingEntry),
    AlreadyExists(RankingEntry),
}

/// Attempt Guard: enforces "at most one scored attempt per user per
/// quiz" on top of the store's insert-if-absent primitive. The store
/// serializes the check-then-insert, so a double-click double submit
/// cannot create two rows.
#[derive(Clone)]
pub struct AttemptService {
    store: Arc<dyn RankingStore>,
}

impl AttemptService {
    pub fn new(store: Arc<dyn RankingStore>) -> Self {
        Self { store }
    }

    pub async fn has_attempted(&self, user_id: Uuid, quiz_id: Uuid) -> Result<bool> {
        Ok(self.find_attempt(user_id, quiz_id).await?.is_some())
    }

    pub async fn find_attempt(&self, user_id: Uuid, quiz_id: Uuid) -> Result<Option<RankingEntry>> {
        self.store.find_entry(user_id, quiz_id).await
    }

    pub async fn record_attempt(&self, entry: NewRankingEntry) -> Result<AttemptOutcome> {
        let user_id = entry.user_id;
        let quiz_id = entry.quiz_id;
        match self.store.insert_entry(entry).await? {
            InsertOutcome::Inserted(row) => {
                tracing::info!(%user_id, %quiz_id, score = row.score_percentage, "attempt recorded");
                Ok(AttemptOutcome::Recorded(row))
            }
            InsertOutcome::AlreadyExists(row) => {
                tracing::warn!(%user_id, %quiz_id, "duplicate attempt rejected");
                Ok(AttemptOutcome::AlreadyExists(row))
            }
        }
    }
}
