//! In-memory store backends. Used by the test suite and by DB-less
//! demo wiring; semantics match the Postgres backends, including the
//! insert-if-absent guarantee (the whole table sits behind one lock,
//! so check-then-insert is atomic).

use std::collections::HashMap;
use std::sync::{Mutex, RwLock};

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::database::question_source::QuestionSource;
use crate::database::ranking_store::{InsertOutcome, RankingStore};
use crate::error::Result;
use crate::models::question::Question;
use crate::models::ranking::{NewRankingEntry, RankingEntry};

#[derive(Default)]
pub struct MemoryQuestionSource {
    weeks: RwLock<HashMap<Uuid, Vec<Question>>>,
}

impl MemoryQuestionSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed_week(&self, quiz_id: Uuid, questions: Vec<Question>) {
        self.weeks
            .write()
            .expect("question source lock poisoned")
            .insert(quiz_id, questions);
    }
}

#[async_trait]
impl QuestionSource for MemoryQuestionSource {
    async fn questions_for_quiz(&self, quiz_id: Uuid) -> Result<Vec<Question>> {
        let weeks = self.weeks.read().expect("question source lock poisoned");
        Ok(weeks.get(&quiz_id).cloned().unwrap_or_default())
    }

    async fn quiz_ids(&self) -> Result<Vec<Uuid>> {
        let weeks = self.weeks.read().expect("question source lock poisoned");
        let mut ids: Vec<Uuid> = weeks.keys().copied().collect();
        ids.sort();
        Ok(ids)
    }
}

#[derive(Default)]
pub struct MemoryRankingStore {
    entries: Mutex<Vec<RankingEntry>>,
}

impl MemoryRankingStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RankingStore for MemoryRankingStore {
    async fn find_entry(&self, user_id: Uuid, quiz_id: Uuid) -> Result<Option<RankingEntry>> {
        let entries = self.entries.lock().expect("ranking store lock poisoned");
        Ok(entries
            .iter()
            .find(|e| e.user_id == user_id && e.quiz_id == quiz_id)
            .cloned())
    }

    async fn insert_entry(&self, entry: NewRankingEntry) -> Result<InsertOutcome> {
        let mut entries = self.entries.lock().expect("ranking store lock poisoned");
        if let Some(existing) = entries
            .iter()
            .find(|e| e.user_id == entry.user_id && e.quiz_id == entry.quiz_id)
        {
            return Ok(InsertOutcome::AlreadyExists(existing.clone()));
        }
        let row = RankingEntry {
            id: Uuid::new_v4(),
            user_id: entry.user_id,
            display_name: entry.display_name,
            quiz_id: entry.quiz_id,
            score_percentage: entry.score.score_percentage,
            correct_count: entry.score.correct_count,
            total_questions: entry.score.total_questions,
            duration_seconds: entry.duration_seconds,
            submitted_at: Utc::now(),
        };
        entries.push(row.clone());
        Ok(InsertOutcome::Inserted(row))
    }

    async fn entries_for_quiz(&self, quiz_id: Uuid) -> Result<Vec<RankingEntry>> {
        let entries = self.entries.lock().expect("ranking store lock poisoned");
        Ok(entries
            .iter()
            .filter(|e| e.quiz_id == quiz_id)
            .cloned()
            .collect())
    }
}
