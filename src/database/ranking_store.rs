use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::Result;
use crate::models::ranking::{NewRankingEntry, RankingEntry};

/// Result of an insert-if-absent. On a duplicate the existing row is
/// returned and treated as authoritative; the caller must never
/// overwrite it or create a second row.
#[derive(Debug, Clone)]
pub enum InsertOutcome {
    Inserted(RankingEntry),
    AlreadyExists(RankingEntry),
}

/// The persistence collaborator for scored attempts. The backing table
/// is append-only and must serialize inserts on (user_id, quiz_id), so
/// near-simultaneous duplicate submissions cannot both succeed.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RankingStore: Send + Sync {
    async fn find_entry(&self, user_id: Uuid, quiz_id: Uuid) -> Result<Option<RankingEntry>>;

    async fn insert_entry(&self, entry: NewRankingEntry) -> Result<InsertOutcome>;

    async fn entries_for_quiz(&self, quiz_id: Uuid) -> Result<Vec<RankingEntry>>;
}

#[derive(Clone)]
pub struct PgRankingStore {
    pool: PgPool,
}

impl PgRankingStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RankingStore for PgRankingStore {
    async fn find_entry(&self, user_id: Uuid, quiz_id: Uuid) -> Result<Option<RankingEntry>> {
        let entry = sqlx::query_as::<_, RankingEntry>(
            r#"SELECT * FROM ranking_entries WHERE user_id = $1 AND quiz_id = $2"#,
        )
        .bind(user_id)
        .bind(quiz_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(entry)
    }

    async fn insert_entry(&self, entry: NewRankingEntry) -> Result<InsertOutcome> {
        let inserted = sqlx::query_as::<_, RankingEntry>(
            r#"
            INSERT INTO ranking_entries (
                user_id, display_name, quiz_id,
                score_percentage, correct_count, total_questions, duration_seconds
            ) VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(entry.user_id)
        .bind(&entry.display_name)
        .bind(entry.quiz_id)
        .bind(entry.score.score_percentage)
        .bind(entry.score.correct_count)
        .bind(entry.score.total_questions)
        .bind(entry.duration_seconds)
        .fetch_one(&self.pool)
        .await;

        match inserted {
            Ok(row) => Ok(InsertOutcome::Inserted(row)),
            // The unique constraint on (user_id, quiz_id) lost us the
            // race: the earlier row wins.
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                let existing = self
                    .find_entry(entry.user_id, entry.quiz_id)
                    .await?
                    .ok_or_else(|| {
                        crate::error::Error::Internal(
                            "ranking entry vanished after unique violation".to_string(),
                        )
                    })?;
                Ok(InsertOutcome::AlreadyExists(existing))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn entries_for_quiz(&self, quiz_id: Uuid) -> Result<Vec<RankingEntry>> {
        let entries = sqlx::query_as::<_, RankingEntry>(
            r#"SELECT * FROM ranking_entries WHERE quiz_id = $1"#,
        )
        .bind(quiz_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(entries)
    }
}
