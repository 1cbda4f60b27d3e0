use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A persisted, scored attempt. Append-only: rows are never mutated
/// after creation, and the store enforces at most one row per
/// (user_id, quiz_id).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct RankingEntry {
    pub id: Uuid,
    pub user_id: Uuid,
    pub display_name: String,
    pub quiz_id: Uuid,
    pub score_percentage: i32,
    pub correct_count: i32,
    pub total_questions: i32,
    pub duration_seconds: Option<i32>,
    pub submitted_at: DateTime<Utc>,
}

/// Row-to-be for a first scored attempt. The store assigns `id` and
/// `submitted_at` on insert.
#[derive(Debug, Clone)]
pub struct NewRankingEntry {
    pub user_id: Uuid,
    pub display_name: String,
    pub quiz_id: Uuid,
    pub score: QuizScore,
    pub duration_seconds: Option<i32>,
}

/// Final score of a completed session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct QuizScore {
    pub correct_count: i32,
    pub total_questions: i32,
    pub score_percentage: i32,
}
