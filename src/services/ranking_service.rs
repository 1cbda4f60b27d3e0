use std::sync::Arc;

use uuid::Uuid;

use crate::database::ranking_store::RankingStore;
use crate::error::{Error, Result};
use crate::models::identity::UserIdentity;
use crate::models::ranking::{NewRankingEntry, QuizScore, RankingEntry};
use crate::models::session::{QuizSession, SessionError};
use crate::services::attempt_service::{AttemptOutcome, AttemptService};

/// Score & Ranking Engine: turns a completed session into a percentage
/// score, persists it exactly once through the Attempt Guard, and
/// answers leaderboard queries.
#[derive(Clone)]
pub struct RankingService {
    guard: AttemptService,
    store: Arc<dyn RankingStore>,
}

impl RankingService {
    pub fn new(guard: AttemptService, store: Arc<dyn RankingStore>) -> Self {
        Self { guard, store }
    }

    /// `score_percentage = round(100 * correct / total)`, half up.
    /// Rejects incomplete sessions: a partial score is a caller bug,
    /// not a value to report.
    pub fn compute_score(session: &QuizSession) -> Result<QuizScore> {
        if !session.is_completed() {
            return Err(SessionError::Incomplete.into());
        }
        let total = session.questions().len();
        let correct = session.correct_count();
        let score_percentage = (100.0 * correct as f64 / total as f64).round() as i32;
        Ok(QuizScore {
            correct_count: correct as i32,
            total_questions: total as i32,
            score_percentage,
        })
    }

    /// Appends exactly one RankingEntry for this (user, quiz). A
    /// duplicate submission surfaces as `AlreadyAttempted`; the entry
    /// recorded first stays authoritative.
    pub async fn submit_result(
        &self,
        identity: &UserIdentity,
        quiz_id: Uuid,
        score: QuizScore,
        duration_seconds: Option<i32>,
    ) -> Result<RankingEntry> {
        let entry = NewRankingEntry {
            user_id: identity.user_id,
            display_name: identity.display_name.clone(),
            quiz_id,
            score,
            duration_seconds,
        };
        match self.guard.record_attempt(entry).await? {
            AttemptOutcome::Recorded(row) => Ok(row),
            AttemptOutcome::AlreadyExists(_) => Err(Error::AlreadyAttempted),
        }
    }

    /// Top `limit` entries for a quiz. The full ordering is computed
    /// before truncation.
    pub async fn top_ranking(&self, quiz_id: Uuid, limit: usize) -> Result<Vec<RankingEntry>> {
        let mut entries = self.store.entries_for_quiz(quiz_id).await?;
        rank_order(&mut entries);
        entries.truncate(limit);
        Ok(entries)
    }

    /// 1-based rank of the user's entry under the same ordering as
    /// `top_ranking`, or `None` without an entry.
    pub async fn user_placement(&self, user_id: Uuid, quiz_id: Uuid) -> Result<Option<usize>> {
        let mut entries = self.store.entries_for_quiz(quiz_id).await?;
        rank_order(&mut entries);
        Ok(entries
            .iter()
            .position(|e| e.user_id == user_id)
            .map(|idx| idx + 1))
    }
}

/// The one ordering rule for leaderboards and placements: score
/// descending, ties broken by earlier submission.
fn rank_order(entries: &mut [RankingEntry]) {
    entries.sort_by(|a, b| {
        b.score_percentage
            .cmp(&a.score_percentage)
            .then(a.submitted_at.cmp(&b.submitted_at))
    });
}
