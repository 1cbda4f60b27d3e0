use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::question::{DayTag, Question};
use crate::models::ranking::RankingEntry;
use crate::models::session::{AnswerRecord, QuizSession};

/// Question as the shell sees it. The answer key never leaves the
/// server; the correct index is revealed per question by the check
/// response once that answer is locked.
#[derive(Debug, Clone, Serialize)]
pub struct PublicQuestion {
    pub id: Uuid,
    pub day: DayTag,
    pub prompt: String,
    pub options: Vec<String>,
}

impl From<&Question> for PublicQuestion {
    fn from(q: &Question) -> Self {
        Self {
            id: q.id,
            day: q.day,
            prompt: q.prompt.clone(),
            options: q.options.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AnswerView {
    pub question_id: Uuid,
    pub selected_option: Option<usize>,
    pub is_correct: Option<bool>,
}

impl From<&AnswerRecord> for AnswerView {
    fn from(a: &AnswerRecord) -> Self {
        Self {
            question_id: a.question_id,
            selected_option: a.selected_option,
            is_correct: a.is_correct,
        }
    }
}

/// Per-render snapshot of a session.
#[derive(Debug, Clone, Serialize)]
pub struct SessionView {
    pub quiz_id: Uuid,
    pub user_id: Uuid,
    pub state: String,
    pub current_index: usize,
    pub total_questions: usize,
    pub question: Option<PublicQuestion>,
    pub answers: Vec<AnswerView>,
}

impl SessionView {
    pub fn from_session(session: &QuizSession) -> Self {
        let state = if session.is_completed() {
            "completed"
        } else {
            "in_progress"
        };
        let question = if session.is_completed() {
            None
        } else {
            Some(PublicQuestion::from(session.current_question()))
        };
        Self {
            quiz_id: session.quiz_id(),
            user_id: session.identity().user_id,
            state: state.to_string(),
            current_index: session.current_index(),
            total_questions: session.questions().len(),
            question,
            answers: session.answers().iter().map(AnswerView::from).collect(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct StartQuizRequest {
    pub user_id: Uuid,
    #[validate(length(min = 1, max = 64))]
    pub display_name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SelectOptionRequest {
    pub user_id: Uuid,
    pub option_index: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionActionRequest {
    pub user_id: Uuid,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SubmitQuizRequest {
    pub user_id: Uuid,
    pub duration_seconds: Option<i32>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StartQuizResponse {
    pub already_attempted: bool,
    pub session: Option<SessionView>,
    pub ranking: Option<RankingView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CheckAnswerResponse {
    pub correct: bool,
    pub correct_option_index: usize,
    pub session: SessionView,
}

#[derive(Debug, Clone, Serialize)]
pub struct RankingEntryView {
    pub user_id: Uuid,
    pub display_name: String,
    pub score_percentage: i32,
    pub correct_count: i32,
    pub total_questions: i32,
    pub duration_seconds: Option<i32>,
    pub submitted_at: chrono::DateTime<chrono::Utc>,
}

impl From<&RankingEntry> for RankingEntryView {
    fn from(e: &RankingEntry) -> Self {
        Self {
            user_id: e.user_id,
            display_name: e.display_name.clone(),
            score_percentage: e.score_percentage,
            correct_count: e.correct_count,
            total_questions: e.total_questions,
            duration_seconds: e.duration_seconds,
            submitted_at: e.submitted_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RankingView {
    pub quiz_id: Uuid,
    pub entries: Vec<RankingEntryView>,
    pub placement: Option<usize>,
    pub user_entry: Option<RankingEntryView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SubmitQuizResponse {
    pub already_submitted: bool,
    pub entry: RankingEntryView,
    pub ranking: RankingView,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RankingQuery {
    pub user_id: Option<Uuid>,
    pub limit: Option<usize>,
}
