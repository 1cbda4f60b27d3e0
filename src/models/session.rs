use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::models::identity::UserIdentity;
use crate::models::question::Question;

/// Errors raised by the session state machine. `NoSelection` is the
/// only one a user can trigger through normal interaction; the rest
/// indicate a caller driving the machine out of order.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("no option selected for the current question")]
    NoSelection,

    #[error("option index {given} is out of range for a question with {available} options")]
    OptionOutOfRange { given: usize, available: usize },

    #[error("the current answer is already locked")]
    AlreadyFinalized,

    #[error("the current answer has not been checked yet")]
    NotFinalized,

    #[error("the quiz session is already completed")]
    SessionCompleted,

    #[error("the quiz session is not completed yet")]
    Incomplete,

    #[error("a quiz session requires at least one question")]
    EmptyQuestionSet,
}

/// Per-question answer state. Created unset when the session starts,
/// finalized exactly once by `check_answer`, immutable afterwards.
#[derive(Debug, Clone, Serialize)]
pub struct AnswerRecord {
    pub question_id: Uuid,
    pub selected_option: Option<usize>,
    pub is_correct: Option<bool>,
}

impl AnswerRecord {
    fn unset(question_id: Uuid) -> Self {
        Self {
            question_id,
            selected_option: None,
            is_correct: None,
        }
    }

    /// Invariant: `is_correct` is set iff the record has been checked,
    /// which in turn requires a selection.
    pub fn is_finalized(&self) -> bool {
        self.is_correct.is_some()
    }
}

/// Outcome of finalizing the current question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckOutcome {
    pub correct: bool,
    pub correct_option: usize,
}

/// One user's pass through a fixed, ordered question sequence.
///
/// Questions are presented strictly in bank order: `advance` moves one
/// step forward (only once the current answer is finalized), `retreat`
/// one step back. The session completes when `advance` is called on the
/// last finalized question; no transition leads back out of completed.
#[derive(Debug, Clone)]
pub struct QuizSession {
    identity: UserIdentity,
    quiz_id: Uuid,
    questions: Arc<[Question]>,
    answers: Vec<AnswerRecord>,
    current: usize,
    completed: bool,
    started_at: DateTime<Utc>,
}

impl QuizSession {
    /// `NotStarted -> InProgress(0)`. One unset answer record per
    /// question, in question order.
    pub fn start(
        identity: UserIdentity,
        quiz_id: Uuid,
        questions: Arc<[Question]>,
    ) -> Result<Self, SessionError> {
        if questions.is_empty() {
            return Err(SessionError::EmptyQuestionSet);
        }
        let answers = questions.iter().map(|q| AnswerRecord::unset(q.id)).collect();
        Ok(Self {
            identity,
            quiz_id,
            questions,
            answers,
            current: 0,
            completed: false,
            started_at: Utc::now(),
        })
    }

    pub fn identity(&self) -> &UserIdentity {
        &self.identity
    }

    pub fn quiz_id(&self) -> Uuid {
        self.quiz_id
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn answers(&self) -> &[AnswerRecord] {
        &self.answers
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn current_question(&self) -> &Question {
        &self.questions[self.current]
    }

    fn current_record(&self) -> &AnswerRecord {
        &self.answers[self.current]
    }

    /// Records a pending selection for the current question.
    /// Re-selecting before the answer is checked overwrites the pending
    /// choice; selecting on an already finalized record is a no-op, so
    /// navigating back over answered questions stays harmless.
    pub fn select_option(&mut self, option_index: usize) -> Result<(), SessionError> {
        if self.completed {
            return Err(SessionError::SessionCompleted);
        }
        let available = self.current_question().options.len();
        if option_index >= available {
            return Err(SessionError::OptionOutOfRange {
                given: option_index,
                available,
            });
        }
        let record = &mut self.answers[self.current];
        if record.is_finalized() {
            return Ok(());
        }
        record.selected_option = Some(option_index);
        Ok(())
    }

    /// Computes correctness for the pending selection and locks the
    /// record. One-way: a finalized record can never be re-checked.
    pub fn check_answer(&mut self) -> Result<CheckOutcome, SessionError> {
        if self.completed {
            return Err(SessionError::SessionCompleted);
        }
        if self.current_record().is_finalized() {
            return Err(SessionError::AlreadyFinalized);
        }
        let selected = self
            .current_record()
            .selected_option
            .ok_or(SessionError::NoSelection)?;
        let correct_option = self.current_question().correct_option;
        let correct = selected == correct_option;
        self.answers[self.current].is_correct = Some(correct);
        Ok(CheckOutcome {
            correct,
            correct_option,
        })
    }

    /// Moves to the next question, or completes the session when the
    /// last answer is finalized. Requires the current record finalized.
    pub fn advance(&mut self) -> Result<(), SessionError> {
        if self.completed {
            return Err(SessionError::SessionCompleted);
        }
        if !self.current_record().is_finalized() {
            return Err(SessionError::NotFinalized);
        }
        if self.current + 1 == self.questions.len() {
            self.completed = true;
        } else {
            self.current += 1;
        }
        Ok(())
    }

    /// Steps back to review an earlier question. Allowed at any point;
    /// finalized answers stay read-only and a completed session stays
    /// completed.
    pub fn retreat(&mut self) {
        if self.current > 0 {
            self.current -= 1;
        }
    }

    /// Number of finalized, correct answers. Meaningful for scoring
    /// only once the session is completed.
    pub fn correct_count(&self) -> usize {
        self.answers
            .iter()
            .filter(|a| a.is_correct == Some(true))
            .count()
    }
}
