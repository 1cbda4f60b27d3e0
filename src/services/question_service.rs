use std::collections::HashSet;
use std::sync::Arc;

use serde::Serialize;
use uuid::Uuid;

use crate::database::question_source::QuestionSource;
use crate::error::{Error, Result};
use crate::models::question::{DayTag, Question};

/// Catalog row for one study week's quiz.
#[derive(Debug, Clone, Serialize)]
pub struct QuizWeek {
    pub quiz_id: Uuid,
    pub question_count: usize,
    pub available: bool,
}

/// Question Bank: loads the ordered question sequence for a quiz and
/// refuses to hand out a partial one.
#[derive(Clone)]
pub struct QuestionService {
    source: Arc<dyn QuestionSource>,
}

impl QuestionService {
    pub fn new(source: Arc<dyn QuestionSource>) -> Self {
        Self { source }
    }

    /// Returns the full, ordered question set for a quiz.
    ///
    /// A quiz is only served complete: zero questions or missing day
    /// coverage yield `QuizUnavailable` ("quiz not ready") instead of a
    /// partial quiz. Malformed content is an infrastructure fault, not
    /// a user condition.
    pub async fn load_quiz(&self, quiz_id: Uuid) -> Result<Arc<[Question]>> {
        let questions = self.source.questions_for_quiz(quiz_id).await?;
        validate_week(quiz_id, &questions)?;
        Ok(questions.into())
    }

    /// Availability summary for one week. `NotFound` when nothing has
    /// been authored under the id at all.
    pub async fn week_summary(&self, quiz_id: Uuid) -> Result<QuizWeek> {
        let questions = self.source.questions_for_quiz(quiz_id).await?;
        if questions.is_empty() {
            return Err(Error::NotFound("No such quiz week".to_string()));
        }
        Ok(summarize(quiz_id, &questions))
    }

    /// Lists every authored week with its availability, for the
    /// quarter/week index the shell renders.
    pub async fn catalog(&self) -> Result<Vec<QuizWeek>> {
        let mut weeks = Vec::new();
        for quiz_id in self.source.quiz_ids().await? {
            let questions = self.source.questions_for_quiz(quiz_id).await?;
            weeks.push(summarize(quiz_id, &questions));
        }
        Ok(weeks)
    }
}

fn summarize(quiz_id: Uuid, questions: &[Question]) -> QuizWeek {
    QuizWeek {
        quiz_id,
        question_count: questions.len(),
        available: validate_week(quiz_id, questions).is_ok(),
    }
}

fn validate_week(quiz_id: Uuid, questions: &[Question]) -> Result<()> {
    if questions.is_empty() {
        return Err(Error::QuizUnavailable(
            "No questions have been published for this quiz yet".to_string(),
        ));
    }
    for q in questions {
        if !q.is_well_formed() {
            tracing::error!(question_id = %q.id, quiz_id = %quiz_id, "malformed question record");
            return Err(Error::Internal(format!(
                "Question {} is malformed",
                q.id
            )));
        }
    }
    let covered: HashSet<DayTag> = questions.iter().map(|q| q.day).collect();
    if let Some(missing) = DayTag::ALL.iter().find(|d| !covered.contains(d)) {
        tracing::warn!(quiz_id = %quiz_id, day = missing.as_str(), "quiz week missing a lesson day");
        return Err(Error::QuizUnavailable(format!(
            "The {} lesson has no questions yet",
            missing.as_str()
        )));
    }
    Ok(())
}
