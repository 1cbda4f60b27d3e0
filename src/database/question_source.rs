use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::question::Question;

/// Content collaborator: hands out the question records authored for a
/// study week. Order must be stable across calls for the same quiz so
/// ranking and review screens can rely on consistent indexing.
#[async_trait]
pub trait QuestionSource: Send + Sync {
    async fn questions_for_quiz(&self, quiz_id: Uuid) -> Result<Vec<Question>>;

    async fn quiz_ids(&self) -> Result<Vec<Uuid>>;
}

#[derive(Clone)]
pub struct PgQuestionSource {
    pool: PgPool,
}

impl PgQuestionSource {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct QuestionRow {
    id: Uuid,
    quiz_id: Uuid,
    day: String,
    prompt: String,
    options: sqlx::types::Json<Vec<String>>,
    correct_option: i32,
}

impl QuestionRow {
    fn into_question(self) -> Result<Question> {
        let day = self
            .day
            .parse()
            .map_err(|e: crate::models::question::UnknownDayTag| Error::Internal(e.to_string()))?;
        let correct_option = usize::try_from(self.correct_option).map_err(|_| {
            Error::Internal(format!(
                "question {} has a negative answer index",
                self.id
            ))
        })?;
        Ok(Question {
            id: self.id,
            quiz_id: self.quiz_id,
            day,
            prompt: self.prompt,
            options: self.options.0,
            correct_option,
        })
    }
}

#[async_trait]
impl QuestionSource for PgQuestionSource {
    async fn questions_for_quiz(&self, quiz_id: Uuid) -> Result<Vec<Question>> {
        let rows = sqlx::query_as::<_, QuestionRow>(
            r#"
            SELECT id, quiz_id, day, prompt, options, correct_option
            FROM questions
            WHERE quiz_id = $1
            ORDER BY position ASC, id ASC
            "#,
        )
        .bind(quiz_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(QuestionRow::into_question).collect()
    }

    async fn quiz_ids(&self) -> Result<Vec<Uuid>> {
        let ids = sqlx::query_scalar::<_, Uuid>(
            r#"SELECT DISTINCT quiz_id FROM questions ORDER BY quiz_id"#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(ids)
    }
}
