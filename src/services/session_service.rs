use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::identity::UserIdentity;
use crate::models::ranking::RankingEntry;
use crate::models::session::{CheckOutcome, QuizSession, SessionError};
use crate::services::attempt_service::AttemptService;
use crate::services::question_service::QuestionService;

/// One active session per (user, quiz) per process.
type SessionKey = (Uuid, Uuid);

#[derive(Debug, Clone)]
pub enum StartOutcome {
    Started(QuizSession),
    /// The guard found a recorded attempt; the caller routes straight
    /// to the ranking view instead of starting a session.
    AlreadyAttempted(RankingEntry),
}

/// Holds the in-flight quiz sessions and applies shell actions to
/// them. Entry is gated through the Attempt Guard; sessions are
/// discarded once their result is persisted, and abandoned sessions
/// simply age in the map until the same user starts the quiz again.
#[derive(Clone)]
pub struct SessionService {
    questions: QuestionService,
    guard: AttemptService,
    sessions: Arc<RwLock<HashMap<SessionKey, QuizSession>>>,
}

impl SessionService {
    pub fn new(questions: QuestionService, guard: AttemptService) -> Self {
        Self {
            questions,
            guard,
            sessions: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Gates entry through the Attempt Guard, loads the question set
    /// and opens a fresh session. A lingering abandoned session for
    /// the same (user, quiz) is replaced; the recorded-attempt check
    /// is what makes a retake impossible, not the session map.
    pub async fn start_session(
        &self,
        identity: UserIdentity,
        quiz_id: Uuid,
    ) -> Result<StartOutcome> {
        if let Some(entry) = self.guard.find_attempt(identity.user_id, quiz_id).await? {
            return Ok(StartOutcome::AlreadyAttempted(entry));
        }

        let questions = self.questions.load_quiz(quiz_id).await?;
        let user_id = identity.user_id;
        let session = QuizSession::start(identity, quiz_id, questions)?;

        let mut sessions = self.sessions.write().expect("session map lock poisoned");
        sessions.insert((user_id, quiz_id), session.clone());
        Ok(StartOutcome::Started(session))
    }

    pub fn snapshot(&self, user_id: Uuid, quiz_id: Uuid) -> Result<QuizSession> {
        let sessions = self.sessions.read().expect("session map lock poisoned");
        sessions
            .get(&(user_id, quiz_id))
            .cloned()
            .ok_or_else(no_active_session)
    }

    pub fn select_option(
        &self,
        user_id: Uuid,
        quiz_id: Uuid,
        option_index: usize,
    ) -> Result<QuizSession> {
        self.with_session(user_id, quiz_id, |session| {
            session.select_option(option_index)?;
            Ok(session.clone())
        })
    }

    pub fn check_answer(&self, user_id: Uuid, quiz_id: Uuid) -> Result<(CheckOutcome, QuizSession)> {
        self.with_session(user_id, quiz_id, |session| {
            let outcome = session.check_answer()?;
            Ok((outcome, session.clone()))
        })
    }

    pub fn advance(&self, user_id: Uuid, quiz_id: Uuid) -> Result<QuizSession> {
        self.with_session(user_id, quiz_id, |session| {
            session.advance()?;
            Ok(session.clone())
        })
    }

    pub fn retreat(&self, user_id: Uuid, quiz_id: Uuid) -> Result<QuizSession> {
        self.with_session(user_id, quiz_id, |session| {
            session.retreat();
            Ok(session.clone())
        })
    }

    /// The completed session ready for scoring. Submitting an
    /// unfinished session is a caller bug, surfaced distinctly.
    pub fn completed_session(&self, user_id: Uuid, quiz_id: Uuid) -> Result<QuizSession> {
        let session = self.snapshot(user_id, quiz_id)?;
        if !session.is_completed() {
            return Err(SessionError::Incomplete.into());
        }
        Ok(session)
    }

    /// Drops the session once its result is persisted (or found to be
    /// persisted already).
    pub fn discard(&self, user_id: Uuid, quiz_id: Uuid) {
        let mut sessions = self.sessions.write().expect("session map lock poisoned");
        sessions.remove(&(user_id, quiz_id));
    }

    fn with_session<T>(
        &self,
        user_id: Uuid,
        quiz_id: Uuid,
        apply: impl FnOnce(&mut QuizSession) -> Result<T>,
    ) -> Result<T> {
        let mut sessions = self.sessions.write().expect("session map lock poisoned");
        let session = sessions
            .get_mut(&(user_id, quiz_id))
            .ok_or_else(no_active_session)?;
        apply(session)
    }
}

fn no_active_session() -> Error {
    Error::NotFound("No active quiz session for this user and quiz".to_string())
}
