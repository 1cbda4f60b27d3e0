pub mod config;
pub mod database;
pub mod dto;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;

use std::sync::Arc;

use sqlx::PgPool;

use crate::database::question_source::{PgQuestionSource, QuestionSource};
use crate::database::ranking_store::{PgRankingStore, RankingStore};
use crate::services::attempt_service::AttemptService;
use crate::services::question_service::QuestionService;
use crate::services::ranking_service::RankingService;
use crate::services::session_service::SessionService;

#[derive(Clone)]
pub struct AppState {
    pub question_service: QuestionService,
    pub attempt_service: AttemptService,
    pub ranking_service: RankingService,
    pub session_service: SessionService,
}

impl AppState {
    pub fn new(pool: PgPool) -> Self {
        let questions: Arc<dyn QuestionSource> = Arc::new(PgQuestionSource::new(pool.clone()));
        let rankings: Arc<dyn RankingStore> = Arc::new(PgRankingStore::new(pool));
        Self::with_stores(questions, rankings)
    }

    /// Wires the services over explicit store implementations. The
    /// test harness and DB-less demos pass the in-memory backends
    /// here; `new` is the Postgres wiring of the same graph.
    pub fn with_stores(
        questions: Arc<dyn QuestionSource>,
        rankings: Arc<dyn RankingStore>,
    ) -> Self {
        let question_service = QuestionService::new(questions);
        let attempt_service = AttemptService::new(rankings.clone());
        let ranking_service = RankingService::new(attempt_service.clone(), rankings);
        let session_service = SessionService::new(question_service.clone(), attempt_service.clone());

        Self {
            question_service,
            attempt_service,
            ranking_service,
            session_service,
        }
    }
}
