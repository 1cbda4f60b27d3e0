pub mod health;
pub mod quiz;

use axum::{
    routing::{get, post},
    Router,
};

use crate::AppState;

/// The public quiz API route table, shared by the binary and the test
/// harness so both always serve the same surface.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/api/quizzes", get(quiz::list_quizzes))
        .route("/api/quizzes/:quiz_id", get(quiz::get_quiz))
        .route("/api/quizzes/:quiz_id/start", post(quiz::start_quiz))
        .route(
            "/api/quizzes/:quiz_id/session/:user_id",
            get(quiz::get_session),
        )
        .route("/api/quizzes/:quiz_id/select", post(quiz::select_option))
        .route("/api/quizzes/:quiz_id/check", post(quiz::check_answer))
        .route("/api/quizzes/:quiz_id/advance", post(quiz::advance))
        .route("/api/quizzes/:quiz_id/retreat", post(quiz::retreat))
        .route("/api/quizzes/:quiz_id/submit", post(quiz::submit_quiz))
        .route("/api/quizzes/:quiz_id/ranking", get(quiz::get_ranking))
}
