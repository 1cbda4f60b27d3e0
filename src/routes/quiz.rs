use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Json, Response},
};
use uuid::Uuid;
use validator::Validate;

use crate::dto::quiz_dto::{
    CheckAnswerResponse, RankingEntryView, RankingQuery, RankingView, SelectOptionRequest,
    SessionActionRequest, SessionView, StartQuizRequest, StartQuizResponse, SubmitQuizRequest,
    SubmitQuizResponse,
};
use crate::error::Error;
use crate::models::identity::UserIdentity;
use crate::services::ranking_service::RankingService;
use crate::services::session_service::StartOutcome;
use crate::AppState;

const DEFAULT_RANKING_LIMIT: usize = 10;
const MAX_RANKING_LIMIT: usize = 100;

#[axum::debug_handler]
pub async fn list_quizzes(State(state): State<AppState>) -> crate::error::Result<Response> {
    let weeks = state.question_service.catalog().await?;
    Ok(Json(weeks).into_response())
}

#[axum::debug_handler]
pub async fn get_quiz(
    State(state): State<AppState>,
    Path(quiz_id): Path<Uuid>,
) -> crate::error::Result<Response> {
    let week = state.question_service.week_summary(quiz_id).await?;
    Ok(Json(week).into_response())
}

/// Entry point for the quiz flow. A user with a recorded attempt is
/// routed straight to the ranking view; everyone else gets a fresh
/// session positioned on the first question.
#[axum::debug_handler]
pub async fn start_quiz(
    State(state): State<AppState>,
    Path(quiz_id): Path<Uuid>,
    Json(req): Json<StartQuizRequest>,
) -> crate::error::Result<Response> {
    req.validate()?;
    let display_name = req.display_name.trim().to_string();
    if display_name.is_empty() {
        return Err(Error::BadRequest("Display name must not be blank".to_string()));
    }
    let identity = UserIdentity::new(req.user_id, display_name);

    match state.session_service.start_session(identity, quiz_id).await? {
        StartOutcome::Started(session) => Ok(Json(StartQuizResponse {
            already_attempted: false,
            session: Some(SessionView::from_session(&session)),
            ranking: None,
        })
        .into_response()),
        StartOutcome::AlreadyAttempted(_) => {
            tracing::info!(user_id = %req.user_id, %quiz_id, "attempted quiz re-entry, serving ranking");
            let ranking = ranking_view(&state, quiz_id, Some(req.user_id), DEFAULT_RANKING_LIMIT).await?;
            Ok(Json(StartQuizResponse {
                already_attempted: true,
                session: None,
                ranking: Some(ranking),
            })
            .into_response())
        }
    }
}

#[axum::debug_handler]
pub async fn get_session(
    State(state): State<AppState>,
    Path((quiz_id, user_id)): Path<(Uuid, Uuid)>,
) -> crate::error::Result<Response> {
    let session = state.session_service.snapshot(user_id, quiz_id)?;
    Ok(Json(SessionView::from_session(&session)).into_response())
}

#[axum::debug_handler]
pub async fn select_option(
    State(state): State<AppState>,
    Path(quiz_id): Path<Uuid>,
    Json(req): Json<SelectOptionRequest>,
) -> crate::error::Result<Response> {
    let session = state
        .session_service
        .select_option(req.user_id, quiz_id, req.option_index)?;
    Ok(Json(SessionView::from_session(&session)).into_response())
}

#[axum::debug_handler]
pub async fn check_answer(
    State(state): State<AppState>,
    Path(quiz_id): Path<Uuid>,
    Json(req): Json<SessionActionRequest>,
) -> crate::error::Result<Response> {
    let (outcome, session) = state.session_service.check_answer(req.user_id, quiz_id)?;
    Ok(Json(CheckAnswerResponse {
        correct: outcome.correct,
        correct_option_index: outcome.correct_option,
        session: SessionView::from_session(&session),
    })
    .into_response())
}

#[axum::debug_handler]
pub async fn advance(
    State(state): State<AppState>,
    Path(quiz_id): Path<Uuid>,
    Json(req): Json<SessionActionRequest>,
) -> crate::error::Result<Response> {
    let session = state.session_service.advance(req.user_id, quiz_id)?;
    Ok(Json(SessionView::from_session(&session)).into_response())
}

#[axum::debug_handler]
pub async fn retreat(
    State(state): State<AppState>,
    Path(quiz_id): Path<Uuid>,
    Json(req): Json<SessionActionRequest>,
) -> crate::error::Result<Response> {
    let session = state.session_service.retreat(req.user_id, quiz_id)?;
    Ok(Json(SessionView::from_session(&session)).into_response())
}

/// Scores the completed session and persists the result exactly once.
/// A duplicate submission (double click, second tab) answers with the
/// recorded entry and the ranking view instead of an error dialog.
#[axum::debug_handler]
pub async fn submit_quiz(
    State(state): State<AppState>,
    Path(quiz_id): Path<Uuid>,
    Json(req): Json<SubmitQuizRequest>,
) -> crate::error::Result<Response> {
    let session = match state.session_service.completed_session(req.user_id, quiz_id) {
        Ok(session) => session,
        // The session may already be gone because an earlier submit
        // won; the recorded entry is authoritative then.
        Err(Error::NotFound(msg)) => {
            if let Some(existing) = state
                .attempt_service
                .find_attempt(req.user_id, quiz_id)
                .await?
            {
                return already_submitted_response(&state, quiz_id, req.user_id, existing).await;
            }
            return Err(Error::NotFound(msg));
        }
        Err(e) => return Err(e),
    };

    let score = RankingService::compute_score(&session)?;
    match state
        .ranking_service
        .submit_result(session.identity(), quiz_id, score, req.duration_seconds)
        .await
    {
        Ok(entry) => {
            state.session_service.discard(req.user_id, quiz_id);
            let ranking = ranking_view(&state, quiz_id, Some(req.user_id), DEFAULT_RANKING_LIMIT).await?;
            Ok(Json(SubmitQuizResponse {
                already_submitted: false,
                entry: RankingEntryView::from(&entry),
                ranking,
            })
            .into_response())
        }
        Err(Error::AlreadyAttempted) => {
            state.session_service.discard(req.user_id, quiz_id);
            let existing = state
                .attempt_service
                .find_attempt(req.user_id, quiz_id)
                .await?
                .ok_or_else(|| {
                    Error::Internal("recorded attempt missing after duplicate submit".to_string())
                })?;
            already_submitted_response(&state, quiz_id, req.user_id, existing).await
        }
        Err(e) => Err(e),
    }
}

#[axum::debug_handler]
pub async fn get_ranking(
    State(state): State<AppState>,
    Path(quiz_id): Path<Uuid>,
    Query(query): Query<RankingQuery>,
) -> crate::error::Result<Response> {
    let limit = query
        .limit
        .unwrap_or(DEFAULT_RANKING_LIMIT)
        .min(MAX_RANKING_LIMIT);
    let ranking = ranking_view(&state, quiz_id, query.user_id, limit).await?;
    Ok(Json(ranking).into_response())
}

async fn already_submitted_response(
    state: &AppState,
    quiz_id: Uuid,
    user_id: Uuid,
    existing: crate::models::ranking::RankingEntry,
) -> crate::error::Result<Response> {
    let ranking = ranking_view(state, quiz_id, Some(user_id), DEFAULT_RANKING_LIMIT).await?;
    Ok(Json(SubmitQuizResponse {
        already_submitted: true,
        entry: RankingEntryView::from(&existing),
        ranking,
    })
    .into_response())
}

async fn ranking_view(
    state: &AppState,
    quiz_id: Uuid,
    user_id: Option<Uuid>,
    limit: usize,
) -> crate::error::Result<RankingView> {
    let entries = state.ranking_service.top_ranking(quiz_id, limit).await?;
    let (placement, user_entry) = match user_id {
        Some(uid) => (
            state.ranking_service.user_placement(uid, quiz_id).await?,
            state
                .attempt_service
                .find_attempt(uid, quiz_id)
                .await?
                .map(|e| RankingEntryView::from(&e)),
        ),
        None => (None, None),
    };
    Ok(RankingView {
        quiz_id,
        entries: entries.iter().map(RankingEntryView::from).collect(),
        placement,
        user_entry,
    })
}
