use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use devotion_backend::database::memory::{MemoryQuestionSource, MemoryRankingStore};
use devotion_backend::models::question::{DayTag, Question};
use devotion_backend::{routes, AppState};
use serde_json::{json, Value as JsonValue};
use tower::ServiceExt;
use uuid::Uuid;

fn week_questions(quiz_id: Uuid) -> Vec<Question> {
    DayTag::ALL
        .iter()
        .map(|day| Question {
            id: Uuid::new_v4(),
            quiz_id,
            day: *day,
            prompt: format!("What did the {} lesson emphasize?", day.as_str()),
            options: vec![
                "Creation".to_string(),
                "Covenant".to_string(),
                "Exile".to_string(),
                "Restoration".to_string(),
            ],
            correct_option: 1,
        })
        .collect()
}

fn test_app(seeded_quizzes: &[Uuid]) -> Router {
    let source = Arc::new(MemoryQuestionSource::new());
    for quiz_id in seeded_quizzes {
        source.seed_week(*quiz_id, week_questions(*quiz_id));
    }
    let store = Arc::new(MemoryRankingStore::new());
    let state = AppState::with_stores(source, store);

    routes::api_routes()
        .layer(axum::middleware::from_fn_with_state(
            devotion_backend::middleware::rate_limit::new_rps_state(1000),
            devotion_backend::middleware::rate_limit::rps_middleware,
        ))
        .with_state(state)
}

async fn post_json(app: &Router, uri: &str, body: JsonValue) -> (StatusCode, JsonValue) {
    let req = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = to_bytes(resp.into_body(), 1024 * 1024).await.unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(JsonValue::Null);
    (status, value)
}

async fn get_json(app: &Router, uri: &str) -> (StatusCode, JsonValue) {
    let req = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = to_bytes(resp.into_body(), 1024 * 1024).await.unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(JsonValue::Null);
    (status, value)
}

/// Drives a user through the whole quiz, answering the first
/// `correct` questions right and the rest wrong.
async fn run_through_quiz(app: &Router, quiz_id: Uuid, user_id: Uuid, name: &str, correct: usize) {
    let (status, body) = post_json(
        app,
        &format!("/api/quizzes/{}/start", quiz_id),
        json!({"user_id": user_id, "display_name": name}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["already_attempted"], json!(false));

    for i in 0..6 {
        let pick = if i < correct { 1 } else { 0 };
        let (status, _) = post_json(
            app,
            &format!("/api/quizzes/{}/select", quiz_id),
            json!({"user_id": user_id, "option_index": pick}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, check) = post_json(
            app,
            &format!("/api/quizzes/{}/check", quiz_id),
            json!({"user_id": user_id}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(check["correct"], json!(i < correct));
        assert_eq!(check["correct_option_index"], json!(1));

        let (status, _) = post_json(
            app,
            &format!("/api/quizzes/{}/advance", quiz_id),
            json!({"user_id": user_id}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }
}

#[tokio::test]
async fn quiz_flow_end_to_end() {
    let quiz_id = Uuid::new_v4();
    let app = test_app(&[quiz_id]);
    let user_id = Uuid::new_v4();

    // The catalog lists the seeded week as available.
    let (status, weeks) = get_json(&app, "/api/quizzes").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(weeks[0]["quiz_id"], json!(quiz_id));
    assert_eq!(weeks[0]["available"], json!(true));

    let (status, body) = post_json(
        &app,
        &format!("/api/quizzes/{}/start", quiz_id),
        json!({"user_id": user_id, "display_name": "Miriam"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["already_attempted"], json!(false));
    let session = &body["session"];
    assert_eq!(session["state"], json!("in_progress"));
    assert_eq!(session["current_index"], json!(0));
    assert_eq!(session["total_questions"], json!(6));
    // The answer key must never reach the shell.
    assert!(session["question"].get("correct_option").is_none());
    assert!(session["question"].get("prompt").is_some());

    // Checking before selecting is recoverable and changes nothing.
    let (status, err) = post_json(
        &app,
        &format!("/api/quizzes/{}/check", quiz_id),
        json!({"user_id": user_id}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(err["error"], json!("no_selection"));
    let (_, snapshot) = get_json(
        &app,
        &format!("/api/quizzes/{}/session/{}", quiz_id, user_id),
    )
    .await;
    assert_eq!(snapshot["current_index"], json!(0));
    assert_eq!(snapshot["answers"][0]["selected_option"], JsonValue::Null);

    // Answer 4 of 6 correctly, navigating back once along the way.
    for i in 0..6 {
        let pick = if i < 4 { 1 } else { 0 };
        post_json(
            &app,
            &format!("/api/quizzes/{}/select", quiz_id),
            json!({"user_id": user_id, "option_index": pick}),
        )
        .await;
        let (_, check) = post_json(
            &app,
            &format!("/api/quizzes/{}/check", quiz_id),
            json!({"user_id": user_id}),
        )
        .await;
        assert_eq!(check["correct"], json!(i < 4));

        if i == 2 {
            // Reviewing an earlier question does not unlock it.
            let (_, back) = post_json(
                &app,
                &format!("/api/quizzes/{}/retreat", quiz_id),
                json!({"user_id": user_id}),
            )
            .await;
            assert_eq!(back["current_index"], json!(1));
            let (status, _) = post_json(
                &app,
                &format!("/api/quizzes/{}/check", quiz_id),
                json!({"user_id": user_id}),
            )
            .await;
            assert_eq!(status, StatusCode::CONFLICT);
            // Forward again: the answer is already finalized.
            let (_, fwd) = post_json(
                &app,
                &format!("/api/quizzes/{}/advance", quiz_id),
                json!({"user_id": user_id}),
            )
            .await;
            assert_eq!(fwd["current_index"], json!(2));
        }

        let (status, after) = post_json(
            &app,
            &format!("/api/quizzes/{}/advance", quiz_id),
            json!({"user_id": user_id}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        if i == 5 {
            assert_eq!(after["state"], json!("completed"));
        }
    }

    // round(100 * 4 / 6) = 67.
    let (status, submitted) = post_json(
        &app,
        &format!("/api/quizzes/{}/submit", quiz_id),
        json!({"user_id": user_id, "duration_seconds": 240}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(submitted["already_submitted"], json!(false));
    assert_eq!(submitted["entry"]["score_percentage"], json!(67));
    assert_eq!(submitted["entry"]["correct_count"], json!(4));
    assert_eq!(submitted["ranking"]["placement"], json!(1));

    // The session is discarded once the result is persisted.
    let (status, _) = get_json(
        &app,
        &format!("/api/quizzes/{}/session/{}", quiz_id, user_id),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Re-entry routes straight to the ranking view.
    let (status, again) = post_json(
        &app,
        &format!("/api/quizzes/{}/start", quiz_id),
        json!({"user_id": user_id, "display_name": "Miriam"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(again["already_attempted"], json!(true));
    assert!(again["session"].is_null());
    assert_eq!(again["ranking"]["placement"], json!(1));

    // A duplicate submit reports the recorded entry, unchanged.
    let (status, dup) = post_json(
        &app,
        &format!("/api/quizzes/{}/submit", quiz_id),
        json!({"user_id": user_id}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(dup["already_submitted"], json!(true));
    assert_eq!(dup["entry"]["score_percentage"], json!(67));
}

#[tokio::test]
async fn ranking_orders_users_and_reports_placement_past_the_cutoff() {
    let quiz_id = Uuid::new_v4();
    let app = test_app(&[quiz_id]);

    let first = Uuid::new_v4();
    let second = Uuid::new_v4();

    run_through_quiz(&app, quiz_id, first, "Phoebe", 4).await; // 67
    post_json(
        &app,
        &format!("/api/quizzes/{}/submit", quiz_id),
        json!({"user_id": first}),
    )
    .await;

    run_through_quiz(&app, quiz_id, second, "Silas", 6).await; // 100
    post_json(
        &app,
        &format!("/api/quizzes/{}/submit", quiz_id),
        json!({"user_id": second}),
    )
    .await;

    let (status, ranking) = get_json(
        &app,
        &format!("/api/quizzes/{}/ranking?user_id={}", quiz_id, first),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ranking["entries"][0]["user_id"], json!(second));
    assert_eq!(ranking["entries"][1]["user_id"], json!(first));
    assert_eq!(ranking["placement"], json!(2));

    // Truncation does not change the reported placement.
    let (_, top1) = get_json(
        &app,
        &format!("/api/quizzes/{}/ranking?user_id={}&limit=1", quiz_id, first),
    )
    .await;
    assert_eq!(top1["entries"].as_array().unwrap().len(), 1);
    assert_eq!(top1["entries"][0]["user_id"], json!(second));
    assert_eq!(top1["placement"], json!(2));
    assert_eq!(top1["user_entry"]["score_percentage"], json!(67));
}

#[tokio::test]
async fn unpublished_quiz_is_reported_unavailable() {
    let app = test_app(&[]);
    let (status, body) = post_json(
        &app,
        &format!("/api/quizzes/{}/start", Uuid::new_v4()),
        json!({"user_id": Uuid::new_v4(), "display_name": "Jonah"}),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], json!("quiz_unavailable"));
}

#[tokio::test]
async fn partially_authored_week_is_not_served() {
    let quiz_id = Uuid::new_v4();
    let source = Arc::new(MemoryQuestionSource::new());
    let mut questions = week_questions(quiz_id);
    questions.truncate(3); // Sunday..Tuesday only
    source.seed_week(quiz_id, questions);
    let state = AppState::with_stores(source, Arc::new(MemoryRankingStore::new()));
    let app = routes::api_routes().with_state(state);

    let (status, body) = post_json(
        &app,
        &format!("/api/quizzes/{}/start", quiz_id),
        json!({"user_id": Uuid::new_v4(), "display_name": "Jonah"}),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], json!("quiz_unavailable"));

    // The catalog still lists the week, marked unavailable.
    let (_, weeks) = get_json(&app, "/api/quizzes").await;
    assert_eq!(weeks[0]["available"], json!(false));
    assert_eq!(weeks[0]["question_count"], json!(3));
}

#[tokio::test]
async fn blank_display_name_is_rejected() {
    let quiz_id = Uuid::new_v4();
    let app = test_app(&[quiz_id]);
    let (status, _) = post_json(
        &app,
        &format!("/api/quizzes/{}/start", quiz_id),
        json!({"user_id": Uuid::new_v4(), "display_name": "   "}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
