use std::env;
use std::sync::Once;

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    routing::{get, post},
    Router,
};
use serde_json::{json, Value as JsonValue};
use tower::ServiceExt;
use uuid::Uuid;

static INIT: Once = Once::new();

fn init_test_config() {
    INIT.call_once(|| {
        dotenvy::dotenv().ok();
        env::set_var("SERVER_ADDRESS", "127.0.0.1:0");
        env::set_var("ADMIN_TOKEN", "test_admin_token");
        env::set_var("PUBLIC_RPS", "1000");
        env::set_var("ADMIN_RPS", "1000");
        quiz_backend::config::init_config().expect("init config");
    });
}

async fn setup() -> (Router, sqlx::PgPool) {
    init_test_config();
    let pool = quiz_backend::database::pool::create_pool()
        .await
        .expect("pool");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("migrations");

    let app_state = quiz_backend::AppState::new(pool.clone());
    let app = Router::new()
        .route("/api/register", post(quiz_backend::routes::public::register))
        .route("/api/tests", get(quiz_backend::routes::public::list_tests))
        .route(
            "/api/tests/:test_id/take",
            get(quiz_backend::routes::public::take_test),
        )
        .route(
            "/api/tests/:test_id/submit",
            post(quiz_backend::routes::public::submit_test),
        )
        .route(
            "/api/tests/:test_id/timer",
            get(quiz_backend::routes::public::get_timer),
        )
        .route(
            "/api/results/:result_id",
            get(quiz_backend::routes::public::get_result),
        )
        .with_state(app_state);
    (app, pool)
}

fn question_payload(text: &str, correct_first: bool) -> JsonValue {
    json!({
        "text": text,
        "answers": [
            { "text": "Option A", "is_correct": correct_first },
            { "text": "Option B", "is_correct": !correct_first },
        ]
    })
}

/// Create an active five-question test straight through the service layer.
async fn seed_math_test(pool: &sqlx::PgPool, status: &str) -> (Uuid, Vec<JsonValue>) {
    let service = quiz_backend::services::test_service::TestService::new(pool.clone());
    let payload: quiz_backend::dto::admin_dto::CreateTestPayload = serde_json::from_value(json!({
        "title": format!("Math {}", Uuid::new_v4()),
        "description": "Arithmetic basics",
        "status": status,
        "show_answers": "at_end",
        "timer_minutes": 10,
        "questions": (0..5).map(|i| question_payload(&format!("Question {}", i), true)).collect::<Vec<_>>(),
    }))
    .expect("payload");
    let (test, questions) = service.create(payload).await.expect("create test");
    let questions = questions
        .into_iter()
        .map(|q| serde_json::to_value(&q).expect("serialize question"))
        .collect();
    (test.id, questions)
}

async fn register_participant(app: &Router) -> Uuid {
    let unique = Uuid::new_v4().simple().to_string();
    let response = app
        .clone()
        .oneshot(
            Request::post("/api/register")
                .header("content-type", "application/json")
                .body(Body::from(
                    json!({ "first_name": format!("Ada-{}", unique), "last_name": "Lovelace" })
                        .to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let body: JsonValue = read_json(response).await;
    body["participant_id"].as_str().unwrap().parse().unwrap()
}

async fn read_json(response: axum::response::Response) -> JsonValue {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn selections_for(questions: &[JsonValue], correct: usize, skipped: usize) -> JsonValue {
    // First `correct` questions get their correct answer, the next `skipped`
    // get nothing, the rest get a wrong answer.
    let mut selections = serde_json::Map::new();
    for (i, q) in questions.iter().enumerate() {
        let qid = q["id"].as_str().unwrap().to_string();
        if i < correct {
            let answer = q["answers"]
                .as_array()
                .unwrap()
                .iter()
                .find(|a| a["is_correct"].as_bool().unwrap())
                .unwrap();
            selections.insert(qid, answer["id"].clone());
        } else if i < correct + skipped {
            // omitted entirely
        } else {
            let answer = q["answers"]
                .as_array()
                .unwrap()
                .iter()
                .find(|a| !a["is_correct"].as_bool().unwrap())
                .unwrap();
            selections.insert(qid, answer["id"].clone());
        }
    }
    JsonValue::Object(selections)
}

#[tokio::test]
#[ignore = "requires a provisioned PostgreSQL database (DATABASE_URL)"]
async fn full_flow_all_correct_scores_one_hundred() {
    let (app, pool) = setup().await;
    let (test_id, questions) = seed_math_test(&pool, "active").await;
    let participant_id = register_participant(&app).await;

    // Take page: ordered questions, correctness flags hidden, timer derived.
    let response = app
        .clone()
        .oneshot(
            Request::get(format!(
                "/api/tests/{}/take?participant_id={}",
                test_id, participant_id
            ))
            .body(Body::empty())
            .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let take: JsonValue = read_json(response).await;
    assert_eq!(take["test"]["timer_seconds"], json!(600));
    assert_eq!(take["questions"].as_array().unwrap().len(), 5);
    assert!(take["questions"][0]["answers"][0].get("is_correct").is_none());

    let response = app
        .clone()
        .oneshot(
            Request::post(format!("/api/tests/{}/submit", test_id))
                .header("content-type", "application/json")
                .body(Body::from(
                    json!({
                        "participant_id": participant_id,
                        "selections": selections_for(&questions, 5, 0),
                    })
                    .to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let submit: JsonValue = read_json(response).await;
    assert_eq!(submit["correct_answers"], json!(5));
    assert_eq!(submit["total_questions"], json!(5));
    assert_eq!(submit["percentage"], json!(100.0));
    let result_id = submit["result_id"].as_str().unwrap().to_string();

    // Double submission: same result, no second row.
    let response = app
        .clone()
        .oneshot(
            Request::post(format!("/api/tests/{}/submit", test_id))
                .header("content-type", "application/json")
                .body(Body::from(
                    json!({
                        "participant_id": participant_id,
                        "selections": selections_for(&questions, 0, 5),
                    })
                    .to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let replay: JsonValue = read_json(response).await;
    assert_eq!(replay["status"], json!("already_completed"));
    assert_eq!(replay["result_id"].as_str().unwrap(), result_id);
    assert_eq!(replay["percentage"], json!(100.0));

    let count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM test_results WHERE test_id = $1 AND participant_id = $2")
            .bind(test_id)
            .bind(participant_id)
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(count, 1);

    // Take page replays to the stored result.
    let response = app
        .clone()
        .oneshot(
            Request::get(format!(
                "/api/tests/{}/take?participant_id={}",
                test_id, participant_id
            ))
            .body(Body::empty())
            .unwrap(),
        )
        .await
        .unwrap();
    let redirect: JsonValue = read_json(response).await;
    assert_eq!(redirect["status"], json!("already_completed"));
    assert_eq!(redirect["result_id"].as_str().unwrap(), result_id);

    // Result view is scoped to its owner.
    let response = app
        .clone()
        .oneshot(
            Request::get(format!(
                "/api/results/{}?participant_id={}",
                result_id, participant_id
            ))
            .body(Body::empty())
            .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let result: JsonValue = read_json(response).await;
    assert_eq!(result["percentage"], json!(100.0));
    assert_eq!(result["answers"].as_array().unwrap().len(), 5);
}

#[tokio::test]
#[ignore = "requires a provisioned PostgreSQL database (DATABASE_URL)"]
async fn partial_submission_scores_forty_percent() {
    let (app, pool) = setup().await;
    let (test_id, questions) = seed_math_test(&pool, "active").await;
    let participant_id = register_participant(&app).await;

    let response = app
        .clone()
        .oneshot(
            Request::post(format!("/api/tests/{}/submit", test_id))
                .header("content-type", "application/json")
                .body(Body::from(
                    json!({
                        "participant_id": participant_id,
                        "selections": selections_for(&questions, 2, 1),
                    })
                    .to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let submit: JsonValue = read_json(response).await;
    assert_eq!(submit["correct_answers"], json!(2));
    assert_eq!(submit["percentage"], json!(40.0));

    // The skipped question still produced an unanswered row.
    let unanswered: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM user_answers ua
         JOIN test_results r ON ua.test_result_id = r.id
         WHERE r.test_id = $1 AND ua.selected_answer_id IS NULL",
    )
    .bind(test_id)
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(unanswered, 1);
}

#[tokio::test]
#[ignore = "requires a provisioned PostgreSQL database (DATABASE_URL)"]
async fn draft_test_is_not_takeable_and_leaves_no_result() {
    let (app, pool) = setup().await;
    let (test_id, questions) = seed_math_test(&pool, "draft").await;
    let participant_id = register_participant(&app).await;

    let response = app
        .clone()
        .oneshot(
            Request::post(format!("/api/tests/{}/submit", test_id))
                .header("content-type", "application/json")
                .body(Body::from(
                    json!({
                        "participant_id": participant_id,
                        "selections": selections_for(&questions, 5, 0),
                    })
                    .to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM test_results WHERE test_id = $1")
        .bind(test_id)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 0);
}

#[tokio::test]
#[ignore = "requires a provisioned PostgreSQL database (DATABASE_URL)"]
async fn registration_is_deduplicated_by_name_pair() {
    let (_app, pool) = setup().await;
    let service =
        quiz_backend::services::participant_service::ParticipantService::new(pool.clone());

    let suffix = Uuid::new_v4().simple().to_string();
    let first = format!("Grace-{}", suffix);
    let a = service.register(&first, "Hopper").await.expect("register");
    let b = service
        .register(&format!("  {}  ", first), " Hopper ")
        .await
        .expect("re-register");
    assert_eq!(a.id, b.id);
}

#[tokio::test]
#[ignore = "requires a provisioned PostgreSQL database (DATABASE_URL)"]
async fn unregistered_participant_is_redirected_to_registration() {
    let (app, pool) = setup().await;
    let (test_id, _questions) = seed_math_test(&pool, "active").await;

    // No participant_id at all.
    let response = app
        .clone()
        .oneshot(
            Request::get(format!("/api/tests/{}/take", test_id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body: JsonValue = read_json(response).await;
    assert_eq!(body["error"], json!("not_registered"));

    // An id that no longer exists behaves the same way.
    let response = app
        .clone()
        .oneshot(
            Request::get(format!(
                "/api/tests/{}/take?participant_id={}",
                test_id,
                Uuid::new_v4()
            ))
            .body(Body::empty())
            .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
