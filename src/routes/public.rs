use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use validator::Validate;

use crate::dto::public_dto::{
    ParticipantQuery, PublicQuestion, PublicTestSummary, RedirectToResult, RegisterRequest,
    RegisterResponse, SubmitTestRequest, SubmitTestResponse, TakeTestResponse, TestCatalogResponse,
    TimerResponse,
};
use crate::services::session_service::{SubmitOutcome, TakeTest};
use crate::AppState;

#[axum::debug_handler]
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> crate::error::Result<Response> {
    req.validate()?;
    let participant = state
        .participant_service
        .register(&req.first_name, &req.last_name)
        .await?;

    tracing::info!(participant_id = %participant.id, "participant registered");
    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            participant_id: participant.id,
            first_name: participant.first_name,
            last_name: participant.last_name,
        }),
    )
        .into_response())
}

/// Active tests only. Tests the participant already took are flagged so the
/// client can link straight to the stored result.
#[axum::debug_handler]
pub async fn list_tests(
    State(state): State<AppState>,
    Query(query): Query<ParticipantQuery>,
) -> crate::error::Result<Response> {
    let participant_id = query.participant_id.ok_or_else(|| {
        crate::error::Error::NotRegistered("No participant in request context".to_string())
    })?;
    state.participant_service.get_by_id(participant_id).await?;

    let tests = state
        .test_service
        .list_active_catalog(Some(participant_id))
        .await?;
    Ok(Json(TestCatalogResponse { tests }).into_response())
}

#[axum::debug_handler]
pub async fn take_test(
    State(state): State<AppState>,
    Path(test_id): Path<uuid::Uuid>,
    Query(query): Query<ParticipantQuery>,
) -> crate::error::Result<Response> {
    match state
        .session_service
        .begin_or_resume(query.participant_id, test_id)
        .await?
    {
        TakeTest::AlreadyCompleted { result_id } => {
            Ok(Json(RedirectToResult::new(result_id)).into_response())
        }
        TakeTest::Questions {
            test,
            questions,
            timer_seconds,
        } => {
            let response = TakeTestResponse {
                test: PublicTestSummary::new(&test, timer_seconds, questions.len()),
                questions: questions.iter().map(PublicQuestion::from).collect(),
            };
            Ok(Json(response).into_response())
        }
    }
}

#[axum::debug_handler]
pub async fn submit_test(
    State(state): State<AppState>,
    Path(test_id): Path<uuid::Uuid>,
    Json(req): Json<SubmitTestRequest>,
) -> crate::error::Result<Response> {
    let outcome = state
        .session_service
        .submit(req.participant_id, test_id, &req.selections)
        .await?;

    let test = state.test_service.get_by_id(test_id).await?;
    let (status_code, status_label) = match &outcome {
        SubmitOutcome::Created(_) => (StatusCode::CREATED, "completed"),
        SubmitOutcome::Existing(_) => (StatusCode::OK, "already_completed"),
    };

    let result = outcome.result();
    let response = SubmitTestResponse {
        result_id: result.id,
        status: status_label.to_string(),
        total_questions: result.total_questions,
        correct_answers: result.correct_answers,
        percentage: result.percentage,
        show_result: test.show_result,
    };
    Ok((status_code, Json(response)).into_response())
}

/// Client-side countdown hint. The server never enforces the timer.
#[axum::debug_handler]
pub async fn get_timer(
    State(state): State<AppState>,
    Path(test_id): Path<uuid::Uuid>,
) -> crate::error::Result<Response> {
    let test = state.test_service.get_active(test_id).await?;
    Ok(Json(TimerResponse {
        timer_minutes: test.timer_minutes,
        timer_seconds: test.timer_seconds(),
    })
    .into_response())
}

#[axum::debug_handler]
pub async fn get_result(
    State(state): State<AppState>,
    Path(result_id): Path<uuid::Uuid>,
    Query(query): Query<ParticipantQuery>,
) -> crate::error::Result<Response> {
    let result = state
        .result_service
        .get_for_participant(result_id, query.participant_id)
        .await?;
    Ok(Json(result).into_response())
}
