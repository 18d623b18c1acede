use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde_json::json;
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::admin_dto::{CreateTestPayload, ResultListQuery, TestListQuery, UpdateTestPayload},
    error::Result,
    services::test_service::TestFilter,
    AppState,
};

#[utoipa::path(
    post,
    path = "/api/admin/tests",
    request_body = CreateTestPayload,
    responses(
        (status = 201, description = "Test created with its questions and answers"),
        (status = 400, description = "Invalid payload")
    )
)]
#[axum::debug_handler]
pub async fn create_test(
    State(state): State<AppState>,
    Json(payload): Json<CreateTestPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let (test, questions) = state.test_service.create(payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "test": test, "questions": questions })),
    ))
}

#[utoipa::path(
    get,
    path = "/api/admin/tests/{id}",
    params(
        ("id" = Uuid, Path, description = "Test ID")
    ),
    responses(
        (status = 200, description = "Test with ordered questions and answers"),
        (status = 404, description = "Test not found")
    )
)]
#[axum::debug_handler]
pub async fn get_test(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let (test, questions) = state.test_service.get_detail(id).await?;
    Ok(Json(json!({ "test": test, "questions": questions })))
}

#[utoipa::path(
    patch,
    path = "/api/admin/tests/{id}",
    params(
        ("id" = Uuid, Path, description = "Test ID")
    ),
    request_body = UpdateTestPayload,
    responses(
        (status = 200, description = "Test updated; a supplied question set replaces the old one"),
        (status = 400, description = "Invalid payload"),
        (status = 404, description = "Test not found")
    )
)]
#[axum::debug_handler]
pub async fn update_test(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateTestPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let (test, questions) = state.test_service.update(id, payload).await?;
    Ok(Json(json!({ "test": test, "questions": questions })))
}

#[utoipa::path(
    delete,
    path = "/api/admin/tests/{id}",
    params(
        ("id" = Uuid, Path, description = "Test ID")
    ),
    responses(
        (status = 204, description = "Test and all owned children deleted"),
        (status = 404, description = "Test not found")
    )
)]
#[axum::debug_handler]
pub async fn delete_test(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    state.test_service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/api/admin/tests",
    responses(
        (status = 200, description = "Paginated test list with status filter and title search")
    )
)]
#[axum::debug_handler]
pub async fn list_tests(
    State(state): State<AppState>,
    Query(query): Query<TestListQuery>,
) -> Result<impl IntoResponse> {
    let filter = TestFilter {
        status: query.status,
        search: query.search,
    };
    let page = query.page.unwrap_or(1);
    let limit = query.limit.unwrap_or(20);
    let tests = state.test_service.list(filter, page, limit).await?;
    Ok(Json(tests))
}

#[utoipa::path(
    get,
    path = "/api/admin/results",
    responses(
        (status = 200, description = "Paginated stored results with participant names")
    )
)]
#[axum::debug_handler]
pub async fn list_results(
    State(state): State<AppState>,
    Query(query): Query<ResultListQuery>,
) -> Result<impl IntoResponse> {
    let page = query.page.unwrap_or(1);
    let limit = query.limit.unwrap_or(20);
    let results = state.result_service.list(query.test_id, page, limit).await?;
    Ok(Json(results))
}

#[utoipa::path(
    get,
    path = "/api/admin/results/{id}",
    params(
        ("id" = Uuid, Path, description = "Result ID")
    ),
    responses(
        (status = 200, description = "Stored result detail, read-only"),
        (status = 404, description = "Result not found")
    )
)]
#[axum::debug_handler]
pub async fn get_result(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let result = state.result_service.get_by_id(id).await?;
    Ok(Json(result))
}
