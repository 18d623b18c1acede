use axum::{
    extract::Request,
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;

pub const ADMIN_TOKEN_HEADER: &str = "x-admin-token";

/// Trivial shared-token guard for the authoring surface. Real authn/authz is
/// out of scope; this only keeps the admin API off the anonymous path.
pub async fn require_admin_token(req: Request, next: Next) -> Response {
    let Some(header) = req.headers().get(ADMIN_TOKEN_HEADER) else {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"error": "missing_admin_token"})),
        )
            .into_response();
    };
    let Ok(token) = header.to_str() else {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"error": "bad_admin_token"})),
        )
            .into_response();
    };

    let config = crate::config::get_config();
    if token != config.admin_token {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"error": "invalid_admin_token"})),
        )
            .into_response();
    }

    next.run(req).await
}
