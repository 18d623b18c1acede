use axum::{
    routing::{get, post},
    Router,
};
use quiz_backend::{
    config::{get_config, init_config},
    database::pool::create_pool,
    routes, AppState,
};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    init_config()?;
    let config = get_config();

    let pool = create_pool().await?;
    sqlx::migrate!("./migrations").run(&pool).await?;

    let app_state = AppState::new(pool);

    let base_routes = Router::new().route("/health", get(routes::health::health));

    let public_api = Router::new()
        .route("/api/register", post(routes::public::register))
        .route("/api/tests", get(routes::public::list_tests))
        .route("/api/tests/:test_id/take", get(routes::public::take_test))
        .route(
            "/api/tests/:test_id/submit",
            post(routes::public::submit_test),
        )
        .route("/api/tests/:test_id/timer", get(routes::public::get_timer))
        .route("/api/results/:result_id", get(routes::public::get_result))
        .layer(axum::middleware::from_fn_with_state(
            quiz_backend::middleware::rate_limit::new_rps_state(config.public_rps),
            quiz_backend::middleware::rate_limit::rps_middleware,
        ));

    let admin_api = Router::new()
        .route(
            "/api/admin/tests",
            get(routes::admin::list_tests).post(routes::admin::create_test),
        )
        .route(
            "/api/admin/tests/:id",
            get(routes::admin::get_test)
                .patch(routes::admin::update_test)
                .delete(routes::admin::delete_test),
        )
        .route("/api/admin/results", get(routes::admin::list_results))
        .route("/api/admin/results/:id", get(routes::admin::get_result))
        .layer(axum::middleware::from_fn(
            quiz_backend::middleware::auth::require_admin_token,
        ))
        .layer(axum::middleware::from_fn_with_state(
            quiz_backend::middleware::rate_limit::new_rps_state(config.admin_rps),
            quiz_backend::middleware::rate_limit::rps_middleware,
        ));

    let app = base_routes
        .merge(public_api)
        .merge(admin_api)
        .with_state(app_state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = config.server_address.parse()?;
    info!("Server listening on {}", addr);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
