pub mod config;
pub mod database;
pub mod dto;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod utils;

use crate::services::{
    participant_service::ParticipantService, result_service::ResultService,
    session_service::SessionService, test_service::TestService,
};
use sqlx::PgPool;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub test_service: TestService,
    pub participant_service: ParticipantService,
    pub session_service: SessionService,
    pub result_service: ResultService,
}

impl AppState {
    pub fn new(pool: PgPool) -> Self {
        let test_service = TestService::new(pool.clone());
        let participant_service = ParticipantService::new(pool.clone());
        let session_service = SessionService::new(pool.clone());
        let result_service = ResultService::new(pool.clone());

        Self {
            pool,
            test_service,
            participant_service,
            session_service,
            result_service,
        }
    }
}
