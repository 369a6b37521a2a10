pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::interview::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/interview/start", post(handlers::handle_start))
        .route(
            "/api/v1/interview/submit-answer",
            post(handlers::handle_submit_answer),
        )
        .route(
            "/api/v1/interview/improve-answer",
            post(handlers::handle_improve_answer),
        )
        .route(
            "/api/v1/interview/:session_id/report",
            get(handlers::handle_get_report),
        )
        .with_state(state)
}
