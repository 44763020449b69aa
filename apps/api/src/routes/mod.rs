pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::mentorship::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/mentorship/plan", post(handlers::handle_plan))
        .with_state(state)
}
