// API layer module
//
// HTTP boundary around the agent pipeline: request validation, the
// server-sent event stream, and health checks.

pub mod errors;
pub mod handlers;
pub mod state;

use axum::{
    routing::{get, post},
    Router,
};

pub use state::AppState;

/// Routes served by the API, without middleware
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/api/process", post(handlers::process::process_task))
        .with_state(state)
}
