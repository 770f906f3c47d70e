pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::generation::handlers as generation;
use crate::generation::upload::MAX_UPLOAD_BYTES;
use crate::instruction::handlers as instruction;
use crate::state::AppState;

/// Three full-size photos plus form fields.
const GENERATE_BODY_LIMIT: usize = 3 * MAX_UPLOAD_BYTES + 1024 * 1024;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route(
            "/api/v1/instructions",
            post(instruction::handle_preview_instruction),
        )
        .route(
            "/api/v1/generate",
            post(generation::handle_generate).layer(DefaultBodyLimit::max(GENERATE_BODY_LIMIT)),
        )
        .with_state(state)
}
