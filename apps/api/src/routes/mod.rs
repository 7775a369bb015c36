pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::analysis::handlers as analysis;
use crate::queue::handlers as queue;
use crate::render::handlers as render;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let upload_limit = DefaultBodyLimit::max(state.config.max_upload_bytes);

    Router::new()
        .route("/health", get(health::health_handler))
        // Submission
        .route("/upload", post(analysis::handle_upload))
        .route("/upload/", post(analysis::handle_upload))
        .route(
            "/generate-resume-with-keyword",
            post(analysis::handle_generate_with_keywords),
        )
        .route(
            "/generate-resume-with-keyword/",
            post(analysis::handle_generate_with_keywords),
        )
        .route(
            "/generate-resume/:task_id",
            post(analysis::handle_generate_resume),
        )
        // Polling and retrieval
        .route("/task-status/:task_id", get(queue::handle_task_status))
        .route("/resume/download/:filename", get(render::handle_download))
        .layer(upload_limit)
        .with_state(state)
}
