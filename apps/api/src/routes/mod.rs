pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::render::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let upload_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/themes", get(handlers::handle_list_themes))
        .route(
            "/api/v1/resumes/render",
            post(handlers::handle_render).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .with_state(state)
}
