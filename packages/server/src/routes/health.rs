use axum::extract::Extension;
use axum::Json;
use serde::Serialize;

use crate::app::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    status: String,
    queue_depth: usize,
}

/// Liveness endpoint: process is up, plus the current job backlog.
pub async fn health_handler(Extension(state): Extension<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        queue_depth: state.queue.depth(),
    })
}
