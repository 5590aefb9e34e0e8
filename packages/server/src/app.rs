//! Application state and router setup.

use std::path::PathBuf;
use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::{Extension, Router};
use extraction::{GuideCache, JobQueue, JobStore};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::routes::{health_handler, job_handler, jobs_handler, process_upload_handler, process_url_handler};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub jobs: Arc<dyn JobStore>,
    pub cache: Arc<dyn GuideCache>,
    pub queue: JobQueue,
    pub upload_dir: PathBuf,
    pub max_upload_bytes: usize,
}

impl AppState {
    pub fn new(
        jobs: Arc<dyn JobStore>,
        cache: Arc<dyn GuideCache>,
        queue: JobQueue,
        upload_dir: PathBuf,
        max_upload_bytes: usize,
    ) -> Self {
        Self {
            jobs,
            cache,
            queue,
            upload_dir,
            max_upload_bytes,
        }
    }
}

/// Build the Axum application router
pub fn build_app(state: AppState) -> Router {
    Router::new()
        .route("/api/guides/process-url", post(process_url_handler))
        // Video uploads dwarf the framework's default body limit, so the
        // upload route carries its own ceiling.
        .route(
            "/api/guides/process-upload",
            post(process_upload_handler).layer(DefaultBodyLimit::max(state.max_upload_bytes)),
        )
        .route("/api/jobs/:id", get(job_handler))
        .route("/api/jobs", get(jobs_handler))
        .route("/health", get(health_handler))
        .layer(Extension(state))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
