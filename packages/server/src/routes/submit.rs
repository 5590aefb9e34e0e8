//! Submission handlers: URL and file-upload entry points.
//!
//! Both follow the same flow: resolve the canonical source identity,
//! answer synchronously from the guide cache when possible, otherwise
//! create a Pending job, enqueue it, and return 202 with the job id.

use axum::extract::{Extension, Multipart};
use axum::http::StatusCode;
use axum::Json;
use extraction::{Job, SourceInput};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;
use uuid::Uuid;

use crate::app::AppState;
use crate::error::ApiError;

#[derive(Deserialize)]
pub struct ProcessUrlRequest {
    pub url: String,
    pub owner_id: String,
}

/// `POST /api/guides/process-url`
pub async fn process_url_handler(
    Extension(state): Extension<AppState>,
    Json(request): Json<ProcessUrlRequest>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    if request.owner_id.trim().is_empty() {
        return Err(ApiError::bad_request("owner_id is required"));
    }
    let url = request.url.trim();
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(ApiError::bad_request("url must be an http(s) link"));
    }

    let source = SourceInput::url(url);
    submit_source(&state, request.owner_id, source).await
}

/// `POST /api/guides/process-upload` (multipart: `video` file, `owner_id` field)
pub async fn process_upload_handler(
    Extension(state): Extension<AppState>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let mut file: Option<(String, Vec<u8>)> = None;
    let mut owner_id: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("invalid multipart body: {e}")))?
    {
        match field.name() {
            Some("video") => {
                let file_name = field
                    .file_name()
                    .unwrap_or("upload.mp4")
                    .to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::bad_request(format!("failed to read upload: {e}")))?;
                file = Some((file_name, bytes.to_vec()));
            }
            Some("owner_id") => {
                owner_id = Some(
                    field
                        .text()
                        .await
                        .map_err(|e| ApiError::bad_request(format!("invalid owner_id: {e}")))?,
                );
            }
            _ => {}
        }
    }

    let (file_name, bytes) = file.ok_or_else(|| ApiError::bad_request("video file is required"))?;
    let owner_id = owner_id
        .filter(|o| !o.trim().is_empty())
        .ok_or_else(|| ApiError::bad_request("owner_id is required"))?;
    if bytes.is_empty() {
        return Err(ApiError::bad_request("uploaded file is empty"));
    }

    // Check the cache before touching disk: identity is the content hash.
    let probe = SourceInput::upload("unsaved", &file_name, &bytes);
    if let Some(hit) = state.cache.lookup(&probe.canonical_identity()).await? {
        info!(%file_name, "upload cache hit");
        return Ok((
            StatusCode::OK,
            Json(json!({ "cached": true, "guide": hit.guide })),
        ));
    }

    tokio::fs::create_dir_all(&state.upload_dir)
        .await
        .map_err(|e| ApiError::internal(format!("failed to prepare upload dir: {e}")))?;
    let saved_path = state
        .upload_dir
        .join(format!("{}_{}", Uuid::new_v4(), sanitize_file_name(&file_name)));
    tokio::fs::write(&saved_path, &bytes)
        .await
        .map_err(|e| ApiError::internal(format!("failed to save upload: {e}")))?;

    let source = SourceInput::upload(saved_path, file_name, &bytes);
    submit_source(&state, owner_id, source).await
}

async fn submit_source(
    state: &AppState,
    owner_id: String,
    source: SourceInput,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    if let Some(hit) = state.cache.lookup(&source.canonical_identity()).await? {
        info!(source = %source.describe(), "guide cache hit");
        return Ok((
            StatusCode::OK,
            Json(json!({ "cached": true, "guide": hit.guide })),
        ));
    }

    let job = Job::new(owner_id, source);
    let job_id = job.id;
    state.jobs.create(&job).await?;
    state.queue.submit(job)?;

    info!(%job_id, "job created and enqueued");
    Ok((
        StatusCode::ACCEPTED,
        Json(json!({ "cached": false, "job_id": job_id, "status": "pending" })),
    ))
}

fn sanitize_file_name(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect()
}
