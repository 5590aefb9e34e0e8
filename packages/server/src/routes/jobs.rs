//! Job polling and listing handlers.

use axum::extract::{Extension, Path, Query};
use axum::Json;
use extraction::JobSnapshot;
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::app::AppState;
use crate::error::ApiError;

#[derive(Deserialize)]
pub struct OwnerQuery {
    pub owner_id: String,
}

#[derive(Deserialize)]
pub struct ListQuery {
    pub owner_id: String,
    #[serde(default = "default_limit")]
    pub limit: usize,
    #[serde(default)]
    pub offset: usize,
}

fn default_limit() -> usize {
    20
}

/// `GET /api/jobs/:id?owner_id=`
///
/// Unknown ids and jobs owned by someone else both come back 404; the
/// API never confirms that a job exists for another owner.
pub async fn job_handler(
    Extension(state): Extension<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<OwnerQuery>,
) -> Result<Json<JobSnapshot>, ApiError> {
    match state.jobs.get(id, &query.owner_id).await? {
        Some(job) => Ok(Json(job.snapshot())),
        None => Err(ApiError::not_found("job not found")),
    }
}

/// `GET /api/jobs?owner_id=&limit=&offset=`, newest first.
pub async fn jobs_handler(
    Extension(state): Extension<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Value>, ApiError> {
    let limit = query.limit.min(100);
    let jobs = state
        .jobs
        .list_for_owner(&query.owner_id, limit, query.offset)
        .await?;
    let snapshots: Vec<JobSnapshot> = jobs.iter().map(|j| j.snapshot()).collect();
    Ok(Json(json!({ "jobs": snapshots })))
}
