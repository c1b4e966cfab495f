use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use strix_core::{api_types::ApiResponse, user::User};
use strix_model::ScanJob;
use tracing::info;
use uuid::Uuid;

use crate::{
    errors::{AppError, AppResult},
    infra::app_state::AppState,
};

#[derive(Debug, Deserialize)]
pub struct CreateScanRequest {
    pub domain: String,
}

#[derive(Debug, Deserialize)]
pub struct ListScansParams {
    #[serde(default)]
    pub offset: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_limit() -> i64 {
    100
}

/// Create a scan job and launch its pipeline in the background.
///
/// The handler returns as soon as the Pending record exists; the spawned
/// task owns the run from there and the record is the progress channel.
pub async fn create_scan_handler(
    State(state): State<AppState>,
    Extension(current_user): Extension<User>,
    Json(request): Json<CreateScanRequest>,
) -> AppResult<Json<ApiResponse<ScanJob>>> {
    let domain = request.domain.trim().to_string();
    if domain.is_empty() {
        return Err(AppError::bad_request("domain must not be empty"));
    }

    let job = state.jobs.create_job(&domain, current_user.id).await?;
    info!(
        "queued scan {} for {} by {}",
        job.id, job.domain, current_user.username
    );

    let workflow = state.workflow.clone();
    let job_id = job.id;
    let scan_domain = job.domain.clone();
    tokio::spawn(async move {
        workflow.run(job_id, &scan_domain).await;
    });

    Ok(Json(ApiResponse::success(job)))
}

pub async fn list_scans_handler(
    State(state): State<AppState>,
    Extension(current_user): Extension<User>,
    Query(params): Query<ListScansParams>,
) -> AppResult<Json<ApiResponse<Vec<ScanJob>>>> {
    let offset = params.offset.max(0);
    let limit = params.limit.clamp(1, 500);

    let jobs = state.jobs.list_jobs(current_user.id, offset, limit).await?;
    Ok(Json(ApiResponse::success(jobs)))
}

pub async fn get_scan_handler(
    State(state): State<AppState>,
    Extension(current_user): Extension<User>,
    Path(scan_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<ScanJob>>> {
    let job = state
        .jobs
        .get_job_for_owner(scan_id, current_user.id)
        .await?
        .ok_or_else(|| AppError::not_found("Scan not found"))?;

    Ok(Json(ApiResponse::success(job)))
}
