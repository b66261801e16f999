use axum::{extract::State, http::StatusCode, Json};
use serde_json::{json, Value};
use tracing::info;
use uuid::Uuid;

use super::{CreateJobRequest, JobStatusChange, UpdateJobRequest};
use crate::auth::{Admin, Staff};
use crate::errors::AppError;
use crate::extract::{ApiJson, ApiPath, ApiQuery};
use crate::models::job::{JobFilter, JobRow, JobStats};
use crate::state::AppState;

fn job_not_found(id: Uuid) -> AppError {
    AppError::NotFound(format!("Job {id} not found"))
}

/// GET /api/v1/jobs
pub async fn handle_list_jobs(
    State(state): State<AppState>,
    ApiQuery(filter): ApiQuery<JobFilter>,
) -> Result<Json<Vec<JobRow>>, AppError> {
    Ok(Json(state.jobs.list_jobs(&filter).await?))
}

/// GET /api/v1/jobs/stats/overview
pub async fn handle_job_stats(
    State(state): State<AppState>,
    _staff: Staff,
) -> Result<Json<JobStats>, AppError> {
    Ok(Json(state.jobs.job_stats().await?))
}

/// GET /api/v1/jobs/:id
/// Public: the apply page renders its form from this.
pub async fn handle_get_job(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<JobRow>, AppError> {
    let job = state.jobs.find_job(id).await?.ok_or_else(|| job_not_found(id))?;
    Ok(Json(job))
}

/// POST /api/v1/jobs
pub async fn handle_create_job(
    State(state): State<AppState>,
    Staff(actor): Staff,
    ApiJson(req): ApiJson<CreateJobRequest>,
) -> Result<(StatusCode, Json<JobRow>), AppError> {
    let new_job = req.into_new_job(actor.user_id)?;
    let job = state.jobs.create_job(new_job).await?;
    info!(job_id = %job.id, created_by = %actor.user_id, fields = job.form_schema.len(), "Job created");
    Ok((StatusCode::CREATED, Json(job)))
}

/// PUT /api/v1/jobs/:id
pub async fn handle_update_job(
    State(state): State<AppState>,
    _staff: Staff,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(req): ApiJson<UpdateJobRequest>,
) -> Result<Json<JobRow>, AppError> {
    let update = req.into_update()?;
    let job = state
        .jobs
        .update_job(id, update)
        .await?
        .ok_or_else(|| job_not_found(id))?;
    info!(job_id = %id, status = %job.status, "Job updated");
    Ok(Json(job))
}

/// PATCH /api/v1/jobs/:id/status
pub async fn handle_update_job_status(
    State(state): State<AppState>,
    _staff: Staff,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(req): ApiJson<JobStatusChange>,
) -> Result<Json<JobRow>, AppError> {
    let job = state
        .jobs
        .set_job_status(id, req.status)
        .await?
        .ok_or_else(|| job_not_found(id))?;
    info!(job_id = %id, status = %req.status, "Job status changed");
    Ok(Json(job))
}

/// DELETE /api/v1/jobs/:id
pub async fn handle_delete_job(
    State(state): State<AppState>,
    _admin: Admin,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<Value>, AppError> {
    if !state.jobs.delete_job(id).await? {
        return Err(job_not_found(id));
    }
    info!(job_id = %id, "Job deleted");
    Ok(Json(json!({ "message": "Job deleted successfully" })))
}
