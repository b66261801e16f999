use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{info, warn};
use uuid::Uuid;

use super::submit::{submit_application, ApplyOutcome, ApplyRequest};
use super::ApplicationStatusChange;
use crate::auth::{Admin, Staff};
use crate::errors::AppError;
use crate::extract::{ApiJson, ApiPath, ApiQuery};
use crate::models::application::{ApplicationFilter, ApplicationRow, ApplicationStats, ApplicationStatus};
use crate::notify::{dispatch, templates::Recipient};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ApplyResponse {
    pub message: &'static str,
    pub application: ApplicationRow,
}

fn application_not_found(id: Uuid) -> AppError {
    AppError::NotFound(format!("Application {id} not found"))
}

/// POST /api/v1/applications/apply/:job_id
/// Public multipart endpoint: `candidateName`, `candidateEmail`, `answers`,
/// optional `resume` file and `idempotencyKey`.
pub async fn handle_apply(
    State(state): State<AppState>,
    ApiPath(job_id): ApiPath<Uuid>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<ApplyResponse>), AppError> {
    let request = ApplyRequest::from_multipart(multipart).await?;
    let (status, application) = match submit_application(&state, job_id, request).await? {
        ApplyOutcome::Created(application) => (StatusCode::CREATED, application),
        ApplyOutcome::Replayed(application) => (StatusCode::OK, application),
    };
    Ok((
        status,
        Json(ApplyResponse {
            message: "Application submitted successfully",
            application,
        }),
    ))
}

/// GET /api/v1/applications
pub async fn handle_list_applications(
    State(state): State<AppState>,
    _staff: Staff,
    ApiQuery(filter): ApiQuery<ApplicationFilter>,
) -> Result<Json<Vec<ApplicationRow>>, AppError> {
    Ok(Json(state.applications.list_applications(&filter).await?))
}

/// GET /api/v1/applications/stats/overview
pub async fn handle_application_stats(
    State(state): State<AppState>,
    _staff: Staff,
) -> Result<Json<ApplicationStats>, AppError> {
    Ok(Json(state.applications.application_stats().await?))
}

/// GET /api/v1/applications/:id
pub async fn handle_get_application(
    State(state): State<AppState>,
    _staff: Staff,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<ApplicationRow>, AppError> {
    let application = state
        .applications
        .find_application(id)
        .await?
        .ok_or_else(|| application_not_found(id))?;
    Ok(Json(application))
}

/// PATCH /api/v1/applications/:id/status
/// Moving an application to `rejected` emails the candidate every time.
pub async fn handle_update_application_status(
    State(state): State<AppState>,
    Staff(actor): Staff,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(req): ApiJson<ApplicationStatusChange>,
) -> Result<Json<ApplicationRow>, AppError> {
    let application = state
        .applications
        .set_application_status(id, req.status)
        .await?
        .ok_or_else(|| application_not_found(id))?;
    info!(application_id = %id, status = req.status.as_str(), by = %actor.user_id, "Application status changed");

    if req.status == ApplicationStatus::Rejected {
        notify_rejection(&state, &application).await;
    }
    Ok(Json(application))
}

async fn notify_rejection(state: &AppState, application: &ApplicationRow) {
    let job_title = match &application.job_title {
        Some(title) => title.clone(),
        None => match state.jobs.find_job(application.job_id).await {
            Ok(Some(job)) => job.title,
            Ok(None) => String::from("the position"),
            Err(e) => {
                warn!(application_id = %application.id, "Could not load job for rejection email: {e}");
                String::from("the position")
            }
        },
    };
    let email = state.templates().rejection(
        Recipient {
            name: &application.candidate_name,
            email: &application.candidate_email,
        },
        &job_title,
    );
    dispatch(&state.notifier, email);
}

/// DELETE /api/v1/applications/:id
pub async fn handle_delete_application(
    State(state): State<AppState>,
    _admin: Admin,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<Value>, AppError> {
    if !state.applications.delete_application(id).await? {
        return Err(application_not_found(id));
    }
    info!(application_id = %id, "Application deleted");
    Ok(Json(json!({ "message": "Application deleted successfully" })))
}
