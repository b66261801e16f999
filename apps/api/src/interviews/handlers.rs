use axum::{extract::State, http::StatusCode, Json};
use serde_json::{json, Value};
use tracing::info;
use uuid::Uuid;

use super::{meeting_link, InterviewStatusChange, ScheduleInterviewRequest, UpdateInterviewRequest};
use crate::auth::{Admin, Staff};
use crate::errors::AppError;
use crate::extract::{optional_text, ApiJson, ApiPath, ApiQuery};
use crate::models::application::ApplicationStatus;
use crate::models::interview::{
    InterviewFilter, InterviewRow, InterviewStats, InterviewUpdate, NewInterview,
};
use crate::notify::{dispatch, templates::Recipient};
use crate::state::AppState;

fn interview_not_found(id: Uuid) -> AppError {
    AppError::NotFound(format!("Interview {id} not found"))
}

/// GET /api/v1/interviews
pub async fn handle_list_interviews(
    State(state): State<AppState>,
    _staff: Staff,
    ApiQuery(filter): ApiQuery<InterviewFilter>,
) -> Result<Json<Vec<InterviewRow>>, AppError> {
    Ok(Json(state.interviews.list_interviews(&filter).await?))
}

/// GET /api/v1/interviews/stats/overview
pub async fn handle_interview_stats(
    State(state): State<AppState>,
    _staff: Staff,
) -> Result<Json<InterviewStats>, AppError> {
    Ok(Json(state.interviews.interview_stats().await?))
}

/// GET /api/v1/interviews/:id
pub async fn handle_get_interview(
    State(state): State<AppState>,
    _staff: Staff,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<InterviewRow>, AppError> {
    let interview = state
        .interviews
        .find_interview(id)
        .await?
        .ok_or_else(|| interview_not_found(id))?;
    Ok(Json(interview))
}

/// POST /api/v1/interviews
/// Schedules an interview, moves the application to `interviewed` and
/// emails the candidate.
pub async fn handle_schedule_interview(
    State(state): State<AppState>,
    Staff(actor): Staff,
    ApiJson(req): ApiJson<ScheduleInterviewRequest>,
) -> Result<(StatusCode, Json<InterviewRow>), AppError> {
    let link = meeting_link(req.meeting_link)?;
    let application = state
        .applications
        .find_application(req.application_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Application not found".to_string()))?;

    let interview = state
        .interviews
        .create_interview(NewInterview {
            application_id: application.id,
            interviewer: actor.user_id,
            scheduled_time: req.scheduled_time,
            meeting_link: link,
            notes: optional_text(req.notes),
        })
        .await?;
    state
        .applications
        .set_application_status(application.id, ApplicationStatus::Interviewed)
        .await?;
    info!(
        interview_id = %interview.id,
        application_id = %application.id,
        scheduled_time = %interview.scheduled_time,
        "Interview scheduled"
    );

    let job_title = application.job_title.as_deref().unwrap_or("the position");
    let email = state.templates().interview_scheduled(
        Recipient {
            name: &application.candidate_name,
            email: &application.candidate_email,
        },
        job_title,
        interview.scheduled_time,
        interview.meeting_link.as_deref(),
    );
    dispatch(&state.notifier, email);

    Ok((StatusCode::CREATED, Json(interview)))
}

/// PUT /api/v1/interviews/:id
pub async fn handle_update_interview(
    State(state): State<AppState>,
    _staff: Staff,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(req): ApiJson<UpdateInterviewRequest>,
) -> Result<Json<InterviewRow>, AppError> {
    let update = InterviewUpdate {
        scheduled_time: req.scheduled_time,
        meeting_link: meeting_link(req.meeting_link)?,
        notes: optional_text(req.notes),
        status: req.status,
    };
    let interview = state
        .interviews
        .update_interview(id, update)
        .await?
        .ok_or_else(|| interview_not_found(id))?;
    info!(interview_id = %id, "Interview updated");
    Ok(Json(interview))
}

/// PATCH /api/v1/interviews/:id/status
pub async fn handle_update_interview_status(
    State(state): State<AppState>,
    _staff: Staff,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(req): ApiJson<InterviewStatusChange>,
) -> Result<Json<InterviewRow>, AppError> {
    let interview = state
        .interviews
        .set_interview_status(id, req.status)
        .await?
        .ok_or_else(|| interview_not_found(id))?;
    info!(interview_id = %id, status = req.status.as_str(), "Interview status changed");
    Ok(Json(interview))
}

/// DELETE /api/v1/interviews/:id
pub async fn handle_delete_interview(
    State(state): State<AppState>,
    _admin: Admin,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<Value>, AppError> {
    if !state.interviews.delete_interview(id).await? {
        return Err(interview_not_found(id));
    }
    info!(interview_id = %id, "Interview deleted");
    Ok(Json(json!({ "message": "Interview deleted successfully" })))
}
