//! Public application submission.
//!
//! Order of checks: candidate input, resume rules, job existence and
//! status, idempotency. Nothing is stored until all of them pass. The
//! resume upload and the confirmation email are best effort.

use axum::extract::Multipart;
use bytes::Bytes;
use recruit_forms::contact::{is_valid_email, normalize_email};
use recruit_forms::{check_resume, completeness_score, parse_answers, Answers};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::extract::{optional_text, required_text};
use crate::idempotency::{validate_key, Reservation};
use crate::models::application::{ApplicationRow, NewApplication};
use crate::models::job::JobRow;
use crate::notify::{dispatch, templates::Recipient};
use crate::state::AppState;
use crate::storage::ResumeUpload;

pub const NOT_ACCEPTING: &str = "Job is no longer accepting applications";

/// An uploaded file before the resume rules are applied.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: String,
    pub bytes: Bytes,
}

/// The multipart body of `POST /applications/apply/:job_id`.
#[derive(Debug, Clone, Default)]
pub struct ApplyRequest {
    pub candidate_name: String,
    pub candidate_email: String,
    /// JSON-encoded answers object keyed by field label.
    pub answers: Option<String>,
    pub resume: Option<UploadedFile>,
    pub idempotency_key: Option<String>,
}

impl ApplyRequest {
    pub async fn from_multipart(mut multipart: Multipart) -> Result<Self, AppError> {
        let mut req = ApplyRequest::default();
        while let Some(field) = multipart.next_field().await? {
            let name = field.name().unwrap_or_default().to_string();
            match name.as_str() {
                "candidateName" => req.candidate_name = field.text().await?,
                "candidateEmail" => req.candidate_email = field.text().await?,
                "answers" => req.answers = Some(field.text().await?),
                "idempotencyKey" => req.idempotency_key = optional_text(Some(field.text().await?)),
                "resume" => {
                    let file_name = field.file_name().unwrap_or_default().to_string();
                    let bytes = field.bytes().await?;
                    // Browsers send an empty part when no file was chosen.
                    if !(file_name.is_empty() && bytes.is_empty()) {
                        req.resume = Some(UploadedFile { file_name, bytes });
                    }
                }
                other => debug!(field = other, "Ignoring unknown multipart field"),
            }
        }
        Ok(req)
    }
}

/// How a submission was satisfied.
#[derive(Debug)]
pub enum ApplyOutcome {
    Created(ApplicationRow),
    /// A retry of an earlier submission; nothing new was stored.
    Replayed(ApplicationRow),
}

struct CheckedSubmission {
    candidate_name: String,
    candidate_email: String,
    answers: Answers,
    resume: Option<ResumeUpload>,
    idempotency_key: Option<String>,
}

fn check_submission(req: ApplyRequest) -> Result<CheckedSubmission, AppError> {
    let candidate_name = required_text(&req.candidate_name, "Name is required")?;
    let candidate_email = normalize_email(&req.candidate_email);
    if !is_valid_email(&candidate_email) {
        return Err(AppError::Validation("Valid email is required".to_string()));
    }
    let answers = parse_answers(req.answers.as_deref().unwrap_or_default())?;
    let resume = req
        .resume
        .map(|file| -> Result<ResumeUpload, AppError> {
            let format = check_resume(&file.file_name, file.bytes.len())?;
            Ok(ResumeUpload {
                file_name: file.file_name,
                format,
                bytes: file.bytes,
            })
        })
        .transpose()?;
    if let Some(key) = &req.idempotency_key {
        validate_key(key)?;
    }
    Ok(CheckedSubmission {
        candidate_name,
        candidate_email,
        answers,
        resume,
        idempotency_key: req.idempotency_key,
    })
}

pub async fn submit_application(
    state: &AppState,
    job_id: Uuid,
    req: ApplyRequest,
) -> Result<ApplyOutcome, AppError> {
    let submission = check_submission(req)?;

    let job = state
        .jobs
        .find_job(job_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Job not found".to_string()))?;
    if !job.job_status().accepts_applications() {
        return Err(AppError::StateConflict(NOT_ACCEPTING.to_string()));
    }

    let mut reserved = false;
    if let Some(key) = submission.idempotency_key.as_deref() {
        match state.submissions.reserve(key).await {
            Ok(Reservation::Fresh) => reserved = true,
            Ok(Reservation::Pending) => {
                return Err(AppError::Conflict(
                    "This application is already being submitted".to_string(),
                ))
            }
            Ok(Reservation::Completed(id)) => {
                if let Some(existing) = state.applications.find_application(id).await? {
                    info!(application_id = %id, "Replaying completed submission");
                    return Ok(ApplyOutcome::Replayed(existing));
                }
            }
            Err(e) => warn!("Submission guard unavailable, relying on database lookup: {e}"),
        }

        if let Some(existing) = state.applications.find_by_idempotency_key(key).await? {
            if reserved {
                if let Err(e) = state.submissions.complete(key, existing.id).await {
                    warn!("Failed to record completed submission: {e}");
                }
            }
            info!(application_id = %existing.id, "Replaying stored submission");
            return Ok(ApplyOutcome::Replayed(existing));
        }
    }

    let key = submission.idempotency_key.clone();
    let result = store_application(state, &job, submission).await;

    if let (true, Some(key)) = (reserved, key.as_deref()) {
        let settled = match &result {
            Ok(application) => state.submissions.complete(key, application.id).await,
            Err(_) => state.submissions.release(key).await,
        };
        if let Err(e) = settled {
            warn!("Failed to settle submission key: {e}");
        }
    }

    let application = result?;
    info!(
        application_id = %application.id,
        job_id = %job.id,
        score = application.score,
        has_resume = application.resume_url.is_some(),
        "Application received"
    );

    let email = state.templates().application_received(
        Recipient {
            name: &application.candidate_name,
            email: &application.candidate_email,
        },
        &job.title,
    );
    dispatch(&state.notifier, email);

    Ok(ApplyOutcome::Created(application))
}

async fn store_application(
    state: &AppState,
    job: &JobRow,
    submission: CheckedSubmission,
) -> Result<ApplicationRow, AppError> {
    let resume_url = match &submission.resume {
        Some(upload) => match state.resumes.store(upload).await {
            Ok(url) => Some(url),
            Err(e) => {
                warn!(job_id = %job.id, "Resume upload failed, storing application without it: {e}");
                None
            }
        },
        None => None,
    };

    let score = completeness_score(&submission.answers);
    let mut application = state
        .applications
        .create_application(NewApplication {
            job_id: job.id,
            candidate_name: submission.candidate_name,
            candidate_email: submission.candidate_email,
            resume_url,
            answers: submission.answers,
            score,
            idempotency_key: submission.idempotency_key,
        })
        .await?;
    application.job_title = Some(job.title.clone());
    application.job_department = Some(job.department.clone());
    Ok(application)
}
