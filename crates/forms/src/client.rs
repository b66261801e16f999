//! HTTP client for the public apply page: fetch a job, submit a form.
//!
//! Every call takes a [`CancellationToken`]; cancelling it (for example
//! when the page is torn down) drops the in-flight request and leaves the
//! form editable instead of updating it with a late response.

use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::Deserialize;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use uuid::Uuid;

use crate::posting::JobPosting;
use crate::renderer::{ApplyForm, FormError};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("request cancelled")]
    Cancelled,

    #[error("job {0} not found")]
    JobNotFound(Uuid),

    #[error("form is not ready to submit ({} problems)", .0.len())]
    Invalid(Vec<FormError>),

    #[error("server rejected the request (status {status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// The part of the created application the apply page cares about.
#[derive(Debug, Clone, Deserialize)]
pub struct SubmittedApplication {
    pub id: Uuid,
    pub job_id: Uuid,
    pub score: i32,
    pub status: String,
}

#[derive(Debug, Deserialize)]
struct SubmitResponse {
    application: SubmittedApplication,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

#[derive(Clone)]
pub struct ApplyClient {
    http: Client,
    base_url: String,
}

impl ApplyClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        let http = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub async fn fetch_job(
        &self,
        job_id: Uuid,
        cancel: &CancellationToken,
    ) -> Result<JobPosting, ClientError> {
        let url = format!("{}/api/v1/jobs/{job_id}", self.base_url);
        let request = async {
            let response = self.http.get(&url).send().await?;
            if response.status() == StatusCode::NOT_FOUND {
                return Err(ClientError::JobNotFound(job_id));
            }
            let response = response.error_for_status()?;
            Ok(response.json::<JobPosting>().await?)
        };

        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(ClientError::Cancelled),
            result = request => result,
        }
    }

    /// Submits `form` as a multipart request and moves it to `Submitted` or
    /// `Failed`. Validation problems are returned without any request.
    pub async fn submit(
        &self,
        form: &mut ApplyForm,
        cancel: &CancellationToken,
    ) -> Result<SubmittedApplication, ClientError> {
        let submission = form.begin_submit().map_err(ClientError::Invalid)?;
        let job_id = submission.job_id;
        let url = format!("{}/api/v1/applications/apply/{job_id}", self.base_url);

        let request = async {
            let body = submission.into_multipart()?;
            let response = self.http.post(&url).multipart(body).send().await?;
            let status = response.status();
            if status.is_success() {
                return Ok(response.json::<SubmitResponse>().await?.application);
            }
            let message = response
                .json::<ErrorEnvelope>()
                .await
                .map(|e| e.error.message)
                .unwrap_or_else(|_| status.to_string());
            Err(ClientError::Rejected {
                status: status.as_u16(),
                message,
            })
        };

        let outcome = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                form.cancel_submission();
                return Err(ClientError::Cancelled);
            }
            result = request => result,
        };

        match outcome {
            Ok(application) => {
                info!(%job_id, application_id = %application.id, "application submitted");
                form.mark_submitted();
                Ok(application)
            }
            Err(e) => {
                warn!(%job_id, "application submission failed: {e}");
                form.mark_failed();
                Err(e)
            }
        }
    }
}
