//! Persistence seams. Handlers only see these traits; `PgStore` backs them
//! in production.

pub mod postgres;

#[cfg(test)]
pub mod memory;

use async_trait::async_trait;
use recruit_forms::JobStatus;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::application::{
    ApplicationFilter, ApplicationRow, ApplicationStats, ApplicationStatus, NewApplication,
};
use crate::models::interview::{
    InterviewFilter, InterviewRow, InterviewStats, InterviewStatus, InterviewUpdate, NewInterview,
};
use crate::models::job::{JobFilter, JobRow, JobStats, JobUpdate, NewJob};
use crate::models::offer::{NewOffer, OfferFilter, OfferRow, OfferStats, OfferStatus, OfferUpdate};

pub use postgres::PgStore;

/// Default page size for application listings.
pub const DEFAULT_LIMIT: i64 = 50;
pub const MAX_LIMIT: i64 = 200;

/// Clamps a requested page to `1..=MAX_LIMIT` rows and a non-negative offset.
pub fn page(limit: Option<i64>, offset: Option<i64>) -> (i64, i64) {
    (
        limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT),
        offset.unwrap_or(0).max(0),
    )
}

#[async_trait]
pub trait JobStore: Send + Sync {
    /// Newest first, each with its application count.
    async fn list_jobs(&self, filter: &JobFilter) -> Result<Vec<JobRow>, AppError>;
    async fn find_job(&self, id: Uuid) -> Result<Option<JobRow>, AppError>;
    async fn create_job(&self, job: NewJob) -> Result<JobRow, AppError>;
    async fn update_job(&self, id: Uuid, update: JobUpdate) -> Result<Option<JobRow>, AppError>;
    async fn set_job_status(&self, id: Uuid, status: JobStatus)
        -> Result<Option<JobRow>, AppError>;
    /// Removes the job with its applications. Returns false if it did not exist.
    async fn delete_job(&self, id: Uuid) -> Result<bool, AppError>;
    async fn job_stats(&self) -> Result<JobStats, AppError>;
}

#[async_trait]
pub trait ApplicationStore: Send + Sync {
    /// Newest first, joined with the job title and department.
    async fn list_applications(
        &self,
        filter: &ApplicationFilter,
    ) -> Result<Vec<ApplicationRow>, AppError>;
    async fn find_application(&self, id: Uuid) -> Result<Option<ApplicationRow>, AppError>;
    async fn find_by_idempotency_key(&self, key: &str)
        -> Result<Option<ApplicationRow>, AppError>;
    async fn create_application(&self, application: NewApplication)
        -> Result<ApplicationRow, AppError>;
    async fn set_application_status(
        &self,
        id: Uuid,
        status: ApplicationStatus,
    ) -> Result<Option<ApplicationRow>, AppError>;
    async fn delete_application(&self, id: Uuid) -> Result<bool, AppError>;
    async fn application_stats(&self) -> Result<ApplicationStats, AppError>;
}

#[async_trait]
pub trait InterviewStore: Send + Sync {
    /// Earliest first, joined with candidate and job details.
    async fn list_interviews(&self, filter: &InterviewFilter)
        -> Result<Vec<InterviewRow>, AppError>;
    async fn find_interview(&self, id: Uuid) -> Result<Option<InterviewRow>, AppError>;
    async fn create_interview(&self, interview: NewInterview) -> Result<InterviewRow, AppError>;
    async fn update_interview(
        &self,
        id: Uuid,
        update: InterviewUpdate,
    ) -> Result<Option<InterviewRow>, AppError>;
    async fn set_interview_status(
        &self,
        id: Uuid,
        status: InterviewStatus,
    ) -> Result<Option<InterviewRow>, AppError>;
    async fn delete_interview(&self, id: Uuid) -> Result<bool, AppError>;
    async fn interview_stats(&self) -> Result<InterviewStats, AppError>;
}

#[async_trait]
pub trait OfferStore: Send + Sync {
    /// Most recently sent first, joined with candidate and job details.
    async fn list_offers(&self, filter: &OfferFilter) -> Result<Vec<OfferRow>, AppError>;
    async fn find_offer(&self, id: Uuid) -> Result<Option<OfferRow>, AppError>;
    /// The most recently sent offer for an application.
    async fn latest_offer_for(&self, application_id: Uuid) -> Result<Option<OfferRow>, AppError>;
    async fn create_offer(&self, offer: NewOffer) -> Result<OfferRow, AppError>;
    async fn update_offer(&self, id: Uuid, update: OfferUpdate)
        -> Result<Option<OfferRow>, AppError>;
    async fn set_offer_status(
        &self,
        id: Uuid,
        status: OfferStatus,
    ) -> Result<Option<OfferRow>, AppError>;
    async fn delete_offer(&self, id: Uuid) -> Result<bool, AppError>;
    async fn offer_stats(&self) -> Result<OfferStats, AppError>;
}
