//! In-memory store used by handler tests.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use recruit_forms::JobStatus;
use sqlx::types::Json;
use uuid::Uuid;

use super::{page, ApplicationStore, InterviewStore, JobStore, OfferStore};
use crate::errors::AppError;
use crate::models::application::{
    ApplicationFilter, ApplicationRow, ApplicationStats, ApplicationStatus, NewApplication,
};
use crate::models::interview::{
    InterviewFilter, InterviewRow, InterviewStats, InterviewStatus, InterviewUpdate, NewInterview,
};
use crate::models::job::{JobFilter, JobRow, JobStats, JobUpdate, NewJob};
use crate::models::offer::{NewOffer, OfferFilter, OfferRow, OfferStats, OfferStatus, OfferUpdate};

#[derive(Default)]
struct Tables {
    jobs: Vec<JobRow>,
    applications: Vec<ApplicationRow>,
    interviews: Vec<InterviewRow>,
    offers: Vec<OfferRow>,
}

impl Tables {
    fn with_job(&self, mut app: ApplicationRow) -> ApplicationRow {
        if let Some(job) = self.jobs.iter().find(|j| j.id == app.job_id) {
            app.job_title = Some(job.title.clone());
            app.job_department = Some(job.department.clone());
        }
        app
    }

    fn candidate(&self, application_id: Uuid) -> (Option<String>, Option<String>, Option<String>) {
        let Some(app) = self.applications.iter().find(|a| a.id == application_id) else {
            return (None, None, None);
        };
        let title = self
            .jobs
            .iter()
            .find(|j| j.id == app.job_id)
            .map(|j| j.title.clone());
        (
            Some(app.candidate_name.clone()),
            Some(app.candidate_email.clone()),
            title,
        )
    }

    fn with_candidate_interview(&self, mut row: InterviewRow) -> InterviewRow {
        (row.candidate_name, row.candidate_email, row.job_title) = self.candidate(row.application_id);
        row
    }

    fn with_candidate_offer(&self, mut row: OfferRow) -> OfferRow {
        (row.candidate_name, row.candidate_email, row.job_title) = self.candidate(row.application_id);
        row
    }
}

#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    fn lock(&self) -> std::sync::MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn application_count(&self) -> usize {
        self.lock().applications.len()
    }
}

fn contains(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

#[async_trait]
impl JobStore for MemoryStore {
    async fn list_jobs(&self, filter: &JobFilter) -> Result<Vec<JobRow>, AppError> {
        let tables = self.lock();
        let mut rows: Vec<JobRow> = tables
            .jobs
            .iter()
            .filter(|j| filter.status.map_or(true, |s| j.status == s.as_str()))
            .filter(|j| {
                filter
                    .department
                    .as_deref()
                    .map_or(true, |d| contains(&j.department, d.trim()))
            })
            .cloned()
            .map(|mut j| {
                let count = tables.applications.iter().filter(|a| a.job_id == j.id).count();
                j.applications_count = Some(count as i64);
                j
            })
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }

    async fn find_job(&self, id: Uuid) -> Result<Option<JobRow>, AppError> {
        Ok(self.lock().jobs.iter().find(|j| j.id == id).cloned())
    }

    async fn create_job(&self, job: NewJob) -> Result<JobRow, AppError> {
        let row = JobRow {
            id: Uuid::new_v4(),
            title: job.title,
            department: job.department,
            description: job.description,
            form_schema: Json(job.form_schema),
            created_by: Some(job.created_by),
            status: JobStatus::Active.as_str().to_string(),
            created_at: Utc::now(),
            applications_count: None,
        };
        self.lock().jobs.push(row.clone());
        Ok(row)
    }

    async fn update_job(&self, id: Uuid, update: JobUpdate) -> Result<Option<JobRow>, AppError> {
        let mut tables = self.lock();
        let Some(job) = tables.jobs.iter_mut().find(|j| j.id == id) else {
            return Ok(None);
        };
        job.title = update.title;
        job.department = update.department;
        job.description = update.description;
        job.form_schema = Json(update.form_schema);
        job.status = update.status.as_str().to_string();
        Ok(Some(job.clone()))
    }

    async fn set_job_status(
        &self,
        id: Uuid,
        status: JobStatus,
    ) -> Result<Option<JobRow>, AppError> {
        let mut tables = self.lock();
        let Some(job) = tables.jobs.iter_mut().find(|j| j.id == id) else {
            return Ok(None);
        };
        job.status = status.as_str().to_string();
        Ok(Some(job.clone()))
    }

    async fn delete_job(&self, id: Uuid) -> Result<bool, AppError> {
        let mut tables = self.lock();
        let before = tables.jobs.len();
        tables.jobs.retain(|j| j.id != id);
        if tables.jobs.len() == before {
            return Ok(false);
        }
        let removed: Vec<Uuid> = tables
            .applications
            .iter()
            .filter(|a| a.job_id == id)
            .map(|a| a.id)
            .collect();
        tables.applications.retain(|a| a.job_id != id);
        tables.interviews.retain(|i| !removed.contains(&i.application_id));
        tables.offers.retain(|o| !removed.contains(&o.application_id));
        Ok(true)
    }

    async fn job_stats(&self) -> Result<JobStats, AppError> {
        let tables = self.lock();
        let count = |s: JobStatus| tables.jobs.iter().filter(|j| j.status == s.as_str()).count() as i64;
        Ok(JobStats {
            total_jobs: tables.jobs.len() as i64,
            active_jobs: count(JobStatus::Active),
            closed_jobs: count(JobStatus::Closed),
        })
    }
}

#[async_trait]
impl ApplicationStore for MemoryStore {
    async fn list_applications(
        &self,
        filter: &ApplicationFilter,
    ) -> Result<Vec<ApplicationRow>, AppError> {
        let (limit, offset) = page(filter.limit, filter.offset);
        let tables = self.lock();
        let search = filter
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty());
        let mut rows: Vec<ApplicationRow> = tables
            .applications
            .iter()
            .filter(|a| filter.job_id.map_or(true, |id| a.job_id == id))
            .filter(|a| filter.status.map_or(true, |s| a.status == s.as_str()))
            .filter(|a| {
                search.map_or(true, |s| {
                    contains(&a.candidate_name, s) || contains(&a.candidate_email, s)
                })
            })
            .filter(|a| filter.min_score.map_or(true, |min| a.score >= min))
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .map(|a| tables.with_job(a))
            .collect())
    }

    async fn find_application(&self, id: Uuid) -> Result<Option<ApplicationRow>, AppError> {
        let tables = self.lock();
        let row = tables.applications.iter().find(|a| a.id == id).cloned();
        Ok(row.map(|a| tables.with_job(a)))
    }

    async fn find_by_idempotency_key(
        &self,
        key: &str,
    ) -> Result<Option<ApplicationRow>, AppError> {
        let tables = self.lock();
        let row = tables
            .applications
            .iter()
            .find(|a| a.idempotency_key.as_deref() == Some(key))
            .cloned();
        Ok(row.map(|a| tables.with_job(a)))
    }

    async fn create_application(
        &self,
        application: NewApplication,
    ) -> Result<ApplicationRow, AppError> {
        let mut tables = self.lock();
        if !tables.jobs.iter().any(|j| j.id == application.job_id) {
            return Err(AppError::Validation(
                "Referenced resource does not exist".to_string(),
            ));
        }
        if let Some(key) = &application.idempotency_key {
            if tables
                .applications
                .iter()
                .any(|a| a.idempotency_key.as_ref() == Some(key))
            {
                return Err(AppError::Conflict("Resource already exists".to_string()));
            }
        }
        let row = ApplicationRow {
            id: Uuid::new_v4(),
            job_id: application.job_id,
            candidate_name: application.candidate_name,
            candidate_email: application.candidate_email,
            resume_url: application.resume_url,
            answers: Json(application.answers),
            score: application.score,
            status: ApplicationStatus::New.as_str().to_string(),
            idempotency_key: application.idempotency_key,
            created_at: Utc::now(),
            job_title: None,
            job_department: None,
        };
        tables.applications.push(row.clone());
        Ok(row)
    }

    async fn set_application_status(
        &self,
        id: Uuid,
        status: ApplicationStatus,
    ) -> Result<Option<ApplicationRow>, AppError> {
        let mut tables = self.lock();
        let Some(app) = tables.applications.iter_mut().find(|a| a.id == id) else {
            return Ok(None);
        };
        app.status = status.as_str().to_string();
        let app = app.clone();
        Ok(Some(tables.with_job(app)))
    }

    async fn delete_application(&self, id: Uuid) -> Result<bool, AppError> {
        let mut tables = self.lock();
        let before = tables.applications.len();
        tables.applications.retain(|a| a.id != id);
        tables.interviews.retain(|i| i.application_id != id);
        tables.offers.retain(|o| o.application_id != id);
        Ok(tables.applications.len() < before)
    }

    async fn application_stats(&self) -> Result<ApplicationStats, AppError> {
        let tables = self.lock();
        let count = |s: ApplicationStatus| {
            tables
                .applications
                .iter()
                .filter(|a| a.status == s.as_str())
                .count() as i64
        };
        Ok(ApplicationStats {
            total_applications: tables.applications.len() as i64,
            new_applications: count(ApplicationStatus::New),
            shortlisted: count(ApplicationStatus::Shortlisted),
            interviewed: count(ApplicationStatus::Interviewed),
            offered: count(ApplicationStatus::Offered),
            rejected: count(ApplicationStatus::Rejected),
        })
    }
}

#[async_trait]
impl InterviewStore for MemoryStore {
    async fn list_interviews(
        &self,
        filter: &InterviewFilter,
    ) -> Result<Vec<InterviewRow>, AppError> {
        let tables = self.lock();
        let mut rows: Vec<InterviewRow> = tables
            .interviews
            .iter()
            .filter(|i| filter.status.map_or(true, |s| i.status == s.as_str()))
            .filter(|i| filter.interviewer.map_or(true, |id| i.interviewer == Some(id)))
            .filter(|i| filter.start_date.map_or(true, |t| i.scheduled_time >= t))
            .filter(|i| filter.end_date.map_or(true, |t| i.scheduled_time <= t))
            .cloned()
            .map(|i| tables.with_candidate_interview(i))
            .collect();
        rows.sort_by(|a, b| a.scheduled_time.cmp(&b.scheduled_time));
        Ok(rows)
    }

    async fn find_interview(&self, id: Uuid) -> Result<Option<InterviewRow>, AppError> {
        let tables = self.lock();
        let row = tables.interviews.iter().find(|i| i.id == id).cloned();
        Ok(row.map(|i| tables.with_candidate_interview(i)))
    }

    async fn create_interview(&self, interview: NewInterview) -> Result<InterviewRow, AppError> {
        let mut tables = self.lock();
        let row = InterviewRow {
            id: Uuid::new_v4(),
            application_id: interview.application_id,
            interviewer: Some(interview.interviewer),
            scheduled_time: interview.scheduled_time,
            meeting_link: interview.meeting_link,
            notes: interview.notes,
            status: InterviewStatus::Scheduled.as_str().to_string(),
            created_at: Utc::now(),
            candidate_name: None,
            candidate_email: None,
            job_title: None,
        };
        tables.interviews.push(row.clone());
        Ok(tables.with_candidate_interview(row))
    }

    async fn update_interview(
        &self,
        id: Uuid,
        update: InterviewUpdate,
    ) -> Result<Option<InterviewRow>, AppError> {
        let mut tables = self.lock();
        let Some(row) = tables.interviews.iter_mut().find(|i| i.id == id) else {
            return Ok(None);
        };
        row.scheduled_time = update.scheduled_time;
        row.meeting_link = update.meeting_link;
        row.notes = update.notes;
        row.status = update.status.as_str().to_string();
        let row = row.clone();
        Ok(Some(tables.with_candidate_interview(row)))
    }

    async fn set_interview_status(
        &self,
        id: Uuid,
        status: InterviewStatus,
    ) -> Result<Option<InterviewRow>, AppError> {
        let mut tables = self.lock();
        let Some(row) = tables.interviews.iter_mut().find(|i| i.id == id) else {
            return Ok(None);
        };
        row.status = status.as_str().to_string();
        let row = row.clone();
        Ok(Some(tables.with_candidate_interview(row)))
    }

    async fn delete_interview(&self, id: Uuid) -> Result<bool, AppError> {
        let mut tables = self.lock();
        let before = tables.interviews.len();
        tables.interviews.retain(|i| i.id != id);
        Ok(tables.interviews.len() < before)
    }

    async fn interview_stats(&self) -> Result<InterviewStats, AppError> {
        let tables = self.lock();
        let count = |s: InterviewStatus| {
            tables
                .interviews
                .iter()
                .filter(|i| i.status == s.as_str())
                .count() as i64
        };
        Ok(InterviewStats {
            total_interviews: tables.interviews.len() as i64,
            scheduled: count(InterviewStatus::Scheduled),
            completed: count(InterviewStatus::Completed),
            cancelled: count(InterviewStatus::Cancelled),
        })
    }
}

#[async_trait]
impl OfferStore for MemoryStore {
    async fn list_offers(&self, filter: &OfferFilter) -> Result<Vec<OfferRow>, AppError> {
        let tables = self.lock();
        let mut rows: Vec<OfferRow> = tables
            .offers
            .iter()
            .filter(|o| filter.status.map_or(true, |s| o.status == s.as_str()))
            .cloned()
            .map(|o| tables.with_candidate_offer(o))
            .collect();
        rows.sort_by(|a, b| b.sent_at.cmp(&a.sent_at));
        Ok(rows)
    }

    async fn find_offer(&self, id: Uuid) -> Result<Option<OfferRow>, AppError> {
        let tables = self.lock();
        let row = tables.offers.iter().find(|o| o.id == id).cloned();
        Ok(row.map(|o| tables.with_candidate_offer(o)))
    }

    async fn latest_offer_for(&self, application_id: Uuid) -> Result<Option<OfferRow>, AppError> {
        let tables = self.lock();
        let row = tables
            .offers
            .iter()
            .filter(|o| o.application_id == application_id)
            .max_by_key(|o| o.sent_at)
            .cloned();
        Ok(row.map(|o| tables.with_candidate_offer(o)))
    }

    async fn create_offer(&self, offer: NewOffer) -> Result<OfferRow, AppError> {
        let mut tables = self.lock();
        let row = OfferRow {
            id: Uuid::new_v4(),
            application_id: offer.application_id,
            position: offer.position,
            salary: offer.salary,
            offer_letter_url: Some(offer.offer_letter_url),
            status: OfferStatus::Sent.as_str().to_string(),
            sent_at: Utc::now(),
            candidate_name: None,
            candidate_email: None,
            job_title: None,
        };
        tables.offers.push(row.clone());
        Ok(tables.with_candidate_offer(row))
    }

    async fn update_offer(
        &self,
        id: Uuid,
        update: OfferUpdate,
    ) -> Result<Option<OfferRow>, AppError> {
        let mut tables = self.lock();
        let Some(row) = tables.offers.iter_mut().find(|o| o.id == id) else {
            return Ok(None);
        };
        row.position = update.position;
        row.salary = update.salary;
        let row = row.clone();
        Ok(Some(tables.with_candidate_offer(row)))
    }

    async fn set_offer_status(
        &self,
        id: Uuid,
        status: OfferStatus,
    ) -> Result<Option<OfferRow>, AppError> {
        let mut tables = self.lock();
        let Some(row) = tables.offers.iter_mut().find(|o| o.id == id) else {
            return Ok(None);
        };
        row.status = status.as_str().to_string();
        let row = row.clone();
        Ok(Some(tables.with_candidate_offer(row)))
    }

    async fn delete_offer(&self, id: Uuid) -> Result<bool, AppError> {
        let mut tables = self.lock();
        let before = tables.offers.len();
        tables.offers.retain(|o| o.id != id);
        Ok(tables.offers.len() < before)
    }

    async fn offer_stats(&self) -> Result<OfferStats, AppError> {
        let tables = self.lock();
        let count = |s: OfferStatus| {
            tables
                .offers
                .iter()
                .filter(|o| o.status == s.as_str())
                .count() as i64
        };
        Ok(OfferStats {
            total_offers: tables.offers.len() as i64,
            sent: count(OfferStatus::Sent),
            accepted: count(OfferStatus::Accepted),
            rejected: count(OfferStatus::Rejected),
        })
    }
}
