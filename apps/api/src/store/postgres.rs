use async_trait::async_trait;
use recruit_forms::JobStatus;
use sqlx::types::Json;
use sqlx::PgPool;
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

const APPLICATION_SELECT: &str = r#"
    SELECT a.*, j.title AS job_title, j.department AS job_department
    FROM applications a
    JOIN jobs j ON j.id = a.job_id
"#;

const INTERVIEW_SELECT: &str = r#"
    SELECT i.*, a.candidate_name, a.candidate_email, j.title AS job_title
    FROM interviews i
    JOIN applications a ON a.id = i.application_id
    JOIN jobs j ON j.id = a.job_id
"#;

const OFFER_SELECT: &str = r#"
    SELECT o.*, a.candidate_name, a.candidate_email, j.title AS job_title
    FROM offers o
    JOIN applications a ON a.id = o.application_id
    JOIN jobs j ON j.id = a.job_id
"#;

/// PostgreSQL-backed implementation of every store trait.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// `%term%` with LIKE metacharacters escaped.
fn contains_pattern(term: &str) -> String {
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

#[async_trait]
impl JobStore for PgStore {
    async fn list_jobs(&self, filter: &JobFilter) -> Result<Vec<JobRow>, AppError> {
        let rows = sqlx::query_as::<_, JobRow>(
            r#"
            SELECT j.*, COUNT(a.id) AS applications_count
            FROM jobs j
            LEFT JOIN applications a ON a.job_id = j.id
            WHERE ($1::text IS NULL OR j.status = $1)
              AND ($2::text IS NULL OR j.department ILIKE $2)
            GROUP BY j.id
            ORDER BY j.created_at DESC
            "#,
        )
        .bind(filter.status.map(JobStatus::as_str))
        .bind(non_blank(&filter.department).map(contains_pattern))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn find_job(&self, id: Uuid) -> Result<Option<JobRow>, AppError> {
        let row = sqlx::query_as::<_, JobRow>("SELECT * FROM jobs WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn create_job(&self, job: NewJob) -> Result<JobRow, AppError> {
        let row = sqlx::query_as::<_, JobRow>(
            r#"
            INSERT INTO jobs (title, department, description, form_schema, created_by)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(&job.title)
        .bind(&job.department)
        .bind(&job.description)
        .bind(Json(&job.form_schema))
        .bind(job.created_by)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn update_job(&self, id: Uuid, update: JobUpdate) -> Result<Option<JobRow>, AppError> {
        let row = sqlx::query_as::<_, JobRow>(
            r#"
            UPDATE jobs
            SET title = $1, department = $2, description = $3, form_schema = $4, status = $5
            WHERE id = $6
            RETURNING *
            "#,
        )
        .bind(&update.title)
        .bind(&update.department)
        .bind(&update.description)
        .bind(Json(&update.form_schema))
        .bind(update.status.as_str())
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn set_job_status(
        &self,
        id: Uuid,
        status: JobStatus,
    ) -> Result<Option<JobRow>, AppError> {
        let row =
            sqlx::query_as::<_, JobRow>("UPDATE jobs SET status = $1 WHERE id = $2 RETURNING *")
                .bind(status.as_str())
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row)
    }

    async fn delete_job(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM jobs WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn job_stats(&self) -> Result<JobStats, AppError> {
        let stats = sqlx::query_as::<_, JobStats>(
            r#"
            SELECT
                COUNT(*) AS total_jobs,
                COUNT(*) FILTER (WHERE status = 'active') AS active_jobs,
                COUNT(*) FILTER (WHERE status = 'closed') AS closed_jobs
            FROM jobs
            "#,
        )
        .fetch_one(&self.pool)
        .await?;
        Ok(stats)
    }
}

#[async_trait]
impl ApplicationStore for PgStore {
    async fn list_applications(
        &self,
        filter: &ApplicationFilter,
    ) -> Result<Vec<ApplicationRow>, AppError> {
        let (limit, offset) = page(filter.limit, filter.offset);
        let sql = format!(
            r#"{APPLICATION_SELECT}
            WHERE ($1::uuid IS NULL OR a.job_id = $1)
              AND ($2::text IS NULL OR a.status = $2)
              AND ($3::text IS NULL OR a.candidate_name ILIKE $3 OR a.candidate_email ILIKE $3)
              AND ($4::int IS NULL OR a.score >= $4)
            ORDER BY a.created_at DESC
            LIMIT $5 OFFSET $6
            "#
        );
        let rows = sqlx::query_as::<_, ApplicationRow>(&sql)
            .bind(filter.job_id)
            .bind(filter.status.map(ApplicationStatus::as_str))
            .bind(non_blank(&filter.search).map(contains_pattern))
            .bind(filter.min_score)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn find_application(&self, id: Uuid) -> Result<Option<ApplicationRow>, AppError> {
        let sql = format!("{APPLICATION_SELECT} WHERE a.id = $1");
        let row = sqlx::query_as::<_, ApplicationRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn find_by_idempotency_key(
        &self,
        key: &str,
    ) -> Result<Option<ApplicationRow>, AppError> {
        let sql = format!("{APPLICATION_SELECT} WHERE a.idempotency_key = $1");
        let row = sqlx::query_as::<_, ApplicationRow>(&sql)
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn create_application(
        &self,
        application: NewApplication,
    ) -> Result<ApplicationRow, AppError> {
        let row = sqlx::query_as::<_, ApplicationRow>(
            r#"
            INSERT INTO applications
                (job_id, candidate_name, candidate_email, resume_url, answers, score, idempotency_key)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(application.job_id)
        .bind(&application.candidate_name)
        .bind(&application.candidate_email)
        .bind(&application.resume_url)
        .bind(Json(&application.answers))
        .bind(application.score)
        .bind(&application.idempotency_key)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn set_application_status(
        &self,
        id: Uuid,
        status: ApplicationStatus,
    ) -> Result<Option<ApplicationRow>, AppError> {
        let result = sqlx::query("UPDATE applications SET status = $1 WHERE id = $2")
            .bind(status.as_str())
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.find_application(id).await
    }

    async fn delete_application(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM applications WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn application_stats(&self) -> Result<ApplicationStats, AppError> {
        let stats = sqlx::query_as::<_, ApplicationStats>(
            r#"
            SELECT
                COUNT(*) AS total_applications,
                COUNT(*) FILTER (WHERE status = 'new') AS new_applications,
                COUNT(*) FILTER (WHERE status = 'shortlisted') AS shortlisted,
                COUNT(*) FILTER (WHERE status = 'interviewed') AS interviewed,
                COUNT(*) FILTER (WHERE status = 'offered') AS offered,
                COUNT(*) FILTER (WHERE status = 'rejected') AS rejected
            FROM applications
            "#,
        )
        .fetch_one(&self.pool)
        .await?;
        Ok(stats)
    }
}

#[async_trait]
impl InterviewStore for PgStore {
    async fn list_interviews(
        &self,
        filter: &InterviewFilter,
    ) -> Result<Vec<InterviewRow>, AppError> {
        let sql = format!(
            r#"{INTERVIEW_SELECT}
            WHERE ($1::text IS NULL OR i.status = $1)
              AND ($2::uuid IS NULL OR i.interviewer = $2)
              AND ($3::timestamptz IS NULL OR i.scheduled_time >= $3)
              AND ($4::timestamptz IS NULL OR i.scheduled_time <= $4)
            ORDER BY i.scheduled_time ASC
            "#
        );
        let rows = sqlx::query_as::<_, InterviewRow>(&sql)
            .bind(filter.status.map(InterviewStatus::as_str))
            .bind(filter.interviewer)
            .bind(filter.start_date)
            .bind(filter.end_date)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn find_interview(&self, id: Uuid) -> Result<Option<InterviewRow>, AppError> {
        let sql = format!("{INTERVIEW_SELECT} WHERE i.id = $1");
        let row = sqlx::query_as::<_, InterviewRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn create_interview(&self, interview: NewInterview) -> Result<InterviewRow, AppError> {
        let id: Uuid = sqlx::query_scalar(
            r#"
            INSERT INTO interviews (application_id, interviewer, scheduled_time, meeting_link, notes)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(interview.application_id)
        .bind(interview.interviewer)
        .bind(interview.scheduled_time)
        .bind(&interview.meeting_link)
        .bind(&interview.notes)
        .fetch_one(&self.pool)
        .await?;
        self.find_interview(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Interview {id} not found")))
    }

    async fn update_interview(
        &self,
        id: Uuid,
        update: InterviewUpdate,
    ) -> Result<Option<InterviewRow>, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE interviews
            SET scheduled_time = $1, meeting_link = $2, notes = $3, status = $4
            WHERE id = $5
            "#,
        )
        .bind(update.scheduled_time)
        .bind(&update.meeting_link)
        .bind(&update.notes)
        .bind(update.status.as_str())
        .bind(id)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.find_interview(id).await
    }

    async fn set_interview_status(
        &self,
        id: Uuid,
        status: InterviewStatus,
    ) -> Result<Option<InterviewRow>, AppError> {
        let result = sqlx::query("UPDATE interviews SET status = $1 WHERE id = $2")
            .bind(status.as_str())
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.find_interview(id).await
    }

    async fn delete_interview(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM interviews WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn interview_stats(&self) -> Result<InterviewStats, AppError> {
        let stats = sqlx::query_as::<_, InterviewStats>(
            r#"
            SELECT
                COUNT(*) AS total_interviews,
                COUNT(*) FILTER (WHERE status = 'scheduled') AS scheduled,
                COUNT(*) FILTER (WHERE status = 'completed') AS completed,
                COUNT(*) FILTER (WHERE status = 'cancelled') AS cancelled
            FROM interviews
            "#,
        )
        .fetch_one(&self.pool)
        .await?;
        Ok(stats)
    }
}

#[async_trait]
impl OfferStore for PgStore {
    async fn list_offers(&self, filter: &OfferFilter) -> Result<Vec<OfferRow>, AppError> {
        let sql = format!(
            "{OFFER_SELECT} WHERE ($1::text IS NULL OR o.status = $1) ORDER BY o.sent_at DESC"
        );
        let rows = sqlx::query_as::<_, OfferRow>(&sql)
            .bind(filter.status.map(OfferStatus::as_str))
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn find_offer(&self, id: Uuid) -> Result<Option<OfferRow>, AppError> {
        let sql = format!("{OFFER_SELECT} WHERE o.id = $1");
        let row = sqlx::query_as::<_, OfferRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn latest_offer_for(&self, application_id: Uuid) -> Result<Option<OfferRow>, AppError> {
        let sql =
            format!("{OFFER_SELECT} WHERE o.application_id = $1 ORDER BY o.sent_at DESC LIMIT 1");
        let row = sqlx::query_as::<_, OfferRow>(&sql)
            .bind(application_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn create_offer(&self, offer: NewOffer) -> Result<OfferRow, AppError> {
        let id: Uuid = sqlx::query_scalar(
            r#"
            INSERT INTO offers (application_id, position, salary, offer_letter_url)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(offer.application_id)
        .bind(&offer.position)
        .bind(offer.salary)
        .bind(&offer.offer_letter_url)
        .fetch_one(&self.pool)
        .await?;
        self.find_offer(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Offer {id} not found")))
    }

    async fn update_offer(
        &self,
        id: Uuid,
        update: OfferUpdate,
    ) -> Result<Option<OfferRow>, AppError> {
        let result = sqlx::query("UPDATE offers SET position = $1, salary = $2 WHERE id = $3")
            .bind(&update.position)
            .bind(update.salary)
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.find_offer(id).await
    }

    async fn set_offer_status(
        &self,
        id: Uuid,
        status: OfferStatus,
    ) -> Result<Option<OfferRow>, AppError> {
        let result = sqlx::query("UPDATE offers SET status = $1 WHERE id = $2")
            .bind(status.as_str())
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.find_offer(id).await
    }

    async fn delete_offer(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM offers WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn offer_stats(&self) -> Result<OfferStats, AppError> {
        let stats = sqlx::query_as::<_, OfferStats>(
            r#"
            SELECT
                COUNT(*) AS total_offers,
                COUNT(*) FILTER (WHERE status = 'sent') AS sent,
                COUNT(*) FILTER (WHERE status = 'accepted') AS accepted,
                COUNT(*) FILTER (WHERE status = 'rejected') AS rejected
            FROM offers
            "#,
        )
        .fetch_one(&self.pool)
        .await?;
        Ok(stats)
    }
}
