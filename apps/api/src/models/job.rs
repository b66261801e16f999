use chrono::{DateTime, Utc};
use recruit_forms::{FormSchema, JobStatus};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct JobRow {
    pub id: Uuid,
    pub title: String,
    pub department: String,
    pub description: String,
    pub form_schema: Json<FormSchema>,
    pub created_by: Option<Uuid>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    /// Only populated by list queries.
    #[sqlx(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub applications_count: Option<i64>,
}

impl JobRow {
    /// Unknown stored values are treated as closed so they never accept applications.
    pub fn job_status(&self) -> JobStatus {
        self.status.parse().unwrap_or(JobStatus::Closed)
    }
}

#[derive(Debug, Clone)]
pub struct NewJob {
    pub title: String,
    pub department: String,
    pub description: String,
    pub form_schema: FormSchema,
    pub created_by: Uuid,
}

#[derive(Debug, Clone)]
pub struct JobUpdate {
    pub title: String,
    pub department: String,
    pub description: String,
    pub form_schema: FormSchema,
    pub status: JobStatus,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct JobFilter {
    pub status: Option<JobStatus>,
    pub department: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, FromRow)]
pub struct JobStats {
    pub total_jobs: i64,
    pub active_jobs: i64,
    pub closed_jobs: i64,
}
