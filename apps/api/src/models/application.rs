use chrono::{DateTime, Utc};
use recruit_forms::Answers;
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

/// Pipeline stage of an application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApplicationStatus {
    #[default]
    New,
    Shortlisted,
    Interviewed,
    Offered,
    Rejected,
}

impl ApplicationStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ApplicationStatus::New => "new",
            ApplicationStatus::Shortlisted => "shortlisted",
            ApplicationStatus::Interviewed => "interviewed",
            ApplicationStatus::Offered => "offered",
            ApplicationStatus::Rejected => "rejected",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ApplicationRow {
    pub id: Uuid,
    pub job_id: Uuid,
    pub candidate_name: String,
    pub candidate_email: String,
    pub resume_url: Option<String>,
    pub answers: Json<Answers>,
    pub score: i32,
    pub status: String,
    #[serde(skip)]
    pub idempotency_key: Option<String>,
    pub created_at: DateTime<Utc>,
    #[sqlx(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_title: Option<String>,
    #[sqlx(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_department: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewApplication {
    pub job_id: Uuid,
    pub candidate_name: String,
    pub candidate_email: String,
    pub resume_url: Option<String>,
    pub answers: Answers,
    pub score: i32,
    pub idempotency_key: Option<String>,
}

/// Query parameters accept snake_case or camelCase keys.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApplicationFilter {
    #[serde(alias = "jobId")]
    pub job_id: Option<Uuid>,
    pub status: Option<ApplicationStatus>,
    /// Case-insensitive match on candidate name or email.
    pub search: Option<String>,
    #[serde(alias = "minScore")]
    pub min_score: Option<i32>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, FromRow)]
pub struct ApplicationStats {
    pub total_applications: i64,
    pub new_applications: i64,
    pub shortlisted: i64,
    pub interviewed: i64,
    pub offered: i64,
    pub rejected: i64,
}
