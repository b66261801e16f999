use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InterviewStatus {
    #[default]
    Scheduled,
    Completed,
    Cancelled,
}

impl InterviewStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            InterviewStatus::Scheduled => "scheduled",
            InterviewStatus::Completed => "completed",
            InterviewStatus::Cancelled => "cancelled",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct InterviewRow {
    pub id: Uuid,
    pub application_id: Uuid,
    pub interviewer: Option<Uuid>,
    pub scheduled_time: DateTime<Utc>,
    pub meeting_link: Option<String>,
    pub notes: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    #[sqlx(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub candidate_name: Option<String>,
    #[sqlx(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub candidate_email: Option<String>,
    #[sqlx(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_title: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewInterview {
    pub application_id: Uuid,
    pub interviewer: Uuid,
    pub scheduled_time: DateTime<Utc>,
    pub meeting_link: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone)]
pub struct InterviewUpdate {
    pub scheduled_time: DateTime<Utc>,
    pub meeting_link: Option<String>,
    pub notes: Option<String>,
    pub status: InterviewStatus,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct InterviewFilter {
    pub status: Option<InterviewStatus>,
    pub interviewer: Option<Uuid>,
    /// Inclusive lower bound on `scheduled_time`.
    #[serde(alias = "startDate")]
    pub start_date: Option<DateTime<Utc>>,
    /// Inclusive upper bound on `scheduled_time`.
    #[serde(alias = "endDate")]
    pub end_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, FromRow)]
pub struct InterviewStats {
    pub total_interviews: i64,
    pub scheduled: i64,
    pub completed: i64,
    pub cancelled: i64,
}
