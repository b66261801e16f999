pub mod handlers;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;

use crate::errors::AppError;
use crate::extract::optional_text;
use crate::models::interview::InterviewStatus;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleInterviewRequest {
    pub application_id: Uuid,
    pub scheduled_time: DateTime<Utc>,
    pub meeting_link: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateInterviewRequest {
    pub scheduled_time: DateTime<Utc>,
    pub meeting_link: Option<String>,
    pub notes: Option<String>,
    pub status: InterviewStatus,
}

#[derive(Debug, Deserialize)]
pub struct InterviewStatusChange {
    pub status: InterviewStatus,
}

/// Blank links are dropped; anything else must be an absolute http(s) URL.
pub fn meeting_link(raw: Option<String>) -> Result<Option<String>, AppError> {
    let Some(link) = optional_text(raw) else {
        return Ok(None);
    };
    let host = link
        .strip_prefix("https://")
        .or_else(|| link.strip_prefix("http://"))
        .map(|rest| rest.split(['/', '?', '#']).next().unwrap_or_default());
    match host {
        Some(host) if !host.is_empty() && !link.contains(char::is_whitespace) => Ok(Some(link)),
        _ => Err(AppError::Validation("Valid meeting link required".to_string())),
    }
}
