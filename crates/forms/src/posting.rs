use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::schema::FormSchema;

/// Whether a job accepts new applications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    #[default]
    Active,
    Closed,
}

impl JobStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            JobStatus::Active => "active",
            JobStatus::Closed => "closed",
        }
    }

    pub fn accepts_applications(self) -> bool {
        self == JobStatus::Active
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JobStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(JobStatus::Active),
            "closed" => Ok(JobStatus::Closed),
            other => Err(format!("Invalid job status '{other}'")),
        }
    }
}

/// The public view of a job the apply page renders from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobPosting {
    pub id: Uuid,
    pub title: String,
    pub department: String,
    pub description: String,
    #[serde(default)]
    pub status: JobStatus,
    #[serde(default)]
    pub form_schema: FormSchema,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_status() {
        assert_eq!("closed".parse::<JobStatus>(), Ok(JobStatus::Closed));
        assert!("archived".parse::<JobStatus>().is_err());
        assert!(JobStatus::Active.accepts_applications());
        assert!(!JobStatus::Closed.accepts_applications());
    }

    #[test]
    fn test_posting_ignores_extra_columns() {
        let raw = serde_json::json!({
            "id": "6f1c7a5e-3f0c-4d52-9a57-2f3a1d2b4c10",
            "title": "Backend Engineer",
            "department": "Platform",
            "description": "Build things",
            "status": "active",
            "created_by": null,
            "form_schema": [{"id": "a", "type": "text", "label": "GitHub"}]
        });
        let posting: JobPosting = serde_json::from_value(raw).unwrap();
        assert_eq!(posting.form_schema.len(), 1);
        assert_eq!(posting.status, JobStatus::Active);
    }
}
