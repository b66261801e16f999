pub mod handlers;

use recruit_forms::{FormSchema, JobStatus};
use serde::Deserialize;
use uuid::Uuid;

use crate::errors::AppError;
use crate::extract::required_text;
use crate::models::job::{JobUpdate, NewJob};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateJobRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub department: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub form_schema: FormSchema,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateJobRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub department: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub form_schema: FormSchema,
    pub status: JobStatus,
}

#[derive(Debug, Deserialize)]
pub struct JobStatusChange {
    pub status: JobStatus,
}

struct JobText {
    title: String,
    department: String,
    description: String,
}

fn job_text(title: &str, department: &str, description: &str) -> Result<JobText, AppError> {
    Ok(JobText {
        title: required_text(title, "Title is required")?,
        department: required_text(department, "Department is required")?,
        description: required_text(description, "Description is required")?,
    })
}

impl CreateJobRequest {
    /// Validates the text fields and the form schema.
    pub fn into_new_job(self, created_by: Uuid) -> Result<NewJob, AppError> {
        let text = job_text(&self.title, &self.department, &self.description)?;
        self.form_schema.validate()?;
        Ok(NewJob {
            title: text.title,
            department: text.department,
            description: text.description,
            form_schema: self.form_schema,
            created_by,
        })
    }
}

impl UpdateJobRequest {
    pub fn into_update(self) -> Result<JobUpdate, AppError> {
        let text = job_text(&self.title, &self.department, &self.description)?;
        self.form_schema.validate()?;
        Ok(JobUpdate {
            title: text.title,
            department: text.department,
            description: text.description,
            form_schema: self.form_schema,
            status: self.status,
        })
    }
}
