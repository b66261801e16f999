pub mod handlers;
pub mod submit;

use serde::Deserialize;

use crate::models::application::ApplicationStatus;

#[derive(Debug, Deserialize)]
pub struct ApplicationStatusChange {
    pub status: ApplicationStatus,
}
