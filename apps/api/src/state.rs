use std::sync::Arc;

use crate::auth::TokenVerifier;
use crate::config::Config;
use crate::idempotency::SubmissionGuard;
use crate::notify::{EmailTemplates, Notifier};
use crate::storage::ResumeStorage;
use crate::store::{ApplicationStore, InterviewStore, JobStore, OfferStore};

/// Shared application state injected into all route handlers via Axum extractors.
/// Every collaborator sits behind a trait object so tests can swap in fakes.
#[derive(Clone)]
pub struct AppState {
    pub jobs: Arc<dyn JobStore>,
    pub applications: Arc<dyn ApplicationStore>,
    pub interviews: Arc<dyn InterviewStore>,
    pub offers: Arc<dyn OfferStore>,
    pub resumes: Arc<dyn ResumeStorage>,
    pub notifier: Arc<dyn Notifier>,
    pub submissions: Arc<dyn SubmissionGuard>,
    pub tokens: TokenVerifier,
    pub config: Config,
}

impl AppState {
    pub fn templates(&self) -> EmailTemplates<'_> {
        EmailTemplates::new(&self.config.company_name)
    }
}
