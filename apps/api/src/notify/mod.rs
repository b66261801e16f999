//! Candidate notifications.
//!
//! Emails are rendered by [`templates`] and handed to a [`Notifier`] on a
//! background task. Every send is best effort: a failure is logged, and the
//! request that triggered it never waits for delivery.

pub mod mailer;
pub mod templates;

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::{info, warn};

pub use mailer::{HttpMailer, LogMailer};
pub use templates::EmailTemplates;

/// A rendered email with both HTML and plain-text bodies.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Email {
    pub to: String,
    pub subject: String,
    pub html: String,
    pub text: String,
}

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Mail API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Mail API unavailable after {retries} retries")]
    Exhausted { retries: u32 },
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, email: &Email) -> Result<(), NotifyError>;
}

/// Sends `email` and logs the outcome. Errors are swallowed.
pub async fn send_best_effort(notifier: &dyn Notifier, email: Email) {
    match notifier.send(&email).await {
        Ok(()) => info!(to = %email.to, subject = %email.subject, "Email sent"),
        Err(e) => warn!(to = %email.to, subject = %email.subject, "Email sending failed: {e}"),
    }
}

/// Sends `email` on its own task and returns at once.
pub fn dispatch(notifier: &Arc<dyn Notifier>, email: Email) -> JoinHandle<()> {
    let notifier = Arc::clone(notifier);
    tokio::spawn(async move { send_best_effort(notifier.as_ref(), email).await })
}
