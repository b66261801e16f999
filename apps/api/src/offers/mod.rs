pub mod handlers;
pub mod letter;

use serde::Deserialize;
use uuid::Uuid;

use crate::errors::AppError;
use crate::extract::required_text;
use crate::models::offer::OfferStatus;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOfferRequest {
    pub application_id: Uuid,
    #[serde(default)]
    pub position: String,
    pub salary: f64,
}

#[derive(Debug, Deserialize)]
pub struct UpdateOfferRequest {
    #[serde(default)]
    pub position: String,
    pub salary: f64,
}

#[derive(Debug, Deserialize)]
pub struct OfferStatusChange {
    pub status: OfferStatus,
}

/// A candidate's answer to an offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OfferDecision {
    Accepted,
    Rejected,
}

impl From<OfferDecision> for OfferStatus {
    fn from(decision: OfferDecision) -> Self {
        match decision {
            OfferDecision::Accepted => OfferStatus::Accepted,
            OfferDecision::Rejected => OfferStatus::Rejected,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct OfferResponseRequest {
    pub status: OfferDecision,
}

pub fn offer_terms(position: &str, salary: f64) -> Result<(String, f64), AppError> {
    let position = required_text(position, "Position is required")?;
    if !salary.is_finite() || salary < 0.0 {
        return Err(AppError::Validation("Valid salary is required".to_string()));
    }
    Ok((position, salary))
}

/// Where the HTML offer letter for an application is served.
pub fn letter_url(server_url: &str, application_id: Uuid) -> String {
    format!(
        "{}/api/v1/offers/letter/{application_id}",
        server_url.trim_end_matches('/')
    )
}

/// The candidate-facing page that accepts or rejects an offer.
pub fn accept_url(client_url: &str, offer_id: Uuid) -> String {
    format!("{}/accept-offer/{offer_id}", client_url.trim_end_matches('/'))
}
