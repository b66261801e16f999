use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OfferStatus {
    #[default]
    Sent,
    Accepted,
    Rejected,
}

impl OfferStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            OfferStatus::Sent => "sent",
            OfferStatus::Accepted => "accepted",
            OfferStatus::Rejected => "rejected",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct OfferRow {
    pub id: Uuid,
    pub application_id: Uuid,
    pub position: String,
    pub salary: f64,
    pub offer_letter_url: Option<String>,
    pub status: String,
    pub sent_at: DateTime<Utc>,
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
pub struct NewOffer {
    pub application_id: Uuid,
    pub position: String,
    pub salary: f64,
    pub offer_letter_url: String,
}

#[derive(Debug, Clone)]
pub struct OfferUpdate {
    pub position: String,
    pub salary: f64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OfferFilter {
    pub status: Option<OfferStatus>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, FromRow)]
pub struct OfferStats {
    pub total_offers: i64,
    pub sent: i64,
    pub accepted: i64,
    pub rejected: i64,
}
