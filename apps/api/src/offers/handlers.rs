use axum::{extract::State, http::StatusCode, response::Html, Json};
use chrono::Utc;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::info;
use uuid::Uuid;

use super::letter::{render_offer_letter, LetterDetails};
use super::{
    accept_url, letter_url, offer_terms, CreateOfferRequest, OfferResponseRequest,
    OfferStatusChange, UpdateOfferRequest,
};
use crate::auth::{Admin, Staff};
use crate::errors::AppError;
use crate::extract::{ApiJson, ApiPath, ApiQuery};
use crate::models::application::ApplicationStatus;
use crate::models::offer::{NewOffer, OfferFilter, OfferRow, OfferStats, OfferStatus, OfferUpdate};
use crate::notify::{
    dispatch,
    templates::{OfferTerms, Recipient},
};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct OfferResponse {
    pub message: String,
    pub offer: OfferRow,
}

fn offer_not_found() -> AppError {
    AppError::NotFound("Offer not found".to_string())
}

/// GET /api/v1/offers
pub async fn handle_list_offers(
    State(state): State<AppState>,
    _staff: Staff,
    ApiQuery(filter): ApiQuery<OfferFilter>,
) -> Result<Json<Vec<OfferRow>>, AppError> {
    Ok(Json(state.offers.list_offers(&filter).await?))
}

/// GET /api/v1/offers/stats/overview
pub async fn handle_offer_stats(
    State(state): State<AppState>,
    _staff: Staff,
) -> Result<Json<OfferStats>, AppError> {
    Ok(Json(state.offers.offer_stats().await?))
}

/// GET /api/v1/offers/:id
pub async fn handle_get_offer(
    State(state): State<AppState>,
    _staff: Staff,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<OfferRow>, AppError> {
    let offer = state.offers.find_offer(id).await?.ok_or_else(offer_not_found)?;
    Ok(Json(offer))
}

/// POST /api/v1/offers
/// Creates the offer, moves the application to `offered` and emails the
/// candidate links to the letter and the accept page.
pub async fn handle_create_offer(
    State(state): State<AppState>,
    _staff: Staff,
    ApiJson(req): ApiJson<CreateOfferRequest>,
) -> Result<(StatusCode, Json<OfferRow>), AppError> {
    let (position, salary) = offer_terms(&req.position, req.salary)?;
    let application = state
        .applications
        .find_application(req.application_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Application not found".to_string()))?;

    let letter = letter_url(&state.config.server_url, application.id);
    let offer = state
        .offers
        .create_offer(NewOffer {
            application_id: application.id,
            position,
            salary,
            offer_letter_url: letter.clone(),
        })
        .await?;
    state
        .applications
        .set_application_status(application.id, ApplicationStatus::Offered)
        .await?;
    info!(offer_id = %offer.id, application_id = %application.id, "Offer sent");

    let accept = accept_url(&state.config.client_url, offer.id);
    let email = state.templates().offer_letter(
        Recipient {
            name: &application.candidate_name,
            email: &application.candidate_email,
        },
        OfferTerms {
            position: &offer.position,
            salary: offer.salary,
            letter_url: &letter,
            accept_url: &accept,
        },
    );
    dispatch(&state.notifier, email);

    Ok((StatusCode::CREATED, Json(offer)))
}

/// PUT /api/v1/offers/:id
pub async fn handle_update_offer(
    State(state): State<AppState>,
    _staff: Staff,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(req): ApiJson<UpdateOfferRequest>,
) -> Result<Json<OfferRow>, AppError> {
    let (position, salary) = offer_terms(&req.position, req.salary)?;
    let offer = state
        .offers
        .update_offer(id, OfferUpdate { position, salary })
        .await?
        .ok_or_else(offer_not_found)?;
    info!(offer_id = %id, "Offer updated");
    Ok(Json(offer))
}

/// PATCH /api/v1/offers/respond/:id
/// Public: the candidate accepts or rejects from the link in the offer email.
pub async fn handle_respond_to_offer(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(req): ApiJson<OfferResponseRequest>,
) -> Result<Json<OfferResponse>, AppError> {
    let status = OfferStatus::from(req.status);
    let offer = state
        .offers
        .set_offer_status(id, status)
        .await?
        .ok_or_else(offer_not_found)?;
    info!(offer_id = %id, status = status.as_str(), "Candidate responded to offer");
    Ok(Json(OfferResponse {
        message: format!("Offer {} successfully", status.as_str()),
        offer,
    }))
}

/// PATCH /api/v1/offers/:id/status
pub async fn handle_update_offer_status(
    State(state): State<AppState>,
    _staff: Staff,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(req): ApiJson<OfferStatusChange>,
) -> Result<Json<OfferRow>, AppError> {
    let offer = state
        .offers
        .set_offer_status(id, req.status)
        .await?
        .ok_or_else(offer_not_found)?;
    info!(offer_id = %id, status = req.status.as_str(), "Offer status changed");
    Ok(Json(offer))
}

/// DELETE /api/v1/offers/:id
pub async fn handle_delete_offer(
    State(state): State<AppState>,
    _admin: Admin,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<Value>, AppError> {
    if !state.offers.delete_offer(id).await? {
        return Err(offer_not_found());
    }
    info!(offer_id = %id, "Offer deleted");
    Ok(Json(json!({ "message": "Offer deleted successfully" })))
}

/// GET /api/v1/offers/letter/:application_id
/// Public HTML letter for the latest offer on an application.
pub async fn handle_offer_letter(
    State(state): State<AppState>,
    ApiPath(application_id): ApiPath<Uuid>,
) -> Result<Html<String>, AppError> {
    let application = state
        .applications
        .find_application(application_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Application not found".to_string()))?;
    let offer = state
        .offers
        .latest_offer_for(application_id)
        .await?
        .ok_or_else(offer_not_found)?;

    Ok(Html(render_offer_letter(&LetterDetails {
        company: &state.config.company_name,
        candidate_name: &application.candidate_name,
        position: &offer.position,
        salary: offer.salary,
        date: Utc::now().date_naive(),
    })))
}

#[cfg(test)]
mod tests {
    use axum::http::{Method, StatusCode};
    use recruit_forms::{FormSchema, JobStatus};
    use serde_json::json;

    use crate::auth::Role;
    use crate::models::application::ApplicationRow;
    use crate::testing::TestApp;

    async fn offered(app: &TestApp) -> (ApplicationRow, serde_json::Value) {
        let token = app.token(Role::Hr);
        let job = app.seed_job(JobStatus::Active, FormSchema::new()).await;
        let application = app.seed_application(&job, "Ada Lovelace").await;
        let res = app
            .json(
                Method::POST,
                "/api/v1/offers",
                Some(&token),
                json!({
                    "applicationId": application.id,
                    "position": "Backend Engineer",
                    "salary": 120000
                }),
            )
            .await;
        assert_eq!(res.status, StatusCode::CREATED, "{}", res.text);
        (application, res.json)
    }

    #[tokio::test]
    async fn test_create_offer_links_letter_and_emails() {
        let app = TestApp::new();
        let (application, offer) = offered(&app).await;

        assert_eq!(offer["status"], "sent");
        assert_eq!(
            offer["offer_letter_url"],
            format!("http://api.acme.test/api/v1/offers/letter/{}", application.id)
        );

        let token = app.token(Role::Hr);
        let detail = app
            .get(&format!("/api/v1/applications/{}", application.id), Some(&token))
            .await;
        assert_eq!(detail.json["status"], "offered");

        let sent = app.sent_emails().await;
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].subject, "Job Offer - Backend Engineer");
        let accept = format!("http://jobs.acme.test/accept-offer/{}", offer["id"].as_str().unwrap());
        assert!(sent[0].text.contains(&accept));
        assert!(sent[0].text.contains("$120,000.00"));
    }

    #[tokio::test]
    async fn test_candidate_responds_without_auth() {
        let app = TestApp::new();
        let (_, offer) = offered(&app).await;
        let uri = format!("/api/v1/offers/respond/{}", offer["id"].as_str().unwrap());

        let res = app
            .json(Method::PATCH, &uri, None, json!({ "status": "sent" }))
            .await;
        assert_eq!(res.status, StatusCode::BAD_REQUEST);

        let res = app
            .json(Method::PATCH, &uri, None, json!({ "status": "accepted" }))
            .await;
        assert_eq!(res.status, StatusCode::OK);
        assert_eq!(res.json["message"], "Offer accepted successfully");
        assert_eq!(res.json["offer"]["status"], "accepted");
    }

    #[tokio::test]
    async fn test_letter_is_public_html() {
        let app = TestApp::new();
        let (application, _) = offered(&app).await;

        let res = app
            .get(&format!("/api/v1/offers/letter/{}", application.id), None)
            .await;
        assert_eq!(res.status, StatusCode::OK);
        assert!(res.text.contains("Dear Ada Lovelace,"));
        assert!(res.text.contains("$120,000.00"));

        let res = app
            .get(&format!("/api/v1/offers/letter/{}", uuid::Uuid::new_v4()), None)
            .await;
        assert_eq!(res.status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_update_validates_terms() {
        let app = TestApp::new();
        let (_, offer) = offered(&app).await;
        let token = app.token(Role::Hr);
        let uri = format!("/api/v1/offers/{}", offer["id"].as_str().unwrap());

        let res = app
            .json(Method::PUT, &uri, Some(&token), json!({ "position": "", "salary": 1 }))
            .await;
        assert_eq!(res.status, StatusCode::BAD_REQUEST);

        let res = app
            .json(
                Method::PUT,
                &uri,
                Some(&token),
                json!({ "position": "Senior Engineer", "salary": 150000.5 }),
            )
            .await;
        assert_eq!(res.status, StatusCode::OK);
        assert_eq!(res.json["position"], "Senior Engineer");
        assert_eq!(res.json["salary"], 150000.5);
    }

    #[tokio::test]
    async fn test_listing_and_stats() {
        let app = TestApp::new();
        let (_, offer) = offered(&app).await;
        let token = app.token(Role::Hr);

        let res = app
            .json(
                Method::PATCH,
                &format!("/api/v1/offers/{}/status", offer["id"].as_str().unwrap()),
                Some(&token),
                json!({ "status": "rejected" }),
            )
            .await;
        assert_eq!(res.status, StatusCode::OK);

        let rejected = app.get("/api/v1/offers?status=rejected", Some(&token)).await;
        assert_eq!(rejected.json.as_array().unwrap().len(), 1);
        let sent = app.get("/api/v1/offers?status=sent", Some(&token)).await;
        assert!(sent.json.as_array().unwrap().is_empty());

        let stats = app.get("/api/v1/offers/stats/overview", Some(&token)).await;
        assert_eq!(stats.json["total_offers"], 1);
        assert_eq!(stats.json["rejected"], 1);
    }
}
