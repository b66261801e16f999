pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, patch, post},
    Router,
};
use recruit_forms::MAX_RESUME_BYTES;

use crate::applications::handlers as applications;
use crate::dashboard;
use crate::interviews::handlers as interviews;
use crate::jobs::handlers as jobs;
use crate::offers::handlers as offers;
use crate::state::AppState;

/// Room for the text parts next to a maximum-size resume. Larger bodies are
/// cut off by the extractor; anything up to this is checked against the
/// resume rules so the caller gets the specific message.
const APPLY_BODY_LIMIT: usize = MAX_RESUME_BYTES + 1024 * 1024;

pub fn build_router(state: AppState) -> Router {
    let api = Router::new()
        .route("/health", get(health::health_handler))
        // Jobs
        .route("/jobs", get(jobs::handle_list_jobs).post(jobs::handle_create_job))
        .route("/jobs/stats/overview", get(jobs::handle_job_stats))
        .route(
            "/jobs/:id",
            get(jobs::handle_get_job)
                .put(jobs::handle_update_job)
                .delete(jobs::handle_delete_job),
        )
        .route("/jobs/:id/status", patch(jobs::handle_update_job_status))
        // Applications
        .route(
            "/applications/apply/:job_id",
            post(applications::handle_apply).layer(DefaultBodyLimit::max(APPLY_BODY_LIMIT)),
        )
        .route("/applications", get(applications::handle_list_applications))
        .route(
            "/applications/stats/overview",
            get(applications::handle_application_stats),
        )
        .route(
            "/applications/:id",
            get(applications::handle_get_application)
                .delete(applications::handle_delete_application),
        )
        .route(
            "/applications/:id/status",
            patch(applications::handle_update_application_status),
        )
        // Interviews
        .route(
            "/interviews",
            get(interviews::handle_list_interviews).post(interviews::handle_schedule_interview),
        )
        .route(
            "/interviews/stats/overview",
            get(interviews::handle_interview_stats),
        )
        .route(
            "/interviews/:id",
            get(interviews::handle_get_interview)
                .put(interviews::handle_update_interview)
                .delete(interviews::handle_delete_interview),
        )
        .route(
            "/interviews/:id/status",
            patch(interviews::handle_update_interview_status),
        )
        // Offers
        .route(
            "/offers",
            get(offers::handle_list_offers).post(offers::handle_create_offer),
        )
        .route("/offers/stats/overview", get(offers::handle_offer_stats))
        .route(
            "/offers/letter/:application_id",
            get(offers::handle_offer_letter),
        )
        .route("/offers/respond/:id", patch(offers::handle_respond_to_offer))
        .route(
            "/offers/:id",
            get(offers::handle_get_offer)
                .put(offers::handle_update_offer)
                .delete(offers::handle_delete_offer),
        )
        .route("/offers/:id/status", patch(offers::handle_update_offer_status))
        // Dashboard
        .route("/dashboard/overview", get(dashboard::handle_overview))
        .route(
            "/dashboard/recent-activity",
            get(dashboard::handle_recent_activity),
        );

    Router::new()
        .route("/health", get(health::health_handler))
        .nest("/api/v1", api)
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;

    use crate::testing::TestApp;

    #[tokio::test]
    async fn test_health_on_both_paths() {
        let app = TestApp::new();
        for uri in ["/health", "/api/v1/health"] {
            let res = app.get(uri, None).await;
            assert_eq!(res.status, StatusCode::OK);
            assert_eq!(res.json["status"], "ok");
            assert_eq!(res.json["service"], "recruit-api");
        }
    }

    #[tokio::test]
    async fn test_unknown_route_is_not_found() {
        let app = TestApp::new();
        assert_eq!(
            app.get("/api/v1/nothing-here", None).await.status,
            StatusCode::NOT_FOUND
        );
    }
}
