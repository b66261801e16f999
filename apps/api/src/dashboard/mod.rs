//! Aggregates for the staff dashboard.

use axum::{extract::State, Json};
use chrono::Utc;
use serde::Serialize;

use crate::auth::Staff;
use crate::errors::AppError;
use crate::models::application::{ApplicationFilter, ApplicationRow, ApplicationStats};
use crate::models::interview::{InterviewFilter, InterviewRow, InterviewStats, InterviewStatus};
use crate::models::job::JobStats;
use crate::models::offer::OfferStats;
use crate::state::AppState;

const RECENT_LIMIT: usize = 5;

#[derive(Debug, Serialize)]
pub struct Overview {
    pub jobs: JobStats,
    pub applications: ApplicationStats,
    pub interviews: InterviewStats,
    pub offers: OfferStats,
}

#[derive(Debug, Serialize)]
pub struct RecentActivity {
    pub recent_applications: Vec<ApplicationRow>,
    pub upcoming_interviews: Vec<InterviewRow>,
}

/// GET /api/v1/dashboard/overview
pub async fn handle_overview(
    State(state): State<AppState>,
    _staff: Staff,
) -> Result<Json<Overview>, AppError> {
    let (jobs, applications, interviews, offers) = tokio::try_join!(
        state.jobs.job_stats(),
        state.applications.application_stats(),
        state.interviews.interview_stats(),
        state.offers.offer_stats(),
    )?;
    Ok(Json(Overview {
        jobs,
        applications,
        interviews,
        offers,
    }))
}

/// GET /api/v1/dashboard/recent-activity
/// The five newest applications and the next five scheduled interviews.
pub async fn handle_recent_activity(
    State(state): State<AppState>,
    _staff: Staff,
) -> Result<Json<RecentActivity>, AppError> {
    let applications_filter = ApplicationFilter {
        limit: Some(RECENT_LIMIT as i64),
        ..ApplicationFilter::default()
    };
    let interviews_filter = InterviewFilter {
        status: Some(InterviewStatus::Scheduled),
        start_date: Some(Utc::now()),
        ..InterviewFilter::default()
    };
    let (recent_applications, mut upcoming_interviews) = tokio::try_join!(
        state.applications.list_applications(&applications_filter),
        state.interviews.list_interviews(&interviews_filter),
    )?;
    upcoming_interviews.truncate(RECENT_LIMIT);
    Ok(Json(RecentActivity {
        recent_applications,
        upcoming_interviews,
    }))
}
