use axum::extract::State;
use axum::response::Response;

use super::{AppQuery, OrganizerId};
use crate::models::dashboard::RecentActivityQuery;
use crate::state::AppState;
use crate::utils::response::success;
use crate::utils::AppResult;

pub async fn stats(
    State(state): State<AppState>,
    OrganizerId(organizer_id): OrganizerId,
) -> AppResult<Response> {
    let stats = state.dashboard.organizer_stats(organizer_id).await?;
    Ok(success(stats, "Dashboard statistics retrieved"))
}

pub async fn recent_activity(
    State(state): State<AppState>,
    OrganizerId(organizer_id): OrganizerId,
    AppQuery(query): AppQuery<RecentActivityQuery>,
) -> AppResult<Response> {
    let activities = state
        .dashboard
        .recent_activity(organizer_id, query.limit)
        .await?;
    Ok(success(activities, "Recent activity retrieved"))
}

pub async fn revenue_breakdown(
    State(state): State<AppState>,
    OrganizerId(organizer_id): OrganizerId,
) -> AppResult<Response> {
    let breakdown = state.dashboard.revenue_breakdown(organizer_id).await?;
    Ok(success(breakdown, "Revenue breakdown retrieved"))
}
