use axum::extract::State;
use axum::response::Response;
use uuid::Uuid;

use super::{AppPath, AppQuery, OrganizerId};
use crate::models::sales::{DailySalesList, DailySalesQuery, SalesReportList};
use crate::state::AppState;
use crate::utils::response::success;
use crate::utils::AppResult;

pub async fn event_report(
    State(state): State<AppState>,
    OrganizerId(organizer_id): OrganizerId,
    AppPath(event_id): AppPath<Uuid>,
) -> AppResult<Response> {
    let report = state.sales.event_sales_report(event_id, organizer_id).await?;
    Ok(success(report, "Sales report retrieved"))
}

pub async fn all_reports(
    State(state): State<AppState>,
    OrganizerId(organizer_id): OrganizerId,
) -> AppResult<Response> {
    let reports = state.sales.all_sales_reports(organizer_id).await?;
    Ok(success(SalesReportList::from(reports), "Sales reports retrieved"))
}

pub async fn daily(
    State(state): State<AppState>,
    OrganizerId(organizer_id): OrganizerId,
    AppQuery(query): AppQuery<DailySalesQuery>,
) -> AppResult<Response> {
    let days = state.sales.daily_sales(organizer_id, query).await?;
    Ok(success(DailySalesList::from(days), "Daily sales retrieved"))
}

pub async fn summary(
    State(state): State<AppState>,
    OrganizerId(organizer_id): OrganizerId,
) -> AppResult<Response> {
    let summary = state.sales.sales_summary(organizer_id).await?;
    Ok(success(summary, "Sales summary retrieved"))
}

pub async fn monthly(
    State(state): State<AppState>,
    OrganizerId(organizer_id): OrganizerId,
) -> AppResult<Response> {
    let months = state.sales.monthly_revenue(organizer_id).await?;
    Ok(success(months, "Monthly revenue retrieved"))
}
