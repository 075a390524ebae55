use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Response;
use serde::Serialize;
use uuid::Uuid;

use super::{AppJson, AppPath, OrganizerId};
use crate::models::scanner::TicketCodeRequest;
use crate::models::Ticket;
use crate::state::AppState;
use crate::utils::response::{success, with_status};
use crate::utils::AppResult;

#[derive(Serialize)]
struct CheckInList {
    event_id: Uuid,
    total: usize,
    checkins: Vec<Ticket>,
}

pub async fn check_in(
    State(state): State<AppState>,
    OrganizerId(organizer_id): OrganizerId,
    AppJson(body): AppJson<TicketCodeRequest>,
) -> AppResult<Response> {
    let receipt = state.scanner.check_in(&body.ticket_code, organizer_id).await?;
    Ok(success(receipt, "Ticket checked in successfully"))
}

/// Always `200` once the caller is identified: an invalid ticket is an
/// answer, not a failure.
pub async fn validate(
    State(state): State<AppState>,
    OrganizerId(organizer_id): OrganizerId,
    AppJson(body): AppJson<TicketCodeRequest>,
) -> AppResult<Response> {
    let result = state.scanner.validate(&body.ticket_code, organizer_id).await?;
    let message = result.message;
    Ok(with_status(StatusCode::OK, result, message))
}

pub async fn list_check_ins(
    State(state): State<AppState>,
    OrganizerId(organizer_id): OrganizerId,
    AppPath(event_id): AppPath<Uuid>,
) -> AppResult<Response> {
    let checkins = state.scanner.list_check_ins(event_id, organizer_id).await?;
    let body = CheckInList {
        event_id,
        total: checkins.len(),
        checkins,
    };
    Ok(success(body, "Check-ins retrieved"))
}

pub async fn scanner_stats(
    State(state): State<AppState>,
    OrganizerId(organizer_id): OrganizerId,
    AppPath(event_id): AppPath<Uuid>,
) -> AppResult<Response> {
    let stats = state.scanner.scanner_stats(event_id, organizer_id).await?;
    Ok(success(stats, "Scanner statistics retrieved"))
}

pub async fn cancel_ticket(
    State(state): State<AppState>,
    OrganizerId(organizer_id): OrganizerId,
    AppPath(ticket_id): AppPath<Uuid>,
) -> AppResult<Response> {
    let receipt = state.scanner.cancel(ticket_id, organizer_id).await?;
    Ok(success(receipt, "Ticket cancelled successfully"))
}
