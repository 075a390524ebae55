use axum::response::Response;
use serde::Serialize;

use crate::utils::response::success;

pub mod dashboard;
pub mod extract;
pub mod organizer;
pub mod sales;
pub mod scanner;

pub use extract::{AppJson, AppPath, AppQuery};
pub use organizer::OrganizerId;

#[derive(Serialize)]
struct HealthPayload {
    status: &'static str,
    service: &'static str,
}

pub async fn health_check() -> Response {
    let payload = HealthPayload {
        status: "ok",
        service: "ticket-engine",
    };

    success(payload, "Health check successful")
}
