use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use chrono::{DateTime, Utc};
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};
use uuid::Uuid;

use crate::store::StoreError;
use crate::utils::response::error as error_response;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Authentication error: {0}")]
    Unauthenticated(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Ticket already checked in at {checked_in_at}")]
    AlreadyCheckedIn {
        ticket_id: Uuid,
        checked_in_at: DateTime<Utc>,
    },

    #[error("Ticket has been cancelled")]
    AlreadyCancelled { ticket_id: Uuid },

    #[error("Ticket store unavailable")]
    Transient(#[source] StoreError),

    #[error("Internal server error")]
    Internal(String),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::AlreadyCheckedIn { .. } => StatusCode::CONFLICT,
            AppError::AlreadyCancelled { .. } => StatusCode::CONFLICT,
            AppError::Transient(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            AppError::InvalidInput(_) => "INVALID_INPUT",
            AppError::Unauthenticated(_) => "UNAUTHENTICATED",
            AppError::Forbidden(_) => "FORBIDDEN",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::AlreadyCheckedIn { .. } => "ALREADY_CHECKED_IN",
            AppError::AlreadyCancelled { .. } => "ALREADY_CANCELLED",
            AppError::Transient(_) => "TRANSIENT",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Safe to retry the whole operation.
    pub fn is_retryable(&self) -> bool {
        matches!(self, AppError::Transient(_))
    }

    fn log(&self) {
        match self {
            AppError::Transient(e) => {
                error!(error = ?e, "Ticket store unavailable");
            }
            AppError::Internal(msg) => {
                error!(error = ?self, message = %msg, "Internal error");
            }
            _ => {
                warn!(code = self.code(), message = %self, "Request refused");
            }
        }
    }

    fn details(&self) -> Option<serde_json::Value> {
        match self {
            AppError::AlreadyCheckedIn {
                ticket_id,
                checked_in_at,
            } => Some(json!({
                "ticket_id": ticket_id,
                "checked_in_at": checked_in_at,
            })),
            AppError::AlreadyCancelled { ticket_id } => Some(json!({ "ticket_id": ticket_id })),
            _ => None,
        }
    }
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        if e.is_transient() {
            AppError::Transient(e)
        } else {
            AppError::Internal(e.to_string())
        }
    }
}

// Malformed requests are the caller's fault, whatever axum would answer.
impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::InvalidInput(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::InvalidInput(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::InvalidInput(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.code();

        // Log internal details
        self.log();

        // Store failures only ever surface as a generic message
        let public_message = match &self {
            AppError::Transient(_) => {
                "The ticket store is temporarily unavailable, please retry".to_string()
            }
            AppError::Internal(_) => "An internal error occurred".to_string(),
            other => other.to_string(),
        };

        error_response(code, public_message, self.details(), status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_errors_split_into_transient_and_internal() {
        let transient = AppError::from(StoreError::Unavailable("pool timed out".into()));
        assert!(transient.is_retryable());
        assert_eq!(transient.status_code(), StatusCode::SERVICE_UNAVAILABLE);

        let internal = AppError::from(StoreError::Backend("bad row".into()));
        assert!(!internal.is_retryable());
        assert_eq!(internal.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_already_checked_in_carries_timestamp() {
        let at = Utc::now();
        let err = AppError::AlreadyCheckedIn {
            ticket_id: Uuid::new_v4(),
            checked_in_at: at,
        };

        assert_eq!(err.status_code(), StatusCode::CONFLICT);
        assert!(err.to_string().contains(&at.to_string()));
        let details = err.details().unwrap();
        assert!(details.get("checked_in_at").is_some());
    }

    #[test]
    fn test_internal_message_not_exposed() {
        let response = AppError::Internal("connection string leaked".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
