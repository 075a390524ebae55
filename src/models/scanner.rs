use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::ticket::{TicketStatus, TicketWithEvent};

/// Upper bound on accepted ticket code length.
pub const MAX_TICKET_CODE_LEN: usize = 100;

#[derive(Debug, Clone, Deserialize)]
pub struct TicketCodeRequest {
    pub ticket_code: String,
}

/// Payload of a successful check-in.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckInReceipt {
    pub ticket_id: Uuid,
    pub attendee_name: Option<String>,
    pub attendee_email: Option<String>,
    pub event_title: String,
    pub checked_in_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CancelReceipt {
    pub ticket_id: Uuid,
    pub cancelled_at: DateTime<Utc>,
}

/// Outcome of a read-only ticket validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ValidationVerdict {
    Valid,
    AlreadyCheckedIn { checked_in_at: DateTime<Utc> },
    Cancelled,
    NotFound,
    Forbidden,
}

impl ValidationVerdict {
    pub fn message(&self) -> &'static str {
        match self {
            ValidationVerdict::Valid => "Ticket is valid",
            ValidationVerdict::AlreadyCheckedIn { .. } => "Already checked in",
            ValidationVerdict::Cancelled => "Ticket has been cancelled",
            ValidationVerdict::NotFound => "Invalid ticket code",
            ValidationVerdict::Forbidden => "Not authorized for this event",
        }
    }
}

/// Structured validation answer. Authorization and lookup failures are
/// reported here as data rather than raised.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationResult {
    pub valid: bool,
    pub verdict: ValidationVerdict,
    pub message: &'static str,
    pub ticket_id: Option<Uuid>,
    pub status: Option<TicketStatus>,
    pub attendee_name: Option<String>,
    pub attendee_email: Option<String>,
    pub event_title: Option<String>,
    pub event_date: Option<DateTime<Utc>>,
    pub already_checked_in: bool,
    pub checked_in_at: Option<DateTime<Utc>>,
}

impl ValidationResult {
    pub fn not_found() -> Self {
        Self::bare(ValidationVerdict::NotFound, None)
    }

    /// Leaks only the ticket id to a foreign organizer.
    pub fn forbidden(ticket_id: Uuid) -> Self {
        Self::bare(ValidationVerdict::Forbidden, Some(ticket_id))
    }

    pub fn for_ticket(found: &TicketWithEvent) -> Self {
        let ticket = &found.ticket;
        let verdict = match (ticket.status, ticket.checked_in_at) {
            (TicketStatus::Cancelled, _) => ValidationVerdict::Cancelled,
            // Stores reject checked-in rows without a timestamp; never read one as valid.
            (TicketStatus::CheckedIn, at) => ValidationVerdict::AlreadyCheckedIn {
                checked_in_at: at.unwrap_or_default(),
            },
            (TicketStatus::Active, _) => ValidationVerdict::Valid,
        };

        let checked_in_at = match verdict {
            ValidationVerdict::AlreadyCheckedIn { checked_in_at } => Some(checked_in_at),
            _ => None,
        };

        Self {
            valid: !matches!(verdict, ValidationVerdict::Cancelled),
            verdict,
            message: verdict.message(),
            ticket_id: Some(ticket.id),
            status: Some(ticket.status),
            attendee_name: ticket.attendee_name.clone(),
            attendee_email: ticket.attendee_email.clone(),
            event_title: Some(found.event_title.clone()),
            event_date: Some(found.event_start_date),
            already_checked_in: checked_in_at.is_some(),
            checked_in_at,
        }
    }

    fn bare(verdict: ValidationVerdict, ticket_id: Option<Uuid>) -> Self {
        Self {
            valid: false,
            verdict,
            message: verdict.message(),
            ticket_id,
            status: None,
            attendee_name: None,
            attendee_email: None,
            event_title: None,
            event_date: None,
            already_checked_in: false,
            checked_in_at: None,
        }
    }
}

/// Door statistics for one event.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScannerStats {
    pub event_id: Uuid,
    pub event_title: String,
    pub total_tickets: u64,
    pub checked_in: u64,
    pub pending: u64,
    pub cancelled: u64,
    pub check_in_percentage: Decimal,
}
