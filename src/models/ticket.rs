use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Lifecycle state of a ticket.
///
/// `Active` is the only state a ticket can leave. `CheckedIn` and `Cancelled`
/// are terminal for mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TicketStatus {
    Active,
    CheckedIn,
    Cancelled,
}

impl TicketStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TicketStatus::Active => "active",
            TicketStatus::CheckedIn => "checked_in",
            TicketStatus::Cancelled => "cancelled",
        }
    }

    /// Whether `self -> next` is an edge of the lifecycle graph.
    pub fn can_transition_to(&self, next: TicketStatus) -> bool {
        matches!(
            (self, next),
            (TicketStatus::Active, TicketStatus::CheckedIn)
                | (TicketStatus::Active, TicketStatus::Cancelled)
        )
    }

    /// Counted towards sales and revenue.
    pub fn is_sold(&self) -> bool {
        !matches!(self, TicketStatus::Cancelled)
    }
}

impl fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum InvalidTicketRow {
    #[error("unknown ticket status '{0}'")]
    UnknownStatus(String),

    #[error("ticket {0} has status/checked_in_at out of sync")]
    CheckInMismatch(Uuid),
}

impl FromStr for TicketStatus {
    type Err = InvalidTicketRow;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(TicketStatus::Active),
            "checked_in" => Ok(TicketStatus::CheckedIn),
            "cancelled" => Ok(TicketStatus::Cancelled),
            other => Err(InvalidTicketRow::UnknownStatus(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ticket {
    pub id: Uuid,
    pub event_id: Uuid,
    pub code: String,
    pub status: TicketStatus,
    pub price: Decimal,
    pub attendee_email: Option<String>,
    pub attendee_name: Option<String>,
    pub purchased_at: DateTime<Utc>,
    pub checked_in_at: Option<DateTime<Utc>>,
}

impl Ticket {
    /// Display name for activity feeds and scanner screens.
    pub fn attendee_label(&self) -> &str {
        self.attendee_name
            .as_deref()
            .or(self.attendee_email.as_deref())
            .unwrap_or("Unknown attendee")
    }
}

/// A ticket joined with the event fields the scanner needs.
#[derive(Debug, Clone, PartialEq)]
pub struct TicketWithEvent {
    pub ticket: Ticket,
    pub organizer_id: Uuid,
    pub event_title: String,
    pub event_start_date: DateTime<Utc>,
}

/// Raw `tickets` row. `status` is stored as text.
#[derive(Debug, Clone, FromRow)]
pub struct TicketRow {
    pub id: Uuid,
    pub event_id: Uuid,
    pub ticket_code: String,
    pub status: String,
    pub price: Decimal,
    pub attendee_email: Option<String>,
    pub attendee_name: Option<String>,
    pub purchased_at: DateTime<Utc>,
    pub checked_in_at: Option<DateTime<Utc>>,
}

impl TryFrom<TicketRow> for Ticket {
    type Error = InvalidTicketRow;

    fn try_from(row: TicketRow) -> Result<Self, Self::Error> {
        let status: TicketStatus = row.status.parse()?;
        if (status == TicketStatus::CheckedIn) != row.checked_in_at.is_some() {
            return Err(InvalidTicketRow::CheckInMismatch(row.id));
        }

        Ok(Ticket {
            id: row.id,
            event_id: row.event_id,
            code: row.ticket_code,
            status,
            price: row.price,
            attendee_email: row.attendee_email,
            attendee_name: row.attendee_name,
            purchased_at: row.purchased_at,
            checked_in_at: row.checked_in_at,
        })
    }
}

/// `tickets` row joined with `events`.
#[derive(Debug, Clone, FromRow)]
pub struct TicketWithEventRow {
    #[sqlx(flatten)]
    pub ticket: TicketRow,
    pub organizer_id: Uuid,
    pub event_title: String,
    pub event_start_date: DateTime<Utc>,
}

impl TryFrom<TicketWithEventRow> for TicketWithEvent {
    type Error = InvalidTicketRow;

    fn try_from(row: TicketWithEventRow) -> Result<Self, Self::Error> {
        Ok(TicketWithEvent {
            ticket: row.ticket.try_into()?,
            organizer_id: row.organizer_id,
            event_title: row.event_title,
            event_start_date: row.event_start_date,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trips_through_text() {
        for status in [
            TicketStatus::Active,
            TicketStatus::CheckedIn,
            TicketStatus::Cancelled,
        ] {
            assert_eq!(status.as_str().parse::<TicketStatus>().unwrap(), status);
        }
        assert!("refunded".parse::<TicketStatus>().is_err());
    }

    #[test]
    fn test_only_active_tickets_can_move() {
        use TicketStatus::*;

        assert!(Active.can_transition_to(CheckedIn));
        assert!(Active.can_transition_to(Cancelled));
        for terminal in [CheckedIn, Cancelled] {
            for next in [Active, CheckedIn, Cancelled] {
                assert!(!terminal.can_transition_to(next));
            }
        }
        assert!(!Active.can_transition_to(Active));
    }

    #[test]
    fn test_row_conversion_rejects_checked_in_without_timestamp() {
        let row = TicketRow {
            id: Uuid::new_v4(),
            event_id: Uuid::new_v4(),
            ticket_code: "ABC123".to_string(),
            status: "checked_in".to_string(),
            price: Decimal::new(2500, 2),
            attendee_email: None,
            attendee_name: None,
            purchased_at: Utc::now(),
            checked_in_at: None,
        };

        assert!(matches!(
            Ticket::try_from(row),
            Err(InvalidTicketRow::CheckInMismatch(_))
        ));
    }

    #[test]
    fn test_status_serializes_snake_case() {
        let json = serde_json::to_string(&TicketStatus::CheckedIn).unwrap();
        assert_eq!(json, "\"checked_in\"");
    }
}
