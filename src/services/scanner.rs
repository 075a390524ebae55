//! Ticket lifecycle: check-in, validation and cancellation.
//!
//! ```text
//! Active --check-in--> CheckedIn
//! Active --cancel----> Cancelled
//! ```
//!
//! Every mutation goes through [`TicketStore::conditional_set_status`], so two
//! concurrent scans of one code can never both succeed.

use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::{owned_event, per};
use crate::models::scanner::{
    CancelReceipt, CheckInReceipt, ScannerStats, ValidationResult, MAX_TICKET_CODE_LEN,
};
use crate::models::{Ticket, TicketStatus, TicketWithEvent};
use crate::store::TicketStore;
use crate::utils::{AppError, AppResult, Clock};

#[derive(Clone)]
pub struct ScannerService {
    store: Arc<dyn TicketStore>,
    clock: Arc<dyn Clock>,
}

impl ScannerService {
    pub fn new(store: Arc<dyn TicketStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    #[instrument(skip(self, code))]
    pub async fn check_in(&self, code: &str, organizer_id: Uuid) -> AppResult<CheckInReceipt> {
        let code = normalize_code(code)?;
        let found = self
            .store
            .find_ticket_by_code(code)
            .await?
            .ok_or_else(|| AppError::NotFound("Invalid ticket code".to_string()))?;

        authorize(&found, organizer_id)?;
        refuse_unless_active(&found.ticket)?;

        let now = self.clock.now();
        if !self.store.conditional_set_checked_in(found.ticket.id, now).await? {
            // Someone else moved the ticket between our read and the swap.
            return Err(self.explain_lost_swap(found.ticket.id).await);
        }

        info!(ticket_id = %found.ticket.id, "Ticket checked in");
        Ok(CheckInReceipt {
            ticket_id: found.ticket.id,
            attendee_name: found.ticket.attendee_name,
            attendee_email: found.ticket.attendee_email,
            event_title: found.event_title,
            checked_in_at: now,
        })
    }

    /// Read-only counterpart of [`check_in`](Self::check_in). Unknown codes
    /// and foreign organizers come back as verdicts, not errors.
    #[instrument(skip(self, code))]
    pub async fn validate(&self, code: &str, organizer_id: Uuid) -> AppResult<ValidationResult> {
        let code = normalize_code(code)?;
        let Some(found) = self.store.find_ticket_by_code(code).await? else {
            return Ok(ValidationResult::not_found());
        };

        if found.organizer_id != organizer_id {
            warn!(ticket_id = %found.ticket.id, "Validation by foreign organizer");
            return Ok(ValidationResult::forbidden(found.ticket.id));
        }

        Ok(ValidationResult::for_ticket(&found))
    }

    /// Checked-in tickets of an event, most recent check-in first.
    #[instrument(skip(self))]
    pub async fn list_check_ins(&self, event_id: Uuid, organizer_id: Uuid) -> AppResult<Vec<Ticket>> {
        owned_event(self.store.as_ref(), event_id, organizer_id).await?;

        let mut tickets = self
            .store
            .list_tickets_by_event(event_id, Some(TicketStatus::CheckedIn))
            .await?;
        tickets.sort_by(|a, b| {
            b.checked_in_at
                .cmp(&a.checked_in_at)
                .then_with(|| a.id.cmp(&b.id))
        });

        Ok(tickets)
    }

    #[instrument(skip(self))]
    pub async fn cancel(&self, ticket_id: Uuid, organizer_id: Uuid) -> AppResult<CancelReceipt> {
        let found = self
            .store
            .find_ticket_by_id(ticket_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Ticket {ticket_id} not found")))?;

        authorize(&found, organizer_id)?;
        refuse_unless_active(&found.ticket)?;

        let now = self.clock.now();
        let applied = self
            .store
            .conditional_set_status(ticket_id, TicketStatus::Active, TicketStatus::Cancelled, now)
            .await?;
        if !applied {
            return Err(self.explain_lost_swap(ticket_id).await);
        }

        info!(%ticket_id, "Ticket cancelled");
        Ok(CancelReceipt {
            ticket_id,
            cancelled_at: now,
        })
    }

    #[instrument(skip(self))]
    pub async fn scanner_stats(&self, event_id: Uuid, organizer_id: Uuid) -> AppResult<ScannerStats> {
        let event = owned_event(self.store.as_ref(), event_id, organizer_id).await?;
        let tickets = self.store.list_tickets_by_event(event_id, None).await?;

        let count = |status: TicketStatus| tickets.iter().filter(|t| t.status == status).count() as u64;
        let checked_in = count(TicketStatus::CheckedIn);
        let pending = count(TicketStatus::Active);
        let cancelled = count(TicketStatus::Cancelled);
        let total_tickets = checked_in + pending;

        Ok(ScannerStats {
            event_id,
            event_title: event.title,
            total_tickets,
            checked_in,
            pending,
            cancelled,
            check_in_percentage: per(Decimal::from(checked_in * 100), total_tickets),
        })
    }

    /// Re-reads a ticket whose conditional update did not apply and reports
    /// the state that beat us.
    async fn explain_lost_swap(&self, ticket_id: Uuid) -> AppError {
        let current = match self.store.find_ticket_by_id(ticket_id).await {
            Ok(Some(current)) => current,
            Ok(None) => return AppError::NotFound(format!("Ticket {ticket_id} not found")),
            Err(e) => return e.into(),
        };

        match refuse_unless_active(&current.ticket) {
            Err(e) => e,
            Ok(()) => AppError::Internal(format!(
                "conditional update on active ticket {ticket_id} did not apply"
            )),
        }
    }
}

fn normalize_code(code: &str) -> AppResult<&str> {
    let code = code.trim();
    if code.is_empty() {
        return Err(AppError::InvalidInput("Ticket code is required".to_string()));
    }
    if code.chars().count() > MAX_TICKET_CODE_LEN {
        return Err(AppError::InvalidInput(format!(
            "Ticket code must be at most {MAX_TICKET_CODE_LEN} characters"
        )));
    }
    Ok(code)
}

fn authorize(found: &TicketWithEvent, organizer_id: Uuid) -> AppResult<()> {
    if found.organizer_id != organizer_id {
        warn!(ticket_id = %found.ticket.id, "Lifecycle operation by foreign organizer");
        return Err(AppError::Forbidden(
            "Not authorized to manage this ticket".to_string(),
        ));
    }
    Ok(())
}

fn refuse_unless_active(ticket: &Ticket) -> AppResult<()> {
    let refusal = match (ticket.status, ticket.checked_in_at) {
        (TicketStatus::Active, _) => return Ok(()),
        (TicketStatus::Cancelled, _) => AppError::AlreadyCancelled {
            ticket_id: ticket.id,
        },
        (TicketStatus::CheckedIn, Some(checked_in_at)) => AppError::AlreadyCheckedIn {
            ticket_id: ticket.id,
            checked_in_at,
        },
        (TicketStatus::CheckedIn, None) => {
            return Err(AppError::Internal(format!(
                "ticket {} is checked in without a timestamp",
                ticket.id
            )))
        }
    };

    warn!(ticket_id = %ticket.id, status = %ticket.status, "Transition refused");
    Err(refusal)
}
