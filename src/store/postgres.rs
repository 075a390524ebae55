use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

use super::{StoreResult, TicketStore};
use crate::models::sales::PurchaseWindow;
use crate::models::ticket::{TicketRow, TicketWithEventRow};
use crate::models::{Event, Ticket, TicketStatus, TicketWithEvent};

macro_rules! select_ticket_with_event {
    ($predicate:literal) => {
        concat!(
            r#"
            SELECT t.id, t.event_id, t.ticket_code, t.status, t.price,
                   t.attendee_email, t.attendee_name, t.purchased_at, t.checked_in_at,
                   e.organizer_id, e.title AS event_title, e.start_date AS event_start_date
            FROM tickets t
            JOIN events e ON e.id = t.event_id
            WHERE "#,
            $predicate
        )
    };
}

const FIND_TICKET_BY_CODE: &str = select_ticket_with_event!("t.ticket_code = $1");
const FIND_TICKET_BY_ID: &str = select_ticket_with_event!("t.id = $1");

/// The predicate on `status` makes the update a compare-and-swap: two
/// concurrent callers cannot both match the same `expected` row.
const CONDITIONAL_SET_STATUS: &str = r#"
    UPDATE tickets
    SET status = $3,
        checked_in_at = COALESCE($4, checked_in_at)
    WHERE id = $1 AND status = $2
"#;

const LIST_TICKETS_BY_EVENT: &str = r#"
    SELECT id, event_id, ticket_code, status, price,
           attendee_email, attendee_name, purchased_at, checked_in_at
    FROM tickets
    WHERE event_id = $1
      AND ($2::text IS NULL OR status = $2)
    ORDER BY purchased_at, id
"#;

const LIST_TICKETS_BY_ORGANIZER: &str = r#"
    SELECT t.id, t.event_id, t.ticket_code, t.status, t.price,
           t.attendee_email, t.attendee_name, t.purchased_at, t.checked_in_at
    FROM tickets t
    JOIN events e ON e.id = t.event_id
    WHERE e.organizer_id = $1
      AND ($2::date IS NULL OR (t.purchased_at AT TIME ZONE 'UTC')::date >= $2)
      AND ($3::date IS NULL OR (t.purchased_at AT TIME ZONE 'UTC')::date <= $3)
    ORDER BY t.purchased_at, t.id
"#;

const SELECT_EVENT: &str = r#"
    SELECT id, organizer_id, title, start_date, end_date, capacity
    FROM events
"#;

#[derive(Clone)]
pub struct PgTicketStore {
    pool: PgPool,
}

impl PgTicketStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn into_tickets(rows: Vec<TicketRow>) -> StoreResult<Vec<Ticket>> {
    Ok(rows
        .into_iter()
        .map(Ticket::try_from)
        .collect::<Result<Vec<_>, _>>()?)
}

#[async_trait]
impl TicketStore for PgTicketStore {
    async fn find_ticket_by_code(&self, code: &str) -> StoreResult<Option<TicketWithEvent>> {
        let row = sqlx::query_as::<_, TicketWithEventRow>(FIND_TICKET_BY_CODE)
            .bind(code)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(TicketWithEvent::try_from).transpose()?)
    }

    async fn find_ticket_by_id(&self, ticket_id: Uuid) -> StoreResult<Option<TicketWithEvent>> {
        let row = sqlx::query_as::<_, TicketWithEventRow>(FIND_TICKET_BY_ID)
            .bind(ticket_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(TicketWithEvent::try_from).transpose()?)
    }

    async fn conditional_set_status(
        &self,
        ticket_id: Uuid,
        expected: TicketStatus,
        new: TicketStatus,
        at: DateTime<Utc>,
    ) -> StoreResult<bool> {
        if !expected.can_transition_to(new) {
            return Ok(false);
        }

        let checked_in_at = (new == TicketStatus::CheckedIn).then_some(at);
        let result = sqlx::query(CONDITIONAL_SET_STATUS)
            .bind(ticket_id)
            .bind(expected.as_str())
            .bind(new.as_str())
            .bind(checked_in_at)
            .execute(&self.pool)
            .await?;

        let applied = result.rows_affected() == 1;
        debug!(%ticket_id, from = %expected, to = %new, applied, "Conditional status update");
        Ok(applied)
    }

    async fn list_tickets_by_event(
        &self,
        event_id: Uuid,
        status: Option<TicketStatus>,
    ) -> StoreResult<Vec<Ticket>> {
        let rows = sqlx::query_as::<_, TicketRow>(LIST_TICKETS_BY_EVENT)
            .bind(event_id)
            .bind(status.map(|s| s.as_str()))
            .fetch_all(&self.pool)
            .await?;

        into_tickets(rows)
    }

    async fn list_tickets_by_organizer(
        &self,
        organizer_id: Uuid,
        window: Option<PurchaseWindow>,
    ) -> StoreResult<Vec<Ticket>> {
        let window = window.unwrap_or_default();
        let rows = sqlx::query_as::<_, TicketRow>(LIST_TICKETS_BY_ORGANIZER)
            .bind(organizer_id)
            .bind(window.start_date)
            .bind(window.end_date)
            .fetch_all(&self.pool)
            .await?;

        into_tickets(rows)
    }

    async fn get_event(&self, event_id: Uuid) -> StoreResult<Option<Event>> {
        let sql = format!("{SELECT_EVENT} WHERE id = $1");
        let event = sqlx::query_as::<_, Event>(&sql)
            .bind(event_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(event)
    }

    async fn list_events_by_organizer(&self, organizer_id: Uuid) -> StoreResult<Vec<Event>> {
        let sql = format!("{SELECT_EVENT} WHERE organizer_id = $1 ORDER BY start_date DESC, id");
        let events = sqlx::query_as::<_, Event>(&sql)
            .bind(organizer_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(events)
    }
}
