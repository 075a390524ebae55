//! Data-access contract the engine runs against.
//!
//! The engine never talks to a database directly. Everything it needs is
//! expressed by [`TicketStore`]; [`PgTicketStore`] backs it with PostgreSQL and
//! [`InMemoryTicketStore`] with process memory.
//!
//! The one method with a hard consistency requirement is
//! [`TicketStore::conditional_set_status`]: it must apply the transition only
//! if the stored status still equals `expected`, as a single indivisible step.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::models::sales::PurchaseWindow;
use crate::models::ticket::InvalidTicketRow;
use crate::models::{Event, Ticket, TicketStatus, TicketWithEvent};

pub mod memory;
pub mod postgres;

pub use memory::InMemoryTicketStore;
pub use postgres::PgTicketStore;

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum StoreError {
    /// The backend could not be reached. Retrying may succeed.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("store error: {0}")]
    Backend(String),
}

impl StoreError {
    pub fn is_transient(&self) -> bool {
        matches!(self, StoreError::Unavailable(_))
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        match &e {
            sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::WorkerCrashed => StoreError::Unavailable(e.to_string()),
            sqlx::Error::Database(db) if db.code().is_some_and(|c| is_transient_sqlstate(&c)) => {
                StoreError::Unavailable(e.to_string())
            }
            _ => StoreError::Backend(e.to_string()),
        }
    }
}

/// Connection exceptions (class 08), serialization failures and deadlocks.
fn is_transient_sqlstate(code: &str) -> bool {
    code.starts_with("08") || code == "40001" || code == "40P01"
}

impl From<InvalidTicketRow> for StoreError {
    fn from(e: InvalidTicketRow) -> Self {
        StoreError::Backend(e.to_string())
    }
}

#[async_trait]
pub trait TicketStore: Send + Sync {
    /// Ticket by its check-in code, joined with its event's owner and title.
    async fn find_ticket_by_code(&self, code: &str) -> StoreResult<Option<TicketWithEvent>>;

    async fn find_ticket_by_id(&self, ticket_id: Uuid) -> StoreResult<Option<TicketWithEvent>>;

    /// Atomically moves `ticket_id` from `expected` to `new`.
    ///
    /// Returns `false` when the stored status was not `expected` (or the
    /// ticket is gone), in which case nothing was written. `checked_in_at` is
    /// stamped with `at` only when `new` is [`TicketStatus::CheckedIn`].
    async fn conditional_set_status(
        &self,
        ticket_id: Uuid,
        expected: TicketStatus,
        new: TicketStatus,
        at: DateTime<Utc>,
    ) -> StoreResult<bool>;

    async fn list_tickets_by_event(
        &self,
        event_id: Uuid,
        status: Option<TicketStatus>,
    ) -> StoreResult<Vec<Ticket>>;

    /// Every ticket of every event owned by `organizer_id`, optionally limited
    /// to purchases whose UTC date falls in `window`.
    async fn list_tickets_by_organizer(
        &self,
        organizer_id: Uuid,
        window: Option<PurchaseWindow>,
    ) -> StoreResult<Vec<Ticket>>;

    async fn get_event(&self, event_id: Uuid) -> StoreResult<Option<Event>>;

    async fn list_events_by_organizer(&self, organizer_id: Uuid) -> StoreResult<Vec<Event>>;

    async fn conditional_set_checked_in(
        &self,
        ticket_id: Uuid,
        at: DateTime<Utc>,
    ) -> StoreResult<bool> {
        self.conditional_set_status(ticket_id, TicketStatus::Active, TicketStatus::CheckedIn, at)
            .await
    }
}
