//! Thread-safe in-memory ticket store.
//!
//! All tables sit behind one `RwLock`, so the conditional status update runs
//! entirely under the write guard and is atomic with respect to every other
//! reader and writer.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::{StoreError, StoreResult, TicketStore};
use crate::models::sales::PurchaseWindow;
use crate::models::{Event, Ticket, TicketStatus, TicketWithEvent};

#[derive(Default)]
struct Tables {
    events: HashMap<Uuid, Event>,
    tickets: HashMap<Uuid, Ticket>,
    // ticket code -> ticket id
    codes: HashMap<String, Uuid>,
    // Fault injection
    offline: bool,
    failing_events: HashSet<Uuid>,
}

impl Tables {
    fn joined(&self, ticket: &Ticket) -> StoreResult<TicketWithEvent> {
        let event = self.events.get(&ticket.event_id).ok_or_else(|| {
            StoreError::Backend(format!("ticket {} references missing event", ticket.id))
        })?;

        Ok(TicketWithEvent {
            ticket: ticket.clone(),
            organizer_id: event.organizer_id,
            event_title: event.title.clone(),
            event_start_date: event.start_date,
        })
    }

    fn ensure_online(&self) -> StoreResult<()> {
        if self.offline {
            return Err(StoreError::Unavailable("in-memory store is offline".into()));
        }
        Ok(())
    }
}

#[derive(Clone, Default)]
pub struct InMemoryTicketStore {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryTicketStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> StoreResult<RwLockReadGuard<'_, Tables>> {
        let tables = self
            .tables
            .read()
            .map_err(|_| StoreError::Backend("ticket table lock poisoned".into()))?;
        tables.ensure_online()?;
        Ok(tables)
    }

    fn write(&self) -> StoreResult<RwLockWriteGuard<'_, Tables>> {
        let tables = self
            .tables
            .write()
            .map_err(|_| StoreError::Backend("ticket table lock poisoned".into()))?;
        tables.ensure_online()?;
        Ok(tables)
    }

    fn admin(&self) -> StoreResult<RwLockWriteGuard<'_, Tables>> {
        self.tables
            .write()
            .map_err(|_| StoreError::Backend("ticket table lock poisoned".into()))
    }

    pub fn insert_event(&self, event: Event) -> StoreResult<()> {
        let mut tables = self.write()?;
        tables.events.insert(event.id, event);
        Ok(())
    }

    /// Records an issued ticket. Rejects duplicate codes, unknown events and
    /// rows whose status and check-in stamp disagree.
    pub fn insert_ticket(&self, ticket: Ticket) -> StoreResult<()> {
        let mut tables = self.write()?;

        if !tables.events.contains_key(&ticket.event_id) {
            return Err(StoreError::Backend(format!(
                "event {} does not exist",
                ticket.event_id
            )));
        }
        if tables.codes.contains_key(&ticket.code) {
            return Err(StoreError::Backend("ticket code already issued".into()));
        }
        if (ticket.status == TicketStatus::CheckedIn) != ticket.checked_in_at.is_some() {
            return Err(StoreError::Backend(format!(
                "ticket {} has status/checked_in_at out of sync",
                ticket.id
            )));
        }

        tables.codes.insert(ticket.code.clone(), ticket.id);
        tables.tickets.insert(ticket.id, ticket);
        Ok(())
    }

    /// Every call fails with [`StoreError::Unavailable`] while offline.
    pub fn set_offline(&self, offline: bool) -> StoreResult<()> {
        self.admin()?.offline = offline;
        Ok(())
    }

    /// Ticket listings for `event_id` fail with [`StoreError::Unavailable`].
    pub fn fail_ticket_reads_for(&self, event_id: Uuid) -> StoreResult<()> {
        self.admin()?.failing_events.insert(event_id);
        Ok(())
    }
}

#[async_trait]
impl TicketStore for InMemoryTicketStore {
    async fn find_ticket_by_code(&self, code: &str) -> StoreResult<Option<TicketWithEvent>> {
        let tables = self.read()?;

        let Some(ticket) = tables.codes.get(code).and_then(|id| tables.tickets.get(id)) else {
            return Ok(None);
        };
        tables.joined(ticket).map(Some)
    }

    async fn find_ticket_by_id(&self, ticket_id: Uuid) -> StoreResult<Option<TicketWithEvent>> {
        let tables = self.read()?;

        match tables.tickets.get(&ticket_id) {
            Some(ticket) => tables.joined(ticket).map(Some),
            None => Ok(None),
        }
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

        let mut tables = self.write()?;
        let Some(ticket) = tables.tickets.get_mut(&ticket_id) else {
            return Ok(false);
        };
        if ticket.status != expected {
            return Ok(false);
        }

        ticket.status = new;
        if new == TicketStatus::CheckedIn {
            ticket.checked_in_at = Some(at);
        }
        Ok(true)
    }

    async fn list_tickets_by_event(
        &self,
        event_id: Uuid,
        status: Option<TicketStatus>,
    ) -> StoreResult<Vec<Ticket>> {
        let tables = self.read()?;
        if tables.failing_events.contains(&event_id) {
            return Err(StoreError::Unavailable(format!(
                "ticket reads for event {event_id} are failing"
            )));
        }

        let mut tickets: Vec<Ticket> = tables
            .tickets
            .values()
            .filter(|t| t.event_id == event_id)
            .filter(|t| status.map_or(true, |s| t.status == s))
            .cloned()
            .collect();
        tickets.sort_by_key(|t| (t.purchased_at, t.id));
        Ok(tickets)
    }

    async fn list_tickets_by_organizer(
        &self,
        organizer_id: Uuid,
        window: Option<PurchaseWindow>,
    ) -> StoreResult<Vec<Ticket>> {
        let tables = self.read()?;

        let mut tickets: Vec<Ticket> = tables
            .tickets
            .values()
            .filter(|t| {
                tables
                    .events
                    .get(&t.event_id)
                    .is_some_and(|e| e.is_owned_by(organizer_id))
            })
            .filter(|t| window.map_or(true, |w| w.contains(t.purchased_at.date_naive())))
            .cloned()
            .collect();
        tickets.sort_by_key(|t| (t.purchased_at, t.id));
        Ok(tickets)
    }

    async fn get_event(&self, event_id: Uuid) -> StoreResult<Option<Event>> {
        Ok(self.read()?.events.get(&event_id).cloned())
    }

    async fn list_events_by_organizer(&self, organizer_id: Uuid) -> StoreResult<Vec<Event>> {
        let tables = self.read()?;

        let mut events: Vec<Event> = tables
            .events
            .values()
            .filter(|e| e.is_owned_by(organizer_id))
            .cloned()
            .collect();
        events.sort_by(|a, b| b.start_date.cmp(&a.start_date).then(a.id.cmp(&b.id)));
        Ok(events)
    }
}
