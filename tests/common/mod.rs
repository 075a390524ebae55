#![allow(dead_code)]

use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use ticket_engine::models::{Event, Ticket, TicketStatus};
use ticket_engine::store::InMemoryTicketStore;
use ticket_engine::utils::FixedClock;

pub fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap()
}

pub struct World {
    pub store: Arc<InMemoryTicketStore>,
    pub clock: Arc<FixedClock>,
    pub organizer_id: Uuid,
}

impl World {
    pub fn new() -> Self {
        Self {
            store: Arc::new(InMemoryTicketStore::new()),
            clock: Arc::new(FixedClock::new(now())),
            organizer_id: Uuid::new_v4(),
        }
    }

    pub fn event(&self, title: &str, capacity: Option<i32>) -> Event {
        let start = now() + Duration::days(14);
        let event = Event {
            id: Uuid::new_v4(),
            organizer_id: self.organizer_id,
            title: title.to_string(),
            start_date: start,
            end_date: start + Duration::hours(5),
            capacity,
        };
        self.store.insert_event(event.clone()).unwrap();
        event
    }

    pub fn ticket(
        &self,
        event: &Event,
        code: &str,
        price_cents: i64,
        purchased_at: DateTime<Utc>,
        status: TicketStatus,
    ) -> Ticket {
        let ticket = Ticket {
            id: Uuid::new_v4(),
            event_id: event.id,
            code: code.to_string(),
            status,
            price: Decimal::new(price_cents, 2),
            attendee_email: Some(format!("{}@example.com", code.to_lowercase())),
            attendee_name: None,
            purchased_at,
            checked_in_at: (status == TicketStatus::CheckedIn).then_some(purchased_at),
        };
        self.store.insert_ticket(ticket.clone()).unwrap();
        ticket
    }
}
