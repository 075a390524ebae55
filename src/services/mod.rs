//! Ticket lifecycle and sales analytics.
//!
//! [`ScannerService`] is the only writer of ticket status. [`SalesService`]
//! and [`DashboardService`] are pure readers over the same store.

use rust_decimal::{Decimal, RoundingStrategy};
use uuid::Uuid;

use crate::models::{Event, Ticket};
use crate::store::TicketStore;
use crate::utils::{AppError, AppResult};

pub mod dashboard;
pub mod sales;
pub mod scanner;

pub use dashboard::DashboardService;
pub use sales::SalesService;
pub use scanner::ScannerService;

/// Loads `event_id` and checks that `organizer_id` owns it.
pub(crate) async fn owned_event(
    store: &dyn TicketStore,
    event_id: Uuid,
    organizer_id: Uuid,
) -> AppResult<Event> {
    let event = store
        .get_event(event_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Event {event_id} not found")))?;

    if !event.is_owned_by(organizer_id) {
        return Err(AppError::Forbidden(
            "Not authorized to access this event".to_string(),
        ));
    }

    Ok(event)
}

/// Ticket count and revenue over sold (non-cancelled) tickets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct Tally {
    pub tickets: u64,
    pub revenue: Decimal,
}

impl Tally {
    pub fn of<'a>(tickets: impl IntoIterator<Item = &'a Ticket>) -> Self {
        let mut tally = Self::default();
        for ticket in tickets {
            tally.record(ticket);
        }
        tally
    }

    pub fn record(&mut self, ticket: &Ticket) {
        if ticket.status.is_sold() {
            self.tickets += 1;
            self.revenue += ticket.price;
        }
    }

    pub fn average_price(&self) -> Decimal {
        per(self.revenue, self.tickets)
    }
}

/// `numerator / denominator` to two decimals, `0` for an empty denominator.
pub(crate) fn per(numerator: Decimal, denominator: u64) -> Decimal {
    if denominator == 0 {
        return Decimal::ZERO;
    }
    round_2dp(numerator / Decimal::from(denominator))
}

pub(crate) fn round_2dp(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

#[cfg(test)]
pub(crate) mod fixtures {
    use std::sync::Arc;

    use chrono::{DateTime, Duration, TimeZone, Utc};
    use rust_decimal::Decimal;
    use uuid::Uuid;

    use crate::models::{Event, Ticket, TicketStatus};
    use crate::store::InMemoryTicketStore;
    use crate::utils::FixedClock;

    pub fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap()
    }

    pub fn price(cents: i64) -> Decimal {
        Decimal::new(cents, 2)
    }

    pub struct Fixture {
        pub store: Arc<InMemoryTicketStore>,
        pub clock: Arc<FixedClock>,
        pub organizer_id: Uuid,
        seq: std::cell::Cell<u32>,
    }

    impl Fixture {
        pub fn new() -> Self {
            Self {
                store: Arc::new(InMemoryTicketStore::new()),
                clock: Arc::new(FixedClock::new(now())),
                organizer_id: Uuid::new_v4(),
                seq: std::cell::Cell::new(0),
            }
        }

        pub fn event(&self, title: &str, starts_in_days: i64, capacity: Option<i32>) -> Event {
            self.event_for(self.organizer_id, title, starts_in_days, capacity)
        }

        pub fn event_for(
            &self,
            organizer_id: Uuid,
            title: &str,
            starts_in_days: i64,
            capacity: Option<i32>,
        ) -> Event {
            let start = now() + Duration::days(starts_in_days);
            let event = Event {
                id: Uuid::new_v4(),
                organizer_id,
                title: title.to_string(),
                start_date: start,
                end_date: start + Duration::hours(3),
                capacity,
            };
            self.store.insert_event(event.clone()).unwrap();
            event
        }

        pub fn ticket(&self, event: &Event, cents: i64, purchased_at: DateTime<Utc>) -> Ticket {
            let n = self.seq.get() + 1;
            self.seq.set(n);
            self.ticket_with(event, &format!("CODE{n:04}"), cents, purchased_at, |_| {})
        }

        pub fn ticket_with(
            &self,
            event: &Event,
            code: &str,
            cents: i64,
            purchased_at: DateTime<Utc>,
            tweak: impl FnOnce(&mut Ticket),
        ) -> Ticket {
            let mut ticket = Ticket {
                id: Uuid::new_v4(),
                event_id: event.id,
                code: code.to_string(),
                status: TicketStatus::Active,
                price: price(cents),
                attendee_email: Some(format!("{}@example.com", code.to_lowercase())),
                attendee_name: Some(format!("Guest {code}")),
                purchased_at,
                checked_in_at: None,
            };
            tweak(&mut ticket);
            self.store.insert_ticket(ticket.clone()).unwrap();
            ticket
        }

        pub fn cancelled(&self, event: &Event, cents: i64, purchased_at: DateTime<Utc>) -> Ticket {
            let n = self.seq.get() + 1;
            self.seq.set(n);
            self.ticket_with(event, &format!("VOID{n:04}"), cents, purchased_at, |t| {
                t.status = TicketStatus::Cancelled;
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::{now, price, Fixture};
    use super::*;

    #[test]
    fn test_tally_skips_cancelled_tickets() {
        let fx = Fixture::new();
        let event = fx.event("Gala", 3, None);
        let a = fx.ticket(&event, 2500, now());
        let b = fx.ticket(&event, 1000, now());
        let void = fx.cancelled(&event, 9900, now());

        let tally = Tally::of([&a, &b, &void]);
        assert_eq!(tally.tickets, 2);
        assert_eq!(tally.revenue, price(3500));
        assert_eq!(tally.average_price(), price(1750));
    }

    #[test]
    fn test_per_rounds_and_handles_zero() {
        assert_eq!(per(Decimal::from(10), 3), price(333));
        assert_eq!(per(Decimal::from(2), 3), price(67));
        assert_eq!(per(Decimal::from(10), 0), Decimal::ZERO);
    }

    #[tokio::test]
    async fn test_owned_event_checks_owner() {
        let fx = Fixture::new();
        let event = fx.event("Gala", 3, None);

        assert!(owned_event(fx.store.as_ref(), event.id, fx.organizer_id)
            .await
            .is_ok());
        assert!(matches!(
            owned_event(fx.store.as_ref(), event.id, Uuid::new_v4()).await,
            Err(AppError::Forbidden(_))
        ));
        assert!(matches!(
            owned_event(fx.store.as_ref(), Uuid::new_v4(), fx.organizer_id).await,
            Err(AppError::NotFound(_))
        ));
    }
}
