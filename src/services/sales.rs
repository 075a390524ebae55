use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use chrono::{Datelike, NaiveDate};
use tracing::{instrument, warn};
use uuid::Uuid;

use super::{owned_event, per, Tally};
use crate::models::sales::{
    DailySales, DailySalesQuery, MonthlyRevenue, SalesReport, SalesSummary,
};
use crate::models::{Event, Ticket};
use crate::store::TicketStore;
use crate::utils::{AppError, AppResult};

#[derive(Clone)]
pub struct SalesService {
    store: Arc<dyn TicketStore>,
}

impl SalesService {
    pub fn new(store: Arc<dyn TicketStore>) -> Self {
        Self { store }
    }

    #[instrument(skip(self))]
    pub async fn event_sales_report(
        &self,
        event_id: Uuid,
        organizer_id: Uuid,
    ) -> AppResult<SalesReport> {
        let event = owned_event(self.store.as_ref(), event_id, organizer_id).await?;
        let tickets = self.store.list_tickets_by_event(event_id, None).await?;

        Ok(build_report(event, &tickets))
    }

    /// One report per owned event. Events whose tickets cannot be read are
    /// left out rather than failing the whole listing.
    #[instrument(skip(self))]
    pub async fn all_sales_reports(&self, organizer_id: Uuid) -> AppResult<Vec<SalesReport>> {
        let events = self.store.list_events_by_organizer(organizer_id).await?;

        let mut reports = Vec::with_capacity(events.len());
        for event in events {
            match self.store.list_tickets_by_event(event.id, None).await {
                Ok(tickets) => reports.push(build_report(event, &tickets)),
                Err(e) => {
                    warn!(event_id = %event.id, error = %e, "Skipping event in sales listing");
                }
            }
        }

        Ok(reports)
    }

    /// Per-day ticket counts and revenue, newest day first. Days without a
    /// sale are not emitted.
    #[instrument(skip(self))]
    pub async fn daily_sales(
        &self,
        organizer_id: Uuid,
        query: DailySalesQuery,
    ) -> AppResult<Vec<DailySales>> {
        let window = query.window();
        if window.is_inverted() {
            return Err(AppError::InvalidInput(
                "start_date must not be after end_date".to_string(),
            ));
        }
        if let Some(event_id) = query.event_id {
            owned_event(self.store.as_ref(), event_id, organizer_id).await?;
        }

        let tickets = self
            .store
            .list_tickets_by_organizer(organizer_id, (!window.is_unbounded()).then_some(window))
            .await?;

        let mut days: BTreeMap<NaiveDate, Tally> = BTreeMap::new();
        for ticket in tickets
            .iter()
            .filter(|t| query.event_id.map_or(true, |id| t.event_id == id))
            .filter(|t| t.status.is_sold())
        {
            days.entry(ticket.purchased_at.date_naive())
                .or_default()
                .record(ticket);
        }

        Ok(days
            .into_iter()
            .rev()
            .map(|(sale_date, tally)| DailySales {
                sale_date,
                tickets_sold: tally.tickets,
                revenue: tally.revenue,
            })
            .collect())
    }

    #[instrument(skip(self))]
    pub async fn sales_summary(&self, organizer_id: Uuid) -> AppResult<SalesSummary> {
        let tickets = self
            .store
            .list_tickets_by_organizer(organizer_id, None)
            .await?;

        Ok(summarize(&tickets))
    }

    /// Revenue grouped by purchase month, newest month first.
    #[instrument(skip(self))]
    pub async fn monthly_revenue(&self, organizer_id: Uuid) -> AppResult<Vec<MonthlyRevenue>> {
        let tickets = self
            .store
            .list_tickets_by_organizer(organizer_id, None)
            .await?;

        let mut months: BTreeMap<(i32, u32), Tally> = BTreeMap::new();
        for ticket in tickets.iter().filter(|t| t.status.is_sold()) {
            let date = ticket.purchased_at.date_naive();
            months
                .entry((date.year(), date.month()))
                .or_default()
                .record(ticket);
        }

        Ok(months
            .into_iter()
            .rev()
            .map(|((year, month), tally)| MonthlyRevenue {
                year,
                month,
                revenue: tally.revenue,
                tickets_sold: tally.tickets,
            })
            .collect())
    }
}

pub(crate) fn build_report(event: Event, tickets: &[Ticket]) -> SalesReport {
    let tally = Tally::of(tickets);

    SalesReport {
        event_id: event.id,
        event_title: event.title,
        total_tickets_sold: tally.tickets,
        total_revenue: tally.revenue,
        tickets_available: event
            .capacity
            .map(|capacity| i64::from(capacity) - tally.tickets as i64),
        average_ticket_price: tally.average_price(),
    }
}

pub(crate) fn summarize(tickets: &[Ticket]) -> SalesSummary {
    let tally = Tally::of(tickets);
    let events: HashSet<Uuid> = tickets
        .iter()
        .filter(|t| t.status.is_sold())
        .map(|t| t.event_id)
        .collect();
    let total_events = events.len() as u64;

    SalesSummary {
        total_tickets_sold: tally.tickets,
        total_revenue: tally.revenue,
        total_events,
        average_tickets_per_event: per(tally.tickets.into(), total_events),
        average_revenue_per_event: per(tally.revenue, total_events),
    }
}
