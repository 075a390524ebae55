use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tracing::{instrument, warn};
use uuid::Uuid;

use super::Tally;
use crate::models::dashboard::{ActivityKind, DashboardStats, RecentActivity, RevenueBreakdownItem};
use crate::store::TicketStore;
use crate::utils::{AppError, AppResult, Clock};

pub const DEFAULT_ACTIVITY_LIMIT: usize = 10;
pub const MAX_ACTIVITY_LIMIT: usize = 100;

#[derive(Clone)]
pub struct DashboardService {
    store: Arc<dyn TicketStore>,
    clock: Arc<dyn Clock>,
    default_activity_limit: usize,
}

impl DashboardService {
    pub fn new(store: Arc<dyn TicketStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            clock,
            default_activity_limit: DEFAULT_ACTIVITY_LIMIT,
        }
    }

    pub fn with_default_activity_limit(mut self, limit: usize) -> Self {
        let clamped = limit.clamp(1, MAX_ACTIVITY_LIMIT);
        if clamped != limit {
            warn!(
                "Config: activity limit {} outside 1..={}, using {}",
                limit, MAX_ACTIVITY_LIMIT, clamped
            );
        }
        self.default_activity_limit = clamped;
        self
    }

    #[instrument(skip(self))]
    pub async fn organizer_stats(&self, organizer_id: Uuid) -> AppResult<DashboardStats> {
        let events = self.store.list_events_by_organizer(organizer_id).await?;
        let tickets = self
            .store
            .list_tickets_by_organizer(organizer_id, None)
            .await?;

        let now = self.clock.now();
        let upcoming = events.iter().filter(|e| e.is_upcoming(now)).count() as u64;
        let total_events = events.len() as u64;
        let tally = Tally::of(&tickets);

        let attendees: HashSet<String> = tickets
            .iter()
            .filter(|t| t.status.is_sold())
            .filter_map(|t| t.attendee_email.as_deref())
            .map(|email| email.trim().to_lowercase())
            .filter(|email| !email.is_empty())
            .collect();

        Ok(DashboardStats {
            total_events,
            upcoming_events: upcoming,
            past_events: total_events - upcoming,
            total_tickets_sold: tally.tickets,
            total_revenue: tally.revenue,
            active_attendees: attendees.len() as u64,
        })
    }

    /// Purchases and check-ins across the organizer's events, newest first.
    #[instrument(skip(self))]
    pub async fn recent_activity(
        &self,
        organizer_id: Uuid,
        limit: Option<usize>,
    ) -> AppResult<Vec<RecentActivity>> {
        let limit = limit.unwrap_or(self.default_activity_limit);
        if !(1..=MAX_ACTIVITY_LIMIT).contains(&limit) {
            return Err(AppError::InvalidInput(format!(
                "limit must be between 1 and {MAX_ACTIVITY_LIMIT}"
            )));
        }

        let titles: HashMap<Uuid, String> = self
            .store
            .list_events_by_organizer(organizer_id)
            .await?
            .into_iter()
            .map(|e| (e.id, e.title))
            .collect();
        let tickets = self
            .store
            .list_tickets_by_organizer(organizer_id, None)
            .await?;

        let mut activities = Vec::new();
        // A cancelled ticket was still bought: its purchase stays in the feed.
        for ticket in &tickets {
            let Some(event_title) = titles.get(&ticket.event_id) else {
                continue;
            };
            let attendee = ticket.attendee_label();

            activities.push(RecentActivity {
                event_id: ticket.event_id,
                event_title: event_title.clone(),
                ticket_id: ticket.id,
                activity_type: ActivityKind::TicketPurchase,
                description: format!("{attendee} purchased a ticket for {event_title}"),
                timestamp: ticket.purchased_at,
            });
            if let Some(checked_in_at) = ticket.checked_in_at {
                activities.push(RecentActivity {
                    event_id: ticket.event_id,
                    event_title: event_title.clone(),
                    ticket_id: ticket.id,
                    activity_type: ActivityKind::CheckIn,
                    description: format!("{attendee} checked in to {event_title}"),
                    timestamp: checked_in_at,
                });
            }
        }

        // On equal timestamps a check-in follows its purchase, so it lists first.
        let is_purchase = |a: &RecentActivity| a.activity_type == ActivityKind::TicketPurchase;
        activities.sort_by(|a, b| {
            b.timestamp
                .cmp(&a.timestamp)
                .then_with(|| is_purchase(a).cmp(&is_purchase(b)))
                .then_with(|| a.ticket_id.cmp(&b.ticket_id))
        });
        activities.truncate(limit);
        Ok(activities)
    }

    /// Per-event revenue for every event with at least one sold ticket,
    /// highest revenue first.
    #[instrument(skip(self))]
    pub async fn revenue_breakdown(&self, organizer_id: Uuid) -> AppResult<Vec<RevenueBreakdownItem>> {
        let events = self.store.list_events_by_organizer(organizer_id).await?;
        let tickets = self
            .store
            .list_tickets_by_organizer(organizer_id, None)
            .await?;

        let mut per_event: HashMap<Uuid, Tally> = HashMap::new();
        for ticket in &tickets {
            per_event.entry(ticket.event_id).or_default().record(ticket);
        }

        let mut breakdown: Vec<RevenueBreakdownItem> = events
            .into_iter()
            .filter_map(|event| {
                let tally = per_event.get(&event.id).copied().unwrap_or_default();
                (tally.tickets > 0).then(|| RevenueBreakdownItem {
                    event_id: event.id,
                    event_title: event.title,
                    tickets_sold: tally.tickets,
                    revenue: tally.revenue,
                    ticket_price: tally.average_price(),
                })
            })
            .collect();

        breakdown.sort_by(|a, b| {
            b.revenue
                .cmp(&a.revenue)
                .then_with(|| a.event_title.cmp(&b.event_title))
        });
        Ok(breakdown)
    }
}
