use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardStats {
    pub total_events: u64,
    pub upcoming_events: u64,
    pub past_events: u64,
    pub total_tickets_sold: u64,
    pub total_revenue: Decimal,
    /// Distinct attendee emails over non-cancelled tickets.
    pub active_attendees: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    TicketPurchase,
    CheckIn,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecentActivity {
    pub event_id: Uuid,
    pub event_title: String,
    pub ticket_id: Uuid,
    pub activity_type: ActivityKind,
    pub description: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RevenueBreakdownItem {
    pub event_id: Uuid,
    pub event_title: String,
    pub tickets_sold: u64,
    pub revenue: Decimal,
    /// Average price paid per ticket.
    pub ticket_price: Decimal,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecentActivityQuery {
    pub limit: Option<usize>,
}
