use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Sales figures for a single event. Cancelled tickets are not counted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SalesReport {
    pub event_id: Uuid,
    pub event_title: String,
    pub total_tickets_sold: u64,
    pub total_revenue: Decimal,
    /// `capacity - total_tickets_sold`; absent when the event has no capacity.
    pub tickets_available: Option<i64>,
    pub average_ticket_price: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailySales {
    pub sale_date: NaiveDate,
    pub tickets_sold: u64,
    pub revenue: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SalesSummary {
    pub total_tickets_sold: u64,
    pub total_revenue: Decimal,
    /// Events with at least one non-cancelled ticket.
    pub total_events: u64,
    pub average_tickets_per_event: Decimal,
    pub average_revenue_per_event: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthlyRevenue {
    pub year: i32,
    pub month: u32,
    pub revenue: Decimal,
    pub tickets_sold: u64,
}

/// Inclusive calendar-date window over `purchased_at` (UTC).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PurchaseWindow {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl PurchaseWindow {
    pub fn new(start_date: Option<NaiveDate>, end_date: Option<NaiveDate>) -> Self {
        Self {
            start_date,
            end_date,
        }
    }

    pub fn is_unbounded(&self) -> bool {
        self.start_date.is_none() && self.end_date.is_none()
    }

    pub fn is_inverted(&self) -> bool {
        matches!((self.start_date, self.end_date), (Some(start), Some(end)) if start > end)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start_date.map_or(true, |start| date >= start)
            && self.end_date.map_or(true, |end| date <= end)
    }
}

/// Query string of the daily sales endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DailySalesQuery {
    pub event_id: Option<Uuid>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl DailySalesQuery {
    pub fn window(&self) -> PurchaseWindow {
        PurchaseWindow::new(self.start_date, self.end_date)
    }
}

#[derive(Debug, Serialize)]
pub struct SalesReportList {
    pub sales_reports: Vec<SalesReport>,
    pub total_events: usize,
    pub combined_revenue: Decimal,
}

impl From<Vec<SalesReport>> for SalesReportList {
    fn from(sales_reports: Vec<SalesReport>) -> Self {
        let combined_revenue = sales_reports.iter().map(|r| r.total_revenue).sum();
        Self {
            total_events: sales_reports.len(),
            combined_revenue,
            sales_reports,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DailySalesList {
    pub daily_sales: Vec<DailySales>,
    pub total_days: usize,
    pub total_revenue: Decimal,
    pub total_tickets: u64,
}

impl From<Vec<DailySales>> for DailySalesList {
    fn from(daily_sales: Vec<DailySales>) -> Self {
        Self {
            total_days: daily_sales.len(),
            total_revenue: daily_sales.iter().map(|d| d.revenue).sum(),
            total_tickets: daily_sales.iter().map(|d| d.tickets_sold).sum(),
            daily_sales,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_window_bounds_are_inclusive() {
        let window = PurchaseWindow::new(Some(date(2024, 3, 1)), Some(date(2024, 3, 31)));

        assert!(window.contains(date(2024, 3, 1)));
        assert!(window.contains(date(2024, 3, 31)));
        assert!(!window.contains(date(2024, 2, 29)));
        assert!(!window.contains(date(2024, 4, 1)));
    }

    #[test]
    fn test_open_ended_window() {
        let window = PurchaseWindow::new(Some(date(2024, 3, 1)), None);

        assert!(window.contains(date(2030, 1, 1)));
        assert!(!window.contains(date(2024, 2, 1)));
        assert!(PurchaseWindow::default().is_unbounded());
    }

    #[test]
    fn test_inverted_window_detected() {
        let window = PurchaseWindow::new(Some(date(2024, 4, 1)), Some(date(2024, 3, 1)));
        assert!(window.is_inverted());
    }

    #[test]
    fn test_daily_list_totals() {
        let list = DailySalesList::from(vec![
            DailySales {
                sale_date: date(2024, 3, 2),
                tickets_sold: 2,
                revenue: Decimal::new(5000, 2),
            },
            DailySales {
                sale_date: date(2024, 3, 1),
                tickets_sold: 1,
                revenue: Decimal::new(1250, 2),
            },
        ]);

        assert_eq!(list.total_days, 2);
        assert_eq!(list.total_tickets, 3);
        assert_eq!(list.total_revenue, Decimal::new(6250, 2));
    }
}
