//! Property tests over randomly generated ticket populations.

mod common;

use chrono::{Duration, NaiveDate};
use proptest::prelude::*;
use rust_decimal::Decimal;

use common::{now, World};
use ticket_engine::models::sales::DailySalesQuery;
use ticket_engine::models::TicketStatus;
use ticket_engine::services::{SalesService, ScannerService};
use ticket_engine::store::TicketStore;

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
}

fn status_strategy() -> impl Strategy<Value = TicketStatus> {
    prop_oneof![
        3 => Just(TicketStatus::Active),
        1 => Just(TicketStatus::CheckedIn),
        1 => Just(TicketStatus::Cancelled),
    ]
}

/// (price in cents, status, purchase offset in minutes before now)
fn population() -> impl Strategy<Value = Vec<(i64, TicketStatus, i64)>> {
    prop::collection::vec((0i64..50_000, status_strategy(), 0i64..60 * 24 * 45), 0..60)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn revenue_counts_only_non_cancelled_tickets(tickets in population(), capacity in proptest::option::of(0i32..200)) {
        runtime().block_on(async {
            let world = World::new();
            let event = world.event("Festival", capacity);
            let mut expected = Decimal::ZERO;
            let mut sold = 0i64;
            for (i, (cents, status, offset)) in tickets.iter().enumerate() {
                world.ticket(&event, &format!("T{i}"), *cents, now() - Duration::minutes(*offset), *status);
                if *status != TicketStatus::Cancelled {
                    expected += Decimal::new(*cents, 2);
                    sold += 1;
                }
            }

            let report = SalesService::new(world.store.clone())
                .event_sales_report(event.id, world.organizer_id)
                .await
                .unwrap();

            prop_assert_eq!(report.total_revenue, expected);
            prop_assert_eq!(report.total_tickets_sold as i64, sold);
            prop_assert_eq!(report.tickets_available, capacity.map(|c| i64::from(c) - sold));
            Ok(())
        })?;
    }

    #[test]
    fn cancelling_never_increases_totals(tickets in population(), pick in any::<prop::sample::Index>()) {
        runtime().block_on(async {
            let world = World::new();
            let event = world.event("Festival", None);
            let mut active = Vec::new();
            for (i, (cents, status, offset)) in tickets.iter().enumerate() {
                let t = world.ticket(&event, &format!("T{i}"), *cents, now() - Duration::minutes(*offset), *status);
                if *status == TicketStatus::Active {
                    active.push(t);
                }
            }
            prop_assume!(!active.is_empty());

            let sales = SalesService::new(world.store.clone());
            let scanner = ScannerService::new(world.store.clone(), world.clock.clone());
            let before = sales.event_sales_report(event.id, world.organizer_id).await.unwrap();

            let victim = pick.get(&active);
            scanner.cancel(victim.id, world.organizer_id).await.unwrap();
            let after = sales.event_sales_report(event.id, world.organizer_id).await.unwrap();

            prop_assert!(after.total_revenue <= before.total_revenue);
            prop_assert_eq!(after.total_revenue, before.total_revenue - victim.price);
            prop_assert_eq!(after.total_tickets_sold + 1, before.total_tickets_sold);
            Ok(())
        })?;
    }

    #[test]
    fn daily_buckets_sum_to_summary(tickets in population()) {
        runtime().block_on(async {
            let world = World::new();
            let a = world.event("A", None);
            let b = world.event("B", None);
            for (i, (cents, status, offset)) in tickets.iter().enumerate() {
                let event = if i % 2 == 0 { &a } else { &b };
                world.ticket(event, &format!("T{i}"), *cents, now() - Duration::minutes(*offset), *status);
            }

            let sales = SalesService::new(world.store.clone());
            let daily = sales.daily_sales(world.organizer_id, DailySalesQuery::default()).await.unwrap();
            let summary = sales.sales_summary(world.organizer_id).await.unwrap();

            let tickets_sum: u64 = daily.iter().map(|d| d.tickets_sold).sum();
            let revenue_sum: Decimal = daily.iter().map(|d| d.revenue).sum();
            prop_assert_eq!(tickets_sum, summary.total_tickets_sold);
            prop_assert_eq!(revenue_sum, summary.total_revenue);

            // Newest first, one bucket per date, no empty buckets.
            prop_assert!(daily.windows(2).all(|w| w[0].sale_date > w[1].sale_date));
            prop_assert!(daily.iter().all(|d| d.tickets_sold > 0));
            Ok(())
        })?;
    }

    #[test]
    fn windowed_daily_sales_match_windowed_totals(
        tickets in population(),
        start_back in 0i64..45,
        span in 0i64..45,
    ) {
        runtime().block_on(async {
            let world = World::new();
            let event = world.event("Festival", None);
            let mut population = Vec::new();
            for (i, (cents, status, offset)) in tickets.iter().enumerate() {
                population.push(world.ticket(&event, &format!("T{i}"), *cents, now() - Duration::minutes(*offset), *status));
            }

            let today = now().date_naive();
            let start: NaiveDate = today - Duration::days(start_back);
            let end: NaiveDate = start + Duration::days(span);
            let query = DailySalesQuery {
                event_id: Some(event.id),
                start_date: Some(start),
                end_date: Some(end),
            };
            let daily = SalesService::new(world.store.clone())
                .daily_sales(world.organizer_id, query)
                .await
                .unwrap();

            let in_window: Vec<_> = population
                .iter()
                .filter(|t| t.status != TicketStatus::Cancelled)
                .filter(|t| (start..=end).contains(&t.purchased_at.date_naive()))
                .collect();
            let expected_revenue: Decimal = in_window.iter().map(|t| t.price).sum();

            prop_assert_eq!(daily.iter().map(|d| d.tickets_sold).sum::<u64>(), in_window.len() as u64);
            prop_assert_eq!(daily.iter().map(|d| d.revenue).sum::<Decimal>(), expected_revenue);
            prop_assert!(daily.iter().all(|d| d.sale_date >= start && d.sale_date <= end));
            Ok(())
        })?;
    }

    #[test]
    fn status_never_returns_to_active(ops in prop::collection::vec((0usize..4, any::<bool>()), 1..40)) {
        runtime().block_on(async {
            let world = World::new();
            let event = world.event("Festival", None);
            let tickets: Vec<_> = (0..4)
                .map(|i| world.ticket(&event, &format!("T{i}"), 1000, now(), TicketStatus::Active))
                .collect();
            let scanner = ScannerService::new(world.store.clone(), world.clock.clone());
            let mut terminal: Vec<Option<TicketStatus>> = vec![None; tickets.len()];

            for (idx, check_in) in ops {
                let ticket = &tickets[idx];
                if check_in {
                    let _ = scanner.check_in(&ticket.code, world.organizer_id).await;
                } else {
                    let _ = scanner.cancel(ticket.id, world.organizer_id).await;
                }
                world.clock.advance(Duration::seconds(1));

                let stored = world.store.find_ticket_by_id(ticket.id).await.unwrap().unwrap();
                prop_assert_ne!(stored.ticket.status, TicketStatus::Active);
                match terminal[idx] {
                    None => terminal[idx] = Some(stored.ticket.status),
                    Some(first) => prop_assert_eq!(stored.ticket.status, first),
                }
                prop_assert_eq!(
                    stored.ticket.checked_in_at.is_some(),
                    stored.ticket.status == TicketStatus::CheckedIn
                );
            }
            Ok(())
        })?;
    }
}
